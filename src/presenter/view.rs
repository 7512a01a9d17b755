use crate::model::{
    DownloadState, DownloadStatus, LinkResult, SearchState, TrackEntry, artist_names,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub title: String,
    pub subtitle: String,
    pub cover_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: String,
    pub name: String,
    pub artists: String,
    pub cover_url: Option<String>,
    pub source_url: Option<String>,
    /// Share of the row still shaded, see [`overlay`].
    pub overlay: f64,
    /// Download progress to show next to the row, see [`shown_progress`].
    pub progress: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Layout {
    Empty,
    Single(Row),
    List(Vec<Row>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub header: Option<Header>,
    pub layout: Layout,
}

impl ResultView {
    pub fn empty() -> Self {
        Self {
            header: None,
            layout: Layout::Empty,
        }
    }

    pub fn rows(&self) -> &[Row] {
        match &self.layout {
            Layout::Empty => &[],
            Layout::Single(row) => std::slice::from_ref(row),
            Layout::List(rows) => rows,
        }
    }
}

/// Shade left over a row: starts at 1 and clears as the download progresses.
///
/// Always 0 unless a run is going. `progress` must be within `[0, 1]`.
pub fn overlay(progress: Option<f64>, status: DownloadStatus) -> f64 {
    if status == DownloadStatus::Downloading {
        1.0 - progress.unwrap_or(0.0)
    } else {
        0.0
    }
}

/// Progress a row displays: live while a run goes, then whatever the track
/// last reported. Nothing before the first run.
pub fn shown_progress(progress: Option<f64>, status: DownloadStatus) -> Option<f64> {
    match status {
        DownloadStatus::Idle => None,
        DownloadStatus::Downloading => Some(progress.unwrap_or(0.0)),
        DownloadStatus::Completed => progress,
    }
}

fn row(
    track: &TrackEntry,
    search: &SearchState,
    downloads: &DownloadState,
    status: DownloadStatus,
) -> Row {
    let progress = downloads.get(&track.id).map(|progress| progress.fraction);
    Row {
        id: track.id.clone(),
        name: track.name.clone(),
        artists: artist_names(&track.artists),
        cover_url: track.images.first().map(|image| image.url.clone()),
        source_url: search.get(&track.id).map(|source| source.url.clone()),
        overlay: overlay(progress, status),
        progress: shown_progress(progress, status),
    }
}

/// Everything shown for a resolved link. Pure: same input, same view.
pub fn build_view(
    result: Option<&LinkResult>,
    search: &SearchState,
    downloads: &DownloadState,
    status: DownloadStatus,
) -> ResultView {
    let Some(result) = result else {
        return ResultView::empty();
    };

    let header = Header {
        title: result.name().to_string(),
        subtitle: result.subtitle(),
        cover_url: result.images().last().map(|image| image.url.clone()),
    };

    let layout = match result {
        LinkResult::Track(track) => Layout::Single(row(track, search, downloads, status)),
        LinkResult::Album(_) | LinkResult::Playlist(_) => Layout::List(
            result
                .tracks()
                .iter()
                .map(|track| row(track, search, downloads, status))
                .collect(),
        ),
    };

    ResultView {
        header: Some(header),
        layout,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SourceMatch, TrackProgress, fixtures};

    fn playlist() -> LinkResult {
        fixtures::playlist(vec![
            fixtures::track("t1", "One", "A"),
            fixtures::track("t2", "Two", "B"),
            fixtures::track("t3", "Three", "C"),
        ])
    }

    #[test]
    fn test_overlay_is_zero_unless_downloading() {
        for status in [DownloadStatus::Idle, DownloadStatus::Completed] {
            for progress in [None, Some(0.0), Some(0.4), Some(1.0)] {
                assert_eq!(overlay(progress, status), 0.0);
            }
        }
    }

    #[test]
    fn test_overlay_depletes_as_progress_grows() {
        let mut previous = overlay(None, DownloadStatus::Downloading);
        assert_eq!(previous, 1.0);
        for step in 0..=100 {
            let current = overlay(Some(step as f64 / 100.0), DownloadStatus::Downloading);
            assert!(current <= previous, "{current} > {previous} at step {step}");
            previous = current;
        }
        assert_eq!(previous, 0.0);
    }

    #[test]
    fn test_playlist_lists_every_track_in_order() {
        let view = build_view(
            Some(&playlist()),
            &SearchState::new(),
            &DownloadState::new(),
            DownloadStatus::Idle,
        );

        let names: Vec<_> = view.rows().iter().map(|row| row.name.as_str()).collect();
        assert_eq!(names, vec!["One", "Two", "Three"]);
        assert!(matches!(view.layout, Layout::List(_)));
        let header = view.header.unwrap();
        assert_eq!(header.title, "Today's Top Hits");
        assert_eq!(header.subtitle, "Spotify");
    }

    #[test]
    fn test_clearing_result_empties_view() {
        let view = build_view(
            None,
            &SearchState::new(),
            &DownloadState::new(),
            DownloadStatus::Downloading,
        );
        assert_eq!(view, ResultView::empty());
        assert!(view.rows().is_empty());
    }

    #[test]
    fn test_track_row_uses_smallest_cover() {
        let result = LinkResult::Track(fixtures::track("t1", "Solo", "Artist"));
        let view = build_view(
            Some(&result),
            &SearchState::new(),
            &DownloadState::new(),
            DownloadStatus::Idle,
        );

        match view.layout {
            Layout::Single(row) => {
                assert_eq!(row.name, "Solo");
                assert_eq!(row.artists, "Artist");
                assert_eq!(
                    row.cover_url.as_deref(),
                    Some("https://i.scdn.co/image/t1-64")
                );
            }
            other => panic!("expected single layout, got {other:?}"),
        }
        assert_eq!(
            view.header.unwrap().cover_url.as_deref(),
            Some("https://i.scdn.co/image/t1-640")
        );
    }

    #[test]
    fn test_playlist_rows_carry_their_own_cover() {
        let view = build_view(
            Some(&playlist()),
            &SearchState::new(),
            &DownloadState::new(),
            DownloadStatus::Idle,
        );

        let covers: Vec<_> = view
            .rows()
            .iter()
            .map(|row| row.cover_url.as_deref())
            .collect();
        assert_eq!(
            covers,
            vec![
                Some("https://i.scdn.co/image/t1-64"),
                Some("https://i.scdn.co/image/t2-64"),
                Some("https://i.scdn.co/image/t3-64"),
            ]
        );
    }

    #[test]
    fn test_completed_run_keeps_only_reported_progress() {
        let mut downloads = DownloadState::new();
        downloads.insert("t1".to_string(), TrackProgress { fraction: 1.0 });

        let view = build_view(
            Some(&playlist()),
            &SearchState::new(),
            &downloads,
            DownloadStatus::Completed,
        );
        let progress: Vec<_> = view.rows().iter().map(|row| row.progress).collect();
        assert_eq!(progress, vec![Some(1.0), None, None]);
        assert!(view.rows().iter().all(|row| row.overlay == 0.0));
    }

    #[test]
    fn test_shown_progress_by_status() {
        assert_eq!(shown_progress(Some(0.5), DownloadStatus::Idle), None);
        assert_eq!(shown_progress(None, DownloadStatus::Downloading), Some(0.0));
        assert_eq!(shown_progress(Some(0.5), DownloadStatus::Downloading), Some(0.5));
        assert_eq!(shown_progress(None, DownloadStatus::Completed), None);
        assert_eq!(shown_progress(Some(0.3), DownloadStatus::Completed), Some(0.3));
    }

    #[test]
    fn test_rows_tolerate_partial_state() {
        let mut search = SearchState::new();
        search.insert(
            "t2".to_string(),
            SourceMatch {
                id: "v2".to_string(),
                title: "Two (Official Audio)".to_string(),
                url: "https://www.youtube.com/watch?v=v2".to_string(),
            },
        );
        let mut downloads = DownloadState::new();
        downloads.insert("t1".to_string(), TrackProgress { fraction: 0.75 });
        // Progress for a track that isn't part of the result at all
        downloads.insert("gone".to_string(), TrackProgress { fraction: 0.5 });

        let view = build_view(
            Some(&playlist()),
            &search,
            &downloads,
            DownloadStatus::Downloading,
        );
        let rows = view.rows();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].overlay, 0.25);
        assert_eq!(rows[1].overlay, 1.0);
        assert_eq!(
            rows[1].source_url.as_deref(),
            Some("https://www.youtube.com/watch?v=v2")
        );
        assert_eq!(rows[2].source_url, None);
    }
}
