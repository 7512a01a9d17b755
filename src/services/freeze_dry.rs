use std::path::{Path, PathBuf};

use futures::{FutureExt, StreamExt};
use tokio::sync::mpsc;

use crate::link::{LinkKind, ParsedLink, parse_link};
use crate::model::{DownloadStatus, FreezeDryReport, LinkResult, TrackEntry, artist_names};
use crate::ports::bridge::BridgeError;
use crate::ports::source::{AudioSource, SourceError};
use crate::ports::spotify::SpotifyApi;
use crate::presenter::updates::UpdateSender;

pub const DEFAULT_CONCURRENCY: usize = 4;

/// Fetch whatever a parsed link points at.
pub async fn resolve(
    spotify: &dyn SpotifyApi,
    link: &ParsedLink,
) -> Result<LinkResult, BridgeError> {
    let result = match link.kind {
        LinkKind::Track => spotify.track(&link.id).await.map(LinkResult::Track),
        LinkKind::Album => spotify.album(&link.id).await.map(LinkResult::Album),
        LinkKind::Playlist => spotify.playlist(&link.id).await.map(LinkResult::Playlist),
    };
    result.map_err(|error| BridgeError::Spotify(error.to_string()))
}

/// Parse and fetch a raw link.
pub async fn resolve_link(spotify: &dyn SpotifyApi, link: &str) -> Result<LinkResult, BridgeError> {
    let parsed = parse_link(link).map_err(|error| BridgeError::InvalidLink(error.to_string()))?;
    resolve(spotify, &parsed).await
}

/// File name (without extension) a track is saved under: `Artist, Other - Title`.
pub fn file_stem(track: &TrackEntry) -> String {
    let artists = artist_names(&track.artists);
    if artists.is_empty() {
        track.name.clone()
    } else {
        format!("{} - {}", artists, track.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemResult {
    Downloaded,
    Skipped,
    Failed,
}

/// One freeze dry run: resolve a link, then search and download each track.
pub struct FreezeDryJob<'a> {
    pub spotify: &'a dyn SpotifyApi,
    pub source: &'a dyn AudioSource,
    pub updates: &'a UpdateSender,
    pub directory: &'a Path,
    pub concurrency: usize,
}

impl FreezeDryJob<'_> {
    pub async fn run(&self, link: &str) -> Result<FreezeDryReport, BridgeError> {
        let result = resolve_link(self.spotify, link).await?;
        let tracks = result.tracks();

        tokio::fs::create_dir_all(self.directory)
            .await
            .map_err(|error| BridgeError::Io(error.to_string()))?;

        log::info!(
            "Freeze drying `{}` ({}, {} tracks) into {}",
            result.name(),
            result.id(),
            tracks.len(),
            self.directory.display()
        );

        self.updates.reset();
        self.updates.status(DownloadStatus::Downloading);

        let jobs: Vec<_> = tracks
            .iter()
            .map(|track| self.process_track(track).boxed())
            .collect();
        let results: Vec<ItemResult> = futures::stream::iter(jobs)
            .buffer_unordered(self.concurrency.max(1))
            .collect()
            .await;

        self.updates.status(DownloadStatus::Completed);

        let report = FreezeDryReport {
            total: tracks.len(),
            downloaded: count(&results, ItemResult::Downloaded),
            skipped: count(&results, ItemResult::Skipped),
            failed: count(&results, ItemResult::Failed),
            directory: self.directory.to_path_buf(),
        };

        if report.failed > 0 && report.downloaded == 0 && report.skipped == 0 {
            return Err(BridgeError::NothingDownloaded {
                failed: report.failed,
            });
        }
        Ok(report)
    }

    async fn process_track(&self, track: &TrackEntry) -> ItemResult {
        match self.fetch_track(track).await {
            Ok(Some(path)) => {
                log::info!("Downloaded {} to {}", track.name, path.display());
                ItemResult::Downloaded
            }
            Ok(None) => ItemResult::Skipped,
            Err(error) => {
                log::warn!("Failed to freeze dry {} ({}): {}", track.name, track.id, error);
                ItemResult::Failed
            }
        }
    }

    /// `Ok(None)` when the file is already there.
    async fn fetch_track(&self, track: &TrackEntry) -> Result<Option<PathBuf>, SourceError> {
        let stem = file_stem(track);

        let existing = self.source.output_path(self.directory, &stem);
        if tokio::fs::try_exists(&existing).await.unwrap_or(false) {
            log::debug!("Skipping {}, {} already exists", track.name, existing.display());
            self.updates.progress(&track.id, 1.0);
            return Ok(None);
        }

        let found = self.source.search(&stem).await?;
        self.updates.search_result(&track.id, found.clone());

        let (sender, mut receiver) = mpsc::unbounded_channel();
        let forward = async {
            while let Some(fraction) = receiver.recv().await {
                self.updates.progress(&track.id, fraction);
            }
        };
        let (downloaded, ()) = tokio::join!(
            self.source.download(&found, self.directory, &stem, sender),
            forward
        );
        let path = downloaded?;

        self.updates.progress(&track.id, 1.0);
        Ok(Some(path))
    }
}

fn count(results: &[ItemResult], kind: ItemResult) -> usize {
    results.iter().filter(|result| **result == kind).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SourceMatch, fixtures};
    use crate::ports::source::MockAudioSource;
    use crate::ports::spotify::MockSpotifyApi;
    use crate::presenter::updates::{self, BackendUpdate};
    use crate::spotify::SpotifyError;

    const PLAYLIST_LINK: &str = "https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M";

    fn playlist_api() -> MockSpotifyApi {
        let mut spotify = MockSpotifyApi::new();
        spotify.expect_playlist().returning(|_| {
            match fixtures::playlist(vec![
                fixtures::track("t1", "One", "A"),
                fixtures::track("t2", "Two", "B"),
            ]) {
                LinkResult::Playlist(playlist) => Ok(playlist),
                _ => unreachable!(),
            }
        });
        spotify
    }

    fn found(id: &str) -> SourceMatch {
        SourceMatch {
            id: id.to_string(),
            title: id.to_string(),
            url: format!("https://www.youtube.com/watch?v={id}"),
        }
    }

    fn drain(receiver: &mut updates::UpdateReceiver) -> Vec<BackendUpdate> {
        let mut received = Vec::new();
        while let Ok(update) = receiver.try_recv() {
            received.push(update);
        }
        received
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem(&fixtures::track("t", "Song", "Artist")), "Artist - Song");
        let mut anonymous = fixtures::track("t", "Song", "Artist");
        anonymous.artists.clear();
        assert_eq!(file_stem(&anonymous), "Song");
    }

    #[tokio::test]
    async fn test_resolve_link_rejects_invalid_links() {
        let spotify = MockSpotifyApi::new();
        let error = resolve_link(&spotify, "https://open.spotify.com/").await.unwrap_err();
        assert!(matches!(error, BridgeError::InvalidLink(_)));
    }

    #[tokio::test]
    async fn test_resolve_link_maps_spotify_errors() {
        let mut spotify = MockSpotifyApi::new();
        spotify.expect_track().returning(|_| {
            Err(SpotifyError::NotFound {
                url: "https://api.spotify.com/v1/tracks/abc".to_string(),
            })
        });
        let error = resolve_link(&spotify, "https://open.spotify.com/track/abc")
            .await
            .unwrap_err();
        assert!(matches!(error, BridgeError::Spotify(_)));
    }

    #[tokio::test]
    async fn test_run_pushes_updates_in_order() {
        let directory = tempfile::tempdir().unwrap();
        let spotify = playlist_api();

        let mut source = MockAudioSource::new();
        source
            .expect_output_path()
            .returning(|directory, stem| directory.join(format!("{stem}.mp3")));
        source
            .expect_search()
            .returning(|query| Ok(found(if query.contains("One") { "v1" } else { "v2" })));
        source
            .expect_download()
            .times(2)
            .returning(|_, directory, stem, progress| {
                let _ = progress.send(0.5);
                Ok(directory.join(format!("{stem}.mp3")))
            });

        let (sender, mut receiver) = updates::channel();
        let job = FreezeDryJob {
            spotify: &spotify,
            source: &source,
            updates: &sender,
            directory: directory.path(),
            concurrency: 1,
        };

        let report = job.run(PLAYLIST_LINK).await.unwrap();
        assert_eq!(report.total, 2);
        assert_eq!(report.downloaded, 2);
        assert_eq!(report.failed, 0);

        let progress = |track_id: &str, fraction: f64| BackendUpdate::Progress {
            track_id: track_id.to_string(),
            fraction,
        };
        assert_eq!(
            drain(&mut receiver),
            vec![
                BackendUpdate::Reset,
                BackendUpdate::Status(DownloadStatus::Downloading),
                BackendUpdate::SearchResult {
                    track_id: "t1".to_string(),
                    source: found("v1"),
                },
                progress("t1", 0.5),
                progress("t1", 1.0),
                BackendUpdate::SearchResult {
                    track_id: "t2".to_string(),
                    source: found("v2"),
                },
                progress("t2", 0.5),
                progress("t2", 1.0),
                BackendUpdate::Status(DownloadStatus::Completed),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_items_are_counted_not_fatal() {
        let directory = tempfile::tempdir().unwrap();
        let spotify = playlist_api();

        let mut source = MockAudioSource::new();
        source
            .expect_output_path()
            .returning(|directory, stem| directory.join(format!("{stem}.mp3")));
        source.expect_search().returning(|query| {
            if query.contains("One") {
                Ok(found("v1"))
            } else {
                Err(SourceError::NoMatch {
                    query: query.to_string(),
                })
            }
        });
        source
            .expect_download()
            .times(1)
            .returning(|_, directory, stem, _| Ok(directory.join(format!("{stem}.mp3"))));

        let (sender, _receiver) = updates::channel();
        let job = FreezeDryJob {
            spotify: &spotify,
            source: &source,
            updates: &sender,
            directory: directory.path(),
            concurrency: DEFAULT_CONCURRENCY,
        };

        let report = job.run(PLAYLIST_LINK).await.unwrap();
        assert_eq!(report.downloaded, 1);
        assert_eq!(report.failed, 1);
    }

    #[tokio::test]
    async fn test_everything_failing_is_an_error() {
        let directory = tempfile::tempdir().unwrap();
        let spotify = playlist_api();

        let mut source = MockAudioSource::new();
        source
            .expect_output_path()
            .returning(|directory, stem| directory.join(format!("{stem}.mp3")));
        source.expect_search().returning(|_| {
            Err(SourceError::Failed {
                stderr: "HTTP Error 429".to_string(),
            })
        });
        source.expect_download().never();

        let (sender, _receiver) = updates::channel();
        let job = FreezeDryJob {
            spotify: &spotify,
            source: &source,
            updates: &sender,
            directory: directory.path(),
            concurrency: 2,
        };

        assert_eq!(
            job.run(PLAYLIST_LINK).await.unwrap_err(),
            BridgeError::NothingDownloaded { failed: 2 }
        );
    }

    #[tokio::test]
    async fn test_existing_files_are_skipped() {
        let directory = tempfile::tempdir().unwrap();
        std::fs::write(directory.path().join("A - One.mp3"), b"audio").unwrap();
        let spotify = playlist_api();

        let mut source = MockAudioSource::new();
        source
            .expect_output_path()
            .returning(|directory, stem| directory.join(format!("{stem}.mp3")));
        source.expect_search().times(1).returning(|_| Ok(found("v2")));
        source
            .expect_download()
            .times(1)
            .returning(|_, directory, stem, _| Ok(directory.join(format!("{stem}.mp3"))));

        let (sender, _receiver) = updates::channel();
        let job = FreezeDryJob {
            spotify: &spotify,
            source: &source,
            updates: &sender,
            directory: directory.path(),
            concurrency: 1,
        };

        let report = job.run(PLAYLIST_LINK).await.unwrap();
        assert_eq!(report.skipped, 1);
        assert_eq!(report.downloaded, 1);
    }
}
