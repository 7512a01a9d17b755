use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Cover art, ordered smallest to largest wherever a list of them is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: String,
    pub display_name: Option<String>,
}

/// A single track, either on its own or as an entry of an album/playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackEntry {
    pub id: String,
    pub name: String,
    pub artists: Vec<Artist>,
    pub album_name: Option<String>,
    pub images: Vec<Image>,
    pub duration_ms: Option<u64>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    pub artists: Vec<Artist>,
    pub images: Vec<Image>,
    pub url: Option<String>,
    pub tracks: Vec<TrackEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub owner: Owner,
    pub images: Vec<Image>,
    pub url: Option<String>,
    pub tracks: Vec<TrackEntry>,
}

/// Whatever a pasted link resolved to. Always replaced as a whole, never patched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LinkResult {
    Track(TrackEntry),
    Album(Album),
    Playlist(Playlist),
}

impl LinkResult {
    pub fn id(&self) -> &str {
        match self {
            LinkResult::Track(track) => &track.id,
            LinkResult::Album(album) => &album.id,
            LinkResult::Playlist(playlist) => &playlist.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            LinkResult::Track(track) => &track.name,
            LinkResult::Album(album) => &album.name,
            LinkResult::Playlist(playlist) => &playlist.name,
        }
    }

    pub fn images(&self) -> &[Image] {
        match self {
            LinkResult::Track(track) => &track.images,
            LinkResult::Album(album) => &album.images,
            LinkResult::Playlist(playlist) => &playlist.images,
        }
    }

    /// Owner display name for playlists, joined artist names otherwise.
    pub fn subtitle(&self) -> String {
        match self {
            LinkResult::Track(track) => artist_names(&track.artists),
            LinkResult::Album(album) => artist_names(&album.artists),
            LinkResult::Playlist(playlist) => playlist
                .owner
                .display_name
                .clone()
                .unwrap_or_else(|| playlist.owner.id.clone()),
        }
    }

    /// Every track the link covers, in the order Spotify lists them.
    pub fn tracks(&self) -> &[TrackEntry] {
        match self {
            LinkResult::Track(track) => std::slice::from_ref(track),
            LinkResult::Album(album) => &album.tracks,
            LinkResult::Playlist(playlist) => &playlist.tracks,
        }
    }
}

/// Join artist names the way they're shown under a title: "A, B, C".
pub fn artist_names(artists: &[Artist]) -> String {
    artists
        .iter()
        .map(|artist| artist.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Coarse phase of the current freeze dry run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadStatus {
    #[default]
    Idle,
    Downloading,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackProgress {
    /// Completion in `[0, 1]`.
    pub fraction: f64,
}

/// Where the audio for a track was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMatch {
    pub id: String,
    pub title: String,
    pub url: String,
}

/// Track id to download progress. Entries appear as the backend gets to them.
pub type DownloadState = HashMap<String, TrackProgress>;

/// Track id to the matched audio source. Entries appear as the backend gets to them.
pub type SearchState = HashMap<String, SourceMatch>;

/// Summary returned once a freeze dry run finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreezeDryReport {
    pub total: usize,
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub directory: PathBuf,
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_track_lists_itself() {
        let result = LinkResult::Track(track("a", "Song", "Artist"));
        assert_eq!(result.tracks().len(), 1);
        assert_eq!(result.tracks()[0].id, "a");
    }

    #[test]
    fn test_playlist_subtitle_is_owner() {
        let result = playlist(vec![]);
        assert_eq!(result.subtitle(), "Spotify");
    }

    #[test]
    fn test_artist_names_joined() {
        let artists = vec![
            Artist {
                id: None,
                name: "Daft Punk".to_string(),
            },
            Artist {
                id: None,
                name: "Pharrell Williams".to_string(),
            },
        ];
        assert_eq!(artist_names(&artists), "Daft Punk, Pharrell Williams");
        assert_eq!(artist_names(&[]), "");
    }

    #[test]
    fn test_link_result_serializes_with_type_tag() {
        let json = serde_json::to_value(LinkResult::Track(track("a", "Song", "Artist"))).unwrap();
        assert_eq!(json["type"], "track");
        assert_eq!(json["id"], "a");
    }
}
