//! Wire shapes of the Spotify Web API and their conversion into the app's model.

use serde::Deserialize;

use crate::model::{Album, Artist, Image, Owner, Playlist, TrackEntry};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpotifyExternalUrls {
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyImage {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyArtist {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyUser {
    pub id: String,
    pub display_name: Option<String>,
}

/// A page of items plus the url of the next page, if any.
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyPaging<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifySimplifiedAlbum {
    pub name: String,
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
}

/// Spotify track from API. Album listings leave out `album`.
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyTrack {
    /// `None` for local files added to a playlist.
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SpotifyArtist>,
    pub album: Option<SpotifySimplifiedAlbum>,
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub external_urls: SpotifyExternalUrls,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyAlbum {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SpotifyArtist>,
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
    #[serde(default)]
    pub external_urls: SpotifyExternalUrls,
    pub tracks: SpotifyPaging<SpotifyTrack>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyPlaylistItem {
    /// Removed or unavailable entries come back as `null`.
    pub track: Option<SpotifyTrack>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyPlaylist {
    pub id: String,
    pub name: String,
    pub owner: SpotifyUser,
    /// `null` for playlists without any artwork.
    pub images: Option<Vec<SpotifyImage>>,
    #[serde(default)]
    pub external_urls: SpotifyExternalUrls,
    pub tracks: SpotifyPaging<SpotifyPlaylistItem>,
}

/// Spotify lists images largest first; the model keeps them smallest first.
fn ordered_images(images: Vec<SpotifyImage>) -> Vec<Image> {
    let mut images: Vec<Image> = images
        .into_iter()
        .rev()
        .map(|image| Image {
            url: image.url,
            width: image.width,
            height: image.height,
        })
        .collect();
    images.sort_by_key(|image| image.width.unwrap_or(0));
    images
}

fn artists(artists: Vec<SpotifyArtist>) -> Vec<Artist> {
    artists
        .into_iter()
        .map(|artist| Artist {
            id: artist.id,
            name: artist.name,
        })
        .collect()
}

impl SpotifyTrack {
    /// Tracks without an id (local files) can't be fetched and are dropped.
    pub fn into_entry(self, fallback_images: &[Image], fallback_album: Option<&str>) -> Option<TrackEntry> {
        let id = self.id?;
        let (album_name, images) = match self.album {
            Some(album) => (Some(album.name), ordered_images(album.images)),
            None => (fallback_album.map(str::to_string), fallback_images.to_vec()),
        };
        Some(TrackEntry {
            id,
            name: self.name,
            artists: artists(self.artists),
            album_name,
            images,
            duration_ms: self.duration_ms,
            url: self.external_urls.spotify,
        })
    }
}

impl SpotifyAlbum {
    /// Convert using the complete track list (the embedded page may be partial).
    pub fn into_album(self, tracks: Vec<SpotifyTrack>) -> Album {
        let images = ordered_images(self.images);
        let tracks = tracks
            .into_iter()
            .filter_map(|track| track.into_entry(&images, Some(&self.name)))
            .collect();
        Album {
            id: self.id,
            name: self.name,
            artists: artists(self.artists),
            images,
            url: self.external_urls.spotify,
            tracks,
        }
    }
}

impl SpotifyPlaylist {
    /// Convert using the complete item list (the embedded page may be partial).
    pub fn into_playlist(self, items: Vec<SpotifyPlaylistItem>) -> Playlist {
        let tracks = items
            .into_iter()
            .filter_map(|item| item.track)
            .filter_map(|track| track.into_entry(&[], None))
            .collect();
        Playlist {
            id: self.id,
            name: self.name,
            owner: Owner {
                id: self.owner.id,
                display_name: self.owner.display_name,
            },
            images: ordered_images(self.images.unwrap_or_default()),
            url: self.external_urls.spotify,
            tracks,
        }
    }
}
