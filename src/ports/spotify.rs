use crate::model::{Album, Playlist, TrackEntry};
use crate::spotify::SpotifyError;

/// Port trait wrapping the Spotify API capabilities used by the backend.
///
/// Implementations live in `spotify::client` (production) or test mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SpotifyApi: Send + Sync {
    async fn track(&self, id: &str) -> Result<TrackEntry, SpotifyError>;
    /// Album with its complete track list.
    async fn album(&self, id: &str) -> Result<Album, SpotifyError>;
    /// Playlist with its complete track list.
    async fn playlist(&self, id: &str) -> Result<Playlist, SpotifyError>;
}
