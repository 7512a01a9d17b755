use crate::model::{FreezeDryReport, LinkResult};

/// Failures surfaced across the bridge.
///
/// Cloneable so it can travel through the UI event channel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    #[error("Invalid link: {0}")]
    InvalidLink(String),
    #[error("Spotify request failed: {0}")]
    Spotify(String),
    #[error("None of the {failed} tracks could be downloaded")]
    NothingDownloaded { failed: usize },
    #[error("File system error: {0}")]
    Io(String),
}

/// Capability object the UI talks to. Every call is a request/response pair.
///
/// Implementations live in `services::backend` (production) or test mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Bridge: Send + Sync {
    /// Folder downloads are currently written to.
    async fn get_selected_folder(&self) -> Result<String, BridgeError>;

    /// Ask the host for a new folder. Returns the folder in effect afterwards.
    async fn choose_folder(&self) -> Result<String, BridgeError>;

    /// Ask the host to shut the application down.
    async fn close(&self) -> Result<(), BridgeError>;

    async fn get_from_link(&self, link: &str) -> Result<LinkResult, BridgeError>;

    /// Search and download every track the link covers.
    async fn freeze_dry(&self, link: &str) -> Result<FreezeDryReport, BridgeError>;
}
