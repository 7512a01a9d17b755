use std::path::{Path, PathBuf};

use tokio::sync::mpsc;

use crate::model::SourceMatch;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("{0} not found in PATH. Please install it and make sure it's available.")]
    NotInstalled(String),
    #[error("Failed to run audio source process: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("Audio source process failed:\n{stderr}")]
    Failed { stderr: String },
    #[error("No match found for `{query}`")]
    NoMatch { query: String },
}

/// Port trait for finding and fetching audio for a track.
///
/// Implementations live in `services::ytdlp` (production) or test mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait AudioSource: Send + Sync {
    /// Best match for a free text query.
    async fn search(&self, query: &str) -> Result<SourceMatch, SourceError>;

    /// Download `source` into `directory` as `<file_stem>.<ext>`, sending completion
    /// fractions through `progress` as they come in. Returns the written file.
    async fn download(
        &self,
        source: &SourceMatch,
        directory: &Path,
        file_stem: &str,
        progress: mpsc::UnboundedSender<f64>,
    ) -> Result<PathBuf, SourceError>;

    /// Where `download` would write the file for `file_stem`.
    fn output_path(&self, directory: &Path, file_stem: &str) -> PathBuf;
}
