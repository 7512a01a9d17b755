use std::path::{Path, PathBuf};

use color_eyre::{Result, eyre::Context};
use tokio::sync::RwLock;

use crate::config::Config;
use crate::model::{FreezeDryReport, LinkResult};
use crate::ports::bridge::{Bridge, BridgeError};
use crate::ports::dialog::FolderPicker;
use crate::ports::source::AudioSource;
use crate::ports::spotify::SpotifyApi;
use crate::presenter::updates::UpdateSender;
use crate::services::freeze_dry::{FreezeDryJob, resolve_link};
use crate::services::ytdlp::YtDlp;
use crate::spotify::SpotifyClient;

/// In-process backend: Spotify for metadata, an [`AudioSource`] for audio, the
/// local file system for storage.
pub struct LocalBackend<S, A> {
    spotify: S,
    source: A,
    picker: Box<dyn FolderPicker>,
    folder: RwLock<PathBuf>,
    updates: UpdateSender,
    concurrency: usize,
}

impl<S: SpotifyApi, A: AudioSource> LocalBackend<S, A> {
    pub fn new(
        spotify: S,
        source: A,
        picker: Box<dyn FolderPicker>,
        folder: PathBuf,
        updates: UpdateSender,
        concurrency: usize,
    ) -> Self {
        Self {
            spotify,
            source,
            picker,
            folder: RwLock::new(folder),
            updates,
            concurrency,
        }
    }

    pub async fn folder(&self) -> PathBuf {
        self.folder.read().await.clone()
    }
}

impl LocalBackend<SpotifyClient, YtDlp> {
    /// Production backend: checks Spotify credentials, finds yt-dlp and makes
    /// sure the download folder exists.
    pub async fn from_config(
        config: &Config,
        folder: PathBuf,
        picker: Box<dyn FolderPicker>,
        updates: UpdateSender,
    ) -> Result<Self> {
        let credentials = config.spotify_credentials()?;
        let spotify = SpotifyClient::connect(credentials)
            .await
            .wrap_err("Failed to connect to Spotify")?;
        let source = YtDlp::locate(config.yt_dlp_path().as_deref(), &config.download.audio_format)?;

        tokio::fs::create_dir_all(&folder)
            .await
            .wrap_err_with(|| format!("Failed to create {}", folder.display()))?;
        log::info!("Songs will be saved in {}", folder.display());

        Ok(Self::new(
            spotify,
            source,
            picker,
            folder,
            updates,
            config.download.concurrency,
        ))
    }
}

fn display(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

#[async_trait::async_trait]
impl<S: SpotifyApi, A: AudioSource> Bridge for LocalBackend<S, A> {
    async fn get_selected_folder(&self) -> Result<String, BridgeError> {
        Ok(display(&self.folder.read().await))
    }

    async fn choose_folder(&self) -> Result<String, BridgeError> {
        let current = self.folder().await;
        match self.picker.pick_folder(&current).await {
            Some(chosen) => {
                log::info!("Saving songs to {}", chosen.display());
                *self.folder.write().await = chosen.clone();
                Ok(display(&chosen))
            }
            None => {
                log::debug!("Folder selection cancelled");
                Ok(display(&current))
            }
        }
    }

    async fn close(&self) -> Result<(), BridgeError> {
        log::debug!("Close requested");
        self.updates.close_requested();
        Ok(())
    }

    async fn get_from_link(&self, link: &str) -> Result<LinkResult, BridgeError> {
        log::debug!("Resolving {}", link);
        resolve_link(&self.spotify, link).await
    }

    async fn freeze_dry(&self, link: &str) -> Result<FreezeDryReport, BridgeError> {
        let directory = self.folder().await;
        FreezeDryJob {
            spotify: &self.spotify,
            source: &self.source,
            updates: &self.updates,
            directory: &directory,
            concurrency: self.concurrency,
        }
        .run(link)
        .await
    }
}
