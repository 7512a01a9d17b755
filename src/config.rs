use std::path::{Path, PathBuf};

use color_eyre::{
    Result,
    eyre::{Context, eyre},
};
use serde::{Deserialize, Serialize};

use crate::services::freeze_dry::DEFAULT_CONCURRENCY;
use crate::spotify::auth::SpotifyCredentials;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub spotify: Option<SpotifyConfig>,
    #[serde(default)]
    pub download: DownloadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Where songs are saved until another folder is chosen.
    #[serde(default)]
    pub directory: Option<String>,
    #[serde(default = "default_audio_format")]
    pub audio_format: String,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Path to yt-dlp, looked up in PATH when missing.
    #[serde(default)]
    pub yt_dlp: Option<String>,
}

fn default_audio_format() -> String {
    "mp3".to_string()
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            directory: None,
            audio_format: default_audio_format(),
            concurrency: default_concurrency(),
            yt_dlp: None,
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|path| path.join("spotidry").join("config.toml"))
    }

    /// Load the default config file, falling back to defaults if there is none.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                log::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Write a commented default config, if it doesn't exist. Returns its path.
    pub fn create_default() -> Result<PathBuf> {
        let path = Self::config_path().ok_or(eyre!("No config directory on this system"))?;
        Self::write_default(&path)?;
        Ok(path)
    }

    fn write_default(path: &Path) -> Result<()> {
        if path.exists() {
            log::info!("Config already exists at {}", path.display());
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(path, DEFAULT_CONFIG)
            .wrap_err_with(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Spotify app credentials, from the config or `SPOTIFY_CLIENT_ID`/`SPOTIFY_CLIENT_SECRET`.
    pub fn spotify_credentials(&self) -> Result<SpotifyCredentials> {
        if let Some(ref spotify) = self.spotify {
            return Ok(SpotifyCredentials {
                client_id: spotify.client_id.clone(),
                client_secret: spotify.client_secret.clone(),
            });
        }

        // Try environment variables as fallback
        match (
            std::env::var("SPOTIFY_CLIENT_ID"),
            std::env::var("SPOTIFY_CLIENT_SECRET"),
        ) {
            (Ok(client_id), Ok(client_secret)) => Ok(SpotifyCredentials {
                client_id,
                client_secret,
            }),
            _ => Err(eyre!(
                "Spotify credentials missing. Add a [spotify] section to the config or set SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET"
            )),
        }
    }

    /// Configured download folder, or `Spotidry` inside the user's music folder.
    pub fn download_directory(&self) -> PathBuf {
        match self.download.directory {
            Some(ref directory) => expand_path(directory),
            None => default_download_directory(),
        }
    }

    pub fn yt_dlp_path(&self) -> Option<PathBuf> {
        self.download.yt_dlp.as_deref().map(expand_path)
    }
}

fn default_download_directory() -> PathBuf {
    dirs::audio_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Music")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Spotidry")
}

/// Expand ~ to home directory
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}

const DEFAULT_CONFIG: &str = r#"# Spotify app credentials, see https://developer.spotify.com/dashboard
# Can also be given through SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET.
# [spotify]
# client_id = ""
# client_secret = ""

[download]
# directory = "~/Music/Spotidry"
audio_format = "mp3"
concurrency = 4
# yt_dlp = "/usr/local/bin/yt-dlp"
"#;
