use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

use crate::model::SourceMatch;
use crate::ports::source::{AudioSource, SourceError};

const PROGRESS_MARKER: &str = "spotidry-progress";
const PROGRESS_TEMPLATE: &str = "download:spotidry-progress %(progress._percent_str)s";
const SEARCH_TEMPLATE: &str = "%(id)s\t%(title)s\t%(webpage_url)s";

/// Finds and downloads audio from YouTube through the `yt-dlp` binary.
#[derive(Debug, Clone)]
pub struct YtDlp {
    binary: PathBuf,
    audio_format: String,
}

impl YtDlp {
    /// Use `binary` if given, otherwise look `yt-dlp` up in PATH.
    pub fn locate(binary: Option<&Path>, audio_format: &str) -> Result<Self, SourceError> {
        let binary = match binary {
            Some(binary) => binary.to_path_buf(),
            None => which::which("yt-dlp")
                .map_err(|_| SourceError::NotInstalled("yt-dlp".to_string()))?,
        };
        log::debug!("Using yt-dlp at {}", binary.display());
        Ok(Self {
            binary,
            audio_format: audio_format.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl AudioSource for YtDlp {
    async fn search(&self, query: &str) -> Result<SourceMatch, SourceError> {
        let output = Command::new(&self.binary)
            .args(["--skip-download", "--no-warnings", "--print", SEARCH_TEMPLATE])
            .arg(format!("ytsearch1:{query}"))
            .output()
            .await?;

        if !output.status.success() {
            return Err(SourceError::Failed {
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        parse_search_output(&String::from_utf8_lossy(&output.stdout)).ok_or_else(|| {
            SourceError::NoMatch {
                query: query.to_string(),
            }
        })
    }

    async fn download(
        &self,
        source: &SourceMatch,
        directory: &Path,
        file_stem: &str,
        progress: mpsc::UnboundedSender<f64>,
    ) -> Result<PathBuf, SourceError> {
        let template = directory.join(format!("{}.%(ext)s", sanitize_file_stem(file_stem)));
        let mut child = Command::new(&self.binary)
            .args(["-x", "--audio-format", self.audio_format.as_str()])
            .args(["--no-playlist", "--newline", "--no-warnings"])
            .args(["--progress-template", PROGRESS_TEMPLATE])
            .arg("-o")
            .arg(&template)
            .arg(&source.url)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let (forwarded, stderr) = tokio::join!(
            forward_progress(stdout, &progress),
            read_all(stderr)
        );
        forwarded?;
        let status = child.wait().await?;

        if !status.success() {
            return Err(SourceError::Failed { stderr: stderr? });
        }

        Ok(self.output_path(directory, file_stem))
    }

    fn output_path(&self, directory: &Path, file_stem: &str) -> PathBuf {
        directory.join(format!(
            "{}.{}",
            sanitize_file_stem(file_stem),
            self.audio_format
        ))
    }
}

async fn forward_progress(
    stdout: Option<impl AsyncRead + Unpin>,
    progress: &mpsc::UnboundedSender<f64>,
) -> std::io::Result<()> {
    let Some(stdout) = stdout else {
        return Ok(());
    };
    let mut lines = BufReader::new(stdout).lines();
    while let Some(line) = lines.next_line().await? {
        if let Some(fraction) = parse_progress_line(&line) {
            let _ = progress.send(fraction);
        }
    }
    Ok(())
}

async fn read_all(stderr: Option<impl AsyncRead + Unpin>) -> std::io::Result<String> {
    let mut text = String::new();
    if let Some(mut stderr) = stderr {
        stderr.read_to_string(&mut text).await?;
    }
    Ok(text)
}

/// `spotidry-progress  42.3%` → `0.423`. Anything else → `None`.
pub fn parse_progress_line(line: &str) -> Option<f64> {
    let rest = line.trim().strip_prefix(PROGRESS_MARKER)?;
    let number: String = rest
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let percent: f64 = number.parse().ok()?;
    Some((percent / 100.0).clamp(0.0, 1.0))
}

/// First `id\ttitle\turl` line printed by a search.
pub fn parse_search_output(stdout: &str) -> Option<SourceMatch> {
    stdout.lines().find_map(|line| {
        let mut fields = line.trim_end().splitn(3, '\t');
        let id = fields.next()?.trim();
        let title = fields.next()?.trim();
        let url = fields.next()?.trim();
        if id.is_empty() || url.is_empty() {
            return None;
        }
        Some(SourceMatch {
            id: id.to_string(),
            title: title.to_string(),
            url: url.to_string(),
        })
    })
}

/// Replace characters that aren't allowed in file names on common file systems.
pub fn sanitize_file_stem(stem: &str) -> String {
    let sanitized: String = stem
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    sanitized.trim().trim_end_matches('.').to_string()
}
