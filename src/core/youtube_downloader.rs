//! YouTube Downloader Module
//!
//! Wraps the external `yt-dlp` binary behind the [`MediaSource`] trait. The
//! tool is used in two modes: a JSON metadata dump, and a rendition download
//! that reports the final file path on stdout.

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

use crate::core::config::YoutubeConfig;
use crate::core::layout::{Rendition, VIDEO_EXTENSION};
use crate::core::models::{duration_from_json, AppError, AppResult, VideoMetadata};

/// Retrieval collaborator used by the fetch pipeline
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Descriptive metadata for a single video
    async fn fetch_metadata(&self, url: &str) -> AppResult<VideoMetadata>;

    /// Download one rendition into `output_dir` and return the produced file
    async fn download_rendition(
        &self,
        url: &str,
        rendition: Rendition,
        output_dir: &Path,
    ) -> AppResult<PathBuf>;
}

/// `yt-dlp` backed media source
pub struct YoutubeDownloader {
    config: YoutubeConfig,
}

impl YoutubeDownloader {
    pub fn new(config: YoutubeConfig) -> Self {
        Self { config }
    }

    fn base_command(&self) -> Command {
        let mut cmd = Command::new(&self.config.ytdlp_bin);
        if let Some(ref browser) = self.config.cookies_from_browser {
            cmd.arg("--cookies-from-browser").arg(browser);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    async fn run(&self, mut cmd: Command) -> AppResult<String> {
        let output = cmd
            .output()
            .await
            .map_err(|e| AppError::Youtube(format!("Failed to run yt-dlp: {}", e)))?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::Youtube(format!(
                "yt-dlp failed ({}): {}",
                output.status,
                error.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl MediaSource for YoutubeDownloader {
    async fn fetch_metadata(&self, url: &str) -> AppResult<VideoMetadata> {
        debug!("🔍 Fetching video info for URL: {}", url);

        let mut cmd = self.base_command();
        cmd.args(["--dump-json", "--no-warnings", "--no-playlist", url]);

        let stdout = self.run(cmd).await?;
        let json_value: Value = serde_json::from_str(stdout.trim())
            .map_err(|e| AppError::Youtube(format!("Failed to parse yt-dlp output: {}", e)))?;

        Ok(parse_metadata_from_json(&json_value))
    }

    async fn download_rendition(
        &self,
        url: &str,
        rendition: Rendition,
        output_dir: &Path,
    ) -> AppResult<PathBuf> {
        info!("⬇️  Downloading {} → {}", rendition.label(), url);

        let mut cmd = self.base_command();
        cmd.arg("-f")
            .arg(format_selector(rendition))
            .arg("--merge-output-format")
            .arg(VIDEO_EXTENSION)
            .arg("--no-playlist")
            .arg("-o")
            .arg(output_template(output_dir, rendition))
            .arg("--print")
            .arg("after_move:filepath")
            .arg(url);

        let stdout = self.run(cmd).await?;
        resolve_reported_path(&stdout)
    }
}

/// Best video not taller than the rendition plus best audio, falling back to
/// the best pre-merged stream within the same bound
pub fn format_selector(rendition: Rendition) -> String {
    let height = rendition.height();
    format!(
        "bestvideo[height<={}]+bestaudio/best[height<={}]",
        height, height
    )
}

/// `<dir>/<native id>_<height>p.<ext>`
pub fn output_template(output_dir: &Path, rendition: Rendition) -> PathBuf {
    output_dir.join(format!("%(id)s_{}.%(ext)s", rendition.label()))
}

/// The download must report exactly one existing file in the stored container
pub fn resolve_reported_path(stdout: &str) -> AppResult<PathBuf> {
    let mut paths: Vec<&str> = stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    paths.dedup();

    match paths.as_slice() {
        [] => Err(AppError::Download(
            "yt-dlp did not report an output file".to_string(),
        )),
        [single] => {
            let path = PathBuf::from(*single);
            let extension = path.extension().and_then(|ext| ext.to_str());
            if extension != Some(VIDEO_EXTENSION) {
                Err(AppError::Download(format!(
                    "yt-dlp produced {} instead of an .{} file",
                    path.display(),
                    VIDEO_EXTENSION
                )))
            } else if path.is_file() {
                Ok(path)
            } else {
                Err(AppError::Download(format!(
                    "yt-dlp reported {} but no such file exists",
                    path.display()
                )))
            }
        }
        many => Err(AppError::Download(format!(
            "yt-dlp reported {} output files, expected one",
            many.len()
        ))),
    }
}

/// Extract the fields the pipeline uses; absent values fall back to defaults
pub fn parse_metadata_from_json(json: &Value) -> VideoMetadata {
    let text = |key: &str| {
        json.get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .filter(|value| !value.is_empty())
    };

    let tags = json
        .get("tags")
        .and_then(Value::as_array)
        .map(|tags| {
            tags.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    VideoMetadata {
        id: text("id"),
        title: text("title"),
        description: text("description").unwrap_or_default(),
        duration_sec: json.get("duration").map(duration_from_json).unwrap_or(0),
        thumbnail_url: text("thumbnail"),
        tags,
        webpage_url: text("webpage_url"),
    }
}
