//! HTTP download engine
//!
//! Streams a single resource (the video thumbnail) to disk. Bytes go to a
//! `.part` sibling first and are renamed onto the destination only once the
//! body has been fully received.

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::core::config::HttpConfig;
use crate::core::models::{AppError, AppResult};
use crate::utils::validation::validate_url;

/// Thumbnail retrieval collaborator used by the fetch pipeline
#[async_trait]
pub trait ThumbnailSource: Send + Sync {
    /// Fetch `url` into `dest`, returning the number of bytes written
    async fn fetch_to(&self, url: &str, dest: &Path) -> AppResult<u64>;
}

/// Streaming HTTP downloader
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    /// Build the client with the configured timeout and user agent
    pub fn new(config: &HttpConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self { client })
    }

    async fn stream_to(&self, url: &str, part_path: &Path) -> AppResult<u64> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let total_size = response.content_length();

        let mut file = File::create(part_path).await?;
        let mut stream = response.bytes_stream();
        let mut downloaded = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;
        }

        file.flush().await?;
        file.sync_all().await?;

        match total_size {
            Some(total) if total != downloaded => {
                return Err(AppError::Download(format!(
                    "received {} of {} bytes",
                    downloaded, total
                )));
            }
            Some(total) => debug!("{} bytes of {} received", downloaded, total),
            None => debug!("{} bytes received", downloaded),
        }

        Ok(downloaded)
    }
}

#[async_trait]
impl ThumbnailSource for HttpDownloader {
    async fn fetch_to(&self, url: &str, dest: &Path) -> AppResult<u64> {
        validate_url(url).map_err(|e| AppError::Download(e.to_string()))?;

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let part_path = part_path(dest);
        match self.stream_to(url, &part_path).await {
            Ok(bytes) => {
                tokio::fs::rename(&part_path, dest).await?;
                Ok(bytes)
            }
            Err(e) => {
                tokio::fs::remove_file(&part_path).await.ok();
                Err(e)
            }
        }
    }
}

/// `<dest>.part`
pub fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("download"));
    name.push(".part");
    dest.with_file_name(name)
}
