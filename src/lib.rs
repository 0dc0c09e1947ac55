//! Video Asset Fetcher - Core Library
//!
//! Downloads 360p/720p renditions and a thumbnail for every link in a list
//! and records them in a JSON manifest.

pub mod core;
pub mod parsers;
pub mod utils;

// Re-export commonly used types
pub use crate::core::{
    config::FetcherConfig,
    downloader::{HttpDownloader, ThumbnailSource},
    layout::{AssetLayout, Rendition},
    manager::FetchManager,
    manifest::ManifestStore,
    models::{AppError, AppResult, Manifest, ManifestEntry, RunSummary, VideoMetadata},
    youtube_downloader::{MediaSource, YoutubeDownloader},
};

use std::sync::Arc;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Wire the production collaborators (yt-dlp and reqwest) into a pipeline
pub fn build_manager(config: FetcherConfig) -> AppResult<FetchManager> {
    let media = Arc::new(YoutubeDownloader::new(config.youtube.clone()));
    let thumbnails = Arc::new(HttpDownloader::new(&config.http)?);
    Ok(FetchManager::new(config, media, thumbnails))
}
