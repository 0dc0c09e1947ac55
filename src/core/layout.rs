//! Deterministic naming of downloaded assets
//!
//! Every asset path is a pure function of the running index and the raw
//! title, so a second run over the same list lands on the same files.

use std::path::{Path, PathBuf};

use crate::core::config::FetcherConfig;
use crate::utils::file_utils::sanitize_title;

/// Subdirectory holding thumbnails
pub const IMAGES_DIR: &str = "images";

/// Container every rendition is stored in
pub const VIDEO_EXTENSION: &str = "mp4";

/// The two video renditions fetched for every item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rendition {
    P360,
    P720,
}

impl Rendition {
    /// Download order
    pub const ALL: [Rendition; 2] = [Rendition::P360, Rendition::P720];

    /// Maximum video height requested from the retrieval tool
    pub fn height(self) -> u32 {
        match self {
            Rendition::P360 => 360,
            Rendition::P720 => 720,
        }
    }

    /// Label used in the manifest and as the subdirectory name
    pub fn label(self) -> &'static str {
        match self {
            Rendition::P360 => "360p",
            Rendition::P720 => "720p",
        }
    }
}

/// Absolute location of an asset plus its manifest-relative URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPath {
    pub path: PathBuf,
    pub url: String,
}

impl AssetPath {
    fn new(assets_root: &Path, url_prefix: &str, subdir: &str, file_name: String) -> Self {
        let url = if url_prefix.is_empty() {
            format!("{}/{}", subdir, file_name)
        } else {
            format!("{}/{}/{}", url_prefix, subdir, file_name)
        };
        Self {
            path: assets_root.join(subdir).join(file_name),
            url,
        }
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

/// Resolved paths for one item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLayout {
    pub index: usize,
    pub base_name: String,
    pub video_360: AssetPath,
    pub video_720: AssetPath,
    pub thumbnail: AssetPath,
}

impl AssetLayout {
    pub fn resolve(config: &FetcherConfig, index: usize, raw_title: &str) -> Self {
        let assets_root = config.assets_root();
        let url_prefix = config.assets_url_prefix();
        let base_name = base_name(index, raw_title);

        let video = |rendition: Rendition| {
            AssetPath::new(
                &assets_root,
                &url_prefix,
                rendition.label(),
                format!("{}_{}.{}", base_name, rendition.label(), VIDEO_EXTENSION),
            )
        };

        Self {
            index,
            video_360: video(Rendition::P360),
            video_720: video(Rendition::P720),
            thumbnail: AssetPath::new(
                &assets_root,
                &url_prefix,
                IMAGES_DIR,
                format!("{}_thumb.jpg", base_name),
            ),
            base_name,
        }
    }

    pub fn video(&self, rendition: Rendition) -> &AssetPath {
        match rendition {
            Rendition::P360 => &self.video_360,
            Rendition::P720 => &self.video_720,
        }
    }

    /// Both renditions are already on disk
    pub fn videos_complete(&self) -> bool {
        Rendition::ALL
            .iter()
            .all(|rendition| self.video(*rendition).exists())
    }
}

/// `<index>_<sanitized title>` with the index zero-padded to two digits
pub fn base_name(index: usize, raw_title: &str) -> String {
    format!("{:02}_{}", index, sanitize_title(raw_title))
}
