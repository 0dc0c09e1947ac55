//! Manifest persistence
//!
//! The manifest is loaded once per run, appended to after every processed
//! item and written back in full. Writes go through a temporary file in the
//! same directory so a crash never leaves a truncated manifest behind.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::layout::{AssetLayout, Rendition};
use crate::core::models::{
    AppError, AppResult, DownloadInfo, EntryDraft, Manifest, ManifestEntry, Quality,
};
use crate::utils::file_utils::size_mb_ceil;

pub struct ManifestStore {
    path: PathBuf,
    manifest: Manifest,
    refresh_updated_at: bool,
}

impl ManifestStore {
    /// Load the manifest at `path`, or start from an empty skeleton
    pub fn load(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();

        let manifest = if path.is_file() {
            let content = std::fs::read_to_string(&path)?;
            let manifest: Manifest = serde_json::from_str(&content).map_err(|e| {
                AppError::Manifest(format!("Failed to parse {}: {}", path.display(), e))
            })?;
            debug!(
                "Loaded manifest {} with {} items",
                path.display(),
                manifest.items.len()
            );
            manifest
        } else {
            debug!("No manifest at {}, starting fresh", path.display());
            Manifest::default()
        };

        Ok(Self {
            path,
            manifest,
            refresh_updated_at: false,
        })
    }

    /// Stamp `updatedAt` with the current time on every save
    pub fn with_refresh_updated_at(mut self, refresh: bool) -> Self {
        self.refresh_updated_at = refresh;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn len(&self) -> usize {
        self.manifest.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.manifest.items.is_empty()
    }

    /// Index handed to the first URL of a batch
    ///
    /// Derived from the number of stored entries; URLs of the same batch get
    /// consecutive values after it whether or not they end up in the manifest.
    pub fn next_index(&self) -> usize {
        self.manifest.items.len() + 1
    }

    /// How many times each link occurs among the stored entries
    pub fn recorded_links(&self) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for link in self
            .manifest
            .items
            .iter()
            .filter_map(|item| item.get("sourceUrl").and_then(Value::as_str))
            .filter(|link| !link.is_empty())
        {
            *counts.entry(link.to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Build an entry from the item's fields and the files present on disk
    pub fn append(&mut self, draft: EntryDraft, layout: &AssetLayout) -> AppResult<ManifestEntry> {
        let entry = ManifestEntry {
            id: Uuid::new_v4().to_string(),
            title: draft.title,
            description: draft.description,
            duration_sec: draft.duration_sec,
            thumbnail_url: draft.thumbnail_url,
            stream_url: resolve_stream_url(layout),
            download: DownloadInfo {
                qualities: collect_qualities(layout)?,
            },
            tags: draft.tags,
            source_url: draft.source_url,
        };

        let value = serde_json::to_value(&entry)
            .map_err(|e| AppError::Manifest(format!("Failed to serialize entry: {}", e)))?;
        self.manifest.items.push(value);
        Ok(entry)
    }

    /// Serialize the whole manifest over the destination file
    pub fn save(&mut self) -> AppResult<()> {
        if self.refresh_updated_at {
            self.manifest.updated_at =
                chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        }

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let mut content = serde_json::to_string_pretty(&self.manifest)
            .map_err(|e| AppError::Manifest(format!("Failed to serialize manifest: {}", e)))?;
        content.push('\n');

        let mut temp = NamedTempFile::new_in(&dir)?;
        temp.write_all(content.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| AppError::Io(e.error))?;

        info!("🗂️  Manifest saved to {}", self.path.display());
        Ok(())
    }
}

/// 720p when present, else 360p, else empty
pub fn resolve_stream_url(layout: &AssetLayout) -> String {
    [Rendition::P720, Rendition::P360]
        .into_iter()
        .map(|rendition| layout.video(rendition))
        .find(|asset| asset.exists())
        .map(|asset| asset.url.clone())
        .unwrap_or_default()
}

/// One quality record per rendition file on disk, in download order
pub fn collect_qualities(layout: &AssetLayout) -> AppResult<Vec<Quality>> {
    let mut qualities = Vec::new();
    for rendition in Rendition::ALL {
        let asset = layout.video(rendition);
        if !asset.exists() {
            continue;
        }
        let bytes = std::fs::metadata(&asset.path)?.len();
        qualities.push(Quality {
            label: rendition.label().to_string(),
            url: asset.url.clone(),
            size_mb: size_mb_ceil(bytes),
        });
    }
    Ok(qualities)
}
