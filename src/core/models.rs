//! Core data models for the video asset fetcher

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Schema version written into fresh manifests
pub const MANIFEST_VERSION: u32 = 1;

/// Timestamp used by a freshly created manifest skeleton
pub const PLACEHOLDER_UPDATED_AT: &str = "2026-01-01T00:00:00Z";

/// Descriptive metadata reported by the retrieval tool for one video

#[derive(Debug, Clone, Default, PartialEq)]

pub struct VideoMetadata {
    /// Native identifier of the source, when reported
    pub id: Option<String>,

    pub title: Option<String>,

    pub description: String,

    pub duration_sec: u64,

    pub thumbnail_url: Option<String>,

    pub tags: Vec<String>,

    pub webpage_url: Option<String>,
}

/// Persistent manifest document

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]

pub struct Manifest {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default = "default_updated_at")]
    pub updated_at: String,

    /// Stored entries, kept as written so prior runs' items are never rewritten
    #[serde(default)]
    pub items: Vec<Value>,

    /// Top-level fields this tool does not manage, preserved as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            version: MANIFEST_VERSION,

            updated_at: PLACEHOLDER_UPDATED_AT.to_string(),

            items: Vec::new(),

            extra: Map::new(),
        }
    }
}

/// One processed video inside the manifest

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]

pub struct ManifestEntry {
    pub id: String,

    pub title: String,

    pub description: String,

    pub duration_sec: u64,

    pub thumbnail_url: String,

    pub stream_url: String,

    pub download: DownloadInfo,

    pub tags: Vec<String>,

    /// Link the entry was fetched from
    #[serde(skip_serializing_if = "String::is_empty")]
    pub source_url: String,
}

/// Download descriptor of a manifest entry

#[derive(Debug, Clone, Default, Serialize, PartialEq)]

pub struct DownloadInfo {
    pub qualities: Vec<Quality>,
}

/// A rendition that exists on disk

#[derive(Debug, Clone, Serialize, PartialEq)]

pub struct Quality {
    pub label: String,

    pub url: String,

    #[serde(rename = "sizeMB")]
    pub size_mb: u64,
}

/// Computed fields of a successfully processed item, before it gets an id
#[derive(Debug, Clone)]
pub struct EntryDraft {
    pub source_url: String,
    pub title: String,
    pub description: String,
    pub duration_sec: u64,
    pub thumbnail_url: String,
    pub tags: Vec<String>,
}

/// Result of processing a single URL
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    /// An entry was appended to the manifest
    Added { index: usize, entry_id: String },

    /// The item was dropped and no entry was written
    Skipped { index: usize, reason: String },
}

/// Totals reported at the end of a run

#[derive(Debug, Clone, Default, PartialEq)]

pub struct RunSummary {
    pub urls: usize,

    pub added: usize,

    pub skipped: usize,

    pub already_recorded: usize,

    pub manifest_items: usize,
}

fn default_version() -> u32 {
    MANIFEST_VERSION
}

fn default_updated_at() -> String {
    PLACEHOLDER_UPDATED_AT.to_string()
}

/// Interpret a JSON number as whole non-negative seconds
pub fn duration_from_json(value: &Value) -> u64 {
    if let Some(secs) = value.as_u64() {
        return secs;
    }
    match value.as_f64() {
        Some(secs) if secs.is_finite() && secs > 0.0 => secs.round() as u64,
        _ => 0,
    }
}

/// Application error types

#[derive(Debug, thiserror::Error)]

pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Parsing error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Download error: {0}")]
    Download(String),

    #[error("YouTube error: {0}")]
    Youtube(String),

    #[error("Links file not found at {}", .0.display())]
    LinksNotFound(PathBuf),

    #[error("Manifest error: {0}")]
    Manifest(String),
}

/// Result type alias for application operations

pub type AppResult<T> = Result<T, AppError>;
