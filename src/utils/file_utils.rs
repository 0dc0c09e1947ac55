//! File system and naming utilities

use anyhow::{anyhow, Result};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Longest sanitized title kept in a file name
pub const MAX_TITLE_LEN: usize = 50;

const BYTES_PER_MB: u64 = 1_000_000;

/// Ensure directory exists
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .map_err(|e| anyhow!("Failed to create directory {}: {}", path.display(), e))?;
    }
    Ok(())
}

fn whitespace_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static regex"))
}

fn disallowed_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9_]+").expect("static regex"))
}

/// Make a filesystem-safe name from a video title
///
/// The result only contains `[a-z0-9_]`, is at most [`MAX_TITLE_LEN`]
/// characters long and is a fixed point of this function.
pub fn sanitize_title(title: &str) -> String {
    let lowered = title.trim().to_lowercase();
    let underscored = whitespace_run().replace_all(&lowered, "_");
    let mut cleaned = disallowed_chars().replace_all(&underscored, "").into_owned();
    // only ASCII remains, so byte length equals char count
    cleaned.truncate(MAX_TITLE_LEN);
    cleaned
}

/// Render a relative path with `/` separators for manifest URLs
pub fn to_url_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .filter(|part| !part.is_empty() && part != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Decimal megabytes rounded up to the next whole unit
pub fn size_mb_ceil(bytes: u64) -> u64 {
    bytes.div_ceil(BYTES_PER_MB)
}
