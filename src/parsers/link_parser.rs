//! Link list parsing
//!
//! The input is a plain text file with one URL per line. Lines copied out of
//! a diff keep their leading `+`, which is tolerated.

use std::path::Path;
use tracing::debug;

use crate::core::models::{AppError, AppResult};
use crate::utils::validation::looks_like_link;

/// Read and filter the links file
pub fn read_links(path: &Path) -> AppResult<Vec<String>> {
    if !path.is_file() {
        return Err(AppError::LinksNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    let links = parse_links(&content);
    debug!("Read {} links from {}", links.len(), path.display());
    Ok(links)
}

/// Keep every line that looks like a URL once whitespace and a single
/// leading `+` are stripped; order and duplicates are preserved
pub fn parse_links(content: &str) -> Vec<String> {
    content.lines().filter_map(normalize_line).collect()
}

fn normalize_line(line: &str) -> Option<String> {
    let trimmed = line.trim();
    let unmarked = trimmed.strip_prefix('+').unwrap_or(trimmed).trim();
    looks_like_link(unmarked).then(|| unmarked.to_string())
}
