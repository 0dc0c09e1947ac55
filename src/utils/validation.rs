//! URL and input validation utilities

use anyhow::{anyhow, Result};
use url::Url;

/// Validate that a string is an absolute http(s) URL
pub fn validate_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|e| anyhow!("Invalid URL format: {}", e))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(anyhow!("Unsupported URL scheme: {}", other)),
    }
}

/// Link list filter: the line must start with the literal `http` prefix
pub fn looks_like_link(line: &str) -> bool {
    !line.is_empty() && line.starts_with("http")
}
