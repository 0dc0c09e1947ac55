//! Fetcher configuration management
//!
//! All filesystem locations are resolved once from a [`FetcherConfig`] and
//! passed explicitly to the components that need them.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FetcherConfig {
    /// Directory every relative path below is resolved against
    pub project_root: PathBuf,
    /// Newline-delimited list of source URLs, relative to the project root
    pub links_file: PathBuf,
    /// Root of the rendition/image tree, relative to the project root
    pub assets_dir: PathBuf,
    /// Manifest location, relative to the project root
    pub manifest_path: PathBuf,
    pub youtube: YoutubeConfig,
    pub http: HttpConfig,
    /// Stamp `updatedAt` with the current time on every save
    pub refresh_updated_at: bool,
}

/// Settings for the yt-dlp collaborator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct YoutubeConfig {
    pub ytdlp_bin: PathBuf,
    /// Passed as `--cookies-from-browser`, e.g. "chrome"
    pub cookies_from_browser: Option<String>,
}

/// Settings for the thumbnail HTTP client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            links_file: PathBuf::from("link.md"),
            assets_dir: PathBuf::from("assets").join("videos"),
            manifest_path: PathBuf::from("assets").join("data").join("manifest.json"),
            youtube: YoutubeConfig::default(),
            http: HttpConfig::default(),
            refresh_updated_at: false,
        }
    }
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            ytdlp_bin: PathBuf::from("yt-dlp"),
            cookies_from_browser: None,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: crate::utils::network::DEFAULT_TIMEOUT.as_secs(),
            user_agent: crate::utils::network::get_user_agent().to_string(),
        }
    }
}

impl FetcherConfig {
    /// Default configuration for a given project directory
    pub fn for_project(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            ..Self::default()
        }
    }

    /// Load configuration from an explicit file, or from the per-user
    /// location when it exists, falling back to defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => {
                let user_path = Self::get_config_path()?;
                if user_path.is_file() {
                    Self::load_from(&user_path)
                } else {
                    tracing::debug!("No configuration file at {:?}, using defaults", user_path);
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration from a JSON file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: FetcherConfig =
            serde_json::from_str(&content).with_context(|| "Failed to parse config file")?;

        tracing::info!("Loaded configuration from: {:?}", path);
        Ok(config)
    }

    /// Get the path to the per-user configuration file
    pub fn get_config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("com", "videoassetfetcher", "fetcher")
            .with_context(|| "Failed to get project directories")?;

        Ok(project_dirs.config_dir().join("config.json"))
    }

    /// Export configuration as JSON string
    pub fn export(&self) -> Result<String> {
        serde_json::to_string_pretty(self).with_context(|| "Failed to export configuration")
    }

    pub fn links_path(&self) -> PathBuf {
        self.project_root.join(&self.links_file)
    }

    pub fn assets_root(&self) -> PathBuf {
        self.project_root.join(&self.assets_dir)
    }

    pub fn manifest_file(&self) -> PathBuf {
        self.project_root.join(&self.manifest_path)
    }

    /// Assets directory as it appears in manifest URLs (always `/`-separated)
    pub fn assets_url_prefix(&self) -> String {
        crate::utils::file_utils::to_url_path(&self.assets_dir)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.links_file.as_os_str().is_empty() {
            anyhow::bail!("Links file must not be empty");
        }

        if self.manifest_path.as_os_str().is_empty() {
            anyhow::bail!("Manifest path must not be empty");
        }

        if self.assets_dir.is_absolute() {
            anyhow::bail!(
                "Assets directory must be relative to the project root: {:?}",
                self.assets_dir
            );
        }

        if self.youtube.ytdlp_bin.as_os_str().is_empty() {
            anyhow::bail!("yt-dlp binary must not be empty");
        }

        if let Some(ref browser) = self.youtube.cookies_from_browser {
            if browser.trim().is_empty() {
                anyhow::bail!("Cookies browser must not be blank when set");
            }
        }

        if self.http.timeout_seconds == 0 || self.http.timeout_seconds > 300 {
            anyhow::bail!("Timeout should be between 1 and 300 seconds");
        }

        Ok(())
    }
}
