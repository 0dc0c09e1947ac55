use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use video_asset_fetcher::utils::logging::init_tracing;
use video_asset_fetcher::{build_manager, FetcherConfig, NAME, VERSION};

/// Download 360p/720p renditions and thumbnails for a list of video links
#[derive(Parser, Debug)]
#[command(name = "video-asset-fetcher", version, about)]
struct Cli {
    /// Project directory that relative paths are resolved against
    #[arg(long)]
    project_root: Option<PathBuf>,

    /// Links file (one URL per line)
    #[arg(long)]
    links: Option<PathBuf>,

    /// Assets directory, relative to the project root
    #[arg(long)]
    assets_dir: Option<PathBuf>,

    /// Manifest file
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// yt-dlp executable
    #[arg(long = "yt-dlp")]
    ytdlp: Option<PathBuf>,

    /// Browser to read cookies from when the site answers 403
    #[arg(long)]
    cookies_from_browser: Option<String>,

    /// Stamp updatedAt with the current time on every manifest save
    #[arg(long, default_value_t = false)]
    refresh_updated_at: bool,

    /// Debug logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

impl Cli {
    fn apply(self, mut config: FetcherConfig) -> FetcherConfig {
        if let Some(root) = self.project_root {
            config.project_root = root;
        }
        if let Some(links) = self.links {
            config.links_file = links;
        }
        if let Some(assets_dir) = self.assets_dir {
            config.assets_dir = assets_dir;
        }
        if let Some(manifest) = self.manifest {
            config.manifest_path = manifest;
        }
        if let Some(ytdlp) = self.ytdlp {
            config.youtube.ytdlp_bin = ytdlp;
        }
        if self.cookies_from_browser.is_some() {
            config.youtube.cookies_from_browser = self.cookies_from_browser;
        }
        if self.refresh_updated_at {
            config.refresh_updated_at = true;
        }
        config
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = FetcherConfig::load(cli.config.as_deref())?;
    let config = cli.apply(config);
    config.validate().context("Invalid configuration")?;

    let manager = build_manager(config).context("Failed to set up downloaders")?;
    manager.run().await?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    info!("📚 {} v{}", NAME, VERSION);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("❌ {:#}", e);
            ExitCode::FAILURE
        }
    }
}
