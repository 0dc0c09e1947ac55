//! Fetch pipeline
//!
//! Processes the link list strictly one URL at a time: metadata, both
//! renditions, thumbnail, then a manifest write. Errors are split three ways:
//! metadata failures abort the run, rendition failures drop the current item,
//! thumbnail failures only blank the entry's thumbnail.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::core::config::FetcherConfig;
use crate::core::downloader::ThumbnailSource;
use crate::core::layout::{AssetLayout, Rendition};
use crate::core::manifest::ManifestStore;
use crate::core::models::{
    AppError, AppResult, EntryDraft, ItemOutcome, RunSummary, VideoMetadata,
};
use crate::core::youtube_downloader::MediaSource;
use crate::parsers::link_parser::read_links;
use crate::utils::file_utils::ensure_dir_exists;

pub struct FetchManager {
    config: FetcherConfig,
    media: Arc<dyn MediaSource>,
    thumbnails: Arc<dyn ThumbnailSource>,
}

impl FetchManager {
    pub fn new(
        config: FetcherConfig,
        media: Arc<dyn MediaSource>,
        thumbnails: Arc<dyn ThumbnailSource>,
    ) -> Self {
        Self {
            config,
            media,
            thumbnails,
        }
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Read the configured links file and process every URL in it
    pub async fn run(&self) -> AppResult<RunSummary> {
        let links = read_links(&self.config.links_path())?;
        if links.is_empty() {
            warn!(
                "⚠️  No URLs found in {}",
                self.config.links_path().display()
            );
            return Ok(RunSummary::default());
        }

        let mut store = ManifestStore::load(self.config.manifest_file())?
            .with_refresh_updated_at(self.config.refresh_updated_at);
        let summary = self.process_all(&links, &mut store).await?;

        store.save()?;
        info!(
            "✅  All done! 🎉 {} added, {} skipped, {} already recorded, {} items in manifest",
            summary.added, summary.skipped, summary.already_recorded, summary.manifest_items
        );
        Ok(summary)
    }

    /// Process `links` in order against an already loaded manifest
    pub async fn process_all(
        &self,
        links: &[String],
        store: &mut ManifestStore,
    ) -> AppResult<RunSummary> {
        let start_index = store.next_index();
        let mut recorded = store.recorded_links();
        let mut summary = RunSummary {
            urls: links.len(),
            ..RunSummary::default()
        };

        for (offset, url) in links.iter().enumerate() {
            let index = start_index + offset;

            // each stored entry accounts for one occurrence of its link
            if let Some(remaining) = recorded.get_mut(url).filter(|count| **count > 0) {
                *remaining -= 1;
                info!("⏩  [{}] {} is already in the manifest", index, url);
                summary.already_recorded += 1;
                continue;
            }

            match self.process_url(index, url, store).await? {
                ItemOutcome::Added { .. } => summary.added += 1,
                ItemOutcome::Skipped { .. } => summary.skipped += 1,
            }
        }

        summary.manifest_items = store.len();
        Ok(summary)
    }

    /// Process one URL; only a metadata failure is returned as an error
    pub async fn process_url(
        &self,
        index: usize,
        url: &str,
        store: &mut ManifestStore,
    ) -> AppResult<ItemOutcome> {
        info!("🔎  Processing [{}] {}", index, url);

        let metadata = self.media.fetch_metadata(url).await.map_err(|e| {
            error!("❌ Metadata fetch failed for {}: {}", url, e);
            e
        })?;
        debug!(
            "Metadata for {}: id={:?} page={:?} duration={}s tags={}",
            url,
            metadata.id,
            metadata.webpage_url,
            metadata.duration_sec,
            metadata.tags.len()
        );

        let title = metadata
            .title
            .clone()
            .unwrap_or_else(|| format!("video_{}", index));
        let layout = AssetLayout::resolve(&self.config, index, &title);

        if layout.videos_complete() {
            info!(
                "⏩  Files for '{}' already exist. Skipping download.",
                layout.base_name
            );
        } else if let Err(e) = self.download_renditions(url, &layout).await {
            error!("❌  Failed to download video for {}: {}", url, e);
            return Ok(ItemOutcome::Skipped {
                index,
                reason: e.to_string(),
            });
        } else {
            info!(
                "✅  Saved video files: {}, {}",
                layout.video_360.file_name(),
                layout.video_720.file_name()
            );
        }

        let thumbnail_url = self.fetch_thumbnail(&metadata, &layout).await;

        let draft = EntryDraft {
            source_url: url.to_string(),
            title,
            description: metadata.description,
            duration_sec: metadata.duration_sec,
            thumbnail_url,
            tags: metadata.tags,
        };

        let entry_id = store.append(draft, &layout)?.id;
        info!("📝  Manifest entry added for '{}'.", layout.base_name);
        store.save()?;

        Ok(ItemOutcome::Added { index, entry_id })
    }

    async fn download_renditions(&self, url: &str, layout: &AssetLayout) -> AppResult<()> {
        for rendition in Rendition::ALL {
            let dest = layout.video(rendition);
            if dest.exists() {
                info!("⏩  {} already exists: {}", rendition.label(), dest.file_name());
                continue;
            }

            let output_dir = dest.dir();
            ensure_dir_exists(output_dir).map_err(|e| AppError::Download(e.to_string()))?;

            let produced = self
                .media
                .download_rendition(url, rendition, output_dir)
                .await?;
            publish(&produced, &dest.path).await?;
        }
        Ok(())
    }

    /// Returns the manifest thumbnail URL, or an empty string
    async fn fetch_thumbnail(&self, metadata: &VideoMetadata, layout: &AssetLayout) -> String {
        let thumb = &layout.thumbnail;

        match metadata.thumbnail_url.as_deref() {
            Some(_) if thumb.exists() => {
                info!("⏩  Thumbnail already exists: {}", thumb.file_name());
            }
            Some(source) => match self.thumbnails.fetch_to(source, &thumb.path).await {
                Ok(_) => info!("✅  Saved thumbnail: {}", thumb.file_name()),
                Err(e) => {
                    warn!("⚠️  Could not download thumbnail: {}", e);
                    return String::new();
                }
            },
            None => warn!("⚠️  No thumbnail URL found in metadata."),
        }

        if thumb.exists() {
            thumb.url.clone()
        } else {
            String::new()
        }
    }
}

/// Move a finished download onto its deterministic name
async fn publish(produced: &Path, dest: &Path) -> AppResult<()> {
    if produced != dest {
        tokio::fs::rename(produced, dest).await?;
    }
    Ok(())
}
