//! Fetch pipeline tests
//!
//! Drives FetchManager end to end against fake collaborators and a temporary
//! project directory.

#[cfg(test)]
mod tests {
    use super::super::config::FetcherConfig;
    use super::super::downloader::ThumbnailSource;
    use super::super::layout::{AssetLayout, Rendition};
    use super::super::manager::FetchManager;
    use super::super::manifest::ManifestStore;
    use super::super::youtube_downloader::MediaSource;
    use crate::core::models::{AppError, AppResult, ItemOutcome, VideoMetadata};
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tempfile::{tempdir, TempDir};
    use uuid::Uuid;

    /// Stands in for yt-dlp
    #[derive(Default)]
    struct FakeMedia {
        metadata: HashMap<String, VideoMetadata>,
        failing_metadata: HashSet<String>,
        failing_downloads: HashSet<(String, Rendition)>,
        metadata_calls: Mutex<Vec<String>>,
        download_calls: Mutex<Vec<(String, Rendition)>>,
    }

    impl FakeMedia {
        fn with_video(mut self, url: &str, title: Option<&str>, thumbnail: Option<&str>) -> Self {
            self.metadata.insert(
                url.to_string(),
                VideoMetadata {
                    id: Some(format!("id{}", self.metadata.len())),
                    title: title.map(str::to_string),
                    description: format!("about {}", url),
                    duration_sec: 95,
                    thumbnail_url: thumbnail.map(str::to_string),
                    tags: vec!["kids".to_string(), "songs".to_string()],
                    webpage_url: Some(url.to_string()),
                },
            );
            self
        }

        fn failing_metadata(mut self, url: &str) -> Self {
            self.failing_metadata.insert(url.to_string());
            self
        }

        fn failing_download(mut self, url: &str, rendition: Rendition) -> Self {
            self.failing_downloads.insert((url.to_string(), rendition));
            self
        }

        fn download_count(&self) -> usize {
            self.download_calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl MediaSource for FakeMedia {
        async fn fetch_metadata(&self, url: &str) -> AppResult<VideoMetadata> {
            self.metadata_calls.lock().unwrap().push(url.to_string());
            if self.failing_metadata.contains(url) {
                return Err(AppError::Youtube("yt-dlp failed (exit status: 1)".to_string()));
            }
            Ok(self.metadata.get(url).cloned().unwrap_or_default())
        }

        async fn download_rendition(
            &self,
            url: &str,
            rendition: Rendition,
            output_dir: &Path,
        ) -> AppResult<PathBuf> {
            self.download_calls
                .lock()
                .unwrap()
                .push((url.to_string(), rendition));

            if self.failing_downloads.contains(&(url.to_string(), rendition)) {
                return Err(AppError::Download(
                    "yt-dlp did not report an output file".to_string(),
                ));
            }

            let produced = output_dir.join(format!("native_{}.mp4", rendition.label()));
            let size = match rendition {
                Rendition::P360 => 400_000,
                Rendition::P720 => 1_500_001,
            };
            std::fs::write(&produced, vec![0u8; size])?;
            Ok(produced)
        }
    }

    /// Stands in for the HTTP client
    #[derive(Default)]
    struct FakeThumbnails {
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ThumbnailSource for FakeThumbnails {
        async fn fetch_to(&self, _url: &str, dest: &Path) -> AppResult<u64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AppError::Download("HTTP status 404 Not Found".to_string()));
            }
            if let Some(parent) = dest.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(dest, b"jpeg")?;
            Ok(4)
        }
    }

    struct Fixture {
        _temp_dir: TempDir,
        config: FetcherConfig,
        media: Arc<FakeMedia>,
        thumbnails: Arc<FakeThumbnails>,
    }

    impl Fixture {
        fn new(links: &str, media: FakeMedia, thumbnails: FakeThumbnails) -> Self {
            let temp_dir = tempdir().unwrap();
            let config = FetcherConfig::for_project(temp_dir.path());
            std::fs::write(config.links_path(), links).unwrap();
            Self {
                _temp_dir: temp_dir,
                config,
                media: Arc::new(media),
                thumbnails: Arc::new(thumbnails),
            }
        }

        fn manager(&self) -> FetchManager {
            FetchManager::new(
                self.config.clone(),
                self.media.clone(),
                self.thumbnails.clone(),
            )
        }

        fn manifest(&self) -> serde_json::Value {
            let raw = std::fs::read_to_string(self.config.manifest_file()).unwrap();
            serde_json::from_str(&raw).unwrap()
        }
    }

    const URL_A: &str = "https://www.youtube.com/watch?v=aaa";
    const URL_B: &str = "https://www.youtube.com/watch?v=bbb";
    const THUMB: &str = "https://i.ytimg.com/vi/aaa/hqdefault.jpg";

    #[tokio::test]
    async fn test_single_url_creates_manifest() {
        let fixture = Fixture::new(
            &format!("{}\n", URL_A),
            FakeMedia::default().with_video(URL_A, Some("Wheels On The Bus"), Some(THUMB)),
            FakeThumbnails::default(),
        );

        let summary = fixture.manager().run().await.unwrap();
        assert_eq!(summary.added, 1);
        assert_eq!(summary.manifest_items, 1);

        let manifest = fixture.manifest();
        assert_eq!(manifest["version"], 1);
        let items = manifest["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);

        let item = &items[0];
        assert!(Uuid::parse_str(item["id"].as_str().unwrap()).is_ok());
        assert_eq!(item["title"], "Wheels On The Bus");
        assert_eq!(item["durationSec"], 95);
        assert_eq!(
            item["streamUrl"],
            "assets/videos/720p/01_wheels_on_the_bus_720p.mp4"
        );
        assert_eq!(
            item["thumbnailUrl"],
            "assets/videos/images/01_wheels_on_the_bus_thumb.jpg"
        );

        let qualities = item["download"]["qualities"].as_array().unwrap();
        assert!(qualities.len() <= 2);
        assert_eq!(qualities[0]["label"], "360p");
        assert_eq!(qualities[0]["sizeMB"], 1);
        assert_eq!(qualities[1]["label"], "720p");
        assert_eq!(qualities[1]["sizeMB"], 2);

        let layout = AssetLayout::resolve(&fixture.config, 1, "Wheels On The Bus");
        assert!(layout.video_360.exists());
        assert!(layout.video_720.exists());
        assert!(layout.thumbnail.exists());
        assert!(!layout.video_360.dir().join("native_360p.mp4").exists());
    }

    #[tokio::test]
    async fn test_plus_prefixed_link_is_processed_as_plain() {
        let fixture = Fixture::new(
            "+https://example.com/x\n",
            FakeMedia::default().with_video("https://example.com/x", Some("x"), None),
            FakeThumbnails::default(),
        );

        fixture.manager().run().await.unwrap();

        assert_eq!(
            *fixture.media.metadata_calls.lock().unwrap(),
            vec!["https://example.com/x".to_string()]
        );
        assert_eq!(fixture.manifest()["items"][0]["sourceUrl"], "https://example.com/x");
    }

    #[tokio::test]
    async fn test_metadata_failure_aborts_and_keeps_manifest() {
        let fixture = Fixture::new(
            &format!("{}\n", URL_A),
            FakeMedia::default().failing_metadata(URL_A),
            FakeThumbnails::default(),
        );
        let manifest_path = fixture.config.manifest_file();
        std::fs::create_dir_all(manifest_path.parent().unwrap()).unwrap();
        let before = r#"{"version":1,"updatedAt":"2026-01-01T00:00:00Z","items":[]}"#;
        std::fs::write(&manifest_path, before).unwrap();

        let result = fixture.manager().run().await;

        assert!(matches!(result, Err(AppError::Youtube(_))));
        assert_eq!(std::fs::read_to_string(&manifest_path).unwrap(), before);
        assert_eq!(fixture.media.download_count(), 0);
    }

    #[tokio::test]
    async fn test_metadata_failure_without_manifest_writes_nothing() {
        let fixture = Fixture::new(
            URL_A,
            FakeMedia::default().failing_metadata(URL_A),
            FakeThumbnails::default(),
        );

        assert!(fixture.manager().run().await.is_err());
        assert!(!fixture.config.manifest_file().exists());
    }

    #[tokio::test]
    async fn test_thumbnail_failure_still_writes_entry() {
        let fixture = Fixture::new(
            URL_A,
            FakeMedia::default().with_video(URL_A, Some("Clip"), Some(THUMB)),
            FakeThumbnails {
                fail: true,
                ..FakeThumbnails::default()
            },
        );

        let summary = fixture.manager().run().await.unwrap();

        assert_eq!(summary.added, 1);
        let item = &fixture.manifest()["items"][0];
        assert_eq!(item["thumbnailUrl"], "");
        assert_eq!(item["streamUrl"], "assets/videos/720p/01_clip_720p.mp4");
    }

    #[tokio::test]
    async fn test_rendition_failure_skips_item_and_continues() {
        let fixture = Fixture::new(
            &format!("{}\n{}\n", URL_A, URL_B),
            FakeMedia::default()
                .with_video(URL_A, Some("First"), None)
                .with_video(URL_B, Some("Second"), None)
                .failing_download(URL_A, Rendition::P720),
            FakeThumbnails::default(),
        );

        let summary = fixture.manager().run().await.unwrap();

        assert_eq!(summary.added, 1);
        assert_eq!(summary.skipped, 1);
        let items = fixture.manifest()["items"].as_array().unwrap().clone();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["title"], "Second");
        // the skipped URL still consumed index 1
        assert_eq!(items[0]["streamUrl"], "assets/videos/720p/02_second_720p.mp4");

        // partial output of the failed item stays on disk
        let first = AssetLayout::resolve(&fixture.config, 1, "First");
        assert!(first.video_360.exists());
        assert!(!first.video_720.exists());
    }

    #[tokio::test]
    async fn test_second_run_downloads_nothing() {
        let fixture = Fixture::new(
            &format!("{}\n+{}\n", URL_A, URL_B),
            FakeMedia::default()
                .with_video(URL_A, Some("First"), Some(THUMB))
                .with_video(URL_B, Some("Second"), Some(THUMB)),
            FakeThumbnails::default(),
        );

        fixture.manager().run().await.unwrap();
        let downloads_after_first = fixture.media.download_count();
        let thumbs_after_first = fixture.thumbnails.calls.load(Ordering::SeqCst);
        let first_manifest = fixture.manifest();
        assert_eq!(downloads_after_first, 4);

        let summary = fixture.manager().run().await.unwrap();

        assert_eq!(summary.already_recorded, 2);
        assert_eq!(fixture.media.download_count(), downloads_after_first);
        assert_eq!(fixture.thumbnails.calls.load(Ordering::SeqCst), thumbs_after_first);
        assert_eq!(
            fixture.manifest()["items"].as_array().unwrap().len(),
            first_manifest["items"].as_array().unwrap().len()
        );
    }

    #[tokio::test]
    async fn test_interrupted_run_reuses_downloaded_files() {
        let fixture = Fixture::new(
            URL_A,
            FakeMedia::default().with_video(URL_A, Some("Resumed"), Some(THUMB)),
            FakeThumbnails::default(),
        );

        // files from a run that died before writing the manifest
        let layout = AssetLayout::resolve(&fixture.config, 1, "Resumed");
        for asset in [&layout.video_360, &layout.video_720, &layout.thumbnail] {
            std::fs::create_dir_all(asset.dir()).unwrap();
            std::fs::write(&asset.path, b"data").unwrap();
        }

        let summary = fixture.manager().run().await.unwrap();

        assert_eq!(summary.added, 1);
        assert_eq!(fixture.media.download_count(), 0);
        assert_eq!(fixture.thumbnails.calls.load(Ordering::SeqCst), 0);
        let item = &fixture.manifest()["items"][0];
        assert_eq!(item["thumbnailUrl"], layout.thumbnail.url.as_str());
        assert_eq!(item["download"]["qualities"][0]["sizeMB"], 1);
    }

    #[tokio::test]
    async fn test_only_missing_rendition_is_downloaded() {
        let fixture = Fixture::new(
            URL_A,
            FakeMedia::default().with_video(URL_A, Some("Half"), None),
            FakeThumbnails::default(),
        );
        let layout = AssetLayout::resolve(&fixture.config, 1, "Half");
        std::fs::create_dir_all(layout.video_360.dir()).unwrap();
        std::fs::write(&layout.video_360.path, b"low").unwrap();

        fixture.manager().run().await.unwrap();

        assert_eq!(
            *fixture.media.download_calls.lock().unwrap(),
            vec![(URL_A.to_string(), Rendition::P720)]
        );
    }

    #[tokio::test]
    async fn test_items_grow_by_batch_size_and_indices_continue() {
        let fixture = Fixture::new(
            &format!("{}\n{}\n{}\n", URL_A, URL_B, URL_A),
            FakeMedia::default()
                .with_video(URL_A, Some("Alpha"), None)
                .with_video(URL_B, None, None),
            FakeThumbnails::default(),
        );
        let manifest_path = fixture.config.manifest_file();
        std::fs::create_dir_all(manifest_path.parent().unwrap()).unwrap();
        std::fs::write(
            &manifest_path,
            r#"{"version":1,"updatedAt":"2025-12-31T00:00:00Z","items":[{"id":"legacy","title":"Legacy"}]}"#,
        )
        .unwrap();

        let summary = fixture.manager().run().await.unwrap();

        assert_eq!(summary.added, 3);
        let manifest = fixture.manifest();
        let items = manifest["items"].as_array().unwrap();
        assert_eq!(items.len(), 1 + 3);
        assert_eq!(items[0]["id"], "legacy");
        assert_eq!(manifest["updatedAt"], "2025-12-31T00:00:00Z");

        // duplicate links are recorded independently
        assert_eq!(items[1]["streamUrl"], "assets/videos/720p/02_alpha_720p.mp4");
        assert_eq!(items[3]["streamUrl"], "assets/videos/720p/04_alpha_720p.mp4");

        // missing title falls back to a synthetic one
        assert_eq!(items[2]["title"], "video_3");
        assert_eq!(items[2]["streamUrl"], "assets/videos/720p/03_video_3_720p.mp4");
    }

    #[tokio::test]
    async fn test_empty_link_list_has_no_side_effects() {
        let fixture = Fixture::new(
            "# nothing here\n\n",
            FakeMedia::default(),
            FakeThumbnails::default(),
        );

        let summary = fixture.manager().run().await.unwrap();

        assert_eq!(summary.urls, 0);
        assert!(!fixture.config.manifest_file().exists());
        assert!(!fixture.config.assets_root().exists());
        assert!(fixture.media.metadata_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_links_file_is_fatal() {
        let fixture = Fixture::new("", FakeMedia::default(), FakeThumbnails::default());
        std::fs::remove_file(fixture.config.links_path()).unwrap();

        let result = fixture.manager().run().await;

        assert!(matches!(result, Err(AppError::LinksNotFound(_))));
    }

    #[tokio::test]
    async fn test_process_url_reports_skip_reason() {
        let fixture = Fixture::new(
            "",
            FakeMedia::default()
                .with_video(URL_A, Some("Broken"), None)
                .failing_download(URL_A, Rendition::P360),
            FakeThumbnails::default(),
        );
        let mut store = ManifestStore::load(fixture.config.manifest_file()).unwrap();

        let outcome = fixture
            .manager()
            .process_url(7, URL_A, &mut store)
            .await
            .unwrap();

        match outcome {
            ItemOutcome::Skipped { index, reason } => {
                assert_eq!(index, 7);
                assert!(reason.contains("output file"));
            }
            other => panic!("expected skip, got {:?}", other),
        }
        assert!(store.is_empty());
        // the 720p attempt never happens once 360p fails
        assert_eq!(fixture.media.download_count(), 1);
    }
}
