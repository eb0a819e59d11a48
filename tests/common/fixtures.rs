//! Test fixtures: deterministic payloads, a static catalog and mock media routes

use favlist_dl::catalog::{ResolvedVideo, VideoCatalog};
use favlist_dl::config::RetryConfig;
use favlist_dl::error::CatalogError;
use favlist_dl::{Config, VideoInfo};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Deterministic payload of `len` bytes, different for every id
pub fn payload_for(id: &str, len: usize) -> Vec<u8> {
    let seed = id.bytes().fold(0u8, |acc, b| acc.wrapping_add(b));
    (0..len).map(|i| seed.wrapping_add((i % 251) as u8)).collect()
}

/// URL path a video is served from by the mock server
pub fn media_path(id: &str) -> String {
    format!("/media/{id}.mp4")
}

/// Serve `payload` for `id`, expecting exactly `expected_requests` fetches
pub async fn mount_video(server: &MockServer, id: &str, payload: Vec<u8>, expected_requests: u64) {
    Mock::given(method("GET"))
        .and(path(media_path(id)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(payload))
        .expect(expected_requests)
        .mount(server)
        .await;
}

/// Work item pointing at the mock server
pub fn video_item(server: &MockServer, id: &str) -> VideoInfo {
    VideoInfo {
        id: id.to_string(),
        title: format!("Video {id}"),
        author: "uploader".to_string(),
        duration_secs: 30,
        stream_id: 7,
        quality: "1080p".to_string(),
        download_url: format!("{}{}", server.uri(), media_path(id)),
        ..Default::default()
    }
}

/// Catalog with fixed collections whose streams live on a mock server
pub struct StaticCatalog {
    base_url: String,
    collections: HashMap<i64, Vec<String>>,
    page_size: usize,
    without_stream: HashSet<String>,
}

impl StaticCatalog {
    pub fn new(server: &MockServer, page_size: usize) -> Self {
        Self {
            base_url: server.uri(),
            collections: HashMap::new(),
            page_size,
            without_stream: HashSet::new(),
        }
    }

    pub fn collection(mut self, id: i64, videos: &[&str]) -> Self {
        self.collections
            .insert(id, videos.iter().map(|v| v.to_string()).collect());
        self
    }

    /// Resolve `id` without any playable stream
    pub fn without_stream(mut self, id: &str) -> Self {
        self.without_stream.insert(id.to_string());
        self
    }
}

#[async_trait::async_trait]
impl VideoCatalog for StaticCatalog {
    async fn list_collection_page(
        &self,
        collection_id: i64,
        page: u32,
        _page_size: u32,
    ) -> favlist_dl::Result<Vec<String>> {
        let videos = self
            .collections
            .get(&collection_id)
            .ok_or_else(|| CatalogError::Permanent(format!("no collection {collection_id}")))?;
        let start = (page as usize - 1) * self.page_size;
        Ok(videos
            .iter()
            .skip(start)
            .take(self.page_size)
            .cloned()
            .collect())
    }

    async fn resolve_video(&self, id: &str, _quality_tier: u32) -> favlist_dl::Result<ResolvedVideo> {
        let candidate_urls = if self.without_stream.contains(id) {
            Vec::new()
        } else {
            vec![String::new(), format!("{}{}", self.base_url, media_path(id))]
        };
        Ok(ResolvedVideo {
            title: format!("Video {id}"),
            description: String::new(),
            author: "uploader".to_string(),
            duration_secs: 30,
            stream_id: 7,
            candidate_urls,
        })
    }
}

/// Configuration writing below `dir`, with fast retries and per-chunk progress
pub fn test_config(dir: &Path, collections: Vec<i64>, workers: usize) -> Config {
    let mut config = Config {
        collection_ids: collections,
        download_path: dir.to_path_buf(),
        max_concurrent: workers,
        page_size: 2,
        retry: RetryConfig {
            max_attempts: 1,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            backoff_multiplier: 2.0,
            jitter: false,
        },
        ..Default::default()
    };
    config.http.progress_interval = Duration::ZERO;
    config
}
