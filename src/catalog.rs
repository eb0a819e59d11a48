//! Remote catalog abstraction.
//!
//! The pipeline never talks to the media platform's API directly. Whoever embeds
//! the crate provides a [`VideoCatalog`] that already carries an authenticated
//! session; the orchestrator only lists collection pages and resolves videos
//! through it.

use crate::error::Result;
use crate::types::VideoInfo;

/// Description of a video as returned by the catalog
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedVideo {
    /// Video title
    pub title: String,
    /// Video description
    pub description: String,
    /// Uploader name
    pub author: String,
    /// Duration in seconds
    pub duration_secs: u64,
    /// Identifier of the playback stream that was resolved
    pub stream_id: i64,
    /// Stream URLs in order of preference (progressive first, then DASH video)
    pub candidate_urls: Vec<String>,
}

impl ResolvedVideo {
    /// Turn the catalog description into a work item
    ///
    /// The first non-blank candidate becomes the download URL; when there is none
    /// the URL is left empty and [`VideoInfo::has_stream`] reports `false`.
    pub fn into_video_info(self, id: &str, quality: &str) -> VideoInfo {
        let download_url = self
            .candidate_urls
            .into_iter()
            .find(|url| !url.trim().is_empty())
            .unwrap_or_default();

        VideoInfo {
            id: id.to_string(),
            title: self.title,
            description: self.description,
            author: self.author,
            duration_secs: self.duration_secs,
            stream_id: self.stream_id,
            quality: quality.to_string(),
            download_url,
        }
    }
}

/// Remote API collaborator consumed by the orchestrator.
///
/// Implementations should map temporary failures (rate limits, timeouts) to
/// [`crate::error::CatalogError::Transient`] so that the orchestrator retries them.
#[async_trait::async_trait]
pub trait VideoCatalog: Send + Sync {
    /// List one page (1-based) of video ids in a collection
    ///
    /// An empty page marks the end of the collection.
    async fn list_collection_page(
        &self,
        collection_id: i64,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<String>>;

    /// Describe a video and resolve its stream URLs for the given quality tier
    async fn resolve_video(&self, id: &str, quality_tier: u32) -> Result<ResolvedVideo>;
}
