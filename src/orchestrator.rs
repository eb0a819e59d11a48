//! Collection sync: lists the configured collections, resolves every video through
//! the catalog and feeds the worker pool.
//!
//! The orchestrator is the only producer of the download queue. Once discovery is
//! over (or a shutdown was requested) it closes the queue and waits for the pool to
//! drain, so [`CollectionSync::run`] returns only after every worker has exited.

use crate::catalog::VideoCatalog;
use crate::config::Config;
use crate::downloader::{HttpSource, MediaSource, VideoDownloader, WorkerPool};
use crate::error::{CatalogError, Result};
use crate::quality::resolve_quality;
use crate::retry::with_retry;
use crate::types::{Event, SyncReport, VideoInfo};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Capacity of the event broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 1000;

/// Downloads every video of the configured collections
pub struct CollectionSync {
    /// Validated configuration
    config: Arc<Config>,
    /// Remote catalog carrying the authenticated session
    catalog: Arc<dyn VideoCatalog>,
    /// Where media streams are fetched from
    source: Arc<dyn MediaSource>,
    /// Event broadcast channel sender (multiple subscribers supported)
    event_tx: broadcast::Sender<Event>,
    /// Cancelled to stop discovery early
    shutdown: CancellationToken,
}

impl CollectionSync {
    /// Create a sync over explicit catalog and media source implementations
    pub fn new(
        config: Arc<Config>,
        catalog: Arc<dyn VideoCatalog>,
        source: Arc<dyn MediaSource>,
    ) -> Self {
        let (event_tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            config,
            catalog,
            source,
            event_tx,
            shutdown: CancellationToken::new(),
        }
    }

    /// Create a sync that fetches media over HTTP with the configured headers
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built from `config.http`.
    pub fn with_http_source(config: Arc<Config>, catalog: Arc<dyn VideoCatalog>) -> Result<Self> {
        let source = Arc::new(HttpSource::new(&config.http)?);
        Ok(Self::new(config, catalog, source))
    }

    /// Subscribe to pipeline events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Token that stops discovery when cancelled
    ///
    /// Items already queued are still downloaded; downloads in progress are never
    /// interrupted.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// The configuration this sync runs with
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }

    /// Run the whole pipeline to completion
    ///
    /// Per-video failures are counted in the report and never abort the run.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Config`] if the worker pool cannot be built
    /// (zero workers or zero queue capacity).
    pub async fn run(&self) -> Result<SyncReport> {
        let quality_tier = resolve_quality(&self.config.video_quality);
        let downloader = Arc::new(VideoDownloader::from_config(
            &self.config,
            Arc::clone(&self.source),
            self.event_tx.clone(),
        ));
        let (queue, pool) = WorkerPool::spawn(
            self.config.max_concurrent,
            self.config.queue_capacity(),
            downloader,
        )?;

        tracing::info!(
            collections = self.config.collection_ids.len(),
            workers = pool.worker_count(),
            quality = %self.config.video_quality,
            quality_tier,
            "Starting collection sync"
        );

        let mut report = SyncReport {
            collections: self.config.collection_ids.len(),
            ..Default::default()
        };
        let mut seen = HashSet::new();

        'collections: for &collection_id in &self.config.collection_ids {
            if self.shutdown.is_cancelled() {
                report.interrupted = true;
                break;
            }

            let ids = self.collect_collection(collection_id).await;
            tracing::info!(collection_id, videos = ids.len(), "Collection listed");

            for id in ids {
                if self.shutdown.is_cancelled() {
                    report.interrupted = true;
                    break 'collections;
                }
                if !seen.insert(id.clone()) {
                    tracing::debug!(video_id = %id, "Video already seen in this run, skipping");
                    continue;
                }
                report.discovered += 1;

                let item = match self.resolve(&id, quality_tier).await {
                    Ok(item) => item,
                    Err(e) => {
                        report.unresolved += 1;
                        tracing::warn!(video_id = %id, error = %e, "Failed to resolve video, skipping");
                        self.emit_event(Event::ResolveFailed {
                            id,
                            error: e.to_string(),
                        });
                        continue;
                    }
                };

                let enqueued = tokio::select! {
                    biased;
                    _ = self.shutdown.cancelled() => None,
                    result = queue.enqueue(item) => Some(result),
                };
                match enqueued {
                    Some(Ok(())) => report.enqueued += 1,
                    Some(Err(e)) => {
                        tracing::error!(error = %e, "Download queue rejected item, stopping discovery");
                        break 'collections;
                    }
                    None => {
                        report.interrupted = true;
                        break 'collections;
                    }
                }
            }
        }

        if report.interrupted {
            tracing::warn!(
                enqueued = report.enqueued,
                "Shutdown requested, finishing queued downloads"
            );
        }

        queue.close();
        report.pool = pool.join().await;

        tracing::info!(
            discovered = report.discovered,
            enqueued = report.enqueued,
            unresolved = report.unresolved,
            downloaded = report.pool.downloaded,
            skipped = report.pool.skipped,
            failed = report.pool.failed,
            interrupted = report.interrupted,
            "Collection sync finished"
        );
        self.emit_event(Event::Finished {
            report: report.clone(),
        });

        Ok(report)
    }

    /// List every video id of a collection, page by page until an empty page
    ///
    /// A page that still fails after retries ends the listing; the ids gathered
    /// up to that point are kept.
    async fn collect_collection(&self, collection_id: i64) -> Vec<String> {
        let page_size = self.config.page_size;
        let mut ids = Vec::new();

        for page in 1u32.. {
            if self.shutdown.is_cancelled() {
                break;
            }

            let result = with_retry(&self.config.retry, || {
                self.catalog
                    .list_collection_page(collection_id, page, page_size)
            })
            .await;

            match result {
                Ok(page_ids) if page_ids.is_empty() => break,
                Ok(page_ids) => {
                    tracing::debug!(collection_id, page, count = page_ids.len(), "Fetched collection page");
                    ids.extend(page_ids);
                }
                Err(e) => {
                    tracing::warn!(
                        collection_id,
                        page,
                        error = %e,
                        "Failed to list collection page, keeping videos found so far"
                    );
                    break;
                }
            }
        }

        ids
    }

    /// Describe one video and pick its stream URL
    async fn resolve(&self, id: &str, quality_tier: u32) -> Result<VideoInfo> {
        let resolved =
            with_retry(&self.config.retry, || self.catalog.resolve_video(id, quality_tier))
                .await?;

        let item = resolved.into_video_info(id, &self.config.video_quality);
        if !item.has_stream() {
            return Err(CatalogError::NoPlayableStream { id: id.to_string() }.into());
        }
        Ok(item)
    }
}
