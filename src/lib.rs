//! # favlist-dl
//!
//! Library for mirroring video collections (favourites folders) to local disk.
//!
//! ## Design Philosophy
//!
//! favlist-dl is designed to be:
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Bounded** - A fixed number of workers and a fixed-size queue, so memory and
//!   connections stay flat however large the collections are
//! - **Resumable** - Videos already on disk are skipped, so a run can simply be repeated
//! - **Event-driven** - Consumers subscribe to events, no polling required
//!
//! The remote API is not part of the crate: the embedding program implements
//! [`catalog::VideoCatalog`] on top of its authenticated session.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use favlist_dl::catalog::{ResolvedVideo, VideoCatalog};
//! use favlist_dl::error::CatalogError;
//! use favlist_dl::{CollectionSync, Config, run_with_shutdown};
//!
//! struct MyCatalog;
//!
//! #[async_trait::async_trait]
//! impl VideoCatalog for MyCatalog {
//!     async fn list_collection_page(
//!         &self,
//!         _collection_id: i64,
//!         _page: u32,
//!         _page_size: u32,
//!     ) -> favlist_dl::Result<Vec<String>> {
//!         Ok(Vec::new())
//!     }
//!
//!     async fn resolve_video(
//!         &self,
//!         _id: &str,
//!         _quality_tier: u32,
//!     ) -> favlist_dl::Result<ResolvedVideo> {
//!         Err(CatalogError::Permanent("not implemented".into()).into())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.json")?;
//!     let sync = CollectionSync::with_http_source(Arc::new(config), Arc::new(MyCatalog))?;
//!
//!     // Subscribe to events
//!     let mut events = sync.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let report = run_with_shutdown(&sync).await?;
//!     println!("downloaded {} videos", report.pool.downloaded);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Remote catalog abstraction
pub mod catalog;
/// Configuration types
pub mod config;
/// Single-video downloader and worker pool
pub mod downloader;
/// Error types
pub mod error;
/// Collection discovery and pipeline orchestration
pub mod orchestrator;
/// Quality label to tier mapping
pub mod quality;
/// Retry logic with exponential backoff
pub mod retry;
/// Core types and events
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use catalog::{ResolvedVideo, VideoCatalog};
pub use config::{Config, HttpConfig, RetryConfig};
pub use downloader::{HttpSource, MediaSource, QueueSender, VideoDownloader, WorkerPool};
pub use error::{CatalogError, DownloadError, Error, Result};
pub use orchestrator::CollectionSync;
pub use types::{DownloadOutcome, Event, PoolSummary, SyncReport, VideoInfo};

/// Run a collection sync with graceful signal handling.
///
/// The sync runs until it finishes on its own or a termination signal arrives. On a
/// signal, discovery stops, the queue is closed and the downloads already queued are
/// completed before the report is returned.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
pub async fn run_with_shutdown(sync: &CollectionSync) -> Result<SyncReport> {
    let run = sync.run();
    tokio::pin!(run);

    tokio::select! {
        result = &mut run => return result,
        _ = wait_for_signal() => {
            tracing::info!("Stopping discovery, waiting for queued downloads to finish");
            sync.shutdown_token().cancel();
        }
    }

    run.await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration may fail in restricted environments (containers, tests)
    match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), Ok(mut sigint)) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            sigint.recv().await;
            tracing::info!("Received SIGINT signal (Ctrl+C)");
        }
        (Ok(mut sigterm), Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            sigterm.recv().await;
            tracing::info!("Received SIGTERM signal");
        }
        (Err(e), Err(_)) => {
            tracing::error!(error = %e, "Could not register any signal handlers, using ctrl_c fallback");
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
