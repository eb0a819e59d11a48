//! Bounded work queue and fixed-size worker pool.
//!
//! The producer holds the only [`QueueSender`]; `K` workers share the receiving end
//! behind a mutex, so every item is received by exactly one worker. Closing the
//! sender lets the workers drain what is buffered and then exit.

use super::VideoDownloader;
use crate::error::{Error, Result};
use crate::types::{DownloadOutcome, Event, PoolSummary, VideoInfo};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, broadcast, mpsc};
use tokio::task::JoinHandle;

/// Receiving end of the queue, shared by all workers
type SharedReceiver = Arc<Mutex<mpsc::Receiver<VideoInfo>>>;

/// Outcome counters updated by the workers
#[derive(Debug, Default)]
struct PoolStats {
    downloaded: AtomicU64,
    skipped: AtomicU64,
    failed: AtomicU64,
}

impl PoolStats {
    fn snapshot(&self) -> PoolSummary {
        PoolSummary {
            downloaded: self.downloaded.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Producer handle of the download queue
///
/// Not cloneable: there is exactly one producer. [`QueueSender::close`] consumes the
/// handle, so nothing can be enqueued after closing.
#[derive(Debug)]
pub struct QueueSender {
    tx: mpsc::Sender<VideoInfo>,
    event_tx: broadcast::Sender<Event>,
}

impl QueueSender {
    /// Put an item on the queue, waiting while the queue is full
    ///
    /// Fails with [`Error::QueueClosed`] only when no worker is left to receive it.
    pub async fn enqueue(&self, item: VideoInfo) -> Result<()> {
        let id = item.id.clone();
        let title = item.title.clone();

        self.tx.send(item).await.map_err(|_| Error::QueueClosed)?;

        tracing::debug!(video_id = %id, "Video queued");
        self.event_tx.send(Event::Queued { id, title }).ok();
        Ok(())
    }

    /// Maximum number of items the queue buffers
    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }

    /// Signal that no more items will be enqueued
    ///
    /// Workers finish what is already buffered before they exit.
    pub fn close(self) {
        tracing::debug!("Download queue closed");
        drop(self.tx);
    }
}

/// Fixed set of workers consuming the download queue
#[derive(Debug)]
pub struct WorkerPool {
    workers: Vec<JoinHandle<()>>,
    stats: Arc<PoolStats>,
}

impl WorkerPool {
    /// Create the queue and start `worker_count` workers on it
    ///
    /// Fails before spawning anything if either argument is zero.
    pub fn spawn(
        worker_count: usize,
        queue_capacity: usize,
        downloader: Arc<VideoDownloader>,
    ) -> Result<(QueueSender, WorkerPool)> {
        if worker_count == 0 {
            return Err(Error::config(
                "max_concurrent",
                "worker count must be greater than 0",
            ));
        }
        if queue_capacity == 0 {
            return Err(Error::config(
                "queue_factor",
                "queue capacity must be greater than 0",
            ));
        }

        let (tx, rx) = mpsc::channel(queue_capacity);
        let receiver: SharedReceiver = Arc::new(Mutex::new(rx));
        let stats = Arc::new(PoolStats::default());

        let workers = (0..worker_count)
            .map(|worker_id| {
                tokio::spawn(run_worker(
                    worker_id,
                    Arc::clone(&receiver),
                    Arc::clone(&downloader),
                    Arc::clone(&stats),
                ))
            })
            .collect();

        tracing::info!(worker_count, queue_capacity, "Worker pool started");

        let sender = QueueSender {
            tx,
            event_tx: downloader.event_sender(),
        };
        Ok((sender, WorkerPool { workers, stats }))
    }

    /// Number of workers in the pool
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Counters as of now; final only after [`WorkerPool::join`]
    pub fn summary(&self) -> PoolSummary {
        self.stats.snapshot()
    }

    /// Wait until every worker has drained the closed queue and exited
    ///
    /// Only returns once the queue's sender has been closed (or dropped).
    pub async fn join(self) -> PoolSummary {
        for result in futures::future::join_all(self.workers).await {
            if let Err(e) = result {
                tracing::error!(error = %e, "Worker task ended abnormally");
            }
        }

        let summary = self.stats.snapshot();
        tracing::info!(
            downloaded = summary.downloaded,
            skipped = summary.skipped,
            failed = summary.failed,
            "Worker pool drained"
        );
        summary
    }
}

async fn run_worker(
    worker_id: usize,
    receiver: SharedReceiver,
    downloader: Arc<VideoDownloader>,
    stats: Arc<PoolStats>,
) {
    tracing::debug!(worker_id, "Worker started");

    loop {
        // The lock is released before the download starts
        let next = receiver.lock().await.recv().await;
        let Some(item) = next else {
            break;
        };

        let id = item.id.clone();
        let title = item.title.clone();

        // Run the item on its own task so a panic stays contained to it
        let task_downloader = Arc::clone(&downloader);
        let handle = tokio::spawn(async move { task_downloader.download(&item).await });

        match handle.await {
            Ok(Ok(DownloadOutcome::Downloaded { bytes, .. })) => {
                stats.downloaded.fetch_add(1, Ordering::Relaxed);
                tracing::info!(worker_id, video_id = %id, title = %title, bytes, "Video downloaded");
            }
            Ok(Ok(DownloadOutcome::Skipped { .. })) => {
                stats.skipped.fetch_add(1, Ordering::Relaxed);
            }
            Ok(Err(e)) => {
                stats.failed.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(worker_id, video_id = %id, error = %e, "Video download failed");
                downloader.emit_event(Event::Failed {
                    id,
                    error: e.to_string(),
                });
            }
            Err(e) => {
                stats.failed.fetch_add(1, Ordering::Relaxed);
                tracing::error!(worker_id, video_id = %id, error = %e, "Download task panicked");
                downloader.emit_event(Event::Failed {
                    id,
                    error: format!("download task panicked: {e}"),
                });
            }
        }
    }

    tracing::debug!(worker_id, "Worker exiting, queue drained");
}
