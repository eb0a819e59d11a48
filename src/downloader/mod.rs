//! Video downloading split into focused submodules.
//!
//! The [`VideoDownloader`] runs the per-item protocol; the rest is organized by concern:
//! - [`source`] - Media fetching seam and the reqwest-backed implementation
//! - [`pool`] - Bounded queue and fixed-size worker pool
//! - `progress` - Throttled progress reporting
//! - `sidecar` - Metadata text file written next to each video

pub mod pool;
mod progress;
mod sidecar;
pub mod source;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use pool::{QueueSender, WorkerPool};
pub use source::{HttpSource, MediaSource, MediaStream};

use crate::config::Config;
use crate::error::{DownloadError, Result};
use crate::types::{DownloadOutcome, Event, VideoInfo};
use crate::utils::{part_path, sidecar_file_name, video_file_name};
use progress::ProgressReporter;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::broadcast;

/// Size of the buffer the body is copied through
pub(crate) const CHUNK_SIZE: usize = 32 * 1024;

/// Downloads one video to disk (cloneable, shared by every worker)
#[derive(Clone)]
pub struct VideoDownloader {
    /// Directory holding the videos and their sidecar files
    videos_dir: PathBuf,
    /// Where stream URLs are fetched from
    source: Arc<dyn MediaSource>,
    /// Event broadcast channel sender
    event_tx: broadcast::Sender<Event>,
    /// Minimum time between two progress reports of one transfer
    progress_interval: Duration,
}

impl VideoDownloader {
    /// Create a downloader writing into `videos_dir`
    pub fn new(
        videos_dir: impl Into<PathBuf>,
        source: Arc<dyn MediaSource>,
        event_tx: broadcast::Sender<Event>,
        progress_interval: Duration,
    ) -> Self {
        Self {
            videos_dir: videos_dir.into(),
            source,
            event_tx,
            progress_interval,
        }
    }

    /// Create a downloader from the loaded configuration
    pub fn from_config(
        config: &Config,
        source: Arc<dyn MediaSource>,
        event_tx: broadcast::Sender<Event>,
    ) -> Self {
        Self::new(
            config.videos_dir(),
            source,
            event_tx,
            config.http.progress_interval,
        )
    }

    /// Directory the videos are written to
    pub fn videos_dir(&self) -> &Path {
        &self.videos_dir
    }

    /// Final path of the video file for `item`
    pub fn video_path(&self, item: &VideoInfo) -> PathBuf {
        self.videos_dir.join(video_file_name(item))
    }

    /// Path of the sidecar record for `item`
    pub fn sidecar_path(&self, item: &VideoInfo) -> PathBuf {
        self.videos_dir.join(sidecar_file_name(item))
    }

    /// Subscribe to the events this downloader emits
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Emit an event to all subscribers, dropping it if nobody listens
    pub(crate) fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }

    pub(crate) fn event_sender(&self) -> broadcast::Sender<Event> {
        self.event_tx.clone()
    }

    /// Download one video
    ///
    /// The protocol, in order:
    /// 1. Make sure the videos directory exists
    /// 2. If the video file is already there, return [`DownloadOutcome::Skipped`]
    ///    without touching the network
    /// 3. Write the sidecar record (a failure here is only logged)
    /// 4. Refuse items without a stream URL
    /// 5. Stream the body into a `.part` file in fixed-size chunks, reporting
    ///    progress at most once per interval
    /// 6. Rename the `.part` file onto the final path
    ///
    /// On any failure after step 4 the `.part` file is removed, so the final path
    /// only ever holds complete videos.
    pub async fn download(&self, item: &VideoInfo) -> Result<DownloadOutcome> {
        tokio::fs::create_dir_all(&self.videos_dir).await?;

        let path = self.video_path(item);
        if tokio::fs::try_exists(&path).await? {
            tracing::info!(
                video_id = %item.id,
                title = %item.title,
                path = %path.display(),
                "Video already exists, skipping"
            );
            self.emit_event(Event::Skipped {
                id: item.id.clone(),
                title: item.title.clone(),
                path: path.clone(),
            });
            return Ok(DownloadOutcome::Skipped { path });
        }

        tracing::info!(video_id = %item.id, title = %item.title, "Starting download");
        self.emit_event(Event::DownloadStarted {
            id: item.id.clone(),
            title: item.title.clone(),
        });

        let sidecar_path = self.sidecar_path(item);
        if let Err(e) = sidecar::write_sidecar(&sidecar_path, item).await {
            tracing::warn!(
                video_id = %item.id,
                path = %sidecar_path.display(),
                error = %e,
                "Failed to write video info file"
            );
        }

        if !item.has_stream() {
            return Err(DownloadError::EmptyUrl {
                id: item.id.clone(),
            }
            .into());
        }

        let part = part_path(&path);
        let bytes = match self.fetch_to(item, &part).await {
            Ok(bytes) => bytes,
            Err(e) => {
                remove_partial(&part).await;
                return Err(e);
            }
        };

        if let Err(source) = tokio::fs::rename(&part, &path).await {
            remove_partial(&part).await;
            return Err(DownloadError::Finalize { path, source }.into());
        }

        tracing::info!(
            video_id = %item.id,
            title = %item.title,
            path = %path.display(),
            bytes,
            "Download completed"
        );
        self.emit_event(Event::Completed {
            id: item.id.clone(),
            title: item.title.clone(),
            path: path.clone(),
            bytes,
        });

        Ok(DownloadOutcome::Downloaded { path, bytes })
    }

    /// Stream the item's URL into `target`, returning the number of bytes written
    async fn fetch_to(&self, item: &VideoInfo, target: &Path) -> Result<u64> {
        let stream = self.source.open(&item.download_url).await?;
        let total = stream.content_length;
        let mut body = stream.body;

        let mut file = tokio::fs::File::create(target).await?;
        let mut progress =
            ProgressReporter::new(&item.id, total, self.progress_interval, self.event_sender());

        let mut buf = vec![0u8; CHUNK_SIZE];
        let mut written: u64 = 0;
        loop {
            let n = body.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            file.write_all(&buf[..n]).await?;
            written += n as u64;
            progress.record(written);
        }
        file.flush().await?;

        if let Some(expected) = total
            && written < expected
        {
            return Err(DownloadError::Incomplete {
                expected,
                received: written,
            }
            .into());
        }

        Ok(written)
    }
}

/// Best-effort removal of an unfinished `.part` file
async fn remove_partial(part: &Path) {
    match tokio::fs::remove_file(part).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %part.display(), error = %e, "Failed to remove partial file");
        }
    }
}
