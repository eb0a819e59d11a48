//! Shared test helpers: an in-memory media source and downloader construction.

use crate::downloader::{MediaSource, MediaStream, VideoDownloader};
use crate::error::{DownloadError, Result};
use crate::types::VideoInfo;
use std::io::Cursor;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::{Context, Poll};
use std::time::Duration;
use tempfile::tempdir;
use tokio::io::{AsyncRead, ReadBuf};

/// Marker placed in a URL to make [`FakeSource`] answer 404
pub(crate) const NOT_FOUND_MARKER: &str = "missing";
/// Marker placed in a URL to make [`FakeSource`] panic
pub(crate) const PANIC_MARKER: &str = "explode";
/// Marker placed in a URL to make [`FakeSource`] declare more bytes than it sends
pub(crate) const TRUNCATED_MARKER: &str = "truncated";

/// Work item with a stream URL derived from its id
pub(crate) fn sample_video(id: &str) -> VideoInfo {
    VideoInfo {
        id: id.to_string(),
        title: format!("Title of {id}"),
        author: "tester".to_string(),
        duration_secs: 42,
        stream_id: 1,
        quality: "1080p".to_string(),
        download_url: format!("https://cdn.example.com/{id}.mp4"),
        ..Default::default()
    }
}

/// Media source serving a fixed payload from memory
///
/// Counts calls and tracks how many transfers overlap, so tests can check the pool's
/// concurrency bound. A transfer lasts from `open` until its body is dropped.
pub(crate) struct FakeSource {
    payload: Vec<u8>,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: AtomicUsize,
}

/// Decrements the in-flight count when the transfer ends
struct InFlightGuard(Arc<AtomicUsize>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// In-memory body that keeps its transfer counted until it is dropped
struct TrackedBody {
    inner: Cursor<Vec<u8>>,
    _guard: InFlightGuard,
}

impl AsyncRead for TrackedBody {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_read(cx, buf)
    }
}

impl FakeSource {
    pub(crate) fn new(payload: Vec<u8>) -> Self {
        Self {
            payload,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Hold each open for `delay` before answering
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Transfers opened and not yet finished
    pub(crate) fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl MediaSource for FakeSource {
    async fn open(&self, url: &str) -> Result<MediaStream> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let guard = InFlightGuard(Arc::clone(&self.in_flight));

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if url.contains(PANIC_MARKER) {
            panic!("fake source asked to explode on {url}");
        }
        if url.contains(NOT_FOUND_MARKER) {
            return Err(DownloadError::HttpStatus {
                status: 404,
                url: url.to_string(),
            }
            .into());
        }

        let declared = self.payload.len() as u64;
        let content_length = if url.contains(TRUNCATED_MARKER) {
            Some(declared + 1024)
        } else {
            Some(declared)
        };

        Ok(MediaStream {
            content_length,
            body: Box::pin(TrackedBody {
                inner: Cursor::new(self.payload.clone()),
                _guard: guard,
            }),
        })
    }
}

/// Create a downloader over `source` writing into a fresh temporary directory.
/// Returns the downloader and the tempdir (which must be kept alive).
pub(crate) fn create_test_downloader(
    source: Arc<FakeSource>,
) -> (VideoDownloader, tempfile::TempDir) {
    let temp_dir = tempdir().unwrap();
    let (event_tx, _rx) = tokio::sync::broadcast::channel(1000);

    let downloader = VideoDownloader::new(
        temp_dir.path().join("videos"),
        source,
        event_tx,
        Duration::ZERO,
    );
    (downloader, temp_dir)
}
