//! Interval-throttled progress reporting for a single transfer.

use crate::types::Event;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;

/// Tracks one transfer and reports its progress at most once per interval.
///
/// Reports are only produced when the total size is known. Reporting is a log
/// line plus a broadcast send, neither of which waits on anyone.
pub(crate) struct ProgressReporter {
    id: String,
    total_bytes: Option<u64>,
    interval: Duration,
    last_report: Instant,
    event_tx: broadcast::Sender<Event>,
}

impl ProgressReporter {
    pub(crate) fn new(
        id: &str,
        total_bytes: Option<u64>,
        interval: Duration,
        event_tx: broadcast::Sender<Event>,
    ) -> Self {
        Self {
            id: id.to_string(),
            total_bytes: total_bytes.filter(|total| *total > 0),
            interval,
            last_report: Instant::now(),
            event_tx,
        }
    }

    /// Record the running byte count; returns true if a report was emitted
    pub(crate) fn record(&mut self, downloaded_bytes: u64) -> bool {
        let Some(total_bytes) = self.total_bytes else {
            return false;
        };
        if self.last_report.elapsed() < self.interval {
            return false;
        }
        self.last_report = Instant::now();

        let percent = percent(downloaded_bytes, total_bytes);
        tracing::info!(
            video_id = %self.id,
            downloaded_bytes,
            total_bytes,
            "Download progress: {:.2}%",
            percent
        );
        self.event_tx
            .send(Event::Progress {
                id: self.id.clone(),
                downloaded_bytes,
                total_bytes,
                percent,
            })
            .ok();
        true
    }
}

fn percent(downloaded: u64, total: u64) -> f32 {
    ((downloaded as f64 / total as f64) * 100.0) as f32
}
