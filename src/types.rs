//! Core types and events for favlist-dl

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Descriptor of one video to download (a work item)
///
/// Built once by the orchestrator and then moved through the queue to exactly one
/// worker; nothing in the pipeline mutates it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoInfo {
    /// Platform identifier of the video (non-empty, stable)
    pub id: String,
    /// Video title; may contain characters that are illegal in paths
    pub title: String,
    /// Video description
    #[serde(default)]
    pub description: String,
    /// Uploader name
    pub author: String,
    /// Duration in seconds
    pub duration_secs: u64,
    /// Identifier of the playback stream
    pub stream_id: i64,
    /// Quality label this item was resolved with
    pub quality: String,
    /// Resolved stream URL; empty when no playable stream was found
    pub download_url: String,
}

impl VideoInfo {
    /// Whether a stream URL was resolved for this item
    pub fn has_stream(&self) -> bool {
        !self.download_url.trim().is_empty()
    }
}

/// Result of a successful single-item download
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The video was fetched and written to `path`
    Downloaded {
        /// Final video path
        path: PathBuf,
        /// Number of bytes written
        bytes: u64,
    },
    /// The video already existed at `path`; nothing was fetched
    Skipped {
        /// Existing video path
        path: PathBuf,
    },
}

/// Aggregate counters reported by the worker pool after it drained
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSummary {
    /// Items fetched and written
    pub downloaded: u64,
    /// Items skipped because the video file already existed
    pub skipped: u64,
    /// Items that failed
    pub failed: u64,
}

impl PoolSummary {
    /// Total number of items the workers processed
    pub fn processed(&self) -> u64 {
        self.downloaded + self.skipped + self.failed
    }
}

/// Report returned by [`crate::CollectionSync::run`]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Number of collections enumerated
    pub collections: usize,
    /// Distinct video ids discovered across all collections
    pub discovered: u64,
    /// Items handed to the download queue
    pub enqueued: u64,
    /// Ids skipped because they could not be resolved to a playable stream
    pub unresolved: u64,
    /// Worker pool counters
    pub pool: PoolSummary,
    /// True if the run was stopped early by a shutdown request
    pub interrupted: bool,
}

/// Observations emitted by the pipeline
///
/// Subscribe with [`crate::CollectionSync::subscribe`]. Sending never blocks: when
/// nobody listens, events are dropped.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A work item entered the download queue
    Queued {
        /// Video id
        id: String,
        /// Video title
        title: String,
    },

    /// A worker started the download protocol for an item
    DownloadStarted {
        /// Video id
        id: String,
        /// Video title
        title: String,
    },

    /// Periodic transfer progress (only when the total size is known)
    Progress {
        /// Video id
        id: String,
        /// Bytes written so far
        downloaded_bytes: u64,
        /// Declared total size
        total_bytes: u64,
        /// Percentage (0.0 - 100.0)
        percent: f32,
    },

    /// The video file already existed, nothing was fetched
    Skipped {
        /// Video id
        id: String,
        /// Video title
        title: String,
        /// Existing file
        path: PathBuf,
    },

    /// The video was downloaded successfully
    Completed {
        /// Video id
        id: String,
        /// Video title
        title: String,
        /// Final file
        path: PathBuf,
        /// Bytes written
        bytes: u64,
    },

    /// The download of an item failed
    Failed {
        /// Video id
        id: String,
        /// Error message
        error: String,
    },

    /// The catalog could not describe an item, or returned no playable stream
    ResolveFailed {
        /// Video id
        id: String,
        /// Error message
        error: String,
    },

    /// The whole run finished and every worker exited
    Finished {
        /// Final report
        report: SyncReport,
    },
}
