//! Human-readable metadata file written next to each video.

use crate::types::VideoInfo;
use chrono::{DateTime, Local};
use std::path::Path;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render the sidecar text for `item`, stamped with `downloaded_at`
pub(crate) fn render(item: &VideoInfo, downloaded_at: DateTime<Local>) -> String {
    format!(
        "Video info:\n\
         ID: {}\n\
         Title: {}\n\
         Author: {}\n\
         Duration: {}s\n\
         Download URL: {}\n\
         Downloaded at: {}\n",
        item.id,
        item.title,
        item.author,
        item.duration_secs,
        item.download_url,
        downloaded_at.format(TIMESTAMP_FORMAT),
    )
}

/// Write (or overwrite) the sidecar file at `path`
pub(crate) async fn write_sidecar(path: &Path, item: &VideoInfo) -> std::io::Result<()> {
    tokio::fs::write(path, render(item, Local::now())).await
}
