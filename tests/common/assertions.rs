//! Custom test assertions for integration tests

use favlist_dl::{Event, VideoDownloader, VideoInfo};
use std::path::Path;
use tokio::sync::broadcast;

/// Drain every event currently buffered in `events`
pub fn collect_events(events: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut collected = Vec::new();
    while let Ok(event) = events.try_recv() {
        collected.push(event);
    }
    collected
}

/// Assert that the given files exist in a directory
pub fn assert_files_exist(dir: &Path, expected_files: &[&str]) {
    for file in expected_files {
        let path = dir.join(file);
        assert!(path.exists(), "Expected file not found: {}", path.display());
    }
}

/// Assert that `item` was written completely with `payload` and has its sidecar
pub async fn assert_video_written(downloader: &VideoDownloader, item: &VideoInfo, payload: &[u8]) {
    let path = downloader.video_path(item);
    let data = tokio::fs::read(&path)
        .await
        .unwrap_or_else(|e| panic!("reading {}: {e}", path.display()));
    assert_eq!(data.len(), payload.len(), "size of {}", path.display());
    assert_eq!(data, payload, "content of {}", path.display());

    let sidecar = tokio::fs::read_to_string(downloader.sidecar_path(item))
        .await
        .unwrap_or_else(|e| panic!("reading sidecar of {}: {e}", item.id));
    assert!(sidecar.starts_with("Video info:\n"));
    assert!(sidecar.contains(&format!("ID: {}\n", item.id)));
    assert!(sidecar.contains(&format!("Download URL: {}\n", item.download_url)));
}
