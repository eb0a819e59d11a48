//! Utility functions for file naming and path manipulation

use crate::types::VideoInfo;
use std::path::{Path, PathBuf};

/// Maximum length of a sanitized name, in bytes
///
/// Leaves room for the `.part` suffix below the common 255-byte name limit.
pub const MAX_FILENAME_BYTES: usize = 200;

/// Characters rejected by at least one common filesystem
const ILLEGAL_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Extension used for downloaded videos
pub const VIDEO_EXTENSION: &str = "mp4";

/// Suffix appended to the video path while the body is still being received
pub const PART_EXTENSION: &str = "part";

/// Make a string safe to use as a file name
///
/// Every character in `< > : " / \ | ? *` is replaced by `_`; all other characters
/// are kept in order. The result is truncated to at most [`MAX_FILENAME_BYTES`] bytes,
/// cut at a character boundary so a multi-byte character is never split.
///
/// # Examples
///
/// ```
/// use favlist_dl::utils::sanitize_filename;
///
/// assert_eq!(sanitize_filename("a/b:c?"), "a_b_c_");
/// assert_eq!(sanitize_filename("plain title"), "plain title");
/// ```
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let mut clean: String = name
        .chars()
        .map(|c| if ILLEGAL_CHARS.contains(&c) { '_' } else { c })
        .collect();
    truncate_at_char_boundary(&mut clean, MAX_FILENAME_BYTES);
    clean
}

/// Shorten `s` to at most `max_bytes`, dropping any character that would straddle the cut
fn truncate_at_char_boundary(s: &mut String, max_bytes: usize) {
    if s.len() <= max_bytes {
        return;
    }
    let cut = s
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .take_while(|&end| end <= max_bytes)
        .last()
        .unwrap_or(0);
    s.truncate(cut);
}

/// File name of the downloaded video: `{id}_{title}.mp4`, sanitized
///
/// Sanitization and truncation apply to the stem so the extension always survives;
/// the whole name, extension included, stays within [`MAX_FILENAME_BYTES`].
#[must_use]
pub fn video_file_name(item: &VideoInfo) -> String {
    let mut stem = sanitize_filename(&format!("{}_{}", item.id, item.title));
    truncate_at_char_boundary(&mut stem, MAX_FILENAME_BYTES - VIDEO_EXTENSION.len() - 1);
    format!("{stem}.{VIDEO_EXTENSION}")
}

/// File name of the sidecar record: `{id}_info.txt`
#[must_use]
pub fn sidecar_file_name(item: &VideoInfo) -> String {
    format!("{}_info.txt", sanitize_filename(&item.id))
}

/// Path the body is streamed into before it is renamed onto `video_path`
#[must_use]
pub fn part_path(video_path: &Path) -> PathBuf {
    let mut name = video_path.as_os_str().to_owned();
    name.push(".");
    name.push(PART_EXTENSION);
    PathBuf::from(name)
}
