//! Quality label resolution
//!
//! Maps the human-readable quality preference from the configuration onto the
//! numeric tier understood by the remote streaming API.

/// Tier used for empty or unrecognised labels (1080p)
pub const DEFAULT_QUALITY_TIER: u32 = 80;

/// Recognised labels and their tiers, highest first
const QUALITY_TABLE: &[(&str, u32)] = &[
    ("4k", 120),
    ("2160p", 120),
    ("1080p60", 116),
    ("1080p+", 112),
    ("1080p", 80),
    ("720p60", 74),
    ("720p", 64),
    ("480p", 32),
    ("360p", 16),
];

/// Resolve a quality label to its numeric tier
///
/// Matching is case-insensitive and ignores surrounding whitespace. Anything not in
/// the table resolves to [`DEFAULT_QUALITY_TIER`].
///
/// # Examples
///
/// ```
/// use favlist_dl::quality::{resolve_quality, DEFAULT_QUALITY_TIER};
///
/// assert_eq!(resolve_quality("4K"), 120);
/// assert_eq!(resolve_quality("720p"), 64);
/// assert_eq!(resolve_quality("potato"), DEFAULT_QUALITY_TIER);
/// ```
#[must_use]
pub fn resolve_quality(label: &str) -> u32 {
    lookup(label).unwrap_or(DEFAULT_QUALITY_TIER)
}

/// Whether the label appears in the quality table
#[must_use]
pub fn is_known_quality(label: &str) -> bool {
    lookup(label).is_some()
}

fn lookup(label: &str) -> Option<u32> {
    let label = label.trim().to_lowercase();
    QUALITY_TABLE
        .iter()
        .find(|(name, _)| *name == label)
        .map(|&(_, tier)| tier)
}
