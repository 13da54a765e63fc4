//! Pure predicates: label matching, recency, comma lists.

use chrono::{DateTime, Duration, Utc};
use stale_tracker::Item;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

pub const MILLIS_PER_DAY: i64 = 86_400_000;

/// Fold a label for comparison: strip diacritics, then lowercase.
pub fn clean_label(label: &str) -> String {
    label
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Case- and accent-insensitive label equality.
pub fn is_label_equal(a: &str, b: &str) -> bool {
    clean_label(a) == clean_label(b)
}

/// Whether `item` carries `label`.
pub fn is_labeled(item: &Item, label: &str) -> bool {
    item.labels.iter().any(|l| is_label_equal(l, label))
}

/// Length of `days` in whole milliseconds. Fractional days are allowed.
pub fn days_to_millis(days: f64) -> i64 {
    (days * MILLIS_PER_DAY as f64).round() as i64
}

/// `now - timestamp <= days`.
///
/// Zero days means only a timestamp at or after `now` counts as recent.
pub fn updated_since(timestamp: DateTime<Utc>, days: f64, now: DateTime<Utc>) -> bool {
    (now - timestamp).num_milliseconds() <= days_to_millis(days)
}

pub fn days_ago(now: DateTime<Utc>, days: f64) -> DateTime<Utc> {
    now - Duration::milliseconds(days_to_millis(days))
}

/// Split a raw comma list and trim each entry. Empty input yields no entries;
/// casing and duplicates are kept.
pub fn parse_comma_separated(input: &str) -> Vec<String> {
    if input.is_empty() {
        return Vec::new();
    }
    input.split(',').map(|s| s.trim().to_string()).collect()
}
