//! Human-readable formatting for listing rows.

use std::time::SystemTime;

use chrono::{DateTime, Local};

const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;
const TB: u64 = GB * 1024;

/// Format a byte count with binary (1024) thresholds. Bytes stay whole;
/// every larger unit carries two decimal places.
pub fn pretty_size(bytes: u64) -> String {
    if bytes < KB {
        format!("{bytes} B")
    } else if bytes < MB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else if bytes < GB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes < TB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    }
}

/// Render a modification time as zero-padded `YYYY-MM-DD HH:MM:SS` in the
/// machine's local timezone.
pub fn timestamp(time: SystemTime) -> String {
    DateTime::<Local>::from(time).format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn pretty_size_keeps_bytes_whole() {
        assert_eq!(pretty_size(0), "0 B");
        assert_eq!(pretty_size(512), "512 B");
        assert_eq!(pretty_size(1023), "1023 B");
    }

    #[test]
    fn pretty_size_scales_with_two_decimals() {
        assert_eq!(pretty_size(1024), "1.00 KB");
        assert_eq!(pretty_size(1536), "1.50 KB");
        assert_eq!(pretty_size(1024 * 1024), "1.00 MB");
        assert_eq!(pretty_size(5 * 1024 * 1024 * 1024 / 2), "2.50 GB");
        assert_eq!(pretty_size(1024u64.pow(4)), "1.00 TB");
    }

    #[test]
    fn timestamp_is_zero_padded_local_time() {
        let rendered = timestamp(SystemTime::UNIX_EPOCH);
        assert_eq!(rendered.len(), 19, "got {rendered}");
        assert_eq!(&rendered[4..5], "-");
        assert_eq!(&rendered[7..8], "-");
        assert_eq!(&rendered[10..11], " ");
        assert_eq!(&rendered[13..14], ":");
        assert_eq!(&rendered[16..17], ":");
    }
}
