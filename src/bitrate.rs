//! Media bitrate estimation.

use crate::constants::FALLBACK_BITRATE;

/// Estimates the average bitrate of a media file in bytes per second.
///
/// With a known duration the estimate is simply `file_size / duration`. An
/// unknown duration (zero, negative or not a number) falls back to
/// [`FALLBACK_BITRATE`].
///
/// # Examples
///
/// ```
/// use lookbehind::bitrate::estimate_bitrate;
///
/// assert_eq!(estimate_bitrate(2_700_000_000, 3600.0), 750_000);
/// assert_eq!(estimate_bitrate(500_000_000, 0.0), 2_560_000);
/// ```
pub fn estimate_bitrate(file_size: u64, duration_secs: f64) -> u64 {
    if duration_secs > 0.0 {
        (file_size as f64 / duration_secs) as u64
    } else {
        FALLBACK_BITRATE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitrate_from_duration() {
        assert_eq!(estimate_bitrate(2_700_000_000, 3600.0), 750_000);
        assert_eq!(estimate_bitrate(1_000, 4.0), 250);
    }

    #[test]
    fn test_bitrate_fallback() {
        assert_eq!(estimate_bitrate(500_000_000, 0.0), FALLBACK_BITRATE);
        assert_eq!(estimate_bitrate(500_000_000, -12.5), FALLBACK_BITRATE);
        assert_eq!(estimate_bitrate(500_000_000, f64::NAN), FALLBACK_BITRATE);
    }

    #[test]
    fn test_bitrate_empty_file() {
        assert_eq!(estimate_bitrate(0, 60.0), 0);
    }
}
