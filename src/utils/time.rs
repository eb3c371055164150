//! Clock timestamp parsing and formatting utilities

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// `HH:MM:SS.CC` as printed by the encoder, centisecond precision.
/// Hours may exceed two digits for very long inputs.
pub const CLOCK_PATTERN: &str = r"(\d+):(\d{2}):(\d{2})\.(\d{2})";

static CLOCK_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("^{}", CLOCK_PATTERN)).expect("clock pattern is valid"));

/// Convert four consecutive capture groups (hours, minutes, seconds,
/// centiseconds) starting at `first_group` into seconds.
pub fn captures_to_seconds(caps: &Captures<'_>, first_group: usize) -> Option<f64> {
    let field = |offset: usize| -> Option<u64> {
        caps.get(first_group + offset)?.as_str().parse().ok()
    };

    let hours = field(0)?;
    let minutes = field(1)?;
    let seconds = field(2)?;
    let centis = field(3)?;

    let total_centis = hours
        .checked_mul(60)?
        .checked_add(minutes)?
        .checked_mul(60)?
        .checked_add(seconds)?
        .checked_mul(100)?
        .checked_add(centis)?;
    Some(total_centis as f64 / 100.0)
}

/// Parse a clock string such as `00:01:30.50` into seconds.
/// Trailing sub-centisecond digits (`00:00:45.000000`) are ignored.
pub fn parse_clock(text: &str) -> Option<f64> {
    let caps = CLOCK_REGEX.captures(text.trim())?;
    captures_to_seconds(&caps, 1)
}

/// Format seconds as `HH:MM:SS.CC`
pub fn format_clock(seconds: f64) -> String {
    let total_centis = (seconds.max(0.0) * 100.0).round() as u64;
    let centis = total_centis % 100;
    let total_seconds = total_centis / 100;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    format!("{:02}:{:02}:{:02}.{:02}", hours, minutes, secs, centis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_clock() {
        assert_eq!(parse_clock("00:01:30.50"), Some(90.5));
        assert_eq!(parse_clock("00:00:45.00"), Some(45.0));
        assert_eq!(parse_clock("01:00:00.01"), Some(3600.01));
        assert_eq!(parse_clock("00:00:45.000000"), Some(45.0));
        assert_eq!(parse_clock("100:00:00.00"), Some(360000.0));
    }

    #[test]
    fn test_parse_clock_rejects_overflowing_hours() {
        assert_eq!(parse_clock("999999999999999999:00:00.00"), None);
        assert_eq!(parse_clock("99999999999999999999999:00:00.00"), None);
    }

    #[test]
    fn test_parse_clock_rejects_malformed() {
        assert_eq!(parse_clock("N/A"), None);
        assert_eq!(parse_clock("1:30"), None);
        assert_eq!(parse_clock("-00:00:00.02"), None);
        assert_eq!(parse_clock(""), None);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(90.5), "00:01:30.50");
        assert_eq!(format_clock(3661.25), "01:01:01.25");
        assert_eq!(format_clock(-4.0), "00:00:00.00");
    }
}
