//! Diagnostic stream scanning for duration and audio bitrate

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::domain::model::MediaProbe;
use crate::utils::time::{captures_to_seconds, CLOCK_PATTERN};

static DURATION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"Duration:\s*{}", CLOCK_PATTERN)).expect("duration pattern is valid")
});

static AUDIO_BITRATE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Stream\b.*\bAudio:.*?(\d+)\s*kb/s").expect("audio pattern is valid")
});

/// Incremental scanner fed one diagnostic line at a time.
///
/// The last duration line wins, since the encoder may restate metadata.
/// The first audio stream with a bitrate wins, as that is the stream the
/// encoder maps by default.
#[derive(Debug, Default, Clone)]
pub struct ProbeScanner {
    duration_seconds: Option<f64>,
    audio_bitrate_bps: Option<i64>,
    lines_seen: usize,
}

impl ProbeScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect one line
    pub fn feed(&mut self, line: &str) {
        self.lines_seen += 1;

        if let Some(caps) = DURATION_REGEX.captures(line) {
            if let Some(seconds) = captures_to_seconds(&caps, 1) {
                debug!("Duration line: {} -> {:.2}s", line.trim(), seconds);
                self.duration_seconds = Some(seconds);
            }
            return;
        }

        if self.audio_bitrate_bps.is_none() {
            if let Some(caps) = AUDIO_BITRATE_REGEX.captures(line) {
                if let Some(kbps) = caps.get(1).and_then(|m| m.as_str().parse::<i64>().ok()) {
                    debug!("Audio stream line: {} -> {} kb/s", line.trim(), kbps);
                    self.audio_bitrate_bps = kbps.checked_mul(1000);
                }
            }
        }
    }

    /// Audio bitrate seen so far, in bits per second
    pub fn audio_bitrate_bps(&self) -> Option<i64> {
        self.audio_bitrate_bps
    }

    pub fn lines_seen(&self) -> usize {
        self.lines_seen
    }

    /// Produce the probe; unknown duration becomes 0
    pub fn finish(&self, fallback_audio_bps: i64) -> MediaProbe {
        MediaProbe::new(
            self.duration_seconds.unwrap_or(0.0),
            self.audio_bitrate_bps,
            fallback_audio_bps,
        )
    }

    /// Scan a whole block of text
    pub fn scan_text(text: &str, fallback_audio_bps: i64) -> MediaProbe {
        let mut scanner = Self::new();
        for line in text.lines() {
            scanner.feed(line);
        }
        scanner.finish(fallback_audio_bps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::DEFAULT_AUDIO_BITRATE_BPS;

    const SAMPLE: &str = "\
Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'clip.mp4':
  Metadata:
    major_brand     : isom
  Duration: 00:01:30.50, start: 0.000000, bitrate: 2688 kb/s
  Stream #0:0[0x1](und): Video: h264 (High) (avc1 / 0x31637661), yuv420p(progressive), 1920x1080, 2552 kb/s, 30 fps, 30 tbr, 15360 tbn (default)
  Stream #0:1[0x2](und): Audio: aac (LC) (mp4a / 0x6134706D), 48000 Hz, stereo, fltp, 127 kb/s (default)
At least one output file must be specified";

    #[test]
    fn test_scan_duration_and_audio() {
        let probe = ProbeScanner::scan_text(SAMPLE, DEFAULT_AUDIO_BITRATE_BPS);
        assert_eq!(probe.duration_seconds, 90.5);
        assert_eq!(probe.audio_bitrate_bps, 127_000);
        assert!(probe.audio_bitrate_detected);
    }

    #[test]
    fn test_last_duration_wins() {
        let text = "  Duration: 00:00:10.00, start: 0.000000\n  Duration: 00:02:00.25, start: 0.000000\n";
        let probe = ProbeScanner::scan_text(text, DEFAULT_AUDIO_BITRATE_BPS);
        assert_eq!(probe.duration_seconds, 120.25);
    }

    #[test]
    fn test_missing_duration_is_zero() {
        let probe = ProbeScanner::scan_text(
            "clip.mp4: Invalid data found when processing input\n",
            DEFAULT_AUDIO_BITRATE_BPS,
        );
        assert_eq!(probe.duration_seconds, 0.0);
        assert!(!probe.has_duration());
    }

    #[test]
    fn test_duration_not_available() {
        let probe = ProbeScanner::scan_text("  Duration: N/A, bitrate: N/A\n", 128_000);
        assert_eq!(probe.duration_seconds, 0.0);
    }

    #[test]
    fn test_audio_fallback_when_absent() {
        let text = "  Duration: 00:00:05.00, start: 0.000000, bitrate: 900 kb/s\n  Stream #0:0: Video: h264, yuv420p, 640x360, 850 kb/s, 25 fps\n";
        let probe = ProbeScanner::scan_text(text, 96_000);
        assert_eq!(probe.audio_bitrate_bps, 96_000);
        assert!(!probe.audio_bitrate_detected);
    }

    #[test]
    fn test_first_audio_stream_wins() {
        let mut scanner = ProbeScanner::new();
        scanner.feed("  Stream #0:1(eng): Audio: aac (LC), 48000 Hz, stereo, fltp, 192 kb/s (default)");
        scanner.feed("  Stream #0:2(jpn): Audio: aac (LC), 48000 Hz, stereo, fltp, 96 kb/s");
        assert_eq!(scanner.audio_bitrate_bps(), Some(192_000));
        assert_eq!(scanner.lines_seen(), 2);
    }

    #[test]
    fn test_audio_without_bitrate_is_ignored() {
        let mut scanner = ProbeScanner::new();
        scanner.feed("  Stream #0:1: Audio: pcm_s16le, 44100 Hz, stereo, s16");
        assert_eq!(scanner.audio_bitrate_bps(), None);
    }

    #[test]
    fn test_absurd_values_are_ignored() {
        let text = "  Duration: 999999999999999999:00:00.00, start: 0.000000
  Stream #0:1: Audio: aac, 48000 Hz, stereo, 9999999999999999999 kb/s
";
        let probe = ProbeScanner::scan_text(text, DEFAULT_AUDIO_BITRATE_BPS);
        assert!(!probe.has_duration());
        assert!(!probe.audio_bitrate_detected);
    }
}
