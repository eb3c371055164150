//! Progress tracking and sinks for UI integration

use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::model::{JobState, ProgressSample};
use crate::ports::ProgressSink;
use crate::utils::time::{captures_to_seconds, CLOCK_PATTERN};

static OUT_TIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^out_time={}", CLOCK_PATTERN)).expect("out_time pattern is valid")
});

/// Turns the encoder's progress channel into samples.
///
/// Only `out_time=` lines produce a sample; every other line is ignored.
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    last: Option<ProgressSample>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line; returns a sample when the line carries an `out_time`
    pub fn on_line(&mut self, line: &str, total_duration: f64) -> Option<ProgressSample> {
        let caps = OUT_TIME_REGEX.captures(line.trim())?;
        let elapsed = captures_to_seconds(&caps, 1)?;
        let sample = ProgressSample::new(elapsed, total_duration);
        self.last = Some(sample.clone());
        Some(sample)
    }

    /// Most recent sample, if any
    pub fn last_sample(&self) -> Option<&ProgressSample> {
        self.last.as_ref()
    }
}

/// Coalesces bursts of samples for a slow sink.
///
/// A sample is let through when `min_interval` has passed since the last
/// one, when it is the first, or when it reports completion.
#[derive(Debug)]
pub struct ProgressThrottle {
    min_interval: Duration,
    last_emit: Option<Instant>,
}

impl ProgressThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_emit: None,
        }
    }

    pub fn should_emit(&mut self, fraction_complete: f64) -> bool {
        let now = Instant::now();
        let due = match self.last_emit {
            None => true,
            Some(last) => now.duration_since(last) >= self.min_interval,
        };

        if due || fraction_complete >= 1.0 {
            self.last_emit = Some(now);
            true
        } else {
            false
        }
    }
}

/// Console progress bar on stderr for CLI usage
pub struct ConsoleProgressSink {
    verbose: bool,
    // Bar is drawn with '\r'; a newline is owed before any other output
    bar_open: Mutex<bool>,
}

impl ConsoleProgressSink {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            bar_open: Mutex::new(false),
        }
    }

    fn close_bar(&self) {
        if let Ok(mut open) = self.bar_open.lock() {
            if *open {
                eprintln!();
                *open = false;
            }
        }
    }
}

impl ProgressSink for ConsoleProgressSink {
    fn notify(&self, fraction_complete: f64, message: &str) {
        let percent = (fraction_complete * 100.0).clamp(0.0, 100.0);
        let bar_length = 30;
        let filled = ((percent / 100.0) * bar_length as f64) as usize;
        let bar = "#".repeat(filled) + &"-".repeat(bar_length - filled);

        let mut stderr = std::io::stderr().lock();
        let _ = write!(stderr, "\r[{}] {:>6.2}% {}", bar, percent, message);
        let _ = stderr.flush();
        drop(stderr);

        if let Ok(mut open) = self.bar_open.lock() {
            *open = true;
        }
        if fraction_complete >= 1.0 {
            self.close_bar();
        }
    }

    fn on_state(&self, state: JobState) {
        if state.is_terminal() {
            self.close_bar();
        }
        if self.verbose {
            eprintln!("-> {}", state);
        }
    }
}

/// JSON lines on stdout for structured output
pub struct JsonProgressSink;

impl ProgressSink for JsonProgressSink {
    fn notify(&self, fraction_complete: f64, message: &str) {
        let event = serde_json::json!({
            "event": "progress",
            "fraction_complete": fraction_complete,
            "percent": fraction_complete * 100.0,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        });
        println!("{}", event);
    }

    fn on_state(&self, state: JobState) {
        let event = serde_json::json!({
            "event": "state",
            "state": state,
            "timestamp": chrono::Utc::now().to_rfc3339()
        });
        println!("{}", event);
    }
}

/// No-op sink for when progress reporting is disabled
pub struct NoOpProgressSink;

impl ProgressSink for NoOpProgressSink {
    fn notify(&self, _fraction_complete: f64, _message: &str) {}
}

/// Pick a sink by its CLI name
pub fn sink_for(mode: ProgressMode, verbose: bool) -> Arc<dyn ProgressSink> {
    match mode {
        ProgressMode::Console => Arc::new(ConsoleProgressSink::new(verbose)),
        ProgressMode::Json => Arc::new(JsonProgressSink),
        ProgressMode::None => Arc::new(NoOpProgressSink),
    }
}

/// How progress is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressMode {
    #[default]
    Console,
    Json,
    None,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_time_half_way() {
        let mut tracker = ProgressTracker::new();
        let sample = tracker.on_line("out_time=00:00:45.00", 90.0).unwrap();
        assert_eq!(sample.elapsed_seconds, 45.0);
        assert_eq!(sample.fraction_complete, 0.5);
        assert_eq!(sample.message, "Processing... 50.00%");
        assert_eq!(tracker.last_sample(), Some(&sample));
    }

    #[test]
    fn test_microsecond_out_time() {
        let mut tracker = ProgressTracker::new();
        let sample = tracker.on_line("out_time=00:01:00.250000\n", 120.0).unwrap();
        assert_eq!(sample.elapsed_seconds, 60.25);
    }

    #[test]
    fn test_unrelated_lines_produce_nothing() {
        let mut tracker = ProgressTracker::new();
        let lines = [
            "frame=120",
            "fps=29.97",
            "bitrate=1612.6kbits/s",
            "out_time_us=45000000",
            "out_time_ms=45000000",
            "out_time=N/A",
            "speed=2.01x",
            "progress=continue",
            "  Duration: 00:01:30.00, start: 0.000000",
        ];
        let samples: Vec<_> = lines.iter().filter_map(|l| tracker.on_line(l, 90.0)).collect();
        assert!(samples.is_empty());
        assert!(tracker.last_sample().is_none());
    }

    #[test]
    fn test_fraction_is_clamped() {
        let mut tracker = ProgressTracker::new();
        let sample = tracker.on_line("out_time=00:02:00.00", 90.0).unwrap();
        assert_eq!(sample.fraction_complete, 1.0);

        let sample = tracker.on_line("out_time=00:00:10.00", 0.0).unwrap();
        assert_eq!(sample.fraction_complete, 0.0);
    }

    #[test]
    fn test_samples_follow_line_order() {
        let mut tracker = ProgressTracker::new();
        let fractions: Vec<f64> = ["out_time=00:00:10.00", "progress=continue", "out_time=00:00:20.00", "out_time=00:00:40.00"]
            .iter()
            .filter_map(|l| tracker.on_line(l, 40.0))
            .map(|s| s.fraction_complete)
            .collect();
        assert_eq!(fractions, vec![0.25, 0.5, 1.0]);
    }

    #[test]
    fn test_throttle_always_passes_completion() {
        let mut throttle = ProgressThrottle::new(Duration::from_secs(3600));
        assert!(throttle.should_emit(0.1));
        assert!(!throttle.should_emit(0.2));
        assert!(!throttle.should_emit(0.9));
        assert!(throttle.should_emit(1.0));
    }

    #[test]
    fn test_throttle_zero_interval_passes_everything() {
        let mut throttle = ProgressThrottle::new(Duration::ZERO);
        assert!((0..10).all(|i| throttle.should_emit(i as f64 / 10.0)));
    }
}
