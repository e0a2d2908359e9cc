//! Progress bar over the samples of an analysis run (feature `progress`).
//!
//! The bar message shows the sample being processed and a smoothed time per
//! sample (exponential moving average, weight [`SMOOTHING`] on the newest sample).
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

/// Weight of the latest sample in the moving average.
pub const SMOOTHING: f64 = 0.2;

/// Progress bar over the samples of one analysis run.
pub struct BatchProgress {
    bar: ProgressBar,
    started: Option<Instant>,
    per_sample: Option<Duration>,
}

impl BatchProgress {
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::new((total as u64).max(1));
        let style = ProgressStyle::with_template(
            "{bar:40.cyan/blue} {pos}/{len} ({percent:>3}%) | ETA {eta_precise} | {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(200));
        BatchProgress {
            bar,
            started: None,
            per_sample: None,
        }
    }

    /// Show the sample about to be processed.
    pub fn start(&mut self, label: &str) {
        self.started = Some(Instant::now());
        let message = match self.per_sample {
            Some(d) => format!("{label} | {} per sample", short_duration(d)),
            None => label.to_string(),
        };
        self.bar.set_message(message);
    }

    /// Mark the current sample as done.
    pub fn inc(&mut self) {
        if let Some(started) = self.started.take() {
            self.per_sample = Some(smoothed(self.per_sample, started.elapsed()));
        }
        self.bar.inc(1);
    }

    /// Smoothed processing time of one sample, once a sample has completed.
    pub fn per_sample(&self) -> Option<Duration> {
        self.per_sample
    }

    pub fn finish(self) {
        self.bar.disable_steady_tick();
        self.bar.finish_and_clear();
    }
}

fn smoothed(previous: Option<Duration>, latest: Duration) -> Duration {
    match previous {
        None => latest,
        Some(prev) => {
            let ns = (1.0 - SMOOTHING) * prev.as_nanos() as f64
                + SMOOTHING * latest.as_nanos() as f64;
            Duration::from_nanos(ns.round() as u64)
        }
    }
}

/// Millisecond precision above one millisecond, microseconds below.
fn short_duration(d: Duration) -> String {
    if d < Duration::from_millis(1) {
        format!("{:?}", Duration::from_micros(d.as_micros() as u64))
    } else {
        format!("{:?}", Duration::from_millis(d.as_millis() as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sample_seeds_the_average() {
        let d = Duration::from_millis(40);
        assert_eq!(smoothed(None, d), d);
        assert_eq!(
            smoothed(Some(Duration::from_millis(100)), Duration::from_millis(50)),
            Duration::from_millis(90)
        );
    }

    #[test]
    fn durations_are_rounded_for_display() {
        assert_eq!(short_duration(Duration::from_nanos(253_400)), "253µs");
        assert_eq!(short_duration(Duration::from_micros(42_700)), "42ms");
    }

    #[test]
    fn average_is_set_after_the_first_sample() {
        let mut progress = BatchProgress::new(2);
        assert!(progress.per_sample().is_none());
        progress.start("ctrl");
        progress.inc();
        assert!(progress.per_sample().is_some());
        progress.finish();
    }
}
