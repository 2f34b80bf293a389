//! Progress reporting for the per-commit stages.
//!
//! The CLI uses [`IndicatifReporter`] for a visible progress bar. Library
//! callers and tests use [`NoopReporter`].

use indicatif::{ProgressBar, ProgressStyle};

/// Receives progress updates from extraction and classification.
pub trait ProgressReporter: Send + Sync {
    /// Begin a new task with an optional total count.
    fn start(&self, task: &str, total: Option<u64>);

    /// Advance progress by the given amount.
    fn advance(&self, amount: u64);

    /// Mark the current task as finished.
    fn finish(&self);
}

/// Reporter that discards everything.
#[derive(Debug, Default)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn start(&self, _task: &str, _total: Option<u64>) {}
    fn advance(&self, _amount: u64) {}
    fn finish(&self) {}
}

/// Reporter backed by an `indicatif` progress bar on stderr.
#[derive(Debug)]
pub struct IndicatifReporter {
    bar: ProgressBar,
}

impl Default for IndicatifReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl IndicatifReporter {
    /// A reporter drawing to stderr.
    pub fn new() -> Self {
        Self {
            bar: ProgressBar::new(0),
        }
    }

    /// A reporter that never draws, for non-interactive output.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }
}

impl ProgressReporter for IndicatifReporter {
    fn start(&self, task: &str, total: Option<u64>) {
        match total {
            Some(total) => {
                self.bar.set_length(total);
                self.bar.set_style(
                    ProgressStyle::with_template(
                        "{spinner:.green} {msg} [{bar:30.cyan/blue}] {pos}/{len} ({eta})",
                    )
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=> "),
                );
            }
            None => {
                self.bar.set_length(0);
                self.bar.set_style(
                    ProgressStyle::with_template("{spinner:.green} {msg} {pos} commits")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
            }
        }
        self.bar.set_message(task.to_string());
        self.bar.reset();
    }

    fn advance(&self, amount: u64) {
        self.bar.inc(amount);
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_reporter_is_silent() {
        let reporter = NoopReporter;
        reporter.start("Processing commits", Some(100));
        reporter.advance(50);
        reporter.finish();
    }

    #[test]
    fn hidden_reporter_lifecycle() {
        let reporter = IndicatifReporter::hidden();
        reporter.start("Classifying commits", Some(10));
        reporter.advance(5);
        reporter.advance(5);
        reporter.finish();
    }
}
