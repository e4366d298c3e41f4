//! Progress reporter implementation
//!
//! The walk streams files to the copiers, so the total is never known up
//! front. A spinner shows running counts instead of a bar.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tracing_subscriber::fmt::MakeWriter;

/// Progress reporter for sort runs
pub struct ProgressReporter {
    /// Spinner line
    spinner: ProgressBar,
    /// Files copied so far
    files_copied: AtomicU64,
    /// Files that failed so far
    files_failed: AtomicU64,
    /// Bytes copied so far
    bytes_copied: AtomicU64,
    /// Is progress enabled
    enabled: AtomicBool,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} [{elapsed}] {msg}") {
            spinner.set_style(style);
        }
        spinner.enable_steady_tick(Duration::from_millis(120));

        Self {
            spinner,
            files_copied: AtomicU64::new(0),
            files_failed: AtomicU64::new(0),
            bytes_copied: AtomicU64::new(0),
            enabled: AtomicBool::new(true),
        }
    }

    /// Create a disabled progress reporter (for quiet mode)
    pub fn disabled() -> Self {
        let spinner = ProgressBar::hidden();
        spinner.set_draw_target(ProgressDrawTarget::hidden());

        Self {
            spinner,
            files_copied: AtomicU64::new(0),
            files_failed: AtomicU64::new(0),
            bytes_copied: AtomicU64::new(0),
            enabled: AtomicBool::new(false),
        }
    }

    /// Record one copied file
    pub fn file_copied(&self, bytes: u64) {
        self.files_copied.fetch_add(1, Ordering::Relaxed);
        self.bytes_copied.fetch_add(bytes, Ordering::Relaxed);
        self.refresh();
    }

    /// Record one failed file
    pub fn file_failed(&self) {
        self.files_failed.fetch_add(1, Ordering::Relaxed);
        self.refresh();
    }

    fn refresh(&self) {
        if !self.is_enabled() {
            return;
        }
        let copied = self.files_copied.load(Ordering::Relaxed);
        let failed = self.files_failed.load(Ordering::Relaxed);
        let bytes = self.bytes_copied.load(Ordering::Relaxed);
        self.spinner.set_message(format!(
            "{} files sorted, {} failed, {}",
            copied,
            failed,
            humansize::format_size(bytes, humansize::BINARY)
        ));
    }

    /// Run `f` with the spinner taken off the terminal
    pub fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        self.spinner.suspend(f)
    }

    /// Stderr writer for log lines that never tears the spinner
    pub fn log_writer(&self) -> SpinnerStderr {
        SpinnerStderr {
            spinner: self.spinner.clone(),
        }
    }

    /// Finish progress with a final message
    pub fn finish(&self, message: &str) {
        self.spinner.finish_with_message(message.to_string());
    }

    /// Remove the spinner without leaving a line behind
    pub fn clear(&self) {
        self.spinner.finish_and_clear();
    }

    /// Check if progress is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Files copied so far
    pub fn files_copied(&self) -> u64 {
        self.files_copied.load(Ordering::Relaxed)
    }

    /// Files failed so far
    pub fn files_failed(&self) -> u64 {
        self.files_failed.load(Ordering::Relaxed)
    }

    /// Bytes copied so far
    pub fn bytes_copied(&self) -> u64 {
        self.bytes_copied.load(Ordering::Relaxed)
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Stderr that hides the spinner while a line is written
#[derive(Clone)]
pub struct SpinnerStderr {
    spinner: ProgressBar,
}

impl Write for SpinnerStderr {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.spinner.suspend(|| std::io::stderr().write(buf))
    }

    fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> {
        self.spinner.suspend(|| std::io::stderr().write_all(buf))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        std::io::stderr().flush()
    }
}

impl<'a> MakeWriter<'a> for SpinnerStderr {
    type Writer = SpinnerStderr;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
