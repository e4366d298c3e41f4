//! Logging setup and the per-run log handle
//!
//! `init_tracing` installs the process subscriber once, from `main`. The
//! components never reach for ambient state on their own: they are handed a
//! [`RunLog`] that carries the run's span and emits every event inside it.

use crate::config::LogFormat;
use crate::fs::ExtensionLabel;
use crate::progress::ProgressReporter;
use std::fmt::Display;
use std::path::Path;
use tracing::{Level, Span};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber
///
/// `RUST_LOG` wins when set; otherwise the level comes from the CLI flags.
/// While `progress` is live, lines are written with its spinner suspended.
pub fn init_tracing(verbose: u8, quiet: bool, format: LogFormat, progress: &ProgressReporter) {
    let fallback = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let writer = if progress.is_enabled() {
        BoxMakeWriter::new(progress.log_writer())
    } else {
        BoxMakeWriter::new(std::io::stderr)
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(writer);

    // try_init: tests and embedders may already own the subscriber
    let _ = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

/// Log handle for a single sort run
///
/// Cheap to clone; workers each get their own copy.
#[derive(Debug, Clone)]
pub struct RunLog {
    span: Span,
}

impl RunLog {
    /// Open a run span for the given source and output roots
    pub fn new(source: &Path, output: &Path) -> Self {
        let span = tracing::span!(
            Level::INFO,
            "sort",
            source = %source.display(),
            output = %output.display()
        );
        Self { span }
    }

    /// A handle that emits nothing, for callers outside a run
    pub fn disabled() -> Self {
        Self { span: Span::none() }
    }

    /// The span every event of this run is recorded under
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Sorting is about to start
    pub fn started(&self, source: &Path, output: &Path) {
        let _guard = self.span.enter();
        tracing::info!("Sorting files from {} into {}", source.display(), output.display());
    }

    /// Sorting finished
    pub fn finished(&self, files: u64, failures: usize) {
        let _guard = self.span.enter();
        tracing::info!(files, failures, "Sorting complete");
    }

    /// The walk phase failed outside of the per-file and per-branch recovery
    pub fn sort_failed(&self, err: &dyn Display) {
        let _guard = self.span.enter();
        tracing::error!("Sorting failed: {}", err);
    }

    /// The source root was rejected
    pub fn invalid_source(&self, source: &Path, reason: &dyn Display) {
        let _guard = self.span.enter();
        tracing::error!(
            reason = %reason,
            "Source folder {} does not exist or is not a directory",
            source.display()
        );
    }

    /// One file was copied into its extension folder
    pub fn copied(&self, file: &Path, folder: &Path) {
        let _guard = self.span.enter();
        tracing::info!("Copied {} to {}", file.display(), folder.display());
    }

    /// Dry run: a file would have been copied
    pub fn planned(&self, file: &Path, label: &ExtensionLabel) {
        let _guard = self.span.enter();
        tracing::info!(label = %label, "Would copy {}", file.display());
    }

    /// One file could not be copied
    pub fn copy_failed(&self, file: &Path, err: &dyn Display) {
        let _guard = self.span.enter();
        tracing::warn!("Failed to copy {}: {}", file.display(), err);
    }

    /// A directory could not be read; its branch is skipped
    pub fn branch_failed(&self, err: &dyn Display) {
        let _guard = self.span.enter();
        tracing::warn!("Skipping unreadable branch: {}", err);
    }

    /// The output root sits inside the source tree and is not walked
    pub fn skipped_output(&self, dir: &Path) {
        let _guard = self.span.enter();
        tracing::debug!("Not descending into output folder {}", dir.display());
    }

    /// A new extension folder was seen for the first time
    pub fn new_label(&self, label: &ExtensionLabel) {
        let _guard = self.span.enter();
        tracing::debug!(label = %label, "New extension folder");
    }

    /// Worker pool started
    pub fn pool_started(&self, workers: usize) {
        let _guard = self.span.enter();
        tracing::debug!(workers, "Copy workers started");
    }
}
