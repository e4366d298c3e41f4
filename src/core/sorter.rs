//! Sort engine
//!
//! Validates the roots, walks the source tree, and hands every file to the
//! copier, either inline or through the worker pool. Per-file and
//! per-branch failures are logged and recorded; they never stop the run.

use crate::config::SortConfig;
use crate::core::{CopyPool, PoolConfig, WorkerContext};
use crate::error::{IoResultExt, Result, SortError};
use crate::fs::{
    ensure_subfolder, extension_label, CopyOptions, ExtensionLabel, FileCopier, TreeWalker, WalkStats,
};
use crate::logging::RunLog;
use crate::progress::ProgressReporter;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// One file to sort
#[derive(Debug, Clone)]
pub struct SortTask {
    /// File in the source tree
    pub source: PathBuf,
    /// Extension folder it belongs in
    pub label: ExtensionLabel,
    /// Final path of the copy
    pub dest: PathBuf,
}

impl SortTask {
    /// Classify `source` and work out where its copy goes
    pub fn new(source: PathBuf, output_root: &Path) -> Self {
        let label = extension_label(&source);
        let name = source
            .file_name()
            .unwrap_or_else(|| source.as_os_str())
            .to_os_string();
        let dest = output_root.join(&label).join(name);
        Self {
            source,
            label,
            dest,
        }
    }
}

/// What happened to one file
#[derive(Debug, Clone)]
pub enum TaskOutcome {
    /// The file was copied
    Copied {
        /// Source file
        source: PathBuf,
        /// Extension folder
        label: ExtensionLabel,
        /// Bytes written
        bytes: u64,
    },
    /// Dry run: the file would have been copied
    Planned {
        /// Source file
        source: PathBuf,
        /// Extension folder
        label: ExtensionLabel,
    },
    /// The file could not be copied
    Failed {
        /// Source file
        source: PathBuf,
        /// Why
        error: String,
    },
}

/// Copy one file into its extension folder
///
/// Never fails: errors are logged and returned as [`TaskOutcome::Failed`].
pub fn sort_file(
    task: &SortTask,
    output_root: &Path,
    copier: &FileCopier,
    log: &RunLog,
    dry_run: bool,
) -> TaskOutcome {
    if dry_run {
        log.planned(&task.source, &task.label);
        return TaskOutcome::Planned {
            source: task.source.clone(),
            label: task.label.clone(),
        };
    }

    let result = ensure_subfolder(output_root, &task.label)
        .and_then(|folder| copier.copy(&task.source, &task.dest).map(|stats| (folder, stats)));

    match result {
        Ok((folder, stats)) => {
            log.copied(&task.source, &folder);
            TaskOutcome::Copied {
                source: task.source.clone(),
                label: task.label.clone(),
                bytes: stats.bytes_copied,
            }
        }
        Err(err) => {
            log.copy_failed(&task.source, &err);
            TaskOutcome::Failed {
                source: task.source.clone(),
                error: err.to_string(),
            }
        }
    }
}

/// A file that could not be sorted
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    /// Source file
    pub path: PathBuf,
    /// Error message
    pub error: String,
}

/// Result of a sort run
#[derive(Debug, Clone, Default, Serialize)]
pub struct SortReport {
    /// Files copied (or planned, in a dry run)
    pub files_copied: u64,
    /// Bytes copied
    pub bytes_copied: u64,
    /// Files per extension folder
    pub by_extension: BTreeMap<String, u64>,
    /// Files that could not be copied
    pub failures: Vec<FileFailure>,
    /// Directories that could not be read
    pub branch_errors: u64,
    /// Whether this was a dry run
    pub dry_run: bool,
    /// Wall-clock time of the run
    pub duration: Duration,
}

impl SortReport {
    /// Fold one outcome into the report
    ///
    /// Returns the label when this outcome is the first one seen for it.
    pub fn record(&mut self, outcome: TaskOutcome) -> Option<ExtensionLabel> {
        let label = match outcome {
            TaskOutcome::Copied { label, bytes, .. } => {
                self.bytes_copied += bytes;
                label
            }
            TaskOutcome::Planned { label, .. } => label,
            TaskOutcome::Failed { source, error } => {
                self.failures.push(FileFailure {
                    path: source,
                    error,
                });
                return None;
            }
        };

        self.files_copied += 1;
        let count = self.by_extension.entry(label.to_string()).or_insert(0);
        *count += 1;
        (*count == 1).then_some(label)
    }

    /// Check if every file was sorted and every directory was read
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.branch_errors == 0
    }

    /// Summary as pretty-printed JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
    }

    /// Print summary to console
    pub fn print_summary(&self) {
        if self.dry_run {
            println!("\n=== Dry Run Summary ===");
            println!("Files to sort:   {}", self.files_copied);
        } else {
            println!("\n=== Sort Summary ===");
            println!("Files sorted:    {}", self.files_copied);
            println!("Bytes copied:    {}", humansize::format_size(self.bytes_copied, humansize::BINARY));
        }
        println!("Folders:         {}", self.by_extension.len());
        println!("Duration:        {}", humantime::format_duration(round_to_millis(self.duration)));

        for (label, count) in &self.by_extension {
            println!("  {:<14} {}", label, count);
        }

        if self.branch_errors > 0 {
            println!("\nUnreadable directories: {}", self.branch_errors);
        }

        if !self.failures.is_empty() {
            println!("\nFailures: {}", self.failures.len());
            for failure in &self.failures {
                println!("  {} - {}", failure.path.display(), failure.error);
            }
        }
    }
}

fn round_to_millis(duration: Duration) -> Duration {
    Duration::from_millis(duration.as_millis() as u64)
}

/// Main sort engine
pub struct SortEngine {
    /// Configuration
    config: SortConfig,
    /// File copier
    copier: FileCopier,
    /// Run log
    log: RunLog,
    /// Progress reporter
    progress: Option<ProgressReporter>,
}

impl SortEngine {
    /// Create a new sort engine
    pub fn new(config: SortConfig) -> Self {
        let copy_options = CopyOptions {
            buffer_size: config.buffer_size,
            preserve_permissions: config.preserve,
            preserve_times: config.preserve,
        };
        let log = RunLog::new(&config.source, &config.output);

        Self {
            config,
            copier: FileCopier::new(copy_options),
            log,
            progress: None,
        }
    }

    /// Replace the run log
    pub fn with_log(mut self, log: RunLog) -> Self {
        self.log = log;
        self
    }

    /// Set progress reporter
    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Check the source root before anything is created
    pub fn validate(&self) -> Result<()> {
        let source = &self.config.source;
        let metadata = match std::fs::metadata(source) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SortError::NotFound(source.clone()));
            }
            Err(e) => return Err(SortError::io(source, e)),
        };
        if !metadata.is_dir() {
            return Err(SortError::NotADirectory(source.clone()));
        }
        Ok(())
    }

    /// Validate, sort, and log the outcome
    ///
    /// A source that is missing, not a directory, or cannot be inspected is
    /// logged and yields `Ok(None)` without creating anything. A failure of
    /// the walk phase itself is logged as a generic sorting failure and also
    /// yields `Ok(None)`. Only an output root that cannot be created is
    /// returned as an error.
    pub fn run(&self) -> Result<Option<SortReport>> {
        if let Err(err) = self.validate() {
            self.clear_progress();
            self.log.invalid_source(&self.config.source, &err);
            return Ok(None);
        }

        if let Err(err) = self.prepare_output() {
            self.clear_progress();
            return Err(err);
        }
        self.log.started(&self.config.source, &self.config.output);

        match self.sort() {
            Ok(report) => {
                self.log.finished(report.files_copied, report.failures.len());
                Ok(Some(report))
            }
            Err(err) => {
                self.clear_progress();
                self.log.sort_failed(&err);
                Ok(None)
            }
        }
    }

    /// Validate, create the output root, and sort
    pub fn execute(&self) -> Result<SortReport> {
        self.validate()?;
        self.prepare_output()?;
        self.sort()
    }

    /// Create the output root if it is missing
    fn prepare_output(&self) -> Result<()> {
        if self.config.dry_run {
            return Ok(());
        }
        let output = &self.config.output;
        std::fs::create_dir_all(output).with_path(output)
    }

    /// Whether the extension folders are created inside the source root itself
    fn sorts_in_place(&self) -> bool {
        match (self.config.source.canonicalize(), self.config.output.canonicalize()) {
            (Ok(src), Ok(out)) => src == out,
            _ => false,
        }
    }

    /// Walk the source and sort every file
    fn sort(&self) -> Result<SortReport> {
        if self.sorts_in_place() {
            // Folders created during the run must not be walked, so the
            // file list is fixed before the first copy
            let (files, stats) = TreeWalker::new(&self.config.source).collect(&self.log)?;
            self.dispatch(|visit| {
                for path in files {
                    visit(path)?;
                }
                Ok(stats)
            })
        } else {
            let walker = TreeWalker::new(&self.config.source).skipping(&self.config.output);
            self.dispatch(|visit| walker.walk(&self.log, visit))
        }
    }

    /// Copy every file `feed` produces, inline or through the worker pool
    fn dispatch<F>(&self, feed: F) -> Result<SortReport>
    where
        F: FnOnce(&mut dyn FnMut(PathBuf) -> Result<()>) -> Result<WalkStats>,
    {
        let start = Instant::now();

        let context = WorkerContext {
            output_root: self.config.output.clone(),
            copier: self.copier.clone(),
            log: self.log.clone(),
            dry_run: self.config.dry_run,
        };

        let mut report = SortReport {
            dry_run: self.config.dry_run,
            ..Default::default()
        };

        let workers = self.config.effective_threads();
        let stats = if workers <= 1 {
            feed(&mut |path| {
                let task = SortTask::new(path, &context.output_root);
                let outcome = context.run(&task);
                self.record(&mut report, outcome);
                Ok(())
            })?
        } else {
            let pool_config = PoolConfig {
                workers,
                ..Default::default()
            };
            let pool = CopyPool::start(&pool_config, context.clone())?;

            let walked = feed(&mut |path| {
                pool.submit(SortTask::new(path, &context.output_root))?;
                for outcome in pool.ready() {
                    self.record(&mut report, outcome);
                }
                Ok(())
            });

            // Join the workers even when the walk was cut short
            let remaining = pool.finish();
            let stats = walked?;
            for outcome in remaining? {
                self.record(&mut report, outcome);
            }
            stats
        };

        report.branch_errors = stats.branch_errors;
        report.duration = start.elapsed();

        if let Some(progress) = &self.progress {
            progress.finish(&format!(
                "{} files sorted into {} folders",
                report.files_copied,
                report.by_extension.len()
            ));
        }

        Ok(report)
    }

    fn clear_progress(&self) {
        if let Some(progress) = &self.progress {
            progress.clear();
        }
    }

    fn record(&self, report: &mut SortReport, outcome: TaskOutcome) {
        if let Some(progress) = &self.progress {
            match &outcome {
                TaskOutcome::Copied { bytes, .. } => progress.file_copied(*bytes),
                TaskOutcome::Planned { .. } => progress.file_copied(0),
                TaskOutcome::Failed { .. } => progress.file_failed(),
            }
        }
        if let Some(label) = report.record(outcome) {
            self.log.new_label(&label);
        }
    }
}

/// Sort `source` into `output` with default settings
pub fn sort_directory(source: &Path, output: &Path) -> Result<SortReport> {
    let config = SortConfig {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        ..Default::default()
    };
    SortEngine::new(config).execute()
}
