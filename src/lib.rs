//! # extsort - sort a directory tree by file extension
//!
//! extsort walks a source directory recursively and copies every file into
//! `<output>/<extension>/<file name>`. Files without an extension land in
//! `<output>/unknown`. Extension case is preserved, copies keep their
//! permissions and timestamps, and a file that cannot be copied is logged
//! and skipped without stopping the run.
//!
//! ## Quick Start
//!
//! ```no_run
//! use extsort::core::sort_directory;
//! use std::path::Path;
//!
//! let report = sort_directory(Path::new("Downloads"), Path::new("dist")).unwrap();
//! println!("Sorted {} files into {} folders", report.files_copied, report.by_extension.len());
//! ```
//!
//! ## Configured Run
//!
//! ```no_run
//! use extsort::config::SortConfig;
//! use extsort::core::SortEngine;
//! use extsort::progress::ProgressReporter;
//! use std::path::PathBuf;
//!
//! let config = SortConfig {
//!     source: PathBuf::from("Downloads"),
//!     output: PathBuf::from("sorted"),
//!     threads: 8,
//!     ..Default::default()
//! };
//!
//! let engine = SortEngine::new(config).with_progress(ProgressReporter::new());
//! if let Some(report) = engine.run().unwrap() {
//!     report.print_summary();
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod error;
pub mod fs;
pub mod logging;
pub mod progress;

// Re-export commonly used types
pub use config::SortConfig;
pub use core::{SortEngine, SortReport};
pub use error::{Result, SortError};
pub use fs::{extension_label, ExtensionLabel};
pub use logging::RunLog;
pub use progress::ProgressReporter;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
