//! Configuration settings for extsort
//!
//! Defines the CLI arguments, their defaults, and the runtime configuration
//! derived from them.

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default output folder when none is given
pub const DEFAULT_OUTPUT: &str = "dist";

/// Largest accepted copy buffer (1 GiB)
pub const MAX_BUFFER_SIZE: u64 = 1024 * 1024 * 1024;

/// extsort - sort a directory tree into per-extension folders
#[derive(Parser, Debug, Clone)]
#[command(name = "extsort")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Copy every file of a tree into folders named after its extension")]
#[command(long_about = r#"
extsort walks SOURCE recursively and copies each file into
OUTPUT/<extension>/<file name>. Files without an extension go to
OUTPUT/unknown. Extension case is preserved, existing copies are
overwritten, and a file that cannot be copied is logged and skipped.

Examples:
  extsort ~/Downloads                 # sort into ./dist
  extsort ~/Downloads sorted -t 8     # eight copy workers
  extsort photos --dry-run            # only show what would happen
"#)]
pub struct CliArgs {
    /// Folder to sort
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Folder that receives the per-extension subfolders
    #[arg(value_name = "OUTPUT", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Number of copy workers (0 = auto-detect, 1 = sequential)
    #[arg(short = 't', long, default_value = "0", value_name = "NUM")]
    pub threads: usize,

    /// Buffer size for file copies (e.g., 1M, 64K)
    #[arg(short = 'b', long, default_value = "1M", value_name = "SIZE")]
    pub buffer_size: String,

    /// Do not copy permissions and timestamps
    #[arg(long)]
    pub no_preserve: bool,

    /// Dry run (show what would be copied)
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Show a progress spinner
    #[arg(short = 'p', long)]
    pub progress: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only, no summary)
    #[arg(short = 'q', long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Emit log lines as JSON
    #[arg(long)]
    pub log_json: bool,
}

impl CliArgs {
    /// Log line format chosen on the command line
    pub fn log_format(&self) -> LogFormat {
        if self.log_json {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }

    /// Summary format chosen on the command line
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Log line format
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Output format for the run summary
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON format
    Json,
}

/// Runtime configuration derived from CLI args
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortConfig {
    /// Source root
    pub source: PathBuf,
    /// Output root
    pub output: PathBuf,
    /// Worker count (0 = auto)
    pub threads: usize,
    /// Copy buffer size in bytes
    pub buffer_size: usize,
    /// Preserve permissions and timestamps
    pub preserve: bool,
    /// Dry run mode
    pub dry_run: bool,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::new(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            threads: 0, // Auto-detect
            buffer_size: 1024 * 1024, // 1MB
            preserve: true,
            dry_run: false,
        }
    }
}

impl SortConfig {
    /// Create config from CLI arguments
    pub fn from_cli(args: &CliArgs) -> Result<Self, String> {
        let buffer_size = parse_size(&args.buffer_size)
            .map_err(|e| format!("Invalid buffer size: {}", e))?;
        if buffer_size == 0 {
            return Err("Invalid buffer size: must be greater than zero".to_string());
        }
        if buffer_size > MAX_BUFFER_SIZE {
            return Err(format!(
                "Invalid buffer size: {} exceeds the {} limit",
                args.buffer_size,
                humansize::format_size(MAX_BUFFER_SIZE, humansize::BINARY)
            ));
        }

        Ok(Self {
            source: args.source.clone(),
            output: args.output.clone(),
            threads: args.threads,
            buffer_size: buffer_size as usize,
            preserve: !args.no_preserve,
            dry_run: args.dry_run,
        })
    }

    /// Worker count with `0` resolved to the number of CPUs
    pub fn effective_threads(&self) -> usize {
        if self.threads == 0 {
            num_cpus::get()
        } else {
            self.threads
        }
    }
}

/// Parse human-readable size string to bytes
pub fn parse_size(size: &str) -> Result<u64, String> {
    let size = size.trim().to_uppercase();

    if size.is_empty() {
        return Err("Empty size string".to_string());
    }

    let (num_str, multiplier) = if size.ends_with("GB") || size.ends_with('G') {
        (size.trim_end_matches(['G', 'B']), 1024u64 * 1024 * 1024)
    } else if size.ends_with("MB") || size.ends_with('M') {
        (size.trim_end_matches(['M', 'B']), 1024u64 * 1024)
    } else if size.ends_with("KB") || size.ends_with('K') {
        (size.trim_end_matches(['K', 'B']), 1024u64)
    } else if size.ends_with('B') {
        (size.trim_end_matches('B'), 1u64)
    } else {
        // Assume bytes if no suffix
        (size.as_str(), 1u64)
    };

    let num: f64 = num_str
        .trim()
        .parse()
        .map_err(|_| format!("Invalid number: {}", num_str))?;

    if !num.is_finite() || num < 0.0 {
        return Err(format!("Invalid number: {}", num_str));
    }

    Ok((num * multiplier as f64) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("1024").unwrap(), 1024);
        assert_eq!(parse_size("1K").unwrap(), 1024);
        assert_eq!(parse_size("64kb").unwrap(), 64 * 1024);
        assert_eq!(parse_size("1M").unwrap(), 1024 * 1024);
        assert_eq!(parse_size("1G").unwrap(), 1024 * 1024 * 1024);
        assert_eq!(parse_size("1.5M").unwrap(), (1.5 * 1024.0 * 1024.0) as u64);
        assert!(parse_size("").is_err());
        assert!(parse_size("lots").is_err());
        assert!(parse_size("-1K").is_err());
    }

    #[test]
    fn test_cli_defaults() {
        let args = CliArgs::try_parse_from(["extsort", "photos"]).unwrap();
        assert_eq!(args.source, PathBuf::from("photos"));
        assert_eq!(args.output, PathBuf::from(DEFAULT_OUTPUT));

        let config = SortConfig::from_cli(&args).unwrap();
        assert_eq!(config.threads, 0);
        assert_eq!(config.buffer_size, 1024 * 1024);
        assert!(config.preserve);
        assert!(!config.dry_run);
    }

    #[test]
    fn test_cli_all_flags() {
        let args = CliArgs::try_parse_from([
            "extsort", "in", "out", "-t", "4", "-b", "64K", "--no-preserve", "-n", "--json",
        ])
        .unwrap();
        let config = SortConfig::from_cli(&args).unwrap();

        assert_eq!(config.output, PathBuf::from("out"));
        assert_eq!(config.threads, 4);
        assert_eq!(config.buffer_size, 64 * 1024);
        assert!(!config.preserve);
        assert!(config.dry_run);
        assert_eq!(args.output_format(), OutputFormat::Json);
        assert_eq!(args.log_format(), LogFormat::Text);
    }

    #[test]
    fn test_cli_requires_source() {
        assert!(CliArgs::try_parse_from(["extsort"]).is_err());
    }

    #[test]
    fn test_cli_quiet_conflicts_with_verbose() {
        assert!(CliArgs::try_parse_from(["extsort", "src", "-q", "-v"]).is_err());
    }

    #[test]
    fn test_zero_buffer_rejected() {
        let args = CliArgs::try_parse_from(["extsort", "src", "-b", "0"]).unwrap();
        assert!(SortConfig::from_cli(&args).is_err());
    }

    #[test]
    fn test_oversized_buffer_rejected() {
        let args = CliArgs::try_parse_from(["extsort", "src", "-t", "1", "-b", "1e30"]).unwrap();
        let err = SortConfig::from_cli(&args).unwrap_err();
        assert!(err.contains("1e30"));

        let args = CliArgs::try_parse_from(["extsort", "src", "-b", "2G"]).unwrap();
        assert!(SortConfig::from_cli(&args).is_err());

        let args = CliArgs::try_parse_from(["extsort", "src", "-b", "1G"]).unwrap();
        let config = SortConfig::from_cli(&args).unwrap();
        assert_eq!(config.buffer_size as u64, MAX_BUFFER_SIZE);
    }

    #[test]
    fn test_effective_threads() {
        let config = SortConfig {
            threads: 3,
            ..Default::default()
        };
        assert_eq!(config.effective_threads(), 3);

        let auto = SortConfig::default();
        assert!(auto.effective_threads() >= 1);
    }
}
