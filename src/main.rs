//! extsort CLI - sort a directory tree into per-extension folders

use clap::Parser;
use extsort::config::{CliArgs, OutputFormat, SortConfig};
use extsort::core::SortEngine;
use extsort::error::{Result, SortError};
use extsort::logging::init_tracing;
use extsort::progress::ProgressReporter;

fn main() {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Create progress reporter
    let progress = if args.progress && !args.quiet {
        ProgressReporter::new()
    } else {
        ProgressReporter::disabled()
    };

    // Initialize logging
    init_tracing(args.verbose, args.quiet, args.log_format(), &progress);

    // Handle result
    if let Err(e) = run(args, progress) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: CliArgs, progress: ProgressReporter) -> Result<()> {
    // Build configuration
    let config = match SortConfig::from_cli(&args) {
        Ok(config) => config,
        Err(message) => {
            progress.clear();
            return Err(SortError::config(message));
        }
    };

    if args.verbose > 0 {
        progress.suspend(|| print_config(&config));
    }

    let engine = SortEngine::new(config).with_progress(progress);

    // None means the problem was already logged: invalid source or a
    // failed walk. Neither is a crash.
    let Some(report) = engine.run()? else {
        return Ok(());
    };

    if !args.quiet {
        match args.output_format() {
            OutputFormat::Text => report.print_summary(),
            OutputFormat::Json => println!("{}", report.to_json()),
        }
    }

    Ok(())
}

fn print_config(config: &SortConfig) {
    println!("=== Configuration ===");
    println!("Source:      {}", config.source.display());
    println!("Output:      {}", config.output.display());
    println!("Threads:     {}", config.effective_threads());
    println!("Buffer:      {}", humansize::format_size(config.buffer_size as u64, humansize::BINARY));
    println!("Preserve:    {}", config.preserve);
    println!("Dry run:     {}", config.dry_run);
    println!();
}
