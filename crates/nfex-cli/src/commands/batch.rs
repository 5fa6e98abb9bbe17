//! Batch conversion command for multiple report files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use tracing::{debug, error, warn};

use nfex_core::extract::rules::format_currency;
use nfex_core::{default_output_path, WorkbookReader};

use super::config::load_config;
use super::convert::{convert_file, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern of input reports
    #[arg(required = true)]
    input: String,

    /// Output directory (default: beside each input)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "xlsx")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Outcome of converting a single file.
struct FileResult {
    path: PathBuf,
    output: Option<PathBuf>,
    records: usize,
    invoices: usize,
    total: Decimal,
    error: Option<String>,
    processing_time_ms: u64,
}

impl FileResult {
    fn status(&self) -> &'static str {
        match (&self.error, &self.output) {
            (Some(_), _) => "error",
            (None, Some(_)) => "success",
            (None, None) => "empty",
        }
    }
}

pub fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let suffix = config.export.output_suffix.as_str();

    // Earlier outputs match the same pattern; leave them alone
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| WorkbookReader::supports(p))
        .filter(|p| !is_converted_output(p, suffix))
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to convert",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        let output = output_path(&path, args.output_dir.as_deref(), suffix, args.format);

        let result = convert_file(&path, &output, args.format, &config);
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match result {
            Ok(assembly) => {
                let extraction = assembly.extraction();
                results.push(FileResult {
                    path,
                    output: extraction.map(|_| output),
                    records: extraction.map_or(0, |e| e.len()),
                    invoices: extraction.map_or(0, |e| e.invoices),
                    total: extraction.map_or(Decimal::ZERO, |e| e.total),
                    error: None,
                    processing_time_ms,
                });
            }
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to convert {}: {}", path.display(), error_msg);
                    results.push(FileResult {
                        path,
                        output: None,
                        records: 0,
                        invoices: 0,
                        total: Decimal::ZERO,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    overall_pb.abandon();
                    error!("Failed to convert {}: {}", path.display(), error_msg);
                    anyhow::bail!("Conversion failed for {}: {}", path.display(), error_msg);
                }
            }
        }

        overall_pb.inc(1);
    }

    overall_pb.finish_and_clear();

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let count = |status: &str| results.iter().filter(|r| r.status() == status).count();
    let records: usize = results.iter().map(|r| r.records).sum();
    let total: Decimal = results.iter().map(|r| r.total).sum();

    println!();
    println!(
        "{} Converted {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} empty, {} failed",
        style(count("success")).green(),
        style(count("empty")).yellow(),
        style(count("error")).red()
    );
    println!(
        "   {} records, total {}",
        records,
        format_currency(total, &config.locale)
    );

    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();
    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn is_converted_output(path: &Path, suffix: &str) -> bool {
    !suffix.is_empty()
        && path
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|stem| stem.ends_with(suffix))
}

fn output_path(input: &Path, output_dir: Option<&Path>, suffix: &str, format: OutputFormat) -> PathBuf {
    let beside = default_output_path(input, suffix, format.extension());
    match output_dir {
        Some(dir) => dir.join(beside.file_name().unwrap_or_default()),
        None => beside,
    }
}

fn write_summary(path: &Path, results: &[FileResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "records",
        "invoices",
        "total",
        "output",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result.path.file_name().and_then(|s| s.to_str()).unwrap_or("");
        let output = result
            .output
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();

        let records = result.records.to_string();
        let invoices = result.invoices.to_string();
        let total = result.total.to_string();
        let elapsed = result.processing_time_ms.to_string();

        wtr.write_record([
            filename,
            result.status(),
            records.as_str(),
            invoices.as_str(),
            total.as_str(),
            output.as_str(),
            elapsed.as_str(),
            result.error.as_deref().unwrap_or(""),
        ])?;
    }

    wtr.flush()?;
    debug!("Wrote summary for {} files", results.len());
    Ok(())
}
