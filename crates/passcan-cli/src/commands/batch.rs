//! Batch processing command for multiple passports and ID cards.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use futures_util::stream::{self, StreamExt};
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use passcan_core::{DocumentInput, DocumentPipeline, ExtractionOutcome, ExtractionStatus};

use super::process::{OutputFormat, format_outcome};
use super::{engine_factory, load_config};

const SUPPORTED_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "bmp", "heic", "heif", "pdf"];

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of documents processed concurrently
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Outcome of one file in a batch.
struct BatchEntry {
    path: PathBuf,
    outcome: ExtractionOutcome,
}

impl BatchEntry {
    fn is_failed(&self) -> bool {
        self.outcome.status == ExtractionStatus::Failed
    }

    fn error(&self) -> Option<&str> {
        if self.is_failed() {
            self.outcome.data.raw_text.as_deref()
        } else {
            None
        }
    }
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| is_supported(p))
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let pipeline = DocumentPipeline::new(engine_factory(&config), config);
    let mut pending = stream::iter(files)
        .map(|path| {
            let pipeline = pipeline.clone();
            async move {
                let input = DocumentInput::from_path(&path, None);
                let outcome = pipeline.extract_document_data(input).await;
                BatchEntry { path, outcome }
            }
        })
        .buffer_unordered(args.jobs.max(1));

    let mut entries = Vec::new();
    while let Some(entry) = pending.next().await {
        pb.inc(1);

        if let Some(reason) = entry.error() {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", entry.path.display(), reason);
            } else {
                error!("Failed to process {}: {}", entry.path.display(), reason);
                pb.abandon();
                anyhow::bail!("Processing failed for {}: {}", entry.path.display(), reason);
            }
        }

        if let Some(output_dir) = &args.output_dir {
            write_output(output_dir, &entry, args.format)?;
        }

        entries.push(entry);
    }

    pb.finish_with_message("Complete");
    entries.sort_by(|a, b| a.path.cmp(&b.path));

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &entries)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<_> = entries.iter().filter(|e| e.is_failed()).collect();
    let count = |status| entries.iter().filter(|e| e.outcome.status == status).count();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        entries.len(),
        start.elapsed()
    );
    println!(
        "   {} ok, {} degraded, {} no text, {} failed",
        style(count(ExtractionStatus::Ok)).green(),
        style(count(ExtractionStatus::Degraded)).yellow(),
        style(count(ExtractionStatus::NoText)).yellow(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for entry in &failed {
            println!(
                "  - {}: {}",
                entry.path.display(),
                entry.error().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn write_output(output_dir: &Path, entry: &BatchEntry, format: OutputFormat) -> anyhow::Result<()> {
    let stem = entry
        .path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    let output_path = output_dir.join(format!("{}.{}", stem, format.extension()));

    fs::write(&output_path, format_outcome(&entry.outcome, format, false)?)?;
    debug!("Wrote output to {}", output_path.display());
    Ok(())
}

fn write_summary(path: &Path, entries: &[BatchEntry]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "surname",
        "name",
        "passport_number",
        "iin",
        "date_of_birth",
        "processing_time_ms",
        "error",
    ])?;

    for entry in entries {
        let filename = entry
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        let data = &entry.outcome.data;

        wtr.write_record([
            filename,
            &entry.outcome.status.to_string(),
            data.surname.as_deref().unwrap_or(""),
            data.name.as_deref().unwrap_or(""),
            data.passport_number.as_deref().unwrap_or(""),
            data.iin.as_deref().unwrap_or(""),
            data.date_of_birth.as_deref().unwrap_or(""),
            &entry.outcome.processing_time_ms.to_string(),
            entry.error().unwrap_or(""),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
