//! Process command - extract data from a single passport or ID card.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use passcan_core::{DocumentInput, DocumentPipeline, ExtractionOutcome, ExtractionStatus};

use super::{engine_factory, load_config};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (image or PDF)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// MIME type of the input, overriding the file extension
    #[arg(long)]
    mime: Option<String>,

    /// Include the recognized text in text output
    #[arg(long)]
    show_raw: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// File extension for outputs written in this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Text => "txt",
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Recognizing document...");

    let pipeline = DocumentPipeline::new(engine_factory(&config), config);
    let input = DocumentInput::from_path(&args.input, args.mime.as_deref());
    let outcome = pipeline.extract_document_data(input).await;

    pb.finish_and_clear();

    let output = format_outcome(&outcome, args.format, args.show_raw)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    print_status(&outcome);
    debug!("Total processing time: {:?}", start.elapsed());

    if outcome.status == ExtractionStatus::Failed {
        anyhow::bail!("Extraction failed for {}", args.input.display());
    }

    Ok(())
}

fn print_status(outcome: &ExtractionOutcome) {
    match outcome.status {
        ExtractionStatus::Ok => eprintln!(
            "{} Extracted {} fields in {}ms",
            style("✓").green(),
            outcome.data.populated_fields().len(),
            outcome.processing_time_ms
        ),
        ExtractionStatus::Degraded => eprintln!(
            "{} No name, passport number or IIN found",
            style("⚠").yellow()
        ),
        ExtractionStatus::NoText => {
            eprintln!("{} No text recognized", style("⚠").yellow())
        }
        ExtractionStatus::Failed => eprintln!(
            "{} {}",
            style("✗").red(),
            outcome.data.raw_text.as_deref().unwrap_or("extraction failed")
        ),
    }

    for warning in &outcome.warnings {
        eprintln!("  {} {}", style("ℹ").blue(), warning);
    }
}

/// Render an outcome in the requested format.
pub fn format_outcome(
    outcome: &ExtractionOutcome,
    format: OutputFormat,
    show_raw: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(outcome)?),
        OutputFormat::Csv => format_csv(outcome),
        OutputFormat::Text => Ok(format_text(outcome, show_raw)),
    }
}

const CSV_HEADER: [&str; 14] = [
    "status",
    "surname",
    "name",
    "date_of_birth",
    "gender",
    "citizenship",
    "nationality",
    "birth_place",
    "passport_number",
    "passport_issue_date",
    "passport_expiry_date",
    "iin",
    "id_number",
    "processing_time_ms",
];

fn format_csv(outcome: &ExtractionOutcome) -> anyhow::Result<String> {
    let data = &outcome.data;
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(CSV_HEADER)?;
    wtr.write_record([
        outcome.status.to_string(),
        data.surname.clone().unwrap_or_default(),
        data.name.clone().unwrap_or_default(),
        data.date_of_birth.clone().unwrap_or_default(),
        data.gender.map(|g| g.code().to_string()).unwrap_or_default(),
        data.citizenship.clone().unwrap_or_default(),
        data.nationality.clone().unwrap_or_default(),
        data.birth_place.clone().unwrap_or_default(),
        data.passport_number.clone().unwrap_or_default(),
        data.passport_issue_date.clone().unwrap_or_default(),
        data.passport_expiry_date.clone().unwrap_or_default(),
        data.iin.clone().unwrap_or_default(),
        data.id_number.clone().unwrap_or_default(),
        outcome.processing_time_ms.to_string(),
    ])?;

    Ok(String::from_utf8(wtr.into_inner()?)?)
}

fn format_text(outcome: &ExtractionOutcome, show_raw: bool) -> String {
    let data = &outcome.data;
    let mut output = String::new();

    output.push_str(&format!("Status: {}\n", outcome.status));
    output.push('\n');

    let fields: [(&str, Option<&str>); 12] = [
        ("Surname", data.surname.as_deref()),
        ("Name", data.name.as_deref()),
        ("Date of birth", data.date_of_birth.as_deref()),
        ("Gender", data.gender.map(|g| g.code())),
        ("Citizenship", data.citizenship.as_deref()),
        ("Nationality", data.nationality.as_deref()),
        ("Place of birth", data.birth_place.as_deref()),
        ("Passport number", data.passport_number.as_deref()),
        ("Issue date", data.passport_issue_date.as_deref()),
        ("Expiry date", data.passport_expiry_date.as_deref()),
        ("IIN", data.iin.as_deref()),
        ("ID number", data.id_number.as_deref()),
    ];

    for (label, value) in fields {
        if let Some(value) = value {
            output.push_str(&format!("{}: {}\n", label, value));
        }
    }
    output.push_str(&format!("Processing time: {}ms\n", outcome.processing_time_ms));

    if !outcome.warnings.is_empty() {
        output.push_str("\nWarnings:\n");
        for warning in &outcome.warnings {
            output.push_str(&format!("  - {}\n", warning));
        }
    }

    if show_raw {
        if let Some(raw) = &data.raw_text {
            output.push_str("\nRecognized text:\n");
            output.push_str(raw);
            output.push('\n');
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use passcan_core::{ExtractedDocumentData, Gender};
    use pretty_assertions::assert_eq;

    fn sample_outcome() -> ExtractionOutcome {
        let data = ExtractedDocumentData {
            surname: Some("IVANOV".to_string()),
            name: Some("IVAN".to_string()),
            gender: Some(Gender::Male),
            iin: Some("880314300123".to_string()),
            raw_text: Some("raw".to_string()),
            ..Default::default()
        };
        ExtractionOutcome::new(ExtractionStatus::Ok, data)
            .with_warnings(vec!["Passport number not found".to_string()])
            .with_processing_time(42)
    }

    #[test]
    fn test_format_csv() {
        let csv = format_outcome(&sample_outcome(), OutputFormat::Csv, false).unwrap();
        let mut lines = csv.lines();

        assert_eq!(lines.next(), Some(CSV_HEADER.join(",").as_str()));
        assert_eq!(
            lines.next(),
            Some("ok,IVANOV,IVAN,,M,,,,,,,880314300123,,42")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_format_text() {
        let text = format_outcome(&sample_outcome(), OutputFormat::Text, false).unwrap();

        assert!(text.starts_with("Status: ok\n"));
        assert!(text.contains("Surname: IVANOV\n"));
        assert!(text.contains("Gender: M\n"));
        assert!(text.contains("Processing time: 42ms\n"));
        assert!(text.contains("  - Passport number not found\n"));
        assert!(!text.contains("Date of birth"));
        assert!(!text.contains("Recognized text"));

        let with_raw = format_outcome(&sample_outcome(), OutputFormat::Text, true).unwrap();
        assert!(with_raw.ends_with("Recognized text:\nraw\n"));
    }

    #[test]
    fn test_format_json() {
        let json = format_outcome(&sample_outcome(), OutputFormat::Json, false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["status"], "ok");
        assert_eq!(value["data"]["surname"], "IVANOV");
        assert_eq!(value["processingTimeMs"], 42);
    }
}
