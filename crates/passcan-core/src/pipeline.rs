//! Orchestration: recognition, then field extraction, then a status.
//!
//! Nothing here returns an error. Every failure ends up as an
//! [`ExtractionOutcome`] whose status says what went wrong and whose
//! `rawText` carries the message.

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, warn};

use crate::error::Result;
use crate::extract::{DocumentParser, PassportParser};
use crate::models::config::PasscanConfig;
use crate::models::document::{ExtractedDocumentData, ExtractionOutcome, ExtractionStatus};
use crate::models::input::DocumentInput;
use crate::ocr::{EngineFactory, Recognizer};

/// Diagnostic placed in `rawText` when recognition yields only whitespace.
pub const NO_TEXT_MESSAGE: &str = "No text could be extracted from the document";

/// Recognition plus field extraction for one document at a time.
///
/// Cheap to clone; clones share the engine factory and parser. Concurrent
/// calls each create their own engine.
#[derive(Clone)]
pub struct DocumentPipeline {
    recognizer: Recognizer,
    parser: Arc<dyn DocumentParser>,
    config: PasscanConfig,
}

impl DocumentPipeline {
    pub fn new(factory: Arc<dyn EngineFactory>, config: PasscanConfig) -> Self {
        Self {
            recognizer: Recognizer::from_config(factory, &config.ocr, &config.pdf),
            parser: Arc::new(PassportParser::from_config(&config.extraction)),
            config,
        }
    }

    /// Replace the field parser.
    pub fn with_parser(mut self, parser: Arc<dyn DocumentParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn config(&self) -> &PasscanConfig {
        &self.config
    }

    /// Extract structured data from a document.
    ///
    /// Recognition and parsing run on the blocking pool so other calls keep
    /// making progress. A panic on the worker becomes a `Failed` outcome.
    pub async fn extract_document_data(&self, input: DocumentInput) -> ExtractionOutcome {
        let start = Instant::now();
        let description = input.describe();
        info!("Extracting document data from {}", description);

        let pipeline = self.clone();
        let outcome = match tokio::task::spawn_blocking(move || pipeline.process(&input)).await {
            Ok(outcome) => outcome,
            Err(e) => {
                let message = if e.is_panic() {
                    format!("document processing panicked: {}", panic_message(e.into_panic()))
                } else {
                    format!("document processing was cancelled: {}", e)
                };
                error!("{}: {}", description, message);
                failed(message)
            }
        };

        let elapsed = start.elapsed().as_millis() as u64;
        info!(
            "Finished {} with status {} in {} ms",
            description, outcome.status, elapsed
        );
        outcome.with_processing_time(elapsed)
    }

    /// Synchronous variant of [`extract_document_data`](Self::extract_document_data)
    /// for callers already on a blocking thread. Panics are not caught.
    pub fn process(&self, input: &DocumentInput) -> ExtractionOutcome {
        match self.recognize(input) {
            Ok(text) => self.classify(text),
            Err(e) => {
                warn!("Recognition failed for {}: {}", input.describe(), e);
                failed(e.to_string())
            }
        }
    }

    fn recognize(&self, input: &DocumentInput) -> Result<String> {
        let document = input.load(self.config.input.max_file_size)?;
        self.recognizer.recognize_document(&document)
    }

    fn classify(&self, text: String) -> ExtractionOutcome {
        if text.trim().is_empty() {
            warn!("Recognition produced no text");
            return ExtractionOutcome::new(
                ExtractionStatus::NoText,
                ExtractedDocumentData::diagnostic(NO_TEXT_MESSAGE),
            );
        }

        let result = self.parser.parse(&text);

        let status = if result.data.has_identity_anchor() {
            ExtractionStatus::Ok
        } else {
            warn!(
                "No name, passport number or IIN found in {} characters of text",
                text.chars().count()
            );
            ExtractionStatus::Degraded
        };

        ExtractionOutcome::new(status, result.data).with_warnings(result.warnings)
    }
}

/// One-shot extraction with a fresh pipeline.
pub async fn extract_document_data(
    factory: Arc<dyn EngineFactory>,
    config: &PasscanConfig,
    input: DocumentInput,
) -> ExtractionOutcome {
    DocumentPipeline::new(factory, config.clone())
        .extract_document_data(input)
        .await
}

fn failed(message: String) -> ExtractionOutcome {
    ExtractionOutcome::new(
        ExtractionStatus::Failed,
        ExtractedDocumentData::diagnostic(message),
    )
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
