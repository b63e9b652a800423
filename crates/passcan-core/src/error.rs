//! Error types for the passcan-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the passcan library.
#[derive(Error, Debug)]
pub enum PasscanError {
    /// Document input could not be read or was rejected.
    #[error("input error: {0}")]
    Input(#[from] InputError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to reading a document before recognition.
#[derive(Error, Debug)]
pub enum InputError {
    /// The file at the given path could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document contains no bytes.
    #[error("document is empty")]
    Empty,

    /// The document exceeds the configured size limit.
    #[error("document is too large ({size} bytes, maximum is {max} bytes)")]
    TooLarge { size: usize, max: usize },
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to initialize a recognition engine.
    #[error("failed to initialize engine for '{languages}': {reason}")]
    EngineInit { languages: String, reason: String },

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// The document had nothing the engine could look at.
    #[error("no recognizable pages in document")]
    NoPages,

    /// Both the primary and the fallback attempt failed.
    #[error("recognition failed with '{primary_languages}' and fallback '{fallback_languages}': {fallback_reason}")]
    RecognitionFailed {
        primary_languages: String,
        fallback_languages: String,
        fallback_reason: String,
        #[source]
        source: Box<OcrError>,
    },
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors raised while extracting fields from recognized text.
///
/// The parser never surfaces these to its caller; they are logged and the
/// affected step is skipped.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Failed to parse a value.
    #[error("failed to parse {field}: {value}")]
    Parse { field: String, value: String },

    /// Unknown month abbreviation.
    #[error("unknown month: {0}")]
    UnknownMonth(String),
}

/// Result type for the passcan library.
pub type Result<T> = std::result::Result<T, PasscanError>;
