//! Core library for passport and ID card OCR.
//!
//! This crate provides:
//! - Recognition with a multilingual (eng+rus+kaz) engine and an English fallback
//! - Scoped engine lifetimes: every engine is released on every exit path
//! - Field extraction from noisy Latin/Cyrillic/Kazakh text (names, passport
//!   number, IIN, ID number, gender, dates)
//! - Birth/issue/expiry date disambiguation by context and chronology
//! - PDF handling (embedded text layer or page images)
//! - An orchestration layer that always returns an outcome, never an error

pub mod error;
pub mod extract;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod pipeline;

pub use error::{PasscanError, Result};
pub use extract::{DocumentParser, ExtractionResult, PassportParser};
pub use models::config::PasscanConfig;
pub use models::document::{
    DocumentDataBuilder, ExtractedDocumentData, ExtractionOutcome, ExtractionStatus, Gender,
};
pub use models::input::{DocumentInput, DocumentKind};
pub use ocr::{EngineFactory, EngineGuard, LanguageSet, RecognitionEngine, Recognizer, TesseractCliFactory};
#[cfg(feature = "leptess")]
pub use ocr::LeptessFactory;
pub use pdf::{PdfExtractor, PdfProcessor};
pub use pipeline::{DocumentPipeline, NO_TEXT_MESSAGE, extract_document_data};
