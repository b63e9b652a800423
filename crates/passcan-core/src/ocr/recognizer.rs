//! Primary and fallback recognition over a loaded document.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use super::{EngineFactory, EngineGuard, LanguageSet};
use crate::error::{OcrError, Result};
use crate::models::config::{OcrConfig, PdfConfig};
use crate::models::input::LoadedDocument;
use crate::pdf::PdfExtractor;

/// Runs recognition with the primary language set and falls back once.
#[derive(Clone)]
pub struct Recognizer {
    factory: Arc<dyn EngineFactory>,
    primary: LanguageSet,
    fallback: LanguageSet,
    pdf: PdfConfig,
}

impl Recognizer {
    /// Recognizer with English, Russian and Kazakh first, English second.
    pub fn new(factory: Arc<dyn EngineFactory>) -> Self {
        Self {
            factory,
            primary: LanguageSet::multilingual(),
            fallback: LanguageSet::english(),
            pdf: PdfConfig::default(),
        }
    }

    /// Recognizer configured from OCR and PDF settings.
    pub fn from_config(factory: Arc<dyn EngineFactory>, ocr: &OcrConfig, pdf: &PdfConfig) -> Self {
        Self {
            factory,
            primary: LanguageSet::new(ocr.primary_languages.iter().cloned()),
            fallback: LanguageSet::new(ocr.fallback_languages.iter().cloned()),
            pdf: pdf.clone(),
        }
    }

    pub fn with_languages(mut self, primary: LanguageSet, fallback: LanguageSet) -> Self {
        self.primary = primary;
        self.fallback = fallback;
        self
    }

    pub fn with_pdf_config(mut self, pdf: PdfConfig) -> Self {
        self.pdf = pdf;
        self
    }

    /// Recognize the text of a document.
    ///
    /// PDFs with a long enough text layer skip the engine entirely; other
    /// PDFs are recognized page image by page image.
    pub fn recognize_document(&self, document: &LoadedDocument) -> Result<String> {
        if !document.kind.is_pdf() {
            return Ok(self.recognize_images(&[document.bytes.as_slice()])?);
        }

        let pdf = PdfExtractor::from_bytes(&document.bytes)?;

        if self.pdf.prefer_embedded_text {
            if let Some(text) = pdf.usable_text(self.pdf.min_text_length) {
                info!("Using embedded PDF text ({} chars)", text.len());
                return Ok(text);
            }
        }

        let pages = pdf.page_images_png(self.pdf.max_pages);
        if pages.is_empty() {
            return Err(OcrError::NoPages.into());
        }

        debug!("Recognizing {} PDF page images", pages.len());
        let page_refs: Vec<&[u8]> = pages.iter().map(Vec::as_slice).collect();
        Ok(self.recognize_images(&page_refs)?)
    }

    /// Recognize images with the primary languages, then the fallback.
    ///
    /// Each attempt gets a fresh engine which is released before the next
    /// attempt starts or the call returns.
    pub fn recognize_images(&self, images: &[&[u8]]) -> std::result::Result<String, OcrError> {
        if images.is_empty() {
            return Err(OcrError::NoPages);
        }

        let primary_err = match self.attempt(&self.primary, images) {
            Ok(text) => return Ok(text),
            Err(e) => e,
        };

        warn!(
            "Recognition with {} failed ({}), falling back to {}",
            self.primary, primary_err, self.fallback
        );

        self.attempt(&self.fallback, images)
            .map_err(|fallback_err| OcrError::RecognitionFailed {
                primary_languages: self.primary.joined(),
                fallback_languages: self.fallback.joined(),
                fallback_reason: fallback_err.to_string(),
                source: Box::new(primary_err),
            })
    }

    fn attempt(&self, languages: &LanguageSet, images: &[&[u8]]) -> std::result::Result<String, OcrError> {
        let start = Instant::now();
        let mut engine = EngineGuard::acquire(self.factory.as_ref(), languages)?;

        let mut pages = Vec::with_capacity(images.len());
        for image in images {
            pages.push(engine.recognize(image)?);
        }

        debug!(
            "Recognized {} image(s) with {} in {} ms",
            images.len(),
            languages,
            start.elapsed().as_millis()
        );

        Ok(pages.join("\n\n"))
    }
}
