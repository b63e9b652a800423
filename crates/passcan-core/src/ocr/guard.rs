//! Scoped ownership of a recognition engine.

use tracing::trace;

use super::{EngineFactory, LanguageSet, RecognitionEngine};
use crate::error::OcrError;

/// Owns an engine and releases it when dropped.
///
/// Release happens on success, on error and during unwinding alike.
pub struct EngineGuard {
    engine: Box<dyn RecognitionEngine>,
    languages: LanguageSet,
}

impl EngineGuard {
    /// Create an engine through `factory` and take ownership of it.
    pub fn acquire(factory: &dyn EngineFactory, languages: &LanguageSet) -> Result<Self, OcrError> {
        let engine = factory.create(languages)?;
        trace!("Acquired {} engine for {}", factory.name(), languages);
        Ok(Self {
            engine,
            languages: languages.clone(),
        })
    }

    pub fn languages(&self) -> &LanguageSet {
        &self.languages
    }

    pub fn recognize(&mut self, image: &[u8]) -> Result<String, OcrError> {
        self.engine.recognize(image)
    }
}

impl Drop for EngineGuard {
    fn drop(&mut self) {
        self.engine.release();
        trace!("Released engine for {}", self.languages);
    }
}
