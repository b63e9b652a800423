//! Recognition stage: turns document images into raw text.
//!
//! Engines are created per call through an [`EngineFactory`] and held by an
//! [`EngineGuard`], which releases them on every exit path. No engine is
//! shared between calls.

mod guard;
#[cfg(feature = "leptess")]
mod leptess_engine;
mod recognizer;
mod tesseract_cli;

pub use guard::EngineGuard;
#[cfg(feature = "leptess")]
pub use leptess_engine::{LeptessEngine, LeptessFactory};
pub use recognizer::Recognizer;
pub use tesseract_cli::{TesseractCliEngine, TesseractCliFactory, list_languages};

use std::fmt;

use crate::error::OcrError;

/// Ordered set of recognition language codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageSet {
    codes: Vec<String>,
}

impl LanguageSet {
    /// Build a set from language codes. An empty list means English.
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let codes: Vec<String> = codes
            .into_iter()
            .map(Into::into)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();

        if codes.is_empty() {
            Self::english()
        } else {
            Self { codes }
        }
    }

    /// English, Russian and Kazakh together.
    pub fn multilingual() -> Self {
        Self::new(["eng", "rus", "kaz"])
    }

    /// English only.
    pub fn english() -> Self {
        Self {
            codes: vec!["eng".to_string()],
        }
    }

    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    /// Codes joined the way Tesseract expects them, e.g. `eng+rus+kaz`.
    pub fn joined(&self) -> String {
        self.codes.join("+")
    }
}

impl fmt::Display for LanguageSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}

/// A live recognition engine configured for one language set.
pub trait RecognitionEngine {
    /// Recognize the text in one encoded image.
    fn recognize(&mut self, image: &[u8]) -> Result<String, OcrError>;

    /// Free the engine's resources. Called exactly once, by [`EngineGuard`].
    fn release(&mut self);
}

/// Creates recognition engines.
///
/// Shared between concurrent calls, so it holds configuration only.
pub trait EngineFactory: Send + Sync {
    /// Short name for log lines.
    fn name(&self) -> &'static str;

    /// Create a new engine for `languages`.
    fn create(&self, languages: &LanguageSet) -> Result<Box<dyn RecognitionEngine>, OcrError>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted engines for recognizer and pipeline tests.

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// What a mock engine does for one language set.
    #[derive(Clone)]
    pub enum Script {
        Text(String),
        FailInit,
        FailRecognize,
        Panic,
    }

    /// Factory whose engines follow a script keyed by joined language codes.
    #[derive(Clone)]
    pub struct MockFactory {
        scripts: Vec<(String, Script)>,
        acquired: Arc<AtomicUsize>,
        released: Arc<AtomicUsize>,
        seen_languages: Arc<std::sync::Mutex<Vec<String>>>,
    }

    impl MockFactory {
        pub fn new() -> Self {
            Self {
                scripts: Vec::new(),
                acquired: Arc::new(AtomicUsize::new(0)),
                released: Arc::new(AtomicUsize::new(0)),
                seen_languages: Arc::new(std::sync::Mutex::new(Vec::new())),
            }
        }

        pub fn on(mut self, languages: &str, script: Script) -> Self {
            self.scripts.push((languages.to_string(), script));
            self
        }

        pub fn acquired(&self) -> usize {
            self.acquired.load(Ordering::SeqCst)
        }

        pub fn released(&self) -> usize {
            self.released.load(Ordering::SeqCst)
        }

        pub fn seen(&self) -> Vec<String> {
            self.seen_languages.lock().unwrap().clone()
        }
    }

    struct MockEngine {
        script: Script,
        released: Arc<AtomicUsize>,
    }

    impl RecognitionEngine for MockEngine {
        fn recognize(&mut self, _image: &[u8]) -> Result<String, OcrError> {
            match &self.script {
                Script::Text(text) => Ok(text.clone()),
                Script::FailRecognize => Err(OcrError::Recognition("scripted failure".to_string())),
                Script::Panic => panic!("scripted panic"),
                Script::FailInit => unreachable!(),
            }
        }

        fn release(&mut self) {
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl EngineFactory for MockFactory {
        fn name(&self) -> &'static str {
            "mock"
        }

        fn create(&self, languages: &LanguageSet) -> Result<Box<dyn RecognitionEngine>, OcrError> {
            let key = languages.joined();
            self.seen_languages.lock().unwrap().push(key.clone());

            let script = self
                .scripts
                .iter()
                .find(|(langs, _)| *langs == key)
                .map(|(_, s)| s.clone())
                .unwrap_or(Script::FailInit);

            if let Script::FailInit = script {
                return Err(OcrError::EngineInit {
                    languages: key,
                    reason: "scripted init failure".to_string(),
                });
            }

            self.acquired.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(MockEngine {
                script,
                released: Arc::clone(&self.released),
            }))
        }
    }
}
