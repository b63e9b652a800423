//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the passcan pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PasscanConfig {
    /// OCR configuration.
    pub ocr: OcrConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Input limits.
    pub input: InputConfig,
}

/// Recognition engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Languages for the first attempt, tried together.
    pub primary_languages: Vec<String>,

    /// Languages for the single fallback attempt.
    pub fallback_languages: Vec<String>,

    /// Directory holding `*.traineddata` files (engine default if unset).
    pub tessdata_dir: Option<PathBuf>,

    /// Executable used by the command-line engine.
    pub tesseract_cmd: String,

    /// Page segmentation mode passed to the engine.
    pub page_segmentation_mode: Option<u32>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            primary_languages: vec!["eng".to_string(), "rus".to_string(), "kaz".to_string()],
            fallback_languages: vec!["eng".to_string()],
            tessdata_dir: None,
            tesseract_cmd: "tesseract".to_string(),
            page_segmentation_mode: None,
        }
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Use the embedded text layer instead of OCR when it is long enough.
    pub prefer_embedded_text: bool,

    /// Minimum text length to consider the PDF text-based.
    pub min_text_length: usize,

    /// Maximum pages to recognize (0 = unlimited).
    pub max_pages: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            prefer_embedded_text: true,
            min_text_length: 50,
            max_pages: 5,
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Characters inspected on each side of a date for context keywords.
    pub date_context_window: usize,

    /// Assign unclassified dates by chronological order.
    pub chronological_fallback: bool,

    /// Reject IIN candidates with a bad check digit.
    pub validate_iin: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            date_context_window: 50,
            chronological_fallback: true,
            validate_iin: false,
        }
    }
}

/// Limits applied before recognition starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Maximum document size in bytes (0 = unlimited).
    pub max_file_size: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024,
        }
    }
}

impl PasscanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PasscanConfig::default();
        assert_eq!(config.ocr.primary_languages, vec!["eng", "rus", "kaz"]);
        assert_eq!(config.ocr.fallback_languages, vec!["eng"]);
        assert_eq!(config.extraction.date_context_window, 50);
        assert!(config.extraction.chronological_fallback);
        assert!(!config.extraction.validate_iin);
        assert_eq!(config.input.max_file_size, 10 * 1024 * 1024);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: PasscanConfig =
            serde_json::from_str(r#"{"extraction": {"validate_iin": true}}"#).unwrap();
        assert!(config.extraction.validate_iin);
        assert_eq!(config.extraction.date_context_window, 50);
        assert_eq!(config.ocr.tesseract_cmd, "tesseract");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = PasscanConfig::default();
        config.pdf.max_pages = 2;
        config.save(&path).unwrap();

        let loaded = PasscanConfig::from_file(&path).unwrap();
        assert_eq!(loaded.pdf.max_pages, 2);
    }
}
