//! In-process Tesseract engine via `leptess`.

use std::io::Cursor;
use std::path::PathBuf;

use leptess::LepTess;
use tracing::debug;

use super::{EngineFactory, LanguageSet, RecognitionEngine};
use crate::error::OcrError;
use crate::models::config::OcrConfig;

/// Creates in-process Tesseract engines. Each engine loads its own models.
#[derive(Debug, Clone, Default)]
pub struct LeptessFactory {
    tessdata_dir: Option<PathBuf>,
}

impl LeptessFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &OcrConfig) -> Self {
        Self {
            tessdata_dir: config.tessdata_dir.clone(),
        }
    }
}

impl EngineFactory for LeptessFactory {
    fn name(&self) -> &'static str {
        "leptess"
    }

    fn create(&self, languages: &LanguageSet) -> Result<Box<dyn RecognitionEngine>, OcrError> {
        let data_path = self.tessdata_dir.as_deref().and_then(|p| p.to_str());
        let tess = LepTess::new(data_path, &languages.joined()).map_err(|e| OcrError::EngineInit {
            languages: languages.joined(),
            reason: e.to_string(),
        })?;

        debug!("Loaded leptess models for {}", languages);
        Ok(Box::new(LeptessEngine { tess: Some(tess) }))
    }
}

/// A loaded Tesseract instance.
pub struct LeptessEngine {
    tess: Option<LepTess>,
}

impl RecognitionEngine for LeptessEngine {
    fn recognize(&mut self, image: &[u8]) -> Result<String, OcrError> {
        let tess = self
            .tess
            .as_mut()
            .ok_or_else(|| OcrError::Recognition("engine already released".to_string()))?;

        let png = to_png(image)?;

        tess.set_image_from_mem(&png)
            .map_err(|e| OcrError::Recognition(format!("failed to set image: {}", e)))?;

        tess.get_utf8_text()
            .map_err(|e| OcrError::Recognition(e.to_string()))
    }

    fn release(&mut self) {
        // Dropping LepTess ends the Tesseract API and frees its models.
        self.tess = None;
    }
}

/// Re-encode any supported image as PNG.
fn to_png(image: &[u8]) -> Result<Vec<u8>, OcrError> {
    let img = image::load_from_memory(image)
        .map_err(|e| OcrError::InvalidImage(format!("failed to load image: {}", e)))?;

    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| OcrError::InvalidImage(format!("failed to convert image: {}", e)))?;
    Ok(png)
}
