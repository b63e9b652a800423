//! Engine backed by the `tesseract` command-line program.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;
use tracing::{debug, trace, warn};

use super::{EngineFactory, LanguageSet, RecognitionEngine};
use crate::error::OcrError;
use crate::models::config::OcrConfig;

/// Creates engines that shell out to `tesseract`.
#[derive(Debug, Clone)]
pub struct TesseractCliFactory {
    command: String,
    tessdata_dir: Option<PathBuf>,
    page_segmentation_mode: Option<u32>,
}

impl TesseractCliFactory {
    pub fn new() -> Self {
        Self::from_config(&OcrConfig::default())
    }

    pub fn from_config(config: &OcrConfig) -> Self {
        Self {
            command: config.tesseract_cmd.clone(),
            tessdata_dir: config.tessdata_dir.clone(),
            page_segmentation_mode: config.page_segmentation_mode,
        }
    }
}

impl Default for TesseractCliFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineFactory for TesseractCliFactory {
    fn name(&self) -> &'static str {
        "tesseract-cli"
    }

    fn create(&self, languages: &LanguageSet) -> Result<Box<dyn RecognitionEngine>, OcrError> {
        let init_err = |reason: String| OcrError::EngineInit {
            languages: languages.joined(),
            reason,
        };

        let available = list_languages(&self.command, self.tessdata_dir.as_deref())
            .map_err(|e| init_err(e.to_string()))?;

        let missing: Vec<&str> = languages
            .codes()
            .iter()
            .filter(|code| !available.contains(*code))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(init_err(format!("missing traineddata for {}", missing.join(", "))));
        }

        let scratch = tempfile::Builder::new()
            .prefix("passcan-ocr-")
            .tempdir()
            .map_err(|e| init_err(format!("failed to create scratch directory: {}", e)))?;

        debug!("Created tesseract engine for {} in {}", languages, scratch.path().display());

        Ok(Box::new(TesseractCliEngine {
            command: self.command.clone(),
            languages: languages.joined(),
            tessdata_dir: self.tessdata_dir.clone(),
            page_segmentation_mode: self.page_segmentation_mode,
            scratch: Some(scratch),
            pages: 0,
        }))
    }
}

/// One `tesseract` configuration plus a private scratch directory.
pub struct TesseractCliEngine {
    command: String,
    languages: String,
    tessdata_dir: Option<PathBuf>,
    page_segmentation_mode: Option<u32>,
    scratch: Option<TempDir>,
    pages: usize,
}

impl TesseractCliEngine {
    fn args(&self, image: &Path) -> Vec<String> {
        build_args(
            image,
            &self.languages,
            self.tessdata_dir.as_deref(),
            self.page_segmentation_mode,
        )
    }
}

impl RecognitionEngine for TesseractCliEngine {
    fn recognize(&mut self, image: &[u8]) -> Result<String, OcrError> {
        if image.is_empty() {
            return Err(OcrError::InvalidImage("empty image".to_string()));
        }

        let page = self.pages + 1;
        let image_path = self
            .scratch
            .as_ref()
            .map(|dir| dir.path().join(format!("page-{}.img", page)))
            .ok_or_else(|| OcrError::Recognition("engine already released".to_string()))?;
        self.pages = page;
        std::fs::write(&image_path, image)
            .map_err(|e| OcrError::Recognition(format!("failed to write scratch image: {}", e)))?;

        let args = self.args(&image_path);
        trace!("Running {} {}", self.command, args.join(" "));

        let output = Command::new(&self.command)
            .args(&args)
            .output()
            .map_err(|e| OcrError::Recognition(format!("failed to run {}: {}", self.command, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Recognition(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn release(&mut self) {
        if let Some(scratch) = self.scratch.take() {
            let path = scratch.path().to_path_buf();
            if let Err(e) = scratch.close() {
                warn!("Failed to remove scratch directory {}: {}", path.display(), e);
            }
        }
    }
}

/// Languages the installed `tesseract` can load.
pub fn list_languages(command: &str, tessdata_dir: Option<&Path>) -> Result<Vec<String>, OcrError> {
    let mut cmd = Command::new(command);
    if let Some(dir) = tessdata_dir {
        cmd.arg("--tessdata-dir").arg(dir);
    }

    let output = cmd
        .arg("--list-langs")
        .output()
        .map_err(|e| OcrError::Recognition(format!("failed to run {} --list-langs: {}", command, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(OcrError::Recognition(format!(
            "{} --list-langs failed: {}",
            command,
            stderr.trim()
        )));
    }

    Ok(parse_language_list(&String::from_utf8_lossy(&output.stdout)))
}

/// The first line of `--list-langs` output is a header.
fn parse_language_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

fn build_args(
    image: &Path,
    languages: &str,
    tessdata_dir: Option<&Path>,
    psm: Option<u32>,
) -> Vec<String> {
    let mut args = vec![
        image.display().to_string(),
        "stdout".to_string(),
        "-l".to_string(),
        languages.to_string(),
    ];

    if let Some(dir) = tessdata_dir {
        args.push("--tessdata-dir".to_string());
        args.push(dir.display().to_string());
    }

    if let Some(psm) = psm {
        args.push("--psm".to_string());
        args.push(psm.to_string());
    }

    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_language_list() {
        let stdout = "List of available languages in \"/usr/share/tessdata/\" (4):\neng\nkaz\nosd\nrus\n";
        assert_eq!(parse_language_list(stdout), vec!["eng", "kaz", "osd", "rus"]);
        assert!(parse_language_list("").is_empty());
    }

    #[test]
    fn test_build_args() {
        let args = build_args(Path::new("/tmp/p.img"), "eng+rus+kaz", None, None);
        assert_eq!(args, vec!["/tmp/p.img", "stdout", "-l", "eng+rus+kaz"]);

        let args = build_args(
            Path::new("/tmp/p.img"),
            "eng",
            Some(Path::new("/opt/tessdata")),
            Some(6),
        );
        assert_eq!(
            args,
            vec!["/tmp/p.img", "stdout", "-l", "eng", "--tessdata-dir", "/opt/tessdata", "--psm", "6"]
        );
    }

    #[test]
    fn test_missing_executable_fails_init() {
        let factory = TesseractCliFactory::from_config(&OcrConfig {
            tesseract_cmd: "/nonexistent/tesseract-binary".to_string(),
            ..Default::default()
        });

        match factory.create(&LanguageSet::english()) {
            Err(OcrError::EngineInit { languages, .. }) => assert_eq!(languages, "eng"),
            Err(other) => panic!("expected EngineInit, got {:?}", other),
            Ok(_) => panic!("expected EngineInit, got an engine"),
        }
    }

    #[test]
    fn test_release_removes_scratch_dir() {
        let scratch = tempfile::tempdir().unwrap();
        let path = scratch.path().to_path_buf();
        let mut engine = TesseractCliEngine {
            command: "tesseract".to_string(),
            languages: "eng".to_string(),
            tessdata_dir: None,
            page_segmentation_mode: None,
            scratch: Some(scratch),
            pages: 0,
        };

        engine.release();
        assert!(!path.exists());
        assert!(engine.recognize(b"img").is_err());

        // second release is a no-op
        engine.release();
    }
}
