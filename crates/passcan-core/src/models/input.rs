//! Document input: the bytes (or path) handed to the recognition stage.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// Declared content type of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Jpeg,
    Png,
    Bmp,
    /// HEIC or HEIF.
    Heic,
    Pdf,
    /// Generic binary; extension-based inference applies.
    Unknown,
}

impl DocumentKind {
    /// Map a MIME type to a document kind.
    pub fn from_mime(mime: &str) -> Self {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Self::Jpeg,
            "image/png" => Self::Png,
            "image/bmp" => Self::Bmp,
            "image/heic" | "image/heif" => Self::Heic,
            "application/pdf" => Self::Pdf,
            _ => Self::Unknown,
        }
    }

    /// Map a file extension (without the dot) to a document kind.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "bmp" => Some(Self::Bmp),
            "heic" | "heif" => Some(Self::Heic),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    /// Resolve the kind from a declared MIME type and an optional file name.
    ///
    /// The declared type wins unless it is missing or generic, in which case
    /// the file extension decides. Falls back to JPEG when nothing is known.
    pub fn resolve(mime: Option<&str>, file_name: Option<&Path>) -> Self {
        let declared = mime.map(Self::from_mime).unwrap_or(Self::Unknown);
        if declared != Self::Unknown {
            return declared;
        }

        file_name
            .and_then(|p| p.extension())
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
            .unwrap_or(Self::Jpeg)
    }

    /// Canonical MIME type for this kind.
    pub fn mime(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Bmp => "image/bmp",
            Self::Heic => "image/heic",
            Self::Pdf => "application/pdf",
            Self::Unknown => "application/octet-stream",
        }
    }

    pub fn is_pdf(&self) -> bool {
        matches!(self, Self::Pdf)
    }
}

/// Where the document bytes come from.
#[derive(Debug, Clone)]
pub enum DocumentSource {
    /// In-memory buffer.
    Bytes(Vec<u8>),
    /// File on disk, read when the extraction call starts.
    Path(PathBuf),
}

/// A document handed to the pipeline for one extraction call.
#[derive(Debug, Clone)]
pub struct DocumentInput {
    pub source: DocumentSource,
    pub kind: DocumentKind,
}

impl DocumentInput {
    /// Input from an in-memory buffer with an optional declared MIME type.
    pub fn from_bytes(bytes: Vec<u8>, mime: Option<&str>) -> Self {
        Self {
            source: DocumentSource::Bytes(bytes),
            kind: DocumentKind::resolve(mime, None),
        }
    }

    /// Input from a path; the extension is used when the MIME type is
    /// missing or generic.
    pub fn from_path(path: impl Into<PathBuf>, mime: Option<&str>) -> Self {
        let path = path.into();
        let kind = DocumentKind::resolve(mime, Some(&path));
        Self {
            source: DocumentSource::Path(path),
            kind,
        }
    }

    /// Human-readable description for log lines.
    pub fn describe(&self) -> String {
        match &self.source {
            DocumentSource::Bytes(b) => format!("<{} bytes, {}>", b.len(), self.kind.mime()),
            DocumentSource::Path(p) => format!("{} ({})", p.display(), self.kind.mime()),
        }
    }

    /// Read the document bytes, enforcing the size limit.
    pub fn load(&self, max_size: usize) -> Result<LoadedDocument, InputError> {
        let bytes = match &self.source {
            DocumentSource::Bytes(b) => b.clone(),
            DocumentSource::Path(p) => std::fs::read(p).map_err(|e| InputError::Read {
                path: p.clone(),
                source: e,
            })?,
        };

        if bytes.is_empty() {
            return Err(InputError::Empty);
        }

        if max_size > 0 && bytes.len() > max_size {
            return Err(InputError::TooLarge {
                size: bytes.len(),
                max: max_size,
            });
        }

        // Declared types are not trusted over the PDF magic number.
        let kind = if bytes.starts_with(b"%PDF-") {
            DocumentKind::Pdf
        } else {
            self.kind
        };

        Ok(LoadedDocument { bytes, kind })
    }
}

/// Document bytes after loading, with the effective kind.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub bytes: Vec<u8>,
    pub kind: DocumentKind,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_mime() {
        assert_eq!(DocumentKind::from_mime("image/jpeg"), DocumentKind::Jpeg);
        assert_eq!(DocumentKind::from_mime("IMAGE/JPG"), DocumentKind::Jpeg);
        assert_eq!(DocumentKind::from_mime("image/heif"), DocumentKind::Heic);
        assert_eq!(DocumentKind::from_mime("application/pdf"), DocumentKind::Pdf);
        assert_eq!(
            DocumentKind::from_mime("application/octet-stream"),
            DocumentKind::Unknown
        );
    }

    #[test]
    fn test_resolve_generic_mime_uses_extension() {
        let kind = DocumentKind::resolve(
            Some("application/octet-stream"),
            Some(Path::new("scan.PDF")),
        );
        assert_eq!(kind, DocumentKind::Pdf);

        let kind = DocumentKind::resolve(None, Some(Path::new("photo.heic")));
        assert_eq!(kind, DocumentKind::Heic);
    }

    #[test]
    fn test_resolve_declared_mime_wins() {
        let kind = DocumentKind::resolve(Some("image/png"), Some(Path::new("doc.pdf")));
        assert_eq!(kind, DocumentKind::Png);
    }

    #[test]
    fn test_resolve_defaults_to_jpeg() {
        assert_eq!(DocumentKind::resolve(None, None), DocumentKind::Jpeg);
        assert_eq!(
            DocumentKind::resolve(Some("text/plain"), Some(Path::new("upload"))),
            DocumentKind::Jpeg
        );
    }

    #[test]
    fn test_load_rejects_empty_and_oversized() {
        let input = DocumentInput::from_bytes(Vec::new(), Some("image/png"));
        assert!(matches!(input.load(0), Err(InputError::Empty)));

        let input = DocumentInput::from_bytes(vec![0u8; 16], Some("image/png"));
        match input.load(8) {
            Err(InputError::TooLarge { size, max }) => {
                assert_eq!(size, 16);
                assert_eq!(max, 8);
            }
            other => panic!("expected TooLarge, got {:?}", other),
        }
    }

    #[test]
    fn test_load_sniffs_pdf() {
        let input = DocumentInput::from_bytes(b"%PDF-1.7 rest".to_vec(), Some("image/jpeg"));
        let loaded = input.load(0).unwrap();
        assert_eq!(loaded.kind, DocumentKind::Pdf);
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::with_suffix(".png").unwrap();
        file.write_all(b"not really a png").unwrap();

        let input = DocumentInput::from_path(file.path(), None);
        assert_eq!(input.kind, DocumentKind::Png);

        let loaded = input.load(1024).unwrap();
        assert_eq!(loaded.bytes, b"not really a png");
    }

    #[test]
    fn test_load_missing_path() {
        let input = DocumentInput::from_path("/nonexistent/passport.jpg", None);
        match input.load(0) {
            Err(InputError::Read { path, .. }) => {
                assert_eq!(path, PathBuf::from("/nonexistent/passport.jpg"));
            }
            other => panic!("expected Read error, got {:?}", other),
        }
    }
}
