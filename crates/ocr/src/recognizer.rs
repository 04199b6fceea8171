use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Image decode error: {0}")]
    ImageDecode(String),
    #[error("OCR engine error: {0}")]
    Engine(String),
    #[error("Tesseract not available — build with `tesseract` feature")]
    NotAvailable,
}

/// Abstraction over an OCR backend.
/// Implementations accept preprocessed PNG bytes and return the recognized text lines
/// in the engine's scan order.
pub trait OcrBackend: Send + Sync {
    fn recognize(&self, image_bytes: &[u8]) -> Result<Vec<String>, OcrError>;
}

impl<T: OcrBackend + ?Sized> OcrBackend for Box<T> {
    fn recognize(&self, image_bytes: &[u8]) -> Result<Vec<String>, OcrError> {
        (**self).recognize(image_bytes)
    }
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Returns a pre-set list of lines, so the extraction pipeline can be exercised
/// without an OCR engine installed.
pub struct MockRecognizer {
    pub lines: Vec<String>,
}

impl MockRecognizer {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { lines: lines.into_iter().map(Into::into).collect() }
    }
}

impl OcrBackend for MockRecognizer {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<Vec<String>, OcrError> {
        Ok(self.lines.clone())
    }
}

/// Stand-in used when no engine was compiled in. Every run fails with
/// [`OcrError::NotAvailable`].
pub struct UnavailableRecognizer;

impl OcrBackend for UnavailableRecognizer {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<Vec<String>, OcrError> {
        Err(OcrError::NotAvailable)
    }
}

/// Split engine output into trimmed, non-empty lines.
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

// ── Tesseract backend (optional, gated behind `tesseract` feature) ─────────────

#[cfg(feature = "tesseract")]
pub mod tesseract_backend {
    use super::{split_lines, OcrBackend, OcrError};
    use leptess::LepTess;
    use std::sync::Mutex;

    /// Holds one engine instance for the lifetime of the process; initialization
    /// loads the language models and is the expensive part.
    pub struct TesseractRecognizer {
        engine: Mutex<LepTess>,
    }

    impl TesseractRecognizer {
        pub fn new(data_path: Option<&str>, lang: &str) -> Result<Self, OcrError> {
            let engine = LepTess::new(data_path, lang).map_err(|e| OcrError::Engine(e.to_string()))?;
            Ok(Self { engine: Mutex::new(engine) })
        }
    }

    impl OcrBackend for TesseractRecognizer {
        fn recognize(&self, image_bytes: &[u8]) -> Result<Vec<String>, OcrError> {
            let mut lt = self
                .engine
                .lock()
                .map_err(|_| OcrError::Engine("engine lock poisoned".to_string()))?;
            lt.set_image_from_mem(image_bytes)
                .map_err(|e| OcrError::ImageDecode(e.to_string()))?;
            let text = lt.get_utf8_text().map_err(|e| OcrError::Engine(e.to_string()))?;
            Ok(split_lines(&text))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_returns_preset_lines() {
        let r = MockRecognizer::new(["홍길동", "800101-1234567"]);
        assert_eq!(r.recognize(b"fake image data").unwrap(), vec!["홍길동", "800101-1234567"]);
    }

    #[test]
    fn mock_ignores_image_content() {
        let r = MockRecognizer::new(["hello"]);
        assert_eq!(r.recognize(b"anything").unwrap(), vec!["hello"]);
        assert_eq!(r.recognize(b"").unwrap(), vec!["hello"]);
    }

    #[test]
    fn unavailable_always_fails() {
        let r = UnavailableRecognizer;
        assert!(matches!(r.recognize(b"png"), Err(OcrError::NotAvailable)));
    }

    #[test]
    fn boxed_backend_delegates() {
        let r: Box<dyn OcrBackend> = Box::new(MockRecognizer::new(["2020"]));
        assert_eq!(r.recognize(b"").unwrap(), vec!["2020"]);
    }

    #[test]
    fn split_lines_drops_blank_lines() {
        let lines = split_lines("  주민등록증 \n\n홍길동(洪吉童)\n   \n800101-1234567\n");
        assert_eq!(lines, vec!["주민등록증", "홍길동(洪吉童)", "800101-1234567"]);
    }
}
