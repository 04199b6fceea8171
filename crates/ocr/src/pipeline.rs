use std::path::Path;
use thiserror::Error;

use idcard_core::ExtractionResult;

use crate::extract::Extractor;
use crate::preprocess;
use crate::recognizer::{OcrBackend, OcrError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image preprocessing failed: {0}")]
    Preprocess(#[from] crate::preprocess::PreprocessError),
    #[error("OCR recognition failed: {0}")]
    Ocr(#[from] OcrError),
}

/// The result of processing a single card image.
#[derive(Debug, Clone)]
pub struct OcrResult {
    /// Lines returned by the OCR engine, in scan order.
    pub lines: Vec<String>,
    /// Fields classified from those lines.
    pub extracted: ExtractionResult,
}

/// Orchestrates: decode → preprocess → OCR → extract.
///
/// The recognizer is built once by the caller and owned here for the lifetime of
/// the pipeline; nothing else is kept between images.
pub struct IdCardPipeline<R: OcrBackend> {
    recognizer: R,
}

impl<R: OcrBackend> IdCardPipeline<R> {
    pub fn new(recognizer: R) -> Self {
        Self { recognizer }
    }

    /// Process a file on disk.
    pub async fn process_file(&self, path: &Path) -> Result<OcrResult, PipelineError> {
        let bytes = tokio::fs::read(path).await?;
        self.process_bytes(&bytes)
    }

    /// Process raw encoded image bytes (JPEG / PNG).
    pub fn process_bytes(&self, data: &[u8]) -> Result<OcrResult, PipelineError> {
        let image_bytes = preprocess::prepare_for_ocr_from_bytes(data)?;
        let lines = self.recognizer.recognize(&image_bytes)?;
        tracing::debug!(count = lines.len(), "OCR finished");
        let extracted = Extractor::extract(&lines);
        Ok(OcrResult { lines, extracted })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
