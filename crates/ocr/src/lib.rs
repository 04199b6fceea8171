pub mod extract;
pub mod pipeline;
pub mod preprocess;
pub mod recognizer;

pub use extract::{Extractor, FieldUpdate, Matcher, MATCHERS};
pub use pipeline::{IdCardPipeline, OcrResult, PipelineError};
pub use preprocess::{prepare_for_ocr, prepare_for_ocr_from_bytes, preprocess, PreprocessError};
pub use recognizer::{split_lines, MockRecognizer, OcrBackend, OcrError, UnavailableRecognizer};

#[cfg(feature = "tesseract")]
pub use recognizer::tesseract_backend::TesseractRecognizer;
