pub mod config;
pub mod field;
pub mod result;

pub use config::{AppConfig, ConfigError, OcrConfig, PreviewConfig};
pub use field::Field;
pub use result::ExtractionResult;
