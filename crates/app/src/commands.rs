use std::path::{Path, PathBuf};
use std::sync::Arc;

use idcard_core::PreviewConfig;
use idcard_ocr::{IdCardPipeline, OcrBackend, OcrResult, PipelineError};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};

use crate::form::Preview;
use crate::preview;

/// Extensions offered by the image picker.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

#[derive(Debug, Serialize)]
pub struct CommandError {
    pub message: String,
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<std::io::Error> for CommandError {
    fn from(e: std::io::Error) -> Self {
        CommandError { message: e.to_string() }
    }
}

impl From<image::ImageError> for CommandError {
    fn from(e: image::ImageError) -> Self {
        CommandError { message: format!("Failed to decode image: {e}") }
    }
}

impl From<PipelineError> for CommandError {
    fn from(e: PipelineError) -> Self {
        CommandError { message: e.to_string() }
    }
}

/// A fully processed selection, ready to be put on the form.
#[derive(Debug)]
pub struct LoadedCard {
    pub preview: Preview,
    pub ocr: OcrResult,
}

/// A selection sent from the interface loop to the worker, with the reply slot.
pub struct LoadRequest {
    pub path: PathBuf,
    pub reply: oneshot::Sender<Result<LoadedCard, CommandError>>,
}

pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.iter().any(|s| e.eq_ignore_ascii_case(s)))
        .unwrap_or(false)
}

/// Read, preview and run extraction on one image. Any failure is returned before
/// the caller touches the form.
pub async fn load_image<R: OcrBackend + 'static>(
    pipeline: Arc<IdCardPipeline<R>>,
    path: PathBuf,
    size: PreviewConfig,
) -> Result<LoadedCard, CommandError> {
    if !is_supported_image(&path) {
        return Err(CommandError {
            message: format!("Unsupported file type: {}", path.display()),
        });
    }

    let bytes = tokio::fs::read(&path).await?;

    // Decoding and OCR are CPU bound; keep them off the async workers.
    tokio::task::spawn_blocking(move || -> Result<LoadedCard, CommandError> {
        let image = preview::load_preview(&bytes, size.width, size.height)?;
        let ocr = pipeline.process_bytes(&bytes)?;
        Ok(LoadedCard { preview: Preview { source: path, image }, ocr })
    })
    .await
    .map_err(|e| CommandError { message: format!("Image worker failed: {e}") })?
}

/// Spawn the single background worker. Requests are handled one at a time, in order.
pub fn spawn_worker<R: OcrBackend + 'static>(
    pipeline: Arc<IdCardPipeline<R>>,
    size: PreviewConfig,
) -> mpsc::Sender<LoadRequest> {
    let (tx, mut rx) = mpsc::channel::<LoadRequest>(1);
    tokio::spawn(async move {
        while let Some(request) = rx.recv().await {
            tracing::info!("Processing card image: {}", request.path.display());
            let result = load_image(pipeline.clone(), request.path, size).await;
            if request.reply.send(result).is_err() {
                tracing::warn!("Interface dropped before the result arrived");
            }
        }
    });
    tx
}

#[cfg(test)]
mod tests {
    use super::*;
    use idcard_core::Field;
    use idcard_ocr::{MockRecognizer, UnavailableRecognizer};
    use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
    use std::io::Cursor;

    fn write_png(dir: &Path, name: &str) -> PathBuf {
        let img: GrayImage = ImageBuffer::from_fn(8, 6, |x, _| Luma([(x * 30) as u8]));
        let mut buf = Vec::new();
        DynamicImage::ImageLuma8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        let path = dir.join(name);
        std::fs::write(&path, buf).unwrap();
        path
    }

    fn mock_pipeline() -> Arc<IdCardPipeline<MockRecognizer>> {
        Arc::new(IdCardPipeline::new(MockRecognizer::new([
            "주민등록증",
            "김철수",
            "800101-1234567",
            "부산시 해운대구",
            "2020",
            "05",
            "14.",
            "해운대구청장",
        ])))
    }

    #[test]
    fn extension_filter() {
        assert!(is_supported_image(Path::new("card.jpg")));
        assert!(is_supported_image(Path::new("card.JPEG")));
        assert!(is_supported_image(Path::new("/tmp/scan.Png")));
        assert!(!is_supported_image(Path::new("card.gif")));
        assert!(!is_supported_image(Path::new("card")));
    }

    #[tokio::test]
    async fn load_image_builds_preview_and_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "card.png");

        let card = load_image(mock_pipeline(), path.clone(), PreviewConfig::default())
            .await
            .unwrap();
        assert_eq!(card.preview.source, path);
        assert_eq!(card.preview.image.dimensions(), (500, 600));
        assert_eq!(card.ocr.extracted.get(Field::Name), Some("김철수"));
        assert_eq!(card.ocr.extracted.get(Field::IssueDate), Some("2020.05.14"));
    }

    #[tokio::test]
    async fn unsupported_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "card.bmp");
        let err = load_image(mock_pipeline(), path, PreviewConfig::default()).await.unwrap_err();
        assert!(err.message.contains("Unsupported file type"));
    }

    #[tokio::test]
    async fn corrupt_image_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("card.jpg");
        std::fs::write(&path, b"not really a jpeg").unwrap();
        let err = load_image(mock_pipeline(), path, PreviewConfig::default()).await.unwrap_err();
        assert!(err.message.starts_with("Failed to decode image"));
    }

    #[tokio::test]
    async fn ocr_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "card.png");
        let pipeline = Arc::new(IdCardPipeline::new(UnavailableRecognizer));
        let err = load_image(pipeline, path, PreviewConfig::default()).await.unwrap_err();
        assert!(err.message.contains("OCR recognition failed"));
    }

    #[tokio::test]
    async fn worker_replies_to_each_request() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_png(dir.path(), "a.png");
        let bad = dir.path().join("b.png");

        let tx = spawn_worker(mock_pipeline(), PreviewConfig { width: 50, height: 60 });

        let (reply, rx) = oneshot::channel();
        tx.send(LoadRequest { path: good, reply }).await.unwrap();
        let card = rx.await.unwrap().unwrap();
        assert_eq!(card.preview.image.dimensions(), (50, 60));

        let (reply, rx) = oneshot::channel();
        tx.send(LoadRequest { path: bad, reply }).await.unwrap();
        assert!(rx.await.unwrap().is_err());
    }
}
