use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use idcard_core::{AppConfig, OcrConfig};
use idcard_ocr::{IdCardPipeline, OcrBackend, OcrError};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::oneshot;
use tracing_subscriber::EnvFilter;

mod commands;
mod form;
mod preview;

use commands::LoadRequest;
use form::IdCardForm;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match directories::ProjectDirs::from("com", "idcard", "IdCard") {
        Some(dirs) => {
            let path = dirs.config_dir().join("idcard.toml");
            tracing::debug!("Config file: {}", path.display());
            AppConfig::load(&path).context("Failed to load configuration")?
        }
        None => AppConfig::default(),
    };

    // ── OCR engine, built once and owned by the pipeline ─────────────────────
    let recognizer = build_recognizer(&config.ocr).context("Failed to start OCR engine")?;
    let pipeline = Arc::new(IdCardPipeline::new(recognizer));

    // The worker does decoding and OCR; this task only reads selections and draws.
    let worker = commands::spawn_worker(pipeline, config.preview);

    let mut form = IdCardForm::default();
    println!("{}", form.render());
    println!("Image path (jpg / jpeg / png), empty line to quit:");

    let mut selections = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = selections.next_line().await? {
        let selection = line.trim();
        if selection.is_empty() {
            break;
        }

        let (reply, result) = oneshot::channel();
        worker
            .send(LoadRequest { path: PathBuf::from(selection), reply })
            .await
            .map_err(|_| anyhow::anyhow!("image worker stopped"))?;

        match result.await? {
            Ok(card) => {
                tracing::info!(
                    lines = card.ocr.lines.len(),
                    fields = %serde_json::to_string(&card.ocr.extracted)?,
                    "Card processed"
                );
                form.show(card.preview, &card.ocr.extracted);
                println!("{}", form.render());
            }
            Err(e) => {
                tracing::warn!("Could not load {selection}: {e}");
            }
        }
    }

    Ok(())
}

#[cfg(feature = "tesseract")]
fn build_recognizer(config: &OcrConfig) -> Result<Box<dyn OcrBackend>, OcrError> {
    let data_path = config
        .tessdata_dir
        .as_ref()
        .map(|p| p.to_string_lossy().into_owned());
    let engine = idcard_ocr::TesseractRecognizer::new(data_path.as_deref(), &config.languages)?;
    tracing::info!("Tesseract ready ({})", config.languages);
    Ok(Box::new(engine))
}

#[cfg(not(feature = "tesseract"))]
fn build_recognizer(_config: &OcrConfig) -> Result<Box<dyn OcrBackend>, OcrError> {
    tracing::warn!("Built without an OCR engine; rebuild with `--features tesseract`");
    Ok(Box::new(idcard_ocr::UnavailableRecognizer))
}
