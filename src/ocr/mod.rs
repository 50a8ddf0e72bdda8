mod preprocess;
mod tesseract;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::vin;

pub use tesseract::TesseractEngine;

/// Something that turns an image into OCR text blocks. Each block may
/// hold several newline separated lines.
pub trait OcrEngine: Send + Sync {
    fn name(&self) -> &'static str;

    /// False when the engine cannot run on this machine at all.
    fn is_supported(&self) -> bool;

    fn extract_text(&self, image_path: &Path) -> Result<Vec<String>>;
}

/// OCR the image and pick a VIN. Unsupported engines and OCR failures
/// are logged and reported as no VIN.
pub fn extract_vin_from_image_blocking(
    engine: &dyn OcrEngine,
    image_path: &Path,
) -> Option<String> {
    if !engine.is_supported() {
        warn!("{} OCR is not available on this system", engine.name());
        return None;
    }
    match engine.extract_text(image_path) {
        Ok(blocks) => {
            debug!("{} returned {} text blocks", engine.name(), blocks.len());
            vin::extract_vin(&blocks)
        }
        Err(err) => {
            warn!(
                "{} OCR failed for {}: {:#}",
                engine.name(),
                image_path.display(),
                err
            );
            None
        }
    }
}

/// Async wrapper; the OCR call runs on the blocking pool.
pub async fn extract_vin_from_image(
    engine: Arc<dyn OcrEngine>,
    image_path: impl Into<PathBuf>,
) -> Option<String> {
    let image_path = image_path.into();
    let task = tokio::task::spawn_blocking(move || {
        extract_vin_from_image_blocking(engine.as_ref(), &image_path)
    });
    match task.await {
        Ok(vin) => vin,
        Err(err) => {
            warn!("OCR task failed: {}", err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    struct FixedEngine {
        supported: bool,
        blocks: Result<Vec<String>, String>,
    }

    impl OcrEngine for FixedEngine {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn is_supported(&self) -> bool {
            self.supported
        }

        fn extract_text(&self, _image_path: &Path) -> Result<Vec<String>> {
            self.blocks.clone().map_err(|message| anyhow!(message))
        }
    }

    struct PanickingEngine;

    impl OcrEngine for PanickingEngine {
        fn name(&self) -> &'static str {
            "panicking"
        }

        fn is_supported(&self) -> bool {
            true
        }

        fn extract_text(&self, _image_path: &Path) -> Result<Vec<String>> {
            panic!("engine crashed")
        }
    }

    fn engine(supported: bool, blocks: Result<Vec<String>, String>) -> Arc<dyn OcrEngine> {
        Arc::new(FixedEngine { supported, blocks })
    }

    #[tokio::test]
    async fn extracts_vin_from_engine_blocks() {
        let blocks = vec!["MFD BY FORD\nVIN: 1FAHP3F20CL123456".to_string()];
        let engine = engine(true, Ok(blocks));
        assert_eq!(
            extract_vin_from_image(engine, "photo.jpg").await.as_deref(),
            Some("1FAHP3F20CL123456")
        );
    }

    #[tokio::test]
    async fn unsupported_engine_yields_none() {
        let engine = engine(false, Ok(vec!["VIN: 1FAHP3F20CL123456".to_string()]));
        assert_eq!(extract_vin_from_image(engine, "photo.jpg").await, None);
    }

    #[tokio::test]
    async fn engine_failure_yields_none() {
        let engine = engine(true, Err("tesseract failed".to_string()));
        assert_eq!(extract_vin_from_image(engine, "photo.jpg").await, None);
    }

    #[tokio::test]
    async fn crashed_ocr_task_yields_none() {
        let engine: Arc<dyn OcrEngine> = Arc::new(PanickingEngine);
        assert_eq!(extract_vin_from_image(engine, "photo.jpg").await, None);
    }

    #[test]
    fn unreadable_image_yields_none() {
        let engine = TesseractEngine::from_settings(&crate::settings::OcrSettings::default());
        let missing = Path::new("definitely/missing/photo.png");
        assert_eq!(extract_vin_from_image_blocking(&engine, missing), None);
    }
}
