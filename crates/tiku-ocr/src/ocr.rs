use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use rusty_tesseract::{Args, Image};
use tiku_config::ocr::OcrConfig;
use tiku_core::backend::TextRecognizer;
use tiku_core::error::RecognitionError;

/// Environment variable tesseract reads its language packs from
pub const TESSDATA_ENV: &str = "TESSDATA_PREFIX";

/// Text recognition through Tesseract.
///
/// The engine finds packs through [`TESSDATA_ENV`], which the binary points
/// at the configured pack directory before any thread starts. Each call
/// still checks that the pack it is handed holds the language.
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    language: String,
}

impl TesseractRecognizer {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }

    pub fn from_config(config: &OcrConfig) -> Self {
        Self::new(config.language.clone())
    }

    fn traineddata(&self, language_pack: &Path) -> PathBuf {
        language_pack.join(format!("{}.traineddata", self.language))
    }

    fn args(&self) -> Args {
        Args {
            lang: self.language.clone(),
            ..Args::default()
        }
    }

    fn recognize_blocking(&self, png: &[u8], language_pack: &Path) -> Result<String> {
        let pack = self.traineddata(language_pack);
        if !pack.is_file() {
            bail!("Language pack {} not found", pack.display());
        }

        // The engine reads images from disk
        let mut file = tempfile::Builder::new()
            .prefix("tiku-")
            .suffix(".png")
            .tempfile()
            .context("Failed to create image file")?;
        file.write_all(png).context("Failed to write image file")?;
        file.flush().context("Failed to write image file")?;

        let image = Image::from_path(file.path().to_path_buf())
            .map_err(|e| anyhow::anyhow!("Failed to load image: {e}"))?;
        let text = rusty_tesseract::image_to_string(&image, &self.args())
            .map_err(|e| anyhow::anyhow!("Tesseract failed: {e}"))?;

        tracing::debug!("OCR produced {} chars", text.chars().count());
        Ok(text)
    }
}

#[async_trait::async_trait]
impl TextRecognizer for TesseractRecognizer {
    async fn recognize(
        &self,
        image: &[u8],
        language_pack: &Path,
    ) -> Result<String, RecognitionError> {
        let recognizer = self.clone();
        let image = image.to_vec();
        let language_pack = language_pack.to_path_buf();

        // A timed out call leaves this thread to finish on its own
        tokio::task::spawn_blocking(move || recognizer.recognize_blocking(&image, &language_pack))
            .await
            .map_err(|e| RecognitionError::Engine(format!("Recognition task failed: {e}")))?
            .map_err(|e| RecognitionError::Engine(format!("{e:#}")))
    }
}
