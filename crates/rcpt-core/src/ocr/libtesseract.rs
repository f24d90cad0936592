//! OCR through libtesseract, linked with `leptess`.

use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use leptess::{LepTess, Variable};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::OcrConfig;

use super::{clean_output, prepare_image, write_temp_png, TextRecognizer};

/// Recognizer that calls the Tesseract library in-process.
///
/// A fresh engine is initialised per image.
pub struct LeptessRecognizer {
    config: OcrConfig,
}

impl LeptessRecognizer {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OcrConfig {
        &self.config
    }
}

impl TextRecognizer for LeptessRecognizer {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let start = Instant::now();
        let (width, height) = image.dimensions();
        info!("Running libtesseract on {}x{} image", width, height);

        let input = write_temp_png(&prepare_image(image, self.config.grayscale))?;

        let mut engine = LepTess::new(None, &self.config.language)
            .map_err(|e| OcrError::Unavailable(format!("tesseract init: {}", e)))?;
        if let Some(psm) = self.config.page_segmentation_mode {
            engine
                .set_variable(Variable::TesseditPagesegMode, &psm.to_string())
                .map_err(|e| OcrError::Recognition(format!("invalid page segmentation mode: {:?}", e)))?;
        }
        engine
            .set_image(input.path())
            .map_err(|e| OcrError::InvalidImage(format!("{:?}", e)))?;
        let text = engine
            .get_utf8_text()
            .map_err(|e| OcrError::Recognition(format!("tesseract run: {}", e)))?;

        let text = clean_output(&text);
        debug!(
            "Recognized {} characters in {}ms",
            text.len(),
            start.elapsed().as_millis()
        );
        Ok(text)
    }
}
