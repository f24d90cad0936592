//! OCR collaborators turning receipt images into text.

#[cfg(feature = "leptess")]
mod libtesseract;
mod tesseract;

#[cfg(feature = "leptess")]
pub use libtesseract::LeptessRecognizer;
pub use tesseract::TesseractRecognizer;

use image::{DynamicImage, ImageFormat};
use tempfile::NamedTempFile;

use crate::error::OcrError;
use crate::models::config::{OcrConfig, OcrEngine};

/// Something that can read the text off an image.
pub trait TextRecognizer {
    /// Recognize all text in `image`, lines separated by newlines.
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError>;

    /// Decode encoded image bytes (PNG, JPEG, TIFF, BMP) and recognize them.
    fn recognize_bytes(&self, data: &[u8]) -> Result<String, OcrError> {
        let image =
            image::load_from_memory(data).map_err(|e| OcrError::InvalidImage(e.to_string()))?;
        self.recognize(&image)
    }
}

impl<T: TextRecognizer + ?Sized> TextRecognizer for &T {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        (**self).recognize(image)
    }
}

impl<T: TextRecognizer + ?Sized> TextRecognizer for Box<T> {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        (**self).recognize(image)
    }
}

/// Build the recognizer selected by `config.engine`.
pub fn recognizer(config: &OcrConfig) -> Result<Box<dyn TextRecognizer>, OcrError> {
    match config.engine {
        OcrEngine::Command => Ok(Box::new(TesseractRecognizer::new(config.clone()))),
        #[cfg(feature = "leptess")]
        OcrEngine::Leptess => Ok(Box::new(LeptessRecognizer::new(config.clone()))),
        #[cfg(not(feature = "leptess"))]
        OcrEngine::Leptess => Err(OcrError::Unavailable(
            "the leptess engine is not enabled; build with --features leptess".to_string(),
        )),
    }
}

fn prepare_image(image: &DynamicImage, grayscale: bool) -> DynamicImage {
    if grayscale {
        DynamicImage::ImageLuma8(image.to_luma8())
    } else {
        image.clone()
    }
}

/// Write `image` to a temporary PNG for engines that read from a path.
fn write_temp_png(image: &DynamicImage) -> Result<NamedTempFile, OcrError> {
    let file = tempfile::Builder::new()
        .prefix("rcpt-ocr-")
        .suffix(".png")
        .tempfile()
        .map_err(|e| OcrError::InvalidImage(format!("failed to create temp file: {}", e)))?;
    image
        .save_with_format(file.path(), ImageFormat::Png)
        .map_err(|e| OcrError::InvalidImage(e.to_string()))?;
    Ok(file)
}

/// Strip the trailing form feed and blank lines Tesseract appends.
fn clean_output(raw: &str) -> String {
    raw.trim_end_matches(['\u{c}', '\n', ' ']).to_string()
}
