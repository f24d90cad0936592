//! OCR backed by the `tesseract` command line tool.

use std::io::ErrorKind;
use std::process::Command;
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::OcrConfig;

use super::{clean_output, prepare_image, write_temp_png, TextRecognizer};

/// Recognizer that shells out to a Tesseract binary.
pub struct TesseractRecognizer {
    config: OcrConfig,
}

impl TesseractRecognizer {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OcrConfig {
        &self.config
    }

    /// True if the configured binary can be started.
    pub fn is_available(&self) -> bool {
        Command::new(&self.config.tesseract_cmd)
            .arg("--version")
            .output()
            .map(|out| out.status.success())
            .unwrap_or(false)
    }
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::new(OcrConfig::default())
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let start = Instant::now();
        let (width, height) = image.dimensions();
        info!("Running tesseract on {}x{} image", width, height);

        let input = write_temp_png(&prepare_image(image, self.config.grayscale))?;

        let mut command = Command::new(&self.config.tesseract_cmd);
        command
            .arg(input.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.config.language);
        if let Some(psm) = self.config.page_segmentation_mode {
            command.arg("--psm").arg(psm.to_string());
        }
        debug!("Invoking {:?}", command);

        let output = command.output().map_err(|e| match e.kind() {
            ErrorKind::NotFound => OcrError::Unavailable(format!(
                "{} not found; install tesseract or set ocr.tesseract_cmd",
                self.config.tesseract_cmd.display()
            )),
            _ => OcrError::Unavailable(e.to_string()),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Recognition(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let text = clean_output(&String::from_utf8_lossy(&output.stdout));

        debug!(
            "Recognized {} characters in {}ms",
            text.len(),
            start.elapsed().as_millis()
        );
        Ok(text)
    }
}
