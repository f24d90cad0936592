//! PDF text and image extraction using lopdf and pdf-extract.

use std::collections::BTreeSet;

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, trace};

use super::Result;
use crate::error::PdfError;

/// A loaded PDF document.
pub struct PdfExtractor {
    document: Document,
    raw_data: Vec<u8>,
}

/// Text and scanned images recovered from a PDF.
#[derive(Debug, Clone)]
pub struct PdfContent {
    /// Embedded text layer, possibly empty.
    pub text: String,
    /// Decodable page images, in page order.
    pub images: Vec<DynamicImage>,
}

impl PdfContent {
    /// True if the text layer is long enough to skip OCR.
    pub fn has_text(&self, min_text_length: usize) -> bool {
        self.text.trim().chars().count() >= min_text_length
    }
}

impl PdfExtractor {
    /// Parse a PDF from bytes, decrypting it if it uses an empty password.
    pub fn load(data: &[u8]) -> Result<Self> {
        let mut document = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        let raw_data = if document.is_encrypted() {
            if document.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted = Vec::new();
            document
                .save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data.to_vec()
        };

        let page_count = document.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        Ok(Self { document, raw_data })
    }

    pub fn page_count(&self) -> u32 {
        self.document.get_pages().len() as u32
    }

    /// Text layer of the whole document.
    pub fn extract_text(&self) -> Result<String> {
        pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }

    /// Images referenced by a page's XObject resources.
    pub fn extract_images(&self, page: u32) -> Result<Vec<DynamicImage>> {
        let pages = self.document.get_pages();
        let page_id = pages.get(&page).ok_or(PdfError::InvalidPage(page))?;

        let mut images = Vec::new();
        let Some(resources) = self.page_resources(*page_id) else {
            return Ok(images);
        };

        if let Ok(xobjects) = resources.get(b"XObject") {
            if let Ok((_, Object::Dictionary(xobjects))) = self.document.dereference(xobjects) {
                for (_name, reference) in xobjects.iter() {
                    if let Ok((_, object)) = self.document.dereference(reference) {
                        if let Some(image) = self.decode_image(object) {
                            images.push(image);
                        }
                    }
                }
            }
        }

        trace!("Extracted {} images from page {}", images.len(), page);
        Ok(images)
    }

    /// Text layer plus every page image.
    ///
    /// A PDF whose text layer cannot be decoded is treated as scanned.
    pub fn content(&self) -> Result<PdfContent> {
        let text = match self.extract_text() {
            Ok(text) => text,
            Err(e) => {
                debug!("No usable text layer: {}", e);
                String::new()
            }
        };

        let mut images = Vec::new();
        for page in 1..=self.page_count() {
            images.extend(self.extract_images(page)?);
        }

        debug!(
            "PDF content: {} chars of text, {} images",
            text.len(),
            images.len()
        );
        Ok(PdfContent { text, images })
    }

    fn page_resources(&self, page_id: ObjectId) -> Option<Dictionary> {
        let mut visited = BTreeSet::new();
        let mut node_id = page_id;

        // Resources are inheritable from the page tree
        while visited.insert(node_id) {
            let Ok(Object::Dictionary(node)) = self.document.get_object(node_id) else {
                return None;
            };

            if let Ok(resources) = node.get(b"Resources") {
                if let Ok((_, Object::Dictionary(resources))) = self.document.dereference(resources) {
                    return Some(resources.clone());
                }
            }

            match node.get(b"Parent") {
                Ok(Object::Reference(parent)) => node_id = *parent,
                _ => return None,
            }
        }

        debug!("Page tree loops back to {:?}", node_id);
        None
    }

    fn decode_image(&self, object: &Object) -> Option<DynamicImage> {
        let Object::Stream(stream) = object else {
            return None;
        };
        let dict = &stream.dict;

        if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
            return None;
        }

        let width = dict.get(b"Width").ok()?.as_i64().ok()? as u32;
        let height = dict.get(b"Height").ok()?.as_i64().ok()? as u32;
        trace!("Found image object: {}x{}", width, height);

        let filter = dict.get(b"Filter").ok().and_then(|f| match f {
            Object::Name(name) => Some(name.as_slice()),
            Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
            _ => None,
        });

        match filter {
            Some(b"DCTDecode") => {
                return image::load_from_memory_with_format(&stream.content, ImageFormat::Jpeg).ok();
            }
            Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
                trace!("Skipping image with unsupported filter");
                return None;
            }
            _ => {}
        }

        let data = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());

        let color_space = dict
            .get(b"ColorSpace")
            .ok()
            .and_then(|o| match o {
                Object::Name(name) => Some(name.as_slice()),
                Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
                Object::Reference(r) => self.document.get_object(*r).ok().and_then(|o| o.as_name().ok()),
                _ => None,
            })
            .unwrap_or(b"DeviceRGB");

        let bits = dict
            .get(b"BitsPerComponent")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(8);

        if bits != 8 {
            trace!("Unsupported bits per component: {}", bits);
            return None;
        }

        raw_image(data, width, height, color_space)
    }
}

/// Build an image from uncompressed 8-bit samples.
fn raw_image(mut data: Vec<u8>, width: u32, height: u32, color_space: &[u8]) -> Option<DynamicImage> {
    let pixels = (width as usize).checked_mul(height as usize)?;
    match color_space {
        b"DeviceRGB" | b"RGB" => {
            data.truncate(pixels.checked_mul(3)?);
            RgbImage::from_raw(width, height, data).map(DynamicImage::ImageRgb8)
        }
        b"DeviceGray" | b"G" => {
            data.truncate(pixels);
            GrayImage::from_raw(width, height, data).map(DynamicImage::ImageLuma8)
        }
        _ => {
            trace!("Unsupported color space {:?}", String::from_utf8_lossy(color_space));
            None
        }
    }
}
