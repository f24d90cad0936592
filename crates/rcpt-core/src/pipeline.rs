//! End-to-end ingestion: save the source file, read its text, parse it and
//! store the result.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{RcptError, Result, ValidationError};
use crate::extract::{ExtractionResult, ReceiptExtractor, RuleBasedParser};
use crate::models::config::PdfConfig;
use crate::models::receipt::{Receipt, ReceiptId};
use crate::ocr::TextRecognizer;
use crate::pdf::PdfExtractor;
use crate::store::ReceiptStore;

/// What kind of source document a file holds, by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Image,
    Pdf,
    Text,
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "jpg" | "jpeg" | "png" | "tif" | "tiff" | "bmp" => Ok(DocumentKind::Image),
            "pdf" => Ok(DocumentKind::Pdf),
            "txt" => Ok(DocumentKind::Text),
            _ => Err(RcptError::UnsupportedFile(path.display().to_string())),
        }
    }
}

/// Read the text out of a source document.
pub fn document_text<R: TextRecognizer>(
    kind: DocumentKind,
    data: &[u8],
    recognizer: &R,
    pdf: &PdfConfig,
) -> Result<String> {
    match kind {
        DocumentKind::Text => Ok(String::from_utf8(data.to_vec())?),
        DocumentKind::Image => Ok(recognizer.recognize_bytes(data)?),
        DocumentKind::Pdf => {
            let content = PdfExtractor::load(data)?.content()?;
            if content.has_text(pdf.min_text_length) {
                debug!("Using embedded PDF text");
                return Ok(content.text);
            }
            if !pdf.ocr_scanned_pages || content.images.is_empty() {
                warn!("PDF has little embedded text and no page images to OCR");
                return Ok(content.text);
            }

            info!("Running OCR on {} scanned PDF pages", content.images.len());
            let pages = content
                .images
                .iter()
                .map(|image| recognizer.recognize(image))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(pages.join("\n"))
        }
    }
}

/// Directory holding the uploaded source files, one per receipt.
#[derive(Debug, Clone)]
pub struct UploadDir {
    root: PathBuf,
}

impl UploadDir {
    /// Use `root`, creating it if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }

    /// Write a new file. Existing files are never overwritten.
    pub fn save(&self, filename: &str, data: &[u8]) -> Result<PathBuf> {
        check_filename(filename)?;
        let path = self.path(filename);
        let file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(RcptError::DuplicateFile(filename.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        write_or_discard(file, &path, data)?;
        debug!("Saved {} bytes to {}", data.len(), path.display());
        Ok(path)
    }

    pub fn remove(&self, filename: &str) -> Result<()> {
        fs::remove_file(self.path(filename))?;
        Ok(())
    }
}

/// Write `data` to a freshly created file, removing it if the write fails.
fn write_or_discard<W: Write>(mut out: W, path: &Path, data: &[u8]) -> Result<()> {
    if let Err(e) = out.write_all(data).and_then(|()| out.flush()) {
        drop(out);
        if let Err(cleanup) = fs::remove_file(path) {
            warn!("Failed to remove partial upload {}: {}", path.display(), cleanup);
        }
        return Err(e.into());
    }
    Ok(())
}

fn check_filename(filename: &str) -> std::result::Result<(), ValidationError> {
    let plain = Path::new(filename)
        .file_name()
        .is_some_and(|name| name == filename);
    if filename.trim().is_empty() || !plain || filename.contains(['/', '\\']) {
        return Err(ValidationError::new("filename", "must be a plain file name"));
    }
    Ok(())
}

/// A stored receipt together with how it was extracted.
#[derive(Debug, Clone)]
pub struct Ingested {
    pub receipt: Receipt,
    pub extraction: ExtractionResult,
}

/// Save, recognize, parse and store receipts.
pub struct ReceiptPipeline<S, R> {
    store: S,
    recognizer: R,
    uploads: UploadDir,
    parser: RuleBasedParser,
    pdf: PdfConfig,
}

impl<S: ReceiptStore, R: TextRecognizer> ReceiptPipeline<S, R> {
    pub fn new(store: S, recognizer: R, uploads: UploadDir) -> Self {
        Self {
            store,
            recognizer,
            uploads,
            parser: RuleBasedParser::new(),
            pdf: PdfConfig::default(),
        }
    }

    pub fn with_pdf_config(mut self, pdf: PdfConfig) -> Self {
        self.pdf = pdf;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn uploads(&self) -> &UploadDir {
        &self.uploads
    }

    /// Where the source file of `receipt` lives.
    pub fn source_path(&self, receipt: &Receipt) -> PathBuf {
        self.uploads.path(&receipt.filename)
    }

    /// Ingest a file from disk under its own file name.
    pub fn ingest_file(&mut self, path: &Path) -> Result<Ingested> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| RcptError::UnsupportedFile(path.display().to_string()))?
            .to_string();
        DocumentKind::from_path(path)?;
        let data = fs::read(path)?;
        self.ingest_bytes(&filename, &data)
    }

    /// Ingest an uploaded document.
    ///
    /// Nothing is kept if any step after saving fails: the saved file is
    /// removed and no record is written.
    pub fn ingest_bytes(&mut self, filename: &str, data: &[u8]) -> Result<Ingested> {
        let kind = DocumentKind::from_path(Path::new(filename))?;
        self.uploads.save(filename, data)?;

        match self.process(filename, kind, data) {
            Ok(ingested) => {
                info!(
                    "Stored receipt {} from {} ({} {})",
                    ingested.receipt.id, filename, ingested.receipt.vendor, ingested.receipt.amount
                );
                Ok(ingested)
            }
            Err(e) => {
                if let Err(cleanup) = self.uploads.remove(filename) {
                    warn!("Failed to remove {} after error: {}", filename, cleanup);
                }
                Err(e)
            }
        }
    }

    fn process(&mut self, filename: &str, kind: DocumentKind, data: &[u8]) -> Result<Ingested> {
        let text = document_text(kind, data, &self.recognizer, &self.pdf)?;
        let extraction = self.parser.extract(&text);

        let candidate = extraction.receipt.clone().into_new_receipt(filename);
        candidate.validate()?;

        let id = self.store.insert(candidate)?;
        let receipt = self.store.get(id)?;
        Ok(Ingested { receipt, extraction })
    }

    /// Delete a receipt and then its source file.
    ///
    /// A source file that cannot be removed is logged, not reported.
    pub fn delete(&mut self, id: ReceiptId) -> Result<Receipt> {
        let receipt = self.store.delete(id)?;
        let path = self.source_path(&receipt);
        match fs::remove_file(&path) {
            Ok(()) => debug!("Deleted {}", path.display()),
            Err(e) => warn!("Could not delete {}: {}", path.display(), e),
        }
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{OcrError, StorageError};
    use crate::models::receipt::{Category, UNKNOWN_VENDOR};
    use crate::store::MemoryStore;
    use image::{DynamicImage, GrayImage, ImageFormat};
    use rust_decimal::Decimal;
    use std::io::Cursor;
    use std::str::FromStr;

    struct FixedText(&'static str);

    impl TextRecognizer for FixedText {
        fn recognize(&self, _image: &DynamicImage) -> std::result::Result<String, OcrError> {
            Ok(self.0.to_string())
        }
    }

    struct Broken;

    impl TextRecognizer for Broken {
        fn recognize(&self, _image: &DynamicImage) -> std::result::Result<String, OcrError> {
            Err(OcrError::Recognition("engine crashed".to_string()))
        }
    }

    fn png() -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageLuma8(GrayImage::new(8, 8))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn pipeline<R: TextRecognizer>(
        dir: &tempfile::TempDir,
        recognizer: R,
    ) -> ReceiptPipeline<MemoryStore, R> {
        let uploads = UploadDir::new(dir.path().join("uploads")).unwrap();
        ReceiptPipeline::new(MemoryStore::new(), recognizer, uploads)
    }

    const TEXT_RECEIPT: &str = "Whole Foods Market\n2024-03-02\nOrganic milk 4.99\nTotal: $23.45\n";

    #[test]
    fn test_document_kind_from_extension() {
        assert_eq!(DocumentKind::from_path(Path::new("a.JPG")).unwrap(), DocumentKind::Image);
        assert_eq!(DocumentKind::from_path(Path::new("a.tiff")).unwrap(), DocumentKind::Image);
        assert_eq!(DocumentKind::from_path(Path::new("a.pdf")).unwrap(), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_path(Path::new("a.txt")).unwrap(), DocumentKind::Text);
        assert!(matches!(
            DocumentKind::from_path(Path::new("a.docx")),
            Err(RcptError::UnsupportedFile(_))
        ));
        assert!(DocumentKind::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_ingest_text_receipt() {
        let dir = tempfile::tempdir().unwrap();
        let mut pipeline = pipeline(&dir, Broken);

        let ingested = pipeline.ingest_bytes("wholefoods.txt", TEXT_RECEIPT.as_bytes()).unwrap();
        let receipt = &ingested.receipt;

        assert_eq!(receipt.filename, "wholefoods.txt");
        assert_eq!(receipt.vendor, "Whole Foods Market");
        assert_eq!(receipt.amount, Decimal::from_str("23.45").unwrap());
        assert_eq!(receipt.category, Category::Groceries);
        assert_eq!(receipt.extracted_text, TEXT_RECEIPT);
        assert!(pipeline.source_path(receipt).exists());
        assert_eq!(pipeline.store().get(receipt.id).unwrap(), *receipt);
    }

    #[test]
    fn test_ingest_image_uses_recognizer() {
        let dir = tempfile::tempdir().unwrap();
        let mut pipeline = pipeline(&dir, FixedText("Corner Bistro\nDine in\n01/02/2024\nTotal: $18.00"));

        let ingested = pipeline.ingest_bytes("bistro.png", &png()).unwrap();
        assert_eq!(ingested.receipt.vendor, "Corner Bistro");
        assert_eq!(ingested.receipt.category, Category::Dining);
        assert_eq!(ingested.receipt.amount, Decimal::from(18));
    }

    #[test]
    fn test_unsupported_file_saves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut pipeline = pipeline(&dir, Broken);

        let err = pipeline.ingest_bytes("notes.docx", b"hello").unwrap_err();
        assert!(matches!(err, RcptError::UnsupportedFile(_)));
        assert!(!pipeline.uploads().path("notes.docx").exists());
        assert!(pipeline.store().is_empty());
    }

    #[test]
    fn test_ocr_failure_removes_saved_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut pipeline = pipeline(&dir, Broken);

        let err = pipeline.ingest_bytes("scan.png", &png()).unwrap_err();
        assert!(matches!(err, RcptError::Ocr(OcrError::Recognition(_))));
        assert!(!pipeline.uploads().path("scan.png").exists());
        assert!(pipeline.store().is_empty());
    }

    #[test]
    fn test_invalid_utf8_removes_saved_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut pipeline = pipeline(&dir, Broken);

        let err = pipeline.ingest_bytes("bad.txt", &[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, RcptError::Encoding(_)));
        assert!(!pipeline.uploads().path("bad.txt").exists());
    }

    #[test]
    fn test_storage_failure_removes_saved_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut pipeline = pipeline(&dir, Broken);
        pipeline
            .store_mut()
            .insert(
                RuleBasedParser::new()
                    .extract(TEXT_RECEIPT)
                    .receipt
                    .into_new_receipt("taken.txt"),
            )
            .unwrap();

        let err = pipeline.ingest_bytes("taken.txt", TEXT_RECEIPT.as_bytes()).unwrap_err();
        assert!(matches!(err, RcptError::Storage(StorageError::DuplicateFilename(_))));
        assert!(!pipeline.uploads().path("taken.txt").exists());
        assert_eq!(pipeline.store().len(), 1);
    }

    #[test]
    fn test_duplicate_upload_keeps_original() {
        let dir = tempfile::tempdir().unwrap();
        let mut pipeline = pipeline(&dir, Broken);
        pipeline.ingest_bytes("r.txt", TEXT_RECEIPT.as_bytes()).unwrap();

        let err = pipeline.ingest_bytes("r.txt", b"Other\nTotal 1.00").unwrap_err();
        assert!(matches!(err, RcptError::DuplicateFile(_)));
        let on_disk = fs::read_to_string(pipeline.uploads().path("r.txt")).unwrap();
        assert_eq!(on_disk, TEXT_RECEIPT);
        assert_eq!(pipeline.store().len(), 1);
    }

    #[test]
    fn test_fallbacks_are_still_stored() {
        let dir = tempfile::tempdir().unwrap();
        let mut pipeline = pipeline(&dir, Broken);

        let ingested = pipeline.ingest_bytes("blank.txt", b"").unwrap();
        assert_eq!(ingested.receipt.vendor, UNKNOWN_VENDOR);
        assert_eq!(ingested.extraction.warnings.len(), 3);
    }

    #[test]
    fn test_oversized_amount_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut pipeline = pipeline(&dir, Broken);

        let text = "Big Vendor\nTOTAL 79228162514264337593543950335.00";
        let err = pipeline.ingest_bytes("big.txt", text.as_bytes()).unwrap_err();
        assert!(matches!(err, RcptError::Validation(ref e) if e.field == "amount"));
        assert!(!pipeline.uploads().path("big.txt").exists());
        assert!(pipeline.store().is_empty());
    }

    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("no space left on device"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_write_leaves_no_partial_upload() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = UploadDir::new(dir.path()).unwrap();
        let path = uploads.path("scan.png");
        fs::write(&path, b"half").unwrap();

        let err = write_or_discard(FullDisk, &path, b"whole file").unwrap_err();
        assert!(matches!(err, RcptError::Io(_)));
        assert!(!path.exists());

        // A retry under the same name is not blocked by the leftover.
        uploads.save("scan.png", b"whole file").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"whole file");
    }

    #[test]
    fn test_path_like_filenames_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut pipeline = pipeline(&dir, Broken);

        let err = pipeline.ingest_bytes("../escape.txt", b"x").unwrap_err();
        assert!(matches!(err, RcptError::Validation(ref e) if e.field == "filename"));
        assert!(!dir.path().join("escape.txt").exists());
    }

    #[test]
    fn test_delete_removes_record_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut pipeline = pipeline(&dir, Broken);
        let ingested = pipeline.ingest_bytes("r.txt", TEXT_RECEIPT.as_bytes()).unwrap();
        let path = pipeline.source_path(&ingested.receipt);

        let removed = pipeline.delete(ingested.receipt.id).unwrap();
        assert_eq!(removed.id, ingested.receipt.id);
        assert!(!path.exists());
        assert!(pipeline.store().is_empty());
    }

    #[test]
    fn test_delete_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut pipeline = pipeline(&dir, Broken);
        let ingested = pipeline.ingest_bytes("r.txt", TEXT_RECEIPT.as_bytes()).unwrap();
        fs::remove_file(pipeline.source_path(&ingested.receipt)).unwrap();

        assert!(pipeline.delete(ingested.receipt.id).is_ok());
        assert!(matches!(
            pipeline.delete(ingested.receipt.id),
            Err(RcptError::Storage(StorageError::NotFound(_)))
        ));
    }

    #[test]
    fn test_ingest_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("market.txt");
        fs::write(&source, TEXT_RECEIPT).unwrap();

        let mut pipeline = pipeline(&dir, Broken);
        let ingested = pipeline.ingest_file(&source).unwrap();
        assert_eq!(ingested.receipt.filename, "market.txt");
        assert_eq!(
            fs::read_to_string(pipeline.source_path(&ingested.receipt)).unwrap(),
            TEXT_RECEIPT
        );
    }
}
