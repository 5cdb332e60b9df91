//! Document assembly: decoded slides → one PDF, one full-bleed page per slide.
//!
//! The first slide appended fixes the page geometry for the whole document.
//! Every later slide is drawn stretched to exactly that width and height,
//! whatever its native size; there is no aspect-ratio correction and no
//! letterboxing. One image pixel maps to one PDF point.
//!
//! Nothing touches the filesystem until [`DocumentAssembler::seal`], which
//! writes to a temporary file next to the target and renames it into place.

use crate::error::{DeckError, SlideError};
use crate::output::{DecodedImage, PageGeometry};
use oxidize_pdf::{Document, Image, Page};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Name under which each page registers its slide image.
const SLIDE_IMAGE_NAME: &str = "Slide";

/// Accumulates pages in append order.
pub struct DocumentAssembler {
    document: Document,
    geometry: Option<PageGeometry>,
    pages: Vec<usize>,
}

/// A document that has been written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedDocument {
    pub path: PathBuf,
    pub geometry: PageGeometry,
    /// Slide index of each page, in page order.
    pub pages: Vec<usize>,
}

impl DocumentAssembler {
    /// Start an empty document with `title` in its metadata.
    pub fn new(title: &str) -> Self {
        let mut document = Document::new();
        document.set_title(title);
        document.set_creator(concat!("deck2pdf ", env!("CARGO_PKG_VERSION")));

        Self {
            document,
            geometry: None,
            pages: Vec::new(),
        }
    }

    /// Page geometry, once the first slide has been appended.
    pub fn geometry(&self) -> Option<PageGeometry> {
        self.geometry
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Slide index of each page so far.
    pub fn pages(&self) -> &[usize] {
        &self.pages
    }

    /// Append slide `slide_index` as a new page.
    ///
    /// On error nothing is added and the geometry is left untouched, so the
    /// caller can skip the slide and carry on.
    pub fn append(&mut self, slide_index: usize, image: DecodedImage) -> Result<(), SlideError> {
        let embed_error = |detail: String| SlideError::Embed {
            index: slide_index,
            detail,
        };

        let pdf_image =
            Image::from_jpeg_data(image.jpeg).map_err(|e| embed_error(e.to_string()))?;

        let geometry = self.geometry.unwrap_or(PageGeometry {
            width: image.width,
            height: image.height,
        });
        let (width, height) = (f64::from(geometry.width), f64::from(geometry.height));

        let mut page = Page::new(width, height);
        page.add_image(SLIDE_IMAGE_NAME, pdf_image);
        page.draw_image(SLIDE_IMAGE_NAME, 0.0, 0.0, width, height)
            .map_err(|e| embed_error(e.to_string()))?;

        self.document.add_page(page);
        self.geometry = Some(geometry);
        self.pages.push(slide_index);

        debug!(
            "Appended slide {} as page {} ({}x{} native, {}x{} page)",
            slide_index,
            self.pages.len(),
            image.width,
            image.height,
            geometry.width,
            geometry.height
        );
        Ok(())
    }

    /// Write the document to `path` exactly once.
    ///
    /// The parent directory is created if needed. Fails with
    /// [`DeckError::AssemblyFailed`] if no page was ever appended.
    pub fn seal(mut self, path: &Path) -> Result<SealedDocument, DeckError> {
        let geometry = self.geometry.ok_or_else(|| DeckError::AssemblyFailed {
            detail: "document has no pages".into(),
        })?;

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let write_error = |source: std::io::Error| DeckError::OutputWriteFailed {
            path: path.to_path_buf(),
            source,
        };

        std::fs::create_dir_all(&dir).map_err(write_error)?;

        let tmp = tempfile::Builder::new()
            .prefix(".deck2pdf-")
            .suffix(".pdf.tmp")
            .tempfile_in(&dir)
            .map_err(write_error)?;

        self.document
            .save(tmp.path())
            .map_err(|e| DeckError::AssemblyFailed {
                detail: e.to_string(),
            })?;

        tmp.persist(path).map_err(|e| write_error(e.error))?;

        info!(
            "PDF saved: {} ({} pages, {}x{})",
            path.display(),
            self.pages.len(),
            geometry.width,
            geometry.height
        );

        Ok(SealedDocument {
            path: path.to_path_buf(),
            geometry,
            pages: self.pages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::encode::prepare_slide;
    use crate::pipeline::transport::testing::{jpeg, png};

    fn decoded(width: u32, height: u32) -> DecodedImage {
        prepare_slide(jpeg(width, height)).unwrap()
    }

    #[test]
    fn first_slide_fixes_geometry() {
        let mut doc = DocumentAssembler::new("t");
        assert_eq!(doc.geometry(), None);

        doc.append(0, decoded(64, 36)).unwrap();
        doc.append(1, decoded(20, 80)).unwrap();
        doc.append(2, prepare_slide(png(10, 10)).unwrap()).unwrap();

        assert_eq!(
            doc.geometry(),
            Some(PageGeometry {
                width: 64,
                height: 36
            })
        );
        assert_eq!(doc.pages(), &[0, 1, 2]);
    }

    #[test]
    fn bad_image_is_skipped_without_side_effects() {
        let mut doc = DocumentAssembler::new("t");
        let bogus = DecodedImage {
            width: 10,
            height: 10,
            jpeg: b"not a jpeg".to_vec(),
        };
        let err = doc.append(4, bogus).unwrap_err();
        assert!(matches!(err, SlideError::Embed { index: 4, .. }), "got {err}");
        assert_eq!(doc.page_count(), 0);
        assert_eq!(doc.geometry(), None);

        doc.append(5, decoded(30, 20)).unwrap();
        assert_eq!(doc.pages(), &[5]);
        assert_eq!(doc.geometry().map(|g| g.width), Some(30));
    }

    #[test]
    fn seal_writes_pdf_into_new_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out").join("deck.pdf");

        let mut doc = DocumentAssembler::new("Deck");
        doc.append(0, decoded(32, 18)).unwrap();
        doc.append(2, decoded(32, 18)).unwrap();
        let sealed = doc.seal(&path).unwrap();

        assert_eq!(sealed.path, path);
        assert_eq!(sealed.pages, vec![0, 2]);
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"), "missing PDF header");

        let leftovers: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty(), "temporary file left behind");
    }

    #[test]
    fn every_saved_page_has_first_slide_media_box() {
        use oxidize_pdf::parser::PdfReader;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mixed.pdf");

        let mut doc = DocumentAssembler::new("Mixed");
        doc.append(0, decoded(64, 36)).unwrap();
        doc.append(1, decoded(20, 80)).unwrap();
        doc.append(2, prepare_slide(png(100, 100)).unwrap()).unwrap();
        doc.seal(&path).unwrap();

        let parsed = PdfReader::open(&path).unwrap().into_document();
        assert_eq!(parsed.page_count().unwrap(), 3);
        for i in 0..3 {
            let page = parsed.get_page(i).unwrap();
            assert_eq!(page.media_box, [0.0, 0.0, 64.0, 36.0], "page {i}");
            assert_eq!((page.width(), page.height()), (64.0, 36.0), "page {i}");
        }
    }

    #[test]
    fn empty_document_is_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.pdf");
        let err = DocumentAssembler::new("t").seal(&path).unwrap_err();
        assert!(matches!(err, DeckError::AssemblyFailed { .. }));
        assert!(!path.exists());
    }
}
