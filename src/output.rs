//! Data model shared by the pipeline stages and returned to callers.

use crate::error::SlideError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Which extraction strategy produced the presentation identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierSource {
    /// `<img>` elements pointing at slide images.
    SlideImages,
    /// The `thumbnailUrl` of the page's JSON-LD block.
    StructuredData,
    /// First slide-asset URL anywhere in the raw HTML.
    RawHtml,
}

/// How the slide count was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountSource {
    /// Highest slide index referenced by `<img>` elements, plus one.
    SlideImages,
    /// An "N slides" fragment in the page's visible text.
    PageText,
    /// Binary-search existence probing against the image host.
    Probe,
}

impl fmt::Display for IdentifierSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IdentifierSource::SlideImages => "slide images",
            IdentifierSource::StructuredData => "structured data",
            IdentifierSource::RawHtml => "raw html",
        })
    }
}

impl fmt::Display for CountSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CountSource::SlideImages => "slide images",
            CountSource::PageText => "page text",
            CountSource::Probe => "probe",
        })
    }
}

/// A presentation resolved from its landing page.
///
/// Immutable once created; `identifier` names every slide image of exactly
/// one presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationSource {
    /// Opaque token (hex string) naming the slide images.
    pub identifier: String,
    /// Human title as shown on the landing page.
    pub title: String,
    /// Filesystem-safe form of `title`, used as the output file stem.
    pub title_slug: String,
    /// Slide count, when known.
    pub known_slide_count: Option<usize>,
    /// Strategy that found `identifier`.
    pub identifier_source: IdentifierSource,
    /// How `known_slide_count` was established.
    pub count_source: Option<CountSource>,
}

impl PresentationSource {
    /// URL of slide `index` under `asset_base_url`.
    pub fn slide_url(&self, asset_base_url: &str, index: usize) -> String {
        format!(
            "{}/{}/slide_{}.jpg",
            asset_base_url.trim_end_matches('/'),
            self.identifier,
            index
        )
    }

    /// References for slides `0..count`, in page order.
    pub fn slide_references(&self, asset_base_url: &str, count: usize) -> Vec<SlideReference> {
        (0..count)
            .map(|index| SlideReference {
                index,
                url: self.slide_url(asset_base_url, index),
            })
            .collect()
    }
}

/// One slide image to fetch. Page order is `index` order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideReference {
    pub index: usize,
    pub url: String,
}

/// A decoded slide, ready to be drawn onto a page.
///
/// `jpeg` always holds a baseline JPEG stream, whatever the source format was.
#[derive(Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub jpeg: Vec<u8>,
}

impl fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("jpeg", &format_args!("<{} bytes>", self.jpeg.len()))
            .finish()
    }
}

/// Width and height applied to every page of the document, in points.
///
/// Fixed by the first slide appended (one pixel = one point).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width: u32,
    pub height: u32,
}

/// Statistics for one download run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DownloadStats {
    /// Slides requested (the resolved slide count).
    pub total_slides: usize,
    /// Slides that became pages.
    pub fetched_slides: usize,
    /// Slides that were skipped.
    pub failed_slides: usize,
    /// Wall-clock time for the whole run.
    pub total_duration_ms: u64,
    /// Time spent fetching and appending slides.
    pub fetch_duration_ms: u64,
}

/// Result of a successful download.
///
/// "Successful" means a document was written; some slides may still have
/// been skipped (see `failures`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadOutput {
    /// Path of the written PDF.
    pub path: PathBuf,
    /// The presentation the document was built from.
    pub source: PresentationSource,
    /// Geometry shared by every page.
    pub geometry: PageGeometry,
    /// Zero-based slide index of each page, in page order.
    pub pages: Vec<usize>,
    /// One entry per skipped slide, in slide order.
    pub failures: Vec<SlideError>,
    pub stats: DownloadStats,
}
