//! Error types for the deck2pdf library.
//!
//! Three error types reflect three distinct failure scopes:
//!
//! * [`DeckError`]: **Fatal**: the run cannot produce a document at all
//!   (malformed URL, landing page unreachable, no identifier or slide count
//!   could be discovered). Returned as `Err(DeckError)` from the top-level
//!   `download*` functions. No output file exists when one of these is
//!   returned.
//!
//! * [`SlideError`]: **Non-fatal**: one slide could not be fetched, decoded
//!   or embedded. The slide is skipped, the page is omitted, and the error is
//!   recorded in [`crate::output::DownloadOutput::failures`].
//!
//! * [`TransportError`]: what a [`crate::pipeline::transport::Transport`]
//!   returns for a single request. It is wrapped into a [`DeckError`] for the
//!   landing page, into a [`SlideError`] for a slide image, and swallowed
//!   (treated as "slide does not exist") during slide-count probing.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the deck2pdf library.
///
/// Slide-level failures use [`SlideError`] and are stored in
/// [`crate::output::DownloadOutput`] rather than propagated here.
#[derive(Debug, Error)]
pub enum DeckError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The input does not look like `https://<host>/<owner>/<slug>`.
    #[error("Invalid presentation URL '{input}'\nExpected format: https://{host}/username/presentation-name")]
    InvalidSource { input: String, host: String },

    /// The landing page could not be retrieved.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// The landing page request exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// No strategy found a presentation identifier in the landing page.
    #[error("Could not find the presentation ID in '{url}'")]
    IdentifierNotFound { url: String },

    /// The identifier is known but the number of slides is not.
    #[error("Could not determine the number of slides for presentation '{identifier}'")]
    SlideCountUnknown { identifier: String },

    // ── Assembly errors ───────────────────────────────────────────────────
    /// Every requested slide failed; there is nothing to put in a document.
    #[error("All {requested} slides failed to download.\nFirst error: {first_error}")]
    NoSlidesRetrieved {
        requested: usize,
        first_error: String,
    },

    /// The PDF writer rejected the assembled document.
    #[error("Failed to assemble PDF: {detail}")]
    AssemblyFailed { detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create the output directory or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DeckError {
    /// Map a landing-page [`TransportError`] onto the fatal taxonomy.
    pub(crate) fn from_landing_page(err: TransportError) -> Self {
        match err {
            TransportError::Timeout { url, secs } => DeckError::DownloadTimeout { url, secs },
            TransportError::Status { url, status } => DeckError::DownloadFailed {
                url,
                reason: format!("HTTP {status}"),
            },
            TransportError::Connection { url, detail } => DeckError::DownloadFailed {
                url,
                reason: detail,
            },
        }
    }
}

/// A failed network request.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportError {
    /// No response within the request timeout.
    #[error("request to '{url}' timed out after {secs}s")]
    Timeout { url: String, secs: u64 },

    /// The server answered with a non-success status.
    #[error("request to '{url}' returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Connection, TLS or body-read failure.
    #[error("request to '{url}' failed: {detail}")]
    Connection { url: String, detail: String },
}

/// A non-fatal error for a single slide.
///
/// `index` is the zero-based slide index. The run continues with the next
/// slide; the document simply has one page fewer.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum SlideError {
    /// The image could not be retrieved.
    #[error("Slide {index}: download failed after {attempts} attempt(s): {source}")]
    Transport {
        index: usize,
        attempts: u32,
        #[source]
        source: TransportError,
    },

    /// The response body is not a decodable image.
    #[error("Slide {index}: image could not be decoded: {detail}")]
    Decode { index: usize, detail: String },

    /// The decoded image could not be placed on a PDF page.
    #[error("Slide {index}: image could not be embedded: {detail}")]
    Embed { index: usize, detail: String },
}

impl SlideError {
    /// Zero-based index of the slide this error belongs to.
    pub fn index(&self) -> usize {
        match self {
            SlideError::Transport { index, .. }
            | SlideError::Decode { index, .. }
            | SlideError::Embed { index, .. } => *index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_source_mentions_expected_format() {
        let e = DeckError::InvalidSource {
            input: "https://example.com/x".into(),
            host: "speakerdeck.com".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("https://example.com/x"), "got: {msg}");
        assert!(msg.contains("https://speakerdeck.com/username/presentation-name"));
    }

    #[test]
    fn landing_page_timeout_maps_to_download_timeout() {
        let e = DeckError::from_landing_page(TransportError::Timeout {
            url: "https://speakerdeck.com/a/b".into(),
            secs: 30,
        });
        assert!(matches!(e, DeckError::DownloadTimeout { secs: 30, .. }));
    }

    #[test]
    fn landing_page_status_maps_to_download_failed() {
        let e = DeckError::from_landing_page(TransportError::Status {
            url: "https://speakerdeck.com/a/b".into(),
            status: 404,
        });
        assert!(e.to_string().contains("HTTP 404"), "got: {e}");
    }

    #[test]
    fn no_slides_retrieved_display() {
        let e = DeckError::NoSlidesRetrieved {
            requested: 12,
            first_error: "Slide 0: decode".into(),
        };
        assert!(e.to_string().contains("All 12 slides"));
    }

    #[test]
    fn slide_error_reports_index() {
        let e = SlideError::Transport {
            index: 2,
            attempts: 1,
            source: TransportError::Status {
                url: "https://files.example/slide_2.jpg".into(),
                status: 500,
            },
        };
        assert_eq!(e.index(), 2);
        assert!(e.to_string().contains("HTTP 500"), "got: {e}");
        assert_eq!(SlideError::Decode { index: 7, detail: "x".into() }.index(), 7);
    }
}
