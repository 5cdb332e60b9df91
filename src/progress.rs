//! Progress-callback trait for per-slide download events.
//!
//! Inject an [`Arc<dyn DownloadProgressCallback>`] via
//! [`crate::config::DownloadConfigBuilder::progress_callback`] to receive
//! events as the pipeline fetches and appends each slide. The CLI turns these
//! into a progress bar; library callers can forward them anywhere.
//!
//! # Example
//!
//! ```rust
//! use deck2pdf::{DownloadProgressCallback, DownloadConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     appended: AtomicUsize,
//! }
//!
//! impl DownloadProgressCallback for CountingCallback {
//!     fn on_slide_complete(&self, slide_num: usize, total_slides: usize, _w: u32, _h: u32) {
//!         let done = self.appended.fetch_add(1, Ordering::SeqCst) + 1;
//!         eprintln!("Slide {}/{} appended ({} so far)", slide_num, total_slides, done);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { appended: AtomicUsize::new(0) });
//!
//! let config = DownloadConfig::builder()
//!     .progress_callback(counter as Arc<dyn DownloadProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the download pipeline as it processes each slide.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Slide numbers are 1-indexed.
///
/// # Thread safety
///
/// With `concurrency > 1`, `on_slide_start` may be called for several slides
/// before the first `on_slide_complete`. Completion and error events are
/// always delivered in slide order.
pub trait DownloadProgressCallback: Send + Sync {
    /// Called once the slide count is known, before any slide is fetched.
    fn on_download_start(&self, total_slides: usize) {
        let _ = total_slides;
    }

    /// Called just before a slide image request is sent.
    fn on_slide_start(&self, slide_num: usize, total_slides: usize) {
        let _ = (slide_num, total_slides);
    }

    /// Called when a slide has been appended to the document.
    ///
    /// `width`/`height` are the slide's native pixel dimensions.
    fn on_slide_complete(&self, slide_num: usize, total_slides: usize, width: u32, height: u32) {
        let _ = (slide_num, total_slides, width, height);
    }

    /// Called when a slide is skipped.
    fn on_slide_error(&self, slide_num: usize, total_slides: usize, error: &str) {
        let _ = (slide_num, total_slides, error);
    }

    /// Called once after every slide has been attempted, before the
    /// document is written.
    fn on_download_complete(&self, total_slides: usize, success_count: usize) {
        let _ = (total_slides, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl DownloadProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::DownloadConfig`].
pub type ProgressCallback = Arc<dyn DownloadProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_download_start(5);
        cb.on_slide_start(1, 5);
        cb.on_slide_complete(1, 5, 1024, 768);
        cb.on_slide_error(2, 5, "HTTP 404");
        cb.on_download_complete(5, 4);
    }

    #[test]
    fn unimplemented_events_fall_back_to_defaults() {
        #[derive(Default)]
        struct ErrorsOnly(AtomicUsize);

        impl DownloadProgressCallback for ErrorsOnly {
            fn on_slide_error(&self, _slide_num: usize, _total_slides: usize, _error: &str) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let inner = Arc::new(ErrorsOnly::default());
        let cb: ProgressCallback = inner.clone();
        cb.on_download_start(2);
        cb.on_slide_start(1, 2);
        cb.on_slide_complete(1, 2, 10, 10);
        cb.on_slide_error(2, 2, "HTTP 500");
        cb.on_download_complete(2, 1);

        assert_eq!(inner.0.load(Ordering::SeqCst), 1);
    }
}
