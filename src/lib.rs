//! # deck2pdf
//!
//! Download a hosted slide deck and save it as a single PDF, one page per
//! slide.
//!
//! ## How it works
//!
//! Slide-hosting sites publish each slide as a pre-rendered image under a
//! predictable URL. This crate reads the presentation's landing page to find
//! the identifier behind those URLs, works out how many slides there are, and
//! draws every slide image full-bleed onto its own PDF page.
//!
//! ## Pipeline Overview
//!
//! ```text
//! URL
//!  │
//!  ├─ 1. Validate  https://<host>/<owner>/<slug>, before any request
//!  ├─ 2. Extract   identifier / slide count / title from the landing page
//!  ├─ 3. Probe     binary-search the count with HEAD requests (if unknown)
//!  ├─ 4. Fetch     GET each slide image, in index order
//!  ├─ 5. Assemble  first slide fixes page size; failed slides are skipped
//!  └─ 6. Output    <title-slug>.pdf + per-slide failures and stats
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use deck2pdf::{download, DownloadConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DownloadConfig::builder().output_dir("slides").build()?;
//!     let output = download("https://speakerdeck.com/owner/talk", &config).await?;
//!     println!("{}", output.path.display());
//!     eprintln!("{} of {} slides", output.stats.fetched_slides, output.stats.total_slides);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `deck2pdf` binary (clap + indicatif + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! deck2pdf = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod download;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{DownloadConfig, DownloadConfigBuilder};
pub use download::{download, download_presentation, download_sync, inspect};
pub use error::{DeckError, SlideError, TransportError};
pub use output::{
    CountSource, DecodedImage, DownloadOutput, DownloadStats, IdentifierSource, PageGeometry,
    PresentationSource, SlideReference,
};
pub use pipeline::transport::{HttpTransport, Transport};
pub use progress::{DownloadProgressCallback, NoopProgressCallback, ProgressCallback};
pub use stream::{slide_stream, FetchedSlide, SlideStream};
