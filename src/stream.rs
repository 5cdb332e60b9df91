//! Streaming API: emit decoded slides as they are fetched.
//!
//! [`crate::download::download`] consumes this stream and draws each slide
//! onto a page. Callers who want the images themselves (thumbnails, a
//! different output format) can use [`slide_stream`] directly.
//!
//! Slides are always yielded in index order. With `concurrency > 1` up to
//! that many fetches run at once, and a slide that finishes early waits in
//! the stream's buffer until every lower index has been yielded.

use crate::config::DownloadConfig;
use crate::download::{resolve_presentation, resolve_transport};
use crate::error::{DeckError, SlideError};
use crate::output::{DecodedImage, PresentationSource, SlideReference};
use crate::pipeline::fetch;
use crate::pipeline::transport::Transport;
use futures::stream::{self, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use tokio_stream::Stream;
use tracing::info;

/// A slide that was fetched and decoded.
#[derive(Debug, Clone)]
pub struct FetchedSlide {
    /// Zero-based slide index.
    pub index: usize,
    pub image: DecodedImage,
}

/// A boxed stream of slide results, in slide-index order.
pub type SlideStream = Pin<Box<dyn Stream<Item = Result<FetchedSlide, SlideError>> + Send>>;

/// Fetch `slides` in order with at most `config.concurrency` requests in
/// flight.
///
/// Fires `on_slide_start` as each fetch begins. Completion events are left
/// to the consumer, since a slide can still fail after it is yielded (for
/// example when it is embedded).
pub fn fetch_slides(
    transport: Arc<dyn Transport>,
    slides: Vec<SlideReference>,
    config: &DownloadConfig,
) -> SlideStream {
    let total = slides.len();
    let concurrency = config.concurrency.max(1);
    let config = config.clone();

    let s = stream::iter(slides.into_iter().map(move |slide| {
        let transport = Arc::clone(&transport);
        let cfg = config.clone();
        async move {
            if let Some(ref cb) = cfg.progress_callback {
                cb.on_slide_start(slide.index + 1, total);
            }
            fetch::fetch_slide(transport.as_ref(), &slide, &cfg)
                .await
                .map(|image| FetchedSlide {
                    index: slide.index,
                    image,
                })
        }
    }))
    .buffered(concurrency);

    Box::pin(s)
}

/// Resolve `url` and stream its slides without assembling a document.
///
/// # Returns
/// - `Ok((source, stream))`: the resolved presentation (with its slide
///   count) and a stream of `Result<FetchedSlide, SlideError>`
/// - `Err(DeckError)`: fatal error before any slide was requested
///
/// # Example
/// ```rust,no_run
/// use deck2pdf::{slide_stream, DownloadConfig};
/// use futures::StreamExt;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = DownloadConfig::default();
/// let (source, mut slides) =
///     slide_stream("https://speakerdeck.com/owner/talk", &config).await?;
/// while let Some(slide) = slides.next().await {
///     match slide {
///         Ok(s) => println!("{} slide {}: {}x{}", source.title, s.index, s.image.width, s.image.height),
///         Err(e) => eprintln!("Error: {e}"),
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub async fn slide_stream(
    url: impl AsRef<str>,
    config: &DownloadConfig,
) -> Result<(PresentationSource, SlideStream), DeckError> {
    let url = url.as_ref();
    info!("Starting slide stream: {}", url);

    let transport = resolve_transport(config)?;
    let source = resolve_presentation(transport.as_ref(), url, config).await?;
    let count = source.known_slide_count.unwrap_or(0);
    let slides = source.slide_references(&config.asset_base_url, count);

    Ok((source, fetch_slides(transport, slides, config)))
}
