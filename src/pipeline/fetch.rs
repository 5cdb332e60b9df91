//! Slide image retrieval: one [`SlideReference`] → one [`DecodedImage`].
//!
//! ## Retry Strategy
//!
//! The default is a single attempt per slide. With `max_retries > 0`,
//! transport failures are retried with exponential backoff
//! (`retry_backoff_ms * 2^(retry - 1)`, capped at one minute). Decode
//! failures are never retried: the
//! server answered, the body is just not an image.
//!
//! Errors are returned, not raised further: the caller decides whether to
//! skip the slide (the pipeline always does).

use crate::config::DownloadConfig;
use crate::error::SlideError;
use crate::output::{DecodedImage, SlideReference};
use crate::pipeline::encode;
use crate::pipeline::transport::Transport;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

/// Upper bound on the wait before any single retry.
const MAX_BACKOFF_MS: u64 = 60_000;

/// Download and decode one slide.
pub async fn fetch_slide(
    transport: &dyn Transport,
    slide: &SlideReference,
    config: &DownloadConfig,
) -> Result<DecodedImage, SlideError> {
    let bytes = fetch_with_retry(transport, slide, config).await?;
    let index = slide.index;

    let decoded = tokio::task::spawn_blocking(move || encode::prepare_slide(bytes))
        .await
        .map_err(|e| SlideError::Decode {
            index,
            detail: format!("decode task panicked: {e}"),
        })?
        .map_err(|e| SlideError::Decode {
            index,
            detail: e.to_string(),
        })?;

    debug!(
        "Slide {}: {}x{} px, {} bytes",
        index,
        decoded.width,
        decoded.height,
        decoded.jpeg.len()
    );
    Ok(decoded)
}

async fn fetch_with_retry(
    transport: &dyn Transport,
    slide: &SlideReference,
    config: &DownloadConfig,
) -> Result<Vec<u8>, SlideError> {
    let mut attempt = 0u32;
    loop {
        if attempt > 0 {
            let backoff = backoff_ms(config.retry_backoff_ms, attempt);
            warn!(
                "Slide {}: retry {}/{} after {}ms",
                slide.index, attempt, config.max_retries, backoff
            );
            sleep(Duration::from_millis(backoff)).await;
        }

        match transport.fetch(&slide.url).await {
            Ok(bytes) => return Ok(bytes),
            Err(e) if attempt < config.max_retries => {
                warn!("Slide {}: attempt {} failed: {}", slide.index, attempt + 1, e);
                attempt += 1;
            }
            Err(e) => {
                return Err(SlideError::Transport {
                    index: slide.index,
                    attempts: attempt + 1,
                    source: e,
                })
            }
        }
    }
}

/// Wait before retry number `retry` (1-based), saturating at [`MAX_BACKOFF_MS`].
fn backoff_ms(base_ms: u64, retry: u32) -> u64 {
    let factor = 2u64.saturating_pow(retry.saturating_sub(1));
    base_ms.saturating_mul(factor).min(MAX_BACKOFF_MS)
}
