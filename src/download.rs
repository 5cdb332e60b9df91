//! Download entry points: presentation URL → PDF on disk.
//!
//! ## Run sequence
//!
//! ```text
//! validate ─▶ landing page ─▶ extract ─▶ count known? ─┬─ yes ─────────┐
//!                                                      └─ no ─▶ probe ─┤
//!                                                                      ▼
//!                       seal ◀── append in index order ◀── fetch slides 0..count
//! ```
//!
//! Everything up to and including count resolution is fatal on failure and
//! happens before the output file is touched. Once slides are being fetched,
//! a failing slide is logged, reported and skipped; the run only fails if
//! no slide at all could be placed in the document.

use crate::config::DownloadConfig;
use crate::error::DeckError;
use crate::output::{CountSource, DownloadOutput, DownloadStats, PresentationSource};
use crate::pipeline::assemble::DocumentAssembler;
use crate::pipeline::extract::{self, AssetPatterns};
use crate::pipeline::probe;
use crate::pipeline::source;
use crate::pipeline::transport::{HttpTransport, Transport};
use crate::stream::fetch_slides;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Download a presentation and write it as `<output_dir>/<title-slug>.pdf`.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// `Ok(DownloadOutput)` once the document is written, even if some slides
/// were skipped (check `output.failures`).
///
/// # Errors
/// Returns `Err(DeckError)` only for fatal errors, and never leaves an
/// output file behind when it does:
/// - URL does not match `https://<site_host>/<owner>/<slug>`
/// - Landing page unreachable
/// - No identifier or slide count could be found
/// - Every slide failed
pub async fn download(
    url: impl AsRef<str>,
    config: &DownloadConfig,
) -> Result<DownloadOutput, DeckError> {
    let total_start = Instant::now();
    let url = url.as_ref();
    info!("Starting download: {}", url);

    let transport = resolve_transport(config)?;
    let source = resolve_presentation(transport.as_ref(), url, config).await?;
    assemble(transport, source, config, total_start).await
}

/// Download a presentation whose landing page has already been read.
///
/// If `source.known_slide_count` is `None` the count is probed first.
pub async fn download_presentation(
    source: &PresentationSource,
    config: &DownloadConfig,
) -> Result<DownloadOutput, DeckError> {
    let total_start = Instant::now();
    let transport = resolve_transport(config)?;
    let source = resolve_slide_count(transport.as_ref(), source.clone(), config).await?;
    assemble(transport, source, config, total_start).await
}

/// Synchronous wrapper around [`download`].
///
/// Creates a temporary tokio runtime internally.
pub fn download_sync(
    url: impl AsRef<str>,
    config: &DownloadConfig,
) -> Result<DownloadOutput, DeckError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| DeckError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(download(url, config))
}

/// Resolve a presentation without downloading any slide image.
///
/// Performs validation, extraction and (if needed) probing, so the returned
/// source always carries a slide count.
pub async fn inspect(
    url: impl AsRef<str>,
    config: &DownloadConfig,
) -> Result<PresentationSource, DeckError> {
    let transport = resolve_transport(config)?;
    resolve_presentation(transport.as_ref(), url.as_ref(), config).await
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Use the injected transport, or build an [`HttpTransport`] for this run.
pub(crate) fn resolve_transport(config: &DownloadConfig) -> Result<Arc<dyn Transport>, DeckError> {
    if let Some(ref transport) = config.transport {
        return Ok(Arc::clone(transport));
    }
    Ok(Arc::new(HttpTransport::new(config)?))
}

/// Validate `url`, read its landing page and resolve the slide count.
pub(crate) async fn resolve_presentation(
    transport: &dyn Transport,
    url: &str,
    config: &DownloadConfig,
) -> Result<PresentationSource, DeckError> {
    source::validate_url(url, &config.site_host)?;

    let html = source::fetch_landing_page(transport, url).await?;
    let assets = AssetPatterns::new(&config.asset_base_url)?;
    let presentation = extract::extract_metadata(&html, &assets).into_source(url)?;
    info!(
        "Presentation '{}' ({}), id {} via {}",
        presentation.title,
        presentation.title_slug,
        presentation.identifier,
        presentation.identifier_source
    );

    resolve_slide_count(transport, presentation, config).await
}

/// Fill in `known_slide_count` by probing when the page did not state it.
///
/// A stated count above `max_probe_slides + 1` is not trusted either; the
/// probe result replaces it.
async fn resolve_slide_count(
    transport: &dyn Transport,
    mut presentation: PresentationSource,
    config: &DownloadConfig,
) -> Result<PresentationSource, DeckError> {
    let limit = config.max_probe_slides.saturating_add(1);
    match (presentation.known_slide_count, presentation.count_source) {
        (Some(n), Some(how)) if n <= limit => {
            info!("Found {} slides via {}", n, how);
            return Ok(presentation);
        }
        (Some(n), _) if n > limit => {
            warn!(
                "Page claims {} slides, above the limit of {}; probing instead",
                n, limit
            );
        }
        _ => {}
    }

    let outcome = probe::probe_slide_count(
        transport,
        &presentation,
        &config.asset_base_url,
        config.max_probe_slides,
    )
    .await;

    if outcome.slide_count == 0 {
        return Err(DeckError::SlideCountUnknown {
            identifier: presentation.identifier,
        });
    }

    presentation.known_slide_count = Some(outcome.slide_count);
    presentation.count_source = Some(CountSource::Probe);
    Ok(presentation)
}

/// Fetch every slide, append in index order and seal the document.
async fn assemble(
    transport: Arc<dyn Transport>,
    source: PresentationSource,
    config: &DownloadConfig,
    total_start: Instant,
) -> Result<DownloadOutput, DeckError> {
    let total = source.known_slide_count.unwrap_or(0);
    let slides = source.slide_references(&config.asset_base_url, total);
    debug!("Built {} slide references", slides.len());

    if let Some(ref cb) = config.progress_callback {
        cb.on_download_start(total);
    }

    let fetch_start = Instant::now();
    let mut document = DocumentAssembler::new(&source.title);
    let mut failures = Vec::new();
    let mut stream = fetch_slides(transport, slides, config);

    while let Some(result) = stream.next().await {
        let appended = result.and_then(|slide| {
            let (index, width, height) = (slide.index, slide.image.width, slide.image.height);
            document
                .append(index, slide.image)
                .map(|()| (index, width, height))
        });

        match appended {
            Ok((index, width, height)) => {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_slide_complete(index + 1, total, width, height);
                }
            }
            Err(e) => {
                warn!("Skipping slide: {}", e);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_slide_error(e.index() + 1, total, &e.to_string());
                }
                failures.push(e);
            }
        }
    }
    let fetch_duration_ms = fetch_start.elapsed().as_millis() as u64;

    let fetched = document.page_count();
    if let Some(ref cb) = config.progress_callback {
        cb.on_download_complete(total, fetched);
    }

    if fetched == 0 {
        let first_error = failures
            .first()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "Unknown error".to_string());
        return Err(DeckError::NoSlidesRetrieved {
            requested: total,
            first_error,
        });
    }

    let path = config.output_dir.join(format!("{}.pdf", source.title_slug));
    let sealed = document.seal(&path)?;

    let stats = DownloadStats {
        total_slides: total,
        fetched_slides: fetched,
        failed_slides: failures.len(),
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        fetch_duration_ms,
    };

    info!(
        "Download complete: {}/{} slides, {}ms total",
        fetched, total, stats.total_duration_ms
    );

    Ok(DownloadOutput {
        path: sealed.path,
        source,
        geometry: sealed.geometry,
        pages: sealed.pages,
        failures,
        stats,
    })
}
