//! Slide-count probing: find how many slides exist when the landing page
//! does not say.
//!
//! ## Algorithm
//!
//! Binary search over slide indices using HEAD requests. It relies on slide
//! existence being contiguous: if slide `k` exists, so do `0..k`. Under that
//! assumption the last existing index is the only boundary, and
//! `O(log bound)` probes find it.
//!
//! A deck with a missing interior slide breaks the assumption and the result
//! undercounts without any error. That is accepted rather than detected.
//!
//! Slide 0 is probed first: if it does not exist the presentation has no
//! slides, whatever higher indices may answer.
//!
//! Any transport failure during a probe counts as "does not exist". Flaky
//! networks therefore undercount instead of aborting the run.

use crate::output::PresentationSource;
use crate::pipeline::transport::Transport;
use tracing::{debug, info, warn};

/// Result of a probe run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOutcome {
    /// Contiguous slides starting at index 0.
    pub slide_count: usize,
    /// HEAD requests issued.
    pub requests: usize,
}

/// Count the slides of `source` by probing indices `0..=max_slides`.
pub async fn probe_slide_count(
    transport: &dyn Transport,
    source: &PresentationSource,
    asset_base_url: &str,
    max_slides: usize,
) -> ProbeOutcome {
    info!(
        "Detecting number of slides for '{}' (bound {})",
        source.identifier, max_slides
    );
    let outcome = binary_search(max_slides, |index| {
        let url = source.slide_url(asset_base_url, index);
        async move { slide_exists(transport, &url).await }
    })
    .await;
    info!(
        "Detected {} slides with {} probes",
        outcome.slide_count, outcome.requests
    );
    outcome
}

async fn slide_exists(transport: &dyn Transport, url: &str) -> bool {
    match transport.exists(url).await {
        Ok(exists) => {
            debug!("probe {} → {}", url, exists);
            exists
        }
        Err(e) => {
            warn!("Probe failed, treating slide as missing: {}", e);
            false
        }
    }
}

/// Binary search for the last index `i <= high` with `exists(i)`, assuming
/// existence is contiguous from 0.
async fn binary_search<F, Fut>(high: usize, mut exists: F) -> ProbeOutcome
where
    F: FnMut(usize) -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let mut requests = 1;
    if !exists(0).await {
        return ProbeOutcome {
            slide_count: 0,
            requests,
        };
    }

    let mut low = 1usize;
    let mut high = high;
    let mut last_confirmed = 0usize;

    while low <= high {
        let mid = low + (high - low) / 2;
        requests += 1;
        if exists(mid).await {
            last_confirmed = mid;
            low = mid + 1;
        } else {
            // mid >= 1 here, so this never underflows
            high = mid - 1;
        }
    }

    ProbeOutcome {
        slide_count: last_confirmed + 1,
        requests,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{IdentifierSource, PresentationSource};
    use crate::pipeline::transport::testing::FakeTransport;

    const BASE: &str = "https://files.example.com/presentations";

    fn source() -> PresentationSource {
        PresentationSource {
            identifier: "abc".into(),
            title: "t".into(),
            title_slug: "t".into(),
            known_slide_count: None,
            identifier_source: IdentifierSource::RawHtml,
            count_source: None,
        }
    }

    fn deck(existing: impl IntoIterator<Item = usize>) -> FakeTransport {
        let s = source();
        existing.into_iter().fold(FakeTransport::new(), |t, i| {
            t.with_body(s.slide_url(BASE, i), b"jpg".to_vec())
        })
    }

    fn count(existing: &[bool], bound: usize) -> usize {
        tokio_test::block_on(binary_search(bound, |i| {
            let exists = existing.get(i).copied().unwrap_or(false);
            async move { exists }
        }))
        .slide_count
    }

    #[tokio::test]
    async fn seventeen_slides() {
        let t = deck(0..17);
        let outcome = probe_slide_count(&t, &source(), BASE, 300).await;
        assert_eq!(outcome.slide_count, 17);
        assert_eq!(outcome.requests, t.probe_count());
        assert!(outcome.requests <= 11, "too many probes: {}", outcome.requests);
    }

    #[tokio::test]
    async fn missing_first_slide_means_zero() {
        let t = deck(1..50);
        let outcome = probe_slide_count(&t, &source(), BASE, 300).await;
        assert_eq!(outcome.slide_count, 0);
        assert_eq!(outcome.requests, 1);
    }

    #[tokio::test]
    async fn probe_failures_count_as_missing() {
        let s = source();
        let t = deck(0..40).with_broken(s.slide_url(BASE, 150));
        // 150 is the first midpoint; its failure is read as "missing"
        let outcome = probe_slide_count(&t, &s, BASE, 300).await;
        assert_eq!(outcome.slide_count, 40);

        let t = deck(0..40).with_broken(s.slide_url(BASE, 0));
        assert_eq!(probe_slide_count(&t, &s, BASE, 300).await.slide_count, 0);
    }

    #[test]
    fn exact_for_every_contiguous_count() {
        for n in 0..=64 {
            let existing: Vec<bool> = (0..n).map(|_| true).collect();
            assert_eq!(count(&existing, 64), n, "n = {n}");
        }
    }

    #[test]
    fn count_at_bound_is_capped() {
        let existing = vec![true; 500];
        assert_eq!(count(&existing, 300), 301);
        assert_eq!(count(&existing, 1), 2);
    }

    #[test]
    fn raising_the_bound_never_lowers_the_count() {
        for n in [1usize, 5, 17, 63, 99] {
            let existing = vec![true; n];
            let mut previous = 0;
            for bound in n..n + 40 {
                let c = count(&existing, bound);
                assert!(c >= previous, "n={n} bound={bound}: {c} < {previous}");
                assert_eq!(c, n);
                previous = c;
            }
        }
    }

    #[test]
    fn interior_gap_undercounts() {
        // slides 0..18 and 19 exist, 18 is missing; the search never sees 19
        let existing: Vec<bool> = (0..20).map(|i| i != 18).collect();
        assert_eq!(count(&existing, 300), 18);
    }
}
