//! Input resolution: validate the presentation URL and fetch its landing page.
//!
//! Validation is purely syntactic and happens before any request is made, so
//! a malformed URL never touches the network.

use crate::error::DeckError;
use crate::pipeline::transport::Transport;
use regex::Regex;
use tracing::{debug, info};

/// Check that `input` is `http(s)://<site_host>/<owner>/<slug>`.
///
/// Owner and slug may contain word characters and hyphens only.
pub fn validate_url(input: &str, site_host: &str) -> Result<(), DeckError> {
    let pattern = format!(r"^https?://{}/[\w-]+/[\w-]+$", regex::escape(site_host));
    let re = Regex::new(&pattern)
        .map_err(|e| DeckError::InvalidConfig(format!("site host '{site_host}': {e}")))?;

    if re.is_match(input) {
        Ok(())
    } else {
        Err(DeckError::InvalidSource {
            input: input.to_string(),
            host: site_host.to_string(),
        })
    }
}

/// Download the landing page as text.
///
/// Transport failures here are fatal for the run.
pub async fn fetch_landing_page(transport: &dyn Transport, url: &str) -> Result<String, DeckError> {
    info!("Fetching presentation info from: {}", url);

    let body = transport
        .fetch(url)
        .await
        .map_err(DeckError::from_landing_page)?;

    Ok(decode_body(url, body))
}

fn decode_body(url: &str, body: Vec<u8>) -> String {
    match String::from_utf8(body) {
        Ok(s) => s,
        Err(e) => {
            debug!("Landing page {} is not valid UTF-8; decoding lossily", url);
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::transport::testing::FakeTransport;

    const HOST: &str = "speakerdeck.com";

    #[test]
    fn accepts_owner_slug_urls() {
        assert!(validate_url("https://speakerdeck.com/jane/my-talk", HOST).is_ok());
        assert!(validate_url("http://speakerdeck.com/jane_doe/talk-2024", HOST).is_ok());
    }

    #[test]
    fn rejects_malformed_urls() {
        for bad in [
            "",
            "speakerdeck.com/jane/talk",
            "https://speakerdeck.com/jane",
            "https://speakerdeck.com/jane/talk/extra",
            "https://speakerdeck.com/jane/talk?x=1",
            "https://speakerdeck.com/jane/my talk",
            "https://evil.example/jane/talk",
            "https://speakerdeckXcom/jane/talk",
            "ftp://speakerdeck.com/jane/talk",
        ] {
            let err = validate_url(bad, HOST).unwrap_err();
            assert!(matches!(err, DeckError::InvalidSource { .. }), "{bad:?} → {err}");
        }
    }

    #[test]
    fn host_with_port_is_escaped() {
        assert!(validate_url("http://127.0.0.1:9000/a/b", "127.0.0.1:9000").is_ok());
        assert!(validate_url("http://127x0x0x1:9000/a/b", "127.0.0.1:9000").is_err());
    }

    #[tokio::test]
    async fn landing_page_404_is_fatal() {
        let t = FakeTransport::new();
        let err = fetch_landing_page(&t, "https://speakerdeck.com/a/b")
            .await
            .unwrap_err();
        assert!(matches!(err, DeckError::DownloadFailed { .. }), "got {err}");
    }

    #[tokio::test]
    async fn landing_page_invalid_utf8_is_decoded_lossily() {
        let t = FakeTransport::new().with_body("https://speakerdeck.com/a/b", vec![b'o', b'k', 0xFF]);
        let html = fetch_landing_page(&t, "https://speakerdeck.com/a/b")
            .await
            .unwrap();
        assert!(html.starts_with("ok"));
    }
}
