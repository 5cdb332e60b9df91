//! Metadata extraction: find the presentation identifier, slide count and
//! title in a landing page.
//!
//! ## Strategy order
//!
//! The identifier is looked up by an ordered list of independent strategies
//! ([`IDENTIFIER_STRATEGIES`]); the first one that returns something wins:
//!
//! 1. `<img>` elements whose `src` points at a slide image. This also yields
//!    a slide count (highest index seen + 1) because it observes real slide
//!    resources.
//! 2. The `thumbnailUrl` of the first JSON-LD block.
//! 3. The first slide-asset URL anywhere in the raw HTML.
//!
//! If no count came out of step 1, the visible page text is searched for an
//! "N slides" fragment. Anything still missing is resolved by the caller
//! (probing, see [`crate::pipeline::probe`]).
//!
//! Every strategy is a pure `fn(&LandingPage) -> Option<_>` so each can be
//! tested on its own.

use crate::error::DeckError;
use crate::output::{CountSource, IdentifierSource, PresentationSource};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Title used when the page has no `og:title` or it sanitizes to nothing.
pub const DEFAULT_TITLE: &str = "presentation";

// ── Asset URL patterns ───────────────────────────────────────────────────────

/// Regexes derived from the configured slide-asset base URL.
///
/// With the default base `https://files.speakerdeck.com/presentations`:
/// - `prefix` is `files.speakerdeck.com/presentations/`
/// - `collection` is `presentations`
#[derive(Debug, Clone)]
pub struct AssetPatterns {
    prefix: String,
    slide_image: Regex,
    thumbnail: Regex,
    raw: Regex,
}

impl AssetPatterns {
    pub fn new(asset_base_url: &str) -> Result<Self, DeckError> {
        let without_scheme = asset_base_url
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(asset_base_url)
            .trim_end_matches('/');
        let collection = without_scheme.rsplit('/').next().unwrap_or(without_scheme);
        let prefix = format!("{without_scheme}/");

        let compile = |pattern: String| {
            Regex::new(&pattern).map_err(|e| {
                DeckError::InvalidConfig(format!("asset base URL '{asset_base_url}': {e}"))
            })
        };

        Ok(Self {
            slide_image: compile(format!(
                r"{}/([a-f0-9]+)/(?:preview_)?slide_([0-9]+)\.jpg",
                regex::escape(collection)
            ))?,
            thumbnail: compile(format!(r"{}/([a-f0-9]+)/", regex::escape(collection)))?,
            raw: compile(format!(r"{}([a-f0-9]+)/", regex::escape(&prefix)))?,
            prefix,
        })
    }
}

// ── Landing page ─────────────────────────────────────────────────────────────

/// A landing page plus the patterns needed to read it.
pub struct LandingPage<'a> {
    pub html: &'a str,
    pub assets: &'a AssetPatterns,
}

/// What an identifier strategy found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    pub identifier: String,
    /// Slide count observed alongside the identifier, if any.
    pub slide_count: Option<usize>,
}

/// A single identifier-discovery strategy.
pub type IdentifierStrategy = fn(&LandingPage<'_>) -> Option<Discovery>;

/// Identifier strategies in the order they are tried.
pub const IDENTIFIER_STRATEGIES: &[(IdentifierSource, IdentifierStrategy)] = &[
    (IdentifierSource::SlideImages, from_slide_images),
    (IdentifierSource::StructuredData, from_structured_data),
    (IdentifierSource::RawHtml, from_raw_html),
];

/// Everything the landing page told us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMetadata {
    pub identifier: Option<(String, IdentifierSource)>,
    pub slide_count: Option<(usize, CountSource)>,
    pub title: String,
    pub title_slug: String,
}

impl PageMetadata {
    /// Turn the extraction result into a [`PresentationSource`].
    ///
    /// Fails with [`DeckError::IdentifierNotFound`] if no strategy found an
    /// identifier. A missing slide count is not an error here; the caller
    /// decides whether to probe.
    pub fn into_source(self, url: &str) -> Result<PresentationSource, DeckError> {
        let (identifier, identifier_source) =
            self.identifier.ok_or_else(|| DeckError::IdentifierNotFound {
                url: url.to_string(),
            })?;

        Ok(PresentationSource {
            identifier,
            title: self.title,
            title_slug: self.title_slug,
            known_slide_count: self.slide_count.map(|(n, _)| n),
            identifier_source,
            count_source: self.slide_count.map(|(_, source)| source),
        })
    }
}

/// Run every extraction step over `html`. Pure; no network access.
pub fn extract_metadata(html: &str, assets: &AssetPatterns) -> PageMetadata {
    let page = LandingPage { html, assets };

    let mut identifier = None;
    let mut slide_count = None;

    for (source, strategy) in IDENTIFIER_STRATEGIES {
        if let Some(found) = strategy(&page) {
            debug!("Identifier '{}' found via {}", found.identifier, source);
            if let Some(n) = found.slide_count {
                slide_count = Some((n, CountSource::SlideImages));
            }
            identifier = Some((found.identifier, *source));
            break;
        }
    }

    if slide_count.is_none() {
        slide_count = count_from_text(&page).map(|n| (n, CountSource::PageText));
    }

    let title = og_title(&page).unwrap_or_else(|| DEFAULT_TITLE.to_string());
    let title_slug = sanitize_title(&title);

    PageMetadata {
        identifier,
        slide_count,
        title,
        title_slug,
    }
}

// ── Strategy 1: slide <img> elements ─────────────────────────────────────────

static RE_IMG_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<img\b[^>]*>").unwrap());

/// Identifier and slide count from `<img src=…slide_N.jpg>` elements.
///
/// The count is the highest index seen plus one; the identifier is the one
/// on the last matching element.
pub fn from_slide_images(page: &LandingPage<'_>) -> Option<Discovery> {
    let mut identifier = None;
    let mut slide_count = 0usize;

    for tag in RE_IMG_TAG.find_iter(page.html) {
        let Some(src) = attribute(tag.as_str(), "src") else {
            continue;
        };
        if !src.contains(&page.assets.prefix) {
            continue;
        }
        if let Some(caps) = page.assets.slide_image.captures(&src) {
            let Some(count) = caps[2]
                .parse::<usize>()
                .ok()
                .and_then(|index| index.checked_add(1))
            else {
                continue;
            };
            identifier = Some(caps[1].to_string());
            slide_count = slide_count.max(count);
        }
    }

    identifier.map(|identifier| Discovery {
        identifier,
        slide_count: Some(slide_count),
    })
}

// ── Strategy 2: JSON-LD thumbnail ────────────────────────────────────────────

static RE_LD_JSON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?is)<script\b[^>]*\btype\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script\s*>"#,
    )
    .unwrap()
});

/// Identifier from the `thumbnailUrl` of the first JSON-LD block.
pub fn from_structured_data(page: &LandingPage<'_>) -> Option<Discovery> {
    let block = RE_LD_JSON.captures(page.html)?;
    let data: serde_json::Value = match serde_json::from_str(block[1].trim()) {
        Ok(v) => v,
        Err(e) => {
            debug!("Ignoring unparsable JSON-LD block: {}", e);
            return None;
        }
    };

    let thumbnail = data.get("thumbnailUrl")?.as_str()?;
    let caps = page.assets.thumbnail.captures(thumbnail)?;
    Some(Discovery {
        identifier: caps[1].to_string(),
        slide_count: None,
    })
}

// ── Strategy 3: raw HTML search ──────────────────────────────────────────────

/// Identifier from the first slide-asset URL anywhere in the page.
pub fn from_raw_html(page: &LandingPage<'_>) -> Option<Discovery> {
    let caps = page.assets.raw.captures(page.html)?;
    Some(Discovery {
        identifier: caps[1].to_string(),
        slide_count: None,
    })
}

// ── Slide count from visible text ────────────────────────────────────────────

static RE_INVISIBLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>|<!--.*?-->").unwrap()
});
static RE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());
static RE_SLIDE_COUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)([0-9]+)\s*slides?").unwrap());

/// Text content of the page with scripts, styles, comments and tags removed.
pub fn visible_text(html: &str) -> String {
    let without_blocks = RE_INVISIBLE.replace_all(html, " ");
    let without_tags = RE_TAG.replace_all(&without_blocks, " ");
    decode_entities(&without_tags)
}

/// First "N slide(s)" fragment in the visible text. Zero counts are ignored.
pub fn count_from_text(page: &LandingPage<'_>) -> Option<usize> {
    let text = visible_text(page.html);
    let caps = RE_SLIDE_COUNT.captures(&text)?;
    caps[1].parse::<usize>().ok().filter(|&n| n > 0)
}

// ── Title ────────────────────────────────────────────────────────────────────

static RE_META_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<meta\b[^>]*>").unwrap());

/// `content` of `<meta property="og:title">`, entity-decoded.
pub fn og_title(page: &LandingPage<'_>) -> Option<String> {
    RE_META_TAG
        .find_iter(page.html)
        .map(|m| m.as_str())
        .find(|tag| attribute(tag, "property").as_deref() == Some("og:title"))
        .and_then(|tag| attribute(tag, "content"))
}

static RE_UNSAFE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s-]").unwrap());
static RE_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-\s]+").unwrap());

/// Filesystem-safe slug: drop everything but word characters, whitespace and
/// hyphens, trim, then collapse whitespace/hyphen runs into one hyphen.
///
/// Idempotent. An empty result becomes [`DEFAULT_TITLE`].
pub fn sanitize_title(title: &str) -> String {
    let cleaned = RE_UNSAFE_CHARS.replace_all(title, "");
    let slug = RE_SEPARATORS.replace_all(cleaned.trim(), "-").into_owned();
    if slug.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        slug
    }
}

// ── HTML helpers ─────────────────────────────────────────────────────────────

static RE_ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)([^\s"'<>/=]+)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#).unwrap()
});

/// Value of attribute `name` (case-insensitive) in a single start tag.
fn attribute(tag: &str, name: &str) -> Option<String> {
    RE_ATTRIBUTE.captures_iter(tag).find_map(|caps| {
        if !caps[1].eq_ignore_ascii_case(name) {
            return None;
        }
        let raw = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map_or("", |m| m.as_str());
        Some(decode_entities(raw))
    })
}

static RE_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]+);").unwrap());

/// Decode numeric and the common named character references.
fn decode_entities(input: &str) -> String {
    RE_ENTITY
        .replace_all(input, |caps: &regex::Captures<'_>| {
            let body = &caps[1];
            let decoded = if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = body.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match body {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some('\u{a0}'),
                    _ => None,
                }
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}
