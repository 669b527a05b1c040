//! HTML extraction for mirror result pages
//!
//! A pure function from raw HTML to a structured media result: no network, no
//! session, no shared state. This keeps the brittle, markup-coupled part of
//! the system deterministic and unit-testable against fixed fixtures.
//!
//! Extraction priority (first success wins):
//! 1. `<video><source>` elements — video result
//! 2. result-area `<img>` elements whose URL carries the image-host marker —
//!    image result
//!
//! A download affordance scan and the metadata scan run independently of the
//! outcome. When neither step succeeds, the page's error block (if any) is
//! surfaced verbatim; otherwise the result is "no media found".
//!
//! The selectors target one specific mirror layout and make no attempt to be
//! robust against markup changes.

use crate::error::{Error, Result};
use crate::types::{Extraction, MediaItem, MediaKind, Metadata};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

/// Title used when the page offers no usable `<title>`
const PLACEHOLDER_TITLE: &str = "Pinterest Media";

/// Mirror branding suffix stripped from page titles
const TITLE_SUFFIX: &str = " - Snappin";

static VIDEO_SOURCES: LazyLock<Selector> = LazyLock::new(|| static_selector("video source"));
static RESULT_IMAGES: LazyLock<Selector> =
    LazyLock::new(|| static_selector(r#".response-image img, .result img, img[src*="pinimg"]"#));
static DOWNLOAD_LINKS: LazyLock<Selector> =
    LazyLock::new(|| static_selector(r#"a[href*="download"], a.button, .download-btn"#));
static ERROR_BLOCKS: LazyLock<Selector> =
    LazyLock::new(|| static_selector(".error, .alert-danger, .message.error"));
static PAGE_TITLE: LazyLock<Selector> = LazyLock::new(|| static_selector("title"));
static META_DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| static_selector(r#"meta[name="description"]"#));

// Selectors are compile-time constants; a parse failure is a programmer error
// caught by the unit tests below.
#[allow(clippy::expect_used)]
fn static_selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector must parse")
}

/// Extract media items and metadata from a mirror result page.
///
/// `source_url` is the Pinterest URL the resolution was requested for; it is
/// echoed into the metadata, never fetched.
///
/// # Errors
///
/// - [`Error::UpstreamReported`] when the page contains no media but carries
///   an error/alert block — its text is surfaced verbatim
/// - [`Error::NoMediaFound`] when the page contains neither media nor an
///   error block
pub fn extract(html: &str, source_url: &str) -> Result<Extraction> {
    let document = Html::parse_document(html);

    let mut kind = None;
    let mut items = Vec::new();

    for source in document.select(&VIDEO_SOURCES) {
        let Some(src) = source.value().attr("src") else {
            continue;
        };
        let Some(url) = normalize_url(src) else {
            continue;
        };
        let quality = source
            .value()
            .attr("label")
            .or_else(|| source.value().attr("title"))
            .unwrap_or("default");
        items.push(MediaItem::video(url, quality));
    }
    if !items.is_empty() {
        kind = Some(MediaKind::Video);
    }

    if kind.is_none() {
        for image in document.select(&RESULT_IMAGES) {
            let Some(src) = image.value().attr("src") else {
                continue;
            };
            let Some(url) = normalize_url(src) else {
                continue;
            };
            // Only accept URLs that carry the image-hosting marker
            if !url.contains("pinimg") && !url.contains("pinterest") {
                continue;
            }
            items.push(MediaItem::image(url, image.value().attr("alt").unwrap_or("")));
        }
        if !items.is_empty() {
            kind = Some(MediaKind::Image);
        }
    }

    let download_link = find_download_link(&document);
    let metadata = scrape_metadata(&document, source_url);

    match kind {
        Some(kind) => {
            tracing::debug!(
                kind = %kind,
                item_count = items.len(),
                has_download_link = download_link.is_some(),
                "extracted media from response"
            );
            Ok(Extraction {
                kind,
                items,
                download_link,
                metadata,
            })
        }
        None => match error_block_text(&document) {
            Some(text) => Err(Error::UpstreamReported(text)),
            None => Err(Error::NoMediaFound),
        },
    }
}

/// Normalize a scraped source URL to an absolute `https` URL.
///
/// Protocol-relative `//host/...` becomes `https://host/...`; relative and
/// data URIs are rejected.
fn normalize_url(src: &str) -> Option<String> {
    if src.starts_with("//") {
        Some(format!("https:{src}"))
    } else if src.starts_with("http") {
        Some(src.to_string())
    } else {
        None
    }
}

/// Find the first anchor that looks like a download affordance.
///
/// Matches by href substring or visible text; does not affect the
/// success/failure outcome of the extraction.
fn find_download_link(document: &Html) -> Option<String> {
    for anchor in document.select(&DOWNLOAD_LINKS) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(url) = normalize_url(href) else {
            continue;
        };
        if url.contains("download") || visible_text(anchor).to_lowercase().contains("download") {
            return Some(url);
        }
    }
    None
}

fn scrape_metadata(document: &Html, source_url: &str) -> Metadata {
    let mut title = PLACEHOLDER_TITLE.to_string();
    if let Some(element) = document.select(&PAGE_TITLE).next() {
        let text = visible_text(element);
        if !text.trim().is_empty() && !text.contains("Error") {
            title = text.replace(TITLE_SUFFIX, "").trim().to_string();
        }
    }

    let description = document
        .select(&META_DESCRIPTION)
        .next()
        .and_then(|element| element.value().attr("content"))
        .filter(|content| !content.is_empty())
        .map(str::to_string);

    Metadata {
        title,
        description,
        source: source_url.to_string(),
    }
}

fn error_block_text(document: &Html) -> Option<String> {
    let text: String = document
        .select(&ERROR_BLOCKS)
        .flat_map(|element| element.text())
        .collect();
    let text = text.trim().to_string();
    (!text.is_empty()).then_some(text)
}

fn visible_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE_URL: &str = "https://www.pinterest.com/pin/1234567890/";

    fn page(body: &str) -> String {
        format!(
            "<html><head><title>Resolved Pin - Snappin</title></head><body>{body}</body></html>"
        )
    }

    #[test]
    fn video_source_is_extracted_with_protocol_relative_normalization() {
        let html = page(r#"<video><source src="//cdn/x.mp4"></video>"#);

        let extraction = extract(&html, SOURCE_URL).unwrap();

        assert_eq!(extraction.kind, MediaKind::Video);
        assert_eq!(extraction.items.len(), 1);
        assert_eq!(extraction.items[0].url, "https://cdn/x.mp4");
        assert_eq!(extraction.items[0].quality.as_deref(), Some("default"));
    }

    #[test]
    fn video_quality_prefers_label_then_title() {
        let html = page(concat!(
            r#"<video>"#,
            r#"<source src="https://cdn/a.mp4" label="720p" title="HD">"#,
            r#"<source src="https://cdn/b.mp4" title="SD">"#,
            r#"<source src="https://cdn/c.mp4">"#,
            r#"</video>"#,
        ));

        let extraction = extract(&html, SOURCE_URL).unwrap();

        let qualities: Vec<_> = extraction
            .items
            .iter()
            .map(|item| item.quality.as_deref().unwrap())
            .collect();
        assert_eq!(qualities, vec!["720p", "SD", "default"]);
    }

    #[test]
    fn video_sources_with_unusable_src_are_skipped() {
        let html = page(concat!(
            r#"<video>"#,
            r#"<source src="blob:internal">"#,
            r#"<source>"#,
            r#"<source src="https://cdn/real.mp4">"#,
            r#"</video>"#,
        ));

        let extraction = extract(&html, SOURCE_URL).unwrap();

        assert_eq!(extraction.items.len(), 1);
        assert_eq!(extraction.items[0].url, "https://cdn/real.mp4");
    }

    #[test]
    fn image_fallback_when_no_video_sources_exist() {
        let html = page(
            r#"<div class="response-image"><img src="https://i.pinimg.com/originals/y.jpg" alt="a pin"></div>"#,
        );

        let extraction = extract(&html, SOURCE_URL).unwrap();

        assert_eq!(extraction.kind, MediaKind::Image);
        assert_eq!(extraction.items[0].url, "https://i.pinimg.com/originals/y.jpg");
        assert_eq!(extraction.items[0].alt.as_deref(), Some("a pin"));
    }

    #[test]
    fn image_alt_defaults_to_empty_string() {
        let html = page(
            r#"<div class="result"><img src="https://i.pinimg.com/736x/y.jpg"></div>"#,
        );

        let extraction = extract(&html, SOURCE_URL).unwrap();

        assert_eq!(extraction.items[0].alt.as_deref(), Some(""));
    }

    #[test]
    fn images_without_the_host_marker_are_rejected() {
        let html = page(concat!(
            r#"<div class="result"><img src="https://ads.example.com/banner.png"></div>"#,
            r#"<div class="result"><img src="https://i.pinimg.com/y.jpg"></div>"#,
        ));

        let extraction = extract(&html, SOURCE_URL).unwrap();

        assert_eq!(extraction.items.len(), 1);
        assert_eq!(extraction.items[0].url, "https://i.pinimg.com/y.jpg");
    }

    #[test]
    fn video_takes_priority_over_images() {
        let html = page(concat!(
            r#"<video><source src="https://cdn/x.mp4"></video>"#,
            r#"<div class="result"><img src="https://i.pinimg.com/y.jpg"></div>"#,
        ));

        let extraction = extract(&html, SOURCE_URL).unwrap();

        assert_eq!(extraction.kind, MediaKind::Video);
        assert_eq!(extraction.items.len(), 1);
    }

    #[test]
    fn download_link_found_by_href_substring() {
        let html = page(concat!(
            r#"<video><source src="https://cdn/x.mp4"></video>"#,
            r#"<a href="https://mirror/download/123">Get it</a>"#,
        ));

        let extraction = extract(&html, SOURCE_URL).unwrap();

        assert_eq!(
            extraction.download_link.as_deref(),
            Some("https://mirror/download/123")
        );
    }

    #[test]
    fn download_link_found_by_visible_text() {
        let html = page(concat!(
            r#"<video><source src="https://cdn/x.mp4"></video>"#,
            r#"<a class="button" href="https://mirror/dl/123">Download Now</a>"#,
        ));

        let extraction = extract(&html, SOURCE_URL).unwrap();

        assert_eq!(
            extraction.download_link.as_deref(),
            Some("https://mirror/dl/123")
        );
    }

    #[test]
    fn download_link_normalizes_protocol_relative_href() {
        let html = page(concat!(
            r#"<video><source src="https://cdn/x.mp4"></video>"#,
            r#"<a href="//mirror/download/9">Save</a>"#,
        ));

        let extraction = extract(&html, SOURCE_URL).unwrap();

        assert_eq!(
            extraction.download_link.as_deref(),
            Some("https://mirror/download/9")
        );
    }

    #[test]
    fn download_link_absent_does_not_fail_extraction() {
        let html = page(r#"<video><source src="https://cdn/x.mp4"></video>"#);

        let extraction = extract(&html, SOURCE_URL).unwrap();

        assert!(extraction.download_link.is_none());
    }

    #[test]
    fn title_suffix_is_stripped_and_source_echoed() {
        let html = page(r#"<video><source src="https://cdn/x.mp4"></video>"#);

        let extraction = extract(&html, SOURCE_URL).unwrap();

        assert_eq!(extraction.metadata.title, "Resolved Pin");
        assert_eq!(extraction.metadata.source, SOURCE_URL);
    }

    #[test]
    fn error_title_keeps_the_placeholder() {
        let html = concat!(
            "<html><head><title>Error - Snappin</title></head>",
            r#"<body><video><source src="https://cdn/x.mp4"></video></body></html>"#,
        );

        let extraction = extract(html, SOURCE_URL).unwrap();

        assert_eq!(extraction.metadata.title, "Pinterest Media");
    }

    #[test]
    fn meta_description_is_extracted_when_present() {
        let html = concat!(
            "<html><head><title>Pin - Snappin</title>",
            r#"<meta name="description" content="A lovely pin"></head>"#,
            r#"<body><video><source src="https://cdn/x.mp4"></video></body></html>"#,
        );

        let extraction = extract(html, SOURCE_URL).unwrap();

        assert_eq!(extraction.metadata.description.as_deref(), Some("A lovely pin"));
    }

    #[test]
    fn empty_meta_description_is_treated_as_absent() {
        let html = concat!(
            "<html><head>",
            r#"<meta name="description" content=""></head>"#,
            r#"<body><video><source src="https://cdn/x.mp4"></video></body></html>"#,
        );

        let extraction = extract(html, SOURCE_URL).unwrap();

        assert!(extraction.metadata.description.is_none());
    }

    #[test]
    fn error_block_text_is_surfaced() {
        let html = page(r#"<div class="error">Pin not found</div>"#);

        let err = extract(&html, SOURCE_URL).unwrap_err();

        match err {
            Error::UpstreamReported(text) => assert_eq!(text, "Pin not found"),
            other => panic!("expected UpstreamReported, got {other:?}"),
        }
    }

    #[test]
    fn alert_danger_blocks_also_count_as_errors() {
        let html = page(r#"<div class="alert-danger">Service temporarily unavailable</div>"#);

        let err = extract(&html, SOURCE_URL).unwrap_err();

        assert!(err.to_string().contains("Service temporarily unavailable"));
    }

    #[test]
    fn page_without_media_or_error_block_is_no_media_found() {
        let html = page("<p>Paste a Pinterest link above</p>");

        let err = extract(&html, SOURCE_URL).unwrap_err();

        assert!(matches!(err, Error::NoMediaFound));
    }

    #[test]
    fn error_block_does_not_override_successful_extraction() {
        // A stale alert on the page must not fail a pass that found media
        let html = page(concat!(
            r#"<div class="error">old message</div>"#,
            r#"<video><source src="https://cdn/x.mp4"></video>"#,
        ));

        assert!(extract(&html, SOURCE_URL).is_ok());
    }
}
