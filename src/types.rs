//! Core types for pinterest-dl

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Kind of media resolved from a pin
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// One or more `<video><source>` elements were found
    Video,
    /// One or more qualifying result images were found
    Image,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Video => write!(f, "video"),
            MediaKind::Image => write!(f, "image"),
        }
    }
}

/// One resolved downloadable asset with its direct URL
///
/// Video items carry a `quality` label, image items carry the `alt` text.
/// URLs are always absolute (`https://...`); protocol-relative sources are
/// normalized before an item is constructed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MediaItem {
    /// Absolute URL of the asset
    pub url: String,

    /// Quality label for video sources (e.g. `"720p"`, default `"default"`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,

    /// Alt text for images (default `""`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

impl MediaItem {
    /// Create a video item with its quality label
    pub fn video(url: impl Into<String>, quality: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            quality: Some(quality.into()),
            alt: None,
        }
    }

    /// Create an image item with its alt text
    pub fn image(url: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            quality: None,
            alt: Some(alt.into()),
        }
    }
}

/// Page-level metadata scraped alongside the media
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Metadata {
    /// Page title with the mirror's suffix stripped; a fixed placeholder when
    /// no usable title was found
    pub title: String,

    /// `<meta name="description">` content, if present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// The Pinterest URL the resolution was requested for
    pub source: String,
}

/// Structured output of the HTML extractor
///
/// Invariant: `items` is non-empty — an extraction with no media is an error,
/// not an empty `Extraction`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Extraction {
    /// Kind of media that was found
    pub kind: MediaKind,
    /// The resolved media items, in document order
    pub items: Vec<MediaItem>,
    /// Optional standalone download affordance found on the page
    pub download_link: Option<String>,
    /// Scraped page metadata
    pub metadata: Metadata,
}

/// The success payload of a resolution, as returned by the API
///
/// This is an [`Extraction`] stamped with its generation time. Produced fresh
/// per request; never cached.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    /// Kind of media that was resolved
    #[serde(rename = "type")]
    pub kind: MediaKind,

    /// The resolved media items, in document order (non-empty)
    pub urls: Vec<MediaItem>,

    /// Optional standalone download link found on the result page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_link: Option<String>,

    /// Scraped page metadata
    pub metadata: Metadata,

    /// When this resolution was produced
    pub timestamp: DateTime<Utc>,
}

impl Resolution {
    /// Stamp an extraction with the current time
    pub fn from_extraction(extraction: Extraction) -> Self {
        Self {
            kind: extraction.kind,
            urls: extraction.items,
            download_link: extraction.download_link,
            metadata: extraction.metadata,
            timestamp: Utc::now(),
        }
    }
}
