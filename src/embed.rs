//! Resource Embedding
//!
//! Problem statements reference images behind the judge's login, so a copy of
//! the markup is only self-contained once those images are inlined. Sources
//! are first made absolute, then fetched through the caller's authenticated
//! [`ImageFetcher`] and rewritten to `data:` URIs. Embedding is best effort:
//! a failed, empty, oversized or non-image response leaves the tag as is.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use dashmap::DashMap;
use url::Url;

use crate::dom::{self, Document};
use crate::error::Result;
use crate::url_utils::{create_absolute_url, guess_mime_type, is_data_uri, mime_from_content_type};

/// Lazy-load attributes removed once an image carries its bytes inline.
const LAZY_SOURCE_ATTRIBUTES: &[&str] = &["data-src", "srcset", "data-original", "data-lazy-src"];

/// An image response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedImage {
    /// Response body.
    pub bytes: Vec<u8>,
    /// `Content-Type` header, if any.
    pub content_type: Option<String>,
}

/// Authenticated image download.
pub trait ImageFetcher {
    /// Fetch the bytes behind an absolute URL.
    fn fetch_image(&self, url: &str) -> Result<FetchedImage>;
}

impl<F> ImageFetcher for F
where
    F: Fn(&str) -> Result<FetchedImage>,
{
    fn fetch_image(&self, url: &str) -> Result<FetchedImage> {
        self(url)
    }
}

/// Absolute image URL to embedding outcome.
///
/// `None` values are negative results (failed, oversized or not an image) and
/// are served without another fetch. The cache is safe to share between
/// threads; two concurrent misses on one URL may both fetch it.
#[derive(Debug, Default)]
pub struct ImageCache {
    entries: DashMap<String, Option<String>>,
}

impl ImageCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached outcome for `url`. The outer `None` means "not cached".
    #[must_use]
    pub fn get(&self, url: &str) -> Option<Option<String>> {
        self.entries.get(url).map(|entry| entry.value().clone())
    }

    pub fn insert(&self, url: impl Into<String>, data_uri: Option<String>) {
        self.entries.insert(url.into(), data_uri);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

/// Rewrite every image source, and its `data-src` lazy source, to an absolute URL.
///
/// An image without `src` takes its `data-src` as the source. Inline `data:`
/// sources are left alone, so running this twice changes nothing.
pub fn absolutize(doc: &Document, base: &Url) {
    let images = doc.select("img");
    for img in dom::each(&images) {
        let src = dom::non_empty_attribute(&img, "src");
        let data_src = dom::non_empty_attribute(&img, "data-src");
        let Some(candidate) = src.as_deref().or(data_src.as_deref()) else {
            continue;
        };
        let absolute = create_absolute_url(candidate, base);
        if src.as_deref() != Some(absolute.as_str()) {
            dom::set_attribute(&img, "src", &absolute);
        }
        if let Some(lazy) = data_src {
            dom::set_attribute(&img, "data-src", &create_absolute_url(&lazy, base));
        }
    }
}

/// Inline protected images as `data:` URIs.
///
/// Returns how many images were rewritten. Failures are cached as negative
/// results and never reported.
pub fn embed_protected(
    doc: &Document,
    fetcher: &dyn ImageFetcher,
    cache: &ImageCache,
    base: &Url,
    max_bytes: usize,
) -> usize {
    let images = doc.select("img");
    let mut embedded = 0;
    for img in dom::each(&images) {
        let Some(src) = dom::non_empty_attribute(&img, "src") else {
            continue;
        };
        if is_data_uri(&src) {
            continue;
        }
        let absolute = create_absolute_url(&src, base);
        let Some(data_uri) = data_uri_for(&absolute, fetcher, cache, max_bytes) else {
            continue;
        };
        dom::set_attribute(&img, "src", &data_uri);
        for attr in LAZY_SOURCE_ATTRIBUTES {
            dom::remove_attribute(&img, attr);
        }
        embedded += 1;
    }
    embedded
}

/// Cached or freshly fetched data URI for an absolute image URL.
fn data_uri_for(
    url: &str,
    fetcher: &dyn ImageFetcher,
    cache: &ImageCache,
    max_bytes: usize,
) -> Option<String> {
    if let Some(cached) = cache.get(url) {
        return cached;
    }
    let outcome = match fetcher.fetch_image(url) {
        Ok(image) => encode_image(url, &image, max_bytes),
        Err(err) => {
            tracing::debug!(%url, %err, "image fetch failed");
            None
        }
    };
    cache.insert(url, outcome.clone());
    outcome
}

/// Encode an image body as a data URI, or `None` when it should not be inlined.
///
/// The MIME type comes from the response's content type, falling back to the
/// URL's extension; anything outside `image/*` is refused.
#[must_use]
pub fn encode_image(url: &str, image: &FetchedImage, max_bytes: usize) -> Option<String> {
    if image.bytes.is_empty() {
        tracing::debug!(%url, "image body is empty");
        return None;
    }
    if image.bytes.len() > max_bytes {
        tracing::debug!(%url, size = image.bytes.len(), max_bytes, "image too large to embed");
        return None;
    }
    let mime = image
        .content_type
        .as_deref()
        .and_then(mime_from_content_type)
        .or_else(|| guess_mime_type(url).map(str::to_string))?;
    if !mime.starts_with("image/") {
        tracing::debug!(%url, %mime, "not an image");
        return None;
    }
    Some(format!("data:{mime};base64,{}", STANDARD.encode(&image.bytes)))
}
