//! URL Utility Functions
//!
//! Resolution of page-relative links and image sources, plus the MIME
//! guessing used when an image response carries no usable content type.

use url::Url;

/// Whether a source is already an inline `data:` URI.
#[must_use]
pub fn is_data_uri(s: &str) -> bool {
    s.trim_start()
        .get(..5)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"))
}

/// Check if a string is an absolute `http(s)` URL with a host.
#[must_use]
pub fn is_absolute_url(s: &str) -> bool {
    let s = s.trim();
    if !s.starts_with("http://") && !s.starts_with("https://") {
        return false;
    }
    Url::parse(s).is_ok_and(|url| url.host().is_some())
}

/// Resolve a relative or absolute reference against `base`.
///
/// Inline `data:` sources and absolute URLs come back unchanged, which keeps
/// repeated resolution stable. A reference that cannot be joined is returned
/// trimmed but otherwise untouched.
///
/// ```
/// use oj_scrape::url_utils::create_absolute_url;
/// use url::Url;
///
/// let page = Url::parse("https://oj.example/problem.php?id=1000").unwrap();
/// assert_eq!(create_absolute_url("upload/a.png", &page), "https://oj.example/upload/a.png");
/// assert_eq!(create_absolute_url("/img/b.gif", &page), "https://oj.example/img/b.gif");
/// assert_eq!(create_absolute_url("data:image/png;base64,AA==", &page), "data:image/png;base64,AA==");
/// ```
#[must_use]
pub fn create_absolute_url(url_str: &str, base: &Url) -> String {
    let url_str = url_str.trim();
    if url_str.is_empty() || is_data_uri(url_str) || is_absolute_url(url_str) {
        return url_str.to_string();
    }
    base.join(url_str)
        .map_or_else(|_| url_str.to_string(), |resolved| resolved.to_string())
}

/// Last path segment of a URL, without query or fragment.
#[must_use]
pub fn extract_filename(url: &str) -> &str {
    let url = url.trim();
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    let filename = without_query.rsplit('/').next().unwrap_or("").trim();
    if filename == "." || filename == ".." {
        return "";
    }
    filename
}

/// MIME type from a `Content-Type` header value, parameters stripped.
#[must_use]
pub fn mime_from_content_type(content_type: &str) -> Option<String> {
    let mime = content_type.split(';').next().unwrap_or("").trim();
    (!mime.is_empty()).then(|| mime.to_ascii_lowercase())
}

/// Guess a MIME type from the URL's file extension.
#[must_use]
pub fn guess_mime_type(url: &str) -> Option<&'static str> {
    let filename = extract_filename(url);
    let (_, extension) = filename.rsplit_once('.')?;
    let mime = match extension.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" | "jpe" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "ico" => "image/vnd.microsoft.icon",
        "tif" | "tiff" => "image/tiff",
        "avif" => "image/avif",
        "html" | "htm" | "php" => "text/html",
        "txt" => "text/plain",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        _ => return None,
    };
    Some(mime)
}
