//! Character encoding detection and transcoding.
//!
//! Judge pages are usually UTF-8, but older installs still serve GBK. The
//! charset is taken from the response `Content-Type` when present, then from
//! the page's own `<meta>` declaration, and defaults to UTF-8.

use std::sync::LazyLock;

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;

/// Bytes of the document searched for a `<meta>` charset.
const META_SNIFF_LIMIT: usize = 1024;

/// `<meta charset="...">`, or the charset parameter inside
/// `<meta http-equiv="Content-Type" content="...">`.
#[allow(clippy::expect_used)]
static META_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s;>/]+)"#).expect("META_CHARSET regex")
});

/// `charset=` parameter of a `Content-Type` header value.
#[allow(clippy::expect_used)]
static HEADER_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i);\s*charset\s*=\s*["']?([^"'\s;]+)"#).expect("HEADER_CHARSET regex")
});

fn lookup(label: &str) -> Option<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
}

/// Encoding named by a `Content-Type` header value, if it names a known one.
#[must_use]
pub fn charset_from_content_type(content_type: &str) -> Option<&'static Encoding> {
    HEADER_CHARSET
        .captures(content_type)
        .and_then(|caps| lookup(&caps[1]))
}

/// Encoding declared by the document's `<meta>` tags, defaulting to UTF-8.
#[must_use]
pub fn detect_encoding(html: &[u8]) -> &'static Encoding {
    let head = String::from_utf8_lossy(&html[..html.len().min(META_SNIFF_LIMIT)]);
    META_CHARSET
        .captures(&head)
        .and_then(|caps| lookup(&caps[1]))
        .unwrap_or(UTF_8)
}

/// Transcode HTML bytes to UTF-8 using the document's own declaration.
///
/// Invalid sequences become U+FFFD instead of failing.
///
/// ```
/// use oj_scrape::encoding::transcode_to_utf8;
///
/// let html = b"<meta charset=\"gbk\"><p>\xc4\xe3\xba\xc3</p>";
/// assert!(transcode_to_utf8(html).contains("你好"));
/// ```
#[must_use]
pub fn transcode_to_utf8(html: &[u8]) -> String {
    decode_with(detect_encoding(html), html)
}

/// Decode a response body, preferring the header charset over `<meta>`.
#[must_use]
pub fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(charset_from_content_type)
        .unwrap_or_else(|| detect_encoding(body));
    decode_with(encoding, body)
}

fn decode_with(encoding: &'static Encoding, bytes: &[u8]) -> String {
    if encoding == UTF_8 {
        return String::from_utf8_lossy(bytes).into_owned();
    }
    let (decoded, _, _) = encoding.decode(bytes);
    decoded.into_owned()
}
