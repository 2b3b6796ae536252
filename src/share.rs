//! Dashboard links carrying a blob in their query string.

use crate::constants::DATA_PARAM;
use crate::error::DecodeError;

/// Append the blob to `origin` as the `data` query parameter
///
/// # Example
/// ```
/// use trendlog::share_url;
///
/// assert_eq!(share_url("https://example.org/dash", "AAE"), "https://example.org/dash?data=AAE");
/// assert_eq!(share_url("https://example.org/dash?u=1", "AAE"), "https://example.org/dash?u=1&data=AAE");
/// ```
#[must_use]
pub fn share_url(origin: &str, blob: &str) -> String {
    let sep = if origin.contains('?') { '&' } else { '?' };
    format!("{origin}{sep}{DATA_PARAM}={blob}")
}

/// Extract the blob from a dashboard link.
///
/// Text without a query string is taken to be the blob itself.
///
/// # Errors
/// Returns [`DecodeError::MissingParameter`] if the link has a query string
/// without a `data` parameter.
pub fn blob_from_url(url: &str) -> Result<String, DecodeError> {
    let url = url.trim();
    let Some((_, query)) = url.split_once('?') else {
        return Ok(url.to_owned());
    };
    let query = query.split('#').next().unwrap_or_default();
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == DATA_PARAM)
        .map(|(_, value)| percent_decode(value))
        .ok_or(DecodeError::MissingParameter { param: DATA_PARAM })
}

/// Decode `%XX` escapes; malformed escapes are kept as written
fn percent_decode(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes
                .get(i + 1..i + 3)
                .and_then(|h| std::str::from_utf8(h).ok())
                .and_then(|h| u8::from_str_radix(h, 16).ok());
            if let Some(b) = hex {
                out.push(b);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
