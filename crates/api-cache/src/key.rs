//! Canonical cache key generation.

use std::fmt::Write;

/// Build the canonical cache key for a URL and query parameters.
///
/// Parameters are sorted by name (then value) and `&`-joined, so parameter
/// order never produces a cache miss. Names and values are percent-encoded.
pub fn cache_key(url: &str, params: &[(String, String)]) -> String {
    if params.is_empty() {
        return url.to_string();
    }

    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    let mut key = String::with_capacity(url.len() + 16 * sorted.len());
    key.push_str(url);
    for (i, (name, value)) in sorted.iter().enumerate() {
        key.push(if i == 0 { '?' } else { '&' });
        let _ = write!(
            key,
            "{}={}",
            urlencoding::encode(name),
            urlencoding::encode(value)
        );
    }
    key
}
