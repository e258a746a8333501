//! Slash normalisation for composed public URLs and object keys.

use regex::Regex;
use std::sync::LazyLock;

static SCHEME_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://").expect("valid scheme regex"));

static REPEATED_SLASHES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/{2,}").expect("valid slash regex"));

/// Collapses every run of adjacent `/` into a single one.
///
/// The `//` that directly follows a leading scheme token (`https://`, `s3://`, ...) is kept
/// as-is. Never fails and is idempotent.
pub fn normalize(url: &str) -> String {
    let (scheme, rest) = match SCHEME_PREFIX.find(url) {
        Some(m) => url.split_at(m.end()),
        None => ("", url),
    };
    let collapsed = REPEATED_SLASHES.replace_all(rest, "/");
    format!("{scheme}{collapsed}")
}
