//! Segment, key and variant URI resolution against the manifest URL.

use url::Url;

/// Resolves `candidate` against `base`.
///
/// - Absolute `http`/`https` URLs are kept, except that `http://` is
///   upgraded to `https://` when `base` itself is served over https.
/// - Root-relative paths (`/a/b.ts`) take the scheme and host of `base`.
/// - Anything else is relative to the directory of `base`.
///
/// If `base` cannot be parsed the trimmed candidate is returned unchanged.
pub fn resolve_url(candidate: &str, base: &str) -> String {
    let candidate = candidate.trim();
    let base_url = Url::parse(base.trim()).ok();
    let secure_base = base_url
        .as_ref()
        .map(|b| b.scheme() == "https")
        .unwrap_or(false);

    if let Ok(absolute) = Url::parse(candidate) {
        return match absolute.scheme() {
            "http" if secure_base => upgrade_to_https(absolute),
            _ => absolute.to_string(),
        };
    }

    match base_url.and_then(|b| b.join(candidate).ok()) {
        Some(joined) => joined.to_string(),
        None => candidate.to_string(),
    }
}

fn upgrade_to_https(mut url: Url) -> String {
    if url.set_scheme("https").is_err() {
        return url.to_string();
    }
    if url.port() == Some(80) {
        let _ = url.set_port(None);
    }
    url.to_string()
}
