//! URL modeling: manifest URL clean-up, URI resolution, titles and file names.

mod resolve;
mod sanitize;

pub use resolve::resolve_url;
pub use sanitize::sanitize_file_stem;

use url::Url;

use crate::job::OutputKind;

/// Query parameter that lists other query parameters to strip.
const IGNORE_PARAM: &str = "_ignore";

/// Stem used when a title sanitizes to nothing.
const DEFAULT_STEM: &str = "download";

/// Removes `_ignore` and every parameter it lists from the manifest URL.
///
/// `https://h/a.m3u8?_ignore=t,sig&t=1&sig=2&q=3` → `https://h/a.m3u8?q=3`.
/// URLs without `_ignore` (or that do not parse) are returned trimmed but
/// otherwise untouched.
pub fn clean_manifest_url(raw: &str) -> String {
    let raw = raw.trim();
    let Ok(mut url) = Url::parse(raw) else {
        return raw.to_string();
    };
    let Some(ignored) = url
        .query_pairs()
        .find(|(k, _)| k == IGNORE_PARAM)
        .map(|(_, v)| v.into_owned())
    else {
        return raw.to_string();
    };

    let dropped: Vec<&str> = ignored
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != IGNORE_PARAM && !dropped.iter().any(|d| k == d))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }
    url.to_string()
}

/// Default title for a job: the URL's `title` query parameter, else the
/// current local time as `YYYY_MM_DD hh_mm_ss`.
pub fn derive_title(manifest_url: &str) -> String {
    Url::parse(manifest_url.trim())
        .ok()
        .and_then(|u| {
            u.query_pairs()
                .find(|(k, _)| k == "title")
                .map(|(_, v)| v.trim().to_string())
        })
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| chrono::Local::now().format("%Y_%m_%d %H_%M_%S").to_string())
}

/// Output artifact name: `{title}.mp4` for container output, `{title}.ts` otherwise.
pub fn output_file_name(title: &str, kind: OutputKind) -> String {
    let stem = sanitize_file_stem(title);
    let stem = if stem.is_empty() { DEFAULT_STEM } else { stem.as_str() };
    format!("{}.{}", stem, kind.extension())
}

/// `clip.ts` with `n = 2` → `clip (2).ts`. Names without an extension get
/// the suffix at the end.
pub fn numbered_file_name(file_name: &str, n: usize) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{} ({}).{}", stem, n, ext),
        _ => format!("{} ({})", file_name, n),
    }
}
