//! Media manifest: segment list, durations and the encryption key tag.

use serde::Serialize;

use super::attr::tag_attributes;
use crate::error::HlsError;
use crate::segmenter::SegmentRange;
use crate::url_model::resolve_url;

const EXTINF: &str = "#EXTINF";
const KEY: &str = "#EXT-X-KEY";

/// One segment line of a media manifest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaSegment {
    /// The line as written in the manifest.
    pub label: String,
    /// Resolved fetch URL.
    pub url: String,
}

/// Encryption parameters from the first `#EXT-X-KEY` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyTag {
    /// METHOD attribute ("" when absent).
    pub method: String,
    /// Key URI, resolved against the manifest URL ("" when absent).
    pub uri: String,
    /// Static IV; `None` means derive one per segment.
    pub iv: Option<[u8; 16]>,
}

/// A parsed media manifest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaPlaylist {
    pub segments: Vec<MediaSegment>,
    /// `#EXTINF` durations in manifest order.
    pub durations: Vec<f64>,
    pub key: Option<KeyTag>,
}

impl MediaPlaylist {
    /// Sum of `#EXTINF` durations whose ordinal falls inside `range`.
    pub fn duration_in(&self, range: &SegmentRange) -> f64 {
        self.durations
            .iter()
            .enumerate()
            .filter(|(i, _)| range.contains_index(*i))
            .map(|(_, d)| *d)
            .sum()
    }

    /// Sum of every `#EXTINF` duration.
    pub fn total_duration(&self) -> f64 {
        self.durations.iter().sum()
    }
}

pub(crate) fn parse_media(text: &str, base_url: &str) -> Result<MediaPlaylist, HlsError> {
    let mut segments = Vec::new();
    let mut durations = Vec::new();
    let mut key: Option<Option<KeyTag>> = None;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if !line.starts_with('#') {
            segments.push(MediaSegment {
                label: line.to_string(),
                url: resolve_url(line, base_url),
            });
            continue;
        }
        if let Some(rest) = strip_tag(line, EXTINF) {
            durations.push(parse_duration(rest));
            continue;
        }
        if key.is_none() {
            if let Some(attrs) = tag_attributes(line, KEY) {
                key = Some(key_from_attributes(&attrs, base_url)?);
            }
        }
    }

    let key = key.flatten();
    if segments.is_empty() && key.is_none() {
        return Err(HlsError::EmptyMediaSet);
    }
    Ok(MediaPlaylist {
        segments,
        durations,
        key,
    })
}

fn strip_tag<'a>(line: &'a str, tag: &str) -> Option<&'a str> {
    let head = line.get(..tag.len())?;
    if head.eq_ignore_ascii_case(tag) {
        line[tag.len()..].strip_prefix(':')
    } else {
        None
    }
}

/// `#EXTINF:<duration>,[title]`; unparseable durations count as 0.
fn parse_duration(rest: &str) -> f64 {
    rest.split(',')
        .next()
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .unwrap_or(0.0)
}

/// `None` for `METHOD=NONE`.
fn key_from_attributes(
    attrs: &std::collections::HashMap<String, String>,
    base_url: &str,
) -> Result<Option<KeyTag>, HlsError> {
    let method = attrs.get("METHOD").cloned().unwrap_or_default();
    if method.eq_ignore_ascii_case("NONE") {
        return Ok(None);
    }
    let uri = attrs
        .get("URI")
        .filter(|u| !u.is_empty())
        .map(|u| resolve_url(u, base_url))
        .unwrap_or_default();
    let iv = match attrs.get("IV").filter(|v| !v.is_empty()) {
        Some(raw) => Some(parse_iv(raw)?),
        None => None,
    };
    Ok(Some(KeyTag { method, uri, iv }))
}

/// Hex IV with optional `0x` prefix, left-padded to 16 bytes.
fn parse_iv(raw: &str) -> Result<[u8; 16], HlsError> {
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);
    let padded = if digits.len() % 2 == 1 {
        format!("0{}", digits)
    } else {
        digits.to_string()
    };
    let bytes = hex::decode(&padded)
        .map_err(|e| HlsError::InvalidManifest(format!("invalid IV {:?}: {}", raw, e)))?;
    if bytes.len() > 16 {
        return Err(HlsError::InvalidManifest(format!(
            "invalid IV {:?}: longer than 16 bytes",
            raw
        )));
    }
    let mut iv = [0u8; 16];
    iv[16 - bytes.len()..].copy_from_slice(&bytes);
    Ok(iv)
}
