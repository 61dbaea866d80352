//! Master manifest: variant streams.

use serde::Serialize;

use super::attr::tag_attributes;
use crate::error::HlsError;
use crate::url_model::resolve_url;

pub(crate) const STREAM_INF: &str = "#EXT-X-STREAM-INF";

/// One entry of a master manifest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantStream {
    /// Media manifest URL, resolved against the master manifest URL.
    pub url: String,
    /// Peak bandwidth in bits per second (0 when absent).
    pub bandwidth: u64,
    /// `WxH`, or "Unknown".
    pub resolution: String,
    /// Display name: the NAME attribute, else resolution plus kbps.
    pub name: String,
}

/// Parses every `#EXT-X-STREAM-INF` entry and the URI line that follows it.
/// The result is sorted by bandwidth, highest first.
pub(crate) fn parse_variants(text: &str, base_url: &str) -> Result<Vec<VariantStream>, HlsError> {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    let mut streams = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        let Some(attrs) = tag_attributes(lines[i], STREAM_INF) else {
            i += 1;
            continue;
        };
        let uri = lines.get(i + 1).copied().unwrap_or("");
        if uri.is_empty() || uri.starts_with('#') {
            i += 1;
            continue;
        }

        let bandwidth = attrs
            .get("BANDWIDTH")
            .and_then(|b| b.parse::<u64>().ok())
            .unwrap_or(0);
        let raw_resolution = attrs.get("RESOLUTION").cloned().unwrap_or_default();
        let name = attrs
            .get("NAME")
            .filter(|n| !n.is_empty())
            .cloned()
            .unwrap_or_else(|| synthesize_name(&raw_resolution, bandwidth));
        let resolution = if raw_resolution.is_empty() {
            "Unknown".to_string()
        } else {
            raw_resolution
        };

        streams.push(VariantStream {
            url: resolve_url(uri, base_url),
            bandwidth,
            resolution,
            name,
        });
        i += 2;
    }

    if streams.is_empty() {
        return Err(HlsError::EmptyVariantSet);
    }
    streams.sort_by(|a, b| b.bandwidth.cmp(&a.bandwidth));
    Ok(streams)
}

fn synthesize_name(resolution: &str, bandwidth: u64) -> String {
    let rate = if bandwidth > 0 {
        format!("{}kbps", bandwidth as f64 / 1000.0)
    } else {
        "Unknown".to_string()
    };
    format!("{} {}", resolution, rate).trim().to_string()
}
