//! Manifest parsing.
//!
//! Recognizes master manifests (variant streams) versus media manifests
//! (flat segment lists with optional encryption), resolving every URI
//! against the manifest URL.

mod attr;
mod master;
mod media;

pub use master::VariantStream;
pub use media::{KeyTag, MediaPlaylist, MediaSegment};

use crate::error::HlsError;

const MAGIC: &str = "#EXTM3U";

/// Result of parsing one manifest.
#[derive(Debug, Clone, PartialEq)]
pub enum Manifest {
    /// Variant list, highest bandwidth first. The caller must pick one and
    /// parse that variant's manifest.
    Master(Vec<VariantStream>),
    Media(MediaPlaylist),
}

/// Parses manifest `text` fetched from `base_url`.
///
/// Fails with `InvalidManifest` without the `#EXTM3U` header,
/// `EmptyVariantSet` for a master manifest with no usable variants, and
/// `EmptyMediaSet` for a media manifest with no segments and no key.
pub fn parse(text: &str, base_url: &str) -> Result<Manifest, HlsError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let head = text.get(..MAGIC.len()).unwrap_or(text);
    if !head.eq_ignore_ascii_case(MAGIC) {
        return Err(HlsError::InvalidManifest(
            "missing #EXTM3U header".to_string(),
        ));
    }

    if is_master(text) {
        master::parse_variants(text, base_url).map(Manifest::Master)
    } else {
        media::parse_media(text, base_url).map(Manifest::Media)
    }
}

fn is_master(text: &str) -> bool {
    text.to_ascii_uppercase().contains(master::STREAM_INF)
}
