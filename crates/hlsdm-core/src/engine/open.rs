//! Turning a manifest URL into a ready-to-queue job.
//!
//! Runs on the caller's task, not inside the engine loop: manifest and key
//! fetches may take a while and must not hold up segment completions.

use serde::Serialize;

use super::Shared;
use crate::crypto::{CryptoConfig, JobCrypto};
use crate::error::{FetchError, HlsError};
use crate::fetch::Fetch;
use crate::job::{JobId, JobParts, OutputKind, OutputMode};
use crate::manifest::{self, KeyTag, Manifest, MediaPlaylist, VariantStream};
use crate::retry::RetryController;
use crate::segmenter::SegmentRange;
use crate::transcode::TranscodeParams;
use crate::url_model::{clean_manifest_url, output_file_name};

/// A request to download one manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobRequest {
    pub url: String,
    /// Job title; derived from the URL when absent.
    pub title: Option<String>,
    /// Overrides the configured output kind.
    pub kind: Option<OutputKind>,
    /// Overrides the configured output mode.
    pub mode: Option<OutputMode>,
    /// First segment, 1-based.
    pub start: Option<usize>,
    /// Last segment, 1-based, inclusive.
    pub end: Option<usize>,
}

impl JobRequest {
    pub fn new(url: impl Into<String>) -> Self {
        JobRequest {
            url: url.into(),
            ..Default::default()
        }
    }
}

/// Result of opening a manifest.
#[derive(Debug, Clone, PartialEq)]
pub enum Opened {
    /// A master manifest: pick a variant and call `select_variant`.
    Variants {
        title: String,
        variants: Vec<VariantStream>,
    },
    /// A job was created.
    Queued(JobId),
}

/// What a manifest contains, without creating a job.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Probe {
    Variants {
        variants: Vec<VariantStream>,
    },
    Media {
        segment_count: usize,
        duration_secs: f64,
        encrypted: bool,
    },
}

impl Probe {
    pub(crate) fn from_manifest(manifest: Manifest) -> Self {
        match manifest {
            Manifest::Master(variants) => Probe::Variants { variants },
            Manifest::Media(playlist) => Probe::Media {
                segment_count: playlist.segments.len(),
                duration_secs: playlist.total_duration(),
                encrypted: playlist.key.is_some(),
            },
        }
    }
}

/// Cleans `raw`, fetches it and parses the manifest. Returns the cleaned URL too.
pub(crate) async fn load_manifest(
    fetcher: &dyn Fetch,
    raw: &str,
) -> Result<(String, Manifest), HlsError> {
    let url = clean_manifest_url(raw);
    let text = fetcher
        .fetch_text(&url)
        .await
        .map_err(|source| HlsError::ManifestFetchFailed {
            url: url.clone(),
            source,
        })?;
    let manifest = manifest::parse(&text, &url)?;
    tracing::debug!(url = %url, master = matches!(manifest, Manifest::Master(_)), "manifest parsed");
    Ok((url, manifest))
}

/// Builds everything a job needs from a media manifest: range, duration,
/// transcoder and crypto (fetching the key). The engine opens the output
/// sink when the job is added.
pub(crate) async fn build_parts(
    shared: &Shared,
    req: &JobRequest,
    url: String,
    title: String,
    playlist: MediaPlaylist,
) -> Result<JobParts, HlsError> {
    if playlist.segments.is_empty() {
        return Err(HlsError::EmptyMediaSet);
    }
    let kind = req.kind.unwrap_or(shared.settings.output_kind);
    let mode = req.mode.unwrap_or(shared.settings.mode);
    let range = SegmentRange::clamp(req.start, req.end, playlist.segments.len());
    let duration = playlist.duration_in(&range);

    let transcoder = if kind.needs_transcode() {
        let factory = shared
            .transcoders
            .as_ref()
            .ok_or(HlsError::TranscoderUnavailable)?;
        Some(factory.create(TranscodeParams {
            duration_secs: duration,
        })?)
    } else {
        None
    };

    let crypto = match &playlist.key {
        Some(tag) => Some(load_crypto(shared, tag).await?),
        None => None,
    };

    let file_name = output_file_name(&title, kind);

    Ok(JobParts {
        url,
        title,
        file_name,
        kind,
        mode,
        segments: playlist.segments,
        range,
        duration,
        crypto,
        transcoder,
        retry: RetryController::new(&shared.settings.retry),
    })
}

/// Creates the decryptor, fetches the key once and expands it.
async fn load_crypto(shared: &Shared, tag: &KeyTag) -> Result<JobCrypto, HlsError> {
    let decryptor = shared.decryptors.create(&tag.method)?;
    if tag.uri.is_empty() {
        return Err(HlsError::KeyFetchFailed {
            url: String::new(),
            source: FetchError::Other("key tag has no URI".to_string()),
        });
    }
    let key = shared
        .fetcher
        .fetch(&tag.uri)
        .await
        .map_err(|source| HlsError::KeyFetchFailed {
            url: tag.uri.clone(),
            source,
        })?;
    tracing::debug!(uri = %tag.uri, len = key.len(), "key fetched");
    JobCrypto::new(CryptoConfig::from_tag(tag, key), decryptor)
}
