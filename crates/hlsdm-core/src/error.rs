//! Error taxonomy for manifest parsing, job creation and job control.
//!
//! Per-segment failures never surface through `HlsError` directly: they are
//! absorbed into the job's counters and only escalate as
//! `RetryBudgetExhausted` once every segment in the range is terminal.

use crate::job::JobId;

/// Errors returned by the core API.
#[derive(Debug, thiserror::Error)]
pub enum HlsError {
    /// Manifest text does not start with `#EXTM3U`.
    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    /// Master manifest with no usable `#EXT-X-STREAM-INF` entries.
    #[error("master manifest lists no variant streams")]
    EmptyVariantSet,

    /// Media manifest with no segment URLs.
    #[error("media manifest lists no segments")]
    EmptyMediaSet,

    /// The manifest itself could not be fetched.
    #[error("failed to fetch manifest {url}: {source}")]
    ManifestFetchFailed {
        url: String,
        #[source]
        source: FetchError,
    },

    /// The decryption key could not be fetched; the job never starts.
    #[error("failed to fetch decryption key {url}: {source}")]
    KeyFetchFailed {
        url: String,
        #[source]
        source: FetchError,
    },

    /// A single segment fetch failed. Reported per segment, never fatal.
    #[error("segment {index} failed: {source}")]
    SegmentFetchFailed {
        index: usize,
        #[source]
        source: FetchError,
    },

    /// Every segment is terminal, some failed, and no automatic retries remain.
    #[error("job {0} paused: retry budget exhausted")]
    RetryBudgetExhausted(JobId),

    #[error("unsupported encryption method: {0}")]
    UnsupportedEncryption(String),

    #[error("invalid key material: {0}")]
    InvalidKey(String),

    #[error("decryption failed: {0}")]
    Decrypt(String),

    #[error("transcode failed: {0}")]
    Transcode(String),

    /// Container output was requested but no transcoder factory is installed.
    #[error("container output requires a transcoder, none is configured")]
    TranscoderUnavailable,

    #[error("job {0} not found")]
    JobNotFound(JobId),

    /// Manual retry targeted a segment that is not in the `error` state.
    #[error("segment {index} of job {job} is not in the error state")]
    SegmentNotFailed { job: JobId, index: usize },

    /// Manual retry refused while a different job is downloading.
    #[error("job {0} is downloading; retry is not possible now")]
    OtherJobDownloading(JobId),

    #[error("job {0} has no downloaded segments")]
    NothingDownloaded(JobId),

    #[error("output: {0}")]
    Output(#[from] std::io::Error),

    /// The engine loop has shut down and no longer accepts commands.
    #[error("engine stopped")]
    EngineStopped,
}

/// Failure reported by the fetch capability.
///
/// The core treats every variant the same way; the split only exists so
/// logs can tell HTTP status failures from transport failures.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u16),

    #[error(transparent)]
    Request(#[from] reqwest::Error),

    #[error("{0}")]
    Other(String),
}
