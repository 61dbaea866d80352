//! Container transcoding capability (MPEG-TS in, fragmented MP4 out).
//!
//! The core does not ship a transmuxer. Callers that want `.mp4` output
//! install a [`TranscoderFactory`]; one [`Transcoder`] is created per job so
//! timestamps stay continuous across segments.

use bytes::{Bytes, BytesMut};

use crate::error::HlsError;

/// Parameters a job passes when creating its transcoder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TranscodeParams {
    /// Sum of `#EXTINF` durations inside the job's range, in seconds.
    pub duration_secs: f64,
}

/// Output of one `push`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscodeOutput {
    /// Container header (e.g. `ftyp`+`moov`) emitted before the first fragment.
    pub init_segment: Option<Bytes>,
    /// Media fragments, in order. May be empty.
    pub buffers: Vec<Bytes>,
}

impl TranscodeOutput {
    /// Concatenates the buffers, prefixed with the init segment when
    /// `with_init` is set and one was produced.
    pub fn into_bytes(self, with_init: bool) -> Bytes {
        let init = self.init_segment.filter(|_| with_init);
        let len = init.as_ref().map_or(0, Bytes::len)
            + self.buffers.iter().map(Bytes::len).sum::<usize>();
        let mut out = BytesMut::with_capacity(len);
        if let Some(init) = init {
            out.extend_from_slice(&init);
        }
        for b in &self.buffers {
            out.extend_from_slice(b);
        }
        out.freeze()
    }
}

/// A stateful per-job transcoder.
pub trait Transcoder: Send {
    /// Feeds one (decrypted) segment at zero-based `ordinal`.
    fn push(&mut self, data: &[u8], ordinal: usize) -> Result<TranscodeOutput, HlsError>;
}

/// Creates one [`Transcoder`] per job.
pub trait TranscoderFactory: Send + Sync {
    fn create(&self, params: TranscodeParams) -> Result<Box<dyn Transcoder>, HlsError>;
}
