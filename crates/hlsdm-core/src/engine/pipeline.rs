//! Per-segment pipeline: decrypt, transcode, hand to the sink.

use bytes::{Bytes, BytesMut};

use crate::error::HlsError;
use crate::job::Job;

/// Runs one fetched segment through the job's pipeline and records the
/// result in its sink.
///
/// `HlsError::Output` means the sink could not write and the whole job
/// must stop; any other error only fails this segment.
pub(crate) fn process_segment(job: &mut Job, index: usize, data: Bytes) -> Result<(), HlsError> {
    let data = match &job.crypto {
        Some(crypto) => crypto.decrypt_segment(&data, index)?,
        None => data,
    };

    let range = job.range();
    let output = match job.transcoder.as_mut() {
        Some(transcoder) => {
            let mut out = transcoder.push(&data, index)?;
            if let Some(init) = out.init_segment.take() {
                job.init_header.get_or_insert(init);
            }
            let body = out.into_bytes(false);
            match job.init_header.as_ref() {
                Some(init) if index == range.first_index() => {
                    let mut joined = BytesMut::with_capacity(init.len() + body.len());
                    joined.extend_from_slice(init);
                    joined.extend_from_slice(&body);
                    joined.freeze()
                }
                _ => body,
            }
        }
        None => data,
    };

    job.sink.record(range.slot(index), output)?;
    Ok(())
}
