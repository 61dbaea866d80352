//! Ordered accumulation of segment output, streaming or buffered.

use std::collections::BTreeMap;
use std::io;

use bytes::{Bytes, BytesMut};

use super::target::StreamWriter;

/// Collects per-segment output by slot (position inside the job's range).
///
/// Streaming mode writes every index-contiguous prefix as soon as it is
/// available and keeps only out-of-order slots in memory. Buffered mode
/// keeps every slot until the whole range is present. Both produce the
/// same bytes for the same inputs, whatever the completion order.
pub enum OutputSink {
    Streaming {
        writer: Option<Box<dyn StreamWriter>>,
        /// Completed slots waiting for the cursor to reach them.
        parked: BTreeMap<usize, Bytes>,
        /// Next slot to write.
        cursor: usize,
        target: usize,
    },
    Buffered { slots: Vec<Option<Bytes>> },
}

impl OutputSink {
    pub fn streaming(writer: Box<dyn StreamWriter>, target: usize) -> Self {
        OutputSink::Streaming {
            writer: Some(writer),
            parked: BTreeMap::new(),
            cursor: 0,
            target,
        }
    }

    pub fn buffered(target: usize) -> Self {
        OutputSink::Buffered {
            slots: vec![None; target],
        }
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self, OutputSink::Streaming { .. })
    }

    /// Records the output for `slot`. Duplicate or out-of-range slots are ignored.
    pub fn record(&mut self, slot: usize, data: Bytes) -> io::Result<()> {
        match self {
            OutputSink::Streaming {
                writer,
                parked,
                cursor,
                target,
            } => {
                if slot < *cursor || slot >= *target || parked.contains_key(&slot) {
                    return Ok(());
                }
                parked.insert(slot, data);
                drain(writer, parked, cursor)
            }
            OutputSink::Buffered { slots } => {
                if let Some(s) = slots.get_mut(slot) {
                    if s.is_none() {
                        *s = Some(data);
                    }
                }
                Ok(())
            }
        }
    }

    /// Retries writing parked slots after an earlier write failure.
    pub fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputSink::Streaming {
                writer,
                parked,
                cursor,
                ..
            } => drain(writer, parked, cursor),
            OutputSink::Buffered { .. } => Ok(()),
        }
    }

    /// Number of slots written (streaming) or held (buffered).
    pub fn written(&self) -> usize {
        match self {
            OutputSink::Streaming { cursor, .. } => *cursor,
            OutputSink::Buffered { slots } => slots.iter().filter(|s| s.is_some()).count(),
        }
    }

    /// True once every slot of the range has been written or held.
    pub fn is_complete(&self) -> bool {
        match self {
            OutputSink::Streaming { cursor, target, .. } => cursor == target,
            OutputSink::Buffered { slots } => slots.iter().all(Option::is_some),
        }
    }

    /// Concatenation of the held slots, in order (buffered mode only).
    pub fn assemble(&self) -> Option<Bytes> {
        let OutputSink::Buffered { slots } = self else {
            return None;
        };
        let held = slots.iter().flatten();
        let len = held.clone().map(Bytes::len).sum();
        let mut out = BytesMut::with_capacity(len);
        for s in held {
            out.extend_from_slice(s);
        }
        Some(out.freeze())
    }

    /// Closes the stream writer, if any. Later records are still accepted
    /// but no longer written.
    pub fn close(&mut self) -> io::Result<()> {
        match self {
            OutputSink::Streaming { writer, .. } => match writer.take() {
                Some(w) => w.close(),
                None => Ok(()),
            },
            OutputSink::Buffered { .. } => Ok(()),
        }
    }
}

/// Writes the contiguous run of parked slots starting at `cursor`. A slot
/// leaves `parked` only once its write succeeded.
fn drain(
    writer: &mut Option<Box<dyn StreamWriter>>,
    parked: &mut BTreeMap<usize, Bytes>,
    cursor: &mut usize,
) -> io::Result<()> {
    let Some(w) = writer.as_mut() else {
        return Ok(());
    };
    while let Some(chunk) = parked.get(&*cursor) {
        w.write_chunk(chunk)?;
        parked.remove(&*cursor);
        *cursor += 1;
    }
    Ok(())
}

impl std::fmt::Debug for OutputSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputSink::Streaming {
                writer,
                parked,
                cursor,
                target,
            } => f
                .debug_struct("Streaming")
                .field("open", &writer.is_some())
                .field("parked", &parked.len())
                .field("cursor", cursor)
                .field("target", target)
                .finish(),
            OutputSink::Buffered { slots } => f
                .debug_struct("Buffered")
                .field("held", &slots.iter().filter(|s| s.is_some()).count())
                .field("target", &slots.len())
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Shared {
        bytes: Arc<Mutex<Vec<u8>>>,
        closed: Arc<Mutex<bool>>,
        /// Fails the next write once when set.
        fail_next: Arc<Mutex<bool>>,
    }

    impl StreamWriter for Shared {
        fn write_chunk(&mut self, data: &[u8]) -> io::Result<()> {
            if std::mem::take(&mut *self.fail_next.lock().unwrap()) {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
            }
            self.bytes.lock().unwrap().extend_from_slice(data);
            Ok(())
        }

        fn close(self: Box<Self>) -> io::Result<()> {
            *self.closed.lock().unwrap() = true;
            Ok(())
        }
    }

    fn chunk(s: &'static str) -> Bytes {
        Bytes::from_static(s.as_bytes())
    }

    #[test]
    fn streaming_writes_only_contiguous_prefix() {
        let shared = Shared::default();
        let mut sink = OutputSink::streaming(Box::new(shared.clone()), 3);
        sink.record(1, chunk("b")).unwrap();
        assert!(shared.bytes.lock().unwrap().is_empty());
        sink.record(0, chunk("a")).unwrap();
        assert_eq!(&shared.bytes.lock().unwrap()[..], b"ab");
        assert!(!sink.is_complete());
        sink.record(2, chunk("c")).unwrap();
        assert!(sink.is_complete());
        sink.close().unwrap();
        assert!(*shared.closed.lock().unwrap());
    }

    #[test]
    fn streaming_matches_buffered_for_any_order() {
        let parts = ["s0", "s1", "s2", "s3", "s4"];
        let orders: [[usize; 5]; 3] = [[0, 1, 2, 3, 4], [4, 3, 2, 1, 0], [2, 0, 4, 1, 3]];
        for order in orders {
            let shared = Shared::default();
            let mut streaming = OutputSink::streaming(Box::new(shared.clone()), 5);
            let mut buffered = OutputSink::buffered(5);
            for &i in &order {
                streaming.record(i, chunk(parts[i])).unwrap();
                buffered.record(i, chunk(parts[i])).unwrap();
            }
            assert!(streaming.is_complete() && buffered.is_complete());
            assert_eq!(
                &shared.bytes.lock().unwrap()[..],
                &buffered.assemble().unwrap()[..]
            );
        }
    }

    #[test]
    fn failed_write_keeps_chunk_for_flush() {
        let shared = Shared::default();
        let mut sink = OutputSink::streaming(Box::new(shared.clone()), 3);
        sink.record(0, chunk("a")).unwrap();
        sink.record(2, chunk("c")).unwrap();
        *shared.fail_next.lock().unwrap() = true;
        assert!(sink.record(1, chunk("b")).is_err());
        assert_eq!(sink.written(), 1);
        assert!(!sink.is_complete());

        sink.flush().unwrap();
        assert!(sink.is_complete());
        assert_eq!(&shared.bytes.lock().unwrap()[..], b"abc");
    }

    #[test]
    fn duplicates_are_ignored() {
        let mut sink = OutputSink::buffered(2);
        sink.record(0, chunk("a")).unwrap();
        sink.record(0, chunk("z")).unwrap();
        sink.record(5, chunk("q")).unwrap();
        assert_eq!(sink.written(), 1);
        assert_eq!(&sink.assemble().unwrap()[..], b"a");
    }

    #[test]
    fn partial_assembly_skips_holes() {
        let mut sink = OutputSink::buffered(3);
        sink.record(0, chunk("a")).unwrap();
        sink.record(2, chunk("c")).unwrap();
        assert!(!sink.is_complete());
        assert_eq!(&sink.assemble().unwrap()[..], b"ac");
    }

    #[test]
    fn streaming_has_no_assembly() {
        let mut sink = OutputSink::streaming(Box::new(Shared::default()), 1);
        sink.record(0, chunk("a")).unwrap();
        assert!(sink.assemble().is_none());
    }
}
