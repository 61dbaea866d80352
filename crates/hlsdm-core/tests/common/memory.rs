//! In-memory fetch and output capabilities for engine tests.

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use hlsdm_core::error::FetchError;
use hlsdm_core::fetch::Fetch;
use hlsdm_core::storage::{OutputArtifact, OutputTarget, StreamWriter};

/// Serves bodies from a map with per-URL latency and scripted failures.
/// Tracks hits and the peak number of concurrent fetches.
#[derive(Default)]
pub struct MemoryFetch {
    bodies: Mutex<HashMap<String, Bytes>>,
    /// Remaining failures per URL; `usize::MAX` fails forever.
    failures: Mutex<HashMap<String, usize>>,
    delays: Mutex<HashMap<String, Duration>>,
    default_delay: Mutex<Duration>,
    hits: Mutex<HashMap<String, usize>>,
    active: Arc<AtomicUsize>,
    peak: AtomicUsize,
}

struct ActiveGuard(Arc<AtomicUsize>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MemoryFetch {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            default_delay: Mutex::new(Duration::from_millis(10)),
            ..Default::default()
        })
    }

    pub fn insert(&self, url: &str, body: impl Into<Bytes>) {
        self.bodies
            .lock()
            .unwrap()
            .insert(url.to_string(), body.into());
    }

    pub fn fail(&self, url: &str, times: usize) {
        self.failures
            .lock()
            .unwrap()
            .insert(url.to_string(), times);
    }

    pub fn fail_forever(&self, url: &str) {
        self.fail(url, usize::MAX);
    }

    pub fn heal(&self, url: &str) {
        self.failures.lock().unwrap().remove(url);
    }

    pub fn delay(&self, url: &str, d: Duration) {
        self.delays.lock().unwrap().insert(url.to_string(), d);
    }

    pub fn set_default_delay(&self, d: Duration) {
        *self.default_delay.lock().unwrap() = d;
    }

    pub fn hits(&self, url: &str) -> usize {
        self.hits.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetch for MemoryFetch {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        *self.hits.lock().unwrap().entry(url.to_string()).or_default() += 1;
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        let _guard = ActiveGuard(Arc::clone(&self.active));

        let delay = self
            .delays
            .lock()
            .unwrap()
            .get(url)
            .copied()
            .unwrap_or(*self.default_delay.lock().unwrap());
        tokio::time::sleep(delay).await;

        {
            let mut failures = self.failures.lock().unwrap();
            if let Some(left) = failures.get_mut(url) {
                if *left > 0 {
                    if *left != usize::MAX {
                        *left -= 1;
                    }
                    return Err(FetchError::Http(500));
                }
            }
        }
        self.bodies
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or(FetchError::Http(404))
    }
}

/// Collects delivered artifacts and streamed files in memory.
#[derive(Default)]
pub struct MemoryTarget {
    pub delivered: Mutex<Vec<OutputArtifact>>,
    streams: Mutex<HashMap<String, Arc<Mutex<StreamState>>>>,
    /// Streams not yet opened whose nth write (1-based) fails once.
    write_failures: Mutex<HashMap<String, usize>>,
}

#[derive(Default)]
struct StreamState {
    bytes: Vec<u8>,
    closed: bool,
    writes: usize,
    fail_write: Option<usize>,
}

struct MemoryStream(Arc<Mutex<StreamState>>);

impl StreamWriter for MemoryStream {
    fn write_chunk(&mut self, data: &[u8]) -> io::Result<()> {
        let mut state = self.0.lock().unwrap();
        state.writes += 1;
        if state.fail_write == Some(state.writes) {
            state.fail_write = None;
            return Err(io::Error::new(io::ErrorKind::Other, "no space left on device"));
        }
        state.bytes.extend_from_slice(data);
        Ok(())
    }

    fn close(self: Box<Self>) -> io::Result<()> {
        self.0.lock().unwrap().closed = true;
        Ok(())
    }
}

impl MemoryTarget {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn delivered(&self) -> Vec<OutputArtifact> {
        self.delivered.lock().unwrap().clone()
    }

    pub fn delivered_bytes(&self, file_name: &str) -> Option<Vec<u8>> {
        self.delivered
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|a| a.file_name == file_name)
            .map(|a| a.bytes.to_vec())
    }

    /// Makes the `nth` write (1-based, failed attempts included) to the
    /// stream `file_name` fail once. Must be set before the stream opens.
    pub fn fail_write(&self, file_name: &str, nth: usize) {
        self.write_failures
            .lock()
            .unwrap()
            .insert(file_name.to_string(), nth);
    }

    /// Bytes written to a stream and whether it was closed.
    pub fn stream(&self, file_name: &str) -> Option<(Vec<u8>, bool)> {
        let streams = self.streams.lock().unwrap();
        let state = streams.get(file_name)?.lock().unwrap();
        Some((state.bytes.clone(), state.closed))
    }
}

impl OutputTarget for MemoryTarget {
    fn open_stream(&self, file_name: &str) -> io::Result<Box<dyn StreamWriter>> {
        let state = Arc::new(Mutex::new(StreamState {
            fail_write: self.write_failures.lock().unwrap().remove(file_name),
            ..StreamState::default()
        }));
        self.streams
            .lock()
            .unwrap()
            .insert(file_name.to_string(), Arc::clone(&state));
        Ok(Box::new(MemoryStream(state)))
    }

    fn deliver(&self, artifact: &OutputArtifact) -> io::Result<()> {
        self.delivered.lock().unwrap().push(artifact.clone());
        Ok(())
    }

    fn exists(&self, file_name: &str) -> bool {
        self.streams.lock().unwrap().contains_key(file_name)
            || self
                .delivered
                .lock()
                .unwrap()
                .iter()
                .any(|a| a.file_name == file_name)
    }
}
