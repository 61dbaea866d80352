#![allow(dead_code)]

pub mod memory;
pub mod static_server;

use std::sync::Arc;

use hlsdm_core::engine::{EngineBuilder, EngineEvent, EngineHandle, EngineSettings};
use hlsdm_core::job::OutputMode;
use hlsdm_core::retry::RetryPolicy;
use tokio::sync::mpsc::UnboundedReceiver;

use memory::{MemoryFetch, MemoryTarget};

pub const BASE: &str = "http://media.test/show/";

/// Media playlist with `n` segments `seg{i}.ts`, 4 seconds each.
pub fn media_playlist(n: usize) -> String {
    media_playlist_with(n, "")
}

/// Like `media_playlist` with extra header lines (e.g. a key tag).
pub fn media_playlist_with(n: usize, header: &str) -> String {
    let mut text = String::from("#EXTM3U\n#EXT-X-VERSION:3\n#EXT-X-TARGETDURATION:4\n");
    text.push_str(header);
    for i in 0..n {
        text.push_str(&format!("#EXTINF:4.0,\nseg{}.ts\n", i));
    }
    text.push_str("#EXT-X-ENDLIST\n");
    text
}

pub fn segment_url(i: usize) -> String {
    format!("{}seg{}.ts", BASE, i)
}

pub fn segment_body(i: usize) -> Vec<u8> {
    format!("<segment {:03}>", i).into_bytes()
}

/// Concatenated bodies of segments `range`, what a finished job must produce.
pub fn expected_output(range: std::ops::Range<usize>) -> Vec<u8> {
    range.flat_map(segment_body).collect()
}

/// Serves a playlist at `{BASE}{name}` plus `n` segment bodies.
pub fn serve_playlist(fetch: &MemoryFetch, name: &str, n: usize) -> String {
    let url = format!("{}{}", BASE, name);
    fetch.insert(&url, media_playlist(n).into_bytes());
    for i in 0..n {
        fetch.insert(&segment_url(i), segment_body(i));
    }
    url
}

pub fn settings(mode: OutputMode, budget: u32) -> EngineSettings {
    EngineSettings {
        mode,
        retry: RetryPolicy {
            budget,
            ..RetryPolicy::default()
        },
        ..EngineSettings::default()
    }
}

pub fn spawn(
    fetch: &Arc<MemoryFetch>,
    target: &Arc<MemoryTarget>,
    settings: EngineSettings,
) -> (EngineHandle, UnboundedReceiver<EngineEvent>) {
    EngineBuilder::new(settings, fetch.clone(), target.clone()).spawn()
}

/// Everything emitted so far.
pub fn drain(events: &mut UnboundedReceiver<EngineEvent>) -> Vec<EngineEvent> {
    let mut out = Vec::new();
    while let Ok(e) = events.try_recv() {
        out.push(e);
    }
    out
}
