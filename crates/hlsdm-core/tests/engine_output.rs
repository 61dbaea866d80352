//! Output integrity: write failures and file name collisions.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::memory::{MemoryFetch, MemoryTarget};
use hlsdm_core::engine::{EngineBuilder, EngineEvent, JobRequest};
use hlsdm_core::job::{JobStatus, OutputMode};
use hlsdm_core::storage::DirectoryTarget;

fn titled(url: &str, title: &str) -> JobRequest {
    JobRequest {
        title: Some(title.into()),
        ..JobRequest::new(url)
    }
}

#[tokio::test(start_paused = true)]
async fn failed_stream_write_resumes_without_losing_segments() {
    let fetch = MemoryFetch::new();
    let target = MemoryTarget::new();
    let url = common::serve_playlist(&fetch, "index.m3u8", 3);
    // Completion order 0, 2, 1: segment 2 waits parked until 1 is written.
    fetch.delay(&common::segment_url(0), Duration::from_millis(10));
    fetch.delay(&common::segment_url(1), Duration::from_millis(30));
    fetch.delay(&common::segment_url(2), Duration::from_millis(20));
    target.fail_write("stream.ts", 3);
    let (engine, mut events) = common::spawn(&fetch, &target, common::settings(OutputMode::Streaming, 3));

    engine.open(titled(&url, "stream")).await.unwrap();
    engine.wait_idle().await.unwrap();

    let failed = common::drain(&mut events)
        .into_iter()
        .any(|e| matches!(e, EngineEvent::JobFailed { job: 1, .. }));
    assert!(failed);
    let job = engine.jobs().await.unwrap().remove(0);
    assert_eq!(job.status, JobStatus::Pause);
    let (bytes, closed) = target.stream("stream.ts").unwrap();
    assert!(!closed);
    assert_eq!(bytes, common::expected_output(0..2));

    engine.resume(1).await.unwrap();
    engine.wait_idle().await.unwrap();

    let job = engine.jobs().await.unwrap().remove(0);
    assert_eq!(job.status, JobStatus::Done);
    let (bytes, closed) = target.stream("stream.ts").unwrap();
    assert!(closed);
    assert_eq!(bytes, common::expected_output(0..3));
    for i in 0..3 {
        assert_eq!(fetch.hits(&common::segment_url(i)), 1);
    }
}

#[tokio::test(start_paused = true)]
async fn same_title_streams_to_separate_files() {
    let fetch = MemoryFetch::new();
    let target = MemoryTarget::new();
    let url = common::serve_playlist(&fetch, "index.m3u8", 4);
    let (engine, mut events) = common::spawn(&fetch, &target, common::settings(OutputMode::Streaming, 3));

    engine.open(titled(&url, "same")).await.unwrap();
    engine.open(titled(&url, "same")).await.unwrap();
    engine.wait_idle().await.unwrap();

    let names: Vec<String> = engine
        .jobs()
        .await
        .unwrap()
        .into_iter()
        .map(|j| {
            assert_eq!(j.status, JobStatus::Done);
            j.file_name
        })
        .collect();
    assert_eq!(names, vec!["same.ts", "same (1).ts"]);
    for name in &names {
        let (bytes, closed) = target.stream(name).unwrap();
        assert!(closed);
        assert_eq!(bytes, common::expected_output(0..4));
    }
    assert!(!common::drain(&mut events)
        .iter()
        .any(|e| matches!(e, EngineEvent::JobFailed { .. })));
}

#[tokio::test(start_paused = true)]
async fn existing_file_is_never_overwritten() {
    let fetch = MemoryFetch::new();
    let url = common::serve_playlist(&fetch, "index.m3u8", 2);
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("keep.ts"), b"old").unwrap();
    let (engine, _events) = EngineBuilder::new(
        common::settings(OutputMode::Buffered, 3),
        fetch.clone(),
        Arc::new(DirectoryTarget::new(dir.path())),
    )
    .spawn();

    engine.open(titled(&url, "keep")).await.unwrap();
    engine.wait_idle().await.unwrap();

    assert_eq!(std::fs::read(dir.path().join("keep.ts")).unwrap(), b"old");
    assert_eq!(
        std::fs::read(dir.path().join("keep (1).ts")).unwrap(),
        common::expected_output(0..2)
    );
}
