//! Worker pool: concurrency cap, ordering, and output modes.

mod common;

use std::time::Duration;

use common::memory::{MemoryFetch, MemoryTarget};
use hlsdm_core::engine::{EngineEvent, JobRequest, Opened};
use hlsdm_core::job::{JobStatus, OutputMode};

#[tokio::test(start_paused = true)]
async fn pool_never_exceeds_six_fetches() {
    let fetch = MemoryFetch::new();
    let target = MemoryTarget::new();
    let url = common::serve_playlist(&fetch, "index.m3u8", 20);
    let (engine, _events) = common::spawn(&fetch, &target, common::settings(OutputMode::Buffered, 3));

    let opened = engine
        .open(JobRequest {
            title: Some("pool".into()),
            ..JobRequest::new(&url)
        })
        .await
        .unwrap();
    assert!(matches!(opened, Opened::Queued(_)));
    engine.wait_idle().await.unwrap();

    assert_eq!(fetch.peak(), 6);
    for i in 0..20 {
        assert_eq!(fetch.hits(&common::segment_url(i)), 1, "segment {}", i);
    }
    assert_eq!(
        target.delivered_bytes("pool.ts").unwrap(),
        common::expected_output(0..20)
    );
}

#[tokio::test(start_paused = true)]
async fn short_job_starts_only_needed_workers() {
    let fetch = MemoryFetch::new();
    let target = MemoryTarget::new();
    let url = common::serve_playlist(&fetch, "index.m3u8", 3);
    let (engine, _events) = common::spawn(&fetch, &target, common::settings(OutputMode::Buffered, 3));

    engine.open(JobRequest::new(&url)).await.unwrap();
    engine.wait_idle().await.unwrap();

    assert_eq!(fetch.peak(), 3);
    let artifacts = target.delivered();
    assert_eq!(artifacts.len(), 1);
    assert_eq!(artifacts[0].media_type, "video/MP2T");
    assert!(artifacts[0].file_name.ends_with(".ts"));
}

#[tokio::test(start_paused = true)]
async fn range_limits_fetched_segments() {
    let fetch = MemoryFetch::new();
    let target = MemoryTarget::new();
    let url = common::serve_playlist(&fetch, "index.m3u8", 10);
    let (engine, _events) = common::spawn(&fetch, &target, common::settings(OutputMode::Buffered, 3));

    let Opened::Queued(id) = engine
        .open(JobRequest {
            title: Some("cut".into()),
            start: Some(3),
            end: Some(5),
            ..JobRequest::new(&url)
        })
        .await
        .unwrap()
    else {
        panic!("expected a job");
    };
    engine.wait_idle().await.unwrap();

    assert_eq!(fetch.hits(&common::segment_url(1)), 0);
    assert_eq!(fetch.hits(&common::segment_url(5)), 0);
    assert_eq!(
        target.delivered_bytes("cut.ts").unwrap(),
        common::expected_output(2..5)
    );
    let jobs = engine.jobs().await.unwrap();
    let job = jobs.iter().find(|j| j.id == id).unwrap();
    assert_eq!(job.status, JobStatus::Done);
    assert_eq!((job.success, job.target), (3, 3));
    assert_eq!(job.duration_secs, 12.0);
    assert_eq!(job.percent_label(), "100.00%");
}

#[tokio::test(start_paused = true)]
async fn streaming_output_matches_buffered_when_completions_reorder() {
    let n = 9;
    let fetch = MemoryFetch::new();
    let url = common::serve_playlist(&fetch, "index.m3u8", n);
    // Later segments finish first.
    for i in 0..n {
        fetch.delay(&common::segment_url(i), Duration::from_millis(100 - 10 * i as u64));
    }

    let streaming_target = MemoryTarget::new();
    let (engine, _e1) = common::spawn(&fetch, &streaming_target, common::settings(OutputMode::Streaming, 3));
    engine
        .open(JobRequest {
            title: Some("out".into()),
            ..JobRequest::new(&url)
        })
        .await
        .unwrap();
    engine.wait_idle().await.unwrap();

    let buffered_target = MemoryTarget::new();
    let (engine, _e2) = common::spawn(&fetch, &buffered_target, common::settings(OutputMode::Buffered, 3));
    engine
        .open(JobRequest {
            title: Some("out".into()),
            ..JobRequest::new(&url)
        })
        .await
        .unwrap();
    engine.wait_idle().await.unwrap();

    let (streamed, closed) = streaming_target.stream("out.ts").unwrap();
    assert!(closed);
    assert!(streaming_target.delivered().is_empty());
    let buffered = buffered_target.delivered_bytes("out.ts").unwrap();
    assert_eq!(streamed, buffered);
    assert_eq!(streamed, common::expected_output(0..n));
}

#[tokio::test(start_paused = true)]
async fn events_report_every_segment_and_finish() {
    let fetch = MemoryFetch::new();
    let target = MemoryTarget::new();
    let url = common::serve_playlist(&fetch, "index.m3u8", 4);
    let (engine, mut events) = common::spawn(&fetch, &target, common::settings(OutputMode::Buffered, 3));

    let Opened::Queued(id) = engine.open(JobRequest::new(&url)).await.unwrap() else {
        panic!("expected a job");
    };
    engine.wait_idle().await.unwrap();
    // Let the idle notification land.
    tokio::time::sleep(Duration::from_millis(1)).await;

    let events = common::drain(&mut events);
    let successes = events
        .iter()
        .filter(|e| {
            matches!(e, EngineEvent::Segment { job, status, .. }
                if *job == id && *status == hlsdm_core::segmenter::SegmentStatus::Success)
        })
        .count();
    assert_eq!(successes, 4);
    assert!(events
        .iter()
        .any(|e| matches!(e, EngineEvent::JobFinished { job, .. } if *job == id)));
    assert!(events.iter().any(|e| matches!(e, EngineEvent::Idle)));
}
