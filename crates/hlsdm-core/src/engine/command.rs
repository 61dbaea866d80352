use tokio::sync::oneshot;

use crate::error::HlsError;
use crate::job::{JobId, JobParts, JobProgress, SegmentView};
use crate::storage::OutputArtifact;

type Reply<T> = oneshot::Sender<T>;

/// Requests sent from [`EngineHandle`](super::EngineHandle) to the engine loop.
pub(crate) enum Command {
    Add {
        parts: JobParts,
        reply: Reply<Result<JobId, HlsError>>,
    },
    Pause {
        id: JobId,
        reply: Reply<Result<(), HlsError>>,
    },
    Resume {
        id: JobId,
        reply: Reply<Result<(), HlsError>>,
    },
    Toggle {
        id: JobId,
        reply: Reply<Result<(), HlsError>>,
    },
    Remove {
        id: JobId,
        reply: Reply<Result<(), HlsError>>,
    },
    RetrySegment {
        id: JobId,
        index: usize,
        reply: Reply<Result<(), HlsError>>,
    },
    RetryFailed {
        id: JobId,
        reply: Reply<Result<(), HlsError>>,
    },
    ForceDownload {
        id: JobId,
        reply: Reply<Result<OutputArtifact, HlsError>>,
    },
    StartMany {
        ids: Vec<JobId>,
        reply: Reply<()>,
    },
    PauseMany {
        ids: Vec<JobId>,
        reply: Reply<()>,
    },
    RemoveMany {
        ids: Vec<JobId>,
        reply: Reply<()>,
    },
    Jobs {
        reply: Reply<Vec<JobProgress>>,
    },
    Segments {
        id: JobId,
        reply: Reply<Result<Vec<SegmentView>, HlsError>>,
    },
    WaitIdle {
        reply: Reply<()>,
    },
    Shutdown,
}
