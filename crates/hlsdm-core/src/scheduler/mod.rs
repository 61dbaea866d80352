//! Job registry and the one-downloading-job rule.
//!
//! The scheduler only moves statuses around. Aborting fetches, seeding
//! workers and running retry countdowns is the engine's business; it asks
//! the scheduler what to activate and reports back.

use crate::job::{Job, JobId, JobParts, JobStatus};
use crate::storage::OutputSink;

/// Outcome of [`TaskScheduler::activate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// The job is now the downloading job; the caller must (re)seed it.
    Started,
    /// Another job is downloading; the job was queued as `Ready`.
    Queued,
    /// Done or already downloading; nothing changed.
    Ignored,
}

/// Owns every job, in creation order.
#[derive(Debug)]
pub struct TaskScheduler {
    jobs: Vec<Job>,
    /// The job the user is working with: last activated or manually retried.
    current: Option<JobId>,
    next_id: JobId,
}

impl Default for TaskScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskScheduler {
    pub fn new() -> Self {
        TaskScheduler {
            jobs: Vec::new(),
            current: None,
            next_id: 1,
        }
    }

    /// Registers a new job (status `Ready`) and returns its id.
    pub fn insert(&mut self, parts: JobParts, sink: OutputSink) -> JobId {
        let id = self.next_id;
        self.next_id += 1;
        self.jobs.push(Job::new(id, parts, sink));
        id
    }

    pub fn get(&self, id: JobId) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id() == id)
    }

    pub fn get_mut(&mut self, id: JobId) -> Option<&mut Job> {
        self.jobs.iter_mut().find(|j| j.id() == id)
    }

    pub fn remove(&mut self, id: JobId) -> Option<Job> {
        let pos = self.jobs.iter().position(|j| j.id() == id)?;
        if self.current == Some(id) {
            self.current = None;
        }
        Some(self.jobs.remove(pos))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn current(&self) -> Option<JobId> {
        self.current
    }

    pub(crate) fn set_current(&mut self, id: JobId) {
        self.current = Some(id);
    }

    /// The job currently `Downloading`, if any.
    pub fn downloading(&self) -> Option<JobId> {
        self.jobs
            .iter()
            .find(|j| j.status() == JobStatus::Downloading)
            .map(Job::id)
    }

    /// Makes `id` the downloading job unless another one already is, in
    /// which case `id` is queued. Never preempts.
    pub fn activate(&mut self, id: JobId) -> Option<Activation> {
        let other = self.downloading().filter(|d| *d != id);
        let job = self.get_mut(id)?;
        let outcome = match job.status() {
            JobStatus::Done | JobStatus::Downloading => Activation::Ignored,
            _ if other.is_some() => {
                job.set_status(JobStatus::Ready);
                Activation::Queued
            }
            _ => {
                job.set_status(JobStatus::Downloading);
                Activation::Started
            }
        };
        if outcome == Activation::Started {
            self.current = Some(id);
        }
        Some(outcome)
    }

    /// The most recently added `Ready` job, when nothing is downloading.
    pub fn pick_next(&self) -> Option<JobId> {
        if self.downloading().is_some() {
            return None;
        }
        self.jobs
            .iter()
            .rev()
            .find(|j| j.status() == JobStatus::Ready)
            .map(Job::id)
    }

    /// `ids` that exist, ordered oldest first, without duplicates.
    pub fn oldest_first(&self, ids: &[JobId]) -> Vec<JobId> {
        self.jobs
            .iter()
            .map(Job::id)
            .filter(|id| ids.contains(id))
            .collect()
    }
}
