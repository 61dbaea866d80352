//! Automatic whole-job retry: a per-job budget and a tick countdown.
//!
//! When every segment in a job's range is terminal and at least one failed,
//! the controller either starts a countdown (consuming one unit of budget)
//! or reports exhaustion. The engine drives the ticks; this module only
//! keeps the numbers.

mod policy;

pub use policy::{RetryDecision, RetryPolicy};

/// Retry state of one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryController {
    /// Automatic restarts left.
    remaining: u32,
    /// Ticks left in the running countdown, if any.
    countdown: Option<u32>,
}

/// Outcome of a single countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still counting; ticks left.
    Waiting(u32),
    /// Countdown finished; restart the job now.
    Restart,
    /// No countdown running (cancelled by the user).
    Idle,
}

impl RetryController {
    pub fn new(policy: &RetryPolicy) -> Self {
        RetryController {
            remaining: policy.budget,
            countdown: None,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn countdown(&self) -> Option<u32> {
        self.countdown
    }

    /// Called when the job stalls with failures. Consumes one unit of
    /// budget when a countdown starts.
    pub fn on_stall(&mut self, policy: &RetryPolicy) -> RetryDecision {
        let decision = policy.decide(self.remaining);
        match decision {
            RetryDecision::Countdown(ticks) => {
                self.remaining -= 1;
                self.countdown = Some(ticks);
            }
            RetryDecision::Exhausted => self.countdown = None,
        }
        decision
    }

    /// Advances the countdown by one tick.
    pub fn tick(&mut self) -> TickOutcome {
        match self.countdown {
            None => TickOutcome::Idle,
            Some(n) if n <= 1 => {
                self.countdown = None;
                TickOutcome::Restart
            }
            Some(n) => {
                self.countdown = Some(n - 1);
                TickOutcome::Waiting(n - 1)
            }
        }
    }

    /// Stops a running countdown without restoring budget.
    pub fn cancel(&mut self) -> bool {
        self.countdown.take().is_some()
    }
}
