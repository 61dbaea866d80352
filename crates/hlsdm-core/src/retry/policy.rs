use std::time::Duration;

/// Decision returned when a job stalls with failed segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Pause now, restart after this many countdown ticks.
    Countdown(u32),
    /// No automatic retries left; the job stays paused.
    Exhausted,
}

/// Whole-job automatic retry policy.
///
/// A job gets `budget` automatic restarts. Each restart is preceded by a
/// visible countdown of `countdown_ticks` ticks of length `tick`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Automatic restarts per job.
    pub budget: u32,
    /// Ticks counted down before each restart.
    pub countdown_ticks: u32,
    /// Length of one tick.
    pub tick: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            budget: 3,
            countdown_ticks: 3,
            tick: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Decide what to do for a stalled job with `remaining` budget.
    pub fn decide(&self, remaining: u32) -> RetryDecision {
        if remaining == 0 {
            RetryDecision::Exhausted
        } else {
            RetryDecision::Countdown(self.countdown_ticks)
        }
    }
}
