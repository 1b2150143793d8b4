//! Saturating consecutive-failure counter.

use crate::probe::ProbeVerdict;

/// Counts consecutive failed probes, pinned at `MaxFailures`.
///
/// Saturating at the ceiling means callers never need a second cap check:
/// `failure_count == ceiling` is exactly "eligible for restart".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureAccumulator {
    ceiling: u32,
}

impl FailureAccumulator {
    pub fn new(max_failures: u32) -> Self {
        Self {
            ceiling: max_failures,
        }
    }

    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }

    /// New failure count after a probe result.
    pub fn on_probe_result(&self, current: u32, verdict: ProbeVerdict) -> u32 {
        match verdict {
            ProbeVerdict::Healthy => 0,
            ProbeVerdict::Unreachable if current < self.ceiling => current + 1,
            ProbeVerdict::Unreachable => self.ceiling,
        }
    }

    pub fn at_ceiling(&self, count: u32) -> bool {
        count >= self.ceiling
    }
}
