//! Limits applied to every subprocess invocation.

use std::time::Duration;

/// Default per-invocation deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default cap on simultaneously running subprocesses.
pub const DEFAULT_MAX_CONCURRENT: usize = 16;

/// Configuration for a [`ProcessRunner`](crate::ProcessRunner).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct RunnerConfig {
    /// Wall-clock deadline after which the child is killed.
    pub timeout: Duration,

    /// Maximum number of children alive at once. Further invocations wait.
    pub max_concurrent: usize,
}

impl RunnerConfig {
    /// Create a config. A `max_concurrent` of zero is raised to one.
    #[must_use]
    pub fn new(timeout: Duration, max_concurrent: usize) -> Self {
        Self { timeout, max_concurrent: max_concurrent.max(1) }
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, DEFAULT_MAX_CONCURRENT)
    }
}
