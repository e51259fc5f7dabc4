//! Error types for the executor crate.

use std::time::Duration;

/// Ways an invocation can fail. `Ok(output)` is the success case.
///
/// Every variant that ran the process carries its combined output so the
/// tool's own diagnostics can be relayed to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ExecutorError {
    /// The process could not be started.
    #[error("failed to launch {program}: {reason}")]
    LaunchFailed { program: String, reason: String },

    /// The process ran and exited unsuccessfully. `code` is `None` when it
    /// was terminated by a signal, or killed after its output became
    /// unreadable.
    #[error(
        "command exited unsuccessfully (exit code {})",
        .code.map_or_else(|| "none".to_owned(), |c| c.to_string())
    )]
    NonZeroExit { code: Option<i32>, output: Vec<u8> },

    /// The process outlived its deadline and was killed.
    #[error("command did not complete within {after:?}")]
    TimedOut { after: Duration, output: Vec<u8> },
}

impl ExecutorError {
    /// Text to show the caller: the captured output, or the error message
    /// when the process never ran.
    #[must_use]
    pub fn into_diagnostic(self) -> Vec<u8> {
        match self {
            Self::LaunchFailed { .. } => self.to_string().into_bytes(),
            Self::NonZeroExit { output, .. } | Self::TimedOut { output, .. } => output,
        }
    }
}
