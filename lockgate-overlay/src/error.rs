//! Error types for the overlay crate.

/// Errors raised while bringing the overlay network up.
///
/// `Clone` so a failed bootstrap can report the same error to every caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum OverlayError {
    /// The overlay CLI could not be started.
    #[error("failed to launch {program}: {reason}")]
    LaunchFailed { program: String, reason: String },

    /// An overlay CLI command ran and reported failure.
    #[error("`{command}` failed (exit code {code:?}): {output}")]
    CommandFailed { command: String, code: Option<i32>, output: String },

    /// An overlay CLI command did not finish in time.
    #[error("`{command}` did not complete within {secs}s")]
    TimedOut { command: String, secs: u64 },

    /// The node's overlay address could not be read.
    #[error("no overlay address in output {output:?}")]
    NoAddress { output: String },
}
