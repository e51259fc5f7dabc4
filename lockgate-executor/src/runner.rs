//! Command runner abstraction.

use std::sync::Arc;

use async_trait::async_trait;
use lockgate_core::CommandInvocation;

use crate::ExecutorError;

/// Runs one invocation of an external command to completion.
///
/// Request handlers only ever reach the lock tool through this trait.
///
/// # Cancel Safety
/// Implementations must not leave a child process running if the future
/// is dropped.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `invocation` and return its combined stdout and stderr.
    ///
    /// # Errors
    /// Returns [`ExecutorError::LaunchFailed`] if the process cannot start,
    /// [`ExecutorError::NonZeroExit`] if it exits unsuccessfully, or
    /// [`ExecutorError::TimedOut`] if it exceeds its deadline.
    async fn run(&self, invocation: &CommandInvocation) -> Result<Vec<u8>, ExecutorError>;
}

#[async_trait]
impl<R: CommandRunner + ?Sized> CommandRunner for Arc<R> {
    async fn run(&self, invocation: &CommandInvocation) -> Result<Vec<u8>, ExecutorError> {
        (**self).run(invocation).await
    }
}
