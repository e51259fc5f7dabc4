//! Subprocess execution for the lockgate gateway.
//!
//! [`CommandRunner`] is the seam between request handling and the lock
//! tool: production wiring uses [`ProcessRunner`], tests substitute a stub.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod error;
pub mod process;
pub mod runner;

pub use config::RunnerConfig;
pub use error::ExecutorError;
pub use process::ProcessRunner;
pub use runner::CommandRunner;
