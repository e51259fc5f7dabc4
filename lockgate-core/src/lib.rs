//! Core types for the lockgate key-code gateway.
//!
//! Defines the request model, validated operations, and the pure
//! translation from an operation to the lock tool's argument vector.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod command;
pub mod error;
pub mod operation;
pub mod request;

pub use command::{CommandInvocation, CommandTemplate, DEFAULT_MODULE, DEFAULT_PROGRAM};
pub use error::CoreError;
pub use operation::{Action, Operation};
pub use request::{DeviceId, KeyCodeRequest};
