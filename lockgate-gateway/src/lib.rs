//! HTTP gateway for hub lock key-code management.
//!
//! Each endpoint validates its input, builds one invocation of the lock
//! tool, runs it through a [`CommandRunner`](lockgate_executor::CommandRunner),
//! and relays the tool's output. The listener is only bound after the
//! overlay network is up.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod error;
pub mod routes;
pub mod server;
