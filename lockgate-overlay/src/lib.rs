//! Overlay network bootstrap for the lockgate gateway.
//!
//! The gateway only listens on a private overlay network. This crate
//! brings that network up exactly once per process, before the HTTP
//! listener binds, and reports the overlay address to bind to.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod auth;
pub mod bootstrap;
pub mod error;
pub mod session;
pub mod tailscale;

pub use auth::AuthKey;
pub use bootstrap::NetworkBootstrap;
pub use error::OverlayError;
pub use session::{OverlaySession, OverlayStatus};
pub use tailscale::TailscaleSession;
