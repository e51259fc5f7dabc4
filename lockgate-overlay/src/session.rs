//! Overlay session abstraction.

use std::net::IpAddr;

use async_trait::async_trait;

use crate::OverlayError;

/// State of an overlay session that came up successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct OverlayStatus {
    /// This node's address on the overlay network.
    pub address: IpAddr,
}

impl OverlayStatus {
    #[must_use]
    pub fn new(address: IpAddr) -> Self {
        Self { address }
    }
}

/// A private overlay network the gateway can join.
///
/// Implementations must be `Send + Sync` so one session can be shared by
/// every task that might trigger the bootstrap.
#[async_trait]
pub trait OverlaySession: Send + Sync {
    /// Join the overlay network and report this node's address.
    ///
    /// # Errors
    /// Returns an [`OverlayError`] if the network cannot be brought up.
    async fn up(&self) -> Result<OverlayStatus, OverlayError>;
}
