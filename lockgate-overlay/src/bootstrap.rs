//! Once-per-process overlay bring-up.

use tokio::sync::OnceCell;

use crate::{OverlayError, OverlaySession, OverlayStatus};

/// Brings an [`OverlaySession`] up at most once.
///
/// The first call to [`ensure_started`](Self::ensure_started) runs the
/// session's `up`. Concurrent callers wait on that same attempt, and later
/// callers get its recorded outcome. A failed bring-up is terminal: it is
/// never retried.
#[derive(Debug)]
pub struct NetworkBootstrap<S> {
    session: S,
    outcome: OnceCell<Result<OverlayStatus, OverlayError>>,
}

impl<S: OverlaySession> NetworkBootstrap<S> {
    #[must_use]
    pub fn new(session: S) -> Self {
        Self { session, outcome: OnceCell::new() }
    }

    /// Bring the overlay up if no attempt has been made yet.
    ///
    /// # Errors
    /// Returns the [`OverlayError`] from the single bring-up attempt, on
    /// this and every later call.
    pub async fn ensure_started(&self) -> Result<OverlayStatus, OverlayError> {
        self.outcome
            .get_or_init(|| async {
                tracing::info!("starting overlay network");
                let outcome = self.session.up().await;
                match &outcome {
                    Ok(status) => {
                        tracing::info!(address = %status.address, "overlay network ready");
                    }
                    Err(e) => tracing::error!(error = %e, "overlay network failed to start"),
                }
                outcome
            })
            .await
            .clone()
    }

    /// The recorded outcome, or `None` if no attempt has finished.
    #[must_use]
    pub fn outcome(&self) -> Option<&Result<OverlayStatus, OverlayError>> {
        self.outcome.get()
    }

    /// `true` once the overlay is up.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self.outcome.get(), Some(Ok(_)))
    }
}
