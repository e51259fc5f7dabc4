//! Server startup: overlay first, then bind, then serve.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use lockgate_executor::CommandRunner;
use lockgate_overlay::{NetworkBootstrap, OverlaySession};
use tokio::net::TcpListener;

use crate::{
    config::GatewayConfig,
    error::StartupError,
    routes::{create_router, AppState},
};

/// The gateway server, wired from explicit dependencies.
pub struct Server<S> {
    config: Arc<GatewayConfig>,
    bootstrap: Arc<NetworkBootstrap<S>>,
    runner: Arc<dyn CommandRunner>,
}

impl<S: OverlaySession> Server<S> {
    #[must_use]
    pub fn new(
        config: Arc<GatewayConfig>,
        bootstrap: Arc<NetworkBootstrap<S>>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self { config, bootstrap, runner }
    }

    /// The router this server serves.
    pub fn router(&self) -> Router {
        create_router(AppState::new(Arc::clone(&self.runner), self.config.command_template()))
    }

    /// Bring the overlay up and bind the listener on its address.
    ///
    /// Nothing is bound unless the overlay comes up.
    ///
    /// # Errors
    /// Returns [`StartupError::Overlay`] if the bootstrap fails, or
    /// [`StartupError::Bind`] if the port cannot be bound.
    pub async fn bind(&self) -> Result<BoundServer, StartupError> {
        let status = self.bootstrap.ensure_started().await?;
        let addr = SocketAddr::new(status.address, self.config.port);

        let listener =
            TcpListener::bind(addr).await.map_err(|source| StartupError::Bind { addr, source })?;

        Ok(BoundServer { listener, router: self.router() })
    }
}

/// A server whose listener is bound and ready to accept.
pub struct BoundServer {
    listener: TcpListener,
    router: Router,
}

impl BoundServer {
    /// The address actually bound.
    ///
    /// # Errors
    /// Propagates the OS error if the address cannot be read.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests.
    ///
    /// # Errors
    /// Returns [`StartupError::Serve`] if the accept loop fails.
    pub async fn serve<F>(self, shutdown: F) -> Result<(), StartupError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if let Ok(addr) = self.listener.local_addr() {
            tracing::info!(%addr, "lockgate-gateway listening");
        }
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(StartupError::Serve)
    }
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    tracing::info!("shutdown signal received");
}
