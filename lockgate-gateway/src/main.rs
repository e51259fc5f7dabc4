//! Entry point for the `lockgate-gateway` HTTP server.

use std::sync::Arc;

use lockgate_executor::{CommandRunner, ProcessRunner};
use lockgate_gateway::{
    config::GatewayConfig,
    server::{shutdown_signal, Server},
};
use lockgate_overlay::NetworkBootstrap;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match GatewayConfig::from_env() {
        Ok(c) => Arc::new(c),
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    info!(
        hub = %config.hub_address,
        port = config.port,
        module = %config.module,
        "starting lockgate-gateway"
    );

    let bootstrap = Arc::new(NetworkBootstrap::new(config.overlay_session()));
    let runner: Arc<dyn CommandRunner> = Arc::new(ProcessRunner::new(config.runner));
    let server = Server::new(Arc::clone(&config), bootstrap, runner);

    let bound = match server.bind().await {
        Ok(b) => b,
        Err(e) => {
            tracing::error!(error = %e, "startup failed");
            std::process::exit(1);
        }
    };

    if let Err(e) = bound.serve(shutdown_signal()).await {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }
}
