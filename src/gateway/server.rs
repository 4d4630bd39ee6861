use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::{build_router, GatewayState};
use crate::config::GatewayConfig;
use crate::rpc::LogCacheClient;

/// HTTP gateway in front of a log-cache client. The version string is fixed
/// at construction.
pub struct Gateway {
    state: Arc<GatewayState>,
}

impl Gateway {
    pub fn new(client: Arc<dyn LogCacheClient>, version: impl Into<String>) -> Self {
        Self {
            state: Arc::new(GatewayState {
                client,
                version: version.into(),
            }),
        }
    }

    pub fn from_config(config: &GatewayConfig, client: Arc<dyn LogCacheClient>) -> Self {
        Self::new(client, config.version.clone())
    }

    pub fn version(&self) -> &str {
        &self.state.version
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Binds `addr` and serves in a background task.
    pub async fn start(&self, addr: impl ToSocketAddrs) -> std::io::Result<RunningGateway> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        let app = self.router();

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            });
            if let Err(e) = server.await {
                error!(error = %e, "gateway server error");
            }
        });

        info!(addr = %local_addr, version = %self.state.version, "gateway listening");
        Ok(RunningGateway {
            addr: local_addr,
            shutdown_tx,
            handle,
        })
    }
}

pub struct RunningGateway {
    addr: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl RunningGateway {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stops accepting connections and waits for in-flight requests.
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(());
        if let Err(e) = self.handle.await {
            error!(error = %e, "gateway server task failed");
        }
    }
}
