//! HTTP JSON-RPC server

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use jrpc_server::{MethodRegistry, RpcHandler};

use crate::{Result, RpcHttpHandler, ServerConfig};

/// Builder for [`RpcServer`]
#[derive(Debug, Default)]
pub struct RpcServerBuilder {
    config: ServerConfig,
    registry: MethodRegistry,
}

impl RpcServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the bind address
    pub fn bind_address(mut self, addr: SocketAddr) -> Self {
        self.config.bind_address = addr;
        self
    }

    /// Set the RPC endpoint path
    pub fn rpc_path(mut self, path: impl Into<String>) -> Self {
        self.config.rpc_path = path.into();
        self
    }

    /// Set maximum request body size
    pub fn max_request_size(mut self, size: usize) -> Self {
        self.config.max_request_size = size;
        self
    }

    pub fn batch_request_parallelism(mut self, parallelism: usize) -> Self {
        self.config.batch_request_parallelism = parallelism;
        self
    }

    pub fn max_batch_size(mut self, size: usize) -> Self {
        self.config.max_batch_size = size;
        self
    }

    pub fn health_endpoints(mut self, enable: bool) -> Self {
        self.config.enable_health_endpoints = enable;
        self
    }

    /// Attach a deadline to every handler call
    pub fn handler_deadline(mut self, deadline: Duration) -> Self {
        self.config.handler_deadline = Some(deadline);
        self
    }

    /// Register a handler under its own method name
    pub fn register<H>(mut self, handler: H) -> Result<Self>
    where
        H: RpcHandler + 'static,
    {
        self.registry.register(handler)?;
        Ok(self)
    }

    pub fn register_arc(mut self, handler: Arc<dyn RpcHandler>) -> Result<Self> {
        self.registry.register_arc(handler)?;
        Ok(self)
    }

    /// Validate the configuration and build the server
    pub fn build(self) -> Result<RpcServer> {
        self.config.validate()?;
        info!(
            methods = ?self.registry.methods(),
            "Built JSON-RPC server with {} method(s)",
            self.registry.len()
        );
        Ok(RpcServer {
            handler: RpcHttpHandler::new(self.config, self.registry),
        })
    }
}

/// HTTP/1.1 JSON-RPC server
#[derive(Debug, Clone)]
pub struct RpcServer {
    handler: RpcHttpHandler,
}

impl RpcServer {
    pub fn builder() -> RpcServerBuilder {
        RpcServerBuilder::new()
    }

    pub fn config(&self) -> &ServerConfig {
        self.handler.config()
    }

    pub fn handler(&self) -> &RpcHttpHandler {
        &self.handler
    }

    /// Bind the configured address and serve until an accept error
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config().bind_address).await?;
        self.serve(listener).await
    }

    /// Serve connections from an already bound listener
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        self.serve_with_shutdown(listener, std::future::pending())
            .await
    }

    /// Serve until `shutdown` resolves. Connections already accepted finish
    /// on their own tasks.
    pub async fn serve_with_shutdown<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        info!("JSON-RPC server listening on {}", listener.local_addr()?);
        info!("RPC endpoint available at: {}", self.config().rpc_path);

        tokio::pin!(shutdown);
        loop {
            let (stream, peer_addr) = tokio::select! {
                accepted = listener.accept() => accepted?,
                _ = &mut shutdown => {
                    info!("JSON-RPC server shutting down");
                    return Ok(());
                }
            };
            debug!("New connection from {}", peer_addr);

            let handler = self.handler.clone();
            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                let service = service_fn(move |req| {
                    let handler = handler.clone();
                    async move { Ok::<_, Infallible>(handler.handle(req).await) }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    let err_str = err.to_string();
                    if err_str.contains("connection closed before message completed") {
                        debug!("Client disconnected: {}", err);
                    } else {
                        error!("Error serving connection: {}", err);
                    }
                }
            });
        }
    }
}
