//! `VolleyServer` builder and server loop.
//!
//! This is the entry point for running a Volley game server. It ties
//! together all the layers: transport → protocol → engine → session.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use volley_protocol::JsonCodec;
use volley_report::{HistorySink, ResultSink};
use volley_session::{SessionConfig, SessionRegistry};
use volley_tick::TickConfig;
use volley_transport::{Transport, WebSocketTransport};

use crate::engine::{EngineHandle, spawn_engine};
use crate::handler::handle_connection;
use crate::{ServerConfig, VolleyError};

/// Builder for configuring and starting a Volley server.
///
/// # Example
///
/// ```rust,no_run
/// use volley::prelude::*;
///
/// # async fn start() -> Result<(), VolleyError> {
/// let server = VolleyServer::builder()
///     .bind("0.0.0.0:8080")
///     .session_config(SessionConfig::default().with_match_type(MatchType::Ranked))
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct VolleyServerBuilder {
    server_config: ServerConfig,
    session_config: SessionConfig,
    tick_config: TickConfig,
}

impl VolleyServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.server_config.bind_addr = addr.to_string();
        self
    }

    pub fn server_config(mut self, config: ServerConfig) -> Self {
        self.server_config = config;
        self
    }

    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    pub fn tick_config(mut self, config: TickConfig) -> Self {
        self.tick_config = config.validated();
        self
    }

    /// Binds the listener and starts the engine. Results go to the
    /// configured history URL, or are only logged when there is none.
    pub async fn build(self) -> Result<VolleyServer, VolleyError> {
        let sink = HistorySink::from_url(self.server_config.history_url.as_deref())?;
        self.build_with_sink(sink).await
    }

    /// Like [`build`](Self::build) but reports results to `sink`.
    pub async fn build_with_sink<S: ResultSink>(self, sink: S) -> Result<VolleyServer, VolleyError> {
        let transport = WebSocketTransport::bind(&self.server_config.bind_addr).await?;
        let registry = SessionRegistry::new(self.session_config);
        let (engine, engine_task) = spawn_engine(registry, self.tick_config, sink);

        Ok(VolleyServer {
            transport,
            engine,
            engine_task,
            config: self.server_config,
            codec: JsonCodec,
        })
    }
}

/// A bound Volley game server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct VolleyServer {
    transport: WebSocketTransport,
    engine: EngineHandle,
    engine_task: JoinHandle<()>,
    config: ServerConfig,
    codec: JsonCodec,
}

impl VolleyServer {
    /// Creates a new builder.
    pub fn builder() -> VolleyServerBuilder {
        VolleyServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// A handle to the session engine, usable after the server is moved
    /// into [`run`](Self::run).
    pub fn engine(&self) -> EngineHandle {
        self.engine.clone()
    }

    /// Runs the accept loop until the process is terminated.
    pub async fn run(self) -> Result<(), VolleyError> {
        self.run_until(std::future::pending()).await
    }

    /// Runs the accept loop until `shutdown` completes.
    ///
    /// Handlers that are already running keep going; the engine stops
    /// once the last of them is done.
    pub async fn run_until<F>(mut self, shutdown: F) -> Result<(), VolleyError>
    where
        F: Future<Output = ()>,
    {
        tracing::info!(addr = ?self.local_addr().ok(), "volley server running");
        let sweeper = spawn_sweeper(self.engine.clone(), self.config.sweep_period);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("shutdown requested");
                    break;
                }
                accepted = self.transport.accept() => match accepted {
                    Ok(conn) => {
                        let engine = self.engine.clone();
                        let codec = self.codec;
                        let join_timeout = self.config.join_timeout;
                        tokio::spawn(async move {
                            if let Err(e) =
                                handle_connection(conn, engine, codec, join_timeout).await
                            {
                                tracing::debug!(error = %e, "connection ended with error");
                            }
                        });
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "accept failed");
                    }
                }
            }
        }

        sweeper.abort();
        if self.engine_task.is_finished() {
            tracing::warn!("session engine exited before the server");
        }
        Ok(())
    }
}

/// Asks the engine for a sweep every `period`, starting one period from
/// now.
fn spawn_sweeper(engine: EngineHandle, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period.max(Duration::from_millis(1)));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately.
        interval.tick().await;
        loop {
            interval.tick().await;
            if engine.sweep().is_err() {
                break;
            }
        }
    })
}
