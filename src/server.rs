//! SOCKS5 listener
//!
//! Accepts client connections and runs one session task per connection.
//! Sessions share nothing but the immutable [`SessionContext`].

use crate::config::ServerConfig;
use crate::error::SocksrelayError;
use crate::net::SocketOpts;
use crate::socks::{handle_socks5_session, SessionContext};
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn, Instrument};

/// Pause after a failed accept (e.g. out of file descriptors)
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// SOCKS5 proxy server
pub struct Server {
    listener: TcpListener,
    ctx: Arc<SessionContext>,
    client_opts: SocketOpts,
    next_session_id: AtomicU64,
}

impl Server {
    /// Bind the listener described by `config`
    pub async fn bind(config: &ServerConfig) -> Result<Self> {
        let listener = TcpListener::bind(&config.listen_addr)
            .await
            .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
        Ok(Self::from_listener(
            listener,
            SessionContext::from_config(config),
            SocketOpts::from_tcp_config(&config.tcp),
        ))
    }

    /// Serve on an already bound listener
    pub fn from_listener(listener: TcpListener, ctx: SessionContext, client_opts: SocketOpts) -> Self {
        Server {
            listener,
            ctx: Arc::new(ctx),
            client_opts,
            next_session_id: AtomicU64::new(1),
        }
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until a shutdown signal arrives
    ///
    /// Sessions already running are left to finish on their own tasks.
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<bool>) -> Result<()> {
        info!("SOCKS5 server listening on {}", self.local_addr()?);

        loop {
            tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        if let Err(e) = self.client_opts.apply(&stream) {
                            debug!("Failed to apply socket options for {}: {}", peer, e);
                        }

                        let id = self.next_session_id.fetch_add(1, Ordering::Relaxed);
                        let ctx = self.ctx.clone();
                        let span = tracing::info_span!("session", id, %peer);
                        tokio::spawn(
                            async move {
                                debug!("Client connected");
                                if let Err(e) = handle_socks5_session(stream, &ctx).await {
                                    if is_protocol_violation(&e) {
                                        warn!("Closed session on protocol violation: {:#}", e);
                                    } else {
                                        debug!("Session ended with error: {:#}", e);
                                    }
                                }
                                debug!("Client disconnected");
                            }
                            .instrument(span),
                        );
                    }
                    Err(e) => {
                        error!("Failed to accept connection: {}", e);
                        tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    }
                },
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received, stopping server");
                    break;
                }
            }
        }

        info!("Server stopped");
        Ok(())
    }
}

/// Whether a session ended because the client broke the framing
fn is_protocol_violation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<SocksrelayError>(),
        Some(SocksrelayError::Socks5(e)) if e.is_protocol_violation()
    )
}

/// Bind according to `config` and serve until shutdown
pub async fn run_server(config: ServerConfig, shutdown_rx: broadcast::Receiver<bool>) -> Result<()> {
    Server::bind(&config).await?.run(shutdown_rx).await
}
