//! Per-connection SOCKS5 session
//!
//! A session moves through three phases in order: method negotiation,
//! request parsing, and (for a successful CONNECT) relaying. Parsing is
//! driven by a [`FrameReader`]; relaying consumes the reader, so a session
//! that has started relaying can never parse again.

use super::connect::{connect_target, send_connect_result};
use super::frame::{Event, FrameReader, Outcome};
use super::relay::relay_tcp;
use super::reply::send_reply;
use super::resolve::{lookup, send_resolve_result, Resolver, SystemResolver};
use super::types::{Request, SocksCommand};
use crate::config::ServerConfig;
use crate::error::SocksrelayError;
use crate::net::SocketOpts;
use anyhow::{Context, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, trace, warn};

/// Client bytes buffered ahead of relaying before reads are paused
const MAX_EARLY_DATA: usize = 64 * 1024;

/// Settings and collaborators shared by every session
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Deadline for outbound connects
    pub connect_timeout: Duration,
    /// Deadline for RESOLVE lookups
    pub resolve_timeout: Duration,
    /// Options for outbound sockets
    pub socket_opts: SocketOpts,
    /// Lookup used by RESOLVE
    pub resolver: Arc<dyn Resolver>,
}

impl Default for SessionContext {
    fn default() -> Self {
        SessionContext::from_config(&ServerConfig::default())
    }
}

impl SessionContext {
    /// Build a context from server configuration, using the system resolver
    pub fn from_config(config: &ServerConfig) -> Self {
        SessionContext {
            connect_timeout: Duration::from_secs(config.connect_timeout),
            resolve_timeout: Duration::from_secs(config.resolve_timeout),
            socket_opts: SocketOpts::from_tcp_config(&config.tcp),
            resolver: Arc::new(SystemResolver),
        }
    }

    /// Replace the RESOLVE lookup
    pub fn with_resolver(mut self, resolver: Arc<dyn Resolver>) -> Self {
        self.resolver = resolver;
        self
    }
}

/// Handle one client connection from greeting to close
///
/// Protocol violations end the session with an error and no reply; every
/// other failure is reported to the client and ends the session normally.
pub async fn handle_socks5_session<S>(mut stream: S, ctx: &SessionContext) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    let mut reader = FrameReader::new();

    let request = match read_request(&mut stream, &mut reader).await? {
        Some(request) => request,
        None => return Ok(()),
    };

    info!("SOCKS5 request: {}", request);

    match request.command {
        SocksCommand::Connect => {
            let connecting = connect_target(
                &request.host,
                request.port,
                ctx.connect_timeout,
                &ctx.socket_opts,
            );
            let result = match until_client_closes(&mut stream, &mut reader, connecting).await {
                Some(result) => result,
                None => return Ok(()),
            };

            let target = match send_connect_result(&mut stream, &request, result).await? {
                Some(target) => target,
                None => return Ok(()),
            };

            let pending = reader.into_remaining().freeze();
            relay_tcp(stream, target, pending).await
        }
        SocksCommand::Resolve => {
            let resolving = lookup(ctx.resolver.as_ref(), &request.host, ctx.resolve_timeout);
            let result = match until_client_closes(&mut stream, &mut reader, resolving).await {
                Some(result) => result,
                None => return Ok(()),
            };

            send_resolve_result(&mut stream, &request, result).await
        }
    }
}

/// Negotiate and parse until a request is complete
///
/// Returns `None` when the client went away or the request was rejected
/// (the rejection reply has already been sent).
async fn read_request<S>(stream: &mut S, reader: &mut FrameReader) -> Result<Option<Request>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    loop {
        while let Some(event) = reader
            .next_event()
            .map_err(SocksrelayError::from)
            .with_context(|| "Malformed SOCKS5 frame, closing without reply")?
        {
            match event {
                Event::Write(bytes) => {
                    trace!("SENT: {:?}", bytes);
                    stream.write_all(bytes).await?;
                    stream.flush().await?;
                }
                Event::Done(Outcome::Request(request)) => return Ok(Some(request)),
                Event::Done(Outcome::Reject { reply, reason }) => {
                    warn!("Rejecting request: {}", reason);
                    send_reply(stream, reply).await?;
                    return Ok(None);
                }
            }
        }

        let n = stream
            .read_buf(reader.buffer_mut())
            .await
            .with_context(|| "Failed to read from client")?;
        if n == 0 {
            match reader.state() {
                Some(state) if state.is_handshake() => debug!("Client closed during method negotiation"),
                state => debug!("Client closed before the request completed ({:?})", state),
            }
            return Ok(None);
        }
    }
}

/// Drive `op` while watching the client for EOF
///
/// Bytes the client sends meanwhile are kept in the reader's buffer for the
/// relay. If the client closes or errors first, `op` is dropped (aborting
/// the connect or lookup) and `None` is returned.
async fn until_client_closes<S, F>(
    stream: &mut S,
    reader: &mut FrameReader,
    op: F,
) -> Option<F::Output>
where
    S: AsyncRead + Unpin,
    F: Future,
{
    tokio::pin!(op);

    loop {
        if reader.buffered() >= MAX_EARLY_DATA {
            return Some((&mut op).await);
        }

        tokio::select! {
            biased;
            output = &mut op => return Some(output),
            read = stream.read_buf(reader.buffer_mut()) => match read {
                Ok(0) => {
                    debug!("Client closed before the request completed");
                    return None;
                }
                Ok(n) => trace!("Buffered {} early bytes", n),
                Err(e) => {
                    debug!("Client read failed before the request completed: {}", e);
                    return None;
                }
            },
        }
    }
}
