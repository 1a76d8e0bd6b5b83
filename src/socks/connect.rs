//! SOCKS5 CONNECT
//!
//! Opens the outbound TCP connection for a CONNECT request and reports the
//! result to the client. Relaying is started by the session once this
//! succeeds.

use super::reply::{send_general_failure, send_reply, Reply};
use super::types::Request;
use crate::error::SocksrelayError;
use crate::net::SocketOpts;
use anyhow::Result;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::AsyncWrite;
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

/// Connect to `host:port`, trying IPv4 addresses before IPv6 ones
///
/// The whole attempt, name lookup included, is bounded by `timeout`.
pub async fn connect_target(
    host: &str,
    port: u16,
    timeout: Duration,
    opts: &SocketOpts,
) -> io::Result<TcpStream> {
    let attempt = async {
        let mut addrs: Vec<SocketAddr> = tokio::net::lookup_host((host, port)).await?.collect();
        addrs.sort_by_key(|addr| addr.is_ipv6());

        let mut last_err = None;
        for addr in addrs {
            debug!("Connecting to target: {}", addr);
            match TcpStream::connect(addr).await {
                Ok(stream) => return Ok(stream),
                Err(e) => last_err = Some(e),
            }
        }

        Err(last_err.unwrap_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no addresses found for {}", host),
            )
        }))
    };

    let stream = tokio::time::timeout(timeout, attempt)
        .await
        .map_err(|_| {
            io::Error::new(
                io::ErrorKind::TimedOut,
                SocksrelayError::Timeout(format!("connect to {}:{}", host, port)),
            )
        })??;

    if let Err(e) = opts.apply(&stream) {
        warn!("Failed to apply socket options: {}", e);
    }

    Ok(stream)
}

/// Report the connect result to the client
///
/// On success the reply carries the outbound socket's own local address and
/// the stream is handed back for relaying. On failure a general-failure
/// reply is sent and `None` is returned.
pub async fn send_connect_result<S>(
    client: &mut S,
    request: &Request,
    result: io::Result<TcpStream>,
) -> Result<Option<TcpStream>>
where
    S: AsyncWrite + Unpin,
{
    let outcome = result.and_then(|target| {
        let local_addr = target.local_addr()?;
        Ok((target, local_addr))
    });

    match outcome {
        Ok((target, local_addr)) => {
            send_reply(client, Reply::succeeded(local_addr)).await?;
            info!(
                "SOCKS5 tunnel established to {}:{} via {}",
                request.host, request.port, local_addr
            );
            Ok(Some(target))
        }
        Err(e) => {
            warn!(
                "Failed to connect to {}:{}: {}",
                request.host, request.port, e
            );
            send_general_failure(client).await?;
            Ok(None)
        }
    }
}
