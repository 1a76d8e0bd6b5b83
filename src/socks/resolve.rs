//! RESOLVE extension (command 0xF0)
//!
//! Looks a host name up on the client's behalf and answers with a single
//! reply. The connection never enters relaying.

use super::reply::{resolved_reply, send_general_failure};
use super::types::Request;
use crate::error::{Socks5Error, SocksrelayError};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::fmt::Debug;
use std::io;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

/// Name lookup used by RESOLVE
#[async_trait]
pub trait Resolver: Debug + Send + Sync {
    /// Return one IPv4 address for `host`
    async fn lookup_ipv4(&self, host: &str) -> io::Result<Ipv4Addr>;
}

/// Resolver backed by the operating system (`getaddrinfo`)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

#[async_trait]
impl Resolver for SystemResolver {
    async fn lookup_ipv4(&self, host: &str) -> io::Result<Ipv4Addr> {
        tokio::net::lookup_host((host, 0))
            .await?
            .find_map(|addr| match addr.ip() {
                IpAddr::V4(ip) => Some(ip),
                IpAddr::V6(_) => None,
            })
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    Socks5Error::NoIpv4Address(host.to_string()),
                )
            })
    }
}

/// Look up `host` with a deadline
pub async fn lookup(resolver: &dyn Resolver, host: &str, timeout: Duration) -> io::Result<Ipv4Addr> {
    match tokio::time::timeout(timeout, resolver.lookup_ipv4(host)).await {
        Ok(result) => result,
        Err(_) => Err(io::Error::new(
            io::ErrorKind::TimedOut,
            SocksrelayError::Timeout(format!("lookup of {}", host)),
        )),
    }
}

/// Write the outcome of a lookup to the client
///
/// Success and failure both end the session; the caller drops the stream
/// afterwards.
pub async fn send_resolve_result<S>(
    stream: &mut S,
    request: &Request,
    result: io::Result<Ipv4Addr>,
) -> Result<()>
where
    S: AsyncWrite + Unpin,
{
    match result {
        Ok(addr) => {
            info!("Resolved {} to {}", request.host, addr);
            let frame = resolved_reply(addr);
            tracing::trace!("SENT: {:?}", frame);
            stream
                .write_all(&frame)
                .await
                .with_context(|| "Failed to send RESOLVE reply")?;
            stream.flush().await?;
            if let Err(e) = stream.shutdown().await {
                debug!("Failed to shut down client after RESOLVE reply: {}", e);
            }
        }
        Err(e) => {
            warn!("Failed to resolve {}: {}", request.host, e);
            send_general_failure(stream).await?;
        }
    }
    Ok(())
}
