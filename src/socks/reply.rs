//! SOCKS5 reply builder
//!
//! Constructs SOCKS5 reply messages.

use super::consts::*;
use crate::error::ReplyCode;
use anyhow::Result;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// A reply to a parsed request
///
/// # SOCKS5 Reply Format
///
/// ```text
/// +----+-----+-------+------+----------+----------+
/// |VER | REP |  RSV  | ATYP | BND.ADDR | BND.PORT |
/// +----+-----+-------+------+----------+----------+
/// | 1  |  1  | X'00' | X'01'|    4     |    2     |
/// +----+-----+-------+------+----------+----------+
/// ```
///
/// The bound address is always encoded as IPv4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reply {
    /// Reply status code
    pub code: ReplyCode,
    /// Bound address reported to the client
    pub bound_addr: SocketAddrV4,
}

impl Reply {
    /// A reply carrying `0.0.0.0:0`
    pub fn unbound(code: ReplyCode) -> Self {
        Reply {
            code,
            bound_addr: SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0),
        }
    }

    /// Success reply for the given local address of an outbound socket
    pub fn succeeded(bound: SocketAddr) -> Self {
        Reply {
            code: ReplyCode::Succeeded,
            bound_addr: to_ipv4_bound(bound),
        }
    }

    /// Generic downstream failure
    pub fn general_failure() -> Self {
        Reply::unbound(ReplyCode::GeneralFailure)
    }

    /// Unknown command or unsupported address type
    pub fn command_not_supported() -> Self {
        Reply::unbound(ReplyCode::CommandNotSupported)
    }

    /// Encode the reply frame
    pub fn to_bytes(&self) -> [u8; REPLY_LEN] {
        let mut frame = [0u8; REPLY_LEN];
        frame[0] = SOCKS5_VERSION;
        frame[1] = self.code.into();
        frame[2] = SOCKS5_RESERVED;
        frame[3] = SOCKS5_ADDR_TYPE_IPV4;
        frame[4..8].copy_from_slice(&self.bound_addr.ip().octets());
        frame[8..10].copy_from_slice(&self.bound_addr.port().to_be_bytes());
        frame
    }
}

/// Encode the RESOLVE success frame: header plus the address, no port
pub fn resolved_reply(addr: Ipv4Addr) -> [u8; RESOLVE_REPLY_LEN] {
    let mut frame = [0u8; RESOLVE_REPLY_LEN];
    frame[0] = SOCKS5_VERSION;
    frame[1] = ReplyCode::Succeeded.into();
    frame[2] = SOCKS5_RESERVED;
    frame[3] = SOCKS5_ADDR_TYPE_IPV4;
    frame[4..8].copy_from_slice(&addr.octets());
    frame
}

/// Map an arbitrary socket address onto the IPv4 form the reply can carry
fn to_ipv4_bound(addr: SocketAddr) -> SocketAddrV4 {
    match addr {
        SocketAddr::V4(v4) => v4,
        SocketAddr::V6(v6) => {
            let ip = v6.ip().to_ipv4_mapped().unwrap_or(Ipv4Addr::UNSPECIFIED);
            SocketAddrV4::new(ip, v6.port())
        }
    }
}

/// Write a reply and flush it
///
/// Failure replies also shut down the write side: nothing may follow them.
pub async fn send_reply<S>(stream: &mut S, reply: Reply) -> Result<()>
where
    S: AsyncWrite + Unpin,
{
    let frame = reply.to_bytes();
    tracing::trace!("SENT: {:?}", frame);
    stream.write_all(&frame).await?;
    stream.flush().await?;
    if reply.code.closes_connection() {
        if let Err(e) = stream.shutdown().await {
            tracing::debug!("Failed to shut down client after reply: {}", e);
        }
    }
    Ok(())
}

/// Send a "general failure" reply
pub async fn send_general_failure<S>(stream: &mut S) -> Result<()>
where
    S: AsyncWrite + Unpin,
{
    send_reply(stream, Reply::general_failure()).await
}
