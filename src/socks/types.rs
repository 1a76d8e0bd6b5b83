//! SOCKS5 type definitions
//!
//! Defines the core types used in SOCKS5 protocol handling.

use super::consts::*;
use std::fmt;

/// SOCKS5 command types accepted by this server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocksCommand {
    /// TCP CONNECT - establish a TCP connection to target
    Connect,
    /// RESOLVE - look up a host name on the client's behalf
    Resolve,
}

impl SocksCommand {
    /// Parse a command byte into SocksCommand
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            SOCKS5_CMD_TCP_CONNECT => Some(SocksCommand::Connect),
            SOCKS5_CMD_RESOLVE => Some(SocksCommand::Resolve),
            _ => None,
        }
    }
}

impl fmt::Display for SocksCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocksCommand::Connect => write!(f, "CONNECT"),
            SocksCommand::Resolve => write!(f, "RESOLVE"),
        }
    }
}

/// A fully parsed client request
///
/// `host` is either dotted-decimal IPv4 text or the domain name exactly as
/// the client sent it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Requested command
    pub command: SocksCommand,
    /// Destination host
    pub host: String,
    /// Destination port (ignored for RESOLVE)
    pub port: u16,
}

impl Request {
    /// Create a new request
    pub fn new(command: SocksCommand, host: impl Into<String>, port: u16) -> Self {
        Request {
            command,
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}:{}", self.command, self.host, self.port)
    }
}
