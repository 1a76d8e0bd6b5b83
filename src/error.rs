//! Error types for Socksrelay
//!
//! This module defines all custom error types used throughout the application.

use thiserror::Error;

/// Main error type for Socksrelay operations
#[derive(Error, Debug)]
pub enum SocksrelayError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// SOCKS5 protocol error
    #[error("SOCKS5 error: {0}")]
    Socks5(#[from] Socks5Error),

    /// Timeout error
    #[error("Timeout: {0}")]
    Timeout(String),
}

/// SOCKS5 specific errors
///
/// The first three variants are protocol violations: the framing can no
/// longer be trusted and the session is closed without a reply.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Socks5Error {
    /// Unsupported SOCKS version
    #[error("Unsupported SOCKS version: {0}")]
    UnsupportedVersion(u8),

    /// Reserved byte in the request header was not zero
    #[error("Invalid reserved byte: {0}")]
    InvalidReserved(u8),

    /// Invalid domain name
    #[error("Invalid domain name: {0}")]
    InvalidDomain(String),

    /// Command not supported
    #[error("Command not supported: {0}")]
    CommandNotSupported(u8),

    /// Address type not supported
    #[error("Address type not supported: {0}")]
    AddressTypeNotSupported(u8),

    /// Lookup succeeded but produced no IPv4 address
    #[error("No IPv4 address found for: {0}")]
    NoIpv4Address(String),
}

impl Socks5Error {
    /// Whether this error means the byte stream itself is malformed
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            Socks5Error::UnsupportedVersion(_)
                | Socks5Error::InvalidReserved(_)
                | Socks5Error::InvalidDomain(_)
        )
    }
}

/// Reply codes emitted by this server
///
/// RFC 1928 defines codes up to 0x08; only these three are ever sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReplyCode {
    /// Command succeeded
    Succeeded = 0x00,
    /// General SOCKS server failure
    GeneralFailure = 0x01,
    /// Command or address type not supported
    CommandNotSupported = 0x07,
}

impl ReplyCode {
    /// Whether the connection must be closed after this reply is flushed
    pub fn closes_connection(self) -> bool {
        self != ReplyCode::Succeeded
    }
}

impl From<ReplyCode> for u8 {
    fn from(code: ReplyCode) -> Self {
        code as u8
    }
}
