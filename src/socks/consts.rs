//! SOCKS5 protocol constants
//!
//! Defines all constants used in the SOCKS5 protocol implementation.

/// SOCKS5 protocol version
pub const SOCKS5_VERSION: u8 = 0x05;

// Authentication methods
/// No authentication required
pub const SOCKS5_AUTH_METHOD_NONE: u8 = 0x00;

// Commands
/// TCP CONNECT command
pub const SOCKS5_CMD_TCP_CONNECT: u8 = 0x01;
/// Tor RESOLVE extension command
pub const SOCKS5_CMD_RESOLVE: u8 = 0xF0;

// Address types
/// IPv4 address
pub const SOCKS5_ADDR_TYPE_IPV4: u8 = 0x01;
/// Domain name
pub const SOCKS5_ADDR_TYPE_DOMAIN: u8 = 0x03;
/// IPv6 address (rejected)
pub const SOCKS5_ADDR_TYPE_IPV6: u8 = 0x04;

// Reserved byte
/// Reserved byte value (always 0x00)
pub const SOCKS5_RESERVED: u8 = 0x00;

// Frame sizes
/// Greeting header: VER NMETHODS
pub const GREETING_HEADER_LEN: usize = 2;
/// Request header: VER CMD RSV ATYP
pub const REQUEST_HEADER_LEN: usize = 4;
/// IPv4 address plus port
pub const IPV4_ADDR_PORT_LEN: usize = 6;
/// Domain length prefix
pub const DOMAIN_LEN_PREFIX: usize = 1;
/// Port field
pub const PORT_LEN: usize = 2;
/// Reply frame with an IPv4 bound address
pub const REPLY_LEN: usize = 10;
/// RESOLVE success frame (no port)
pub const RESOLVE_REPLY_LEN: usize = 8;

/// Read buffer size for parsing and relaying
pub const DEFAULT_BUFFER_SIZE: usize = 8192;
