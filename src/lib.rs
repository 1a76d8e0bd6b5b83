//! # Socksrelay - SOCKS5 proxy with DNS resolution
//!
//! Socksrelay is a small SOCKS5 proxy server. Besides the standard CONNECT
//! command it implements the Tor RESOLVE extension (command `0xF0`), which
//! lets a client resolve a host name through the proxy.
//!
//! ## Features
//!
//! - **No-auth SOCKS5**: every client is offered "no authentication required"
//! - **CONNECT**: IPv4 and domain-name targets, relayed transparently
//! - **RESOLVE**: single-shot name lookup answered with an IPv4 address
//! - **Bounded waits**: connect and lookup timeouts from configuration
//!
//! ## Usage
//!
//! ```rust,ignore
//! use socksrelay::config::ServerConfig;
//! use socksrelay::server::run_server;
//! use tokio::sync::broadcast;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
//!     run_server(ServerConfig::default(), shutdown_rx).await
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! client -> greeting -> request -> CONNECT -> relay <-> destination
//!                                \-> RESOLVE -> reply, close
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod net;
pub mod server;
pub mod socks;

// Re-export commonly used items
pub use config::{load_config, Config, ServerConfig};
pub use error::{ReplyCode, Socks5Error, SocksrelayError};
pub use server::{run_server, Server};

/// Version of the Socksrelay library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the application
pub const NAME: &str = env!("CARGO_PKG_NAME");
