//! Server configuration types
//!
//! Defines the configuration structures for the proxy listener and the
//! sockets it creates.

use crate::error::SocksrelayError;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Default listen address
fn default_listen_addr() -> String {
    "0.0.0.0:9050".to_string()
}

/// Default connect timeout in seconds
fn default_connect_timeout() -> u64 {
    10
}

/// Default lookup timeout in seconds
fn default_resolve_timeout() -> u64 {
    10
}

/// Root configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

/// SOCKS5 server configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    /// Address the listener binds to (e.g., "0.0.0.0:9050")
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Outbound connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// RESOLVE lookup timeout in seconds
    #[serde(default = "default_resolve_timeout")]
    pub resolve_timeout: u64,

    /// Socket options for accepted and outbound connections
    #[serde(default)]
    pub tcp: TcpConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            connect_timeout: default_connect_timeout(),
            resolve_timeout: default_resolve_timeout(),
            tcp: TcpConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), SocksrelayError> {
        if self.listen_addr.parse::<SocketAddr>().is_err() {
            return Err(SocksrelayError::Config(format!(
                "invalid listen address: {}",
                self.listen_addr
            )));
        }
        if self.connect_timeout == 0 {
            return Err(SocksrelayError::Config(
                "connect_timeout must be greater than zero".to_string(),
            ));
        }
        if self.resolve_timeout == 0 {
            return Err(SocksrelayError::Config(
                "resolve_timeout must be greater than zero".to_string(),
            ));
        }
        if self.tcp.keepalive_secs > 0 && self.tcp.keepalive_interval == 0 {
            return Err(SocksrelayError::Config(
                "keepalive_interval must be greater than zero when keepalive is on".to_string(),
            ));
        }
        Ok(())
    }
}

/// Default keepalive seconds
fn default_keepalive_secs() -> u64 {
    20
}

/// Default keepalive interval
fn default_keepalive_interval() -> u64 {
    8
}

fn default_nodelay() -> bool {
    true
}

/// TCP socket configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TcpConfig {
    /// Enable TCP_NODELAY
    #[serde(default = "default_nodelay")]
    pub nodelay: bool,

    /// TCP keepalive idle time in seconds, 0 disables keepalive
    #[serde(default = "default_keepalive_secs")]
    pub keepalive_secs: u64,

    /// TCP keepalive interval in seconds
    #[serde(default = "default_keepalive_interval")]
    pub keepalive_interval: u64,
}

impl Default for TcpConfig {
    fn default() -> Self {
        TcpConfig {
            nodelay: default_nodelay(),
            keepalive_secs: default_keepalive_secs(),
            keepalive_interval: default_keepalive_interval(),
        }
    }
}
