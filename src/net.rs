//! Socket helpers
//!
//! Socket options applied to both accepted client connections and outbound
//! destination connections.

use crate::config::TcpConfig;
use std::time::Duration;
use tokio::net::TcpStream;

/// Socket options for configuring connections
#[derive(Debug, Clone)]
pub struct SocketOpts {
    /// Enable TCP_NODELAY
    pub nodelay: bool,
    /// Idle seconds before keepalive starts, 0 leaves keepalive off
    pub keepalive_secs: u64,
    /// Seconds between keepalive packets
    pub keepalive_interval: u64,
}

impl Default for SocketOpts {
    fn default() -> Self {
        SocketOpts::from_tcp_config(&TcpConfig::default())
    }
}

impl SocketOpts {
    /// Create socket options from TCP config
    pub fn from_tcp_config(config: &TcpConfig) -> Self {
        SocketOpts {
            nodelay: config.nodelay,
            keepalive_secs: config.keepalive_secs,
            keepalive_interval: config.keepalive_interval,
        }
    }

    /// Apply socket options to a TCP stream
    pub fn apply(&self, stream: &TcpStream) -> std::io::Result<()> {
        stream.set_nodelay(self.nodelay)?;

        if self.keepalive_secs > 0 {
            let socket = socket2::SockRef::from(stream);
            let keepalive = socket2::TcpKeepalive::new()
                .with_time(Duration::from_secs(self.keepalive_secs))
                .with_interval(Duration::from_secs(self.keepalive_interval));
            socket.set_tcp_keepalive(&keepalive)?;
        }

        Ok(())
    }
}
