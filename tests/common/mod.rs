//! Test utilities for Socksrelay
//!
//! This module provides common test utilities used across integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use socksrelay::net::SocketOpts;
use socksrelay::socks::{Resolver, SessionContext};
use socksrelay::Server;
use std::collections::HashMap;
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Resolver answering from a fixed table
#[derive(Debug, Default)]
pub struct StaticResolver {
    hosts: HashMap<String, Ipv4Addr>,
}

impl StaticResolver {
    /// Create an empty resolver
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a host entry
    pub fn host(mut self, name: &str, ip: Ipv4Addr) -> Self {
        self.hosts.insert(name.to_string(), ip);
        self
    }
}

#[async_trait]
impl Resolver for StaticResolver {
    async fn lookup_ipv4(&self, host: &str) -> io::Result<Ipv4Addr> {
        self.hosts
            .get(host)
            .copied()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("unknown host {}", host)))
    }
}

/// A proxy running on a loopback port
pub struct TestProxy {
    /// Address clients connect to
    pub addr: SocketAddr,
    shutdown_tx: broadcast::Sender<bool>,
    handle: JoinHandle<anyhow::Result<()>>,
}

impl TestProxy {
    /// Start a proxy using the given resolver for RESOLVE
    pub async fn start(resolver: StaticResolver) -> Self {
        let ctx = SessionContext {
            connect_timeout: Duration::from_secs(2),
            resolve_timeout: Duration::from_secs(2),
            ..SessionContext::default()
        }
        .with_resolver(Arc::new(resolver));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let server = Server::from_listener(listener, ctx, SocketOpts::default());
        let addr = server.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let handle = tokio::spawn(server.run(shutdown_rx));

        TestProxy {
            addr,
            shutdown_tx,
            handle,
        }
    }

    /// Open a client connection and complete method negotiation
    pub async fn greeted_client(&self) -> TcpStream {
        let mut client = TcpStream::connect(self.addr).await.unwrap();
        client.write_all(&socks5_mock::greeting(&[0x00])).await.unwrap();
        let mut reply = [0u8; 2];
        client.read_exact(&mut reply).await.unwrap();
        assert_eq!(reply, [0x05, 0x00]);
        client
    }

    /// Stop the accept loop and wait for it
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        self.handle.await.unwrap().unwrap();
    }
}

/// Create a test TCP listener on an available port
pub async fn create_test_listener() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

/// An address with nothing listening on it
pub async fn refused_addr() -> SocketAddr {
    let (listener, addr) = create_test_listener().await;
    drop(listener);
    addr
}

/// Read until EOF, failing the test if it takes too long
pub async fn read_to_eof(stream: &mut TcpStream) -> Vec<u8> {
    let mut out = Vec::new();
    tokio::time::timeout(Duration::from_secs(2), stream.read_to_end(&mut out))
        .await
        .expect("timed out waiting for EOF")
        .unwrap();
    out
}

/// SOCKS5 wire messages
pub mod socks5_mock {
    use socksrelay::socks::*;

    /// Method selection request offering `methods`
    pub fn greeting(methods: &[u8]) -> Vec<u8> {
        let mut msg = vec![SOCKS5_VERSION, methods.len() as u8];
        msg.extend_from_slice(methods);
        msg
    }

    /// Request with an IPv4 target
    pub fn request_ipv4(cmd: u8, ip: [u8; 4], port: u16) -> Vec<u8> {
        let mut msg = vec![SOCKS5_VERSION, cmd, SOCKS5_RESERVED, SOCKS5_ADDR_TYPE_IPV4];
        msg.extend_from_slice(&ip);
        msg.extend_from_slice(&port.to_be_bytes());
        msg
    }

    /// Request with a domain-name target
    pub fn request_domain(cmd: u8, domain: &str, port: u16) -> Vec<u8> {
        let mut msg = vec![
            SOCKS5_VERSION,
            cmd,
            SOCKS5_RESERVED,
            SOCKS5_ADDR_TYPE_DOMAIN,
            domain.len() as u8,
        ];
        msg.extend_from_slice(domain.as_bytes());
        msg.extend_from_slice(&port.to_be_bytes());
        msg
    }

    /// CONNECT to an IPv4 target
    pub fn connect_ipv4(ip: [u8; 4], port: u16) -> Vec<u8> {
        request_ipv4(SOCKS5_CMD_TCP_CONNECT, ip, port)
    }

    /// CONNECT to a domain-name target
    pub fn connect_domain(domain: &str, port: u16) -> Vec<u8> {
        request_domain(SOCKS5_CMD_TCP_CONNECT, domain, port)
    }

    /// RESOLVE a domain name
    pub fn resolve_domain(domain: &str) -> Vec<u8> {
        request_domain(SOCKS5_CMD_RESOLVE, domain, 0)
    }

    /// General failure reply
    pub const GENERAL_FAILURE: [u8; 10] = [0x05, 0x01, 0x00, 0x01, 0, 0, 0, 0, 0, 0];

    /// Command not supported reply
    pub const COMMAND_NOT_SUPPORTED: [u8; 10] = [0x05, 0x07, 0x00, 0x01, 0, 0, 0, 0, 0, 0];
}
