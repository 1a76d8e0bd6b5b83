//! Configuration module for Socksrelay
//!
//! This module provides configuration types and parsing for the server.

mod server;

pub use server::{Config, ServerConfig, TcpConfig};

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

    parse_config(&content)
}

/// Parse configuration from a TOML string
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config =
        toml::from_str(content).with_context(|| "Failed to parse configuration")?;
    config
        .server
        .validate()
        .with_context(|| "Invalid configuration")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_empty_config() {
        let config = parse_config("").unwrap();
        assert_eq!(config.server.listen_addr, "0.0.0.0:9050");
        assert_eq!(config.server.connect_timeout, 10);
    }

    #[test]
    fn test_parse_full_config() {
        let config_str = r#"
[server]
listen_addr = "127.0.0.1:1080"
connect_timeout = 5
resolve_timeout = 3

[server.tcp]
nodelay = false
keepalive_secs = 30
keepalive_interval = 10
"#;

        let config = parse_config(config_str).unwrap();
        assert_eq!(config.server.listen_addr, "127.0.0.1:1080");
        assert_eq!(config.server.connect_timeout, 5);
        assert_eq!(config.server.resolve_timeout, 3);
        assert!(!config.server.tcp.nodelay);
        assert_eq!(config.server.tcp.keepalive_secs, 30);
        assert_eq!(config.server.tcp.keepalive_interval, 10);
    }

    #[test]
    fn test_parse_invalid_config() {
        let config_str = r#"
[server]
connect_timeout = 0
"#;
        assert!(parse_config(config_str).is_err());
        assert!(parse_config("[server]\nlisten_addr = 12").is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nlisten_addr = \"127.0.0.1:9999\"").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.server.listen_addr, "127.0.0.1:9999");
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("/nonexistent/socksrelay.toml");
        assert!(result.is_err());
    }
}
