//! Command line and runtime configuration

use clap::Parser;
use fms_core::{Error, Result};
use std::time::Duration;
use url::Url;

#[derive(Parser, Debug, Clone)]
#[command(name = "fms-dashboard", about = "Live dashboard and control client for the FMS backend")]
pub struct Cli {
    /// Backend host (and port) serving the admin WebSocket
    #[arg(long, default_value = "localhost:8080")]
    pub host: String,
    /// WebSocket path on the backend
    #[arg(long, default_value = "/ws")]
    pub path: String,
    /// Use wss:// instead of ws://
    #[arg(long, default_value_t = false)]
    pub secure: bool,
    /// Latency ping period in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub ping_interval_ms: u64,
    /// Delay before reconnecting after a drop, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub reconnect_delay_ms: u64,
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub endpoint: Url,
    pub ping_interval: Duration,
    pub reconnect_delay: Duration,
}

impl DashboardConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        if cli.ping_interval_ms == 0 {
            return Err(Error::InvalidConfig("ping interval must be > 0".to_string()));
        }
        if cli.reconnect_delay_ms == 0 {
            return Err(Error::InvalidConfig("reconnect delay must be > 0".to_string()));
        }

        Ok(Self {
            endpoint: endpoint_url(&cli.host, &cli.path, cli.secure)?,
            ping_interval: Duration::from_millis(cli.ping_interval_ms),
            reconnect_delay: Duration::from_millis(cli.reconnect_delay_ms),
        })
    }
}

/// Build `ws://<host><path>` and make sure it parses
pub fn endpoint_url(host: &str, path: &str, secure: bool) -> Result<Url> {
    let host = host.trim().trim_end_matches('/');
    if host.is_empty() {
        return Err(Error::InvalidConfig("host must not be empty".to_string()));
    }
    if host.contains("://") {
        return Err(Error::InvalidConfig(format!(
            "host should not include a scheme: {}",
            host
        )));
    }

    let scheme = if secure { "wss" } else { "ws" };
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };

    let url = Url::parse(&format!("{}://{}{}", scheme, host, path))
        .map_err(|e| Error::InvalidConfig(format!("invalid endpoint: {}", e)))?;
    if url.host_str().is_none() {
        return Err(Error::InvalidConfig(format!("endpoint has no host: {}", url)));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("fms-dashboard").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::from_cli(&cli(&[])).unwrap();
        assert_eq!(config.endpoint.as_str(), "ws://localhost:8080/ws");
        assert_eq!(config.ping_interval, Duration::from_secs(1));
        assert_eq!(config.reconnect_delay, Duration::from_secs(1));
    }

    #[test]
    fn test_secure_and_custom_path() {
        let config =
            DashboardConfig::from_cli(&cli(&["--host", "fms.event.org", "--path", "admin/ws", "--secure"]))
                .unwrap();
        assert_eq!(config.endpoint.as_str(), "wss://fms.event.org/admin/ws");
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(endpoint_url("", "/ws", false).is_err());
        assert!(endpoint_url("http://fms", "/ws", false).is_err());
        assert!(DashboardConfig::from_cli(&cli(&["--ping-interval-ms", "0"])).is_err());
        assert!(DashboardConfig::from_cli(&cli(&["--reconnect-delay-ms", "0"])).is_err());
    }
}
