//! Server configuration

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::report::Currency;

pub const ENV_HOST: &str = "CAPITAL_PROJECTION_HOST";
pub const ENV_PORT: &str = "CAPITAL_PROJECTION_PORT";
pub const ENV_LOG: &str = "CAPITAL_PROJECTION_LOG";
pub const ENV_CURRENCY: &str = "CAPITAL_PROJECTION_CURRENCY";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// HTTP port
    #[serde(default = "default_port")]
    pub port: u16,

    /// `tracing_subscriber::EnvFilter` directive, e.g. `info` or `capital_projection=debug`
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Currency used for display strings when a request names none
    #[serde(default)]
    pub default_currency: Currency,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ServerConfig {
    /// Load configuration from environment variables, keeping defaults for unset ones
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(host) = lookup(ENV_HOST) {
            config.host = host
                .trim()
                .parse()
                .with_context(|| format!("{ENV_HOST} must be an IP address, got `{host}`"))?;
        }
        if let Some(port) = lookup(ENV_PORT) {
            config.port = port
                .trim()
                .parse()
                .with_context(|| format!("{ENV_PORT} must be a port number, got `{port}`"))?;
        }
        if let Some(level) = lookup(ENV_LOG) {
            config.log_level = level;
        }
        if let Some(code) = lookup(ENV_CURRENCY) {
            config.default_currency = code
                .parse()
                .with_context(|| format!("{ENV_CURRENCY} is not a supported currency"))?;
        }

        Ok(config)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            default_currency: Currency::default(),
        }
    }
}
