//! Environment-driven server configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use thiserror::Error;

pub const DEFAULT_PORT: u16 = 3731;
const DEFAULT_CRUNCHY_REST_URL: &str = "http://127.0.0.1:8001";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub crunchy_rest_url: String,
    pub notion_token: String,
    pub notion_database_id: Option<String>,
}

impl Config {
    /// Read configuration from the environment. Call after `dotenvy::dotenv`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = match std::env::var("HOST") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "HOST",
                value: raw,
            })?,
            Err(_) => IpAddr::V4(Ipv4Addr::LOCALHOST),
        };
        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: raw,
            })?,
            Err(_) => DEFAULT_PORT,
        };
        let crunchy_rest_url = std::env::var("CRUNCHY_REST_URL")
            .unwrap_or_else(|_| DEFAULT_CRUNCHY_REST_URL.to_string());
        let notion_token = std::env::var("NOTION_CLIENT_SECRET")
            .map_err(|_| ConfigError::Missing("NOTION_CLIENT_SECRET"))?;
        let notion_database_id = std::env::var("NOTION_DATABASE_ID")
            .ok()
            .filter(|id| !id.is_empty());

        Ok(Self {
            host,
            port,
            crunchy_rest_url,
            notion_token,
            notion_database_id,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
