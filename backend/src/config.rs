use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use santa_core::LinkBuilder;
use thiserror::Error;
use url::Url;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:3000/";
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} is invalid: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub bind_addr: SocketAddr,
    /// Page participants open; personal links are built on top of it.
    pub links: LinkBuilder,
    pub persist_path: Option<PathBuf>,
    /// When set, pairs and wishlists live in a remote backend instead of in-process.
    pub store_url: Option<Url>,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is fine; the process environment still applies.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = value("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue {
                key: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        let base = value("PUBLIC_BASE_URL").unwrap_or_else(|| DEFAULT_PUBLIC_BASE_URL.to_string());
        let links = LinkBuilder::new(&base).map_err(|e| ConfigError::InvalidValue {
            key: "PUBLIC_BASE_URL",
            reason: e.to_string(),
        })?;

        let store_url = value("STORE_URL")
            .map(|raw| {
                let url = Url::parse(&raw).map_err(|e| ConfigError::InvalidValue {
                    key: "STORE_URL",
                    reason: e.to_string(),
                })?;
                if url.cannot_be_a_base() {
                    return Err(ConfigError::InvalidValue {
                        key: "STORE_URL",
                        reason: "must be an http(s) base url".into(),
                    });
                }
                Ok(url)
            })
            .transpose()?;

        Ok(Self {
            bind_addr,
            links,
            persist_path: value("PERSIST_PATH").map(PathBuf::from),
            store_url,
            rust_log: value("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }
}
