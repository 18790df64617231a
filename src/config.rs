use serde::{Deserialize, Serialize};
use std::{net::IpAddr, path::PathBuf};
use thiserror::Error;
use url::Url;

/// Number of hits returned per search page. Not configurable.
pub const PAGE_SIZE: u64 = 20;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?} ({reason})")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub uploads: UploadsConfig,
    pub search: SearchConfig,
    pub environment: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadsConfig {
    pub directory: PathBuf,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    pub url: Url,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub index: String,
    pub page_size: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 760,
                request_timeout_secs: 30,
            },
            uploads: UploadsConfig {
                directory: PathBuf::from("./public"),
                max_upload_bytes: 32 * 1024 * 1024,
            },
            search: SearchConfig {
                url: Url::parse("http://localhost:7700").expect("static url is valid"),
                api_key: None,
                index: "posts".to_string(),
                page_size: PAGE_SIZE,
            },
            environment: "dev".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source. Empty values
    /// are treated the same as missing ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());
        let defaults = Self::default();

        let port = match get("PORT") {
            Some(value) => parse_number("PORT", value)?,
            None => defaults.server.port,
        };

        let request_timeout_secs = match get("REQUEST_TIMEOUT_SECS") {
            Some(value) => parse_number("REQUEST_TIMEOUT_SECS", value)?,
            None => defaults.server.request_timeout_secs,
        };

        let max_upload_bytes = match get("MAX_UPLOAD_BYTES") {
            Some(value) => parse_number("MAX_UPLOAD_BYTES", value)?,
            None => defaults.uploads.max_upload_bytes,
        };

        let url = match get("SEARCH_URL") {
            Some(value) => parse_search_url(value)?,
            None => parse_search_url("localhost:7700".to_string())?,
        };

        let host = match get("HOST") {
            Some(value) => parse_host(value)?,
            None => defaults.server.host,
        };

        Ok(Self {
            server: ServerConfig {
                host,
                port,
                request_timeout_secs,
            },
            uploads: UploadsConfig {
                directory: get("UPLOADS_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.uploads.directory),
                max_upload_bytes,
            },
            search: SearchConfig {
                url,
                api_key: get("SEARCH_API_KEY"),
                index: get("SEARCH_INDEX").unwrap_or(defaults.search.index),
                page_size: PAGE_SIZE,
            },
            environment: get("ENVIRONMENT").unwrap_or(defaults.environment),
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("dev")
    }
}

fn parse_number<T>(name: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue {
            name,
            reason: e.to_string(),
            value,
        })
}

// The listener binds to an address, not a name, so hostnames are refused here
// rather than at bind time.
fn parse_host(value: String) -> Result<String, ConfigError> {
    match value.trim().parse::<IpAddr>() {
        Ok(addr) => Ok(addr.to_string()),
        Err(e) => Err(ConfigError::InvalidValue {
            name: "HOST",
            reason: e.to_string(),
            value,
        }),
    }
}

// Bare host:port values are accepted and assumed to be plain http.
fn parse_search_url(value: String) -> Result<Url, ConfigError> {
    let candidate = if value.contains("://") {
        value.clone()
    } else {
        format!("http://{}", value)
    };

    let url = Url::parse(&candidate).map_err(|e| ConfigError::InvalidValue {
        name: "SEARCH_URL",
        value: value.clone(),
        reason: e.to_string(),
    })?;

    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue {
            name: "SEARCH_URL",
            value,
            reason: "expected an http(s) base url".to_string(),
        });
    }

    Ok(url)
}
