// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values and the
//! [`Config`] loaded from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Gateway bind address | `0.0.0.0` |
//! | `PORT` | Gateway bind port | `3000` |
//! | `ADMIN_API_URL` | Exchange backend base URL | `https://wasit-backend.onrender.com` |
//! | `ADMIN_GATEWAY_URL` | Gateway URL used by the client facade | `http://localhost:3000` |
//! | `CORS_ALLOWED_ORIGINS` | Comma-separated origin allow-list | dashboard deployments + localhost |
//! | `REQUEST_TIMEOUT_SECS` | Outbound request timeout | `15` |
//! | `CREDENTIALS_DIR` | Directory holding the persisted admin token | `.wasit-admin` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | PEM files; both set enables HTTPS | unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::{env, net::SocketAddr, path::PathBuf, time::Duration};

use thiserror::Error;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const BACKEND_URL_ENV: &str = "ADMIN_API_URL";
pub const GATEWAY_URL_ENV: &str = "ADMIN_GATEWAY_URL";
pub const CORS_ORIGINS_ENV: &str = "CORS_ALLOWED_ORIGINS";
pub const REQUEST_TIMEOUT_ENV: &str = "REQUEST_TIMEOUT_SECS";
pub const CREDENTIALS_DIR_ENV: &str = "CREDENTIALS_DIR";
pub const TLS_CERT_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Backend used when `ADMIN_API_URL` is not set.
pub const DEFAULT_BACKEND_URL: &str = "https://wasit-backend.onrender.com";

/// Gateway the client facade talks to when `ADMIN_GATEWAY_URL` is not set.
pub const DEFAULT_GATEWAY_URL: &str = "http://localhost:3000";

pub const DEFAULT_PORT: u16 = 3000;

/// Outbound timeout shared by the gateway forwarder and the client facade.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Origins allowed to call the gateway with credentials.
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "https://admin-snowy-iota.vercel.app",
    "https://admin-11d4m5t4j-wasit2003s-projects.vercel.app",
    "http://localhost:3000",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
    #[error("{0} and {1} must be set together")]
    Incomplete(&'static str, &'static str),
}

/// Log output format selected by `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Gateway configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub backend_url: String,
    pub allowed_origins: Vec<String>,
    pub request_timeout: Duration,
    pub tls: Option<TlsPaths>,
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env_or_default(HOST_ENV, "0.0.0.0");
        let port = match env_optional(PORT_ENV) {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: PORT_ENV,
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };
        let bind_address: SocketAddr =
            format!("{host}:{port}")
                .parse()
                .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                    name: HOST_ENV,
                    reason: e.to_string(),
                })?;

        let backend_url = env_or_default(BACKEND_URL_ENV, DEFAULT_BACKEND_URL);
        url::Url::parse(&backend_url).map_err(|e| ConfigError::Invalid {
            name: BACKEND_URL_ENV,
            reason: e.to_string(),
        })?;

        let allowed_origins = match env_optional(CORS_ORIGINS_ENV) {
            Some(raw) => validate_origins(parse_origins(&raw))?,
            None => DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        let tls = match (env_optional(TLS_CERT_ENV), env_optional(TLS_KEY_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::Incomplete(TLS_CERT_ENV, TLS_KEY_ENV)),
        };

        Ok(Self {
            bind_address,
            backend_url,
            allowed_origins,
            request_timeout: request_timeout_from_env()?,
            tls,
            log_format: log_format_from_env(),
        })
    }
}

/// Outbound request timeout from `REQUEST_TIMEOUT_SECS`.
pub fn request_timeout_from_env() -> Result<Duration, ConfigError> {
    match env_optional(REQUEST_TIMEOUT_ENV) {
        Some(raw) => raw
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| ConfigError::Invalid {
                name: REQUEST_TIMEOUT_ENV,
                reason: e.to_string(),
            }),
        None => Ok(DEFAULT_REQUEST_TIMEOUT),
    }
}

pub fn log_format_from_env() -> LogFormat {
    match env_optional(LOG_FORMAT_ENV).as_deref() {
        Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
        _ => LogFormat::Pretty,
    }
}

/// Directory the file-backed credential store writes into.
pub fn credentials_dir_from_env() -> PathBuf {
    env_or_default(CREDENTIALS_DIR_ENV, ".wasit-admin").into()
}

pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().trim_end_matches('/').to_string())
        .filter(|o| !o.is_empty())
        .collect()
}

/// Credentialed CORS cannot use a wildcard origin.
pub fn validate_origins(origins: Vec<String>) -> Result<Vec<String>, ConfigError> {
    if origins.iter().any(|o| o == "*") {
        return Err(ConfigError::Invalid {
            name: CORS_ORIGINS_ENV,
            reason: "wildcard origin is not allowed with credentials; list origins explicitly"
                .to_string(),
        });
    }
    Ok(origins)
}

pub(crate) fn env_optional(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn env_or_default(name: &str, default: &str) -> String {
    env_optional(name).unwrap_or_else(|| default.to_string())
}
