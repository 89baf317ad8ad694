// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! once at startup into [`AppConfig`].
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `RPC_URL` | EVM JSON-RPC endpoint | Required |
//! | `CHAIN_ID` | Chain id of `RPC_URL` | `11155111` (Sepolia) |
//! | `PAYROLL_CONTRACT_ADDRESS` | Deployed payroll contract | Required |
//! | `RELAYER_URL` | Confidential-compute relayer base URL | Required |
//! | `SIGNER_KEY_PEM_PATH` | PEM file holding the signing key | One of the two signer vars |
//! | `SIGNER_PRIVATE_KEY` | Hex signing key | One of the two signer vars |
//! | `CONFIRMATION_TIMEOUT_SECS` | Max wait for a transaction receipt | `120` |
//! | `RECEIPT_POLL_INTERVAL_MS` | Receipt polling interval | `2000` |
//! | `SYNC_INTERVAL_SECS` | Background resync interval | Disabled |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::path::PathBuf;
use std::time::Duration;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const RPC_URL_ENV: &str = "RPC_URL";
pub const CHAIN_ID_ENV: &str = "CHAIN_ID";
pub const CONTRACT_ADDRESS_ENV: &str = "PAYROLL_CONTRACT_ADDRESS";
pub const RELAYER_URL_ENV: &str = "RELAYER_URL";

/// Environment variable name for the signer key PEM file.
///
/// Takes precedence over [`SIGNER_PRIVATE_KEY_ENV`] when both are set.
pub const SIGNER_KEY_PEM_PATH_ENV: &str = "SIGNER_KEY_PEM_PATH";

/// Environment variable name for a hex-encoded signer key.
///
/// Intended for local development; prefer a PEM file mounted as a secret.
pub const SIGNER_PRIVATE_KEY_ENV: &str = "SIGNER_PRIVATE_KEY";

pub const CONFIRMATION_TIMEOUT_ENV: &str = "CONFIRMATION_TIMEOUT_SECS";
pub const RECEIPT_POLL_INTERVAL_ENV: &str = "RECEIPT_POLL_INTERVAL_MS";

/// Environment variable name for the background resync interval.
///
/// # Default
/// Unset: no background resync. `0` also disables it.
pub const SYNC_INTERVAL_ENV: &str = "SYNC_INTERVAL_SECS";

pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_CHAIN_ID: u64 = 11155111;
pub const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_RECEIPT_POLL_INTERVAL_MS: u64 = 2000;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("No signer configured: set SIGNER_KEY_PEM_PATH or SIGNER_PRIVATE_KEY")]
    MissingSigner,
}

/// Where the signing key comes from.
#[derive(Clone)]
pub enum SignerSource {
    PemFile(PathBuf),
    Hex(String),
}

impl std::fmt::Debug for SignerSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignerSource::PemFile(path) => f.debug_tuple("PemFile").field(path).finish(),
            SignerSource::Hex(_) => f.write_str("Hex(<redacted>)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub rpc_url: String,
    pub chain_id: u64,
    pub contract_address: String,
    pub relayer_url: String,
    pub signer: SignerSource,
    pub confirmation_timeout: Duration,
    pub receipt_poll_interval: Duration,
    pub sync_interval: Option<Duration>,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let rpc_url = required(RPC_URL_ENV)?;
        validate_url(RPC_URL_ENV, &rpc_url)?;
        let relayer_url = required(RELAYER_URL_ENV)?;
        validate_url(RELAYER_URL_ENV, &relayer_url)?;

        let signer = match (get(SIGNER_KEY_PEM_PATH_ENV), get(SIGNER_PRIVATE_KEY_ENV)) {
            (Some(path), _) => SignerSource::PemFile(PathBuf::from(path)),
            (None, Some(hex)) => SignerSource::Hex(hex),
            (None, None) => return Err(ConfigError::MissingSigner),
        };

        let sync_secs = parse_opt::<u64>(SYNC_INTERVAL_ENV, get(SYNC_INTERVAL_ENV))?;
        let log_format = match get(LOG_FORMAT_ENV).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            host: get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_opt(PORT_ENV, get(PORT_ENV))?.unwrap_or(DEFAULT_PORT),
            rpc_url,
            chain_id: parse_opt(CHAIN_ID_ENV, get(CHAIN_ID_ENV))?.unwrap_or(DEFAULT_CHAIN_ID),
            contract_address: required(CONTRACT_ADDRESS_ENV)?,
            relayer_url,
            signer,
            confirmation_timeout: Duration::from_secs(
                parse_opt(CONFIRMATION_TIMEOUT_ENV, get(CONFIRMATION_TIMEOUT_ENV))?
                    .unwrap_or(DEFAULT_CONFIRMATION_TIMEOUT_SECS),
            ),
            receipt_poll_interval: Duration::from_millis(
                parse_opt(RECEIPT_POLL_INTERVAL_ENV, get(RECEIPT_POLL_INTERVAL_ENV))?
                    .unwrap_or(DEFAULT_RECEIPT_POLL_INTERVAL_MS),
            ),
            sync_interval: sync_secs.filter(|&s| s > 0).map(Duration::from_secs),
            log_format,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_opt<T>(name: &'static str, raw: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.map(|value| {
        value.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        })
    })
    .transpose()
}

fn validate_url(name: &'static str, raw: &str) -> Result<(), ConfigError> {
    url::Url::parse(raw).map(|_| ()).map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}
