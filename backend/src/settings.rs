//! Server settings loaded via OrthoConfig.
//!
//! Every field can be set through a `BQMS_`-prefixed environment variable,
//! a CLI flag, or a configuration file.

use std::net::SocketAddr;

use chrono::TimeDelta;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::domain::{AssignmentPolicy, DEFAULT_TELLER_NAMES, UnknownAssignmentPolicy};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_ACCESS_TTL_MINUTES: i64 = 60;
const DEFAULT_REFRESH_TTL_DAYS: i64 = 30;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address '{value}': {message}")]
    BindAddr { value: String, message: String },
    #[error(transparent)]
    AssignmentPolicy(#[from] UnknownAssignmentPolicy),
    #[error("token lifetimes must be positive")]
    TokenTtl,
}

/// Configuration values for the queue server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "BQMS")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. The in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// HMAC secret for bearer tokens. An ephemeral secret is generated when absent.
    pub jwt_secret: Option<String>,
    /// Access token lifetime in minutes.
    pub access_token_ttl_minutes: Option<i64>,
    /// Refresh token lifetime in days.
    pub refresh_token_ttl_days: Option<i64>,
    /// `random` or `least-recently-assigned`.
    pub assignment_policy: Option<String>,
    /// Insert the default tellers when the teller table is empty.
    #[ortho_config(default = true)]
    pub seed_tellers: bool,
}

impl ServerSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections.unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    /// Configured signing secret, if any.
    pub fn jwt_secret(&self) -> Option<Zeroizing<Vec<u8>>> {
        self.jwt_secret
            .as_deref()
            .filter(|secret| !secret.is_empty())
            .map(|secret| Zeroizing::new(secret.as_bytes().to_vec()))
    }

    /// Access and refresh token lifetimes.
    pub fn token_ttls(&self) -> Result<(TimeDelta, TimeDelta), SettingsError> {
        let access = self
            .access_token_ttl_minutes
            .unwrap_or(DEFAULT_ACCESS_TTL_MINUTES);
        let refresh = self.refresh_token_ttl_days.unwrap_or(DEFAULT_REFRESH_TTL_DAYS);
        match (TimeDelta::try_minutes(access), TimeDelta::try_days(refresh)) {
            (Some(access), Some(refresh)) if access > TimeDelta::zero() && refresh > TimeDelta::zero() => {
                Ok((access, refresh))
            }
            _ => Err(SettingsError::TokenTtl),
        }
    }

    pub fn assignment_policy(&self) -> Result<AssignmentPolicy, SettingsError> {
        match self.assignment_policy.as_deref() {
            Some(raw) => Ok(raw.parse()?),
            None => Ok(AssignmentPolicy::default()),
        }
    }

    /// Teller names to seed into an empty store.
    pub fn teller_seed(&self) -> Vec<String> {
        if self.seed_tellers {
            DEFAULT_TELLER_NAMES.iter().map(|name| (*name).to_owned()).collect()
        } else {
            Vec::new()
        }
    }
}
