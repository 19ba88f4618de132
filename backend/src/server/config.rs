//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use chrono::TimeDelta;
use rand::RngCore;
use rand::rngs::OsRng;
use tracing::warn;
use zeroize::Zeroizing;

use bqms::domain::AssignmentPolicy;
use bqms::outbound::persistence::DbPool;
use bqms::settings::{ServerSettings, SettingsError};

const EPHEMERAL_SECRET_LEN: usize = 32;

/// Token signing parameters.
pub struct TokenConfig {
    pub(crate) secret: Zeroizing<Vec<u8>>,
    pub(crate) access_ttl: TimeDelta,
    pub(crate) refresh_ttl: TimeDelta,
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) tokens: TokenConfig,
    pub(crate) policy: AssignmentPolicy,
    pub(crate) teller_seed: Vec<String>,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Interpret loaded settings. The database pool is attached separately.
    pub fn from_settings(settings: &ServerSettings) -> Result<Self, SettingsError> {
        let (access_ttl, refresh_ttl) = settings.token_ttls()?;
        let secret = settings.jwt_secret().unwrap_or_else(|| {
            warn!("BQMS_JWT_SECRET is unset; tokens will not survive a restart");
            let mut bytes = Zeroizing::new(vec![0_u8; EPHEMERAL_SECRET_LEN]);
            OsRng.fill_bytes(bytes.as_mut_slice());
            bytes
        });

        Ok(Self {
            bind_addr: settings.bind_addr()?,
            tokens: TokenConfig {
                secret,
                access_ttl,
                refresh_ttl,
            },
            policy: settings.assignment_policy()?,
            teller_seed: settings.teller_seed(),
            db_pool: None,
        })
    }

    /// Attach a database connection pool; PostgreSQL adapters replace the
    /// in-memory store when present.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
