//! Driving port for registration, login and token handling.

use async_trait::async_trait;

use crate::domain::{AuthenticatedSession, Error, LoginCredentials, Registration, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Create an account and sign the user in.
    async fn register(&self, registration: Registration) -> Result<AuthenticatedSession, Error>;

    /// Check credentials and issue tokens.
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthenticatedSession, Error>;

    /// Exchange a refresh token for a new access token.
    async fn refresh(&self, refresh_token: &str) -> Result<String, Error>;

    /// Resolve the user behind an access token.
    fn authorize(&self, access_token: &str) -> Result<UserId, Error>;
}
