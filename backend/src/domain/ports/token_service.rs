//! Port for issuing and verifying signed bearer tokens.

use chrono::{DateTime, Utc};

use crate::domain::{TokenKind, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by token adapters.
    pub enum TokenServiceError {
        /// The token's expiry has passed.
        Expired => "token has expired",
        /// The token is malformed or its signature does not verify.
        Invalid { message: String } => "invalid token: {message}",
        /// The token is valid but meant for another purpose.
        WrongType { expected: String } => "expected a {expected} token",
        /// Signing a new token failed.
        Signing { message: String } => "token signing failed: {message}",
    }
}

impl TokenServiceError {
    /// Machine-readable detail code reported to clients.
    #[must_use]
    pub const fn detail_code(&self) -> &'static str {
        match self {
            Self::Expired => "token_expired",
            Self::WrongType { .. } => "wrong_token_type",
            Self::Invalid { .. } | Self::Signing { .. } => "invalid_token",
        }
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    /// Sign a token of `kind` for `user_id`, valid from `issued_at`.
    fn issue(
        &self,
        user_id: &UserId,
        kind: TokenKind,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenServiceError>;

    /// Verify `token` and return its subject when it is a `expected` token.
    fn verify(&self, token: &str, expected: TokenKind) -> Result<UserId, TokenServiceError>;
}
