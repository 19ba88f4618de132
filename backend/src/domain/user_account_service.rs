//! Account use-cases: registration, login, token refresh and authorization.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info, warn};

use super::ports::{
    AccountService, CredentialHasher, CredentialHasherError, TokenService, TokenServiceError,
    UserPersistenceError, UserRepository,
};
use super::{
    AuthenticatedSession, Error, LoginCredentials, Registration, TokenKind, TokenPair, User,
    UserAccount, UserId,
};

const DUPLICATE_ACCOUNT_MESSAGE: &str =
    "Username or email already exists. Please choose a different one.";
const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid username or password";

/// Account service over a user repository, hasher and token signer.
pub struct UserAccountService<U> {
    users: Arc<U>,
    hasher: Arc<dyn CredentialHasher>,
    tokens: Arc<dyn TokenService>,
    clock: Arc<dyn Clock>,
}

impl<U> UserAccountService<U> {
    /// Build the service.
    pub fn new(
        users: Arc<U>,
        hasher: Arc<dyn CredentialHasher>,
        tokens: Arc<dyn TokenService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            clock,
        }
    }

    fn issue(&self, user_id: &UserId, kind: TokenKind) -> Result<String, Error> {
        self.tokens
            .issue(user_id, kind, self.clock.utc())
            .map_err(|error| {
                warn!(%error, kind = kind.as_str(), "token signing failed");
                Error::internal(format!("token signing failed: {error}"))
            })
    }

    fn issue_pair(&self, user_id: &UserId) -> Result<TokenPair, Error> {
        Ok(TokenPair {
            access_token: self.issue(user_id, TokenKind::Access)?,
            refresh_token: self.issue(user_id, TokenKind::Refresh)?,
        })
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    debug!(%error, "user repository failure");
    match error {
        UserPersistenceError::Connection { .. } => {
            Error::service_unavailable("account store is unavailable")
        }
        UserPersistenceError::Duplicate { field } => Error::invalid_request(
            DUPLICATE_ACCOUNT_MESSAGE,
        )
        .with_details(json!({ "field": field, "code": "duplicate" })),
        UserPersistenceError::Query { message } => {
            Error::internal(format!("account store error: {message}"))
        }
    }
}

fn map_hasher_error(error: CredentialHasherError) -> Error {
    warn!(%error, "password hashing failure");
    Error::internal(error.to_string())
}

/// Convert a token verification failure into an authorization error.
pub fn map_token_error(error: &TokenServiceError) -> Error {
    let message = match error {
        TokenServiceError::Expired => "Token has expired",
        TokenServiceError::WrongType { .. } => "Wrong token type",
        TokenServiceError::Invalid { .. } | TokenServiceError::Signing { .. } => "Invalid token",
    };
    Error::unauthorized(message).with_details(json!({ "code": error.detail_code() }))
}

#[async_trait]
impl<U> AccountService for UserAccountService<U>
where
    U: UserRepository,
{
    async fn register(&self, registration: Registration) -> Result<AuthenticatedSession, Error> {
        let taken = self
            .users
            .exists(registration.username(), registration.email())
            .await
            .map_err(map_user_error)?;
        if taken {
            return Err(Error::invalid_request(DUPLICATE_ACCOUNT_MESSAGE)
                .with_details(json!({ "code": "duplicate" })));
        }

        let password_digest = self
            .hasher
            .hash(registration.password())
            .map_err(map_hasher_error)?;
        let account = UserAccount {
            user: User {
                id: UserId::random(),
                username: registration.username().clone(),
                email: registration.email().clone(),
            },
            password_digest,
            created_at: self.clock.utc(),
        };
        self.users.insert(&account).await.map_err(map_user_error)?;

        let tokens = self.issue_pair(&account.user.id)?;
        info!(user_id = %account.user.id, "account registered");
        Ok(AuthenticatedSession {
            user: account.user,
            tokens,
        })
    }

    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthenticatedSession, Error> {
        let account = self
            .users
            .find_by_username(credentials.username())
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized(INVALID_CREDENTIALS_MESSAGE))?;

        let matches = self
            .hasher
            .verify(credentials.password(), &account.password_digest)
            .map_err(map_hasher_error)?;
        if !matches {
            return Err(Error::unauthorized(INVALID_CREDENTIALS_MESSAGE));
        }

        let tokens = self.issue_pair(&account.user.id)?;
        info!(user_id = %account.user.id, "user logged in");
        Ok(AuthenticatedSession {
            user: account.user,
            tokens,
        })
    }

    async fn refresh(&self, refresh_token: &str) -> Result<String, Error> {
        let user_id = self
            .tokens
            .verify(refresh_token, TokenKind::Refresh)
            .map_err(|error| map_token_error(&error))?;

        let account = self
            .users
            .find_by_id(&user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("User not found"))?;

        let access_token = self.issue(&account.user.id, TokenKind::Access)?;
        debug!(user_id = %account.user.id, "access token refreshed");
        Ok(access_token)
    }

    fn authorize(&self, access_token: &str) -> Result<UserId, Error> {
        self.tokens
            .verify(access_token, TokenKind::Access)
            .map_err(|error| map_token_error(&error))
    }
}
