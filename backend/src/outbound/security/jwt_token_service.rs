//! HS256 JSON Web Token implementation of the `TokenService` port.

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ports::{TokenService, TokenServiceError};
use crate::domain::{TokenKind, UserId};

/// Claims carried by every token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Subject: the user id.
    sub: String,
    /// `access` or `refresh`.
    typ: String,
    iat: i64,
    exp: i64,
    /// Unique token id so tokens minted in the same second differ.
    jti: String,
}

/// Signs and verifies access and refresh tokens with a shared secret.
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: TimeDelta,
    refresh_ttl: TimeDelta,
}

impl JwtTokenService {
    /// Create a service signing with `secret`.
    pub fn new(secret: &[u8], access_ttl: TimeDelta, refresh_ttl: TimeDelta) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            access_ttl,
            refresh_ttl,
        }
    }

    const fn ttl(&self, kind: TokenKind) -> TimeDelta {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.leeway = 0;
        validation
    }
}

impl std::fmt::Debug for JwtTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtTokenService")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService for JwtTokenService {
    fn issue(
        &self,
        user_id: &UserId,
        kind: TokenKind,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenServiceError> {
        let expires_at = issued_at
            .checked_add_signed(self.ttl(kind))
            .ok_or_else(|| TokenServiceError::signing("token lifetime overflows"))?;
        let claims = Claims {
            sub: user_id.to_string(),
            typ: kind.as_str().to_owned(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| TokenServiceError::signing(err.to_string()))
    }

    fn verify(&self, token: &str, expected: TokenKind) -> Result<UserId, TokenServiceError> {
        let data = decode::<Claims>(token, &self.decoding_key, &Self::validation()).map_err(
            |err| match err.kind() {
                ErrorKind::ExpiredSignature => TokenServiceError::expired(),
                _ => TokenServiceError::invalid(err.to_string()),
            },
        )?;
        let claims = data.claims;

        if claims.typ != expected.as_str() {
            return Err(TokenServiceError::wrong_type(expected.as_str()));
        }
        UserId::new(&claims.sub).map_err(|_| TokenServiceError::invalid("malformed subject"))
    }
}
