//! Bearer token extractors used by protected handlers.
//!
//! Keep the HTTP modules focused on request/response mapping by
//! concentrating header parsing and principal resolution here. Token
//! verification itself is delegated to the [`AccountService`] port.
//!
//! [`AccountService`]: crate::domain::ports::AccountService

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, web};
use futures_util::future::{Ready, ready};
use serde_json::json;
use zeroize::Zeroizing;

use crate::domain::{Error, UserId};

use super::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// Raw token taken from an `Authorization: Bearer <token>` header.
///
/// The token is wiped from memory when the extractor is dropped.
pub struct BearerToken(Zeroizing<String>);

impl BearerToken {
    /// Borrow the raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    fn from_request_parts(req: &HttpRequest) -> Result<Self, Error> {
        let Some(value) = req.headers().get(AUTHORIZATION) else {
            return Err(Error::unauthorized("Authorization header is missing")
                .with_details(json!({ "code": "authorization_required" })));
        };
        let token = value
            .to_str()
            .ok()
            .and_then(|raw| raw.strip_prefix(BEARER_PREFIX))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                Error::unauthorized("Invalid token").with_details(json!({ "code": "invalid_token" }))
            })?;
        Ok(Self(Zeroizing::new(token.to_owned())))
    }
}

impl FromRequest for BearerToken {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::from_request_parts(req))
    }
}

/// Principal resolved from a valid access token.
///
/// # Examples
/// ```
/// use actix_web::{HttpResponse, get};
/// use bqms::inbound::http::auth::AuthenticatedUser;
///
/// #[get("/whoami")]
/// async fn whoami(user: AuthenticatedUser) -> HttpResponse {
///     HttpResponse::Ok().body(user.user_id().to_string())
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(UserId);

impl AuthenticatedUser {
    /// Identifier of the authenticated account.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let resolved = BearerToken::from_request_parts(req).and_then(|token| {
            let state = req
                .app_data::<web::Data<HttpState>>()
                .ok_or_else(|| Error::internal("HTTP state is not configured"))?;
            state.accounts.authorize(token.as_str()).map(Self)
        });
        ready(resolved)
    }
}
