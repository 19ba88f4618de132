//! Account API handlers.
//!
//! ```text
//! POST /api/register {"username":"clerk","password":"secret","email":"clerk@branch.example"}
//! POST /api/login {"username":"clerk","password":"secret"}
//! POST /api/refresh   (Authorization: Bearer <refresh token>)
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{AuthenticatedSession, Error, LoginCredentials, Registration, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::BearerToken;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, login_input_error, registration_input_error, require_field,
};

/// Registration request body for `POST /api/register`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
}

/// Login request body for `POST /api/login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Public view of an account.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserDto {
    pub id: String,
    pub username: String,
    pub email: String,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.to_string(),
            email: user.email.to_string(),
        }
    }
}

/// Tokens issued after registration or login.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    #[schema(example = "success")]
    pub status: String,
    pub access_token: String,
    pub refresh_token: String,
    pub message: String,
    pub user: UserDto,
}

impl SessionResponse {
    fn new(session: &AuthenticatedSession, message: &str) -> Self {
        Self {
            status: "success".to_owned(),
            access_token: session.tokens.access_token.clone(),
            refresh_token: session.tokens.refresh_token.clone(),
            message: message.to_owned(),
            user: UserDto::from(&session.user),
        }
    }
}

/// Fresh access token issued from a refresh token.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    #[schema(example = "ok")]
    pub status: String,
    pub access_token: String,
    pub message: String,
}

/// Presence check only; blank passwords are rejected by the domain types.
fn required(value: Option<String>, field: &'static str) -> Result<String, Error> {
    match value {
        Some(raw) => Ok(raw),
        None => require_field(None, FieldName::new(field), &format!("{field} is required.")),
    }
}

/// Create an account and sign the new user in.
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = SessionResponse),
        (status = 400, description = "Missing field, invalid email or duplicate account", body = Error),
        (status = 503, description = "Account store unavailable", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let RegisterRequest {
        username,
        password,
        email,
    } = payload.into_inner();
    let username = required(username, "username")?;
    let password = zeroize::Zeroizing::new(required(password, "password")?);
    let email = required(email, "email")?;
    let registration = Registration::try_from_parts(&username, &password, &email)
        .map_err(|err| registration_input_error(&err))?;

    let session = state.accounts.register(registration).await?;
    Ok(HttpResponse::Created().json(SessionResponse::new(&session, "User created successfully")))
}

/// Check credentials and issue an access/refresh token pair.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = SessionResponse),
        (status = 400, description = "Missing field", body = Error),
        (status = 401, description = "Invalid credentials", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<SessionResponse>> {
    let LoginRequest { username, password } = payload.into_inner();
    let username = required(username, "username")?;
    let password = zeroize::Zeroizing::new(required(password, "password")?);
    let credentials = LoginCredentials::try_from_parts(&username, &password)
        .map_err(|err| login_input_error(&err))?;

    let session = state.accounts.login(&credentials).await?;
    Ok(web::Json(SessionResponse::new(
        &session,
        "User logged in successfully",
    )))
}

/// Exchange a refresh token for a new access token.
#[utoipa::path(
    post,
    path = "/api/refresh",
    responses(
        (status = 200, description = "Access token refreshed", body = RefreshResponse),
        (status = 401, description = "Missing, expired or wrong-type token", body = Error),
        (status = 404, description = "User no longer exists", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "refresh"
)]
#[post("/refresh")]
pub async fn refresh(
    state: web::Data<HttpState>,
    token: BearerToken,
) -> ApiResult<web::Json<RefreshResponse>> {
    let access_token = state.accounts.refresh(token.as_str()).await?;
    Ok(web::Json(RefreshResponse {
        status: "ok".to_owned(),
        access_token,
        message: "Access token refreshed successfully".to_owned(),
    }))
}
