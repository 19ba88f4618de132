//! Teller directory handler.
//!
//! ```text
//! GET /api/tellers?active=true
//! ```

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::tickets_dto::TellerDto;

/// Query parameters for `GET /api/tellers`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TellerListQuery {
    /// `true` keeps only tellers currently serving; anything else lists all.
    pub active: Option<String>,
}

impl TellerListQuery {
    fn active_only(&self) -> bool {
        self.active
            .as_deref()
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
    }
}

/// Tellers ordered by name.
#[derive(Debug, Serialize, ToSchema)]
pub struct TellerListResponse {
    pub total: usize,
    pub tellers: Vec<TellerDto>,
}

/// List tellers, optionally only those serving a customer.
#[utoipa::path(
    get,
    path = "/api/tellers",
    params(TellerListQuery),
    responses(
        (status = 200, description = "Tellers", body = TellerListResponse),
        (status = 401, description = "Missing or invalid access token", body = Error),
        (status = 503, description = "Teller store unavailable", body = Error)
    ),
    tags = ["tellers"],
    operation_id = "listTellers"
)]
#[get("/tellers")]
pub async fn list_tellers(
    state: web::Data<HttpState>,
    _user: AuthenticatedUser,
    query: web::Query<TellerListQuery>,
) -> ApiResult<web::Json<TellerListResponse>> {
    let tellers: Vec<TellerDto> = state
        .tellers
        .list(query.active_only())
        .await?
        .iter()
        .map(TellerDto::from)
        .collect();

    Ok(web::Json(TellerListResponse {
        total: tellers.len(),
        tellers,
    }))
}
