//! Ticket lifecycle API handlers.
//!
//! ```text
//! POST /api/ticket/new {"ticket_type":"W"}
//! POST /api/ticket/cancel {"ticket_number":"20250411-W-001"}
//! POST /api/ticket/valid {"ticket_number":"20250411-W-001"}
//! GET /api/ticket/list?date=2025-04-11&status=pending
//! POST /api/ticket/{id}/serve {"teller_id":"..."}
//! PUT /api/ticket/{id}/complete
//! GET /api/tickets/{id}/auto-assign
//! ```

use actix_web::{HttpResponse, get, post, put, route, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::AutoAssignResult;
use crate::domain::{
    Error, TellerId, TellerValidationError, TicketId, TicketListRequest, TicketNumber, TicketType,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::tickets_dto::{TellerDto, TicketDto};
use crate::inbound::http::validation::{
    TELLER_ID, TICKET_NUMBER, TICKET_TYPE, ValidationCode, field_error, require_field,
    ticket_input_error,
};

const STATUS_OK: &str = "ok";

/// Request body for `POST /api/ticket/new`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct NewTicketRequest {
    #[schema(example = "W")]
    pub ticket_type: Option<String>,
}

/// Request body naming a ticket by its number.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct TicketNumberRequest {
    #[schema(example = "20250411-W-001")]
    pub ticket_number: Option<String>,
}

/// Request body for `POST /api/ticket/{id}/serve`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ServeTicketRequest {
    pub teller_id: Option<String>,
}

/// Query parameters for `GET /api/ticket/list`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TicketListQuery {
    /// Calendar day as `YYYY-MM-DD`; defaults to today.
    pub date: Option<String>,
    /// `pending` or `served`.
    pub status: Option<String>,
}

/// Response body for ticket creation.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedTicketResponse {
    pub ticket: TicketDto,
    pub message: String,
}

/// Plain acknowledgement body.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    #[schema(example = "ok")]
    pub status: String,
    pub message: String,
}

/// Tickets issued on one day.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketListResponse {
    pub status: String,
    pub message: String,
    #[schema(example = "2025-04-11")]
    pub date: String,
    pub total_tickets: usize,
    pub tickets: Vec<TicketDto>,
}

/// Response body for a served ticket.
#[derive(Debug, Serialize, ToSchema)]
pub struct ServedTicketResponse {
    pub status: String,
    pub message: String,
    pub ticket: TicketDto,
}

/// Ticket paired with the teller handling it.
#[derive(Debug, Serialize, ToSchema)]
pub struct AssignmentResponse {
    pub message: String,
    pub ticket: TicketDto,
    pub teller: TellerDto,
}

fn parse_ticket_number(raw: Option<String>) -> Result<TicketNumber, Error> {
    let value = require_field(raw, TICKET_NUMBER, "Ticket number is required")?;
    TicketNumber::new(value).map_err(|err| ticket_input_error(&err))
}

/// Unknown ids in the path behave like missing tickets.
fn parse_path_ticket_id(raw: &str) -> Result<TicketId, Error> {
    TicketId::new(raw).map_err(|_| Error::not_found("Ticket not found"))
}

fn parse_teller_id(raw: Option<String>) -> Result<TellerId, Error> {
    let value = require_field(raw, TELLER_ID, "Teller ID is required")?;
    TellerId::new(&value).map_err(|err| match err {
        TellerValidationError::EmptyId => {
            field_error(TELLER_ID, ValidationCode::MissingField, "Teller ID is required")
        }
        TellerValidationError::InvalidId => Error::not_found("Teller not found"),
    })
}

/// Issue a ticket for the requested service.
#[utoipa::path(
    post,
    path = "/api/ticket/new",
    request_body = NewTicketRequest,
    responses(
        (status = 201, description = "Ticket issued", body = CreatedTicketResponse),
        (status = 400, description = "Missing or unknown ticket type", body = Error),
        (status = 503, description = "Ticket store unavailable", body = Error)
    ),
    tags = ["tickets"],
    operation_id = "createTicket",
    security([])
)]
#[post("/ticket/new")]
pub async fn create_ticket(
    state: web::Data<HttpState>,
    payload: web::Json<NewTicketRequest>,
) -> ApiResult<HttpResponse> {
    let raw = require_field(
        payload.into_inner().ticket_type,
        TICKET_TYPE,
        "Ticket type is required",
    )?;
    let ticket_type = raw.parse::<TicketType>().map_err(|err| ticket_input_error(&err))?;
    let ticket = state.tickets.create(ticket_type).await?;

    Ok(HttpResponse::Created().json(CreatedTicketResponse {
        ticket: TicketDto::new(&ticket, None),
        message: "Ticket created successfully".to_owned(),
    }))
}

/// Cancel a ticket, releasing its teller when service has not finished.
#[utoipa::path(
    post,
    path = "/api/ticket/cancel",
    request_body = TicketNumberRequest,
    responses(
        (status = 200, description = "Ticket cancelled", body = StatusResponse),
        (status = 400, description = "Missing ticket number", body = Error),
        (status = 404, description = "Ticket not found", body = Error)
    ),
    tags = ["tickets"],
    operation_id = "cancelTicket",
    security([])
)]
#[route("/ticket/cancel", method = "POST", method = "DELETE")]
pub async fn cancel_ticket(
    state: web::Data<HttpState>,
    payload: web::Json<TicketNumberRequest>,
) -> ApiResult<web::Json<StatusResponse>> {
    let ticket_number = parse_ticket_number(payload.into_inner().ticket_number)?;
    state.tickets.cancel(&ticket_number).await?;

    Ok(web::Json(StatusResponse {
        status: STATUS_OK.to_owned(),
        message: "Ticket cancelled successfully".to_owned(),
    }))
}

/// Check that a ticket may still be called.
#[utoipa::path(
    post,
    path = "/api/ticket/valid",
    request_body = TicketNumberRequest,
    responses(
        (status = 200, description = "Ticket is valid", body = StatusResponse),
        (status = 400, description = "Expired, already served or malformed", body = Error),
        (status = 404, description = "Ticket not found", body = Error),
        (status = 409, description = "Ticket was cancelled", body = Error)
    ),
    tags = ["tickets"],
    operation_id = "validateTicket",
    security([])
)]
#[post("/ticket/valid")]
pub async fn validate_ticket(
    state: web::Data<HttpState>,
    payload: web::Json<TicketNumberRequest>,
) -> ApiResult<web::Json<StatusResponse>> {
    let ticket_number = parse_ticket_number(payload.into_inner().ticket_number)?;
    state.tickets_query.validate(&ticket_number).await?;

    Ok(web::Json(StatusResponse {
        status: STATUS_OK.to_owned(),
        message: "Ticket is valid".to_owned(),
    }))
}

/// List the tickets issued on one day.
#[utoipa::path(
    get,
    path = "/api/ticket/list",
    params(TicketListQuery),
    responses(
        (status = 200, description = "Tickets for the day", body = TicketListResponse),
        (status = 400, description = "Invalid date or status", body = Error),
        (status = 401, description = "Missing or invalid access token", body = Error)
    ),
    tags = ["tickets"],
    operation_id = "listTickets"
)]
#[get("/ticket/list")]
pub async fn list_tickets(
    state: web::Data<HttpState>,
    _user: AuthenticatedUser,
    query: web::Query<TicketListQuery>,
) -> ApiResult<web::Json<TicketListResponse>> {
    let TicketListQuery { date, status } = query.into_inner();
    let request = TicketListRequest::parse(date.as_deref(), status.as_deref())
        .map_err(|err| ticket_input_error(&err))?;
    let listing = state.tickets_query.list(&request).await?;
    let tickets: Vec<TicketDto> = listing.tickets.iter().map(TicketDto::from).collect();

    Ok(web::Json(TicketListResponse {
        status: STATUS_OK.to_owned(),
        message: "Ticket list retrieved successfully".to_owned(),
        date: listing.date.format("%Y-%m-%d").to_string(),
        total_tickets: tickets.len(),
        tickets,
    }))
}

/// Hand a waiting ticket to a specific idle teller.
#[utoipa::path(
    post,
    path = "/api/ticket/{id}/serve",
    params(("id" = String, Path, description = "Ticket identifier")),
    request_body = ServeTicketRequest,
    responses(
        (status = 200, description = "Ticket served", body = ServedTicketResponse),
        (status = 400, description = "Missing teller id or ticket already served", body = Error),
        (status = 401, description = "Missing or invalid access token", body = Error),
        (status = 404, description = "Ticket or teller not found", body = Error),
        (status = 409, description = "Teller busy or ticket cancelled", body = Error)
    ),
    tags = ["tickets"],
    operation_id = "serveTicket"
)]
#[post("/ticket/{id}/serve")]
pub async fn serve_ticket(
    state: web::Data<HttpState>,
    _user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<ServeTicketRequest>,
) -> ApiResult<web::Json<ServedTicketResponse>> {
    let teller_id = parse_teller_id(payload.into_inner().teller_id)?;
    let ticket_id = parse_path_ticket_id(&path.into_inner())?;
    let assignment = state.tickets.serve(&ticket_id, &teller_id).await?;

    Ok(web::Json(ServedTicketResponse {
        status: STATUS_OK.to_owned(),
        message: "Ticket marked as served".to_owned(),
        ticket: TicketDto::new(&assignment.ticket, Some(assignment.teller.name.as_str())),
    }))
}

/// Finish service on a ticket and free its teller.
#[utoipa::path(
    put,
    path = "/api/ticket/{id}/complete",
    params(("id" = String, Path, description = "Ticket identifier")),
    responses(
        (status = 200, description = "Service completed", body = AssignmentResponse),
        (status = 400, description = "Ticket has no teller", body = Error),
        (status = 401, description = "Missing or invalid access token", body = Error),
        (status = 404, description = "Ticket not found", body = Error),
        (status = 409, description = "Ticket was canceled", body = Error)
    ),
    tags = ["tickets"],
    operation_id = "completeTicket"
)]
#[put("/ticket/{id}/complete")]
pub async fn complete_ticket(
    state: web::Data<HttpState>,
    _user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<AssignmentResponse>> {
    let ticket_id = parse_path_ticket_id(&path.into_inner())?;
    let assignment = state.tickets.complete(&ticket_id).await?;

    Ok(web::Json(AssignmentResponse {
        message: "Ticket service completed, teller is now available".to_owned(),
        ticket: TicketDto::new(&assignment.ticket, Some(assignment.teller.name.as_str())),
        teller: TellerDto::from(&assignment.teller),
    }))
}

/// Hand a waiting ticket to any idle teller.
///
/// Answers 204 when there is nothing to assign: no idle teller, an unknown
/// ticket, or a ticket that is no longer waiting.
#[utoipa::path(
    get,
    path = "/api/tickets/{id}/auto-assign",
    params(("id" = String, Path, description = "Ticket identifier")),
    responses(
        (status = 200, description = "Ticket assigned", body = AssignmentResponse),
        (status = 204, description = "Nothing to assign")
    ),
    tags = ["tickets"],
    operation_id = "autoAssignTicket",
    security([])
)]
#[get("/tickets/{id}/auto-assign")]
pub async fn auto_assign_ticket(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let Ok(ticket_id) = TicketId::new(path.into_inner()) else {
        return Ok(HttpResponse::NoContent().finish());
    };

    match state.tickets.auto_assign(&ticket_id).await? {
        AutoAssignResult::Assigned(assignment) => Ok(HttpResponse::Ok().json(AssignmentResponse {
            message: "Ticket has been assigned Teller".to_owned(),
            ticket: TicketDto::new(&assignment.ticket, Some(assignment.teller.name.as_str())),
            teller: TellerDto::from(&assignment.teller),
        })),
        AutoAssignResult::NothingToDo => Ok(HttpResponse::NoContent().finish()),
    }
}

#[cfg(test)]
#[path = "tickets_tests.rs"]
mod tests;
