//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every queue, teller, account and health endpoint, the
//! shared error envelope, and the bearer token scheme used by staff routes.
//! Swagger UI serves it in debug builds.

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::accounts::{
    LoginRequest, RefreshResponse, RegisterRequest, SessionResponse, UserDto,
};
use crate::inbound::http::tellers::TellerListResponse;
use crate::inbound::http::tickets::{
    AssignmentResponse, CreatedTicketResponse, NewTicketRequest, ServeTicketRequest,
    ServedTicketResponse, StatusResponse, TicketListResponse, TicketNumberRequest,
};
use crate::inbound::http::tickets_dto::{TellerDto, TicketDto};
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Name of the bearer security scheme referenced by protected paths.
pub const BEARER_SCHEME: &str = "BearerAuth";

/// Add the JWT bearer scheme to the generated document.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        let mut scheme = Http::new(HttpAuthScheme::Bearer);
        scheme.bearer_format = Some("JWT".to_owned());
        scheme.description = Some("Access token issued by POST /api/login.".to_owned());
        components.add_security_scheme(BEARER_SCHEME, SecurityScheme::Http(scheme));
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Bank queue management API",
        description = "Ticket issuing, teller assignment and staff authentication for a bank branch queue."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        crate::inbound::http::accounts::register,
        crate::inbound::http::accounts::login,
        crate::inbound::http::accounts::refresh,
        crate::inbound::http::tickets::create_ticket,
        crate::inbound::http::tickets::cancel_ticket,
        crate::inbound::http::tickets::validate_ticket,
        crate::inbound::http::tickets::list_tickets,
        crate::inbound::http::tickets::serve_ticket,
        crate::inbound::http::tickets::complete_ticket,
        crate::inbound::http::tickets::auto_assign_ticket,
        crate::inbound::http::tellers::list_tellers,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        TicketDto,
        TellerDto,
        NewTicketRequest,
        TicketNumberRequest,
        ServeTicketRequest,
        CreatedTicketResponse,
        StatusResponse,
        TicketListResponse,
        ServedTicketResponse,
        AssignmentResponse,
        TellerListResponse,
        RegisterRequest,
        LoginRequest,
        SessionResponse,
        RefreshResponse,
        UserDto,
    )),
    tags(
        (name = "tickets", description = "Issuing, validating and serving queue tickets"),
        (name = "tellers", description = "Teller directory"),
        (name = "accounts", description = "Staff registration and bearer tokens"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
