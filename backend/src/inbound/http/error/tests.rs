//! Tests for HTTP error mapping.

use super::*;
use crate::domain::Error;
use actix_web::ResponseError;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use rstest::{fixture, rstest};
use rstest_bdd_macros::{given, then};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[fixture]
fn internal_error_case(expected_trace_id: String) -> Error {
    Error::internal("connection reset while reading tickets")
        .with_trace_id(expected_trace_id)
        .with_details(json!({"sql": "SELECT 1"}))
}

#[fixture]
fn expired_ticket_case(expected_trace_id: String) -> Error {
    Error::ticket_expired("Ticket has expired")
        .with_trace_id(expected_trace_id)
        .with_details(json!({"ticketNumber": "20250410-W-001"}))
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::ticket_expired("old"), StatusCode::BAD_REQUEST)]
#[case(Error::ticket_already_served("served"), StatusCode::BAD_REQUEST)]
#[case(Error::ticket_unassigned("no teller"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("no auth"), StatusCode::UNAUTHORIZED)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(Error::conflict("busy"), StatusCode::CONFLICT)]
#[case(Error::service_unavailable("db down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] err: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&err), status);
}

async fn assert_error_response(
    error: Error,
    expected_status: StatusCode,
    expected_trace_id: Option<&str>,
) -> Error {
    let response = ResponseError::error_response(&error);
    assert_eq!(response.status(), expected_status);

    let header = response.headers().get(TRACE_ID_HEADER);
    match expected_trace_id {
        Some(expected) => {
            let trace_id = header
                .expect("trace-id header is set by error_response")
                .to_str()
                .expect("trace-id is valid UTF-8");
            assert_eq!(trace_id, expected);
        }
        None => assert!(header.is_none(), "trace-id header should not be present"),
    }

    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");

    serde_json::from_slice(&bytes).expect("Error JSON deserialisation succeeds")
}

#[rstest]
#[actix_web::test]
async fn error_responses_include_trace_id_and_payloads(
    #[from(internal_error_case)] internal_error: Error,
    #[from(expired_ticket_case)] expired: Error,
    expected_trace_id: String,
) {
    let redacted = assert_error_response(
        internal_error,
        StatusCode::INTERNAL_SERVER_ERROR,
        Some(expected_trace_id.as_str()),
    )
    .await;
    assert_eq!(redacted.code(), ErrorCode::InternalError);
    assert_eq!(redacted.message(), "Internal server error");
    assert!(redacted.details().is_none());

    let payload = assert_error_response(
        expired,
        StatusCode::BAD_REQUEST,
        Some(expected_trace_id.as_str()),
    )
    .await;
    assert_eq!(payload.code(), ErrorCode::TicketExpired);
    assert_eq!(payload.message(), "Ticket has expired");
    assert_eq!(
        payload.details(),
        Some(&json!({"ticketNumber": "20250410-W-001"}))
    );
}

#[rstest]
#[actix_web::test]
async fn error_without_trace_id_omits_trace_header() {
    let error = Error::conflict("Teller is already serving another customer");

    let payload = assert_error_response(error, StatusCode::CONFLICT, None).await;
    assert_eq!(payload.code(), ErrorCode::Conflict);
    assert_eq!(payload.trace_id(), None);
    assert_eq!(payload.details(), None);
}

#[rstest]
#[actix_web::test]
async fn error_body_uses_snake_case_codes() {
    let response = ResponseError::error_response(&Error::ticket_already_served("served"));
    let bytes = to_bytes(response.into_body()).await.expect("body");
    let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");

    assert_eq!(body["code"], "ticket_already_served");
    assert_eq!(body["message"], "served");
}

#[given("a ticket that is not assigned to a teller")]
fn an_unassigned_ticket_error() -> Error {
    Error::ticket_unassigned("Ticket is not assigned to a teller")
}

#[then("the adapter answers 400 Bad Request")]
fn the_adapter_answers_bad_request(error: Error) {
    assert_eq!(status_for(error.code()), StatusCode::BAD_REQUEST);
}

#[given("a store failure carrying internal detail")]
fn a_store_failure() -> Error {
    Error::internal("relation \"tickets\" does not exist")
        .with_trace_id(TRACE_ID)
        .with_details(json!({"secret": true}))
}

#[then("clients see the generic internal error message")]
fn clients_see_the_generic_message(error: Error) {
    let redacted = redact_if_internal(&error);
    assert_eq!(redacted.message(), "Internal server error");
    assert_eq!(redacted.trace_id(), Some(TRACE_ID));
    assert!(redacted.details().is_none());
}

#[rstest]
fn unassigned_ticket_maps_to_bad_request() {
    let error = an_unassigned_ticket_error();
    the_adapter_answers_bad_request(error);
}

#[rstest]
fn internal_errors_are_redacted_for_clients() {
    let error = a_store_failure();
    clients_see_the_generic_message(error);
}

#[test]
fn from_actix_error_is_redacted_internal_error() {
    use actix_web::error;

    let actix_err = error::ErrorBadRequest("boom");
    let err: Error = actix_err.into();

    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.message(), "Internal server error");
    assert_eq!(err.trace_id(), None);
    assert_eq!(err.details(), None);
}
