//! Tests for ticket lifecycle HTTP handlers.

use super::*;
use crate::domain::ports::TicketRepository;
use crate::domain::{Ticket, TicketNumber};
use crate::inbound::http::test_utils::{TestQueue, bearer, business_morning, test_app};
use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use chrono::{TimeDelta, TimeZone, Utc};
use rstest::rstest;
use serde_json::{Value, json};

async fn post_json(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    uri: &str,
    body: Value,
) -> (StatusCode, Value) {
    let request = actix_test::TestRequest::post()
        .uri(uri)
        .insert_header(bearer())
        .set_json(body)
        .to_request();
    let response = actix_test::call_service(app, request).await;
    let status = response.status();
    let body = if status == StatusCode::NO_CONTENT {
        Value::Null
    } else {
        actix_test::read_body_json(response).await
    };
    (status, body)
}

async fn create(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    ticket_type: &str,
) -> Value {
    let (status, body) = post_json(app, "/api/ticket/new", json!({ "ticket_type": ticket_type })).await;
    assert_eq!(status, StatusCode::CREATED);
    body["ticket"].clone()
}

#[rstest]
#[actix_web::test]
async fn create_ticket_numbers_tickets_per_day() {
    let queue = TestQueue::at(business_morning()).await;
    let app = actix_test::init_service(test_app(queue.state.clone())).await;

    let (status, body) = post_json(&app, "/api/ticket/new", json!({ "ticket_type": "w" })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Ticket created successfully");
    assert_eq!(body["ticket"]["ticketNumber"], "20250411-W-001");
    assert_eq!(body["ticket"]["ticketType"], "Withdrawal");
    assert_eq!(body["ticket"]["status"], "pending");

    let deposit = create(&app, "D").await;
    assert_eq!(deposit["ticketNumber"], "20250411-D-002");
}

#[rstest]
#[case(json!({}), "missing_field")]
#[case(json!({ "ticket_type": "  " }), "missing_field")]
#[case(json!({ "ticket_type": "X" }), "invalid_value")]
#[actix_web::test]
async fn create_ticket_rejects_bad_types(#[case] payload: Value, #[case] code: &str) {
    let queue = TestQueue::at(business_morning()).await;
    let app = actix_test::init_service(test_app(queue.state.clone())).await;

    let (status, body) = post_json(&app, "/api/ticket/new", payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["field"], "ticket_type");
    assert_eq!(body["details"]["code"], code);
}

#[rstest]
#[actix_web::test]
async fn malformed_json_is_an_invalid_request() {
    let queue = TestQueue::at(business_morning()).await;
    let app = actix_test::init_service(test_app(queue.state.clone())).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/ticket/new")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], "invalid_request");
}

#[rstest]
#[actix_web::test]
async fn cancel_accepts_delete_and_reports_unknown_tickets() {
    let queue = TestQueue::at(business_morning()).await;
    let app = actix_test::init_service(test_app(queue.state.clone())).await;
    let ticket = create(&app, "T").await;

    let request = actix_test::TestRequest::delete()
        .uri("/api/ticket/cancel")
        .set_json(json!({ "ticket_number": ticket["ticketNumber"] }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body, json!({ "status": "ok", "message": "Ticket cancelled successfully" }));

    let (status, body) = post_json(
        &app,
        "/api/ticket/cancel",
        json!({ "ticket_number": "20250411-T-999" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[rstest]
#[actix_web::test]
async fn validate_reports_each_failure_kind() {
    let queue = TestQueue::at(business_morning()).await;
    let app = actix_test::init_service(test_app(queue.state.clone())).await;
    let fresh = create(&app, "I").await;

    let (status, body) = post_json(
        &app,
        "/api/ticket/valid",
        json!({ "ticket_number": fresh["ticketNumber"] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Ticket is valid");

    let issued_yesterday = business_morning() - TimeDelta::hours(25);
    let stale = Ticket::issue(
        crate::domain::TicketId::random(),
        TicketNumber::issue(issued_yesterday.date_naive(), TicketType::Other, 1),
        TicketType::Other,
        issued_yesterday,
    );
    TicketRepository::insert(&queue.store, &stale)
        .await
        .expect("insert stale ticket");
    let (status, body) = post_json(
        &app,
        "/api/ticket/valid",
        json!({ "ticket_number": stale.ticket_number.as_str() }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "ticket_expired");

    let (status, body) = post_json(&app, "/api/ticket/valid", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Ticket number is required");
}

#[rstest]
#[actix_web::test]
async fn list_requires_an_access_token() {
    let queue = TestQueue::at(business_morning()).await;
    let app = actix_test::init_service(test_app(queue.state.clone())).await;

    let request = actix_test::TestRequest::get()
        .uri("/api/ticket/list")
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["details"]["code"], "authorization_required");
}

#[rstest]
#[actix_web::test]
async fn list_filters_by_status_and_day() {
    let queue = TestQueue::at(business_morning()).await;
    let app = actix_test::init_service(test_app(queue.state.clone())).await;
    let served = create(&app, "W").await;
    create(&app, "D").await;
    let teller = queue.teller("Teller A").await;
    let uri = format!("/api/ticket/{}/serve", served["id"].as_str().expect("id"));
    let (status, _) = post_json(&app, &uri, json!({ "teller_id": teller.id.to_string() })).await;
    assert_eq!(status, StatusCode::OK);

    let request = actix_test::TestRequest::get()
        .uri("/api/ticket/list?date=2025-04-11&status=served")
        .insert_header(bearer())
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, request).await;

    assert_eq!(body["date"], "2025-04-11");
    assert_eq!(body["totalTickets"], 1);
    assert_eq!(body["tickets"][0]["teller"], "Teller A");

    let request = actix_test::TestRequest::get()
        .uri("/api/ticket/list?date=2025-04-12")
        .insert_header(bearer())
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, request).await;
    assert_eq!(body["totalTickets"], 0);
}

#[rstest]
#[case("/api/ticket/list?date=11-04-2025", "date")]
#[case("/api/ticket/list?status=done", "status")]
#[actix_web::test]
async fn list_rejects_bad_filters(#[case] uri: &str, #[case] field: &str) {
    let queue = TestQueue::at(business_morning()).await;
    let app = actix_test::init_service(test_app(queue.state.clone())).await;

    let request = actix_test::TestRequest::get()
        .uri(uri)
        .insert_header(bearer())
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["details"]["field"], field);
}

#[rstest]
#[actix_web::test]
async fn serve_then_complete_frees_the_teller() {
    let queue = TestQueue::at(business_morning()).await;
    let app = actix_test::init_service(test_app(queue.state.clone())).await;
    let first = create(&app, "W").await;
    let second = create(&app, "D").await;
    let teller = queue.teller("Teller A").await;
    let teller_body = json!({ "teller_id": teller.id.to_string() });
    let first_id = first["id"].as_str().expect("id");

    let (status, body) =
        post_json(&app, &format!("/api/ticket/{first_id}/serve"), teller_body.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Ticket marked as served");
    assert_eq!(body["ticket"]["status"], "served");
    assert_eq!(body["ticket"]["teller"], "Teller A");

    let second_id = second["id"].as_str().expect("id");
    let (status, body) =
        post_json(&app, &format!("/api/ticket/{second_id}/serve"), teller_body).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "This teller is currently serving another ticket");

    let request = actix_test::TestRequest::put()
        .uri(&format!("/api/ticket/{first_id}/complete"))
        .insert_header(bearer())
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, request).await;
    assert_eq!(body["ticket"]["completed"], true);
    assert_eq!(body["teller"]["name"], "Teller A");
    assert_eq!(body["teller"]["isActive"], false);
    assert!(!queue.teller("Teller A").await.is_active);
}

#[rstest]
#[actix_web::test]
async fn serve_validates_its_inputs() {
    let queue = TestQueue::at(business_morning()).await;
    let app = actix_test::init_service(test_app(queue.state.clone())).await;
    let ticket = create(&app, "W").await;
    let uri = format!("/api/ticket/{}/serve", ticket["id"].as_str().expect("id"));

    let (status, body) = post_json(&app, &uri, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Teller ID is required");

    let (status, body) = post_json(&app, &uri, json!({ "teller_id": "not-a-uuid" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Teller not found");

    let teller = queue.teller("Teller B").await;
    let (status, _) = post_json(
        &app,
        "/api/ticket/not-a-uuid/serve",
        json!({ "teller_id": teller.id.to_string() }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn completing_an_unassigned_ticket_is_rejected() {
    let queue = TestQueue::at(business_morning()).await;
    let app = actix_test::init_service(test_app(queue.state.clone())).await;
    let ticket = create(&app, "O").await;

    let request = actix_test::TestRequest::put()
        .uri(&format!("/api/ticket/{}/complete", ticket["id"].as_str().expect("id")))
        .insert_header(bearer())
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], "ticket_unassigned");
}

#[rstest]
#[actix_web::test]
async fn auto_assign_hands_out_idle_tellers_then_answers_no_content() {
    let queue = TestQueue::at(business_morning()).await;
    let app = actix_test::init_service(test_app(queue.state.clone())).await;
    let mut assigned = Vec::new();

    for ticket_type in ["W", "D", "T"] {
        let ticket = create(&app, ticket_type).await;
        let request = actix_test::TestRequest::get()
            .uri(&format!("/api/tickets/{}/auto-assign", ticket["id"].as_str().expect("id")))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        if response.status() == StatusCode::OK {
            let body: Value = actix_test::read_body_json(response).await;
            assert_eq!(body["message"], "Ticket has been assigned Teller");
            assigned.push(body["teller"]["name"].as_str().expect("name").to_owned());
        } else {
            assert_eq!(response.status(), StatusCode::NO_CONTENT);
        }
    }

    assert_eq!(assigned, vec!["Teller A".to_owned(), "Teller B".to_owned()]);
}

#[rstest]
#[case("not-a-uuid")]
#[case("6f1c2a3e-0d4b-4b8e-9c71-1f2e3d4c5b6a")]
#[actix_web::test]
async fn auto_assign_for_unknown_tickets_is_no_content(#[case] id: &str) {
    let queue = TestQueue::at(business_morning()).await;
    let app = actix_test::init_service(test_app(queue.state.clone())).await;

    let request = actix_test::TestRequest::get()
        .uri(&format!("/api/tickets/{id}/auto-assign"))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[rstest]
#[actix_web::test]
async fn tickets_issued_at_midnight_belong_to_the_new_day() {
    let midnight = Utc
        .with_ymd_and_hms(2025, 4, 12, 0, 0, 0)
        .single()
        .expect("valid timestamp");
    let queue = TestQueue::at(midnight).await;
    let app = actix_test::init_service(test_app(queue.state.clone())).await;

    let ticket = create(&app, "W").await;

    assert_eq!(ticket["ticketNumber"], "20250412-W-001");
}
