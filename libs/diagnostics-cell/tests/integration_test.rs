use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Extension, Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use diagnostics_cell::router::{lab_routes, radiology_routes};
use notification_cell::{NotificationDispatcher, RecordingMailer};
use shared_models::status::StatusEvent;
use shared_utils::test_utils::{JwtTestUtils, MockLedgerRows, TestConfig, TestUser};

fn lab_app(ledger_url: &str, mailer: Arc<RecordingMailer>) -> Router {
    let config = TestConfig::with_ledger_url(ledger_url).to_arc();
    let dispatcher = Arc::new(NotificationDispatcher::spawn(mailer, 16));
    lab_routes(config).layer(Extension(dispatcher))
}

fn radiology_app(ledger_url: &str, mailer: Arc<RecordingMailer>) -> Router {
    let config = TestConfig::with_ledger_url(ledger_url).to_arc();
    let dispatcher = Arc::new(NotificationDispatcher::spawn(mailer, 16));
    radiology_routes(config).layer(Extension(dispatcher))
}

fn staff_token() -> String {
    let user = TestUser::frontdesk();
    JwtTestUtils::create_test_token(&user, &TestConfig::default().jwt_secret, None)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn wait_for_deliveries(mailer: &RecordingMailer, expected: usize) {
    for _ in 0..50 {
        if mailer.sent().len() >= expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn walk_in_lab_booking_needs_no_session() {
    let server = MockServer::start().await;
    let mailer = Arc::new(RecordingMailer::new());

    Mock::given(method("POST"))
        .and(path("/rest/v1/lab_bookings"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockLedgerRows::lab_booking(4, "Pending", 650.0, Some("walkin@example.com"))
        ])))
        .mount(&server)
        .await;

    let app = lab_app(&server.uri(), mailer);
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/bookings")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({
                        "patient_name": "Walk-in Patient",
                        "patient_contact": "+1-555-0199",
                        "patient_email": "walkin@example.com",
                        "test_id": 3,
                        "test_name": "Complete Blood Count (CBC)",
                        "booking_date": "2025-06-02",
                        "amount": 650.0
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["id"], 4);
}

#[tokio::test]
async fn confirming_a_lab_booking_notifies_the_walk_in() {
    let server = MockServer::start().await;
    let mailer = Arc::new(RecordingMailer::new());

    Mock::given(method("GET"))
        .and(path("/rest/v1/lab_bookings"))
        .and(query_param("id", "eq.4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockLedgerRows::lab_booking(4, "Pending", 650.0, Some("walkin@example.com"))
        ])))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/lab_bookings"))
        .and(query_param("id", "eq.4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockLedgerRows::lab_booking(4, "Confirmed", 650.0, Some("walkin@example.com"))
        ])))
        .mount(&server)
        .await;

    let app = lab_app(&server.uri(), mailer.clone());
    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/bookings/4")
                .header("content-type", "application/json")
                .header("Authorization", format!("Bearer {}", staff_token()))
                .body(Body::from(json!({"status": "Confirmed"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["old_status"], "Pending");
    assert_eq!(body["new_status"], "Confirmed");

    wait_for_deliveries(&mailer, 1).await;
    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].event, StatusEvent::Confirmed);
    assert_eq!(sent[0].snapshot.reference, "LAB-4");
}

#[tokio::test]
async fn unchanged_lab_status_stays_silent() {
    let server = MockServer::start().await;
    let mailer = Arc::new(RecordingMailer::new());

    Mock::given(method("GET"))
        .and(path("/rest/v1/lab_bookings"))
        .and(query_param("id", "eq.4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockLedgerRows::lab_booking(4, "Confirmed", 650.0, Some("walkin@example.com"))
        ])))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/lab_bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockLedgerRows::lab_booking(4, "Confirmed", 700.0, Some("walkin@example.com"))
        ])))
        .mount(&server)
        .await;

    let app = lab_app(&server.uri(), mailer.clone());
    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/bookings/4")
                .header("content-type", "application/json")
                .header("Authorization", format!("Bearer {}", staff_token()))
                .body(Body::from(json!({"amount": 700.0}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn lab_bookings_never_no_show() {
    let server = MockServer::start().await;
    let mailer = Arc::new(RecordingMailer::new());

    Mock::given(method("GET"))
        .and(path("/rest/v1/lab_bookings"))
        .and(query_param("id", "eq.4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockLedgerRows::lab_booking(4, "Confirmed", 650.0, None)
        ])))
        .mount(&server)
        .await;

    let app = lab_app(&server.uri(), mailer);
    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/bookings/4")
                .header("content-type", "application/json")
                .header("Authorization", format!("Bearer {}", staff_token()))
                .body(Body::from(json!({"status": "No-Show"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn radiology_confirmation_carries_preparation_instructions() {
    let server = MockServer::start().await;
    let mailer = Arc::new(RecordingMailer::new());

    Mock::given(method("GET"))
        .and(path("/rest/v1/radiology_bookings"))
        .and(query_param("id", "eq.9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockLedgerRows::radiology_booking(9, "Pending", 3500.0, Some("walkin@example.com"))
        ])))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/radiology_bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockLedgerRows::radiology_booking(9, "Confirmed", 3500.0, Some("walkin@example.com"))
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/radiology_services"))
        .and(query_param("id", "eq.2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 2,
                "name": "MRI Brain",
                "modality": "MRI",
                "preparation": "Remove all metal objects. Arrive 30 minutes early."
            }
        ])))
        .mount(&server)
        .await;

    let app = radiology_app(&server.uri(), mailer.clone());
    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/bookings/9")
                .header("content-type", "application/json")
                .header("Authorization", format!("Bearer {}", staff_token()))
                .body(Body::from(json!({"status": "Confirmed"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    wait_for_deliveries(&mailer, 1).await;
    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].snapshot.reference, "RAD-9");
    assert_eq!(
        sent[0].snapshot.details.as_deref(),
        Some("Remove all metal objects. Arrive 30 minutes early.")
    );
}

#[tokio::test]
async fn managing_bookings_requires_a_session() {
    let server = MockServer::start().await;
    let app = lab_app(&server.uri(), Arc::new(RecordingMailer::new()));

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/bookings/4")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
