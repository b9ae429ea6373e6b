// libs/booking-wizard-cell/tests/handlers_test.rs

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use booking_wizard_cell::{
    booking_routes, BookingService, BookingSink, HttpBookingSink, LoggingBookingSink, SlotCalendar,
};
use shared_utils::test_utils::{test_clock, MockClinicData};

fn service_with(sink: Arc<dyn BookingSink>) -> Arc<BookingService> {
    let calendar: SlotCalendar =
        serde_json::from_value(MockClinicData::slot_calendar()).expect("fixture parses");
    Arc::new(BookingService::new(Arc::new(calendar), sink, test_clock()))
}

fn create_test_app() -> Router {
    booking_routes(service_with(Arc::new(LoggingBookingSink)))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn start(app: &Router) -> String {
    let (status, body) = send(app, "POST", "/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    body["session_id"].as_str().unwrap().to_string()
}

async fn fill_to_confirm(app: &Router, id: &str) {
    let (status, _) = send(app, "PATCH", &format!("/sessions/{id}/form"), Some(MockClinicData::booking_form())).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(app, "POST", &format!("/sessions/{id}/next"), None).await;
    assert_eq!(body["advanced"], true);
    let (_, body) = send(app, "POST", &format!("/sessions/{id}/next"), None).await;
    assert_eq!(body["wizard"]["step_name"], "confirm");
    assert_eq!(body["wizard"]["service_label"], "General Consultation");
}

#[tokio::test]
async fn test_services_catalog() {
    let (status, body) = send(&create_test_app(), "GET", "/services", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 11);
    assert_eq!(body["services"][0]["code"], "general_consultation");
}

#[tokio::test]
async fn test_day_and_month_availability() {
    let app = create_test_app();

    let (status, body) = send(&app, "GET", "/availability?date=2025-10-15", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available_slots"], json!(["09:00"]));
    assert_eq!(body["is_bookable"], true);

    let (_, body) = send(&app, "GET", "/availability?date=2025-10-18", None).await;
    assert_eq!(body["is_bookable"], false);

    let (status, body) = send(&app, "GET", "/availability/month?year=2025&month=10", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["days"].as_array().unwrap().len(), 31);

    let (status, _) = send(&app, "GET", "/availability/month?year=2025&month=13", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_new_session_snapshot() {
    let app = create_test_app();
    let (status, body) = send(&app, "POST", "/sessions", None).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["step"], 1);
    assert_eq!(body["step_name"], "appointment");
    assert_eq!(body["total_steps"], 4);
    assert_eq!(body["submission"]["status"], "idle");
    assert_eq!(body["form"]["service"], "");
    assert_eq!(body["service_label"], Value::Null);
    assert_eq!(body["receipt"], Value::Null);
}

#[tokio::test]
async fn test_blocked_next_is_not_an_http_error() {
    let app = create_test_app();
    let id = start(&app).await;

    let (status, body) = send(&app, "POST", &format!("/sessions/{id}/next"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["advanced"], false);
    assert_eq!(body["wizard"]["step"], 1);
    assert_eq!(body["wizard"]["errors"]["service"], "Please select a service");
}

#[tokio::test]
async fn test_unknown_service_has_no_label() {
    let app = create_test_app();
    let id = start(&app).await;

    let (_, body) = send(&app, "PATCH", &format!("/sessions/{id}/form"), Some(json!({ "service": "astrology" }))).await;
    assert_eq!(body["form"]["service"], "astrology");
    assert_eq!(body["service_label"], Value::Null);
}

#[tokio::test]
async fn test_form_patch_reports_available_slots() {
    let app = create_test_app();
    let id = start(&app).await;

    let (_, body) = send(&app, "PATCH", &format!("/sessions/{id}/form"), Some(json!({ "date": "2025-10-15" }))).await;

    assert_eq!(body["available_slots"], json!(["09:00"]));
    assert_eq!(body["form"]["time"], "");
}

#[tokio::test]
async fn test_full_booking_flow() {
    let app = create_test_app();
    let id = start(&app).await;
    fill_to_confirm(&app, &id).await;

    let (status, body) = send(&app, "POST", &format!("/sessions/{id}/submit"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["step"], 4);
    assert_eq!(body["form"], MockClinicData::booking_form());
    assert!(body["receipt"]["reference"].is_string());

    // A completed wizard cannot be edited
    let (status, _) = send(&app, "PATCH", &format!("/sessions/{id}/form"), Some(json!({ "name": "X" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = send(&app, "POST", &format!("/sessions/{id}/reset"), None).await;
    assert_eq!(body["step"], 1);
    assert_eq!(body["form"]["name"], "");
}

#[tokio::test]
async fn test_failed_submission_shows_banner() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let sink = HttpBookingSink::new(server.uri(), std::time::Duration::from_secs(2)).unwrap();
    let app = booking_routes(service_with(Arc::new(sink)));
    let id = start(&app).await;
    fill_to_confirm(&app, &id).await;

    let (status, body) = send(&app, "POST", &format!("/sessions/{id}/submit"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["step"], 3);
    assert_eq!(body["submission"]["status"], "failed");
    assert_eq!(body["form"], MockClinicData::booking_form());

    let (_, body) = send(&app, "POST", &format!("/sessions/{id}/dismiss-error"), None).await;
    assert_eq!(body["submission"]["status"], "idle");
}

#[tokio::test]
async fn test_submit_before_confirmation_conflicts() {
    let app = create_test_app();
    let id = start(&app).await;

    let (status, body) = send(&app, "POST", &format!("/sessions/{id}/submit"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("confirmation"));
}

#[tokio::test]
async fn test_sessions_are_isolated_and_deletable() {
    let app = create_test_app();
    let first = start(&app).await;
    let second = start(&app).await;

    send(&app, "PATCH", &format!("/sessions/{first}/form"), Some(json!({ "name": "Jane Doe" }))).await;
    let (_, body) = send(&app, "GET", &format!("/sessions/{second}"), None).await;
    assert_eq!(body["form"]["name"], "");

    let (status, _) = send(&app, "DELETE", &format!("/sessions/{first}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "GET", &format!("/sessions/{first}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}
