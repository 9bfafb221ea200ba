//! Tests for the callback transport against a mock HTTP endpoint.

use std::time::Duration;

use serde_json::json;
use stay_client::error::ClientError;
use stay_client::{BookingApi, JsonpTransport, Transport};
use stay_engine::BookingStatus;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn callback_of(req: &Request) -> String {
    req.url
        .query_pairs()
        .find(|(k, _)| k == "callback")
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default()
}

/// Responder that wraps `payload` in whatever callback the request named.
fn echo(payload: serde_json::Value) -> impl Fn(&Request) -> ResponseTemplate + Send + Sync {
    move |req: &Request| {
        ResponseTemplate::new(200).set_body_string(format!("{}({});", callback_of(req), payload))
    }
}

fn transport(server: &MockServer, timeout: Duration) -> JsonpTransport {
    JsonpTransport::new(format!("{}/exec", server.uri()), timeout)
}

fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn payload_is_unwrapped_from_the_named_callback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/exec"))
        .and(query_param("action", "availability"))
        .respond_with(echo(json!([{ "cabana": "1" }])))
        .expect(1)
        .mount(&server)
        .await;

    let t = transport(&server, Duration::from_secs(5));
    let value = t.call(&params(&[("action", "availability")])).await.unwrap();

    assert_eq!(value, json!([{ "cabana": "1" }]));
    assert_eq!(t.registry().pending(), 0);
}

#[tokio::test]
async fn api_decodes_bookings_over_the_wire() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("action", "availability"))
        .respond_with(echo(json!([
            { "cabana": 2, "checkin": "2025-01-10", "checkout": "2025-01-12", "personas": 4 }
        ])))
        .mount(&server)
        .await;

    let api = BookingApi::new(transport(&server, Duration::from_secs(5)));
    let bookings = api.availability().await.unwrap();

    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].cabana, "2");
    assert_eq!(bookings[0].personas, "4");
    assert_eq!(bookings[0].estado, BookingStatus::Pendiente);
}

#[tokio::test]
async fn owner_requests_carry_pin_and_version() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("action", "owner_reset"))
        .and(query_param("pin", "1234"))
        .and(query_param("_v", "v7"))
        .respond_with(echo(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let api = BookingApi::new(transport(&server, Duration::from_secs(5))).with_version("v7");

    api.owner_reset("1234").await.unwrap();
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let t = transport(&server, Duration::from_millis(100));
    let err = t.call(&params(&[("action", "availability")])).await.unwrap_err();

    assert_eq!(err, ClientError::Timeout(Duration::from_millis(100)));
    assert_eq!(t.registry().pending(), 0);
}

#[tokio::test]
async fn http_error_is_a_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let t = transport(&server, Duration::from_secs(5));
    let err = t.call(&params(&[("action", "availability")])).await.unwrap_err();

    assert!(matches!(err, ClientError::Transport(_)));
    assert_eq!(t.registry().pending(), 0);
}

#[tokio::test]
async fn response_for_another_callback_is_refused() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("cb_someone_else([]);"))
        .mount(&server)
        .await;

    let t = transport(&server, Duration::from_secs(5));
    let err = t.call(&params(&[("action", "availability")])).await.unwrap_err();

    assert!(matches!(err, ClientError::Transport(_)));
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_failure() {
    let t = JsonpTransport::new("http://127.0.0.1:1/exec", Duration::from_secs(5));

    let err = t.call(&params(&[("action", "availability")])).await.unwrap_err();

    assert!(matches!(err, ClientError::Transport(_)));
}
