//! Tests for the owner moderation panel.

mod support;

use serde_json::json;
use stay_client::error::ClientError;
use stay_client::{
    BookingApi, Decision, MemorySessionStore, OwnerFilter, OwnerPanel, SessionStore, StayNotes,
};
use stay_engine::{BookingStatus, PricingPolicy};
use support::{booking_json, ok, param, FakeTransport};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn all_rows() -> serde_json::Value {
    json!([
        booking_json("r1", "Cabaña 1", "2025-02-01", "2025-02-03", "PENDIENTE"),
        booking_json("r2", "2", "2025-02-10", "2025-02-15", "CONFIRMADA"),
        booking_json("r3", "1", "2025-03-01", "2025-03-02", "RECHAZADA"),
    ])
}

fn denied() -> serde_json::Value {
    json!({ "ok": false, "error": "PIN inválido" })
}

fn panel(
    transport: &FakeTransport,
    store: MemorySessionStore,
) -> OwnerPanel<FakeTransport, MemorySessionStore> {
    OwnerPanel::new(
        BookingApi::new(transport.clone()).with_version("v7"),
        store,
        PricingPolicy::new(4, 85_000, 75_000, 0.5).unwrap(),
        StayNotes::default(),
    )
}

async fn logged_in(transport: &FakeTransport) -> OwnerPanel<FakeTransport, MemorySessionStore> {
    let mut p = panel(transport, MemorySessionStore::default());
    p.login("1234").await.unwrap();
    p
}

// ── login / restore / logout ────────────────────────────────────────────────

#[tokio::test]
async fn valid_pin_starts_a_session() {
    let transport = FakeTransport::new();
    transport.respond("owner_list", Ok(all_rows()));

    let p = logged_in(&transport).await;

    assert!(p.is_logged_in());
    assert_eq!(p.bookings().len(), 3);
    assert_eq!(p.store().load().as_deref(), Some("1234"));
    let sent = transport.last_call("owner_list").unwrap();
    assert_eq!(param(&sent, "pin").as_deref(), Some("1234"));
    assert_eq!(param(&sent, "_v").as_deref(), Some("v7"));
}

#[tokio::test]
async fn invalid_pin_is_not_stored() {
    let transport = FakeTransport::new();
    transport.respond("owner_list", Ok(denied()));
    let mut p = panel(&transport, MemorySessionStore::default());

    let err = p.login("0000").await.unwrap_err();

    assert_eq!(err, ClientError::Auth("PIN inválido".into()));
    assert!(!p.is_logged_in());
    assert!(p.store().load().is_none());
}

#[tokio::test]
async fn blank_pin_is_rejected_without_a_request() {
    let transport = FakeTransport::new();
    let mut p = panel(&transport, MemorySessionStore::default());

    assert!(p.login("   ").await.unwrap_err().is_validation());
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn restore_uses_the_stored_pin() {
    let transport = FakeTransport::new();
    transport.respond("owner_list", Ok(all_rows()));
    let mut p = panel(&transport, MemorySessionStore::with_pin("1234"));

    assert!(p.restore().await.unwrap());
    assert!(p.is_logged_in());
}

#[tokio::test]
async fn restore_with_expired_pin_clears_the_store() {
    let transport = FakeTransport::new();
    transport.respond("owner_list", Ok(denied()));
    let mut p = panel(&transport, MemorySessionStore::with_pin("old"));

    assert!(p.restore().await.is_err());
    assert!(p.store().load().is_none());
}

#[tokio::test]
async fn restore_without_stored_pin_does_nothing() {
    let transport = FakeTransport::new();
    let mut p = panel(&transport, MemorySessionStore::default());

    assert!(!p.restore().await.unwrap());
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn logout_forgets_everything() {
    let transport = FakeTransport::new();
    transport.respond("owner_list", Ok(all_rows()));
    let mut p = logged_in(&transport).await;

    p.logout();

    assert!(!p.is_logged_in());
    assert!(p.bookings().is_empty());
    assert!(p.store().load().is_none());
}

// ── reload / mutations ──────────────────────────────────────────────────────

#[tokio::test]
async fn actions_require_a_session() {
    let transport = FakeTransport::new();
    let mut p = panel(&transport, MemorySessionStore::default());

    assert!(matches!(p.reload().await, Err(ClientError::Auth(_))));
    assert!(matches!(p.delete("r1").await, Err(ClientError::Auth(_))));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn decide_sends_decision_and_reloads() {
    let transport = FakeTransport::new();
    transport.respond("owner_list", Ok(all_rows()));
    transport.respond("owner_decide", ok());
    let mut p = logged_in(&transport).await;

    p.decide("r1", Decision::Confirm).await.unwrap();

    assert_eq!(transport.actions(), vec!["owner_list", "owner_decide", "owner_list"]);
    let sent = transport.last_call("owner_decide").unwrap();
    assert_eq!(param(&sent, "id").as_deref(), Some("r1"));
    assert_eq!(param(&sent, "decision").as_deref(), Some("confirm"));
    assert_eq!(param(&sent, "pin").as_deref(), Some("1234"));
}

#[tokio::test]
async fn failed_mutation_still_reloads() {
    let transport = FakeTransport::new();
    transport.respond("owner_list", Ok(all_rows()));
    transport.respond("owner_delete", Ok(json!({ "ok": false, "error": "no existe" })));
    let mut p = logged_in(&transport).await;

    let err = p.delete("zz").await.unwrap_err();

    assert_eq!(err, ClientError::Application("no existe".into()));
    assert_eq!(transport.actions(), vec!["owner_list", "owner_delete", "owner_list"]);
    assert!(p.is_logged_in());
}

#[tokio::test]
async fn unauthorized_reload_ends_the_session() {
    let transport = FakeTransport::new();
    transport.respond("owner_list", Ok(all_rows()));
    transport.respond("owner_list", Ok(denied()));
    transport.respond("owner_reset", ok());
    let mut p = logged_in(&transport).await;

    let err = p.reset().await.unwrap_err();

    assert!(matches!(err, ClientError::Auth(_)));
    assert!(!p.is_logged_in());
    assert!(p.store().load().is_none());
}

#[tokio::test]
async fn transport_failure_on_reload_keeps_the_session() {
    let transport = FakeTransport::new();
    transport.respond("owner_list", Ok(all_rows()));
    transport.respond("owner_list", Err(ClientError::Timeout(std::time::Duration::from_secs(12))));
    let mut p = logged_in(&transport).await;

    assert!(matches!(p.reload().await, Err(ClientError::Timeout(_))));
    assert!(p.is_logged_in());
    assert_eq!(p.bookings().len(), 3);
}

// ── rows / filters ──────────────────────────────────────────────────────────

#[tokio::test]
async fn unit_filter_matches_normalized_ids() {
    let transport = FakeTransport::new();
    transport.respond("owner_list", Ok(all_rows()));
    let p = logged_in(&transport).await;

    let filter = OwnerFilter {
        unit: Some("1".to_string()),
        ..OwnerFilter::default()
    };
    let ids: Vec<String> = p.rows(&filter).into_iter().map(|r| r.booking.id).collect();

    assert_eq!(ids, vec!["r1", "r3"]);
    assert_eq!(p.status_line(&filter), "showing 2 of 3 reservations");
}

#[tokio::test]
async fn status_and_term_filters_combine() {
    let transport = FakeTransport::new();
    transport.respond("owner_list", Ok(all_rows()));
    let p = logged_in(&transport).await;

    let confirmed = OwnerFilter {
        status: Some(BookingStatus::Confirmada),
        ..OwnerFilter::default()
    };
    assert_eq!(p.rows(&confirmed).len(), 1);

    let by_month = OwnerFilter {
        term: Some("  2025-03 ".to_string()),
        ..OwnerFilter::default()
    };
    assert_eq!(p.rows(&by_month)[0].booking.id, "r3");

    let by_name = OwnerFilter {
        term: Some("ANA".to_string()),
        ..OwnerFilter::default()
    };
    assert_eq!(p.rows(&by_name).len(), 3);

    let nobody = OwnerFilter {
        term: Some("zzz".to_string()),
        ..OwnerFilter::default()
    };
    assert!(p.rows(&nobody).is_empty());
    assert_eq!(p.status_line(&nobody), "showing 0 of 3 reservations");
}

#[tokio::test]
async fn rows_carry_local_quote_and_whatsapp_link() {
    let transport = FakeTransport::new();
    transport.respond("owner_list", Ok(all_rows()));
    let p = logged_in(&transport).await;

    let rows = p.rows(&OwnerFilter::default());
    let long_stay = rows.iter().find(|r| r.booking.id == "r2").unwrap();

    let q = long_stay.quote.unwrap();
    assert_eq!(q.nights, 5);
    assert_eq!(q.total, 375_000);
    assert!(long_stay.message.contains("CONFIRMADA"));
    assert!(long_stay.message.contains("$ 375.000"));
    assert!(long_stay.message.contains("seña del 50% del total"));
    assert!(long_stay.whatsapp_url.starts_with("https://wa.me/5493515555555?text="));

    let rejected = rows.iter().find(|r| r.booking.id == "r3").unwrap();
    assert!(rejected.message.contains("no hay disponibilidad"));
}
