//! Create, update and delete endpoint behavior.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{FakeHub, full_capabilities, get, post_json, test_app};
use famcal_core::{CapabilityTable, ConfigRegistry};

fn app_with(hub: &FakeHub) -> axum::Router {
    test_app(hub, full_capabilities(), ConfigRegistry::new())
}

fn add_event_body() -> serde_json::Value {
    json!({
        "calendar_entity": "calendar.family",
        "summary": "Dentist",
        "start_date_time": "2024-06-01 09:00:00",
        "end_date_time": "2024-06-01 10:00:00",
    })
}

#[tokio::test]
async fn add_event_succeeds_via_primary_provider() {
    let hub = FakeHub::new();
    let app = app_with(&hub);

    let (status, body) = post_json(app, "/api/family_calendar/add_event", add_event_body()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    // Primary success means the generic fallback is never invoked.
    let calls = hub.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "google");
    assert_eq!(calls[0].1, "create_event");
}

#[tokio::test]
async fn add_event_with_missing_fields_is_rejected() {
    let hub = FakeHub::new();
    let app = app_with(&hub);

    let (status, body) = post_json(
        app,
        "/api/family_calendar/add_event",
        json!({ "calendar_entity": "calendar.family", "summary": "" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields");
    assert!(hub.calls().is_empty());
}

#[tokio::test]
async fn add_event_total_refusal_reports_both_backends() {
    let hub = FakeHub::new();
    hub.fail_service("google", "create_event", "read-only calendar");
    hub.fail_service("calendar", "create_event", "no write support");
    let app = app_with(&hub);

    let (status, body) = post_json(app, "/api/family_calendar/add_event", add_event_body()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["calendar"], "calendar.family");
    assert!(
        body["google_error"]
            .as_str()
            .unwrap()
            .contains("read-only calendar")
    );
    assert!(
        body["calendar_error"]
            .as_str()
            .unwrap()
            .contains("no write support")
    );
}

#[tokio::test]
async fn add_event_bad_timestamp_is_a_server_error() {
    let hub = FakeHub::new();
    hub.fail_service("google", "create_event", "read-only calendar");
    let app = app_with(&hub);

    let mut body = add_event_body();
    body["start_date_time"] = json!("June first");

    let (status, response) = post_json(app, "/api/family_calendar/add_event", body).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response["error"].as_str().unwrap().contains("June first"));
}

#[tokio::test]
async fn created_event_round_trips_as_timed() {
    let hub = FakeHub::new();
    hub.add_calendar("calendar.family");
    let app = app_with(&hub);

    let (status, _) = post_json(
        app.clone(),
        "/api/family_calendar/add_event",
        add_event_body(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(
        app,
        "/api/family_calendar/events?calendar=calendar.family&start=2024-06-01T00:00:00Z&end=2024-06-02T00:00:00Z",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let events = body.as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert!(events[0]["start"].get("dateTime").is_some());
    assert!(events[0]["start"].get("date").is_none());
}

#[tokio::test]
async fn duplicate_create_requests_are_not_idempotent() {
    // Known limitation: retrying a create after a client-side timeout
    // produces a duplicate event.
    let hub = FakeHub::new();
    hub.add_calendar("calendar.family");
    let app = app_with(&hub);

    for _ in 0..2 {
        let (status, _) = post_json(
            app.clone(),
            "/api/family_calendar/add_event",
            add_event_body(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    assert_eq!(hub.events_in("calendar.family").len(), 2);
}

#[tokio::test]
async fn update_event_deletes_then_creates() {
    let hub = FakeHub::new();
    let app = app_with(&hub);

    let mut body = add_event_body();
    body["event_uid"] = json!("uid-1");

    let (status, response) =
        post_json(app, "/api/family_calendar/update_event", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response, json!({ "success": true }));

    let calls = hub.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].1, "delete_event");
    assert_eq!(calls[0].2["uid"], "uid-1");
    assert_eq!(calls[1].1, "create_event");
}

#[tokio::test]
async fn update_event_requires_a_uid() {
    let hub = FakeHub::new();
    let app = app_with(&hub);

    let (status, _) =
        post_json(app, "/api/family_calendar/update_event", add_event_body()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(hub.calls().is_empty());
}

#[tokio::test]
async fn update_event_total_refusal_is_forbidden() {
    let hub = FakeHub::new();
    hub.fail_service("google", "create_event", "read-only");
    hub.fail_service("calendar", "create_event", "read-only");
    let app = app_with(&hub);

    let mut body = add_event_body();
    body["event_uid"] = json!("uid-1");

    let (status, response) =
        post_json(app, "/api/family_calendar/update_event", body).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(
        response["error"]
            .as_str()
            .unwrap()
            .contains("Failed to update event")
    );
}

#[tokio::test]
async fn delete_event_accepts_the_event_id_alias() {
    let hub = FakeHub::new();
    let app = app_with(&hub);

    let (status, body) = post_json(
        app,
        "/api/family_calendar/delete_event",
        json!({ "calendar_entity": "calendar.family", "event_id": "uid-7" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let calls = hub.calls();
    assert_eq!(calls[0].2["event_id"], "uid-7");
}

#[tokio::test]
async fn delete_event_with_missing_fields_is_rejected() {
    let hub = FakeHub::new();
    let app = app_with(&hub);

    let (status, body) = post_json(
        app,
        "/api/family_calendar/delete_event",
        json!({ "calendar_entity": "calendar.family" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing calendar_entity or event_uid");
}

#[tokio::test]
async fn delete_refusal_carries_the_attempt_log() {
    let hub = FakeHub::new();
    hub.fail_service("google", "delete_event", "nope");
    hub.fail_service("google", "remove_event", "nope");
    hub.fail_service("calendar", "delete_event", "nope");
    hub.fail_service("calendar", "remove_event", "nope");
    let app = app_with(&hub);

    let (status, body) = post_json(
        app,
        "/api/family_calendar/delete_event",
        json!({ "calendar_entity": "calendar.family", "event_uid": "uid-1" }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let details = body["details"].as_array().unwrap();
    assert_eq!(details.len(), 4);
    assert!(
        details[0]
            .as_str()
            .unwrap()
            .starts_with("google.delete_event failed:")
    );
}

#[tokio::test]
async fn delete_without_any_backend_is_unsupported() {
    // No delete service registered, no entity hooks: 501, not 403.
    let hub = FakeHub::new();
    let app = test_app(&hub, CapabilityTable::new(), ConfigRegistry::new());

    let (status, body) = post_json(
        app,
        "/api/family_calendar/delete_event",
        json!({ "calendar_entity": "calendar.family", "event_uid": "uid-1" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(body["calendar"], "calendar.family");
}
