
use super::*;
use axum::body::Body;
use axum::http::{Method, StatusCode};
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::sync::Arc;
use tower::ServiceExt;

use crate::models::event::tests::club_link;
use crate::models::organizer::NamedOrganizerRow;
use crate::store::mock::StoreMock;
use sample_data::*;

fn sample_store() -> Arc<StoreMock> {
    let store = StoreMock::default();
    fill_sample_data(&store);
    Arc::new(store)
}

async fn call(store: &Arc<StoreMock>, request: Request<Body>) -> (StatusCode, Value) {
    let app = create_routes(AppState::new(store.clone()), false);
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    assert!(response.headers().contains_key(&X_REQUEST_ID));
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, value)
}

async fn get_json(store: &Arc<StoreMock>, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    call(store, request).await
}

async fn post_json(store: &Arc<StoreMock>, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    call(store, request).await
}

fn event_ids(events: &Value) -> Vec<i64> {
    events
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["event_id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health_reports_database_state() {
    let store = sample_store();
    let (status, body) = get_json(&store, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");

    store.data.lock().unwrap().next_error = Some(sqlx::Error::PoolTimedOut);
    let (status, body) = get_json(&store, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["database"], "disconnected");
}

#[tokio::test]
async fn test_list_events_newest_first() {
    let store = sample_store();
    let (status, body) = get_json(&store, "/api/events").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(event_ids(&body), vec![3, 2, 1]);
    assert_eq!(body[0]["location"]["label"], "IB 1010");
    assert_eq!(body[2]["location"]["building"], "TBD");
    assert_eq!(body[1]["categories"], json!(["Arts", "Social"]));
}

#[tokio::test]
async fn test_event_organizers_are_distinct() {
    let store = sample_store();
    let links = store.data.lock().unwrap().event_organizers.clone();

    for event_id in [PAST_EVENT, SHARED_EVENT, FUTURE_EVENT] {
        let (status, body) = get_json(&store, &format!("/api/events/{}", event_id)).await;
        assert_eq!(status, StatusCode::OK);

        let distinct: BTreeSet<i32> = links
            .iter()
            .filter(|l| l.event_id == event_id)
            .map(|l| l.organizer_id)
            .collect();
        assert_eq!(body["organizer"].as_array().unwrap().len(), distinct.len());
    }
}

#[tokio::test]
async fn test_unreadable_organizer_type_is_confined_to_its_row() {
    let store = sample_store();
    {
        let mut data = store.data.lock().unwrap();
        let mut link = club_link(SHARED_EVENT, 40, "Registrar");
        link.organizer_type = "department".to_string();
        data.organizers.push(NamedOrganizerRow {
            organizer_id: 40,
            organizer_type: link.organizer_type.clone(),
            names: link.names.clone(),
        });
        data.event_organizers.push(link);
    }

    let (status, body) = get_json(&store, "/api/events").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(event_ids(&body), vec![3, 2, 1]);
    assert_eq!(body[1]["organizer"].as_array().unwrap().len(), 2);

    let (status, all) = get_json(&store, "/api/all-organizers").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 3);

    let (status, organizers) = get_json(&store, "/api/organizers").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(organizers.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_get_event_errors() {
    let store = sample_store();
    let (status, body) = get_json(&store, "/api/events/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, body) = get_json(&store, "/api/events/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    store.data.lock().unwrap().next_error = Some(sqlx::Error::PoolTimedOut);
    let (status, body) = get_json(&store, "/api/events/1").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "DATABASE_ERROR");
    assert_eq!(body["error"]["details"], Value::Null);
}

#[tokio::test]
async fn test_unfiltered_filter_matches_event_list() {
    let store = sample_store();
    store.data.lock().unwrap().filter_result = vec![FUTURE_EVENT, SHARED_EVENT, PAST_EVENT];

    let (_, all) = get_json(&store, "/api/events").await;
    let (status, body) = post_json(&store, "/api/events/filter", json!({})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(event_ids(&body["upcoming"]), vec![FUTURE_EVENT as i64]);
    assert_eq!(
        event_ids(&body["past"]),
        vec![SHARED_EVENT as i64, PAST_EVENT as i64]
    );

    let mut filtered: Vec<i64> = event_ids(&body["upcoming"]);
    filtered.extend(event_ids(&body["past"]));
    filtered.sort();
    let mut listed = event_ids(&all);
    listed.sort();
    assert_eq!(filtered, listed);

    let data = store.data.lock().unwrap();
    let calls = &data.filter_calls;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].categories, None);
    assert_eq!(calls[0].organizer_ids, None);
}

#[tokio::test]
async fn test_unknown_organizer_short_circuits() {
    let store = sample_store();
    store.data.lock().unwrap().filter_result = vec![PAST_EVENT];

    let (status, body) = post_json(
        &store,
        "/api/events/filter",
        json!({"organizers": ["Nobody's Club"]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"upcoming": [], "past": []}));
    let data = store.data.lock().unwrap();
    assert!(data.filter_calls.is_empty());
    assert_eq!(data.event_detail_queries, 0);
}

#[tokio::test]
async fn test_filter_passes_organizer_ids_and_skips_empty_result() {
    let store = sample_store();

    let (status, body) = post_json(
        &store,
        "/api/events/filter",
        json!({
            "organizers": ["Film Society"],
            "categories": ["Academic"],
            "event_type": "on-campus",
            "start_date": "2024-01-01",
            "end_date": ""
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"upcoming": [], "past": []}));
    let data = store.data.lock().unwrap();
    assert_eq!(data.event_detail_queries, 0);
    let args = &data.filter_calls[0];
    assert_eq!(args.organizer_ids.as_deref(), Some("[11]"));
    assert_eq!(args.categories.as_deref(), Some(r#"["Academic"]"#));
    assert_eq!(args.end_date, None);
    assert!(args.start_date.is_some());
}

#[tokio::test]
async fn test_null_filter_lists_mean_no_filter() {
    let store = sample_store();
    store.data.lock().unwrap().filter_result = vec![PAST_EVENT];

    let (status, body) = post_json(
        &store,
        "/api/events/filter",
        json!({"categories": null, "organizers": null, "locations": null}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(event_ids(&body["past"]), vec![PAST_EVENT as i64]);
    let data = store.data.lock().unwrap();
    let args = &data.filter_calls[0];
    assert_eq!(args.categories, None);
    assert_eq!(args.organizer_ids, None);
    assert_eq!(args.locations, None);
}

#[tokio::test]
async fn test_create_event_from_form_payload() {
    let store = sample_store();
    let (status, body) = post_json(
        &store,
        "/api/events",
        json!({
            "title": "Robot Fight Night",
            "description": "",
            "start_date": "2025-05-01",
            "end_date": "2025-05-01",
            "start_time": "19:00",
            "end_time": "21:30:00",
            "organizer_id": "10",
            "max_participants": "80",
            "cost": "5.50",
            "event_type": "off_campus",
            "category_ids": [1, null, "2"],
            "collaborating_organizers": []
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["event_id"], 101);

    let data = store.data.lock().unwrap();
    let upload = &data.uploads[0];
    assert_eq!(upload.organizer_id, 10);
    assert_eq!(upload.max_participants, 80);
    assert_eq!(upload.category_ids, "[1,2]");
    assert_eq!(upload.collaborating_organizers, "[]");
    assert_eq!(upload.description, "");
}

#[tokio::test]
async fn test_create_event_requires_title() {
    let store = sample_store();
    let (status, body) = post_json(
        &store,
        "/api/events",
        json!({
            "title": "",
            "start_date": "2025-05-01",
            "end_date": "2025-05-01",
            "start_time": "19:00",
            "end_time": "21:00",
            "organizer_id": 10
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(store.data.lock().unwrap().uploads.is_empty());
}

#[tokio::test]
async fn test_lookup_routes() {
    let store = sample_store();

    let (_, categories) = get_json(&store, "/api/categories").await;
    assert_eq!(categories[0]["category_name"], "Academic");

    let (_, buildings) = get_json(&store, "/api/buildings").await;
    assert_eq!(buildings[0]["building"], "AB");
    assert_eq!(buildings[0]["label_count"], 2);
    assert_eq!(buildings[0]["max_capacity"], 90);
    assert_eq!(buildings[0]["all_labels"], "AB 1087, AB 2107");

    let (status, labels) = get_json(&store, "/api/buildings/AB/labels").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(labels.as_array().unwrap().len(), 2);

    let (_, labels) = get_json(&store, "/api/buildings/XX/labels").await;
    assert_eq!(labels, json!([]));
}

#[tokio::test]
async fn test_organizer_routes() {
    let store = sample_store();

    let (_, all) = get_json(&store, "/api/all-organizers").await;
    let names: Vec<&str> = all
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["Film Society", "Office of Student Affairs", "Robotics Club"]
    );
    assert_eq!(all[0]["type"], "club");

    let (_, organizers) = get_json(&store, "/api/organizers").await;
    assert_eq!(organizers.as_array().unwrap().len(), 4);

    let (status, _) = get_json(&store, "/api/organizers/10").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, events) = get_json(&store, "/api/organizers/10/events").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(event_ids(&events), vec![2, 1]);
}

#[tokio::test]
async fn test_get_user() {
    let store = sample_store();
    let (status, body) = get_json(&store, "/api/users/70").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"user_id": 70, "user_type": "attendee", "email": "jane@dku.edu"})
    );

    let (status, _) = get_json(&store, "/api/users/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_join_club_twice_keeps_one_membership() {
    let store = sample_store();
    let request = json!({"attendee_id": ATTENDEE, "organizer_id": ROBOTICS_ORGANIZER});

    for _ in 0..2 {
        let (status, body) = post_json(&store, "/api/clubs/join", request.clone()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"success": true, "club_id": ROBOTICS_CLUB, "attendee_id": ATTENDEE})
        );
    }

    assert_eq!(store.data.lock().unwrap().memberships.len(), 1);

    let (status, body) = get_json(
        &store,
        &format!(
            "/api/clubs/check?organizer_id={}&attendee_id={}",
            ROBOTICS_ORGANIZER, ATTENDEE
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"club_id": ROBOTICS_CLUB, "joined": true}));
}

#[tokio::test]
async fn test_join_club_resolves_user_ids() {
    let store = sample_store();

    let (_, body) = post_json(
        &store,
        "/api/clubs/join",
        json!({"attendee_id": ATTENDEE_USER, "club_id": ROBOTICS_CLUB}),
    )
    .await;
    assert_eq!(body["attendee_id"], ATTENDEE);

    let (status, body) = post_json(
        &store,
        "/api/clubs/join",
        json!({"attendee_id": NEW_ATTENDEE_USER, "club_id": ROBOTICS_CLUB, "remind_required": true}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let created = body["attendee_id"].as_i64().unwrap() as i32;
    assert_ne!(created, NEW_ATTENDEE_USER);
    let data = store.data.lock().unwrap();
    assert!(data.attendees.contains(&(created, NEW_ATTENDEE_USER)));
    assert_eq!(data.memberships.get(&(ROBOTICS_CLUB, created)), Some(&true));
}

#[tokio::test]
async fn test_join_club_errors() {
    let store = sample_store();

    let (status, _) = post_json(&store, "/api/clubs/join", json!({"club_id": 5})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_json(&store, "/api/clubs/join", json!({"attendee_id": ATTENDEE})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = post_json(
        &store,
        "/api/clubs/join",
        json!({"attendee_id": ATTENDEE, "organizer_id": FILM_ORGANIZER}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Club not found for organizer");

    let (status, body) = post_json(
        &store,
        "/api/clubs/join",
        json!({"attendee_id": ORGANIZER_USER, "club_id": ROBOTICS_CLUB}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Attendee not found");

    let (status, _) = get_json(&store, "/api/clubs/check?organizer_id=10").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_wrong_credentials_are_rejected() {
    let store = sample_store();

    let (status, body) = post_json(
        &store,
        "/api/login",
        json!({"email": "jane@dku.edu", "password": "wrong"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = post_json(&store, "/api/login", json!({"email": "jane@dku.edu"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = post_json(
        &store,
        "/api/login",
        json!({"email": "jane@dku.edu", "password": "secret"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "user_id": ATTENDEE_USER}));
}

#[tokio::test]
async fn test_student_signup_then_login() {
    let store = sample_store();

    let (status, body) = post_json(
        &store,
        "/api/signup/student",
        json!({"email": "a@b.com", "password": "x", "first_name": "A"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().starts_with("Success"));

    let (status, body) = post_json(
        &store,
        "/api/login",
        json!({"email": "a@b.com", "password": "x"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["user_id"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn test_signup_relays_procedure_messages() {
    let store = sample_store();

    let (status, body) = post_json(
        &store,
        "/api/signup/attendee",
        json!({"email": "new@dku.edu", "password": "pw", "gradYear": "2027", "major": "Data Science"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().ends_with(" Major recorded."));
    assert_eq!(
        store.data.lock().unwrap().majors.get("new@dku.edu").map(String::as_str),
        Some("Data Science")
    );

    let (status, body) = post_json(
        &store,
        "/api/signup/club",
        json!({"email": "jane@dku.edu", "password": "pw", "club_name": "Chess"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].as_str().unwrap().starts_with("Error"));

    let (status, _) = post_json(
        &store,
        "/api/signup/school",
        json!({"email": "office2@dku.edu", "password": " "}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_save_preferences() {
    let store = sample_store();

    let (status, _) = post_json(
        &store,
        "/api/save-preferences",
        json!({"attendee_id": ATTENDEE, "category_ids": [], "club_ids": []}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_json(
        &store,
        "/api/save-preferences",
        json!({"attendee_id": NEW_ATTENDEE_USER, "category_ids": [1]}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = post_json(
        &store,
        "/api/save-preferences",
        json!({"attendee_id": ATTENDEE_USER, "category_ids": [1, 2, 2], "club_ids": [ROBOTICS_CLUB]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({"categories_saved": 2, "clubs_saved": 1}));

    let data = store.data.lock().unwrap();
    assert!(data.category_preferences.contains(&(ATTENDEE, 2)));
    assert_eq!(data.memberships.get(&(ROBOTICS_CLUB, ATTENDEE)), Some(&true));
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let store = sample_store();
    let app = create_routes(AppState::new(store), false);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .header("x-request-id", "trace-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers().get(&X_REQUEST_ID).unwrap(), "trace-42");
}
