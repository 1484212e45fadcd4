#![cfg(feature = "sqlite-store")]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use time::{Duration, OffsetDateTime, format_description::well_known::Rfc3339};
use tower::ServiceExt;

use ritual_quiz_back::{
    config::AppConfig,
    dao::quiz_store::sqlite::SqliteQuizStore,
    routes,
    state::{AppState, SharedState},
};

const HOST: i64 = 1;
const ANA: i64 = 2;
const BEA: i64 = 3;

async fn app() -> (Router, SharedState) {
    let store = SqliteQuizStore::open_in_memory().unwrap();
    let state = AppState::with_store(AppConfig::default(), Arc::new(store)).await;
    (routes::router(state.clone()), state)
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    identity: Option<(i64, &str)>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((user_id, role)) = identity {
        builder = builder
            .header("x-user-id", user_id.to_string())
            .header("x-user-role", role);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Seed a host, two players and a started private room with two questions.
async fn started_room(app: &Router) -> (i64, Vec<i64>) {
    for (user_id, role, username) in [
        (HOST, "host", "quizmaster"),
        (ANA, "participant", "ana"),
        (BEA, "participant", "bea"),
    ] {
        let (status, _) = call(
            app,
            "PUT",
            "/users/me",
            Some((user_id, role)),
            Some(json!({ "username": username })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let start = (OffsetDateTime::now_utc() - Duration::seconds(5))
        .format(&Rfc3339)
        .unwrap();
    let (status, room) = call(
        app,
        "POST",
        "/rooms",
        Some((HOST, "host")),
        Some(json!({ "title": "Andes", "timePerQuestion": 30, "startTime": start })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let room_id = room["id"].as_i64().unwrap();

    let mut question_ids = Vec::new();
    for text in ["Capital of Peru?", "Capital of Bolivia?"] {
        let (status, question) = call(
            app,
            "POST",
            &format!("/rooms/{room_id}/questions"),
            Some((HOST, "host")),
            Some(json!({ "text": text, "options": ["Lima", "La Paz"], "correctAnswerIndex": 0 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        question_ids.push(question["id"].as_i64().unwrap());
    }

    for user_id in [ANA, BEA] {
        let (status, _) = call(
            app,
            "POST",
            &format!("/rooms/{room_id}/join"),
            Some((user_id, "participant")),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    (room_id, question_ids)
}

async fn submit(app: &Router, user_id: i64, room_id: i64, question_id: i64, selected: u32) -> StatusCode {
    let (status, _) = call(
        app,
        "POST",
        "/answers/submit",
        Some((user_id, "participant")),
        Some(json!({ "roomId": room_id, "questionId": question_id, "selectedIndex": selected })),
    )
    .await;
    status
}

#[tokio::test]
async fn synchronized_submission_is_scored_from_the_clock() {
    let (app, _state) = app().await;
    let (room_id, questions) = started_room(&app).await;

    let (status, outcome) = call(
        &app,
        "POST",
        "/answers/submit",
        Some((ANA, "participant")),
        Some(json!({ "roomId": room_id, "questionId": questions[0], "selectedIndex": 0 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["isCorrect"], json!(true));
    assert_eq!(outcome["timePerQuestion"], json!(30));
    let time_left = outcome["timeLeft"].as_u64().unwrap();
    assert!(matches!(time_left, 24 | 25), "unexpected time left {time_left}");
    let expected_score = if time_left == 25 { 83 } else { 80 };
    assert_eq!(outcome["score"], json!(expected_score));
}

#[tokio::test]
async fn resubmission_keeps_one_answer_and_updates_standings() {
    let (app, _state) = app().await;
    let (room_id, questions) = started_room(&app).await;
    let question_id = questions[0];

    assert_eq!(submit(&app, ANA, room_id, question_id, 0).await, StatusCode::OK);
    assert_eq!(submit(&app, ANA, room_id, question_id, 1).await, StatusCode::OK);
    assert_eq!(submit(&app, BEA, room_id, question_id, 0).await, StatusCode::OK);

    let (_, mine) = call(
        &app,
        "GET",
        &format!("/answers/my/{room_id}"),
        Some((ANA, "participant")),
        None,
    )
    .await;
    let mine = mine.as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["selectedIndex"], json!(1));
    assert_eq!(mine[0]["isCorrect"], json!(false));

    let (status, board) = call(&app, "GET", &format!("/answers/leaderboard/{room_id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    let usernames: Vec<_> = board
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["username"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(usernames, vec!["bea", "ana"]);
    assert_eq!(board[1]["score"], json!(0));

    let (_, standing) = call(
        &app,
        "GET",
        &format!("/rooms/{room_id}/standing"),
        Some((ANA, "participant")),
        None,
    )
    .await;
    assert_eq!(standing["position"], json!(2));
    assert_eq!(standing["answered"], json!(1));
    assert_eq!(standing["completed"], json!(false));

    let (_, statuses) = call(
        &app,
        "POST",
        "/answers/my-status",
        Some((BEA, "participant")),
        Some(json!({ "roomIds": [room_id, room_id + 50] })),
    )
    .await;
    assert_eq!(
        statuses,
        json!([
            { "roomId": room_id, "participated": true, "completed": false },
            { "roomId": room_id + 50, "participated": false, "completed": false }
        ])
    );
}

#[tokio::test]
async fn game_state_is_served_on_demand() {
    let (app, _state) = app().await;
    let (room_id, questions) = started_room(&app).await;

    let (status, game) = call(&app, "GET", &format!("/rooms/{room_id}/game"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(game["finished"], json!(false));
    assert_eq!(game["index"], json!(0));
    assert_eq!(game["total"], json!(2));
    assert_eq!(game["question"]["id"], json!(questions[0]));
    assert!(game["question"].get("correctAnswerIndex").is_none());
}

#[tokio::test]
async fn requests_without_identity_are_rejected() {
    let (app, _state) = app().await;
    let (room_id, questions) = started_room(&app).await;

    let (status, body) = call(
        &app,
        "POST",
        "/answers/submit",
        None,
        Some(json!({ "roomId": room_id, "questionId": questions[0], "selectedIndex": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["message"].as_str().unwrap().contains("identity"));

    let (status, _) = call(
        &app,
        "POST",
        "/answers/submit",
        Some((77, "participant")),
        Some(json!({ "roomId": room_id, "questionId": questions[0], "selectedIndex": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn mismatched_question_is_not_found() {
    let (app, _state) = app().await;
    let (room_id, questions) = started_room(&app).await;

    let (status, _) = call(
        &app,
        "POST",
        "/answers/submit",
        Some((ANA, "participant")),
        Some(json!({ "roomId": room_id + 1, "questionId": questions[0], "selectedIndex": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn degraded_backend_answers_service_unavailable() {
    let state = AppState::new(AppConfig::default());
    let app = routes::router(state);

    let (status, _) = call(&app, "GET", "/answers/leaderboard-global", None, None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn flagged_backend_answers_service_unavailable() {
    let (app, state) = app().await;
    let (room_id, _) = started_room(&app).await;

    state.update_degraded(true);
    let (status, body) = call(&app, "GET", &format!("/answers/leaderboard/{room_id}"), None, None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["message"].is_string());

    state.update_degraded(false);
    let (status, _) = call(&app, "GET", &format!("/answers/leaderboard/{room_id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn malformed_bodies_are_bad_requests() {
    let (app, _state) = app().await;
    let (room_id, questions) = started_room(&app).await;

    for body in [
        json!({ "roomId": room_id, "questionId": questions[0] }),
        json!({ "roomId": room_id, "questionId": "abc", "selectedIndex": 0 }),
    ] {
        let (status, error) = call(&app, "POST", "/answers/submit", Some((ANA, "participant")), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(error["message"].is_string());
    }

    let (status, error) = call(
        &app,
        "PUT",
        "/users/me",
        Some((ANA, "participant")),
        Some(json!({ "username": "a b" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error["message"].is_string());
}
