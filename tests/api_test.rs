use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use pretty_assertions::assert_eq;
use quizdesk_backend::{build_router, seeds::SAMPLE_LESSON_ID, state::MAX_STORED_GAMES, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    build_router(Arc::new(AppState::from_parts(None, None)))
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(v) => Body::from(v.to_string()),
            None => Body::empty(),
        })
        .expect("request build should succeed");
    let resp = app.clone().oneshot(req).await.expect("router should respond");
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.expect("body should be readable");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body should be JSON")
    };
    (status, value)
}

#[tokio::test]
async fn health_is_ok() {
    let (status, body) = call(&app(), Method::GET, "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));
}

#[tokio::test]
async fn editor_parse_reports_padding_and_missing_marker() {
    let (status, body) = call(
        &app(),
        Method::POST,
        "/api/v1/editor/parse",
        Some(json!({ "text": "Câu 1: Pick one\nA. X\nB. Y\n" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["questions"][0]["kind"], "multiple-choice");
    assert_eq!(body["questions"][0]["options"].as_array().unwrap().len(), 4);
    assert_eq!(body["questions"][0]["options"][0]["sourceLine"], 1);
    assert_eq!(body["questions"][0]["correctAnswer"], "");
    assert_eq!(body["diagnostics"][0]["kind"], "warning");
    assert_eq!(body["canSave"], true);
}

#[tokio::test]
async fn editor_render_and_validate() {
    let app = app();
    let questions = json!([
        { "text": "Is time travel possible?", "kind": "true-false",
          "options": [{ "text": "No" }, { "text": "Maybe" }], "correctAnswer": [false, true] },
        { "text": "Empty", "kind": "multiple-choice", "options": [] }
    ]);

    let (status, body) = call(&app, Method::POST, "/api/v1/editor/render", Some(json!({ "questions": questions }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["text"],
        "Câu 1: Is time travel possible?\nA. No [False]\nB. Maybe [True]\n\nCâu 2: Empty\n"
    );

    let (status, body) = call(&app, Method::POST, "/api/v1/editor/validate", Some(json!({ "questions": questions }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["questions"][1]["kind"], "invalid");
    assert_eq!(body["errors"], 1);
    assert_eq!(body["canSave"], false);
}

#[tokio::test]
async fn lesson_lifecycle() {
    let app = app();

    let (status, created) = call(
        &app,
        Method::POST,
        "/api/v1/lessons",
        Some(json!({
            "title": "Forces",
            "color": "#ff0000",
            "tags": ["physics"],
            "text": "Câu 1: 1 Newton + 1 Newton = ?\nAnswer: 2\nCâu 2: Why did the apple fall?\nA. Wind\n*B. Gravity"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["lesson"]["id"].as_str().unwrap().to_string();
    assert_eq!(created["lesson"]["source"], "authored");
    assert!(created["lesson"]["questions"][0].get("sourceStartLine").is_none());

    let (_, list) = call(&app, Method::GET, "/api/v1/lessons", None).await;
    let ids: Vec<&str> = list.as_array().unwrap().iter().map(|l| l["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec![SAMPLE_LESSON_ID, id.as_str()]);

    let (status, text) = call(&app, Method::GET, &format!("/api/v1/lessons/{id}/text"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(text["text"].as_str().unwrap().contains("*B. Gravity"));

    let (status, replaced) = call(
        &app,
        Method::PUT,
        &format!("/api/v1/lessons/{id}"),
        Some(json!({ "title": "Forces v2", "text": "Câu 1: Q\nAnswer: 3" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replaced["lesson"]["title"], "Forces v2");
    assert_eq!(replaced["lesson"]["questions"].as_array().unwrap().len(), 1);

    let (status, _) = call(&app, Method::DELETE, &format!("/api/v1/lessons/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = call(&app, Method::GET, &format!("/api/v1/lessons/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains(&id));
}

#[tokio::test]
async fn invalid_lessons_are_refused_with_diagnostics() {
    let (status, body) = call(
        &app(),
        Method::POST,
        "/api/v1/lessons",
        Some(json!({ "title": "Broken", "text": "Câu 1: Nothing\nCâu 2: Fine\nAnswer: 1" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["diagnostics"][0]["questionIndex"], 0);
    assert_eq!(body["diagnostics"][0]["kind"], "error");
}

#[tokio::test]
async fn attempts_feed_statistics() {
    let app = app();
    let lesson = format!("/api/v1/lessons/{SAMPLE_LESSON_ID}");

    let (status, play) = call(&app, Method::GET, &format!("{lesson}/play"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(play["questions"][1]["correctAnswer"], "");
    assert_eq!(play["questions"][1]["index"], 1);

    // Sample: numeric (1 pt), MC c (1 pt), TF [F, F, T] (2 pts), MC b (1 pt).
    let (status, perfect) = call(
        &app,
        Method::POST,
        &format!("{lesson}/attempts"),
        Some(json!({ "student": "Bao", "answers": ["2", 2, [false, false, true], "b"] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(perfect["percentage"], 100.0);
    assert_eq!(perfect["tier"], "excellent");

    let (_, partial) = call(
        &app,
        Method::POST,
        &format!("{lesson}/attempts"),
        Some(json!({ "student": "An", "answers": ["3", 0] })),
    )
    .await;
    assert_eq!(partial["score"], 0.0);
    assert_eq!(partial["maxScore"], 5);

    let (status, stats) = call(&app, Method::GET, &format!("{lesson}/stats"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["attempts"], 2);
    assert_eq!(stats["ranking"][0]["student"], "Bao");
    assert_eq!(stats["ranking"][1]["rank"], 2);
    assert_eq!(stats["questions"][0]["attempted"], 2);
    assert_eq!(stats["questions"][0]["correct"], 1);
    assert_eq!(stats["questions"][2]["attempted"], 1);

    let (status, _) = call(
        &app,
        Method::POST,
        &format!("{lesson}/attempts"),
        Some(json!({ "student": "  ", "answers": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn numeric_answers_may_be_any_json_number() {
    let (status, attempt) = call(
        &app(),
        Method::POST,
        &format!("/api/v1/lessons/{SAMPLE_LESSON_ID}/attempts"),
        Some(json!({ "student": "Dung", "answers": [2.0, 2] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(attempt["answers"][0]["answered"], true);
    assert_eq!(attempt["answers"][0]["isCorrect"], false);
    assert_eq!(attempt["answers"][1]["isCorrect"], true);
}

#[tokio::test]
async fn explanations_fall_back_to_local_text() {
    let (status, body) = call(
        &app(),
        Method::POST,
        &format!("/api/v1/lessons/{SAMPLE_LESSON_ID}/explain"),
        Some(json!({ "questionIndex": 1, "answer": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "local");
    let text = body["text"].as_str().unwrap();
    assert!(text.contains("C. Because of gravity"));
    assert!(text.contains("A. Because it wanted to"));
}

#[tokio::test]
async fn quiz_game_is_playable_like_a_lesson() {
    let app = app();
    let (status, game) = call(&app, Method::GET, "/api/v1/game?count=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(game["questions"].as_array().unwrap().len(), 2);

    let id = game["id"].as_str().unwrap();
    let (status, attempt) = call(
        &app,
        Method::POST,
        &format!("/api/v1/lessons/{id}/attempts"),
        Some(json!({ "student": "Chi", "answers": [null, null] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(attempt["score"], 0.0);
}

#[tokio::test]
async fn repeated_game_draws_keep_the_store_bounded() {
    let app = app();
    for _ in 0..MAX_STORED_GAMES + 5 {
        let (status, _) = call(&app, Method::GET, "/api/v1/game?count=1", None).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (_, list) = call(&app, Method::GET, "/api/v1/lessons", None).await;
    assert_eq!(list.as_array().unwrap().len(), 1 + MAX_STORED_GAMES);
}
