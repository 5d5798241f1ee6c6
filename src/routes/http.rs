//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;
use axum::{extract::{Path, Query, State}, http::StatusCode, Json, response::IntoResponse};
use tracing::{info, instrument};

use crate::domain::Lesson;
use crate::error::{ApiError, ApiResult};
use crate::logic::*;
use crate::protocol::*;
use crate::quiz::{self, LessonStats};
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

// ---- Editor ----

#[instrument(level = "info", skip(body), fields(text_len = body.text.len()))]
pub async fn http_post_parse(Json(body): Json<EditorTextIn>) -> Json<EditorReportOut> {
  Json(editor_parse(&body.text))
}

#[instrument(level = "info", skip(body), fields(count = body.questions.len()))]
pub async fn http_post_render(Json(body): Json<QuestionsIn>) -> Json<RenderOut> {
  Json(RenderOut { text: editor_render(&body.questions) })
}

#[instrument(level = "info", skip(body), fields(count = body.questions.len()))]
pub async fn http_post_validate(Json(body): Json<QuestionsIn>) -> Json<EditorReportOut> {
  Json(editor_validate(body.questions))
}

// ---- Lessons ----

#[instrument(level = "info", skip(state))]
pub async fn http_list_lessons(State(state): State<Arc<AppState>>) -> Json<Vec<LessonSummaryOut>> {
  let lessons = state.list_lessons().await;
  Json(lessons.iter().map(LessonSummaryOut::from).collect())
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_create_lesson(
  State(state): State<Arc<AppState>>,
  Json(body): Json<LessonIn>,
) -> ApiResult<(StatusCode, Json<LessonSavedOut>)> {
  let saved = create_lesson(&state, body).await?;
  Ok((StatusCode::CREATED, Json(saved)))
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_lesson(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> ApiResult<Json<Lesson>> {
  Ok(Json(require_lesson(&state, &id).await?))
}

#[instrument(level = "info", skip(state, body), fields(%id))]
pub async fn http_put_lesson(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<LessonIn>,
) -> ApiResult<Json<LessonSavedOut>> {
  Ok(Json(replace_lesson(&state, &id, body).await?))
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_delete_lesson(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> ApiResult<StatusCode> {
  if state.remove_lesson(&id).await {
    info!(target: "lesson", %id, "Lesson deleted");
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::LessonNotFound(id))
  }
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_lesson_text(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> ApiResult<Json<LessonTextOut>> {
  let lesson = require_lesson(&state, &id).await?;
  Ok(Json(LessonTextOut { text: quiz::render(&lesson.questions), id }))
}

#[instrument(level = "info", skip(state), fields(%id, shuffle = q.shuffle))]
pub async fn http_get_play(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Query(q): Query<PlayQuery>,
) -> ApiResult<Json<PlayOut>> {
  let lesson = require_lesson(&state, &id).await?;
  Ok(Json(play_view(&lesson, q.shuffle)))
}

#[instrument(level = "info", skip(state, body), fields(%id, answers = body.answers.len()))]
pub async fn http_post_attempt(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<AttemptIn>,
) -> ApiResult<(StatusCode, Json<AttemptOut>)> {
  let out = submit_attempt(&state, &id, body).await?;
  Ok((StatusCode::CREATED, Json(out)))
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_stats(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> ApiResult<Json<LessonStats>> {
  Ok(Json(lesson_stats(&state, &id).await?))
}

#[instrument(level = "info", skip(state, body), fields(%id, question = body.question_index))]
pub async fn http_post_explain(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<ExplainIn>,
) -> ApiResult<Json<ExplainOut>> {
  let out = explain(&state, &id, body).await?;
  info!(target: "lesson", %id, source = out.source, "Explanation served");
  Ok(Json(out))
}

// ---- Quiz game ----

#[instrument(level = "info", skip(state), fields(count = ?q.count))]
pub async fn http_get_game(
  State(state): State<Arc<AppState>>,
  Query(q): Query<GameQuery>,
) -> Json<PlayOut> {
  let lesson = state.draw_game(q.count.unwrap_or(10)).await;
  Json(play_view(&lesson, false))
}
