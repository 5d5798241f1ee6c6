//! Domain models used by the backend: lessons, their origin, and stored attempts.

use serde::{Deserialize, Serialize};

use crate::quiz::{AttemptScore, Question};

/// Where did the lesson come from?
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LessonSource {
  Config,    // from the TOML lesson bank
  Authored,  // created or replaced through the API
  Seed,      // built-in sample
  Game,      // drawn for a quiz-game round
}

/// Lesson record as the store keeps it. Questions carry no editor positions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Lesson {
  pub id: String,
  pub title: String,
  #[serde(default)] pub color: String,
  #[serde(default)] pub tags: Vec<String>,
  pub questions: Vec<Question>,
  pub source: LessonSource,
}

/// One graded submission of a lesson.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
  pub id: String,
  pub lesson_id: String,
  pub student: String,
  #[serde(flatten)]
  pub score: AttemptScore,
}
