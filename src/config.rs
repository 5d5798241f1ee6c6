//! Loading app configuration (explanation prompts + optional lesson bank) from TOML.
//!
//! See `AppConfig` and `Prompts` for expected schema. Lessons are written in
//! the quiz text format:
//!
//! ```toml
//! [[lessons]]
//! title = "Forces"
//! tags = ["physics"]
//! text = """
//! Câu 1: 1 Newton + 1 Newton = ?
//! Answer: 2
//! """
//! ```

use serde::Deserialize;
use tracing::{info, error};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub lessons: Vec<LessonCfg>,
}

/// Lesson entry accepted in TOML configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct LessonCfg {
  #[serde(default)] pub id: Option<String>,
  pub title: String,
  #[serde(default)] pub color: Option<String>,
  #[serde(default)] pub tags: Vec<String>,
  pub text: String,
}

/// Prompts used by the OpenAI client for answer explanations.
/// Placeholders: {question}, {options}, {correct}, {student_answer}.
#[derive(Clone, Debug, Deserialize)]
pub struct Prompts {
  pub explanation_system: String,
  pub explanation_user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      explanation_system: "You are a patient teacher. Explain quiz answers in 2-4 short sentences. Plain text only; keep LaTeX ($...$) as-is.".into(),
      explanation_user_template: "Question: {question}\nOptions:\n{options}\nCorrect answer: {correct}\nStudent answer: {student_answer}\n\nExplain why the correct answer is right. If the student answer is wrong, say briefly what misconception it suggests.".into(),
    }
  }
}

/// Attempt to load `AppConfig` from LESSON_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_app_config_from_env() -> Option<AppConfig> {
  let path = std::env::var("LESSON_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<AppConfig>(&s) {
      Ok(cfg) => {
        info!(target: "quizdesk_backend", %path, lessons = cfg.lessons.len(), "Loaded app config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "quizdesk_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "quizdesk_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
