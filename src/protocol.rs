//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{Attempt, Lesson, LessonSource};
use crate::quiz::{Diagnostic, Question, SubmittedAnswer, ValidationReport};
use crate::quiz::stats::Tier;

/// Messages the editor can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    Parse {
        text: String,
    },
    Render {
        questions: Vec<Question>,
    },
    Validate {
        questions: Vec<Question>,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Parsed {
        #[serde(flatten)]
        report: EditorReportOut,
    },
    Rendered {
        text: String,
    },
    Validated {
        #[serde(flatten)]
        report: EditorReportOut,
    },
    Error {
        message: String,
    },
}

/// Live-preview payload shared by HTTP and WS.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorReportOut {
    pub questions: Vec<Question>,
    pub diagnostics: Vec<Diagnostic>,
    pub errors: usize,
    pub warnings: usize,
    pub can_save: bool,
}

impl From<ValidationReport> for EditorReportOut {
    fn from(report: ValidationReport) -> Self {
        let errors = report.error_count();
        let warnings = report.warning_count();
        EditorReportOut {
            questions: report.questions,
            diagnostics: report.diagnostics,
            errors,
            warnings,
            can_save: errors == 0,
        }
    }
}

//
// HTTP request/response DTOs
//

#[derive(Deserialize)]
pub struct EditorTextIn {
    pub text: String,
}

#[derive(Deserialize)]
pub struct QuestionsIn {
    pub questions: Vec<Question>,
}

#[derive(Serialize)]
pub struct RenderOut {
    pub text: String,
}

/// Create/replace body: either quiz `text` or a `questions` array.
#[derive(Debug, Deserialize)]
pub struct LessonIn {
    pub title: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub questions: Option<Vec<Question>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonSummaryOut {
    pub id: String,
    pub title: String,
    pub color: String,
    pub tags: Vec<String>,
    pub question_count: usize,
    pub source: LessonSource,
}

impl From<&Lesson> for LessonSummaryOut {
    fn from(l: &Lesson) -> Self {
        LessonSummaryOut {
            id: l.id.clone(),
            title: l.title.clone(),
            color: l.color.clone(),
            tags: l.tags.clone(),
            question_count: l.questions.len(),
            source: l.source,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LessonSavedOut {
    pub lesson: Lesson,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Serialize)]
pub struct LessonTextOut {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct PlayQuery {
    #[serde(default)]
    pub shuffle: bool,
}

/// Student view of one question; `index` is its position in the lesson.
#[derive(Serialize)]
pub struct PlayQuestion {
    pub index: usize,
    #[serde(flatten)]
    pub question: Question,
}

#[derive(Serialize)]
pub struct PlayOut {
    pub id: String,
    pub title: String,
    pub color: String,
    pub questions: Vec<PlayQuestion>,
}

/// `answers` is positional over the lesson's question order.
#[derive(Deserialize)]
pub struct AttemptIn {
    pub student: String,
    #[serde(default)]
    pub answers: Vec<Option<SubmittedAnswer>>,
}

#[derive(Serialize)]
pub struct AttemptOut {
    #[serde(flatten)]
    pub attempt: Attempt,
    pub tier: Tier,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainIn {
    pub question_index: usize,
    #[serde(default)]
    pub answer: Option<SubmittedAnswer>,
}

#[derive(Serialize)]
pub struct ExplainOut {
    pub text: String,
    pub source: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct GameQuery {
    pub count: Option<usize>,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
