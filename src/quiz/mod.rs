//! Quiz content: the text authoring format and everything computed from it.
//!
//! All functions here are pure and synchronous; each call owns its output.

pub mod grading;
pub mod model;
pub mod parser;
pub mod render;
pub mod stats;
pub mod validate;

pub use grading::{grade, grade_attempt, AttemptScore, GradedAnswer, SubmittedAnswer};
pub use model::{Question, QuestionBody, QuestionKind, QuizOption, TrueFalseAnswer};
pub use parser::{parse, parse_document, ParsedDocument};
pub use render::render;
pub use stats::LessonStats;
pub use validate::{validate, Diagnostic, Severity, ValidationReport};

/// Parse and validate in one go: parse-time findings first, then structural
/// ones, ordered by question.
pub fn analyze(raw: &str) -> ValidationReport {
  let ParsedDocument { questions, diagnostics: parse_diagnostics } = parse_document(raw);
  let mut report = validate(questions);

  let mut diagnostics = parse_diagnostics;
  diagnostics.append(&mut report.diagnostics);
  diagnostics.sort_by_key(|d| d.question_index);
  report.diagnostics = diagnostics;
  report
}
