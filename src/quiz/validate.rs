//! Normalization and advisory diagnostics for question sequences.
//!
//! Normalization is idempotent and only ever touches structure:
//!   - a choice question without options becomes `Invalid`
//!   - multiple-choice options are padded/truncated to exactly four
//!
//! Diagnostics never block anything here. Callers pick their own policy
//! (the HTTP layer refuses to save lessons with error-level findings).

use serde::{Deserialize, Serialize};

use super::model::{index_for_letter, Question, QuestionBody, QuizOption, TrueFalseAnswer, MC_OPTION_COUNT};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
  Error,
  Warning,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
  pub question_index: usize,
  #[serde(rename = "kind")]
  pub severity: Severity,
  pub message: String,
}

impl Diagnostic {
  pub fn error(question_index: usize, message: impl Into<String>) -> Self {
    Self { question_index, severity: Severity::Error, message: message.into() }
  }

  pub fn warning(question_index: usize, message: impl Into<String>) -> Self {
    Self { question_index, severity: Severity::Warning, message: message.into() }
  }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
  pub questions: Vec<Question>,
  pub diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
  pub fn has_errors(&self) -> bool {
    self.diagnostics.iter().any(|d| d.severity == Severity::Error)
  }

  pub fn error_count(&self) -> usize {
    self.diagnostics.iter().filter(|d| d.severity == Severity::Error).count()
  }

  pub fn warning_count(&self) -> usize {
    self.diagnostics.len() - self.error_count()
  }
}

/// Apply the structural rules to one question.
pub fn normalize(mut question: Question) -> Question {
  let no_options = question.options().is_empty();
  let reclassify = match &question.body {
    QuestionBody::MultipleChoice { .. } => no_options,
    // A lone boolean with no statements is the old single-statement form;
    // the prompt itself is the statement.
    QuestionBody::TrueFalse { correct_answer: TrueFalseAnswer::Single(_), .. } => false,
    QuestionBody::TrueFalse { .. } => no_options,
    QuestionBody::Numeric { .. } | QuestionBody::Invalid => false,
  };
  if reclassify {
    question.body = QuestionBody::Invalid;
    return question;
  }

  if let QuestionBody::MultipleChoice { options, .. } = &mut question.body {
    if options.len() > MC_OPTION_COUNT {
      options.truncate(MC_OPTION_COUNT);
    }
    while options.len() < MC_OPTION_COUNT {
      options.push(QuizOption::blank());
    }
  }
  question
}

pub fn normalize_all(questions: Vec<Question>) -> Vec<Question> {
  questions.into_iter().map(normalize).collect()
}

/// Normalize and report structural findings, one pass over the sequence.
pub fn validate(questions: Vec<Question>) -> ValidationReport {
  let questions = normalize_all(questions);
  let mut diagnostics = Vec::new();

  for (i, q) in questions.iter().enumerate() {
    match &q.body {
      QuestionBody::Invalid => {
        diagnostics.push(Diagnostic::error(i, "Question has no options and no answer line"));
      }
      QuestionBody::MultipleChoice { options, correct_answer } => match correct_answer {
        None => diagnostics.push(Diagnostic::warning(i, "Missing correct answer marker (*)")),
        Some(letter) => {
          let empty = index_for_letter(*letter)
            .and_then(|idx| options.get(idx))
            .map_or(true, |o| o.text.trim().is_empty());
          if empty {
            diagnostics.push(Diagnostic::warning(
              i,
              format!("Correct answer {} points at an empty option", letter.to_ascii_uppercase()),
            ));
          }
        }
      },
      QuestionBody::TrueFalse { options, correct_answer: TrueFalseAnswer::PerStatement(answers) } => {
        if answers.len() != options.len() {
          diagnostics.push(Diagnostic::warning(
            i,
            format!("{} statements but {} True/False markers", options.len(), answers.len()),
          ));
        }
      }
      QuestionBody::TrueFalse { .. } | QuestionBody::Numeric { .. } => {}
    }
  }

  ValidationReport { questions, diagnostics }
}
