//! Question model shared by the parser, renderer, validator and grading.
//!
//! The JSON shape is what lessons persist and what the editor preview consumes:
//! `{ "text", "points", "kind", "options", "correctAnswer", "sourceStartLine" }`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Multiple-choice questions always carry this many options once normalized.
pub const MC_OPTION_COUNT: usize = 4;

/// Option letters, by position.
pub const OPTION_LETTERS: [char; MC_OPTION_COUNT] = ['a', 'b', 'c', 'd'];

pub fn letter_for_index(index: usize) -> Option<char> {
  OPTION_LETTERS.get(index).copied()
}

pub fn index_for_letter(letter: char) -> Option<usize> {
  let lower = letter.to_ascii_lowercase();
  OPTION_LETTERS.iter().position(|l| *l == lower)
}

/// One answer option. `source_line` is the 0-based line the option started on,
/// only present for questions that came out of the text parser.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizOption {
  #[serde(default)]
  pub text: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source_line: Option<usize>,
}

impl QuizOption {
  pub fn new(text: impl Into<String>) -> Self {
    Self { text: text.into(), source_line: None }
  }

  /// Empty placeholder used when padding multiple-choice questions.
  pub fn blank() -> Self {
    Self::default()
  }
}

/// Expected answer of a true/false question.
///
/// Older lessons store a single boolean for a one-statement question; the text
/// format always produces one boolean per option.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrueFalseAnswer {
  Single(bool),
  PerStatement(Vec<bool>),
}

impl Default for TrueFalseAnswer {
  fn default() -> Self { TrueFalseAnswer::PerStatement(Vec::new()) }
}

impl TrueFalseAnswer {
  /// Boolean expected for the statement at `index`, if any.
  pub fn get(&self, index: usize) -> Option<bool> {
    match self {
      TrueFalseAnswer::Single(b) => (index == 0).then_some(*b),
      TrueFalseAnswer::PerStatement(v) => v.get(index).copied(),
    }
  }

  pub fn len(&self) -> usize {
    match self {
      TrueFalseAnswer::Single(_) => 1,
      TrueFalseAnswer::PerStatement(v) => v.len(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

/// Kind-specific part of a question.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum QuestionBody {
  #[serde(rename_all = "camelCase")]
  MultipleChoice {
    #[serde(default)]
    options: Vec<QuizOption>,
    #[serde(default, with = "letter_answer")]
    correct_answer: Option<char>,
  },
  #[serde(rename_all = "camelCase")]
  TrueFalse {
    #[serde(default)]
    options: Vec<QuizOption>,
    #[serde(default)]
    correct_answer: TrueFalseAnswer,
  },
  #[serde(rename_all = "camelCase")]
  Numeric {
    #[serde(default)]
    correct_answer: String,
  },
  Invalid,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionKind {
  MultipleChoice,
  TrueFalse,
  Numeric,
  Invalid,
}

impl fmt::Display for QuestionKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      QuestionKind::MultipleChoice => "multiple-choice",
      QuestionKind::TrueFalse => "true-false",
      QuestionKind::Numeric => "numeric",
      QuestionKind::Invalid => "invalid",
    };
    f.write_str(s)
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
  #[serde(default)]
  pub text: String,
  #[serde(default = "default_points")]
  pub points: u32,
  #[serde(flatten)]
  pub body: QuestionBody,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source_start_line: Option<usize>,
}

fn default_points() -> u32 { 1 }

impl Question {
  pub fn new(text: impl Into<String>, body: QuestionBody) -> Self {
    Self { text: text.into(), points: 1, body, source_start_line: None }
  }

  pub fn kind(&self) -> QuestionKind {
    match self.body {
      QuestionBody::MultipleChoice { .. } => QuestionKind::MultipleChoice,
      QuestionBody::TrueFalse { .. } => QuestionKind::TrueFalse,
      QuestionBody::Numeric { .. } => QuestionKind::Numeric,
      QuestionBody::Invalid => QuestionKind::Invalid,
    }
  }

  /// Options of choice-based questions; empty for numeric and invalid ones.
  pub fn options(&self) -> &[QuizOption] {
    match &self.body {
      QuestionBody::MultipleChoice { options, .. } | QuestionBody::TrueFalse { options, .. } => options,
      QuestionBody::Numeric { .. } | QuestionBody::Invalid => &[],
    }
  }

  /// Same question with editor line positions dropped. Stored lessons keep
  /// only content.
  pub fn without_source_positions(&self) -> Question {
    let mut q = self.clone();
    q.source_start_line = None;
    match &mut q.body {
      QuestionBody::MultipleChoice { options, .. } | QuestionBody::TrueFalse { options, .. } => {
        for o in options.iter_mut() {
          o.source_line = None;
        }
      }
      QuestionBody::Numeric { .. } | QuestionBody::Invalid => {}
    }
    q
  }

  /// Copy safe to hand to students: expected answers are blanked.
  pub fn without_answers(&self) -> Question {
    let mut q = self.without_source_positions();
    q.body = match q.body {
      QuestionBody::MultipleChoice { options, .. } => QuestionBody::MultipleChoice { options, correct_answer: None },
      QuestionBody::TrueFalse { options, .. } => QuestionBody::TrueFalse { options, correct_answer: TrueFalseAnswer::default() },
      QuestionBody::Numeric { .. } => QuestionBody::Numeric { correct_answer: String::new() },
      QuestionBody::Invalid => QuestionBody::Invalid,
    };
    q
  }
}

/// Multiple-choice answers travel as a one-letter string, `""` when missing.
mod letter_answer {
  use serde::{Deserialize, Deserializer, Serializer};

  use super::index_for_letter;

  pub fn serialize<S: Serializer>(value: &Option<char>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
      Some(c) => serializer.serialize_str(c.encode_utf8(&mut [0; 4])),
      None => serializer.serialize_str(""),
    }
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<char>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
    let mut chars = raw.trim().chars();
    Ok(match (chars.next(), chars.next()) {
      (Some(c), None) if index_for_letter(c).is_some() => Some(c.to_ascii_lowercase()),
      _ => None,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;
  use serde_json::json;

  #[test]
  fn multiple_choice_serializes_in_lesson_shape() {
    let q = Question::new(
      "Why did the apple fall?",
      QuestionBody::MultipleChoice {
        options: vec![QuizOption::new("Wind"), QuizOption::new("Gravity")],
        correct_answer: Some('b'),
      },
    );
    let v = serde_json::to_value(&q).unwrap();
    assert_eq!(
      v,
      json!({
        "text": "Why did the apple fall?",
        "points": 1,
        "kind": "multiple-choice",
        "options": [{ "text": "Wind" }, { "text": "Gravity" }],
        "correctAnswer": "b"
      })
    );
  }

  #[test]
  fn missing_letter_serializes_as_empty_string() {
    let q = Question::new("Q", QuestionBody::MultipleChoice { options: vec![], correct_answer: None });
    let v = serde_json::to_value(&q).unwrap();
    assert_eq!(v["correctAnswer"], json!(""));
  }

  #[test]
  fn stored_lessons_deserialize_with_legacy_shapes() {
    let single: Question = serde_json::from_value(json!({
      "text": "The earth is flat.",
      "kind": "true-false",
      "correctAnswer": false
    }))
    .unwrap();
    assert_eq!(single.points, 1);
    assert_eq!(
      single.body,
      QuestionBody::TrueFalse { options: vec![], correct_answer: TrueFalseAnswer::Single(false) }
    );

    let upper: Question = serde_json::from_value(json!({
      "text": "Pick",
      "points": 3,
      "kind": "multiple-choice",
      "options": [{ "text": "x" }],
      "correctAnswer": "C"
    }))
    .unwrap();
    assert_eq!(upper.points, 3);
    assert_eq!(
      upper.body,
      QuestionBody::MultipleChoice { options: vec![QuizOption::new("x")], correct_answer: Some('c') }
    );
  }

  #[test]
  fn without_answers_blanks_expected_values() {
    let q = Question::new(
      "Is it?",
      QuestionBody::TrueFalse {
        options: vec![QuizOption::new("Yes")],
        correct_answer: TrueFalseAnswer::PerStatement(vec![true]),
      },
    );
    let hidden = q.without_answers();
    assert_eq!(hidden.options().len(), 1);
    assert!(matches!(hidden.body, QuestionBody::TrueFalse { ref correct_answer, .. } if correct_answer.is_empty()));
  }

  #[test]
  fn letters_map_to_positions() {
    assert_eq!(index_for_letter('C'), Some(2));
    assert_eq!(index_for_letter('e'), None);
    assert_eq!(letter_for_index(3), Some('d'));
    assert_eq!(letter_for_index(4), None);
  }
}
