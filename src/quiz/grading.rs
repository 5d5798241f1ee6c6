//! Grading of submitted answers against the question model.
//!
//! - multiple-choice: option index equality (a letter is accepted too)
//! - numeric: exact string equality after trimming both sides; JSON numbers
//!   compare by their written form
//! - true/false: every statement must match to count as correct; points are
//!   awarded per matched statement

use serde::{Deserialize, Serialize};

use super::model::{index_for_letter, Question, QuestionBody, TrueFalseAnswer};

/// What a student sent for one question.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubmittedAnswer {
  Flag(bool),
  Choice(usize),
  /// Any JSON number that is not an index, e.g. `2.5` or `-3`.
  Number(serde_json::Number),
  Flags(Vec<bool>),
  Text(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedAnswer {
  pub question_index: usize,
  pub answered: bool,
  pub is_correct: bool,
  pub earned_points: f32,
  pub max_points: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptScore {
  pub answers: Vec<GradedAnswer>,
  pub score: f32,
  pub max_score: u32,
  pub percentage: f32,
}

/// Grade one question. Unanswered and wrongly shaped answers earn nothing.
pub fn grade(question_index: usize, question: &Question, submitted: Option<&SubmittedAnswer>) -> GradedAnswer {
  let max_points = match question.body {
    QuestionBody::Invalid => 0,
    _ => question.points,
  };
  let fraction = submitted.map_or(0.0, |answer| credit(&question.body, answer));

  GradedAnswer {
    question_index,
    answered: submitted.is_some(),
    is_correct: fraction >= 1.0,
    earned_points: round2(max_points as f32 * fraction),
    max_points,
  }
}

/// Grade a whole attempt; `answers` is positional and may be shorter than
/// the question list.
pub fn grade_attempt(questions: &[Question], answers: &[Option<SubmittedAnswer>]) -> AttemptScore {
  let graded: Vec<GradedAnswer> = questions
    .iter()
    .enumerate()
    .map(|(i, q)| grade(i, q, answers.get(i).and_then(Option::as_ref)))
    .collect();

  let score = round2(graded.iter().map(|g| g.earned_points).sum());
  let max_score: u32 = graded.iter().map(|g| g.max_points).sum();
  AttemptScore { percentage: percentage(score, max_score), answers: graded, score, max_score }
}

pub fn percentage(score: f32, max_score: u32) -> f32 {
  if max_score == 0 {
    return 0.0;
  }
  round1(score / max_score as f32 * 100.0)
}

/// Share of the question's points earned, in `0.0..=1.0`.
fn credit(body: &QuestionBody, answer: &SubmittedAnswer) -> f32 {
  match (body, answer) {
    (QuestionBody::MultipleChoice { correct_answer: Some(letter), .. }, _) => {
      let chosen = match answer {
        SubmittedAnswer::Choice(i) => Some(*i),
        SubmittedAnswer::Text(t) => single_letter(t).and_then(index_for_letter),
        _ => None,
      };
      all_or_nothing(chosen.is_some() && chosen == index_for_letter(*letter))
    }
    (QuestionBody::Numeric { correct_answer }, SubmittedAnswer::Text(t)) => {
      all_or_nothing(t.trim() == correct_answer.trim())
    }
    (QuestionBody::Numeric { correct_answer }, SubmittedAnswer::Choice(n)) => {
      all_or_nothing(n.to_string() == correct_answer.trim())
    }
    (QuestionBody::Numeric { correct_answer }, SubmittedAnswer::Number(n)) => {
      all_or_nothing(n.to_string() == correct_answer.trim())
    }
    (QuestionBody::TrueFalse { correct_answer: TrueFalseAnswer::Single(expected), .. }, _) => {
      let given = match answer {
        SubmittedAnswer::Flag(b) => Some(*b),
        SubmittedAnswer::Flags(v) if v.len() == 1 => v.first().copied(),
        _ => None,
      };
      all_or_nothing(given == Some(*expected))
    }
    (QuestionBody::TrueFalse { correct_answer: TrueFalseAnswer::PerStatement(expected), .. }, _) => {
      let given: &[bool] = match answer {
        SubmittedAnswer::Flags(v) => v,
        SubmittedAnswer::Flag(b) => std::slice::from_ref(b),
        _ => &[],
      };
      statements_credit(expected, given)
    }
    _ => 0.0,
  }
}

fn statements_credit(expected: &[bool], given: &[bool]) -> f32 {
  if expected.is_empty() || given.len() != expected.len() {
    return 0.0;
  }
  let matched = expected.iter().zip(given).filter(|(e, g)| e == g).count();
  matched as f32 / expected.len() as f32
}

fn single_letter(t: &str) -> Option<char> {
  let mut chars = t.trim().chars();
  match (chars.next(), chars.next()) {
    (Some(c), None) => Some(c),
    _ => None,
  }
}

fn all_or_nothing(ok: bool) -> f32 {
  if ok { 1.0 } else { 0.0 }
}

fn round1(x: f32) -> f32 { (x * 10.0).round() / 10.0 }
fn round2(x: f32) -> f32 { (x * 100.0).round() / 100.0 }
