//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Editor preview (parse / render / validate)
//!   - Building lessons from text or question arrays, refusing invalid ones
//!   - Student view, attempt grading and statistics
//!   - Answer explanations (OpenAI, with a local fallback)

use rand::seq::SliceRandom;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::domain::{Attempt, Lesson, LessonSource};
use crate::error::{ApiError, ApiResult};
use crate::openai::ExplainRequest;
use crate::protocol::{
  AttemptIn, AttemptOut, EditorReportOut, ExplainIn, ExplainOut, LessonIn, LessonSavedOut, PlayOut, PlayQuestion,
};
use crate::quiz::{
  self, grade, grade_attempt, model::letter_for_index, stats::Tier, LessonStats, Question, QuestionBody,
  SubmittedAnswer, TrueFalseAnswer,
};
use crate::state::AppState;
use crate::util::{clean_name, trunc_for_log};

// ---- Editor ----

#[instrument(level = "debug", target = "editor", skip(text), fields(text_len = text.len()))]
pub fn editor_parse(text: &str) -> EditorReportOut {
  let report = quiz::analyze(text);
  debug!(target: "editor", questions = report.questions.len(), errors = report.error_count(), warnings = report.warning_count(), "Preview parsed");
  report.into()
}

#[instrument(level = "debug", target = "editor", skip(questions), fields(count = questions.len()))]
pub fn editor_validate(questions: Vec<Question>) -> EditorReportOut {
  quiz::validate(questions).into()
}

#[instrument(level = "debug", target = "editor", skip(questions), fields(count = questions.len()))]
pub fn editor_render(questions: &[Question]) -> String {
  quiz::render(questions)
}

// ---- Lessons ----

/// Turn a create/replace body into a lesson. Error-level diagnostics refuse
/// the save; warnings travel back with the stored lesson.
pub fn build_lesson(id: String, input: LessonIn, source: LessonSource) -> ApiResult<LessonSavedOut> {
  let title = clean_name(&input.title).ok_or_else(|| ApiError::BadRequest("title must not be empty".into()))?;
  let report = match (input.text, input.questions) {
    (Some(text), None) => quiz::analyze(&text),
    (None, Some(questions)) => quiz::validate(questions),
    (Some(_), Some(_)) => return Err(ApiError::BadRequest("send either text or questions, not both".into())),
    (None, None) => return Err(ApiError::BadRequest("lesson needs text or questions".into())),
  };
  if report.has_errors() {
    return Err(ApiError::InvalidLesson(report.diagnostics));
  }

  let lesson = Lesson {
    id,
    title,
    color: input.color.unwrap_or_default(),
    tags: input.tags.iter().filter_map(|t| clean_name(t)).collect(),
    questions: report.questions.iter().map(Question::without_source_positions).collect(),
    source,
  };
  Ok(LessonSavedOut { lesson, diagnostics: report.diagnostics })
}

#[instrument(level = "info", target = "lesson", skip(state, input), fields(title = %trunc_for_log(&input.title, 60)))]
pub async fn create_lesson(state: &AppState, input: LessonIn) -> ApiResult<LessonSavedOut> {
  let saved = build_lesson(Uuid::new_v4().to_string(), input, LessonSource::Authored)?;
  state.insert_lesson(saved.lesson.clone()).await;
  info!(target: "lesson", id = %saved.lesson.id, questions = saved.lesson.questions.len(), warnings = saved.diagnostics.len(), "Lesson created");
  Ok(saved)
}

#[instrument(level = "info", target = "lesson", skip(state, input), fields(%id))]
pub async fn replace_lesson(state: &AppState, id: &str, input: LessonIn) -> ApiResult<LessonSavedOut> {
  if state.get_lesson(id).await.is_none() {
    return Err(ApiError::LessonNotFound(id.to_string()));
  }
  let saved = build_lesson(id.to_string(), input, LessonSource::Authored)?;
  if !state.replace_lesson(saved.lesson.clone()).await {
    return Err(ApiError::LessonNotFound(id.to_string()));
  }
  info!(target: "lesson", %id, questions = saved.lesson.questions.len(), "Lesson replaced");
  Ok(saved)
}

pub async fn require_lesson(state: &AppState, id: &str) -> ApiResult<Lesson> {
  state.get_lesson(id).await.ok_or_else(|| ApiError::LessonNotFound(id.to_string()))
}

/// Student view: answers hidden, invalid questions left out, optional shuffle.
pub fn play_view(lesson: &Lesson, shuffle: bool) -> PlayOut {
  let mut questions: Vec<PlayQuestion> = lesson
    .questions
    .iter()
    .enumerate()
    .filter(|(_, q)| q.kind() != quiz::QuestionKind::Invalid)
    .map(|(index, q)| PlayQuestion { index, question: q.without_answers() })
    .collect();
  if shuffle {
    questions.shuffle(&mut rand::thread_rng());
  }
  PlayOut { id: lesson.id.clone(), title: lesson.title.clone(), color: lesson.color.clone(), questions }
}

// ---- Attempts & statistics ----

#[instrument(level = "info", target = "lesson", skip(state, input), fields(%lesson_id, answers = input.answers.len()))]
pub async fn submit_attempt(state: &AppState, lesson_id: &str, input: AttemptIn) -> ApiResult<AttemptOut> {
  let lesson = require_lesson(state, lesson_id).await?;
  let student = clean_name(&input.student).ok_or_else(|| ApiError::BadRequest("student must not be empty".into()))?;
  if input.answers.len() > lesson.questions.len() {
    return Err(ApiError::BadRequest(format!(
      "{} answers for {} questions",
      input.answers.len(),
      lesson.questions.len()
    )));
  }

  let score = grade_attempt(&lesson.questions, &input.answers);
  let tier = Tier::for_percentage(score.percentage);
  let attempt = Attempt { id: Uuid::new_v4().to_string(), lesson_id: lesson_id.to_string(), student, score };
  if !state.record_attempt(attempt.clone()).await {
    return Err(ApiError::LessonNotFound(lesson_id.to_string()));
  }
  info!(target: "lesson", %lesson_id, attempt = %attempt.id, score = attempt.score.score, max = attempt.score.max_score, pct = attempt.score.percentage, "Attempt graded");
  Ok(AttemptOut { attempt, tier })
}

pub async fn lesson_stats(state: &AppState, lesson_id: &str) -> ApiResult<LessonStats> {
  let lesson = require_lesson(state, lesson_id).await?;
  let attempts = state.attempts_for(lesson_id).await;
  Ok(LessonStats::compute(
    lesson.questions.len(),
    attempts.iter().map(|a| (a.student.as_str(), &a.score)),
  ))
}

// ---- Explanations ----

#[instrument(level = "info", target = "lesson", skip(state, input), fields(%lesson_id, question = input.question_index))]
pub async fn explain(state: &AppState, lesson_id: &str, input: ExplainIn) -> ApiResult<ExplainOut> {
  let lesson = require_lesson(state, lesson_id).await?;
  let question = lesson
    .questions
    .get(input.question_index)
    .ok_or_else(|| ApiError::BadRequest(format!("no question at index {}", input.question_index)))?;
  if matches!(question.body, QuestionBody::Invalid) {
    return Err(ApiError::BadRequest("question is invalid and has no answer".into()));
  }

  let options = describe_options(question);
  let correct = describe_correct(question);
  let student_answer = input.answer.as_ref().map(|a| describe_submitted(question, a)).unwrap_or_default();

  if let Some(oa) = &state.openai {
    let req = ExplainRequest { question: &question.text, options: &options, correct: &correct, student_answer: &student_answer };
    match oa.explain_answer(&state.prompts, &req).await {
      Ok(text) => return Ok(ExplainOut { text, source: "openai" }),
      Err(e) => error!(target: "lesson", %lesson_id, error = %e, "OpenAI explanation failed; using local fallback."),
    }
  }

  let graded = grade(input.question_index, question, input.answer.as_ref());
  Ok(ExplainOut { text: local_explanation(&correct, &student_answer, graded.answered, graded.is_correct), source: "local" })
}

fn describe_options(q: &Question) -> String {
  q.options()
    .iter()
    .enumerate()
    .map(|(i, o)| format!("{}. {}", upper_letter(i), o.text))
    .collect::<Vec<_>>()
    .join("\n")
}

fn describe_correct(q: &Question) -> String {
  match &q.body {
    QuestionBody::MultipleChoice { options, correct_answer: Some(letter) } => {
      let text = quiz::model::index_for_letter(*letter)
        .and_then(|i| options.get(i))
        .map(|o| o.text.as_str())
        .unwrap_or_default();
      format!("{}. {}", letter.to_ascii_uppercase(), text)
    }
    QuestionBody::MultipleChoice { correct_answer: None, .. } => "(not marked)".into(),
    QuestionBody::Numeric { correct_answer } => correct_answer.clone(),
    QuestionBody::TrueFalse { options, correct_answer } => match correct_answer {
      TrueFalseAnswer::Single(b) if options.is_empty() => true_false_word(*b).into(),
      _ => (0..options.len())
        .map(|i| {
          let verdict = correct_answer.get(i).map(true_false_word).unwrap_or("?");
          format!("{}. {}", upper_letter(i), verdict)
        })
        .collect::<Vec<_>>()
        .join("; "),
    },
    QuestionBody::Invalid => String::new(),
  }
}

fn describe_submitted(q: &Question, answer: &SubmittedAnswer) -> String {
  match (answer, &q.body) {
    (SubmittedAnswer::Choice(i), QuestionBody::MultipleChoice { options, .. }) => match options.get(*i) {
      Some(o) => format!("{}. {}", upper_letter(*i), o.text),
      None => format!("option #{}", i + 1),
    },
    (SubmittedAnswer::Choice(i), _) => i.to_string(),
    (SubmittedAnswer::Number(n), _) => n.to_string(),
    (SubmittedAnswer::Text(t), _) => t.trim().to_string(),
    (SubmittedAnswer::Flag(b), _) => true_false_word(*b).into(),
    (SubmittedAnswer::Flags(v), _) => v
      .iter()
      .enumerate()
      .map(|(i, b)| format!("{}. {}", upper_letter(i), true_false_word(*b)))
      .collect::<Vec<_>>()
      .join("; "),
  }
}

fn local_explanation(correct: &str, student_answer: &str, answered: bool, is_correct: bool) -> String {
  if !answered {
    format!("The correct answer is {}.", correct)
  } else if is_correct {
    format!("Correct! The answer is {}.", correct)
  } else {
    format!("Your answer was {}, but the correct answer is {}. Review this question and try again.", student_answer, correct)
  }
}

fn upper_letter(i: usize) -> char {
  letter_for_index(i).map(|c| c.to_ascii_uppercase()).unwrap_or('?')
}

fn true_false_word(b: bool) -> &'static str {
  if b { "True" } else { "False" }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  fn lesson_in(text: Option<&str>, questions: Option<Vec<Question>>) -> LessonIn {
    LessonIn { title: " Forces ".into(), color: None, tags: vec![" physics ".into(), "".into()], text: text.map(Into::into), questions }
  }

  #[test]
  fn build_lesson_strips_positions_and_keeps_warnings() {
    let saved = build_lesson("id".into(), lesson_in(Some("Câu 1: Pick\nA. x\nB. y"), None), LessonSource::Authored).unwrap();
    assert_eq!(saved.lesson.title, "Forces");
    assert_eq!(saved.lesson.tags, vec!["physics".to_string()]);
    assert_eq!(saved.lesson.questions[0].source_start_line, None);
    assert_eq!(saved.lesson.questions[0].options()[0].source_line, None);
    assert_eq!(saved.diagnostics.len(), 1);
  }

  #[test]
  fn build_lesson_refuses_errors_and_ambiguous_bodies() {
    let err = build_lesson("id".into(), lesson_in(Some("Câu 1: Empty"), None), LessonSource::Authored).unwrap_err();
    assert!(matches!(err, ApiError::InvalidLesson(ref d) if d.len() == 1));

    let both = build_lesson("id".into(), lesson_in(Some("x"), Some(vec![])), LessonSource::Authored).unwrap_err();
    assert!(matches!(both, ApiError::BadRequest(_)));

    let neither = build_lesson("id".into(), lesson_in(None, None), LessonSource::Authored).unwrap_err();
    assert!(matches!(neither, ApiError::BadRequest(_)));
  }

  #[test]
  fn play_view_hides_answers_and_invalid_questions() {
    let lesson = Lesson {
      id: "l".into(),
      title: "t".into(),
      color: String::new(),
      tags: vec![],
      questions: quiz::parse("Câu 1: Q\n*A. x\nCâu 2: Broken\nCâu 3: N\nAnswer: 7"),
      source: LessonSource::Authored,
    };
    let view = play_view(&lesson, false);
    let indices: Vec<usize> = view.questions.iter().map(|p| p.index).collect();
    assert_eq!(indices, vec![0, 2]);
    assert_eq!(view.questions[1].question.body, QuestionBody::Numeric { correct_answer: String::new() });
  }

  #[test]
  fn describes_answers_for_explanations() {
    let qs = quiz::parse("Câu 1: Q\nA. x\n*B. y\nCâu 2: S\nA. s1 [True]\nB. s2 [False]");
    assert_eq!(describe_correct(&qs[0]), "B. y");
    assert_eq!(describe_submitted(&qs[0], &SubmittedAnswer::Choice(0)), "A. x");
    assert_eq!(describe_correct(&qs[1]), "A. True; B. False");
    assert_eq!(describe_options(&qs[1]), "A. s1\nB. s2");
  }

  #[test]
  fn local_explanation_mentions_both_answers_when_wrong() {
    let text = local_explanation("B. y", "A. x", true, false);
    assert!(text.contains("A. x"));
    assert!(text.contains("B. y"));
    assert!(local_explanation("2", "", false, false).starts_with("The correct answer is 2"));
  }
}
