//! Line-oriented quiz text parser.
//!
//! ```text
//! Câu 1: Why did the apple fall?
//! [2 pts]
//! A. Because it wanted to
//! *B. Because of gravity
//! ```
//!
//! Keywords are case-insensitive and every line is trimmed before matching.
//! Parsing never fails: anything unrecognized is a continuation of the last
//! option (or of the prompt when no option has started yet), and lines before
//! the first header are dropped.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use super::model::{Question, QuestionBody, QuizOption, TrueFalseAnswer};
use super::validate::{normalize, Diagnostic};

static HEADER_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)^câu\s*\d*\s*:\s*(.*)$").expect("header regex"));
static POINTS_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)^\[\s*([^\]]*?)\s*pts?\s*\]$").expect("points regex"));
static OPTION_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^(\*)?\s*([A-Da-d])\.\s*(.*)$").expect("option regex"));
pub(super) static TRUE_FALSE_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)^(.*?)\s*\[(true|false)\]$").expect("true/false regex"));
static ANSWER_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)^answer\s*:\s*(.*)$").expect("answer regex"));

/// Questions plus the findings only visible while reading the text.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedDocument {
  pub questions: Vec<Question>,
  pub diagnostics: Vec<Diagnostic>,
}

/// Parse quiz text into normalized questions.
pub fn parse(raw: &str) -> Vec<Question> {
  parse_document(raw).questions
}

#[instrument(level = "debug", target = "editor", skip(raw), fields(text_len = raw.len()))]
pub fn parse_document(raw: &str) -> ParsedDocument {
  let mut doc = ParsedDocument::default();
  let mut open: Option<Draft> = None;

  for (line_no, line) in raw.lines().enumerate() {
    let line = line.trim();
    if line.is_empty() {
      continue;
    }

    if let Some(caps) = HEADER_RE.captures(line) {
      if let Some(done) = open.take() {
        done.finish(&mut doc);
      }
      open = Some(Draft::new(line_no, &caps[1]));
      continue;
    }

    let Some(draft) = open.as_mut() else {
      debug!(target: "editor", line_no, "Ignoring text before the first question");
      continue;
    };

    if let Some(caps) = POINTS_RE.captures(line) {
      match caps[1].parse::<u32>() {
        Ok(p) if p > 0 => draft.points = p,
        _ => debug!(target: "editor", line_no, "Ignoring malformed points annotation"),
      }
    } else if let Some(caps) = ANSWER_RE.captures(line) {
      draft.numeric = Some(caps[1].trim().to_string());
      draft.options.clear();
    } else if let Some(caps) = OPTION_RE.captures(line) {
      let starred = caps.get(1).is_some();
      let letter = caps[2].chars().next().map(|c| c.to_ascii_lowercase());
      draft.push_option(line_no, starred, letter, &caps[3]);
    } else {
      draft.continue_with(line);
    }
  }

  if let Some(done) = open.take() {
    done.finish(&mut doc);
  }
  doc
}

/// Question being accumulated between two headers.
struct Draft {
  start_line: usize,
  text: String,
  points: u32,
  options: Vec<QuizOption>,
  correct_letter: Option<char>,
  markers: usize,
  true_false: bool,
  statements: Vec<bool>,
  numeric: Option<String>,
  options_after_answer: bool,
}

impl Draft {
  fn new(start_line: usize, text: &str) -> Self {
    Self {
      start_line,
      text: text.trim().to_string(),
      points: 1,
      options: Vec::new(),
      correct_letter: None,
      markers: 0,
      true_false: false,
      statements: Vec::new(),
      numeric: None,
      options_after_answer: false,
    }
  }

  fn push_option(&mut self, line_no: usize, starred: bool, letter: Option<char>, rest: &str) {
    if self.numeric.is_some() {
      self.options_after_answer = true;
    }

    let text = match TRUE_FALSE_RE.captures(rest) {
      Some(caps) => {
        if !self.true_false {
          self.true_false = true;
          self.correct_letter = None;
          self.markers = 0;
        }
        self.statements.push(caps[2].eq_ignore_ascii_case("true"));
        caps[1].to_string()
      }
      None => {
        if starred && !self.true_false {
          // Last marker wins.
          self.correct_letter = letter;
          self.markers += 1;
        }
        rest.to_string()
      }
    };

    self.options.push(QuizOption { text, source_line: Some(line_no) });
  }

  fn continue_with(&mut self, line: &str) {
    let target = match self.options.last_mut() {
      Some(option) => &mut option.text,
      None => &mut self.text,
    };
    if !target.is_empty() {
      target.push('\n');
    }
    target.push_str(line);
  }

  fn finish(self, doc: &mut ParsedDocument) {
    let index = doc.questions.len();

    if self.markers > 1 {
      doc.diagnostics.push(Diagnostic::warning(
        index,
        format!("{} options marked correct; using the last one", self.markers),
      ));
    }
    if self.numeric.is_some() && self.options_after_answer {
      doc.diagnostics.push(Diagnostic::warning(index, "Options after an Answer line are ignored"));
    }

    let body = match self.numeric {
      Some(correct_answer) => QuestionBody::Numeric { correct_answer },
      None if self.true_false => QuestionBody::TrueFalse {
        options: self.options,
        correct_answer: TrueFalseAnswer::PerStatement(self.statements),
      },
      None => QuestionBody::MultipleChoice { options: self.options, correct_answer: self.correct_letter },
    };

    let question = Question {
      text: self.text,
      points: self.points,
      body,
      source_start_line: Some(self.start_line),
    };
    doc.questions.push(normalize(question));
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::quiz::model::QuestionKind;
  use crate::quiz::validate::Severity;
  use pretty_assertions::assert_eq;
  use rstest::rstest;

  fn texts(q: &Question) -> Vec<&str> {
    q.options().iter().map(|o| o.text.as_str()).collect()
  }

  #[test]
  fn numeric_question() {
    let qs = parse("Câu 1: 1 Newton + 1 Newton = ?\nAnswer: 2\n");
    assert_eq!(qs.len(), 1);
    assert_eq!(qs[0].text, "1 Newton + 1 Newton = ?");
    assert_eq!(qs[0].points, 1);
    assert_eq!(qs[0].body, QuestionBody::Numeric { correct_answer: "2".into() });
    assert_eq!(qs[0].source_start_line, Some(0));
  }

  #[test]
  fn multiple_choice_with_marker() {
    let raw = "Câu 1: Why did the apple fall?\n\
               A. Because it wanted to\n\
               B. Because mother nature wanted it to\n\
               *C. Because of gravity\n\
               D. Because someone knocked it down\n";
    let qs = parse(raw);
    assert_eq!(qs.len(), 1);
    assert_eq!(qs[0].kind(), QuestionKind::MultipleChoice);
    assert_eq!(texts(&qs[0])[2], "Because of gravity");
    assert!(matches!(qs[0].body, QuestionBody::MultipleChoice { correct_answer: Some('c'), .. }));
    assert_eq!(qs[0].options()[3].source_line, Some(4));
  }

  #[test]
  fn true_false_statements() {
    let raw = "Câu 1: Is time travel possible?\nA. No [False]\nB. Only in fiction [False]\nC. Maybe [True]";
    let qs = parse(raw);
    assert_eq!(qs[0].kind(), QuestionKind::TrueFalse);
    assert_eq!(texts(&qs[0]), vec!["No", "Only in fiction", "Maybe"]);
    assert!(matches!(
      &qs[0].body,
      QuestionBody::TrueFalse { correct_answer: TrueFalseAnswer::PerStatement(v), .. } if v == &vec![false, false, true]
    ));
  }

  #[test]
  fn short_option_list_is_padded_and_unmarked() {
    let doc = parse_document("Câu 1: Pick one\nA. X\nB. Y\n");
    let q = &doc.questions[0];
    assert_eq!(texts(q), vec!["X", "Y", "", ""]);
    assert!(matches!(q.body, QuestionBody::MultipleChoice { correct_answer: None, .. }));
    assert!(doc.diagnostics.is_empty());
  }

  #[rstest]
  #[case::none("Câu 1: Q\nA. x\n*B. y", 1)]
  #[case::pts("Câu 1: Q\n[3 pts]\nA. x\n*B. y", 3)]
  #[case::pt("Câu 1: Q\n[1 pt]\nA. x", 1)]
  #[case::spaced("Câu 1: Q\n[ 5 PTS ]\nA. x", 5)]
  #[case::not_a_number("Câu 1: Q\n[many pts]\nA. x", 1)]
  #[case::zero("Câu 1: Q\n[0 pts]\nA. x", 1)]
  fn points_annotation(#[case] raw: &str, #[case] expected: u32) {
    assert_eq!(parse(raw)[0].points, expected);
  }

  #[test]
  fn last_marker_wins_with_a_warning() {
    let doc = parse_document("Câu 1: Q\n*A. x\nB. y\n*C. z\nD. w");
    assert!(matches!(doc.questions[0].body, QuestionBody::MultipleChoice { correct_answer: Some('c'), .. }));
    assert_eq!(doc.diagnostics.len(), 1);
    assert_eq!(doc.diagnostics[0].severity, Severity::Warning);
  }

  #[test]
  fn header_followed_by_header_is_invalid() {
    let qs = parse("Câu 1: Lonely\nCâu 2: Numeric\nAnswer: 42");
    assert_eq!(qs.len(), 2);
    assert_eq!(qs[0].body, QuestionBody::Invalid);
    assert_eq!(qs[1].kind(), QuestionKind::Numeric);
    assert_eq!(qs[1].source_start_line, Some(1));
  }

  #[test]
  fn continuation_lines_attach_to_prompt_then_option() {
    let raw = "Câu 1: First line\n$E = mc^2$\n![img](a.png)\n\nA. Option\nstill option\n*B. y";
    let qs = parse(raw);
    assert_eq!(qs[0].text, "First line\n$E = mc^2$\n![img](a.png)");
    assert_eq!(texts(&qs[0])[0], "Option\nstill option");
  }

  #[test]
  fn answer_line_clears_options() {
    let doc = parse_document("Câu 1: Q\nA. x\nB. y\nAnswer: 3.14\nC. late");
    assert_eq!(doc.questions[0].body, QuestionBody::Numeric { correct_answer: "3.14".into() });
    assert_eq!(doc.diagnostics.len(), 1);
  }

  #[test]
  fn keywords_are_case_insensitive_and_letters_lowercased() {
    let qs = parse("CÂU 3: Q\na. x\n*b. y\nANSWER : \nCâu: Next\n*d. z");
    assert_eq!(qs[0].body, QuestionBody::Numeric { correct_answer: String::new() });
    assert!(matches!(qs[1].body, QuestionBody::MultipleChoice { correct_answer: Some('d'), .. }));
  }

  #[test]
  fn text_before_first_header_is_ignored() {
    let qs = parse("Lesson notes\nA. stray\nCâu 1: Q\nAnswer: 1");
    assert_eq!(qs.len(), 1);
    assert_eq!(qs[0].text, "Q");
  }

  #[test]
  fn letters_beyond_d_are_continuations() {
    let qs = parse("Câu 1: Q\nA. a\nB. b\nC. c\n*D. d\nE. e");
    assert_eq!(texts(&qs[0]), vec!["a", "b", "c", "d\nE. e"]);
  }

  #[test]
  fn markers_before_a_true_false_switch_are_dropped_silently() {
    let doc = parse_document("Câu 1: Q\n*A. x\n*B. y\nC. z [True]");
    assert_eq!(doc.questions[0].kind(), QuestionKind::TrueFalse);
    assert!(doc.diagnostics.is_empty());
  }

  #[test]
  fn verdict_on_a_continuation_line_is_plain_text() {
    let qs = parse("Câu 1: Q\nA. x\nB.\n[True]");
    assert_eq!(qs[0].kind(), QuestionKind::MultipleChoice);
    assert_eq!(texts(&qs[0]), vec!["x", "[True]", "", ""]);
  }

  #[test]
  fn blank_input_yields_nothing() {
    assert!(parse("").is_empty());
    assert!(parse("\n\n   \n").is_empty());
  }

  #[test]
  fn parsing_is_deterministic() {
    let raw = "Câu 1: Q\n*A. x\nCâu 2: T\nA. y [True]";
    assert_eq!(parse_document(raw), parse_document(raw));
  }
}
