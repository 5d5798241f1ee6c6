//! Questions back to editable quiz text.
//!
//! Output is the canonical form the parser reads back into the same model:
//! numbering is recomputed from position, `[N pts]` only appears when the
//! value is not 1, and True/False markers sit on the first line of a statement
//! so multi-line statements survive a round trip.

use super::model::{letter_for_index, Question, QuestionBody, TrueFalseAnswer, OPTION_LETTERS};
use super::parser::TRUE_FALSE_RE;

pub fn render(questions: &[Question]) -> String {
  let mut out = String::new();
  for (i, q) in questions.iter().enumerate() {
    if i > 0 {
      out.push('\n');
    }
    render_question(&mut out, i, q);
  }
  out
}

fn render_question(out: &mut String, index: usize, q: &Question) {
  push_line(out, &format!("Câu {}: {}", index + 1, q.text));
  if q.points != 1 {
    push_line(out, &format!("[{} pts]", q.points));
  }

  match &q.body {
    QuestionBody::MultipleChoice { options, correct_answer } => {
      for (pos, option) in options.iter().enumerate() {
        let marker = match (correct_answer, letter_for_index(pos)) {
          (Some(c), Some(l)) if c.eq_ignore_ascii_case(&l) => "*",
          _ => "",
        };
        let (head, tail) = option_lines(&option.text);
        push_line(out, &format!("{}{}. {}", marker, option_letter(pos), head));
        if let Some(tail) = tail {
          push_line(out, tail);
        }
      }
    }
    QuestionBody::Numeric { correct_answer } => {
      push_line(out, &format!("Answer: {}", correct_answer));
    }
    QuestionBody::TrueFalse { options, correct_answer } => {
      if options.is_empty() {
        if let TrueFalseAnswer::Single(b) = correct_answer {
          push_line(out, &format!("A. {}", verdict(*b)));
        }
      }
      for (pos, option) in options.iter().enumerate() {
        let suffix = correct_answer.get(pos).map(verdict).unwrap_or_default();
        let (head, tail) = option_lines(&option.text);
        push_line(out, &format!("{}. {} {}", option_letter(pos), head, suffix));
        if let Some(tail) = tail {
          push_line(out, tail);
        }
      }
    }
    QuestionBody::Invalid => {}
  }
}

/// Split option text into what follows the letter and the lines below it.
/// A first line ending in `[True]`/`[False]` goes below the letter, where the
/// parser keeps it as text.
fn option_lines(text: &str) -> (&str, Option<&str>) {
  let (first, rest) = match text.split_once('\n') {
    Some((first, rest)) => (first, Some(rest)),
    None => (text, None),
  };
  if TRUE_FALSE_RE.is_match(first) {
    ("", Some(text))
  } else {
    (first, rest)
  }
}

/// Uppercase letter for a position. Letters repeat past D; the parser only
/// reads A to D as option starts and ignores them for true/false statements.
fn option_letter(pos: usize) -> char {
  OPTION_LETTERS[pos % OPTION_LETTERS.len()].to_ascii_uppercase()
}

fn verdict(b: bool) -> &'static str {
  if b { "[True]" } else { "[False]" }
}

/// Append one line with trailing whitespace removed.
fn push_line(out: &mut String, line: &str) {
  out.push_str(line.trim_end());
  out.push('\n');
}
