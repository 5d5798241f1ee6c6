//! Seed content that guarantees the app is useful without external config.

use crate::domain::{Lesson, LessonSource};
use crate::quiz;

pub const SAMPLE_LESSON_ID: &str = "sample-physics";

const SAMPLE_LESSON_TEXT: &str = "\
Câu 1: 1 Newton + 1 Newton = ?
Answer: 2

Câu 2: Why did the apple fall?
A. Because it wanted to
B. Because mother nature wanted it to
*C. Because of gravity
D. Because someone knocked it down

Câu 3: Is time travel possible?
[2 pts]
A. No [False]
B. Only in fiction [False]
C. Maybe [True]

Câu 4: Which formula relates mass and energy?
A. $F = ma$
*B. $E = mc^2$
C. $p = mv$
D. $V = IR$
";

/// Built-in lessons, parsed from the quiz text format like any authored lesson.
pub fn seed_lessons() -> Vec<Lesson> {
  vec![Lesson {
    id: SAMPLE_LESSON_ID.into(),
    title: "Physics warm-up".into(),
    color: "#4f86f7".into(),
    tags: vec!["physics".into(), "sample".into()],
    questions: quiz::parse(SAMPLE_LESSON_TEXT)
      .iter()
      .map(quiz::Question::without_source_positions)
      .collect(),
    source: LessonSource::Seed,
  }]
}
