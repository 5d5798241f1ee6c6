//! Lesson statistics: percentage buckets, per-question tallies and ranking.

use serde::{Deserialize, Serialize};

use super::grading::AttemptScore;

/// Upper-exclusive bucket bounds; the last bucket includes 100.
const BUCKETS: [(u32, u32); 5] = [(0, 20), (20, 40), (40, 60), (60, 80), (80, 100)];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
  Excellent,
  Good,
  Average,
  NeedsWork,
}

impl Tier {
  pub fn for_percentage(pct: f32) -> Self {
    if pct >= 90.0 {
      Tier::Excellent
    } else if pct >= 70.0 {
      Tier::Good
    } else if pct >= 50.0 {
      Tier::Average
    } else {
      Tier::NeedsWork
    }
  }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
  pub label: String,
  pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionTally {
  pub question_index: usize,
  pub attempted: usize,
  pub correct: usize,
  pub correct_rate: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankEntry {
  pub rank: usize,
  pub student: String,
  pub score: f32,
  pub percentage: f32,
  pub tier: Tier,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonStats {
  pub attempts: usize,
  pub average_percentage: f32,
  pub best_percentage: f32,
  pub buckets: Vec<Bucket>,
  pub questions: Vec<QuestionTally>,
  pub ranking: Vec<RankEntry>,
}

impl LessonStats {
  /// `attempts` must be in submission order; it breaks ranking ties.
  pub fn compute<'a, I>(question_count: usize, attempts: I) -> Self
  where
    I: IntoIterator<Item = (&'a str, &'a AttemptScore)>,
  {
    let attempts: Vec<(&str, &AttemptScore)> = attempts.into_iter().collect();

    let mut buckets: Vec<Bucket> = BUCKETS
      .iter()
      .map(|(lo, hi)| Bucket { label: format!("{}-{}", lo, if *hi == 100 { 100 } else { hi - 1 }), count: 0 })
      .collect();
    let mut tallies: Vec<QuestionTally> = (0..question_count)
      .map(|question_index| QuestionTally { question_index, attempted: 0, correct: 0, correct_rate: 0.0 })
      .collect();

    for (_, score) in &attempts {
      buckets[bucket_index(score.percentage)].count += 1;
      for answer in &score.answers {
        let Some(t) = tallies.get_mut(answer.question_index) else { continue };
        if answer.answered {
          t.attempted += 1;
        }
        if answer.is_correct {
          t.correct += 1;
        }
      }
    }
    for t in &mut tallies {
      if t.attempted > 0 {
        t.correct_rate = round1(t.correct as f32 / t.attempted as f32 * 100.0);
      }
    }

    let total: f32 = attempts.iter().map(|(_, s)| s.percentage).sum();
    let average_percentage = if attempts.is_empty() { 0.0 } else { round1(total / attempts.len() as f32) };
    let best_percentage = attempts.iter().map(|(_, s)| s.percentage).fold(0.0, f32::max);

    LessonStats {
      attempts: attempts.len(),
      average_percentage,
      best_percentage,
      buckets,
      questions: tallies,
      ranking: rank(&attempts),
    }
  }
}

fn bucket_index(pct: f32) -> usize {
  let clamped = pct.clamp(0.0, 100.0) as u32;
  BUCKETS
    .iter()
    .position(|(lo, hi)| clamped >= *lo && clamped < *hi)
    .unwrap_or(BUCKETS.len() - 1)
}

/// Highest percentage first; equal percentages share a rank (1, 1, 3) and
/// keep submission order.
fn rank(attempts: &[(&str, &AttemptScore)]) -> Vec<RankEntry> {
  let mut order: Vec<usize> = (0..attempts.len()).collect();
  order.sort_by(|a, b| attempts[*b].1.percentage.total_cmp(&attempts[*a].1.percentage));

  let mut out: Vec<RankEntry> = Vec::with_capacity(order.len());
  for (pos, idx) in order.into_iter().enumerate() {
    let (student, score) = attempts[idx];
    let rank = match out.last() {
      Some(prev) if prev.percentage == score.percentage => prev.rank,
      _ => pos + 1,
    };
    out.push(RankEntry {
      rank,
      student: student.to_string(),
      score: score.score,
      percentage: score.percentage,
      tier: Tier::for_percentage(score.percentage),
    });
  }
  out
}

fn round1(x: f32) -> f32 { (x * 10.0).round() / 10.0 }
