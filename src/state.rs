//! Application state: in-memory lesson and attempt stores, prompts, OpenAI client.
//!
//! This module owns:
//!   - the lesson store (by id) plus insertion order for listing
//!   - attempts per lesson, in submission order
//!   - the prompts struct (from TOML or defaults)
//!   - optional OpenAI client
//!
//! Lessons are replaced as whole values; nothing edits a stored lesson in place.

use std::{collections::HashMap, sync::Arc};

use rand::seq::SliceRandom;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::config::{load_app_config_from_env, AppConfig, Prompts};
use crate::domain::{Attempt, Lesson, LessonSource};
use crate::openai::OpenAI;
use crate::quiz::{self, Question, QuestionKind};
use crate::seeds::seed_lessons;

/// Upper bound on questions in one quiz-game round.
pub const MAX_GAME_QUESTIONS: usize = 50;

/// Game lessons kept for grading; older rounds are evicted first.
pub const MAX_STORED_GAMES: usize = 20;

#[derive(Clone)]
pub struct AppState {
    pub lessons: Arc<RwLock<HashMap<String, Lesson>>>,
    pub lesson_order: Arc<RwLock<Vec<String>>>,
    pub attempts: Arc<RwLock<HashMap<String, Vec<Attempt>>>>,
    pub openai: Option<OpenAI>,
    pub prompts: Prompts,
}

impl AppState {
    /// Build state from env: load config, seed lessons, init OpenAI.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg = load_app_config_from_env();
        let openai = OpenAI::from_env();
        if let Some(oa) = &openai {
            info!(target: "quizdesk_backend", base_url = %oa.base_url, model = %oa.model, "OpenAI enabled.");
        } else {
            info!(target: "quizdesk_backend", "OpenAI disabled (no OPENAI_API_KEY). Using local explanations.");
        }
        Self::from_parts(cfg, openai)
    }

    /// Build state from already-loaded parts. Config lessons are parsed from
    /// the quiz text format; lessons with invalid questions are skipped.
    pub fn from_parts(cfg: Option<AppConfig>, openai: Option<OpenAI>) -> Self {
        let prompts = cfg.as_ref().map(|c| c.prompts.clone()).unwrap_or_default();

        let mut by_id = HashMap::<String, Lesson>::new();
        let mut order = Vec::<String>::new();

        if let Some(cfg) = &cfg {
            for lc in &cfg.lessons {
                let id = lc.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
                let report = quiz::analyze(&lc.text);
                if report.has_errors() {
                    error!(target: "lesson", %id, title = %lc.title, errors = report.error_count(), "Skipping bank lesson: invalid questions.");
                    continue;
                }
                if report.warning_count() > 0 {
                    warn!(target: "lesson", %id, title = %lc.title, warnings = report.warning_count(), "Bank lesson has warnings");
                }
                let lesson = Lesson {
                    id: id.clone(),
                    title: lc.title.clone(),
                    color: lc.color.clone().unwrap_or_default(),
                    tags: lc.tags.clone(),
                    questions: report.questions.iter().map(Question::without_source_positions).collect(),
                    source: LessonSource::Config,
                };
                if by_id.insert(id.clone(), lesson).is_none() {
                    order.push(id);
                }
            }
        }

        // Always insert built-in seeds, but don't overwrite existing ids.
        for lesson in seed_lessons() {
            if !by_id.contains_key(&lesson.id) {
                order.push(lesson.id.clone());
                by_id.insert(lesson.id.clone(), lesson);
            }
        }

        // Inventory summary by source.
        let mut count_by_source: HashMap<LessonSource, (usize, usize)> = HashMap::new();
        for lesson in by_id.values() {
            let entry = count_by_source.entry(lesson.source).or_insert((0, 0));
            entry.0 += 1;
            entry.1 += lesson.questions.len();
        }
        for (source, (lessons, questions)) in count_by_source {
            info!(target: "lesson", ?source, lessons, questions, "Startup lesson inventory");
        }

        Self {
            lessons: Arc::new(RwLock::new(by_id)),
            lesson_order: Arc::new(RwLock::new(order)),
            attempts: Arc::new(RwLock::new(HashMap::new())),
            openai,
            prompts,
        }
    }

    /// Insert a new lesson (or replace one with the same id).
    #[instrument(level = "debug", skip(self, lesson), fields(id = %lesson.id))]
    pub async fn insert_lesson(&self, lesson: Lesson) {
        let mut lessons = self.lessons.write().await;
        let mut order = self.lesson_order.write().await;
        let id = lesson.id.clone();
        if lessons.insert(id.clone(), lesson).is_none() {
            order.push(id);
        }
    }

    /// Replace an existing lesson as a whole. Returns false for unknown ids.
    #[instrument(level = "debug", skip(self, lesson), fields(id = %lesson.id))]
    pub async fn replace_lesson(&self, lesson: Lesson) -> bool {
        let mut lessons = self.lessons.write().await;
        match lessons.get_mut(&lesson.id) {
            Some(slot) => {
                *slot = lesson;
                true
            }
            None => false,
        }
    }

    /// Remove a lesson and its attempts. Returns false for unknown ids.
    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn remove_lesson(&self, id: &str) -> bool {
        let removed = self.lessons.write().await.remove(id).is_some();
        if removed {
            self.lesson_order.write().await.retain(|x| x != id);
            self.attempts.write().await.remove(id);
        }
        removed
    }

    /// Read-only access to a lesson by id.
    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn get_lesson(&self, id: &str) -> Option<Lesson> {
        self.lessons.read().await.get(id).cloned()
    }

    /// All lessons in insertion order.
    pub async fn list_lessons(&self) -> Vec<Lesson> {
        let lessons = self.lessons.read().await;
        let order = self.lesson_order.read().await;
        order.iter().filter_map(|id| lessons.get(id).cloned()).collect()
    }

    /// Store an attempt. Returns false when the lesson no longer exists.
    #[instrument(level = "debug", skip(self, attempt), fields(lesson_id = %attempt.lesson_id, student = %attempt.student))]
    pub async fn record_attempt(&self, attempt: Attempt) -> bool {
        // Holding the lessons lock keeps a concurrent delete from orphaning the attempt.
        let lessons = self.lessons.read().await;
        if !lessons.contains_key(&attempt.lesson_id) {
            return false;
        }
        self.attempts
            .write()
            .await
            .entry(attempt.lesson_id.clone())
            .or_default()
            .push(attempt);
        true
    }

    /// Attempts of one lesson, in submission order.
    pub async fn attempts_for(&self, lesson_id: &str) -> Vec<Attempt> {
        self.attempts.read().await.get(lesson_id).cloned().unwrap_or_default()
    }

    /// Draw up to `count` random gradable questions across non-game lessons
    /// into a fresh game lesson and store it, keeping at most
    /// `MAX_STORED_GAMES` game lessons.
    #[instrument(level = "info", skip(self))]
    pub async fn draw_game(&self, count: usize) -> Lesson {
        let count = count.clamp(1, MAX_GAME_QUESTIONS);
        let pool: Vec<Question> = {
            let lessons = self.lessons.read().await;
            lessons
                .values()
                .filter(|l| l.source != LessonSource::Game)
                .flat_map(|l| l.questions.iter())
                .filter(|q| q.kind() != QuestionKind::Invalid)
                .cloned()
                .collect()
        };

        // ThreadRng is !Send; keep it out of scope across awaits.
        let questions: Vec<Question> = {
            let mut rng = rand::thread_rng();
            pool.choose_multiple(&mut rng, count).cloned().collect()
        };
        if questions.len() < count {
            warn!(target: "lesson", requested = count, available = questions.len(), "Quiz game pool smaller than requested");
        }

        let lesson = Lesson {
            id: Uuid::new_v4().to_string(),
            title: "Quiz game".into(),
            color: String::new(),
            tags: vec!["game".into()],
            questions,
            source: LessonSource::Game,
        };
        self.store_game(lesson.clone()).await;
        info!(target: "lesson", id = %lesson.id, questions = lesson.questions.len(), "Quiz game drawn");
        lesson
    }

    async fn store_game(&self, lesson: Lesson) {
        let mut lessons = self.lessons.write().await;
        let mut order = self.lesson_order.write().await;
        let mut attempts = self.attempts.write().await;

        order.push(lesson.id.clone());
        lessons.insert(lesson.id.clone(), lesson);

        let games: Vec<String> = order
            .iter()
            .filter(|id| lessons.get(*id).is_some_and(|l| l.source == LessonSource::Game))
            .cloned()
            .collect();
        let excess = games.len().saturating_sub(MAX_STORED_GAMES);
        for id in &games[..excess] {
            lessons.remove(id);
            attempts.remove(id);
            debug!(target: "lesson", %id, "Evicted old quiz game");
        }
        if excess > 0 {
            order.retain(|id| lessons.contains_key(id));
        }
    }
}
