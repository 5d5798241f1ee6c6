//! Quizdesk · lesson authoring and quiz backend.
//!
//! Admins write lessons in a plain-text quiz format (`quiz`), students take
//! them over a small JSON API, and attempts are graded and summarised.

pub mod config;
pub mod domain;
pub mod error;
pub mod logic;
pub mod openai;
pub mod protocol;
pub mod quiz;
pub mod routes;
pub mod seeds;
pub mod state;
pub mod telemetry;
pub mod util;

pub use routes::build_router;
pub use state::AppState;
