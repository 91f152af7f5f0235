pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "server")]
pub mod server;

pub use config::AppConfig;
pub use core::{Aggregator, LearningEngine, PathPlanner, QuizMaster, Ranker};
pub use domain::model::{CourseQuery, CourseRecord, DifficultyFilter, LearningPath, RankedCourse, UserProfile};
pub use utils::error::{LearnPathError, Result};
