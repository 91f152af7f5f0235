use crate::domain::model::DifficultyFilter;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "learnpath")]
#[command(about = "Aggregate open courses and build personalized learning paths")]
#[command(version)]
pub struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, global = true, env = "LEARNPATH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search every enabled provider; ranks the result when a profile is given
    Courses {
        query: String,

        #[arg(long, default_value = "en")]
        language: String,

        /// all, beginner, intermediate, advanced or unknown
        #[arg(long, default_value = "all")]
        difficulty: DifficultyFilter,

        /// JSON file with a user profile
        #[arg(long)]
        profile: Option<PathBuf>,

        /// Number of ranked courses (defaults to ranking.top_k)
        #[arg(long)]
        top_k: Option<usize>,
    },

    /// Trending courses across popular topics
    Trending,

    /// Detailed view of a single course
    Details { course_id: String },

    /// Build a learning path from ranked courses
    Path {
        /// JSON file with a user profile
        #[arg(long)]
        profile: Option<PathBuf>,

        /// JSON file with an array of ranked courses
        #[arg(long, required_unless_present = "query")]
        courses: Option<PathBuf>,

        /// Search and rank courses for this query instead of reading a file
        #[arg(long, conflicts_with = "courses")]
        query: Option<String>,
    },

    /// Generate a quiz for a course module
    Quiz {
        course_id: String,

        #[arg(long, default_value = "module-1")]
        module_id: String,

        #[arg(long, default_value = "medium")]
        difficulty: String,
    },

    /// Grade a quiz submission (JSON with answers and correct_answers)
    Grade { submission: PathBuf },

    /// Start the HTTP API
    #[cfg(feature = "server")]
    Serve {
        /// Overrides server.host
        #[arg(long)]
        host: Option<String>,

        /// Overrides server.port
        #[arg(long)]
        port: Option<u16>,
    },
}
