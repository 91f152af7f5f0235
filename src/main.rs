use clap::Parser;
use learnpath::config::cli::{Cli, Command};
use learnpath::domain::model::{QuizSubmission, RankedCourse, UserProfile};
use learnpath::utils::error::{ErrorSeverity, LearnPathError};
use learnpath::utils::{logger, validation::Validate};
use learnpath::{AppConfig, CourseQuery, DifficultyFilter, LearningEngine};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    #[cfg(feature = "server")]
    let serving = matches!(cli.command, Command::Serve { .. });
    #[cfg(not(feature = "server"))]
    let serving = false;

    // 初始化日誌
    if serving {
        logger::init_server_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    if let Err(e) = run(cli).await {
        // 記錄詳細錯誤信息
        tracing::error!(
            "❌ learnpath failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 建議: {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

async fn run(cli: Cli) -> Result<(), LearnPathError> {
    let config = AppConfig::load(cli.config.as_deref())?;
    config.validate()?;
    tracing::debug!("Configuration: {:?}", config);

    let engine = LearningEngine::from_config(&config)?;

    match cli.command {
        Command::Courses {
            query,
            language,
            difficulty,
            profile,
            top_k,
        } => {
            learnpath::utils::validation::validate_language_tag("language", &language)?;
            let query = CourseQuery::new(query, language, difficulty);
            match profile {
                Some(path) => {
                    let profile: UserProfile = read_json(&path)?;
                    let ranking = engine.recommend(&query, Some(&profile), top_k).await;
                    tracing::info!("✅ Ranking tier: {:?}", ranking.tier);
                    print_json(&ranking.courses)
                }
                None => print_json(&engine.list_courses(&query).await),
            }
        }
        Command::Trending => print_json(&engine.trending().await),
        Command::Details { course_id } => print_json(&engine.details(&course_id)),
        Command::Path { profile, courses, query } => {
            let profile: UserProfile = match profile {
                Some(path) => read_json(&path)?,
                None => UserProfile::default(),
            };
            let courses: Vec<RankedCourse> = match (courses, query) {
                (Some(path), _) => read_json(&path)?,
                (None, Some(query)) => {
                    let query = CourseQuery::new(query, profile.preferred_language.clone(), DifficultyFilter::All);
                    engine.recommend(&query, Some(&profile), None).await.courses
                }
                (None, None) => return Err(LearnPathError::invalid_input("courses", "pass --courses or --query")),
            };
            print_json(&engine.plan(&profile, &courses).await)
        }
        Command::Quiz {
            course_id,
            module_id,
            difficulty,
        } => print_json(&engine.generate_quiz(&course_id, &module_id, &difficulty).await),
        Command::Grade { submission } => {
            let submission: QuizSubmission = read_json(&submission)?;
            print_json(&engine.grade_quiz(&submission).await)
        }
        #[cfg(feature = "server")]
        Command::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            tracing::info!(
                "🚀 Starting learnpath server ({} environment)",
                config.server.environment
            );
            learnpath::server::serve(engine, &host, port).await
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, LearnPathError> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| {
        LearnPathError::invalid_input(path.display().to_string(), format!("not valid JSON for this command: {}", e))
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<(), LearnPathError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
