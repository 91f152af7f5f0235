//! HTTP surface over [`LearningEngine`].

mod error;
mod routes;

pub use error::{ApiError, ApiResult};

use crate::core::LearningEngine;
use crate::utils::error::Result;
use axum::{
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<LearningEngine>,
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(engine: LearningEngine) -> Self {
        Self {
            engine: Arc::new(engine),
            startup_time: Utc::now(),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .route("/courses", get(routes::list_courses).post(routes::recommend_courses))
        .route("/courses/trending", get(routes::trending_courses))
        .route("/courses/:course_id", get(routes::course_details))
        .route("/learning-path", post(routes::learning_path))
        .route("/quiz", post(routes::generate_quiz))
        .route("/quiz/grade", post(routes::grade_quiz))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 啟動 HTTP 服務，收到 Ctrl-C 後優雅關閉
pub async fn serve(engine: LearningEngine, host: &str, port: u16) -> Result<()> {
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    tracing::info!("🌐 Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, build_router(AppState::new(engine)))
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("🛑 Shutdown signal received");
            }
        })
        .await?;
    Ok(())
}
