use super::{ApiResult, AppState};
use crate::domain::model::{
    CourseDetails, CourseQuery, DifficultyFilter, LearningPath, QuizGrade, QuizSubmission, RankedCourse, UserProfile,
};
use crate::utils::error::LearnPathError;
use crate::utils::validation::validate_language_tag;
use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

fn default_module() -> String {
    "module-1".to_string()
}

fn default_quiz_difficulty() -> String {
    "medium".to_string()
}

/// 搜尋條件；未提供的欄位套用預設值 (query "", language "en", difficulty "all")
#[derive(Debug, Default, Deserialize)]
pub struct CourseSearchParams {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
}

impl CourseSearchParams {
    /// Fields set here win; the rest come from `fallback`.
    fn or(self, fallback: CourseSearchParams) -> Self {
        Self {
            query: self.query.or(fallback.query),
            language: self.language.or(fallback.language),
            difficulty: self.difficulty.or(fallback.difficulty),
        }
    }

    fn into_query(self) -> Result<CourseQuery, LearnPathError> {
        let language = self.language.unwrap_or_else(|| "en".to_string());
        validate_language_tag("language", &language)?;
        let difficulty: DifficultyFilter = self.difficulty.as_deref().unwrap_or("all").parse()?;
        let query = self.query.unwrap_or_default();
        Ok(CourseQuery::new(query.trim(), language, difficulty))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RecommendRequest {
    #[serde(flatten)]
    pub search: CourseSearchParams,
    #[serde(default)]
    pub user_profile: Option<UserProfile>,
    #[serde(default)]
    pub top_k: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct LearningPathRequest {
    #[serde(default)]
    pub user_profile: UserProfile,
    #[serde(default)]
    pub courses: Vec<RankedCourse>,
}

#[derive(Debug, Deserialize)]
pub struct QuizRequest {
    pub course_id: String,
    #[serde(default = "default_module")]
    pub module_id: String,
    #[serde(default = "default_quiz_difficulty")]
    pub difficulty: String,
}

/// GET /
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Learning path API is running",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "healthy",
    }))
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let uptime_seconds = Utc::now()
        .signed_duration_since(state.startup_time)
        .num_seconds()
        .max(0);

    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now(),
        "uptime_seconds": uptime_seconds,
    }))
}

/// GET /courses
pub async fn list_courses(
    State(state): State<AppState>,
    params: Result<Query<CourseSearchParams>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(params) = params?;
    let query = params.into_query()?;

    let courses = state.engine.list_courses(&query).await;
    Ok(Json(json!({ "courses": courses })))
}

impl RecommendRequest {
    /// 空白 body 等同 `{}`
    fn from_body(body: &[u8]) -> Result<Self, LearnPathError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body).map_err(|e| LearnPathError::invalid_input("body", e.to_string()))
    }
}

/// POST /courses
///
/// Search fields may come from the query string, the JSON body, or both;
/// body fields take precedence. The body itself is optional.
pub async fn recommend_courses(
    State(state): State<AppState>,
    params: Result<Query<CourseSearchParams>, QueryRejection>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<Json<Value>> {
    let Query(params) = params?;
    let request = RecommendRequest::from_body(&body?)?;
    if request.top_k == Some(0) {
        return Err(LearnPathError::invalid_input("top_k", "must be at least 1").into());
    }
    let query = request.search.or(params).into_query()?;

    let ranking = state
        .engine
        .recommend(&query, request.user_profile.as_ref(), request.top_k)
        .await;
    Ok(Json(json!({ "courses": ranking.courses, "ranking": ranking.tier })))
}

/// GET /courses/trending
pub async fn trending_courses(State(state): State<AppState>) -> Json<Value> {
    let courses = state.engine.trending().await;
    Json(json!({ "courses": courses }))
}

/// GET /courses/:course_id
pub async fn course_details(State(state): State<AppState>, Path(course_id): Path<String>) -> Json<CourseDetails> {
    Json(state.engine.details(&course_id))
}

/// POST /learning-path
pub async fn learning_path(
    State(state): State<AppState>,
    payload: Result<Json<LearningPathRequest>, JsonRejection>,
) -> ApiResult<Json<LearningPath>> {
    let Json(request) = payload?;
    let path = state.engine.plan(&request.user_profile, &request.courses).await;
    Ok(Json(path))
}

/// POST /quiz
pub async fn generate_quiz(
    State(state): State<AppState>,
    payload: Result<Json<QuizRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = payload?;
    if request.course_id.trim().is_empty() {
        return Err(LearnPathError::invalid_input("course_id", "cannot be empty").into());
    }

    let quiz = state
        .engine
        .generate_quiz(&request.course_id, &request.module_id, &request.difficulty)
        .await;
    Ok(Json(json!({ "quiz": quiz })))
}

/// POST /quiz/grade
pub async fn grade_quiz(
    State(state): State<AppState>,
    payload: Result<Json<QuizSubmission>, JsonRejection>,
) -> ApiResult<Json<QuizGrade>> {
    let Json(submission) = payload?;
    Ok(Json(state.engine.grade_quiz(&submission).await))
}
