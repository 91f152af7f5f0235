use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::utils::error::LearnPathError;

/// External course catalog a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    #[serde(rename = "edX")]
    Edx,
    #[serde(rename = "MIT OCW")]
    MitOcw,
    #[serde(rename = "OpenStax")]
    OpenStax,
    #[serde(rename = "MockProvider")]
    Catalog,
    /// Records posted back by callers from a source we do not know.
    #[serde(other)]
    Other,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Edx => "edX",
            Provider::MitOcw => "MIT OCW",
            Provider::OpenStax => "OpenStax",
            Provider::Catalog => "MockProvider",
            Provider::Other => "Other",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
    Unknown,
}

impl Difficulty {
    /// 嚴格解析：只接受已知的等級名稱（不分大小寫）
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "beginner" | "introductory" => Some(Difficulty::Beginner),
            "intermediate" => Some(Difficulty::Intermediate),
            "advanced" => Some(Difficulty::Advanced),
            "unknown" => Some(Difficulty::Unknown),
            _ => None,
        }
    }

    /// 寬鬆解析：供應商給的任何字串都能落到某個等級
    pub fn normalize(label: &str) -> Self {
        Self::from_label(label).unwrap_or(Difficulty::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
            Difficulty::Unknown => "unknown",
        }
    }
}

impl From<String> for Difficulty {
    fn from(label: String) -> Self {
        Self::normalize(&label)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Difficulty constraint of a course search. `all` disables filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DifficultyFilter {
    #[default]
    All,
    Only(Difficulty),
}

impl DifficultyFilter {
    pub fn matches(&self, difficulty: Difficulty) -> bool {
        match self {
            DifficultyFilter::All => true,
            DifficultyFilter::Only(wanted) => *wanted == difficulty,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyFilter::All => "all",
            DifficultyFilter::Only(difficulty) => difficulty.as_str(),
        }
    }
}

impl FromStr for DifficultyFilter {
    type Err = LearnPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(DifficultyFilter::All);
        }
        Difficulty::from_label(s)
            .map(DifficultyFilter::Only)
            .ok_or_else(|| {
                LearnPathError::invalid_input(
                    "difficulty",
                    format!(
                        "'{}' is not one of all, beginner, intermediate, advanced, unknown",
                        s
                    ),
                )
            })
    }
}

impl fmt::Display for DifficultyFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized course listing. `id` is only unique within its provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub provider: Provider,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default = "default_duration")]
    pub duration: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trending: Option<bool>,
}

impl CourseRecord {
    /// Deduplication key: provider namespace plus provider-local id.
    pub fn key(&self) -> (Provider, &str) {
        (self.provider, self.id.as_str())
    }
}

/// Missing ratings become 0.0, everything else is clamped to [0, 5].
pub fn normalize_rating(rating: Option<f64>) -> f64 {
    match rating {
        Some(value) if value.is_finite() => value.clamp(0.0, 5.0),
        _ => 0.0,
    }
}

fn default_language() -> String {
    "en".to_string()
}

fn default_duration() -> String {
    "Self-paced".to_string()
}

fn default_time_available() -> String {
    "5-10 hours/week".to_string()
}

/// Parameters of a single aggregated search.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseQuery {
    pub query: String,
    pub language: String,
    pub difficulty: DifficultyFilter,
}

impl CourseQuery {
    pub fn new(query: impl Into<String>, language: impl Into<String>, difficulty: DifficultyFilter) -> Self {
        Self {
            query: query.into(),
            language: language.into(),
            difficulty,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningGoal {
    #[default]
    SkillEnhancement,
    CareerChange,
    AcademicCredit,
    PersonalInterest,
    #[serde(other)]
    Other,
}

impl LearningGoal {
    pub fn as_str(&self) -> &'static str {
        match self {
            LearningGoal::SkillEnhancement => "skill_enhancement",
            LearningGoal::CareerChange => "career_change",
            LearningGoal::AcademicCredit => "academic_credit",
            LearningGoal::PersonalInterest => "personal_interest",
            LearningGoal::Other => "other",
        }
    }
}

/// Learner description supplied with a ranking or planning request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub interests: BTreeSet<String>,
    #[serde(default)]
    pub current_level: Difficulty,
    #[serde(default)]
    pub learning_goal: LearningGoal,
    #[serde(default = "default_time_available")]
    pub time_available: String,
    #[serde(default = "default_language")]
    pub preferred_language: String,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            interests: BTreeSet::new(),
            current_level: Difficulty::Beginner,
            learning_goal: LearningGoal::SkillEnhancement,
            time_available: default_time_available(),
            preferred_language: default_language(),
        }
    }
}

impl UserProfile {
    /// Prompt-ready multi-line rendering.
    pub fn describe(&self) -> String {
        let interests = if self.interests.is_empty() {
            "none stated".to_string()
        } else {
            self.interests.iter().cloned().collect::<Vec<_>>().join(", ")
        };
        format!(
            "- Interests: {}\n- Current Level: {}\n- Learning Goal: {}\n- Time Available: {}\n- Preferred Language: {}",
            interests,
            self.current_level,
            self.learning_goal.as_str(),
            self.time_available,
            self.preferred_language
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCourse {
    #[serde(flatten)]
    pub course: CourseRecord,
    #[serde(default)]
    pub recommendation_reason: String,
}

impl RankedCourse {
    pub fn new(course: CourseRecord, reason: impl Into<String>) -> Self {
        Self {
            course,
            recommendation_reason: reason.into(),
        }
    }
}

/// One ordered unit of a learning path. Prerequisites only point backwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningPathStep {
    #[serde(rename = "step")]
    pub step_index: u32,
    pub title: String,
    pub description: String,
    pub duration: String,
    pub objectives: Vec<String>,
    pub prerequisites: BTreeSet<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningPath {
    pub learning_path: Vec<LearningPathStep>,
    pub analysis: String,
    pub completion_estimate: String,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseModule {
    pub id: String,
    pub title: String,
    pub duration: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseDetails {
    pub id: String,
    pub title: String,
    pub description: String,
    pub modules: Vec<CourseModule>,
    pub duration: String,
    pub difficulty: Difficulty,
    pub instructor: String,
    pub prerequisites: Vec<String>,
    pub certificate: bool,
    pub enrollment_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
}

impl QuizQuestion {
    /// 題目必須有內容、至少兩個選項，且正解在選項之中
    pub fn is_well_formed(&self) -> bool {
        !self.question.trim().is_empty()
            && self.options.len() >= 2
            && self.options.iter().any(|option| option == &self.correct_answer)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub course_id: String,
    pub module_id: String,
    pub difficulty: String,
    pub questions: Vec<QuizQuestion>,
    pub total_questions: usize,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizGrade {
    pub score: usize,
    pub total_questions: usize,
    pub percentage: f64,
    pub feedback: Vec<String>,
    pub ai_feedback: String,
    pub graded_at: DateTime<Utc>,
}

/// Submitted answers and the answer key, both keyed by question id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QuizSubmission {
    #[serde(default)]
    pub answers: BTreeMap<String, String>,
    #[serde(default)]
    pub correct_answers: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_parsing_is_case_insensitive() {
        assert_eq!(Difficulty::normalize("Intermediate"), Difficulty::Intermediate);
        assert_eq!(Difficulty::normalize("ADVANCED"), Difficulty::Advanced);
        assert_eq!(Difficulty::normalize("Introductory"), Difficulty::Beginner);
        assert_eq!(Difficulty::normalize("expert"), Difficulty::Unknown);
    }

    #[test]
    fn test_difficulty_filter_from_str() {
        assert_eq!("all".parse::<DifficultyFilter>().unwrap(), DifficultyFilter::All);
        assert_eq!(
            "Beginner".parse::<DifficultyFilter>().unwrap(),
            DifficultyFilter::Only(Difficulty::Beginner)
        );
        assert!("expert".parse::<DifficultyFilter>().is_err());
    }

    #[test]
    fn test_normalize_rating() {
        assert_eq!(normalize_rating(None), 0.0);
        assert_eq!(normalize_rating(Some(f64::NAN)), 0.0);
        assert_eq!(normalize_rating(Some(7.2)), 5.0);
        assert_eq!(normalize_rating(Some(-1.0)), 0.0);
        assert_eq!(normalize_rating(Some(4.4)), 4.4);
    }

    #[test]
    fn test_course_record_deserializes_with_defaults() {
        let course: CourseRecord = serde_json::from_value(serde_json::json!({
            "id": "course-1",
            "title": "Sample",
            "provider": "SampleProvider",
            "difficulty": "Intermediate"
        }))
        .unwrap();

        assert_eq!(course.provider, Provider::Other);
        assert_eq!(course.difficulty, Difficulty::Intermediate);
        assert_eq!(course.language, "en");
        assert_eq!(course.rating, 0.0);
        assert!(course.url.is_none());
    }

    #[test]
    fn test_ranked_course_flattens_record() {
        let course = CourseRecord {
            id: "e1".to_string(),
            title: "Intro".to_string(),
            description: String::new(),
            provider: Provider::Edx,
            language: "en".to_string(),
            difficulty: Difficulty::Beginner,
            duration: "4 weeks".to_string(),
            rating: 4.0,
            url: None,
            trending: None,
        };
        let value = serde_json::to_value(RankedCourse::new(course, "default ordering")).unwrap();

        assert_eq!(value["id"], "e1");
        assert_eq!(value["provider"], "edX");
        assert_eq!(value["difficulty"], "beginner");
        assert_eq!(value["recommendation_reason"], "default ordering");
        assert!(value.get("url").is_none());
    }

    #[test]
    fn test_user_profile_defaults() {
        let profile: UserProfile = serde_json::from_value(serde_json::json!({
            "interests": ["python"],
            "learning_goal": "something_else"
        }))
        .unwrap();

        assert_eq!(profile.current_level, Difficulty::Beginner);
        assert_eq!(profile.learning_goal, LearningGoal::Other);
        assert_eq!(profile.time_available, "5-10 hours/week");
        assert!(profile.describe().contains("- Interests: python"));
    }
}
