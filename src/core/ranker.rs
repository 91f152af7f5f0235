use crate::core::generate_within;
use crate::domain::model::{CourseRecord, Provider, RankedCourse, UserProfile};
use crate::domain::ports::{Prompt, TextGenerator};
use crate::utils::text::{contains_ignore_case, extract_json_object};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_ORDERING_REASON: &str = "default ordering";
pub const AI_RECOMMENDED_REASON: &str = "AI-recommended based on your profile";
pub const TOP_RATED_REASON: &str = "Top-rated course in your area of interest";

const ADVISOR_SYSTEM_PROMPT: &str = "You are an expert educational advisor specializing in online learning and MOOC platforms. \
Your goal is to recommend the best courses based on user preferences, learning goals, and background.\n\n\
Consider factors like:\n\
- User's current skill level\n\
- Learning goals and career objectives\n\
- Time availability\n\
- Language preferences\n\
- Course quality and ratings\n\n\
Provide personalized, actionable recommendations with explanations.";

/// Why the deterministic tier was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackCause {
    /// The generator errored, timed out, or is disabled.
    GenerationFailed,
    /// The generator answered, but nothing in the answer named a candidate.
    NoMatch,
}

/// Which selection tier produced a ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "tier", rename_all = "snake_case")]
pub enum RankingTier {
    Unranked,
    Structured,
    TitleMatch,
    RatingFallback { cause: FallbackCause },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    pub courses: Vec<RankedCourse>,
    pub tier: RankingTier,
}

#[derive(Debug, Deserialize)]
struct StructuredPicks {
    recommended: Vec<Value>,
}

/// Ids only mean something inside their provider, so every pick names both.
#[derive(Debug, Deserialize)]
struct StructuredPick {
    provider: Provider,
    id: Value,
}

impl StructuredPick {
    fn key(&self) -> Option<(Provider, String)> {
        let id = match &self.id {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        (!id.is_empty()).then_some((self.provider, id))
    }
}

/// Personalizes a candidate list with a best-effort AI pass and a
/// reproducible rating-based fallback.
pub struct Ranker {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl Ranker {
    pub fn new(generator: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    pub async fn rank(
        &self,
        profile: Option<&UserProfile>,
        candidates: &[CourseRecord],
        k: usize,
    ) -> Vec<RankedCourse> {
        self.rank_with_outcome(profile, candidates, k).await.courses
    }

    /// 排名流程：
    /// 1. 沒有 profile 或沒有候選 → 原順序前 k 筆
    /// 2. AI 回應中的 JSON `recommended`（provider + id）
    /// 3. AI 回應中出現的課程標題（不分大小寫）
    /// 4. 依評分排序（穩定排序）取前 k 筆
    ///
    /// Tiers 2 and 3 keep candidate order; the generator only decides membership.
    /// `k` is treated as at least 1, so non-empty input always gives non-empty output.
    pub async fn rank_with_outcome(
        &self,
        profile: Option<&UserProfile>,
        candidates: &[CourseRecord],
        k: usize,
    ) -> Ranking {
        let k = k.max(1);

        let profile = match profile {
            Some(profile) if !candidates.is_empty() => profile,
            _ => {
                return Ranking {
                    courses: tag(candidates.iter().take(k), DEFAULT_ORDERING_REASON),
                    tier: RankingTier::Unranked,
                }
            }
        };

        let prompt = recommendation_prompt(profile, candidates, k);
        let text = match generate_within(self.generator.as_ref(), &prompt, self.timeout, "course ranking").await {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    generator = self.generator.name(),
                    error = %e,
                    "AI ranking unavailable, falling back to rating order"
                );
                return fallback(candidates, k, FallbackCause::GenerationFailed);
            }
        };

        if let Some(courses) = select_structured(&text, candidates, k) {
            info!("🎯 AI ranking selected {} courses via structured output", courses.len());
            return Ranking {
                courses,
                tier: RankingTier::Structured,
            };
        }

        if let Some(courses) = select_by_title(&text, candidates, k) {
            info!("🎯 AI ranking selected {} courses via title match", courses.len());
            return Ranking {
                courses,
                tier: RankingTier::TitleMatch,
            };
        }

        debug!("AI response named no candidate: {:.200}", text);
        warn!("AI ranking matched no candidates, falling back to rating order");
        fallback(candidates, k, FallbackCause::NoMatch)
    }
}

fn tag<'a>(courses: impl Iterator<Item = &'a CourseRecord>, reason: &str) -> Vec<RankedCourse> {
    courses.map(|course| RankedCourse::new(course.clone(), reason)).collect()
}

fn fallback(candidates: &[CourseRecord], k: usize, cause: FallbackCause) -> Ranking {
    Ranking {
        courses: top_rated(candidates, k),
        tier: RankingTier::RatingFallback { cause },
    }
}

/// Rating descending; equal ratings keep their input order.
pub fn top_rated(candidates: &[CourseRecord], k: usize) -> Vec<RankedCourse> {
    let mut sorted: Vec<&CourseRecord> = candidates.iter().collect();
    sorted.sort_by(|a, b| b.rating.total_cmp(&a.rating));
    tag(sorted.into_iter().take(k), TOP_RATED_REASON)
}

fn select_structured(text: &str, candidates: &[CourseRecord], k: usize) -> Option<Vec<RankedCourse>> {
    let picks: StructuredPicks = extract_json_object(text)?;
    let wanted: HashSet<(Provider, String)> = picks
        .recommended
        .into_iter()
        .filter_map(|pick| serde_json::from_value::<StructuredPick>(pick).ok())
        .filter_map(|pick| pick.key())
        .collect();

    let selected = tag(
        candidates
            .iter()
            .filter(|course| wanted.contains(&(course.provider, course.id.clone())))
            .take(k),
        AI_RECOMMENDED_REASON,
    );
    (!selected.is_empty()).then_some(selected)
}

fn select_by_title(text: &str, candidates: &[CourseRecord], k: usize) -> Option<Vec<RankedCourse>> {
    let selected = tag(
        candidates
            .iter()
            .filter(|course| contains_ignore_case(text, &course.title))
            .take(k),
        AI_RECOMMENDED_REASON,
    );
    (!selected.is_empty()).then_some(selected)
}

fn recommendation_prompt(profile: &UserProfile, candidates: &[CourseRecord], k: usize) -> Prompt {
    let available = serde_json::to_string_pretty(candidates).unwrap_or_default();
    let user = format!(
        "User Profile:\n{}\n\nAvailable Courses: {}\n\n\
Please recommend the top {} courses that would be most suitable for this user. \
For each recommendation, explain why it's a good fit and what the user can expect to learn.\n\n\
End your answer with a JSON object naming each recommended course by its provider and id, \
for example: {{\"recommended\": [{{\"provider\": \"<provider>\", \"id\": \"<id>\"}}]}}",
        profile.describe(),
        available,
        k
    );
    Prompt::new(user)
        .with_system(ADVISOR_SYSTEM_PROMPT)
        .with_temperature(0.7)
}
