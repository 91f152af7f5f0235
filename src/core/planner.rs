use crate::core::generate_within;
use crate::domain::model::{Difficulty, LearningPath, LearningPathStep, RankedCourse, UserProfile};
use crate::domain::ports::{Prompt, TextGenerator};
use crate::utils::text::extract_json_object;
use chrono::Utc;
use serde::Deserialize;
use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap};
use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const PLANNER_TEMPERATURE: f32 = 0.8;

#[derive(Debug, Deserialize)]
struct ObjectivesReply {
    objectives: HashMap<String, Vec<String>>,
}

/// Turns ranked courses into an ordered learning path.
///
/// 四個階段依序執行（analyze → order → expand → estimate），每一階段的
/// 輸出是下一階段的輸入。任何階段的生成失敗都只會降低個人化程度，
/// 不會中止流程。
pub struct PathPlanner {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl PathPlanner {
    pub fn new(generator: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    pub async fn plan(&self, profile: &UserProfile, courses: &[RankedCourse]) -> LearningPath {
        if courses.is_empty() {
            info!("🗺️ No courses to plan, returning an empty path");
            return LearningPath {
                learning_path: Vec::new(),
                analysis: String::new(),
                completion_estimate: String::new(),
                generated_at: Utc::now(),
            };
        }

        let analysis = self.analyze(profile).await;
        let ordered = self.order(&analysis, courses).await;
        let steps = self.expand(&ordered).await;
        let completion_estimate = self.estimate(profile, &analysis, &steps).await;

        info!(
            "🗺️ Planned learning path: {} courses -> {} steps",
            courses.len(),
            steps.len()
        );

        LearningPath {
            learning_path: steps,
            analysis,
            completion_estimate,
            generated_at: Utc::now(),
        }
    }

    async fn analyze(&self, profile: &UserProfile) -> String {
        let prompt = format!(
            "Analyze this user profile and extract key learning preferences:\n\n\
User Profile:\n{}\n\n\
Provide insights on:\n\
1. Learning style preferences\n\
2. Optimal study schedule\n\
3. Preferred difficulty progression\n\
4. Key learning objectives",
            profile.describe()
        );
        self.stage("analyze", prompt).await.unwrap_or_default()
    }

    /// 依 AI 回覆中標題首次出現的位置排序；沒被提到的課程依原順序接在後面
    async fn order<'a>(&self, analysis: &str, courses: &'a [RankedCourse]) -> Vec<&'a RankedCourse> {
        let listing: Vec<String> = courses
            .iter()
            .map(|c| format!("- {} ({}, {})", c.course.title, c.course.difficulty, c.course.duration))
            .collect();
        let prompt = format!(
            "Based on the user analysis: {}\n\n\
Available courses:\n{}\n\n\
Select and order the best courses for this user's learning path. \
Consider prerequisites, difficulty progression, and learning objectives. \
List the course titles exactly as given, one per line, in the recommended order.",
            analysis,
            listing.join("\n")
        );

        match self.stage("order", prompt).await {
            Some(reply) => order_by_mentions(&reply, courses),
            None => courses.iter().collect(),
        }
    }

    async fn expand(&self, ordered: &[&RankedCourse]) -> Vec<LearningPathStep> {
        let listing: Vec<String> = ordered
            .iter()
            .map(|c| format!("- id: {} | title: {} | {}", c.course.id, c.course.title, c.course.description))
            .collect();
        let prompt = format!(
            "Create a detailed learning path for these courses:\n{}\n\n\
For each course, provide 2 to 4 concrete learning objectives. \
Respond with JSON only, shaped as {{\"objectives\": {{\"<course id>\": [\"objective\", ...]}}}}",
            listing.join("\n")
        );

        let objectives = match self.stage("expand", prompt).await {
            Some(reply) => match extract_json_object::<ObjectivesReply>(&reply) {
                Some(parsed) => parsed.objectives,
                None => {
                    warn!(stage = "expand", "Objectives reply was not valid JSON, using defaults");
                    HashMap::new()
                }
            },
            None => HashMap::new(),
        };

        build_steps(ordered, &objectives)
    }

    async fn estimate(&self, profile: &UserProfile, analysis: &str, steps: &[LearningPathStep]) -> String {
        let listing: Vec<String> = steps
            .iter()
            .map(|s| format!("{}. {} ({})", s.step_index, s.title, s.duration))
            .collect();
        let prompt = format!(
            "Estimate completion time for this learning path:\n{}\n\n\
User profile:\n{}\n\nAnalysis: {}\n\n\
Provide realistic time estimates and milestones.",
            listing.join("\n"),
            profile.describe(),
            analysis
        );
        self.stage("estimate", prompt).await.unwrap_or_default()
    }

    async fn stage(&self, stage: &str, user: String) -> Option<String> {
        let prompt = Prompt::new(user).with_temperature(PLANNER_TEMPERATURE);
        let operation = format!("learning path {}", stage);
        match generate_within(self.generator.as_ref(), &prompt, self.timeout, &operation).await {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(stage, error = %e, "Planner stage failed, continuing without it");
                None
            }
        }
    }
}

fn order_by_mentions<'a>(reply: &str, courses: &'a [RankedCourse]) -> Vec<&'a RankedCourse> {
    let reply = reply.to_lowercase();

    // 長標題先配對並佔住那段文字，短標題只能配對剩下的位置
    let mut longest_first: Vec<usize> = (0..courses.len()).collect();
    longest_first.sort_by_key(|&i| Reverse(courses[i].course.title.trim().len()));

    let mut claimed: Vec<Range<usize>> = Vec::new();
    let mut positions: Vec<Option<usize>> = vec![None; courses.len()];
    for i in longest_first {
        let title = courses[i].course.title.trim().to_lowercase();
        if title.is_empty() {
            continue;
        }
        let free_span = reply
            .match_indices(title.as_str())
            .map(|(start, _)| start..start + title.len())
            .find(|span| !claimed.iter().any(|taken| taken.start < span.end && span.start < taken.end));
        if let Some(span) = free_span {
            positions[i] = Some(span.start);
            claimed.push(span);
        }
    }

    let mut mentioned: Vec<(usize, &RankedCourse)> = Vec::new();
    let mut rest: Vec<&RankedCourse> = Vec::new();
    for (course, position) in courses.iter().zip(positions) {
        match position {
            Some(position) => mentioned.push((position, course)),
            None => rest.push(course),
        }
    }
    mentioned.sort_by_key(|(position, _)| *position);

    mentioned.into_iter().map(|(_, course)| course).chain(rest).collect()
}

fn default_objectives(title: &str) -> Vec<String> {
    vec![
        format!("Understand the core concepts of {}", title),
        format!("Complete the exercises of {}", title),
    ]
}

/// 每門課一個步驟；進階課程後面多接一個實作專題步驟。
/// 步驟編號從 1 開始遞增，先修條件只指向前一個步驟。
fn build_steps(ordered: &[&RankedCourse], objectives: &HashMap<String, Vec<String>>) -> Vec<LearningPathStep> {
    let mut steps: Vec<LearningPathStep> = Vec::with_capacity(ordered.len());

    let mut push = |title: String, description: String, duration: String, objectives: Vec<String>| {
        let step_index = steps.len() as u32 + 1;
        let prerequisites: BTreeSet<u32> = (step_index > 1).then_some(step_index - 1).into_iter().collect();
        steps.push(LearningPathStep {
            step_index,
            title,
            description,
            duration,
            objectives,
            prerequisites,
        });
    };

    for ranked in ordered {
        let course = &ranked.course;
        let course_objectives = objectives
            .get(&course.id)
            .map(|list| {
                list.iter()
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|list| !list.is_empty())
            .unwrap_or_else(|| default_objectives(&course.title));

        let description = if course.description.trim().is_empty() {
            ranked.recommendation_reason.clone()
        } else {
            course.description.clone()
        };

        push(course.title.clone(), description, course.duration.clone(), course_objectives);

        if course.difficulty == Difficulty::Advanced {
            push(
                format!("Project: apply {}", course.title),
                format!("Build a hands-on project using what you learned in {}", course.title),
                "1-2 weeks".to_string(),
                vec![
                    format!("Apply {} to a real problem", course.title),
                    "Document and share the result".to_string(),
                ],
            );
        }
    }

    steps
}
