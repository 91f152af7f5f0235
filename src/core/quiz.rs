use crate::core::generate_within;
use crate::domain::model::{Quiz, QuizGrade, QuizQuestion, QuizSubmission};
use crate::domain::ports::{Prompt, TextGenerator};
use crate::utils::text::extract_json_object;
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const QUIZ_TEMPERATURE: f32 = 0.5;
const QUESTIONS_PER_QUIZ: usize = 5;

#[derive(Debug, Deserialize)]
struct QuizReply {
    #[serde(default)]
    questions: Vec<Value>,
}

/// Quiz generation and grading.
pub struct QuizMaster {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl QuizMaster {
    pub fn new(generator: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    /// 產生測驗；生成失敗或沒有任何合格題目時回傳固定的一題測驗
    pub async fn generate_quiz(&self, course_id: &str, module_id: &str, difficulty: &str) -> Quiz {
        let prompt = Prompt::new(quiz_prompt(course_id, module_id, difficulty)).with_temperature(QUIZ_TEMPERATURE);

        let questions = match generate_within(self.generator.as_ref(), &prompt, self.timeout, "quiz generation").await
        {
            Ok(reply) => valid_questions(&reply),
            Err(e) => {
                warn!(course_id, module_id, error = %e, "Quiz generation failed, using fallback quiz");
                Vec::new()
            }
        };

        if questions.is_empty() {
            return fallback_quiz(course_id, module_id, difficulty);
        }

        info!("📝 Generated quiz for {}/{} with {} questions", course_id, module_id, questions.len());
        Quiz {
            course_id: course_id.to_string(),
            module_id: module_id.to_string(),
            difficulty: difficulty.to_string(),
            total_questions: questions.len(),
            questions,
            generated_at: Utc::now(),
        }
    }

    /// Grades the submission and attaches AI feedback when the generator answers.
    pub async fn grade_quiz(&self, submission: &QuizSubmission) -> QuizGrade {
        let mut grade = grade_answers(submission);

        let prompt = Prompt::new(format!(
            "The student scored {}% on this quiz ({}/{} correct).\n\n\
Generate encouraging, constructive feedback that:\n\
1. Acknowledges their performance\n\
2. Suggests areas for improvement\n\
3. Provides motivation to continue learning\n\
4. Offers specific study tips",
            grade.percentage, grade.score, grade.total_questions
        ))
        .with_temperature(QUIZ_TEMPERATURE);

        match generate_within(self.generator.as_ref(), &prompt, self.timeout, "quiz feedback").await {
            Ok(feedback) => grade.ai_feedback = feedback,
            Err(e) => warn!(error = %e, "AI quiz feedback unavailable"),
        }
        grade
    }
}

/// Exact-string comparison per question id. Answers to unknown ids are ignored.
pub fn grade_answers(submission: &QuizSubmission) -> QuizGrade {
    let total_questions = submission.correct_answers.len();
    let mut score = 0;
    let mut feedback = Vec::new();

    for (question_id, answer) in &submission.answers {
        let Some(correct) = submission.correct_answers.get(question_id) else {
            continue;
        };
        if answer == correct {
            score += 1;
            feedback.push(format!("Question {}: Correct! ✅", question_id));
        } else {
            feedback.push(format!(
                "Question {}: Incorrect. The correct answer was {} ❌",
                question_id, correct
            ));
        }
    }

    let percentage = if total_questions > 0 {
        score as f64 / total_questions as f64 * 100.0
    } else {
        0.0
    };

    QuizGrade {
        score,
        total_questions,
        percentage,
        feedback,
        ai_feedback: String::new(),
        graded_at: Utc::now(),
    }
}

fn valid_questions(reply: &str) -> Vec<QuizQuestion> {
    let Some(parsed) = extract_json_object::<QuizReply>(reply) else {
        warn!("Quiz reply was not valid JSON");
        return Vec::new();
    };

    let total = parsed.questions.len();
    let questions: Vec<QuizQuestion> = parsed
        .questions
        .into_iter()
        .filter_map(|value| serde_json::from_value::<QuizQuestion>(value).ok())
        .filter(QuizQuestion::is_well_formed)
        .collect();

    if questions.len() < total {
        warn!("Dropped {} malformed quiz questions", total - questions.len());
    }
    questions
}

pub fn fallback_quiz(course_id: &str, module_id: &str, difficulty: &str) -> Quiz {
    Quiz {
        course_id: course_id.to_string(),
        module_id: module_id.to_string(),
        difficulty: difficulty.to_string(),
        questions: vec![QuizQuestion {
            question: "What is the main topic of this module?".to_string(),
            options: ["Programming", "Mathematics", "Science", "Literature"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            correct_answer: "Programming".to_string(),
            explanation: "This module focuses on programming concepts.".to_string(),
        }],
        total_questions: 1,
        generated_at: Utc::now(),
    }
}

fn quiz_prompt(course_id: &str, module_id: &str, difficulty: &str) -> String {
    format!(
        "Generate a quiz for the following course content:\n\n\
Course: {course_id}\nModule: {module_id}\nDifficulty: {difficulty}\n\n\
Create {QUESTIONS_PER_QUIZ} multiple-choice questions with:\n\
1. Clear, unambiguous questions\n\
2. 4 answer options\n\
3. One correct answer, copied exactly from the options\n\
4. Explanations for correct answers\n\
5. Difficulty appropriate for {difficulty} level\n\n\
Format the response as JSON with this structure:\n\
{{\"questions\": [{{\"question\": \"Question text\", \"options\": [\"A\", \"B\", \"C\", \"D\"], \
\"correct_answer\": \"A\", \"explanation\": \"Why this is correct\"}}]}}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::llm::DisabledGenerator;
    use crate::core::test_support::ScriptedGenerator;
    use std::collections::BTreeMap;

    fn answers(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[tokio::test]
    async fn test_generated_questions_are_validated() {
        let reply = r#"Here you go:
{"questions": [
  {"question": "2 + 2?", "options": ["3", "4"], "correct_answer": "4", "explanation": "arithmetic"},
  {"question": "Bad key", "options": ["a", "b"], "correct_answer": "c"},
  {"question": "", "options": ["a", "b"], "correct_answer": "a"},
  {"options": ["a", "b"]}
]}"#;
        let master = QuizMaster::new(Arc::new(ScriptedGenerator::new(vec![Some(reply)])), Duration::from_secs(1));

        let quiz = master.generate_quiz("course-1", "module-1", "medium").await;

        assert_eq!(quiz.total_questions, 1);
        assert_eq!(quiz.questions[0].question, "2 + 2?");
        assert_eq!(quiz.difficulty, "medium");
    }

    #[tokio::test]
    async fn test_fallback_quiz_when_generation_fails() {
        let master = QuizMaster::new(Arc::new(DisabledGenerator::new("off")), Duration::from_secs(1));

        let quiz = master.generate_quiz("course-1", "module-2", "easy").await;

        assert_eq!(quiz.total_questions, 1);
        assert_eq!(quiz.module_id, "module-2");
        assert_eq!(quiz.questions[0].correct_answer, "Programming");
        assert!(quiz.questions[0].is_well_formed());
    }

    #[tokio::test]
    async fn test_fallback_quiz_when_nothing_survives_validation() {
        let reply = r#"{"questions": [{"question": "?", "options": ["only"], "correct_answer": "only"}]}"#;
        let master = QuizMaster::new(Arc::new(ScriptedGenerator::new(vec![Some(reply)])), Duration::from_secs(1));

        let quiz = master.generate_quiz("course-1", "module-1", "hard").await;

        assert_eq!(quiz.questions, fallback_quiz("course-1", "module-1", "hard").questions);
    }

    #[test]
    fn test_grade_answers() {
        let submission = QuizSubmission {
            answers: answers(&[("q1", "A"), ("q2", "B"), ("q9", "C")]),
            correct_answers: answers(&[("q1", "A"), ("q2", "C"), ("q3", "D"), ("q4", "A")]),
        };

        let grade = grade_answers(&submission);

        assert_eq!(grade.score, 1);
        assert_eq!(grade.total_questions, 4);
        assert_eq!(grade.percentage, 25.0);
        assert_eq!(
            grade.feedback,
            vec![
                "Question q1: Correct! ✅".to_string(),
                "Question q2: Incorrect. The correct answer was C ❌".to_string(),
            ]
        );
    }

    #[test]
    fn test_grade_without_questions() {
        let grade = grade_answers(&QuizSubmission::default());
        assert_eq!(grade.percentage, 0.0);
        assert_eq!(grade.total_questions, 0);
    }

    #[tokio::test]
    async fn test_ai_feedback_attached_when_available() {
        let generator = Arc::new(ScriptedGenerator::new(vec![Some("Great work, keep going!")]));
        let master = QuizMaster::new(generator.clone(), Duration::from_secs(1));
        let submission = QuizSubmission {
            answers: answers(&[("q1", "A")]),
            correct_answers: answers(&[("q1", "A")]),
        };

        let grade = master.grade_quiz(&submission).await;

        assert_eq!(grade.ai_feedback, "Great work, keep going!");
        assert_eq!(grade.percentage, 100.0);
        assert!(generator.prompts.lock().unwrap()[0].user.contains("100% on this quiz (1/1 correct)"));
    }

    #[tokio::test]
    async fn test_ai_feedback_empty_on_failure() {
        let master = QuizMaster::new(Arc::new(DisabledGenerator::new("off")), Duration::from_secs(1));
        let grade = master.grade_quiz(&QuizSubmission::default()).await;
        assert_eq!(grade.ai_feedback, "");
    }
}
