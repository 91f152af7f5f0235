pub mod aggregator;
pub mod engine;
pub mod planner;
pub mod quiz;
pub mod ranker;

#[cfg(test)]
mod test_support;

pub use aggregator::Aggregator;
pub use engine::LearningEngine;
pub use planner::PathPlanner;
pub use quiz::QuizMaster;
pub use ranker::{FallbackCause, Ranker, Ranking, RankingTier};

use crate::domain::ports::{Prompt, TextGenerator};
use crate::utils::error::{LearnPathError, Result};
use std::time::Duration;

/// 所有生成呼叫都必須有上限時間；逾時視同一般失敗
pub(crate) async fn generate_within(
    generator: &dyn TextGenerator,
    prompt: &Prompt,
    timeout: Duration,
    operation: &str,
) -> Result<String> {
    match tokio::time::timeout(timeout, generator.generate(prompt)).await {
        Ok(result) => result,
        Err(_) => Err(LearnPathError::Timeout {
            operation: operation.to_string(),
            duration: timeout,
        }),
    }
}
