use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Answer, LevelId, QuestionId};

/// Minimum percentage for a passed attempt. Fixed policy, independent of content.
pub const PASS_THRESHOLD_PERCENT: u32 = 80;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResultError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("a quiz result needs at least one question outcome")]
    NoOutcomes,

    #[error("too many outcomes for a single attempt: {len}")]
    TooManyOutcomes { len: usize },
}

/// Whether a submitted answer was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Correct,
    Incorrect,
}

impl Outcome {
    #[must_use]
    pub fn from_correct(correct: bool) -> Self {
        if correct {
            Outcome::Correct
        } else {
            Outcome::Incorrect
        }
    }

    #[must_use]
    pub fn is_correct(self) -> bool {
        matches!(self, Outcome::Correct)
    }
}

/// What happened on one question of an attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    pub question_id: QuestionId,
    pub outcome: Outcome,
    /// `None` when the learner explicitly skipped the question.
    pub answer: Option<Answer>,
}

/// Rounded (half-up) percentage of `score` out of `total`. Zero when `total` is zero.
#[must_use]
pub fn score_percentage(score: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let score = u64::from(score.min(total));
    let total = u64::from(total);
    let rounded = (score * 200 + total) / (total * 2);
    u32::try_from(rounded).unwrap_or(100)
}

/// Final, immutable outcome of a completed quiz attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResult {
    level: LevelId,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
    score: u32,
    total: u32,
    outcomes: Vec<QuestionOutcome>,
}

impl QuizResult {
    /// Build a result from the per-question outcomes of an attempt.
    ///
    /// # Errors
    ///
    /// Returns `ResultError::InvalidTimeRange` if `completed_at` is before `started_at`.
    /// Returns `ResultError::NoOutcomes` if `outcomes` is empty.
    /// Returns `ResultError::TooManyOutcomes` if the count cannot fit in `u32`.
    pub fn from_outcomes(
        level: LevelId,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        outcomes: Vec<QuestionOutcome>,
    ) -> Result<Self, ResultError> {
        if completed_at < started_at {
            return Err(ResultError::InvalidTimeRange);
        }
        if outcomes.is_empty() {
            return Err(ResultError::NoOutcomes);
        }

        let total = u32::try_from(outcomes.len())
            .map_err(|_| ResultError::TooManyOutcomes { len: outcomes.len() })?;
        let score = outcomes
            .iter()
            .filter(|o| o.outcome.is_correct())
            .fold(0_u32, |acc, _| acc.saturating_add(1));

        Ok(Self {
            level,
            started_at,
            completed_at,
            score,
            total,
            outcomes,
        })
    }

    #[must_use]
    pub fn level(&self) -> &LevelId {
        &self.level
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn outcomes(&self) -> &[QuestionOutcome] {
        &self.outcomes
    }

    #[must_use]
    pub fn percentage(&self) -> u32 {
        score_percentage(self.score, self.total)
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.percentage() >= PASS_THRESHOLD_PERCENT
    }
}
