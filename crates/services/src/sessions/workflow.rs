use std::sync::Arc;

use tracing::{info, warn};

use quiz_core::model::{LevelId, QuestionBank};
use storage::repository::{AttemptId, AttemptRepository, QuestionBankRepository, Storage};

use crate::Clock;
use crate::error::SessionError;
use super::service::{AdvanceOutcome, QuizSession};

/// Result of advancing a session through the loop service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizAdvance {
    pub outcome: AdvanceOutcome,
    /// Set once the completed attempt has been handed to the attempt store.
    pub attempt_id: Option<AttemptId>,
}

/// Orchestrates session start and the completed-attempt hand-off.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    banks: Arc<dyn QuestionBankRepository>,
    attempts: Arc<dyn AttemptRepository>,
    shuffle_seed: Option<u64>,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        banks: Arc<dyn QuestionBankRepository>,
        attempts: Arc<dyn AttemptRepository>,
    ) -> Self {
        Self {
            clock,
            banks,
            attempts,
            shuffle_seed: None,
        }
    }

    /// Build a service over both halves of a `Storage` aggregate.
    #[must_use]
    pub fn from_storage(clock: Clock, storage: &Storage) -> Self {
        Self::new(clock, Arc::clone(&storage.banks), Arc::clone(&storage.attempts))
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Seed word-bank shuffles so every session started here is reproducible.
    #[must_use]
    pub fn with_shuffle_seed(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    /// Levels that have a question bank.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the repository fails.
    pub async fn levels(&self) -> Result<Vec<LevelId>, SessionError> {
        Ok(self.banks.list_levels().await?)
    }

    /// Load the bank for `level` and start a session on it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the bank cannot be loaded and
    /// `SessionError::EmptyBank` if it has no questions.
    pub async fn start_session(&self, level: &LevelId) -> Result<QuizSession, SessionError> {
        let bank = self.banks.get_bank(level).await?;
        self.retry(&bank)
    }

    /// Start a fresh, independent session on an already loaded bank.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyBank` if the bank has no questions.
    pub fn retry(&self, bank: &QuestionBank) -> Result<QuizSession, SessionError> {
        let now = self.clock.now();
        let session = match self.shuffle_seed {
            Some(seed) => QuizSession::with_seed(bank, now, seed)?,
            None => QuizSession::new(bank, now)?,
        };

        for (question_id, issue) in session.integrity_issues() {
            warn!(
                target: "quiz",
                level = %bank.level(),
                %question_id,
                %issue,
                "question can never be answered correctly"
            );
        }
        Ok(session)
    }

    /// Advance the session; on completion, hand the result to the attempt store.
    ///
    /// # Errors
    ///
    /// Returns the session's rejection unchanged. Returns `SessionError::Storage`
    /// if the hand-off fails; the session is still completed and
    /// [`QuizLoopService::finalize_attempt`] can retry it.
    pub async fn advance(&self, session: &mut QuizSession) -> Result<QuizAdvance, SessionError> {
        let outcome = session.advance(self.clock.now())?;
        let attempt_id = match outcome {
            AdvanceOutcome::Completed(_) => Some(self.finalize_attempt(session).await?),
            AdvanceOutcome::Next(_) => None,
        };
        Ok(QuizAdvance {
            outcome,
            attempt_id,
        })
    }

    /// Hand a completed session's result to the attempt store, once.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotSubmitted` if the session is not complete.
    /// Returns `SessionError::Storage` if persistence fails.
    pub async fn finalize_attempt(
        &self,
        session: &mut QuizSession,
    ) -> Result<AttemptId, SessionError> {
        if let Some(id) = session.attempt_id() {
            return Ok(id);
        }
        let result = session.result().ok_or(SessionError::NotSubmitted)?;
        let id = self.attempts.append_attempt(result).await?;
        info!(
            target: "quiz",
            level = %result.level(),
            attempt_id = id,
            score = result.score(),
            total = result.total(),
            passed = result.passed(),
            "attempt recorded"
        );
        session.set_attempt_id(id);
        Ok(id)
    }
}
