use async_trait::async_trait;
use quiz_core::model::{LevelId, QuestionBank, QuestionError, QuizResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid content in question {question_id}: {source}")]
    InvalidContent {
        question_id: String,
        #[source]
        source: QuestionError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Storage identifier for a handed-off quiz attempt.
pub type AttemptId = i64;

/// Inbound content seam: one question bank per level.
#[async_trait]
pub trait QuestionBankRepository: Send + Sync {
    /// Persist or replace the bank for its level.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the bank cannot be stored.
    async fn upsert_bank(&self, bank: &QuestionBank) -> Result<(), StorageError>;

    /// Fetch the bank for a level.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no bank exists for the level.
    async fn get_bank(&self, level: &LevelId) -> Result<QuestionBank, StorageError>;

    /// List every level that has a bank, sorted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn list_levels(&self) -> Result<Vec<LevelId>, StorageError>;
}

/// Outbound seam for completed attempts (analytics, history).
#[async_trait]
pub trait AttemptRepository: Send + Sync {
    /// Append a completed attempt and return its id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the attempt cannot be stored.
    async fn append_attempt(&self, result: &QuizResult) -> Result<AttemptId, StorageError>;

    /// Fetch an attempt by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing.
    async fn get_attempt(&self, id: AttemptId) -> Result<QuizResult, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    banks: Arc<Mutex<HashMap<LevelId, QuestionBank>>>,
    attempts: Arc<Mutex<Vec<QuizResult>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository pre-filled with the given banks (later banks replace earlier ones per level).
    #[must_use]
    pub fn with_banks(banks: impl IntoIterator<Item = QuestionBank>) -> Self {
        let map = banks
            .into_iter()
            .map(|bank| (bank.level().clone(), bank))
            .collect();
        Self {
            banks: Arc::new(Mutex::new(map)),
            attempts: Arc::default(),
        }
    }
}

#[async_trait]
impl QuestionBankRepository for InMemoryRepository {
    async fn upsert_bank(&self, bank: &QuestionBank) -> Result<(), StorageError> {
        let mut guard = self
            .banks
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(bank.level().clone(), bank.clone());
        Ok(())
    }

    async fn get_bank(&self, level: &LevelId) -> Result<QuestionBank, StorageError> {
        let guard = self
            .banks
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.get(level).cloned().ok_or(StorageError::NotFound)
    }

    async fn list_levels(&self) -> Result<Vec<LevelId>, StorageError> {
        let guard = self
            .banks
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut levels: Vec<LevelId> = guard.keys().cloned().collect();
        levels.sort();
        Ok(levels)
    }
}

#[async_trait]
impl AttemptRepository for InMemoryRepository {
    async fn append_attempt(&self, result: &QuizResult) -> Result<AttemptId, StorageError> {
        let mut guard = self
            .attempts
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.push(result.clone());
        AttemptId::try_from(guard.len())
            .map_err(|_| StorageError::Serialization("attempt id overflow".into()))
    }

    async fn get_attempt(&self, id: AttemptId) -> Result<QuizResult, StorageError> {
        let guard = self
            .attempts
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let index = usize::try_from(id)
            .ok()
            .and_then(|id| id.checked_sub(1))
            .ok_or(StorageError::NotFound)?;
        guard.get(index).cloned().ok_or(StorageError::NotFound)
    }
}

/// Aggregates bank and attempt repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub banks: Arc<dyn QuestionBankRepository>,
    pub attempts: Arc<dyn AttemptRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_repository(InMemoryRepository::new())
    }

    /// In-memory storage pre-filled with the given banks.
    #[must_use]
    pub fn with_banks(banks: impl IntoIterator<Item = QuestionBank>) -> Self {
        Self::from_repository(InMemoryRepository::with_banks(banks))
    }

    fn from_repository(repo: InMemoryRepository) -> Self {
        let banks: Arc<dyn QuestionBankRepository> = Arc::new(repo.clone());
        let attempts: Arc<dyn AttemptRepository> = Arc::new(repo);
        Self { banks, attempts }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Answer, Outcome, Question, QuestionId, QuestionKind, QuestionOutcome};
    use quiz_core::time::fixed_now;

    fn build_bank(level: &str) -> QuestionBank {
        let question = Question::new(
            QuestionId::new(format!("q1_{level}")),
            "Ich komme _____ Indonesien.",
            QuestionKind::FillBlank {
                correct: "aus".into(),
            },
            "",
        )
        .unwrap();
        QuestionBank::new(LevelId::new(level), format!("Level {level}"), vec![question])
    }

    #[tokio::test]
    async fn round_trips_bank_by_level() {
        let repo = InMemoryRepository::new();
        repo.upsert_bank(&build_bank("B1")).await.unwrap();
        repo.upsert_bank(&build_bank("A1")).await.unwrap();

        let bank = repo.get_bank(&LevelId::new("A1")).await.unwrap();
        assert_eq!(bank.title(), "Level A1");
        assert_eq!(
            repo.list_levels().await.unwrap(),
            vec![LevelId::new("A1"), LevelId::new("B1")]
        );
    }

    #[tokio::test]
    async fn missing_level_is_not_found() {
        let repo = InMemoryRepository::new();
        let err = repo.get_bank(&LevelId::new("C2")).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }

    #[tokio::test]
    async fn attempts_get_sequential_ids() {
        let repo = InMemoryRepository::new();
        let now = fixed_now();
        let result = QuizResult::from_outcomes(
            LevelId::new("A1"),
            now,
            now,
            vec![QuestionOutcome {
                question_id: QuestionId::new("q1_A1"),
                outcome: Outcome::Correct,
                answer: Some(Answer::Text("aus".into())),
            }],
        )
        .unwrap();

        let first = repo.append_attempt(&result).await.unwrap();
        let second = repo.append_attempt(&result).await.unwrap();
        assert_eq!((first, second), (1, 2));
        assert_eq!(repo.get_attempt(first).await.unwrap(), result);
        assert!(matches!(
            repo.get_attempt(0).await,
            Err(StorageError::NotFound)
        ));
    }
}
