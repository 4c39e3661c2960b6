//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{QuestionType, ResultError};
use storage::repository::StorageError;

/// Errors emitted by quiz sessions and the quiz loop.
///
/// Every caller-contract violation is reported here and leaves the session untouched.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for this level")]
    EmptyBank,
    #[error("session already completed")]
    Completed,
    #[error("current question was already submitted")]
    AlreadySubmitted,
    #[error("current question must be submitted before advancing")]
    NotSubmitted,
    #[error("answer is locked after submission")]
    Locked,
    #[error("submission rejected, answer incomplete")]
    IncompleteAnswer,
    #[error("answer for a {found} question given to a {expected} question")]
    AnswerKindMismatch {
        expected: QuestionType,
        found: QuestionType,
    },
    #[error("{0:?} is not one of the options")]
    UnknownOption(String),
    #[error("placed words are not the question's word bank")]
    MalformedSequence,
    #[error("position {index} is out of range (len {len})")]
    InvalidPosition { index: usize, len: usize },
    #[error(transparent)]
    Result(#[from] ResultError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
