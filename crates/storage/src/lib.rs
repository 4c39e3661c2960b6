#![forbid(unsafe_code)]

pub mod json;
pub mod record;
pub mod repository;
pub mod seed;

pub use record::{CorrectAnswerField, QuestionRecord, QuizRecord};
pub use repository::{
    AttemptId, AttemptRepository, InMemoryRepository, QuestionBankRepository, Storage,
    StorageError,
};
