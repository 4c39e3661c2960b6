#![forbid(unsafe_code)]

pub mod error;
pub mod sessions;

pub use quiz_core::Clock;
pub use sessions as session;

pub use error::SessionError;

pub use sessions::{
    AdvanceOutcome, Feedback, Phase, PendingAnswer, QuestionView, QuizAdvance, QuizLoopService,
    QuizSession, QuizView, WordPool,
};
