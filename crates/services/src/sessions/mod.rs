mod pending;
mod pool;
mod progress;
mod service;
mod workflow;

// Public API of the quiz subsystem.
pub use crate::error::SessionError;
pub use pending::PendingAnswer;
pub use pool::WordPool;
pub use progress::{Feedback, QuestionView, QuizView};
pub use service::{AdvanceOutcome, Phase, QuizSession};
pub use workflow::{QuizAdvance, QuizLoopService};
