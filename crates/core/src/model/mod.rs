mod answer;
mod bank;
mod ids;
mod question;
mod result;

pub use answer::Answer;
pub use bank::QuestionBank;
pub use ids::{LevelId, ParseIdError, QuestionId};
pub use question::{
    IntegrityIssue, Question, QuestionError, QuestionKind, QuestionType, is_permutation,
};
pub use result::{
    Outcome, PASS_THRESHOLD_PERCENT, QuestionOutcome, QuizResult, ResultError, score_percentage,
};
