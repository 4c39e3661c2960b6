use rand::Rng;
use serde::Serialize;

use quiz_core::model::{Answer, Question, QuestionKind};

use super::pool::WordPool;

/// The learner's in-progress answer for the current question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum PendingAnswer {
    /// Selected option, if any.
    Choice(Option<String>),
    /// Text typed so far.
    Text(String),
    /// Word bank and placed words.
    Reorder(WordPool),
}

impl PendingAnswer {
    /// Fresh, empty answer for `question`; reorder questions get a newly shuffled bank.
    pub(crate) fn for_question<R: Rng + ?Sized>(question: &Question, rng: &mut R) -> Self {
        match question.kind() {
            QuestionKind::MultipleChoice { .. } => PendingAnswer::Choice(None),
            QuestionKind::FillBlank { .. } => PendingAnswer::Text(String::new()),
            QuestionKind::Reorder { options, .. } => {
                PendingAnswer::Reorder(WordPool::shuffled(options, rng))
            }
        }
    }

    /// Pending state that displays a submitted answer.
    pub(crate) fn from_answer(answer: &Answer) -> Self {
        match answer {
            Answer::Choice(choice) => PendingAnswer::Choice(Some(choice.clone())),
            Answer::Text(text) => PendingAnswer::Text(text.clone()),
            Answer::Sequence(words) => PendingAnswer::Reorder(WordPool::placed(words.clone())),
        }
    }

    /// The submittable answer, or `None` while it is still incomplete.
    #[must_use]
    pub fn to_answer(&self) -> Option<Answer> {
        match self {
            PendingAnswer::Choice(choice) => choice.clone().map(Answer::Choice),
            PendingAnswer::Text(text) if text.trim().is_empty() => None,
            PendingAnswer::Text(text) => Some(Answer::Text(text.clone())),
            PendingAnswer::Reorder(pool) if pool.is_complete() => {
                Some(Answer::Sequence(pool.slots().to_vec()))
            }
            PendingAnswer::Reorder(_) => None,
        }
    }
}
