use serde::Serialize;

use quiz_core::model::{LevelId, Outcome, Question, QuestionType, QuizResult, score_percentage};

use super::pending::PendingAnswer;
use super::service::{Phase, QuizSession};

/// Read-only projection of a session, rebuilt after every state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizView {
    pub level: LevelId,
    pub current_index: usize,
    pub total: usize,
    /// Share of questions already passed, rounded half-up.
    pub progress_percent: u32,
    pub score: u32,
    pub phase: Phase,
    pub last_outcome: Option<Outcome>,
    /// `None` once completed.
    pub question: Option<QuestionView>,
    pub pending: Option<PendingAnswer>,
    /// Only present while reviewing.
    pub feedback: Option<Feedback>,
    /// Only present once completed.
    pub result: Option<QuizResult>,
}

/// What the learner sees of the current question. The correct answer is withheld.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    pub prompt: String,
    pub kind: QuestionType,
    /// Multiple-choice options in content order; empty for other kinds.
    pub options: Vec<String>,
}

/// Explanation and correct answer, revealed after submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub explanation: String,
    pub correct_answer: String,
}

impl QuestionView {
    fn from_question(question: &Question) -> Self {
        let kind = question.question_type();
        // Reorder words come from the shuffled pool, never content order.
        let options = match kind {
            QuestionType::MultipleChoice => question.options().to_vec(),
            QuestionType::FillBlank | QuestionType::Reorder => Vec::new(),
        };
        Self {
            prompt: question.prompt().to_owned(),
            kind,
            options,
        }
    }
}

impl QuizView {
    pub(crate) fn from_session(session: &QuizSession) -> Self {
        let phase = session.phase();
        let question = session.current_question();
        let feedback = match (phase, question) {
            (Phase::Reviewing, Some(q)) => Some(Feedback {
                explanation: q.explanation().to_owned(),
                correct_answer: q.correct_answer_text(),
            }),
            _ => None,
        };
        let total = session.total();
        let progress_percent = score_percentage(
            u32::try_from(session.current_index()).unwrap_or(u32::MAX),
            u32::try_from(total).unwrap_or(u32::MAX),
        );

        Self {
            level: session.level().clone(),
            current_index: session.current_index(),
            total,
            progress_percent,
            score: session.score(),
            phase,
            last_outcome: session.last_outcome(),
            question: question.map(QuestionView::from_question),
            pending: question.map(|_| session.pending().clone()),
            feedback,
            result: session.result().cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Answer, QuestionBank, QuestionId, QuestionKind};
    use quiz_core::time::fixed_now;

    fn bank() -> QuestionBank {
        let mc = Question::new(
            QuestionId::new("q1"),
            "Artikel für 'Mädchen'?",
            QuestionKind::MultipleChoice {
                options: vec!["Der".into(), "Die".into(), "Das".into()],
                correct: "Das".into(),
            },
            "-chen ist neutral.",
        )
        .unwrap();
        let reorder = Question::new(
            QuestionId::new("q2"),
            "Satz bauen",
            QuestionKind::Reorder {
                options: vec!["kaufe".into(), "Ich".into(), "ein".into()],
                correct: vec!["Ich".into(), "kaufe".into(), "ein".into()],
            },
            "Verb an Position 2.",
        )
        .unwrap();
        QuestionBank::new(LevelId::new("A1"), "A1", vec![mc, reorder])
    }

    #[test]
    fn answering_view_hides_feedback() {
        let session = QuizSession::with_seed(&bank(), fixed_now(), 1).unwrap();
        let view = session.view();

        assert_eq!(view.phase, Phase::Answering);
        assert_eq!(view.progress_percent, 0);
        assert_eq!(view.feedback, None);
        let question = view.question.unwrap();
        assert_eq!(question.kind, QuestionType::MultipleChoice);
        assert_eq!(question.options, vec!["Der", "Die", "Das"]);
    }

    #[test]
    fn reviewing_view_reveals_explanation_and_answer() {
        let mut session = QuizSession::with_seed(&bank(), fixed_now(), 1).unwrap();
        session.submit(Answer::Choice("Die".into())).unwrap();
        let view = session.view();

        assert_eq!(view.last_outcome, Some(Outcome::Incorrect));
        assert_eq!(
            view.feedback,
            Some(Feedback {
                explanation: "-chen ist neutral.".into(),
                correct_answer: "Das".into(),
            })
        );
        assert_eq!(
            view.pending,
            Some(PendingAnswer::Choice(Some("Die".into())))
        );
    }

    #[test]
    fn reorder_view_takes_words_from_pool() {
        let mut session = QuizSession::with_seed(&bank(), fixed_now(), 1).unwrap();
        session.submit(Answer::Choice("Das".into())).unwrap();
        session.advance(fixed_now()).unwrap();
        let view = session.view();

        assert_eq!(view.progress_percent, 50);
        assert!(view.question.unwrap().options.is_empty());
        assert!(matches!(view.pending, Some(PendingAnswer::Reorder(_))));
    }

    #[test]
    fn completed_view_carries_result() {
        let mut session = QuizSession::with_seed(&bank(), fixed_now(), 1).unwrap();
        session.submit(Answer::Choice("Das".into())).unwrap();
        session.advance(fixed_now()).unwrap();
        session.skip().unwrap();
        session.advance(fixed_now()).unwrap();
        let view = session.view();

        assert_eq!(view.phase, Phase::Completed);
        assert_eq!(view.progress_percent, 100);
        assert_eq!(view.question, None);
        assert_eq!(view.pending, None);
        let result = view.result.unwrap();
        assert_eq!(result.percentage(), 50);
        assert!(!result.passed());
    }

    #[test]
    fn view_serializes_for_renderers() {
        let session = QuizSession::with_seed(&bank(), fixed_now(), 1).unwrap();
        let json = serde_json::to_value(session.view()).unwrap();
        assert_eq!(json["phase"], "answering");
        assert_eq!(json["question"]["kind"], "multiple-choice");
        assert_eq!(json["pending"]["type"], "choice");
    }
}
