use std::sync::Arc;

use crate::model::ids::{LevelId, QuestionId};
use crate::model::question::{IntegrityIssue, Question};

/// Ordered, immutable list of questions for one level.
///
/// Cloning is cheap and shares the questions, so one bank can seed any number
/// of independent sessions (e.g. a retry).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBank {
    level: LevelId,
    title: String,
    questions: Arc<[Question]>,
}

impl QuestionBank {
    #[must_use]
    pub fn new(level: LevelId, title: impl Into<String>, questions: Vec<Question>) -> Self {
        Self {
            level,
            title: title.into(),
            questions: questions.into(),
        }
    }

    #[must_use]
    pub fn level(&self) -> &LevelId {
        &self.level
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Shared handle to the question list, used to snapshot a bank into a session.
    #[must_use]
    pub fn shared_questions(&self) -> Arc<[Question]> {
        Arc::clone(&self.questions)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Every question that can never be answered correctly, with the reason.
    #[must_use]
    pub fn integrity_report(&self) -> Vec<(QuestionId, IntegrityIssue)> {
        self.questions
            .iter()
            .filter_map(|q| q.integrity_issue().map(|issue| (q.id().clone(), issue)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionKind;

    fn fill_blank(id: &str, correct: &str) -> Question {
        Question::new(
            QuestionId::new(id),
            "Lückentext",
            QuestionKind::FillBlank {
                correct: correct.into(),
            },
            "",
        )
        .unwrap()
    }

    #[test]
    fn clones_share_questions() {
        let bank = QuestionBank::new(LevelId::new("A1"), "A1", vec![fill_blank("q1", "aus")]);
        let copy = bank.clone();
        assert!(Arc::ptr_eq(&bank.shared_questions(), &copy.shared_questions()));
        assert_eq!(copy.len(), 1);
    }

    #[test]
    fn integrity_report_lists_broken_questions() {
        let broken = Question::new(
            QuestionId::new("q2"),
            "Artikel?",
            QuestionKind::MultipleChoice {
                options: vec!["Der".into(), "Die".into()],
                correct: "Das".into(),
            },
            "",
        )
        .unwrap();
        let bank = QuestionBank::new(
            LevelId::new("A1"),
            "A1",
            vec![fill_blank("q1", "aus"), broken],
        );

        let report = bank.integrity_report();
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].0, QuestionId::new("q2"));
    }

    #[test]
    fn empty_bank_is_representable() {
        let bank = QuestionBank::new(LevelId::new("C1"), "Leer", Vec::new());
        assert!(bank.is_empty());
    }
}
