use serde::{Deserialize, Serialize};

use crate::model::question::QuestionType;

/// A submitted answer. The variant must match the question's kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum Answer {
    /// The selected option of a multiple-choice question.
    Choice(String),
    /// Free text typed into a fill-in-the-blank question.
    Text(String),
    /// Words of a reorder question, in the order the learner placed them.
    Sequence(Vec<String>),
}

impl Answer {
    /// The question type this answer shape belongs to.
    #[must_use]
    pub fn question_type(&self) -> QuestionType {
        match self {
            Answer::Choice(_) => QuestionType::MultipleChoice,
            Answer::Text(_) => QuestionType::FillBlank,
            Answer::Sequence(_) => QuestionType::Reorder,
        }
    }

    /// True when the answer carries nothing to evaluate (blank text, empty choice or sequence).
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Answer::Choice(choice) => choice.is_empty(),
            Answer::Text(text) => text.trim().is_empty(),
            Answer::Sequence(words) => words.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_text_is_blank() {
        assert!(Answer::Text("  \t".into()).is_blank());
        assert!(!Answer::Text(" aus ".into()).is_blank());
    }

    #[test]
    fn answers_serialize_with_kind_tag() {
        let json = serde_json::to_string(&Answer::Choice("Das".into())).unwrap();
        assert_eq!(json, r#"{"type":"choice","value":"Das"}"#);
    }
}
