use serde::{Deserialize, Serialize};

use quiz_core::model::{
    LevelId, Question, QuestionBank, QuestionError, QuestionId, QuestionKind, QuestionType,
};

use crate::repository::StorageError;

/// `correct_answer` column: a single string or an ordered list, depending on `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CorrectAnswerField {
    Single(String),
    Sequence(Vec<String>),
}

/// Persisted shape of a quiz question row.
///
/// This mirrors the content store's columns so loaders can deserialize rows
/// without leaking storage naming into the domain `Question`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub question: String,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    pub correct_answer: CorrectAnswerField,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub order_index: Option<i64>,
}

impl QuestionRecord {
    /// Convert the row into a domain `Question`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` for a blank id and
    /// `StorageError::InvalidContent` when the row is structurally invalid.
    pub fn into_question(self) -> Result<Question, StorageError> {
        let id = self
            .id
            .parse::<QuestionId>()
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let invalid = |source: QuestionError| StorageError::InvalidContent {
            question_id: id.to_string(),
            source,
        };

        let question_type: QuestionType = self.kind.parse().map_err(invalid)?;
        let kind = match (question_type, self.correct_answer) {
            (QuestionType::MultipleChoice, CorrectAnswerField::Single(correct)) => {
                QuestionKind::MultipleChoice {
                    options: self.options.unwrap_or_default(),
                    correct,
                }
            }
            // Options on a fill-blank row are ignored.
            (QuestionType::FillBlank, CorrectAnswerField::Single(correct)) => {
                QuestionKind::FillBlank { correct }
            }
            (QuestionType::Reorder, CorrectAnswerField::Sequence(correct)) => {
                QuestionKind::Reorder {
                    options: self.options.unwrap_or_default(),
                    correct,
                }
            }
            (kind @ QuestionType::Reorder, CorrectAnswerField::Single(_)) => {
                return Err(invalid(QuestionError::AnswerShape {
                    kind,
                    expected: "list",
                }));
            }
            (kind, CorrectAnswerField::Sequence(_)) => {
                return Err(invalid(QuestionError::AnswerShape {
                    kind,
                    expected: "single string",
                }));
            }
        };

        Question::new(id.clone(), self.question, kind, self.explanation).map_err(invalid)
    }
}

/// Persisted shape of a quiz header plus its question rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizRecord {
    pub level: String,
    pub title: String,
    #[serde(default)]
    pub questions: Vec<QuestionRecord>,
}

impl QuizRecord {
    /// Convert into a `QuestionBank`, ordering rows by `order_index` (rows without one go last).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the level is blank or any row fails conversion.
    pub fn into_bank(self) -> Result<QuestionBank, StorageError> {
        let level = self
            .level
            .parse::<LevelId>()
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let mut rows = self.questions;
        rows.sort_by_key(|row| (row.order_index.is_none(), row.order_index));

        let questions = rows
            .into_iter()
            .map(QuestionRecord::into_question)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(QuestionBank::new(level, self.title, questions))
    }
}
