use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Structural problems that keep a content row from becoming a `Question`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("{kind} question needs at least one option")]
    MissingOptions { kind: QuestionType },

    #[error("{kind} question has an empty option")]
    EmptyOption { kind: QuestionType },

    #[error("correct answer cannot be empty")]
    EmptyCorrectAnswer,

    #[error("{kind} question expects a {expected} correct answer")]
    AnswerShape {
        kind: QuestionType,
        expected: &'static str,
    },

    #[error("unknown question type: {0}")]
    UnknownType(String),
}

/// Content conditions that make a question impossible to answer correctly.
///
/// These never fail construction; the evaluator treats them as "never correct"
/// and callers forward them to a diagnostic channel.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IntegrityIssue {
    #[error("correct answer {answer:?} is not one of the options")]
    AnswerNotAnOption { answer: String },

    #[error("correct order is not a permutation of the options")]
    NotAPermutation,
}

//
// ─── QUESTION TYPE ─────────────────────────────────────────────────────────────
//

/// Discriminant of a question, as stored in content rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    MultipleChoice,
    FillBlank,
    Reorder,
}

impl QuestionType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple-choice",
            QuestionType::FillBlank => "fill-blank",
            QuestionType::Reorder => "reorder",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "multiple-choice" => Ok(QuestionType::MultipleChoice),
            "fill-blank" => Ok(QuestionType::FillBlank),
            "reorder" => Ok(QuestionType::Reorder),
            other => Err(QuestionError::UnknownType(other.to_owned())),
        }
    }
}

//
// ─── QUESTION KIND ─────────────────────────────────────────────────────────────
//

/// Per-kind payload. Each variant carries only the fields that kind uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionKind {
    /// Pick exactly one of `options`.
    MultipleChoice {
        options: Vec<String>,
        correct: String,
    },
    /// Type the missing word.
    FillBlank { correct: String },
    /// Arrange every option into the correct order.
    Reorder {
        options: Vec<String>,
        correct: Vec<String>,
    },
}

impl QuestionKind {
    #[must_use]
    pub fn question_type(&self) -> QuestionType {
        match self {
            QuestionKind::MultipleChoice { .. } => QuestionType::MultipleChoice,
            QuestionKind::FillBlank { .. } => QuestionType::FillBlank,
            QuestionKind::Reorder { .. } => QuestionType::Reorder,
        }
    }

    /// Options in content order. Empty for fill-in-the-blank.
    #[must_use]
    pub fn options(&self) -> &[String] {
        match self {
            QuestionKind::MultipleChoice { options, .. } | QuestionKind::Reorder { options, .. } => {
                options
            }
            QuestionKind::FillBlank { .. } => &[],
        }
    }

    fn validate(&self) -> Result<(), QuestionError> {
        let kind = self.question_type();
        // An empty option could never be selected or placed as a submitted answer.
        if self.options().iter().any(String::is_empty) {
            return Err(QuestionError::EmptyOption { kind });
        }
        match self {
            QuestionKind::MultipleChoice { options, correct } => {
                if options.is_empty() {
                    return Err(QuestionError::MissingOptions { kind });
                }
                if correct.is_empty() {
                    return Err(QuestionError::EmptyCorrectAnswer);
                }
            }
            QuestionKind::FillBlank { correct } => {
                if correct.trim().is_empty() {
                    return Err(QuestionError::EmptyCorrectAnswer);
                }
            }
            QuestionKind::Reorder { options, correct } => {
                if options.is_empty() {
                    return Err(QuestionError::MissingOptions { kind });
                }
                if correct.is_empty() {
                    return Err(QuestionError::EmptyCorrectAnswer);
                }
            }
        }
        Ok(())
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// An immutable quiz question supplied by the content provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    kind: QuestionKind,
    explanation: String,
}

impl Question {
    /// Creates a question after checking its structure.
    ///
    /// Content-integrity problems (see [`IntegrityIssue`]) are accepted here and
    /// surface through [`Question::integrity_issue`].
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt is blank, a kind that needs options
    /// has none, or the correct answer is empty.
    pub fn new(
        id: QuestionId,
        prompt: impl Into<String>,
        kind: QuestionKind,
        explanation: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        kind.validate()?;

        Ok(Self {
            id,
            prompt,
            kind,
            explanation: explanation.into(),
        })
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn kind(&self) -> &QuestionKind {
        &self.kind
    }

    #[must_use]
    pub fn question_type(&self) -> QuestionType {
        self.kind.question_type()
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        self.kind.options()
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    /// Correct answer rendered for display ("your answer vs. correct answer").
    #[must_use]
    pub fn correct_answer_text(&self) -> String {
        match &self.kind {
            QuestionKind::MultipleChoice { correct, .. } | QuestionKind::FillBlank { correct } => {
                correct.clone()
            }
            QuestionKind::Reorder { correct, .. } => correct.join(" "),
        }
    }

    /// Returns the reason this question can never be answered correctly, if any.
    #[must_use]
    pub fn integrity_issue(&self) -> Option<IntegrityIssue> {
        match &self.kind {
            QuestionKind::MultipleChoice { options, correct } => {
                if options.iter().any(|o| o == correct) {
                    None
                } else {
                    Some(IntegrityIssue::AnswerNotAnOption {
                        answer: correct.clone(),
                    })
                }
            }
            QuestionKind::FillBlank { .. } => None,
            QuestionKind::Reorder { options, correct } => {
                if is_permutation(options, correct) {
                    None
                } else {
                    Some(IntegrityIssue::NotAPermutation)
                }
            }
        }
    }
}

/// Same multiset of strings, order ignored.
#[must_use]
pub fn is_permutation(a: &[String], b: &[String]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut a: Vec<&str> = a.iter().map(String::as_str).collect();
    let mut b: Vec<&str> = b.iter().map(String::as_str).collect();
    a.sort_unstable();
    b.sort_unstable();
    a == b
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn blank_prompt_is_rejected() {
        let err = Question::new(
            QuestionId::new("q"),
            "   ",
            QuestionKind::FillBlank {
                correct: "aus".into(),
            },
            "",
        )
        .unwrap_err();
        assert_eq!(err, QuestionError::EmptyPrompt);
    }

    #[test]
    fn multiple_choice_requires_options() {
        let err = Question::new(
            QuestionId::new("q"),
            "Artikel?",
            QuestionKind::MultipleChoice {
                options: Vec::new(),
                correct: "Das".into(),
            },
            "",
        )
        .unwrap_err();
        assert_eq!(
            err,
            QuestionError::MissingOptions {
                kind: QuestionType::MultipleChoice
            }
        );
    }

    #[test]
    fn empty_option_is_rejected() {
        let err = Question::new(
            QuestionId::new("q"),
            "Artikel?",
            QuestionKind::MultipleChoice {
                options: words(&["Der", "", "Das"]),
                correct: "Das".into(),
            },
            "",
        )
        .unwrap_err();
        assert_eq!(
            err,
            QuestionError::EmptyOption {
                kind: QuestionType::MultipleChoice
            }
        );

        let err = Question::new(
            QuestionId::new("q"),
            "Satz",
            QuestionKind::Reorder {
                options: words(&["Ich", ""]),
                correct: words(&["Ich", ""]),
            },
            "",
        )
        .unwrap_err();
        assert_eq!(
            err,
            QuestionError::EmptyOption {
                kind: QuestionType::Reorder
            }
        );
    }

    #[test]
    fn answer_outside_options_is_an_integrity_issue_not_an_error() {
        let q = Question::new(
            QuestionId::new("q"),
            "Artikel?",
            QuestionKind::MultipleChoice {
                options: words(&["Der", "Die"]),
                correct: "Das".into(),
            },
            "",
        )
        .unwrap();
        assert_eq!(
            q.integrity_issue(),
            Some(IntegrityIssue::AnswerNotAnOption {
                answer: "Das".into()
            })
        );
    }

    #[test]
    fn reorder_with_case_mismatch_is_not_a_permutation() {
        let q = Question::new(
            QuestionId::new("q1_b1"),
            "TeKaMoLo",
            QuestionKind::Reorder {
                options: words(&["nach Berlin", "heute", "fahre", "ich", "mit dem Zug"]),
                correct: words(&["Ich", "fahre", "heute", "mit dem Zug", "nach Berlin"]),
            },
            "",
        )
        .unwrap();
        assert_eq!(q.integrity_issue(), Some(IntegrityIssue::NotAPermutation));
    }

    #[test]
    fn permutation_respects_duplicates() {
        assert!(is_permutation(&words(&["a", "b", "a"]), &words(&["a", "a", "b"])));
        assert!(!is_permutation(&words(&["a", "b", "b"]), &words(&["a", "a", "b"])));
    }

    #[test]
    fn question_type_parses_content_tags() {
        assert_eq!("fill-blank".parse::<QuestionType>().unwrap(), QuestionType::FillBlank);
        assert!(matches!(
            "essay".parse::<QuestionType>(),
            Err(QuestionError::UnknownType(t)) if t == "essay"
        ));
    }

    #[test]
    fn reorder_correct_answer_text_joins_words() {
        let q = Question::new(
            QuestionId::new("q2_a1"),
            "Satz",
            QuestionKind::Reorder {
                options: words(&["kaufe", "Ich", "ein"]),
                correct: words(&["Ich", "kaufe", "ein"]),
            },
            "",
        )
        .unwrap();
        assert_eq!(q.correct_answer_text(), "Ich kaufe ein");
    }
}
