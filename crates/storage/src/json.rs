//! Loading question banks from a JSON content export.
//!
//! Expected shape: `{ "quizzes": [ { "level", "title", "questions": [QuestionRecord] } ] }`.

use serde::Deserialize;
use std::path::Path;
use tracing::{error, info};

use quiz_core::model::QuestionBank;

use crate::record::QuizRecord;
use crate::repository::StorageError;

#[derive(Debug, Deserialize)]
struct BankFile {
    #[serde(default)]
    quizzes: Vec<QuizRecord>,
}

/// Parse every bank in a JSON document.
///
/// # Errors
///
/// Returns `StorageError::Serialization` for malformed JSON and
/// `StorageError::InvalidContent` for structurally invalid question rows.
pub fn parse_banks(json: &str) -> Result<Vec<QuestionBank>, StorageError> {
    let file: BankFile =
        serde_json::from_str(json).map_err(|e| StorageError::Serialization(e.to_string()))?;
    file.quizzes
        .into_iter()
        .map(QuizRecord::into_bank)
        .collect()
}

/// Read and parse a JSON bank file.
///
/// # Errors
///
/// Returns `StorageError::Io` if the file cannot be read, otherwise see [`parse_banks`].
pub fn load_banks_from_path(path: &Path) -> Result<Vec<QuestionBank>, StorageError> {
    let raw = std::fs::read_to_string(path).inspect_err(|e| {
        error!(target: "storage", path = %path.display(), error = %e, "failed to read bank file");
    })?;
    match parse_banks(&raw) {
        Ok(banks) => {
            info!(target: "storage", path = %path.display(), banks = banks.len(), "loaded question banks");
            Ok(banks)
        }
        Err(e) => {
            error!(target: "storage", path = %path.display(), error = %e, "failed to parse bank file");
            Err(e)
        }
    }
}
