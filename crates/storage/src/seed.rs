//! Built-in question banks shipped with the app (levels A1, A2, B1, B2).

use quiz_core::model::QuestionBank;

use crate::json::parse_banks;
use crate::repository::StorageError;

const BUILTIN_BANKS_JSON: &str = include_str!("../seed/quizzes.json");

/// Parse the built-in banks.
///
/// # Errors
///
/// Returns `StorageError` if the embedded content is malformed.
pub fn builtin_banks() -> Result<Vec<QuestionBank>, StorageError> {
    parse_banks(BUILTIN_BANKS_JSON)
}
