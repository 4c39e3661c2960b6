use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;

use crate::error::SessionError;

/// Word bank and answer slots for a reorder question.
///
/// Every option lives in exactly one of the two collections. Moves work on
/// positions, so duplicate words are moved one instance at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordPool {
    bank: Vec<String>,
    slots: Vec<String>,
}

impl WordPool {
    /// Start a pool with every option in the bank, uniformly shuffled (Fisher-Yates).
    pub fn shuffled<R: Rng + ?Sized>(options: &[String], rng: &mut R) -> Self {
        let mut bank = options.to_vec();
        bank.shuffle(rng);
        Self {
            bank,
            slots: Vec::new(),
        }
    }

    /// A fully placed pool, used when an explicit sequence is submitted.
    #[must_use]
    pub fn placed(sequence: Vec<String>) -> Self {
        Self {
            bank: Vec::new(),
            slots: sequence,
        }
    }

    /// Unplaced words, in display order.
    #[must_use]
    pub fn bank(&self) -> &[String] {
        &self.bank
    }

    /// Placed words, in answer order.
    #[must_use]
    pub fn slots(&self) -> &[String] {
        &self.slots
    }

    /// True once every word has been placed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.bank.is_empty()
    }

    /// Move the word at `bank_index` to the end of the answer.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidPosition` if `bank_index` is out of range.
    pub fn place(&mut self, bank_index: usize) -> Result<(), SessionError> {
        if bank_index >= self.bank.len() {
            return Err(SessionError::InvalidPosition {
                index: bank_index,
                len: self.bank.len(),
            });
        }
        let word = self.bank.remove(bank_index);
        self.slots.push(word);
        Ok(())
    }

    /// Take the word at `slot_index` out of the answer and return it to the bank.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidPosition` if `slot_index` is out of range.
    pub fn remove(&mut self, slot_index: usize) -> Result<(), SessionError> {
        if slot_index >= self.slots.len() {
            return Err(SessionError::InvalidPosition {
                index: slot_index,
                len: self.slots.len(),
            });
        }
        let word = self.slots.remove(slot_index);
        self.bank.push(word);
        Ok(())
    }
}
