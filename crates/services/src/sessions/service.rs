use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use quiz_core::evaluator;
use quiz_core::model::{
    Answer, IntegrityIssue, LevelId, Outcome, Question, QuestionBank, QuestionId, QuestionKind,
    QuestionOutcome, QuizResult, is_permutation,
};
use storage::repository::AttemptId;

use super::pending::PendingAnswer;
use super::progress::QuizView;
use crate::error::SessionError;

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

/// Where the session is within the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No submission yet for the current question.
    Answering,
    /// Submission evaluated; feedback is visible and advancing is allowed.
    Reviewing,
    /// Every question has been answered. Read-only.
    Completed,
}

/// Result of advancing past a reviewed question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Moved on to the question at this index.
    Next(usize),
    /// The last question was passed; the attempt is final.
    Completed(QuizResult),
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One learner's attempt at a question bank.
///
/// Mutated only through `submit`/`skip`/`advance` and the answer-building
/// methods; every rejected call leaves the session unchanged.
pub struct QuizSession {
    level: LevelId,
    questions: Arc<[Question]>,
    current: usize,
    score: u32,
    phase: Phase,
    pending: PendingAnswer,
    last_outcome: Option<Outcome>,
    outcomes: Vec<QuestionOutcome>,
    started_at: DateTime<Utc>,
    result: Option<QuizResult>,
    attempt_id: Option<AttemptId>,
    rng: StdRng,
}

impl QuizSession {
    /// Start a session over a snapshot of `bank`.
    ///
    /// `started_at` should come from the services layer clock to keep time deterministic.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyBank` if the bank has no questions.
    pub fn new(bank: &QuestionBank, started_at: DateTime<Utc>) -> Result<Self, SessionError> {
        Self::with_rng(bank, started_at, StdRng::from_rng(&mut rand::rng()))
    }

    /// Like [`QuizSession::new`], with a reproducible word-bank shuffle.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyBank` if the bank has no questions.
    pub fn with_seed(
        bank: &QuestionBank,
        started_at: DateTime<Utc>,
        seed: u64,
    ) -> Result<Self, SessionError> {
        Self::with_rng(bank, started_at, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        bank: &QuestionBank,
        started_at: DateTime<Utc>,
        mut rng: StdRng,
    ) -> Result<Self, SessionError> {
        let questions = bank.shared_questions();
        let Some(first) = questions.first() else {
            return Err(SessionError::EmptyBank);
        };
        let pending = PendingAnswer::for_question(first, &mut rng);

        debug!(target: "quiz", level = %bank.level(), questions = questions.len(), "session started");

        Ok(Self {
            level: bank.level().clone(),
            outcomes: Vec::with_capacity(questions.len()),
            questions,
            current: 0,
            score: 0,
            phase: Phase::Answering,
            pending,
            last_outcome: None,
            started_at,
            result: None,
            attempt_id: None,
            rng,
        })
    }

    #[must_use]
    pub fn level(&self) -> &LevelId {
        &self.level
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Index of the current question; equals `total()` once completed.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Outcome of the current question; `None` unless reviewing.
    #[must_use]
    pub fn last_outcome(&self) -> Option<Outcome> {
        self.last_outcome
    }

    #[must_use]
    pub fn pending(&self) -> &PendingAnswer {
        &self.pending
    }

    #[must_use]
    pub fn outcomes(&self) -> &[QuestionOutcome] {
        &self.outcomes
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Completed
    }

    /// Final result; `Some` once completed.
    #[must_use]
    pub fn result(&self) -> Option<&QuizResult> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn attempt_id(&self) -> Option<AttemptId> {
        self.attempt_id
    }

    /// Questions in this session that can never be answered correctly.
    #[must_use]
    pub fn integrity_issues(&self) -> Vec<(QuestionId, IntegrityIssue)> {
        self.questions
            .iter()
            .filter_map(|q| q.integrity_issue().map(|issue| (q.id().clone(), issue)))
            .collect()
    }

    /// Read-only projection for rendering.
    #[must_use]
    pub fn view(&self) -> QuizView {
        QuizView::from_session(self)
    }

    //
    // ─── ANSWER BUILDING ───────────────────────────────────────────────────────
    //

    /// Select an option of the current multiple-choice question.
    ///
    /// # Errors
    ///
    /// Rejects with `Locked`/`Completed` outside `Answering`, `AnswerKindMismatch`
    /// for other kinds, and `UnknownOption` if `option` is not offered.
    pub fn select_option(&mut self, option: &str) -> Result<(), SessionError> {
        let question = self.answering_question()?;
        if !matches!(question.kind(), QuestionKind::MultipleChoice { .. }) {
            return Err(kind_mismatch(question, &Answer::Choice(String::new())));
        }
        if !question.options().iter().any(|o| o == option) {
            return Err(SessionError::UnknownOption(option.to_owned()));
        }
        self.pending = PendingAnswer::Choice(Some(option.to_owned()));
        Ok(())
    }

    /// Replace the typed text of the current fill-in-the-blank question.
    ///
    /// # Errors
    ///
    /// Rejects with `Locked`/`Completed` outside `Answering` and
    /// `AnswerKindMismatch` for other kinds.
    pub fn set_text(&mut self, text: impl Into<String>) -> Result<(), SessionError> {
        let question = self.answering_question()?;
        if !matches!(question.kind(), QuestionKind::FillBlank { .. }) {
            return Err(kind_mismatch(question, &Answer::Text(String::new())));
        }
        self.pending = PendingAnswer::Text(text.into());
        Ok(())
    }

    /// Move a word from the bank to the end of the answer.
    ///
    /// # Errors
    ///
    /// Rejects outside `Answering`, for non-reorder questions, and for an
    /// out-of-range `bank_index`.
    pub fn place_word(&mut self, bank_index: usize) -> Result<(), SessionError> {
        self.word_pool_mut()?.place(bank_index)
    }

    /// Return a placed word to the bank.
    ///
    /// # Errors
    ///
    /// Rejects outside `Answering`, for non-reorder questions, and for an
    /// out-of-range `slot_index`.
    pub fn remove_word(&mut self, slot_index: usize) -> Result<(), SessionError> {
        self.word_pool_mut()?.remove(slot_index)
    }

    //
    // ─── TRANSITIONS ───────────────────────────────────────────────────────────
    //

    /// Submit the pending answer.
    ///
    /// # Errors
    ///
    /// Same as [`QuizSession::submit`]; `IncompleteAnswer` while nothing
    /// submittable has been entered.
    pub fn submit_pending(&mut self) -> Result<Outcome, SessionError> {
        self.answering_question()?;
        let answer = self
            .pending
            .to_answer()
            .ok_or(SessionError::IncompleteAnswer)?;
        self.submit(answer)
    }

    /// Evaluate `answer` for the current question and enter `Reviewing`.
    ///
    /// Scores at most once per question: a second call while reviewing is rejected.
    ///
    /// # Errors
    ///
    /// Returns `Completed`, `AlreadySubmitted`, `AnswerKindMismatch`,
    /// `IncompleteAnswer`, `UnknownOption`, or `MalformedSequence` without
    /// changing any state.
    pub fn submit(&mut self, answer: Answer) -> Result<Outcome, SessionError> {
        let question = self.answering_question().map_err(|e| match e {
            SessionError::Locked => SessionError::AlreadySubmitted,
            other => other,
        })?;
        check_well_formed(question, &answer)?;

        let outcome = Outcome::from_correct(evaluator::evaluate(question, &answer));
        let question_id = question.id().clone();

        if outcome.is_correct() {
            self.score += 1;
        }
        self.pending = PendingAnswer::from_answer(&answer);
        self.record(question_id, outcome, Some(answer));
        Ok(outcome)
    }

    /// Give up on the current question: it is recorded as incorrect with no answer.
    ///
    /// This is the explicit confirmation required to move past an empty answer.
    ///
    /// # Errors
    ///
    /// Returns `Completed` or `AlreadySubmitted` outside `Answering`.
    pub fn skip(&mut self) -> Result<Outcome, SessionError> {
        let question = self.answering_question().map_err(|e| match e {
            SessionError::Locked => SessionError::AlreadySubmitted,
            other => other,
        })?;
        let question_id = question.id().clone();
        self.record(question_id, Outcome::Incorrect, None);
        Ok(Outcome::Incorrect)
    }

    /// Leave `Reviewing`: move to the next question, or complete the session.
    ///
    /// `now` stamps the result when this completes the session.
    ///
    /// # Errors
    ///
    /// Returns `NotSubmitted` while answering and `Completed` once finished.
    /// Returns `Result` if `now` is before the session start.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<AdvanceOutcome, SessionError> {
        match self.phase {
            Phase::Answering => return Err(SessionError::NotSubmitted),
            Phase::Completed => return Err(SessionError::Completed),
            Phase::Reviewing => {}
        }

        let next = self.current + 1;
        if let Some(question) = self.questions.get(next) {
            self.pending = PendingAnswer::for_question(question, &mut self.rng);
            self.current = next;
            self.phase = Phase::Answering;
            self.last_outcome = None;
            debug!(target: "quiz", level = %self.level, index = next, "advanced");
            return Ok(AdvanceOutcome::Next(next));
        }

        let result = QuizResult::from_outcomes(
            self.level.clone(),
            self.started_at,
            now,
            self.outcomes.clone(),
        )?;
        self.current = self.questions.len();
        self.phase = Phase::Completed;
        self.last_outcome = None;
        self.result = Some(result.clone());
        debug!(
            target: "quiz",
            level = %self.level,
            score = result.score(),
            percentage = result.percentage(),
            passed = result.passed(),
            "session completed"
        );
        Ok(AdvanceOutcome::Completed(result))
    }

    pub(crate) fn set_attempt_id(&mut self, id: AttemptId) {
        self.attempt_id = Some(id);
    }

    fn record(&mut self, question_id: QuestionId, outcome: Outcome, answer: Option<Answer>) {
        debug!(target: "quiz", level = %self.level, %question_id, ?outcome, "answer evaluated");
        self.outcomes.push(QuestionOutcome {
            question_id,
            outcome,
            answer,
        });
        self.last_outcome = Some(outcome);
        self.phase = Phase::Reviewing;
    }

    fn answering_question(&self) -> Result<&Question, SessionError> {
        match self.phase {
            Phase::Answering => self.current_question().ok_or(SessionError::Completed),
            Phase::Reviewing => Err(SessionError::Locked),
            Phase::Completed => Err(SessionError::Completed),
        }
    }

    fn word_pool_mut(&mut self) -> Result<&mut super::pool::WordPool, SessionError> {
        let question = self.answering_question()?;
        let mismatch = kind_mismatch(question, &Answer::Sequence(Vec::new()));
        match &mut self.pending {
            PendingAnswer::Reorder(pool) => Ok(pool),
            _ => Err(mismatch),
        }
    }
}

fn kind_mismatch(question: &Question, answer: &Answer) -> SessionError {
    SessionError::AnswerKindMismatch {
        expected: question.question_type(),
        found: answer.question_type(),
    }
}

/// Shape and completeness checks that must pass before an answer is scored.
fn check_well_formed(question: &Question, answer: &Answer) -> Result<(), SessionError> {
    if answer.question_type() != question.question_type() {
        return Err(kind_mismatch(question, answer));
    }
    if answer.is_blank() {
        return Err(SessionError::IncompleteAnswer);
    }
    match (question.kind(), answer) {
        (QuestionKind::MultipleChoice { options, .. }, Answer::Choice(choice)) => {
            if !options.iter().any(|o| o == choice) {
                return Err(SessionError::UnknownOption(choice.clone()));
            }
        }
        (QuestionKind::Reorder { options, .. }, Answer::Sequence(words)) => {
            if words.len() < options.len() {
                return Err(SessionError::IncompleteAnswer);
            }
            if !is_permutation(options, words) {
                return Err(SessionError::MalformedSequence);
            }
        }
        _ => {}
    }
    Ok(())
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("level", &self.level)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("score", &self.score)
            .field("phase", &self.phase)
            .field("started_at", &self.started_at)
            .field("attempt_id", &self.attempt_id)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
