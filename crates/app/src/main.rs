mod telemetry;

use std::fmt;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use quiz_core::model::{LevelId, Outcome, QuestionType};
use services::{
    Clock, Feedback, PendingAnswer, Phase, QuestionView, QuizLoopService, QuizSession,
    SessionError,
};
use storage::json::load_banks_from_path;
use storage::repository::Storage;
use storage::seed::builtin_banks;
use tracing::{error, info};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidLevel { raw: String },
    InvalidSeed { raw: String },
    InvalidBankPath { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidLevel { raw } => write!(f, "invalid --level value: {raw:?}"),
            ArgsError::InvalidSeed { raw } => write!(f, "invalid --seed value: {raw}"),
            ArgsError::InvalidBankPath { raw } => write!(f, "invalid --bank value: {raw:?}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--level <id>] [--bank <path>] [--seed <u64>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --level A1");
    eprintln!("  --bank  (built-in A1, A2, B1, B2 banks)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_LEVEL, QUIZ_BANK_PATH, QUIZ_SHUFFLE_SEED, LOG_LEVEL, LOG_FORMAT=json");
}

struct Args {
    level: LevelId,
    bank_path: Option<PathBuf>,
    seed: Option<u64>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut level = match std::env::var("QUIZ_LEVEL") {
            Ok(raw) => parse_level(raw)?,
            Err(_) => LevelId::new("A1"),
        };
        let mut bank_path = std::env::var("QUIZ_BANK_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);
        let mut seed = match std::env::var("QUIZ_SHUFFLE_SEED") {
            Ok(raw) => Some(parse_seed(raw)?),
            Err(_) => None,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--level" => level = parse_level(require_value(args, "--level")?)?,
                "--bank" => {
                    let value = require_value(args, "--bank")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidBankPath { raw: value });
                    }
                    bank_path = Some(PathBuf::from(value));
                }
                "--seed" => seed = Some(parse_seed(require_value(args, "--seed")?)?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            level,
            bank_path,
            seed,
        })
    }
}

fn parse_level(raw: String) -> Result<LevelId, ArgsError> {
    raw.parse().map_err(|_| ArgsError::InvalidLevel { raw })
}

fn parse_seed(raw: String) -> Result<u64, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidSeed { raw })
}

//
// ─── RENDERING ─────────────────────────────────────────────────────────────────
//

fn render_question(question: &QuestionView, pending: Option<&PendingAnswer>) {
    println!();
    println!("{}", question.prompt);
    match (question.kind, pending) {
        (QuestionType::MultipleChoice, _) => {
            for (i, option) in question.options.iter().enumerate() {
                println!("  {}) {option}", i + 1);
            }
            println!("(number or option text, 'skip' to give up)");
        }
        (QuestionType::FillBlank, _) => println!("(type the missing word, 'skip' to give up)"),
        (QuestionType::Reorder, Some(PendingAnswer::Reorder(pool))) => {
            println!("  answer: {}", pool.slots().join(" "));
            for (i, word) in pool.bank().iter().enumerate() {
                println!("  {}) {word}", i + 1);
            }
            println!("(numbers to place words, 'r <n>' to remove the n-th placed word,");
            println!(" empty line to submit, 'skip' to give up)");
        }
        (QuestionType::Reorder, _) => {}
    }
}

fn render_feedback(outcome: Option<Outcome>, feedback: Option<&Feedback>) {
    match outcome {
        Some(Outcome::Correct) => println!("Richtig!"),
        Some(Outcome::Incorrect) | None => println!("Leider falsch."),
    }
    if let Some(feedback) = feedback {
        println!("  correct answer: {}", feedback.correct_answer);
        if !feedback.explanation.is_empty() {
            println!("  {}", feedback.explanation);
        }
    }
    println!("(press enter to continue)");
}

fn prompt(lines: &mut impl Iterator<Item = io::Result<String>>) -> io::Result<Option<String>> {
    print!("> ");
    io::stdout().flush()?;
    lines.next().transpose()
}

//
// ─── INPUT ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug)]
enum InputError {
    NotAPosition(String),
    Session(SessionError),
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::NotAPosition(raw) => write!(f, "not a word number: {raw}"),
            InputError::Session(err) => write!(f, "{err}"),
        }
    }
}

impl From<SessionError> for InputError {
    fn from(err: SessionError) -> Self {
        InputError::Session(err)
    }
}

/// Apply one line of input; `Ok(None)` means the answer was edited but not submitted.
fn apply_input(
    session: &mut QuizSession,
    question: &QuestionView,
    line: &str,
) -> Result<Option<Outcome>, InputError> {
    let line = line.trim();
    if line.eq_ignore_ascii_case("skip") {
        return Ok(Some(session.skip()?));
    }

    match question.kind {
        QuestionType::MultipleChoice => {
            let choice = line
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| question.options.get(i))
                .map_or(line, String::as_str);
            session.select_option(choice)?;
            Ok(Some(session.submit_pending()?))
        }
        QuestionType::FillBlank => {
            session.set_text(line)?;
            Ok(Some(session.submit_pending()?))
        }
        QuestionType::Reorder => {
            if line.is_empty() {
                return Ok(Some(session.submit_pending()?));
            }
            if let Some(rest) = line.strip_prefix("r ") {
                session.remove_word(one_based(rest)?)?;
                return Ok(None);
            }
            let indices = line
                .split_whitespace()
                .map(one_based)
                .collect::<Result<Vec<_>, _>>()?;
            let bank_len = match session.pending() {
                PendingAnswer::Reorder(pool) => pool.bank().len(),
                _ => 0,
            };
            for position in placement_positions(&indices, bank_len)? {
                session.place_word(position)?;
            }
            Ok(None)
        }
    }
}

/// Translate word numbers, as shown before the line was entered, into the
/// positions `place_word` expects as the bank shrinks.
///
/// Rejects the whole line if any number is out of range or repeated.
fn placement_positions(indices: &[usize], bank_len: usize) -> Result<Vec<usize>, InputError> {
    let mut taken: Vec<usize> = Vec::with_capacity(indices.len());
    let mut positions = Vec::with_capacity(indices.len());
    for &index in indices {
        if index >= bank_len || taken.contains(&index) {
            return Err(InputError::NotAPosition((index + 1).to_string()));
        }
        let shift = taken.iter().filter(|&&t| t < index).count();
        positions.push(index - shift);
        taken.push(index);
    }
    Ok(positions)
}

fn one_based(raw: &str) -> Result<usize, InputError> {
    raw.trim()
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .ok_or_else(|| InputError::NotAPosition(raw.trim().to_owned()))
}

//
// ─── LOOP ──────────────────────────────────────────────────────────────────────
//

async fn play(
    quiz: &QuizLoopService,
    session: &mut QuizSession,
    lines: &mut impl Iterator<Item = io::Result<String>>,
) -> Result<bool, Box<dyn std::error::Error>> {
    loop {
        let view = session.view();
        match view.phase {
            Phase::Answering => {
                let Some(question) = view.question else {
                    return Ok(false);
                };
                println!(
                    "\n[{}/{}] {}% done",
                    view.current_index + 1,
                    view.total,
                    view.progress_percent
                );
                render_question(&question, view.pending.as_ref());
                let Some(line) = prompt(lines)? else {
                    return Ok(false);
                };
                if let Err(err) = apply_input(session, &question, &line) {
                    println!("! {err}");
                }
            }
            Phase::Reviewing => {
                render_feedback(view.last_outcome, view.feedback.as_ref());
                if prompt(lines)?.is_none() {
                    return Ok(false);
                }
                let step = quiz.advance(session).await?;
                if let Some(id) = step.attempt_id {
                    println!("(attempt #{id} saved)");
                }
            }
            Phase::Completed => {
                if let Some(result) = view.result {
                    println!();
                    println!(
                        "Score: {}/{} ({}%)",
                        result.score(),
                        result.total(),
                        result.percentage()
                    );
                    if result.passed() {
                        println!("Bestanden! Level {} passed.", result.level());
                    } else {
                        println!("Nicht bestanden. 80% is needed to pass.");
                    }
                }
                return Ok(true);
            }
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let banks = match &parsed.bank_path {
        Some(path) => load_banks_from_path(path)?,
        None => builtin_banks()?,
    };
    let storage = Storage::with_banks(banks);
    info!(target: "quiz", level = %parsed.level, bank = ?parsed.bank_path, seed = ?parsed.seed, "starting quiz");

    let mut quiz = QuizLoopService::from_storage(Clock::default(), &storage);
    if let Some(seed) = parsed.seed {
        quiz = quiz.with_shuffle_seed(seed);
    }

    let bank = storage.banks.get_bank(&parsed.level).await.map_err(|e| {
        eprintln!("no question bank for level {}", parsed.level);
        e
    })?;
    println!("{} ({})", bank.title(), bank.level());

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut session = quiz.start_session(bank.level()).await?;

    while play(&quiz, &mut session, &mut lines).await? {
        println!("Play again? [y/N]");
        match prompt(&mut lines)? {
            Some(answer) if answer.trim().eq_ignore_ascii_case("y") => {
                session = quiz.retry(&bank)?;
            }
            _ => break,
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    telemetry::init_tracing();
    if let Err(err) = run().await {
        error!(target: "quiz", error = %err, "quiz runner failed");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Question, QuestionBank, QuestionId, QuestionKind};
    use quiz_core::time::fixed_now;

    fn words(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    fn reorder_session() -> QuizSession {
        let question = Question::new(
            QuestionId::new("q2_a1"),
            "Satz bauen",
            QuestionKind::Reorder {
                options: words(&["kaufe", "Ich", "im Supermarkt", "ein"]),
                correct: words(&["Ich", "kaufe", "im Supermarkt", "ein"]),
            },
            "",
        )
        .unwrap();
        let bank = QuestionBank::new(LevelId::new("A1"), "A1", vec![question]);
        QuizSession::with_seed(&bank, fixed_now(), 7).unwrap()
    }

    /// Word numbers (as displayed) that build `sentence` from the current bank.
    fn numbers_for(session: &QuizSession, sentence: &[&str]) -> String {
        let (shown, _) = pool(session);
        sentence
            .iter()
            .map(|w| (shown.iter().position(|s| s == w).unwrap() + 1).to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn pool(session: &QuizSession) -> (Vec<String>, Vec<String>) {
        let PendingAnswer::Reorder(pool) = session.pending() else {
            panic!("expected reorder pool");
        };
        (pool.bank().to_vec(), pool.slots().to_vec())
    }

    fn view(session: &QuizSession) -> QuestionView {
        session.view().question.unwrap()
    }

    #[test]
    fn placement_positions_account_for_the_shrinking_bank() {
        assert_eq!(placement_positions(&[2, 0, 1], 3).unwrap(), vec![2, 0, 0]);
        assert_eq!(placement_positions(&[0, 1, 2], 3).unwrap(), vec![0, 0, 0]);
        assert_eq!(placement_positions(&[3, 1, 0, 2], 4).unwrap(), vec![3, 1, 0, 0]);
    }

    #[test]
    fn placement_positions_reject_out_of_range_and_repeats() {
        assert!(matches!(
            placement_positions(&[0, 8], 4),
            Err(InputError::NotAPosition(ref raw)) if raw == "9"
        ));
        assert!(matches!(
            placement_positions(&[1, 1], 4),
            Err(InputError::NotAPosition(ref raw)) if raw == "2"
        ));
    }

    #[test]
    fn out_of_order_numbers_place_the_words_shown() {
        let mut session = reorder_session();
        let (shown, _) = pool(&session);
        let question = view(&session);

        assert!(matches!(apply_input(&mut session, &question, "3 1 2"), Ok(None)));

        let (bank, slots) = pool(&session);
        assert_eq!(slots, vec![shown[2].clone(), shown[0].clone(), shown[1].clone()]);
        assert_eq!(bank, vec![shown[3].clone()]);
    }

    #[test]
    fn bad_number_leaves_the_pool_untouched() {
        let mut session = reorder_session();
        let before = pool(&session);
        let question = view(&session);

        assert!(apply_input(&mut session, &question, "1 9").is_err());
        assert!(apply_input(&mut session, &question, "2 2").is_err());
        assert!(apply_input(&mut session, &question, "1 x").is_err());
        assert_eq!(pool(&session), before);
    }

    #[test]
    fn remove_then_submit_in_built_order() {
        let mut session = reorder_session();
        let question = view(&session);

        let line = numbers_for(&session, &["Ich"]);
        apply_input(&mut session, &question, &line).unwrap();
        apply_input(&mut session, &question, "r 1").unwrap();
        assert!(pool(&session).1.is_empty());

        let line = numbers_for(&session, &["Ich", "kaufe", "im Supermarkt", "ein"]);
        apply_input(&mut session, &question, &line).unwrap();
        assert!(matches!(
            apply_input(&mut session, &question, ""),
            Ok(Some(Outcome::Correct))
        ));
    }
}
