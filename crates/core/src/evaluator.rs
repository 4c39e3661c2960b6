//! Answer evaluation, one pure function per question kind.
//!
//! A question with a content-integrity issue is never marked correct, whatever
//! the learner submits.

use crate::model::{Answer, Question, QuestionKind, is_permutation};

/// Decide whether `answer` is correct for `question`.
///
/// An answer whose shape does not match the question kind is incorrect.
#[must_use]
pub fn evaluate(question: &Question, answer: &Answer) -> bool {
    match (question.kind(), answer) {
        (QuestionKind::MultipleChoice { options, correct }, Answer::Choice(selected)) => {
            multiple_choice(options, correct, Some(selected.as_str()))
        }
        (QuestionKind::FillBlank { correct }, Answer::Text(input)) => fill_blank(correct, input),
        (QuestionKind::Reorder { options, correct }, Answer::Sequence(sequence)) => {
            reorder(options, correct, sequence)
        }
        _ => false,
    }
}

/// Exact, case-sensitive match of the selection against the correct option.
///
/// `None` means nothing was selected and is never correct.
#[must_use]
pub fn multiple_choice(options: &[String], correct: &str, selected: Option<&str>) -> bool {
    if !options.iter().any(|o| o == correct) {
        return false;
    }
    selected.is_some_and(|s| s == correct)
}

/// Case-insensitive match after trimming the learner's input.
#[must_use]
pub fn fill_blank(correct: &str, input: &str) -> bool {
    input.trim().to_lowercase() == correct.to_lowercase()
}

/// Element-for-element match of the placed words against the correct order.
#[must_use]
pub fn reorder(options: &[String], correct: &[String], sequence: &[String]) -> bool {
    if !is_permutation(options, correct) {
        return false;
    }
    sequence == correct
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionId;

    fn words(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    fn articles() -> Question {
        Question::new(
            QuestionId::new("q1_a1"),
            "Apa artikel yang tepat untuk kata 'Mädchen'?",
            QuestionKind::MultipleChoice {
                options: words(&["Der", "Die", "Das"]),
                correct: "Das".into(),
            },
            "-chen ist immer neutral.",
        )
        .unwrap()
    }

    fn sentence() -> Question {
        Question::new(
            QuestionId::new("q2_a1"),
            "Susun kalimat ini dengan benar",
            QuestionKind::Reorder {
                options: words(&["kaufe", "Ich", "im Supermarkt", "ein"]),
                correct: words(&["Ich", "kaufe", "im Supermarkt", "ein"]),
            },
            "",
        )
        .unwrap()
    }

    #[test]
    fn multiple_choice_is_case_sensitive() {
        let q = articles();
        assert!(!evaluate(&q, &Answer::Choice("das".into())));
        assert!(!evaluate(&q, &Answer::Choice("Das ".into())));
        assert!(evaluate(&q, &Answer::Choice("Das".into())));
    }

    #[test]
    fn multiple_choice_without_selection_is_incorrect() {
        assert!(!multiple_choice(&words(&["Der", "Das"]), "Das", None));
    }

    #[test]
    fn multiple_choice_with_answer_outside_options_is_never_correct() {
        assert!(!multiple_choice(&words(&["Der", "Die"]), "Das", Some("Das")));
    }

    #[test]
    fn fill_blank_trims_and_folds_case() {
        assert!(fill_blank("aus", "  Aus  "));
        assert!(!fill_blank("aus", "von"));
        assert!(fill_blank("Ich", "ich"));
    }

    #[test]
    fn fill_blank_does_not_trim_inner_whitespace() {
        assert!(!fill_blank("aus", "a us"));
    }

    #[test]
    fn reorder_is_order_sensitive() {
        let q = sentence();
        let shuffled = words(&["Ich", "im Supermarkt", "kaufe", "ein"]);
        assert!(!evaluate(&q, &Answer::Sequence(shuffled)));

        let exact = words(&["Ich", "kaufe", "im Supermarkt", "ein"]);
        assert!(evaluate(&q, &Answer::Sequence(exact)));
    }

    #[test]
    fn reorder_with_partial_sequence_is_incorrect() {
        let q = sentence();
        assert!(!evaluate(&q, &Answer::Sequence(words(&["Ich", "kaufe"]))));
    }

    #[test]
    fn reorder_that_is_not_a_permutation_is_never_correct() {
        let options = words(&["fahre", "ich"]);
        let correct = words(&["Ich", "fahre"]);
        assert!(!reorder(&options, &correct, &correct));
    }

    #[test]
    fn mismatched_answer_shape_is_incorrect() {
        assert!(!evaluate(&articles(), &Answer::Text("Das".into())));
    }
}
