//! Interactive word quiz
//!
//! Words are drawn at random from one database; for each, the user types a
//! translation. A match against any stored value (ignoring case and
//! surrounding whitespace) counts as a correct answer and marks the word
//! as reviewed.

use std::io::{BufRead, Write};

use anyhow::Result;
use chrono::NaiveDate;
use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::debug;

use vocab_core::Database;

/// Outcome of one quiz run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QuizSummary {
    /// Questions actually asked
    pub asked: usize,
    /// Correct answers
    pub correct: usize,
    /// Words answered wrong
    pub missed: Vec<String>,
}

/// Pick up to `amount` distinct keys
pub fn sample_keys<R: Rng + ?Sized>(keys: &[String], amount: usize, rng: &mut R) -> Vec<String> {
    keys.choose_multiple(rng, amount).cloned().collect()
}

/// Whether `answer` matches one of `contents`
pub fn is_correct(answer: &str, contents: &[String]) -> bool {
    let answer = answer.trim();
    !answer.is_empty()
        && contents
            .iter()
            .any(|value| value.trim().to_lowercase() == answer.to_lowercase())
}

/// Ask every word in `words`, reading answers from `input`
///
/// Stops early when `input` is exhausted. Words with no stored values are
/// skipped.
pub fn run<R: BufRead, W: Write>(
    database: &mut Database,
    words: &[String],
    mut input: R,
    out: &mut W,
    today: NaiveDate,
) -> Result<QuizSummary> {
    let mut summary = QuizSummary::default();
    let total = words.len();

    for (index, word) in words.iter().enumerate() {
        let Some(record) = database.get(word)? else {
            continue;
        };
        if record.contents.is_empty() {
            continue;
        }

        write!(out, "[{}/{}] {}: ", index + 1, total, word)?;
        out.flush()?;

        let mut answer = String::new();
        if input.read_line(&mut answer)? == 0 {
            writeln!(out)?;
            break;
        }
        summary.asked += 1;

        if is_correct(&answer, &record.contents) {
            let count = database.mark_reviewed(word, today)?;
            debug!(word = %word, count, "Correct answer");
            summary.correct += 1;
            writeln!(out, "  correct")?;
        } else {
            summary.missed.push(word.clone());
            writeln!(out, "  expected: {}", record.contents.join(", "))?;
        }
    }

    Ok(summary)
}
