//! Five-letter word guessing with six attempts.
use serde::Serialize;
use std::collections::HashMap;

pub const WORD_LENGTH: usize = 5;
pub const MAX_ATTEMPTS: u8 = 6;

/// Feedback colour for one guessed letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LetterMark {
    Correct,
    Present,
    Absent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoredLetter {
    pub letter: char,
    pub mark: LetterMark,
}

/// Score `guess` against `target`, both upper-case and equally long.
///
/// Exact matches are taken first so a repeated guess letter is only marked
/// present while unmatched copies remain in the target.
#[must_use]
pub fn score_guess(target: &str, guess: &str) -> Vec<ScoredLetter> {
    let target: Vec<char> = target.chars().collect();
    let guess: Vec<char> = guess.chars().collect();
    let mut remaining: HashMap<char, u8> = HashMap::new();
    for &letter in &target {
        *remaining.entry(letter).or_default() += 1;
    }

    let mut marks = vec![LetterMark::Absent; guess.len()];
    for (i, &letter) in guess.iter().enumerate() {
        if target.get(i) == Some(&letter) {
            marks[i] = LetterMark::Correct;
            if let Some(count) = remaining.get_mut(&letter) {
                *count = count.saturating_sub(1);
            }
        }
    }
    for (i, &letter) in guess.iter().enumerate() {
        if marks[i] == LetterMark::Correct {
            continue;
        }
        if let Some(count) = remaining.get_mut(&letter)
            && *count > 0
        {
            marks[i] = LetterMark::Present;
            *count -= 1;
        }
    }

    guess
        .into_iter()
        .zip(marks)
        .map(|(letter, mark)| ScoredLetter { letter, mark })
        .collect()
}

/// Trim and upper-case a guess; `None` unless it is five ASCII letters.
#[must_use]
pub fn normalize_guess(raw: &str) -> Option<String> {
    let guess = raw.trim().to_ascii_uppercase();
    (guess.len() == WORD_LENGTH && guess.chars().all(|c| c.is_ascii_alphabetic())).then_some(guess)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordProgress {
    Miss { row: Vec<ScoredLetter>, attempts_left: u8 },
    Solved { row: Vec<ScoredLetter> },
    Exhausted { row: Vec<ScoredLetter> },
}

#[derive(Debug, Clone)]
pub struct WordRound {
    target: String,
    attempts: u8,
}

impl WordRound {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            attempts: 0,
        }
    }

    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    #[must_use]
    pub const fn attempts_left(&self) -> u8 {
        MAX_ATTEMPTS.saturating_sub(self.attempts)
    }

    /// Score an already normalized guess and consume one attempt.
    pub fn guess(&mut self, guess: &str) -> WordProgress {
        let row = score_guess(&self.target, guess);
        if guess == self.target {
            return WordProgress::Solved { row };
        }
        self.attempts = self.attempts.saturating_add(1);
        if self.attempts >= MAX_ATTEMPTS {
            WordProgress::Exhausted { row }
        } else {
            WordProgress::Miss {
                row,
                attempts_left: self.attempts_left(),
            }
        }
    }
}
