use clap::ValueEnum;
use kidsplay_game::{PuzzleItem, daily_layout};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// How a simulated child plays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlayerStrategy {
    /// Always knows the answer
    Perfect,
    /// Repeats the same wrong answer and gives up
    Stubborn,
    /// Guesses near the answer at random
    Random,
}

impl PlayerStrategy {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Perfect => "Perfect",
            Self::Stubborn => "Stubborn",
            Self::Random => "Random",
        }
    }
}

impl fmt::Display for PlayerStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single input to send to the open game
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Move {
    Guess(String),
    Number(i64),
    Choose(usize),
    Flip(usize),
    Draw,
    GiveUp,
}

/// Numeric and quiz games have no attempt limit, so non-perfect players stop here.
pub const PATIENCE: usize = 3;
const RANDOM_PATIENCE: usize = 12;
const MEMORY_MOVE_LIMIT: usize = 400;

/// Produces moves for one game from the day's answer key
pub struct Player {
    strategy: PlayerStrategy,
    rng: ChaCha20Rng,
    vocabulary: Vec<String>,
}

impl Player {
    #[must_use]
    pub fn new(strategy: PlayerStrategy, seed: u64, vocabulary: Vec<String>) -> Self {
        Self {
            strategy,
            rng: ChaCha20Rng::seed_from_u64(seed),
            vocabulary,
        }
    }

    /// Next move given the answer and how many moves were already made.
    pub fn next_move(&mut self, key: &PuzzleItem, layout: &[String], made: usize) -> Move {
        match (self.strategy, key) {
            (_, PuzzleItem::Drawing(_)) => Move::Draw,
            (PlayerStrategy::Perfect, PuzzleItem::Word(target)) => Move::Guess(target.clone()),
            (PlayerStrategy::Stubborn, PuzzleItem::Word(target)) => {
                Move::Guess(wrong_word(target).to_string())
            }
            (PlayerStrategy::Random, PuzzleItem::Word(target)) => self
                .vocabulary
                .choose(&mut self.rng)
                .cloned()
                .map_or_else(|| Move::Guess(target.clone()), Move::Guess),
            (_, PuzzleItem::Math(puzzle)) => self.number(puzzle.answer, made),
            (_, PuzzleItem::Pattern(puzzle)) => self.number(puzzle.answer, made),
            (_, PuzzleItem::Quiz(puzzle)) => {
                self.choice(puzzle.correct, puzzle.options.len(), made)
            }
            (_, PuzzleItem::Memory(_)) => self.flip(layout, made),
        }
    }

    fn number(&mut self, answer: i64, made: usize) -> Move {
        match self.strategy {
            PlayerStrategy::Perfect => Move::Number(answer),
            PlayerStrategy::Stubborn if made < PATIENCE => Move::Number(answer + 1),
            PlayerStrategy::Random if made < RANDOM_PATIENCE => {
                Move::Number(answer + self.rng.gen_range(-2..=2))
            }
            _ => Move::GiveUp,
        }
    }

    fn choice(&mut self, correct: usize, options: usize, made: usize) -> Move {
        match self.strategy {
            PlayerStrategy::Perfect => Move::Choose(correct),
            PlayerStrategy::Stubborn if made < PATIENCE => {
                Move::Choose((correct + 1) % options.max(1))
            }
            PlayerStrategy::Random if made < RANDOM_PATIENCE => {
                Move::Choose(self.rng.gen_range(0..options.max(1)))
            }
            _ => Move::GiveUp,
        }
    }

    fn flip(&mut self, layout: &[String], made: usize) -> Move {
        match self.strategy {
            PlayerStrategy::Perfect => perfect_flip_order(layout)
                .get(made)
                .copied()
                .map_or(Move::GiveUp, Move::Flip),
            PlayerStrategy::Stubborn => {
                // Card 0 and the first card that differs from it, forever.
                let first = layout.first();
                let other = layout
                    .iter()
                    .position(|t| Some(t) != first)
                    .unwrap_or(1);
                if made < PATIENCE * 2 {
                    Move::Flip(if made % 2 == 0 { 0 } else { other })
                } else {
                    Move::GiveUp
                }
            }
            PlayerStrategy::Random if made < MEMORY_MOVE_LIMIT => {
                Move::Flip(self.rng.gen_range(0..layout.len().max(1)))
            }
            PlayerStrategy::Random => Move::GiveUp,
        }
    }
}

/// Card layout the player sees for a memory deck on `day_offset`.
#[must_use]
pub fn layout_for(key: &PuzzleItem, day_offset: i64) -> Vec<String> {
    match key {
        PuzzleItem::Memory(deck) => daily_layout(deck, day_offset),
        _ => Vec::new(),
    }
}

/// Flip order that matches every pair without a miss.
#[must_use]
pub fn perfect_flip_order(layout: &[String]) -> Vec<usize> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut order = Vec::with_capacity(layout.len());
    for (i, token) in layout.iter().enumerate() {
        if let Some(first) = seen.remove(token.as_str()) {
            order.push(first);
            order.push(i);
        } else {
            seen.insert(token.as_str(), i);
        }
    }
    order
}

fn wrong_word(target: &str) -> &'static str {
    if target == "QUIZZ" { "JAZZY" } else { "QUIZZ" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kidsplay_game::{MathPuzzle, QuizPuzzle};

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn perfect_order_pairs_adjacent() {
        let layout = tokens(&["A", "B", "A", "C", "B", "C"]);
        assert_eq!(perfect_flip_order(&layout), vec![0, 2, 1, 4, 3, 5]);
    }

    #[test]
    fn stubborn_gives_up_after_patience() {
        let mut player = Player::new(PlayerStrategy::Stubborn, 1, Vec::new());
        let key = PuzzleItem::Math(MathPuzzle {
            question: "2 + 2 = ?".to_string(),
            answer: 4,
        });
        assert_eq!(player.next_move(&key, &[], 0), Move::Number(5));
        assert_eq!(player.next_move(&key, &[], PATIENCE), Move::GiveUp);
    }

    #[test]
    fn perfect_quiz_picks_correct() {
        let mut player = Player::new(PlayerStrategy::Perfect, 1, Vec::new());
        let key = PuzzleItem::Quiz(QuizPuzzle {
            question: "?".to_string(),
            options: tokens(&["a", "b", "c"]),
            correct: 2,
        });
        assert_eq!(player.next_move(&key, &[], 0), Move::Choose(2));
    }

    #[test]
    fn random_player_is_seeded() {
        let key = PuzzleItem::Math(MathPuzzle {
            question: "7 + 5 = ?".to_string(),
            answer: 12,
        });
        let moves = |seed| {
            let mut player = Player::new(PlayerStrategy::Random, seed, Vec::new());
            (0..5)
                .map(|i| player.next_move(&key, &[], i))
                .collect::<Vec<_>>()
        };
        assert_eq!(moves(7), moves(7));
    }

    #[test]
    fn stubborn_word_never_matches() {
        assert_ne!(wrong_word("QUIZZ"), "QUIZZ");
        assert_eq!(wrong_word("APPLE"), "QUIZZ");
    }
}
