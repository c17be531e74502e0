//! View models handed to the rendering layer. Answers never leave the core.
use serde::Serialize;

use crate::game::GameKind;

pub const ALREADY_COMPLETED: &str = "✅ Already completed today!";

/// What the rendering layer needs to draw an opened game
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    pub game: GameKind,
    pub title: &'static str,
    pub instructions: Option<&'static str>,
    pub board: Board,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Board {
    WordGrid { rows: u8, columns: usize },
    Question { text: String },
    Sequence { numbers: Vec<i64> },
    Cards { count: usize, pairs: usize },
    Canvas { prompt: String },
    Choices { question: String, options: Vec<String> },
}

impl GameView {
    #[must_use]
    pub const fn new(game: GameKind, board: Board) -> Self {
        Self {
            game,
            title: game.title(),
            instructions: instructions(game),
            board,
        }
    }
}

const fn instructions(game: GameKind) -> Option<&'static str> {
    match game {
        GameKind::Word => Some("Guess the word! You have 6 tries."),
        GameKind::Pattern => Some("What comes next in this pattern?"),
        GameKind::Memory => Some("Find all the matching pairs!"),
        GameKind::Math | GameKind::Drawing | GameKind::Quiz => None,
    }
}

pub(crate) const fn success_message(game: GameKind) -> &'static str {
    match game {
        GameKind::Word => "🎉 You got it!",
        GameKind::Math => "🎉 Correct! Great job!",
        GameKind::Pattern => "🎉 Perfect! You found the pattern!",
        GameKind::Memory => "🎉 You found all pairs! Amazing memory!",
        GameKind::Drawing => "🎨 Beautiful artwork! You're a true artist!",
        GameKind::Quiz => "🎉 Correct! You're so smart!",
    }
}

pub(crate) const fn retry_message(game: GameKind) -> &'static str {
    match game {
        GameKind::Pattern => "❌ Not quite right. Look at the pattern again!",
        GameKind::Quiz => "❌ Not quite right, but great try!",
        _ => "❌ Try again! You can do it!",
    }
}
