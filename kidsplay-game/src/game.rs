use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::catalog::PuzzleCategory;

/// The six playable daily games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GameKind {
    #[serde(rename = "wordGame")]
    Word,
    #[serde(rename = "mathGame")]
    Math,
    #[serde(rename = "puzzleGame")]
    Pattern,
    #[serde(rename = "memoryGame")]
    Memory,
    #[serde(rename = "drawingGame")]
    Drawing,
    #[serde(rename = "quizGame")]
    Quiz,
}

impl GameKind {
    pub const ALL: [Self; 6] = [
        Self::Word,
        Self::Math,
        Self::Pattern,
        Self::Memory,
        Self::Drawing,
        Self::Quiz,
    ];

    /// Stable identifier used for ledger keys and the lifetime completion set.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Word => "wordGame",
            Self::Math => "mathGame",
            Self::Pattern => "puzzleGame",
            Self::Memory => "memoryGame",
            Self::Drawing => "drawingGame",
            Self::Quiz => "quizGame",
        }
    }

    /// Dataset the game draws its daily puzzle from.
    #[must_use]
    pub const fn category(self) -> PuzzleCategory {
        match self {
            Self::Word => PuzzleCategory::Word,
            Self::Math => PuzzleCategory::Math,
            Self::Pattern => PuzzleCategory::Pattern,
            Self::Memory => PuzzleCategory::Memory,
            Self::Drawing => PuzzleCategory::Drawing,
            Self::Quiz => PuzzleCategory::Quiz,
        }
    }

    /// Fixed tariff awarded on first successful completion.
    #[must_use]
    pub const fn points(self) -> u32 {
        match self {
            Self::Word | Self::Pattern | Self::Drawing => 20,
            Self::Math | Self::Quiz => 15,
            Self::Memory => 25,
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Word => "🔤 Word Explorer",
            Self::Math => "🔢 Math Adventure",
            Self::Pattern => "🧩 Pattern Puzzle",
            Self::Memory => "🧠 Memory Match",
            Self::Drawing => "🎨 Drawing Challenge",
            Self::Quiz => "🌟 Knowledge Quiz",
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown game type '{0}'")]
pub struct UnknownGame(pub String);

impl FromStr for GameKind {
    type Err = UnknownGame;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.id() == s.trim())
            .ok_or_else(|| UnknownGame(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_roundtrip_through_from_str() {
        for kind in GameKind::ALL {
            assert_eq!(kind.id().parse::<GameKind>().unwrap(), kind);
        }
        assert!("chessGame".parse::<GameKind>().is_err());
    }

    #[test]
    fn tariff_matches_game_types() {
        let total: u32 = GameKind::ALL.iter().map(|k| k.points()).sum();
        assert_eq!(total, 20 + 15 + 20 + 25 + 20 + 15);
        assert_eq!(GameKind::Pattern.category(), PuzzleCategory::Pattern);
        assert_eq!(GameKind::Pattern.id(), "puzzleGame");
    }

    #[test]
    fn serializes_as_game_id() {
        let json = serde_json::to_string(&GameKind::Memory).unwrap();
        assert_eq!(json, "\"memoryGame\"");
    }
}
