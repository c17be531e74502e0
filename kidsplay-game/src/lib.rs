//! Kidsplay Game Engine
//!
//! Platform-agnostic core for the Kidsplay daily mini-games.
//! This crate picks one puzzle per day per game, runs the game rules and keeps
//! completion and score state without any UI or browser dependencies.

pub mod catalog;
pub mod config;
pub mod daily;
pub mod game;
pub mod ledger;
pub mod premium;
pub mod session;
pub mod stats;
pub mod storage;

// Re-export commonly used types
pub use catalog::{
    CatalogError, MathPuzzle, MemoryDeck, PatternPuzzle, PuzzleCatalog, PuzzleCategory,
    PuzzleItem, PuzzleSet, PuzzleSource, QuizPuzzle,
};
pub use config::{DelayConfig, GameConfig};
pub use daily::{Clock, FixedClock, ManualClock, daily_layout, days_since, index_for};
pub use game::{GameKind, UnknownGame};
pub use ledger::{COMPLETED_SENTINEL, CompletionLedger, DailyStatus, DailyStatusEntry, record_key};
pub use premium::{PREMIUM_KEY, PremiumFlag};
pub use session::{
    Action, GameView, LetterMark, Opened, Outcome, Phase, ScheduledAction, ScoredLetter,
    SessionController, SessionError, SessionId, SessionTicket, Turn, score_guess,
};
pub use stats::{Award, Celebration, GameStats, STATS_KEY, StatsAggregator, StatsDisplay};
pub use storage::MemoryStore;

/// Trait for abstracting the persisted key-value space
/// Platform-specific implementations should provide this
pub trait KeyValueStore {
    type Error: std::error::Error + 'static;

    /// Read the value stored under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Store `value` under `key`, replacing any previous value
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store rejects the write.
    fn set_item(&self, key: &str, value: &str) -> Result<(), Self::Error>;
}
