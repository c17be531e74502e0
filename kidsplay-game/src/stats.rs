//! Lifetime score, streak and completion counters.
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

use crate::KeyValueStore;
use crate::daily::Clock;

/// Storage key of the serialized stats.
pub const STATS_KEY: &str = "kidsplay_stats";

/// Persisted player progress
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameStats {
    pub total_games: u32,
    pub completed_today: u32,
    pub total_points: u64,
    pub streak: u32,
    /// Games that have ever been scored. Membership blocks further awards.
    #[serde(deserialize_with = "completed_games_lenient")]
    pub completed_games: BTreeSet<String>,
    /// Calendar day `completed_today` counts for.
    pub stats_day: Option<NaiveDate>,
}

// Older saves wrote the set as an empty object.
fn completed_games_lenient<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        List(BTreeSet<String>),
        Object(serde_json::Map<String, serde_json::Value>),
    }

    Ok(match Repr::deserialize(deserializer)? {
        Repr::List(ids) => ids,
        Repr::Object(_) => BTreeSet::new(),
    })
}

impl GameStats {
    fn roll_to(&mut self, today: NaiveDate) {
        if self.stats_day != Some(today) {
            self.completed_today = 0;
            self.stats_day = Some(today);
        }
    }
}

/// Transient "great job" banner payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Celebration {
    pub points: u32,
}

impl Celebration {
    #[must_use]
    pub fn message(self) -> String {
        format!("🎉 Great Job! +{} points! 🎉", self.points)
    }
}

/// Result of asking for points
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Award {
    Awarded {
        stats: GameStats,
        celebration: Celebration,
    },
    NoOp,
}

impl Award {
    #[must_use]
    pub const fn is_awarded(&self) -> bool {
        matches!(self, Self::Awarded { .. })
    }
}

/// Display strings for the stats panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsDisplay {
    pub total_games: String,
    pub completed_today: String,
    pub total_points: String,
    pub streak: String,
}

/// Owns the in-memory stats and writes them through on every change.
#[derive(Debug)]
pub struct StatsAggregator<S, C> {
    store: S,
    clock: C,
    stats: GameStats,
}

impl<S: KeyValueStore, C: Clock> StatsAggregator<S, C> {
    /// Load saved stats, falling back to defaults when missing or unreadable.
    pub fn load(store: S, clock: C) -> Self {
        let mut stats = match store.get_item(STATS_KEY) {
            Ok(Some(json)) => serde_json::from_str::<GameStats>(&json).unwrap_or_else(|err| {
                log::warn!("discarding unreadable {STATS_KEY}: {err}");
                GameStats::default()
            }),
            Ok(None) => GameStats::default(),
            Err(err) => {
                log::warn!("reading {STATS_KEY} failed: {err}");
                GameStats::default()
            }
        };
        stats.roll_to(clock.today());
        Self {
            store,
            clock,
            stats,
        }
    }

    /// Score `game_id` once per lifetime.
    pub fn award(&mut self, game_id: &str, points: u32) -> Award {
        if self.stats.completed_games.contains(game_id) {
            log::debug!("{game_id} already scored, no award");
            return Award::NoOp;
        }
        self.stats.roll_to(self.clock.today());
        self.stats.completed_games.insert(game_id.to_string());
        self.stats.total_games += 1;
        self.stats.completed_today += 1;
        self.stats.streak += 1;
        self.stats.total_points += u64::from(points);
        self.persist();
        log::debug!(
            "awarded {points} for {game_id}, total {}",
            self.stats.total_points
        );
        Award::Awarded {
            stats: self.stats.clone(),
            celebration: Celebration { points },
        }
    }

    /// Current stats as of today; `completed_today` reads 0 once the day
    /// has turned over.
    #[must_use]
    pub fn snapshot(&self) -> GameStats {
        let mut stats = self.stats.clone();
        stats.roll_to(self.clock.today());
        stats
    }

    #[must_use]
    pub fn display(&self) -> StatsDisplay {
        let stats = self.snapshot();
        StatsDisplay {
            total_games: stats.total_games.to_string(),
            completed_today: stats.completed_today.to_string(),
            total_points: stats.total_points.to_string(),
            streak: stats.streak.to_string(),
        }
    }

    fn persist(&self) {
        let result = serde_json::to_string(&self.stats)
            .map_err(|err| err.to_string())
            .and_then(|json| {
                self.store
                    .set_item(STATS_KEY, &json)
                    .map_err(|err| err.to_string())
            });
        if let Err(err) = result {
            log::warn!("persisting {STATS_KEY} failed: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daily::ManualClock;
    use crate::storage::MemoryStore;

    fn clock() -> ManualClock {
        ManualClock::new(NaiveDate::from_ymd_opt(2025, 7, 16).unwrap())
    }

    #[test]
    fn totals_accumulate_across_distinct_games() {
        let mut stats = StatsAggregator::load(MemoryStore::new(), clock());
        assert!(stats.award("wordGame", 20).is_awarded());
        assert!(stats.award("mathGame", 15).is_awarded());

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total_points, 35);
        assert_eq!(snapshot.total_games, 2);
        assert_eq!(snapshot.streak, 2);
        assert_eq!(snapshot.completed_today, 2);
    }

    #[test]
    fn second_award_for_same_game_is_noop() {
        let mut stats = StatsAggregator::load(MemoryStore::new(), clock());
        let first = stats.award("memoryGame", 25);
        let Award::Awarded { stats: after_first, celebration } = first else {
            panic!("first award should score");
        };
        assert_eq!(celebration.points, 25);
        assert_eq!(celebration.message(), "🎉 Great Job! +25 points! 🎉");

        assert_eq!(stats.award("memoryGame", 25), Award::NoOp);
        assert_eq!(stats.snapshot(), after_first);
    }

    #[test]
    fn stats_survive_reload_and_roll_daily_counter() {
        let store = MemoryStore::new();
        let clock = clock();
        let mut stats = StatsAggregator::load(store.clone(), clock.clone());
        stats.award("quizGame", 15);

        let reloaded = StatsAggregator::load(store.clone(), clock.clone());
        assert_eq!(reloaded.snapshot().completed_today, 1);
        assert!(reloaded.snapshot().completed_games.contains("quizGame"));

        clock.advance_day();
        let next_day = StatsAggregator::load(store, clock);
        assert_eq!(next_day.snapshot().completed_today, 0);
        assert_eq!(next_day.snapshot().total_points, 15);
        assert_eq!(next_day.display().total_points, "15");
    }

    #[test]
    fn open_page_rolls_daily_counter_at_midnight() {
        let clock = clock();
        let mut stats = StatsAggregator::load(MemoryStore::new(), clock.clone());
        stats.award("wordGame", 20);
        assert_eq!(stats.display().completed_today, "1");

        clock.advance_day();
        assert_eq!(stats.display().completed_today, "0");
        assert_eq!(stats.snapshot().completed_today, 0);
        assert_eq!(stats.snapshot().total_points, 20);

        stats.award("mathGame", 15);
        assert_eq!(stats.snapshot().completed_today, 1);
    }

    #[test]
    fn legacy_and_garbled_saves_load() {
        let store = MemoryStore::new();
        store
            .set_item(
                STATS_KEY,
                r#"{"totalGames":3,"completedToday":1,"totalPoints":55,"streak":3,"completedGames":{}}"#,
            )
            .unwrap();
        let legacy = StatsAggregator::load(store.clone(), clock());
        assert_eq!(legacy.snapshot().total_points, 55);
        assert!(legacy.snapshot().completed_games.is_empty());

        store.set_item(STATS_KEY, "not json").unwrap();
        let garbled = StatsAggregator::load(store, clock());
        assert_eq!(garbled.snapshot().total_points, 0);
    }
}
