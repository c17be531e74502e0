//! Per-game, per-day completion records.
use chrono::NaiveDate;
use serde::Serialize;

use crate::KeyValueStore;
use crate::daily::Clock;

/// Value stored under a completion key.
pub const COMPLETED_SENTINEL: &str = "completed";

/// Storage key for `game_id` on `date`, e.g. `wordGame_2025-07-16`.
#[must_use]
pub fn record_key(game_id: &str, date: NaiveDate) -> String {
    format!("{game_id}_{}", date.format("%Y-%m-%d"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DailyStatus {
    Completed,
    NotPlayed,
}

impl DailyStatus {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Completed => "Completed",
            Self::NotPlayed => "Not played",
        }
    }

    #[must_use]
    pub const fn button_label(self) -> &'static str {
        match self {
            Self::Completed => "✅ Completed!",
            Self::NotPlayed => "Play Now!",
        }
    }
}

/// Status line for one game button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStatusEntry {
    pub game_id: String,
    pub status: DailyStatus,
    pub label: &'static str,
    pub button_label: &'static str,
}

/// Persisted "played today" flags. Records are only ever added.
#[derive(Debug, Clone)]
pub struct CompletionLedger<S, C> {
    store: S,
    clock: C,
}

impl<S: KeyValueStore, C: Clock> CompletionLedger<S, C> {
    pub const fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    #[must_use]
    pub fn is_completed_today(&self, game_id: &str) -> bool {
        self.is_completed_on(game_id, self.clock.today())
    }

    /// Unreadable storage counts as not completed.
    #[must_use]
    pub fn is_completed_on(&self, game_id: &str, date: NaiveDate) -> bool {
        let key = record_key(game_id, date);
        match self.store.get_item(&key) {
            Ok(value) => value.as_deref() == Some(COMPLETED_SENTINEL),
            Err(err) => {
                log::warn!("reading {key} failed: {err}");
                false
            }
        }
    }

    /// Record today's completion. Repeated calls leave the same state.
    pub fn mark_completed_today(&self, game_id: &str) {
        let key = record_key(game_id, self.clock.today());
        if let Err(err) = self.store.set_item(&key, COMPLETED_SENTINEL) {
            log::warn!("persisting {key} failed: {err}");
        } else {
            log::debug!("marked {key}");
        }
    }

    /// Completed / not-played labels for each game button. Read-only.
    pub fn refresh_daily_status<'a>(
        &self,
        game_ids: impl IntoIterator<Item = &'a str>,
    ) -> Vec<DailyStatusEntry> {
        let today = self.clock.today();
        game_ids
            .into_iter()
            .map(|game_id| {
                let status = if self.is_completed_on(game_id, today) {
                    DailyStatus::Completed
                } else {
                    DailyStatus::NotPlayed
                };
                DailyStatusEntry {
                    game_id: game_id.to_string(),
                    status,
                    label: status.label(),
                    button_label: status.button_label(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daily::ManualClock;
    use crate::storage::MemoryStore;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 16).unwrap()
    }

    #[test]
    fn marking_is_idempotent() {
        let store = MemoryStore::new();
        let ledger = CompletionLedger::new(store.clone(), ManualClock::new(start()));
        ledger.mark_completed_today("wordGame");
        let once = store.snapshot();
        ledger.mark_completed_today("wordGame");

        assert_eq!(store.snapshot(), once);
        assert_eq!(
            once.get("wordGame_2025-07-16").map(String::as_str),
            Some(COMPLETED_SENTINEL)
        );
        assert!(ledger.is_completed_today("wordGame"));
    }

    #[test]
    fn new_day_starts_unplayed_and_old_records_remain() {
        let store = MemoryStore::new();
        let clock = ManualClock::new(start());
        let ledger = CompletionLedger::new(store.clone(), clock.clone());
        ledger.mark_completed_today("mathGame");

        clock.advance_day();
        assert!(!ledger.is_completed_today("mathGame"));
        assert!(ledger.is_completed_on("mathGame", start()));

        let reopened = CompletionLedger::new(store, clock);
        assert!(reopened.is_completed_on("mathGame", start()));
    }

    #[test]
    fn refresh_reports_every_requested_game() {
        let ledger = CompletionLedger::new(MemoryStore::new(), ManualClock::new(start()));
        ledger.mark_completed_today("quizGame");
        let statuses = ledger.refresh_daily_status(["wordGame", "quizGame"]);

        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0].status, DailyStatus::NotPlayed);
        assert_eq!(statuses[0].label, "Not played");
        assert_eq!(statuses[1].status, DailyStatus::Completed);
        assert_eq!(statuses[1].button_label, "✅ Completed!");
    }
}
