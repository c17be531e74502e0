//! Calendar-day selection of today's puzzle.
//!
//! "Today" and the rotation epoch are both local calendar dates; the day
//! offset is their difference in whole days. No instants or time zones are
//! involved, so a client switches to the next puzzle exactly at its own local
//! midnight and every client on the same date gets the same index.

use chrono::NaiveDate;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use std::cell::Cell;
use std::rc::Rc;

use crate::catalog::{CatalogError, MemoryDeck, PuzzleCategory};

const LAYOUT_DOMAIN: u64 = 0x4B49_4453_504C_4159;

/// Source of today's local calendar date
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Clock pinned to one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Clock that can be moved by hand; clones share the same date.
#[derive(Debug, Clone)]
pub struct ManualClock {
    today: Rc<Cell<NaiveDate>>,
}

impl ManualClock {
    #[must_use]
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: Rc::new(Cell::new(today)),
        }
    }

    pub fn set(&self, date: NaiveDate) {
        self.today.set(date);
    }

    /// Move forward one calendar day. Saturates at the last representable date.
    pub fn advance_day(&self) {
        let current = self.today.get();
        self.today.set(current.succ_opt().unwrap_or(current));
    }
}

impl Clock for ManualClock {
    fn today(&self) -> NaiveDate {
        self.today.get()
    }
}

/// Whole calendar days from `epoch` to `today`; negative before the epoch.
#[must_use]
pub fn days_since(today: NaiveDate, epoch: NaiveDate) -> i64 {
    today.signed_duration_since(epoch).num_days()
}

/// Index of today's puzzle in a dataset of `len` entries.
///
/// Dates before the epoch wrap around instead of going negative.
///
/// # Errors
///
/// Returns `EmptyCatalog` when `len` is zero.
pub fn index_for(
    category: PuzzleCategory,
    len: usize,
    today: NaiveDate,
    epoch: NaiveDate,
) -> Result<usize, CatalogError> {
    if len == 0 {
        return Err(CatalogError::EmptyCatalog { category });
    }
    let len_i64 = i64::try_from(len).unwrap_or(i64::MAX);
    let offset = days_since(today, epoch).rem_euclid(len_i64);
    let index = usize::try_from(offset).unwrap_or_default();
    log::debug!("{category} index for {today}: {index} of {len}");
    Ok(index)
}

/// Card order for a memory deck on a given day.
///
/// Seeded from the day offset so every client lays the cards out identically.
#[must_use]
pub fn daily_layout(deck: &MemoryDeck, day_offset: i64) -> Vec<String> {
    let mut cards = deck.cards().to_vec();
    let mut rng = ChaCha8Rng::seed_from_u64(LAYOUT_DOMAIN ^ day_offset.cast_unsigned());
    cards.shuffle(&mut rng);
    cards
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn index_stays_in_range_for_every_length() {
        let epoch = date(2025, 7, 16);
        let mut day = date(2024, 1, 1);
        for _ in 0..800 {
            for len in 1..12 {
                let index = index_for(PuzzleCategory::Math, len, day, epoch).unwrap();
                assert!(index < len);
                assert_eq!(index, index_for(PuzzleCategory::Math, len, day, epoch).unwrap());
            }
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn index_advances_one_per_day_and_wraps() {
        let epoch = date(2025, 7, 16);
        let word = |day| index_for(PuzzleCategory::Word, 5, day, epoch).unwrap();
        assert_eq!(word(epoch), 0);
        assert_eq!(word(date(2025, 7, 17)), 1);
        assert_eq!(word(date(2025, 7, 21)), 0);
        assert_eq!(word(date(2025, 7, 15)), 4);
    }

    #[test]
    fn empty_dataset_is_rejected() {
        let epoch = date(2025, 7, 16);
        assert_eq!(
            index_for(PuzzleCategory::Quiz, 0, epoch, epoch),
            Err(CatalogError::EmptyCatalog {
                category: PuzzleCategory::Quiz
            })
        );
    }

    #[test]
    fn layout_is_stable_per_day_and_keeps_cards() {
        let deck = MemoryDeck(
            ["A", "A", "B", "B", "C", "C", "D", "D", "E", "E", "F", "F"]
                .iter()
                .map(ToString::to_string)
                .collect(),
        );
        let today = daily_layout(&deck, 91);
        assert_eq!(today, daily_layout(&deck, 91));

        let mut sorted = today.clone();
        sorted.sort();
        assert_eq!(sorted, deck.cards());
    }

    #[test]
    fn manual_clock_shares_date_between_clones() {
        let clock = ManualClock::new(date(2025, 12, 31));
        let alias = clock.clone();
        clock.advance_day();
        assert_eq!(alias.today(), date(2026, 1, 1));
        alias.set(date(2025, 7, 16));
        assert_eq!(clock.today(), date(2025, 7, 16));
        assert_eq!(FixedClock(date(2025, 7, 16)).today(), date(2025, 7, 16));
    }
}
