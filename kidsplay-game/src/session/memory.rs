//! Pair matching over a face-down deck.

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidFlip {
    #[error("there is no card {0}")]
    OutOfRange(usize),
    #[error("card {0} is already face up")]
    FaceUp(usize),
    #[error("wait for the cards to turn back")]
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlipResult {
    Flipped { index: usize, token: String },
    Matched { pair: [usize; 2], matched: usize, total: usize },
    Missed { pair: [usize; 2] },
}

#[derive(Debug, Clone)]
pub struct MemoryBoard {
    cards: Vec<String>,
    matched: Vec<bool>,
    first: Option<usize>,
    mismatch: Option<[usize; 2]>,
    matched_pairs: usize,
}

impl MemoryBoard {
    #[must_use]
    pub fn new(cards: Vec<String>) -> Self {
        let matched = vec![false; cards.len()];
        Self {
            cards,
            matched,
            first: None,
            mismatch: None,
            matched_pairs: 0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    #[must_use]
    pub fn total_pairs(&self) -> usize {
        self.cards.len() / 2
    }

    #[must_use]
    pub const fn matched_pairs(&self) -> usize {
        self.matched_pairs
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.matched_pairs == self.total_pairs()
    }

    /// Turn a card face up; the second card of a selection settles the pair.
    ///
    /// # Errors
    ///
    /// Rejects unknown or face-up cards, and any flip while a missed pair is
    /// still showing.
    pub fn flip(&mut self, index: usize) -> Result<FlipResult, InvalidFlip> {
        if self.mismatch.is_some() {
            return Err(InvalidFlip::Busy);
        }
        let token = self
            .cards
            .get(index)
            .cloned()
            .ok_or(InvalidFlip::OutOfRange(index))?;
        if self.matched[index] || self.first == Some(index) {
            return Err(InvalidFlip::FaceUp(index));
        }
        let Some(first) = self.first.take() else {
            self.first = Some(index);
            return Ok(FlipResult::Flipped { index, token });
        };
        let pair = [first, index];
        if self.cards[first] == token {
            self.matched[first] = true;
            self.matched[index] = true;
            self.matched_pairs += 1;
            Ok(FlipResult::Matched {
                pair,
                matched: self.matched_pairs,
                total: self.total_pairs(),
            })
        } else {
            self.mismatch = Some(pair);
            Ok(FlipResult::Missed { pair })
        }
    }

    /// Turn a missed pair back over. Returns false if nothing was showing.
    pub fn hide_mismatch(&mut self) -> bool {
        self.mismatch.take().is_some()
    }
}
