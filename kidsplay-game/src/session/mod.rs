//! One-game-at-a-time session lifecycle.
//!
//! `Closed → Loading → Active → Resolved → Closed`. Opening a game always
//! replaces whatever session was current. Loading is split into
//! [`SessionController::begin_open`] and [`SessionController::finish_open`] so a
//! host can await the catalog without holding the controller; a ticket that is
//! no longer current is ignored. Delayed follow-ups are handed back as
//! [`ScheduledAction`]s and only take effect while their session is current.

pub mod answer;
pub mod memory;
pub mod view;
pub mod word;

use serde::Serialize;
use std::rc::Rc;

use crate::catalog::{CatalogError, PuzzleCatalog, PuzzleItem, PuzzleSet, PuzzleSource};
use crate::config::GameConfig;
use crate::daily::{Clock, daily_layout, days_since, index_for};
use crate::game::GameKind;
use crate::ledger::{CompletionLedger, DailyStatusEntry};
use crate::premium::PremiumFlag;
use crate::stats::{Award, GameStats, StatsAggregator, StatsDisplay};
use crate::KeyValueStore;
use answer::Expected;
use memory::{FlipResult, MemoryBoard};
use view::{ALREADY_COMPLETED, Board, retry_message, success_message};
use word::{MAX_ATTEMPTS, WORD_LENGTH, WordProgress, WordRound, normalize_guess};

pub use view::GameView;
pub use word::{LetterMark, ScoredLetter, score_guess};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Closed,
    Loading,
    Active,
    Resolved,
}

/// Identity of a pending open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTicket {
    pub id: SessionId,
    pub game: GameKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    /// Clear the retry message.
    ClearMessage,
    /// Turn a missed memory pair back over.
    HideMismatch,
    /// Remove the celebration banner.
    DismissCelebration,
    /// Close a resolved session.
    AutoClose,
}

/// A follow-up the host runs after `delay_ms` by calling `fire`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledAction {
    pub session: SessionId,
    pub delay_ms: u32,
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Opened {
    Ready {
        session: SessionId,
        view: GameView,
    },
    /// Today's puzzle is done; the session opens straight into `Resolved`.
    AlreadyCompleted {
        session: SessionId,
        game: GameKind,
        message: &'static str,
    },
    /// A newer open replaced this one before the puzzle arrived.
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Outcome {
    Scored {
        row: Vec<ScoredLetter>,
        attempts_left: u8,
    },
    Exhausted {
        row: Vec<ScoredLetter>,
        target: String,
    },
    Correct,
    Incorrect,
    Flipped {
        index: usize,
        token: String,
    },
    Matched {
        pair: [usize; 2],
        matched: usize,
        total: usize,
    },
    Missed {
        pair: [usize; 2],
    },
    Finished,
}

/// Everything one player move produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Turn {
    pub outcome: Outcome,
    pub phase: Phase,
    pub message: Option<String>,
    pub award: Option<Award>,
    pub scheduled: Vec<ScheduledAction>,
}

impl Turn {
    fn active(outcome: Outcome, message: Option<String>) -> Self {
        Self {
            outcome,
            phase: Phase::Active,
            message,
            award: None,
            scheduled: Vec::new(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("{0}")]
    InvalidInput(String),
    #[error("no game is open")]
    NoSession,
    #[error("{requested} is not the open game ({open})")]
    WrongGame { requested: GameKind, open: GameKind },
    #[error("{0} is not accepting moves")]
    NotActive(GameKind),
}

#[derive(Debug)]
enum Round {
    Word(WordRound),
    Answer(Expected),
    Memory(MemoryBoard),
    Drawing,
}

#[derive(Debug)]
struct Session {
    id: SessionId,
    game: GameKind,
    phase: Phase,
    round: Option<Round>,
}

/// Owns the current session plus the ledger, stats and premium flag it
/// reports to.
pub struct SessionController<P, S, C> {
    catalog: Rc<PuzzleCatalog<P>>,
    ledger: CompletionLedger<S, C>,
    stats: StatsAggregator<S, C>,
    premium: PremiumFlag<S>,
    clock: C,
    config: GameConfig,
    next_id: u64,
    current: Option<Session>,
}

impl<P, S, C> SessionController<P, S, C>
where
    P: PuzzleSource + 'static,
    S: KeyValueStore + Clone,
    C: Clock + Clone,
{
    pub fn new(source: P, store: S, clock: C, config: GameConfig) -> Self {
        let catalog = Rc::new(PuzzleCatalog::new(source, config.asset_base.clone()));
        Self {
            catalog,
            ledger: CompletionLedger::new(store.clone(), clock.clone()),
            stats: StatsAggregator::load(store.clone(), clock.clone()),
            premium: PremiumFlag::new(store),
            clock,
            config,
            next_id: 0,
            current: None,
        }
    }

    /// Shared handle to the catalog for awaiting a load between
    /// `begin_open` and `finish_open`.
    #[must_use]
    pub fn catalog(&self) -> Rc<PuzzleCatalog<P>> {
        Rc::clone(&self.catalog)
    }

    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.current.as_ref().map_or(Phase::Closed, |s| s.phase)
    }

    #[must_use]
    pub fn open_game(&self) -> Option<GameKind> {
        self.current.as_ref().map(|s| s.game)
    }

    #[must_use]
    pub fn session_id(&self) -> Option<SessionId> {
        self.current.as_ref().map(|s| s.id)
    }

    /// Fetch today's puzzle and open `game`, replacing any current session.
    ///
    /// # Errors
    ///
    /// Returns the catalog error when the dataset cannot be loaded; the
    /// session is closed.
    pub async fn open(&mut self, game: GameKind) -> Result<Opened, SessionError> {
        let ticket = self.begin_open(game);
        let catalog = self.catalog();
        let loaded = catalog.load(game.category()).await;
        self.finish_open(ticket, loaded)
    }

    /// Start loading `game`. Any previous session stops receiving moves.
    pub fn begin_open(&mut self, game: GameKind) -> SessionTicket {
        self.next_id += 1;
        let id = SessionId(self.next_id);
        let previous = self.current.replace(Session {
            id,
            game,
            phase: Phase::Loading,
            round: None,
        });
        if let Some(previous) = previous {
            log::debug!("{} session replaced by {game}", previous.game);
        }
        SessionTicket { id, game }
    }

    /// Apply a finished load to the session it was started for.
    ///
    /// # Errors
    ///
    /// Returns the load error, or `EmptyCatalog`, for the current ticket and
    /// closes the session. Errors for a stale ticket are dropped.
    pub fn finish_open(
        &mut self,
        ticket: SessionTicket,
        loaded: Result<Rc<PuzzleSet>, CatalogError>,
    ) -> Result<Opened, SessionError> {
        if self.session_id() != Some(ticket.id) {
            if let Err(err) = &loaded {
                log::debug!("dropping error for superseded {}: {err}", ticket.game);
            }
            return Ok(Opened::Superseded);
        }
        let prepared = loaded
            .map_err(SessionError::from)
            .and_then(|set| self.prepare(ticket, &set));
        if prepared.is_err() {
            self.current = None;
        }
        prepared
    }

    fn prepare(&mut self, ticket: SessionTicket, set: &PuzzleSet) -> Result<Opened, SessionError> {
        let game = ticket.game;
        let category = game.category();
        if set.category() != category {
            return Err(CatalogError::CatalogUnavailable {
                category,
                reason: format!("received the {} dataset", set.category()),
            }
            .into());
        }

        if self.ledger.is_completed_today(game.id()) {
            self.set_phase(Phase::Resolved);
            return Ok(Opened::AlreadyCompleted {
                session: ticket.id,
                game,
                message: ALREADY_COMPLETED,
            });
        }

        let today = self.clock.today();
        let index = index_for(category, set.len(), today, self.config.epoch)?;
        let item = set
            .item(index)
            .ok_or(CatalogError::EmptyCatalog { category })?;
        let (round, board) = match item {
            PuzzleItem::Word(target) => (
                Round::Word(WordRound::new(target)),
                Board::WordGrid {
                    rows: MAX_ATTEMPTS,
                    columns: WORD_LENGTH,
                },
            ),
            PuzzleItem::Math(puzzle) => (
                Round::Answer(Expected::Number(puzzle.answer)),
                Board::Question {
                    text: puzzle.question,
                },
            ),
            PuzzleItem::Pattern(puzzle) => (
                Round::Answer(Expected::Number(puzzle.answer)),
                Board::Sequence {
                    numbers: puzzle.pattern,
                },
            ),
            PuzzleItem::Quiz(puzzle) => (
                Round::Answer(Expected::Choice {
                    correct: puzzle.correct,
                    options: puzzle.options.len(),
                }),
                Board::Choices {
                    question: puzzle.question,
                    options: puzzle.options,
                },
            ),
            PuzzleItem::Memory(deck) => {
                let cards = daily_layout(&deck, days_since(today, self.config.epoch));
                let board = MemoryBoard::new(cards);
                let view = Board::Cards {
                    count: board.len(),
                    pairs: board.total_pairs(),
                };
                (Round::Memory(board), view)
            }
            PuzzleItem::Drawing(prompt) => (Round::Drawing, Board::Canvas { prompt }),
        };

        if let Some(session) = self.current.as_mut() {
            session.phase = Phase::Active;
            session.round = Some(round);
        }
        log::debug!("{game} active with puzzle {index} for {today}");
        Ok(Opened::Ready {
            session: ticket.id,
            view: GameView::new(game, board),
        })
    }

    /// Close the current session. Returns false if nothing was open.
    ///
    /// Follow-ups of the closed session become stale, including
    /// `DismissCelebration`; the host removes a visible banner itself.
    pub fn close(&mut self) -> bool {
        self.current.take().is_some()
    }

    /// Run a delayed follow-up. Returns false, changing nothing, when its
    /// session has been closed or replaced.
    pub fn fire(&mut self, scheduled: &ScheduledAction) -> bool {
        let Some(session) = self.current.as_mut() else {
            return false;
        };
        if session.id != scheduled.session {
            log::debug!("ignoring stale {:?}", scheduled.action);
            return false;
        }
        match scheduled.action {
            Action::ClearMessage | Action::DismissCelebration => true,
            Action::HideMismatch => match session.round.as_mut() {
                Some(Round::Memory(board)) => board.hide_mismatch(),
                _ => false,
            },
            Action::AutoClose => {
                if session.phase == Phase::Resolved {
                    self.current = None;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Score a word guess.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for anything but five letters; no attempt is used.
    pub fn submit_word_guess(&mut self, raw: &str) -> Result<Turn, SessionError> {
        let (id, round) = self.active_round(GameKind::Word)?;
        let Round::Word(word) = round else {
            return Err(SessionError::NotActive(GameKind::Word));
        };
        let guess = normalize_guess(raw).ok_or_else(|| {
            SessionError::InvalidInput(format!("Enter a {WORD_LENGTH}-letter word!"))
        })?;
        let progress = word.guess(&guess);
        let attempts_left = word.attempts_left();
        let target = word.target().to_string();

        let turn = match progress {
            WordProgress::Miss { row, attempts_left } => Turn::active(
                Outcome::Scored { row, attempts_left },
                Some(format!("You have {attempts_left} tries left.")),
            ),
            WordProgress::Solved { row } => {
                self.resolve_success(id, GameKind::Word, Outcome::Scored { row, attempts_left })
            }
            WordProgress::Exhausted { row } => {
                self.ledger.mark_completed_today(GameKind::Word.id());
                self.set_phase(Phase::Resolved);
                let message = format!("❌ Out of tries! The word was {target}.");
                Turn {
                    outcome: Outcome::Exhausted { row, target },
                    phase: Phase::Resolved,
                    message: Some(message),
                    award: None,
                    scheduled: vec![follow_up(
                        id,
                        self.config.delays.exhausted_close_ms,
                        Action::AutoClose,
                    )],
                }
            }
        };
        Ok(turn)
    }

    /// # Errors
    ///
    /// `InvalidInput` for non-numeric input.
    pub fn check_math_answer(&mut self, raw: &str) -> Result<Turn, SessionError> {
        self.check_number(GameKind::Math, raw)
    }

    /// # Errors
    ///
    /// `InvalidInput` for non-numeric input.
    pub fn check_pattern_answer(&mut self, raw: &str) -> Result<Turn, SessionError> {
        self.check_number(GameKind::Pattern, raw)
    }

    /// # Errors
    ///
    /// `InvalidInput` for an index past the options.
    pub fn select_quiz_answer(&mut self, index: usize) -> Result<Turn, SessionError> {
        let (id, round) = self.active_round(GameKind::Quiz)?;
        let Round::Answer(expected) = round else {
            return Err(SessionError::NotActive(GameKind::Quiz));
        };
        let correct = expected
            .check_choice(index)
            .map_err(|e| SessionError::InvalidInput(e.to_string()))?;
        Ok(self.settle_answer(id, GameKind::Quiz, correct))
    }

    /// Flip one memory card.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for unknown or face-up cards, or while a missed pair is
    /// still showing.
    pub fn flip_card(&mut self, index: usize) -> Result<Turn, SessionError> {
        let (id, round) = self.active_round(GameKind::Memory)?;
        let Round::Memory(board) = round else {
            return Err(SessionError::NotActive(GameKind::Memory));
        };
        let flip = board
            .flip(index)
            .map_err(|e| SessionError::InvalidInput(e.to_string()))?;
        let complete = board.is_complete();

        let turn = match flip {
            FlipResult::Flipped { index, token } => {
                Turn::active(Outcome::Flipped { index, token }, None)
            }
            FlipResult::Missed { pair } => {
                let mut turn = Turn::active(Outcome::Missed { pair }, None);
                turn.scheduled.push(follow_up(
                    id,
                    self.config.delays.mismatch_hide_ms,
                    Action::HideMismatch,
                ));
                turn
            }
            FlipResult::Matched {
                pair,
                matched,
                total,
            } => {
                let outcome = Outcome::Matched {
                    pair,
                    matched,
                    total,
                };
                if complete {
                    self.resolve_success(id, GameKind::Memory, outcome)
                } else {
                    Turn::active(outcome, None)
                }
            }
        };
        Ok(turn)
    }

    /// Any finished drawing counts as a success.
    ///
    /// # Errors
    ///
    /// Fails only when the drawing game is not the active session.
    pub fn finish_drawing(&mut self) -> Result<Turn, SessionError> {
        let (id, _) = self.active_round(GameKind::Drawing)?;
        Ok(self.resolve_success(id, GameKind::Drawing, Outcome::Finished))
    }

    #[must_use]
    pub fn stats_snapshot(&self) -> GameStats {
        self.stats.snapshot()
    }

    #[must_use]
    pub fn stats_display(&self) -> StatsDisplay {
        self.stats.display()
    }

    /// Completed / not-played labels for all six games.
    #[must_use]
    pub fn refresh_daily_status(&self) -> Vec<DailyStatusEntry> {
        self.ledger
            .refresh_daily_status(GameKind::ALL.iter().map(|game| game.id()))
    }

    #[must_use]
    pub fn is_completed_today(&self, game: GameKind) -> bool {
        self.ledger.is_completed_today(game.id())
    }

    #[must_use]
    pub fn is_premium_user(&self) -> bool {
        self.premium.is_premium_user()
    }

    pub fn upgrade_to_premium(&self) {
        self.premium.upgrade_to_premium();
    }

    fn active_round(&mut self, game: GameKind) -> Result<(SessionId, &mut Round), SessionError> {
        let session = self.current.as_mut().ok_or(SessionError::NoSession)?;
        if session.game != game {
            return Err(SessionError::WrongGame {
                requested: game,
                open: session.game,
            });
        }
        if session.phase != Phase::Active {
            return Err(SessionError::NotActive(game));
        }
        let id = session.id;
        let round = session
            .round
            .as_mut()
            .ok_or(SessionError::NotActive(game))?;
        Ok((id, round))
    }

    fn check_number(&mut self, game: GameKind, raw: &str) -> Result<Turn, SessionError> {
        let (id, round) = self.active_round(game)?;
        let Round::Answer(expected) = round else {
            return Err(SessionError::NotActive(game));
        };
        let correct = expected
            .check_number(raw)
            .map_err(|e| SessionError::InvalidInput(e.to_string()))?;
        Ok(self.settle_answer(id, game, correct))
    }

    fn settle_answer(&mut self, id: SessionId, game: GameKind, correct: bool) -> Turn {
        if correct {
            return self.resolve_success(id, game, Outcome::Correct);
        }
        let mut turn = Turn::active(Outcome::Incorrect, Some(retry_message(game).to_string()));
        turn.scheduled.push(follow_up(
            id,
            self.config.delays.retry_clear_ms,
            Action::ClearMessage,
        ));
        turn
    }

    /// Mark today's record, request the award and schedule the close.
    fn resolve_success(&mut self, id: SessionId, game: GameKind, outcome: Outcome) -> Turn {
        self.ledger.mark_completed_today(game.id());
        let award = self.stats.award(game.id(), game.points());
        self.set_phase(Phase::Resolved);

        let delays = self.config.delays;
        let mut scheduled = Vec::with_capacity(2);
        if award.is_awarded() {
            scheduled.push(follow_up(
                id,
                delays.celebration_delay_ms(),
                Action::DismissCelebration,
            ));
        }
        scheduled.push(follow_up(id, delays.auto_close_ms, Action::AutoClose));
        log::info!("{game} solved");
        Turn {
            outcome,
            phase: Phase::Resolved,
            message: Some(success_message(game).to_string()),
            award: Some(award),
            scheduled,
        }
    }

    fn set_phase(&mut self, phase: Phase) {
        if let Some(session) = self.current.as_mut() {
            session.phase = phase;
        }
    }
}

const fn follow_up(session: SessionId, delay_ms: u32, action: Action) -> ScheduledAction {
    ScheduledAction {
        session,
        delay_ms,
        action,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daily::ManualClock;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use futures::executor::block_on;

    struct Fixtures;

    #[derive(Debug, thiserror::Error)]
    #[error("missing {0}")]
    struct Missing(String);

    #[async_trait(?Send)]
    impl PuzzleSource for Fixtures {
        type Error = Missing;

        async fn fetch(&self, resource: &str) -> Result<String, Self::Error> {
            let body = match resource {
                "wordPuzzles.json" => r#"["CRANE", "APPLE"]"#,
                "mathPuzzles.json" => r#"[{"question": "7 + 5 = ?", "answer": 12}]"#,
                "patternPuzzles.json" => r#"[{"pattern": [2, 4, 6, 8], "answer": 10}]"#,
                "quizPuzzles.json" => {
                    r#"[{"question": "Largest planet?", "options": ["Mars", "Jupiter"], "correct": 1}]"#
                }
                "drawingPrompts.json" => r#"["Draw a happy sun"]"#,
                "memoryPuzzles.json" => r#"[["A", "A", "B", "B"]]"#,
                other => return Err(Missing(other.to_string())),
            };
            Ok(body.to_string())
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("quota exceeded")]
    struct QuotaExceeded;

    /// Storage that rejects every read and write.
    #[derive(Debug, Clone)]
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        type Error = QuotaExceeded;

        fn get_item(&self, _key: &str) -> Result<Option<String>, Self::Error> {
            Err(QuotaExceeded)
        }

        fn set_item(&self, _key: &str, _value: &str) -> Result<(), Self::Error> {
            Err(QuotaExceeded)
        }
    }

    fn controller() -> SessionController<Fixtures, MemoryStore, ManualClock> {
        let epoch = NaiveDate::from_ymd_opt(2025, 7, 16).unwrap();
        SessionController::new(
            Fixtures,
            MemoryStore::new(),
            ManualClock::new(epoch),
            GameConfig::default(),
        )
    }

    #[test]
    fn word_win_marks_ledger_and_awards() {
        let mut ctl = controller();
        let opened = block_on(ctl.open(GameKind::Word)).unwrap();
        assert!(matches!(opened, Opened::Ready { .. }));
        assert_eq!(ctl.phase(), Phase::Active);

        let turn = ctl.submit_word_guess("crane").unwrap();
        assert_eq!(turn.phase, Phase::Resolved);
        assert!(turn.award.as_ref().is_some_and(Award::is_awarded));
        assert!(ctl.is_completed_today(GameKind::Word));
        assert_eq!(ctl.stats_snapshot().total_points, 20);
    }

    #[test]
    fn broken_storage_does_not_stop_play() {
        let epoch = NaiveDate::from_ymd_opt(2025, 7, 16).unwrap();
        let mut ctl = SessionController::new(
            Fixtures,
            BrokenStore,
            ManualClock::new(epoch),
            GameConfig::default(),
        );
        assert_eq!(ctl.stats_snapshot().total_points, 0);

        block_on(ctl.open(GameKind::Word)).unwrap();
        let turn = ctl.submit_word_guess("crane").unwrap();
        assert_eq!(turn.phase, Phase::Resolved);
        assert!(turn.award.as_ref().is_some_and(Award::is_awarded));
        assert_eq!(ctl.stats_snapshot().total_points, 20);
        assert!(!ctl.is_completed_today(GameKind::Word));

        // The unwritten ledger lets the game reopen, but the award stays single.
        assert!(matches!(
            block_on(ctl.open(GameKind::Word)).unwrap(),
            Opened::Ready { .. }
        ));
        let again = ctl.submit_word_guess("crane").unwrap();
        assert_eq!(again.award, Some(Award::NoOp));
        assert_eq!(ctl.stats_snapshot().total_points, 20);

        ctl.upgrade_to_premium();
        assert!(!ctl.is_premium_user());
        assert!(
            ctl.refresh_daily_status()
                .iter()
                .all(|entry| entry.status != crate::ledger::DailyStatus::Completed)
        );
    }

    #[test]
    fn slow_celebration_is_dismissed_before_auto_close() {
        let epoch = NaiveDate::from_ymd_opt(2025, 7, 16).unwrap();
        let config = GameConfig {
            delays: crate::config::DelayConfig {
                celebration_ms: 5000,
                ..Default::default()
            },
            ..GameConfig::default()
        };
        let mut ctl = SessionController::new(
            Fixtures,
            MemoryStore::new(),
            ManualClock::new(epoch),
            config,
        );
        block_on(ctl.open(GameKind::Drawing)).unwrap();
        let mut scheduled = ctl.finish_drawing().unwrap().scheduled;
        scheduled.sort_by_key(|s| s.delay_ms);

        assert_eq!(scheduled[0].action, Action::DismissCelebration);
        assert!(scheduled[0].delay_ms <= scheduled[1].delay_ms);
        assert!(scheduled.iter().all(|s| ctl.fire(s)));
        assert_eq!(ctl.phase(), Phase::Closed);
    }

    #[test]
    fn invalid_guess_leaves_attempts_untouched() {
        let mut ctl = controller();
        block_on(ctl.open(GameKind::Word)).unwrap();
        let err = ctl.submit_word_guess("abc").unwrap_err();
        assert!(matches!(err, SessionError::InvalidInput(_)));

        let turn = ctl.submit_word_guess("SLOTH").unwrap();
        assert!(matches!(
            turn.outcome,
            Outcome::Scored {
                attempts_left: 5,
                ..
            }
        ));
    }

    #[test]
    fn wrong_game_and_closed_session_are_rejected() {
        let mut ctl = controller();
        assert!(matches!(
            ctl.check_math_answer("12"),
            Err(SessionError::NoSession)
        ));
        block_on(ctl.open(GameKind::Quiz)).unwrap();
        assert!(matches!(
            ctl.check_math_answer("12"),
            Err(SessionError::WrongGame {
                requested: GameKind::Math,
                open: GameKind::Quiz
            })
        ));
        assert!(matches!(
            ctl.select_quiz_answer(7),
            Err(SessionError::InvalidInput(_))
        ));
    }

    #[test]
    fn stale_actions_are_noops_after_close() {
        let mut ctl = controller();
        block_on(ctl.open(GameKind::Math)).unwrap();
        let miss = ctl.check_math_answer("11").unwrap();
        let clear = miss.scheduled[0];
        assert_eq!(clear.action, Action::ClearMessage);
        assert!(ctl.fire(&clear));

        let win = ctl.check_math_answer("12").unwrap();
        assert!(ctl.close());
        for scheduled in &win.scheduled {
            assert!(!ctl.fire(scheduled));
        }
        assert_eq!(ctl.phase(), Phase::Closed);
    }

    #[test]
    fn auto_close_closes_resolved_session() {
        let mut ctl = controller();
        block_on(ctl.open(GameKind::Drawing)).unwrap();
        let turn = ctl.finish_drawing().unwrap();
        let close = turn
            .scheduled
            .iter()
            .find(|s| s.action == Action::AutoClose)
            .copied()
            .unwrap();
        assert_eq!(close.delay_ms, 2000);
        assert!(ctl.fire(&close));
        assert_eq!(ctl.phase(), Phase::Closed);
    }

    #[test]
    fn superseded_ticket_is_ignored() {
        let mut ctl = controller();
        let first = ctl.begin_open(GameKind::Math);
        let second = ctl.begin_open(GameKind::Quiz);
        let catalog = ctl.catalog();

        let math = block_on(catalog.load(GameKind::Math.category()));
        assert_eq!(ctl.finish_open(first, math).unwrap(), Opened::Superseded);
        assert_eq!(ctl.phase(), Phase::Loading);
        assert_eq!(ctl.open_game(), Some(GameKind::Quiz));

        let quiz = block_on(catalog.load(GameKind::Quiz.category()));
        assert!(matches!(
            ctl.finish_open(second, quiz).unwrap(),
            Opened::Ready { .. }
        ));
    }

    #[test]
    fn load_failure_closes_session() {
        let mut ctl = controller();
        let ticket = ctl.begin_open(GameKind::Word);
        let failed = Err(CatalogError::CatalogUnavailable {
            category: GameKind::Word.category(),
            reason: "offline".to_string(),
        });
        let err = ctl.finish_open(ticket, failed).unwrap_err();
        assert!(matches!(err, SessionError::Catalog(_)));
        assert_eq!(ctl.phase(), Phase::Closed);
    }

    #[test]
    fn mismatched_dataset_is_rejected() {
        let mut ctl = controller();
        let catalog = ctl.catalog();
        let ticket = ctl.begin_open(GameKind::Word);
        let math = block_on(catalog.load(GameKind::Math.category()));
        assert!(ctl.finish_open(ticket, math).is_err());
        assert_eq!(ctl.phase(), Phase::Closed);
    }
}
