use anyhow::{Result, bail};
use chrono::NaiveDate;
use kidsplay_game::{
    Award, DailyStatus, GameKind, ManualClock, MemoryStore, Opened, Outcome, Phase,
    SessionController, SessionError, days_since,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::assets::{FsSource, TesterAssets};
use super::policy::{Move, Player, layout_for};

pub type SimController = SessionController<FsSource, MemoryStore, ManualClock>;

/// How one game ended for the simulated player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Resolution {
    Solved,
    Exhausted,
    GaveUp,
    AlreadyDone,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamePlay {
    pub game: GameKind,
    pub resolution: Resolution,
    pub moves: usize,
    pub points: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayReport {
    pub date: NaiveDate,
    pub plays: Vec<GamePlay>,
    pub total_points: u64,
    pub failures: Vec<String>,
}

#[must_use]
pub fn new_controller(
    assets: &TesterAssets,
    store: &MemoryStore,
    clock: &ManualClock,
) -> SimController {
    SessionController::new(
        assets.source(),
        store.clone(),
        clock.clone(),
        assets.config().clone(),
    )
}

/// Open `game` and feed the player's moves until it resolves or the player
/// gives up. Every scheduled follow-up is fired right away.
///
/// # Errors
///
/// Returns an error if the game cannot be opened or rejects a move for any
/// reason other than invalid input.
pub async fn play_game(
    ctl: &mut SimController,
    player: &mut Player,
    assets: &TesterAssets,
    game: GameKind,
    day: NaiveDate,
) -> Result<GamePlay> {
    match ctl.open(game).await? {
        Opened::Ready { .. } => {}
        Opened::AlreadyCompleted { .. } => {
            ctl.close();
            return Ok(GamePlay {
                game,
                resolution: Resolution::AlreadyDone,
                moves: 0,
                points: 0,
            });
        }
        Opened::Superseded => bail!("{game} open was superseded"),
    }

    let key = assets.answer_key(game.category(), day)?;
    let layout = layout_for(&key, days_since(day, assets.config().epoch));
    let mut moves = 0;
    loop {
        let result = match player.next_move(&key, &layout, moves) {
            Move::GiveUp => {
                ctl.close();
                return Ok(GamePlay {
                    game,
                    resolution: Resolution::GaveUp,
                    moves,
                    points: 0,
                });
            }
            Move::Guess(word) => ctl.submit_word_guess(&word),
            Move::Number(n) if game == GameKind::Math => ctl.check_math_answer(&n.to_string()),
            Move::Number(n) => ctl.check_pattern_answer(&n.to_string()),
            Move::Choose(index) => ctl.select_quiz_answer(index),
            Move::Flip(index) => ctl.flip_card(index),
            Move::Draw => ctl.finish_drawing(),
        };
        moves += 1;

        let turn = match result {
            Ok(turn) => turn,
            Err(SessionError::InvalidInput(reason)) => {
                log::trace!("{game}: rejected move: {reason}");
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        for scheduled in &turn.scheduled {
            ctl.fire(scheduled);
        }
        if turn.phase == Phase::Resolved {
            let resolution = if matches!(turn.outcome, Outcome::Exhausted { .. }) {
                Resolution::Exhausted
            } else {
                Resolution::Solved
            };
            let points = match turn.award {
                Some(Award::Awarded { .. }) => game.points(),
                _ => 0,
            };
            return Ok(GamePlay {
                game,
                resolution,
                moves,
                points,
            });
        }
    }
}

/// One persistent player going through consecutive days.
pub struct DaySimulator<'a> {
    assets: &'a TesterAssets,
    store: MemoryStore,
    clock: ManualClock,
    player: Player,
    scored: BTreeSet<&'static str>,
}

impl<'a> DaySimulator<'a> {
    #[must_use]
    pub fn new(assets: &'a TesterAssets, player: Player, first_day: NaiveDate) -> Self {
        Self {
            assets,
            store: MemoryStore::new(),
            clock: ManualClock::new(first_day),
            player,
            scored: BTreeSet::new(),
        }
    }

    /// Reload the app on `day` and play all six games once, checking the
    /// ledger, award and stats rules after each one.
    ///
    /// # Errors
    ///
    /// Returns an error if a game cannot be played at all.
    pub async fn run_day(&mut self, day: NaiveDate) -> Result<DayReport> {
        self.clock.set(day);
        let mut ctl = new_controller(self.assets, &self.store, &self.clock);
        let mut failures = Vec::new();
        let mut plays = Vec::with_capacity(GameKind::ALL.len());

        for game in GameKind::ALL {
            let done_before = ctl.is_completed_today(game);
            let play = play_game(&mut ctl, &mut self.player, self.assets, game, day).await?;
            if done_before != (play.resolution == Resolution::AlreadyDone) {
                failures.push(format!(
                    "{day} {game}: ledger said completed={done_before} but open gave {:?}",
                    play.resolution
                ));
            }
            self.check_play(&mut ctl, &play, day, &mut failures).await?;
            plays.push(play);
        }

        let stats = ctl.stats_snapshot();
        let expected: u64 = GameKind::ALL
            .iter()
            .filter(|g| self.scored.contains(g.id()))
            .map(|g| u64::from(g.points()))
            .sum();
        if stats.total_points != expected {
            failures.push(format!(
                "{day}: total points {} but expected {expected}",
                stats.total_points
            ));
        }
        if stats.total_games as usize != self.scored.len() {
            failures.push(format!(
                "{day}: total games {} but {} games were ever scored",
                stats.total_games,
                self.scored.len()
            ));
        }
        for entry in ctl.refresh_daily_status() {
            let marked = entry
                .game_id
                .parse::<GameKind>()
                .is_ok_and(|g| ctl.is_completed_today(g));
            if marked != (entry.status == DailyStatus::Completed) {
                failures.push(format!("{day}: status for {} is '{}'", entry.game_id, entry.label));
            }
        }

        Ok(DayReport {
            date: day,
            plays,
            total_points: stats.total_points,
            failures,
        })
    }

    async fn check_play(
        &mut self,
        ctl: &mut SimController,
        play: &GamePlay,
        day: NaiveDate,
        failures: &mut Vec<String>,
    ) -> Result<()> {
        let game = play.game;
        match play.resolution {
            Resolution::Solved => {
                let first_time = self.scored.insert(game.id());
                if first_time != (play.points > 0) {
                    failures.push(format!(
                        "{day} {game}: first_time={first_time} but awarded {} points",
                        play.points
                    ));
                }
            }
            Resolution::Exhausted if play.points > 0 => {
                failures.push(format!("{day} {game}: exhausted round awarded points"));
            }
            Resolution::GaveUp => {
                if ctl.is_completed_today(game) {
                    failures.push(format!("{day} {game}: unfinished game marked completed"));
                }
                return Ok(());
            }
            Resolution::Exhausted | Resolution::AlreadyDone => {}
        }

        if !ctl.is_completed_today(game) {
            failures.push(format!("{day} {game}: resolved game not in ledger"));
        }
        if ctl.phase() != Phase::Closed {
            failures.push(format!(
                "{day} {game}: session still {:?} after auto-close",
                ctl.phase()
            ));
        }
        if play.resolution != Resolution::AlreadyDone {
            let reopened = ctl.open(game).await?;
            ctl.close();
            if !matches!(reopened, Opened::AlreadyCompleted { .. }) {
                failures.push(format!("{day} {game}: reopening gave {reopened:?}"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::assets::bundled_data_dir;
    use crate::logic::policy::PlayerStrategy;
    use kidsplay_game::GameConfig;

    async fn assets() -> TesterAssets {
        TesterAssets::load(&bundled_data_dir(), GameConfig::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn perfect_player_scores_everything_once() {
        let assets = assets().await;
        let day = assets.config().epoch;
        let player = Player::new(PlayerStrategy::Perfect, 1, Vec::new());
        let mut sim = DaySimulator::new(&assets, player, day);

        let first = sim.run_day(day).await.unwrap();
        assert!(first.failures.is_empty(), "{:?}", first.failures);
        assert_eq!(first.total_points, 115);
        assert!(first.plays.iter().all(|p| p.resolution == Resolution::Solved));

        let again = sim.run_day(day).await.unwrap();
        assert!(again.failures.is_empty(), "{:?}", again.failures);
        assert!(
            again
                .plays
                .iter()
                .all(|p| p.resolution == Resolution::AlreadyDone)
        );

        let next = sim.run_day(day.succ_opt().unwrap()).await.unwrap();
        assert!(next.failures.is_empty(), "{:?}", next.failures);
        assert!(next.plays.iter().all(|p| p.points == 0));
        assert_eq!(next.total_points, 115);
    }

    #[tokio::test]
    async fn stubborn_player_exhausts_word_and_scores_only_drawing() {
        let assets = assets().await;
        let day = assets.config().epoch;
        let player = Player::new(PlayerStrategy::Stubborn, 1, Vec::new());
        let mut sim = DaySimulator::new(&assets, player, day);

        let report = sim.run_day(day).await.unwrap();
        assert!(report.failures.is_empty(), "{:?}", report.failures);
        let word = &report.plays[0];
        assert_eq!(word.game, GameKind::Word);
        assert_eq!(word.resolution, Resolution::Exhausted);
        assert_eq!(word.moves, 6);
        assert_eq!(report.total_points, u64::from(GameKind::Drawing.points()));
    }
}
