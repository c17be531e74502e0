//! Named checks run by the tester.

use anyhow::{Result, bail};
use chrono::{Days, NaiveDate};
use kidsplay_game::{
    Action, GameKind, ManualClock, MemoryStore, Opened, Outcome, Phase, PuzzleItem, days_since,
};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use super::assets::TesterAssets;
use super::policy::{Player, PlayerStrategy, layout_for};
use super::simulation::{DaySimulator, new_controller};

pub const SCENARIOS: &[(&str, &str)] = &[
    (
        "daily-play",
        "One player plays every game each day with the chosen strategy",
    ),
    (
        "determinism",
        "Two fresh clients see identical puzzles and card layouts each day",
    ),
    (
        "replay-day",
        "Replaying a finished day is blocked and later days award nothing new",
    ),
    (
        "stale-actions",
        "Follow-ups from closed or replaced sessions change nothing",
    ),
];

#[must_use]
pub fn list_scenarios() -> &'static [(&'static str, &'static str)] {
    SCENARIOS
}

#[must_use]
pub fn expand_scenarios(names: &[String]) -> Vec<String> {
    if names.iter().any(|n| n == "all") {
        return SCENARIOS.iter().map(|(key, _)| (*key).to_string()).collect();
    }
    names.to_vec()
}

/// Inputs shared by every scenario run
pub struct ScenarioCtx<'a> {
    pub assets: &'a TesterAssets,
    pub start: NaiveDate,
    pub days: u32,
    pub strategy: PlayerStrategy,
    pub seed: u64,
    pub verbose: bool,
}

impl ScenarioCtx<'_> {
    fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (0..self.days).filter_map(|i| self.start.checked_add_days(Days::new(u64::from(i))))
    }

    fn player(&self, strategy: PlayerStrategy) -> Player {
        Player::new(strategy, self.seed, self.assets.vocabulary())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub strategy: String,
    pub passed: bool,
    pub days_run: usize,
    pub successful_days: usize,
    pub total_points: u64,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
}

#[derive(Default)]
struct Tally {
    days_run: usize,
    successful_days: usize,
    total_points: u64,
    failures: Vec<String>,
    durations: Vec<Duration>,
}

impl Tally {
    fn day(&mut self, started: Instant, failures: Vec<String>) {
        self.days_run += 1;
        if failures.is_empty() {
            self.successful_days += 1;
        }
        self.failures.extend(failures);
        self.durations.push(started.elapsed());
    }

    fn finish(self, name: &str, strategy: PlayerStrategy) -> ScenarioResult {
        let average_duration = u32::try_from(self.durations.len())
            .ok()
            .filter(|n| *n > 0)
            .map_or(Duration::ZERO, |n| self.durations.iter().sum::<Duration>() / n);
        ScenarioResult {
            scenario_name: name.to_string(),
            strategy: strategy.to_string(),
            passed: self.failures.is_empty() && self.days_run > 0,
            days_run: self.days_run,
            successful_days: self.successful_days,
            total_points: self.total_points,
            failures: self.failures,
            average_duration,
        }
    }
}

/// Run the scenario registered under `name`.
///
/// # Errors
///
/// Returns an error for an unknown scenario or when the engine cannot be
/// driven at all; rule violations are reported as failures instead.
pub async fn run_scenario(name: &str, ctx: &ScenarioCtx<'_>) -> Result<ScenarioResult> {
    let result = match name {
        "daily-play" => daily_play(ctx).await?.finish(name, ctx.strategy),
        "determinism" => determinism(ctx).await?.finish(name, PlayerStrategy::Perfect),
        "replay-day" => replay_day(ctx).await?.finish(name, PlayerStrategy::Perfect),
        "stale-actions" => stale_actions(ctx).await?.finish(name, PlayerStrategy::Stubborn),
        other => bail!("unknown scenario: {other}"),
    };
    Ok(result)
}

async fn daily_play(ctx: &ScenarioCtx<'_>) -> Result<Tally> {
    let mut sim = DaySimulator::new(ctx.assets, ctx.player(ctx.strategy), ctx.start);
    let mut tally = Tally::default();
    for day in ctx.dates() {
        let started = Instant::now();
        let report = sim.run_day(day).await?;
        if ctx.verbose {
            for play in &report.plays {
                println!(
                    "  {day} {:<12} {:?} in {} moves (+{})",
                    play.game.id(),
                    play.resolution,
                    play.moves,
                    play.points
                );
            }
        }
        tally.total_points = report.total_points;
        tally.day(started, report.failures);
    }
    Ok(tally)
}

async fn determinism(ctx: &ScenarioCtx<'_>) -> Result<Tally> {
    let mut tally = Tally::default();
    for day in ctx.dates() {
        let started = Instant::now();
        let mut failures = Vec::new();
        let clock = ManualClock::new(day);
        let mut first = new_controller(ctx.assets, &MemoryStore::new(), &clock);
        let mut second = new_controller(ctx.assets, &MemoryStore::new(), &clock);
        for game in GameKind::ALL {
            let a = first.open(game).await?;
            let b = second.open(game).await?;
            let (Opened::Ready { view: a, .. }, Opened::Ready { view: b, .. }) = (a, b) else {
                failures.push(format!("{day} {game}: fresh client did not open a puzzle"));
                continue;
            };
            if a != b {
                failures.push(format!("{day} {game}: clients were shown different puzzles"));
            }
        }

        // Every card of the memory layout must match the expected deal.
        let key = ctx.assets.answer_key(GameKind::Memory.category(), day)?;
        let layout = layout_for(&key, days_since(day, ctx.assets.config().epoch));
        for (index, expected) in layout.iter().enumerate() {
            first.open(GameKind::Memory).await?;
            match first.flip_card(index)?.outcome {
                Outcome::Flipped { token, .. } if token == *expected => {}
                other => failures.push(format!("{day}: card {index} showed {other:?}")),
            }
        }
        if !matches!(key, PuzzleItem::Memory(_)) {
            failures.push(format!("{day}: memory answer key is not a deck"));
        }
        tally.day(started, failures);
    }
    Ok(tally)
}

async fn replay_day(ctx: &ScenarioCtx<'_>) -> Result<Tally> {
    let mut sim = DaySimulator::new(ctx.assets, ctx.player(PlayerStrategy::Perfect), ctx.start);
    let mut tally = Tally::default();

    let started = Instant::now();
    let first = sim.run_day(ctx.start).await?;
    tally.total_points = first.total_points;
    tally.day(started, first.failures);

    let started = Instant::now();
    let replay = sim.run_day(ctx.start).await?;
    let mut failures = replay.failures;
    if let Some(play) = replay.plays.iter().find(|p| p.moves > 0) {
        failures.push(format!("{}: {} was playable twice", ctx.start, play.game));
    }
    tally.day(started, failures);

    for day in ctx.dates().skip(1) {
        let started = Instant::now();
        let report = sim.run_day(day).await?;
        let mut failures = report.failures;
        if report.total_points != tally.total_points {
            failures.push(format!(
                "{day}: points moved from {} to {}",
                tally.total_points, report.total_points
            ));
        }
        tally.day(started, failures);
    }
    Ok(tally)
}

async fn stale_actions(ctx: &ScenarioCtx<'_>) -> Result<Tally> {
    let mut tally = Tally::default();
    let started = Instant::now();
    let mut failures = Vec::new();
    let day = ctx.start;
    let clock = ManualClock::new(day);
    let mut ctl = new_controller(ctx.assets, &MemoryStore::new(), &clock);

    // Retry message cleared after the session closed.
    ctl.open(GameKind::Math).await?;
    let miss = ctl.check_math_answer("-1")?;
    ctl.close();
    for scheduled in &miss.scheduled {
        if ctl.fire(scheduled) {
            failures.push(format!("{:?} ran after close", scheduled.action));
        }
    }

    // Missed pair hidden after another game replaced the session.
    let key = ctx.assets.answer_key(GameKind::Memory.category(), day)?;
    let layout = layout_for(&key, days_since(day, ctx.assets.config().epoch));
    let other = layout.iter().skip(1).position(|t| Some(t) != layout.first());
    ctl.open(GameKind::Memory).await?;
    ctl.flip_card(0)?;
    let missed = ctl.flip_card(other.map_or(1, |i| i + 1))?;
    ctl.open(GameKind::Drawing).await?;
    for scheduled in &missed.scheduled {
        if ctl.fire(scheduled) {
            failures.push(format!("{:?} ran against a replaced session", scheduled.action));
        }
    }

    // Auto-close from a finished drawing must not close the next game.
    let drawn = ctl.finish_drawing()?;
    ctl.open(GameKind::Quiz).await?;
    for scheduled in &drawn.scheduled {
        if ctl.fire(scheduled) {
            failures.push(format!("{:?} ran against a replaced session", scheduled.action));
        }
    }
    if ctl.phase() != Phase::Active || ctl.open_game() != Some(GameKind::Quiz) {
        failures.push(format!("quiz session disturbed: {:?}", ctl.phase()));
    }
    let live = drawn
        .scheduled
        .iter()
        .any(|s| s.action == Action::AutoClose);
    if !live {
        failures.push("finished drawing scheduled no auto-close".to_string());
    }

    tally.total_points = ctl.stats_snapshot().total_points;
    tally.day(started, failures);
    Ok(tally)
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::assets::bundled_data_dir;
    use kidsplay_game::GameConfig;

    async fn run(name: &str, strategy: PlayerStrategy, days: u32) -> ScenarioResult {
        let assets = TesterAssets::load(&bundled_data_dir(), GameConfig::default())
            .await
            .unwrap();
        let ctx = ScenarioCtx {
            assets: &assets,
            start: NaiveDate::from_ymd_opt(2025, 7, 14).unwrap(),
            days,
            strategy,
            seed: 1337,
            verbose: false,
        };
        run_scenario(name, &ctx).await.unwrap()
    }

    #[tokio::test]
    async fn every_scenario_passes_on_bundled_data() {
        for (name, _) in SCENARIOS {
            let result = run(name, PlayerStrategy::Perfect, 3).await;
            assert!(result.passed, "{name}: {:?}", result.failures);
        }
    }

    #[tokio::test]
    async fn random_player_keeps_the_rules() {
        let result = run("daily-play", PlayerStrategy::Random, 10).await;
        assert!(result.passed, "{:?}", result.failures);
        assert_eq!(result.days_run, 10);
    }

    #[tokio::test]
    async fn unknown_scenario_is_an_error() {
        let assets = TesterAssets::load(&bundled_data_dir(), GameConfig::default())
            .await
            .unwrap();
        let ctx = ScenarioCtx {
            assets: &assets,
            start: NaiveDate::from_ymd_opt(2025, 7, 16).unwrap(),
            days: 1,
            strategy: PlayerStrategy::Perfect,
            seed: 1,
            verbose: false,
        };
        assert!(run_scenario("nope", &ctx).await.is_err());
    }

    #[test]
    fn all_expands_to_every_scenario() {
        let expanded = expand_scenarios(&["all".to_string()]);
        assert_eq!(expanded.len(), SCENARIOS.len());
        assert_eq!(
            expand_scenarios(&["determinism".to_string()]),
            vec!["determinism"]
        );
    }
}
