mod logic;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use colored::Colorize;
use kidsplay_game::{Clock, GameConfig};
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::Instant;

use logic::{
    PlayerStrategy, ScenarioCtx, ScenarioResult, SystemClock, TesterAssets, expand_scenarios,
    list_scenarios, run_scenario,
};

#[derive(Debug, Parser)]
#[command(name = "kidsplay-tester", version = "0.1.0")]
#[command(about = "Simulated daily play against the Kidsplay mini-games engine")]
struct Args {
    /// Scenarios to run (comma-separated, or "all")
    #[arg(long, default_value = "all")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// First simulated day (YYYY-MM-DD); defaults to today
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Number of consecutive days to simulate
    #[arg(long, default_value_t = 7)]
    days: u32,

    /// How the simulated player plays in daily-play
    #[arg(long, value_enum, default_value_t = PlayerStrategy::Perfect)]
    strategy: PlayerStrategy,

    /// Seed for the random player
    #[arg(long, default_value_t = 1337)]
    seed: u64,

    /// Directory holding the puzzle datasets
    #[arg(long, default_value = "kidsplay-web/static/assets/data")]
    data_dir: PathBuf,

    /// Engine config JSON (epoch, delays); defaults are used when absent
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    if args.report == "console" || args.output.is_some() {
        announce_banner();
    }

    let start_time = Instant::now();
    let config = load_config(args.config.as_deref())?;
    let assets = TesterAssets::load(&args.data_dir, config).await?;
    let ctx = ScenarioCtx {
        assets: &assets,
        start: args.start.unwrap_or_else(|| SystemClock.today()),
        days: args.days,
        strategy: args.strategy,
        seed: args.seed,
        verbose: args.verbose,
    };

    let names = expand_scenarios(&split_csv(&args.scenarios));
    let mut results = Vec::with_capacity(names.len());
    for name in &names {
        log::info!("running {name} from {} for {} days", ctx.start, ctx.days);
        results.push(run_scenario(name, &ctx).await?);
    }

    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .try_init();
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(output_target.writer(), "  {key:15} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🧩 Kidsplay Daily Play Tester".bright_cyan().bold());
    println!("{}", "=============================".cyan());
}

fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    GameConfig::from_json(&json).with_context(|| format!("invalid config {}", path.display()))
}

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => logic::reports::generate_json_report(&mut output_target, results)?,
        "markdown" => {
            if results.is_empty() {
                writeln!(
                    &mut output_target,
                    "# Kidsplay Daily Play Results\n\n_No scenarios executed._"
                )?;
            } else {
                logic::reports::generate_markdown_report(&mut output_target, results)?;
            }
        }
        _ => {
            let duration = start_time.elapsed();
            if results.is_empty() {
                writeln!(&mut output_target, "No scenarios executed.")?;
            } else {
                logic::reports::generate_console_report(&mut output_target, results, duration)?;
            }
            writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn base_args() -> Args {
        Args {
            scenarios: "all".to_string(),
            list_scenarios: false,
            start: None,
            days: 1,
            strategy: PlayerStrategy::Perfect,
            seed: 1,
            data_dir: PathBuf::from("kidsplay-web/static/assets/data"),
            config: None,
            report: "console".to_string(),
            verbose: false,
            output: None,
        }
    }

    fn sample_result() -> ScenarioResult {
        ScenarioResult {
            scenario_name: "determinism".to_string(),
            strategy: "Perfect".to_string(),
            passed: true,
            days_run: 1,
            successful_days: 1,
            total_points: 0,
            failures: Vec::new(),
            average_duration: Duration::ZERO,
        }
    }

    #[test]
    fn split_csv_trims_and_drops_empty() {
        assert_eq!(
            split_csv(" daily-play, ,determinism "),
            vec!["daily-play", "determinism"]
        );
    }

    #[test]
    fn args_parse_dates_and_strategy() {
        let args = Args::try_parse_from([
            "kidsplay-tester",
            "--start",
            "2025-07-16",
            "--strategy",
            "stubborn",
            "--days",
            "3",
        ])
        .unwrap();
        assert_eq!(args.start, NaiveDate::from_ymd_opt(2025, 7, 16));
        assert_eq!(args.strategy, PlayerStrategy::Stubborn);
        assert_eq!(args.days, 3);
        assert!(Args::try_parse_from(["kidsplay-tester", "--start", "16/07/2025"]).is_err());
    }

    #[test]
    fn maybe_list_scenarios_writes_output() {
        let temp = std::env::temp_dir().join("kidsplay-scenarios.txt");
        let args = Args {
            list_scenarios: true,
            output: Some(temp.clone()),
            ..base_args()
        };
        assert!(maybe_list_scenarios(&args).unwrap());
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("Available scenarios"));
        assert!(content.contains("stale-actions"));
    }

    #[test]
    fn maybe_list_scenarios_returns_false_when_disabled() {
        assert!(!maybe_list_scenarios(&base_args()).unwrap());
    }

    #[test]
    fn write_reports_emits_json_for_results() {
        let temp = std::env::temp_dir().join("kidsplay-report.json");
        let args = Args {
            report: "json".to_string(),
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[sample_result()], Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("\"scenario_name\": \"determinism\""));
    }

    #[test]
    fn write_reports_markdown_empty_results() {
        let temp = std::env::temp_dir().join("kidsplay-report.md");
        let args = Args {
            report: "markdown".to_string(),
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[], Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("No scenarios executed"));
    }

    #[test]
    fn load_config_defaults_and_reads_file() {
        assert_eq!(load_config(None).unwrap(), GameConfig::default());

        let temp = std::env::temp_dir().join("kidsplay-config.json");
        std::fs::write(&temp, r#"{"epoch": "2025-08-01"}"#).unwrap();
        let config = load_config(Some(&temp)).unwrap();
        assert_eq!(config.epoch, NaiveDate::from_ymd_opt(2025, 8, 1).unwrap());
        assert!(load_config(Some(Path::new("/nonexistent/config.json"))).is_err());
    }
}
