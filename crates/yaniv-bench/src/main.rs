use std::path::PathBuf;

use clap::Parser;

use yaniv_bench::config::{BenchmarkConfig, ResolvedOutputs};
use yaniv_bench::logging::init_logging;
use yaniv_bench::tournament::TournamentRunner;
use yaniv_core::AppInfo;

/// Self-play benchmarking harness for Yaniv agents.
#[derive(Debug, Parser)]
#[command(
    name = "yaniv-bench",
    author,
    version,
    about = "Deterministic Yaniv self-play harness"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/bench.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of games to play.
    #[arg(long, value_name = "GAMES")]
    games: Option<usize>,

    /// Override the RNG seed for game generation.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Override the per-game turn cap.
    #[arg(long, value_name = "TURNS")]
    max_turns: Option<usize>,

    /// Check card conservation after every action.
    #[arg(long)]
    check_invariants: bool,

    /// Exit after validating the configuration (no games are played).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = BenchmarkConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(games) = cli.games {
        config.games.count = games;
    }

    if let Some(seed) = cli.seed {
        config.games.seed = Some(seed);
    }

    if let Some(max_turns) = cli.max_turns {
        config.games.max_turns = max_turns;
    }

    if cli.check_invariants {
        config.games.check_invariants = true;
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let agent_count = config.agents.len();
    let run_id = config.run_id.clone();
    let games = config.games.count;

    println!(
        "{} {}: loaded configuration '{run_id}' with {agent_count} agents ({games} games)",
        AppInfo::name(),
        AppInfo::version(),
    );

    let logging_guard = init_logging(&config.logging, &outputs)?;
    let runner = TournamentRunner::new(config, outputs)?;

    if cli.validate_only {
        println!("Validation-only mode: no games played.");
        return Ok(());
    }

    let summary = runner.run()?;
    println!(
        "Run complete for '{run_id}': {} games over {} seat orders → {} rows at {}",
        summary.games_played,
        summary.permutations,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    if summary.errors > 0 {
        println!("  {} games stopped on an error", summary.errors);
    }
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(guard) = logging_guard.as_ref() {
        println!("Telemetry log: {}", guard.telemetry_path.display());
    }

    Ok(())
}
