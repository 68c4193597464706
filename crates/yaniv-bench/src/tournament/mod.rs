mod permutations;
mod random;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::analytics::{AnalyticsCollector, AnalyticsError};
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};
use yaniv_core::ai::AgentParams;
use yaniv_core::game::{Game, GameError};
use yaniv_core::model::player::Player;

use crate::config::{AgentConfig, AgentKind, BenchmarkConfig, ResolvedOutputs};

pub use permutations::SeatPermutations;
pub use random::{RandomOptions, RandomPolicy};

/// Primary entry point for orchestrating self-play runs.
pub struct TournamentRunner {
    config: BenchmarkConfig,
    outputs: ResolvedOutputs,
    agents: Vec<AgentBlueprint>,
    seat_permutations: SeatPermutations,
    logging_enabled: bool,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub games_played: usize,
    pub permutations: usize,
    pub rows_written: usize,
    pub errors: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
}

impl TournamentRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: BenchmarkConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        let agents = AgentBlueprint::from_configs(&config.agents)?;
        let seat_permutations = SeatPermutations::new(agents.len(), config.games.permutations);

        Ok(Self {
            logging_enabled: config.logging.enable_structured,
            config,
            outputs,
            agents,
            seat_permutations,
        })
    }

    /// Plays every game, streaming one JSONL row per game to disk.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut rng = StdRng::seed_from_u64(self.config.games.seed.unwrap_or(0));
        let mut rows_written = 0usize;
        let mut errors = 0usize;
        let mut analytics = AnalyticsCollector::new(&self.config)?;

        for game_index in 0..self.config.games.count {
            let game_seed = rng.next_u64();
            let (permutation_index, seating) = self.seat_permutations.for_game(game_index);
            let outcome = self.play_game(game_index, game_seed, seating)?;
            if outcome.error.is_some() {
                errors += 1;
            }
            analytics.record_game(&outcome)?;
            write_game_row(
                &mut writer,
                &self.config,
                game_index,
                permutation_index,
                game_seed,
                &outcome,
            )?;
            rows_written += 1;
        }

        writer.flush()?;

        let summary = analytics.finalize()?;
        summary.write_markdown(&self.outputs.summary_md)?;

        Ok(RunSummary {
            games_played: self.config.games.count,
            permutations: self.seat_permutations.as_slice().len(),
            rows_written,
            errors,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
        })
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn write_game_row(
    writer: &mut BufWriter<File>,
    config: &BenchmarkConfig,
    game_index: usize,
    permutation_index: usize,
    game_seed: u64,
    outcome: &GameOutcome,
) -> Result<(), RunnerError> {
    let row = GameLogRow {
        run_id: config.run_id.clone(),
        game_id: outcome.game_id.clone(),
        game_index,
        permutation_index,
        game_seed,
        seating: outcome.seating.clone(),
        winner: outcome.winner.clone(),
        turns: outcome.turns,
        rounds: outcome.rounds,
        truncated: outcome.truncated,
        error: outcome.error.clone(),
        seats: outcome
            .seat_results
            .iter()
            .map(|seat| SeatLogRow {
                agent: seat.agent_name.clone(),
                score: seat.score,
                eliminated_in_round: seat.eliminated_in_round,
                decisions: seat.metrics.decisions,
                avg_ms_per_decision: seat.metrics.avg_ms_per_decision,
            })
            .collect(),
    };

    serde_json::to_writer(&mut *writer, &row)?;
    writer.write_all(b"\n")?;
    Ok(())
}

impl TournamentRunner {
    fn play_game(
        &self,
        game_index: usize,
        game_seed: u64,
        permutation: &[usize],
    ) -> Result<GameOutcome, RunnerError> {
        let game_id = format!("{}-G{game_index:05}", self.config.run_id);
        let mut seats = build_seat_states(permutation, &self.agents)?;
        let mut game = Game::with_seed(game_seed)
            .with_rules(self.config.rules)
            .with_id(game_id.clone());
        for seat in &seats {
            game.add_player(seat.spawn_player())?;
        }
        let mut policy_rng = StdRng::seed_from_u64(game_seed.rotate_left(17));

        let mut turns = 0usize;
        let mut truncated = false;
        let error = match game.start_game() {
            Ok(()) => loop {
                if game.is_over() {
                    break None;
                }
                if turns >= self.config.games.max_turns {
                    truncated = true;
                    break None;
                }
                turns += 1;
                if let Err(err) = self.play_turn(&mut game, &mut seats, &mut policy_rng) {
                    break Some(err);
                }
                if self.config.games.check_invariants && !game.is_consistent() {
                    break Some(format!("card conservation broken after turn {turns}"));
                }
            },
            Err(err) => Some(err.to_string()),
        };

        let winner = game.winner().map(str::to_string);
        let seating = seats.iter().map(|seat| seat.agent_name.clone()).collect();
        let seat_results: Vec<SeatResult> = seats
            .into_iter()
            .map(|seat| {
                let score = match seat.eliminated {
                    Some((_, score)) => score,
                    None => game.player(&seat.agent_name).map_or(0, Player::score),
                };
                SeatResult {
                    score,
                    eliminated_in_round: seat.eliminated.map(|(round, _)| round),
                    agent_name: seat.agent_name,
                    metrics: seat.metrics.finalize(),
                }
            })
            .collect();

        if self.logging_enabled && tracing::enabled!(Level::INFO) {
            event!(
                target: "yaniv_bench::game",
                Level::INFO,
                run_id = %self.config.run_id,
                game_id = %game_id,
                game_index = game_index as u64,
                winner = winner.as_deref().unwrap_or("-"),
                turns = turns as u64,
                rounds = game.round(),
                truncated,
                error = error.as_deref().unwrap_or("")
            );
        }

        Ok(GameOutcome {
            game_id,
            seating,
            winner,
            turns,
            rounds: game.round(),
            truncated,
            error,
            seat_results,
        })
    }

    /// Plays one turn for whoever is to move. A rejected move ends the game
    /// with its message.
    fn play_turn(
        &self,
        game: &mut Game,
        seats: &mut [SeatState],
        rng: &mut StdRng,
    ) -> Result<(), String> {
        let (player, draw_options) = game.start_turn().map_err(|err| err.to_string())?;
        let name = player.name().to_string();
        let hand = player.hand().cards().to_vec();
        let seat = seats
            .iter_mut()
            .find(|seat| seat.agent_name == name)
            .ok_or_else(|| format!("no seat for player '{name}'"))?;

        let declared = match seat.controller {
            SeatController::Autonomous(_) => {
                let start = Instant::now();
                let declared = if game.agent_wants_yaniv(&name).map_err(describe)? {
                    Some(game.declare_yaniv(&name).map_err(describe)?)
                } else {
                    game.play_turn(&name, None).map_err(describe)?;
                    None
                };
                let elapsed_ms = seat.metrics.record(start.elapsed());
                if self.logging_enabled {
                    event!(
                        target: "yaniv_bench::decision",
                        Level::DEBUG,
                        run_id = %self.config.run_id,
                        agent = %name,
                        declared = declared.is_some(),
                        elapsed_ms
                    );
                }
                declared
            }
            SeatController::Random(policy) => {
                if game.can_declare_yaniv(&name) && policy.should_declare(&hand, rng) {
                    Some(game.declare_yaniv(&name).map_err(describe)?)
                } else {
                    let action = policy
                        .choose_action(&hand, &draw_options, rng)
                        .ok_or_else(|| format!("'{name}' has no legal discard"))?;
                    game.play_turn(&name, Some(action)).map_err(describe)?;
                    if game.pending_slamdown().is_some() && policy.take_slamdown(rng) {
                        game.perform_slamdown(&name).map_err(describe)?;
                    }
                    None
                }
            }
        };

        if let Some(outcome) = declared {
            let round = game.round();
            for out in &outcome.eliminated {
                if let Some(seat) = seats.iter_mut().find(|seat| seat.agent_name == out.name) {
                    seat.eliminated = Some((round, out.score));
                }
            }
        }
        Ok(())
    }
}

fn describe(err: GameError) -> String {
    err.to_string()
}

fn build_seat_states(
    permutation: &[usize],
    agents: &[AgentBlueprint],
) -> Result<Vec<SeatState>, RunnerError> {
    let mut seats = Vec::with_capacity(permutation.len());
    for (seat_idx, agent_idx) in permutation.iter().enumerate() {
        let agent = agents
            .get(*agent_idx)
            .ok_or(RunnerError::InvalidPermutation {
                index: seat_idx,
                agent_index: *agent_idx,
            })?;
        seats.push(SeatState::new(agent));
    }
    Ok(seats)
}

struct SeatState {
    agent_name: String,
    controller: SeatController,
    /// Round in which the seat was knocked out, with its final score.
    eliminated: Option<(u32, u32)>,
    metrics: DecisionMetrics,
}

#[derive(Clone, Copy)]
enum SeatController {
    Autonomous(AgentParams),
    Random(RandomPolicy),
}

impl SeatState {
    fn new(agent: &AgentBlueprint) -> Self {
        let controller = match agent.implementation {
            AgentImplementation::Autonomous(params) => SeatController::Autonomous(params),
            AgentImplementation::Random(options) => {
                SeatController::Random(RandomPolicy::new(options))
            }
        };
        Self {
            agent_name: agent.name.clone(),
            controller,
            eliminated: None,
            metrics: DecisionMetrics::default(),
        }
    }

    fn spawn_player(&self) -> Player {
        match self.controller {
            SeatController::Autonomous(params) => {
                Player::autonomous(self.agent_name.clone(), params)
            }
            SeatController::Random(_) => Player::human(self.agent_name.clone()),
        }
    }
}

pub struct GameOutcome {
    pub game_id: String,
    /// Agent names in seat order.
    pub seating: Vec<String>,
    pub winner: Option<String>,
    pub turns: usize,
    pub rounds: u32,
    /// The turn cap was hit before a winner emerged.
    pub truncated: bool,
    pub error: Option<String>,
    pub seat_results: Vec<SeatResult>,
}

pub struct SeatResult {
    pub agent_name: String,
    /// Final score, or the score the seat was eliminated with.
    pub score: u32,
    pub eliminated_in_round: Option<u32>,
    pub metrics: DecisionSummary,
}

#[derive(Default)]
struct DecisionMetrics {
    samples_ms: Vec<f64>,
}

impl DecisionMetrics {
    fn record(&mut self, duration: Duration) -> f64 {
        let elapsed_ms = duration.as_secs_f64() * 1000.0;
        self.samples_ms.push(elapsed_ms);
        elapsed_ms
    }

    fn finalize(self) -> DecisionSummary {
        let total_ms: f64 = self.samples_ms.iter().sum();
        let decisions = self.samples_ms.len() as u32;
        let avg_ms = if decisions == 0 {
            0.0
        } else {
            total_ms / f64::from(decisions)
        };

        DecisionSummary {
            decisions,
            avg_ms_per_decision: avg_ms,
            total_ms,
            samples_ms: self.samples_ms,
        }
    }
}

#[derive(Clone)]
pub struct DecisionSummary {
    pub decisions: u32,
    pub avg_ms_per_decision: f64,
    pub total_ms: f64,
    pub samples_ms: Vec<f64>,
}

#[derive(Serialize)]
struct GameLogRow {
    run_id: String,
    game_id: String,
    game_index: usize,
    permutation_index: usize,
    game_seed: u64,
    seating: Vec<String>,
    winner: Option<String>,
    turns: usize,
    rounds: u32,
    truncated: bool,
    error: Option<String>,
    seats: Vec<SeatLogRow>,
}

#[derive(Serialize)]
struct SeatLogRow {
    agent: String,
    score: u32,
    eliminated_in_round: Option<u32>,
    decisions: u32,
    avg_ms_per_decision: f64,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("{0}")]
    Agent(#[from] AgentError),
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("failed to seat players: {0}")]
    Seating(#[from] GameError),
    #[error("permutation index {index} references invalid agent index {agent_index}")]
    InvalidPermutation { index: usize, agent_index: usize },
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("invalid autonomous parameter for agent '{name}': {message}")]
    InvalidAutonomousParam { name: String, message: String },
    #[error("invalid random parameter for agent '{name}': {message}")]
    InvalidRandomParam { name: String, message: String },
}

struct AgentBlueprint {
    name: String,
    implementation: AgentImplementation,
}

#[derive(Clone, Copy)]
enum AgentImplementation {
    Autonomous(AgentParams),
    Random(RandomOptions),
}

impl AgentBlueprint {
    fn from_configs(configs: &[AgentConfig]) -> Result<Vec<Self>, AgentError> {
        configs.iter().map(Self::from_config).collect()
    }

    fn from_config(config: &AgentConfig) -> Result<Self, AgentError> {
        let implementation = match config.kind {
            AgentKind::Autonomous => {
                AgentImplementation::Autonomous(autonomous_params(&config.name, &config.params)?)
            }
            AgentKind::Random => {
                AgentImplementation::Random(random_options(&config.name, &config.params)?)
            }
        };

        Ok(Self {
            name: config.name.clone(),
            implementation,
        })
    }
}

fn autonomous_params(name: &str, params: &serde_yaml::Value) -> Result<AgentParams, AgentError> {
    if params.is_null() {
        return Ok(AgentParams::default());
    }
    serde_yaml::from_value(params.clone()).map_err(|err| AgentError::InvalidAutonomousParam {
        name: name.to_string(),
        message: err.to_string(),
    })
}

fn random_options(name: &str, params: &serde_yaml::Value) -> Result<RandomOptions, AgentError> {
    if params.is_null() {
        return Ok(RandomOptions::default());
    }
    let options: RandomOptions =
        serde_yaml::from_value(params.clone()).map_err(|err| AgentError::InvalidRandomParam {
            name: name.to_string(),
            message: err.to_string(),
        })?;
    for (label, value) in [
        ("pile_draw", options.pile_draw),
        ("declare", options.declare),
        ("slamdown", options.slamdown),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(AgentError::InvalidRandomParam {
                name: name.to_string(),
                message: format!("{label} must be a probability, got {value}"),
            });
        }
    }
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::iter::FromIterator;
    use yaniv_core::ai::AgentPolicy;

    fn mapping(pairs: &[(&str, serde_yaml::Value)]) -> serde_yaml::Value {
        serde_yaml::Value::Mapping(serde_yaml::Mapping::from_iter(
            pairs
                .iter()
                .map(|(key, value)| (serde_yaml::Value::String((*key).into()), value.clone())),
        ))
    }

    #[test]
    fn autonomous_params_default_to_expected() {
        let params = autonomous_params("bot", &mapping(&[])).unwrap();
        assert_eq!(params, AgentParams::default());
        assert_eq!(params.policy, AgentPolicy::Expected);
    }

    #[test]
    fn autonomous_params_parse_policy_and_samples() {
        let params = autonomous_params(
            "bot",
            &mapping(&[
                ("policy", serde_yaml::Value::String("greedy".into())),
                ("rollout_samples", serde_yaml::Value::Number(8.into())),
            ]),
        )
        .unwrap();
        assert_eq!(params.policy, AgentPolicy::Greedy);
        assert_eq!(params.rollout_samples, 8);
    }

    #[test]
    fn random_options_reject_bad_probabilities() {
        let err = random_options(
            "rnd",
            &mapping(&[("pile_draw", serde_yaml::Value::Number(2.into()))]),
        )
        .unwrap_err();
        assert!(matches!(err, AgentError::InvalidRandomParam { .. }));
    }
}
