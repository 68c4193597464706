use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

use crate::config::{AgentConfig, AgentKind, BenchmarkConfig};
use crate::tournament::GameOutcome;

const CONFIDENCE_Z: f64 = 1.96; // 95% CI

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("baseline agent '{0}' not present in benchmark results")]
    MissingBaseline(String),
    #[error("agent '{0}' defined in results but missing from configuration")]
    UnknownAgent(String),
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

pub struct AnalyticsCollector {
    baseline: String,
    agents: HashMap<String, AgentAccumulator>,
    agent_order: Vec<String>,
    games: usize,
    truncated: usize,
    turns: Vec<f64>,
    errors: BTreeMap<String, usize>,
    latency_budget_ms: u64,
}

impl AnalyticsCollector {
    pub fn new(config: &BenchmarkConfig) -> Result<Self, AnalyticsError> {
        let baseline = config
            .metrics
            .baseline
            .clone()
            .ok_or_else(|| AnalyticsError::MissingBaseline("<unset>".into()))?;

        let mut agents = HashMap::new();
        let mut order = Vec::new();
        for agent in &config.agents {
            agents.insert(agent.name.clone(), AgentAccumulator::new(agent.clone()));
            order.push(agent.name.clone());
        }
        if !agents.contains_key(&baseline) {
            return Err(AnalyticsError::MissingBaseline(baseline));
        }

        Ok(Self {
            baseline,
            agents,
            agent_order: order,
            games: 0,
            truncated: 0,
            turns: Vec::new(),
            errors: BTreeMap::new(),
            latency_budget_ms: config.metrics.latency_budget_ms,
        })
    }

    pub fn record_game(&mut self, outcome: &GameOutcome) -> Result<(), AnalyticsError> {
        self.games += 1;
        self.turns.push(outcome.turns as f64);
        if outcome.truncated {
            self.truncated += 1;
        }
        if let Some(error) = &outcome.error {
            *self.errors.entry(error.clone()).or_default() += 1;
        }

        for seat in &outcome.seat_results {
            let acc = self
                .agents
                .get_mut(&seat.agent_name)
                .ok_or_else(|| AnalyticsError::UnknownAgent(seat.agent_name.clone()))?;
            acc.games += 1;
            if outcome.winner.as_deref() == Some(seat.agent_name.as_str()) {
                acc.wins += 1;
            }
            acc.latency_ms.extend_from_slice(&seat.metrics.samples_ms);
        }

        Ok(())
    }

    pub fn finalize(mut self) -> Result<AnalyticsSummary, AnalyticsError> {
        let (baseline_wins, baseline_games) = self
            .agents
            .get(&self.baseline)
            .map(|acc| (acc.wins, acc.games))
            .ok_or_else(|| AnalyticsError::MissingBaseline(self.baseline.clone()))?;

        let mut reports = Vec::new();
        for name in &self.agent_order {
            if let Some(acc) = self.agents.remove(name) {
                let p_value = if *name == self.baseline {
                    1.0
                } else {
                    two_proportion_p_value(acc.wins, acc.games, baseline_wins, baseline_games)
                };
                reports.push(acc.into_report(p_value, self.latency_budget_ms));
            }
        }

        let baseline_rate = win_rate(baseline_wins, baseline_games);
        for report in &mut reports {
            report.delta_vs_baseline = report.win_rate - baseline_rate;
        }

        Ok(AnalyticsSummary {
            baseline: self.baseline,
            games: self.games,
            truncated: self.truncated,
            turns: DistributionStats::of(&self.turns),
            errors: self.errors,
            agents: reports,
            latency_budget_ms: self.latency_budget_ms,
        })
    }
}

struct AgentAccumulator {
    config: AgentConfig,
    games: usize,
    wins: usize,
    latency_ms: Vec<f64>,
}

impl AgentAccumulator {
    fn new(config: AgentConfig) -> Self {
        Self {
            config,
            games: 0,
            wins: 0,
            latency_ms: Vec::new(),
        }
    }

    fn into_report(self, p_value: f64, latency_budget_ms: u64) -> AgentReport {
        let latency = DistributionStats::of(&self.latency_ms);
        AgentReport {
            name: self.config.name,
            kind: self.config.kind,
            params: self.config.params,
            games: self.games,
            wins: self.wins,
            win_rate: win_rate(self.wins, self.games),
            ci95: wilson_interval(self.wins, self.games),
            decisions: self.latency_ms.len(),
            over_budget: latency.avg > latency_budget_ms as f64,
            latency_ms: latency,
            delta_vs_baseline: 0.0,
            p_value,
        }
    }
}

/// Mean, 95th percentile and maximum of a sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DistributionStats {
    pub avg: f64,
    pub p95: f64,
    pub max: f64,
}

impl DistributionStats {
    pub fn of(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let avg = values.iter().sum::<f64>() / values.len() as f64;
        let max = values.iter().copied().fold(f64::MIN, f64::max);
        Self {
            avg,
            p95: percentile(values, 0.95),
            max,
        }
    }
}

/// Nearest-rank percentile.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let rank = (p * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

fn win_rate(wins: usize, games: usize) -> f64 {
    if games == 0 {
        0.0
    } else {
        wins as f64 / games as f64
    }
}

/// 95% Wilson score interval for a win rate.
pub fn wilson_interval(wins: usize, games: usize) -> (f64, f64) {
    if games == 0 {
        return (0.0, 0.0);
    }
    let n = games as f64;
    let p = wins as f64 / n;
    let z2 = CONFIDENCE_Z * CONFIDENCE_Z;
    let denominator = 1.0 + z2 / n;
    let centre = (p + z2 / (2.0 * n)) / denominator;
    let margin = CONFIDENCE_Z * (p * (1.0 - p) / n + z2 / (4.0 * n * n)).sqrt() / denominator;
    ((centre - margin).max(0.0), (centre + margin).min(1.0))
}

/// Two-sided pooled z-test p-value for two win rates.
pub fn two_proportion_p_value(wins_a: usize, games_a: usize, wins_b: usize, games_b: usize) -> f64 {
    if games_a == 0 || games_b == 0 {
        return 1.0;
    }
    let (n_a, n_b) = (games_a as f64, games_b as f64);
    let pooled = (wins_a + wins_b) as f64 / (n_a + n_b);
    let variance = pooled * (1.0 - pooled) * (1.0 / n_a + 1.0 / n_b);
    if variance <= 0.0 {
        return 1.0;
    }
    let z = (wins_a as f64 / n_a - wins_b as f64 / n_b) / variance.sqrt();
    let Ok(normal) = Normal::new(0.0, 1.0) else {
        return 1.0;
    };
    (2.0 * (1.0 - normal.cdf(z.abs()))).clamp(0.0, 1.0)
}

#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub baseline: String,
    pub games: usize,
    pub truncated: usize,
    pub turns: DistributionStats,
    pub errors: BTreeMap<String, usize>,
    pub agents: Vec<AgentReport>,
    pub latency_budget_ms: u64,
}

impl AnalyticsSummary {
    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        let mut rows = String::new();
        rows.push_str("# Self-Play Summary\n\n");
        rows.push_str(&format!(
            "Games: {} ({} hit the turn cap)\n\n",
            self.games, self.truncated
        ));
        rows.push_str(&format!(
            "Turns per game: avg {:.1}, p95 {:.0}, max {:.0}\n\n",
            self.turns.avg, self.turns.p95, self.turns.max
        ));
        rows.push_str(&format!(
            "Latency budget: {} ms average per decision\n\n",
            self.latency_budget_ms
        ));
        rows.push_str("| Agent | Kind | Games | Wins | Win % | 95% CI | Δ vs baseline | p-value | Decisions | Avg ms | p95 ms | Max ms | Over Budget |\n");
        rows.push_str("|-------|------|-------|------|-------|--------|----------------|---------|-----------|--------|--------|--------|-------------|\n");

        for agent in &self.agents {
            rows.push_str(&format!(
                "| {name} | {kind:?} | {games} | {wins} | {win:.1}% | [{ci_low:.1}%, {ci_high:.1}%] | {delta:+.1} pp | {pval:.3} | {decisions} | {avg:.2} | {p95:.2} | {max:.2} | {over_budget} |\n",
                name = agent.name,
                kind = agent.kind,
                games = agent.games,
                wins = agent.wins,
                win = agent.win_rate * 100.0,
                ci_low = agent.ci95.0 * 100.0,
                ci_high = agent.ci95.1 * 100.0,
                delta = agent.delta_vs_baseline * 100.0,
                pval = agent.p_value,
                decisions = agent.decisions,
                avg = agent.latency_ms.avg,
                p95 = agent.latency_ms.p95,
                max = agent.latency_ms.max,
                over_budget = if agent.over_budget { "Yes" } else { "No" },
            ));
        }

        if !self.errors.is_empty() {
            rows.push_str("\n## Errors\n\n");
            for (error, count) in &self.errors {
                rows.push_str(&format!("- {count} × {error}\n"));
            }
        }

        fs::write(path.as_ref(), rows).map_err(|e| AnalyticsError::Io {
            context: "writing summary markdown",
            source: e,
        })?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentReport {
    pub name: String,
    pub kind: AgentKind,
    pub params: serde_yaml::Value,
    pub games: usize,
    pub wins: usize,
    pub win_rate: f64,
    pub ci95: (f64, f64),
    pub decisions: usize,
    pub latency_ms: DistributionStats,
    pub delta_vs_baseline: f64,
    pub p_value: f64,
    #[serde(skip)]
    pub over_budget: bool,
}
