use std::collections::{BTreeMap, HashMap};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::debug;

use crate::error::EngineError;
use crate::simulation::TournamentSimulationRow;
use crate::team::{points_for_progress, ScoringRule};

/// A participant and its bids on teams. An entry owns a share of each
/// team it bid on, proportional to its bid against the total bids placed
/// on that team.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    pub bids: HashMap<String, f64>,
}

impl Entry {
    pub fn new(name: impl Into<String>) -> Self {
        Entry {
            name: name.into(),
            bids: HashMap::new(),
        }
    }

    pub fn with_bid(mut self, team_id: impl Into<String>, points: f64) -> Self {
        self.bids.insert(team_id.into(), points);
        self
    }
}

/// One entry's result in one simulated tournament.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationOutcome {
    pub sim_id: u64,
    pub entry: String,
    pub points: f64,
    /// 1-based position, ties broken by ascending entry name.
    pub rank: usize,
    pub payout: f64,
    /// Payout divided by the first-place payout; 0 when first place pays 0.
    pub normalized_payout: f64,
}

/// Aggregate performance of one entry over many simulations.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EntryPerformance {
    pub entry: String,
    pub mean_normalized_payout: f64,
    pub median_normalized_payout: f64,
    /// Fraction of simulations with normalized payout of at least 1.0.
    pub p_top_one: f64,
    /// Fraction of simulations with any payout at all.
    pub p_in_the_money: f64,
    pub samples: usize,
}

/// Total bids placed on each team across all entries.
pub fn total_bids(entries: &[Entry]) -> HashMap<String, f64> {
    let mut totals: HashMap<String, f64> = HashMap::new();
    for entry in entries {
        for (team, bid) in &entry.bids {
            *totals.entry(team.clone()).or_insert(0.0) += bid;
        }
    }
    totals
}

/// Score one simulated tournament for every entry.
///
/// Each entry collects its proportional share of every team it bid on. A
/// team nobody bid on contributes to nobody: its points leak out of the
/// pool on purpose. Callers wanting zero-sum closure inject a synthetic
/// house entry owning all unclaimed teams.
///
/// Ranks are assigned by descending points with ties broken by ascending
/// entry name; payouts come from the position table (absent position pays
/// nothing).
pub fn score_simulation(
    sim_id: u64,
    entries: &[Entry],
    team_points: &HashMap<String, f64>,
    payout_table: &[f64],
    first_place_payout: f64,
) -> Vec<SimulationOutcome> {
    let totals = total_bids(entries);

    let mut scored: Vec<(String, f64)> = entries
        .iter()
        .map(|entry| {
            let points = entry
                .bids
                .iter()
                .filter_map(|(team, bid)| {
                    let total = totals.get(team).copied().unwrap_or(0.0);
                    if total <= 0.0 {
                        return None;
                    }
                    let team_score = team_points.get(team).copied().unwrap_or(0.0);
                    Some(team_score * bid / total)
                })
                .sum();
            (entry.name.clone(), points)
        })
        .collect();

    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });

    scored
        .into_iter()
        .enumerate()
        .map(|(i, (entry, points))| {
            let rank = i + 1;
            let payout = payout_table.get(i).copied().unwrap_or(0.0);
            let normalized_payout = if first_place_payout > 0.0 {
                payout / first_place_payout
            } else {
                0.0
            };
            SimulationOutcome {
                sim_id,
                entry,
                points,
                rank,
                payout,
                normalized_payout,
            }
        })
        .collect()
}

/// Score every simulation in a batch of simulation rows.
///
/// Team points per simulation come from the scoring table applied to each
/// row's progress. Simulations fan out across a bounded worker pool; the
/// ordered parallel collect keeps output deterministic, ascending by
/// simulation id and rank within each.
pub fn score_simulations(
    rows: &[TournamentSimulationRow],
    entries: &[Entry],
    rules: &[ScoringRule],
    payout_table: &[f64],
    first_place_payout: f64,
    workers: usize,
) -> Result<Vec<SimulationOutcome>, EngineError> {
    let mut by_sim: BTreeMap<u64, HashMap<String, f64>> = BTreeMap::new();
    for row in rows {
        let points = points_for_progress(rules, row.wins + row.byes);
        by_sim
            .entry(row.sim_id)
            .or_default()
            .insert(row.team_id.clone(), points);
    }

    debug!(
        simulations = by_sim.len(),
        entries = entries.len(),
        workers,
        "scoring simulation batch"
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| EngineError::WorkerPool(e.to_string()))?;

    let sims: Vec<(&u64, &HashMap<String, f64>)> = by_sim.iter().collect();
    let per_sim: Vec<Vec<SimulationOutcome>> = pool.install(|| {
        sims.par_iter()
            .map(|&(sim_id, team_points)| {
                score_simulation(*sim_id, entries, team_points, payout_table, first_place_payout)
            })
            .collect()
    });

    Ok(per_sim.into_iter().flatten().collect())
}

/// Aggregate per-entry statistics over a batch of outcomes.
///
/// The median is the single middle element of the sorted sample; even
/// samples take the upper of the two middles, matching the source model.
pub fn aggregate_performance(outcomes: &[SimulationOutcome]) -> Vec<EntryPerformance> {
    let mut samples: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for outcome in outcomes {
        samples
            .entry(outcome.entry.as_str())
            .or_default()
            .push(outcome.normalized_payout);
    }

    samples
        .into_iter()
        .map(|(entry, mut normalized)| {
            normalized.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            let count = normalized.len();
            let mean = normalized.iter().mean();
            let median = normalized[count / 2];
            let top_one = normalized.iter().filter(|&&n| n >= 1.0).count();
            let in_the_money = normalized.iter().filter(|&&n| n > 0.0).count();
            EntryPerformance {
                entry: entry.to_string(),
                mean_normalized_payout: mean,
                median_normalized_payout: median,
                p_top_one: top_one as f64 / count as f64,
                p_in_the_money: in_the_money as f64 / count as f64,
                samples: count,
            }
        })
        .collect()
}
