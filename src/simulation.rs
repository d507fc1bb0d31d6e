use std::collections::HashMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bracket::Topology;
use crate::constants::SIM_SEED_STRIDE;
use crate::error::EngineError;
use crate::probability::ProbabilityProvider;
use crate::team::Team;

/// Outcome of one playthrough for one team.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TournamentSimulationRow {
    pub sim_id: u64,
    pub team_id: String,
    pub wins: u32,
    pub byes: u32,
    pub eliminated: bool,
}

#[derive(Clone, Copy, Debug)]
pub struct SimulationConfig {
    pub n_sims: usize,
    pub seed: u64,
    /// Upper bound on simulation workers; 0 selects the pool default.
    pub workers: usize,
}

impl SimulationConfig {
    pub fn new(n_sims: usize, seed: u64) -> Self {
        SimulationConfig {
            n_sims,
            seed,
            workers: 0,
        }
    }
}

/// Run `n_sims` independent randomized playthroughs of the bracket.
///
/// Every simulation id derives its own deterministic random stream from
/// `seed + sim_id * SIM_SEED_STRIDE`, so identical `(seed, sim_id)` pairs
/// reproduce identical results regardless of worker count or run order.
/// Workers write into disjoint per-simulation row ranges of one
/// preallocated buffer; the first worker error aborts the whole batch.
///
/// The output contains one row per roster team per simulation. Teams with
/// no scheduled game keep their baseline wins/byes; teams in the topology
/// get a baseline bye iff their earliest appearance is after the play-in
/// round.
pub fn simulate<P>(
    topology: &Topology,
    teams: &[Team],
    provider: &P,
    config: &SimulationConfig,
) -> Result<Vec<TournamentSimulationRow>, EngineError>
where
    P: ProbabilityProvider + ?Sized,
{
    if config.n_sims == 0 {
        return Err(EngineError::InvalidSimulationCount(0));
    }
    if teams.is_empty() {
        return Ok(Vec::new());
    }

    debug!(
        n_sims = config.n_sims,
        workers = config.workers,
        games = topology.len(),
        teams = teams.len(),
        "running simulation batch"
    );

    let roster_index: HashMap<&str, usize> = teams
        .iter()
        .enumerate()
        .map(|(i, team)| (team.id.as_str(), i))
        .collect();

    let scheduled: std::collections::HashSet<String> =
        topology.team_ids().into_iter().collect();

    // Baseline rows shared by every simulation.
    let baseline: Vec<TournamentSimulationRow> = teams
        .iter()
        .map(|team| TournamentSimulationRow {
            sim_id: 0,
            team_id: team.id.clone(),
            wins: team.wins,
            byes: if scheduled.contains(&team.id) {
                topology.baseline_byes(&team.id)
            } else {
                team.byes
            },
            eliminated: team.eliminated,
        })
        .collect();

    // Static occupants by storage position, resolved once.
    let initial_occupants: Vec<[Option<&str>; 2]> = (0..topology.len())
        .map(|p| {
            let game = topology.game_at(p);
            [game.team1.as_deref(), game.team2.as_deref()]
        })
        .collect();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers)
        .build()
        .map_err(|e| EngineError::WorkerPool(e.to_string()))?;

    let team_count = teams.len();
    let mut rows = vec![TournamentSimulationRow::default(); config.n_sims * team_count];

    pool.install(|| {
        rows.par_chunks_mut(team_count)
            .enumerate()
            .try_for_each(|(sim_id, chunk)| {
                simulate_one(
                    sim_id as u64,
                    topology,
                    provider,
                    config.seed,
                    &baseline,
                    &initial_occupants,
                    &roster_index,
                    chunk,
                )
            })
    })?;

    debug!(rows = rows.len(), "simulation batch complete");
    Ok(rows)
}

/// One complete playthrough. Games run in fixed traversal order; a game
/// with an unresolved occupant is skipped, which is how partial and
/// checkpointed topologies fall through.
#[allow(clippy::too_many_arguments)]
fn simulate_one<P>(
    sim_id: u64,
    topology: &Topology,
    provider: &P,
    seed: u64,
    baseline: &[TournamentSimulationRow],
    initial_occupants: &[[Option<&str>; 2]],
    roster_index: &HashMap<&str, usize>,
    out: &mut [TournamentSimulationRow],
) -> Result<(), EngineError>
where
    P: ProbabilityProvider + ?Sized,
{
    let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(sim_id.wrapping_mul(SIM_SEED_STRIDE)));

    out.clone_from_slice(baseline);
    for row in out.iter_mut() {
        row.sim_id = sim_id;
    }

    let mut occupants = initial_occupants.to_vec();

    for game in topology.games_in_order() {
        let position = match topology.position(&game.id) {
            Some(p) => p,
            None => continue,
        };
        let (team1, team2) = match occupants[position] {
            [Some(t1), Some(t2)] => (t1, t2),
            _ => continue,
        };

        let prob = provider.p_team1_wins(&game.id, team1, team2);
        let draw: f64 = rng.gen();
        let (winner, loser) = if draw < prob {
            (team1, team2)
        } else {
            (team2, team1)
        };

        if let Some(&i) = roster_index.get(winner) {
            out[i].wins += 1;
        }
        if let Some(&i) = roster_index.get(loser) {
            out[i].eliminated = true;
        }

        if let Some(link) = &game.next {
            if let Some(target) = topology.position(&link.game_id) {
                occupants[target][(link.slot - 1) as usize] = Some(winner);
            }
        }
    }

    Ok(())
}
