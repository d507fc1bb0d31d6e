use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{FULL_FIELD_SIZE, ROUND_OF_64_SEED_ORDER};
use crate::error::EngineError;
use crate::round::Round;
use crate::team::Team;
use crate::win_prob::WinProbModel;

/// One theoretically possible pairing in a future game.
///
/// `p_matchup` is the probability this exact pairing occurs given
/// everything resolved so far; the conditional win probability comes from
/// the rating model. Ephemeral: feeds the value aggregator, not persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictedMatchup {
    pub game_id: String,
    pub round: Round,
    pub team1: String,
    pub team2: String,
    pub p_matchup: f64,
    pub p_team1_wins: f64,
}

impl PredictedMatchup {
    pub fn p_team2_wins(&self) -> f64 {
        1.0 - self.p_team1_wins
    }
}

#[derive(Clone, Debug)]
struct Entrant {
    id: String,
    rating: f64,
    /// Probability of having advanced into the round being paired.
    p_advance: f64,
}

/// Enumerate every remaining theoretical matchup from a checkpoint.
///
/// At `through_round` 0 the survivors must be the exact full field;
/// play-in pairs are detected as (region, seed) groups of two and their
/// advance probabilities into the main draw come from the model. At a
/// checkpoint of 1 or more the survivors are taken as already resolved
/// through that round, start at probability 1.0, and earlier rounds emit
/// nothing.
///
/// Pairing follows the standard seeded bracket: within each region the
/// round-of-64 slot order, then winners merged pairwise; regions are laid
/// out in sorted order so the final pairs the two bracket halves. The
/// championship therefore only appears when at least four regions are
/// present. Output order is deterministic for identical input.
pub fn generate_matchups(
    survivors: &[Team],
    through_round: u8,
    model: &WinProbModel,
) -> Result<Vec<PredictedMatchup>, EngineError> {
    if through_round == 0 && survivors.len() != FULL_FIELD_SIZE {
        return Err(EngineError::WrongFieldSize {
            expected: FULL_FIELD_SIZE,
            actual: survivors.len(),
        });
    }

    // Region -> seed -> teams, all orders stable.
    let mut regions: BTreeMap<&str, BTreeMap<u8, Vec<&Team>>> = BTreeMap::new();
    for team in survivors {
        regions
            .entry(team.region.as_str())
            .or_default()
            .entry(team.seed)
            .or_default()
            .push(team);
    }
    for seeds in regions.values_mut() {
        for group in seeds.values_mut() {
            group.sort_by(|a, b| a.id.cmp(&b.id));
        }
    }

    let mut matchups = Vec::new();

    // Round-of-64 slot groups in bracket order; play-in pairs collapse
    // into their seed's slot with model-derived advance probabilities.
    let mut groups: Vec<Vec<Entrant>> = Vec::with_capacity(regions.len() * 16);
    let mut playin_games = 0usize;
    for seeds in regions.values() {
        for seed in ROUND_OF_64_SEED_ORDER {
            let teams = seeds.get(&seed).map(Vec::as_slice).unwrap_or(&[]);
            let group = match (through_round, teams) {
                (0, [a, b]) => {
                    let p = model.win_prob(a.rating, b.rating);
                    matchups.push(PredictedMatchup {
                        game_id: format!("r0-g{}", playin_games),
                        round: Round::FirstFour,
                        team1: a.id.clone(),
                        team2: b.id.clone(),
                        p_matchup: 1.0,
                        p_team1_wins: p,
                    });
                    playin_games += 1;
                    vec![entrant(a, p), entrant(b, 1.0 - p)]
                }
                (0, teams) if teams.len() > 2 => {
                    return Err(EngineError::InvalidField(format!(
                        "seed {} appears {} times in one region",
                        seed,
                        teams.len()
                    )));
                }
                (_, teams) => teams.iter().map(|t| entrant(t, 1.0)).collect(),
            };
            groups.push(group);
        }
    }

    let region_count = regions.len();
    for round in Round::MAIN_ROUNDS {
        if groups.len() < 2 {
            break;
        }
        // The final pairs the two bracket halves; with fewer than four
        // regions there are no halves to pair, so the bracket ends at the
        // deepest round it can resolve.
        if round == Round::Championship && region_count < 4 {
            break;
        }
        let emit = round.number() >= through_round;
        let mut merged_level: Vec<Vec<Entrant>> = Vec::with_capacity((groups.len() + 1) / 2);

        for (pair_index, pair) in groups.chunks(2).enumerate() {
            if pair.len() == 1 {
                merged_level.push(pair[0].clone());
                continue;
            }
            let (g1, g2) = (&pair[0], &pair[1]);
            if !emit || g1.is_empty() || g2.is_empty() {
                // Already-decided round, or nobody on one side: just merge
                // the structure, probabilities carry through unchanged.
                let mut merged = g1.clone();
                merged.extend(g2.iter().cloned());
                merged_level.push(merged);
                continue;
            }

            let game_id = format!("r{}-g{}", round.number(), pair_index);
            let mut next1 = vec![0.0; g1.len()];
            let mut next2 = vec![0.0; g2.len()];
            for (i, a) in g1.iter().enumerate() {
                for (j, b) in g2.iter().enumerate() {
                    let p_matchup = a.p_advance * b.p_advance;
                    let p1 = model.win_prob(a.rating, b.rating);
                    matchups.push(PredictedMatchup {
                        game_id: game_id.clone(),
                        round,
                        team1: a.id.clone(),
                        team2: b.id.clone(),
                        p_matchup,
                        p_team1_wins: p1,
                    });
                    next1[i] += p_matchup * p1;
                    next2[j] += p_matchup * (1.0 - p1);
                }
            }

            let mut merged = Vec::with_capacity(g1.len() + g2.len());
            for (a, p) in g1.iter().zip(next1) {
                merged.push(Entrant { p_advance: p, ..a.clone() });
            }
            for (b, p) in g2.iter().zip(next2) {
                merged.push(Entrant { p_advance: p, ..b.clone() });
            }
            merged_level.push(merged);
        }

        groups = merged_level;
    }

    debug!(
        survivors = survivors.len(),
        through_round,
        matchups = matchups.len(),
        "generated predicted matchups"
    );
    Ok(matchups)
}

fn entrant(team: &Team, p_advance: f64) -> Entrant {
    Entrant {
        id: team.id.clone(),
        rating: team.rating,
        p_advance,
    }
}

/// Reference field builders shared by tests across the crate.
#[cfg(test)]
pub(crate) mod test_field {
    use super::*;

    pub const REGIONS: [&str; 4] = ["East", "Midwest", "South", "West"];

    /// Full 68-team field: 16 seeds per region, with seed 16 doubled in
    /// every region to form the four play-in pairs.
    pub fn full_field() -> Vec<Team> {
        let mut teams = Vec::with_capacity(68);
        for (r, region) in REGIONS.iter().enumerate() {
            for seed in 1..=16u8 {
                let rating = 34.0 - 2.0 * seed as f64 - 0.4 * r as f64;
                teams.push(Team::new(
                    format!("{}-{}", region, seed),
                    seed,
                    *region,
                    rating,
                ));
                if seed == 16 {
                    teams.push(Team::new(
                        format!("{}-{}b", region, seed),
                        seed,
                        *region,
                        rating - 1.0,
                    ));
                }
            }
        }
        teams
    }

    /// The 64 survivors after the play-in round, all carrying progress 1.
    pub fn main_draw_field() -> Vec<Team> {
        full_field()
            .into_iter()
            .filter(|team| !team.id.ends_with('b'))
            .map(|team| {
                if team.seed == 16 {
                    team.with_progress(1, 0, false)
                } else {
                    team.with_progress(0, 1, false)
                }
            })
            .collect()
    }
}
