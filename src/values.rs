use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::prediction::PredictedMatchup;
use crate::round::Round;
use crate::team::{points_for_progress, ScoringRule};

/// Closed-form valuation of one team over the remaining bracket.
///
/// `p_rounds[0]` is the probability of surviving any pre-main-draw
/// play-in (1.0 for teams without one); `p_rounds[k]` for k in 1..=6 is
/// the probability of winning the round numbered k. The vector is clamped
/// to be non-increasing, never re-normalized.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PredictedTeamValue {
    pub team_id: String,
    pub expected_points: f64,
    pub variance: f64,
    pub std_dev: f64,
    pub p_rounds: [f64; Round::COUNT],
}

#[derive(Clone, Copy, Default)]
struct RoundAccumulator {
    p_win: [f64; Round::COUNT],
    seen: [bool; Round::COUNT],
}

/// Aggregate predicted matchups into per-team expected points, variance
/// and the round-survival vector.
///
/// Expected points treat each round's win as a Bernoulli event with the
/// accumulated probability; variance additionally treats the rounds as
/// independent. Rounds are causally dependent in reality, so the variance
/// is an approximation carried over from the source model on purpose.
pub fn generate_tournament_values(
    matchups: &[PredictedMatchup],
    rules: &[ScoringRule],
) -> Vec<PredictedTeamValue> {
    if matchups.is_empty() {
        return Vec::new();
    }

    // Rounds below the first generated one were resolved before the
    // checkpoint: every surviving team passed them with certainty.
    let first_round = matchups
        .iter()
        .map(|m| m.round.number())
        .min()
        .unwrap_or(0) as usize;

    let increments = incremental_points(rules);

    let mut teams: BTreeMap<&str, RoundAccumulator> = BTreeMap::new();
    for matchup in matchups {
        let round = matchup.round.number() as usize;
        let p_win1 = matchup.p_matchup * matchup.p_team1_wins;
        let p_win2 = matchup.p_matchup * matchup.p_team2_wins();

        let acc1 = teams.entry(matchup.team1.as_str()).or_default();
        acc1.p_win[round] += p_win1;
        acc1.seen[round] = true;

        let acc2 = teams.entry(matchup.team2.as_str()).or_default();
        acc2.p_win[round] += p_win2;
        acc2.seen[round] = true;
    }

    teams
        .into_iter()
        .map(|(team_id, acc)| {
            let mut expected = 0.0;
            let mut variance = 0.0;
            for round in 0..Round::COUNT {
                let p = acc.p_win[round];
                let points = increments[round];
                expected += p * points;
                variance += p * (1.0 - p) * points * points;
            }

            let mut p_rounds = [0.0; Round::COUNT];
            for round in 0..Round::COUNT {
                p_rounds[round] = if round < first_round {
                    1.0
                } else if acc.seen[round] {
                    acc.p_win[round]
                } else if round == 0 {
                    // No play-in scheduled for this team.
                    1.0
                } else {
                    0.0
                };
            }
            // Survival cannot rise as rounds progress: clamp down, never
            // scale up.
            for round in 1..Round::COUNT {
                if p_rounds[round] > p_rounds[round - 1] {
                    p_rounds[round] = p_rounds[round - 1];
                }
            }

            PredictedTeamValue {
                team_id: team_id.to_string(),
                expected_points: expected,
                variance,
                std_dev: variance.sqrt(),
                p_rounds,
            }
        })
        .collect()
}

/// Points unlocked by winning each round: the scoring-table delta between
/// the progress levels on either side of it.
pub fn incremental_points(rules: &[ScoringRule]) -> [f64; Round::COUNT] {
    let mut increments = [0.0; Round::COUNT];
    for (round, slot) in increments.iter_mut().enumerate() {
        let progress = round as u32;
        *slot = points_for_progress(rules, progress + 1) - points_for_progress(rules, progress);
    }
    increments
}

/// Deterministic points total of the scheduled bracket: every game pays
/// its round's incremental points to exactly one team, so this is the sum
/// all expected (or simulated) points must conserve.
pub fn scheduled_points_total(matchups: &[PredictedMatchup], rules: &[ScoringRule]) -> f64 {
    let increments = incremental_points(rules);
    let games: BTreeSet<(u8, &str)> = matchups
        .iter()
        .map(|m| (m.round.number(), m.game_id.as_str()))
        .collect();
    games
        .iter()
        .map(|&(round, _)| increments[round as usize])
        .sum()
}
