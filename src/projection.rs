use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::prediction::PredictedMatchup;
use crate::round::Round;
use crate::team::{points_for_progress, ScoringRule, Team};
use crate::values::{incremental_points, PredictedTeamValue};

/// Resolve the remaining bracket deterministically: in each game take the
/// most probable pairing still alive and advance whichever side the model
/// favors (ties go to team1). Returns each team's count of future wins
/// earned this way; teams that win nothing are absent.
pub fn favorites_bracket(matchups: &[PredictedMatchup]) -> HashMap<String, u32> {
    let mut games: BTreeMap<(u8, &str), Vec<&PredictedMatchup>> = BTreeMap::new();
    for matchup in matchups {
        games
            .entry((matchup.round.number(), matchup.game_id.as_str()))
            .or_default()
            .push(matchup);
    }

    let mut alive: BTreeSet<&str> = matchups
        .iter()
        .flat_map(|m| [m.team1.as_str(), m.team2.as_str()])
        .collect();
    let mut wins: HashMap<String, u32> = HashMap::new();

    for pairings in games.values() {
        let mut best: Option<&PredictedMatchup> = None;
        for &matchup in pairings {
            if !alive.contains(matchup.team1.as_str()) || !alive.contains(matchup.team2.as_str()) {
                continue;
            }
            // Strictly greater keeps the earliest pairing on ties.
            if best.map_or(true, |b| matchup.p_matchup > b.p_matchup) {
                best = Some(matchup);
            }
        }
        let Some(game) = best else { continue };

        let (winner, loser) = if game.p_team1_wins >= 0.5 {
            (game.team1.as_str(), game.team2.as_str())
        } else {
            (game.team2.as_str(), game.team1.as_str())
        };
        alive.remove(loser);
        *wins.entry(winner.to_string()).or_insert(0) += 1;
    }

    wins
}

/// Blend actual progress with predicted probabilities into one projected
/// expected value for a team.
///
/// An eliminated team is worth exactly what it earned. A team yet to play
/// is worth its full prediction. A survivor is worth its earned points
/// plus the probability-weighted points of every remaining round; when
/// the prediction was generated pre-tournament (checkpoint 0) the tail
/// probabilities are conditioned on having reached the current progress,
/// and a non-positive survival probability falls back to earned points.
pub fn projected_team_ev(
    team: &Team,
    value: &PredictedTeamValue,
    rules: &[ScoringRule],
    through_round: u8,
) -> f64 {
    let progress = team.progress() as usize;
    let actual = points_for_progress(rules, team.progress());

    if team.eliminated {
        return actual;
    }
    if progress == 0 {
        return value.expected_points;
    }
    if progress >= Round::COUNT {
        // Already champion: nothing left to project.
        return actual;
    }

    let divisor = if through_round == 0 {
        let p_alive = value.p_rounds[progress - 1];
        if p_alive <= 0.0 {
            return actual;
        }
        p_alive
    } else {
        1.0
    };

    let increments = incremental_points(rules);
    let mut tail = 0.0;
    for reach in (progress + 1)..=Round::COUNT {
        // p_rounds[reach - 1] is the probability of reaching progress
        // `reach`; the matching increment is the points that step unlocks.
        tail += (value.p_rounds[reach - 1] / divisor) * increments[reach - 1];
    }

    actual + tail
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::default_scoring_rules;
    use crate::prediction::test_field::{full_field, main_draw_field};
    use crate::prediction::generate_matchups;
    use crate::values::{generate_tournament_values, scheduled_points_total};
    use crate::win_prob::WinProbModel;

    #[test]
    fn test_favorites_resolve_full_bracket() {
        let matchups =
            generate_matchups(&main_draw_field(), 1, &WinProbModel::default()).unwrap();
        let wins = favorites_bracket(&matchups);

        // 63 games in a 64-team bracket, one win each.
        let total: u32 = wins.values().sum();
        assert_eq!(total, 63);
        // Someone won all six rounds.
        assert_eq!(wins.values().max(), Some(&6));
    }

    #[test]
    fn test_favorites_points_conserve_the_scheduled_total() {
        let rules = default_scoring_rules();
        let matchups =
            generate_matchups(&main_draw_field(), 1, &WinProbModel::default()).unwrap();
        let increments = incremental_points(&rules);

        let mut total = 0.0;
        for (_team, future_wins) in favorites_bracket(&matchups) {
            // Every survivor enters at progress 1.
            let start = 1;
            for step in 0..future_wins as usize {
                total += increments[start + step];
            }
        }
        let scheduled = scheduled_points_total(&matchups, &rules);
        assert!((total - scheduled).abs() < 1e-9, "{} vs {}", total, scheduled);
    }

    #[test]
    fn test_favorites_prefer_higher_rated_team() {
        let matchups =
            generate_matchups(&main_draw_field(), 1, &WinProbModel::default()).unwrap();
        let wins = favorites_bracket(&matchups);
        // In the reference field East-1 is the strongest team overall.
        assert_eq!(wins.get("East-1"), Some(&6));
    }

    fn values_for(survivors: &[Team], through_round: u8) -> Vec<PredictedTeamValue> {
        let matchups =
            generate_matchups(survivors, through_round, &WinProbModel::default()).unwrap();
        generate_tournament_values(&matchups, &default_scoring_rules())
    }

    fn value_of<'a>(values: &'a [PredictedTeamValue], id: &str) -> &'a PredictedTeamValue {
        values.iter().find(|v| v.team_id == id).unwrap()
    }

    #[test]
    fn test_eliminated_team_is_worth_its_actual_points() {
        let rules = default_scoring_rules();
        let field = full_field();
        let values = values_for(&field, 0);

        let fallen = Team::new("East-1", 1, "East", 32.0).with_progress(2, 1, true);
        let ev = projected_team_ev(&fallen, value_of(&values, "East-1"), &rules, 0);
        assert_eq!(ev, points_for_progress(&rules, 3));
    }

    #[test]
    fn test_zero_progress_uses_full_prediction() {
        let rules = default_scoring_rules();
        let field = full_field();
        let values = values_for(&field, 0);

        let fresh = field.iter().find(|t| t.id == "East-1").unwrap();
        let value = value_of(&values, "East-1");
        assert_eq!(projected_team_ev(fresh, value, &rules, 0), value.expected_points);
    }

    #[test]
    fn test_survivor_conditions_on_own_survival_at_checkpoint_zero() {
        let rules = default_scoring_rules();
        let values = values_for(&full_field(), 0);

        // A play-in team that made the main draw: its pre-tournament tail
        // must be scaled up by its play-in survival probability.
        let survivor = Team::new("East-16", 16, "East", 2.0).with_progress(1, 0, false);
        let value = value_of(&values, "East-16");
        let ev = projected_team_ev(&survivor, value, &rules, 0);

        let unconditional: f64 = (2..=7)
            .map(|reach| value.p_rounds[reach - 1] * incremental_points(&rules)[reach - 1])
            .sum();
        let expected = unconditional / value.p_rounds[0];
        assert!((ev - expected).abs() < 1e-9);
        assert!(ev > unconditional);
    }

    #[test]
    fn test_checkpoint_predictions_are_not_rescaled() {
        let rules = default_scoring_rules();
        let survivors = main_draw_field();
        let values = values_for(&survivors, 1);

        let team = survivors.iter().find(|t| t.id == "East-1").unwrap();
        let value = value_of(&values, "East-1");
        let ev = projected_team_ev(team, value, &rules, 1);

        let tail: f64 = (2..=7)
            .map(|reach| value.p_rounds[reach - 1] * incremental_points(&rules)[reach - 1])
            .sum();
        // Progress 1 earns nothing under the reference rules.
        assert!((ev - tail).abs() < 1e-9);
    }

    #[test]
    fn test_zero_survival_probability_falls_back_to_actual() {
        let rules = default_scoring_rules();
        let team = Team::new("ghost", 12, "South", 0.0).with_progress(1, 1, false);
        let value = PredictedTeamValue {
            team_id: "ghost".to_string(),
            expected_points: 400.0,
            variance: 0.0,
            std_dev: 0.0,
            p_rounds: [0.0; Round::COUNT],
        };
        let ev = projected_team_ev(&team, &value, &rules, 0);
        assert_eq!(ev, points_for_progress(&rules, 2));
        assert!(ev.is_finite());
    }
}
