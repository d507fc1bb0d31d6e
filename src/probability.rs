use std::collections::HashMap;

use crate::team::Team;
use crate::win_prob::WinProbModel;

/// Source of single-game win probabilities for the simulator.
///
/// Implementations must be safe to share across simulation workers. The
/// two provided variants are a static lookup table ([`MatchupOverrides`])
/// and a rating-model-driven source ([`ModelProvider`]); the caller picks
/// one, the engine never inspects which.
pub trait ProbabilityProvider: Sync {
    /// Probability that `team1` beats `team2` in the given game.
    fn p_team1_wins(&self, game_id: &str, team1: &str, team2: &str) -> f64;
}

/// Manual probability table for specific matchups.
///
/// Entries are stored with team ids in lexicographic order. Looking up the
/// swapped pair returns the complement, so `p(B beats A)` is always
/// `1 - p(A beats B)` no matter which orientation was inserted.
#[derive(Clone, Debug, Default)]
pub struct MatchupOverrides {
    entries: HashMap<(String, String, String), f64>,
}

impl MatchupOverrides {
    pub fn new() -> Self {
        MatchupOverrides::default()
    }

    /// Add or update the probability that `team1` beats `team2` in `game_id`.
    pub fn set(&mut self, game_id: &str, team1: &str, team2: &str, prob: f64) {
        let (key, value) = if team1 < team2 {
            (Self::key(game_id, team1, team2), prob)
        } else {
            (Self::key(game_id, team2, team1), 1.0 - prob)
        };
        self.entries.insert(key, value);
    }

    pub fn remove(&mut self, game_id: &str, team1: &str, team2: &str) {
        let key = if team1 < team2 {
            Self::key(game_id, team1, team2)
        } else {
            Self::key(game_id, team2, team1)
        };
        self.entries.remove(&key);
    }

    /// Probability of `team1` beating `team2`, if an entry exists.
    pub fn get(&self, game_id: &str, team1: &str, team2: &str) -> Option<f64> {
        let (key, flip) = if team1 < team2 {
            (Self::key(game_id, team1, team2), false)
        } else {
            (Self::key(game_id, team2, team1), true)
        };
        self.entries
            .get(&key)
            .map(|&p| if flip { 1.0 - p } else { p })
    }

    pub fn contains(&self, game_id: &str, team1: &str, team2: &str) -> bool {
        self.get(game_id, team1, team2).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn key(game_id: &str, first: &str, second: &str) -> (String, String, String) {
        (game_id.to_string(), first.to_string(), second.to_string())
    }
}

impl ProbabilityProvider for MatchupOverrides {
    /// Pure table lookup. A missing matchup is a data inconsistency, not a
    /// fatal error: it degrades to a coin flip.
    fn p_team1_wins(&self, game_id: &str, team1: &str, team2: &str) -> f64 {
        self.get(game_id, team1, team2).unwrap_or(0.5)
    }
}

/// Rating-model-driven probability source with optional per-matchup
/// overrides consulted first.
#[derive(Clone, Debug)]
pub struct ModelProvider {
    ratings: HashMap<String, f64>,
    model: WinProbModel,
    overrides: Option<MatchupOverrides>,
}

impl ModelProvider {
    pub fn new(ratings: HashMap<String, f64>, model: WinProbModel) -> Self {
        ModelProvider {
            ratings,
            model,
            overrides: None,
        }
    }

    pub fn from_teams(teams: &[Team], model: WinProbModel) -> Self {
        let ratings = teams
            .iter()
            .map(|team| (team.id.clone(), team.rating))
            .collect();
        Self::new(ratings, model)
    }

    pub fn with_overrides(mut self, overrides: MatchupOverrides) -> Self {
        self.overrides = Some(overrides);
        self
    }

    /// Rating lookup with graceful degradation: an unknown team plays at
    /// rating zero.
    fn rating(&self, team_id: &str) -> f64 {
        self.ratings.get(team_id).copied().unwrap_or(0.0)
    }
}

impl ProbabilityProvider for ModelProvider {
    fn p_team1_wins(&self, game_id: &str, team1: &str, team2: &str) -> f64 {
        if let Some(overrides) = &self.overrides {
            if let Some(prob) = overrides.get(game_id, team1, team2) {
                return prob;
            }
        }
        self.model.win_prob(self.rating(team1), self.rating(team2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_complement_on_swap() {
        let mut overrides = MatchupOverrides::new();
        overrides.set("g1", "duke", "unc", 0.75);

        assert_eq!(overrides.get("g1", "duke", "unc"), Some(0.75));
        assert_eq!(overrides.get("g1", "unc", "duke"), Some(0.25));
        assert!(overrides.get("g2", "duke", "unc").is_none());
    }

    #[test]
    fn test_override_insert_in_either_orientation() {
        let mut overrides = MatchupOverrides::new();
        // "unc" > "duke", so this is stored flipped internally.
        overrides.set("g1", "unc", "duke", 0.6);
        assert_eq!(overrides.get("g1", "unc", "duke"), Some(0.6));
        assert_eq!(overrides.get("g1", "duke", "unc"), Some(0.4));
    }

    #[test]
    fn test_override_contains_and_remove() {
        let mut overrides = MatchupOverrides::new();
        assert!(overrides.is_empty());

        overrides.set("g1", "duke", "unc", 0.75);
        assert_eq!(overrides.len(), 1);
        // Orientation does not matter for membership either.
        assert!(overrides.contains("g1", "duke", "unc"));
        assert!(overrides.contains("g1", "unc", "duke"));
        assert!(!overrides.contains("g2", "duke", "unc"));

        overrides.remove("g1", "unc", "duke");
        assert!(!overrides.contains("g1", "duke", "unc"));
        assert!(overrides.is_empty());
    }

    #[test]
    fn test_table_provider_coin_flips_missing_matchups() {
        let overrides = MatchupOverrides::new();
        assert_eq!(overrides.p_team1_wins("g1", "a", "b"), 0.5);
    }

    #[test]
    fn test_model_provider_prefers_override() {
        let teams = vec![
            Team::new("duke", 1, "East", 30.0),
            Team::new("wagner", 16, "East", -10.0),
        ];
        let mut overrides = MatchupOverrides::new();
        overrides.set("g1", "duke", "wagner", 0.5);

        let provider = ModelProvider::from_teams(&teams, WinProbModel::default())
            .with_overrides(overrides);

        assert_eq!(provider.p_team1_wins("g1", "duke", "wagner"), 0.5);
        // No override for this game: the model takes over.
        assert!(provider.p_team1_wins("g2", "duke", "wagner") > 0.9);
    }

    #[test]
    fn test_model_provider_unknown_team_plays_at_zero() {
        let teams = vec![Team::new("duke", 1, "East", 0.0)];
        let provider = ModelProvider::from_teams(&teams, WinProbModel::default());
        assert_eq!(provider.p_team1_wins("g1", "duke", "ghost"), 0.5);
    }
}
