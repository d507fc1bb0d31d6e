use serde::{Deserialize, Serialize};

/// Tournament team with a single strength rating and its current progress
/// through the bracket.
///
/// Ratings are relative: only differences between two teams' ratings feed
/// the win probability model.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    /// Bracket seed, 1 through 16.
    pub seed: u8,
    pub region: String,
    /// Strength rating, higher is stronger.
    pub rating: f64,
    pub wins: u32,
    /// Non-competitive advancements, e.g. skipping the play-in round.
    pub byes: u32,
    pub eliminated: bool,
}

impl Team {
    pub fn new(id: impl Into<String>, seed: u8, region: impl Into<String>, rating: f64) -> Self {
        Team {
            id: id.into(),
            seed,
            region: region.into(),
            rating,
            wins: 0,
            byes: 0,
            eliminated: false,
        }
    }

    pub fn with_progress(mut self, wins: u32, byes: u32, eliminated: bool) -> Self {
        self.wins = wins;
        self.byes = byes;
        self.eliminated = eliminated;
        self
    }

    /// How far the team has advanced: wins plus byes.
    pub fn progress(&self) -> u32 {
        self.wins + self.byes
    }

    /// A team is alive at a checkpoint round iff it has advanced at least
    /// that far and has not been knocked out.
    pub fn is_alive(&self, checkpoint: u8) -> bool {
        !self.eliminated && self.progress() >= checkpoint as u32
    }
}

/// One cumulative scoring step: `points` are unlocked once a team's
/// progress reaches `win_index`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoringRule {
    pub win_index: u32,
    pub points: f64,
}

/// Total points for a team at the given progress: the sum of every rule
/// whose `win_index` has been reached. Rule order is irrelevant; zero
/// progress is worth zero.
pub fn points_for_progress(rules: &[ScoringRule], progress: u32) -> f64 {
    if progress == 0 {
        return 0.0;
    }
    rules
        .iter()
        .filter(|rule| rule.win_index >= 1 && rule.win_index <= progress)
        .map(|rule| rule.points)
        .sum()
}
