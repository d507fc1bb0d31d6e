use crate::team::ScoringRule;

/// Default spread parameter for the logistic rating model.
pub const DEFAULT_SIGMA: f64 = 10.0;

/// Large odd stride mixed into the batch seed per simulation id, so every
/// `(seed, sim_id)` pair maps to the same random stream regardless of run
/// order or worker count.
pub const SIM_SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Team count of a full reference field: 64 main-draw slots, with four
/// seed lines doubled up for the play-in round.
pub const FULL_FIELD_SIZE: usize = 68;

/// Seed order for the round of 64 within a region, arranged so adjacent
/// entries play each other and winners merge pairwise up the bracket.
pub const ROUND_OF_64_SEED_ORDER: [u8; 16] =
    [1, 16, 8, 9, 5, 12, 4, 13, 6, 11, 3, 14, 7, 10, 2, 15];

/// Cumulative points unlocked at each progress level under the reference
/// scoring table. A play-in win (progress 1) is worth nothing; each main
/// round doubles the previous one.
pub const DEFAULT_ROUND_POINTS: [f64; 7] = [0.0, 10.0, 20.0, 40.0, 80.0, 160.0, 320.0];

/// Reference scoring rules: one rule per progress level.
pub fn default_scoring_rules() -> Vec<ScoringRule> {
    DEFAULT_ROUND_POINTS
        .iter()
        .enumerate()
        .map(|(i, &points)| ScoringRule {
            win_index: i as u32 + 1,
            points,
        })
        .collect()
}
