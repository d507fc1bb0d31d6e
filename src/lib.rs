//! Calcutta Core - tournament simulation and valuation engine.
//!
//! This library predicts and simulates single-elimination tournament
//! outcomes and converts them into per-participant valuations under
//! proportional fractional ownership. It provides a Monte Carlo bracket
//! simulator, a closed-form expected-value generator that can start from
//! any partial-bracket checkpoint, and a proportional-ownership scoring
//! and ranking layer. All inputs and outputs are in-memory structures;
//! persistence and transport belong to the caller.

pub mod bracket;
pub mod constants;
pub mod error;
pub mod ownership;
pub mod prediction;
pub mod probability;
pub mod projection;
pub mod round;
pub mod simulation;
pub mod team;
pub mod values;
pub mod win_prob;

pub use bracket::{BracketGame, SlotLink, Topology};
pub use constants::{default_scoring_rules, DEFAULT_SIGMA, FULL_FIELD_SIZE};
pub use error::EngineError;
pub use ownership::{
    aggregate_performance, score_simulation, score_simulations, Entry, EntryPerformance,
    SimulationOutcome,
};
pub use prediction::{generate_matchups, PredictedMatchup};
pub use probability::{MatchupOverrides, ModelProvider, ProbabilityProvider};
pub use projection::{favorites_bracket, projected_team_ev};
pub use round::Round;
pub use simulation::{simulate, SimulationConfig, TournamentSimulationRow};
pub use team::{points_for_progress, ScoringRule, Team};
pub use values::{generate_tournament_values, PredictedTeamValue};
pub use win_prob::{ModelConfig, WinProbModel};
