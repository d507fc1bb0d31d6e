use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_SIGMA;
use crate::error::EngineError;

/// Kind tag of the supported rating model.
pub const LOG_ODDS_KIND: &str = "log_odds";

/// Win probability model configuration as supplied by the caller.
///
/// An empty kind and a non-positive sigma are normalized to the defaults;
/// anything else unsupported is rejected on validation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelConfig {
    pub kind: String,
    pub sigma: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            kind: LOG_ODDS_KIND.to_string(),
            sigma: DEFAULT_SIGMA,
        }
    }
}

impl ModelConfig {
    /// Fill unset fields with defaults: empty kind becomes the supported
    /// kind, a non-positive or non-finite sigma becomes 10.0.
    pub fn normalized(&self) -> ModelConfig {
        let kind = if self.kind.trim().is_empty() {
            LOG_ODDS_KIND.to_string()
        } else {
            self.kind.clone()
        };
        let sigma = if self.sigma.is_finite() && self.sigma > 0.0 {
            self.sigma
        } else {
            DEFAULT_SIGMA
        };
        ModelConfig { kind, sigma }
    }

    /// Reject unsupported kinds and non-positive spread parameters.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.kind != LOG_ODDS_KIND {
            return Err(EngineError::UnsupportedModelKind(self.kind.clone()));
        }
        if !self.sigma.is_finite() || self.sigma <= 0.0 {
            return Err(EngineError::InvalidSigma(self.sigma));
        }
        Ok(())
    }
}

/// Logistic win probability model over rating differences.
#[derive(Clone, Copy, Debug)]
pub struct WinProbModel {
    sigma: f64,
}

impl WinProbModel {
    /// Build a model from a caller configuration, normalizing unset fields
    /// first and rejecting what cannot be defaulted.
    pub fn new(config: &ModelConfig) -> Result<Self, EngineError> {
        let config = config.normalized();
        config.validate()?;
        Ok(WinProbModel { sigma: config.sigma })
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Probability that the team rated `rating_a` beats the team rated
    /// `rating_b` in one game. Equal ratings give exactly 0.5; the result
    /// is finite and in (0, 1) for rating gaps of magnitude 1000 and more.
    pub fn win_prob(&self, rating_a: f64, rating_b: f64) -> f64 {
        stable_sigmoid((rating_a - rating_b) / self.sigma)
    }
}

impl Default for WinProbModel {
    fn default() -> Self {
        WinProbModel { sigma: DEFAULT_SIGMA }
    }
}

/// Logistic sigmoid computed branch-wise so `exp` never overflows: the
/// exponent argument is non-positive on both branches.
fn stable_sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}
