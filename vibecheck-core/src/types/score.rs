//! Ship Score: weighted 0–100 aggregate mapped to SHIP/WARN/BLOCK.

use serde::{Deserialize, Serialize};

use crate::errors::ScoreError;

/// Final verdict thresholds: `SHIP ≥ 80, WARN ≥ 60, else BLOCK`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShipVerdict {
    Ship,
    Warn,
    Block,
}

impl ShipVerdict {
    /// Map an overall score to a verdict.
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            ShipVerdict::Ship
        } else if score >= 60.0 {
            ShipVerdict::Warn
        } else {
            ShipVerdict::Block
        }
    }
}

impl std::fmt::Display for ShipVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ShipVerdict::Ship => "SHIP",
            ShipVerdict::Warn => "WARN",
            ShipVerdict::Block => "BLOCK",
        };
        f.write_str(s)
    }
}

/// Category weights. Must sum to 1.0; validated at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub routes: f64,
    pub env: f64,
    pub auth: f64,
    pub contracts: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            routes: 0.30,
            env: 0.20,
            auth: 0.30,
            contracts: 0.20,
        }
    }
}

impl ScoreWeights {
    /// Reject weight vectors that do not sum to 1.0 (within 1e-6) or carry
    /// negative components.
    pub fn validate(&self) -> Result<(), ScoreError> {
        let components = [self.routes, self.env, self.auth, self.contracts];
        if components.iter().any(|w| *w < 0.0) {
            return Err(ScoreError::InvalidWeights {
                sum: components.iter().sum(),
            });
        }
        let sum: f64 = components.iter().sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(ScoreError::InvalidWeights { sum });
        }
        Ok(())
    }
}

/// Per-category subscores (0 or 100) plus the weighted aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipScore {
    pub overall: f64,
    pub routes: f64,
    pub env: f64,
    pub auth: f64,
    pub contracts: f64,
    pub verdict: ShipVerdict,
    pub diagnostics: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_validate() {
        assert!(ScoreWeights::default().validate().is_ok());
    }

    #[test]
    fn bad_weight_sums_are_rejected() {
        let weights = ScoreWeights {
            routes: 0.5,
            env: 0.5,
            auth: 0.5,
            contracts: 0.0,
        };
        assert!(weights.validate().is_err());
    }

    #[test]
    fn verdict_thresholds() {
        assert_eq!(ShipVerdict::from_score(100.0), ShipVerdict::Ship);
        assert_eq!(ShipVerdict::from_score(80.0), ShipVerdict::Ship);
        assert_eq!(ShipVerdict::from_score(79.9), ShipVerdict::Warn);
        assert_eq!(ShipVerdict::from_score(60.0), ShipVerdict::Warn);
        assert_eq!(ShipVerdict::from_score(59.9), ShipVerdict::Block);
    }
}
