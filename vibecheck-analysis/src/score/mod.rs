//! Ship Scorer: weighted category presence subscores aggregated into a
//! 0–100 score and a SHIP/WARN/BLOCK verdict.

use vibecheck_core::errors::ScoreError;
use vibecheck_core::types::score::{ScoreWeights, ShipScore, ShipVerdict};
use vibecheck_core::types::truthpack::Truthpack;

pub struct ShipScorer {
    weights: ScoreWeights,
}

impl ShipScorer {
    /// Construction validates the weight vector (must sum to 1.0).
    pub fn new(weights: ScoreWeights) -> Result<Self, ScoreError> {
        weights.validate()?;
        Ok(Self { weights })
    }

    /// Score a truthpack: a category scores 100 when any signal is
    /// present, 0 otherwise, weighted into the aggregate.
    pub fn score(&self, truthpack: &Truthpack) -> ShipScore {
        let routes = presence(!truthpack.routes.routes.is_empty());
        let env = presence(!truthpack.env.variables.is_empty());
        let auth = presence(!truthpack.auth.rules.is_empty());
        let contracts = presence(
            !truthpack.contracts.endpoints.is_empty() || !truthpack.contracts.types.is_empty(),
        );

        let overall = routes * self.weights.routes
            + env * self.weights.env
            + auth * self.weights.auth
            + contracts * self.weights.contracts;

        let mut diagnostics = Vec::new();
        if routes == 0.0 {
            diagnostics.push("no routes recorded; routing surface is unscored".to_string());
        }
        if env == 0.0 {
            diagnostics.push("no environment variables recorded".to_string());
        }
        if auth == 0.0 {
            diagnostics.push("no auth rules recorded; protection cannot be verified".to_string());
        }
        if contracts == 0.0 {
            diagnostics.push("no contracts recorded".to_string());
        }

        ShipScore {
            overall,
            routes,
            env,
            auth,
            contracts,
            verdict: ShipVerdict::from_score(overall),
            diagnostics,
        }
    }
}

fn presence(present: bool) -> f64 {
    if present {
        100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vibecheck_core::types::truthpack::{AuthRule, EnvVarRecord, RouteRecord};

    fn full_pack() -> Truthpack {
        let mut pack = Truthpack::default();
        pack.routes.routes.push(RouteRecord {
            method: "GET".into(),
            path: "/".into(),
            handler: "h".into(),
            middleware: vec![],
        });
        pack.env.variables.push(EnvVarRecord {
            name: "DB_URL".into(),
            type_tag: Default::default(),
            required: true,
            description: None,
            default: None,
        });
        pack.auth.rules.push(AuthRule {
            path: "/admin".into(),
            requires_auth: true,
            roles: vec![],
        });
        pack.contracts.types.push(
            vibecheck_core::types::truthpack::ContractType {
                name: "User".into(),
                schema: vec!["id".into()],
            },
        );
        pack
    }

    #[test]
    fn invalid_weights_fail_construction() {
        let weights = ScoreWeights {
            routes: 0.9,
            env: 0.9,
            auth: 0.0,
            contracts: 0.0,
        };
        assert!(ShipScorer::new(weights).is_err());
    }

    #[test]
    fn full_presence_ships() {
        let scorer = ShipScorer::new(ScoreWeights::default()).unwrap();
        let score = scorer.score(&full_pack());
        assert_eq!(score.overall, 100.0);
        assert_eq!(score.verdict, ShipVerdict::Ship);
        assert!(score.diagnostics.is_empty());
    }

    #[test]
    fn missing_categories_warn_or_block() {
        let scorer = ShipScorer::new(ScoreWeights::default()).unwrap();

        let mut pack = full_pack();
        pack.contracts.types.clear();
        pack.contracts.endpoints.clear();
        // routes 30 + env 20 + auth 30 = 80 -> SHIP boundary.
        let score = scorer.score(&pack);
        assert_eq!(score.overall, 80.0);
        assert_eq!(score.verdict, ShipVerdict::Ship);
        assert_eq!(score.diagnostics.len(), 1);

        pack.env.variables.clear();
        // 60 -> WARN.
        let score = scorer.score(&pack);
        assert_eq!(score.overall, 60.0);
        assert_eq!(score.verdict, ShipVerdict::Warn);

        pack.auth.rules.clear();
        // 30 -> BLOCK.
        let score = scorer.score(&pack);
        assert_eq!(score.overall, 30.0);
        assert_eq!(score.verdict, ShipVerdict::Block);
    }

    #[test]
    fn empty_truthpack_blocks() {
        let scorer = ShipScorer::new(ScoreWeights::default()).unwrap();
        let score = scorer.score(&Truthpack::default());
        assert_eq!(score.overall, 0.0);
        assert_eq!(score.verdict, ShipVerdict::Block);
        assert_eq!(score.diagnostics.len(), 4);
    }
}
