//! Simulated bypass testing.
//!
//! Outcomes are drawn from a success rate derived from the app's category
//! and the difficulty of the test kind. Technique names are reported as
//! labels; nothing is executed against any app.

use rand::seq::index::sample;
use rand::Rng;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::model::{AppTarget, BankCategory, BypassOutcome, BypassTestKind};
use crate::seed::{stream, Stage};

/// Probability that a bypass of average difficulty succeeds.
pub fn base_success_rate(category: BankCategory) -> f64 {
    match category {
        BankCategory::MajorBank => 0.2,
        BankCategory::RegionalBank => 0.4,
        BankCategory::Fintech => 0.7,
    }
}

pub fn success_rate(category: BankCategory, kind: BypassTestKind) -> f64 {
    base_success_rate(category) * kind.difficulty_modifier()
}

pub struct BypassSimulator {
    seed: u64,
    pacing: Duration,
}

impl BypassSimulator {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            pacing: Duration::ZERO,
        }
    }

    /// Waits `pacing` before each simulated test.
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Simulates every test kind against `target`.
    pub async fn run_tests(&self, target: &AppTarget) -> BTreeMap<BypassTestKind, BypassOutcome> {
        tracing::info!(package = %target.package, "running bypass simulations");

        let category = target.category();
        let mut rng = stream(self.seed, &target.package, Stage::Bypass);
        let mut results = BTreeMap::new();

        for kind in BypassTestKind::ALL {
            if !self.pacing.is_zero() {
                tokio::time::sleep(self.pacing).await;
            }
            tracing::debug!(package = %target.package, test = kind.as_str(), "simulating");
            results.insert(kind, simulate_one(&mut rng, category, kind));
        }

        results
    }
}

fn simulate_one<R: Rng>(rng: &mut R, category: BankCategory, kind: BypassTestKind) -> BypassOutcome {
    let rate = success_rate(category, kind);
    let successful = rng.gen::<f64>() < rate;
    let techniques = kind.techniques();

    let successful_techniques = if successful {
        let count = rng.gen_range(1..=techniques.len());
        let mut picked = sample(rng, techniques.len(), count).into_vec();
        picked.sort_unstable();
        picked.into_iter().map(|i| techniques[i].to_string()).collect()
    } else {
        Vec::new()
    };

    BypassOutcome {
        kind,
        name: kind.name().to_string(),
        description: kind.description().to_string(),
        bypass_successful: successful,
        success_rate: rate,
        techniques_tested: techniques.iter().map(|t| t.to_string()).collect(),
        successful_techniques,
        execution_time_secs: rng.gen_range(10.0..45.0),
        notes: kind.notes(successful).to_string(),
    }
}
