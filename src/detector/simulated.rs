use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;

use super::ProtectionDetector;
use crate::model::{
    AppTarget, BankCategory, DetectionMethod, ObfuscationLevel, Protection, ProtectionProfile,
};
use crate::seed::{stream, Stage};

/// Candidate protections for a category and the chance each one is present.
fn pattern(category: BankCategory) -> (&'static [Protection], f64) {
    match category {
        BankCategory::MajorBank => (
            &[
                Protection::PromonShield,
                Protection::RootDetection,
                Protection::SslPinning,
                Protection::AntiDebug,
            ],
            0.8,
        ),
        BankCategory::RegionalBank => (&[Protection::RootDetection, Protection::SslPinning], 0.6),
        BankCategory::Fintech => (&[Protection::RootDetection], 0.4),
    }
}

pub struct SimulatedDetector {
    seed: u64,
}

impl SimulatedDetector {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl ProtectionDetector for SimulatedDetector {
    fn name(&self) -> &'static str {
        "simulated"
    }

    fn detect(&self, target: &AppTarget) -> ProtectionProfile {
        let category = target.category();
        let (candidates, probability) = pattern(category);
        let mut rng = stream(self.seed, &target.package, Stage::Detect);

        let mut detected = Vec::new();
        let mut confidence = BTreeMap::new();
        let mut features = Vec::new();

        for protection in candidates {
            if rng.gen::<f64>() < probability {
                detected.push(*protection);
                confidence.insert(*protection, rng.gen_range(0.7..0.95));
                features.extend(protection.implied_features().iter().map(|f| f.to_string()));
            }
        }

        let obfuscation = *ObfuscationLevel::ALL
            .choose(&mut rng)
            .unwrap_or(&ObfuscationLevel::None);

        tracing::debug!(
            package = %target.package,
            category = category.as_str(),
            detected = detected.len(),
            "simulated protection profile"
        );

        ProtectionProfile {
            detected,
            confidence,
            features,
            obfuscation,
            method: DetectionMethod::Simulated,
            notes: format!("Analyzed {} - {} category", target.package, category.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_roster;

    #[test]
    fn test_detection_stays_within_category_candidates() {
        for seed in 0..20 {
            let detector = SimulatedDetector::new(seed);
            for target in default_roster() {
                let profile = detector.detect(&target);
                let (candidates, _) = pattern(target.category());
                assert!(profile.detected.iter().all(|p| candidates.contains(p)));
                assert_eq!(profile.detected.len(), profile.confidence.len());
                assert_eq!(profile.method, DetectionMethod::Simulated);
            }
        }
    }

    #[test]
    fn test_confidence_range() {
        let detector = SimulatedDetector::new(42);
        for target in default_roster() {
            for score in detector.detect(&target).confidence.values() {
                assert!((0.7..0.95).contains(score), "{}", score);
            }
        }
    }

    #[test]
    fn test_features_follow_detected_protections() {
        let detector = SimulatedDetector::new(8);
        for target in default_roster() {
            let profile = detector.detect(&target);
            let expected: Vec<String> = profile
                .detected
                .iter()
                .flat_map(|p| p.implied_features().iter().map(|f| f.to_string()))
                .collect();
            assert_eq!(profile.features, expected);
        }
    }

    #[test]
    fn test_fintech_never_gets_commercial_vendor() {
        for seed in 0..50 {
            let profile = SimulatedDetector::new(seed)
                .detect(&AppTarget::new("Revolut", "com.revolut.revolut"));
            assert!(!profile.has_commercial_vendor());
        }
    }

    #[test]
    fn test_notes_name_category() {
        let profile =
            SimulatedDetector::new(1).detect(&AppTarget::new("DNB Mobile", "no.dnb.mobilbank"));
        assert_eq!(profile.notes, "Analyzed no.dnb.mobilbank - major_bank category");
    }

    #[test]
    fn test_same_seed_same_profile() {
        let target = AppTarget::new("Sbanken", "no.sbanken.mobilbank");
        assert_eq!(
            SimulatedDetector::new(77).detect(&target),
            SimulatedDetector::new(77).detect(&target)
        );
    }
}
