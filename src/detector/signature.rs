use std::collections::BTreeMap;

use super::ProtectionDetector;
use crate::model::{AppTarget, DetectionMethod, ObfuscationLevel, Protection, ProtectionProfile};

/// Classifies protections from the indicator strings an app declares.
///
/// Only the declared strings are inspected; this never looks inside an app
/// package.
pub struct SignatureDetector;

/// Keywords of `protection` found in any of the lower-cased indicators.
fn matched_keywords(protection: Protection, indicators: &[String]) -> Vec<&'static str> {
    protection
        .keywords()
        .iter()
        .copied()
        .filter(|kw| indicators.iter().any(|i| i.contains(kw)))
        .collect()
}

/// Confidence grows with the number of distinct keywords matched.
pub fn signature_confidence(hits: usize) -> f64 {
    (0.5 + 0.15 * hits as f64).min(0.99)
}

fn obfuscation_level(indicators: &[String], detected: &[Protection]) -> ObfuscationLevel {
    let mentions = |kw: &str| indicators.iter().any(|i| i.contains(kw));
    if mentions("dexguard") || detected.contains(&Protection::PromonShield) {
        ObfuscationLevel::Advanced
    } else if mentions("obfuscation") {
        ObfuscationLevel::Moderate
    } else if mentions("proguard") {
        ObfuscationLevel::Basic
    } else {
        ObfuscationLevel::None
    }
}

impl ProtectionDetector for SignatureDetector {
    fn name(&self) -> &'static str {
        "signature"
    }

    fn detect(&self, target: &AppTarget) -> ProtectionProfile {
        let indicators: Vec<String> = target.indicators.iter().map(|i| i.to_lowercase()).collect();

        let mut detected = Vec::new();
        let mut confidence = BTreeMap::new();
        let mut features = Vec::new();

        for protection in Protection::ALL {
            let hits = matched_keywords(protection, &indicators);
            if hits.is_empty() {
                continue;
            }
            tracing::debug!(
                package = %target.package,
                protection = protection.display_name(),
                keywords = ?hits,
                "signature match"
            );
            detected.push(protection);
            confidence.insert(protection, signature_confidence(hits.len()));
            features.extend(protection.implied_features().iter().map(|f| f.to_string()));
        }

        let obfuscation = obfuscation_level(&indicators, &detected);

        ProtectionProfile {
            notes: format!(
                "Classified {} from {} declared indicators - {} category",
                target.package,
                indicators.len(),
                target.category().as_str()
            ),
            detected,
            confidence,
            features,
            obfuscation,
            method: DetectionMethod::Signature,
        }
    }
}
