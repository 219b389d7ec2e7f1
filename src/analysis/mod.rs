//! Effectiveness analysis across all assessed apps.
//!
//! [`analyze`] folds a list of [`AppAssessment`]s into an
//! [`AnalysisReport`]: headline summary, per-protection and per-test
//! statistics, a category breakdown, recommendations, and the competitive
//! [`market`] view.

pub mod market;

use chrono::Utc;
use std::collections::BTreeMap;

use crate::model::{
    AnalysisReport, AppAssessment, BankCategory, BypassStats, BypassTestKind, CategoryAnalysis,
    CategoryApp, Priority, Protection, ProtectionStats, Recommendation, Summary,
};

/// Apps whose bypass rate is above this are flagged as vulnerable.
pub const VULNERABLE_BYPASS_RATE: f64 = 0.7;

/// Share of apps allowed to lack root detection before it is flagged.
pub const MISSING_ROOT_DETECTION_SHARE: f64 = 0.3;

/// Number of protections that counts as strong coverage.
pub const STRONG_PROTECTION_COUNT: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("no app assessments to analyze")]
    NoAssessments,
}

/// Builds the full report for `assessments`.
///
/// # Errors
///
/// Returns [`AnalysisError::NoAssessments`] for an empty input.
pub fn analyze(
    assessments: Vec<AppAssessment>,
    seed: u64,
    focus_vendor: Protection,
) -> Result<AnalysisReport, AnalysisError> {
    if assessments.is_empty() {
        tracing::warn!("no results to analyze");
        return Err(AnalysisError::NoAssessments);
    }
    tracing::info!(apps = assessments.len(), "analyzing effectiveness");

    Ok(AnalysisReport {
        summary: summarize(&assessments),
        protection_analysis: protection_stats(&assessments),
        bypass_analysis: bypass_stats(&assessments),
        categories: category_breakdown(&assessments),
        recommendations: recommendations(&assessments),
        market: market::analyze_market(&assessments, focus_vendor),
        assessments,
        seed,
        generated_at: Utc::now(),
    })
}

fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

pub fn summarize(assessments: &[AppAssessment]) -> Summary {
    let total = assessments.len();

    let mut counts: BTreeMap<Protection, usize> = BTreeMap::new();
    for app in assessments {
        for protection in &app.protection.detected {
            *counts.entry(*protection).or_default() += 1;
        }
    }

    // BTreeMap iterates in catalog order; keep the first maximum.
    let most_common_protection = counts
        .iter()
        .fold(None, |best: Option<(Protection, usize)>, (p, n)| match best {
            Some((_, m)) if m >= *n => best,
            _ => Some((*p, *n)),
        })
        .map(|(p, _)| p);

    let protected = assessments
        .iter()
        .filter(|a| !a.protection.is_unprotected())
        .count();

    Summary {
        total_apps_tested: total,
        avg_bypass_success_rate: mean(assessments.iter().map(|a| a.bypass_success_rate())),
        most_common_protection,
        protection_adoption_rate: if total == 0 {
            0.0
        } else {
            protected as f64 / total as f64
        },
        apps_with_strong_protection: assessments
            .iter()
            .filter(|a| a.protection.detected.len() >= STRONG_PROTECTION_COUNT)
            .count(),
        completely_unprotected_apps: total - protected,
    }
}

pub fn protection_stats(assessments: &[AppAssessment]) -> BTreeMap<Protection, ProtectionStats> {
    let mut stats: BTreeMap<Protection, ProtectionStats> = BTreeMap::new();

    for app in assessments {
        let attempts = app.bypass_results.len();
        let successes = app.successful_bypasses();
        for protection in &app.protection.detected {
            let entry = stats.entry(*protection).or_default();
            entry.apps_using += 1;
            entry.total_bypass_attempts += attempts;
            entry.successful_bypasses += successes;
        }
    }

    for entry in stats.values_mut() {
        entry.avg_effectiveness = if entry.total_bypass_attempts > 0 {
            1.0 - entry.successful_bypasses as f64 / entry.total_bypass_attempts as f64
        } else {
            0.0
        };
    }

    stats
}

pub fn bypass_stats(assessments: &[AppAssessment]) -> BTreeMap<BypassTestKind, BypassStats> {
    let mut stats: BTreeMap<BypassTestKind, BypassStats> = BTreeMap::new();
    let mut total_time: BTreeMap<BypassTestKind, f64> = BTreeMap::new();
    let mut technique_wins: BTreeMap<BypassTestKind, BTreeMap<String, usize>> = BTreeMap::new();

    for app in assessments {
        for (kind, outcome) in &app.bypass_results {
            let entry = stats.entry(*kind).or_default();
            entry.total_attempts += 1;
            *total_time.entry(*kind).or_default() += outcome.execution_time_secs;
            if outcome.bypass_successful {
                entry.successful_attempts += 1;
                let wins = technique_wins.entry(*kind).or_default();
                for technique in &outcome.successful_techniques {
                    *wins.entry(technique.clone()).or_default() += 1;
                }
            }
        }
    }

    for (kind, entry) in stats.iter_mut() {
        if entry.total_attempts > 0 {
            entry.success_rate = entry.successful_attempts as f64 / entry.total_attempts as f64;
            entry.avg_execution_time_secs =
                total_time.get(kind).copied().unwrap_or(0.0) / entry.total_attempts as f64;
        }
        entry.most_successful_technique = technique_wins
            .get(kind)
            .and_then(|wins| most_successful_technique(*kind, wins));
    }

    stats
}

/// Most frequent winner; ties resolve to the technique listed first.
fn most_successful_technique(
    kind: BypassTestKind,
    wins: &BTreeMap<String, usize>,
) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;
    for technique in kind.techniques() {
        let count = wins.get(*technique).copied().unwrap_or(0);
        if count > 0 && best.map_or(true, |(_, b)| count > b) {
            best = Some((*technique, count));
        }
    }
    best.map(|(t, _)| t.to_string())
}

pub fn category_breakdown(
    assessments: &[AppAssessment],
) -> BTreeMap<BankCategory, CategoryAnalysis> {
    let mut grouped: BTreeMap<BankCategory, Vec<CategoryApp>> = BTreeMap::new();

    for app in assessments {
        grouped.entry(app.category).or_default().push(CategoryApp {
            app_name: app.name.clone(),
            protection_count: app.protection.detected.len(),
            bypass_success_rate: app.bypass_success_rate(),
            protections: app.protection.detected.clone(),
        });
    }

    grouped
        .into_iter()
        .map(|(category, apps)| {
            let avg_protection_count = mean(apps.iter().map(|a| a.protection_count as f64));
            let avg_bypass_success_rate = mean(apps.iter().map(|a| a.bypass_success_rate));
            (
                category,
                CategoryAnalysis {
                    app_count: apps.len(),
                    avg_protection_count,
                    avg_bypass_success_rate,
                    effectiveness_score: 1.0 - avg_bypass_success_rate,
                    apps,
                },
            )
        })
        .collect()
}

pub fn recommendations(assessments: &[AppAssessment]) -> Vec<Recommendation> {
    let mut recs = Vec::new();

    let unprotected: Vec<String> = assessments
        .iter()
        .filter(|a| a.protection.is_unprotected())
        .map(|a| a.name.clone())
        .collect();
    if !unprotected.is_empty() {
        recs.push(Recommendation {
            priority: Priority::High,
            category: "Unprotected Apps".to_string(),
            recommendation: format!(
                "{} apps have no detectable protection. Immediate security assessment needed.",
                unprotected.len()
            ),
            affected_apps: unprotected,
        });
    }

    let vulnerable: Vec<String> = assessments
        .iter()
        .filter(|a| a.bypass_success_rate() > VULNERABLE_BYPASS_RATE)
        .map(|a| a.name.clone())
        .collect();
    if !vulnerable.is_empty() {
        recs.push(Recommendation {
            priority: Priority::High,
            category: "Vulnerable Protection".to_string(),
            recommendation: format!(
                "{} apps are highly vulnerable to bypass attacks. Consider upgrading protection.",
                vulnerable.len()
            ),
            affected_apps: vulnerable,
        });
    }

    let without_root: Vec<String> = assessments
        .iter()
        .filter(|a| !a.protection.has(Protection::RootDetection))
        .map(|a| a.name.clone())
        .collect();
    if without_root.len() as f64 > assessments.len() as f64 * MISSING_ROOT_DETECTION_SHARE {
        recs.push(Recommendation {
            priority: Priority::Medium,
            category: "Missing Root Detection".to_string(),
            recommendation: format!(
                "{} apps lack root detection. This is a basic security requirement for banking apps.",
                without_root.len()
            ),
            affected_apps: without_root,
        });
    }

    recs
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::model::*;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    /// Builds an assessment with the given protections and one bypass
    /// outcome per entry of `bypassed`, in test-kind order.
    pub fn assessment(
        name: &str,
        package: &str,
        detected: &[Protection],
        bypassed: &[bool],
    ) -> AppAssessment {
        let bypass_results = BypassTestKind::ALL
            .iter()
            .zip(bypassed)
            .map(|(kind, ok)| {
                let techniques: Vec<String> =
                    kind.techniques().iter().map(|t| t.to_string()).collect();
                (
                    *kind,
                    BypassOutcome {
                        kind: *kind,
                        name: kind.name().to_string(),
                        description: kind.description().to_string(),
                        bypass_successful: *ok,
                        success_rate: 0.5,
                        successful_techniques: if *ok {
                            vec![techniques[0].clone()]
                        } else {
                            Vec::new()
                        },
                        techniques_tested: techniques,
                        execution_time_secs: 20.0,
                        notes: kind.notes(*ok).to_string(),
                    },
                )
            })
            .collect();

        AppAssessment {
            name: name.to_string(),
            package: package.to_string(),
            category: BankCategory::classify(package),
            app_info: AppInfo {
                package: package.to_string(),
                rating: 4.2,
                downloads: "1M+".to_string(),
                last_updated: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                size_mb: 40,
                version: semver::Version::new(1, 0, 0),
                developer: "Test Banking".to_string(),
            },
            protection: ProtectionProfile {
                detected: detected.to_vec(),
                confidence: detected.iter().map(|p| (*p, 0.8)).collect(),
                features: Vec::new(),
                obfuscation: ObfuscationLevel::None,
                method: DetectionMethod::Simulated,
                notes: String::new(),
            },
            bypass_results,
        }
    }

    pub fn empty_bypass(mut app: AppAssessment) -> AppAssessment {
        app.bypass_results = BTreeMap::new();
        app
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{assessment, empty_bypass};
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn sample() -> Vec<AppAssessment> {
        vec![
            assessment(
                "DNB Mobile",
                "no.dnb.mobilbank",
                &[
                    Protection::PromonShield,
                    Protection::RootDetection,
                    Protection::SslPinning,
                ],
                &[false, false, false, false],
            ),
            assessment(
                "Sbanken",
                "no.sbanken.mobilbank",
                &[Protection::RootDetection],
                &[true, false, false, false],
            ),
            assessment("Revolut", "com.revolut.revolut", &[], &[true, true, true, false]),
            assessment("Wise", "com.wise.android", &[], &[true, true, true, true]),
        ]
    }

    #[test]
    fn test_empty_input_is_an_error() {
        assert!(matches!(
            analyze(Vec::new(), 1, Protection::PromonShield),
            Err(AnalysisError::NoAssessments)
        ));
    }

    #[test]
    fn test_summary() {
        let summary = summarize(&sample());
        assert_eq!(summary.total_apps_tested, 4);
        // (0 + 0.25 + 0.75 + 1.0) / 4
        assert!(approx(summary.avg_bypass_success_rate, 0.5));
        assert_eq!(summary.most_common_protection, Some(Protection::RootDetection));
        assert!(approx(summary.protection_adoption_rate, 0.5));
        assert_eq!(summary.apps_with_strong_protection, 1);
        assert_eq!(summary.completely_unprotected_apps, 2);
    }

    #[test]
    fn test_most_common_ties_go_to_catalog_order() {
        let apps = vec![
            assessment("A", "a.one", &[Protection::AntiDebug], &[false]),
            assessment("B", "b.two", &[Protection::Arxan], &[false]),
        ];
        assert_eq!(
            summarize(&apps).most_common_protection,
            Some(Protection::Arxan)
        );
    }

    #[test]
    fn test_most_common_none_when_nothing_detected() {
        let apps = vec![assessment("A", "a.one", &[], &[true])];
        assert_eq!(summarize(&apps).most_common_protection, None);
    }

    #[test]
    fn test_app_without_tests_has_zero_rate() {
        let app = empty_bypass(assessment("A", "a.one", &[], &[]));
        assert!(approx(app.bypass_success_rate(), 0.0));
    }

    #[test]
    fn test_protection_stats() {
        let stats = protection_stats(&sample());
        let root = &stats[&Protection::RootDetection];
        assert_eq!(root.apps_using, 2);
        assert_eq!(root.total_bypass_attempts, 8);
        assert_eq!(root.successful_bypasses, 1);
        assert!(approx(root.avg_effectiveness, 1.0 - 1.0 / 8.0));

        let promon = &stats[&Protection::PromonShield];
        assert!(approx(promon.avg_effectiveness, 1.0));
        assert!(!stats.contains_key(&Protection::Arxan));
    }

    #[test]
    fn test_protection_stats_without_attempts() {
        let apps = vec![empty_bypass(assessment(
            "A",
            "a.one",
            &[Protection::AntiDebug],
            &[],
        ))];
        let stats = protection_stats(&apps);
        assert!(approx(stats[&Protection::AntiDebug].avg_effectiveness, 0.0));
    }

    #[test]
    fn test_bypass_stats() {
        let stats = bypass_stats(&sample());
        let root = &stats[&BypassTestKind::RootDetection];
        assert_eq!(root.total_attempts, 4);
        assert_eq!(root.successful_attempts, 3);
        assert!(approx(root.success_rate, 0.75));
        assert!(approx(root.avg_execution_time_secs, 20.0));
        assert_eq!(root.most_successful_technique.as_deref(), Some("Magisk Hide"));

        let tampering = &stats[&BypassTestKind::Tampering];
        assert_eq!(tampering.successful_attempts, 1);
    }

    #[test]
    fn test_most_successful_technique_tie_break() {
        let mut wins = BTreeMap::new();
        wins.insert("Frida Scripts".to_string(), 2);
        wins.insert("RootCloak".to_string(), 2);
        assert_eq!(
            most_successful_technique(BypassTestKind::RootDetection, &wins).as_deref(),
            Some("RootCloak")
        );
        assert_eq!(
            most_successful_technique(BypassTestKind::RootDetection, &BTreeMap::new()),
            None
        );
    }

    #[test]
    fn test_category_breakdown_skips_empty_categories() {
        let apps = vec![
            assessment("Revolut", "com.revolut.revolut", &[], &[true, true]),
            assessment("Wise", "com.wise.android", &[Protection::RootDetection], &[false, false]),
        ];
        let categories = category_breakdown(&apps);
        assert_eq!(categories.len(), 1);
        let fintech = &categories[&BankCategory::Fintech];
        assert_eq!(fintech.app_count, 2);
        assert!(approx(fintech.avg_protection_count, 0.5));
        assert!(approx(fintech.avg_bypass_success_rate, 0.5));
        assert!(approx(fintech.effectiveness_score, 0.5));
        assert_eq!(fintech.apps[0].app_name, "Revolut");
    }

    #[test]
    fn test_recommendations() {
        let recs = recommendations(&sample());
        assert_eq!(recs.len(), 3);

        assert_eq!(recs[0].category, "Unprotected Apps");
        assert_eq!(recs[0].priority, Priority::High);
        assert_eq!(recs[0].affected_apps, vec!["Revolut", "Wise"]);
        assert!(recs[0].recommendation.starts_with("2 apps have no detectable protection"));

        // Revolut is at 0.75 and Wise at 1.0; both above 0.7.
        assert_eq!(recs[1].category, "Vulnerable Protection");
        assert_eq!(recs[1].affected_apps, vec!["Revolut", "Wise"]);

        assert_eq!(recs[2].category, "Missing Root Detection");
        assert_eq!(recs[2].priority, Priority::Medium);
        assert_eq!(recs[2].affected_apps, vec!["Revolut", "Wise"]);
    }

    #[test]
    fn test_no_recommendations_for_well_protected_roster() {
        let apps = vec![
            assessment("A", "a.one", &[Protection::RootDetection], &[false, true]),
            assessment("B", "b.two", &[Protection::RootDetection], &[false, false]),
        ];
        assert!(recommendations(&apps).is_empty());
    }

    #[test]
    fn test_missing_root_detection_threshold_is_strict() {
        // Exactly 30% lacking root detection is not flagged.
        let mut apps: Vec<_> = (0..7)
            .map(|i| {
                assessment(
                    &format!("P{}", i),
                    &format!("p.{}", i),
                    &[Protection::RootDetection],
                    &[false],
                )
            })
            .collect();
        apps.extend((0..3).map(|i| {
            assessment(
                &format!("U{}", i),
                &format!("u.{}", i),
                &[Protection::SslPinning],
                &[false],
            )
        }));
        assert!(recommendations(&apps)
            .iter()
            .all(|r| r.category != "Missing Root Detection"));
    }

    #[test]
    fn test_analyze_keeps_assessments_and_seed() {
        let report = analyze(sample(), 99, Protection::PromonShield).unwrap();
        assert_eq!(report.seed, 99);
        assert_eq!(report.assessments.len(), 4);
        assert!(report.has_priority(Priority::High));
    }
}
