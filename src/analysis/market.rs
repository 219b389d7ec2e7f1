//! Competitive view over commercial hardening vendors.
//!
//! Compares adoption and bypass resistance of each vendor against the apps
//! that ship without any commercial product.

use std::collections::BTreeMap;

use crate::model::{AppAssessment, BankCategory, FocusVendor, MarketAnalysis, Protection, VendorShare};

fn mean_rate<'a>(apps: impl Iterator<Item = &'a AppAssessment>) -> Option<f64> {
    let rates: Vec<f64> = apps.map(|a| a.bypass_success_rate()).collect();
    if rates.is_empty() {
        None
    } else {
        Some(rates.iter().sum::<f64>() / rates.len() as f64)
    }
}

pub fn analyze_market(assessments: &[AppAssessment], focus_vendor: Protection) -> MarketAnalysis {
    let total = assessments.len();
    let commercial = assessments
        .iter()
        .filter(|a| a.protection.has_commercial_vendor())
        .count();

    let mut vendors = BTreeMap::new();
    for vendor in Protection::commercial_vendors() {
        let users: Vec<&AppAssessment> = assessments
            .iter()
            .filter(|a| a.protection.has(vendor))
            .collect();

        let mut categories: Vec<BankCategory> = users.iter().map(|a| a.category).collect();
        categories.sort();
        categories.dedup();

        vendors.insert(
            vendor,
            VendorShare {
                apps_using: users.len(),
                market_share: ratio(users.len(), total),
                share_of_protected: ratio(users.len(), commercial),
                avg_bypass_success_rate: mean_rate(users.iter().copied()),
                categories,
            },
        );
    }

    let ranking = adoption_ranking(&vendors);
    let leader = ranking.first().copied();

    let baseline_bypass_success_rate = mean_rate(
        assessments
            .iter()
            .filter(|a| !a.protection.has_commercial_vendor()),
    );

    let focus = FocusVendor {
        vendor: focus_vendor,
        adoption_rank: ranking
            .iter()
            .position(|v| *v == focus_vendor)
            .map(|i| i + 1),
        uplift: match (
            baseline_bypass_success_rate,
            vendors
                .get(&focus_vendor)
                .and_then(|v| v.avg_bypass_success_rate),
        ) {
            (Some(baseline), Some(rate)) => Some(baseline - rate),
            _ => None,
        },
    };

    tracing::debug!(
        leader = ?leader.map(|l| l.display_name()),
        commercial,
        "market analysis complete"
    );

    MarketAnalysis {
        vendors,
        leader,
        apps_with_commercial_protection: commercial,
        baseline_bypass_success_rate,
        focus,
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// Used vendors ordered by adoption, ties in catalog order.
fn adoption_ranking(vendors: &BTreeMap<Protection, VendorShare>) -> Vec<Protection> {
    let mut used: Vec<(Protection, usize)> = vendors
        .iter()
        .filter(|(_, share)| share.apps_using > 0)
        .map(|(vendor, share)| (*vendor, share.apps_using))
        .collect();
    // Stable sort keeps catalog order among equals.
    used.sort_by(|a, b| b.1.cmp(&a.1));
    used.into_iter().map(|(vendor, _)| vendor).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures::assessment;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn roster() -> Vec<AppAssessment> {
        vec![
            assessment(
                "DNB Mobile",
                "no.dnb.mobilbank",
                &[Protection::PromonShield, Protection::RootDetection],
                &[false, false, false, false],
            ),
            assessment(
                "Nordea Mobile",
                "com.nordea.mobiletoken",
                &[Protection::PromonShield],
                &[true, false, false, false],
            ),
            assessment(
                "Sbanken",
                "no.sbanken.mobilbank",
                &[Protection::Arxan],
                &[true, true, false, false],
            ),
            assessment("Revolut", "com.revolut.revolut", &[], &[true, true, true, false]),
        ]
    }

    #[test]
    fn test_vendor_shares() {
        let market = analyze_market(&roster(), Protection::PromonShield);
        assert_eq!(market.vendors.len(), 5);
        assert_eq!(market.apps_with_commercial_protection, 3);

        let promon = &market.vendors[&Protection::PromonShield];
        assert_eq!(promon.apps_using, 2);
        assert!(approx(promon.market_share, 0.5));
        assert!(approx(promon.share_of_protected, 2.0 / 3.0));
        assert!(approx(promon.avg_bypass_success_rate.unwrap(), 0.125));
        assert_eq!(promon.categories, vec![BankCategory::MajorBank]);

        let irdeto = &market.vendors[&Protection::Irdeto];
        assert_eq!(irdeto.apps_using, 0);
        assert_eq!(irdeto.avg_bypass_success_rate, None);
    }

    #[test]
    fn test_leader_and_focus() {
        let market = analyze_market(&roster(), Protection::PromonShield);
        assert_eq!(market.leader, Some(Protection::PromonShield));
        assert!(approx(market.baseline_bypass_success_rate.unwrap(), 0.75));
        assert_eq!(market.focus.adoption_rank, Some(1));
        assert!(approx(market.focus.uplift.unwrap(), 0.75 - 0.125));

        let arxan = analyze_market(&roster(), Protection::Arxan);
        assert_eq!(arxan.focus.adoption_rank, Some(2));
        assert!(approx(arxan.focus.uplift.unwrap(), 0.75 - 0.5));
    }

    #[test]
    fn test_unused_focus_vendor() {
        let market = analyze_market(&roster(), Protection::Verimatrix);
        assert_eq!(market.focus.adoption_rank, None);
        assert_eq!(market.focus.uplift, None);
    }

    #[test]
    fn test_no_commercial_vendors() {
        let apps = vec![assessment("Revolut", "com.revolut.revolut", &[], &[true])];
        let market = analyze_market(&apps, Protection::PromonShield);
        assert_eq!(market.leader, None);
        assert_eq!(market.apps_with_commercial_protection, 0);
        assert!(market.vendors.values().all(|v| v.share_of_protected == 0.0));
        assert!(approx(market.baseline_bypass_success_rate.unwrap(), 1.0));
    }

    #[test]
    fn test_ranking_ties_follow_catalog_order() {
        let apps = vec![
            assessment("A", "a.one", &[Protection::Verimatrix], &[false]),
            assessment("B", "b.two", &[Protection::Irdeto], &[false]),
        ];
        let market = analyze_market(&apps, Protection::Verimatrix);
        assert_eq!(market.leader, Some(Protection::Irdeto));
        assert_eq!(market.focus.adoption_rank, Some(2));
        assert_eq!(market.baseline_bypass_success_rate, None);
    }
}
