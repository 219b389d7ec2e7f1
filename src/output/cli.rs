use crate::model::{AnalysisReport, Priority};
use anyhow::Result;
use tabled::{settings::Style, Table, Tabled};

use super::{optional_percent, percent};

#[derive(Tabled)]
struct AppRow {
    #[tabled(rename = "App")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Protections")]
    protections: String,
    #[tabled(rename = "Obfuscation")]
    obfuscation: String,
    #[tabled(rename = "Bypassed")]
    bypassed: String,
    #[tabled(rename = "Rate")]
    rate: String,
}

#[derive(Tabled)]
struct ProtectionRow {
    #[tabled(rename = "Protection")]
    protection: String,
    #[tabled(rename = "Apps")]
    apps: usize,
    #[tabled(rename = "Attempts")]
    attempts: usize,
    #[tabled(rename = "Bypasses")]
    bypasses: usize,
    #[tabled(rename = "Effectiveness")]
    effectiveness: String,
}

#[derive(Tabled)]
struct BypassRow {
    #[tabled(rename = "Test")]
    test: String,
    #[tabled(rename = "Success")]
    success: String,
    #[tabled(rename = "Rate")]
    rate: String,
    #[tabled(rename = "Avg Time")]
    avg_time: String,
    #[tabled(rename = "Top Technique")]
    technique: String,
}

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Apps")]
    apps: usize,
    #[tabled(rename = "Avg Protections")]
    avg_protections: String,
    #[tabled(rename = "Bypass Rate")]
    bypass_rate: String,
    #[tabled(rename = "Effectiveness")]
    effectiveness: String,
}

#[derive(Tabled)]
struct VendorRow {
    #[tabled(rename = "Vendor")]
    vendor: String,
    #[tabled(rename = "Apps")]
    apps: usize,
    #[tabled(rename = "Market Share")]
    share: String,
    #[tabled(rename = "Of Shielded")]
    of_shielded: String,
    #[tabled(rename = "Bypass Rate")]
    bypass_rate: String,
}

pub fn print_cli_table(report: &AnalysisReport) -> Result<()> {
    println!();
    println!(
        "Analysis generated at: {} (seed {})",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        report.seed
    );
    println!();

    print_apps(report);
    print_protections(report);
    print_bypass_tests(report);
    print_categories(report);
    print_market(report);
    print_recommendations(report);

    println!();
    print_summary(report);

    Ok(())
}

fn print_apps(report: &AnalysisReport) {
    println!("Assessed {} apps:", report.assessments.len());
    println!();

    let rows: Vec<AppRow> = report
        .assessments
        .iter()
        .map(|a| AppRow {
            name: truncate(&a.name, 24),
            category: a.category.display_name().to_string(),
            protections: if a.protection.detected.is_empty() {
                "-".to_string()
            } else {
                truncate(
                    &a.protection
                        .detected
                        .iter()
                        .map(|p| p.display_name())
                        .collect::<Vec<_>>()
                        .join(", "),
                    48,
                )
            },
            obfuscation: a.protection.obfuscation.as_str().to_string(),
            bypassed: format!("{}/{}", a.successful_bypasses(), a.bypass_results.len()),
            rate: format_rate(a.bypass_success_rate()),
        })
        .collect();

    println!("{}", Table::new(rows).with(Style::rounded()));
}

fn print_protections(report: &AnalysisReport) {
    if report.protection_analysis.is_empty() {
        return;
    }

    println!();
    println!("Protection effectiveness:");
    println!();

    let rows: Vec<ProtectionRow> = report
        .protection_analysis
        .iter()
        .map(|(protection, stats)| ProtectionRow {
            protection: protection.display_name().to_string(),
            apps: stats.apps_using,
            attempts: stats.total_bypass_attempts,
            bypasses: stats.successful_bypasses,
            effectiveness: percent(stats.avg_effectiveness),
        })
        .collect();

    println!("{}", Table::new(rows).with(Style::rounded()));
}

fn print_bypass_tests(report: &AnalysisReport) {
    println!();
    println!("Simulated bypass tests:");
    println!();

    let rows: Vec<BypassRow> = report
        .bypass_analysis
        .iter()
        .map(|(kind, stats)| BypassRow {
            test: kind.name().to_string(),
            success: format!("{}/{}", stats.successful_attempts, stats.total_attempts),
            rate: format_rate(stats.success_rate),
            avg_time: format!("{:.1}s", stats.avg_execution_time_secs),
            technique: stats
                .most_successful_technique
                .clone()
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    println!("{}", Table::new(rows).with(Style::rounded()));
}

fn print_categories(report: &AnalysisReport) {
    println!();
    println!("By category:");
    println!();

    let rows: Vec<CategoryRow> = report
        .categories
        .iter()
        .map(|(category, c)| CategoryRow {
            category: category.display_name().to_string(),
            apps: c.app_count,
            avg_protections: format!("{:.1}", c.avg_protection_count),
            bypass_rate: format_rate(c.avg_bypass_success_rate),
            effectiveness: percent(c.effectiveness_score),
        })
        .collect();

    println!("{}", Table::new(rows).with(Style::rounded()));
}

fn print_market(report: &AnalysisReport) {
    let market = &report.market;
    if market.apps_with_commercial_protection == 0 {
        println!();
        println!("No commercial hardening vendors detected.");
        return;
    }

    println!();
    println!(
        "Competitive landscape ({} apps with a commercial shield):",
        market.apps_with_commercial_protection
    );
    println!();

    let mut rows: Vec<VendorRow> = market
        .vendors
        .iter()
        .filter(|(_, share)| share.apps_using > 0)
        .map(|(vendor, share)| VendorRow {
            vendor: vendor.display_name().to_string(),
            apps: share.apps_using,
            share: percent(share.market_share),
            of_shielded: percent(share.share_of_protected),
            bypass_rate: optional_percent(share.avg_bypass_success_rate),
        })
        .collect();
    // Stable sort keeps catalog order among equals
    rows.sort_by(|a, b| b.apps.cmp(&a.apps));

    println!("{}", Table::new(rows).with(Style::rounded()));

    let focus = &market.focus;
    match (focus.adoption_rank, focus.uplift) {
        (Some(rank), Some(uplift)) => println!(
            "  {} ranks #{} by adoption; bypass rate {} vs unshielded baseline",
            focus.vendor,
            rank,
            format_uplift(uplift)
        ),
        (Some(rank), None) => println!("  {} ranks #{} by adoption", focus.vendor, rank),
        _ => println!("  {} not found in any assessed app", focus.vendor),
    }
}

fn print_recommendations(report: &AnalysisReport) {
    if report.recommendations.is_empty() {
        return;
    }

    println!();
    println!("Recommendations:");
    for rec in &report.recommendations {
        println!(
            "  {} {}: {}",
            format_priority(rec.priority),
            rec.category,
            rec.recommendation
        );
        println!("      {}", truncate(&rec.affected_apps.join(", "), 100));
    }
}

fn format_priority(priority: Priority) -> String {
    match priority {
        Priority::High => "\x1b[31m[HIGH]\x1b[0m".to_string(),
        Priority::Medium => "\x1b[33m[MEDIUM]\x1b[0m".to_string(),
    }
}

/// Colors a bypass rate by how exposed it leaves the app.
fn format_rate(rate: f64) -> String {
    let text = percent(rate);
    if rate > 0.7 {
        format!("\x1b[31m{}\x1b[0m", text)
    } else if rate >= 0.4 {
        format!("\x1b[33m{}\x1b[0m", text)
    } else {
        format!("\x1b[32m{}\x1b[0m", text)
    }
}

fn format_uplift(uplift: f64) -> String {
    let points = uplift * 100.0;
    if points >= 0.0 {
        format!("{:.1} points lower", points)
    } else {
        format!("{:.1} points higher", -points)
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}

fn effectiveness_indicator(rate: f64) -> &'static str {
    match (rate * 100.0).round() as u32 {
        0..=10 => "[Hardened]",
        11..=30 => "[Resilient]",
        31..=50 => "[Mixed]",
        51..=70 => "[Weak]",
        _ => "[Exposed]",
    }
}

fn print_summary(report: &AnalysisReport) {
    let s = &report.summary;

    println!("Summary:");
    println!("  Apps tested: {}", s.total_apps_tested);
    println!(
        "  Protection adoption: {} ({} strong, {} unprotected)",
        percent(s.protection_adoption_rate),
        s.apps_with_strong_protection,
        s.completely_unprotected_apps
    );
    println!(
        "  Most common protection: {}",
        s.most_common_protection
            .map(|p| p.display_name())
            .unwrap_or("None")
    );
    if let Some(leader) = report.market.leader {
        println!("  Market leader: {}", leader);
    }

    let high = report
        .recommendations
        .iter()
        .filter(|r| r.priority == Priority::High)
        .count();
    if high > 0 {
        println!("  High-priority findings: {}", high);
    }

    println!();
    println!(
        "Average bypass success: {} {}",
        percent(s.avg_bypass_success_rate),
        effectiveness_indicator(s.avg_bypass_success_rate)
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("Sparebanken Øst", 40), "Sparebanken Øst");
        assert_eq!(truncate("ØØØØØØØØ", 6), "ØØØ...");
    }

    #[test]
    fn test_effectiveness_indicator() {
        assert_eq!(effectiveness_indicator(0.05), "[Hardened]");
        assert_eq!(effectiveness_indicator(0.25), "[Resilient]");
        assert_eq!(effectiveness_indicator(0.5), "[Mixed]");
        assert_eq!(effectiveness_indicator(0.9), "[Exposed]");
    }

    #[test]
    fn test_format_uplift() {
        assert_eq!(format_uplift(0.25), "25.0 points lower");
        assert_eq!(format_uplift(-0.1), "10.0 points higher");
    }
}
