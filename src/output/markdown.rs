//! Markdown report renderer
//!
//! Produces a shareable competitive-intelligence report: executive summary,
//! vendor landscape, effectiveness tables and recommendations.

use crate::model::AnalysisReport;
use anyhow::Result;

use super::{optional_percent, percent};

pub fn print_markdown(report: &AnalysisReport) -> Result<()> {
    println!("{}", generate_markdown_string(report));
    Ok(())
}

pub fn generate_markdown_string(report: &AnalysisReport) -> String {
    let mut md = String::with_capacity(8192);
    let s = &report.summary;

    md.push_str("# App Shield Effectiveness Report\n\n");
    md.push_str("> All results in this report are simulated.\n\n");

    md.push_str("| Field | Value |\n|---|---|\n");
    md.push_str(&format!(
        "| **Generated** | {} |\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    md.push_str(&format!("| **Seed** | `{}` |\n", report.seed));
    md.push_str(&format!("| **Apps Tested** | {} |\n", s.total_apps_tested));
    md.push_str(&format!(
        "| **Avg Bypass Success** | **{}** |\n",
        percent(s.avg_bypass_success_rate)
    ));
    md.push_str(&format!(
        "| **Protection Adoption** | {} |\n",
        percent(s.protection_adoption_rate)
    ));
    md.push_str(&format!(
        "| **Most Common Protection** | {} |\n",
        s.most_common_protection
            .map(|p| p.display_name())
            .unwrap_or("None")
    ));
    md.push_str(&format!(
        "| **Strong / Unprotected** | {} / {} |\n\n",
        s.apps_with_strong_protection, s.completely_unprotected_apps
    ));

    // Competitive landscape
    let market = &report.market;
    md.push_str("## Competitive Landscape\n\n");
    if market.apps_with_commercial_protection == 0 {
        md.push_str("No commercial hardening vendor was found in any assessed app.\n\n");
    } else {
        md.push_str("| Vendor | Apps | Market Share | Share of Shielded | Bypass Rate | Segments |\n");
        md.push_str("|---|---:|---:|---:|---:|---|\n");
        for (vendor, share) in &market.vendors {
            let segments = if share.categories.is_empty() {
                "-".to_string()
            } else {
                share
                    .categories
                    .iter()
                    .map(|c| c.display_name())
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} |\n",
                vendor,
                share.apps_using,
                percent(share.market_share),
                percent(share.share_of_protected),
                optional_percent(share.avg_bypass_success_rate),
                segments
            ));
        }
        md.push('\n');
    }

    let focus = &market.focus;
    md.push_str(&format!("### Focus: {}\n\n", focus.vendor));
    match focus.adoption_rank {
        Some(rank) => md.push_str(&format!("- Adoption rank: **#{}**\n", rank)),
        None => md.push_str("- Not deployed in any assessed app\n"),
    }
    md.push_str(&format!(
        "- Baseline bypass rate without a commercial shield: {}\n",
        optional_percent(market.baseline_bypass_success_rate)
    ));
    if let Some(uplift) = focus.uplift {
        md.push_str(&format!(
            "- Uplift over baseline: **{:+.1} points**\n",
            uplift * 100.0
        ));
    }
    md.push('\n');

    md.push_str("## Protection Effectiveness\n\n");
    if report.protection_analysis.is_empty() {
        md.push_str("No protections detected.\n\n");
    } else {
        md.push_str("| Protection | Apps | Attempts | Bypasses | Effectiveness |\n");
        md.push_str("|---|---:|---:|---:|---:|\n");
        for (protection, stats) in &report.protection_analysis {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                protection,
                stats.apps_using,
                stats.total_bypass_attempts,
                stats.successful_bypasses,
                percent(stats.avg_effectiveness)
            ));
        }
        md.push('\n');
    }

    md.push_str("## Simulated Bypass Tests\n\n");
    md.push_str("| Test | Attempts | Successes | Rate | Avg Time | Top Technique |\n");
    md.push_str("|---|---:|---:|---:|---:|---|\n");
    for (kind, stats) in &report.bypass_analysis {
        md.push_str(&format!(
            "| {} | {} | {} | {} | {:.1}s | {} |\n",
            kind.name(),
            stats.total_attempts,
            stats.successful_attempts,
            percent(stats.success_rate),
            stats.avg_execution_time_secs,
            stats.most_successful_technique.as_deref().unwrap_or("-")
        ));
    }
    md.push('\n');

    md.push_str("## By Category\n\n");
    for (category, analysis) in &report.categories {
        md.push_str(&format!(
            "### {} ({} apps)\n\nAverage protections {:.1}, bypass rate {}, effectiveness {}.\n\n",
            category,
            analysis.app_count,
            analysis.avg_protection_count,
            percent(analysis.avg_bypass_success_rate),
            percent(analysis.effectiveness_score)
        ));
        for app in &analysis.apps {
            md.push_str(&format!(
                "- {}: {} protections, {} bypassed\n",
                escape_md(&app.app_name),
                app.protection_count,
                percent(app.bypass_success_rate)
            ));
        }
        md.push('\n');
    }

    md.push_str("## Recommendations\n\n");
    if report.recommendations.is_empty() {
        md.push_str("No recommendations.\n");
    }
    for rec in &report.recommendations {
        md.push_str(&format!(
            "- **[{}] {}**: {}\n  - Affected: {}\n",
            rec.priority.as_str(),
            escape_md(&rec.category),
            escape_md(&rec.recommendation),
            escape_md(&rec.affected_apps.join(", "))
        ));
    }

    md
}

/// Escapes pipes so config-supplied names cannot split a table cell.
fn escape_md(text: &str) -> String {
    text.replace('|', "\\|")
}
