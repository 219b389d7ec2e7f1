//! HTML dashboard output format.
//!
//! Generates a self-contained page with stat cards, CSS bar charts and
//! tables. No scripts or external assets are referenced.

use crate::model::{AnalysisReport, Priority};
use anyhow::Result;

use super::{optional_percent, percent};

/// Generate and print the HTML dashboard
pub fn print_html(report: &AnalysisReport) -> Result<()> {
    let html = generate_html_string(report);
    println!("{}", html);
    Ok(())
}

/// Generate the dashboard as a string (for file output)
pub fn generate_html_string(report: &AnalysisReport) -> String {
    let mut html = String::with_capacity(16 * 1024);

    html.push_str(&format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>shieldscan Dashboard - {}</title>
    <style>
        :root {{
            --bg-color: #1a1a2e;
            --card-bg: #16213e;
            --text-color: #eee;
            --text-muted: #888;
            --border-color: #0f3460;
            --danger: #dc3545;
            --warning: #ffc107;
            --ok: #28a745;
            --bar: #4f8cc9;
            --accent: #0f3460;
        }}
        * {{ box-sizing: border-box; margin: 0; padding: 0; }}
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: var(--bg-color);
            color: var(--text-color);
            line-height: 1.6;
            padding: 2rem;
        }}
        .container {{ max-width: 1200px; margin: 0 auto; }}
        header {{
            display: flex;
            justify-content: space-between;
            align-items: center;
            margin-bottom: 2rem;
            padding-bottom: 1rem;
            border-bottom: 1px solid var(--border-color);
        }}
        h1 {{ font-size: 1.75rem; font-weight: 600; }}
        .timestamp {{ color: var(--text-muted); font-size: 0.9rem; }}
        .notice {{ color: var(--text-muted); font-size: 0.85rem; margin-bottom: 1.5rem; }}
        .stats {{
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
            gap: 1rem;
            margin-bottom: 2rem;
        }}
        .stat-card {{
            background: var(--card-bg);
            padding: 1.25rem;
            border-radius: 8px;
            border: 1px solid var(--border-color);
        }}
        .stat-value {{ font-size: 2rem; font-weight: 700; }}
        .stat-label {{ color: var(--text-muted); font-size: 0.85rem; }}
        .rate-low {{ color: var(--ok); }}
        .rate-mid {{ color: var(--warning); }}
        .rate-high {{ color: var(--danger); }}
        .charts {{
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(320px, 1fr));
            gap: 1rem;
            margin-bottom: 2rem;
        }}
        .chart h3 {{ font-size: 1rem; margin-bottom: 0.75rem; }}
        .bar-row {{ display: grid; grid-template-columns: 9rem 1fr 3.5rem; gap: 0.5rem; align-items: center; margin-bottom: 0.4rem; font-size: 0.85rem; }}
        .bar-track {{ background: var(--accent); border-radius: 4px; height: 0.8rem; overflow: hidden; }}
        .bar-fill {{ background: var(--bar); height: 100%; }}
        .bar-value {{ text-align: right; color: var(--text-muted); }}
        section {{ margin-bottom: 2rem; }}
        h2 {{
            font-size: 1.25rem;
            margin-bottom: 1rem;
            padding-bottom: 0.5rem;
            border-bottom: 1px solid var(--border-color);
        }}
        table {{
            width: 100%;
            border-collapse: collapse;
            background: var(--card-bg);
            border-radius: 8px;
            overflow: hidden;
        }}
        th, td {{
            padding: 0.75rem 1rem;
            text-align: left;
            border-bottom: 1px solid var(--border-color);
        }}
        th {{ background: var(--accent); font-weight: 600; }}
        tr:hover {{ background: rgba(255,255,255,0.02); }}
        .priority {{ padding: 0.25rem 0.5rem; border-radius: 4px; font-size: 0.75rem; font-weight: 600; }}
        .priority-high {{ background: var(--danger); color: white; }}
        .priority-medium {{ background: var(--warning); color: black; }}
        .affected {{ color: var(--text-muted); font-size: 0.85rem; }}
        .empty {{ text-align: center; padding: 2rem; color: var(--text-muted); }}
        footer {{ text-align: center; color: var(--text-muted); font-size: 0.8rem; margin-top: 2rem; padding-top: 1rem; border-top: 1px solid var(--border-color); }}
    </style>
</head>
<body>
    <div class="container">
        <header>
            <h1>App Shield Effectiveness</h1>
            <span class="timestamp">{}</span>
        </header>
        <p class="notice">All collection, detection and bypass results on this page are simulated (seed {}).</p>
"#,
        report.generated_at.format("%Y-%m-%d"),
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        report.seed
    ));

    push_stat_cards(&mut html, report);
    push_charts(&mut html, report);
    push_protection_table(&mut html, report);
    push_recommendations(&mut html, report);
    push_app_table(&mut html, report);

    html.push_str(
        r#"        <footer>
            Generated by shieldscan
        </footer>
    </div>
</body>
</html>
"#,
    );

    html
}

fn rate_class(rate: f64) -> &'static str {
    if rate > 0.7 {
        "rate-high"
    } else if rate >= 0.4 {
        "rate-mid"
    } else {
        "rate-low"
    }
}

fn push_stat_cards(html: &mut String, report: &AnalysisReport) {
    let s = &report.summary;
    let leader = report
        .market
        .leader
        .map(|l| l.display_name())
        .unwrap_or("None");

    html.push_str(&format!(
        r#"        <div class="stats">
            <div class="stat-card">
                <div class="stat-value">{}</div>
                <div class="stat-label">Apps Tested</div>
            </div>
            <div class="stat-card">
                <div class="stat-value {}">{}</div>
                <div class="stat-label">Avg Bypass Success</div>
            </div>
            <div class="stat-card">
                <div class="stat-value">{}</div>
                <div class="stat-label">Protection Adoption</div>
            </div>
            <div class="stat-card">
                <div class="stat-value">{}</div>
                <div class="stat-label">Strong Protection (3+)</div>
            </div>
            <div class="stat-card">
                <div class="stat-value">{}</div>
                <div class="stat-label">Unprotected</div>
            </div>
            <div class="stat-card">
                <div class="stat-value">{}</div>
                <div class="stat-label">Market Leader</div>
            </div>
        </div>
"#,
        s.total_apps_tested,
        rate_class(s.avg_bypass_success_rate),
        percent(s.avg_bypass_success_rate),
        percent(s.protection_adoption_rate),
        s.apps_with_strong_protection,
        s.completely_unprotected_apps,
        html_escape(leader)
    ));
}

/// One labelled horizontal bar; `value` is clamped to [0, 1].
fn bar_row(label: &str, value: f64) -> String {
    let width = (value.clamp(0.0, 1.0) * 100.0).round();
    format!(
        r#"                <div class="bar-row"><span>{}</span><div class="bar-track"><div class="bar-fill" style="width: {}%"></div></div><span class="bar-value">{}</span></div>
"#,
        html_escape(label),
        width,
        percent(value)
    )
}

fn push_chart(html: &mut String, title: &str, rows: Vec<(String, f64)>) {
    html.push_str(&format!(
        r#"            <div class="stat-card chart">
                <h3>{}</h3>
"#,
        html_escape(title)
    ));
    if rows.is_empty() {
        html.push_str("                <div class=\"empty\">No data</div>\n");
    }
    for (label, value) in rows {
        html.push_str(&bar_row(&label, value));
    }
    html.push_str("            </div>\n");
}

fn push_charts(html: &mut String, report: &AnalysisReport) {
    html.push_str("        <div class=\"charts\">\n");

    push_chart(
        html,
        "Effectiveness by Category",
        report
            .categories
            .iter()
            .map(|(c, a)| (c.display_name().to_string(), a.effectiveness_score))
            .collect(),
    );

    push_chart(
        html,
        "Bypass Success by Test",
        report
            .bypass_analysis
            .iter()
            .map(|(k, s)| (k.name().to_string(), s.success_rate))
            .collect(),
    );

    push_chart(
        html,
        "Vendor Market Share",
        report
            .market
            .vendors
            .iter()
            .filter(|(_, v)| v.apps_using > 0)
            .map(|(p, v)| (p.display_name().to_string(), v.market_share))
            .collect(),
    );

    html.push_str("        </div>\n");
}

fn push_protection_table(html: &mut String, report: &AnalysisReport) {
    html.push_str(
        r#"        <section>
            <h2>Protection Effectiveness</h2>
"#,
    );

    if report.protection_analysis.is_empty() {
        html.push_str("            <div class=\"empty\">No protections detected</div>\n");
    } else {
        html.push_str(
            r#"            <table>
                <thead>
                    <tr>
                        <th>Protection</th>
                        <th>Apps</th>
                        <th>Bypass Attempts</th>
                        <th>Successful Bypasses</th>
                        <th>Effectiveness</th>
                        <th>Market Share</th>
                    </tr>
                </thead>
                <tbody>
"#,
        );

        for (protection, stats) in &report.protection_analysis {
            let share = report
                .market
                .vendors
                .get(protection)
                .map(|v| percent(v.market_share))
                .unwrap_or_else(|| "-".to_string());
            html.push_str(&format!(
                r#"                    <tr>
                        <td>{}</td>
                        <td>{}</td>
                        <td>{}</td>
                        <td>{}</td>
                        <td>{}</td>
                        <td>{}</td>
                    </tr>
"#,
                html_escape(protection.display_name()),
                stats.apps_using,
                stats.total_bypass_attempts,
                stats.successful_bypasses,
                percent(stats.avg_effectiveness),
                share
            ));
        }

        html.push_str(
            r#"                </tbody>
            </table>
"#,
        );
    }

    let focus = &report.market.focus;
    html.push_str(&format!(
        r#"            <p class="affected">Focus vendor {}: adoption rank {}, vendor bypass rate {}, baseline {}.</p>
"#,
        html_escape(focus.vendor.display_name()),
        focus
            .adoption_rank
            .map(|r| format!("#{}", r))
            .unwrap_or_else(|| "-".to_string()),
        optional_percent(
            report
                .market
                .vendors
                .get(&focus.vendor)
                .and_then(|v| v.avg_bypass_success_rate)
        ),
        optional_percent(report.market.baseline_bypass_success_rate)
    ));

    html.push_str("        </section>\n");
}

fn push_recommendations(html: &mut String, report: &AnalysisReport) {
    html.push_str(
        r#"        <section>
            <h2>Recommendations</h2>
"#,
    );

    if report.recommendations.is_empty() {
        html.push_str("            <div class=\"empty\">No recommendations</div>\n");
    } else {
        html.push_str(
            r#"            <table>
                <thead>
                    <tr>
                        <th>Priority</th>
                        <th>Area</th>
                        <th>Recommendation</th>
                    </tr>
                </thead>
                <tbody>
"#,
        );

        for rec in &report.recommendations {
            let class = match rec.priority {
                Priority::High => "priority-high",
                Priority::Medium => "priority-medium",
            };
            html.push_str(&format!(
                r#"                    <tr>
                        <td><span class="priority {}">{}</span></td>
                        <td>{}</td>
                        <td>{}<div class="affected">{}</div></td>
                    </tr>
"#,
                class,
                rec.priority.as_str().to_uppercase(),
                html_escape(&rec.category),
                html_escape(&rec.recommendation),
                html_escape(&rec.affected_apps.join(", "))
            ));
        }

        html.push_str(
            r#"                </tbody>
            </table>
"#,
        );
    }

    html.push_str("        </section>\n");
}

fn push_app_table(html: &mut String, report: &AnalysisReport) {
    html.push_str(
        r#"        <section>
            <h2>Apps</h2>
            <table>
                <thead>
                    <tr>
                        <th>App</th>
                        <th>Category</th>
                        <th>Version</th>
                        <th>Rating</th>
                        <th>Protections</th>
                        <th>Obfuscation</th>
                        <th>Bypass Rate</th>
                    </tr>
                </thead>
                <tbody>
"#,
    );

    for app in &report.assessments {
        let protections = if app.protection.detected.is_empty() {
            "-".to_string()
        } else {
            app.protection
                .detected
                .iter()
                .map(|p| p.display_name())
                .collect::<Vec<_>>()
                .join(", ")
        };
        let rate = app.bypass_success_rate();
        html.push_str(&format!(
            r#"                    <tr>
                        <td>{}<div class="affected">{}</div></td>
                        <td>{}</td>
                        <td>{}</td>
                        <td>{:.1}</td>
                        <td>{}</td>
                        <td>{}</td>
                        <td class="{}">{}</td>
                    </tr>
"#,
            html_escape(&app.name),
            html_escape(&app.package),
            app.category.display_name(),
            app.app_info.version,
            app.app_info.rating,
            html_escape(&protections),
            app.protection.obfuscation.as_str(),
            rate_class(rate),
            percent(rate)
        ));
    }

    html.push_str(
        r#"                </tbody>
            </table>
        </section>
"#,
    );
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
