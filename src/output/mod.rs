mod cli;
mod html;
mod markdown;

pub use cli::print_cli_table;
pub use html::print_html;
pub use markdown::print_markdown;

use crate::model::AnalysisReport;
use anyhow::Result;

/// Output format for analysis reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable tables
    Table,
    /// JSON format for programmatic use
    Json,
    /// Self-contained HTML dashboard
    Html,
    /// Markdown report for sharing
    Markdown,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "html" | "dashboard" => Ok(OutputFormat::Html),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(format!(
                "Unknown format: {}. Use 'table', 'json', 'html', or 'markdown'",
                s
            )),
        }
    }
}

pub fn print_report(report: &AnalysisReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print_cli_table(report),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
            Ok(())
        }
        OutputFormat::Html => print_html(report),
        OutputFormat::Markdown => print_markdown(report),
    }
}

/// Format report to string for file output
pub fn format_report_to_string(report: &AnalysisReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Html => Ok(html::generate_html_string(report)),
        OutputFormat::Markdown => Ok(markdown::generate_markdown_string(report)),
        OutputFormat::Table => {
            // Tables are terminal-only; files get JSON
            Ok(serde_json::to_string_pretty(report)?)
        }
    }
}

pub(crate) fn percent(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

pub(crate) fn optional_percent(rate: Option<f64>) -> String {
    rate.map(percent).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!("TABLE".parse::<OutputFormat>(), Ok(OutputFormat::Table));
        assert_eq!("dashboard".parse::<OutputFormat>(), Ok(OutputFormat::Html));
        assert_eq!("md".parse::<OutputFormat>(), Ok(OutputFormat::Markdown));
        assert!("sarif".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(0.125), "12.5%");
        assert_eq!(percent(1.0), "100.0%");
        assert_eq!(optional_percent(None), "-");
    }
}
