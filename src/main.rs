use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use shieldscan::{
    config::{glob_match, Config},
    model::{AppTarget, BankCategory, BypassTestKind, Priority},
    output::{format_report_to_string, print_report, OutputFormat},
    pipeline::{self, Progress, Silent},
    seed::random_seed,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Exit codes for CI integration
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const ERROR: u8 = 1;
    pub const HIGH_FINDING: u8 = 2;
    pub const MEDIUM_FINDING: u8 = 3;
}

#[derive(Parser)]
#[command(name = "shieldscan")]
#[command(
    author,
    version,
    about = "Simulated protection-effectiveness analysis for mobile banking apps"
)]
struct Cli {
    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the simulated analysis over the app roster
    Analyze {
        /// Only analyze these packages (repeatable, supports * wildcards)
        #[arg(long = "app")]
        apps: Vec<String>,

        /// Only analyze one category (major, regional, fintech)
        #[arg(long)]
        category: Option<String>,

        /// Output format (table, json, html, markdown)
        #[arg(short, long)]
        format: Option<String>,

        /// Write output to file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Simulation seed for reproducible results
        #[arg(long)]
        seed: Option<u64>,

        /// Clear cached app info before running
        #[arg(long)]
        clear_cache: bool,

        /// Assess apps one at a time
        #[arg(long)]
        no_parallel: bool,

        /// Exit with error if recommendations at or above this priority exist
        #[arg(long, value_enum)]
        fail_on: Option<FailLevel>,
    },

    /// Render a saved analysis_results.json
    Render {
        /// Path to a saved analysis
        input: PathBuf,

        /// Output format (table, json, html, markdown)
        #[arg(short, long)]
        format: Option<String>,

        /// Write output to file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the configured app roster
    ListApps,

    /// List the simulated bypass tests
    ListTests,

    /// Show or create config file
    Config {
        /// Generate default config file
        #[arg(long)]
        init: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },

    /// Clear the cache
    ClearCache,
}

#[derive(Clone, Copy, ValueEnum)]
enum FailLevel {
    High,
    Medium,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("shieldscan={}", default_level)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run() -> Result<u8> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);

    match cli.command {
        Commands::Analyze {
            apps,
            category,
            format,
            output,
            seed,
            clear_cache,
            no_parallel,
            fail_on,
        } => {
            let config = Config::load_from(&config_path)?;
            if clear_cache {
                config.cache().clear()?;
            }

            let format_str = format.unwrap_or_else(|| config.default_format.clone());
            let category = category
                .map(|c| BankCategory::from_str(&c))
                .transpose()
                .map_err(|e| anyhow::anyhow!(e))?;

            run_analysis(AnalyzeArgs {
                config: &config,
                apps: &apps,
                category,
                format: &format_str,
                output: output.as_deref(),
                seed,
                parallel: !no_parallel,
                fail_on,
            })
            .await
        }
        Commands::Render {
            input,
            format,
            output,
        } => {
            let format_str = match format {
                Some(f) => f,
                None => Config::load_from(&config_path)?.default_format,
            };
            let format = OutputFormat::from_str(&format_str).map_err(|e| anyhow::anyhow!(e))?;
            let report = pipeline::load_analysis(&input)?;
            emit(&report, format, output.as_deref())?;
            Ok(exit_codes::SUCCESS)
        }
        Commands::ListApps => {
            list_apps(&Config::load_from(&config_path)?);
            Ok(exit_codes::SUCCESS)
        }
        Commands::ListTests => {
            list_tests();
            Ok(exit_codes::SUCCESS)
        }
        Commands::Config { init, path } => {
            handle_config(&config_path, init, path)?;
            Ok(exit_codes::SUCCESS)
        }
        Commands::ClearCache => {
            let config = Config::load_from(&config_path)?;
            let cache = config.cache();
            let removed = cache.clear()?;
            println!(
                "Cache cleared ({} entries) in {}",
                removed,
                cache.dir().display()
            );
            Ok(exit_codes::SUCCESS)
        }
    }
}

struct AnalyzeArgs<'a> {
    config: &'a Config,
    apps: &'a [String],
    category: Option<BankCategory>,
    format: &'a str,
    output: Option<&'a Path>,
    seed: Option<u64>,
    parallel: bool,
    fail_on: Option<FailLevel>,
}

/// Progress bar advanced once per finished app
struct BarProgress(ProgressBar);

impl Progress for BarProgress {
    fn app_started(&self, target: &AppTarget) {
        self.0.set_message(format!("Assessing {}...", target.name));
    }

    fn app_finished(&self, _target: &AppTarget) {
        self.0.inc(1);
    }
}

async fn run_analysis(args: AnalyzeArgs<'_>) -> Result<u8> {
    let format = OutputFormat::from_str(args.format).map_err(|e| anyhow::anyhow!(e))?;
    let is_interactive = format == OutputFormat::Table;

    let targets = select_targets(args.config, args.apps, args.category);
    if targets.is_empty() {
        anyhow::bail!("no apps left to analyze after filters");
    }

    let seed = args.seed.or(args.config.seed).unwrap_or_else(random_seed);
    tracing::info!(seed, apps = targets.len(), "starting analysis");

    let report = if is_interactive {
        let pb = ProgressBar::new(targets.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                .progress_chars("#>-"),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        let progress = BarProgress(pb);
        let report =
            pipeline::run(args.config, &targets, seed, args.parallel, &progress).await?;
        progress
            .0
            .finish_with_message(format!("Assessed {} apps", report.assessments.len()));
        report
    } else {
        pipeline::run(args.config, &targets, seed, args.parallel, &Silent).await?
    };

    if let Err(e) = pipeline::save_analysis(&report, &args.config.output_dir) {
        tracing::error!(error = %e, "failed to save analysis");
    }

    emit(&report, format, args.output)?;

    Ok(determine_exit_code(&report, args.fail_on))
}

fn select_targets(
    config: &Config,
    apps: &[String],
    category: Option<BankCategory>,
) -> Vec<AppTarget> {
    config
        .targets()
        .into_iter()
        .filter(|t| {
            apps.is_empty()
                || apps.iter().any(|pattern| {
                    if pattern.contains('*') {
                        glob_match(pattern, &t.package)
                    } else {
                        pattern == &t.package
                    }
                })
        })
        .filter(|t| category.map_or(true, |c| t.category() == c))
        .collect()
}

fn emit(
    report: &shieldscan::AnalysisReport,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    match output {
        Some(path) => {
            let content = format_report_to_string(report, format)?;
            std::fs::write(path, content)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("Results written to: {}", path.display());
            Ok(())
        }
        None => print_report(report, format),
    }
}

/// Determine the exit code based on recommendations and --fail-on setting
fn determine_exit_code(report: &shieldscan::AnalysisReport, fail_on: Option<FailLevel>) -> u8 {
    let fail_on = match fail_on {
        Some(level) => level,
        None => return exit_codes::SUCCESS,
    };

    let has_high = report.has_priority(Priority::High);
    let has_medium = report.has_priority(Priority::Medium);

    match fail_on {
        FailLevel::High => {
            if has_high {
                exit_codes::HIGH_FINDING
            } else {
                exit_codes::SUCCESS
            }
        }
        FailLevel::Medium => {
            if has_high {
                exit_codes::HIGH_FINDING
            } else if has_medium {
                exit_codes::MEDIUM_FINDING
            } else {
                exit_codes::SUCCESS
            }
        }
    }
}

fn list_apps(config: &Config) {
    let targets = config.targets();
    println!("Configured apps ({}):", targets.len());
    println!();

    for target in &targets {
        let detection = if target.indicators.is_empty() {
            "simulated"
        } else {
            "signature"
        };
        println!(
            "  {:<20} {:<40} {:<15} [{}]",
            target.name,
            target.package,
            target.category().display_name(),
            detection
        );
    }
}

fn list_tests() {
    println!("Simulated bypass tests:");
    println!();

    for kind in BypassTestKind::ALL {
        println!("  {:<16} {}", kind.as_str(), kind.name());
        println!("  {:<16} {}", "", kind.description());
        println!("  {:<16} Techniques: {}", "", kind.techniques().join(", "));
        println!();
    }
}

fn handle_config(config_path: &Path, init: bool, show_path: bool) -> Result<()> {
    if show_path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if init {
        if config_path.exists() {
            println!("Config file already exists at: {}", config_path.display());
            return Ok(());
        }

        Config::default().save_to(config_path)?;
        println!("Created config file at: {}", config_path.display());
        return Ok(());
    }

    if config_path.exists() {
        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("reading {}", config_path.display()))?;
        println!("Config file: {}", config_path.display());
        println!();
        println!("{}", content);
    } else {
        println!("No config file found.");
        println!("Run 'shieldscan config --init' to create one.");
        println!();
        println!("Default configuration:");
        println!("{}", Config::generate_default_config());
    }

    Ok(())
}
