//! Per-app assessment and the full analysis run.

use anyhow::{Context, Result};
use futures::future::join_all;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::analysis::analyze;
use crate::collector::{Collector, SimulatedCollector};
use crate::config::Config;
use crate::detector::detector_for;
use crate::model::{AnalysisReport, AppAssessment, AppTarget};
use crate::simulator::BypassSimulator;

/// File written into the output directory after each run.
pub const ANALYSIS_FILE: &str = "analysis_results.json";

/// Hook for reporting progress while apps are assessed.
pub trait Progress: Send + Sync {
    fn app_started(&self, _target: &AppTarget) {}
    fn app_finished(&self, _target: &AppTarget) {}
}

/// Progress sink that ignores every event.
pub struct Silent;

impl Progress for Silent {}

/// Runs collection, detection and bypass simulation for one app.
pub struct Assessor {
    seed: u64,
    collector: Box<dyn Collector>,
    simulator: BypassSimulator,
}

impl Assessor {
    pub fn new(seed: u64, config: &Config) -> Self {
        let cache = config.cache();
        if let Err(e) = cache.prune_expired() {
            tracing::warn!(error = %e, "failed to prune cache");
        }

        Self {
            seed,
            collector: Box::new(SimulatedCollector::with_cache(seed, cache)),
            simulator: BypassSimulator::new(seed)
                .with_pacing(Duration::from_millis(config.pacing_ms)),
        }
    }

    pub fn with_collector(mut self, collector: Box<dyn Collector>) -> Self {
        self.collector = collector;
        self
    }

    pub async fn assess_app(&self, target: &AppTarget) -> Result<AppAssessment> {
        tracing::info!(app = %target.name, "collecting app information");
        let app_info = self
            .collector
            .collect(target)
            .await
            .with_context(|| format!("collecting info for {}", target.package))?;

        let detector = detector_for(target, self.seed);
        tracing::info!(app = %target.name, detector = detector.name(), "analyzing protection");
        let protection = detector.detect(target);

        let bypass_results = self.simulator.run_tests(target).await;

        Ok(AppAssessment {
            name: target.name.clone(),
            package: target.package.clone(),
            category: target.category(),
            app_info,
            protection,
            bypass_results,
        })
    }

    /// Assesses every target, keeping roster order. Apps that fail are
    /// logged and left out.
    pub async fn assess_all(
        &self,
        targets: &[AppTarget],
        parallel: bool,
        progress: &dyn Progress,
    ) -> Vec<AppAssessment> {
        let results = if parallel && targets.len() > 1 {
            let futures: Vec<_> = targets
                .iter()
                .map(|target| async move {
                    progress.app_started(target);
                    let result = self.assess_app(target).await;
                    progress.app_finished(target);
                    result
                })
                .collect();
            join_all(futures).await
        } else {
            let mut results = Vec::with_capacity(targets.len());
            for (i, target) in targets.iter().enumerate() {
                tracing::info!("[{}/{}] processing {}", i + 1, targets.len(), target.name);
                progress.app_started(target);
                results.push(self.assess_app(target).await);
                progress.app_finished(target);
            }
            results
        };

        targets
            .iter()
            .zip(results)
            .filter_map(|(target, result)| match result {
                Ok(assessment) => Some(assessment),
                Err(e) => {
                    tracing::error!(app = %target.name, error = %e, "assessment failed");
                    None
                }
            })
            .collect()
    }
}

/// Assesses `targets` and folds the results into a report.
pub async fn run(
    config: &Config,
    targets: &[AppTarget],
    seed: u64,
    parallel: bool,
    progress: &dyn Progress,
) -> Result<AnalysisReport> {
    let assessor = Assessor::new(seed, config);
    let assessments = assessor.assess_all(targets, parallel, progress).await;
    let report = analyze(assessments, seed, config.focus_vendor)?;
    Ok(report)
}

/// Writes the report as pretty JSON to `<dir>/analysis_results.json`.
pub fn save_analysis(report: &AnalysisReport, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(ANALYSIS_FILE);
    let json = serde_json::to_string_pretty(report)?;
    fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), "analysis results saved");
    Ok(path)
}

/// Reads a report previously written by [`save_analysis`].
pub fn load_analysis(path: &Path) -> Result<AnalysisReport> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not a saved analysis", path.display()))
}
