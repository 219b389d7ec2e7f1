use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{AppInfo, BankCategory, BypassOutcome, BypassTestKind, Protection, ProtectionProfile};

/// Everything gathered for one app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppAssessment {
    pub name: String,
    pub package: String,
    pub category: BankCategory,
    pub app_info: AppInfo,
    pub protection: ProtectionProfile,
    pub bypass_results: BTreeMap<BypassTestKind, BypassOutcome>,
}

impl AppAssessment {
    pub fn successful_bypasses(&self) -> usize {
        self.bypass_results
            .values()
            .filter(|o| o.bypass_successful)
            .count()
    }

    /// Share of bypass tests that succeeded, or 0 when none ran.
    pub fn bypass_success_rate(&self) -> f64 {
        if self.bypass_results.is_empty() {
            0.0
        } else {
            self.successful_bypasses() as f64 / self.bypass_results.len() as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_apps_tested: usize,
    pub avg_bypass_success_rate: f64,
    pub most_common_protection: Option<Protection>,
    pub protection_adoption_rate: f64,
    pub apps_with_strong_protection: usize,
    pub completely_unprotected_apps: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProtectionStats {
    pub apps_using: usize,
    pub total_bypass_attempts: usize,
    pub successful_bypasses: usize,
    pub avg_effectiveness: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BypassStats {
    pub total_attempts: usize,
    pub successful_attempts: usize,
    pub success_rate: f64,
    pub avg_execution_time_secs: f64,
    pub most_successful_technique: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryApp {
    pub app_name: String,
    pub protection_count: usize,
    pub bypass_success_rate: f64,
    pub protections: Vec<Protection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAnalysis {
    pub app_count: usize,
    pub avg_protection_count: f64,
    pub avg_bypass_success_rate: f64,
    pub effectiveness_score: f64,
    pub apps: Vec<CategoryApp>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub category: String,
    pub recommendation: String,
    pub affected_apps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorShare {
    pub apps_using: usize,
    pub market_share: f64,
    pub share_of_protected: f64,
    pub avg_bypass_success_rate: Option<f64>,
    pub categories: Vec<BankCategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusVendor {
    pub vendor: Protection,
    /// 1-based position by adoption among used vendors.
    pub adoption_rank: Option<usize>,
    /// Baseline bypass rate minus the vendor's bypass rate.
    pub uplift: Option<f64>,
}

/// Competitive view over the commercial hardening vendors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketAnalysis {
    pub vendors: BTreeMap<Protection, VendorShare>,
    pub leader: Option<Protection>,
    pub apps_with_commercial_protection: usize,
    pub baseline_bypass_success_rate: Option<f64>,
    pub focus: FocusVendor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub summary: Summary,
    pub protection_analysis: BTreeMap<Protection, ProtectionStats>,
    pub bypass_analysis: BTreeMap<BypassTestKind, BypassStats>,
    pub categories: BTreeMap<BankCategory, CategoryAnalysis>,
    pub recommendations: Vec<Recommendation>,
    pub market: MarketAnalysis,
    pub assessments: Vec<AppAssessment>,
    pub seed: u64,
    pub generated_at: DateTime<Utc>,
}

impl AnalysisReport {
    pub fn has_priority(&self, priority: Priority) -> bool {
        self.recommendations.iter().any(|r| r.priority == priority)
    }
}
