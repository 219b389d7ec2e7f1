pub mod analysis;
pub mod cache;
pub mod catalog;
pub mod collector;
pub mod config;
pub mod detector;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod seed;
pub mod simulator;

pub use cache::Cache;
pub use config::Config;
pub use model::{AnalysisReport, AppAssessment, AppTarget, BankCategory, Protection};
