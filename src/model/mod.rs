//! Core data types for apps, protections, bypass outcomes and reports.
//!
//! - [`AppTarget`] - An app on the analysis roster
//! - [`BankCategory`] - Major bank, regional bank or fintech
//! - [`ProtectionProfile`] - Which protections an app carries
//! - [`BypassOutcome`] - The simulated result of one bypass test
//! - [`AnalysisReport`] - Aggregated results across all apps
//!
//! # Example
//!
//! ```
//! use shieldscan::model::{AppTarget, BankCategory};
//!
//! let app = AppTarget::new("DNB Mobile", "no.dnb.mobilbank");
//! assert_eq!(app.category(), BankCategory::MajorBank);
//! ```

mod app;
mod bypass;
mod protection;
mod report;

pub use app::*;
pub use bypass::*;
pub use protection::*;
pub use report::*;
