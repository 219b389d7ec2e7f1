//! Protection classification.
//!
//! Two detectors implement [`ProtectionDetector`]:
//!
//! | Detector | Input | Used when |
//! |----------|-------|-----------|
//! | [`SimulatedDetector`] | Run seed and bank category | The app declares no indicators |
//! | [`SignatureDetector`] | Indicator strings from the config | The app declares indicators |
//!
//! [`detector_for`] picks the right one for a target.

mod signature;
mod simulated;

pub use signature::SignatureDetector;
pub use simulated::SimulatedDetector;

use crate::model::{AppTarget, ProtectionProfile};

pub trait ProtectionDetector: Send + Sync {
    fn name(&self) -> &'static str;
    fn detect(&self, target: &AppTarget) -> ProtectionProfile;
}

/// Returns the detector that applies to `target`.
///
/// # Example
///
/// ```
/// use shieldscan::detector::detector_for;
/// use shieldscan::model::AppTarget;
///
/// let plain = AppTarget::new("Wise", "com.wise.android");
/// assert_eq!(detector_for(&plain, 1).name(), "simulated");
///
/// let declared = plain.with_indicators(["com.scottyab.rootbeer"]);
/// assert_eq!(detector_for(&declared, 1).name(), "signature");
/// ```
pub fn detector_for(target: &AppTarget, seed: u64) -> Box<dyn ProtectionDetector> {
    if target.indicators.is_empty() {
        Box::new(SimulatedDetector::new(seed))
    } else {
        Box::new(SignatureDetector)
    }
}
