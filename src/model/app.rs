use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::{MAJOR_BANK_MARKERS, REGIONAL_BANK_MARKERS};

/// A single app on the analysis roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppTarget {
    pub name: String,
    pub package: String,
    /// Library or class names known to ship with the app. When present,
    /// protections are classified from these instead of simulated.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indicators: Vec<String>,
}

impl AppTarget {
    pub fn new(name: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
            indicators: Vec::new(),
        }
    }

    pub fn with_indicators<I, S>(mut self, indicators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.indicators = indicators.into_iter().map(Into::into).collect();
        self
    }

    pub fn category(&self) -> BankCategory {
        BankCategory::classify(&self.package)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BankCategory {
    MajorBank,
    RegionalBank,
    Fintech,
}

impl BankCategory {
    pub const ALL: [BankCategory; 3] = [
        BankCategory::MajorBank,
        BankCategory::RegionalBank,
        BankCategory::Fintech,
    ];

    /// Classifies a package id by the bank markers it contains.
    ///
    /// Major-bank markers win over regional ones, so `no.dnb.vipps` is a
    /// major bank even though it is not a bank's flagship app.
    pub fn classify(package: &str) -> Self {
        let package = package.to_lowercase();
        if MAJOR_BANK_MARKERS.iter().any(|m| package.contains(m)) {
            BankCategory::MajorBank
        } else if REGIONAL_BANK_MARKERS.iter().any(|m| package.contains(m)) {
            BankCategory::RegionalBank
        } else {
            BankCategory::Fintech
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BankCategory::MajorBank => "major_bank",
            BankCategory::RegionalBank => "regional_bank",
            BankCategory::Fintech => "fintech",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BankCategory::MajorBank => "Major banks",
            BankCategory::RegionalBank => "Regional banks",
            BankCategory::Fintech => "Fintech",
        }
    }
}

impl std::fmt::Display for BankCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl std::str::FromStr for BankCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "major" | "major_bank" | "major-bank" => Ok(BankCategory::MajorBank),
            "regional" | "regional_bank" | "regional-bank" => Ok(BankCategory::RegionalBank),
            "fintech" => Ok(BankCategory::Fintech),
            _ => Err(format!(
                "Unknown category: {}. Use 'major', 'regional', or 'fintech'",
                s
            )),
        }
    }
}

/// Store-listing style metadata for an app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppInfo {
    pub package: String,
    pub rating: f32,
    pub downloads: String,
    pub last_updated: NaiveDate,
    pub size_mb: u32,
    pub version: semver::Version,
    pub developer: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_major_banks() {
        assert_eq!(BankCategory::classify("no.dnb.mobilbank"), BankCategory::MajorBank);
        assert_eq!(BankCategory::classify("com.nordea.mobiletoken"), BankCategory::MajorBank);
        assert_eq!(BankCategory::classify("no.dnb.vipps"), BankCategory::MajorBank);
        assert_eq!(
            BankCategory::classify("com.danskebank.mobilebank3.no"),
            BankCategory::MajorBank
        );
    }

    #[test]
    fn test_classify_regional_banks() {
        assert_eq!(
            BankCategory::classify("no.sparebank1.mobilbank"),
            BankCategory::RegionalBank
        );
        assert_eq!(
            BankCategory::classify("no.skandiabanken.mobilbank"),
            BankCategory::RegionalBank
        );
        assert_eq!(BankCategory::classify("no.sbanken.mobilbank"), BankCategory::RegionalBank);
    }

    #[test]
    fn test_classify_fintech_fallback() {
        assert_eq!(BankCategory::classify("com.revolut.revolut"), BankCategory::Fintech);
        assert_eq!(BankCategory::classify("de.number26.android"), BankCategory::Fintech);
        assert_eq!(BankCategory::classify(""), BankCategory::Fintech);
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(BankCategory::classify("NO.DNB.MOBILBANK"), BankCategory::MajorBank);
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("major".parse::<BankCategory>(), Ok(BankCategory::MajorBank));
        assert_eq!("Regional".parse::<BankCategory>(), Ok(BankCategory::RegionalBank));
        assert_eq!("fintech".parse::<BankCategory>(), Ok(BankCategory::Fintech));
        assert!("credit-union".parse::<BankCategory>().is_err());
    }
}
