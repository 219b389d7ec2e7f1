//! Built-in roster and category markers.
//!
//! Protection signatures and bypass-test definitions live on their enums
//! ([`Protection`](crate::model::Protection) and
//! [`BypassTestKind`](crate::model::BypassTestKind)); this module holds the
//! tables that are not tied to a single type.

use crate::model::AppTarget;

/// Package-id fragments that mark an app as belonging to a major bank.
pub const MAJOR_BANK_MARKERS: &[&str] = &["dnb", "nordea", "handelsbanken", "danske"];

/// Package-id fragments that mark an app as belonging to a regional bank.
pub const REGIONAL_BANK_MARKERS: &[&str] = &["sparebank", "skandia", "sbanken"];

const DEFAULT_APPS: &[(&str, &str)] = &[
    ("DNB Mobile", "no.dnb.mobilbank"),
    ("Nordea Mobile", "com.nordea.mobiletoken"),
    ("Sparebank 1", "no.sparebank1.mobilbank"),
    ("Handelsbanken", "com.handelsbanken.mobile.android.no"),
    ("Skandiabanken", "no.skandiabanken.mobilbank"),
    ("Bank Norwegian", "no.banknorwegian.mobilbank"),
    ("Storebrand Bank", "no.storebrand.mobilbank"),
    ("Cultura Bank", "no.culturabank.mobilbank"),
    ("Komplett Bank", "no.komplettbank.mobilbank"),
    ("Sbanken", "no.sbanken.mobilbank"),
    ("Danske Bank", "com.danskebank.mobilebank3.no"),
    ("SEB", "com.seb.android.no"),
    ("Santander", "no.santander.mobilbank"),
    ("OBOS-banken", "no.obosbanken.mobilbank"),
    ("Vipps", "no.dnb.vipps"),
    ("Swedbank Norway", "com.swedbank.mobilbank.no"),
    ("Nordnet", "com.nordnet.android.no"),
    ("Sparebanken Vest", "no.sparebankenvest.mobilbank"),
    ("Sparebanken Øst", "no.sparebankenost.mobilbank"),
    ("Sparebanken Møre", "no.sparebankenmore.mobilbank"),
    ("Klarna", "com.myklarnamobile"),
    ("Lunar", "co.lunarway.lunar"),
    ("Revolut", "com.revolut.revolut"),
    ("N26", "de.number26.android"),
    ("Wise", "com.wise.android"),
];

/// Returns the default roster of Nordic and European banking apps.
///
/// # Example
///
/// ```
/// use shieldscan::catalog::default_roster;
///
/// let roster = default_roster();
/// assert_eq!(roster.len(), 25);
/// assert_eq!(roster[0].package, "no.dnb.mobilbank");
/// ```
pub fn default_roster() -> Vec<AppTarget> {
    DEFAULT_APPS
        .iter()
        .map(|(name, package)| AppTarget::new(*name, *package))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BankCategory;
    use std::collections::HashSet;

    #[test]
    fn test_roster_packages_are_unique() {
        let roster = default_roster();
        let unique: HashSet<_> = roster.iter().map(|a| a.package.as_str()).collect();
        assert_eq!(unique.len(), roster.len());
    }

    #[test]
    fn test_roster_covers_every_category() {
        let roster = default_roster();
        for category in BankCategory::ALL {
            assert!(
                roster.iter().any(|a| a.category() == category),
                "no app in {}",
                category
            );
        }
    }

    #[test]
    fn test_roster_category_counts() {
        let roster = default_roster();
        let major = roster
            .iter()
            .filter(|a| a.category() == BankCategory::MajorBank)
            .count();
        let regional = roster
            .iter()
            .filter(|a| a.category() == BankCategory::RegionalBank)
            .count();
        // DNB, Nordea, Handelsbanken, Danske Bank, Vipps
        assert_eq!(major, 5);
        // Sparebank 1, Skandiabanken, Sbanken, Sparebanken Vest/Øst/Møre,
        // and OBOS-banken through the "sbanken" marker
        assert_eq!(regional, 7);
    }
}
