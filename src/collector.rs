//! App metadata collection.
//!
//! The [`Collector`] trait is the seam for gathering store-listing details
//! about an app. [`SimulatedCollector`] synthesizes them from the run seed;
//! no network request is ever made.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::cache::Cache;
use crate::model::{AppInfo, AppTarget};
use crate::seed::{stream, Stage};

const DOWNLOAD_TIERS: &[&str] = &["1M+", "5M+", "10M+", "50M+"];

#[async_trait]
pub trait Collector: Send + Sync {
    fn name(&self) -> &'static str;
    async fn collect(&self, target: &AppTarget) -> Result<AppInfo>;
}

pub struct SimulatedCollector {
    seed: u64,
    cache: Cache,
}

impl SimulatedCollector {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            cache: Cache::disabled(),
        }
    }

    pub fn with_cache(seed: u64, cache: Cache) -> Self {
        Self { seed, cache }
    }

    fn cache_key(&self, package: &str) -> String {
        format!("app_info_{}_{}", self.seed, package)
    }

    fn synthesize(&self, target: &AppTarget) -> AppInfo {
        let mut rng = stream(self.seed, &target.package, Stage::Collect);

        let rating = (rng.gen_range(3.5f32..=4.8) * 10.0).round() / 10.0;
        let downloads = DOWNLOAD_TIERS
            .choose(&mut rng)
            .copied()
            .unwrap_or("1M+")
            .to_string();
        let size_mb = rng.gen_range(25..=80);
        let version = semver::Version::new(
            rng.gen_range(1..=6),
            rng.gen_range(0..=9),
            rng.gen_range(0..=9),
        );

        AppInfo {
            package: target.package.clone(),
            rating,
            downloads,
            last_updated: listing_date(),
            size_mb,
            version,
            developer: developer_name(&target.package),
        }
    }
}

#[async_trait]
impl Collector for SimulatedCollector {
    fn name(&self) -> &'static str {
        "simulated"
    }

    async fn collect(&self, target: &AppTarget) -> Result<AppInfo> {
        let key = self.cache_key(&target.package);
        if let Some(info) = self.cache.get::<AppInfo>(&key) {
            tracing::debug!(package = %target.package, "app info served from cache");
            return Ok(info);
        }

        let info = self.synthesize(target);
        if let Err(e) = self.cache.set(&key, &info) {
            tracing::warn!(package = %target.package, error = %e, "failed to cache app info");
        }
        Ok(info)
    }
}

fn listing_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 15).unwrap_or_default()
}

/// Derives a developer name from the second segment of a package id,
/// e.g. `no.dnb.mobilbank` becomes "Dnb Banking".
pub fn developer_name(package: &str) -> String {
    let segment = package
        .split('.')
        .nth(1)
        .filter(|s| !s.is_empty())
        .unwrap_or(package);
    format!("{} Banking", title_case(segment))
}

fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_developer_name() {
        assert_eq!(developer_name("no.dnb.mobilbank"), "Dnb Banking");
        assert_eq!(developer_name("com.revolut.revolut"), "Revolut Banking");
        assert_eq!(developer_name("de.number26.android"), "Number26 Banking");
        assert_eq!(developer_name("standalone"), "Standalone Banking");
    }

    #[test]
    fn test_title_case_restarts_after_digits() {
        assert_eq!(title_case("sparebank1x"), "Sparebank1X");
        assert_eq!(title_case("obos-banken"), "Obos-Banken");
    }

    #[tokio::test]
    async fn test_synthesized_fields_in_range() {
        let collector = SimulatedCollector::new(3);
        for target in crate::catalog::default_roster() {
            let info = collector.collect(&target).await.unwrap();
            assert!((3.5..=4.8).contains(&info.rating), "{}", info.rating);
            assert!((25..=80).contains(&info.size_mb));
            assert!((1..=6).contains(&info.version.major));
            assert!(info.version.minor <= 9 && info.version.patch <= 9);
            assert!(DOWNLOAD_TIERS.contains(&info.downloads.as_str()));
            assert_eq!(info.last_updated, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
            assert_eq!(info.package, target.package);
        }
    }

    #[tokio::test]
    async fn test_same_seed_same_info() {
        let target = AppTarget::new("Lunar", "co.lunarway.lunar");
        let a = SimulatedCollector::new(10).collect(&target).await.unwrap();
        let b = SimulatedCollector::new(10).collect(&target).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_cached_value_is_reused() {
        let tmp = TempDir::new().unwrap();
        let cache = Cache::in_dir(tmp.path(), 1);
        let collector = SimulatedCollector::with_cache(5, cache.clone());
        let target = AppTarget::new("Wise", "com.wise.android");

        let mut planted = collector.synthesize(&target);
        planted.developer = "Planted".to_string();
        cache.set(&collector.cache_key(&target.package), &planted).unwrap();

        let info = collector.collect(&target).await.unwrap();
        assert_eq!(info.developer, "Planted");
    }

    #[tokio::test]
    async fn test_cache_keeps_similar_packages_apart() {
        let tmp = TempDir::new().unwrap();
        let cached = SimulatedCollector::with_cache(1, Cache::in_dir(tmp.path(), 1));
        let uncached = SimulatedCollector::new(1);
        let dotted = AppTarget::new("My Bank", "no.my.bank");
        let underscored = AppTarget::new("My Bank", "no.my_bank");

        cached.collect(&dotted).await.unwrap();
        let info = cached.collect(&underscored).await.unwrap();

        assert_eq!(info.package, "no.my_bank");
        assert_eq!(info, uncached.collect(&underscored).await.unwrap());
    }
}
