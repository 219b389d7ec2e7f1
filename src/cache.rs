//! File-based cache for collected app metadata.
//!
//! Store-listing details change slowly, so collected [`AppInfo`] values are
//! kept as JSON files and reused until they expire.
//!
//! # Cache Location
//!
//! - Linux: `~/.cache/shieldscan/`
//! - macOS: `~/Library/Caches/shieldscan/`
//! - Windows: `%LOCALAPPDATA%\shieldscan\`
//!
//! [`AppInfo`]: crate::model::AppInfo
//!
//! # Example
//!
//! ```no_run
//! use shieldscan::Cache;
//!
//! let cache = Cache::new();
//! cache.set("app_info_no.dnb.mobilbank", &"cached value".to_string()).unwrap();
//!
//! let value: Option<String> = cache.get("app_info_no.dnb.mobilbank");
//! assert_eq!(value, Some("cached value".to_string()));
//! ```

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Default cache TTL in hours.
const CACHE_TTL_HOURS: u64 = 24;

/// A file-based cache with TTL support.
#[derive(Debug, Clone)]
pub struct Cache {
    dir: PathBuf,
    ttl: Duration,
    enabled: bool,
}

/// Returns the platform cache directory for shieldscan.
pub fn cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("shieldscan")
}

impl Cache {
    /// Creates a cache in the platform cache directory with a 24-hour TTL.
    pub fn new() -> Self {
        Self::with_ttl_hours(CACHE_TTL_HOURS)
    }

    pub fn with_ttl_hours(hours: u64) -> Self {
        Self::in_dir(cache_dir(), hours)
    }

    /// Creates a cache rooted at `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>, hours: u64) -> Self {
        Self {
            dir: dir.into(),
            ttl: Duration::from_secs(hours.saturating_mul(3600)),
            enabled: true,
        }
    }

    /// A cache that never stores anything and always misses.
    pub fn disabled() -> Self {
        Self {
            dir: cache_dir(),
            ttl: Duration::ZERO,
            enabled: false,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)
                .with_context(|| format!("creating cache directory {}", self.dir.display()))?;
        }
        Ok(())
    }

    /// Converts a cache key to a safe filename.
    ///
    /// Bytes outside `[A-Za-z0-9.-]` become `_xx`, so distinct keys never
    /// share a file.
    fn cache_path(&self, key: &str) -> PathBuf {
        let mut safe_key = String::with_capacity(key.len());
        for byte in key.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'.' {
                safe_key.push(byte as char);
            } else {
                safe_key.push_str(&format!("_{:02x}", byte));
            }
        }
        self.dir.join(format!("{}.json", safe_key))
    }

    fn is_expired(&self, path: &Path) -> bool {
        fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| SystemTime::now().duration_since(modified).ok())
            .map_or(false, |elapsed| elapsed > self.ttl)
    }

    /// Retrieves a value, or `None` if it is missing, expired or unreadable.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        if !self.enabled {
            return None;
        }

        let path = self.cache_path(key);
        if !path.exists() {
            return None;
        }

        if self.is_expired(&path) {
            tracing::debug!(key, "cache entry expired");
            let _ = fs::remove_file(&path);
            return None;
        }

        let content = fs::read_to_string(&path).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Stores a value as JSON. A disabled cache accepts and drops it.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        self.ensure_dir()?;
        let path = self.cache_path(key);
        let content = serde_json::to_string(value)?;
        fs::write(&path, content)
            .with_context(|| format!("writing cache entry {}", path.display()))?;
        Ok(())
    }

    /// Removes every cached entry and returns how many were removed.
    pub fn clear(&self) -> Result<usize> {
        self.remove_entries(|_| true)
    }

    /// Removes entries older than the TTL, including ones no later run
    /// will ask for again.
    pub fn prune_expired(&self) -> Result<usize> {
        if !self.enabled {
            return Ok(0);
        }
        let removed = self.remove_entries(|path| self.is_expired(path))?;
        if removed > 0 {
            tracing::debug!(removed, "pruned expired cache entries");
        }
        Ok(removed)
    }

    fn remove_entries(&self, mut select: impl FnMut(&Path) -> bool) -> Result<usize> {
        let mut removed = 0;
        if self.dir.exists() {
            let entries = fs::read_dir(&self.dir)
                .with_context(|| format!("reading cache directory {}", self.dir.display()))?;
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().map(|e| e == "json").unwrap_or(false)
                    && select(path.as_path())
                    && fs::remove_file(&path).is_ok()
                {
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_then_get() {
        let tmp = TempDir::new().unwrap();
        let cache = Cache::in_dir(tmp.path(), 1);

        cache.set("app_info_no.dnb.mobilbank", &42u32).unwrap();
        assert_eq!(cache.get::<u32>("app_info_no.dnb.mobilbank"), Some(42));
    }

    #[test]
    fn test_key_is_sanitized() {
        let tmp = TempDir::new().unwrap();
        let cache = Cache::in_dir(tmp.path(), 1);
        let path = cache.cache_path("no.sparebankenøst/../x");
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "no.sparebanken_c3_b8st_2f.._2fx.json"
        );
        assert_eq!(path.parent().unwrap(), tmp.path());
    }

    #[test]
    fn test_similar_keys_use_distinct_files() {
        let tmp = TempDir::new().unwrap();
        let cache = Cache::in_dir(tmp.path(), 1);
        assert_ne!(cache.cache_path("no.my.bank"), cache.cache_path("no.my_bank"));
        assert_ne!(cache.cache_path("a_2e"), cache.cache_path("a."));

        cache.set("app_info_1_no.my.bank", &"dotted".to_string()).unwrap();
        cache.set("app_info_1_no.my_bank", &"underscored".to_string()).unwrap();
        assert_eq!(
            cache.get::<String>("app_info_1_no.my.bank").as_deref(),
            Some("dotted")
        );
        assert_eq!(
            cache.get::<String>("app_info_1_no.my_bank").as_deref(),
            Some("underscored")
        );
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let cache = Cache::in_dir("unused", u64::MAX);
        assert_eq!(cache.ttl, Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_prune_expired_sweeps_unread_entries() {
        let tmp = TempDir::new().unwrap();
        let cache = Cache::in_dir(tmp.path(), 0);
        for seed in 0..5 {
            cache.set(&format!("app_info_{}_no.dnb.mobilbank", seed), &seed).unwrap();
        }
        fs::write(tmp.path().join("keep.txt"), "x").unwrap();
        std::thread::sleep(Duration::from_millis(20));

        assert_eq!(cache.prune_expired().unwrap(), 5);
        assert!(tmp.path().join("keep.txt").exists());
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_prune_keeps_fresh_entries() {
        let tmp = TempDir::new().unwrap();
        let cache = Cache::in_dir(tmp.path(), 1);
        cache.set("fresh", &1u8).unwrap();
        assert_eq!(cache.prune_expired().unwrap(), 0);
        assert_eq!(cache.get::<u8>("fresh"), Some(1));
    }

    #[test]
    fn test_zero_ttl_expires_immediately() {
        let tmp = TempDir::new().unwrap();
        let cache = Cache::in_dir(tmp.path(), 0);
        cache.set("k", &"v".to_string()).unwrap();
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(cache.get::<String>("k"), None);
        assert!(!cache.cache_path("k").exists());
    }

    #[test]
    fn test_disabled_cache_never_hits() {
        let cache = Cache::disabled();
        cache.set("k", &"v".to_string()).unwrap();
        assert_eq!(cache.get::<String>("k"), None);
    }

    #[test]
    fn test_clear_removes_json_entries() {
        let tmp = TempDir::new().unwrap();
        let cache = Cache::in_dir(tmp.path(), 1);
        cache.set("a", &1u8).unwrap();
        cache.set("b", &2u8).unwrap();
        fs::write(tmp.path().join("keep.txt"), "x").unwrap();

        assert_eq!(cache.clear().unwrap(), 2);
        assert!(tmp.path().join("keep.txt").exists());
        assert_eq!(cache.get::<u8>("a"), None);
    }
}
