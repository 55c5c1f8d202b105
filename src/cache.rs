use crate::error::Result;
use log::debug;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Cache duration to avoid hammering slow controller tools with repeat runs
pub const CACHE_DURATION: Duration = Duration::from_secs(180);

pub fn default_cache_dir() -> PathBuf {
    std::env::temp_dir().join("baymap")
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Cache entries are plain files: first line is the write timestamp in unix
/// seconds, the rest is the captured output verbatim.
pub struct CommandCache {
    dir: PathBuf,
    ttl: Duration,
    now: fn() -> u64,
    refresh: bool,
}

impl CommandCache {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            ttl: CACHE_DURATION,
            now: unix_now,
            refresh: false,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_clock(mut self, now: fn() -> u64) -> Self {
        self.now = now;
        self
    }

    /// When set, reads are skipped so every command runs fresh. Writes still
    /// happen, so the next invocation sees the new output.
    pub fn with_refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    pub fn get(&self, key: &str) -> Option<String> {
        if self.refresh {
            debug!("Cache bypassed for '{}'", key);
            return None;
        }
        let path = self.dir.join(Self::file_name(key));
        let content = fs::read_to_string(&path).ok()?;
        let (stamp, payload) = content.split_once('\n')?;
        let written: u64 = stamp.trim().parse().ok()?;
        let age = (self.now)().saturating_sub(written);
        if age > self.ttl.as_secs() {
            debug!("Cache entry for '{}' is stale ({}s old)", key, age);
            return None;
        }
        debug!("Cache hit for '{}' ({}s old)", key, age);
        Some(payload.to_string())
    }

    /// Writes go through a temp file and a rename so readers never observe a
    /// partially written entry.
    pub fn put(&self, key: &str, payload: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let name = Self::file_name(key);
        let temp = self.dir.join(format!("{}.tmp", name));
        fs::write(&temp, format!("{}\n{}", (self.now)(), payload))?;
        fs::rename(&temp, self.dir.join(name))?;
        Ok(())
    }

    fn file_name(key: &str) -> String {
        key.chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect()
    }
}
