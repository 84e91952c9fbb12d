use dashmap::DashMap;
use std::collections::{HashSet, VecDeque};
use std::time::{Duration, Instant};

use crate::admission::Admission;
use crate::models::ModifiedRequest;

pub const RATE_WINDOW: Duration = Duration::from_secs(60);

// Rate limit entry - admitted call times for one IP, oldest first,
// plus every call evaluated for it, admitted or not
#[derive(Debug, Default)]
pub struct RateLimitEntry {
    hits: VecDeque<Instant>,
    evaluated: u64,
}

impl RateLimitEntry {
    // drop everything that fell out of the window ending at `now`
    fn evict_expired(&mut self, now: Instant, window: Duration) {
        while let Some(oldest) = self.hits.front() {
            if now.duration_since(*oldest) < window {
                break;
            }
            self.hits.pop_front();
        }
    }

    pub fn count(&self) -> usize {
        self.hits.len()
    }
}

/// Per-IP sliding window limiter.
///
/// Each IP may have at most `limit` admitted calls inside any `window`-long
/// interval. The map entry lock serializes concurrent calls for the same IP,
/// so no admission is lost or double counted.
pub struct RateLimiter {
    entries: DashMap<String, RateLimitEntry>,
    limit: u32,
    window: Duration,
    no_limit: HashSet<String>,
}

impl RateLimiter {
    pub fn new(limit: u32, no_limit: impl IntoIterator<Item = String>) -> Self {
        Self::with_window(limit, RATE_WINDOW, no_limit)
    }

    pub fn with_window(
        limit: u32,
        window: Duration,
        no_limit: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            entries: DashMap::new(),
            limit,
            window,
            no_limit: no_limit.into_iter().collect(),
        }
    }

    pub fn allow_limit(&self, call: &ModifiedRequest) -> bool {
        if self.no_limit.contains(&call.remote_addr) {
            return true;
        }

        let now = Instant::now();
        let mut entry = self
            .entries
            .entry(call.remote_addr.clone())
            .or_default();

        entry.evaluated += 1;
        entry.evict_expired(now, self.window);

        // under limit: admit and count it
        if entry.count() < self.limit as usize {
            entry.hits.push_back(now);
            return true;
        }

        tracing::debug!(client = %call.remote_addr, evaluated = entry.evaluated, "rate limit exceeded");
        false
    }
}

#[cfg(test)]
impl RateLimiter {
    // calls currently counted against `ip` (including expired ones not yet evicted)
    fn count(&self, ip: &str) -> usize {
        self.entries.get(ip).map(|e| e.count()).unwrap_or(0)
    }

    fn evaluated(&self, ip: &str) -> u64 {
        self.entries.get(ip).map(|e| e.evaluated).unwrap_or(0)
    }

    fn tracked_ips(&self) -> usize {
        self.entries.len()
    }
}

impl Admission for RateLimiter {
    fn admits(&self, call: &ModifiedRequest) -> bool {
        self.allow_limit(call)
    }
}
