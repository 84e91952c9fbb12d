use dashmap::DashMap;
use serde::Serialize;
use std::time::Duration;

use crate::models::ModifiedRequest;

// Aggregated timings for one method/path
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MonitoringPath {
    pub count: u64,
    pub total: Duration,
}

impl MonitoringPath {
    pub fn average(&self) -> Duration {
        if self.count == 0 {
            return Duration::ZERO;
        }
        // u32 division is enough for realistic counts; saturate otherwise
        self.total / u32::try_from(self.count).unwrap_or(u32::MAX)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PathStats {
    pub path: String,
    pub count: u64,
    pub total_ms: f64,
    pub average_ms: f64,
}

/// Per-path call counts and latency.
///
/// Count and total time of an entry are changed together under that entry's
/// shard lock, so a reader never sees one without the other.
#[derive(Debug, Default)]
pub struct StatsRecorder {
    paths: DashMap<String, MonitoringPath>,
}

impl StatsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_stats(&self, call: &ModifiedRequest, elapsed: Duration) {
        let mut entry = self.paths.entry(call.path.clone()).or_default();
        entry.count += 1;
        entry.total += elapsed;
    }

    /// Owned copy of every entry, sorted by path.
    pub fn snapshot(&self) -> Vec<PathStats> {
        let mut out: Vec<PathStats> = self
            .paths
            .iter()
            .map(|e| {
                let stats = *e.value();
                PathStats {
                    path: e.key().clone(),
                    count: stats.count,
                    total_ms: stats.total.as_secs_f64() * 1000.0,
                    average_ms: stats.average().as_secs_f64() * 1000.0,
                }
            })
            .collect();
        out.sort_by(|a, b| a.path.cmp(&b.path));
        out
    }
}

#[cfg(test)]
impl StatsRecorder {
    pub fn get(&self, path: &str) -> Option<MonitoringPath> {
        self.paths.get(path).map(|e| *e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn call(path: &str) -> ModifiedRequest {
        ModifiedRequest {
            path: path.into(),
            remote_addr: "1.2.3.4".into(),
            id: None,
        }
    }

    #[test]
    fn creates_and_accumulates_entries() {
        let stats = StatsRecorder::new();
        assert_eq!(stats.get("eth_call"), None);

        stats.update_stats(&call("eth_call"), Duration::from_millis(10));
        stats.update_stats(&call("eth_call"), Duration::from_millis(30));
        stats.update_stats(&call("net_version"), Duration::from_millis(5));

        let eth = stats.get("eth_call").unwrap();
        assert_eq!(eth.count, 2);
        assert_eq!(eth.total, Duration::from_millis(40));
        assert_eq!(eth.average(), Duration::from_millis(20));
        assert_eq!(stats.get("net_version").unwrap().count, 1);
    }

    #[test]
    fn snapshot_is_sorted_and_consistent() {
        let stats = StatsRecorder::new();
        stats.update_stats(&call("net_version"), Duration::from_millis(4));
        stats.update_stats(&call("eth_call"), Duration::from_millis(2));
        stats.update_stats(&call("eth_call"), Duration::from_millis(4));

        let snap = stats.snapshot();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap[0].path, "eth_call");
        assert_eq!(snap[0].count, 2);
        assert!((snap[0].total_ms - 6.0).abs() < 1e-9);
        assert!((snap[0].average_ms - 3.0).abs() < 1e-9);
        assert_eq!(snap[1].path, "net_version");
    }

    #[test]
    fn empty_entry_average_is_zero() {
        assert_eq!(MonitoringPath::default().average(), Duration::ZERO);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_updates_are_not_lost() {
        let stats = Arc::new(StatsRecorder::new());
        let mut tasks = Vec::new();
        for _ in 0..32 {
            let stats = Arc::clone(&stats);
            tasks.push(tokio::spawn(async move {
                for _ in 0..100 {
                    stats.update_stats(&call("eth_blockNumber"), Duration::from_millis(1));
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let entry = stats.get("eth_blockNumber").unwrap();
        assert_eq!(entry.count, 3200);
        assert_eq!(entry.total, Duration::from_millis(3200));
    }
}
