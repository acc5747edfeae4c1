//! Metrics collection module
//!
//! Tracks per-destination dispatch outcomes and response times.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Response times kept per destination
const RESPONSE_TIME_WINDOW: usize = 100;

/// Process-wide metrics collector
pub struct Metrics {
    /// Total multi-destination searches
    total_searches: AtomicU64,
    /// Per destination counters, keyed by location code
    destinations: RwLock<HashMap<String, DestinationCounters>>,
}

#[derive(Default)]
struct DestinationCounters {
    dispatches: u64,
    successes: u64,
    failures: u64,
    response_times: VecDeque<u64>,
}

impl DestinationCounters {
    fn avg_response_time(&self) -> Option<u64> {
        if self.response_times.is_empty() {
            None
        } else {
            Some(self.response_times.iter().sum::<u64>() / self.response_times.len() as u64)
        }
    }

    fn reliability(&self) -> f64 {
        if self.dispatches == 0 {
            100.0
        } else {
            (self.successes as f64 / self.dispatches as f64) * 100.0
        }
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

impl Metrics {
    /// Create a new metrics instance
    pub fn new() -> Self {
        Self {
            total_searches: AtomicU64::new(0),
            destinations: RwLock::new(HashMap::new()),
        }
    }

    /// Increment total search count
    pub fn inc_search(&self) {
        self.total_searches.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one settled dispatch
    pub fn record_dispatch(&self, destination: &str, succeeded: bool, time_ms: u64) {
        let mut destinations = write(&self.destinations);
        let entry = destinations.entry(destination.to_string()).or_default();

        entry.dispatches += 1;
        if succeeded {
            entry.successes += 1;
        } else {
            entry.failures += 1;
        }

        if entry.response_times.len() >= RESPONSE_TIME_WINDOW {
            entry.response_times.pop_front();
        }
        entry.response_times.push_back(time_ms);
    }

    /// Get total searches
    pub fn get_total_searches(&self) -> u64 {
        self.total_searches.load(Ordering::Relaxed)
    }

    /// Get average response time for a destination
    pub fn get_avg_response_time(&self, destination: &str) -> Option<u64> {
        read(&self.destinations)
            .get(destination)
            .and_then(DestinationCounters::avg_response_time)
    }

    /// Share of dispatches that produced offers, in percent
    pub fn get_reliability(&self, destination: &str) -> f64 {
        read(&self.destinations)
            .get(destination)
            .map_or(100.0, DestinationCounters::reliability)
    }

    /// Snapshot of every destination's statistics
    pub fn snapshot(&self) -> MetricsSnapshot {
        let destinations = read(&self.destinations);
        let stats = destinations
            .iter()
            .map(|(code, c)| {
                (
                    code.clone(),
                    DestinationStats {
                        dispatches: c.dispatches,
                        successes: c.successes,
                        failures: c.failures,
                        avg_response_time: c.avg_response_time(),
                        reliability: c.reliability(),
                    },
                )
            })
            .collect();

        MetricsSnapshot {
            total_searches: self.get_total_searches(),
            destinations: stats,
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics for a single destination
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationStats {
    pub dispatches: u64,
    pub successes: u64,
    pub failures: u64,
    pub avg_response_time: Option<u64>,
    pub reliability: f64,
}

/// Point-in-time view of all metrics
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub total_searches: u64,
    pub destinations: BTreeMap<String, DestinationStats>,
}
