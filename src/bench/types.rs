use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Why a query failed. `Other` carries a stable identifier derived from the
/// underlying error's kind, never its message text, so equal kinds group
/// together in the tally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum FailureKind {
    #[error("NXDOMAIN")]
    NxDomain,
    #[error("NoAnswer")]
    NoAnswer,
    #[error("Timeout")]
    Timeout,
    #[error("{0}")]
    Other(String),
}

/// Outcome of one classified query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failed(FailureKind),
}

/// One completed query with its measured latency
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub domain: String,
    pub latency: Duration,
    pub outcome: Outcome,
}

/// Running tally for one benchmark run, owned solely by the coordinator
#[derive(Debug)]
pub struct RunState {
    pub total: usize,
    pub completed: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Error kinds in first-observed order
    pub tally: Vec<(FailureKind, u64)>,
    /// Latencies of successful queries only, append-only
    pub latencies: Vec<Duration>,
}

impl RunState {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            completed: 0,
            succeeded: 0,
            failed: 0,
            tally: Vec::new(),
            latencies: Vec::new(),
        }
    }

    /// Fold one completed query into the counts
    pub fn record(&mut self, result: &QueryResult) {
        self.completed += 1;
        match &result.outcome {
            Outcome::Success => {
                self.succeeded += 1;
                self.latencies.push(result.latency);
            }
            Outcome::Failed(kind) => {
                self.failed += 1;
                match self.tally.iter_mut().find(|(k, _)| k == kind) {
                    Some((_, n)) => *n += 1,
                    None => self.tally.push((kind.clone(), 1)),
                }
            }
        }
    }
}

/// Snapshot handed to the progress callback after every completion
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Time since the first submission
    pub elapsed: Duration,
}

impl Progress {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.completed as f64 / self.total as f64 * 100.0
        }
    }

    /// Live throughput over the run so far, 0 until the clock has moved
    pub fn qps(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.completed as f64 / secs
        } else {
            0.0
        }
    }
}

/// Final report for one run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub servers: Vec<String>,
    pub record_type: String,
    pub total_domains: usize,
    pub duration_secs: f64,
    pub succeeded: usize,
    pub failed: usize,
    /// Sorted descending by count, first-observed order breaks ties
    pub errors: Vec<ErrorCount>,
    /// None when there were no successful lookups
    pub latency: Option<LatencyStats>,
    /// Total domains over total duration; None when the duration is zero
    pub qps: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorCount {
    pub kind: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LatencyStats {
    pub mean_ms: f64,
    pub median_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    /// Sample standard deviation (n - 1); None with fewer than two samples
    pub stddev_ms: Option<f64>,
}
