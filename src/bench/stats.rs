use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::bench::types::{ErrorCount, LatencyStats, RunState, RunSummary};
use crate::config::RunConfig;

/// Build the final summary from a finished run. Pure, reads the state only.
pub fn summarize(
    config: &RunConfig,
    started_at: DateTime<Utc>,
    state: &RunState,
    duration: Duration,
) -> RunSummary {
    let duration_secs = duration.as_secs_f64();

    let mut errors: Vec<ErrorCount> = state
        .tally
        .iter()
        .map(|(kind, count)| ErrorCount {
            kind: kind.to_string(),
            count: *count,
        })
        .collect();
    // Stable sort, so first-observed order breaks count ties
    errors.sort_by(|a, b| b.count.cmp(&a.count));

    let qps = if duration_secs > 0.0 {
        Some(state.total as f64 / duration_secs)
    } else {
        None
    };

    RunSummary {
        started_at,
        servers: config.servers.clone(),
        record_type: config.record_type.to_string(),
        total_domains: state.total,
        duration_secs,
        succeeded: state.succeeded,
        failed: state.failed,
        errors,
        latency: latency_stats(&state.latencies),
        qps,
    }
}

fn latency_stats(latencies: &[Duration]) -> Option<LatencyStats> {
    if latencies.is_empty() {
        return None;
    }

    let ms: Vec<f64> = latencies.iter().map(|d| d.as_secs_f64() * 1000.0).collect();
    let stddev_ms = if ms.len() >= 2 {
        Some(sample_stddev(&ms))
    } else {
        None
    };

    Some(LatencyStats {
        mean_ms: mean(&ms),
        median_ms: median(&ms),
        min_ms: ms.iter().copied().fold(f64::INFINITY, f64::min),
        max_ms: ms.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        stddev_ms,
    })
}

// ── math helpers ────────────────────────────────────

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Middle value; the average of the two middle values for even counts
fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Sample standard deviation (n - 1 denominator). Callers guarantee len >= 2.
fn sample_stddev(values: &[f64]) -> f64 {
    let avg = mean(values);
    let variance =
        values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
