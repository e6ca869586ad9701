use std::time::{Duration, Instant};

use hickory_resolver::proto::rr::RecordType;

use crate::bench::resolver::Resolve;
use crate::bench::types::{FailureKind, Outcome, QueryResult};

/// Run one query and fold whatever happens into a `QueryResult`. Never
/// returns an error; every failure becomes data.
///
/// A timeout reports the configured deadline as its latency, not the
/// measured wall time.
pub async fn classify(
    resolver: &dyn Resolve,
    domain: &str,
    record_type: RecordType,
    timeout: Duration,
) -> QueryResult {
    let start = Instant::now();
    let outcome = match resolver.resolve(domain, record_type).await {
        Ok(_) => Outcome::Success,
        Err(kind) => Outcome::Failed(kind),
    };

    let latency = match &outcome {
        Outcome::Failed(FailureKind::Timeout) => timeout,
        _ => start.elapsed(),
    };

    QueryResult {
        domain: domain.to_string(),
        latency,
        outcome,
    }
}
