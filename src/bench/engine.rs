use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::bench::classify::classify;
use crate::bench::resolver::{HickoryResolver, Resolve};
use crate::bench::stats::summarize;
use crate::bench::types::{Progress, QueryResult, RunState, RunSummary};
use crate::config::RunConfig;

/// Benchmark run coordinator
/// 同時実行の上限を守りながら全ドメインを流し切る
///
/// One shared resolver serves the whole run. Completions are consumed in
/// whatever order they finish, never in submission order.
pub struct BenchRunner {
    config: RunConfig,
    resolver: Arc<dyn Resolve>,
}

impl std::fmt::Debug for BenchRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BenchRunner")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl BenchRunner {
    /// Validate the config and build the real resolver. All fatal errors
    /// surface here, before any query is issued.
    pub fn new(config: RunConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let resolver: Arc<dyn Resolve> = Arc::new(HickoryResolver::from_config(&config)?);
        Ok(Self { config, resolver })
    }

    /// Same runner with the resolution backend swapped out
    pub fn with_resolver(config: RunConfig, resolver: Arc<dyn Resolve>) -> anyhow::Result<Self> {
        config.validate()?;
        Ok(Self { config, resolver })
    }

    /// Query every domain once and return the summary. `on_progress` fires
    /// after each completion with the updated counts.
    pub async fn run(
        &self,
        domains: &[String],
        mut on_progress: impl FnMut(&Progress),
    ) -> RunSummary {
        let started_at = Utc::now();
        let started = Instant::now();

        let limiter = Arc::new(Semaphore::new(self.config.concurrency));
        let mut tasks: JoinSet<QueryResult> = JoinSet::new();

        for domain in domains {
            let limiter = limiter.clone();
            let resolver = self.resolver.clone();
            let domain = domain.clone();
            let record_type = self.config.record_type;
            let timeout = self.config.timeout;

            tasks.spawn(async move {
                // Permit held for the whole query, released on every exit path
                let _permit = limiter
                    .acquire_owned()
                    .await
                    .expect("limiter is never closed");
                classify(resolver.as_ref(), &domain, record_type, timeout).await
            });
        }
        debug!("Spawned {} query tasks (ceiling {})", domains.len(), self.config.concurrency);

        let mut state = RunState::new(domains.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => {
                    state.record(&result);
                    on_progress(&Progress {
                        completed: state.completed,
                        total: state.total,
                        succeeded: state.succeeded,
                        failed: state.failed,
                        elapsed: started.elapsed(),
                    });
                }
                Err(e) => warn!("Query task failed to join: {}", e),
            }
        }

        let duration = started.elapsed();
        debug!(
            "Run finished: {}/{} successful in {:.2}s",
            state.succeeded,
            state.total,
            duration.as_secs_f64()
        );
        summarize(&self.config, started_at, &state, duration)
    }
}
