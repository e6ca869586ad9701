mod bench;
mod cli;
mod config;
mod domains;
mod report;

use clap::Parser;
use rand::seq::SliceRandom;
use tracing::info;

use crate::bench::engine::BenchRunner;
use crate::cli::Cli;
use crate::config::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout belongs to the progress line and summary
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "neko_bench=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::resolve(cli)?;

    info!("🐱 neko-bench v{} starting...", env!("CARGO_PKG_VERSION"));

    // Bad servers or limits fail here, before any download or query
    let runner = BenchRunner::new(settings.run.clone())?;

    let mut domains = match &settings.domains_file {
        Some(path) => domains::load_from_file(path, settings.count)?,
        None => domains::acquire(settings.count, &settings.list_url, &settings.cache_file).await,
    };
    if domains.is_empty() {
        return Err(anyhow::anyhow!("No domains available to test"));
    }

    // Shuffle so rank order in the source list cannot bias the run
    domains.shuffle(&mut rand::thread_rng());

    if !settings.json {
        report::print_header(
            &settings.run.servers,
            domains.len(),
            &settings.run.record_type.to_string(),
            settings.run.concurrency,
        );
    }

    let json = settings.json;
    let run = runner.run(&domains, |progress| {
        if !json {
            report::print_progress(progress);
        }
    });

    tokio::select! {
        summary = run => {
            if json {
                report::print_summary_json(&summary)?;
            } else {
                report::print_summary(&summary);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            // Dropping the run drops its tasks; nothing partial gets reported
            println!("\n\nTest interrupted by user. Exiting.");
        }
    }

    Ok(())
}
