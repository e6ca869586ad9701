//! Presentation layer: run header, the single evolving progress line, and
//! the final summary in text or JSON form.

use std::io::Write;

use crate::bench::types::{Progress, RunSummary};

pub fn print_header(servers: &[String], domain_count: usize, record_type: &str, concurrency: usize) {
    println!("\nTesting DNS servers: {}", servers.join(", "));
    println!("Querying {} domains for '{}' records...", domain_count, record_type);
    println!("Concurrent requests: {}\n", concurrency);
}

/// Redraw the progress line in place. No newline until the run ends.
pub fn print_progress(p: &Progress) {
    print!(
        "\rProgress: {:.2}% ({}/{}) | QPS: {:.2} | Success: {}, Errors: {}",
        p.percent(),
        p.completed,
        p.total,
        p.qps(),
        p.succeeded,
        p.failed
    );
    let _ = std::io::stdout().flush();
}

pub fn print_summary(summary: &RunSummary) {
    println!("\n\n--- Test Summary ---");
    println!("DNS Servers Tested: {}", summary.servers.join(", "));
    println!("Total Domains Tested: {}", summary.total_domains);
    println!("Total Processing Time: {:.2} seconds", summary.duration_secs);
    println!("Successful Lookups: {}", summary.succeeded);
    println!("Failed Lookups: {}", summary.failed);

    if !summary.errors.is_empty() {
        println!("\nError Breakdown:");
        for error in &summary.errors {
            println!("  - {}: {}", error.kind, error.count);
        }
    }

    match &summary.latency {
        Some(latency) => {
            println!("\nPerformance Metrics (for successful lookups):");
            println!("  Average Query Time: {:.2} ms", latency.mean_ms);
            println!("  Median Query Time: {:.2} ms", latency.median_ms);
            println!("  Min Query Time: {:.2} ms", latency.min_ms);
            println!("  Max Query Time: {:.2} ms", latency.max_ms);
            if let Some(stddev) = latency.stddev_ms {
                println!("  Standard Deviation: {:.2} ms", stddev);
            }
            match summary.qps {
                Some(qps) => println!("  Overall Average QPS: {:.2}", qps),
                None => println!("  Overall Average QPS: undefined"),
            }
        }
        None => println!("\nNo successful lookups to calculate performance metrics."),
    }
}

pub fn print_summary_json(summary: &RunSummary) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(summary)
        .map_err(|e| anyhow::anyhow!("Failed to serialize summary: {}", e))?;
    println!("{}", json);
    Ok(())
}
