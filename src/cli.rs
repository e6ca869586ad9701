use std::path::PathBuf;

use clap::Parser;

/// Concurrent DNS resolver benchmark
#[derive(Debug, Parser)]
#[command(name = "neko-bench", version, about)]
pub struct Cli {
    /// DNS server IP addresses to benchmark
    #[arg(value_name = "SERVER", required_unless_present = "config")]
    pub servers: Vec<String>,

    /// How many top domains to query
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Per-query timeout in seconds
    #[arg(short = 't', long)]
    pub timeout: Option<f64>,

    /// Maximum number of in-flight queries
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// Record type to query (A, AAAA, MX, ...)
    #[arg(short = 'r', long)]
    pub record_type: Option<String>,

    /// Newline-separated domain list, skips the top-domains download
    #[arg(long, value_name = "FILE")]
    pub domains_file: Option<PathBuf>,

    /// TOML config file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the summary as JSON and suppress progress output
    #[arg(long)]
    pub json: bool,
}
