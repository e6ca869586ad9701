use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use hickory_resolver::proto::rr::RecordType;
use serde::Deserialize;
use tracing::warn;

use crate::cli::Cli;

/// Immutable parameters for one benchmark run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub servers: Vec<String>,
    pub record_type: RecordType,
    pub timeout: Duration,
    pub concurrency: usize,
}

impl RunConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.servers.is_empty() {
            return Err(anyhow::anyhow!("At least one DNS server is required"));
        }
        if self.concurrency == 0 {
            return Err(anyhow::anyhow!("Concurrency must be at least 1"));
        }
        if self.timeout.is_zero() {
            return Err(anyhow::anyhow!("Timeout must be greater than zero"));
        }
        Ok(())
    }
}

/// Optional TOML file; command-line flags override whatever it provides
#[derive(Debug, Deserialize, Clone, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub servers: Vec<String>,
    #[serde(default)]
    pub query: QuerySection,
    #[serde(default)]
    pub domains: DomainsSection,
}

#[derive(Debug, Deserialize, Clone)]
pub struct QuerySection {
    #[serde(default = "default_record_type")]
    pub record_type: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DomainsSection {
    #[serde(default = "default_count")]
    pub count: usize,
    #[serde(default = "default_list_url")]
    pub url: String,
    #[serde(default = "default_cache_file")]
    pub cache_file: String,
}

impl Default for QuerySection {
    fn default() -> Self {
        Self {
            record_type: default_record_type(),
            timeout_secs: default_timeout_secs(),
            concurrency: default_concurrency(),
        }
    }
}

impl Default for DomainsSection {
    fn default() -> Self {
        Self {
            count: default_count(),
            url: default_list_url(),
            cache_file: default_cache_file(),
        }
    }
}

// Default value functions
fn default_record_type() -> String { "A".to_string() }
fn default_timeout_secs() -> f64 { 2.0 }
fn default_concurrency() -> usize { 50 }
fn default_count() -> usize { 10_000 }
fn default_list_url() -> String {
    "https://s3-us-west-1.amazonaws.com/umbrella-static/top-1m.csv.zip".to_string()
}
fn default_cache_file() -> String { "top-1m.csv".to_string() }

impl FileConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
        let config: FileConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config '{}': {}", path.display(), e))?;
        Ok(config)
    }
}

/// Everything one invocation needs, merged from flags and file
#[derive(Debug, Clone)]
pub struct Settings {
    pub run: RunConfig,
    pub count: usize,
    pub list_url: String,
    pub cache_file: String,
    pub domains_file: Option<PathBuf>,
    pub json: bool,
}

impl Settings {
    /// Merge CLI flags over the optional config file. Flags win where both
    /// supply a value.
    pub fn resolve(cli: Cli) -> anyhow::Result<Self> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };

        let servers = if cli.servers.is_empty() {
            file.servers
        } else {
            cli.servers
        };

        let record_type = match cli.record_type.as_deref() {
            Some(s) => parse_record_type(s)?,
            None => parse_record_type(&file.query.record_type)?,
        };

        let timeout_secs = cli.timeout.unwrap_or(file.query.timeout_secs);
        if !timeout_secs.is_finite() || timeout_secs <= 0.0 {
            return Err(anyhow::anyhow!("Timeout must be greater than zero"));
        }

        let concurrency = cli.concurrency.unwrap_or(file.query.concurrency);

        let mut count = cli.count.unwrap_or(file.domains.count);
        if count == 0 {
            warn!("Domain count must be positive, using default of {}", default_count());
            count = default_count();
        }

        Ok(Self {
            run: RunConfig {
                servers,
                record_type,
                timeout: Duration::from_secs_f64(timeout_secs),
                concurrency,
            },
            count,
            list_url: file.domains.url,
            cache_file: file.domains.cache_file,
            domains_file: cli.domains_file,
            json: cli.json,
        })
    }
}

fn parse_record_type(s: &str) -> anyhow::Result<RecordType> {
    RecordType::from_str(&s.trim().to_uppercase())
        .map_err(|e| anyhow::anyhow!("Invalid record type '{}': {}", s, e))
}
