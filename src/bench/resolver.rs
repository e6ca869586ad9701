use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use hickory_resolver::error::ResolveErrorKind;
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::proto::rr::{Record, RecordType};
use hickory_resolver::TokioAsyncResolver;

use crate::bench::types::FailureKind;
use crate::config::RunConfig;

/// Seam between the run loop and the actual resolution backend
#[async_trait]
pub trait Resolve: Send + Sync {
    async fn resolve(
        &self,
        domain: &str,
        record_type: RecordType,
    ) -> Result<Vec<Record>, FailureKind>;
}

/// Adapter over hickory-resolver, configured with explicit nameservers only.
/// Never consults the system resolver configuration or the hosts file.
pub struct HickoryResolver {
    inner: TokioAsyncResolver,
    /// Overall per-query deadline
    lifetime: Duration,
}

impl HickoryResolver {
    pub fn from_config(config: &RunConfig) -> anyhow::Result<Self> {
        let ips = parse_server_ips(&config.servers)?;
        let group = NameServerConfigGroup::from_ips_clear(&ips, 53, true);
        let resolver_config = ResolverConfig::from_parts(None, Vec::new(), group);

        let mut opts = ResolverOpts::default();
        opts.timeout = config.timeout;
        opts.attempts = 1;
        // No caching, every query hits the server under test
        opts.cache_size = 0;
        opts.use_hosts_file = false;

        Ok(Self {
            inner: TokioAsyncResolver::tokio(resolver_config, opts),
            lifetime: config.timeout,
        })
    }
}

#[async_trait]
impl Resolve for HickoryResolver {
    async fn resolve(
        &self,
        domain: &str,
        record_type: RecordType,
    ) -> Result<Vec<Record>, FailureKind> {
        let lookup = tokio::time::timeout(self.lifetime, self.inner.lookup(domain, record_type))
            .await
            .map_err(|_| FailureKind::Timeout)?;

        match lookup {
            Ok(lookup) => Ok(lookup.records().to_vec()),
            Err(e) => Err(classify_error(e.kind())),
        }
    }
}

fn parse_server_ips(servers: &[String]) -> anyhow::Result<Vec<IpAddr>> {
    servers
        .iter()
        .map(|s| {
            s.trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid DNS server address '{}': {}", s, e))
        })
        .collect()
}

/// Map a resolver error onto the closed failure taxonomy. The variant name,
/// not the message, becomes the tally key.
fn classify_error(kind: &ResolveErrorKind) -> FailureKind {
    match kind {
        ResolveErrorKind::NoRecordsFound { response_code, .. } => {
            if *response_code == ResponseCode::NXDomain {
                FailureKind::NxDomain
            } else {
                FailureKind::NoAnswer
            }
        }
        ResolveErrorKind::Timeout => FailureKind::Timeout,
        ResolveErrorKind::NoConnections => FailureKind::Other("NoConnections".to_string()),
        ResolveErrorKind::Io(_) => FailureKind::Other("Io".to_string()),
        ResolveErrorKind::Proto(_) => FailureKind::Other("Proto".to_string()),
        ResolveErrorKind::Message(_) | ResolveErrorKind::Msg(_) => {
            FailureKind::Other("Message".to_string())
        }
        _ => FailureKind::Other("Unknown".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(servers: Vec<String>) -> RunConfig {
        RunConfig {
            servers,
            record_type: RecordType::A,
            timeout: Duration::from_secs(2),
            concurrency: 50,
        }
    }

    #[test]
    fn test_parse_server_ips_accepts_v4_and_v6() {
        let ips = parse_server_ips(&["1.1.1.1".to_string(), "2606:4700:4700::1111".to_string()])
            .expect("both addresses are valid");
        assert_eq!(ips.len(), 2);
    }

    #[test]
    fn test_parse_server_ips_rejects_hostname() {
        let err = parse_server_ips(&["dns.example.com".to_string()]).unwrap_err();
        assert!(
            err.to_string().contains("Invalid DNS server address"),
            "got {}",
            err
        );
    }

    #[tokio::test]
    async fn test_from_config_builds_for_valid_servers() {
        let config = test_config(vec!["127.0.0.1".to_string()]);
        let resolver = HickoryResolver::from_config(&config);
        assert!(resolver.is_ok());
    }

    #[test]
    fn test_classify_timeout_kind() {
        assert_eq!(classify_error(&ResolveErrorKind::Timeout), FailureKind::Timeout);
    }

    #[test]
    fn test_classify_other_kinds_use_variant_names() {
        assert_eq!(
            classify_error(&ResolveErrorKind::NoConnections),
            FailureKind::Other("NoConnections".to_string())
        );
        assert_eq!(
            classify_error(&ResolveErrorKind::Msg("socket closed".to_string())),
            FailureKind::Other("Message".to_string())
        );
    }
}
