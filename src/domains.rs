//! Domain-list acquisition: the cached top-sites CSV, downloaded and
//! extracted on first use, with a built-in fallback list.

use std::io::Read;
use std::path::Path;
use std::time::Duration;

use tracing::{info, warn};

/// Canonical member name inside the downloaded archive
const TOP_LIST_MEMBER: &str = "top-1m.csv";

/// Used when the top-sites list cannot be downloaded or read
const FALLBACK_DOMAINS: [&str; 20] = [
    "google.com", "youtube.com", "facebook.com", "twitter.com", "instagram.com",
    "wikipedia.org", "amazon.com", "yahoo.com", "reddit.com", "netflix.com",
    "office.com", "linkedin.com", "microsoft.com", "apple.com", "ebay.com",
    "bing.com", "twitch.tv", "stackoverflow.com", "github.com", "wordpress.org",
];

/// Acquire up to `count` target domains. Prefers the local CSV cache,
/// downloads it when absent, and falls back to the built-in list when
/// neither works.
pub async fn acquire(count: usize, url: &str, cache_file: &str) -> Vec<String> {
    match top_domains(count, url, cache_file).await {
        Ok(domains) => {
            if domains.len() < count {
                warn!(
                    "Requested {} domains but only {} were available",
                    count,
                    domains.len()
                );
            }
            domains
        }
        Err(e) => {
            warn!("Could not load top domains ({}), using built-in fallback list", e);
            fallback(count)
        }
    }
}

/// Read a newline-separated domain list. Blank lines and `#` comments are
/// skipped.
pub fn load_from_file(path: &Path, count: usize) -> anyhow::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read domains file '{}': {}", path.display(), e))?;

    let domains: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .take(count)
        .map(|line| line.to_string())
        .collect();

    if domains.is_empty() {
        return Err(anyhow::anyhow!(
            "Domains file '{}' contains no usable entries",
            path.display()
        ));
    }
    Ok(domains)
}

async fn top_domains(count: usize, url: &str, cache_file: &str) -> anyhow::Result<Vec<String>> {
    let cache = Path::new(cache_file);
    if cache.exists() {
        info!("Using existing domain list '{}'", cache_file);
    } else {
        info!("Downloading domain list from {}", url);
        let bytes = download(url).await?;
        extract_csv(&bytes, cache)?;
        info!("Downloaded and extracted '{}'", cache_file);
    }

    let domains = load_csv(cache, count)?;
    info!("Loaded {} domains from '{}'", domains.len(), cache_file);
    Ok(domains)
}

async fn download(url: &str) -> anyhow::Result<Vec<u8>> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| anyhow::anyhow!("Could not download domain list: {}", e))?
        .error_for_status()
        .map_err(|e| anyhow::anyhow!("Could not download domain list: {}", e))?;

    let bytes = response
        .bytes()
        .await
        .map_err(|e| anyhow::anyhow!("Could not read domain list body: {}", e))?;
    Ok(bytes.to_vec())
}

/// Pull the CSV out of the downloaded archive and write it to `target`.
/// Prefers the canonical member name, otherwise takes the first CSV present.
fn extract_csv(zip_bytes: &[u8], target: &Path) -> anyhow::Result<()> {
    let reader = std::io::Cursor::new(zip_bytes);
    let mut archive = zip::ZipArchive::new(reader)
        .map_err(|e| anyhow::anyhow!("Downloaded archive is not a valid zip: {}", e))?;

    let member = if archive.file_names().any(|n| n == TOP_LIST_MEMBER) {
        TOP_LIST_MEMBER.to_string()
    } else {
        let found = archive
            .file_names()
            .find(|n| n.to_lowercase().ends_with(".csv"))
            .map(|n| n.to_string())
            .ok_or_else(|| anyhow::anyhow!("No CSV member in downloaded archive"))?;
        info!("'{}' not in archive, extracting '{}' instead", TOP_LIST_MEMBER, found);
        found
    };

    let mut file = archive
        .by_name(&member)
        .map_err(|e| anyhow::anyhow!("Failed to open zip member '{}': {}", member, e))?;
    let mut out = Vec::new();
    file.read_to_end(&mut out)
        .map_err(|e| anyhow::anyhow!("Failed to read zip member '{}': {}", member, e))?;

    std::fs::write(target, &out)
        .map_err(|e| anyhow::anyhow!("Failed to write '{}': {}", target.display(), e))?;
    Ok(())
}

/// Load up to `count` domains from the rank,domain CSV. The domain is the
/// second column.
fn load_csv(path: &Path, count: usize) -> anyhow::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read '{}': {}", path.display(), e))?;

    let mut domains = Vec::new();
    for (i, line) in content.lines().enumerate() {
        if domains.len() >= count {
            break;
        }
        let mut parts = line.splitn(3, ',');
        let _rank = parts.next();
        match parts.next() {
            Some(second) => {
                let domain = second.trim();
                if !domain.is_empty() {
                    domains.push(domain.to_string());
                }
            }
            // Warn only near the top of the file
            None => {
                if i < 5 {
                    warn!("Skipping malformed row {} in '{}': '{}'", i + 1, path.display(), line);
                }
            }
        }
    }

    if domains.is_empty() {
        return Err(anyhow::anyhow!("No domains loaded from '{}'", path.display()));
    }
    Ok(domains)
}

fn fallback(count: usize) -> Vec<String> {
    let mut list: Vec<String> = FALLBACK_DOMAINS.iter().map(|s| (*s).to_string()).collect();
    list.truncate(count);
    if list.is_empty() {
        // Last resort pair
        return vec!["google.com".to_string(), "cloudflare.com".to_string()];
    }
    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn zip_with(members: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        for (name, content) in members {
            let options = zip::write::SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Stored);
            writer.start_file(*name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_load_csv_takes_the_second_column() {
        let file = write_temp("1,google.com\n2,youtube.com\n3,facebook.com\n");
        let domains = load_csv(file.path(), 10).unwrap();
        assert_eq!(domains, vec!["google.com", "youtube.com", "facebook.com"]);
    }

    #[test]
    fn test_load_csv_stops_at_count() {
        let file = write_temp("1,a.com\n2,b.com\n3,c.com\n");
        let domains = load_csv(file.path(), 2).unwrap();
        assert_eq!(domains, vec!["a.com", "b.com"]);
    }

    #[test]
    fn test_load_csv_skips_malformed_rows() {
        let file = write_temp("1,a.com\nnocomma\n3,b.com\n4,\n5,c.com\n");
        let domains = load_csv(file.path(), 10).unwrap();
        assert_eq!(domains, vec!["a.com", "b.com", "c.com"]);
    }

    #[test]
    fn test_load_csv_rejects_empty_file() {
        let file = write_temp("");
        assert!(load_csv(file.path(), 10).is_err());
    }

    #[tokio::test]
    async fn test_existing_cache_skips_the_download() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("top-1m.csv");
        std::fs::write(&cache, "1,a.com\n2,b.com\n").unwrap();

        // Unreachable URL, so any download attempt would fail the load
        let domains = top_domains(10, "http://127.0.0.1:1/none.zip", cache.to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(domains, vec!["a.com", "b.com"]);
    }

    #[test]
    fn test_extract_prefers_canonical_member() {
        let bytes = zip_with(&[("readme.txt", "hello"), ("top-1m.csv", "1,a.com\n")]);
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("top-1m.csv");

        extract_csv(&bytes, &target).unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "1,a.com\n");
    }

    #[test]
    fn test_extract_falls_back_to_any_csv() {
        let bytes = zip_with(&[("other-list.CSV", "1,b.com\n")]);
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("top-1m.csv");

        extract_csv(&bytes, &target).unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "1,b.com\n");
    }

    #[test]
    fn test_extract_fails_without_csv() {
        let bytes = zip_with(&[("readme.txt", "hello")]);
        let dir = tempfile::tempdir().unwrap();

        let err = extract_csv(&bytes, &dir.path().join("top-1m.csv")).unwrap_err();
        assert!(err.to_string().contains("No CSV member"), "got {}", err);
    }

    #[test]
    fn test_load_from_file_skips_comments_and_blanks() {
        let file = write_temp("# corp domains\n\nexample.com\n  internal.example  \n");
        let domains = load_from_file(file.path(), 10).unwrap();
        assert_eq!(domains, vec!["example.com", "internal.example"]);
    }

    #[test]
    fn test_load_from_file_rejects_empty_lists() {
        let file = write_temp("# nothing here\n\n");
        assert!(load_from_file(file.path(), 10).is_err());
    }

    #[test]
    fn test_fallback_truncates_to_count() {
        let list = fallback(3);
        assert_eq!(list.len(), 3);
        assert_eq!(list[0], "google.com");
    }

    #[test]
    fn test_fallback_never_returns_empty() {
        let list = fallback(0);
        assert_eq!(list, vec!["google.com", "cloudflare.com"]);
    }
}
