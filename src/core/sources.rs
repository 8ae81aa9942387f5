//! Expansion of broadcasters into candidate stream endpoints.
//!
//! Every broadcaster is crossed with the configured transport hosts, quality
//! postfixes and container extensions. The resulting list is computed once at
//! startup and never changes, so positions in it double as stable indices for
//! the in-flight table.

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use url::Url;

use crate::core::config::{Broadcaster, DefaultPolicy};
use crate::error::{LivegrabError, Result};

/// Stable identity of one physical endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceKey(String);

impl SourceKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSource {
    pub key: SourceKey,
    pub url: String,
    pub folder: PathBuf,
    pub prefix: String,
    /// Short tag for the host/quality/extension combination, e.g. `h1-Y-flv`
    pub variant: String,
    pub check_only: bool,
    pub notify: bool,
    pub icon: Option<String>,
    pub name: String,
}

/// Filename prefix: broadcaster override, else `"<name>."`
pub fn resolve_prefix(broadcaster: &Broadcaster) -> String {
    match &broadcaster.prefix {
        Some(prefix) => prefix.clone(),
        None => format!("{}.", broadcaster.name),
    }
}

/// Output folder: broadcaster override, else policy default, else the built-in fallback
pub fn resolve_folder(broadcaster: &Broadcaster, policy: &DefaultPolicy) -> PathBuf {
    match &broadcaster.folder {
        Some(folder) => PathBuf::from(folder),
        None => PathBuf::from(policy.output_folder()),
    }
}

/// Check that every configured host is an absolute http(s) URL
pub fn validate_hosts(hosts: &[String]) -> Result<()> {
    for host in hosts {
        let parsed = Url::parse(host)
            .map_err(|e| LivegrabError::invalid_source(format!("{}: {}", host, e)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(LivegrabError::invalid_source(format!(
                "{}: scheme must be http or https",
                host
            )));
        }
        if parsed.host_str().is_none() {
            return Err(LivegrabError::invalid_source(format!("{}: missing host", host)));
        }
    }
    Ok(())
}

fn fetch_url(host: &str, broadcaster: &Broadcaster, quality: &str, extension: &str) -> String {
    format!(
        "{}/live/{}{}.{}",
        host.trim_end_matches('/'),
        broadcaster.id,
        quality,
        extension
    )
}

fn variant_tag(host_index: usize, quality: &str, extension: &str) -> String {
    let quality = if quality.is_empty() { "src" } else { quality };
    format!("h{}-{}-{}", host_index + 1, quality, extension)
}

/// Expand every broadcaster into its ordered list of candidate sources.
///
/// Duplicate endpoints (a broadcaster id listed twice, or a repeated host)
/// keep their first occurrence only.
pub fn expand(broadcasters: &[Broadcaster], policy: &DefaultPolicy) -> Result<Vec<CandidateSource>> {
    let hosts = policy.stream_hosts();
    let qualities = policy.qualities();
    let extensions = policy.extensions();

    validate_hosts(&hosts)?;
    if extensions.iter().any(|e| e.is_empty()) {
        return Err(LivegrabError::config("container extensions must not be empty"));
    }

    let mut seen = HashSet::new();
    let mut sources = Vec::with_capacity(broadcasters.len() * hosts.len() * qualities.len() * extensions.len());

    for broadcaster in broadcasters {
        let prefix = resolve_prefix(broadcaster);
        let folder = resolve_folder(broadcaster, policy);

        for (host_index, host) in hosts.iter().enumerate() {
            for quality in &qualities {
                for extension in &extensions {
                    let url = fetch_url(host, broadcaster, quality, extension);
                    let key = SourceKey(url.clone());

                    if !seen.insert(key.clone()) {
                        log::warn!("Skipping duplicate source {} ({})", key, broadcaster.name);
                        continue;
                    }

                    sources.push(CandidateSource {
                        key,
                        url,
                        folder: folder.clone(),
                        prefix: prefix.clone(),
                        variant: variant_tag(host_index, quality, extension),
                        check_only: policy.check_only,
                        notify: broadcaster.enable_notify,
                        icon: broadcaster.icon.clone(),
                        name: broadcaster.name.clone(),
                    });
                }
            }
        }
    }

    Ok(sources)
}
