// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Cluster-local DNS names for Services.
//!
//! A Service `echo` in namespace `ns1` is reachable at
//! `echo.ns1.svc.<cluster-domain>`. The cluster domain is resolved once per process:
//!
//! 1. the `CLUSTER_DOMAIN` environment variable, if set and non-empty
//! 2. the first `search` domain in `/etc/resolv.conf` starting with `svc.`, prefix stripped
//! 3. `cluster.local`

use crate::constants::{CLUSTER_DOMAIN_ENV, DEFAULT_CLUSTER_DOMAIN, RESOLV_CONF_PATH};
use std::io::{BufRead, BufReader, Read};
use std::sync::OnceLock;
use tracing::debug;

static CLUSTER_DOMAIN: OnceLock<String> = OnceLock::new();

/// The cluster domain, resolved on first use.
pub fn cluster_domain_name() -> &'static str {
    CLUSTER_DOMAIN.get_or_init(|| {
        let domain = resolve_cluster_domain();
        debug!(domain = %domain, "Resolved cluster domain");
        domain
    })
}

fn resolve_cluster_domain() -> String {
    if let Ok(domain) = std::env::var(CLUSTER_DOMAIN_ENV) {
        if !domain.trim().is_empty() {
            return domain.trim().to_string();
        }
    }

    std::fs::File::open(RESOLV_CONF_PATH)
        .ok()
        .and_then(parse_cluster_domain)
        .unwrap_or_else(|| DEFAULT_CLUSTER_DOMAIN.to_string())
}

/// Extract the cluster domain from resolv.conf content.
///
/// Looks for `search` lines such as
/// `search default.svc.cluster.local svc.cluster.local cluster.local`
/// and returns the first domain starting with `svc.` with that prefix removed.
pub fn parse_cluster_domain(reader: impl Read) -> Option<String> {
    BufReader::new(reader)
        .lines()
        .map_while(Result::ok)
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            (fields.next() == Some("search")).then(|| fields.map(str::to_string).collect::<Vec<_>>())
        })
        .flatten()
        .find_map(|domain| {
            domain
                .strip_prefix("svc.")
                .map(|d| d.trim_end_matches('.').to_string())
                .filter(|d| !d.is_empty())
        })
}

/// Fully qualified Service hostname under `domain`.
///
/// # Example
///
/// ```rust
/// use discovery::network::service_hostname_with_domain;
///
/// let host = service_hostname_with_domain("echo", "ns1", "cluster.local");
/// assert_eq!(host, "echo.ns1.svc.cluster.local");
/// ```
#[must_use]
pub fn service_hostname_with_domain(name: &str, namespace: &str, domain: &str) -> String {
    format!("{name}.{namespace}.svc.{domain}")
}
