// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `network.rs`

#[cfg(test)]
mod tests {
    use crate::network::{parse_cluster_domain, service_hostname_with_domain};

    #[test]
    fn test_parse_cluster_domain_from_pod_resolv_conf() {
        let resolv = "nameserver 10.96.0.10\n\
                      search default.svc.cluster.local svc.cluster.local cluster.local\n\
                      options ndots:5\n";

        assert_eq!(
            parse_cluster_domain(resolv.as_bytes()).as_deref(),
            Some("cluster.local")
        );
    }

    #[test]
    fn test_parse_cluster_domain_custom_domain() {
        let resolv = "search ns1.svc.corp.internal svc.corp.internal corp.internal\n";

        assert_eq!(
            parse_cluster_domain(resolv.as_bytes()).as_deref(),
            Some("corp.internal")
        );
    }

    #[test]
    fn test_parse_cluster_domain_trims_trailing_dot() {
        let resolv = "search svc.cluster.local.\n";

        assert_eq!(
            parse_cluster_domain(resolv.as_bytes()).as_deref(),
            Some("cluster.local")
        );
    }

    #[test]
    fn test_parse_cluster_domain_without_svc_search() {
        let resolv = "nameserver 8.8.8.8\nsearch example.com\n";

        assert_eq!(parse_cluster_domain(resolv.as_bytes()), None);
    }

    #[test]
    fn test_parse_cluster_domain_ignores_non_search_lines() {
        let resolv = "# search svc.wrong.local\nnameserver svc.also.wrong\n";

        assert_eq!(parse_cluster_domain(resolv.as_bytes()), None);
    }

    #[test]
    fn test_parse_cluster_domain_empty_input() {
        assert_eq!(parse_cluster_domain(&b""[..]), None);
    }

    #[test]
    fn test_service_hostname_with_domain() {
        assert_eq!(
            service_hostname_with_domain("echo", "ns1", "cluster.local"),
            "echo.ns1.svc.cluster.local"
        );
    }

}
