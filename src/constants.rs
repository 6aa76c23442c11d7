// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the DuckType discovery controller.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// API Constants
// ============================================================================

/// API group for the `DuckType` CRD
pub const API_GROUP: &str = "discovery.knative.dev";

/// API version for the `DuckType` CRD
pub const API_VERSION: &str = "v1alpha1";

/// Fully qualified API version (group/version)
pub const API_GROUP_VERSION: &str = "discovery.knative.dev/v1alpha1";

/// Kind name for `DuckType` resource
pub const KIND_DUCK_TYPE: &str = "DuckType";

// ============================================================================
// Tracked Target Constants
// ============================================================================

/// API version of the addressable target kind (core group)
pub const SERVICE_API_VERSION: &str = "v1";

/// Kind of the addressable target tracked for every `DuckType`
pub const KIND_SERVICE: &str = "Service";

// ============================================================================
// Address Constants
// ============================================================================

/// Scheme published in `status.address.url`
pub const ADDRESS_SCHEME: &str = "http";

/// Cluster domain used when neither the environment nor resolv.conf provide one
pub const DEFAULT_CLUSTER_DOMAIN: &str = "cluster.local";

/// Environment variable overriding the cluster domain
pub const CLUSTER_DOMAIN_ENV: &str = "CLUSTER_DOMAIN";

/// Resolver configuration consulted for the cluster domain search suffix
pub const RESOLV_CONF_PATH: &str = "/etc/resolv.conf";

// ============================================================================
// Event Constants
// ============================================================================

/// Event reason emitted when a `DuckType` resolves to its Service
pub const REASON_DUCK_TYPE_RECONCILED: &str = "DuckTypeReconciled";

/// Event reason emitted when a reconciliation pass fails
pub const REASON_INTERNAL_ERROR: &str = "InternalError";

/// Action string attached to published events
pub const EVENT_ACTION_RECONCILE: &str = "Reconcile";

// ============================================================================
// Controller Defaults
// ============================================================================

/// Default name reported as the event source
pub const DEFAULT_CONTROLLER_NAME: &str = "ducktype-controller";

/// Default interval between successful reconciliations of the same `DuckType` (10 minutes)
///
/// Every pass renews the object's tracker lease, so this must stay well inside
/// the lease.
pub const DEFAULT_RESYNC_SECS: u64 = 600;

/// Tracker lease as a multiple of the resync interval
pub const TRACKER_LEASE_RESYNC_FACTOR: u32 = 3;

/// Requeue delay after a failed reconciliation (30 seconds)
pub const ERROR_REQUEUE_DURATION_SECS: u64 = 30;

/// Default bind address for the metrics and health endpoint
pub const DEFAULT_METRICS_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Number of Tokio worker threads for the controller runtime
pub const TOKIO_WORKER_THREADS: usize = 4;
