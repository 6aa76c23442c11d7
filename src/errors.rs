// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for the `DuckType` reconciler.
//!
//! This module provides specialized error types for:
//! - Dependency tracking failures ([`TrackerError`])
//! - Cached Service lookups ([`ListerError`])
//! - A reconciliation pass as a whole ([`ReconcileError`])
//!
//! Only [`ListerError::NotFound`] is an expected outcome. The reconciler turns it
//! into a status update; every other error is handed back to the controller,
//! which requeues the object.

use thiserror::Error;

/// Errors raised while registering a dependency with the tracker.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackerError {
    /// The reference is missing one of its identifying fields.
    ///
    /// Returned for e.g. a `DuckType` whose `spec.serviceName` is empty.
    #[error("Invalid reference {reference}: {field} must not be empty")]
    InvalidReference {
        /// Display form of the offending reference
        reference: String,
        /// Name of the empty field
        field: &'static str,
    },

    /// The tracker's index lock was poisoned by a panicking thread.
    #[error("Tracker index is unavailable: lock poisoned")]
    Poisoned,
}

/// Errors returned by a cached Service lookup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListerError {
    /// The Service does not exist in the cache.
    #[error("Service '{namespace}/{name}' not found")]
    NotFound {
        /// Namespace that was searched
        namespace: String,
        /// Service name that was not found
        name: String,
    },

    /// The cache has not finished its initial list; answers would be incomplete.
    #[error("Service cache has not synced yet")]
    CacheNotSynced,

    /// Any other cache failure.
    #[error("Failed to read Service '{namespace}/{name}' from cache: {reason}")]
    CacheError {
        /// Namespace that was searched
        namespace: String,
        /// Service name that was looked up
        name: String,
        /// Specific reason for the failure
        reason: String,
    },
}

impl ListerError {
    /// Whether this is the "target does not exist" outcome.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Errors that abort a reconciliation pass.
///
/// Every variant is retryable. The status of the `DuckType` is never modified
/// when one of these is returned.
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// Dependency registration failed; the lookup was not attempted.
    #[error("Error tracking service {service}: {source}")]
    Tracking {
        /// Service the tracker was asked to watch
        service: String,
        #[source]
        source: TrackerError,
    },

    /// Cached lookup failed with something other than "not found".
    #[error("Error reconciling service {service}: {source}")]
    Lookup {
        /// Service that was looked up
        service: String,
        #[source]
        source: ListerError,
    },

    /// Writing the status subresource failed.
    #[error("Failed to update DuckType status: {0}")]
    Kube(#[from] kube::Error),
}

impl ReconcileError {
    /// Short label used for metrics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Tracking { .. } => "tracking",
            Self::Lookup { .. } => "lookup",
            Self::Kube(_) => "status_update",
        }
    }
}
