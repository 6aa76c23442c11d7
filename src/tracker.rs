// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Dependency tracking between `DuckType`s and the objects they reference.
//!
//! The reconciler declares "this `DuckType`'s status depends on Service X" through
//! [`Tracker::track_reference`]. The Service watch consults [`ReferenceTracker::owners_of`]
//! to decide which `DuckType`s to enqueue when a Service changes.
//!
//! Tracking is leased: an entry expires unless it is renewed by a later
//! reconciliation. The controller requeues every `DuckType` on a resync interval
//! shorter than the lease and every pass re-tracks its reference, so live owners
//! never expire while deleted owners eventually drop out of the index.
//!
//! # Example
//!
//! ```rust
//! use discovery::crd::DuckType;
//! use discovery::tracker::{Reference, ReferenceTracker, Tracker};
//! use kube::runtime::reflector::ObjectRef;
//! use std::time::Duration;
//!
//! let tracker = ReferenceTracker::new(Duration::from_secs(60));
//! let owner = ObjectRef::<DuckType>::new("echo-discovery").within("default");
//! let reference = Reference::service("echo", "default");
//!
//! tracker.track_reference(&reference, &owner).unwrap();
//! assert_eq!(tracker.owners_of(&reference), vec![owner]);
//! ```

use crate::constants::{KIND_SERVICE, SERVICE_API_VERSION, TRACKER_LEASE_RESYNC_FACTOR};
use crate::crd::DuckType;
use crate::errors::TrackerError;
use k8s_openapi::api::core::v1::Service;
use kube::runtime::reflector::ObjectRef;
use kube::ResourceExt;
use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Identity of a tracked object.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Reference {
    pub api_version: String,
    pub kind: String,
    pub namespace: String,
    pub name: String,
}

impl Reference {
    /// Reference to a core `v1` `Service`.
    #[must_use]
    pub fn service(name: &str, namespace: &str) -> Self {
        Self {
            api_version: SERVICE_API_VERSION.to_string(),
            kind: KIND_SERVICE.to_string(),
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }

    /// Reference to an observed `Service` object.
    #[must_use]
    pub fn for_service(service: &Service) -> Self {
        Self::service(&service.name_any(), &service.namespace().unwrap_or_default())
    }

    /// Check that every identifying field is set.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidReference`] naming the first empty field.
    pub fn validate(&self) -> Result<(), TrackerError> {
        let fields = [
            ("apiVersion", &self.api_version),
            ("kind", &self.kind),
            ("namespace", &self.namespace),
            ("name", &self.name),
        ];
        match fields.iter().find(|(_, value)| value.is_empty()) {
            Some((field, _)) => Err(TrackerError::InvalidReference {
                reference: self.to_string(),
                field: *field,
            }),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} {}/{}",
            self.api_version, self.kind, self.namespace, self.name
        )
    }
}

/// Registry of "owner's status depends on reference" relationships.
pub trait Tracker: Send + Sync {
    /// Record that `owner` must be reconciled whenever `reference` changes.
    ///
    /// # Errors
    ///
    /// Any error is retryable; the caller must not proceed with the pass.
    fn track_reference(
        &self,
        reference: &Reference,
        owner: &ObjectRef<DuckType>,
    ) -> Result<(), TrackerError>;
}

type Leases = HashMap<ObjectRef<DuckType>, Instant>;

/// In-memory, leased [`Tracker`].
///
/// Expired leases are swept on every [`track_reference`](Tracker::track_reference)
/// and [`tracked_references`](ReferenceTracker::tracked_references) call, so owners
/// that stopped reconciling (for example because they were deleted) drop out of the
/// index without any explicit cleanup.
pub struct ReferenceTracker {
    lease: Duration,
    index: RwLock<HashMap<Reference, Leases>>,
}

impl ReferenceTracker {
    /// Tracker whose entries expire `lease` after their last renewal.
    #[must_use]
    pub fn new(lease: Duration) -> Self {
        Self {
            lease,
            index: RwLock::new(HashMap::new()),
        }
    }

    /// Tracker for owners that are reconciled at least every `resync`.
    ///
    /// The lease is [`TRACKER_LEASE_RESYNC_FACTOR`] resync intervals, so a live
    /// owner survives a couple of delayed passes.
    #[must_use]
    pub fn for_resync(resync: Duration) -> Self {
        Self::new(resync * TRACKER_LEASE_RESYNC_FACTOR)
    }

    /// How long an entry survives without renewal.
    #[must_use]
    pub fn lease(&self) -> Duration {
        self.lease
    }

    /// Owners with an unexpired lease on `reference`. Expired leases are pruned.
    #[must_use]
    pub fn owners_of(&self, reference: &Reference) -> Vec<ObjectRef<DuckType>> {
        let now = Instant::now();
        let Ok(mut index) = self.index.write() else {
            return Vec::new();
        };

        let Some(leases) = index.get_mut(reference) else {
            return Vec::new();
        };
        leases.retain(|_, expiry| *expiry > now);

        let owners: Vec<_> = leases.keys().cloned().collect();
        if leases.is_empty() {
            index.remove(reference);
        }

        trace!(%reference, owners = owners.len(), "Resolved tracked owners");
        owners
    }

    /// Number of distinct references with at least one unexpired lease.
    #[must_use]
    pub fn tracked_references(&self) -> usize {
        let Ok(mut index) = self.index.write() else {
            return 0;
        };
        sweep_expired(&mut index, Instant::now());
        index.len()
    }
}

/// Drop expired leases, and references left without any owner.
fn sweep_expired(index: &mut HashMap<Reference, Leases>, now: Instant) {
    let before = index.len();
    index.retain(|_, leases| {
        leases.retain(|_, expiry| *expiry > now);
        !leases.is_empty()
    });
    let swept = before - index.len();
    if swept > 0 {
        debug!(swept, "Dropped references with expired leases");
    }
}

impl Tracker for ReferenceTracker {
    fn track_reference(
        &self,
        reference: &Reference,
        owner: &ObjectRef<DuckType>,
    ) -> Result<(), TrackerError> {
        reference.validate()?;

        let now = Instant::now();
        let mut index = self.index.write().map_err(|_| TrackerError::Poisoned)?;
        sweep_expired(&mut index, now);
        index
            .entry(reference.clone())
            .or_default()
            .insert(owner.clone(), now + self.lease);

        trace!(%reference, owner = %owner, "Tracking reference");
        Ok(())
    }
}
