// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `DuckType` reconciliation logic.
//!
//! Each pass:
//!
//! 1. tracks the referenced Service so changes to it re-trigger reconciliation
//! 2. looks the Service up in the cache
//! 3. marks `Available` true (publishing `http://<service>.<namespace>.svc.<domain>`)
//!    or false (clearing the address)
//!
//! A missing Service is an expected state, not an error: the pass succeeds and the
//! tracker re-triggers it once the Service appears. Tracking and lookup failures are
//! returned unchanged and leave the status untouched.

use crate::constants::{ADDRESS_SCHEME, REASON_DUCK_TYPE_RECONCILED};
use crate::context::ReconcileContext;
use crate::crd::{Addressable, DuckType, DuckTypeStatus};
use crate::errors::ReconcileError;
use crate::events::ReconcileEvent;
use crate::lister::ServiceLister;
use crate::network::{cluster_domain_name, service_hostname_with_domain};
use crate::tracker::{Reference, Tracker};
use kube::runtime::reflector::ObjectRef;
use kube::ResourceExt;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Success event emitted when a `DuckType` resolves to its Service.
#[must_use]
pub fn new_reconciled_normal(namespace: &str, name: &str) -> ReconcileEvent {
    ReconcileEvent::normal(
        REASON_DUCK_TYPE_RECONCILED,
        format!("DuckType reconciled: \"{namespace}/{name}\""),
    )
}

/// Resolves `DuckType`s against the Service cache.
#[derive(Clone)]
pub struct DuckTypeReconciler {
    tracker: Arc<dyn Tracker>,
    lister: Arc<dyn ServiceLister>,
    cluster_domain: String,
}

impl DuckTypeReconciler {
    /// Reconciler publishing addresses under the process cluster domain.
    #[must_use]
    pub fn new(tracker: Arc<dyn Tracker>, lister: Arc<dyn ServiceLister>) -> Self {
        Self {
            tracker,
            lister,
            cluster_domain: cluster_domain_name().to_string(),
        }
    }

    /// Override the cluster domain used for published addresses.
    #[must_use]
    pub fn with_cluster_domain(mut self, domain: impl Into<String>) -> Self {
        self.cluster_domain = domain.into();
        self
    }

    /// Domain appended to `<service>.<namespace>.svc.` in published addresses.
    #[must_use]
    pub fn cluster_domain(&self) -> &str {
        &self.cluster_domain
    }

    /// Run one reconciliation pass, mutating `ducktype.status` in place.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(event))` - the Service exists and the address is published
    /// * `Ok(None)` - the Service does not exist; `Available` is false
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::Tracking`] or [`ReconcileError::Lookup`]; in both
    /// cases the status is left exactly as it was.
    pub fn reconcile_kind(
        &self,
        ctx: &ReconcileContext,
        ducktype: &mut DuckType,
    ) -> Result<Option<ReconcileEvent>, ReconcileError> {
        let _entered = ctx.span().enter();
        debug!("Reconciling DuckType {}", ctx.key());

        let namespace = ducktype.namespace().unwrap_or_default();
        let name = ducktype.name_any();
        let service_name = ducktype.spec.service_name.clone();

        let reference = Reference::service(&service_name, &namespace);
        let owner = ObjectRef::from_obj(&*ducktype);
        if let Err(source) = self.tracker.track_reference(&reference, &owner) {
            error!("Error tracking service {}: {}", service_name, source);
            return Err(ReconcileError::Tracking {
                service: service_name,
                source,
            });
        }

        match self.lister.get(&namespace, &service_name) {
            Err(e) if e.is_not_found() => {
                info!("Service does not yet exist: {}", service_name);
                status_mut(ducktype).mark_service_unavailable(&service_name);
                Ok(None)
            }
            Err(source) => {
                error!("Error reconciling service {}: {}", service_name, source);
                Err(ReconcileError::Lookup {
                    service: service_name,
                    source,
                })
            }
            Ok(_service) => {
                let host =
                    service_hostname_with_domain(&service_name, &namespace, &self.cluster_domain);
                debug!(service = %service_name, host = %host, "Service resolved");

                let status = status_mut(ducktype);
                status.mark_service_available();
                status.address = Some(Addressable::from_parts(ADDRESS_SCHEME, &host));

                Ok(Some(new_reconciled_normal(&namespace, &name)))
            }
        }
    }
}

fn status_mut(ducktype: &mut DuckType) -> &mut DuckTypeStatus {
    ducktype.status.get_or_insert_with(DuckTypeStatus::default)
}
