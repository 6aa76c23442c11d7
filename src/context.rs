// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared and request-scoped context for the `DuckType` controller.
//!
//! - [`Context`] is built once at startup and shared by every reconciliation as
//!   an `Arc<Context>`: Kubernetes client, Service cache, dependency tracker and
//!   event publisher.
//! - [`ReconcileContext`] is built per pass and passed explicitly to the
//!   reconciler. It carries the object key and the tracing span of the pass.

use crate::crd::DuckType;
use crate::events::EventPublisher;
use crate::lister::StoreServiceLister;
use crate::reconcilers::ducktype::DuckTypeReconciler;
use crate::tracker::ReferenceTracker;
use kube::{Client, ResourceExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info_span, Span};

/// Shared context passed to the controller.
#[derive(Clone)]
pub struct Context {
    /// Kubernetes client for status writes
    pub client: Client,

    /// Reflector-backed Service cache
    pub services: StoreServiceLister,

    /// Dependency index consulted by the Service watch
    pub tracker: Arc<ReferenceTracker>,

    /// Sink for Kubernetes Events
    pub events: Arc<dyn EventPublisher>,

    /// Core decision logic
    pub reconciler: DuckTypeReconciler,

    /// Delay before retrying a failed pass
    pub error_requeue: Duration,

    /// Delay before re-running a successful pass
    pub resync: Duration,
}

impl Context {
    /// Assemble the context, wiring the reconciler to the shared tracker and cache.
    #[must_use]
    pub fn new(
        client: Client,
        services: StoreServiceLister,
        tracker: Arc<ReferenceTracker>,
        events: Arc<dyn EventPublisher>,
        error_requeue: Duration,
        resync: Duration,
    ) -> Self {
        let reconciler = DuckTypeReconciler::new(tracker.clone(), Arc::new(services.clone()));
        Self {
            client,
            services,
            tracker,
            events,
            reconciler,
            error_requeue,
            resync,
        }
    }
}

/// Request-scoped values for a single reconciliation pass.
#[derive(Clone, Debug)]
pub struct ReconcileContext {
    key: String,
    span: Span,
}

impl ReconcileContext {
    /// Context for reconciling `ducktype`, keyed `namespace/name`.
    #[must_use]
    pub fn for_object(ducktype: &DuckType) -> Self {
        let key = format!(
            "{}/{}",
            ducktype.namespace().unwrap_or_default(),
            ducktype.name_any()
        );
        let span = info_span!("reconcile", key = %key);
        Self { key, span }
    }

    /// `namespace/name` of the object being reconciled.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn span(&self) -> &Span {
        &self.span
    }
}
