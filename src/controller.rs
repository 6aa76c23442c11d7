// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `kube::runtime::Controller` glue for `DuckType` resources.
//!
//! The reconciler in [`crate::reconcilers::ducktype`] only decides what the status
//! should be. This module runs it on a copy of the object, persists the result,
//! publishes Kubernetes Events, records metrics and maps Service changes back to
//! the `DuckType`s that track them.
//!
//! Service events re-trigger a pass through the tracker. Successful passes are
//! also requeued after the resync interval: that renews the tracker lease, which
//! would otherwise expire for a `DuckType` whose Service never changes.

use crate::context::{Context, ReconcileContext};
use crate::crd::{DuckType, DuckTypeStatus};
use crate::errors::ReconcileError;
use crate::events::ReconcileEvent;
use crate::metrics::{record_reconciliation, record_tracked_references, ReconcileOutcome};
use crate::reconcilers::ducktype::DuckTypeReconciler;
use crate::reconcilers::status::DuckTypeStatusUpdater;
use crate::tracker::{Reference, ReferenceTracker};
use k8s_openapi::api::core::v1::Service;
use kube::runtime::controller::Action;
use kube::runtime::reflector::ObjectRef;
use kube::{Resource, ResourceExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Run the reconciler against a copy of `ducktype` and return the resulting status.
///
/// Conditions are initialized to `Unknown` before the pass and `observedGeneration`
/// is stamped after it. On error nothing is returned, so the stored status stays
/// as it was.
///
/// # Errors
///
/// Propagates [`ReconcileError`] from the reconciler unchanged.
pub fn reconcile_status(
    reconciler: &DuckTypeReconciler,
    ducktype: &DuckType,
) -> Result<(DuckTypeStatus, Option<ReconcileEvent>), ReconcileError> {
    let ctx = ReconcileContext::for_object(ducktype);

    let mut working = ducktype.clone();
    working
        .status
        .get_or_insert_with(DuckTypeStatus::default)
        .initialize_conditions();

    let event = reconciler.reconcile_kind(&ctx, &mut working)?;

    let mut status = working.status.unwrap_or_default();
    status.observed_generation = ducktype.metadata.generation;
    Ok((status, event))
}

/// Reconcile entry point handed to `Controller::run`.
///
/// # Errors
///
/// Returns the pass's [`ReconcileError`]; the controller then applies [`error_policy`].
pub async fn reconcile(ducktype: Arc<DuckType>, ctx: Arc<Context>) -> Result<Action, ReconcileError> {
    let start = Instant::now();
    let object_ref = ducktype.object_ref(&());

    let result = match reconcile_status(&ctx.reconciler, &ducktype) {
        Ok((status, event)) => DuckTypeStatusUpdater::new(&ducktype, status)
            .apply(&ctx.client)
            .await
            .map(|_| event)
            .map_err(ReconcileError::from),
        Err(e) => Err(e),
    };
    record_tracked_references(ctx.tracker.tracked_references());

    match result {
        Ok(Some(event)) => {
            ctx.events.publish(&object_ref, &event).await;
            record_reconciliation(ReconcileOutcome::Reconciled, start.elapsed());
            info!(
                "Successfully reconciled DuckType: {}/{}",
                ducktype.namespace().unwrap_or_default(),
                ducktype.name_any()
            );
            Ok(Action::requeue(ctx.resync))
        }
        Ok(None) => {
            record_reconciliation(ReconcileOutcome::Unavailable, start.elapsed());
            info!(
                "DuckType {}/{} is waiting for Service {}",
                ducktype.namespace().unwrap_or_default(),
                ducktype.name_any(),
                ducktype.spec.service_name
            );
            Ok(Action::requeue(ctx.resync))
        }
        Err(e) => {
            ctx.events
                .publish(&object_ref, &ReconcileEvent::internal_error(&e))
                .await;
            record_reconciliation(ReconcileOutcome::Error(e.kind()), start.elapsed());
            Err(e)
        }
    }
}

/// Error policy for the `DuckType` controller.
///
/// Every [`ReconcileError`] is retryable; the object is requeued after the
/// configured delay.
#[allow(clippy::needless_pass_by_value)] // Signature required by kube::runtime::Controller
pub fn error_policy(ducktype: Arc<DuckType>, err: &ReconcileError, ctx: Arc<Context>) -> Action {
    warn!(
        error = %err,
        name = %ducktype.name_any(),
        namespace = ?ducktype.namespace(),
        "Reconciliation error - will retry in {}s",
        ctx.error_requeue.as_secs()
    );
    Action::requeue(ctx.error_requeue)
}

/// Watch mapper: the `DuckType`s tracking a changed Service.
pub fn service_mapper(
    tracker: Arc<ReferenceTracker>,
) -> impl Fn(Service) -> Vec<ObjectRef<DuckType>> + Send + Sync + 'static {
    move |service: Service| {
        let owners = tracker.owners_of(&Reference::for_service(&service));
        if !owners.is_empty() {
            debug!(
                service = %service.name_any(),
                namespace = ?service.namespace(),
                owners = owners.len(),
                "Service changed, enqueueing tracking DuckTypes"
            );
        }
        owners
    }
}
