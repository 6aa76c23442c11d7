// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Kubernetes Event recording for the `DuckType` controller.
//!
//! The reconciler describes what happened as a [`ReconcileEvent`]; the controller
//! hands it to an [`EventPublisher`], which turns it into a Kubernetes Event
//! visible via `kubectl describe ducktype`.
//!
//! Publishing is fire-and-forget: failures are logged as warnings and never
//! fail a reconciliation.

use crate::constants::{EVENT_ACTION_RECONCILE, REASON_INTERNAL_ERROR};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::ObjectReference;
use kube::runtime::events::{Event, EventType, Recorder, Reporter};
use kube::Client;
use tracing::warn;

/// Outcome signal of a reconciliation pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconcileEvent {
    pub event_type: EventType,
    pub reason: String,
    pub message: String,
}

impl ReconcileEvent {
    #[must_use]
    pub fn normal(reason: &str, message: impl Into<String>) -> Self {
        Self {
            event_type: EventType::Normal,
            reason: reason.to_string(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn warning(reason: &str, message: impl Into<String>) -> Self {
        Self {
            event_type: EventType::Warning,
            reason: reason.to_string(),
            message: message.into(),
        }
    }

    /// Warning emitted when a pass fails with a retryable error.
    #[must_use]
    pub fn internal_error(err: &impl std::fmt::Display) -> Self {
        Self::warning(REASON_INTERNAL_ERROR, err.to_string())
    }
}

/// Trait for publishing Kubernetes Events.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish `event` on the object identified by `resource_ref`.
    async fn publish(&self, resource_ref: &ObjectReference, event: &ReconcileEvent);
}

/// Production implementation wrapping `kube::runtime::events::Recorder`.
pub struct KubeEventPublisher {
    recorder: Recorder,
}

impl KubeEventPublisher {
    /// Create a new publisher reporting as `controller_name`.
    #[must_use]
    pub fn new(client: Client, controller_name: &str) -> Self {
        let reporter = Reporter {
            controller: controller_name.to_string(),
            instance: std::env::var("POD_NAME").ok(),
        };
        Self {
            recorder: Recorder::new(client, reporter),
        }
    }
}

#[async_trait]
impl EventPublisher for KubeEventPublisher {
    async fn publish(&self, resource_ref: &ObjectReference, event: &ReconcileEvent) {
        let kube_event = Event {
            type_: event.event_type,
            reason: event.reason.clone(),
            note: Some(event.message.clone()),
            action: EVENT_ACTION_RECONCILE.to_string(),
            secondary: None,
        };
        if let Err(e) = self.recorder.publish(&kube_event, resource_ref).await {
            warn!(
                reason = %event.reason,
                error = %e,
                "Failed to publish Kubernetes event"
            );
        }
    }
}

/// No-op implementation for tests.
pub struct NoopEventPublisher;

#[async_trait]
impl EventPublisher for NoopEventPublisher {
    async fn publish(&self, _resource_ref: &ObjectReference, _event: &ReconcileEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ListerError;

    #[test]
    fn test_reconcile_event_constructors() {
        let normal = ReconcileEvent::normal("DuckTypeReconciled", "done");
        assert_eq!(normal.event_type, EventType::Normal);
        assert_eq!(normal.reason, "DuckTypeReconciled");

        let warning = ReconcileEvent::internal_error(&ListerError::CacheNotSynced);
        assert_eq!(warning.event_type, EventType::Warning);
        assert_eq!(warning.reason, REASON_INTERNAL_ERROR);
        assert_eq!(warning.message, "Service cache has not synced yet");
    }

    #[tokio::test]
    async fn test_noop_publisher_accepts_events() {
        let publisher: Box<dyn EventPublisher> = Box::new(NoopEventPublisher);
        publisher
            .publish(
                &ObjectReference::default(),
                &ReconcileEvent::normal("DuckTypeReconciled", "done"),
            )
            .await;
    }
}
