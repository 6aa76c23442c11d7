// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `controller.rs`

#[cfg(test)]
mod tests {
    use crate::context::ReconcileContext;
    use crate::controller::{reconcile_status, service_mapper};
    use crate::crd::{ConditionStatus, DuckTypeStatus};
    use crate::errors::{ReconcileError, TrackerError};
    use crate::reconcilers::DuckTypeReconciler;
    use crate::status_reasons::{CONDITION_TYPE_AVAILABLE, CONDITION_TYPE_READY};
    use crate::test_support::{ducktype, service, FakeLister, FakeTracker, TEST_CLUSTER_DOMAIN};
    use crate::tracker::{Reference, ReferenceTracker, Tracker};
    use kube::runtime::reflector::ObjectRef;
    use std::sync::Arc;
    use std::time::Duration;

    fn reconciler(tracker: FakeTracker, lister: FakeLister) -> DuckTypeReconciler {
        DuckTypeReconciler::new(Arc::new(tracker), Arc::new(lister))
            .with_cluster_domain(TEST_CLUSTER_DOMAIN)
    }

    #[test]
    fn test_reconcile_status_found_stamps_generation() {
        let reconciler = reconciler(
            FakeTracker::default(),
            FakeLister::with_services(&[service("echo", "ns1")]),
        );
        let mut dt = ducktype("echo-discovery", "ns1", "echo");
        dt.metadata.generation = Some(4);

        let (status, event) = reconcile_status(&reconciler, &dt).unwrap();

        assert!(status.is_ready());
        assert_eq!(status.observed_generation, Some(4));
        assert_eq!(
            status.address.and_then(|a| a.url).as_deref(),
            Some("http://echo.ns1.svc.cluster.local")
        );
        assert!(event.is_some());
        assert!(dt.status.is_none(), "input object must not be mutated");
    }

    #[test]
    fn test_reconcile_status_missing_service() {
        let reconciler = reconciler(FakeTracker::default(), FakeLister::default());
        let dt = ducktype("missing-discovery", "ns1", "missing");

        let (status, event) = reconcile_status(&reconciler, &dt).unwrap();

        assert!(event.is_none());
        assert_eq!(status.observed_generation, Some(1));
        assert_eq!(status.conditions.len(), 2);
        assert_eq!(
            status.get_condition(CONDITION_TYPE_AVAILABLE).unwrap().status,
            ConditionStatus::False
        );
        assert_eq!(
            status.get_condition(CONDITION_TYPE_READY).unwrap().status,
            ConditionStatus::False
        );
    }

    #[test]
    fn test_reconcile_status_is_stable_across_passes() {
        let reconciler = reconciler(
            FakeTracker::default(),
            FakeLister::with_services(&[service("echo", "ns1")]),
        );
        let mut dt = ducktype("echo-discovery", "ns1", "echo");

        let (first, _) = reconcile_status(&reconciler, &dt).unwrap();
        dt.status = Some(first.clone());
        let (second, _) = reconcile_status(&reconciler, &dt).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_reconcile_status_error_returns_no_status() {
        let reconciler = reconciler(
            FakeTracker::failing(TrackerError::Poisoned),
            FakeLister::default(),
        );
        let mut dt = ducktype("echo-discovery", "ns1", "echo");
        let mut stored = DuckTypeStatus::default();
        stored.mark_service_available();
        dt.status = Some(stored.clone());

        let result = reconcile_status(&reconciler, &dt);

        assert!(matches!(result, Err(ReconcileError::Tracking { .. })));
        assert_eq!(dt.status, Some(stored));
    }

    #[test]
    fn test_service_mapper_returns_tracking_owners() {
        let tracker = Arc::new(ReferenceTracker::new(Duration::from_secs(60)));
        let owner = ObjectRef::new("echo-discovery").within("ns1");
        tracker
            .track_reference(&Reference::service("echo", "ns1"), &owner)
            .unwrap();

        let mapper = service_mapper(tracker);

        assert_eq!(mapper(service("echo", "ns1")), vec![owner]);
        assert!(mapper(service("echo", "ns2")).is_empty());
        assert!(mapper(service("other", "ns1")).is_empty());
    }

    #[test]
    fn test_waiting_owner_stays_mapped_across_resyncs() {
        let resync = Duration::from_millis(20);
        let tracker = Arc::new(ReferenceTracker::for_resync(resync));
        let reconciler = DuckTypeReconciler::new(tracker.clone(), Arc::new(FakeLister::default()))
            .with_cluster_domain(TEST_CLUSTER_DOMAIN);
        let dt = ducktype("late-discovery", "ns1", "late");
        let mapper = service_mapper(tracker.clone());

        // Each requeued pass renews the lease, well past its original expiry
        for _ in 0..6 {
            let (status, _) = reconcile_status(&reconciler, &dt).unwrap();
            assert!(!status.is_ready());
            std::thread::sleep(resync);
        }

        assert!(tracker.lease() < resync * 6);
        assert_eq!(
            mapper(service("late", "ns1")),
            vec![ObjectRef::new("late-discovery").within("ns1")]
        );
    }

    #[test]
    fn test_owner_without_passes_drops_out_of_mapper() {
        let tracker = Arc::new(ReferenceTracker::for_resync(Duration::from_millis(10)));
        let reconciler = DuckTypeReconciler::new(tracker.clone(), Arc::new(FakeLister::default()))
            .with_cluster_domain(TEST_CLUSTER_DOMAIN);
        reconcile_status(&reconciler, &ducktype("gone-discovery", "ns1", "late")).unwrap();

        std::thread::sleep(tracker.lease() * 2);

        assert!(service_mapper(tracker.clone())(service("late", "ns1")).is_empty());
        assert_eq!(tracker.tracked_references(), 0);
    }

    #[test]
    fn test_reconcile_context_key() {
        let ctx = ReconcileContext::for_object(&ducktype("echo-discovery", "ns1", "echo"));
        assert_eq!(ctx.key(), "ns1/echo-discovery");
    }
}
