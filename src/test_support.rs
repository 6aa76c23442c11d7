// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory tracker and lister doubles shared by unit tests.

use crate::crd::{DuckType, DuckTypeSpec};
use crate::errors::{ListerError, TrackerError};
use crate::lister::ServiceLister;
use crate::tracker::{Reference, Tracker};
use k8s_openapi::api::core::v1::Service;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::runtime::reflector::ObjectRef;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const TEST_CLUSTER_DOMAIN: &str = "cluster.local";

pub fn ducktype(name: &str, namespace: &str, service_name: &str) -> DuckType {
    let mut ducktype = DuckType::new(
        name,
        DuckTypeSpec {
            service_name: service_name.to_string(),
        },
    );
    ducktype.metadata.namespace = Some(namespace.to_string());
    ducktype.metadata.generation = Some(1);
    ducktype
}

pub fn service(name: &str, namespace: &str) -> Service {
    Service {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Records every `track_reference` call; fails all of them when `error` is set.
#[derive(Default)]
pub struct FakeTracker {
    pub error: Option<TrackerError>,
    calls: Mutex<Vec<(Reference, ObjectRef<DuckType>)>>,
}

impl FakeTracker {
    pub fn failing(error: TrackerError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(Reference, ObjectRef<DuckType>)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Tracker for FakeTracker {
    fn track_reference(
        &self,
        reference: &Reference,
        owner: &ObjectRef<DuckType>,
    ) -> Result<(), TrackerError> {
        self.calls
            .lock()
            .unwrap()
            .push((reference.clone(), owner.clone()));
        match &self.error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

/// Serves Services from a map; returns `error` for every lookup when set.
#[derive(Default)]
pub struct FakeLister {
    services: Mutex<HashMap<(String, String), Arc<Service>>>,
    pub error: Option<ListerError>,
    lookups: AtomicUsize,
}

impl FakeLister {
    pub fn with_services(services: &[Service]) -> Self {
        let lister = Self::default();
        for svc in services {
            lister.insert(svc.clone());
        }
        lister
    }

    pub fn failing(error: ListerError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    pub fn insert(&self, svc: Service) {
        let key = (
            svc.metadata.namespace.clone().unwrap_or_default(),
            svc.metadata.name.clone().unwrap_or_default(),
        );
        self.services.lock().unwrap().insert(key, Arc::new(svc));
    }

    pub fn remove(&self, namespace: &str, name: &str) {
        self.services
            .lock()
            .unwrap()
            .remove(&(namespace.to_string(), name.to_string()));
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl ServiceLister for FakeLister {
    fn get(&self, namespace: &str, name: &str) -> Result<Arc<Service>, ListerError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(e) = &self.error {
            return Err(e.clone());
        }
        self.services
            .lock()
            .unwrap()
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| ListerError::NotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
            })
    }
}
