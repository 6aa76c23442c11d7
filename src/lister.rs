// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Cached, read-only Service lookups.
//!
//! Lookups are served from a reflector store populated by a Service watch, so
//! they may lag the API server. The reconciler tolerates this because it is
//! re-run whenever the watch delivers the missing update.

use crate::errors::ListerError;
use k8s_openapi::api::core::v1::Service;
use kube::runtime::reflector::{ObjectRef, Store};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Read access to Services by namespace and name.
pub trait ServiceLister: Send + Sync {
    /// Fetch a Service from the cache.
    ///
    /// # Errors
    ///
    /// Returns [`ListerError::NotFound`] when the Service does not exist, and any
    /// other variant when the cache could not answer.
    fn get(&self, namespace: &str, name: &str) -> Result<Arc<Service>, ListerError>;
}

/// [`ServiceLister`] backed by a `kube` reflector store.
#[derive(Clone)]
pub struct StoreServiceLister {
    store: Store<Service>,
    synced: Arc<AtomicBool>,
}

impl StoreServiceLister {
    /// Wrap a store. Lookups fail with [`ListerError::CacheNotSynced`] until
    /// [`mark_synced`](Self::mark_synced) is called.
    #[must_use]
    pub fn new(store: Store<Service>) -> Self {
        Self {
            store,
            synced: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Record that the backing reflector has completed its initial list.
    pub fn mark_synced(&self) {
        self.synced.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_synced(&self) -> bool {
        self.synced.load(Ordering::Acquire)
    }

    /// Wait until the store has received its initial list, then mark it synced.
    ///
    /// # Errors
    ///
    /// Returns an error if the reflector writer was dropped before the initial list.
    pub async fn wait_until_synced(&self) -> Result<(), ListerError> {
        self.store
            .wait_until_ready()
            .await
            .map_err(|e| ListerError::CacheError {
                namespace: String::new(),
                name: String::new(),
                reason: e.to_string(),
            })?;
        self.mark_synced();
        Ok(())
    }
}

impl ServiceLister for StoreServiceLister {
    fn get(&self, namespace: &str, name: &str) -> Result<Arc<Service>, ListerError> {
        if !self.is_synced() {
            return Err(ListerError::CacheNotSynced);
        }

        self.store
            .get(&ObjectRef::new(name).within(namespace))
            .ok_or_else(|| ListerError::NotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
            })
    }
}
