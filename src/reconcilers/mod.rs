// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciliation logic for `DuckType` resources.
//!
//! # Reconciliation Architecture
//!
//! The controller follows the standard level-triggered Kubernetes pattern:
//!
//! 1. **Watch** - `DuckType` changes, and Service changes mapped through the tracker
//! 2. **Reconcile** - Track the referenced Service and look it up in the cache
//! 3. **Status** - Report availability and the Service address back to Kubernetes
//!
//! # Modules
//!
//! - [`ducktype`] - The decision logic for a single pass
//! - [`status`] - Condition state machine and status persistence
//!
//! # Example: Using the Reconciler
//!
//! ```rust,ignore
//! use discovery::context::ReconcileContext;
//! use discovery::reconcilers::DuckTypeReconciler;
//!
//! let reconciler = DuckTypeReconciler::new(tracker, lister);
//! let ctx = ReconcileContext::for_object(&ducktype);
//! let event = reconciler.reconcile_kind(&ctx, &mut ducktype)?;
//! ```

pub mod ducktype;
pub mod status;


pub use ducktype::{new_reconciled_normal, DuckTypeReconciler};
