// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#![allow(unexpected_cfgs)]

//! # Discovery - DuckType Controller for Kubernetes
//!
//! A level-triggered controller that keeps each `DuckType` resource's status in
//! step with the Service it names.
//!
//! ## Overview
//!
//! For every `DuckType` the controller:
//!
//! - tracks the referenced Service so changes to it re-trigger reconciliation
//! - looks the Service up in a watch-populated cache
//! - publishes an `Available` condition and, when available, the Service's
//!   cluster-local address (`http://<service>.<namespace>.svc.<cluster-domain>`)
//!
//! ## Modules
//!
//! - [`crd`] - Custom Resource Definition for `DuckType`
//! - [`reconcilers`] - Reconciliation logic and condition state machine
//! - [`tracker`] - Dependency tracking between `DuckType`s and Services
//! - [`lister`] - Cached Service lookups
//! - [`controller`] - `kube::runtime::Controller` glue
//! - [`context`] - Shared and per-pass context
//!
//! ## Example
//!
//! ```rust,no_run
//! use discovery::crd::{DuckType, DuckTypeSpec};
//!
//! let ducktype = DuckType::new(
//!     "echo-discovery",
//!     DuckTypeSpec {
//!         service_name: "echo".to_string(),
//!     },
//! );
//! ```

pub mod constants;
pub mod context;
pub mod controller;
pub mod crd;
pub mod errors;
pub mod events;
pub mod lister;
pub mod metrics;
pub mod network;
pub mod reconcilers;
pub mod status_reasons;
pub mod tracker;

#[cfg(test)]
mod controller_tests;
#[cfg(test)]
mod network_tests;
#[cfg(test)]
mod test_support;
