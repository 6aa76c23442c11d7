// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Status condition helpers for `DuckType` resources.
//!
//! This module provides the condition state machine used by the reconciler and
//! the status updater used by the controller to persist it.
//!
//! # Condition Format
//!
//! Kubernetes conditions follow a standard format:
//! - `type`: The aspect of the resource being reported (e.g., "Available", "Ready")
//! - `status`: "True", "False", or "Unknown"
//! - `reason`: A programmatic identifier (CamelCase)
//! - `message`: A human-readable explanation
//! - `lastTransitionTime`: RFC3339 timestamp when the condition changed
//!
//! # Condition Sets
//!
//! A [`ConditionSet`] names one encompassing ("happy") condition and the dependent
//! conditions it summarizes. Every write to a dependent recomputes the happy condition:
//!
//! - any dependent `False` → happy `False` (reason and message copied from that dependent)
//! - every dependent `True` → happy `True`
//! - otherwise → happy `Unknown`
//!
//! # Example
//!
//! ```rust
//! use discovery::crd::DuckTypeStatus;
//!
//! let mut status = DuckTypeStatus::default();
//! status.initialize_conditions();
//! assert!(!status.is_ready());
//!
//! status.mark_service_available();
//! assert!(status.is_ready());
//! ```

use crate::crd::{Condition, ConditionStatus, DuckType, DuckTypeStatus};
use crate::status_reasons::{
    service_unavailable_message, CONDITION_TYPE_AVAILABLE, CONDITION_TYPE_READY,
    REASON_ALL_READY, REASON_SERVICE_AVAILABLE, REASON_SERVICE_UNAVAILABLE,
};
use chrono::Utc;
use kube::api::{Patch, PatchParams};
use kube::{Api, Client, ResourceExt};
use serde_json::json;
use tracing::debug;

/// Create a new Kubernetes condition with the current timestamp.
///
/// # Example
///
/// ```rust
/// # use discovery::reconcilers::status::create_condition;
/// # use discovery::crd::ConditionStatus;
/// let condition = create_condition(
///     "Available",
///     ConditionStatus::True,
///     Some("ServiceAvailable"),
///     None,
/// );
/// assert_eq!(condition.r#type, "Available");
/// assert!(condition.status.is_true());
/// ```
#[must_use]
pub fn create_condition(
    condition_type: &str,
    status: ConditionStatus,
    reason: Option<&str>,
    message: Option<&str>,
) -> Condition {
    Condition {
        r#type: condition_type.to_string(),
        status,
        reason: reason.map(str::to_string),
        message: message.map(str::to_string),
        last_transition_time: Some(Utc::now().to_rfc3339()),
    }
}

/// Find a condition by type in a list of conditions.
#[must_use]
pub fn find_condition<'a>(
    conditions: &'a [Condition],
    condition_type: &str,
) -> Option<&'a Condition> {
    conditions.iter().find(|c| c.r#type == condition_type)
}

/// Update or add a condition in a mutable conditions list (in-memory, no API call).
///
/// The condition is left untouched when status, reason and message already match,
/// so repeated passes over an unchanged world never rewrite the list. When only the
/// reason or message changes, `lastTransitionTime` is preserved.
///
/// # Returns
///
/// `true` if the list was modified.
pub fn update_condition_in_memory(
    conditions: &mut Vec<Condition>,
    condition_type: &str,
    status: ConditionStatus,
    reason: Option<&str>,
    message: Option<&str>,
) -> bool {
    let Some(existing) = conditions.iter_mut().find(|c| c.r#type == condition_type) else {
        conditions.push(create_condition(condition_type, status, reason, message));
        conditions.sort_by(|a, b| a.r#type.cmp(&b.r#type));
        return true;
    };

    if existing.status == status
        && existing.reason.as_deref() == reason
        && existing.message.as_deref() == message
    {
        return false;
    }

    // Preserve lastTransitionTime if status hasn't changed
    if existing.status != status || existing.last_transition_time.is_none() {
        existing.last_transition_time = Some(Utc::now().to_rfc3339());
    }
    existing.status = status;
    existing.reason = reason.map(str::to_string);
    existing.message = message.map(str::to_string);
    true
}

/// Compare two condition lists to check if they are semantically equal.
///
/// Ignores `lastTransitionTime` and only compares type, status, reason and message.
#[must_use]
pub fn conditions_equal(current: &[Condition], new: &[Condition]) -> bool {
    if current.len() != new.len() {
        return false;
    }

    new.iter().all(|new_cond| {
        find_condition(current, &new_cond.r#type).is_some_and(|curr_cond| {
            curr_cond.status == new_cond.status
                && curr_cond.reason == new_cond.reason
                && curr_cond.message == new_cond.message
        })
    })
}

/// A happy condition plus the dependent conditions that feed it.
#[derive(Clone, Copy, Debug)]
pub struct ConditionSet {
    happy: &'static str,
    dependents: &'static [&'static str],
}

/// Conditions managed on every `DuckType`.
pub const DUCK_TYPE_CONDITIONS: ConditionSet =
    ConditionSet::new(CONDITION_TYPE_READY, &[CONDITION_TYPE_AVAILABLE]);

impl ConditionSet {
    /// Condition set where `happy` summarizes `dependents`.
    #[must_use]
    pub const fn new(happy: &'static str, dependents: &'static [&'static str]) -> Self {
        Self { happy, dependents }
    }

    /// Add every missing condition as `Unknown`. Existing conditions are kept.
    pub fn initialize(&self, conditions: &mut Vec<Condition>) {
        for condition_type in self.dependents.iter().chain(std::iter::once(&self.happy)) {
            if find_condition(conditions, condition_type).is_none() {
                update_condition_in_memory(
                    conditions,
                    condition_type,
                    ConditionStatus::Unknown,
                    None,
                    None,
                );
            }
        }
        self.recompute_happy(conditions);
    }

    /// Mark a condition `True` and recompute the happy condition.
    pub fn mark_true(&self, conditions: &mut Vec<Condition>, condition_type: &str, reason: &str) {
        self.mark(conditions, condition_type, ConditionStatus::True, Some(reason), None);
    }

    /// Mark a condition `False` and recompute the happy condition.
    pub fn mark_false(
        &self,
        conditions: &mut Vec<Condition>,
        condition_type: &str,
        reason: &str,
        message: &str,
    ) {
        self.mark(
            conditions,
            condition_type,
            ConditionStatus::False,
            Some(reason),
            Some(message),
        );
    }

    fn mark(
        &self,
        conditions: &mut Vec<Condition>,
        condition_type: &str,
        status: ConditionStatus,
        reason: Option<&str>,
        message: Option<&str>,
    ) {
        update_condition_in_memory(conditions, condition_type, status, reason, message);
        if condition_type != self.happy {
            self.recompute_happy(conditions);
        }
    }

    /// Derive the happy condition from the dependents.
    fn recompute_happy(&self, conditions: &mut Vec<Condition>) {
        let dependents: Vec<Condition> = self
            .dependents
            .iter()
            .map(|t| {
                find_condition(conditions, t)
                    .cloned()
                    .unwrap_or_else(|| Condition {
                        r#type: (*t).to_string(),
                        ..Condition::default()
                    })
            })
            .collect();

        if let Some(failed) = dependents.iter().find(|c| c.status.is_false()) {
            update_condition_in_memory(
                conditions,
                self.happy,
                ConditionStatus::False,
                failed.reason.as_deref(),
                failed.message.as_deref(),
            );
        } else if dependents.iter().all(|c| c.status.is_true()) {
            update_condition_in_memory(
                conditions,
                self.happy,
                ConditionStatus::True,
                Some(REASON_ALL_READY),
                None,
            );
        } else if let Some(pending) = dependents.iter().find(|c| !c.status.is_true()) {
            update_condition_in_memory(
                conditions,
                self.happy,
                ConditionStatus::Unknown,
                pending.reason.as_deref(),
                pending.message.as_deref(),
            );
        }
    }

    /// Whether the happy condition is `True`.
    #[must_use]
    pub fn is_happy(&self, conditions: &[Condition]) -> bool {
        find_condition(conditions, self.happy).is_some_and(|c| c.status.is_true())
    }
}

impl DuckTypeStatus {
    /// Add the `Available` and `Ready` conditions as `Unknown` if absent.
    pub fn initialize_conditions(&mut self) {
        DUCK_TYPE_CONDITIONS.initialize(&mut self.conditions);
    }

    /// Record that the target Service exists.
    pub fn mark_service_available(&mut self) {
        DUCK_TYPE_CONDITIONS.mark_true(
            &mut self.conditions,
            CONDITION_TYPE_AVAILABLE,
            REASON_SERVICE_AVAILABLE,
        );
    }

    /// Record that the target Service is missing. Also drops any published address.
    pub fn mark_service_unavailable(&mut self, service_name: &str) {
        DUCK_TYPE_CONDITIONS.mark_false(
            &mut self.conditions,
            CONDITION_TYPE_AVAILABLE,
            REASON_SERVICE_UNAVAILABLE,
            &service_unavailable_message(service_name),
        );
        self.address = None;
    }

    #[must_use]
    pub fn get_condition(&self, condition_type: &str) -> Option<&Condition> {
        find_condition(&self.conditions, condition_type)
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        DUCK_TYPE_CONDITIONS.is_happy(&self.conditions)
    }
}

/// Check whether a freshly computed status differs semantically from the stored one.
///
/// Condition timestamps are ignored; everything else is compared.
#[must_use]
pub fn status_changed(current: Option<&DuckTypeStatus>, new: &DuckTypeStatus) -> bool {
    match current {
        None => true,
        Some(current) => {
            current.address != new.address
                || current.observed_generation != new.observed_generation
                || !conditions_equal(&current.conditions, &new.conditions)
        }
    }
}

/// Persists a `DuckType`'s status with a single API call, and only when it changed.
///
/// # Example
///
/// ```rust,ignore
/// use discovery::reconcilers::status::DuckTypeStatusUpdater;
///
/// let updater = DuckTypeStatusUpdater::new(&stored, reconciled.status.clone().unwrap_or_default());
/// updater.apply(&client).await?;
/// ```
pub struct DuckTypeStatusUpdater {
    namespace: String,
    name: String,
    current_status: Option<DuckTypeStatus>,
    new_status: DuckTypeStatus,
}

impl DuckTypeStatusUpdater {
    /// Create an updater comparing `ducktype`'s stored status against `new_status`.
    #[must_use]
    pub fn new(ducktype: &DuckType, new_status: DuckTypeStatus) -> Self {
        Self {
            namespace: ducktype.namespace().unwrap_or_default(),
            name: ducktype.name_any(),
            current_status: ducktype.status.clone(),
            new_status,
        }
    }

    #[must_use]
    pub fn has_changes(&self) -> bool {
        status_changed(self.current_status.as_ref(), &self.new_status)
    }

    /// Apply the status to Kubernetes.
    ///
    /// `address` is always sent, as `null` when cleared, so that a merge patch removes
    /// a previously published address.
    ///
    /// # Returns
    ///
    /// `true` if an API call was made.
    ///
    /// # Errors
    ///
    /// Returns an error if the Kubernetes API call fails.
    pub async fn apply(&self, client: &Client) -> Result<bool, kube::Error> {
        if !self.has_changes() {
            debug!(
                "DuckType {}/{} status unchanged, skipping update",
                self.namespace, self.name
            );
            return Ok(false);
        }

        let api: Api<DuckType> = Api::namespaced(client.clone(), &self.namespace);

        let patch = json!({
            "status": {
                "conditions": self.new_status.conditions,
                "address": self.new_status.address,
                "observedGeneration": self.new_status.observed_generation,
            }
        });

        api.patch_status(&self.name, &PatchParams::default(), &Patch::Merge(&patch))
            .await?;

        debug!(
            "Updated DuckType {}/{} status: {} condition(s), ready={}",
            self.namespace,
            self.name,
            self.new_status.conditions.len(),
            self.new_status.is_ready()
        );

        Ok(true)
    }
}
