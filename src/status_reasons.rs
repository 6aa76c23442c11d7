// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Standard Kubernetes status condition types and reasons for `DuckType` resources.
//!
//! Reasons are programmatic identifiers in CamelCase that explain why a condition has
//! a particular status.
//!
//! # Condition Hierarchy
//!
//! A `DuckType` carries one dependent condition and one encompassing condition:
//!
//! - **`Available`** → whether the referenced Service exists
//! - **`Ready`** → aggregate of every dependent condition
//!
//! # Example Status
//!
//! ```yaml
//! status:
//!   conditions:
//!     - type: Available
//!       status: "False"
//!       reason: ServiceUnavailable
//!       message: 'Service "echo" wasn''t found.'
//!     - type: Ready
//!       status: "False"
//!       reason: ServiceUnavailable
//!       message: 'Service "echo" wasn''t found.'
//! ```

// ============================================================================
// Condition Types
// ============================================================================

/// Encompassing condition summarizing every dependent condition.
pub const CONDITION_TYPE_READY: &str = "Ready";

/// Whether the referenced Service currently exists.
pub const CONDITION_TYPE_AVAILABLE: &str = "Available";

// ============================================================================
// Reasons
// ============================================================================

/// All dependent conditions are true.
///
/// **Usage:**
/// - Use for the **encompassing `type: Ready` condition** only
pub const REASON_ALL_READY: &str = "AllReady";

/// The referenced Service was found in the cache.
pub const REASON_SERVICE_AVAILABLE: &str = "ServiceAvailable";

/// The referenced Service does not exist (yet).
///
/// The condition message carries the Service name.
pub const REASON_SERVICE_UNAVAILABLE: &str = "ServiceUnavailable";

/// Human-readable message recorded when the Service is missing.
#[must_use]
pub fn service_unavailable_message(service_name: &str) -> String {
    format!("Service \"{service_name}\" wasn't found.")
}
