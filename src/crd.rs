// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom Resource Definition for service discovery.
//!
//! A [`DuckType`] declares that a named Kubernetes `Service` should be discoverable.
//! The controller resolves the Service, records an `Available` condition, and
//! publishes the Service's cluster-local address in the status.
//!
//! # Example: Declaring a DuckType
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
//!
//! # Example Status
//!
//! ```yaml
//! status:
//!   observedGeneration: 1
//!   address:
//!     url: http://echo.default.svc.cluster.local
//!   conditions:
//!     - type: Available
//!       status: "True"
//!       reason: ServiceAvailable
//!     - type: Ready
//!       status: "True"
//!       reason: AllReady
//! ```

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status value of a [`Condition`].
///
/// Serialized as the Kubernetes strings `"True"`, `"False"` and `"Unknown"`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum ConditionStatus {
    True,
    False,
    #[default]
    Unknown,
}

impl ConditionStatus {
    /// Whether the status is `True`.
    #[must_use]
    pub fn is_true(self) -> bool {
        self == Self::True
    }

    /// Whether the status is `False`.
    #[must_use]
    pub fn is_false(self) -> bool {
        self == Self::False
    }
}

impl fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::True => "True",
            Self::False => "False",
            Self::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// Condition represents an observation of a resource's current state.
///
/// Conditions are used in status subresources to communicate the state of
/// a resource to users and controllers.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition. This controller reports `Available` and `Ready`.
    pub r#type: String,

    /// Status of the condition: True, False, or Unknown.
    pub status: ConditionStatus,

    /// Brief CamelCase reason for the condition's last transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Human-readable message indicating details about the transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Last time the condition transitioned from one status to another (RFC3339 format).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
}

/// Network address published once the target Service resolves.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq, JsonSchema)]
pub struct Addressable {
    /// Absolute URL (`scheme://host`) at which the target can be reached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Addressable {
    /// Build an address from a scheme and host, e.g. `http` and
    /// `echo.default.svc.cluster.local`.
    #[must_use]
    pub fn from_parts(scheme: &str, host: &str) -> Self {
        Self {
            url: Some(format!("{scheme}://{host}")),
        }
    }

    /// Parsed form of the published URL, if present and well-formed.
    #[must_use]
    pub fn parsed_url(&self) -> Option<url::Url> {
        self.url.as_deref().and_then(|u| url::Url::parse(u).ok())
    }

    /// Host component of the published URL.
    #[must_use]
    pub fn host(&self) -> Option<String> {
        self.parsed_url()
            .and_then(|u| u.host_str().map(std::string::ToString::to_string))
    }

    /// Scheme component of the published URL.
    #[must_use]
    pub fn scheme(&self) -> Option<String> {
        self.parsed_url().map(|u| u.scheme().to_string())
    }
}

/// `DuckType` status
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DuckTypeStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,

    /// Address of the resolved Service. Present only while `Available` is `True`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Addressable>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

/// `DuckType` declares that a named Service in the same namespace should be discoverable.
///
/// # Example
///
/// ```yaml
/// apiVersion: discovery.knative.dev/v1alpha1
/// kind: DuckType
/// metadata:
///   name: echo-discovery
///   namespace: default
/// spec:
///   serviceName: echo
/// ```
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, PartialEq, JsonSchema)]
#[kube(
    group = "discovery.knative.dev",
    version = "v1alpha1",
    kind = "DuckType",
    namespaced,
    shortname = "duck",
    doc = "DuckType resolves a named Service in its own namespace and publishes the Service's cluster-local address once it exists.",
    printcolumn = r#"{"name":"Service","type":"string","jsonPath":".spec.serviceName"}"#,
    printcolumn = r#"{"name":"URL","type":"string","jsonPath":".status.address.url"}"#,
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#
)]
#[kube(status = "DuckTypeStatus")]
#[serde(rename_all = "camelCase")]
pub struct DuckTypeSpec {
    /// Name of the Service to resolve, in the `DuckType`'s namespace.
    pub service_name: String,
}
