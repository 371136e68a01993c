// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom Resource Definition for reverse-proxy bindings.
//!
//! [`ProxyRule`] maps a public domain to one or more backend destinations. The API
//! server stores and returns these objects as semi-structured [`Record`](crate::record::Record)s
//! so that clients see exactly the document shape they submitted; the typed form here
//! is used to generate the CRD schema, to address the resource through the dynamic
//! Kubernetes API, and to read stored records in a typed way.
//!
//! # Example
//!
//! ```rust
//! use proxyrule_api::crd::ProxyRuleSpec;
//!
//! let spec = ProxyRuleSpec {
//!     domain: "api.example.com".to_string(),
//!     destination: Some("10.0.0.100".to_string()),
//!     destinations: None,
//!     port: Some(8080),
//!     tls: Some(true),
//!     annotations: None,
//! };
//! assert_eq!(spec.targets(), vec!["10.0.0.100"]);
//! ```

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::record::Record;

/// `ProxyRule` binds a public domain to backend destinations.
///
/// # Example
///
/// ```yaml
/// apiVersion: bausteln.io/v1
/// kind: Proxyrule
/// metadata:
///   name: api
///   namespace: proxy-rules
/// spec:
///   domain: api.example.com
///   destinations:
///     - 10.0.0.100
///     - 10.0.0.101
///   port: 8080
///   tls: true
/// ```
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, PartialEq, JsonSchema)]
#[kube(
    group = "bausteln.io",
    version = "v1",
    kind = "Proxyrule",
    plural = "proxyrules",
    root = "ProxyRule",
    namespaced,
    doc = "ProxyRule routes a public domain to one or more backend destinations through the reverse proxy."
)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRuleSpec {
    /// Public DNS name served by the proxy (e.g. "api.example.com").
    ///
    /// Unique across all rules.
    #[schemars(length(max = 253))]
    pub domain: String,

    /// Single backend: an IPv4 address, IPv6 address, or DNS name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,

    /// Ordered list of backends. Alternative to `destination`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destinations: Option<Vec<String>>,

    /// Backend port. Omit to use the proxy's default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 1, max = 65535))]
    pub port: Option<i32>,

    /// Terminate TLS for this domain. Defaults to true on creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<bool>,

    /// Free-form proxy annotations, distinct from metadata annotations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,
}

impl ProxyRuleSpec {
    /// Every configured destination, `destination` first.
    #[must_use]
    pub fn targets(&self) -> Vec<&str> {
        self.destination
            .iter()
            .map(String::as_str)
            .chain(self.destinations.iter().flatten().map(String::as_str))
            .filter(|d| !d.is_empty())
            .collect()
    }
}

impl TryFrom<&Record> for ProxyRule {
    type Error = serde_json::Error;

    /// Typed view of a stored record. Only succeeds for records that have passed
    /// validation; arbitrary wire input may not deserialize.
    fn try_from(record: &Record) -> Result<Self, Self::Error> {
        serde_json::from_value(record.clone().into_value())
    }
}
