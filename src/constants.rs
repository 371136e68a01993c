// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the `ProxyRule` API server.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// API Constants
// ============================================================================

/// API group for the `ProxyRule` CRD
pub const API_GROUP: &str = "bausteln.io";

/// API version for the `ProxyRule` CRD
pub const API_VERSION: &str = "v1";

/// Fully qualified API version (group/version)
pub const API_GROUP_VERSION: &str = "bausteln.io/v1";

/// Kind name for `ProxyRule` resources, as stored in the cluster
pub const KIND_PROXY_RULE: &str = "Proxyrule";

/// Kind name returned for list responses
pub const KIND_PROXY_RULE_LIST: &str = "ProxyruleList";

/// Plural resource name used in API paths
pub const PROXY_RULE_PLURAL: &str = "proxyrules";

/// Namespace that holds every `ProxyRule`
pub const DEFAULT_PROXY_RULES_NAMESPACE: &str = "proxy-rules";

// ============================================================================
// Validation Limits
// ============================================================================

/// Maximum length for Kubernetes resource names
pub const MAX_NAME_LENGTH: usize = 253;

/// Maximum length for a domain name
pub const MAX_DOMAIN_LENGTH: usize = 253;

/// Lowest valid port number
pub const MIN_PORT: i64 = 1;

/// Highest valid port number
pub const MAX_PORT: i64 = 65535;

/// Value of `spec.tls` applied on create when the field is absent
pub const DEFAULT_TLS: bool = true;

// ============================================================================
// HTTP Server Constants
// ============================================================================

/// Default bind address for the REST API
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Maximum accepted request body size (1 MiB)
pub const MAX_REQUEST_BODY_SIZE: usize = 1024 * 1024;

/// Collection route for `ProxyRule` resources
pub const PROXY_RULES_PATH: &str = "/api/proxyrules";

/// Path for Prometheus metrics endpoint
pub const METRICS_SERVER_PATH: &str = "/metrics";

/// Path for the liveness endpoint
pub const HEALTH_PATH: &str = "/healthz";

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 4;
