// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # proxyrule-api - validation and conflict resolution for `ProxyRule` resources
//!
//! A `ProxyRule` binds a public domain to one or more destinations behind a reverse
//! proxy. This crate guards every mutation of those rules: it validates the shape and
//! syntax of incoming documents, keeps names and domains unique within the rule
//! namespace, and applies the result to a namespaced object store.
//!
//! ## Modules
//!
//! - [`validation`] - syntax validators and the structural validator
//! - [`conflict`] - domain uniqueness check against live rules
//! - [`manager`] - the create/update/delete/get/list pipeline
//! - [`store`] - the object store contract with in-memory and Kubernetes backends
//! - [`api`] - the axum HTTP dispatcher
//! - [`crd`] - the `ProxyRule` custom resource type
//! - [`record`] - the semi-structured wire document
//! - [`rule_errors`] - error taxonomy
//! - [`metrics`] - Prometheus operation metrics
//! - [`config`] - command line and environment configuration
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use proxyrule_api::{api, manager::RuleManager, store::InMemoryStore};
//!
//! let manager = RuleManager::new(Arc::new(InMemoryStore::new()), "proxy-rules");
//! let app = api::router(Arc::new(manager));
//! ```

pub mod api;
pub mod config;
pub mod conflict;
pub mod constants;
pub mod crd;
pub mod manager;
pub mod metrics;
pub mod record;
pub mod rule_errors;
pub mod store;
pub mod validation;

#[cfg(test)]
mod manager_tests;
