// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Semi-structured `ProxyRule` wire records.
//!
//! A [`Record`] is the JSON object exchanged with the dispatcher and the object store.
//! Its shape (`apiVersion`, `kind`, `metadata`, `spec`) is a compatibility surface and
//! is preserved as-is; this type only adds typed accessors, the defaulting step shared
//! by every mutating path, and the update merge rules.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::{API_GROUP_VERSION, DEFAULT_TLS, KIND_PROXY_RULE};

/// A `ProxyRule` document as received on the wire or held by a store.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    #[must_use]
    pub fn new(object: Map<String, Value>) -> Self {
        Self(object)
    }

    /// Wrap a JSON value, returning `None` unless it is an object.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(object) => Some(Self(object)),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    #[must_use]
    pub fn api_version(&self) -> Option<&str> {
        self.0.get("apiVersion").and_then(Value::as_str)
    }

    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        self.0.get("kind").and_then(Value::as_str)
    }

    #[must_use]
    pub fn metadata(&self) -> Option<&Map<String, Value>> {
        self.0.get("metadata").and_then(Value::as_object)
    }

    /// `metadata.name`, if present and a string.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.metadata()
            .and_then(|m| m.get("name"))
            .and_then(Value::as_str)
    }

    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.metadata()
            .and_then(|m| m.get("namespace"))
            .and_then(Value::as_str)
    }

    /// The raw `spec` value, whatever its type.
    #[must_use]
    pub fn spec(&self) -> Option<&Value> {
        self.0.get("spec")
    }

    /// `spec.domain`, if present as a non-empty string.
    #[must_use]
    pub fn domain(&self) -> Option<&str> {
        self.spec()
            .and_then(Value::as_object)
            .and_then(|s| s.get("domain"))
            .and_then(Value::as_str)
            .filter(|d| !d.is_empty())
    }

    /// Edit `metadata`, creating it (or replacing it if it is not an object) first.
    fn edit_metadata(&mut self, edit: impl FnOnce(&mut Map<String, Value>)) {
        let slot = self
            .0
            .entry("metadata")
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        if let Value::Object(metadata) = slot {
            edit(metadata);
        }
    }

    /// Apply the defaults every mutating path relies on.
    ///
    /// `apiVersion` and `kind` are filled in when absent or empty. The namespace is
    /// always forced to `namespace`: rules cannot be placed anywhere else.
    pub fn normalize(&mut self, namespace: &str) {
        if self.api_version().is_none_or(str::is_empty) {
            self.0.insert(
                "apiVersion".to_string(),
                Value::String(API_GROUP_VERSION.to_string()),
            );
        }
        if self.kind().is_none_or(str::is_empty) {
            self.0
                .insert("kind".to_string(), Value::String(KIND_PROXY_RULE.to_string()));
        }
        self.edit_metadata(|metadata| {
            metadata.insert("namespace".to_string(), Value::String(namespace.to_string()));
        });
    }

    /// Default `spec.tls` to `true` when the spec is an object without it.
    pub fn apply_create_defaults(&mut self) {
        if let Some(Value::Object(spec)) = self.0.get_mut("spec") {
            spec.entry("tls").or_insert(Value::Bool(DEFAULT_TLS));
        }
    }

    /// Merge an update request into this (stored) record.
    ///
    /// `spec` is replaced wholesale when the incoming record carries one. Metadata
    /// `labels` and `annotations` are replaced wholesale when present; every other
    /// metadata field, including the name, is left untouched.
    pub fn merge_update(&mut self, incoming: &Record) {
        if let Some(spec) = incoming.spec() {
            self.0.insert("spec".to_string(), spec.clone());
        }

        if let Some(incoming_meta) = incoming.metadata() {
            let labels = incoming_meta.get("labels").cloned();
            let annotations = incoming_meta.get("annotations").cloned();
            self.edit_metadata(|metadata| {
                if let Some(labels) = labels {
                    metadata.insert("labels".to_string(), labels);
                }
                if let Some(annotations) = annotations {
                    metadata.insert("annotations".to_string(), annotations);
                }
            });
        }
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        record.into_value()
    }
}
