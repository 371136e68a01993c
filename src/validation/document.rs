// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Typed intermediate representation of a `ProxyRule` wire record.
//!
//! The structural validator never inspects raw JSON. A [`Record`] is first parsed into a
//! [`RuleDocument`] where every field the validator cares about is a [`Field`]: absent,
//! present with the expected type, or present with the wrong type. Type problems are
//! captured here once, so the validator only deals with typed values.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::record::Record;

/// Tri-state view of an optional, typed field.
#[derive(Clone, Debug, PartialEq)]
pub enum Field<T> {
    /// The key is not present
    Absent,
    /// The key is present and has the expected type
    Present(T),
    /// The key is present with an unexpected type; carries the error message
    Invalid(String),
}

impl<T> Field<T> {
    /// The typed value, if present with the expected type.
    pub fn present(&self) -> Option<&T> {
        match self {
            Self::Present(value) => Some(value),
            _ => None,
        }
    }
}

/// Parsed view of a whole record.
#[derive(Clone, Debug, PartialEq)]
pub struct RuleDocument {
    pub name: Field<String>,
    pub spec: Field<SpecDocument>,
}

/// Parsed view of `spec`.
#[derive(Clone, Debug, PartialEq)]
pub struct SpecDocument {
    pub domain: Field<String>,
    pub destination: Field<String>,
    pub destinations: Field<Vec<String>>,
    pub port: Field<i64>,
    pub tls: Field<bool>,
    /// Values are `None` when the annotation is not a string.
    pub annotations: Field<BTreeMap<String, Option<String>>>,
}

impl RuleDocument {
    /// Parse a record into its typed view. Never fails: type problems are recorded
    /// as [`Field::Invalid`].
    #[must_use]
    pub fn parse(record: &Record) -> Self {
        let name = match record.metadata() {
            Some(metadata) => string_field(metadata, "name", "name"),
            None => Field::Absent,
        };

        let spec = match record.spec() {
            None => Field::Absent,
            Some(Value::Object(spec)) => Field::Present(SpecDocument::parse(spec)),
            Some(other) => Field::Invalid(format!(
                "invalid spec structure: expected object, got {}",
                json_type(other)
            )),
        };

        Self { name, spec }
    }
}

impl SpecDocument {
    fn parse(spec: &Map<String, Value>) -> Self {
        Self {
            domain: string_field(spec, "domain", "domain"),
            destination: string_field(spec, "destination", "destination"),
            destinations: parse_destinations(spec.get("destinations")),
            port: parse_port(spec.get("port")),
            tls: match spec.get("tls") {
                None => Field::Absent,
                Some(Value::Bool(tls)) => Field::Present(*tls),
                Some(_) => Field::Invalid("tls must be a boolean".to_string()),
            },
            annotations: parse_annotations(spec.get("annotations")),
        }
    }
}

fn string_field(map: &Map<String, Value>, key: &str, noun: &str) -> Field<String> {
    match map.get(key) {
        None => Field::Absent,
        Some(Value::String(s)) => Field::Present(s.clone()),
        Some(other) => Field::Invalid(format!(
            "invalid {noun} type: expected string, got {}",
            json_type(other)
        )),
    }
}

fn parse_destinations(value: Option<&Value>) -> Field<Vec<String>> {
    let invalid = |got: &str| {
        Field::Invalid(format!(
            "invalid destinations type: expected array of strings, got {got}"
        ))
    };

    match value {
        None => Field::Absent,
        Some(Value::Array(items)) => {
            let mut destinations = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(s) => destinations.push(s.clone()),
                    other => return invalid(&format!("array containing {}", json_type(other))),
                }
            }
            Field::Present(destinations)
        }
        Some(other) => invalid(json_type(other)),
    }
}

/// Ports may arrive as floats from generic JSON decoders; accept those only when
/// they hold an exact integer.
fn parse_port(value: Option<&Value>) -> Field<i64> {
    let Some(value) = value else {
        return Field::Absent;
    };

    if let Some(port) = value.as_i64() {
        return Field::Present(port);
    }

    match value.as_f64() {
        Some(port) if port.is_finite() && port.fract() == 0.0 => {
            #[allow(clippy::cast_possible_truncation)]
            Field::Present(port as i64)
        }
        _ => Field::Invalid("port must be an integer".to_string()),
    }
}

fn parse_annotations(value: Option<&Value>) -> Field<BTreeMap<String, Option<String>>> {
    match value {
        None => Field::Absent,
        Some(Value::Object(map)) => Field::Present(
            map.iter()
                .map(|(k, v)| (k.clone(), v.as_str().map(str::to_string)))
                .collect(),
        ),
        Some(_) => Field::Invalid("annotations must be a map of strings".to_string()),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod document_tests;
