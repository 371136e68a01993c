// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Structural validation for `ProxyRule` records.
//!
//! This module walks a parsed [`RuleDocument`] and collects every applicable field
//! error so callers can report all problems in a single response. The only early exit
//! is a missing or malformed `spec`, after which no spec-level error is meaningful.
//!
//! # Modules
//!
//! - [`syntax`] - Pure validators for names, domains, destinations, and ports
//! - [`document`] - Typed intermediate representation of a wire record

pub mod document;
pub mod syntax;

pub use document::{Field, RuleDocument, SpecDocument};
pub use syntax::{validate_destination, validate_domain, validate_name, validate_port};

use crate::record::Record;
use crate::rule_errors::ValidationErrors;
use syntax::{FIELD_DOMAIN, FIELD_NAME, FIELD_PORT};

/// Validate a record for creation: metadata and spec.
#[must_use]
pub fn validate_create(record: &Record) -> ValidationErrors {
    let document = RuleDocument::parse(record);

    let mut errors = validate_metadata(&document);
    errors.extend(validate_spec(&document.spec));
    errors
}

/// Validate a record for update.
///
/// The name is immutable and therefore not re-checked, but the whole spec is, since
/// callers may resubmit it wholesale.
#[must_use]
pub fn validate_update(record: &Record) -> ValidationErrors {
    let document = RuleDocument::parse(record);
    validate_spec(&document.spec)
}

fn validate_metadata(document: &RuleDocument) -> ValidationErrors {
    match &document.name {
        Field::Present(name) => validate_name(name),
        Field::Absent => {
            let mut errors = ValidationErrors::new();
            errors.push(FIELD_NAME, "name is required");
            errors
        }
        Field::Invalid(message) => {
            let mut errors = ValidationErrors::new();
            errors.push(FIELD_NAME, message.as_str());
            errors
        }
    }
}

fn validate_spec(spec: &Field<SpecDocument>) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    let spec = match spec {
        Field::Present(spec) => spec,
        Field::Absent => {
            errors.push("spec", "spec is required");
            return errors;
        }
        Field::Invalid(message) => {
            errors.push("spec", message.as_str());
            return errors;
        }
    };

    match &spec.domain {
        Field::Present(domain) if !domain.is_empty() => errors.extend(validate_domain(domain)),
        Field::Present(_) | Field::Absent => errors.push(FIELD_DOMAIN, "domain is required"),
        Field::Invalid(message) => errors.push(FIELD_DOMAIN, message.as_str()),
    }

    validate_destinations(spec, &mut errors);

    match &spec.port {
        Field::Absent => {}
        Field::Present(port) => errors.extend(validate_port(*port)),
        Field::Invalid(message) => errors.push(FIELD_PORT, message.as_str()),
    }

    if let Field::Invalid(message) = &spec.tls {
        errors.push("spec.tls", message.as_str());
    }

    match &spec.annotations {
        Field::Absent => {}
        Field::Invalid(message) => errors.push("spec.annotations", message.as_str()),
        Field::Present(annotations) => {
            for (key, value) in annotations {
                if value.is_none() {
                    errors.push(
                        format!("spec.annotations.{key}"),
                        "annotation value must be a string",
                    );
                }
            }
        }
    }

    errors
}

/// `destination` and `destinations` are type-checked independently. The "at least
/// one" requirement is evaluated first and treats a wrong-typed field as missing, so a
/// bad `destination` with no `destinations` reports both problems.
fn validate_destinations(spec: &SpecDocument, errors: &mut ValidationErrors) {
    let has_destination = spec.destination.present().is_some_and(|d| !d.is_empty());
    let has_destinations = spec.destinations.present().is_some_and(|d| !d.is_empty());

    if !has_destination && !has_destinations {
        errors.push(
            "spec.destination/destinations",
            "either destination or destinations is required",
        );
    }

    match &spec.destination {
        Field::Present(destination) if !destination.is_empty() => {
            errors.extend(validate_destination(destination));
        }
        Field::Present(_) | Field::Absent => {}
        Field::Invalid(message) => errors.push("spec.destination", message.as_str()),
    }

    match &spec.destinations {
        Field::Present(destinations) => {
            for (i, destination) in destinations.iter().enumerate() {
                let field = format!("spec.destinations[{i}]");
                if destination.is_empty() {
                    errors.push(field, "destination cannot be empty");
                } else {
                    errors.extend_as(&field, validate_destination(destination));
                }
            }
        }
        Field::Absent => {}
        Field::Invalid(message) => errors.push("spec.destinations", message.as_str()),
    }
}
