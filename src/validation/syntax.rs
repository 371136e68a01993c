// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Syntax validators for names, domains, destinations, and ports.
//!
//! Every function here is pure and reports zero or more [`ValidationErrors`]; none of
//! them fail fast. Domain and destination checks are case-insensitive: the grammar is
//! applied to the lowercased value.

use std::net::{IpAddr, Ipv4Addr};

use crate::constants::{MAX_DOMAIN_LENGTH, MAX_NAME_LENGTH, MAX_PORT, MIN_PORT};
use crate::rule_errors::ValidationErrors;

/// Field path used for `metadata.name` errors
pub const FIELD_NAME: &str = "metadata.name";

/// Field path used for `spec.domain` errors
pub const FIELD_DOMAIN: &str = "spec.domain";

/// Field path used for `spec.destination` errors
pub const FIELD_DESTINATION: &str = "spec.destination";

/// Field path used for `spec.port` errors
pub const FIELD_PORT: &str = "spec.port";

/// Validate a Kubernetes resource name (RFC 1123 label).
///
/// Rules: required, at most 253 characters, lowercase `[a-z0-9-]`, must start and
/// end with an alphanumeric character. Length and grammar are reported independently.
#[must_use]
pub fn validate_name(name: &str) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if name.is_empty() {
        errors.push(FIELD_NAME, "name is required");
        return errors;
    }

    if name.len() > MAX_NAME_LENGTH {
        errors.push(
            FIELD_NAME,
            format!("name must not exceed {MAX_NAME_LENGTH} characters"),
        );
    }

    if !is_dns_label(name) {
        errors.push(
            FIELD_NAME,
            "name must consist of lower case alphanumeric characters or '-', \
             and must start and end with an alphanumeric character",
        );
    }

    errors
}

/// Validate a public domain name.
///
/// Checks length, multi-label DNS grammar (after lowercasing), leading/trailing dots,
/// and consecutive dots. All applicable problems are reported.
#[must_use]
pub fn validate_domain(domain: &str) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if domain.len() > MAX_DOMAIN_LENGTH {
        errors.push(
            FIELD_DOMAIN,
            format!("domain must not exceed {MAX_DOMAIN_LENGTH} characters"),
        );
    }

    if !is_dns_name(&domain.to_ascii_lowercase()) {
        errors.push(
            FIELD_DOMAIN,
            "domain must be a valid DNS name (lowercase alphanumeric characters, '-', and '.' only)",
        );
    }

    push_dot_errors(&mut errors, FIELD_DOMAIN, "domain", domain);

    errors
}

/// Validate a proxy destination: an IPv4 address, an IPv6 address, or a DNS name.
///
/// Classification order matters. A value shaped like an IPv4 address must be one,
/// and is never additionally checked as a DNS name. Any other parseable IP address
/// is accepted as-is. Everything else goes through the DNS name checks.
#[must_use]
pub fn validate_destination(destination: &str) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if looks_like_ipv4(destination) {
        if destination.parse::<Ipv4Addr>().is_err() {
            errors.push(
                FIELD_DESTINATION,
                "destination appears to be an IPv4 address but is invalid (octets must be 0-255)",
            );
        }
        return errors;
    }

    if destination.parse::<IpAddr>().is_ok() {
        return errors;
    }

    if !is_dns_name(&destination.to_ascii_lowercase()) {
        errors.push(
            FIELD_DESTINATION,
            "destination must be a valid IP address or DNS name",
        );
    }

    push_dot_errors(&mut errors, FIELD_DESTINATION, "destination", destination);

    errors
}

/// Validate a port number (1-65535).
#[must_use]
pub fn validate_port(port: i64) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if !(MIN_PORT..=MAX_PORT).contains(&port) {
        errors.push(
            FIELD_PORT,
            format!("port must be between {MIN_PORT} and {MAX_PORT}"),
        );
    }

    errors
}

fn push_dot_errors(errors: &mut ValidationErrors, field: &str, noun: &str, value: &str) {
    if value.starts_with('.') || value.ends_with('.') {
        errors.push(field, format!("{noun} must not start or end with a dot"));
    }

    if value.contains("..") {
        errors.push(field, format!("{noun} must not contain consecutive dots"));
    }
}

/// Four dot-separated groups of ASCII digits, e.g. `10.0.0.1` or `999.1.1.1`.
pub(crate) fn looks_like_ipv4(value: &str) -> bool {
    let groups: Vec<&str> = value.split('.').collect();
    groups.len() == 4
        && groups
            .iter()
            .all(|g| !g.is_empty() && g.bytes().all(|b| b.is_ascii_digit()))
}

/// `[a-z0-9]([-a-z0-9]*[a-z0-9])?`
pub(crate) fn is_dns_label(label: &str) -> bool {
    let bytes = label.as_bytes();
    let (Some(first), Some(last)) = (bytes.first(), bytes.last()) else {
        return false;
    };

    let alnum = |b: &u8| b.is_ascii_lowercase() || b.is_ascii_digit();

    alnum(first) && alnum(last) && bytes.iter().all(|b| alnum(b) || *b == b'-')
}

/// One or more DNS labels joined by single dots.
pub(crate) fn is_dns_name(name: &str) -> bool {
    name.split('.').all(is_dns_label)
}

#[cfg(test)]
#[path = "syntax_tests.rs"]
mod syntax_tests;
