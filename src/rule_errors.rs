// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for `ProxyRule` validation, conflict detection, and storage.
//!
//! This module provides:
//! - [`FieldError`] / [`ValidationErrors`] - field-scoped validation failures that are
//!   accumulated rather than returned at the first problem
//! - [`StoreError`] - failures reported by a namespaced object store
//! - [`RuleError`] - the composite error returned by every rule manager operation
//!
//! [`RuleError`] maps onto HTTP status codes and CamelCase reasons so the dispatcher
//! never needs to inspect error messages.

use std::fmt;
use thiserror::Error;

/// A single validation failure scoped to a field path such as `spec.domain`
/// or `spec.destinations[2]`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("validation error on field '{field}': {message}")]
pub struct FieldError {
    /// Dotted path of the offending field
    pub field: String,
    /// Human-readable explanation
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Accumulator for [`FieldError`]s.
///
/// Validators push into this collection and keep going; the collection only becomes
/// a terminal failure when the caller converts it with [`ValidationErrors::into_result`].
/// The textual form joins every error with `"; "`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure on `field`.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Append every error from `other`.
    pub fn extend(&mut self, other: ValidationErrors) {
        self.errors.extend(other.errors);
    }

    /// Append every error from `other`, re-keyed to `field`.
    ///
    /// Used when a value validator reports against a generic field name but the
    /// value came from an indexed position (e.g. `spec.destinations[1]`).
    pub fn extend_as(&mut self, field: &str, other: ValidationErrors) {
        self.errors.extend(
            other
                .errors
                .into_iter()
                .map(|e| FieldError::new(field, e.message)),
        );
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.errors.iter()
    }

    /// Returns true if any error is reported on a field whose path contains `fragment`.
    #[must_use]
    pub fn mentions(&self, fragment: &str) -> bool {
        self.errors.iter().any(|e| e.field.contains(fragment))
    }

    /// Consume the collection, failing if any error was recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one error was pushed.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl From<Vec<FieldError>> for ValidationErrors {
    fn from(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }
}

impl IntoIterator for ValidationErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

/// Errors reported by a namespaced object store.
///
/// Stores distinguish "not found" and "already exists" from every other failure;
/// the latter are opaque and carried as text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No object with this name exists in the namespace
    #[error("resource '{name}' not found in namespace '{namespace}'")]
    NotFound {
        /// Namespace that was searched
        namespace: String,
        /// Object name that was not found
        name: String,
    },

    /// An object with this name already exists in the namespace
    #[error("resource '{name}' already exists in namespace '{namespace}'")]
    AlreadyExists {
        /// Namespace holding the existing object
        namespace: String,
        /// Name of the existing object
        name: String,
    },

    /// Any other backing-store failure
    #[error("store operation failed: {0}")]
    Other(String),
}

/// Composite error returned by rule manager operations.
#[derive(Error, Debug, Clone)]
pub enum RuleError {
    /// One or more field validation errors, all reported together
    #[error("{0}")]
    ValidationFailed(ValidationErrors),

    /// A rule with the same name already exists (create only)
    #[error("Proxy rule with name '{name}' already exists")]
    NameConflict {
        /// Name that is already taken
        name: String,
    },

    /// Another live rule already serves the domain
    #[error("proxy rule with domain '{domain}' already exists (used by rule '{owner}')")]
    DomainConflict {
        /// Domain that was rejected
        domain: String,
        /// Name of the rule that owns the domain
        owner: String,
    },

    /// No rule with this name exists
    #[error("proxy rule '{name}' not found")]
    NotFound {
        /// Name that was requested
        name: String,
    },

    /// Backing store failure not otherwise classified
    #[error(transparent)]
    Store(StoreError),
}

impl RuleError {
    /// HTTP status code the dispatcher should answer with.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ValidationFailed(_) => 400,
            Self::NameConflict { .. } | Self::DomainConflict { .. } => 409,
            Self::NotFound { .. } => 404,
            Self::Store(_) => 500,
        }
    }

    /// CamelCase reason used in `Status` response bodies and metric labels.
    #[must_use]
    pub fn status_reason(&self) -> &'static str {
        match self {
            Self::ValidationFailed(_) => "ValidationFailed",
            Self::NameConflict { .. } => "NameConflict",
            Self::DomainConflict { .. } => "DomainConflict",
            Self::NotFound { .. } => "NotFound",
            Self::Store(_) => "StoreError",
        }
    }
}

impl From<ValidationErrors> for RuleError {
    fn from(errors: ValidationErrors) -> Self {
        Self::ValidationFailed(errors)
    }
}

// Store "not found" surfaces as the rule-level NotFound so callers match a single variant.
impl From<StoreError> for RuleError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { name, .. } => Self::NotFound { name },
            StoreError::AlreadyExists { name, .. } => Self::NameConflict { name },
            other @ StoreError::Other(_) => Self::Store(other),
        }
    }
}
