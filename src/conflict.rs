// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Domain uniqueness checks for `ProxyRule` records.
//!
//! No two live rules may share a domain. The backing store cannot enforce this, so the
//! check lists the namespace and compares domains before every write. Domains compare
//! case-insensitively.
//!
//! # Known limitation
//!
//! The check is not atomic with the write that follows it. Two concurrent requests for
//! the same domain can both pass before either is stored. The Kubernetes API has no
//! transaction spanning a list and a create.

use tracing::{debug, warn};

use crate::record::Record;
use crate::rule_errors::RuleError;
use crate::store::ObjectStore;

/// Check whether another live rule already uses the candidate's domain.
///
/// # Arguments
///
/// * `store` - Store to list live rules from
/// * `namespace` - Namespace holding every rule
/// * `candidate` - Record about to be written
/// * `exclude_name` - Name of the rule being replaced, so an update does not conflict
///   with its own pre-image. `None` on create.
///
/// # Errors
///
/// * [`RuleError::DomainConflict`] naming the domain and the rule that owns it
/// * [`RuleError::Store`] if the namespace cannot be listed
pub async fn check_domain_conflict(
    store: &dyn ObjectStore,
    namespace: &str,
    candidate: &Record,
    exclude_name: Option<&str>,
) -> Result<(), RuleError> {
    // Validation already requires a domain; nothing to compare without one
    let Some(domain) = candidate.domain() else {
        return Ok(());
    };

    debug!(
        "Checking for duplicate domain {} in namespace {} (excluding {:?})",
        domain, namespace, exclude_name
    );

    let live = store.list(namespace).await.map_err(RuleError::Store)?;

    for other in &live {
        let other_name = other.name().unwrap_or_default();

        if exclude_name.is_some_and(|excluded| excluded == other_name) {
            continue;
        }

        if other
            .domain()
            .is_some_and(|d| d.eq_ignore_ascii_case(domain))
        {
            warn!(
                "Duplicate domain detected: {} is already served by rule {}/{}",
                domain, namespace, other_name
            );
            return Err(RuleError::DomainConflict {
                domain: domain.to_string(),
                owner: other_name.to_string(),
            });
        }
    }

    Ok(())
}
