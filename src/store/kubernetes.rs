// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Kubernetes-backed implementation of [`ObjectStore`].
//!
//! Records are stored as `ProxyRule` custom resources and addressed through the
//! dynamic API (`Api<DynamicObject>`), so documents round-trip without being forced
//! through the typed spec. The API server is the authority on name uniqueness; it has
//! no notion of domain uniqueness.
//!
//! Timeouts and retries are left to the `kube` client configuration.

use kube::api::{ApiResource, DeleteParams, DynamicObject, ListParams, PostParams};
use kube::{Api, Client};
use tracing::{debug, warn};

use super::{record_name, ObjectStore};
use crate::crd::ProxyRule;
use crate::record::Record;
use crate::rule_errors::StoreError;

/// Object store backed by the Kubernetes API server.
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
    resource: ApiResource,
}

impl KubeStore {
    /// Build a store for the `ProxyRule` resource using an existing client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            client,
            resource: ApiResource::erase::<ProxyRule>(&()),
        }
    }

    /// Build a store from in-cluster configuration, falling back to the local kubeconfig.
    ///
    /// # Errors
    ///
    /// Returns an error if no usable Kubernetes configuration is found.
    pub async fn try_default() -> Result<Self, kube::Error> {
        let client = Client::try_default().await?;
        Ok(Self::new(client))
    }

    fn api(&self, namespace: &str) -> Api<DynamicObject> {
        Api::namespaced_with(self.client.clone(), namespace, &self.resource)
    }
}

/// Map Kubernetes API errors onto the store contract.
pub(crate) fn map_kube_error(err: kube::Error, namespace: &str, name: &str) -> StoreError {
    match err {
        kube::Error::Api(ae) if ae.code == 404 => StoreError::NotFound {
            namespace: namespace.to_string(),
            name: name.to_string(),
        },
        kube::Error::Api(ae) if ae.code == 409 => StoreError::AlreadyExists {
            namespace: namespace.to_string(),
            name: name.to_string(),
        },
        other => {
            warn!(
                "Kubernetes API call for {}/{} failed: {}",
                namespace, name, other
            );
            StoreError::Other(other.to_string())
        }
    }
}

/// Map errors from a `replace` call.
///
/// A 409 on replace is a stale `resourceVersion`, not a name collision, so it is
/// reported as a backend failure.
pub(crate) fn map_replace_error(err: kube::Error, namespace: &str, name: &str) -> StoreError {
    match err {
        kube::Error::Api(ae) if ae.code == 409 => {
            warn!(
                "Replace of ProxyRule {}/{} conflicted with a concurrent write: {}",
                namespace, name, ae.message
            );
            StoreError::Other(format!(
                "update of {namespace}/{name} conflicted with a concurrent write: {}",
                ae.message
            ))
        }
        other => map_kube_error(other, namespace, name),
    }
}

pub(crate) fn to_object(record: Record) -> Result<DynamicObject, StoreError> {
    serde_json::from_value(record.into_value())
        .map_err(|e| StoreError::Other(format!("record is not a Kubernetes object: {e}")))
}

pub(crate) fn to_record(object: &DynamicObject) -> Result<Record, StoreError> {
    let value = serde_json::to_value(object)
        .map_err(|e| StoreError::Other(format!("failed to encode Kubernetes object: {e}")))?;
    Record::from_value(value)
        .ok_or_else(|| StoreError::Other("Kubernetes object did not encode as a map".to_string()))
}

#[async_trait::async_trait]
impl ObjectStore for KubeStore {
    async fn create(&self, namespace: &str, record: Record) -> Result<Record, StoreError> {
        let name = record_name(&record)?;
        let object = to_object(record)?;

        debug!("Creating ProxyRule {}/{}", namespace, name);
        let created = self
            .api(namespace)
            .create(&PostParams::default(), &object)
            .await
            .map_err(|e| map_kube_error(e, namespace, &name))?;

        to_record(&created)
    }

    async fn update(&self, namespace: &str, record: Record) -> Result<Record, StoreError> {
        let name = record_name(&record)?;
        let object = to_object(record)?;

        debug!("Replacing ProxyRule {}/{}", namespace, name);
        let updated = self
            .api(namespace)
            .replace(&name, &PostParams::default(), &object)
            .await
            .map_err(|e| map_replace_error(e, namespace, &name))?;

        to_record(&updated)
    }

    async fn delete(&self, namespace: &str, name: &str) -> Result<(), StoreError> {
        debug!("Deleting ProxyRule {}/{}", namespace, name);
        self.api(namespace)
            .delete(name, &DeleteParams::default())
            .await
            .map_err(|e| map_kube_error(e, namespace, name))?;
        Ok(())
    }

    async fn get(&self, namespace: &str, name: &str) -> Result<Record, StoreError> {
        let object = self
            .api(namespace)
            .get(name)
            .await
            .map_err(|e| map_kube_error(e, namespace, name))?;

        to_record(&object)
    }

    async fn list(&self, namespace: &str) -> Result<Vec<Record>, StoreError> {
        let list = self
            .api(namespace)
            .list(&ListParams::default())
            .await
            .map_err(|e| {
                // A missing CRD surfaces as 404 here; listing never reports "not found"
                warn!("Listing ProxyRules in {} failed: {}", namespace, e);
                StoreError::Other(e.to_string())
            })?;

        list.items.iter().map(to_record).collect()
    }
}

#[cfg(test)]
#[path = "kubernetes_tests.rs"]
mod kubernetes_tests;
