// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Typed views of rendered Kubernetes manifests.
//!
//! Rendered documents are untyped YAML. This module decodes the kinds the
//! external-dns package ships into their `k8s-openapi` types and then checks
//! the fields the API server requires. A template producing a structurally
//! wrong resource (a string where an integer belongs, a binding without a
//! `roleRef`, a container without a name) fails at render time rather than
//! at `kubectl apply` time.
//!
//! Decoding alone only catches wrong types: `k8s-openapi` fills in missing
//! required fields with empty defaults, so those are checked explicitly.

use crate::constants::{
    KIND_CLUSTER_ROLE, KIND_CLUSTER_ROLE_BINDING, KIND_DEPLOYMENT, KIND_NAMESPACE,
    KIND_SERVICE_ACCOUNT,
};
use crate::errors::RenderError;
use k8s_openapi::api::{
    apps::v1::Deployment,
    core::v1::{Namespace, ServiceAccount},
    rbac::v1::{ClusterRole, ClusterRoleBinding},
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::de::DeserializeOwned;
use serde_yaml::Value;
use tracing::debug;

/// Placeholder used in errors for documents without `metadata.name`
const UNNAMED: &str = "<unnamed>";

/// Placeholder used in errors for documents without `kind`
const UNKNOWN_KIND: &str = "<unknown>";

/// Returns the document's `kind`, if it is a string.
#[must_use]
pub fn document_kind(document: &Value) -> Option<&str> {
    document.get("kind").and_then(Value::as_str)
}

/// Returns the document's `metadata.name`, if it is a string.
#[must_use]
pub fn document_name(document: &Value) -> Option<&str> {
    document
        .get("metadata")
        .and_then(|m| m.get("name"))
        .and_then(Value::as_str)
}

/// Returns the document's `metadata.namespace`, if it is a string.
#[must_use]
pub fn document_namespace(document: &Value) -> Option<&str> {
    document
        .get("metadata")
        .and_then(|m| m.get("namespace"))
        .and_then(Value::as_str)
}

/// Decodes a rendered document into a typed Kubernetes resource.
///
/// # Errors
///
/// Returns [`RenderError::SchemaViolation`] if the document does not decode.
///
/// # Example
///
/// ```rust
/// use external_dns_addon::manifest::decode;
/// use k8s_openapi::api::core::v1::ServiceAccount;
///
/// let doc: serde_yaml::Value = serde_yaml::from_str(
///     "apiVersion: v1\nkind: ServiceAccount\nmetadata:\n  name: external-dns\n",
/// )
/// .unwrap();
/// let sa: ServiceAccount = decode(&doc).unwrap();
/// assert_eq!(sa.metadata.name.as_deref(), Some("external-dns"));
/// ```
pub fn decode<T: DeserializeOwned>(document: &Value) -> Result<T, RenderError> {
    serde_yaml::from_value(document.clone()).map_err(|e| RenderError::SchemaViolation {
        kind: document_kind(document).unwrap_or(UNKNOWN_KIND).to_string(),
        name: document_name(document).unwrap_or(UNNAMED).to_string(),
        reason: e.to_string(),
    })
}

/// Checks a rendered document against the schema of its kind.
///
/// Kinds outside the package's resource set are not checked.
///
/// # Errors
///
/// Returns [`RenderError::SchemaViolation`] if a known kind does not decode
/// or lacks a required field.
pub fn validate_document(document: &Value) -> Result<(), RenderError> {
    let missing = match document_kind(document) {
        Some(KIND_NAMESPACE) => {
            let namespace: Namespace = decode(document)?;
            missing_name(&namespace.metadata)
        }
        Some(KIND_SERVICE_ACCOUNT) => {
            let account: ServiceAccount = decode(document)?;
            missing_name(&account.metadata)
        }
        Some(KIND_CLUSTER_ROLE) => {
            let role: ClusterRole = decode(document)?;
            missing_name(&role.metadata)
        }
        Some(KIND_CLUSTER_ROLE_BINDING) => {
            let binding: ClusterRoleBinding = decode(document)?;
            missing_binding_field(&binding)
        }
        Some(KIND_DEPLOYMENT) => {
            let deployment: Deployment = decode(document)?;
            missing_deployment_field(&deployment)
        }
        other => {
            debug!("Skipping schema validation for kind {:?}", other);
            None
        }
    };

    match missing {
        Some(field) => Err(RenderError::SchemaViolation {
            kind: document_kind(document).unwrap_or(UNKNOWN_KIND).to_string(),
            name: document_name(document).unwrap_or(UNNAMED).to_string(),
            reason: format!("missing required field '{field}'"),
        }),
        None => Ok(()),
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, str::is_empty)
}

fn missing_name(metadata: &ObjectMeta) -> Option<String> {
    is_blank(metadata.name.as_deref()).then(|| "metadata.name".to_string())
}

fn missing_binding_field(binding: &ClusterRoleBinding) -> Option<String> {
    if let Some(field) = missing_name(&binding.metadata) {
        return Some(field);
    }
    let role_ref = &binding.role_ref;
    if role_ref.kind.is_empty() {
        return Some("roleRef.kind".to_string());
    }
    if role_ref.name.is_empty() {
        return Some("roleRef.name".to_string());
    }
    binding
        .subjects
        .iter()
        .flatten()
        .enumerate()
        .find_map(|(i, subject)| {
            if subject.kind.is_empty() {
                Some(format!("subjects[{i}].kind"))
            } else if subject.name.is_empty() {
                Some(format!("subjects[{i}].name"))
            } else {
                None
            }
        })
}

fn missing_deployment_field(deployment: &Deployment) -> Option<String> {
    if let Some(field) = missing_name(&deployment.metadata) {
        return Some(field);
    }
    let Some(spec) = &deployment.spec else {
        return Some("spec".to_string());
    };

    let selector = &spec.selector;
    let has_labels = selector.match_labels.as_ref().is_some_and(|l| !l.is_empty());
    let has_expressions = selector
        .match_expressions
        .as_ref()
        .is_some_and(|e| !e.is_empty());
    if !has_labels && !has_expressions {
        return Some("spec.selector".to_string());
    }

    let Some(pod) = &spec.template.spec else {
        return Some("spec.template.spec".to_string());
    };
    if pod.containers.is_empty() {
        return Some("spec.template.spec.containers".to_string());
    }
    pod.containers
        .iter()
        .position(|container| container.name.is_empty())
        .map(|i| format!("spec.template.spec.containers[{i}].name"))
}

/// Checks every document, stopping at the first violation.
///
/// # Errors
///
/// See [`validate_document`].
pub fn validate_documents(documents: &[Value]) -> Result<(), RenderError> {
    documents.iter().try_for_each(validate_document)
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod manifest_tests;
