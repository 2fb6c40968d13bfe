// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the external-dns addon package.
//!
//! This module contains all string constants shared by the template engine,
//! the rendering harness and the CLI. Constants are organized by category.

// ============================================================================
// Package Layout Constants
// ============================================================================

/// Template directory of the package, relative to the repository root
pub const DEFAULT_CONFIG_DIR: &str = "bundle/config";

/// Glob patterns resolved against the template directory, in render order:
/// upstream manifests, overlays, then local top-level templates
pub const TEMPLATE_GLOB_PATTERNS: [&str; 3] = ["upstream/*.yaml", "overlays/*.yaml", "*.yaml"];

/// Directory holding data-values fixtures, relative to the repository root
pub const VALUES_FIXTURES_DIR: &str = "tests/fixtures/values";

/// Directory holding golden output fixtures, relative to the repository root
pub const EXPECTED_FIXTURES_DIR: &str = "tests/fixtures/expected";

// ============================================================================
// Template Annotation Constants
// ============================================================================

/// First-line annotation marking a file as data-values defaults
pub const DATA_VALUES_ANNOTATION: &str = "#@data/values";

/// First-line annotation marking a file as a set of overlays
pub const OVERLAY_ANNOTATION: &str = "#@overlay";

/// Name under which merged data values are exposed to templates
pub const VALUES_CONTEXT_KEY: &str = "values";

/// Template function that aborts rendering with a message
pub const FAIL_FUNCTION: &str = "fail";

/// Argument of [`FAIL_FUNCTION`] carrying the failure message
pub const FAIL_MESSAGE_ARG: &str = "message";

/// Separator written between rendered documents
pub const DOCUMENT_SEPARATOR: &str = "---\n";

// ============================================================================
// Overlay Document Keys
// ============================================================================

/// Subset pattern selecting the documents an overlay applies to
pub const OVERLAY_MATCH_KEY: &str = "match";

/// Number of documents an overlay expects to match
pub const OVERLAY_EXPECTS_KEY: &str = "expects";

/// Patch merged into every matched document
pub const OVERLAY_PATCH_KEY: &str = "patch";

/// Key used to pair up items when merging sequences of mappings
pub const MERGE_KEY: &str = "name";

// ============================================================================
// Kubernetes Kind Constants
// ============================================================================

/// Kind name for `Namespace` resources
pub const KIND_NAMESPACE: &str = "Namespace";

/// Kind name for `ServiceAccount` resources
pub const KIND_SERVICE_ACCOUNT: &str = "ServiceAccount";

/// Kind name for `ClusterRole` resources
pub const KIND_CLUSTER_ROLE: &str = "ClusterRole";

/// Kind name for `ClusterRoleBinding` resources
pub const KIND_CLUSTER_ROLE_BINDING: &str = "ClusterRoleBinding";

/// Kind name for `Deployment` resources
pub const KIND_DEPLOYMENT: &str = "Deployment";
