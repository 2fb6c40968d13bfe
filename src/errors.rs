// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for template rendering and the rendering harness.
//!
//! Two classes of failure are kept apart:
//! - [`RenderError`] - failures reported by the template engine. Some are
//!   expected outcomes (a template calling `fail` on missing configuration),
//!   others describe broken templates or inputs.
//! - [`HarnessError`] - failures of the harness itself (fixture I/O, glob
//!   resolution, malformed paths or catalogs) and failed scenario assertions.
//!   These are always fatal to a run.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while rendering a template set.
#[derive(Error, Debug)]
pub enum RenderError {
    /// A template file could not be read from disk
    #[error("Failed to read template '{}': {source}", path.display())]
    TemplateRead {
        /// Path of the unreadable template
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The data-values input stream could not be read
    #[error("Failed to read data values input: {0}")]
    ValuesRead(#[source] std::io::Error),

    /// A data-values file, the values input or a rendered template is not valid YAML
    #[error("Invalid YAML in {origin}: {source}")]
    InvalidYaml {
        /// Where the YAML came from (template path or "data values input")
        origin: String,
        /// Parser error
        #[source]
        source: serde_yaml::Error,
    },

    /// The values input sets a key the package defaults do not declare
    ///
    /// Overrides may only change declared data values, so a typo in a values
    /// file is reported instead of silently ignored.
    #[error("Data value '{path}' is not declared in the package defaults")]
    UnknownDataValue {
        /// Dotted path of the undeclared key
        path: String,
    },

    /// The values input replaces a declared mapping with a scalar or sequence
    #[error("Data value '{path}' must be a mapping, got {found}")]
    DataValueNotMapping {
        /// Dotted path of the mapping, or `<root>`
        path: String,
        /// Short description of the value supplied instead
        found: String,
    },

    /// The merged data values cannot be exposed to templates
    ///
    /// Templates see the values as JSON, so keys JSON cannot represent
    /// (such as a null key inside an open map) are rejected here.
    #[error("Data values cannot be passed to templates: {reason}")]
    ValuesContext {
        /// Serialization error reported by the template engine
        reason: String,
    },

    /// Template expansion failed, either through a `fail` call or a template bug
    #[error("Template '{template}' failed: {message}")]
    Template {
        /// Template name (its file path)
        template: String,
        /// Full error chain reported by the engine
        message: String,
    },

    /// An overlay document does not have the expected shape
    #[error("Overlay #{index} in '{template}' is malformed: {reason}")]
    InvalidOverlay {
        /// Template that produced the overlay
        template: String,
        /// Zero-based position of the overlay document in its template
        index: usize,
        /// What is wrong with it
        reason: String,
    },

    /// An overlay matched a different number of documents than it expects
    #[error(
        "Overlay #{index} in '{template}' expected {expected} matching document(s), found {found}"
    )]
    OverlayMatchCount {
        /// Template that produced the overlay
        template: String,
        /// Zero-based position of the overlay document in its template
        index: usize,
        /// Expected count, e.g. "1" or "1+"
        expected: String,
        /// Number of documents actually matched
        found: usize,
    },

    /// A rendered resource does not decode into its Kubernetes type
    #[error("Rendered {kind} '{name}' does not conform to its schema: {reason}")]
    SchemaViolation {
        /// Resource kind
        kind: String,
        /// Resource name, or `<unnamed>`
        name: String,
        /// Decoder error
        reason: String,
    },

    /// A rendered document could not be serialized back to YAML
    #[error("Failed to serialize rendered document: {0}")]
    Serialize(#[source] serde_yaml::Error),
}

/// Errors raised by the rendering harness.
///
/// None of these are scenario outcomes: a harness error means the run itself
/// is broken or a scenario's assertion did not hold.
#[derive(Error, Debug)]
pub enum HarnessError {
    /// A values, golden or catalog fixture could not be read
    #[error("Failed to read fixture '{}': {source}", path.display())]
    FixtureRead {
        /// Path of the fixture
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A template glob pattern is malformed
    #[error("Invalid glob pattern '{pattern}': {reason}")]
    InvalidGlob {
        /// The full pattern
        pattern: String,
        /// Pattern error
        reason: String,
    },

    /// A path matched by a glob could not be inspected
    #[error("Failed to resolve templates for '{pattern}': {reason}")]
    GlobResolution {
        /// The full pattern
        pattern: String,
        /// Glob error
        reason: String,
    },

    /// A YAML path expression could not be parsed
    #[error("Invalid YAML path '{path}': {reason}")]
    InvalidPath {
        /// The path expression
        path: String,
        /// Why it was rejected
        reason: String,
    },

    /// Rendered output could not be split into YAML documents
    #[error("Rendered output is not valid YAML: {0}")]
    OutputParse(#[source] serde_yaml::Error),

    /// A scenario catalog is malformed
    #[error("Invalid scenario catalog '{}': {reason}", path.display())]
    InvalidCatalog {
        /// Path of the catalog
        path: PathBuf,
        /// What is wrong with it
        reason: String,
    },

    /// A scenario's expectation did not hold
    #[error("Scenario '{scenario}' failed: {detail}")]
    ScenarioFailed {
        /// Scenario name
        scenario: String,
        /// Description of the mismatch
        detail: String,
    },
}

impl HarnessError {
    /// Returns `true` if this error reports a failed assertion rather than a
    /// broken harness.
    #[must_use]
    pub fn is_assertion_failure(&self) -> bool {
        matches!(self, Self::ScenarioFailed { .. })
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
