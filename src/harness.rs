// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Rendering test harness.
//!
//! A [`Scenario`] names a values fixture and the outcome rendering it must
//! produce. [`Harness::run`] performs one scenario end to end:
//!
//! 1. load the values fixture (or use empty input)
//! 2. resolve the template file list from the configured glob groups
//! 3. render through the [`Renderer`]
//! 4. check the outcome against the scenario's [`Expectation`]
//!
//! Every piece of state lives inside that one call; scenarios never share
//! anything. Failures of the harness itself (a missing fixture, a bad glob, a
//! malformed path) are reported as [`HarnessError`]s just like failed
//! expectations, but never count as a scenario outcome.
//!
//! # Example
//!
//! ```rust,no_run
//! use external_dns_addon::harness::{Expectation, Harness, HarnessConfig, Scenario};
//!
//! let harness = Harness::new(HarnessConfig::from_root("."));
//! let scenario = Scenario::new(
//!     "No configuration",
//!     None,
//!     Expectation::ErrorContaining("configuration is required for external-dns".into()),
//! );
//! harness.run(&scenario)?;
//! # Ok::<(), external_dns_addon::errors::HarnessError>(())
//! ```

use crate::constants::{
    DEFAULT_CONFIG_DIR, EXPECTED_FIXTURES_DIR, TEMPLATE_GLOB_PATTERNS, VALUES_FIXTURES_DIR,
};
use crate::engine::{RenderOptions, Renderer, TemplateEngine};
use crate::errors::{HarnessError, RenderError};
use crate::matchers::{find_docs_matching_yaml_path, yaml_path_value};
use crate::template_set::resolve_template_files;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Result of one render: the output text or the renderer's error.
pub type RenderOutcome = Result<String, RenderError>;

/// Where the harness finds templates and fixtures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Directory the template glob patterns are resolved against
    pub config_dir: PathBuf,
    /// Directory of values fixtures
    pub values_dir: PathBuf,
    /// Directory of golden output fixtures
    pub expected_dir: PathBuf,
    /// Template glob patterns, in render order
    pub template_patterns: Vec<String>,
}

impl HarnessConfig {
    /// Standard package layout below a repository root.
    #[must_use]
    pub fn from_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            config_dir: root.join(DEFAULT_CONFIG_DIR),
            values_dir: root.join(VALUES_FIXTURES_DIR),
            expected_dir: root.join(EXPECTED_FIXTURES_DIR),
            template_patterns: TEMPLATE_GLOB_PATTERNS.iter().map(ToString::to_string).collect(),
        }
    }
}

/// A field check on one of the documents matched by a [`DocumentAssertion`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldAssertion {
    /// Index into the matched documents
    #[serde(default)]
    pub document: usize,
    /// YAML path of the field
    pub path: String,
    /// Expected text of the field
    pub value: String,
}

impl FieldAssertion {
    /// Checks `path` on the first matched document.
    #[must_use]
    pub fn new(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            document: 0,
            path: path.into(),
            value: value.into(),
        }
    }
}

/// Selects documents, checks how many matched, then checks fields on them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentAssertion {
    /// Path to expected text; a document matches when every entry holds
    pub selector: BTreeMap<String, String>,
    /// Required number of matching documents
    pub count: usize,
    /// Field checks applied once the count holds
    #[serde(default)]
    pub fields: Vec<FieldAssertion>,
}

impl DocumentAssertion {
    /// Creates an assertion with no field checks.
    #[must_use]
    pub fn new<K, V>(selector: impl IntoIterator<Item = (K, V)>, count: usize) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            selector: selector
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            count,
            fields: Vec::new(),
        }
    }

    /// Adds a field check on the first matched document.
    #[must_use]
    pub fn with_field(mut self, path: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(FieldAssertion::new(path, value));
        self
    }
}

/// The outcome a scenario requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expectation {
    /// Rendering fails and the error message contains this text
    ErrorContaining(String),
    /// Rendering succeeds and the output equals this golden fixture
    MatchesGolden(String),
    /// Rendering succeeds and every assertion holds
    Documents(Vec<DocumentAssertion>),
}

/// One rendering scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    /// Scenario name, used in reports
    pub name: String,
    /// Values fixture file name; `None` renders with empty input
    pub values: Option<String>,
    /// Required outcome
    pub expect: Expectation,
}

impl Scenario {
    /// Creates a scenario.
    #[must_use]
    pub fn new(name: impl Into<String>, values: Option<&str>, expect: Expectation) -> Self {
        Self {
            name: name.into(),
            values: values.map(ToString::to_string),
            expect,
        }
    }
}

/// Serialized form of a [`Scenario`] in a catalog file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ScenarioSpec {
    name: String,
    #[serde(default)]
    values: Option<String>,
    expect: ExpectationSpec,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ExpectationSpec {
    #[serde(default)]
    error_containing: Option<String>,
    #[serde(default)]
    golden: Option<String>,
    #[serde(default)]
    documents: Option<Vec<DocumentAssertion>>,
}

impl ScenarioSpec {
    fn into_scenario(self) -> Result<Scenario, String> {
        let ExpectationSpec {
            error_containing,
            golden,
            documents,
        } = self.expect;

        let expect = match (error_containing, golden, documents) {
            (Some(text), None, None) => Expectation::ErrorContaining(text),
            (None, Some(file), None) => Expectation::MatchesGolden(file),
            (None, None, Some(assertions)) => Expectation::Documents(assertions),
            _ => {
                return Err(format!(
                    "scenario '{}' must set exactly one of errorContaining, golden or documents",
                    self.name
                ))
            }
        };

        Ok(Scenario {
            name: self.name,
            values: self.values,
            expect,
        })
    }
}

/// Loads a YAML scenario catalog.
///
/// The catalog is a list of entries such as:
///
/// ```yaml
/// - name: Providing a namespace
///   values: namespace.yaml
///   expect:
///     documents:
///     - selector:
///         .metadata.namespace: custom-external-dns-namespace
///       count: 2
/// ```
///
/// # Errors
///
/// Returns [`HarnessError::FixtureRead`] if the file cannot be read and
/// [`HarnessError::InvalidCatalog`] if it is malformed.
pub fn load_scenarios(path: &Path) -> Result<Vec<Scenario>, HarnessError> {
    let text = std::fs::read_to_string(path).map_err(|source| HarnessError::FixtureRead {
        path: path.to_path_buf(),
        source,
    })?;
    let invalid = |reason: String| HarnessError::InvalidCatalog {
        path: path.to_path_buf(),
        reason,
    };

    let specs: Vec<ScenarioSpec> =
        serde_yaml::from_str(&text).map_err(|e| invalid(e.to_string()))?;
    specs
        .into_iter()
        .map(|spec| spec.into_scenario().map_err(invalid))
        .collect()
}

/// Runs scenarios against a template package.
#[derive(Debug, Clone)]
pub struct Harness<R = TemplateEngine> {
    config: HarnessConfig,
    renderer: R,
}

impl Harness<TemplateEngine> {
    /// Creates a harness rendering with the default [`TemplateEngine`].
    #[must_use]
    pub fn new(config: HarnessConfig) -> Self {
        Self::with_renderer(config, TemplateEngine::new(RenderOptions::default()))
    }
}

impl<R: Renderer> Harness<R> {
    /// Creates a harness rendering with `renderer`.
    #[must_use]
    pub fn with_renderer(config: HarnessConfig, renderer: R) -> Self {
        Self { config, renderer }
    }

    /// The harness configuration.
    #[must_use]
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Resolves the template file list.
    ///
    /// # Errors
    ///
    /// Propagates glob errors from [`resolve_template_files`].
    pub fn template_files(&self) -> Result<Vec<PathBuf>, HarnessError> {
        resolve_template_files(&self.config.config_dir, &self.config.template_patterns)
    }

    /// Reads a values fixture.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::FixtureRead`] if it cannot be read.
    pub fn values_from_file(&self, filename: &str) -> Result<String, HarnessError> {
        read_fixture(&self.config.values_dir.join(filename))
    }

    /// Reads a golden output fixture.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::FixtureRead`] if it cannot be read.
    pub fn expected_output(&self, filename: &str) -> Result<String, HarnessError> {
        read_fixture(&self.config.expected_dir.join(filename))
    }

    /// Renders the package with `values`.
    ///
    /// The outer `Result` carries harness failures; the inner one is the
    /// renderer's outcome, which scenarios assert on.
    ///
    /// # Errors
    ///
    /// Returns a [`HarnessError`] if the template list cannot be resolved.
    pub fn render(&self, values: &str) -> Result<RenderOutcome, HarnessError> {
        let files = self.template_files()?;
        debug!("Rendering {} template file(s)", files.len());
        let mut input = values.as_bytes();
        Ok(self.renderer.render(&files, &mut input))
    }

    /// Runs one scenario.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::ScenarioFailed`] if the expectation does not
    /// hold, or another [`HarnessError`] if the harness itself fails.
    pub fn run(&self, scenario: &Scenario) -> Result<(), HarnessError> {
        info!("Running scenario: {}", scenario.name);

        let values = match &scenario.values {
            Some(filename) => self.values_from_file(filename)?,
            None => String::new(),
        };
        let outcome = self.render(&values)?;

        let failed = |detail: String| HarnessError::ScenarioFailed {
            scenario: scenario.name.clone(),
            detail,
        };

        match (&scenario.expect, outcome) {
            (Expectation::ErrorContaining(needle), Err(err)) => {
                let message = err.to_string();
                if !message.contains(needle.as_str()) {
                    return Err(failed(format!(
                        "expected an error containing {needle:?}, got: {message}"
                    )));
                }
            }
            (Expectation::ErrorContaining(needle), Ok(_)) => {
                return Err(failed(format!(
                    "expected an error containing {needle:?}, but rendering succeeded"
                )));
            }
            (_, Err(err)) => {
                return Err(failed(format!("rendering failed unexpectedly: {err}")));
            }
            (Expectation::MatchesGolden(filename), Ok(output)) => {
                let expected = self.expected_output(filename)?;
                if let Some(difference) = first_difference(&expected, &output) {
                    return Err(failed(format!(
                        "output differs from golden file {filename}: {difference}"
                    )));
                }
            }
            (Expectation::Documents(assertions), Ok(output)) => {
                for assertion in assertions {
                    check_documents(&output, assertion).map_err(|e| match e {
                        CheckError::Harness(e) => e,
                        CheckError::Mismatch(detail) => failed(detail),
                    })?;
                }
            }
        }

        info!("Scenario passed: {}", scenario.name);
        Ok(())
    }

    /// Runs every scenario, returning each result in order.
    ///
    /// A failing scenario does not stop the ones after it.
    pub fn run_all<'a>(
        &self,
        scenarios: &'a [Scenario],
    ) -> Vec<(&'a Scenario, Result<(), HarnessError>)> {
        scenarios
            .iter()
            .map(|scenario| (scenario, self.run(scenario)))
            .collect()
    }
}

enum CheckError {
    Harness(HarnessError),
    Mismatch(String),
}

impl From<HarnessError> for CheckError {
    fn from(e: HarnessError) -> Self {
        Self::Harness(e)
    }
}

fn check_documents(output: &str, assertion: &DocumentAssertion) -> Result<(), CheckError> {
    let documents = find_docs_matching_yaml_path(output, &assertion.selector)?;
    if documents.len() != assertion.count {
        return Err(CheckError::Mismatch(format!(
            "expected {} document(s) matching {:?}, found {}",
            assertion.count,
            assertion.selector,
            documents.len()
        )));
    }

    for field in &assertion.fields {
        let document = documents.get(field.document).ok_or_else(|| {
            CheckError::Mismatch(format!(
                "field check on document #{} but only {} matched",
                field.document,
                documents.len()
            ))
        })?;
        let actual = yaml_path_value(document, &field.path)?;
        if actual.as_deref() != Some(field.value.as_str()) {
            return Err(CheckError::Mismatch(match actual {
                Some(actual) => format!(
                    "expected {} to be {:?}, got {:?}",
                    field.path, field.value, actual
                ),
                None => format!("expected {} to be {:?}, path not found", field.path, field.value),
            }));
        }
    }
    Ok(())
}

fn read_fixture(path: &Path) -> Result<String, HarnessError> {
    std::fs::read_to_string(path).map_err(|source| HarnessError::FixtureRead {
        path: path.to_path_buf(),
        source,
    })
}

/// Describes the first line where `actual` departs from `expected`, or
/// returns `None` if they are identical.
#[must_use]
pub fn first_difference(expected: &str, actual: &str) -> Option<String> {
    if expected == actual {
        return None;
    }

    let mut expected_lines = expected.split_inclusive('\n');
    let mut actual_lines = actual.split_inclusive('\n');
    let mut line = 1;
    loop {
        match (expected_lines.next(), actual_lines.next()) {
            (Some(e), Some(a)) if e == a => line += 1,
            (e, a) => {
                return Some(format!(
                    "line {line}: expected {:?}, got {:?}",
                    e.unwrap_or("<end of file>"),
                    a.unwrap_or("<end of file>")
                ));
            }
        }
    }
}

#[cfg(test)]
#[path = "harness_tests.rs"]
mod harness_tests;
