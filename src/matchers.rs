// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Document matchers over rendered output.
//!
//! These helpers answer the two questions rendering tests ask:
//! "which rendered documents have these field values?" and "does this
//! document hold this value at this path?". Values are compared as text (see
//! [`scalar_text`]), so `runAsUser: 1000` matches `"1000"`.
//!
//! ```rust
//! use external_dns_addon::matchers::{find_docs_matching_yaml_path, has_yaml_path_with_value};
//!
//! let output = "kind: ServiceAccount\nmetadata:\n  name: external-dns\n---\nkind: Namespace\n";
//! let docs = find_docs_matching_yaml_path(output, [(".kind", "ServiceAccount")]).unwrap();
//! assert_eq!(docs.len(), 1);
//! assert!(has_yaml_path_with_value(&docs[0], "$.metadata.name", "external-dns").unwrap());
//! ```

use crate::errors::HarnessError;
use crate::yaml_path::{scalar_text, YamlPath};
use serde::Deserialize;
use serde_yaml::Value;

/// Splits rendered output into its non-empty documents.
///
/// # Errors
///
/// Returns [`HarnessError::OutputParse`] if the output is not valid YAML.
pub fn parse_output_documents(output: &str) -> Result<Vec<Value>, HarnessError> {
    let mut documents = Vec::new();
    for document in serde_yaml::Deserializer::from_str(output) {
        let value = Value::deserialize(document).map_err(HarnessError::OutputParse)?;
        if !value.is_null() {
            documents.push(value);
        }
    }
    Ok(documents)
}

/// Returns every document of `output` in which each selector path holds the
/// expected value.
///
/// # Errors
///
/// Returns [`HarnessError::InvalidPath`] for a malformed selector path and
/// [`HarnessError::OutputParse`] for unparseable output.
pub fn find_docs_matching_yaml_path<I, K, V>(
    output: &str,
    selectors: I,
) -> Result<Vec<Value>, HarnessError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let selectors = selectors
        .into_iter()
        .map(|(path, expected)| {
            YamlPath::parse(path.as_ref()).map(|path| (path, expected.as_ref().to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(parse_output_documents(output)?
        .into_iter()
        .filter(|doc| {
            selectors.iter().all(|(path, expected)| {
                path.lookup(doc)
                    .is_some_and(|value| scalar_text(value) == *expected)
            })
        })
        .collect())
}

/// Returns the text at `path` in `document`, or `None` if the path does not
/// resolve.
///
/// # Errors
///
/// Returns [`HarnessError::InvalidPath`] for a malformed path.
pub fn yaml_path_value(document: &Value, path: &str) -> Result<Option<String>, HarnessError> {
    Ok(YamlPath::parse(path)?.lookup(document).map(scalar_text))
}

/// Returns `true` if `path` resolves in `document` to `expected`.
///
/// # Errors
///
/// Returns [`HarnessError::InvalidPath`] for a malformed path.
pub fn has_yaml_path_with_value(
    document: &Value,
    path: &str,
    expected: &str,
) -> Result<bool, HarnessError> {
    Ok(yaml_path_value(document, path)?.as_deref() == Some(expected))
}

#[cfg(test)]
#[path = "matchers_tests.rs"]
mod matchers_tests;
