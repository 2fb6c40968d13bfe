// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Data values: package defaults merged with user-supplied overrides.
//!
//! Defaults come from template files annotated with `#@data/values`. User
//! values arrive as a YAML stream and may only override keys the defaults
//! declare. Mappings merge key by key; scalars and sequences are replaced.
//! A declared mapping can only be overridden by another mapping.
//! An empty mapping in the defaults declares an open map: any key may be set
//! beneath it.

use crate::errors::RenderError;
use serde::Deserialize;
use serde_yaml::mapping::Entry;
use serde_yaml::{Mapping, Value};

/// Origin label used in errors about the values input stream
const VALUES_INPUT_ORIGIN: &str = "data values input";

/// Splits `text` into its non-empty YAML documents.
///
/// Documents that are empty or hold only comments are dropped.
///
/// # Errors
///
/// Returns [`RenderError::InvalidYaml`] tagged with `origin` if any document
/// fails to parse.
pub fn parse_documents(text: &str, origin: &str) -> Result<Vec<Value>, RenderError> {
    let mut documents = Vec::new();
    if text.trim().is_empty() {
        return Ok(documents);
    }

    for document in serde_yaml::Deserializer::from_str(text) {
        let value = Value::deserialize(document).map_err(|source| RenderError::InvalidYaml {
            origin: origin.to_string(),
            source,
        })?;
        if !value.is_null() {
            documents.push(value);
        }
    }
    Ok(documents)
}

/// Merged data values exposed to templates.
#[derive(Debug, Clone, PartialEq)]
pub struct DataValues {
    root: Value,
}

impl Default for DataValues {
    fn default() -> Self {
        Self {
            root: Value::Mapping(Mapping::new()),
        }
    }
}

impl DataValues {
    /// Builds defaults from `(origin, content)` pairs of data-values files.
    ///
    /// Later files may add keys as well as change earlier ones.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidYaml`] if a file does not parse.
    pub fn from_defaults<'a, I>(sources: I) -> Result<Self, RenderError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut values = Self::default();
        for (origin, content) in sources {
            for document in parse_documents(content, origin)? {
                merge_values(&mut values.root, document, &mut Vec::new(), false)?;
            }
        }
        Ok(values)
    }

    /// Applies the user values stream on top of the defaults.
    ///
    /// With `strict` set, a key absent from the defaults is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidYaml`] for unparseable input. In strict
    /// mode, returns [`RenderError::UnknownDataValue`] for undeclared keys and
    /// [`RenderError::DataValueNotMapping`] when a declared mapping is given a
    /// scalar or sequence.
    pub fn apply_overrides(&mut self, text: &str, strict: bool) -> Result<(), RenderError> {
        for document in parse_documents(text, VALUES_INPUT_ORIGIN)? {
            merge_values(&mut self.root, document, &mut Vec::new(), strict)?;
        }
        Ok(())
    }

    /// The merged values as a YAML tree.
    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.root
    }
}

fn merge_values(
    base: &mut Value,
    overrides: Value,
    path: &mut Vec<String>,
    strict: bool,
) -> Result<(), RenderError> {
    let override_map = match overrides {
        Value::Mapping(map) if base.is_mapping() => map,
        other if strict && base.is_mapping() => {
            return Err(RenderError::DataValueNotMapping {
                path: path_label(path),
                found: value_type(&other).to_string(),
            });
        }
        other => {
            *base = other;
            return Ok(());
        }
    };

    let Value::Mapping(base_map) = base else {
        return Ok(());
    };

    // Keys below a declared empty mapping are user-defined
    let strict = strict && !base_map.is_empty();

    for (key, value) in override_map {
        path.push(key_label(&key));
        match base_map.entry(key) {
            Entry::Occupied(mut occupied) => {
                merge_values(occupied.get_mut(), value, path, strict)?;
            }
            Entry::Vacant(_) if strict => {
                return Err(RenderError::UnknownDataValue {
                    path: path.join("."),
                });
            }
            Entry::Vacant(vacant) => {
                vacant.insert(value);
            }
        }
        path.pop();
    }
    Ok(())
}

fn path_label(path: &[String]) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.join(".")
    }
}

fn value_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

fn key_label(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_else(|_| "<key>".to_string()),
    }
}

#[cfg(test)]
#[path = "data_values_tests.rs"]
mod data_values_tests;
