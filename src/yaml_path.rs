// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Typed YAML path expressions.
//!
//! Paths address a node inside one YAML document:
//!
//! | Expression                                   | Meaning                          |
//! |----------------------------------------------|----------------------------------|
//! | `$` or empty                                 | the document root                |
//! | `.metadata.namespace` / `metadata.namespace` | nested mapping keys              |
//! | `$.spec.containers[0].env[1].name`           | sequence indices                 |
//! | `.metadata.annotations['example.com/key']`   | keys containing `.` or `[`       |
//!
//! Paths are parsed once into [`PathSegment`]s and evaluated without further
//! string handling.

use crate::errors::HarnessError;
use serde_yaml::Value;
use std::fmt;
use std::iter::Peekable;
use std::str::{Chars, FromStr};

/// One step of a [`YamlPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Mapping key
    Key(String),
    /// Sequence index
    Index(usize),
}

/// A parsed YAML path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YamlPath {
    raw: String,
    segments: Vec<PathSegment>,
}

impl YamlPath {
    /// Parses a path expression.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::InvalidPath`] for empty keys, unterminated or
    /// non-numeric brackets, and stray characters after a bracket.
    pub fn parse(raw: &str) -> Result<Self, HarnessError> {
        let invalid = |reason: &str| HarnessError::InvalidPath {
            path: raw.to_string(),
            reason: reason.to_string(),
        };

        let body = raw.strip_prefix('$').unwrap_or(raw);
        let mut chars = body.chars().peekable();
        let mut segments = Vec::new();

        // A bare leading key ("kind") reads as ".kind"
        let mut expect_key = body.chars().next().is_some_and(|c| c != '.' && c != '[');

        loop {
            if expect_key {
                let key = read_key(&mut chars);
                if key.is_empty() {
                    return Err(invalid("empty field name"));
                }
                segments.push(PathSegment::Key(key));
                expect_key = false;
                continue;
            }

            match chars.next() {
                None => break,
                Some('.') => expect_key = true,
                Some('[') => segments.push(read_bracket(&mut chars).map_err(invalid)?),
                Some(c) => {
                    return Err(invalid(&format!("unexpected character '{c}'")));
                }
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// The parsed segments.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Resolves the path inside `document`.
    ///
    /// Returns `None` when a key is missing, an index is out of range, or a
    /// segment meets a node of the wrong shape.
    #[must_use]
    pub fn lookup<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(document, |node, segment| match segment {
                PathSegment::Key(key) => node.as_mapping()?.get(key.as_str()),
                PathSegment::Index(i) => node.as_sequence()?.get(*i),
            })
    }
}

impl FromStr for YamlPath {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for YamlPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn read_key(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut key = String::new();
    while let Some(&c) = chars.peek() {
        if c == '.' || c == '[' {
            break;
        }
        key.push(c);
        chars.next();
    }
    key
}

fn read_bracket(chars: &mut Peekable<Chars<'_>>) -> Result<PathSegment, &'static str> {
    let mut inner = String::new();
    loop {
        match chars.next() {
            Some(']') => break,
            Some(c) => inner.push(c),
            None => return Err("unterminated '['"),
        }
    }

    let inner = inner.trim();
    let quoted = ['\'', '"'].iter().find_map(|q| {
        inner
            .strip_prefix(*q)
            .and_then(|rest| rest.strip_suffix(*q))
    });
    if let Some(key) = quoted {
        return if key.is_empty() {
            Err("empty field name")
        } else {
            Ok(PathSegment::Key(key.to_string()))
        };
    }

    inner
        .parse()
        .map(PathSegment::Index)
        .map_err(|_| "index must be a non-negative integer or a quoted key")
}

/// Renders a node as the text used for value comparisons.
///
/// Strings are returned verbatim, booleans and numbers in canonical form.
/// Null and empty collections render as the empty string, so `emptyDir: {}`
/// compares equal to `""`. Other collections render as YAML.
#[must_use]
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Sequence(seq) if seq.is_empty() => String::new(),
        Value::Mapping(map) if map.is_empty() => String::new(),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
#[path = "yaml_path_tests.rs"]
mod yaml_path_tests;
