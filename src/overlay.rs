// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Overlays: patches applied to rendered documents.
//!
//! An overlay document has the shape
//!
//! ```yaml
//! match:            # subset pattern, see [`is_subset`]
//!   kind: Deployment
//!   metadata:
//!     name: external-dns
//! expects: "1+"     # optional, defaults to exactly one match
//! patch:            # merged into every matched document, see [`merge_patch`]
//!   spec:
//!     replicas: 2
//! ```
//!
//! Overlays apply in order, each one against the documents as left by the
//! previous overlays.

use crate::constants::{MERGE_KEY, OVERLAY_EXPECTS_KEY, OVERLAY_MATCH_KEY, OVERLAY_PATCH_KEY};
use crate::errors::RenderError;
use serde_yaml::mapping::Entry;
use serde_yaml::Value;
use std::fmt;
use tracing::debug;

/// Number of documents an overlay must match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchCount {
    /// Exactly this many documents
    Exactly(usize),
    /// This many documents or more
    AtLeast(usize),
}

impl Default for MatchCount {
    fn default() -> Self {
        Self::Exactly(1)
    }
}

impl MatchCount {
    /// Parses `N`, `"N"` or `"N+"`.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_u64().map(|n| Self::Exactly(n as usize)),
            Value::String(s) => {
                let s = s.trim();
                match s.strip_suffix('+') {
                    Some(min) => min.trim().parse().ok().map(Self::AtLeast),
                    None => s.parse().ok().map(Self::Exactly),
                }
            }
            _ => None,
        }
    }

    /// Returns `true` if `found` matches satisfy this count.
    #[must_use]
    pub fn allows(self, found: usize) -> bool {
        match self {
            Self::Exactly(n) => found == n,
            Self::AtLeast(n) => found >= n,
        }
    }
}

impl fmt::Display for MatchCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exactly(n) => write!(f, "{n}"),
            Self::AtLeast(n) => write!(f, "{n}+"),
        }
    }
}

/// A parsed overlay document.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    /// Template that produced the overlay
    pub template: String,
    /// Position of the overlay within its template
    pub index: usize,
    /// Subset pattern selecting target documents
    pub matcher: Value,
    /// Required number of matches
    pub expects: MatchCount,
    /// Patch merged into each target
    pub patch: Value,
}

impl Overlay {
    /// Parses an overlay from a rendered document.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidOverlay`] if the document is not a mapping,
    /// lacks a `match` or `patch` mapping, has an unreadable `expects`, or
    /// carries unknown keys.
    pub fn from_document(
        template: &str,
        index: usize,
        document: Value,
    ) -> Result<Self, RenderError> {
        let invalid = |reason: String| RenderError::InvalidOverlay {
            template: template.to_string(),
            index,
            reason,
        };

        let Value::Mapping(mut map) = document else {
            return Err(invalid("overlay must be a mapping".to_string()));
        };

        let matcher = map
            .remove(OVERLAY_MATCH_KEY)
            .filter(Value::is_mapping)
            .ok_or_else(|| invalid(format!("'{OVERLAY_MATCH_KEY}' must be a mapping")))?;
        let patch = map
            .remove(OVERLAY_PATCH_KEY)
            .filter(Value::is_mapping)
            .ok_or_else(|| invalid(format!("'{OVERLAY_PATCH_KEY}' must be a mapping")))?;
        let expects = match map.remove(OVERLAY_EXPECTS_KEY) {
            None => MatchCount::default(),
            Some(value) => MatchCount::from_value(&value).ok_or_else(|| {
                invalid(format!(
                    "'{OVERLAY_EXPECTS_KEY}' must be N or \"N+\", got {}",
                    compact(&value)
                ))
            })?,
        };

        if let Some((key, _)) = map.iter().next() {
            return Err(invalid(format!("unknown key {}", compact(key))));
        }

        Ok(Self {
            template: template.to_string(),
            index,
            matcher,
            expects,
            patch,
        })
    }

    /// Applies this overlay to `documents`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::OverlayMatchCount`] if the number of matching
    /// documents violates `expects`; nothing is patched in that case.
    pub fn apply(&self, documents: &mut [Value]) -> Result<(), RenderError> {
        let targets: Vec<usize> = documents
            .iter()
            .enumerate()
            .filter(|(_, doc)| is_subset(&self.matcher, doc))
            .map(|(i, _)| i)
            .collect();

        if !self.expects.allows(targets.len()) {
            return Err(RenderError::OverlayMatchCount {
                template: self.template.clone(),
                index: self.index,
                expected: self.expects.to_string(),
                found: targets.len(),
            });
        }

        debug!(
            "Overlay #{} from {} patches {} document(s)",
            self.index,
            self.template,
            targets.len()
        );
        for i in targets {
            merge_patch(&mut documents[i], &self.patch);
        }
        Ok(())
    }
}

/// Applies `overlays` to `documents` in order.
///
/// # Errors
///
/// Stops at the first overlay whose match count is violated.
pub fn apply_overlays(documents: &mut [Value], overlays: &[Overlay]) -> Result<(), RenderError> {
    overlays.iter().try_for_each(|overlay| overlay.apply(documents))
}

/// Returns `true` if `pattern` is a subset of `value`.
///
/// Mappings match when every pattern key is present with a matching value;
/// sequences match element-wise and must have the same length; scalars must
/// be equal.
#[must_use]
pub fn is_subset(pattern: &Value, value: &Value) -> bool {
    match (pattern, value) {
        (Value::Mapping(pattern), Value::Mapping(value)) => pattern.iter().all(|(key, expected)| {
            value
                .get(key)
                .is_some_and(|actual| is_subset(expected, actual))
        }),
        (Value::Sequence(pattern), Value::Sequence(value)) => {
            pattern.len() == value.len()
                && pattern.iter().zip(value).all(|(p, v)| is_subset(p, v))
        }
        (Value::Tagged(pattern), Value::Tagged(value)) => {
            pattern.tag == value.tag && is_subset(&pattern.value, &value.value)
        }
        (pattern, value) => pattern == value,
    }
}

/// Merges `patch` into `target`.
///
/// Mappings merge recursively and new keys are appended. A sequence of
/// mappings that all carry a `name` merges item by item on that name, with
/// unmatched patch items appended. Anything else is replaced by the patch.
pub fn merge_patch(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Mapping(target), Value::Mapping(patch)) => {
            for (key, value) in patch {
                match target.entry(key.clone()) {
                    Entry::Occupied(mut occupied) => merge_patch(occupied.get_mut(), value),
                    Entry::Vacant(vacant) => {
                        vacant.insert(value.clone());
                    }
                }
            }
        }
        (Value::Sequence(target), Value::Sequence(patch))
            if !patch.is_empty() && all_named(patch) && all_named(target.as_slice()) =>
        {
            for item in patch {
                let name = item.get(MERGE_KEY);
                match target.iter().position(|existing| existing.get(MERGE_KEY) == name) {
                    Some(i) => merge_patch(&mut target[i], item),
                    None => target.push(item.clone()),
                }
            }
        }
        (target, patch) => *target = patch.clone(),
    }
}

fn all_named(items: &[Value]) -> bool {
    items
        .iter()
        .all(|item| item.get(MERGE_KEY).is_some_and(Value::is_string))
}

fn compact(value: &Value) -> String {
    serde_yaml::to_string(value)
        .map(|s| s.trim_end().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "overlay_tests.rs"]
mod overlay_tests;
