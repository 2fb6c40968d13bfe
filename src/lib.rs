// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # external-dns-addon - External DNS addon package and its test harness
//!
//! This crate packages the upstream `external-dns` manifests as a
//! configurable addon and renders them with user-supplied data values. It also
//! provides the harness that checks the rendered output against scenarios.
//!
//! ## Overview
//!
//! The package lives under `bundle/config`:
//!
//! - `upstream/*.yaml` - the upstream manifests, used as templates
//! - `overlays/*.yaml` - overlays that push data values into those manifests
//! - `*.yaml` - data-value defaults and validation checks
//!
//! Rendering merges the data values, expands the templates, applies the
//! overlays, and prints a multi-document YAML stream.
//!
//! ## Modules
//!
//! - [`engine`] - the renderer and its [`engine::Renderer`] seam
//! - [`data_values`] - defaults and user override merging
//! - [`overlay`] - overlay parsing, matching and strategic merge
//! - [`manifest`] - resource identity and Kubernetes schema checks
//! - [`template_set`] - template discovery from glob groups
//! - [`yaml_path`] - typed YAML path expressions
//! - [`matchers`] - document queries over rendered output
//! - [`harness`] - scenario runner and catalog loader
//! - [`errors`] - renderer and harness error types
//! - [`constants`] - layout, annotation and resource kind constants
//!
//! ## Example
//!
//! ```rust,no_run
//! use external_dns_addon::harness::{
//!     DocumentAssertion, Expectation, Harness, HarnessConfig, Scenario,
//! };
//!
//! let harness = Harness::new(HarnessConfig::from_root(env!("CARGO_MANIFEST_DIR")));
//! let scenario = Scenario::new(
//!     "Providing a namespace",
//!     Some("namespace.yaml"),
//!     Expectation::Documents(vec![DocumentAssertion::new(
//!         [(".metadata.namespace", "custom-external-dns-namespace")],
//!         2,
//!     )]),
//! );
//! harness.run(&scenario)?;
//! # Ok::<(), external_dns_addon::errors::HarnessError>(())
//! ```

pub mod constants;
pub mod data_values;
pub mod engine;
pub mod errors;
pub mod harness;
pub mod manifest;
pub mod matchers;
pub mod overlay;
pub mod template_set;
pub mod yaml_path;
