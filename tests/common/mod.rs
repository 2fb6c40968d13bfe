// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

// Common test utilities for integration tests

use external_dns_addon::errors::RenderError;
use external_dns_addon::harness::{Harness, HarnessConfig};
use std::path::{Path, PathBuf};

/// Repository root holding `bundle/config` and `tests/fixtures`
pub fn repo_root() -> &'static Path {
    Path::new(env!("CARGO_MANIFEST_DIR"))
}

/// Scenario catalog shipped with the package
pub fn scenario_catalog() -> PathBuf {
    repo_root().join("tests/fixtures/scenarios.yaml")
}

/// Harness over the real package templates
pub fn package_harness() -> Harness {
    Harness::new(HarnessConfig::from_root(repo_root()))
}

/// Renders the package with the named values fixture
pub fn render_fixture(harness: &Harness, fixture: &str) -> Result<String, RenderError> {
    let values = harness
        .values_from_file(fixture)
        .unwrap_or_else(|e| panic!("values fixture {fixture} should load: {e}"));
    harness
        .render(&values)
        .unwrap_or_else(|e| panic!("templates should resolve: {e}"))
}
