// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Template rendering engine.
//!
//! Renders an ordered list of template files into a multi-document YAML
//! stream. Files are classified by the annotation on their first non-blank
//! line:
//!
//! - `#@data/values` - plain YAML defaults for the data values
//! - `#@overlay` - a template whose documents are [`Overlay`]s
//! - anything else - a manifest template
//!
//! Rendering runs in these stages:
//!
//! 1. Merge the defaults, then apply the user values on top
//!    (see [`DataValues`]).
//! 2. Expand every template with Tera. Templates see the merged data values
//!    as `values` and may call `fail(message="...")` to abort rendering.
//! 3. Collect manifest documents in file order and apply the overlays in
//!    file order.
//! 4. Optionally check each resource against its Kubernetes schema.
//! 5. Serialize the documents, separated by `---`.
//!
//! # Example
//!
//! ```rust,no_run
//! use external_dns_addon::constants::TEMPLATE_GLOB_PATTERNS;
//! use external_dns_addon::engine::{render_templates, RenderOptions};
//! use external_dns_addon::template_set::resolve_template_files;
//! use std::path::Path;
//!
//! let files = resolve_template_files(Path::new("bundle/config"), &TEMPLATE_GLOB_PATTERNS)?;
//! let values = "deployment:\n  args: [--source=service, --provider=inmemory]\n";
//! let output = render_templates(&RenderOptions::default(), &files, values.as_bytes())?;
//! println!("{output}");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::constants::{
    DATA_VALUES_ANNOTATION, DOCUMENT_SEPARATOR, FAIL_FUNCTION, FAIL_MESSAGE_ARG,
    OVERLAY_ANNOTATION, VALUES_CONTEXT_KEY,
};
use crate::data_values::{parse_documents, DataValues};
use crate::errors::RenderError;
use crate::manifest::validate_documents;
use crate::overlay::{apply_overlays, Overlay};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::io::Read;
use std::path::PathBuf;
use tera::{Context as TeraContext, Tera};
use tracing::{debug, info};

/// Options controlling a render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Decode known resource kinds into their Kubernetes types after rendering
    pub validate_schema: bool,
    /// Reject data values that the package defaults do not declare
    pub strict_data_values: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            validate_schema: true,
            strict_data_values: true,
        }
    }
}

/// Something that turns template files plus data values into rendered text.
///
/// The rendering harness is generic over this trait.
pub trait Renderer {
    /// Renders `files` in order with the data values read from `values`.
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] if any stage of rendering fails.
    fn render(&self, files: &[PathBuf], values: &mut dyn Read) -> Result<String, RenderError>;
}

/// The Tera-backed [`Renderer`].
#[derive(Debug, Clone, Default)]
pub struct TemplateEngine {
    options: RenderOptions,
}

impl TemplateEngine {
    /// Creates an engine with the given options.
    #[must_use]
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// The options this engine renders with.
    #[must_use]
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }
}

impl Renderer for TemplateEngine {
    fn render(&self, files: &[PathBuf], values: &mut dyn Read) -> Result<String, RenderError> {
        render_templates(&self.options, files, values)
    }
}

/// How a template file takes part in rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    /// Data-values defaults
    DataValues,
    /// Overlay documents
    Overlay,
    /// Kubernetes manifests
    Manifest,
}

impl TemplateKind {
    /// Classifies a template by the annotation on its first non-blank line.
    #[must_use]
    pub fn of(content: &str) -> Self {
        let first = content
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default();

        if first == DATA_VALUES_ANNOTATION {
            Self::DataValues
        } else if first == OVERLAY_ANNOTATION {
            Self::Overlay
        } else {
            Self::Manifest
        }
    }
}

struct TemplateFile {
    name: String,
    kind: TemplateKind,
    content: String,
}

/// Renders `files` with the data values read from `values`.
///
/// An empty values stream renders with the package defaults alone.
///
/// # Errors
///
/// Returns a [`RenderError`] describing the first failure: unreadable input,
/// invalid YAML, undeclared or misshapen data values, data values templates
/// cannot see, a template error (including `fail` calls), a malformed or
/// unmatched overlay, or a schema violation.
pub fn render_templates<R: Read>(
    options: &RenderOptions,
    files: &[PathBuf],
    mut values: R,
) -> Result<String, RenderError> {
    let mut values_text = String::new();
    values
        .read_to_string(&mut values_text)
        .map_err(RenderError::ValuesRead)?;

    let templates = load_templates(files)?;
    debug!("Loaded {} template file(s)", templates.len());

    let mut data_values = DataValues::from_defaults(
        templates
            .iter()
            .filter(|t| t.kind == TemplateKind::DataValues)
            .map(|t| (t.name.as_str(), t.content.as_str())),
    )?;
    data_values.apply_overrides(&values_text, options.strict_data_values)?;

    let tera = build_tera(&templates)?;
    let mut context = TeraContext::new();
    context
        .try_insert(VALUES_CONTEXT_KEY, data_values.as_value())
        .map_err(|e| RenderError::ValuesContext {
            reason: format_tera_error(&e),
        })?;

    let mut documents = Vec::new();
    let mut overlays = Vec::new();
    for template in templates
        .iter()
        .filter(|t| t.kind != TemplateKind::DataValues)
    {
        let rendered = tera
            .render(&template.name, &context)
            .map_err(|e| RenderError::Template {
                template: template.name.clone(),
                message: format_tera_error(&e),
            })?;
        let rendered_docs = parse_documents(&rendered, &template.name)?;
        debug!(
            "Template {} produced {} document(s)",
            template.name,
            rendered_docs.len()
        );

        match template.kind {
            TemplateKind::Overlay => {
                for (index, doc) in rendered_docs.into_iter().enumerate() {
                    overlays.push(Overlay::from_document(&template.name, index, doc)?);
                }
            }
            _ => documents.extend(rendered_docs),
        }
    }

    apply_overlays(&mut documents, &overlays)?;

    if options.validate_schema {
        validate_documents(&documents)?;
    }

    let mut output = Vec::with_capacity(documents.len());
    for doc in &documents {
        output.push(serde_yaml::to_string(doc).map_err(RenderError::Serialize)?);
    }

    info!(
        "Rendered {} document(s) with {} overlay(s)",
        documents.len(),
        overlays.len()
    );
    Ok(output.join(DOCUMENT_SEPARATOR))
}

fn load_templates(files: &[PathBuf]) -> Result<Vec<TemplateFile>, RenderError> {
    files
        .iter()
        .map(|path| {
            let content =
                std::fs::read_to_string(path).map_err(|source| RenderError::TemplateRead {
                    path: path.clone(),
                    source,
                })?;
            Ok(TemplateFile {
                name: path.display().to_string(),
                kind: TemplateKind::of(&content),
                content,
            })
        })
        .collect()
}

fn build_tera(templates: &[TemplateFile]) -> Result<Tera, RenderError> {
    let mut tera = Tera::default();
    // Output is YAML, never HTML
    tera.autoescape_on(vec![]);
    tera.register_function(FAIL_FUNCTION, fail);

    for template in templates
        .iter()
        .filter(|t| t.kind != TemplateKind::DataValues)
    {
        tera.add_raw_template(&template.name, &template.content)
            .map_err(|e| RenderError::Template {
                template: template.name.clone(),
                message: format_tera_error(&e),
            })?;
    }
    Ok(tera)
}

/// `fail(message="...")`: aborts rendering with `message`.
fn fail(args: &HashMap<String, JsonValue>) -> tera::Result<JsonValue> {
    let message = args
        .get(FAIL_MESSAGE_ARG)
        .and_then(JsonValue::as_str)
        .unwrap_or("template called fail() without a message");
    Err(tera::Error::msg(message))
}

/// Flattens a Tera error and its sources into one line.
///
/// Tera wraps function errors ("Function call 'fail' failed") around the
/// message the template supplied, so the whole chain is kept.
fn format_tera_error(error: &tera::Error) -> String {
    use std::error::Error;

    let mut messages = vec![error.to_string()];
    let mut current: Option<&dyn Error> = error.source();
    while let Some(err) = current {
        let message = err.to_string();
        if !message.is_empty() && messages.last() != Some(&message) {
            messages.push(message);
        }
        current = err.source();
    }
    messages.join(": ")
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod engine_tests;
