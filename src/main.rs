// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use external_dns_addon::{
    constants::{DEFAULT_CONFIG_DIR, TEMPLATE_GLOB_PATTERNS},
    engine::{render_templates, RenderOptions},
    harness::{load_scenarios, Harness, HarnessConfig},
    template_set::resolve_template_files,
};
use serde::Serialize;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Render the External DNS addon package and check it against scenarios
#[derive(Debug, Parser)]
#[command(name = "external-dns-addon", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render the package and print the manifests to stdout
    Render {
        /// Package config directory
        #[arg(long, default_value = DEFAULT_CONFIG_DIR)]
        config_dir: PathBuf,

        /// Data values file, or `-` for stdin
        #[arg(long)]
        values: Option<String>,

        /// Skip decoding resources into their Kubernetes types
        #[arg(long)]
        skip_schema_validation: bool,
    },
    /// Run a scenario catalog and report the results
    Check {
        /// Scenario catalog file
        #[arg(long)]
        scenarios: PathBuf,

        /// Repository root holding the package and its fixtures
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Report format
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

#[derive(Debug, Serialize)]
struct CheckReport {
    total: usize,
    passed: usize,
    failures: Vec<ScenarioFailure>,
}

#[derive(Debug, Serialize)]
struct ScenarioFailure {
    scenario: String,
    error: String,
}

fn main() -> Result<()> {
    // Logs go to stderr so rendered manifests on stdout stay clean.
    //
    // Respects RUST_LOG if set, otherwise defaults to INFO level
    // Example: RUST_LOG=debug external-dns-addon render
    //
    // Respects RUST_LOG_FORMAT for output format
    // Example: RUST_LOG_FORMAT=json external-dns-addon check --scenarios scenarios.yaml
    initialize_logging();

    let cli = Cli::parse();
    debug!("Parsed command line: {:?}", cli);

    match cli.command {
        Command::Render {
            config_dir,
            values,
            skip_schema_validation,
        } => run_render(config_dir, values.as_deref(), skip_schema_validation),
        Command::Check {
            scenarios,
            root,
            format,
        } => run_check(&scenarios, root, format),
    }
}

fn initialize_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

fn run_render(
    config_dir: PathBuf,
    values: Option<&str>,
    skip_schema_validation: bool,
) -> Result<()> {
    let files = resolve_template_files(&config_dir, &TEMPLATE_GLOB_PATTERNS)?;
    info!(
        "Rendering {} template file(s) from {}",
        files.len(),
        config_dir.display()
    );

    let options = RenderOptions {
        validate_schema: !skip_schema_validation,
        ..RenderOptions::default()
    };
    let input: Box<dyn Read> = match values {
        Some("-") => Box::new(io::stdin().lock()),
        Some(path) => Box::new(
            File::open(path).with_context(|| format!("Failed to open values file '{path}'"))?,
        ),
        None => Box::new(io::empty()),
    };

    let output = render_templates(&options, &files, input)?;
    print!("{output}");
    Ok(())
}

fn run_check(scenarios_path: &Path, root: PathBuf, format: ReportFormat) -> Result<()> {
    let scenarios = load_scenarios(scenarios_path)?;
    info!(
        "Loaded {} scenario(s) from {}",
        scenarios.len(),
        scenarios_path.display()
    );

    let harness = Harness::new(HarnessConfig::from_root(root));
    let mut report = CheckReport {
        total: scenarios.len(),
        passed: 0,
        failures: Vec::new(),
    };

    for (scenario, result) in harness.run_all(&scenarios) {
        match result {
            Ok(()) => report.passed += 1,
            Err(e) => {
                error!("Scenario '{}' did not pass: {}", scenario.name, e);
                report.failures.push(ScenarioFailure {
                    scenario: scenario.name.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    match format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        ReportFormat::Text => {
            println!("{}/{} scenario(s) passed", report.passed, report.total);
            for failure in &report.failures {
                println!("FAILED {}: {}", failure.scenario, failure.error);
            }
        }
    }

    if !report.failures.is_empty() {
        anyhow::bail!(
            "{} of {} scenario(s) failed",
            report.failures.len(),
            report.total
        );
    }
    Ok(())
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod main_tests;
