// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `main.rs` - command line parsing and check reports

#[cfg(test)]
mod tests {
    use crate::{Cli, Command, ReportFormat};
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn test_render_defaults() {
        let cli = Cli::try_parse_from(["external-dns-addon", "render"]).unwrap();

        match cli.command {
            Command::Render {
                config_dir,
                values,
                skip_schema_validation,
            } => {
                assert_eq!(config_dir, PathBuf::from("bundle/config"));
                assert_eq!(values, None);
                assert!(!skip_schema_validation);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_render_with_stdin_values() {
        let cli = Cli::try_parse_from([
            "external-dns-addon",
            "render",
            "--config-dir",
            "/pkg",
            "--values",
            "-",
            "--skip-schema-validation",
        ])
        .unwrap();

        match cli.command {
            Command::Render {
                config_dir,
                values,
                skip_schema_validation,
            } => {
                assert_eq!(config_dir, PathBuf::from("/pkg"));
                assert_eq!(values.as_deref(), Some("-"));
                assert!(skip_schema_validation);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_check_requires_scenarios() {
        assert!(Cli::try_parse_from(["external-dns-addon", "check"]).is_err());
    }

    #[test]
    fn test_check_arguments() {
        let cli = Cli::try_parse_from([
            "external-dns-addon",
            "check",
            "--scenarios",
            "tests/fixtures/scenarios.yaml",
            "--format",
            "json",
        ])
        .unwrap();

        match cli.command {
            Command::Check {
                scenarios,
                root,
                format,
            } => {
                assert_eq!(scenarios, PathBuf::from("tests/fixtures/scenarios.yaml"));
                assert_eq!(root, PathBuf::from("."));
                assert_eq!(format, ReportFormat::Json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["external-dns-addon", "deploy"]).is_err());
    }
}
