// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `matchers.rs`

#[cfg(test)]
mod tests {
    use crate::errors::HarnessError;
    use crate::matchers::{
        find_docs_matching_yaml_path, has_yaml_path_with_value, parse_output_documents,
        yaml_path_value,
    };
    use std::collections::BTreeMap;

    const OUTPUT: &str = r"apiVersion: v1
kind: Namespace
metadata:
  name: dns
---
apiVersion: v1
kind: ServiceAccount
metadata:
  name: external-dns
  namespace: dns
  annotations:
    key: value
---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: external-dns
  namespace: dns
spec:
  replicas: 1
";

    #[test]
    fn test_parse_output_documents() {
        assert_eq!(parse_output_documents(OUTPUT).unwrap().len(), 3);
        assert!(parse_output_documents("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_output_rejects_invalid_yaml() {
        assert!(matches!(
            parse_output_documents("a: [b\n"),
            Err(HarnessError::OutputParse(_))
        ));
    }

    #[test]
    fn test_find_by_single_selector() {
        let docs = find_docs_matching_yaml_path(OUTPUT, [(".metadata.namespace", "dns")]).unwrap();
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn test_find_requires_every_selector() {
        let selectors = BTreeMap::from([
            (".kind".to_string(), "ServiceAccount".to_string()),
            (".metadata.annotations.key".to_string(), "value".to_string()),
        ]);
        let docs = find_docs_matching_yaml_path(OUTPUT, &selectors).unwrap();
        assert_eq!(docs.len(), 1);

        let docs = find_docs_matching_yaml_path(
            OUTPUT,
            [(".kind", "Deployment"), (".metadata.annotations.key", "value")],
        )
        .unwrap();
        assert!(docs.is_empty());
    }

    #[test]
    fn test_find_compares_numbers_as_text() {
        let docs = find_docs_matching_yaml_path(OUTPUT, [("$.spec.replicas", "1")]).unwrap();
        assert_eq!(docs.len(), 1);
    }

    #[test]
    fn test_find_with_no_selectors_returns_everything() {
        let docs = find_docs_matching_yaml_path(OUTPUT, Vec::<(&str, &str)>::new()).unwrap();
        assert_eq!(docs.len(), 3);
    }

    #[test]
    fn test_find_rejects_invalid_selector_path() {
        let result = find_docs_matching_yaml_path(OUTPUT, [(".metadata[", "x")]);
        assert!(matches!(result, Err(HarnessError::InvalidPath { .. })));
    }

    #[test]
    fn test_has_yaml_path_with_value() {
        let docs = parse_output_documents(OUTPUT).unwrap();
        let path = "$.metadata.annotations.key";
        assert!(has_yaml_path_with_value(&docs[1], path, "value").unwrap());
        assert!(!has_yaml_path_with_value(&docs[1], path, "other").unwrap());
        assert!(!has_yaml_path_with_value(&docs[0], path, "").unwrap());
    }

    #[test]
    fn test_yaml_path_value() {
        let docs = parse_output_documents(OUTPUT).unwrap();
        assert_eq!(
            yaml_path_value(&docs[2], "$.metadata.name").unwrap().as_deref(),
            Some("external-dns")
        );
        assert_eq!(yaml_path_value(&docs[0], "$.spec").unwrap(), None);
    }
}
