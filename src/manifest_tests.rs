// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `manifest.rs`

#[cfg(test)]
mod tests {
    use crate::errors::RenderError;
    use crate::manifest::{
        decode, document_kind, document_name, document_namespace, validate_document,
        validate_documents,
    };
    use k8s_openapi::api::apps::v1::Deployment;
    use serde_yaml::Value;

    const DEPLOYMENT: &str = r"apiVersion: apps/v1
kind: Deployment
metadata:
  name: external-dns
  namespace: external-dns
spec:
  selector:
    matchLabels:
      app: external-dns
  template:
    metadata:
      labels:
        app: external-dns
    spec:
      containers:
      - name: external-dns
        image: k8s.gcr.io/external-dns/external-dns:v0.10.0
        securityContext:
          runAsUser: 1000
          allowPrivilegeEscalation: false
";

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_document_accessors() {
        let doc = yaml(DEPLOYMENT);
        assert_eq!(document_kind(&doc), Some("Deployment"));
        assert_eq!(document_name(&doc), Some("external-dns"));
        assert_eq!(document_namespace(&doc), Some("external-dns"));

        let bare = yaml("kind: Namespace");
        assert_eq!(document_name(&bare), None);
        assert_eq!(document_namespace(&bare), None);
    }

    #[test]
    fn test_decode_deployment() {
        let deployment: Deployment = decode(&yaml(DEPLOYMENT)).unwrap();

        let pod_spec = deployment.spec.unwrap().template.spec.unwrap();
        let container = &pod_spec.containers[0];
        assert_eq!(container.name, "external-dns");
        let security = container.security_context.as_ref().unwrap();
        assert_eq!(security.run_as_user, Some(1000));
        assert_eq!(security.allow_privilege_escalation, Some(false));
    }

    #[test]
    fn test_valid_documents_pass() {
        let docs = vec![
            yaml("apiVersion: v1\nkind: Namespace\nmetadata:\n  name: external-dns\n"),
            yaml(DEPLOYMENT),
        ];
        validate_documents(&docs).unwrap();
    }

    #[test]
    fn test_wrong_field_type_is_a_schema_violation() {
        let doc = yaml(&DEPLOYMENT.replace("runAsUser: 1000", "runAsUser: root"));

        let err = validate_document(&doc).unwrap_err();
        match err {
            RenderError::SchemaViolation { kind, name, .. } => {
                assert_eq!(kind, "Deployment");
                assert_eq!(name, "external-dns");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    fn violation_reason(doc: &Value) -> String {
        match validate_document(doc) {
            Err(RenderError::SchemaViolation { reason, .. }) => reason,
            other => panic!("expected a schema violation, got {other:?}"),
        }
    }

    #[test]
    fn test_binding_without_role_ref_is_a_schema_violation() {
        let doc = yaml(
            "apiVersion: rbac.authorization.k8s.io/v1\nkind: ClusterRoleBinding\nmetadata:\n  name: viewer\n",
        );

        assert_eq!(violation_reason(&doc), "missing required field 'roleRef.kind'");
    }

    #[test]
    fn test_binding_role_ref_without_name_is_a_schema_violation() {
        let doc = yaml(
            r"apiVersion: rbac.authorization.k8s.io/v1
kind: ClusterRoleBinding
metadata:
  name: viewer
roleRef:
  apiGroup: rbac.authorization.k8s.io
  kind: ClusterRole
subjects:
- kind: ServiceAccount
  name: external-dns
",
        );

        assert_eq!(violation_reason(&doc), "missing required field 'roleRef.name'");
    }

    #[test]
    fn test_complete_binding_passes() {
        let doc = yaml(
            r"apiVersion: rbac.authorization.k8s.io/v1
kind: ClusterRoleBinding
metadata:
  name: viewer
roleRef:
  apiGroup: rbac.authorization.k8s.io
  kind: ClusterRole
  name: external-dns
subjects:
- kind: ServiceAccount
  name: external-dns
  namespace: external-dns
",
        );

        validate_document(&doc).unwrap();
    }

    #[test]
    fn test_deployment_without_selector_is_a_schema_violation() {
        let doc = yaml(&DEPLOYMENT.replace(
            "  selector:\n    matchLabels:\n      app: external-dns\n",
            "",
        ));

        assert_eq!(violation_reason(&doc), "missing required field 'spec.selector'");
    }

    #[test]
    fn test_nameless_container_is_a_schema_violation() {
        let doc = yaml(&DEPLOYMENT.replace(
            "      - name: external-dns\n        image:",
            "      - image:",
        ));

        assert_eq!(
            violation_reason(&doc),
            "missing required field 'spec.template.spec.containers[0].name'"
        );
    }

    #[test]
    fn test_resource_without_name_is_a_schema_violation() {
        let doc = yaml("apiVersion: v1\nkind: ServiceAccount\nmetadata:\n  namespace: dns\n");

        match validate_document(&doc) {
            Err(RenderError::SchemaViolation { kind, name, reason }) => {
                assert_eq!(kind, "ServiceAccount");
                assert_eq!(name, "<unnamed>");
                assert_eq!(reason, "missing required field 'metadata.name'");
            }
            other => panic!("expected a schema violation, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_kinds_are_not_checked() {
        let doc = yaml("apiVersion: example.com/v1\nkind: Widget\nspec: 42\n");
        validate_document(&doc).unwrap();
    }
}
