// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `overlay.rs`

#[cfg(test)]
mod tests {
    use crate::errors::RenderError;
    use crate::overlay::{apply_overlays, is_subset, merge_patch, MatchCount, Overlay};
    use serde_yaml::Value;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    fn documents() -> Vec<Value> {
        vec![
            yaml("kind: Namespace\nmetadata:\n  name: external-dns\n"),
            yaml(
                "kind: ServiceAccount\nmetadata:\n  name: external-dns\n  namespace: external-dns\n",
            ),
            yaml(
                r"kind: Deployment
metadata:
  name: external-dns
  namespace: external-dns
spec:
  template:
    spec:
      containers:
      - name: external-dns
        image: external-dns:v0.10.0
        args:
        - --source=ingress
",
            ),
        ]
    }

    fn overlay(text: &str) -> Overlay {
        Overlay::from_document("overlays/test.yaml", 0, yaml(text)).unwrap()
    }

    #[test]
    fn test_match_count_parsing() {
        assert_eq!(MatchCount::from_value(&yaml("2")), Some(MatchCount::Exactly(2)));
        assert_eq!(MatchCount::from_value(&yaml("'3'")), Some(MatchCount::Exactly(3)));
        assert_eq!(MatchCount::from_value(&yaml("1+")), Some(MatchCount::AtLeast(1)));
        assert_eq!(MatchCount::from_value(&yaml("'0+'")), Some(MatchCount::AtLeast(0)));
        assert_eq!(MatchCount::from_value(&yaml("many")), None);
        assert_eq!(MatchCount::from_value(&yaml("-1")), None);
    }

    #[test]
    fn test_match_count_allows() {
        assert!(MatchCount::Exactly(1).allows(1));
        assert!(!MatchCount::Exactly(1).allows(2));
        assert!(MatchCount::AtLeast(1).allows(5));
        assert!(!MatchCount::AtLeast(1).allows(0));
        assert_eq!(MatchCount::AtLeast(1).to_string(), "1+");
    }

    #[test]
    fn test_is_subset_nested_mapping() {
        let doc = &documents()[1];
        assert!(is_subset(&yaml("kind: ServiceAccount"), doc));
        assert!(is_subset(&yaml("metadata:\n  namespace: external-dns"), doc));
        assert!(!is_subset(&yaml("metadata:\n  namespace: other"), doc));
        assert!(!is_subset(&yaml("spec: {}"), doc));
    }

    #[test]
    fn test_is_subset_sequences_need_same_length() {
        let doc = yaml("items: [a, b]");
        assert!(is_subset(&yaml("items: [a, b]"), &doc));
        assert!(!is_subset(&yaml("items: [a]"), &doc));
    }

    #[test]
    fn test_overlay_requires_match_and_patch() {
        let err = Overlay::from_document("o.yaml", 2, yaml("patch: {}")).unwrap_err();
        assert!(matches!(err, RenderError::InvalidOverlay { index: 2, .. }));

        let err = Overlay::from_document("o.yaml", 0, yaml("match: {}\npatch: []")).unwrap_err();
        assert!(err.to_string().contains("'patch' must be a mapping"));
    }

    #[test]
    fn test_overlay_rejects_unknown_keys() {
        let err = Overlay::from_document(
            "o.yaml",
            0,
            yaml("match: {kind: Namespace}\npatch: {}\nmissing_ok: true"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown key missing_ok"));
    }

    #[test]
    fn test_overlay_rejects_bad_expects() {
        let err = Overlay::from_document(
            "o.yaml",
            0,
            yaml("match: {kind: Namespace}\nexpects: some\npatch: {}"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("'expects'"));
    }

    #[test]
    fn test_overlay_defaults_to_exactly_one_match() {
        let mut docs = documents();
        let o = overlay("match:\n  metadata:\n    namespace: external-dns\npatch: {}");

        let err = o.apply(&mut docs).unwrap_err();
        assert!(matches!(
            err,
            RenderError::OverlayMatchCount { found: 2, ref expected, .. } if expected == "1"
        ));
    }

    #[test]
    fn test_overlay_patches_all_matches() {
        let mut docs = documents();
        let o = overlay(
            "match:\n  metadata:\n    namespace: external-dns\nexpects: 1+\npatch:\n  metadata:\n    namespace: custom\n",
        );

        o.apply(&mut docs).unwrap();

        assert_eq!(docs[1]["metadata"]["namespace"].as_str(), Some("custom"));
        assert_eq!(docs[2]["metadata"]["namespace"].as_str(), Some("custom"));
        assert!(docs[0]["metadata"].get("namespace").is_none());
    }

    #[test]
    fn test_later_overlays_see_earlier_patches() {
        let mut docs = documents();
        let overlays = vec![
            overlay("match: {kind: Namespace}\npatch:\n  metadata:\n    name: custom\n"),
            overlay(
                "match:\n  kind: Namespace\n  metadata:\n    name: custom\npatch:\n  metadata:\n    labels:\n      renamed: 'true'\n",
            ),
        ];

        apply_overlays(&mut docs, &overlays).unwrap();

        assert_eq!(docs[0]["metadata"]["labels"]["renamed"].as_str(), Some("true"));
    }

    #[test]
    fn test_merge_patch_keeps_key_order_and_appends_new_keys() {
        let mut doc = yaml("a: 1\nb: 2\n");
        merge_patch(&mut doc, &yaml("c: 3\na: 10\n"));

        assert_eq!(serde_yaml::to_string(&doc).unwrap(), "a: 10\nb: 2\nc: 3\n");
    }

    #[test]
    fn test_merge_patch_merges_named_items() {
        let mut docs = documents();
        merge_patch(
            &mut docs[2],
            &yaml(
                "spec:\n  template:\n    spec:\n      containers:\n      - name: external-dns\n        args: [--source=service]\n        env: [{name: FOO, value: bar}]\n",
            ),
        );

        let containers = docs[2]["spec"]["template"]["spec"]["containers"]
            .as_sequence()
            .unwrap();
        assert_eq!(containers.len(), 1);
        assert_eq!(containers[0]["image"].as_str(), Some("external-dns:v0.10.0"));
        assert_eq!(containers[0]["args"][0].as_str(), Some("--source=service"));
        assert_eq!(containers[0]["args"].as_sequence().unwrap().len(), 1);
        assert_eq!(containers[0]["env"][0]["value"].as_str(), Some("bar"));
    }

    #[test]
    fn test_merge_patch_appends_unmatched_named_items() {
        let mut doc = yaml("items:\n- name: a\n  v: 1\n");
        merge_patch(&mut doc, &yaml("items:\n- name: b\n  v: 2\n"));

        let items = doc["items"].as_sequence().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1]["name"].as_str(), Some("b"));
    }

    #[test]
    fn test_merge_patch_replaces_unnamed_sequences() {
        let mut doc = yaml("items: [a, b, c]\n");
        merge_patch(&mut doc, &yaml("items: []\n"));

        assert!(doc["items"].as_sequence().unwrap().is_empty());
    }

    #[test]
    fn test_merge_patch_replaces_scalars_with_mappings() {
        let mut doc = yaml("emptyDir: null\n");
        merge_patch(&mut doc, &yaml("emptyDir: {medium: Memory}\n"));

        assert_eq!(doc["emptyDir"]["medium"].as_str(), Some("Memory"));
    }
}
