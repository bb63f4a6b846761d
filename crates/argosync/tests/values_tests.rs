//! Table-driven tests for values composition.
//!
//! Each case supplies a custom values document and lists paths that must
//! hold specific values in the composed result.

use std::path::PathBuf;

use argosync::values::{compose, ValuesInput};
use serde_yaml::Value;

/// Represents a single composition test case.
struct ValuesTestCase {
    /// Test case name for identification.
    name: &'static str,
    gitops_path: &'static str,
    manifests_path: &'static str,
    custom_values: &'static str,
    /// `(dotted path, expected YAML scalar or document)` pairs.
    expected: &'static [(&'static str, &'static str)],
}

const CASES: &[ValuesTestCase] = &[
    ValuesTestCase {
        name: "defaults_at_repository_root",
        gitops_path: "",
        manifests_path: ".",
        custom_values: "",
        expected: &[
            ("applicationName", "web-staging"),
            ("application.destination.namespace", "web"),
            ("application.source.repoURL", "https://github.com/acme/gitops.git"),
            ("application.source.targetRevision", "main"),
            ("application.source.path", "web/staging/"),
        ],
    },
    ValuesTestCase {
        name: "gitops_path_and_manifests_path_join",
        gitops_path: "clusters/eu",
        manifests_path: "./deploy/k8s",
        custom_values: "",
        expected: &[("application.source.path", "clusters/eu/web/staging/deploy/k8s/")],
    },
    ValuesTestCase {
        name: "scalar_override_wins",
        gitops_path: "",
        manifests_path: ".",
        custom_values: "application:\n  destination:\n    namespace: payments\n",
        expected: &[
            ("application.destination.namespace", "payments"),
            ("application.source.targetRevision", "main"),
        ],
    },
    ValuesTestCase {
        name: "sequence_replaces_wholesale",
        gitops_path: "",
        manifests_path: ".",
        custom_values: "application:\n  syncPolicy:\n    syncOptions: [Validate=false]\n",
        expected: &[("application.syncPolicy.syncOptions", "[Validate=false]")],
    },
    ValuesTestCase {
        name: "mapping_replaced_by_scalar",
        gitops_path: "",
        manifests_path: ".",
        custom_values: "application:\n  destination: in-cluster\n",
        expected: &[
            ("application.destination", "in-cluster"),
            ("application.source.path", "web/staging/"),
        ],
    },
    ValuesTestCase {
        name: "unknown_top_level_keys_are_added",
        gitops_path: "",
        manifests_path: ".",
        custom_values: "project: platform\nargocdNamespace: gitops\n",
        expected: &[
            ("project", "platform"),
            ("argocdNamespace", "gitops"),
            ("applicationName", "web-staging"),
        ],
    },
];

fn lookup<'a>(root: &'a Value, dotted: &str) -> &'a Value {
    dotted.split('.').fold(root, |node, key| &node[key])
}

fn input(case: &ValuesTestCase) -> ValuesInput {
    ValuesInput {
        application_name: "web".to_string(),
        environment: "staging".to_string(),
        source_org: "acme".to_string(),
        source_repo: "gitops".to_string(),
        source_branch: "main".to_string(),
        gitops_path: case.gitops_path.to_string(),
        custom_values: case.custom_values.to_string(),
        application_manifests_path: PathBuf::from(case.manifests_path),
    }
}

#[test]
fn test_values_composition_cases() {
    for case in CASES {
        let composed = compose(&input(case))
            .unwrap_or_else(|e| panic!("case '{}' failed to compose: {}", case.name, e));
        let values: Value = serde_yaml::from_str(&composed).unwrap();

        for (path, expected) in case.expected {
            let expected: Value = serde_yaml::from_str(expected).unwrap();
            assert_eq!(
                lookup(&values, path),
                &expected,
                "case '{}': unexpected value at {}",
                case.name,
                path
            );
        }
    }
}

#[test]
fn test_composition_is_deterministic() {
    for case in CASES {
        assert_eq!(
            compose(&input(case)).unwrap(),
            compose(&input(case)).unwrap(),
            "case '{}' is not deterministic",
            case.name
        );
    }
}
