//! Workflow and branch-protection derivation.
//!
//! Everything here is a pure function of the repository declaration: the CI
//! build matrix comes from a fixed per-language table, and the workflow file
//! set and required status checks are flag-gated with no other branching, so
//! identical declarations always derive identical outputs.

use serde::Serialize;

use crate::domain::config::{Language, RepositoryDeclaration};

/// Integration id of the GitHub Actions app, attached to checks reported by
/// our own workflows.
pub const ACTIONS_INTEGRATION_ID: u64 = 15368;

/// One os/arch/runner tuple of the release build matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatrixEntry {
    pub os: &'static str,
    pub arch: &'static str,
    pub runner: &'static str,
}

const MULTI_TARGET_MATRIX: &[MatrixEntry] = &[
    MatrixEntry { os: "linux", arch: "amd64", runner: "ubuntu-latest" },
    MatrixEntry { os: "linux", arch: "arm64", runner: "ubuntu-24.04-arm" },
    MatrixEntry { os: "darwin", arch: "arm64", runner: "macos-latest" },
];

const SINGLE_TARGET_MATRIX: &[MatrixEntry] =
    &[MatrixEntry { os: "linux", arch: "amd64", runner: "ubuntu-latest" }];

/// Fixed build-matrix table; compiled languages ship multi-target binaries.
pub fn build_matrix(language: Language) -> &'static [MatrixEntry] {
    if language.is_compiled() { MULTI_TARGET_MATRIX } else { SINGLE_TARGET_MATRIX }
}

/// A status check required by the branch-protection ruleset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequiredCheck {
    pub context: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integration_id: Option<u64>,
}

impl RequiredCheck {
    fn external(context: &str) -> Self {
        Self { context: context.to_string(), integration_id: None }
    }

    fn actions(context: String) -> Self {
        Self { context, integration_id: Some(ACTIONS_INTEGRATION_ID) }
    }
}

/// Whether code scanning applies to the repository.
pub fn code_scanning(decl: &RepositoryDeclaration) -> bool {
    decl.language != Language::Shell
}

/// Derive the required-status-check list from the feature flags.
///
/// Test checks appear once per declared version, in declaration order.
pub fn required_checks(decl: &RepositoryDeclaration) -> Vec<RequiredCheck> {
    let mut checks = vec![
        RequiredCheck::external("DCO"),
        RequiredCheck::external("GitGuardian"),
        RequiredCheck::actions("Validate PR title".to_string()),
    ];
    if decl.workflow.lint {
        checks.push(RequiredCheck::actions("Lint".to_string()));
    }
    if decl.workflow.test {
        for version in &decl.workflow.versions {
            checks.push(RequiredCheck::actions(format!("Test ({version})")));
        }
    }
    if code_scanning(decl) {
        checks.push(RequiredCheck::actions("CodeQL".to_string()));
    }
    checks
}

/// Destination paths of the workflow files derived from the flags.
///
/// `pr_mode` is true when a distinct automation branch receives file writes;
/// only then is the sync-PR workflow shipped.
pub fn workflow_files(decl: &RepositoryDeclaration, pr_mode: bool) -> Vec<&'static str> {
    let mut files = vec![
        ".github/workflows/lint-pr.yml",
        ".github/workflows/scorecard.yml",
        ".github/workflows/dependency-review.yml",
    ];
    if pr_mode {
        files.push(".github/workflows/automation-sync-pr.yml");
    }
    if decl.workflow.lint {
        files.push(".github/workflows/lint.yml");
    }
    if decl.workflow.test {
        files.push(".github/workflows/test.yml");
    }
    if decl.workflow.package || decl.changelog {
        files.push(".github/workflows/release.yml");
    }
    if code_scanning(decl) {
        files.push(".github/workflows/codeql.yml");
    }
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::WorkflowFlags;

    fn declaration(language: Language) -> RepositoryDeclaration {
        serde_yaml::from_str(&format!(
            r#"
name: widget
title: Widget
description: A widget.
language: {}
"#,
            language.as_str()
        ))
        .unwrap()
    }

    #[test]
    fn compiled_languages_get_multi_target_matrix() {
        assert_eq!(build_matrix(Language::Go).len(), 3);
        assert_eq!(build_matrix(Language::Rust).len(), 3);
        assert_eq!(build_matrix(Language::Python).len(), 1);
        assert_eq!(build_matrix(Language::Shell), SINGLE_TARGET_MATRIX);
    }

    #[test]
    fn checks_include_lint_and_one_test_per_version_in_order() {
        let mut decl = declaration(Language::Go);
        decl.workflow = WorkflowFlags {
            lint: true,
            test: true,
            versions: vec!["1.21".to_string(), "1.22".to_string()],
            ..WorkflowFlags::default()
        };

        let checks = required_checks(&decl);
        let contexts: Vec<&str> = checks.iter().map(|c| c.context.as_str()).collect();

        assert!(contexts.contains(&"Lint"));
        let tests: Vec<&&str> =
            contexts.iter().filter(|c| c.starts_with("Test (")).collect();
        assert_eq!(tests, vec![&"Test (1.21)", &"Test (1.22)"]);
    }

    #[test]
    fn baseline_checks_always_present() {
        let decl = declaration(Language::Shell);
        let checks = required_checks(&decl);
        assert_eq!(checks[0].context, "DCO");
        assert_eq!(checks[0].integration_id, None);
        // External scanning checks carry no integration id.
        assert_eq!(checks[1].context, "GitGuardian");
        assert_eq!(checks[1].integration_id, None);
        assert_eq!(checks[2].context, "Validate PR title");
        assert_eq!(checks[2].integration_id, Some(ACTIONS_INTEGRATION_ID));
        // Shell repositories carry no CodeQL check.
        assert!(!checks.iter().any(|c| c.context == "CodeQL"));
    }

    #[test]
    fn workflow_file_set_is_flag_gated() {
        let mut decl = declaration(Language::Rust);
        let base = workflow_files(&decl, false);
        assert!(base.contains(&".github/workflows/lint-pr.yml"));
        assert!(base.contains(&".github/workflows/codeql.yml"));
        assert!(!base.contains(&".github/workflows/release.yml"));
        assert!(!base.contains(&".github/workflows/automation-sync-pr.yml"));

        decl.changelog = true;
        decl.workflow.lint = true;
        let full = workflow_files(&decl, true);
        assert!(full.contains(&".github/workflows/release.yml"));
        assert!(full.contains(&".github/workflows/lint.yml"));
        assert!(full.contains(&".github/workflows/automation-sync-pr.yml"));
    }

    #[test]
    fn derivation_is_deterministic() {
        let mut decl = declaration(Language::Go);
        decl.workflow.lint = true;
        assert_eq!(required_checks(&decl), required_checks(&decl));
        assert_eq!(workflow_files(&decl, true), workflow_files(&decl, true));
    }
}
