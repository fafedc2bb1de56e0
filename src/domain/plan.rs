//! Ordered operation plan for one repository sync pass.
//!
//! Ordering constraints are an explicit DAG over the step list: repository
//! before branches, branches before the dependent file, label, ruleset,
//! and app steps. The graph is flattened with a stable topological sort so
//! the emitted order is deterministic and file operations keep the fixed
//! catalog order.

use std::fmt;

use crate::domain::config::{RepositoryDeclaration, Settings};

/// One operation of a sync pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStep {
    EnsureRepository,
    EnsureDefaultBranch,
    SetDefaultBranch,
    EnsureWorkingBranch,
    License,
    Funding,
    Contributing,
    PullRequestTemplate,
    IssueTemplates,
    CodeOfConduct,
    Codeowners,
    EditorConfig,
    GitAttributes,
    GitIgnore,
    Security,
    Labels,
    Renovate,
    Logo,
    Readme,
    Workflows,
    Ruleset,
    Apps,
}

impl SyncStep {
    /// True for steps that write files to the working branch.
    pub fn is_file_step(&self) -> bool {
        use SyncStep::*;
        matches!(
            self,
            License
                | Funding
                | Contributing
                | PullRequestTemplate
                | IssueTemplates
                | CodeOfConduct
                | Codeowners
                | EditorConfig
                | GitAttributes
                | GitIgnore
                | Security
                | Renovate
                | Logo
                | Readme
                | Workflows
        )
    }

    pub fn label(&self) -> &'static str {
        use SyncStep::*;
        match self {
            EnsureRepository => "repository",
            EnsureDefaultBranch => "default branch",
            SetDefaultBranch => "default branch selection",
            EnsureWorkingBranch => "working branch",
            License => "license",
            Funding => "funding",
            Contributing => "contributing guide",
            PullRequestTemplate => "pull request template",
            IssueTemplates => "issue templates",
            CodeOfConduct => "code of conduct",
            Codeowners => "codeowners",
            EditorConfig => "editorconfig",
            GitAttributes => "gitattributes",
            GitIgnore => "gitignore",
            Security => "security policy",
            Labels => "labels",
            Renovate => "renovate",
            Logo => "logo",
            Readme => "readme",
            Workflows => "workflows",
            Ruleset => "branch ruleset",
            Apps => "app installations",
        }
    }
}

impl fmt::Display for SyncStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The ordered step list for one declaration.
#[derive(Debug, Clone)]
pub struct SyncPlan {
    steps: Vec<SyncStep>,
}

impl SyncPlan {
    /// Build the plan for a declaration: collect the applicable steps with
    /// their dependency edges and flatten them in topological order.
    pub fn for_declaration(settings: &Settings, decl: &RepositoryDeclaration) -> Self {
        use SyncStep::*;

        let branch_steps: &[SyncStep] = if settings.is_pr_mode() {
            &[EnsureDefaultBranch, SetDefaultBranch, EnsureWorkingBranch]
        } else {
            &[EnsureDefaultBranch, SetDefaultBranch]
        };
        // File writes wait on whichever branch receives them.
        let write_target =
            if settings.is_pr_mode() { EnsureWorkingBranch } else { EnsureDefaultBranch };

        let mut nodes: Vec<(SyncStep, Vec<SyncStep>)> = Vec::new();
        nodes.push((EnsureRepository, vec![]));
        for step in branch_steps {
            let dep = match step {
                SetDefaultBranch => EnsureDefaultBranch,
                _ => EnsureRepository,
            };
            nodes.push((*step, vec![dep]));
        }

        let file_step = |enabled: bool, step: SyncStep, nodes: &mut Vec<(SyncStep, Vec<SyncStep>)>| {
            if enabled {
                nodes.push((step, vec![write_target]));
            }
        };

        // Fixed catalog order of the file operations.
        file_step(decl.license.is_some(), License, &mut nodes);
        file_step(!settings.fundings.is_empty(), Funding, &mut nodes);
        file_step(true, Contributing, &mut nodes);
        file_step(true, PullRequestTemplate, &mut nodes);
        file_step(true, IssueTemplates, &mut nodes);
        file_step(settings.contact_email.is_some(), CodeOfConduct, &mut nodes);
        file_step(true, Codeowners, &mut nodes);
        file_step(true, EditorConfig, &mut nodes);
        file_step(true, GitAttributes, &mut nodes);
        file_step(decl.gitignore, GitIgnore, &mut nodes);
        file_step(settings.security_email.is_some(), Security, &mut nodes);
        if !decl.labels.is_empty() {
            nodes.push((Labels, vec![EnsureRepository]));
        }
        file_step(decl.renovate, Renovate, &mut nodes);
        file_step(decl.has_logo(), Logo, &mut nodes);
        file_step(decl.readme, Readme, &mut nodes);
        file_step(true, Workflows, &mut nodes);
        // The ruleset targets the default branch ref pattern.
        nodes.push((Ruleset, vec![SetDefaultBranch]));
        if !decl.apps.is_empty() {
            nodes.push((Apps, vec![EnsureRepository]));
        }

        Self { steps: toposort(nodes) }
    }

    pub fn steps(&self) -> &[SyncStep] {
        &self.steps
    }
}

/// Stable Kahn's algorithm: among ready nodes, insertion order wins.
fn toposort(nodes: Vec<(SyncStep, Vec<SyncStep>)>) -> Vec<SyncStep> {
    let mut ordered = Vec::with_capacity(nodes.len());
    let mut remaining = nodes;

    while !remaining.is_empty() {
        let ready = remaining
            .iter()
            .position(|(_, deps)| deps.iter().all(|dep| ordered.contains(dep)));
        match ready {
            Some(index) => {
                let (step, _) = remaining.remove(index);
                ordered.push(step);
            }
            // A dependency edge pointing at an absent step cannot happen
            // with the fixed step inventory above.
            None => unreachable!("sync plan contains an unsatisfiable dependency"),
        }
    }

    ordered
}
