//! Repository synchronizer: one sync pass per repository declaration.
//!
//! The synchronizer executes the declaration's `SyncPlan` step by step.
//! Every file write of a pass targets the same working branch, and a step
//! failure aborts the remaining sequence for that repository.

use minijinja::context;

use crate::domain::plan::{SyncPlan, SyncStep};
use crate::domain::{
    AppError, RepositoryDeclaration, Settings, merge_catalogs, required_checks, rewrite_sections,
    workflow_files,
};
use crate::ports::{FileWrite, GitHubProvider, RepositorySettings, Ruleset, SyncOutcome};
use crate::services::{Renderer, assets};

const RULESET_NAME: &str = "automation-sync";
const README_PATH: &str = "README.md";
const DEFAULT_RENOVATE_SCHEDULE: &str = "before 6am on monday";

/// Outcome summary of one sync pass.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub written: usize,
    pub unchanged: usize,
}

pub struct Synchronizer<'a, P: GitHubProvider> {
    provider: &'a P,
    renderer: &'a Renderer,
    settings: &'a Settings,
    decl: &'a RepositoryDeclaration,
    dry_run: bool,
}

impl<'a, P: GitHubProvider> Synchronizer<'a, P> {
    pub fn new(
        provider: &'a P,
        renderer: &'a Renderer,
        settings: &'a Settings,
        decl: &'a RepositoryDeclaration,
        dry_run: bool,
    ) -> Self {
        Self { provider, renderer, settings, decl, dry_run }
    }

    /// Execute the ordered plan for this declaration.
    pub fn run(&self) -> Result<SyncReport, AppError> {
        let plan = SyncPlan::for_declaration(self.settings, self.decl);
        let mut report = SyncReport::default();

        for step in plan.steps() {
            self.execute(*step, &mut report)?;
        }
        Ok(report)
    }

    fn execute(&self, step: SyncStep, report: &mut SyncReport) -> Result<(), AppError> {
        match step {
            SyncStep::EnsureRepository => {
                if self.dry_run {
                    println!("  would ensure repository {}", self.decl.name);
                    return Ok(());
                }
                self.provider.ensure_repository(&self.repository_settings())
            }
            SyncStep::EnsureDefaultBranch => {
                self.branch_op(&self.settings.default_branch, |branch| {
                    self.provider.ensure_branch(&self.decl.name, branch)
                })
            }
            SyncStep::SetDefaultBranch => {
                self.branch_op(&self.settings.default_branch, |branch| {
                    self.provider.set_default_branch(&self.decl.name, branch)
                })
            }
            SyncStep::EnsureWorkingBranch => {
                self.branch_op(self.settings.working_branch(), |branch| {
                    self.provider.ensure_branch(&self.decl.name, branch)
                })
            }
            SyncStep::Labels => self.sync_labels(),
            SyncStep::Ruleset => self.sync_ruleset(),
            SyncStep::Apps => self.sync_apps(),
            SyncStep::Readme => {
                let content = self.readme_content()?;
                self.submit(step, README_PATH, content, report)
            }
            file_step => {
                for (path, content) in self.file_contents(file_step)? {
                    self.submit(file_step, &path, content, report)?;
                }
                Ok(())
            }
        }
    }

    fn branch_op(
        &self,
        branch: &str,
        op: impl FnOnce(&str) -> Result<(), AppError>,
    ) -> Result<(), AppError> {
        if self.dry_run {
            println!("  would ensure branch {branch}");
            return Ok(());
        }
        op(branch)
    }

    fn repository_settings(&self) -> RepositorySettings {
        RepositorySettings {
            name: self.decl.name.clone(),
            description: self.decl.description.clone(),
            homepage: self.decl.homepage.clone(),
            topics: self.decl.topics.clone(),
            pages: self.decl.pages.clone(),
        }
    }

    fn submit(
        &self,
        step: SyncStep,
        path: &str,
        content: String,
        report: &mut SyncReport,
    ) -> Result<(), AppError> {
        if self.dry_run {
            println!("  would write {path} ({} bytes)", content.len());
            return Ok(());
        }

        let write = FileWrite {
            path: path.to_string(),
            content,
            message: self.commit_message(step.label()),
            author: self.settings.author.clone(),
            branch: self.settings.working_branch().to_string(),
        };
        match self.provider.upsert_file(&self.decl.name, &write)? {
            SyncOutcome::Unchanged => report.unchanged += 1,
            SyncOutcome::Created | SyncOutcome::Updated => report.written += 1,
        }
        Ok(())
    }

    fn commit_message(&self, kind: &str) -> String {
        format!(
            "chore(repokit): auto-applied {kind}\n\n\
             this file was auto-applied from the repokit catalog\n\
             located here:\n    - https://github.com/{}/{}\n\n\
             Signed-off-by: {} <{}>",
            self.settings.owner, self.decl.name, self.settings.author.name, self.settings.author.email
        )
    }

    /// Destination (path, content) pairs for a file step.
    ///
    /// Also backs the `render` command, so this covers every file step
    /// except the README (which needs the remote read).
    pub fn file_contents(&self, step: SyncStep) -> Result<Vec<(String, String)>, AppError> {
        let pairs = match step {
            SyncStep::License => {
                let id = self.decl.license.as_deref().ok_or_else(|| {
                    AppError::config_error(format!("repository '{}' has no license", self.decl.name))
                })?;
                assets::license_files(id)?
                    .into_iter()
                    .map(|(name, content)| (name, content.to_string()))
                    .collect()
            }
            SyncStep::Funding => {
                let content = self.renderer.render(
                    "misc/FUNDING.yml.j2",
                    context! { fundings => self.settings.fundings },
                )?;
                vec![(".github/FUNDING.yml".to_string(), content)]
            }
            SyncStep::Contributing => {
                vec![(
                    ".github/CONTRIBUTING.md".to_string(),
                    assets::asset_text("misc/CONTRIBUTING.md")?.to_string(),
                )]
            }
            SyncStep::PullRequestTemplate => {
                vec![(
                    ".github/pull_request_template.md".to_string(),
                    assets::asset_text("misc/pull_request_template.md")?.to_string(),
                )]
            }
            SyncStep::IssueTemplates => assets::issue_templates()?
                .into_iter()
                .map(|(name, content)| {
                    (format!(".github/ISSUE_TEMPLATE/{name}"), content.to_string())
                })
                .collect(),
            SyncStep::CodeOfConduct => {
                let content = self.renderer.render(
                    "misc/CODE_OF_CONDUCT.md.j2",
                    context! { contact_email => self.settings.contact_email },
                )?;
                vec![(".github/CODE_OF_CONDUCT.md".to_string(), content)]
            }
            SyncStep::Codeowners => {
                let content = self
                    .renderer
                    .render("misc/CODEOWNERS.j2", context! { owner => self.settings.owner })?;
                vec![(".github/CODEOWNERS".to_string(), content)]
            }
            SyncStep::EditorConfig => {
                let content = self.renderer.render(
                    "misc/editorconfig.j2",
                    context! { language => self.decl.language.as_str() },
                )?;
                vec![(".editorconfig".to_string(), content)]
            }
            SyncStep::GitAttributes => {
                let content = self.renderer.render(
                    "misc/gitattributes.j2",
                    context! { language => self.decl.language.as_str() },
                )?;
                vec![(".gitattributes".to_string(), content)]
            }
            SyncStep::GitIgnore => {
                let content = self.renderer.render(
                    "misc/gitignore.j2",
                    context! {
                        language => self.decl.language.as_str(),
                        helm => self.decl.helm,
                        devcontainer => self.decl.devcontainer,
                    },
                )?;
                vec![(".gitignore".to_string(), content)]
            }
            SyncStep::Security => {
                let content = self.renderer.render(
                    "misc/SECURITY.md.j2",
                    context! { security_email => self.settings.security_email },
                )?;
                vec![(".github/SECURITY.md".to_string(), content)]
            }
            SyncStep::Renovate => self.renovate_contents()?,
            SyncStep::Logo => {
                let name = self.decl.logo.as_deref().ok_or_else(|| {
                    AppError::config_error(format!("repository '{}' has no logo", self.decl.name))
                })?;
                vec![("docs/assets/logo.svg".to_string(), assets::logo(name)?.to_string())]
            }
            SyncStep::Workflows => self.workflow_contents()?,
            other => {
                return Err(AppError::config_error(format!(
                    "step '{other}' does not produce file content"
                )));
            }
        };
        Ok(pairs)
    }

    fn renovate_contents(&self) -> Result<Vec<(String, String)>, AppError> {
        let presets = assets::renovate_presets()?;
        let preset_names: Vec<String> = presets
            .iter()
            .map(|(name, _)| name.trim_end_matches(".json5").to_string())
            .collect();
        let schedule = self
            .settings
            .renovate_schedule
            .as_deref()
            .unwrap_or(DEFAULT_RENOVATE_SCHEDULE);

        let mut files = vec![(
            ".github/renovate.json5".to_string(),
            self.renderer.render(
                "renovate/renovate.json5.j2",
                context! {
                    owner => self.settings.owner,
                    schedule => schedule,
                    configs => preset_names,
                },
            )?,
        )];
        for (name, content) in presets {
            files.push((format!(".github/renovate/{name}"), content.to_string()));
        }
        Ok(files)
    }

    fn workflow_contents(&self) -> Result<Vec<(String, String)>, AppError> {
        let pr_mode = self.settings.is_pr_mode();
        let ctx = self.workflow_context();

        let mut files = Vec::new();
        for path in workflow_files(self.decl, pr_mode) {
            let template = match path {
                ".github/workflows/lint-pr.yml" => "workflow/lint-pr.yml.j2",
                ".github/workflows/scorecard.yml" => "workflow/scorecard.yml.j2",
                ".github/workflows/dependency-review.yml" => "workflow/dependency-review.yml.j2",
                ".github/workflows/automation-sync-pr.yml" => "workflow/automation-sync-pr.yml.j2",
                ".github/workflows/lint.yml" => "workflow/lint.yml.j2",
                ".github/workflows/test.yml" => "workflow/test.yml.j2",
                ".github/workflows/release.yml" => "workflow/release.yml.j2",
                ".github/workflows/codeql.yml" => "workflow/codeql.yml.j2",
                other => {
                    return Err(AppError::config_error(format!(
                        "no template mapped for workflow path '{other}'"
                    )));
                }
            };
            files.push((path.to_string(), self.renderer.render(template, ctx.clone())?));
        }

        if self.decl.changelog {
            files.push((
                ".github/cliff.toml".to_string(),
                assets::asset_text("git-cliff/cliff.toml")?.to_string(),
            ));
        }
        Ok(files)
    }

    fn workflow_context(&self) -> minijinja::Value {
        context! {
            repository_name => format!("{}/{}", self.settings.owner, self.decl.name),
            default_branch => self.settings.default_branch,
            branch => self.settings.working_branch(),
            language => self.decl.language.as_str(),
            versions => self.decl.workflow.versions,
            lint => self.decl.workflow.lint,
            test => self.decl.workflow.test,
            package => self.decl.package,
            documentation => self.decl.workflow.documentation,
            changelog => self.decl.changelog,
            docker => self.decl.docker,
            matrix => crate::domain::build_matrix(self.decl.language),
        }
    }

    fn readme_context(&self) -> minijinja::Value {
        context! {
            repository_name => format!("{}/{}", self.settings.owner, self.decl.name),
            repository_title => self.decl.title,
            repository_description => self.decl.description,
            documentation_url => self.decl.homepage,
            logo => self.decl.has_logo(),
            language => self.decl.language.as_str(),
            lint => self.decl.workflow.lint,
            test => self.decl.workflow.test,
            versions => self.decl.workflow.versions,
            changelog => self.decl.changelog,
            docker => self.decl.docker,
            helm => self.decl.helm,
            package => self.decl.package,
            library => self.decl.library,
        }
    }

    /// Regenerate the README.
    ///
    /// An existing remote README has its marked sections rewritten into
    /// include directives before rendering, so scaffolding sections come
    /// back from the template library while unmarked content survives.
    /// A fresh repository (or a dry run, which skips the remote read) gets
    /// the full default template.
    fn readme_content(&self) -> Result<String, AppError> {
        let existing = if self.dry_run {
            None
        } else {
            self.provider.read_file(
                &self.decl.name,
                self.settings.working_branch(),
                README_PATH,
            )?
        };

        let ctx = self.readme_context();
        match existing {
            Some(remote) => self.renderer.render_str(&rewrite_sections(&remote), ctx),
            None => self.renderer.render("readme/readme.md.j2", ctx),
        }
    }

    fn sync_labels(&self) -> Result<(), AppError> {
        let mut catalogs = Vec::new();
        for name in &self.decl.labels {
            catalogs.push(assets::label_catalog(name)?);
        }
        let merged = merge_catalogs(&catalogs);
        if self.dry_run {
            println!("  would replace labels ({} definitions)", merged.len());
            return Ok(());
        }
        self.provider.replace_labels(&self.decl.name, &merged)
    }

    fn sync_ruleset(&self) -> Result<(), AppError> {
        let ruleset = Ruleset::baseline(RULESET_NAME, required_checks(self.decl));
        if self.dry_run {
            println!(
                "  would apply ruleset '{RULESET_NAME}' ({} required checks)",
                ruleset.required_checks.len()
            );
            return Ok(());
        }
        self.provider.apply_ruleset(&self.decl.name, &ruleset)
    }

    fn sync_apps(&self) -> Result<(), AppError> {
        for installation_id in &self.decl.apps {
            if self.dry_run {
                println!("  would install app {installation_id}");
                continue;
            }
            self.provider.install_app(&self.decl.name, *installation_id)?;
        }
        Ok(())
    }

    /// Render the content of one destination path without writing it.
    ///
    /// Debugging aid behind the `render` command; the README renders fresh
    /// (no remote read).
    pub fn render_path(&self, path: &str) -> Result<String, AppError> {
        if path == README_PATH && self.decl.readme {
            return self.renderer.render("readme/readme.md.j2", self.readme_context());
        }

        let candidates = [
            SyncStep::License,
            SyncStep::Funding,
            SyncStep::Contributing,
            SyncStep::PullRequestTemplate,
            SyncStep::IssueTemplates,
            SyncStep::CodeOfConduct,
            SyncStep::Codeowners,
            SyncStep::EditorConfig,
            SyncStep::GitAttributes,
            SyncStep::GitIgnore,
            SyncStep::Security,
            SyncStep::Renovate,
            SyncStep::Logo,
            SyncStep::Workflows,
        ];
        for step in candidates {
            if !self.step_applies(step) {
                continue;
            }
            if let Some((_, content)) =
                self.file_contents(step)?.into_iter().find(|(dest, _)| dest == path)
            {
                return Ok(content);
            }
        }
        Err(AppError::config_error(format!(
            "path '{path}' is not generated for repository '{}'",
            self.decl.name
        )))
    }

    fn step_applies(&self, step: SyncStep) -> bool {
        match step {
            SyncStep::License => self.decl.license.is_some(),
            SyncStep::Funding => !self.settings.fundings.is_empty(),
            SyncStep::CodeOfConduct => self.settings.contact_email.is_some(),
            SyncStep::GitIgnore => self.decl.gitignore,
            SyncStep::Security => self.settings.security_email.is_some(),
            SyncStep::Renovate => self.decl.renovate,
            SyncStep::Logo => self.decl.has_logo(),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MemoryProvider;

    fn settings(yaml_extra: &str) -> Settings {
        serde_yaml::from_str(&format!(
            r#"
owner: acme
author:
  name: Release Bot
  email: bot@acme.dev
contact_email: hello@acme.dev
security_email: security@acme.dev
fundings:
  github: [acme]
branch: automation
repositories:
  - name: widget
    title: Widget
    description: A widget service.
    language: go
    license: mit
    gitignore: true
    readme: true
    renovate: true
    changelog: true
    labels: [default, go]
    apps: [42]
    workflow:
      lint: true
      test: true
      versions: ["1.21", "1.22"]
{yaml_extra}
"#
        ))
        .unwrap()
    }

    fn run_pass(provider: &MemoryProvider, settings: &Settings) -> SyncReport {
        let renderer = Renderer::new().unwrap();
        let sync = Synchronizer::new(provider, &renderer, settings, &settings.repositories[0], false);
        sync.run().unwrap()
    }

    #[test]
    fn full_pass_writes_expected_paths() {
        let provider = MemoryProvider::new();
        let settings = settings("");
        run_pass(&provider, &settings);

        let paths = provider.file_paths("widget", "automation");
        for expected in [
            "LICENSE",
            ".github/FUNDING.yml",
            ".github/CONTRIBUTING.md",
            ".github/pull_request_template.md",
            ".github/CODE_OF_CONDUCT.md",
            ".github/CODEOWNERS",
            ".editorconfig",
            ".gitattributes",
            ".gitignore",
            ".github/SECURITY.md",
            ".github/renovate.json5",
            "README.md",
            ".github/cliff.toml",
            ".github/workflows/lint.yml",
            ".github/workflows/test.yml",
            ".github/workflows/release.yml",
            ".github/workflows/lint-pr.yml",
            ".github/workflows/codeql.yml",
            ".github/workflows/automation-sync-pr.yml",
        ] {
            assert!(paths.iter().any(|p| p == expected), "missing {expected}: {paths:?}");
        }

        // Provider-level resources.
        assert!(provider.has_branch("widget", "automation"));
        let ruleset = provider.ruleset("widget").unwrap();
        assert!(ruleset.required_checks.iter().any(|c| c.context == "Test (1.22)"));
        assert_eq!(provider.app_installs(), vec![("widget".to_string(), 42)]);
        assert!(!provider.labels("widget").is_empty());
    }

    #[test]
    fn every_file_write_targets_the_working_branch() {
        let provider = MemoryProvider::new();
        let settings = settings("");
        run_pass(&provider, &settings);

        assert!(provider.file_paths("widget", "main").is_empty());
        assert!(!provider.file_paths("widget", "automation").is_empty());
    }

    #[test]
    fn branch_creation_precedes_file_writes() {
        let provider = MemoryProvider::new();
        let settings = settings("");
        run_pass(&provider, &settings);

        let calls = provider.calls();
        let branch = calls.iter().position(|c| c == "branch:automation").unwrap();
        let first_file = calls.iter().position(|c| c.starts_with("file:")).unwrap();
        assert!(branch < first_file);
        assert_eq!(calls[0], "repository:widget");
    }

    #[test]
    fn second_pass_is_a_noop() {
        let provider = MemoryProvider::new();
        let settings = settings("");
        let first = run_pass(&provider, &settings);
        assert_eq!(first.unchanged, 0);
        assert!(first.written > 0);

        let second = run_pass(&provider, &settings);
        assert_eq!(second.written, 0);
        assert_eq!(second.unchanged, first.written);
    }

    #[test]
    fn existing_readme_sections_are_regenerated_and_freeform_text_survives() {
        let provider = MemoryProvider::new();
        let settings = settings("");
        provider.seed_file(
            "widget",
            "automation",
            "README.md",
            "<!-- begin:header -->\nstale scaffolding\n<!-- end:header -->\n\n## My hand-written notes\n\nKeep these.\n",
        );
        run_pass(&provider, &settings);

        let readme = provider.file("widget", "automation", "README.md").unwrap();
        assert!(readme.contains("My hand-written notes"));
        assert!(readme.contains("Keep these."));
        assert!(!readme.contains("stale scaffolding"));
        // Regenerated section carries its markers for the next pass.
        assert!(readme.contains("<!-- begin:header -->"));
        assert!(readme.contains("Widget"));
    }

    #[test]
    fn fresh_repository_gets_full_default_readme() {
        let provider = MemoryProvider::new();
        let settings = settings("");
        run_pass(&provider, &settings);

        let readme = provider.file("widget", "automation", "README.md").unwrap();
        assert!(readme.contains("<!-- begin:header -->"));
        assert!(readme.contains("Widget"));
        assert!(readme.contains("A widget service."));
    }

    #[test]
    fn unknown_section_name_fails_the_readme_step() {
        let provider = MemoryProvider::new();
        let settings = settings("");
        provider.seed_file(
            "widget",
            "automation",
            "README.md",
            "<!-- begin:no-such-partial -->x<!-- end:no-such-partial -->",
        );

        let renderer = Renderer::new().unwrap();
        let sync =
            Synchronizer::new(&provider, &renderer, &settings, &settings.repositories[0], false);
        assert!(matches!(sync.run(), Err(AppError::TemplateRender { .. })));
    }

    #[test]
    fn render_path_produces_codeowners() {
        let provider = MemoryProvider::new();
        let settings = settings("");
        let renderer = Renderer::new().unwrap();
        let sync =
            Synchronizer::new(&provider, &renderer, &settings, &settings.repositories[0], false);

        let content = sync.render_path(".github/CODEOWNERS").unwrap();
        assert!(content.contains("@acme"));
        assert!(sync.render_path("nonexistent.txt").is_err());
    }

    #[test]
    fn declared_pages_reach_the_provider() {
        let provider = MemoryProvider::new();
        let settings = settings(
            "    pages:\n      branch: gh-pages\n      cname: widget.acme.dev\n",
        );
        run_pass(&provider, &settings);

        let pages = provider.pages("widget").unwrap();
        assert_eq!(pages.branch, "gh-pages");
        assert_eq!(pages.path, "/");
        assert_eq!(pages.cname.as_deref(), Some("widget.acme.dev"));
    }

    #[test]
    fn render_path_refuses_readme_when_not_declared() {
        let provider = MemoryProvider::new();
        let mut settings = settings("");
        settings.repositories[0].readme = false;
        let renderer = Renderer::new().unwrap();
        let sync =
            Synchronizer::new(&provider, &renderer, &settings, &settings.repositories[0], false);

        assert!(matches!(sync.render_path("README.md"), Err(AppError::Configuration(_))));
    }

    #[test]
    fn dry_run_writes_nothing() {
        let provider = MemoryProvider::new();
        let settings = settings("");
        let renderer = Renderer::new().unwrap();
        let sync =
            Synchronizer::new(&provider, &renderer, &settings, &settings.repositories[0], true);
        sync.run().unwrap();

        assert!(provider.file_paths("widget", "automation").is_empty());
        assert!(provider.calls().is_empty());
    }
}
