//! Declarative configuration: global settings plus one declaration per
//! managed repository.
//!
//! The declaration file is YAML. Validation is fail-fast: a missing author
//! identity or owner aborts the run before any provider call is issued.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::AppError;

/// Commit author identity applied to every synced file write.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Author {
    pub name: String,
    pub email: String,
}

/// GitHub Pages configuration for a repository.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Pages {
    pub branch: String,
    #[serde(default = "default_pages_path")]
    pub path: String,
    #[serde(default)]
    pub cname: Option<String>,
}

fn default_pages_path() -> String {
    "/".to_string()
}

/// Primary language of a repository; selects label catalogs, gitignore
/// content, and the CI build matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Go,
    Rust,
    Python,
    Shell,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Go => "go",
            Language::Rust => "rust",
            Language::Python => "python",
            Language::Shell => "shell",
        }
    }

    /// Compiled languages publish multi-target release binaries.
    pub fn is_compiled(&self) -> bool {
        matches!(self, Language::Go | Language::Rust)
    }
}

impl std::str::FromStr for Language {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "go" => Ok(Language::Go),
            "rust" => Ok(Language::Rust),
            "python" => Ok(Language::Python),
            "shell" => Ok(Language::Shell),
            other => Err(AppError::InvalidLanguage(other.to_string())),
        }
    }
}

/// Workflow feature flags for one repository.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WorkflowFlags {
    #[serde(default)]
    pub lint: bool,
    #[serde(default)]
    pub test: bool,
    #[serde(default)]
    pub package: bool,
    #[serde(default)]
    pub documentation: bool,
    /// Toolchain versions tested in CI, in declaration order.
    #[serde(default)]
    pub versions: Vec<String>,
}

/// One managed repository. Immutable for the duration of a sync pass.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RepositoryDeclaration {
    pub name: String,
    pub title: String,
    pub description: String,
    pub language: Language,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub pages: Option<Pages>,
    /// License identifier matching an embedded license directory.
    #[serde(default)]
    pub license: Option<String>,
    /// Logo asset name under the embedded logo catalog.
    #[serde(default)]
    pub logo: Option<String>,
    /// Label catalog names, concatenated in order.
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub readme: bool,
    #[serde(default)]
    pub renovate: bool,
    #[serde(default)]
    pub changelog: bool,
    #[serde(default)]
    pub docker: bool,
    #[serde(default)]
    pub helm: bool,
    #[serde(default)]
    pub devcontainer: bool,
    #[serde(default)]
    pub gitignore: bool,
    #[serde(default)]
    pub library: bool,
    /// Package registry name when the repository publishes a package.
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub workflow: WorkflowFlags,
    /// GitHub App installation ids to attach to the repository.
    #[serde(default)]
    pub apps: Vec<u64>,
}

impl RepositoryDeclaration {
    pub fn has_logo(&self) -> bool {
        self.logo.is_some()
    }
}

/// Global settings plus the repository declaration list.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub owner: String,
    pub author: Author,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub security_email: Option<String>,
    /// Funding platform -> target(s), rendered into `.github/FUNDING.yml`.
    #[serde(default)]
    pub fundings: BTreeMap<String, serde_yaml::Value>,
    #[serde(default = "default_branch_name")]
    pub default_branch: String,
    /// Secondary automation branch. When set and distinct from the default
    /// branch, every file write of a pass targets it instead.
    #[serde(default)]
    pub branch: Option<String>,
    /// Renovate schedule expression shared by every repository.
    #[serde(default)]
    pub renovate_schedule: Option<String>,
    #[serde(default)]
    pub repositories: Vec<RepositoryDeclaration>,
}

fn default_branch_name() -> String {
    "main".to_string()
}

impl Settings {
    /// Load and validate the declaration file.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        if !path.exists() {
            return Err(AppError::ConfigFileNotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate required fields before any provider call is issued.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.owner.trim().is_empty() {
            return Err(AppError::config_error("'owner' must not be empty"));
        }
        if self.author.name.trim().is_empty() || self.author.email.trim().is_empty() {
            return Err(AppError::config_error(
                "'author.name' and 'author.email' are required",
            ));
        }
        if self.default_branch.trim().is_empty() {
            return Err(AppError::config_error("'default_branch' must not be empty"));
        }
        for repo in &self.repositories {
            if repo.name.trim().is_empty() {
                return Err(AppError::config_error("repository 'name' must not be empty"));
            }
            if repo.workflow.test && repo.workflow.versions.is_empty() {
                return Err(AppError::config_error(format!(
                    "repository '{}' enables tests but lists no versions",
                    repo.name
                )));
            }
        }
        Ok(())
    }

    /// The branch targeted by file writes for one sync pass.
    pub fn working_branch(&self) -> &str {
        match &self.branch {
            Some(branch) if branch != &self.default_branch => branch,
            _ => &self.default_branch,
        }
    }

    /// True when a distinct automation branch receives the file writes.
    pub fn is_pr_mode(&self) -> bool {
        self.working_branch() != self.default_branch
    }

    /// Look up a declaration by repository name.
    pub fn declaration(&self, name: &str) -> Result<&RepositoryDeclaration, AppError> {
        self.repositories
            .iter()
            .find(|repo| repo.name == name)
            .ok_or_else(|| AppError::RepositoryNotDeclared(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_yaml() -> &'static str {
        r#"
owner: acme
author:
  name: Release Bot
  email: bot@acme.dev
repositories:
  - name: widget
    title: Widget
    description: A widget service.
    language: go
"#
    }

    #[test]
    fn parses_minimal_settings() {
        let settings: Settings = serde_yaml::from_str(minimal_yaml()).unwrap();
        settings.validate().unwrap();
        assert_eq!(settings.default_branch, "main");
        assert_eq!(settings.working_branch(), "main");
        assert!(!settings.is_pr_mode());
        assert_eq!(settings.repositories[0].language, Language::Go);
        assert!(!settings.repositories[0].readme);
    }

    #[test]
    fn distinct_branch_enables_pr_mode() {
        let mut settings: Settings = serde_yaml::from_str(minimal_yaml()).unwrap();
        settings.branch = Some("automation".to_string());
        assert!(settings.is_pr_mode());
        assert_eq!(settings.working_branch(), "automation");

        // Same name as the default branch is not PR mode.
        settings.branch = Some("main".to_string());
        assert!(!settings.is_pr_mode());
    }

    #[test]
    fn missing_author_fails_validation() {
        let yaml = r#"
owner: acme
author:
  name: ""
  email: bot@acme.dev
"#;
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(settings.validate(), Err(AppError::Configuration(_))));
    }

    #[test]
    fn test_flag_without_versions_fails_validation() {
        let mut settings: Settings = serde_yaml::from_str(minimal_yaml()).unwrap();
        settings.repositories[0].workflow.test = true;
        assert!(matches!(settings.validate(), Err(AppError::Configuration(_))));
    }

    #[test]
    fn unknown_language_is_rejected() {
        let yaml = minimal_yaml().replace("language: go", "language: cobol");
        let parsed: Result<Settings, _> = serde_yaml::from_str(&yaml);
        assert!(parsed.is_err());
    }

    #[test]
    fn declaration_lookup() {
        let settings: Settings = serde_yaml::from_str(minimal_yaml()).unwrap();
        assert!(settings.declaration("widget").is_ok());
        assert!(matches!(
            settings.declaration("missing"),
            Err(AppError::RepositoryNotDeclared(_))
        ));
    }
}
