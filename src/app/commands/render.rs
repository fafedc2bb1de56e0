//! `render` command: render one generated file to stdout.

use crate::app::sync::Synchronizer;
use crate::domain::{AppError, Settings};
use crate::services::{MemoryProvider, Renderer};

/// Render the content of one destination path for a declared repository.
///
/// Runs entirely offline: the README renders from the full default
/// template instead of reading remote state.
pub fn render_path(
    settings: &Settings,
    renderer: &Renderer,
    repo: &str,
    path: &str,
) -> Result<String, AppError> {
    let decl = settings.declaration(repo)?;
    let provider = MemoryProvider::new();
    let sync = Synchronizer::new(&provider, renderer, settings, decl, false);
    sync.render_path(path)
}

pub fn execute(
    settings: &Settings,
    renderer: &Renderer,
    repo: &str,
    path: &str,
) -> Result<(), AppError> {
    print!("{}", render_path(settings, renderer, repo, path)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        serde_yaml::from_str(
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
    readme: true
"#,
        )
        .unwrap()
    }

    #[test]
    fn renders_readme_offline() {
        let renderer = Renderer::new().unwrap();
        let content = render_path(&settings(), &renderer, "widget", "README.md").unwrap();
        assert!(content.contains("Widget"));
        assert!(content.contains("<!-- begin:header -->"));
    }

    #[test]
    fn unknown_repository_is_an_error() {
        let renderer = Renderer::new().unwrap();
        assert!(matches!(
            render_path(&settings(), &renderer, "missing", "README.md"),
            Err(AppError::RepositoryNotDeclared(_))
        ));
    }
}
