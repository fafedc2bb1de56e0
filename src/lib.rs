//! repokit: provision and standardize GitHub repositories from a declarative
//! catalog of templates and branch policies.

pub mod app;
pub mod domain;
pub mod ports;
pub mod services;

use std::path::Path;

use app::{AppContext, commands};
use services::{HttpGitHubProvider, MemoryProvider, Renderer};

pub use domain::AppError;

/// Synchronize every declared repository (or a single one).
///
/// A dry run renders everything and prints the planned writes without
/// touching the API, so no credential is required.
pub fn sync(config: &Path, repo: Option<&str>, dry_run: bool) -> Result<(), AppError> {
    let settings = domain::Settings::load(config)?;
    let renderer = Renderer::new()?;

    if dry_run {
        let ctx = AppContext::new(MemoryProvider::new(), renderer, settings);
        return commands::sync::execute(&ctx, repo, true);
    }

    let provider = HttpGitHubProvider::from_env(&settings.owner)?;
    let ctx = AppContext::new(provider, renderer, settings);
    commands::sync::execute(&ctx, repo, false)
}

/// Print the ordered operation plan per repository.
pub fn plan(config: &Path, repo: Option<&str>) -> Result<(), AppError> {
    let settings = domain::Settings::load(config)?;
    commands::plan::execute(&settings, repo)
}

/// Render one generated file to stdout.
pub fn render_file(config: &Path, repo: &str, path: &str) -> Result<(), AppError> {
    let settings = domain::Settings::load(config)?;
    let renderer = Renderer::new()?;
    commands::render::execute(&settings, &renderer, repo, path)
}
