//! Compiled-in template and asset catalog.
//!
//! Everything the synchronizer ships to a repository is embedded under
//! `src/assets/` at build time: license texts, label catalogs, issue
//! templates, community health files, renovate presets, logos, and the
//! minijinja templates (`*.j2`) for rendered content.

use include_dir::{Dir, DirEntry, include_dir};

use crate::domain::{AppError, Label};

static ASSETS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/assets");

/// Raw UTF-8 content of one embedded asset.
pub fn asset_text(path: &str) -> Result<&'static str, AppError> {
    ASSETS_DIR
        .get_file(path)
        .and_then(|file| file.contents_utf8())
        .ok_or_else(|| AppError::MissingAsset(path.to_string()))
}

/// Files of one embedded directory as (file name, content) pairs, sorted by
/// name for deterministic application order.
fn dir_files(path: &str) -> Result<Vec<(String, &'static str)>, AppError> {
    let dir = ASSETS_DIR.get_dir(path).ok_or_else(|| AppError::MissingAsset(path.to_string()))?;

    let mut files = Vec::new();
    for entry in dir.entries() {
        if let DirEntry::File(file) = entry {
            let name = file
                .path()
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .ok_or_else(|| AppError::MissingAsset(path.to_string()))?;
            let content = file
                .contents_utf8()
                .ok_or_else(|| AppError::MissingAsset(file.path().display().to_string()))?;
            files.push((name, content));
        }
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}

/// License files for a license identifier (e.g. `mit`, `apache-2.0`).
pub fn license_files(id: &str) -> Result<Vec<(String, &'static str)>, AppError> {
    dir_files(&format!("license/{id}"))
}

/// Parse one named label catalog.
pub fn label_catalog(name: &str) -> Result<Vec<Label>, AppError> {
    let content = asset_text(&format!("labels/{name}.yml"))?;
    Ok(serde_yaml::from_str(content)?)
}

/// Issue template files shipped to `.github/ISSUE_TEMPLATE/`.
pub fn issue_templates() -> Result<Vec<(String, &'static str)>, AppError> {
    dir_files("issue")
}

/// Renovate preset files shipped to `.github/renovate/`.
pub fn renovate_presets() -> Result<Vec<(String, &'static str)>, AppError> {
    dir_files("renovate/config")
}

/// Logo asset by name.
pub fn logo(name: &str) -> Result<&'static str, AppError> {
    asset_text(&format!("logo/{name}"))
}

/// Every embedded minijinja template as (relative path, source).
pub fn templates() -> Vec<(&'static str, &'static str)> {
    let mut found = Vec::new();
    collect_templates(&ASSETS_DIR, &mut found);
    found.sort_by(|a, b| a.0.cmp(b.0));
    found
}

fn collect_templates(dir: &'static Dir, found: &mut Vec<(&'static str, &'static str)>) {
    for entry in dir.entries() {
        match entry {
            DirEntry::File(file) => {
                let Some(path) = file.path().to_str() else { continue };
                if path.ends_with(".j2")
                    && let Some(source) = file.contents_utf8()
                {
                    found.push((path, source));
                }
            }
            DirEntry::Dir(subdir) => collect_templates(subdir, found),
        }
    }
}
