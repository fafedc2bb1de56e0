//! `plan` command: print the ordered operation plan per repository.

use crate::domain::{AppError, Settings, SyncPlan};

/// Human-readable plan lines for one or all declared repositories.
pub fn plan_lines(settings: &Settings, repo: Option<&str>) -> Result<Vec<String>, AppError> {
    if let Some(name) = repo {
        settings.declaration(name)?;
    }

    let mut lines = Vec::new();
    for decl in &settings.repositories {
        if let Some(name) = repo
            && decl.name != name
        {
            continue;
        }
        lines.push(format!("{}/{}:", settings.owner, decl.name));
        let plan = SyncPlan::for_declaration(settings, decl);
        for (index, step) in plan.steps().iter().enumerate() {
            lines.push(format!("  {:>2}. {step}", index + 1));
        }
    }
    Ok(lines)
}

pub fn execute(settings: &Settings, repo: Option<&str>) -> Result<(), AppError> {
    for line in plan_lines(settings, repo)? {
        println!("{line}");
    }
    Ok(())
}
