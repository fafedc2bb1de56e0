//! `sync` command: apply every repository declaration.

use crate::app::AppContext;
use crate::app::sync::Synchronizer;
use crate::domain::AppError;
use crate::ports::GitHubProvider;

/// Synchronize the declared repositories, or a single one.
///
/// A failing step aborts the rest of that repository's sequence, but the
/// remaining repositories still get their pass; failures are surfaced at
/// the end.
pub fn execute<P: GitHubProvider>(
    ctx: &AppContext<P>,
    repo: Option<&str>,
    dry_run: bool,
) -> Result<(), AppError> {
    let settings = ctx.settings();
    if let Some(name) = repo {
        settings.declaration(name)?;
    }

    let mut failed: Vec<String> = Vec::new();
    for decl in &settings.repositories {
        if let Some(name) = repo
            && decl.name != name
        {
            continue;
        }

        if dry_run {
            println!("Planned changes for {}/{}:", settings.owner, decl.name);
        }
        let sync = Synchronizer::new(ctx.provider(), ctx.renderer(), settings, decl, dry_run);
        match sync.run() {
            Ok(_) if dry_run => {
                println!("✅ {} (dry run, nothing written)", decl.name);
            }
            Ok(report) => {
                println!(
                    "✅ Synced {} ({} files written, {} unchanged)",
                    decl.name, report.written, report.unchanged
                );
            }
            Err(err) => {
                eprintln!("❌ {}: {}", decl.name, err);
                failed.push(decl.name.clone());
            }
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        Err(AppError::config_error(format!(
            "sync failed for {} repositories: {}",
            failed.len(),
            failed.join(", ")
        )))
    }
}
