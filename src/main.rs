use std::path::PathBuf;

use clap::{Parser, Subcommand};
use repokit::AppError;

#[derive(Parser)]
#[command(name = "repokit")]
#[command(version)]
#[command(
    about = "Provision and standardize GitHub repositories from a declarative catalog",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply the declared repositories to GitHub
    Sync {
        /// Declaration file
        #[arg(short, long, default_value = "repokit.yml")]
        config: PathBuf,
        /// Limit the pass to one declared repository
        #[arg(short, long)]
        repo: Option<String>,
        /// Render and print planned writes without any API call
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the ordered operation plan per repository
    Plan {
        /// Declaration file
        #[arg(short, long, default_value = "repokit.yml")]
        config: PathBuf,
        /// Limit the plan to one declared repository
        #[arg(short, long)]
        repo: Option<String>,
    },
    /// Render one generated file to stdout
    Render {
        /// Declaration file
        #[arg(short, long, default_value = "repokit.yml")]
        config: PathBuf,
        /// Declared repository name
        #[arg(short, long)]
        repo: String,
        /// Destination path to render (e.g. README.md, .github/CODEOWNERS)
        #[arg(short, long)]
        path: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let result: Result<(), AppError> = match cli.command {
        Commands::Sync { config, repo, dry_run } => {
            repokit::sync(&config, repo.as_deref(), dry_run)
        }
        Commands::Plan { config, repo } => repokit::plan(&config, repo.as_deref()),
        Commands::Render { config, repo, path } => repokit::render_file(&config, &repo, &path),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
