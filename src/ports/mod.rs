mod provider;

pub use provider::{FileWrite, GitHubProvider, RepositorySettings, Ruleset, SyncOutcome};
