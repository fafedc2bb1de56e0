//! Provider resource layer seam.
//!
//! The synchronizer only declares *what* exists and *in what order*; the
//! provider implementation owns transport, auth, and API details. No retry
//! or backoff policy lives on this side of the boundary.

use crate::domain::{Author, Label, Pages, RequiredCheck};
use crate::domain::AppError;

/// Variable repository fields; the fixed baseline (merge strategy flags,
/// public visibility, vulnerability alerts, auto-init, commit signoff) is
/// owned by the provider implementation.
#[derive(Debug, Clone)]
pub struct RepositorySettings {
    pub name: String,
    pub description: String,
    pub homepage: Option<String>,
    pub topics: Vec<String>,
    pub pages: Option<Pages>,
}

/// One file write targeting a branch of the repository.
#[derive(Debug, Clone)]
pub struct FileWrite {
    pub path: String,
    pub content: String,
    pub message: String,
    pub author: Author,
    pub branch: String,
}

/// Result of an idempotent file upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Created,
    Updated,
    /// Remote content already matched; nothing was written.
    Unchanged,
}

/// Branch-protection policy bundle applied to the default branch ref
/// pattern.
#[derive(Debug, Clone)]
pub struct Ruleset {
    pub name: String,
    pub required_approving_review_count: u8,
    pub require_code_owner_review: bool,
    pub required_review_thread_resolution: bool,
    pub required_linear_history: bool,
    pub required_signatures: bool,
    pub block_deletion: bool,
    /// Repository role allowed to bypass the ruleset.
    pub bypass_role_id: u64,
    pub required_checks: Vec<RequiredCheck>,
}

impl Ruleset {
    /// The baseline protection bundle with the given required checks.
    pub fn baseline(name: &str, required_checks: Vec<RequiredCheck>) -> Self {
        Self {
            name: name.to_string(),
            required_approving_review_count: 1,
            require_code_owner_review: true,
            required_review_thread_resolution: true,
            required_linear_history: true,
            required_signatures: true,
            block_deletion: true,
            // Repository admin role.
            bypass_role_id: 5,
            required_checks,
        }
    }
}

/// GitHub resource operations used by the synchronizer.
pub trait GitHubProvider {
    /// Create the repository if absent, then apply the baseline settings.
    fn ensure_repository(&self, settings: &RepositorySettings) -> Result<(), AppError>;

    /// Create the branch if absent, from the head of the default branch.
    fn ensure_branch(&self, repository: &str, branch: &str) -> Result<(), AppError>;

    fn set_default_branch(&self, repository: &str, branch: &str) -> Result<(), AppError>;

    /// Read a file's raw content from a branch.
    ///
    /// Any non-200 response maps to `None`; transient failures are not
    /// distinguished from absence.
    fn read_file(
        &self,
        repository: &str,
        branch: &str,
        path: &str,
    ) -> Result<Option<String>, AppError>;

    /// Create or update a file; a write whose content already matches the
    /// remote is skipped.
    fn upsert_file(&self, repository: &str, write: &FileWrite) -> Result<SyncOutcome, AppError>;

    /// Converge the repository's label set to exactly the given list.
    fn replace_labels(&self, repository: &str, labels: &[Label]) -> Result<(), AppError>;

    /// Create or update (by name) the branch ruleset.
    fn apply_ruleset(&self, repository: &str, ruleset: &Ruleset) -> Result<(), AppError>;

    fn install_app(&self, repository: &str, installation_id: u64) -> Result<(), AppError>;
}
