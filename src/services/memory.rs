//! In-memory provider used by synchronizer tests.

use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::domain::{AppError, Label, Pages};
use crate::ports::{FileWrite, GitHubProvider, RepositorySettings, Ruleset, SyncOutcome};

/// Records every declared resource instead of talking to an API. File
/// contents persist across passes, so re-running a sync against the same
/// instance exercises the idempotence path.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    state: RefCell<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    repositories: Vec<String>,
    pages: BTreeMap<String, Pages>,
    branches: Vec<(String, String)>,
    default_branches: BTreeMap<String, String>,
    /// (repository, branch, path) -> content.
    files: BTreeMap<(String, String, String), String>,
    labels: BTreeMap<String, Vec<Label>>,
    rulesets: BTreeMap<String, Ruleset>,
    app_installs: Vec<(String, u64)>,
    /// Step labels in call order, for ordering assertions.
    calls: Vec<String>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a file, as if a previous pass (or a maintainer) wrote it.
    pub fn seed_file(&self, repository: &str, branch: &str, path: &str, content: &str) {
        self.state.borrow_mut().files.insert(
            (repository.to_string(), branch.to_string(), path.to_string()),
            content.to_string(),
        );
    }

    pub fn file(&self, repository: &str, branch: &str, path: &str) -> Option<String> {
        self.state
            .borrow()
            .files
            .get(&(repository.to_string(), branch.to_string(), path.to_string()))
            .cloned()
    }

    pub fn file_paths(&self, repository: &str, branch: &str) -> Vec<String> {
        self.state
            .borrow()
            .files
            .keys()
            .filter(|(repo, b, _)| repo == repository && b == branch)
            .map(|(_, _, path)| path.clone())
            .collect()
    }

    pub fn labels(&self, repository: &str) -> Vec<Label> {
        self.state.borrow().labels.get(repository).cloned().unwrap_or_default()
    }

    pub fn ruleset(&self, repository: &str) -> Option<Ruleset> {
        self.state.borrow().rulesets.get(repository).cloned()
    }

    pub fn app_installs(&self) -> Vec<(String, u64)> {
        self.state.borrow().app_installs.clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    pub fn pages(&self, repository: &str) -> Option<Pages> {
        self.state.borrow().pages.get(repository).cloned()
    }

    pub fn has_branch(&self, repository: &str, branch: &str) -> bool {
        self.state
            .borrow()
            .branches
            .iter()
            .any(|(repo, b)| repo == repository && b == branch)
    }
}

impl GitHubProvider for MemoryProvider {
    fn ensure_repository(&self, settings: &RepositorySettings) -> Result<(), AppError> {
        let mut state = self.state.borrow_mut();
        if !state.repositories.contains(&settings.name) {
            state.repositories.push(settings.name.clone());
        }
        if let Some(pages) = &settings.pages {
            state.pages.insert(settings.name.clone(), pages.clone());
        }
        state.calls.push(format!("repository:{}", settings.name));
        Ok(())
    }

    fn ensure_branch(&self, repository: &str, branch: &str) -> Result<(), AppError> {
        let mut state = self.state.borrow_mut();
        let key = (repository.to_string(), branch.to_string());
        if !state.branches.contains(&key) {
            state.branches.push(key);
        }
        state.calls.push(format!("branch:{branch}"));
        Ok(())
    }

    fn set_default_branch(&self, repository: &str, branch: &str) -> Result<(), AppError> {
        let mut state = self.state.borrow_mut();
        state.default_branches.insert(repository.to_string(), branch.to_string());
        state.calls.push(format!("default-branch:{branch}"));
        Ok(())
    }

    fn read_file(
        &self,
        repository: &str,
        branch: &str,
        path: &str,
    ) -> Result<Option<String>, AppError> {
        Ok(self.file(repository, branch, path))
    }

    fn upsert_file(&self, repository: &str, write: &FileWrite) -> Result<SyncOutcome, AppError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(format!("file:{}", write.path));
        let key = (repository.to_string(), write.branch.clone(), write.path.clone());
        match state.files.get(&key) {
            Some(existing) if existing == &write.content => Ok(SyncOutcome::Unchanged),
            Some(_) => {
                state.files.insert(key, write.content.clone());
                Ok(SyncOutcome::Updated)
            }
            None => {
                state.files.insert(key, write.content.clone());
                Ok(SyncOutcome::Created)
            }
        }
    }

    fn replace_labels(&self, repository: &str, labels: &[Label]) -> Result<(), AppError> {
        let mut state = self.state.borrow_mut();
        state.labels.insert(repository.to_string(), labels.to_vec());
        state.calls.push("labels".to_string());
        Ok(())
    }

    fn apply_ruleset(&self, repository: &str, ruleset: &Ruleset) -> Result<(), AppError> {
        let mut state = self.state.borrow_mut();
        state.rulesets.insert(repository.to_string(), ruleset.clone());
        state.calls.push(format!("ruleset:{}", ruleset.name));
        Ok(())
    }

    fn install_app(&self, repository: &str, installation_id: u64) -> Result<(), AppError> {
        let mut state = self.state.borrow_mut();
        state.app_installs.push((repository.to_string(), installation_id));
        state.calls.push(format!("app:{installation_id}"));
        Ok(())
    }
}
