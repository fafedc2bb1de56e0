//! GitHub REST implementation of the provider port.
//!
//! A blocking client with the repository owner and bearer credential fixed
//! at construction. Every method is one or a few explicit REST calls with
//! status-code branching; no retry or backoff happens at this layer.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::Deserialize;
use serde_json::json;
use url::Url;

use crate::domain::{AppError, Label};
use crate::ports::{FileWrite, GitHubProvider, RepositorySettings, Ruleset, SyncOutcome};

const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
const API_VERSION: &str = "2022-11-28";
const ACCEPT_JSON: &str = "application/vnd.github+json";
const ACCEPT_RAW: &str = "application/vnd.github.raw+json";

/// Connection settings for the GitHub API.
#[derive(Debug, Clone)]
pub struct GitHubApiConfig {
    pub api_url: Url,
    pub timeout_secs: u64,
}

impl Default for GitHubApiConfig {
    fn default() -> Self {
        Self {
            api_url: Url::parse("https://api.github.com").expect("valid default API URL"),
            timeout_secs: 30,
        }
    }
}

/// Blocking GitHub REST client scoped to one repository owner.
#[derive(Clone)]
pub struct HttpGitHubProvider {
    owner: String,
    token: String,
    api_url: Url,
    client: Client,
}

impl std::fmt::Debug for HttpGitHubProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGitHubProvider")
            .field("owner", &self.owner)
            .field("api_url", &self.api_url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct RepoInfo {
    id: u64,
    default_branch: String,
}

#[derive(Debug, Deserialize)]
struct RefInfo {
    object: RefObject,
}

#[derive(Debug, Deserialize)]
struct RefObject {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct ContentInfo {
    sha: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct LabelInfo {
    name: String,
    #[serde(default)]
    description: Option<String>,
    color: String,
}

#[derive(Debug, Deserialize)]
struct RulesetInfo {
    id: u64,
    name: String,
}

impl HttpGitHubProvider {
    pub fn new(owner: &str, token: String, config: &GitHubApiConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Http(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { owner: owner.to_string(), token, api_url: config.api_url.clone(), client })
    }

    /// Create a provider authenticated via `GITHUB_TOKEN`.
    pub fn from_env(owner: &str) -> Result<Self, AppError> {
        let token = std::env::var("GITHUB_TOKEN").map_err(|_| AppError::TokenMissing)?;
        Self::new(owner, token, &GitHubApiConfig::default())
    }

    fn url(&self, path: &str) -> Result<Url, AppError> {
        self.api_url.join(path).map_err(|e| AppError::Http(format!("invalid API path {path}: {e}")))
    }

    fn headers(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(ACCEPT, ACCEPT_JSON)
            .header(API_VERSION_HEADER, API_VERSION)
            .header(USER_AGENT, concat!("repokit/", env!("CARGO_PKG_VERSION")))
    }

    fn get(&self, path: &str) -> Result<Response, AppError> {
        self.send(self.headers(self.client.get(self.url(path)?)))
    }

    fn send(&self, request: RequestBuilder) -> Result<Response, AppError> {
        request.send().map_err(|e| AppError::Http(e.to_string()))
    }

    fn api_error(response: Response) -> AppError {
        let status = response.status().as_u16();
        let message = response.text().unwrap_or_else(|_| "unreadable response body".to_string());
        AppError::Api { status, message }
    }

    fn repo_path(&self, repository: &str) -> String {
        format!("/repos/{}/{}", self.owner, repository)
    }

    fn repo_info(&self, repository: &str) -> Result<Option<RepoInfo>, AppError> {
        let response = self.get(&self.repo_path(repository))?;
        match response.status().as_u16() {
            200 => {
                let info =
                    response.json::<RepoInfo>().map_err(|e| AppError::Http(e.to_string()))?;
                Ok(Some(info))
            }
            404 => Ok(None),
            _ => Err(Self::api_error(response)),
        }
    }

    fn create_repository(&self, settings: &RepositorySettings) -> Result<(), AppError> {
        let body = json!({
            "name": settings.name,
            "description": settings.description,
            "visibility": "public",
            "auto_init": true,
        });

        // Organization route first; a 404 means the owner is a user account.
        let org_path = format!("/orgs/{}/repos", self.owner);
        let response = self.send(self.headers(self.client.post(self.url(&org_path)?)).json(&body))?;
        match response.status().as_u16() {
            201 => return Ok(()),
            404 => {}
            _ => return Err(Self::api_error(response)),
        }

        let response =
            self.send(self.headers(self.client.post(self.url("/user/repos")?)).json(&body))?;
        if response.status().as_u16() == 201 {
            Ok(())
        } else {
            Err(Self::api_error(response))
        }
    }

    fn patch_baseline(&self, settings: &RepositorySettings) -> Result<(), AppError> {
        // Fixed baseline carried by every managed repository.
        let body = json!({
            "description": settings.description,
            "homepage": settings.homepage,
            "visibility": "public",
            "allow_auto_merge": true,
            "allow_merge_commit": false,
            "allow_rebase_merge": true,
            "allow_squash_merge": true,
            "allow_update_branch": true,
            "delete_branch_on_merge": true,
            "has_discussions": false,
            "has_issues": true,
            "has_projects": false,
            "has_wiki": false,
            "is_template": false,
            "squash_merge_commit_message": "PR_BODY",
            "squash_merge_commit_title": "PR_TITLE",
            "web_commit_signoff_required": true,
        });

        let response = self
            .send(self.headers(self.client.patch(self.url(&self.repo_path(settings.name.as_str()))?)).json(&body))?;
        if !response.status().is_success() {
            return Err(Self::api_error(response));
        }

        let topics = json!({ "names": settings.topics });
        let topics_path = format!("{}/topics", self.repo_path(&settings.name));
        let response =
            self.send(self.headers(self.client.put(self.url(&topics_path)?)).json(&topics))?;
        if !response.status().is_success() {
            return Err(Self::api_error(response));
        }

        // Vulnerability alerts live behind their own endpoint.
        let alerts_path = format!("{}/vulnerability-alerts", self.repo_path(&settings.name));
        let response = self.send(self.headers(self.client.put(self.url(&alerts_path)?)))?;
        if !response.status().is_success() {
            return Err(Self::api_error(response));
        }

        if let Some(pages) = &settings.pages {
            self.configure_pages(&settings.name, pages)?;
        }
        Ok(())
    }

    fn configure_pages(
        &self,
        repository: &str,
        pages: &crate::domain::Pages,
    ) -> Result<(), AppError> {
        let body = json!({
            "source": { "branch": pages.branch, "path": pages.path },
            "cname": pages.cname,
        });
        let path = format!("{}/pages", self.repo_path(repository));

        let response = self.send(self.headers(self.client.put(self.url(&path)?)).json(&body))?;
        match response.status().as_u16() {
            // 404: pages not yet enabled; create instead of update.
            404 => {
                let response =
                    self.send(self.headers(self.client.post(self.url(&path)?)).json(&body))?;
                if response.status().is_success() {
                    Ok(())
                } else {
                    Err(Self::api_error(response))
                }
            }
            status if (200..300).contains(&status) => Ok(()),
            _ => Err(Self::api_error(response)),
        }
    }

    fn head_sha(&self, repository: &str, branch: &str) -> Result<String, AppError> {
        let path = format!("{}/git/ref/heads/{branch}", self.repo_path(repository));
        let response = self.get(&path)?;
        if !response.status().is_success() {
            return Err(Self::api_error(response));
        }
        let info = response.json::<RefInfo>().map_err(|e| AppError::Http(e.to_string()))?;
        Ok(info.object.sha)
    }

    /// Existing content blob for a path, if any. Non-200 maps to `None`.
    fn content_info(
        &self,
        repository: &str,
        branch: &str,
        path: &str,
    ) -> Result<Option<ContentInfo>, AppError> {
        let api_path = format!("{}/contents/{path}?ref={branch}", self.repo_path(repository));
        let response = self.get(&api_path)?;
        if response.status().as_u16() != 200 {
            return Ok(None);
        }
        let info = response.json::<ContentInfo>().map_err(|e| AppError::Http(e.to_string()))?;
        Ok(Some(info))
    }

    fn decode_content(info: &ContentInfo) -> Option<String> {
        let compact: String = info.content.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = STANDARD.decode(compact).ok()?;
        String::from_utf8(bytes).ok()
    }

    fn list_labels(&self, repository: &str) -> Result<Vec<LabelInfo>, AppError> {
        let path = format!("{}/labels?per_page=100", self.repo_path(repository));
        let response = self.get(&path)?;
        if !response.status().is_success() {
            return Err(Self::api_error(response));
        }
        response.json::<Vec<LabelInfo>>().map_err(|e| AppError::Http(e.to_string()))
    }

    fn ruleset_body(ruleset: &Ruleset) -> serde_json::Value {
        let mut rules = Vec::new();
        if ruleset.block_deletion {
            rules.push(json!({ "type": "deletion" }));
        }
        if ruleset.required_linear_history {
            rules.push(json!({ "type": "required_linear_history" }));
        }
        if ruleset.required_signatures {
            rules.push(json!({ "type": "required_signatures" }));
        }
        rules.push(json!({
            "type": "pull_request",
            "parameters": {
                "required_approving_review_count": ruleset.required_approving_review_count,
                "dismiss_stale_reviews_on_push": false,
                "require_code_owner_review": ruleset.require_code_owner_review,
                "require_last_push_approval": false,
                "required_review_thread_resolution": ruleset.required_review_thread_resolution,
            }
        }));
        rules.push(json!({
            "type": "required_status_checks",
            "parameters": {
                "required_status_checks": ruleset.required_checks,
                "strict_required_status_checks_policy": false,
            }
        }));

        json!({
            "name": ruleset.name,
            "target": "branch",
            "enforcement": "active",
            "conditions": {
                "ref_name": { "include": ["~DEFAULT_BRANCH"], "exclude": [] }
            },
            "bypass_actors": [{
                "actor_id": ruleset.bypass_role_id,
                "actor_type": "RepositoryRole",
                "bypass_mode": "always",
            }],
            "rules": rules,
        })
    }
}

impl GitHubProvider for HttpGitHubProvider {
    fn ensure_repository(&self, settings: &RepositorySettings) -> Result<(), AppError> {
        if self.repo_info(&settings.name)?.is_none() {
            self.create_repository(settings)?;
        }
        self.patch_baseline(settings)
    }

    fn ensure_branch(&self, repository: &str, branch: &str) -> Result<(), AppError> {
        let path = format!("{}/branches/{branch}", self.repo_path(repository));
        let response = self.get(&path)?;
        match response.status().as_u16() {
            200 => return Ok(()),
            404 => {}
            _ => return Err(Self::api_error(response)),
        }

        let base = self
            .repo_info(repository)?
            .ok_or_else(|| AppError::Api { status: 404, message: format!("repository {repository} not found") })?;
        let sha = self.head_sha(repository, &base.default_branch)?;

        let refs_path = format!("{}/git/refs", self.repo_path(repository));
        let body = json!({ "ref": format!("refs/heads/{branch}"), "sha": sha });
        let response =
            self.send(self.headers(self.client.post(self.url(&refs_path)?)).json(&body))?;
        if response.status().as_u16() == 201 {
            Ok(())
        } else {
            Err(Self::api_error(response))
        }
    }

    fn set_default_branch(&self, repository: &str, branch: &str) -> Result<(), AppError> {
        let body = json!({ "default_branch": branch });
        let response = self
            .send(self.headers(self.client.patch(self.url(&self.repo_path(repository))?)).json(&body))?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::api_error(response))
        }
    }

    fn read_file(
        &self,
        repository: &str,
        branch: &str,
        path: &str,
    ) -> Result<Option<String>, AppError> {
        let api_path = format!("{}/contents/{path}?ref={branch}", self.repo_path(repository));
        let response = self.send(
            self.headers(self.client.get(self.url(&api_path)?)).header(ACCEPT, ACCEPT_RAW),
        )?;
        // Any non-200 maps to absent; 404 and transient 5xx are not
        // distinguished here.
        if response.status().as_u16() != 200 {
            return Ok(None);
        }
        let text = response.text().map_err(|e| AppError::Http(e.to_string()))?;
        Ok(Some(text))
    }

    fn upsert_file(&self, repository: &str, write: &FileWrite) -> Result<SyncOutcome, AppError> {
        let existing = self.content_info(repository, &write.branch, &write.path)?;

        if let Some(info) = &existing
            && Self::decode_content(info).as_deref() == Some(write.content.as_str())
        {
            return Ok(SyncOutcome::Unchanged);
        }

        let identity = json!({ "name": write.author.name, "email": write.author.email });
        let mut body = json!({
            "message": write.message,
            "content": STANDARD.encode(write.content.as_bytes()),
            "branch": write.branch,
            "committer": identity,
            "author": identity,
        });
        if let Some(info) = &existing {
            body["sha"] = json!(info.sha);
        }

        let api_path = format!("{}/contents/{}", self.repo_path(repository), write.path);
        let response =
            self.send(self.headers(self.client.put(self.url(&api_path)?)).json(&body))?;
        match response.status().as_u16() {
            201 => Ok(SyncOutcome::Created),
            200 => Ok(SyncOutcome::Updated),
            _ => Err(Self::api_error(response)),
        }
    }

    fn replace_labels(&self, repository: &str, labels: &[Label]) -> Result<(), AppError> {
        let existing = self.list_labels(repository)?;

        for label in labels {
            let body = json!({
                "name": label.name,
                "description": label.description,
                "color": label.color,
            });
            match existing.iter().find(|remote| remote.name == label.name) {
                Some(remote) => {
                    let unchanged = remote.color == label.color
                        && remote.description.as_deref() == Some(label.description.as_str());
                    if unchanged {
                        continue;
                    }
                    let path =
                        format!("{}/labels/{}", self.repo_path(repository), label.name);
                    let response = self
                        .send(self.headers(self.client.patch(self.url(&path)?)).json(&body))?;
                    if !response.status().is_success() {
                        return Err(Self::api_error(response));
                    }
                }
                None => {
                    let path = format!("{}/labels", self.repo_path(repository));
                    let response =
                        self.send(self.headers(self.client.post(self.url(&path)?)).json(&body))?;
                    if response.status().as_u16() != 201 {
                        return Err(Self::api_error(response));
                    }
                }
            }
        }

        // Declarative replace: anything not in the desired set goes away.
        for remote in existing.iter().filter(|remote| {
            !labels.iter().any(|label| label.name == remote.name)
        }) {
            let path = format!("{}/labels/{}", self.repo_path(repository), remote.name);
            let response = self.send(self.headers(self.client.delete(self.url(&path)?)))?;
            if response.status().as_u16() != 204 {
                return Err(Self::api_error(response));
            }
        }

        Ok(())
    }

    fn apply_ruleset(&self, repository: &str, ruleset: &Ruleset) -> Result<(), AppError> {
        let list_path = format!("{}/rulesets", self.repo_path(repository));
        let response = self.get(&list_path)?;
        if !response.status().is_success() {
            return Err(Self::api_error(response));
        }
        let existing =
            response.json::<Vec<RulesetInfo>>().map_err(|e| AppError::Http(e.to_string()))?;

        let body = Self::ruleset_body(ruleset);
        let response = match existing.iter().find(|info| info.name == ruleset.name) {
            Some(info) => {
                let path = format!("{list_path}/{}", info.id);
                self.send(self.headers(self.client.put(self.url(&path)?)).json(&body))?
            }
            None => self.send(self.headers(self.client.post(self.url(&list_path)?)).json(&body))?,
        };
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::api_error(response))
        }
    }

    fn install_app(&self, repository: &str, installation_id: u64) -> Result<(), AppError> {
        let info = self
            .repo_info(repository)?
            .ok_or_else(|| AppError::Api { status: 404, message: format!("repository {repository} not found") })?;

        let path = format!("/user/installations/{installation_id}/repositories/{}", info.id);
        let response = self.send(self.headers(self.client.put(self.url(&path)?)))?;
        if response.status().as_u16() == 204 {
            Ok(())
        } else {
            Err(Self::api_error(response))
        }
    }
}
