use crate::config::{bind, fill, redact, EnvSource, Layer};
use crate::constants::{DEFAULT_BRANCH, GITHUB_API_URL};
use crate::error::{Error, Result};
use crate::http::RestClient;
use crate::vcs::{RepositoryInfo, Vcs};
use log::debug;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::fmt;

const TOKEN_ENV: &str = "GITHUB_TOKEN";

#[derive(Debug, Clone, Deserialize)]
pub struct GithubUser {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubRepository {
    pub name: String,
    pub ssh_url: String,
    pub clone_url: String,
    pub owner: GithubUser,
}

/// The parts of the GitHub REST API used by the provider.
pub trait GithubApi {
    fn current_user(&self) -> Result<GithubUser>;

    /// `None` when the repository does not exist.
    fn repository(&self, owner: &str, name: &str) -> Result<Option<GithubRepository>>;

    /// Creates the repository in `organisation`, or for the user when empty.
    fn create_repository(&self, organisation: &str, name: &str) -> Result<GithubRepository>;

    fn protect_branch(&self, owner: &str, name: &str, branch: &str) -> Result<()>;

    fn create_hook(&self, owner: &str, name: &str, url: &str) -> Result<()>;
}

pub struct GithubClient {
    rest: RestClient,
}

impl GithubClient {
    pub fn new(token: &str) -> Result<Self> {
        let rest = RestClient::new(GITHUB_API_URL, AUTHORIZATION, &format!("token {token}"))?;
        Ok(Self { rest })
    }
}

impl GithubApi for GithubClient {
    fn current_user(&self) -> Result<GithubUser> {
        self.rest.get(&["user"])?.success("failed to authenticate with Github")?.json()
    }

    fn repository(&self, owner: &str, name: &str) -> Result<Option<GithubRepository>> {
        let reply = self.rest.get(&["repos", owner, name])?;
        if reply.is(StatusCode::NOT_FOUND) {
            return Ok(None);
        }
        reply.success(&format!("failed to look up repository {owner}/{name}"))?.json().map(Some)
    }

    fn create_repository(&self, organisation: &str, name: &str) -> Result<GithubRepository> {
        let path = if organisation.is_empty() {
            vec!["user", "repos"]
        } else {
            vec!["orgs", organisation, "repos"]
        };
        let body = json!({ "name": name, "auto_init": true, "private": false });
        self.rest
            .post(&path, &body)?
            .expect(StatusCode::CREATED, &format!("failed to create repository {name}"))?
            .json()
    }

    fn protect_branch(&self, owner: &str, name: &str, branch: &str) -> Result<()> {
        let body = json!({
            "required_status_checks": null,
            "enforce_admins": true,
            "required_pull_request_reviews": {
                "dismiss_stale_reviews": true,
                "required_approving_review_count": 1,
            },
            "restrictions": null,
        });
        self.rest
            .put(&["repos", owner, name, "branches", branch, "protection"], &body)?
            .expect(StatusCode::OK, "failed to set repository branch protection")?;
        Ok(())
    }

    fn create_hook(&self, owner: &str, name: &str, url: &str) -> Result<()> {
        let body = json!({
            "name": "web",
            "active": true,
            "events": ["push", "pull_request", "deployment"],
            "config": { "url": url, "content_type": "json" },
        });
        self.rest
            .post(&["repos", owner, name, "hooks"], &body)?
            .expect(StatusCode::CREATED, "failed to create webhook")?;
        Ok(())
    }
}

/// GitHub as version control provider.
#[derive(Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Github {
    pub token: String,
    pub organisation: String,
    #[serde(skip)]
    repo_owner: String,
    #[serde(skip)]
    api: Option<Box<dyn GithubApi>>,
}

impl Github {
    /// Uses `api` instead of the client created by [`Vcs::configure`].
    pub fn with_api(mut self, api: Box<dyn GithubApi>) -> Self {
        self.api = Some(api);
        self
    }

    fn api(&self) -> Result<&dyn GithubApi> {
        self.api
            .as_deref()
            .ok_or_else(|| Error::RemoteOperationError("Github client not configured".to_string()))
    }
}

impl fmt::Debug for Github {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Github")
            .field("token", &redact(&self.token))
            .field("organisation", &self.organisation)
            .finish_non_exhaustive()
    }
}

impl Layer for Github {
    fn merge(&mut self, other: Self) {
        fill(&mut self.token, other.token);
        fill(&mut self.organisation, other.organisation);
    }

    fn apply_env(&mut self, env: &dyn EnvSource) {
        bind(&mut self.token, env, TOKEN_ENV);
    }
}

impl Vcs for Github {
    fn name(&self) -> &'static str {
        "Github"
    }

    fn validate_config(&self) -> Result<()> {
        if self.token.is_empty() {
            return Err(Error::ProviderCredentialError(
                "token for Github not configured".to_string(),
            ));
        }
        Ok(())
    }

    fn configure(&mut self) -> Result<()> {
        if self.api.is_none() {
            self.api = Some(Box::new(GithubClient::new(&self.token)?));
        }
        Ok(())
    }

    fn validate(&self, name: &str) -> Result<()> {
        let api = self.api()?;
        let user = api.current_user()?;
        let owner = if self.organisation.is_empty() {
            user.login.as_str()
        } else {
            self.organisation.as_str()
        };
        if api.repository(owner, name)?.is_some() {
            return Err(Error::RemoteConflictError(format!(
                "repository named '{owner}/{name}' already exists at Github"
            )));
        }
        Ok(())
    }

    fn scaffold(&mut self, name: &str) -> Result<RepositoryInfo> {
        let api = self.api()?;
        let repository = api.create_repository(&self.organisation, name)?;
        let owner = if self.organisation.is_empty() {
            repository.owner.login.clone()
        } else {
            self.organisation.clone()
        };
        debug!("Protecting branch '{}' of {}/{}", DEFAULT_BRANCH, owner, name);
        api.protect_branch(&owner, name, DEFAULT_BRANCH)?;
        self.repo_owner = owner;

        Ok(RepositoryInfo {
            ssh_url: repository.ssh_url,
            https_url: repository.clone_url,
        })
    }

    fn webhook(&self, name: &str, url: &str) -> Result<()> {
        self.api()?.create_hook(&self.repo_owner, name, url)
    }
}
