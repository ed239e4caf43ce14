use crate::config::{bind, fill, redact, EnvSource, Layer};
use crate::error::{Error, Result};
use crate::gitlab::{ensure_available, resolve_project_path, GitlabApi, GitlabClient};
use crate::vcs::{RepositoryInfo, Vcs};
use log::debug;
use serde::Deserialize;
use std::fmt;

const TOKEN_ENV: &str = "GITLAB_TOKEN";
const GROUP_ENV: &str = "GITLAB_GROUP";

/// GitLab as version control provider.
#[derive(Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Gitlab {
    pub token: String,
    pub group: String,
    #[serde(skip)]
    project: String,
    #[serde(skip)]
    api: Option<Box<dyn GitlabApi>>,
}

impl Gitlab {
    /// Uses `api` instead of the client created by [`Vcs::configure`].
    pub fn with_api(mut self, api: Box<dyn GitlabApi>) -> Self {
        self.api = Some(api);
        self
    }

    fn api(&self) -> Result<&dyn GitlabApi> {
        self.api
            .as_deref()
            .ok_or_else(|| Error::RemoteOperationError("Gitlab client not configured".to_string()))
    }
}

impl fmt::Debug for Gitlab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gitlab")
            .field("token", &redact(&self.token))
            .field("group", &self.group)
            .finish_non_exhaustive()
    }
}

impl Layer for Gitlab {
    fn merge(&mut self, other: Self) {
        fill(&mut self.token, other.token);
        fill(&mut self.group, other.group);
    }

    fn apply_env(&mut self, env: &dyn EnvSource) {
        bind(&mut self.token, env, TOKEN_ENV);
        bind(&mut self.group, env, GROUP_ENV);
    }
}

impl Vcs for Gitlab {
    fn name(&self) -> &'static str {
        "Gitlab"
    }

    fn validate_config(&self) -> Result<()> {
        if self.token.is_empty() {
            return Err(Error::ProviderCredentialError(
                "token for Gitlab not configured".to_string(),
            ));
        }
        Ok(())
    }

    fn configure(&mut self) -> Result<()> {
        if self.api.is_none() {
            self.api = Some(Box::new(GitlabClient::new(&self.token)?));
        }
        Ok(())
    }

    fn validate(&self, name: &str) -> Result<()> {
        ensure_available(self.api()?, &self.group, name)
    }

    fn scaffold(&mut self, name: &str) -> Result<RepositoryInfo> {
        let api = self.api()?;
        let namespace_id = if self.group.is_empty() {
            None
        } else {
            Some(api.group(&self.group)?.id)
        };
        let project = api.create_project(namespace_id, name)?;
        debug!("Created Gitlab project {} ({})", project.path_with_namespace, project.id);
        self.project = project.path_with_namespace;

        Ok(RepositoryInfo {
            ssh_url: project.ssh_url_to_repo,
            https_url: project.http_url_to_repo,
        })
    }

    fn webhook(&self, name: &str, url: &str) -> Result<()> {
        let api = self.api()?;
        let project = if self.project.is_empty() {
            resolve_project_path(api, &self.group, name)?
        } else {
            self.project.clone()
        };
        api.add_hook(&project, url)
    }
}
