//! GitLab REST client shared by the GitLab VCS and CI providers.

use crate::constants::GITLAB_API_URL;
use crate::error::{Error, Result};
use crate::http::RestClient;
use reqwest::header::HeaderName;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Clone, Deserialize)]
pub struct GitlabUser {
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitlabGroup {
    pub id: u64,
    pub full_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitlabProject {
    pub id: u64,
    pub path_with_namespace: String,
    pub ssh_url_to_repo: String,
    pub http_url_to_repo: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GitlabBadge {
    pub image_url: String,
    pub rendered_image_url: String,
    pub rendered_link_url: String,
}

/// The parts of the GitLab REST API used by the providers.
///
/// Projects are addressed by their full path, e.g. `group/project`.
pub trait GitlabApi {
    fn current_user(&self) -> Result<GitlabUser>;

    fn group(&self, path: &str) -> Result<GitlabGroup>;

    /// `None` when the project does not exist.
    fn project(&self, path: &str) -> Result<Option<GitlabProject>>;

    /// Creates a project in the namespace, or for the user when `None`.
    fn create_project(&self, namespace_id: Option<u64>, name: &str) -> Result<GitlabProject>;

    fn add_hook(&self, project: &str, url: &str) -> Result<()>;

    fn project_badges(&self, project: &str) -> Result<Vec<GitlabBadge>>;
}

pub struct GitlabClient {
    rest: RestClient,
}

impl GitlabClient {
    pub fn new(token: &str) -> Result<Self> {
        let header = HeaderName::from_static("private-token");
        Ok(Self { rest: RestClient::new(GITLAB_API_URL, header, token)? })
    }
}

impl GitlabApi for GitlabClient {
    fn current_user(&self) -> Result<GitlabUser> {
        self.rest.get(&["user"])?.success("failed to authenticate with Gitlab")?.json()
    }

    fn group(&self, path: &str) -> Result<GitlabGroup> {
        self.rest
            .get(&["groups", path])?
            .success(&format!("failed to find group {path}"))?
            .json()
    }

    fn project(&self, path: &str) -> Result<Option<GitlabProject>> {
        let reply = self.rest.get(&["projects", path])?;
        if reply.is(StatusCode::NOT_FOUND) {
            return Ok(None);
        }
        reply.success(&format!("failed to look up project {path}"))?.json().map(Some)
    }

    fn create_project(&self, namespace_id: Option<u64>, name: &str) -> Result<GitlabProject> {
        let body = json!({
            "name": name,
            "namespace_id": namespace_id,
            "visibility": "public",
            "initialize_with_readme": true,
        });
        self.rest
            .post(&["projects"], &body)?
            .expect(StatusCode::CREATED, &format!("failed to create project {name}"))?
            .json()
    }

    fn add_hook(&self, project: &str, url: &str) -> Result<()> {
        let body = json!({
            "url": url,
            "push_events": true,
            "merge_requests_events": true,
        });
        self.rest
            .post(&["projects", project, "hooks"], &body)?
            .expect(StatusCode::CREATED, "failed to create webhook")?;
        Ok(())
    }

    fn project_badges(&self, project: &str) -> Result<Vec<GitlabBadge>> {
        self.rest
            .get(&["projects", project, "badges"])?
            .success(&format!("failed to list badges for {project}"))?
            .json()
    }
}

/// Full path of a project, `group/name` or just `name` without group.
pub fn project_path(group: &str, name: &str) -> String {
    if group.is_empty() {
        name.to_string()
    } else {
        format!("{group}/{name}")
    }
}

/// Namespace a project is created in: the group's full path, or the user's
/// own namespace without a group. Also verifies the credentials.
pub fn namespace(api: &dyn GitlabApi, group: &str) -> Result<String> {
    let user = api.current_user()?;
    if group.is_empty() {
        Ok(user.username)
    } else {
        Ok(api.group(group)?.full_path)
    }
}

/// Full path of the project `name` as GitLab addresses it.
pub fn resolve_project_path(api: &dyn GitlabApi, group: &str, name: &str) -> Result<String> {
    Ok(project_path(&namespace(api, group)?, name))
}

/// Checks the credentials, the group and that the project is still free.
pub fn ensure_available(api: &dyn GitlabApi, group: &str, name: &str) -> Result<()> {
    let path = resolve_project_path(api, group, name)?;
    if api.project(&path)?.is_some() {
        return Err(Error::RemoteConflictError(format!(
            "project named '{path}' already exists at Gitlab"
        )));
    }
    Ok(())
}
