//! Data handed to every template rendered for a new project.

use crate::error::Result;
use crate::vcs::RepositoryInfo;
use serde::Serialize;
use url::Url;

/// Status badge reported by the CI provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub title: String,
    pub image_url: String,
    pub link_url: String,
}

/// Template data, built once per run and never changed afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TemplateContext {
    pub project_name: String,
    pub organisation: String,
    pub registry_url: String,
    pub badges: Vec<Badge>,
    pub repository_url: String,
    pub repository_host: String,
    pub repository_path: String,
}

impl TemplateContext {
    /// Builds the context for `name` from the created repository.
    ///
    /// Host and path come from the HTTPS clone URL; the first `.git` in the
    /// path is removed.
    pub fn build(
        name: &str,
        organisation: &str,
        registry_url: &str,
        repository: &RepositoryInfo,
        badges: Vec<Badge>,
    ) -> Result<Self> {
        let parsed = Url::parse(&repository.https_url)?;

        Ok(Self {
            project_name: name.to_string(),
            organisation: organisation.to_string(),
            registry_url: registry_url.to_string(),
            badges,
            repository_url: repository.ssh_url.clone(),
            repository_host: parsed.host_str().unwrap_or_default().to_string(),
            repository_path: parsed.path().replacen(".git", "", 1),
        })
    }
}
