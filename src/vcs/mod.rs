//! Version control providers.
//!
//! Every provider implements [`Vcs`]. The configuration holds one instance of
//! each provider in [`VcsConfig`], in the fixed order given by [`VcsKind::ALL`].

use crate::config::{EnvSource, Layer};
use crate::error::Result;
use crate::git;
use serde::Deserialize;
use std::path::Path;

pub mod github;
pub mod gitlab;

pub use github::Github;
pub use gitlab::Gitlab;

/// Name of the group used in selection errors
pub const GROUP: &str = "VCS";

/// Clone URLs of a freshly created repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryInfo {
    pub ssh_url: String,
    pub https_url: String,
}

/// Operations a version control provider offers to the pipeline.
pub trait Vcs {
    fn name(&self) -> &'static str;

    /// Checks that the required fields are present. No network access.
    fn validate_config(&self) -> Result<()>;

    /// Creates the network client. Must be called before any remote operation.
    fn configure(&mut self) -> Result<()>;

    /// Checks credentials and that no repository called `name` exists yet.
    fn validate(&self, name: &str) -> Result<()>;

    /// Creates the remote repository.
    fn scaffold(&mut self, name: &str) -> Result<RepositoryInfo>;

    /// Clones the repository into `dir/name`.
    fn clone_repository(&self, dir: &Path, name: &str, ssh_url: &str) -> Result<()> {
        git::clone(ssh_url, &dir.join(name))
    }

    /// Registers a webhook for the repository created by [`Vcs::scaffold`].
    fn webhook(&self, name: &str, url: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VcsKind {
    Github,
    Gitlab,
}

impl VcsKind {
    /// Selection order
    pub const ALL: [VcsKind; 2] = [VcsKind::Github, VcsKind::Gitlab];

    /// Key of the provider in the configuration file
    pub fn key(self) -> &'static str {
        match self {
            VcsKind::Github => "github",
            VcsKind::Gitlab => "gitlab",
        }
    }
}

/// The `vcs` section of the configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VcsConfig {
    pub github: Github,
    pub gitlab: Gitlab,
}

impl VcsConfig {
    pub fn get(&self, kind: VcsKind) -> &dyn Vcs {
        match kind {
            VcsKind::Github => &self.github,
            VcsKind::Gitlab => &self.gitlab,
        }
    }

    pub fn get_mut(&mut self, kind: VcsKind) -> &mut dyn Vcs {
        match kind {
            VcsKind::Github => &mut self.github,
            VcsKind::Gitlab => &mut self.gitlab,
        }
    }

    /// Every provider paired with whether its configuration is valid.
    pub fn candidates(&self) -> impl Iterator<Item = (VcsKind, bool)> + '_ {
        VcsKind::ALL
            .into_iter()
            .map(move |kind| (kind, self.get(kind).validate_config().is_ok()))
    }
}

impl Layer for VcsConfig {
    fn merge(&mut self, other: Self) {
        self.github.merge(other.github);
        self.gitlab.merge(other.gitlab);
    }

    fn apply_env(&mut self, env: &dyn EnvSource) {
        self.github.apply_env(env);
        self.gitlab.apply_env(env);
    }
}
