//! Continuous integration providers.
//!
//! Every provider implements [`Ci`]. The configuration holds one instance of
//! each provider in [`CiConfig`], in the fixed order given by [`CiKind::ALL`].

use crate::config::{EnvSource, Layer};
use crate::context::{Badge, TemplateContext};
use crate::error::Result;
use crate::renderer::TemplateRenderer;
use serde::Deserialize;
use std::path::Path;

pub mod buildkite;
pub mod gitlab;

pub use buildkite::Buildkite;
pub use gitlab::Gitlab;

/// Name of the group used in selection errors
pub const GROUP: &str = "CI";

/// Operations a CI provider offers to the pipeline.
pub trait Ci {
    fn name(&self) -> &'static str;

    /// Checks that the required fields are present. No network access.
    fn validate_config(&self) -> Result<()>;

    /// Creates the network client. Must be called before any remote operation.
    fn configure(&mut self) -> Result<()>;

    /// Checks credentials and that no pipeline for `name` exists yet.
    fn validate(&self, name: &str) -> Result<()>;

    /// Writes the pipeline definition into `dir` and returns the webhook URL
    /// the VCS should call, if the provider needs one.
    fn scaffold(
        &self,
        dir: &Path,
        context: &TemplateContext,
        renderer: &dyn TemplateRenderer,
    ) -> Result<Option<String>>;

    fn badges(&self, name: &str) -> Result<Vec<Badge>>;
}

/// Title shown for a badge, derived from its image URL.
pub fn badge_title(image_url: &str) -> &'static str {
    if image_url.contains("build") {
        "Build status"
    } else if image_url.contains("coverage") {
        "Coverage report"
    } else {
        ""
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CiKind {
    Buildkite,
    Gitlab,
}

impl CiKind {
    /// Selection order
    pub const ALL: [CiKind; 2] = [CiKind::Buildkite, CiKind::Gitlab];

    /// Key of the provider in the configuration file
    pub fn key(self) -> &'static str {
        match self {
            CiKind::Buildkite => "buildkite",
            CiKind::Gitlab => "gitlab",
        }
    }
}

/// The `ci` section of the configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CiConfig {
    pub buildkite: Buildkite,
    pub gitlab: Gitlab,
}

impl CiConfig {
    pub fn get(&self, kind: CiKind) -> &dyn Ci {
        match kind {
            CiKind::Buildkite => &self.buildkite,
            CiKind::Gitlab => &self.gitlab,
        }
    }

    pub fn get_mut(&mut self, kind: CiKind) -> &mut dyn Ci {
        match kind {
            CiKind::Buildkite => &mut self.buildkite,
            CiKind::Gitlab => &mut self.gitlab,
        }
    }

    /// Every provider paired with whether its configuration is valid.
    pub fn candidates(&self) -> impl Iterator<Item = (CiKind, bool)> + '_ {
        CiKind::ALL
            .into_iter()
            .map(move |kind| (kind, self.get(kind).validate_config().is_ok()))
    }
}

impl Layer for CiConfig {
    fn merge(&mut self, other: Self) {
        self.buildkite.merge(other.buildkite);
        self.gitlab.merge(other.gitlab);
    }

    fn apply_env(&mut self, env: &dyn EnvSource) {
        self.buildkite.apply_env(env);
        self.gitlab.apply_env(env);
    }
}
