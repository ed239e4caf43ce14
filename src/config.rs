//! Cascading configuration for scaffold.
//!
//! Configuration is read from every `.scaffold.yaml` between the working
//! directory and the filesystem root. The nearest file wins for every field it
//! sets, environment variables win over all files. After each merge exactly one
//! VCS and one CI provider may have a valid configuration; that provider
//! becomes the active one for its group.

use crate::ci::{self, Ci, CiConfig, CiKind};
use crate::constants::CONFIG_FILE;
use crate::error::{Error, Result};
use crate::output;
use crate::vcs::{self, Vcs, VcsConfig, VcsKind};
use log::debug;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

/// Source of environment variable overrides.
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads overrides from the process environment.
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Turns the starting directory into an absolute path before the upward walk.
pub trait PathResolver {
    fn absolute(&self, path: &Path) -> io::Result<PathBuf>;
}

/// Resolves paths against the current working directory.
pub struct AbsolutePaths;

impl PathResolver for AbsolutePaths {
    fn absolute(&self, path: &Path) -> io::Result<PathBuf> {
        std::path::absolute(path)
    }
}

/// A configuration layer that can be stacked on top of others.
pub trait Layer {
    /// Fills every field still empty in `self` with the value from `other`.
    fn merge(&mut self, other: Self);

    /// Replaces every bound field whose environment variable is set.
    fn apply_env(&mut self, env: &dyn EnvSource);
}

pub(crate) fn fill(field: &mut String, value: String) {
    if field.is_empty() {
        *field = value;
    }
}

pub(crate) fn bind(field: &mut String, env: &dyn EnvSource, key: &str) {
    if let Some(value) = env.var(key) {
        *field = value;
    }
}

/// Masks secrets in `Debug` output.
pub(crate) fn redact(value: &str) -> &'static str {
    if value.is_empty() {
        ""
    } else {
        "<redacted>"
    }
}

/// Merged scaffold configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub vcs: VcsConfig,
    pub ci: CiConfig,
    #[serde(rename = "registry")]
    pub registry_url: String,
    pub organisation: String,
    #[serde(skip)]
    active_vcs: Option<VcsKind>,
    #[serde(skip)]
    active_ci: Option<CiKind>,
}

/// The selected providers together with the scalars the pipeline needs.
pub struct ActiveProviders<'a> {
    pub vcs: &'a mut dyn Vcs,
    pub ci: &'a mut dyn Ci,
    pub organisation: &'a str,
    pub registry_url: &'a str,
}

const REGISTRY_ENV: &str = "REGISTRY";

impl Layer for Config {
    fn merge(&mut self, other: Self) {
        self.vcs.merge(other.vcs);
        self.ci.merge(other.ci);
        fill(&mut self.registry_url, other.registry_url);
        fill(&mut self.organisation, other.organisation);
    }

    fn apply_env(&mut self, env: &dyn EnvSource) {
        self.vcs.apply_env(env);
        self.ci.apply_env(env);
        bind(&mut self.registry_url, env, REGISTRY_ENV);
    }
}

impl Config {
    /// Parses a single configuration file. Unknown fields are rejected.
    pub fn from_yaml(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str::<Option<Self>>(content).map(Option::unwrap_or_default)
    }

    pub fn active_vcs_kind(&self) -> Option<VcsKind> {
        self.active_vcs
    }

    pub fn active_ci_kind(&self) -> Option<CiKind> {
        self.active_ci
    }

    pub fn active_vcs(&self) -> Option<&dyn Vcs> {
        self.active_vcs.map(|kind| self.vcs.get(kind))
    }

    pub fn active_ci(&self) -> Option<&dyn Ci> {
        self.active_ci.map(|kind| self.ci.get(kind))
    }

    /// Picks the single valid provider of each group.
    ///
    /// A group without a valid provider is left unset; a group with more than
    /// one fails with [`Error::ProviderAmbiguityError`].
    pub fn select_providers(&mut self) -> Result<()> {
        self.active_vcs = None;
        self.active_ci = None;
        self.active_vcs = select(vcs::GROUP, self.vcs.candidates())?;
        self.active_ci = select(ci::GROUP, self.ci.candidates())?;
        Ok(())
    }

    /// Fails unless both a VCS and a CI provider have been selected.
    pub fn validate_config(&self) -> Result<()> {
        if self.active_vcs.is_none() {
            return Err(Error::ProviderMissingError { group: vcs::GROUP });
        }
        if self.active_ci.is_none() {
            return Err(Error::ProviderMissingError { group: ci::GROUP });
        }
        Ok(())
    }

    /// Borrows the active providers for a pipeline run.
    pub fn resolve(&mut self) -> Result<ActiveProviders<'_>> {
        let Config { vcs, ci, registry_url, organisation, active_vcs, active_ci } = self;
        let Some(vcs_kind) = *active_vcs else {
            return Err(Error::ProviderMissingError { group: vcs::GROUP });
        };
        let Some(ci_kind) = *active_ci else {
            return Err(Error::ProviderMissingError { group: ci::GROUP });
        };
        Ok(ActiveProviders {
            vcs: vcs.get_mut(vcs_kind),
            ci: ci.get_mut(ci_kind),
            organisation: organisation.as_str(),
            registry_url: registry_url.as_str(),
        })
    }
}

fn select<K: Copy + std::fmt::Debug>(
    group: &'static str,
    candidates: impl IntoIterator<Item = (K, bool)>,
) -> Result<Option<K>> {
    let mut selected = None;
    for (kind, valid) in candidates {
        if !valid {
            continue;
        }
        if selected.is_some() {
            return Err(Error::ProviderAmbiguityError { group });
        }
        debug!("Selected {:?} as {}", kind, group);
        selected = Some(kind);
    }
    Ok(selected)
}

/// Folds `.` and `..` components of an absolute path, so that only real
/// ancestors are searched. `..` at the root stays at the root.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Discovers, parses and merges the configuration files for a directory.
pub struct ConfigLoader<'a> {
    paths: &'a dyn PathResolver,
    env: &'a dyn EnvSource,
}

impl<'a> ConfigLoader<'a> {
    pub fn new(paths: &'a dyn PathResolver, env: &'a dyn EnvSource) -> Self {
        Self { paths, env }
    }

    /// Returns the configuration files from `dir` upwards, nearest first.
    ///
    /// The filesystem root itself is never searched.
    pub fn discover(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let start = normalize(&self.paths.absolute(dir)?);
        let mut files = Vec::new();
        for directory in start.ancestors() {
            if directory.parent().is_none() {
                break;
            }
            let candidate = directory.join(CONFIG_FILE);
            match fs::metadata(&candidate) {
                Ok(_) => files.push(candidate),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(Error::IoError(e)),
            }
        }
        Ok(files)
    }

    /// Loads the merged configuration for `dir`, reporting each file to `out`.
    pub fn load(&self, dir: &Path, out: &mut dyn Write) -> Result<Config> {
        let mut config = Config::default();

        for (index, file) in self.discover(dir)?.into_iter().enumerate() {
            let message = if index == 0 {
                "Parsing config from file:"
            } else {
                "Merging with config from file:"
            };
            output::file(out, message, &file);

            let content = fs::read_to_string(&file)?;
            let layer = Config::from_yaml(&content)
                .map_err(|source| Error::ConfigParseError { path: file.clone(), source })?;
            config.merge(layer);
            config.select_providers()?;
        }

        config.apply_env(self.env);
        config.select_providers()?;
        Ok(config)
    }
}
