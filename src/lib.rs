//! scaffold creates everything a new service needs in one run: a repository
//! at the configured VCS, a build pipeline at the configured CI, a local
//! clone with common dotfiles, README, Kubernetes manifest and the files of
//! the chosen language stack.

/// Continuous integration providers (Buildkite, GitLab CI)
pub mod ci;

/// Command-line interface module
pub mod cli;

/// Cascading `.scaffold.yaml` loading and provider selection
pub mod config;

pub mod constants;

/// Data available to every template
pub mod context;

/// Error types and handling
pub mod error;

pub mod file;

/// Dotfiles, README and deployment manifest
pub mod generate;

pub mod git;

/// GitLab REST client shared by the VCS and CI providers
pub mod gitlab;

pub mod http;

pub mod logger;

pub mod output;

/// Ordered scaffolding steps and their status codes
pub mod pipeline;

pub mod renderer;

pub mod service;

/// Language stacks
pub mod stack;

/// Version control providers (GitHub, GitLab)
pub mod vcs;
