//! Error handling for scaffold.
//! Defines the error type and result alias used throughout the crate.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading configuration or scaffolding a project.
///
/// Messages coming back from a remote provider are kept verbatim so the user
/// sees exactly what the VCS or CI service reported.
#[derive(Error, Debug)]
pub enum Error {
    /// The project name cannot be used as a directory name
    #[error("invalid project name '{0}'")]
    InvalidNameError(String),

    /// Local filesystem failures (permissions, path is not a directory, ...)
    #[error("{0}")]
    IoError(#[from] io::Error),

    /// A configuration file is malformed or contains an unknown field
    #[error("failed to parse config file '{}': {source}", path.display())]
    ConfigParseError { path: PathBuf, source: serde_yaml::Error },

    /// More than one provider in a group has a valid configuration
    #[error("scaffold {group} already defined, please check configuration")]
    ProviderAmbiguityError { group: &'static str },

    /// No provider in a group has a valid configuration
    #[error("no {group} configured")]
    ProviderMissingError { group: &'static str },

    /// A provider is missing a required field
    #[error("{0}")]
    ProviderCredentialError(String),

    /// The project already exists at the VCS or CI provider
    #[error("{0}")]
    RemoteConflictError(String),

    /// Any failure talking to a remote provider
    #[error("{0}")]
    RemoteOperationError(String),

    /// Failures from libgit2 while cloning
    #[error("{}", .0.message())]
    Git2Error(#[from] git2::Error),

    /// Template rendering failures
    #[error("template error: {0}")]
    MinijinjaError(#[from] minijinja::Error),

    /// The clone URL returned by the VCS could not be parsed
    #[error("invalid repository url: {0}")]
    UrlError(#[from] url::ParseError),

    /// No stack is registered under the requested name
    #[error("unknown stack '{name}', available stacks: {available}")]
    UnknownStackError { name: String, available: String },
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::RemoteOperationError(err.to_string())
    }
}

/// Convenience type alias for Results with [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) -> ! {
    eprintln!("{err}");
    std::process::exit(1);
}
