//! Common constants used throughout scaffold.

/// Name of the configuration file looked up in every directory level
pub const CONFIG_FILE: &str = ".scaffold.yaml";

/// Branch protected right after the repository is created
pub const DEFAULT_BRANCH: &str = "master";

/// Stack used when none is requested on the command line
pub const DEFAULT_STACK: &str = "none";

pub const GITHUB_API_URL: &str = "https://api.github.com";
pub const GITLAB_API_URL: &str = "https://gitlab.com/api/v4";
pub const BUILDKITE_API_URL: &str = "https://api.buildkite.com/v2";

/// User agent sent with every provider request
pub const USER_AGENT: &str = concat!("scaffold/", env!("CARGO_PKG_VERSION"));
