//! Cloning the freshly created repository with libgit2.

use crate::error::Result;
use git2::{build::RepoBuilder, Cred, CredentialType, FetchOptions, RemoteCallbacks};
use log::debug;
use std::path::{Path, PathBuf};

/// Clones `url` into `target`.
///
/// SSH authentication tries the running agent first and then
/// `~/.ssh/id_rsa`. libgit2 calls the credential callback again after every
/// rejected attempt, so the number of attempts is capped.
pub fn clone(url: &str, target: &Path) -> Result<()> {
    debug!("Cloning '{}' into '{}'.", url, target.display());

    let mut attempts = 0;
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(move |_url, username_from_url, allowed_types| {
        attempts += 1;
        let username = username_from_url.unwrap_or("git");
        if !allowed_types.contains(CredentialType::SSH_KEY) {
            return Cred::default();
        }
        match attempts {
            1 => Cred::ssh_key_from_agent(username),
            2 => match private_key() {
                Some(key) => Cred::ssh_key(username, None, &key, None),
                None => Err(git2::Error::from_str("no ssh key available")),
            },
            _ => Err(git2::Error::from_str("ssh authentication failed")),
        }
    });

    let mut fetch_options = FetchOptions::new();
    fetch_options.remote_callbacks(callbacks);

    let mut builder = RepoBuilder::new();
    builder.fetch_options(fetch_options);
    builder.clone(url, target)?;
    Ok(())
}

fn private_key() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(PathBuf::from(home).join(".ssh").join("id_rsa"))
}
