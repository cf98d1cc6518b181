//! Builds the collaborators a command needs.

use std::process::Stdio;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use ghrun_core::{ActionsApi, RepoRef};
use tokio::process::Command;
use tracing::debug;

use crate::client::GitHubClient;
use crate::config::Config;
use crate::prompt::{RunPrompter, TerminalPrompter};

/// Source of the API client, the target repository and the run picker.
#[async_trait]
pub trait Factory: Send + Sync {
    fn api_client(&self) -> Result<Arc<dyn ActionsApi>>;

    async fn base_repo(&self) -> Result<RepoRef>;

    fn prompter(&self) -> &dyn RunPrompter;
}

/// Factory wired to the real API, git and terminal.
pub struct DefaultFactory {
    config: Config,
    prompter: TerminalPrompter,
}

impl DefaultFactory {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            prompter: TerminalPrompter,
        }
    }
}

#[async_trait]
impl Factory for DefaultFactory {
    fn api_client(&self) -> Result<Arc<dyn ActionsApi>> {
        Ok(Arc::new(GitHubClient::new(self.config.clone())?))
    }

    /// `--repo` first, then the `origin` remote, then `default-repo` from the config file.
    async fn base_repo(&self) -> Result<RepoRef> {
        if let Some(repo) = &self.config.repo {
            return Ok(repo.parse::<RepoRef>()?);
        }

        match git_remote_repo().await {
            Ok(repo) => Ok(repo),
            Err(e) => match &self.config.file.default_repo {
                Some(repo) => {
                    debug!(error = %e, repo = %repo, "Falling back to configured default repository");
                    Ok(repo.clone())
                }
                None => Err(e),
            },
        }
    }

    fn prompter(&self) -> &dyn RunPrompter {
        &self.prompter
    }
}

async fn git_remote_repo() -> Result<RepoRef> {
    let output = Command::new("git")
        .args(["remote", "get-url", "origin"])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .context("failed to run git")?;

    if !output.status.success() {
        bail!("no git remote found; use --repo to select a repository");
    }

    let remote = String::from_utf8_lossy(&output.stdout);
    debug!(remote = %remote.trim(), "Detected git remote");
    Ok(RepoRef::from_remote_url(&remote)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GlobalArgs;
    use ghrun_config::FileConfig;

    #[tokio::test]
    async fn test_repo_flag_wins() {
        let args = GlobalArgs {
            repo: Some("OWNER/REPO".to_string()),
            ..GlobalArgs::default()
        };
        let factory = DefaultFactory::new(Config::new(&args, FileConfig::default(), None));
        let repo = factory.base_repo().await.unwrap();
        assert_eq!(repo, RepoRef::new("OWNER", "REPO"));
    }

    #[tokio::test]
    async fn test_invalid_repo_flag() {
        let args = GlobalArgs {
            repo: Some("not-a-repo".to_string()),
            ..GlobalArgs::default()
        };
        let factory = DefaultFactory::new(Config::new(&args, FileConfig::default(), None));
        assert!(factory.base_repo().await.is_err());
    }

    #[test]
    fn test_api_client_rejects_bad_token() {
        let args = GlobalArgs {
            token: Some("bad\ttoken\n".to_string()),
            ..GlobalArgs::default()
        };
        let factory = DefaultFactory::new(Config::new(&args, FileConfig::default(), None));
        assert!(factory.api_client().is_err());
    }
}
