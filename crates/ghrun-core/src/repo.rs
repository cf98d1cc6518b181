//! Repository references.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Result};

/// Host used when a reference names no host.
pub const DEFAULT_HOST: &str = "github.com";

/// Identifies a repository on a GitHub host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    pub host: String,
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self::with_host(DEFAULT_HOST, owner, name)
    }

    pub fn with_host(
        host: impl Into<String>,
        owner: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parse a git remote URL.
    ///
    /// Accepts `https://host/owner/repo`, `ssh://git@host/owner/repo` and the
    /// scp-like `git@host:owner/repo`, each with or without a `.git` suffix.
    pub fn from_remote_url(remote: &str) -> Result<Self> {
        let remote = remote.trim();
        let invalid = || Error::InvalidInput(format!("unrecognized git remote: {}", remote));

        let (host, path) = if let Some((user_host, path)) = scp_like(remote) {
            let host = user_host.rsplit('@').next().unwrap_or(user_host);
            (host.to_string(), path.to_string())
        } else {
            let url = Url::parse(remote).map_err(|_| invalid())?;
            let host = url.host_str().ok_or_else(invalid)?.to_string();
            (host, url.path().to_string())
        };

        let host = host.strip_prefix("www.").unwrap_or(&host).to_lowercase();
        let mut segments = path.trim_matches('/').split('/');
        let owner = segments.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
        let name = segments.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
        let name = name.strip_suffix(".git").unwrap_or(name);
        if name.is_empty() {
            return Err(invalid());
        }

        Ok(Self::with_host(host, owner, name))
    }

    /// Base URL of the REST API serving this repository.
    pub fn api_base(&self) -> String {
        if self.host == DEFAULT_HOST {
            "https://api.github.com".to_string()
        } else {
            format!("https://{}/api/v3", self.host)
        }
    }

    /// `owner/name`, as used in REST paths.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Splits `user@host:path`, which is not a valid URL.
fn scp_like(remote: &str) -> Option<(&str, &str)> {
    if remote.contains("://") {
        return None;
    }
    let (user_host, path) = remote.split_once(':')?;
    if user_host.is_empty() || path.is_empty() {
        return None;
    }
    Some((user_host, path))
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host == DEFAULT_HOST {
            write!(f, "{}/{}", self.owner, self.name)
        } else {
            write!(f, "{}/{}/{}", self.host, self.owner, self.name)
        }
    }
}

impl FromStr for RepoRef {
    type Err = Error;

    /// Parse `OWNER/REPO` or `HOST/OWNER/REPO`.
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split('/').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(Error::InvalidInput(format!(
                "expected the \"[HOST/]OWNER/REPO\" format, got {:?}",
                s
            )));
        }
        match parts.as_slice() {
            [owner, name] => Ok(Self::new(*owner, *name)),
            [host, owner, name] => Ok(Self::with_host(host.to_lowercase(), *owner, *name)),
            _ => Err(Error::InvalidInput(format!(
                "expected the \"[HOST/]OWNER/REPO\" format, got {:?}",
                s
            ))),
        }
    }
}
