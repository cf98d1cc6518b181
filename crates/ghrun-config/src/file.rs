//! Configuration file parsing.

use std::path::{Path, PathBuf};

use ghrun_core::RepoRef;
use kdl::{KdlDocument, KdlNode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ConfigError, ConfigResult};

/// Contents of `config.kdl`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    /// Repository used when neither `--repo` nor a git remote names one.
    pub default_repo: Option<RepoRef>,
    pub hosts: Vec<HostConfig>,
}

/// Per-host settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    pub host: String,
    pub token: Option<String>,
    pub api_url: Option<String>,
}

impl FileConfig {
    /// Read the configuration at `path`. A missing file is an error.
    pub fn read(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), "Loading configuration");
        parse_config(&content)
    }

    /// Load the configuration at `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        match Self::read(path) {
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No configuration file, using defaults");
                Ok(Self::default())
            }
            result => result,
        }
    }

    /// Settings for `host`, if the file defines any.
    pub fn host(&self, host: &str) -> Option<&HostConfig> {
        self.hosts.iter().find(|h| h.host.eq_ignore_ascii_case(host))
    }
}

/// Default location: `$XDG_CONFIG_HOME/ghrun/config.kdl`, else `~/.config/ghrun/config.kdl`.
pub fn default_config_path() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(base.join("ghrun").join("config.kdl"))
}

/// Parse a configuration from KDL text.
pub fn parse_config(kdl: &str) -> ConfigResult<FileConfig> {
    let doc: KdlDocument = kdl.parse()?;

    let mut config = FileConfig::default();

    for node in doc.nodes() {
        match node.name().value() {
            "default-repo" => {
                let value = get_first_string_arg(node)
                    .ok_or_else(|| ConfigError::MissingField("default-repo value".to_string()))?;
                let repo = value.parse::<RepoRef>().map_err(|e| {
                    ConfigError::InvalidValue {
                        field: "default-repo".to_string(),
                        message: e.to_string(),
                    }
                })?;
                config.default_repo = Some(repo);
            }
            "host" => {
                let host = parse_host(node)?;
                if config.host(&host.host).is_some() {
                    return Err(ConfigError::Duplicate(format!("host '{}'", host.host)));
                }
                config.hosts.push(host);
            }
            _ => {} // Ignore unknown nodes
        }
    }

    Ok(config)
}

fn parse_host(node: &KdlNode) -> ConfigResult<HostConfig> {
    let host = get_first_string_arg(node)
        .ok_or_else(|| ConfigError::MissingField("host name".to_string()))?;

    let mut token = get_string_prop(node, "token");
    let mut api_url = get_string_prop(node, "api-url");

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "token" => token = get_first_string_arg(child),
                "api-url" => api_url = get_first_string_arg(child),
                _ => {}
            }
        }
    }

    if let Some(url) = &api_url {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                field: "api-url".to_string(),
                message: format!("expected an http(s) URL, got {}", url),
            });
        }
    }

    Ok(HostConfig {
        host: host.to_lowercase(),
        token,
        api_url,
    })
}

fn get_first_string_arg(node: &KdlNode) -> Option<String> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

fn get_string_prop(node: &KdlNode, name: &str) -> Option<String> {
    node.get(name)
        .and_then(|v| v.as_string())
        .map(|s| s.to_string())
}
