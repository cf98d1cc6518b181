//! Command-line configuration.
//!
//! Flags win over environment variables (handled by clap), which win over the
//! KDL configuration file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use ghrun_config::{FileConfig, HostConfig, default_config_path};

/// Options shared by every command.
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// Select another repository using the [HOST/]OWNER/REPO format
    #[arg(short = 'R', long, env = "GH_REPO", global = true)]
    pub repo: Option<String>,

    /// Override the REST API base URL
    #[arg(long, env = "GHRUN_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Authentication token (falls back to GITHUB_TOKEN)
    #[arg(long, env = "GH_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Path to the configuration file
    #[arg(long, env = "GHRUN_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Resolved configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Repository named on the command line, unparsed.
    pub repo: Option<String>,
    pub api_url: Option<String>,
    pub token: Option<String>,
    pub file: FileConfig,
}

impl Config {
    /// Read the configuration file and merge it with the command-line options.
    pub fn load(args: &GlobalArgs) -> Result<Self> {
        // Only the default location may be absent.
        let file = match (&args.config, default_config_path()) {
            (Some(path), _) => FileConfig::read(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            (None, Some(path)) => FileConfig::load(&path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            (None, None) => FileConfig::default(),
        };
        let fallback_token = std::env::var("GITHUB_TOKEN").ok();
        Ok(Self::new(args, file, fallback_token))
    }

    pub fn new(args: &GlobalArgs, file: FileConfig, fallback_token: Option<String>) -> Self {
        let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());
        Self {
            repo: non_empty(&args.repo),
            api_url: non_empty(&args.api_url),
            token: non_empty(&args.token).or_else(|| non_empty(&fallback_token)),
            file,
        }
    }

    /// Settings from the configuration file for `host`.
    pub fn host(&self, host: &str) -> Option<&HostConfig> {
        self.file.host(host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ghrun_config::parse_config;

    #[test]
    fn test_flags_win_over_fallback_token() {
        let args = GlobalArgs {
            token: Some("flag".to_string()),
            ..GlobalArgs::default()
        };
        let config = Config::new(&args, FileConfig::default(), Some("env".to_string()));
        assert_eq!(config.token.as_deref(), Some("flag"));
    }

    #[test]
    fn test_fallback_token() {
        let config = Config::new(
            &GlobalArgs::default(),
            FileConfig::default(),
            Some("env".to_string()),
        );
        assert_eq!(config.token.as_deref(), Some("env"));

        let config = Config::new(
            &GlobalArgs::default(),
            FileConfig::default(),
            Some("  ".to_string()),
        );
        assert!(config.token.is_none());
    }

    #[test]
    fn test_empty_values_are_ignored() {
        let args = GlobalArgs {
            repo: Some(String::new()),
            api_url: Some(" ".to_string()),
            ..GlobalArgs::default()
        };
        let config = Config::new(&args, FileConfig::default(), None);
        assert!(config.repo.is_none());
        assert!(config.api_url.is_none());
    }

    #[test]
    fn test_host_lookup() {
        let file = parse_config(r#"host "github.com" token="from-file""#).unwrap();
        let config = Config::new(&GlobalArgs::default(), file, None);
        assert_eq!(
            config.host("github.com").unwrap().token.as_deref(),
            Some("from-file")
        );
        assert!(config.host("ghe.example.com").is_none());
    }

    #[test]
    fn test_explicit_config_path_must_exist() {
        let path = std::env::temp_dir().join("ghrun-cli-test-missing-config.kdl");
        let args = GlobalArgs {
            config: Some(path.clone()),
            ..GlobalArgs::default()
        };
        let err = Config::load(&args).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("failed to load config {}", path.display())
        );
    }

    #[test]
    fn test_explicit_config_path_is_read() {
        let path = std::env::temp_dir().join("ghrun-cli-test-explicit-config.kdl");
        std::fs::write(&path, r#"default-repo "cli/cli""#).unwrap();
        let args = GlobalArgs {
            config: Some(path.clone()),
            ..GlobalArgs::default()
        };
        let config = Config::load(&args).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.file.default_repo.unwrap().full_name(), "cli/cli");
    }
}
