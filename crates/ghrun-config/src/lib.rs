//! KDL configuration parsing for ghrun.
//!
//! The configuration file names hosts, their tokens and API endpoints, and an
//! optional default repository.

pub mod error;
pub mod file;

pub use error::{ConfigError, ConfigResult};
pub use file::{FileConfig, HostConfig, default_config_path, parse_config};
