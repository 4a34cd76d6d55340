//! Hosts file location configuration.

use std::path::{Path, PathBuf};

/// Default system hosts file.
pub const DEFAULT_HOSTS_PATH: &str = "/etc/hosts";

/// Where the managed hosts file lives and where replacements are staged.
///
/// # Example
///
/// ```
/// use redirector_hosts::HostsConfig;
///
/// let config = HostsConfig::new()
///     .with_hosts_path("/tmp/hosts")
///     .with_temp_dir("/tmp");
///
/// assert_eq!(config.hosts_path.to_str(), Some("/tmp/hosts"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostsConfig {
    /// The hosts file holding the managed block.
    pub hosts_path: PathBuf,

    /// Preferred staging directory for the replacement file. Only used when
    /// it lives on the same device as the hosts file's directory.
    pub temp_dir: PathBuf,
}

impl HostsConfig {
    /// Creates a config for `/etc/hosts` and the system temp directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            hosts_path: PathBuf::from(DEFAULT_HOSTS_PATH),
            temp_dir: std::env::temp_dir(),
        }
    }

    /// Overrides the hosts file path.
    #[must_use]
    pub fn with_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.hosts_path = path.into();
        self
    }

    /// Overrides the preferred staging directory.
    #[must_use]
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = dir.into();
        self
    }

    /// Directory containing the hosts file.
    #[must_use]
    pub fn hosts_dir(&self) -> &Path {
        match self.hosts_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl Default for HostsConfig {
    fn default() -> Self {
        Self::new()
    }
}
