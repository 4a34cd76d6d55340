//! Error types.

use thiserror::Error;

/// Result alias for hosts file operations.
pub type Result<T> = std::result::Result<T, HostsError>;

/// Errors returned by hosts file operations.
#[derive(Debug, Error)]
pub enum HostsError {
    /// Only one of the BEGIN/END markers is present in the hosts file.
    #[error("only the {found} marker was found in the hosts file")]
    MarkerMismatch {
        /// Which marker was found (`"BEGIN"` or `"END"`).
        found: &'static str,
    },

    /// A marker appears more than once.
    #[error("the {marker} marker was found more than once in the hosts file")]
    DuplicateMarker {
        /// Which marker was repeated (`"BEGIN"` or `"END"`).
        marker: &'static str,
    },

    /// The END marker appears before the BEGIN marker.
    #[error("the END marker (line {end}) was found before the BEGIN marker (line {begin})")]
    MarkerOrder {
        /// 1-based line number of the BEGIN marker.
        begin: usize,
        /// 1-based line number of the END marker.
        end: usize,
    },

    /// A line inside the managed block is not `<ip> <hostname>`.
    #[error("failed to parse managed block line {line_number}: {line:?}")]
    Parse {
        /// 1-based line number in the hosts file.
        line_number: usize,
        /// The offending line, without its terminator.
        line: String,
    },

    /// The owner/group of the replacement file could not be set.
    #[error("failed to change owner/group of temporary hosts file {path} to {uid}:{gid}: {source}")]
    Ownership {
        /// Path of the temporary file.
        path: String,
        /// Owner that was being applied.
        uid: u32,
        /// Group that was being applied.
        gid: u32,
        /// Underlying error (usually `PermissionDenied`).
        #[source]
        source: std::io::Error,
    },

    /// A backend address could not be resolved to an IP.
    #[error("failed to resolve backend address {address}: {source}")]
    Resolve {
        /// The address handed to the resolver.
        address: String,
        /// Underlying resolver error.
        #[source]
        source: std::io::Error,
    },

    /// Filesystem I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HostsError {
    /// Returns `true` if the failure stems from missing privileges.
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Self::Ownership { .. } => true,
            Self::Io(e) => e.kind() == std::io::ErrorKind::PermissionDenied,
            _ => false,
        }
    }

    /// Returns `true` if the existing managed block is corrupt.
    ///
    /// A daemon should refuse to start on these, since the current state of
    /// the block cannot be trusted.
    #[must_use]
    pub const fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::MarkerMismatch { .. }
                | Self::DuplicateMarker { .. }
                | Self::MarkerOrder { .. }
                | Self::Parse { .. }
        )
    }
}
