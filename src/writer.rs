//! Atomic hosts file replacement.
//!
//! The new content is staged in a temporary file that gets the target's
//! mode, owner and group, then renamed over the target. Readers see either
//! the old file or the new one, never a partial write.
//!
//! The rename is only atomic within one filesystem, so the staging
//! directory is the configured temp directory when it shares a device with
//! the hosts file's directory, and the hosts file's directory otherwise
//! (with a hidden file name).
//!
//! No lock is taken: a concurrent external edit may be overwritten.

use crate::config::HostsConfig;
use crate::error::{HostsError, Result};
use crate::util::same_device;
use std::io::Write;
use std::os::unix::fs::{MetadataExt, PermissionsExt, fchown};
use std::path::Path;

/// Temp file prefix inside the temp directory.
const TEMP_PREFIX: &str = "redirector_tmp_";

/// Temp file prefix inside the hosts file's own directory.
const HIDDEN_TEMP_PREFIX: &str = ".redirector_tmp_";

/// Picks the staging directory and file prefix for a replacement file.
#[must_use]
pub fn temp_dir_for(config: &HostsConfig) -> (&Path, &'static str) {
    let hosts_dir = config.hosts_dir();
    if same_device(&config.temp_dir, hosts_dir) {
        (config.temp_dir.as_path(), TEMP_PREFIX)
    } else {
        (hosts_dir, HIDDEN_TEMP_PREFIX)
    }
}

/// Replaces the hosts file with `content`, preserving mode, owner and group.
///
/// On any failure before the rename the temporary file is removed and the
/// hosts file is left as it was.
///
/// # Errors
///
/// - [`HostsError::Ownership`] if the owner/group cannot be applied for lack
///   of privilege.
/// - [`HostsError::Io`] if the hosts file cannot be stat'ed, or the
///   temporary file cannot be created, written or renamed.
pub fn write_atomic(config: &HostsConfig, content: &str) -> Result<()> {
    let target = &config.hosts_path;
    let meta = std::fs::metadata(target)?;
    let mode = meta.mode() & 0o7777;
    let (uid, gid) = (meta.uid(), meta.gid());

    let (dir, prefix) = temp_dir_for(config);
    let mut tmp = tempfile::Builder::new().prefix(prefix).tempfile_in(dir)?;
    tracing::debug!(
        path = %target.display(),
        temp = %tmp.path().display(),
        "Staging hosts file replacement"
    );

    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;

    tmp.as_file().set_permissions(std::fs::Permissions::from_mode(mode))?;
    fchown(tmp.as_file(), Some(uid), Some(gid)).map_err(|e| {
        if e.kind() == std::io::ErrorKind::PermissionDenied {
            HostsError::Ownership {
                path: tmp.path().display().to_string(),
                uid,
                gid,
                source: e,
            }
        } else {
            HostsError::Io(e)
        }
    })?;

    tmp.persist(target).map_err(|e| HostsError::Io(e.error))?;
    Ok(())
}
