//! Internal utilities.

use std::os::unix::fs::MetadataExt;
use std::path::Path;

/// Returns `true` if both paths live on the same device.
///
/// Either path failing to stat counts as "not the same device".
#[must_use]
pub fn same_device(a: &Path, b: &Path) -> bool {
    match (std::fs::metadata(a), std::fs::metadata(b)) {
        (Ok(a), Ok(b)) => a.dev() == b.dev(),
        _ => false,
    }
}

/// Effective user id of the current process.
#[must_use]
pub fn effective_uid() -> u32 {
    // SAFETY: `geteuid` has no preconditions and cannot fail.
    unsafe { libc::geteuid() }
}
