//! # redirector-hosts
//!
//! Publish the currently selected backend of each logical service hostname
//! through a managed block of the system hosts file.
//!
//! A health checker decides which backend is healthy; this crate records
//! that decision as `<ip>  <hostname>` lines between two marker comments in
//! `/etc/hosts`, so every client on the machine reaches the selected backend
//! through normal name resolution.
//!
//! ```text
//! 127.0.0.1 localhost
//! # BEGIN REDIRECTOR MANAGED BLOCK
//! 10.0.0.5  svc.local
//! # END REDIRECTOR MANAGED BLOCK
//! ```
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use redirector_hosts::HostsManager;
//!
//! let mut hosts = HostsManager::new();
//!
//! // Adopt the block left by a previous run. Corruption is fatal here.
//! hosts.load_persisted_entries()?;
//!
//! // Feed health-check decisions. Unchanged IPs do not touch the file.
//! hosts.upsert_entry("svc.local", "backend-1.example.com")?;
//! hosts.remove_unexpected_entries(&["svc.local"])?;
//!
//! // Restore the file on shutdown.
//! hosts.remove_managed_block()?;
//! ```
//!
//! ## Safety of the hosts file
//!
//! Every rewrite goes through a temporary file that receives the original
//! mode, owner and group and is then renamed over the hosts file. Lines
//! outside the managed block are preserved byte for byte. A file with only
//! one marker, misordered markers or a malformed entry line is reported as
//! an error and never repaired automatically.
//!
//! ## Permissions
//!
//! Rewriting `/etc/hosts` and preserving its ownership requires root. The
//! caller is responsible for privilege elevation.

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod block;
pub mod config;
pub mod entry_table;
pub mod error;
pub mod hosts_manager;
pub mod resolve;
pub mod util;
pub mod writer;

pub use block::{BEGIN_MARKER, END_MARKER, HostsFile, render_block};
pub use config::HostsConfig;
pub use entry_table::EntryTable;
pub use error::{HostsError, Result};
pub use hosts_manager::HostsManager;
pub use resolve::{AddressResolver, SystemResolver};
pub use writer::write_atomic;
