//! Reconciliation of the managed block against desired backend state.

use crate::block::{HostsFile, render_block};
use crate::config::HostsConfig;
use crate::entry_table::EntryTable;
use crate::error::{HostsError, Result};
use crate::resolve::{AddressResolver, SystemResolver};
use crate::writer::write_atomic;
use std::collections::HashSet;

/// Owns the hostname → IP table and the managed block of the hosts file.
///
/// # Lifecycle
///
/// 1. [`load_persisted_entries`](Self::load_persisted_entries) adopts the
///    block left by a previous run.
/// 2. [`upsert_entry`](Self::upsert_entry) and
///    [`remove_unexpected_entries`](Self::remove_unexpected_entries) are fed
///    the decisions of the health checker.
/// 3. [`remove_managed_block`](Self::remove_managed_block) restores the file
///    on shutdown.
///
/// The file is only rewritten when the table actually changes, and the
/// table is only changed once the rewrite has succeeded.
///
/// # Concurrency
///
/// All methods take `&mut self` and perform blocking I/O (and, for upserts,
/// a blocking name lookup). Callers with several health-check workers must
/// funnel their results through the single owner of this value. No file
/// lock is taken, so a concurrent external edit of the hosts file may be
/// overwritten.
///
/// # Example
///
/// ```rust,ignore
/// use redirector_hosts::HostsManager;
///
/// let mut hosts = HostsManager::new();
/// hosts.load_persisted_entries()?;
/// hosts.upsert_entry("svc.local", "backend-1.example.com")?;
/// hosts.remove_unexpected_entries(&["svc.local"])?;
/// // ...
/// hosts.remove_managed_block()?;
/// ```
#[derive(Debug)]
pub struct HostsManager<R = SystemResolver> {
    config: HostsConfig,
    resolver: R,
    entries: EntryTable,
    rewrites: u64,
}

impl HostsManager {
    /// Creates a manager for `/etc/hosts` using the system resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(HostsConfig::new(), SystemResolver)
    }
}

impl Default for HostsManager {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: AddressResolver> HostsManager<R> {
    /// Creates a manager with an explicit config and resolver.
    #[must_use]
    pub fn with_config(config: HostsConfig, resolver: R) -> Self {
        Self {
            config,
            resolver,
            entries: EntryTable::new(),
            rewrites: 0,
        }
    }

    /// Current hostname → IP table.
    #[must_use]
    pub const fn entries(&self) -> &EntryTable {
        &self.entries
    }

    /// Hosts file location this manager writes to.
    #[must_use]
    pub const fn config(&self) -> &HostsConfig {
        &self.config
    }

    /// Number of successful hosts file rewrites made by this manager.
    #[must_use]
    pub const fn rewrite_count(&self) -> u64 {
        self.rewrites
    }

    /// Returns `true` if the hosts file currently contains a managed block.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::Io`] if the file cannot be read, or a marker
    /// error if the markers are inconsistent.
    pub fn is_block_present(&self) -> Result<bool> {
        Ok(self.read_hosts_file()?.has_block())
    }

    /// Adopts the entries of an existing managed block, in file order.
    ///
    /// Does nothing if the file has no block. Never writes the file.
    ///
    /// # Errors
    ///
    /// Returns a marker or [`HostsError::Parse`] error if the block is
    /// corrupt (see [`HostsError::is_corruption`]), or [`HostsError::Io`] if
    /// the file cannot be read.
    pub fn load_persisted_entries(&mut self) -> Result<()> {
        let file = self.read_hosts_file()?;
        if !file.has_block() {
            tracing::debug!(
                path = %self.config.hosts_path.display(),
                "No managed block to adopt"
            );
            return Ok(());
        }

        let persisted = file.entries()?;
        for (hostname, ip) in persisted.iter() {
            self.entries.insert(hostname, ip);
        }
        tracing::info!(
            path = %self.config.hosts_path.display(),
            count = persisted.len(),
            "Adopted persisted hosts entries"
        );
        Ok(())
    }

    /// Points `hostname` at the IP `backend` resolves to.
    ///
    /// `backend` is always resolved. The file is rewritten only if
    /// `hostname` is new or its IP changed. Returns `true` if a rewrite
    /// happened.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::Resolve`] if `backend` cannot be resolved, or
    /// any read/write error of the rewrite. The table is unchanged on error.
    pub fn upsert_entry(&mut self, hostname: &str, backend: &str) -> Result<bool> {
        let ip = self
            .resolver
            .resolve(backend)
            .map_err(|source| HostsError::Resolve {
                address: backend.to_string(),
                source,
            })?
            .to_string();

        if self.entries.get(hostname) == Some(ip.as_str()) {
            tracing::debug!(hostname = %hostname, ip = %ip, "Hosts entry unchanged");
            return Ok(false);
        }

        let mut next = self.entries.clone();
        let previous = next.insert(hostname, ip.as_str());
        self.commit(next)?;

        tracing::info!(
            hostname = %hostname,
            backend = %backend,
            ip = %ip,
            previous = previous.as_deref().unwrap_or("-"),
            "Updated hosts entry"
        );
        Ok(true)
    }

    /// Drops every entry whose hostname is not in `expected`.
    ///
    /// Returns the number of entries removed. The file is not touched when
    /// nothing is removed.
    ///
    /// # Errors
    ///
    /// Returns any read/write error of the rewrite. The table is unchanged
    /// on error.
    pub fn remove_unexpected_entries<S: AsRef<str>>(&mut self, expected: &[S]) -> Result<usize> {
        let expected: HashSet<&str> = expected.iter().map(AsRef::as_ref).collect();
        let unexpected: Vec<String> = self
            .entries
            .hostnames()
            .filter(|h| !expected.contains(h))
            .map(str::to_owned)
            .collect();

        if unexpected.is_empty() {
            tracing::debug!("No unexpected hosts entries");
            return Ok(0);
        }

        let mut next = self.entries.clone();
        next.retain(|h| expected.contains(h));
        self.commit(next)?;

        tracing::info!(removed = ?unexpected, "Removed unexpected hosts entries");
        Ok(unexpected.len())
    }

    /// Deletes the managed block, markers included, from the hosts file.
    ///
    /// The in-memory table is cleared as well, so a later upsert in the same
    /// process recreates the block. Returns `true` if the file was rewritten.
    ///
    /// # Errors
    ///
    /// Returns a marker error if the markers are inconsistent, or any
    /// read/write error of the rewrite.
    pub fn remove_managed_block(&mut self) -> Result<bool> {
        let file = self.read_hosts_file()?;
        if !file.has_block() {
            tracing::debug!(
                path = %self.config.hosts_path.display(),
                "No managed block to remove"
            );
            self.entries.clear();
            return Ok(false);
        }

        self.write(&file.without_block())?;
        self.entries.clear();
        tracing::info!(
            path = %self.config.hosts_path.display(),
            "Removed managed block"
        );
        Ok(true)
    }

    /// Writes `next` to the file, then makes it the current table.
    ///
    /// An empty table removes the block altogether.
    fn commit(&mut self, next: EntryTable) -> Result<()> {
        let file = self.read_hosts_file()?;
        let content = if next.is_empty() {
            file.without_block()
        } else {
            file.with_block(&render_block(&next))
        };

        self.write(&content)?;
        self.entries = next;
        Ok(())
    }

    fn write(&mut self, content: &str) -> Result<()> {
        if let Err(e) = write_atomic(&self.config, content) {
            tracing::warn!(
                path = %self.config.hosts_path.display(),
                error = %e,
                "Failed to rewrite hosts file"
            );
            return Err(e);
        }
        self.rewrites += 1;
        Ok(())
    }

    fn read_hosts_file(&self) -> Result<HostsFile> {
        let content = std::fs::read_to_string(&self.config.hosts_path)?;
        HostsFile::parse(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{BEGIN_MARKER, END_MARKER};
    use std::cell::Cell;
    use std::io;
    use std::net::IpAddr;
    use std::path::Path;
    use std::rc::Rc;

    type FixedResolver = Box<dyn Fn(&str) -> io::Result<IpAddr>>;

    /// Resolver mapping `backend-N` to `10.0.0.N`, counting calls.
    fn counting_resolver() -> (FixedResolver, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let resolver: FixedResolver = Box::new(move |addr: &str| -> io::Result<IpAddr> {
            counter.set(counter.get() + 1);
            addr.strip_prefix("backend-")
                .map(|n| format!("10.0.0.{n}"))
                .or_else(|| addr.parse::<IpAddr>().ok().map(|ip| ip.to_string()))
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
        });
        (resolver, calls)
    }

    fn manager(dir: &Path, content: &str) -> (HostsManager<FixedResolver>, Rc<Cell<usize>>) {
        let hosts = dir.join("hosts");
        std::fs::write(&hosts, content).unwrap();
        let (resolver, calls) = counting_resolver();
        let config = HostsConfig::new()
            .with_hosts_path(hosts)
            .with_temp_dir(dir);
        (HostsManager::with_config(config, resolver), calls)
    }

    fn read(m: &HostsManager<FixedResolver>) -> String {
        std::fs::read_to_string(&m.config().hosts_path).unwrap()
    }

    #[test]
    fn upsert_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let (mut m, calls) = manager(dir.path(), "127.0.0.1 localhost\n");

        assert!(m.upsert_entry("svc.local", "backend-5").unwrap());
        assert!(!m.upsert_entry("svc.local", "backend-5").unwrap());

        assert_eq!(calls.get(), 2);
        assert_eq!(m.rewrite_count(), 1);
        assert_eq!(
            read(&m),
            format!("127.0.0.1 localhost\n{BEGIN_MARKER}10.0.0.5  svc.local\n{END_MARKER}")
        );
    }

    #[test]
    fn upsert_changed_ip_rewrites_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let (mut m, _) = manager(dir.path(), "");

        m.upsert_entry("a.local", "backend-1").unwrap();
        m.upsert_entry("b.local", "backend-2").unwrap();
        m.upsert_entry("a.local", "10.0.100.1").unwrap();

        assert_eq!(m.rewrite_count(), 3);
        assert_eq!(
            read(&m),
            format!("{BEGIN_MARKER}10.0.100.1  a.local\n10.0.0.2    b.local\n{END_MARKER}")
        );
    }

    #[test]
    fn resolve_failure_leaves_everything_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let (mut m, _) = manager(dir.path(), "127.0.0.1 localhost\n");

        let err = m.upsert_entry("svc.local", "nowhere").unwrap_err();
        assert!(matches!(err, HostsError::Resolve { .. }));
        assert!(m.entries().is_empty());
        assert_eq!(m.rewrite_count(), 0);
        assert_eq!(read(&m), "127.0.0.1 localhost\n");
    }

    #[test]
    fn failed_write_keeps_table() {
        let dir = tempfile::tempdir().unwrap();
        let (mut m, _) = manager(dir.path(), "");
        m.upsert_entry("a.local", "backend-1").unwrap();

        std::fs::remove_file(&m.config().hosts_path).unwrap();
        assert!(m.upsert_entry("a.local", "backend-2").is_err());
        assert_eq!(m.entries().get("a.local"), Some("10.0.0.1"));
        assert_eq!(m.rewrite_count(), 1);
    }

    #[test]
    fn prune_keeps_expected() {
        let dir = tempfile::tempdir().unwrap();
        let (mut m, _) = manager(dir.path(), "");
        m.upsert_entry("a", "1.1.1.1").unwrap();
        m.upsert_entry("b", "2.2.2.2").unwrap();

        assert_eq!(m.remove_unexpected_entries(&["a"]).unwrap(), 1);
        assert_eq!(m.entries().iter().collect::<Vec<_>>(), [("a", "1.1.1.1")]);
        assert_eq!(read(&m), format!("{BEGIN_MARKER}1.1.1.1  a\n{END_MARKER}"));

        let rewrites = m.rewrite_count();
        assert_eq!(m.remove_unexpected_entries(&["a", "c"]).unwrap(), 0);
        assert_eq!(m.rewrite_count(), rewrites);
    }

    #[test]
    fn prune_to_empty_removes_block() {
        let dir = tempfile::tempdir().unwrap();
        let (mut m, _) = manager(dir.path(), "127.0.0.1 localhost\n");
        m.upsert_entry("a", "1.1.1.1").unwrap();

        let none: [&str; 0] = [];
        assert_eq!(m.remove_unexpected_entries(&none).unwrap(), 1);
        assert!(m.entries().is_empty());
        assert_eq!(read(&m), "127.0.0.1 localhost\n");
    }

    #[test]
    fn remove_block_clears_table_and_allows_recreation() {
        let dir = tempfile::tempdir().unwrap();
        let (mut m, _) = manager(dir.path(), "127.0.0.1 localhost\n");
        m.upsert_entry("svc.local", "backend-5").unwrap();

        assert!(m.remove_managed_block().unwrap());
        assert!(m.entries().is_empty());
        assert_eq!(read(&m), "127.0.0.1 localhost\n");
        assert!(!m.remove_managed_block().unwrap());

        assert!(m.upsert_entry("svc.local", "backend-5").unwrap());
        assert!(m.is_block_present().unwrap());
    }

    #[test]
    fn load_adopts_block_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let content = format!(
            "127.0.0.1 localhost\n{BEGIN_MARKER}10.0.0.2  b.local\n10.0.0.1  a.local\n{END_MARKER}"
        );
        let (mut m, _) = manager(dir.path(), &content);

        m.load_persisted_entries().unwrap();
        assert_eq!(
            m.entries().hostnames().collect::<Vec<_>>(),
            ["b.local", "a.local"]
        );
        assert_eq!(m.rewrite_count(), 0);

        assert!(!m.upsert_entry("a.local", "backend-1").unwrap());
        assert_eq!(read(&m), content);
    }

    #[test]
    fn load_rejects_corrupt_block() {
        let dir = tempfile::tempdir().unwrap();
        let (mut m, _) = manager(dir.path(), &format!("127.0.0.1 localhost\n{BEGIN_MARKER}"));
        let err = m.load_persisted_entries().unwrap_err();
        assert!(matches!(err, HostsError::MarkerMismatch { .. }));
        assert!(err.is_corruption());
    }
}
