//! Insertion-ordered hostname → IP table.

use indexmap::IndexMap;

/// Hostname → IP mapping that remembers insertion order.
///
/// The order decides the line order of the rendered block, so reloading a
/// block and rendering it again yields the same bytes.
///
/// # Example
///
/// ```
/// use redirector_hosts::EntryTable;
///
/// let mut table = EntryTable::new();
/// table.insert("b.local", "10.0.0.2");
/// table.insert("a.local", "10.0.0.1");
///
/// let hosts: Vec<_> = table.hostnames().collect();
/// assert_eq!(hosts, ["b.local", "a.local"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EntryTable {
    entries: IndexMap<String, String>,
}

impl EntryTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Returns the IP stored for `hostname`.
    #[must_use]
    pub fn get(&self, hostname: &str) -> Option<&str> {
        self.entries.get(hostname).map(String::as_str)
    }

    /// Returns `true` if `hostname` has an entry.
    #[must_use]
    pub fn contains(&self, hostname: &str) -> bool {
        self.entries.contains_key(hostname)
    }

    /// Sets the IP for `hostname`, returning the previous IP.
    ///
    /// An existing hostname keeps its position; a new one is appended.
    pub fn insert(&mut self, hostname: impl Into<String>, ip: impl Into<String>) -> Option<String> {
        self.entries.insert(hostname.into(), ip.into())
    }

    /// Removes `hostname`, returning its IP. Order of the rest is kept.
    pub fn remove(&mut self, hostname: &str) -> Option<String> {
        self.entries.shift_remove(hostname)
    }

    /// Keeps only the entries whose hostname satisfies `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.entries.retain(|hostname, _| keep(hostname));
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterates `(hostname, ip)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(h, ip)| (h.as_str(), ip.as_str()))
    }

    /// Iterates hostnames in insertion order.
    pub fn hostnames(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Length of the longest stored IP, or `None` for an empty table.
    #[must_use]
    pub fn longest_ip(&self) -> Option<usize> {
        self.entries.values().map(String::len).max()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Two tables are equal only if they hold the same pairs in the same order.
impl PartialEq for EntryTable {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl Eq for EntryTable {}

impl<H: Into<String>, I: Into<String>> FromIterator<(H, I)> for EntryTable {
    fn from_iter<T: IntoIterator<Item = (H, I)>>(iter: T) -> Self {
        let mut table = Self::new();
        for (hostname, ip) in iter {
            table.insert(hostname, ip);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_position_of_existing_key() {
        let mut t = EntryTable::new();
        assert_eq!(t.insert("a", "1.1.1.1"), None);
        assert_eq!(t.insert("b", "2.2.2.2"), None);
        assert_eq!(t.insert("a", "3.3.3.3"), Some("1.1.1.1".to_string()));

        let pairs: Vec<_> = t.iter().collect();
        assert_eq!(pairs, [("a", "3.3.3.3"), ("b", "2.2.2.2")]);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn remove_and_retain() {
        let mut t: EntryTable = [("a", "1.1.1.1"), ("b", "2.2.2.2"), ("c", "3.3.3.3")]
            .into_iter()
            .collect();

        assert_eq!(t.remove("b"), Some("2.2.2.2".to_string()));
        assert_eq!(t.remove("b"), None);
        assert_eq!(t.hostnames().collect::<Vec<_>>(), ["a", "c"]);

        t.retain(|h| h == "c");
        assert_eq!(t.get("c"), Some("3.3.3.3"));
        assert!(!t.contains("a"));

        t.clear();
        assert!(t.is_empty());
    }

    #[test]
    fn equality_depends_on_order() {
        let ab: EntryTable = [("a", "1.1.1.1"), ("b", "2.2.2.2")].into_iter().collect();
        let ba: EntryTable = [("b", "2.2.2.2"), ("a", "1.1.1.1")].into_iter().collect();
        assert_ne!(ab, ba);
        assert_eq!(ab, ab.clone());
    }

    #[test]
    fn longest_ip() {
        assert_eq!(EntryTable::new().longest_ip(), None);
        let t: EntryTable = [("a", "10.0.0.5"), ("b", "fe80::1:2:3")].into_iter().collect();
        assert_eq!(t.longest_ip(), Some(11));
    }
}
