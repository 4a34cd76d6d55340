//! Managed block parsing and rendering.
//!
//! The managed block is the run of lines between [`BEGIN_MARKER`] and
//! [`END_MARKER`]. Everything before (prefix) and after (suffix) belongs to
//! whoever else edits the hosts file and is carried through untouched.
//!
//! ```text
//! 127.0.0.1 localhost
//! # BEGIN REDIRECTOR MANAGED BLOCK
//! 10.0.0.5    svc.local
//! 10.0.10.17  api.local
//! # END REDIRECTOR MANAGED BLOCK
//! ```

use crate::entry_table::EntryTable;
use crate::error::{HostsError, Result};

/// First line of the managed block.
pub const BEGIN_MARKER: &str = "# BEGIN REDIRECTOR MANAGED BLOCK\n";

/// Last line of the managed block.
pub const END_MARKER: &str = "# END REDIRECTOR MANAGED BLOCK\n";

/// Spaces between the longest IP and its hostname.
const MIN_COLUMN_GAP: usize = 2;

/// A hosts file split into lines, with the managed block located.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostsFile {
    /// Lines including their `\n` terminator (the last may lack one).
    lines: Vec<String>,
    /// Indexes of the BEGIN and END markers.
    block: Option<(usize, usize)>,
}

impl HostsFile {
    /// Splits `content` into lines and validates the markers.
    ///
    /// Lines outside the block are never inspected beyond marker matching.
    ///
    /// # Errors
    ///
    /// - [`HostsError::MarkerMismatch`] if only one marker is present.
    /// - [`HostsError::DuplicateMarker`] if a marker appears twice.
    /// - [`HostsError::MarkerOrder`] if END precedes BEGIN.
    pub fn parse(content: &str) -> Result<Self> {
        let lines: Vec<String> = content.split_inclusive('\n').map(str::to_owned).collect();

        let mut begin = None;
        let mut end = None;
        for (i, line) in lines.iter().enumerate() {
            if line == BEGIN_MARKER {
                if begin.replace(i).is_some() {
                    return Err(HostsError::DuplicateMarker { marker: "BEGIN" });
                }
            } else if line == END_MARKER && end.replace(i).is_some() {
                return Err(HostsError::DuplicateMarker { marker: "END" });
            }
        }

        let block = match (begin, end) {
            (None, None) => None,
            (Some(_), None) => return Err(HostsError::MarkerMismatch { found: "BEGIN" }),
            (None, Some(_)) => return Err(HostsError::MarkerMismatch { found: "END" }),
            (Some(b), Some(e)) if b > e => {
                return Err(HostsError::MarkerOrder {
                    begin: b + 1,
                    end: e + 1,
                });
            }
            (Some(b), Some(e)) => Some((b, e)),
        };

        Ok(Self { lines, block })
    }

    /// Returns `true` if the file contains a managed block.
    #[must_use]
    pub const fn has_block(&self) -> bool {
        self.block.is_some()
    }

    /// Parses the entry lines of the managed block, in file order.
    ///
    /// Returns an empty table when no block exists.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::Parse`] for a line that is not `<ip> <hostname>`.
    pub fn entries(&self) -> Result<EntryTable> {
        let mut table = EntryTable::new();
        let Some((begin, end)) = self.block else {
            return Ok(table);
        };

        for (i, line) in self.lines[begin + 1..end].iter().enumerate() {
            let (ip, hostname) = parse_entry_line(line).ok_or_else(|| HostsError::Parse {
                line_number: begin + i + 2,
                line: line.trim_end_matches('\n').to_owned(),
            })?;
            table.insert(hostname, ip);
        }
        Ok(table)
    }

    /// Full file content with the block replaced by `block`.
    ///
    /// An existing block is replaced in place. Without one, `block` is
    /// appended, terminating the previous last line if needed.
    #[must_use]
    pub fn with_block(&self, block: &[String]) -> String {
        let (head, tail) = match self.block {
            Some((begin, end)) => (&self.lines[..begin], &self.lines[end + 1..]),
            None => (&self.lines[..], &[][..]),
        };

        let mut out: String = head.concat();
        if self.block.is_none() && !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.extend(block.iter().map(String::as_str));
        out.extend(tail.iter().map(String::as_str));
        out
    }

    /// Full file content with the block (markers included) removed.
    #[must_use]
    pub fn without_block(&self) -> String {
        match self.block {
            Some((begin, end)) => self.lines[..begin]
                .iter()
                .chain(&self.lines[end + 1..])
                .map(String::as_str)
                .collect(),
            None => self.lines.concat(),
        }
    }
}

/// Matches `<ip><one or more spaces><hostname>\n`.
fn parse_entry_line(line: &str) -> Option<(&str, &str)> {
    let line = line.strip_suffix('\n')?;
    let (ip, rest) = line.split_once(' ')?;
    let hostname = rest.trim_start_matches(' ');
    if ip.is_empty() || hostname.is_empty() {
        return None;
    }
    Some((ip, hostname))
}

/// Renders `table` as block lines, markers included.
///
/// IPs are left-justified to [`MIN_COLUMN_GAP`] past the longest IP. An
/// empty table renders just the two markers.
#[must_use]
pub fn render_block(table: &EntryTable) -> Vec<String> {
    let mut block = Vec::with_capacity(table.len() + 2);
    block.push(BEGIN_MARKER.to_owned());
    if let Some(longest) = table.longest_ip() {
        let width = longest + MIN_COLUMN_GAP;
        block.extend(
            table
                .iter()
                .map(|(hostname, ip)| format!("{ip:<width$}{hostname}\n")),
        );
    }
    block.push(END_MARKER.to_owned());
    block
}
