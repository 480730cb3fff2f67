//! Plain-text report.
//!
//! ```text
//! Duplicate files:
//! 3a7bd3e2360a3d29eea436fcfb7e44c735d117c42d1c1835420b6b9942dd4f1b
//!   ./a.txt
//!   ./sub/c.txt
//!
//! Files scanned: 3
//! Files hashed: 3
//! Unique content hashes: 2
//! Directories discovered: 1
//! ```

use std::io::{self, Write};

use super::RunSummary;
use crate::duplicates::DigestGroups;

/// Human-readable duplicate table plus summary.
#[derive(Debug)]
pub struct TextReport<'a> {
    groups: &'a DigestGroups,
    summary: &'a RunSummary,
}

impl<'a> TextReport<'a> {
    #[must_use]
    pub fn new(groups: &'a DigestGroups, summary: &'a RunSummary) -> Self {
        Self { groups, summary }
    }

    /// Write the report.
    ///
    /// # Errors
    ///
    /// Returns any error from `writer`.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.write_groups(writer)?;
        self.write_plan(writer)?;
        self.write_summary(writer)
    }

    fn write_groups<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        if self.groups.is_empty() {
            writeln!(writer, "No duplicate files found.")?;
            return writeln!(writer);
        }

        writeln!(writer, "Duplicate files:")?;
        for (digest, paths) in self.groups.iter() {
            writeln!(writer, "{digest}")?;
            for path in paths {
                writeln!(writer, "  {}", path.display())?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }

    fn write_plan<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        if self.summary.planned_links.is_empty() {
            return Ok(());
        }
        writeln!(writer, "Would link (dry run):")?;
        for (original, candidate) in &self.summary.planned_links {
            writeln!(writer, "  {} -> {}", candidate.display(), original.display())?;
        }
        writeln!(writer)
    }

    fn write_summary<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let s = self.summary;
        if s.interrupted {
            writeln!(writer, "Scan interrupted, results are partial.")?;
        }
        writeln!(writer, "Files scanned: {}", s.files_found)?;
        writeln!(writer, "Files hashed: {}", s.files_hashed)?;
        writeln!(writer, "Unique content hashes: {}", s.unique_digests)?;
        writeln!(writer, "Directories discovered: {}", s.directories)?;
        if s.replaced > 0 {
            writeln!(writer, "Files replaced with hard links: {}", s.replaced)?;
        }
        if s.hash_failures > 0 {
            writeln!(writer, "Hash failures: {}", s.hash_failures)?;
        }
        if s.skipped_directories > 0 {
            writeln!(writer, "Unreadable directories skipped: {}", s.skipped_directories)?;
        }
        for (path, error) in &s.at_risk {
            writeln!(writer, "Removed but not relinked: {} ({})", path.display(), error)?;
        }
        Ok(())
    }
}
