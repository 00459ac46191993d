//! Listing consumer: reports the record stream without touching the
//! filesystem. Mutually exclusive with extraction for a given run.

use std::io::{self, Write};

use crate::record::Record;

/// Stateless apart from pairing file records with the most recent name.
pub struct Lister<W: Write> {
    out: W,
    pending: Option<String>,
}

impl<W: Write> Lister<W> {
    pub fn new(out: W) -> Self {
        Lister { out, pending: None }
    }

    /// One human-readable line per directory, file, and link record.
    pub fn handle(&mut self, record: Record) -> io::Result<()> {
        match record {
            Record::Name(name) => self.pending = Some(name.name),
            Record::Directory(dir) => writeln!(self.out, "(dir) {}", dir.name)?,
            Record::File(file) => {
                let name = self.pending.as_deref().unwrap_or("");
                writeln!(
                    self.out,
                    "(file) {}  ({} {})",
                    name,
                    file.attrs.type_label(),
                    file.attrs.size
                )?;
            }
            Record::Link(link) => {
                writeln!(self.out, "(link) {} -> {}", link.name, link.destination)?;
            }
            Record::Data(_) | Record::Ignored(_) | Record::Unrecognized { .. } => {}
        }
        Ok(())
    }
}
