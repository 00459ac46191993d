//! Reconstructing a filesystem tree from the record stream.
//!
//! The consumer is a small state machine: `Idle` (nothing pending),
//! `NamePending` (a name record announced the next file's path), and
//! `Writing` (a file record opened an output and `remaining` bytes of data
//! are still owed). Directory and link records act immediately and do not
//! participate in the state.
//!
//! Cross-record ordering is a protocol contract, not incidental control
//! flow: a file record without a preceding name record, or data arriving
//! after a file's declared size has been written, means the stream is out of
//! sync with expectations and the run aborts. Data with no open output, on
//! the other hand, is silently dropped: content for which no destination
//! exists.

use std::fs::{self, File};
use std::io::{self, Write};
use std::mem;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

use crate::record::{DirectoryRecord, FileRecord, LinkRecord, NameRecord, Record};

#[cfg(unix)]
use std::os::unix::fs::symlink;
#[cfg(windows)]
use std::os::windows::fs::symlink_file as symlink;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("file record with no preceding name record")]
    NoPendingName,
    #[error("refusing to create {0:?}: tape paths must be relative")]
    UnsafeName(String),
    #[error("data for {0:?} after its declared size was written")]
    FileAlreadyComplete(String),
    #[error("failed to create directory for {name:?}: {source}")]
    CreateDir { name: String, source: io::Error },
    #[error("failed to create file {name:?}: {source}")]
    CreateFile { name: String, source: io::Error },
    #[error("failed to write {name:?}: {source}")]
    WriteFile { name: String, source: io::Error },
}

enum State {
    Idle,
    NamePending(String),
    Writing {
        name: String,
        file: File,
        remaining: u64,
    },
}

/// Stateful consumer that mutates the filesystem under `root`, one record
/// at a time, strictly in stream order.
pub struct Extractor {
    root: PathBuf,
    state: State,
}

impl Extractor {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Extractor {
            root: root.into(),
            state: State::Idle,
        }
    }

    pub fn handle(&mut self, record: Record) -> Result<(), ExtractError> {
        match record {
            Record::Directory(dir) => self.on_directory(dir),
            Record::Name(name) => {
                self.on_name(name);
                Ok(())
            }
            Record::File(file) => self.on_file(file),
            Record::Data(bytes) => self.on_data(&bytes),
            Record::Link(link) => self.on_link(link),
            Record::Ignored(_) | Record::Unrecognized { .. } => Ok(()),
        }
    }

    fn on_directory(&mut self, dir: DirectoryRecord) -> Result<(), ExtractError> {
        println!("(dir) {}", dir.name);
        check_relative(&dir.name)?;
        fs::create_dir_all(self.root.join(&dir.name))
            .map_err(|source| ExtractError::CreateDir { name: dir.name, source })
    }

    fn on_name(&mut self, name: NameRecord) {
        if let State::Writing { name: open, .. } = &self.state {
            warn!("name record while {open:?} is still incomplete; abandoning it");
        }
        // A second name record before any file record wins.
        self.state = State::NamePending(name.name);
    }

    fn on_file(&mut self, file: FileRecord) -> Result<(), ExtractError> {
        let name = match mem::replace(&mut self.state, State::Idle) {
            State::NamePending(name) => name,
            _ => return Err(ExtractError::NoPendingName),
        };
        println!("(file) {}  ({} {})", name, file.attrs.type_label(), file.attrs.size);

        // Directory records should already have built the tree, but some
        // streams name files in directories never announced by one.
        self.create_ancestors(&name)?;
        let out = File::create(self.root.join(&name))
            .map_err(|source| ExtractError::CreateFile { name: name.clone(), source })?;

        let remaining = u64::from(file.attrs.size);
        if remaining > 0 {
            self.state = State::Writing { name, file: out, remaining };
        }
        // A zero-size file is complete as soon as it exists.
        Ok(())
    }

    fn on_data(&mut self, bytes: &[u8]) -> Result<(), ExtractError> {
        match mem::replace(&mut self.state, State::Idle) {
            State::Writing { name, mut file, remaining } => {
                if remaining == 0 {
                    return Err(ExtractError::FileAlreadyComplete(name));
                }
                // Overlong chunks are clamped: the excess belongs to whatever
                // follows on the tape, not to this file.
                let take = remaining.min(bytes.len() as u64) as usize;
                file.write_all(&bytes[..take])
                    .map_err(|source| ExtractError::WriteFile { name: name.clone(), source })?;
                let remaining = remaining - take as u64;
                if remaining > 0 {
                    self.state = State::Writing { name, file, remaining };
                }
                Ok(())
            }
            other => {
                // No open output; the content has nowhere to go.
                self.state = other;
                Ok(())
            }
        }
    }

    fn on_link(&mut self, link: LinkRecord) -> Result<(), ExtractError> {
        println!("(link) {} -> {}", link.name, link.destination);
        check_relative(&link.name)?;
        self.create_ancestors(&link.name)?;
        // Destination is recreated verbatim, dangling or not.
        if let Err(err) = symlink(&link.destination, self.root.join(&link.name)) {
            warn!("could not create symlink {:?}: {err}", link.name);
        }
        Ok(())
    }

    fn create_ancestors(&self, name: &str) -> Result<(), ExtractError> {
        if let Some(parent) = Path::new(name).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(self.root.join(parent)).map_err(|source| {
                    ExtractError::CreateDir { name: name.to_string(), source }
                })?;
            }
        }
        Ok(())
    }
}

/// Tape-recorded paths are reinterpreted relative to the extraction root;
/// absolute or dot-prefixed names from the source system are not trusted.
fn check_relative(name: &str) -> Result<(), ExtractError> {
    if name.starts_with('/') || name.starts_with('.') {
        return Err(ExtractError::UnsafeName(name.to_string()));
    }
    Ok(())
}
