//! Tape decoding pipeline, the producer side of the record stream.
//!
//! # Pipeline
//! [`read_image`] locates the start of the block stream, then reads fixed
//! 512-byte blocks until end of input, frames each block's payload into
//! sections, decodes every section into a [`Record`], and sends the records
//! down a channel in tape order. [`RecordStream`] runs that producer on its
//! own thread; exactly one consumer drains the channel per run.
//!
//! Several tape images can feed one stream: they are drained strictly in
//! argument order onto the same channel, with no per-tape boundary visible
//! to the consumer.
//!
//! # Failure tiers
//! Stream-level problems (the locator failing, a seek or read error, a tape
//! ending mid-block) are fatal and abort the producer. Section-level
//! problems such as a short or unintelligible section are logged and skipped,
//! because losing one section must not desynchronize the rest of the block
//! stream. The producer's terminal status is surfaced by
//! [`RecordStream::join`] once the channel has drained.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender};
use thiserror::Error;
use tracing::{debug, trace};

use crate::block::{BlockHeader, BLOCK_SIZE};
use crate::record::{self, Record};
use crate::section::Sections;
use crate::volume::{self, LocateError};

/// Bound on in-flight records between producer and consumer; the producer
/// blocks on send once the consumer falls this far behind.
pub const RECORD_CHANNEL_CAPACITY: usize = 1024;

#[derive(Error, Debug)]
pub enum TapeError {
    #[error("{path}: {source}")]
    Open { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Locate(#[from] LocateError),
    #[error("tape ends in the middle of a block")]
    TruncatedBlock,
    #[error("I/O error on block read: {0}")]
    Io(#[from] io::Error),
}

/// Decode one tape image, sending records in order until end of input.
pub fn read_image<R: Read + Seek>(src: &mut R, records: &Sender<Record>) -> Result<(), TapeError> {
    let start = volume::locate_data_start(src)?;
    src.seek(SeekFrom::Start(start))?;

    let mut buf = [0u8; BLOCK_SIZE];
    while read_block(src, &mut buf)? {
        let mut body = &buf[..];
        let header = BlockHeader::read(&mut body)?;
        trace!(seq = header.sequence, declared = header.size, "block");

        for (magic, content) in Sections::new(body) {
            match record::decode(magic, content) {
                Ok(rec) => {
                    if records.send(rec).is_err() {
                        // Consumer hung up; nothing left to produce for.
                        return Ok(());
                    }
                }
                Err(err) => debug!("dropping section: {err}"),
            }
        }
    }
    Ok(())
}

/// Open one tape file and decode it onto the record channel.
pub fn read_tape(path: &Path, records: &Sender<Record>) -> Result<(), TapeError> {
    println!("reading {}", path.display());
    let mut file = File::open(path).map_err(|source| TapeError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    read_image(&mut file, records)
}

/// Fill `buf` with the next block. `Ok(false)` is a clean end of input on a
/// block boundary; anything that ends inside a block is an error.
fn read_block<R: Read>(src: &mut R, buf: &mut [u8; BLOCK_SIZE]) -> Result<bool, TapeError> {
    let mut filled = 0;
    while filled < buf.len() {
        match src.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(false),
            Ok(0) => return Err(TapeError::TruncatedBlock),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(true)
}

/// The record stream: one producer thread feeding one consumer through a
/// bounded channel, in strict tape order.
pub struct RecordStream {
    receiver: Receiver<Record>,
    producer: JoinHandle<Result<(), TapeError>>,
}

impl RecordStream {
    /// Spawn the producer over `paths`, drained sequentially onto one
    /// channel.
    pub fn spawn(paths: Vec<PathBuf>) -> Self {
        let (sender, receiver) = bounded(RECORD_CHANNEL_CAPACITY);
        let producer = thread::spawn(move || {
            for path in &paths {
                read_tape(path, &sender)?;
            }
            Ok(())
        });
        RecordStream { receiver, producer }
    }

    /// Iterate records in stream order. Ends when every tape has been
    /// drained or the producer aborted; call [`join`](Self::join) afterwards
    /// to tell the two apart.
    pub fn records(&self) -> impl Iterator<Item = Record> + '_ {
        self.receiver.iter()
    }

    /// Wait for the producer and surface its terminal status.
    pub fn join(self) -> Result<(), TapeError> {
        match self.producer.join() {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}
