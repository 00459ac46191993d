//! Locating the record-bearing block stream inside a raw tape image.
//!
//! Tape images either begin directly with the `VOL` volume label, or carry a
//! boot loader region in front of it. Neither region declares its own length,
//! so the locator walks the image in 512-byte strides looking for the
//! `0xDEAFFAED` end-of-region sentinel: once past the (optional) boot region,
//! and once more past the volume header. The record blocks start immediately
//! after the second landmark.

use std::io::{self, Read, Seek, SeekFrom};
use thiserror::Error;

use crate::block::BLOCK_SIZE;

/// Label at the start of the volume header region.
pub const VOLUME_LABEL: &[u8; 3] = b"VOL";
/// End-of-region marker for both the boot loader and the volume header.
pub const SENTINEL: [u8; 4] = [0xde, 0xaf, 0xfa, 0xed];

#[derive(Error, Debug)]
pub enum LocateError {
    #[error("volume label not found after the boot region")]
    MissingVolumeLabel,
    #[error("end-of-region sentinel not found before end of input")]
    SentinelNotFound,
    #[error("I/O error while locating the block stream: {0}")]
    Io(#[from] io::Error),
}

/// Find the byte offset of the first record-bearing block.
///
/// Failure here is fatal for the whole run: the landmark layout is
/// load-bearing and cannot be skipped without losing the entire stream.
pub fn locate_data_start<R: Read + Seek>(src: &mut R) -> Result<u64, LocateError> {
    let stride = BLOCK_SIZE as u64;
    let mut offset = 0u64;

    src.seek(SeekFrom::Start(0))?;
    let mut label = [0u8; 3];
    src.read_exact(&mut label)?;

    if &label != VOLUME_LABEL {
        // A boot loader precedes the volume header. Nothing in its header
        // obviously says how long it is, so stride forward until the
        // sentinel block that closes the region.
        loop {
            offset += stride;
            src.seek(SeekFrom::Start(offset))?;
            if read_probe(src)? == SENTINEL {
                offset += stride;
                break;
            }
        }

        src.seek(SeekFrom::Start(offset))?;
        src.read_exact(&mut label)?;
        if &label != VOLUME_LABEL {
            return Err(LocateError::MissingVolumeLabel);
        }
    }

    // Past the volume header to the second landmark; records follow it.
    loop {
        offset += stride;
        src.seek(SeekFrom::Start(offset))?;
        if read_probe(src)? == SENTINEL {
            return Ok(offset + stride);
        }
    }
}

fn read_probe<R: Read>(src: &mut R) -> Result<[u8; 4], LocateError> {
    let mut probe = [0u8; 4];
    match src.read_exact(&mut probe) {
        Ok(()) => Ok(probe),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(LocateError::SentinelNotFound),
        Err(e) => Err(LocateError::Io(e)),
    }
}
