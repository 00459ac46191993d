use byteorder::{BigEndian, ReadBytesExt};
use chrono::{DateTime, Utc};
use std::io::{self, Read};

/// Fixed tape block size; the unit of sequential I/O.
pub const BLOCK_SIZE: usize = 512;
/// Bytes of each block taken by the header; sections fill the remainder.
pub const BLOCK_HEADER_SIZE: usize = 14;

/// The DOMAIN/OS epoch (1980-01-01T00:00:00Z) in Unix seconds.
const EPOCH_OFFSET_SECS: i64 = 315_532_800;

/// Coarse tape timestamp: whole seconds past the 1980 epoch plus a 32-bit
/// extra-precision word that some record kinds reuse as a node identifier.
/// Both words are opaque and preserved verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    pub secs: u32,
    pub extra: u32,
}

impl Timestamp {
    pub fn read<R: Read>(mut reader: R) -> io::Result<Self> {
        Ok(Self {
            secs: reader.read_u32::<BigEndian>()?,
            extra: reader.read_u32::<BigEndian>()?,
        })
    }

    /// The whole-second part as UTC wall-clock time.
    pub fn to_utc(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(EPOCH_OFFSET_SECS + i64::from(self.secs), 0)
    }
}

/// Header at the start of every 512-byte block.
#[derive(Debug, Clone, Copy)]
pub struct BlockHeader {
    /// Monotonically increasing across the stream; not validated.
    pub sequence: i32,
    pub time: Timestamp,
    /// Size of the data within the block as declared by the writer.
    pub size: u16,
}

impl BlockHeader {
    pub fn read<R: Read>(mut reader: R) -> io::Result<Self> {
        Ok(Self {
            sequence: reader.read_i32::<BigEndian>()?,
            time: Timestamp::read(&mut reader)?,
            size: reader.read_u16::<BigEndian>()?,
        })
    }
}
