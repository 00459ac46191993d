//! Section framing: carving magic-tagged frames out of one block's payload.
//!
//! Each section is self-delimiting: a 6-byte tag header (the declared length
//! sits between two signed 16-bit sub-tags), exactly that many content
//! bytes, then one pad byte when the length is odd so the next header lands
//! on an even boundary.
//!
//! Framing failures come in two flavors and are treated differently. A block
//! that cannot hold another tag header is simply exhausted, which is the
//! normal end of that block. A section whose declared length runs past the
//! block is skipped and scanning resumes, because the format is
//! reverse-engineered and not every section kind is fully understood. Neither
//! case aborts the run; only stream-level I/O failure does (see `reader`).

use byteorder::{BigEndian, ReadBytesExt};
use std::fmt;
use std::io::{self, Read};
use tracing::debug;

pub const SECTION_HEADER_SIZE: usize = 6;

/// The tag header preceding every section's content bytes.
#[derive(Debug, Clone, Copy)]
pub struct SectionHeader {
    pub hi_tag: i16,
    pub length: u16,
    pub lo_tag: i16,
}

impl SectionHeader {
    /// Field order on tape is hi-tag, length, lo-tag: the length really does
    /// sit between the two halves of the magic code.
    pub fn read<R: Read>(mut reader: R) -> io::Result<Self> {
        Ok(Self {
            hi_tag: reader.read_i16::<BigEndian>()?,
            length: reader.read_u16::<BigEndian>()?,
            lo_tag: reader.read_i16::<BigEndian>()?,
        })
    }

    pub fn magic(&self) -> Magic {
        Magic::new(self.hi_tag, self.lo_tag)
    }
}

/// 32-bit section kind code formed from the two tag sub-fields. The high
/// half selects the record kind, the low half the header generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Magic(pub i32);

impl Magic {
    pub const fn new(hi: i16, lo: i16) -> Self {
        Magic((hi as i32) << 16 | lo as i32)
    }

    pub const NAME: Magic = Magic::new(2, 2);
    pub const NAME_OLD: Magic = Magic::new(2, 1);
    pub const FILE: Magic = Magic::new(0, 2);
    pub const FILE_OLD: Magic = Magic::new(0, 1);
    /// File contents.
    pub const DATA: Magic = Magic::new(1, 1);
    pub const DIR: Magic = Magic::new(3, 3);
    pub const DIR_OLD: Magic = Magic::new(3, 2);
    pub const POPD: Magic = Magic::new(4, 2);
    pub const POPD_OLD: Magic = Magic::new(4, 1);
    pub const LINK: Magic = Magic::new(5, 2);
    pub const LINK_OLD: Magic = Magic::new(5, 1);
    pub const OPT: Magic = Magic::new(6, 2);
    pub const OPT_OLD: Magic = Magic::new(6, 1);
    pub const EMPTY: Magic = Magic::new(8, 1);
    pub const SUB: Magic = Magic::new(9, 2);
    pub const SUB_OLD: Magic = Magic::new(9, 1);
    pub const ACL: Magic = Magic::new(10, 2);
    pub const ACL_OLD: Magic = Magic::new(10, 1);
}

impl fmt::Display for Magic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            Magic::NAME => "name",
            Magic::NAME_OLD => "name(old)",
            Magic::FILE => "file",
            Magic::FILE_OLD => "file(old)",
            Magic::DATA => "data",
            Magic::DIR => "dir",
            Magic::DIR_OLD => "dir(old)",
            Magic::POPD => "popd",
            Magic::POPD_OLD => "popd(old)",
            Magic::LINK => "link",
            Magic::LINK_OLD => "link(old)",
            Magic::OPT => "opt",
            Magic::OPT_OLD => "opt(old)",
            Magic::EMPTY => "empty",
            Magic::SUB => "sub",
            Magic::SUB_OLD => "sub(old)",
            Magic::ACL => "acl",
            Magic::ACL_OLD => "acl(old)",
            other => return write!(f, "unknown(0x{:08x})", other.0),
        };
        f.write_str(name)
    }
}

/// Iterator over the section frames within one block payload.
///
/// Yields `(magic, content)` pairs; pad bytes after odd-length content are
/// consumed and never leak into the next frame.
pub struct Sections<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Sections<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Sections { data, pos: 0 }
    }
}

impl<'a> Iterator for Sections<'a> {
    type Item = (Magic, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.data.len().saturating_sub(self.pos) < SECTION_HEADER_SIZE {
                // Exhausted: the tail cannot hold another tag header.
                return None;
            }
            let mut header_bytes = &self.data[self.pos..self.pos + SECTION_HEADER_SIZE];
            let header = SectionHeader::read(&mut header_bytes).ok()?;

            let content_start = self.pos + SECTION_HEADER_SIZE;
            let content_end = content_start + header.length as usize;
            if content_end > self.data.len() {
                debug!(
                    "section {} declares {} bytes but only {} remain; resyncing",
                    header.magic(),
                    header.length,
                    self.data.len() - content_start
                );
                self.pos = self.data.len();
                continue;
            }

            let content = &self.data[content_start..content_end];
            // Odd lengths are padded to an even boundary.
            self.pos = (content_end + (header.length as usize & 1)).min(self.data.len());
            return Some((header.magic(), content));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn frame(hi: i16, lo: i16, content: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(SECTION_HEADER_SIZE + content.len() + 1);
        out.extend_from_slice(&hi.to_be_bytes());
        out.extend_from_slice(&(content.len() as u16).to_be_bytes());
        out.extend_from_slice(&lo.to_be_bytes());
        out.extend_from_slice(content);
        if content.len() % 2 == 1 {
            out.push(0);
        }
        out
    }

    #[test]
    fn odd_length_consumes_one_pad_byte() {
        let mut buf = frame(1, 1, b"abc");
        buf.extend_from_slice(&frame(1, 1, b"defg"));

        let frames: Vec<_> = Sections::new(&buf).collect();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0], (Magic::DATA, &b"abc"[..]));
        assert_eq!(frames[1], (Magic::DATA, &b"defg"[..]));
    }

    #[test]
    fn overlong_section_is_skipped_without_aborting() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&2i16.to_be_bytes());
        buf.extend_from_slice(&1000u16.to_be_bytes()); // runs past the block
        buf.extend_from_slice(&2i16.to_be_bytes());
        buf.extend_from_slice(&[0u8; 20]);

        assert_eq!(Sections::new(&buf).count(), 0);
    }

    #[test]
    fn short_tail_ends_the_block() {
        let mut buf = frame(1, 1, b"xy");
        buf.extend_from_slice(&[0u8; 3]); // not enough for another header
        assert_eq!(Sections::new(&buf).count(), 1);
    }

    proptest! {
        #[test]
        fn framing_round_trips_arbitrary_section_runs(
            contents in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..40), 0..8)
        ) {
            let mut buf = Vec::new();
            for content in &contents {
                buf.extend_from_slice(&frame(1, 1, content));
            }
            let framed: Vec<Vec<u8>> =
                Sections::new(&buf).map(|(_, c)| c.to_vec()).collect();
            prop_assert_eq!(framed, contents);
        }
    }
}
