//! Decoding section contents into typed records.
//!
//! The tape carries two overlapping generations of header layouts for the
//! same logical record kinds, selected by the section magic. Decoding parses
//! the fixed-layout header prefix for that magic and treats everything after
//! it as trailing name/data/destination bytes, read to the end of the
//! section (the link record is the exception: it carries an explicit name
//! length that splits name from destination).
//!
//! Generation quirks reproduced deliberately:
//!   - old-generation name records carry trailing bytes that do not decode
//!     to a usable name; they are replaced with a fixed placeholder,
//!   - old-generation directory names are lowercased on decode; modern
//!     names are preserved verbatim.
//!
//! A short section is a recoverable condition: the caller logs the decode
//! error and drops the section, keeping its position in the block stream.

use byteorder::{BigEndian, ReadBytesExt};
use std::io::{self, Read};
use thiserror::Error;
use tracing::warn;

use crate::block::Timestamp;
use crate::section::Magic;
use crate::typeid::TypeId;

pub type Inode = i64;

/// Stand-in for old-generation name records whose trailing bytes are not
/// understood well enough to trust as a name.
pub const LEGACY_NAME_PLACEHOLDER: &str = "broken";

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("section too short for a {0} header")]
    Truncated(Magic),
    #[error("link name length {0} exceeds the section body")]
    LinkNameOverrun(i32),
}

/// One decoded record. The closed set of shapes a section can decode to;
/// consumers drive reconstruction or listing off this and nothing else.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    /// Declares the path of the next file record of the same generation.
    Name(NameRecord),
    /// Self-contained: carries its own name, independent of pending names.
    Directory(DirectoryRecord),
    /// Nameless: the path comes from the most recent name record.
    File(FileRecord),
    /// A chunk of the open file's contents, in stream order.
    Data(Vec<u8>),
    Link(LinkRecord),
    /// Recognized kinds no consumer currently acts on (pop-directory,
    /// sub-record, option, ACL, empty).
    Ignored(Magic),
    /// A structurally valid section whose magic is not understood; already
    /// consumed, so the framer stays in sync.
    Unrecognized { magic: Magic, length: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct NameRecord {
    pub inode: Inode,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryRecord {
    pub attrs: Attributes,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileRecord {
    pub attrs: Attributes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkRecord {
    pub name: String,
    pub destination: String,
}

/// Attributes common to file and directory records, unified across both
/// header generations. Fields the old layout does not carry are `None`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attributes {
    pub inode: Inode,
    /// Inode of the containing directory.
    pub parent: Inode,
    /// Object type identifier; legacy headers do not carry one.
    pub type_id: Option<TypeId>,
    /// Declared content size in bytes.
    pub size: u32,
    pub mtime: Timestamp,
    /// Legacy headers carry a bare access time; modern ones do not.
    pub atime: Option<Timestamp>,
    pub acl: Option<AclSet>,
    pub owner: Option<Ownership>,
    pub nlink: Option<u16>,
}

impl Attributes {
    pub fn type_label(&self) -> &'static str {
        self.type_id.map(TypeId::label).unwrap_or("unknown")
    }

    /// Modern layout: type identifier, five opaque timestamps, ACL bytes,
    /// ownership, link count.
    fn read_modern<R: Read>(r: &mut R) -> io::Result<Self> {
        skip(r, 4)?;
        let inode = r.read_i64::<BigEndian>()?;
        let type_high = r.read_u32::<BigEndian>()?;
        let type_low = r.read_u32::<BigEndian>()?;
        let size = r.read_u32::<BigEndian>()?;
        skip(r, 4)?;
        let mtime = Timestamp::read(&mut *r)?;
        skip(r, 24)?; // three opaque timestamps
        let parent = r.read_i64::<BigEndian>()?;
        skip(r, 4)?;
        skip(r, 16)?; // two more opaque timestamps
        skip(r, 8)?;
        let acl = AclSet {
            owner: r.read_u8()?,
            group: r.read_u8()?,
            org: r.read_u8()?,
            world: r.read_u8()?,
        };
        skip(r, 4)?;
        let owner = Ownership {
            uid: r.read_i32::<BigEndian>()?,
            gid: r.read_i32::<BigEndian>()?,
            org: r.read_i32::<BigEndian>()?,
        };
        let nlink = r.read_u16::<BigEndian>()?;
        skip(r, 2)?; // pad
        Ok(Attributes {
            inode,
            parent,
            type_id: Some(TypeId::new(type_high, type_low)),
            size,
            mtime,
            atime: None,
            acl: Some(acl),
            owner: Some(owner),
            nlink: Some(nlink),
        })
    }

    /// Old layout: no type identifier, bare second counts for access and
    /// modification time, no ACL or ownership words.
    fn read_legacy<R: Read>(r: &mut R) -> io::Result<Self> {
        skip(r, 4)?;
        let inode = r.read_i64::<BigEndian>()?;
        skip(r, 8)?;
        skip(r, 8)?; // secondary inode, purpose unknown
        let size = r.read_u32::<BigEndian>()?;
        skip(r, 4)?;
        let atime = r.read_u32::<BigEndian>()?;
        let mtime = r.read_u32::<BigEndian>()?;
        let parent = r.read_i64::<BigEndian>()?;
        skip(r, 4)?; // trailing half-words
        Ok(Attributes {
            inode,
            parent,
            type_id: None,
            size,
            mtime: Timestamp { secs: mtime, extra: 0 },
            atime: Some(Timestamp { secs: atime, extra: 0 }),
            acl: None,
            owner: None,
            nlink: None,
        })
    }
}

/// ACL bytes for the four historical principal classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AclSet {
    pub owner: u8,
    pub group: u8,
    pub org: u8,
    pub world: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ownership {
    pub uid: i32,
    pub gid: i32,
    pub org: i32,
}

/// Decode one framed section into a record.
pub fn decode(magic: Magic, content: &[u8]) -> Result<Record, DecodeError> {
    let truncated = |_: io::Error| DecodeError::Truncated(magic);
    Ok(match magic {
        Magic::NAME | Magic::NAME_OLD => decode_name(magic, content).map_err(truncated)?,
        Magic::DIR => decode_dir(content).map_err(truncated)?,
        Magic::DIR_OLD => decode_dir_old(content).map_err(truncated)?,
        Magic::FILE => decode_file(content).map_err(truncated)?,
        Magic::FILE_OLD => decode_file_old(content).map_err(truncated)?,
        Magic::DATA => Record::Data(content.to_vec()),
        Magic::LINK | Magic::LINK_OLD => decode_link(magic, content)?,
        Magic::POPD
        | Magic::POPD_OLD
        | Magic::SUB
        | Magic::SUB_OLD
        | Magic::OPT
        | Magic::OPT_OLD
        | Magic::ACL
        | Magic::ACL_OLD
        | Magic::EMPTY => Record::Ignored(magic),
        other => Record::Unrecognized { magic: other, length: content.len() },
    })
}

fn decode_name(magic: Magic, mut body: &[u8]) -> io::Result<Record> {
    let inode = body.read_i64::<BigEndian>()?;
    skip(&mut body, 4)?;
    let name = if magic == Magic::NAME_OLD {
        warn!("old-generation name record (inode {inode}); name bytes are unreliable");
        LEGACY_NAME_PLACEHOLDER.to_string()
    } else {
        String::from_utf8_lossy(body).into_owned()
    };
    Ok(Record::Name(NameRecord { inode, name }))
}

fn decode_dir(mut body: &[u8]) -> io::Result<Record> {
    let attrs = Attributes::read_modern(&mut body)?;
    skip(&mut body, 128)?; // reserved words after the common header
    let name = String::from_utf8_lossy(body).into_owned();
    Ok(Record::Directory(DirectoryRecord { attrs, name }))
}

fn decode_dir_old(mut body: &[u8]) -> io::Result<Record> {
    let attrs = Attributes::read_legacy(&mut body)?;
    skip(&mut body, 24)?; // reserved words plus two unexplained inodes
    // Old directory names arrive in the source system's casing and are
    // normalized to lowercase; modern records are left verbatim.
    let name = String::from_utf8_lossy(body).to_lowercase();
    Ok(Record::Directory(DirectoryRecord { attrs, name }))
}

fn decode_file(mut body: &[u8]) -> io::Result<Record> {
    let attrs = Attributes::read_modern(&mut body)?;
    skip(&mut body, 24)?; // trailing reserved words
    Ok(Record::File(FileRecord { attrs }))
}

fn decode_file_old(mut body: &[u8]) -> io::Result<Record> {
    let attrs = Attributes::read_legacy(&mut body)?;
    skip(&mut body, 8)?; // trailing reserved words
    Ok(Record::File(FileRecord { attrs }))
}

fn decode_link(magic: Magic, mut body: &[u8]) -> Result<Record, DecodeError> {
    let truncated = |_: io::Error| DecodeError::Truncated(magic);
    skip(&mut body, 2).map_err(truncated)?;
    let name_len = body.read_i32::<BigEndian>().map_err(truncated)?;
    if name_len < 0 || name_len as usize > body.len() {
        return Err(DecodeError::LinkNameOverrun(name_len));
    }
    let (name, destination) = body.split_at(name_len as usize);
    Ok(Record::Link(LinkRecord {
        name: String::from_utf8_lossy(name).into_owned(),
        destination: String::from_utf8_lossy(destination).into_owned(),
    }))
}

fn skip<R: Read>(r: &mut R, count: u64) -> io::Result<()> {
    let copied = io::copy(&mut r.by_ref().take(count), &mut io::sink())?;
    if copied != count {
        return Err(io::ErrorKind::UnexpectedEof.into());
    }
    Ok(())
}
