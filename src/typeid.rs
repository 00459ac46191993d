//! Registry of historical object-type identifiers.
//!
//! Every file and directory on tape carries a 64-bit type identifier (two
//! 32-bit halves) classifying the underlying object. The identifiers are
//! frozen historical values; they are consulted only to produce a display
//! label and never drive decoding or reconstruction.

/// A 64-bit object-type identifier as its two 32-bit halves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId {
    pub high: u32,
    pub low: u32,
}

impl TypeId {
    pub const fn new(high: u32, low: u32) -> Self {
        TypeId { high, low }
    }

    /// Short display label, or `"unknown"` for identifiers outside the table.
    pub fn label(self) -> &'static str {
        // Sequential search; the table is ordered most common first.
        LABELS
            .iter()
            .find(|entry| entry.0 == self)
            .map_or("unknown", |entry| entry.1)
    }
}

pub const REC: TypeId = TypeId::new(0x300, 0);
pub const HDRU: TypeId = TypeId::new(0x301, 0);
pub const OBJ: TypeId = TypeId::new(0x302, 0);
pub const UNDEF: TypeId = TypeId::new(0x304, 0);
pub const PAD: TypeId = TypeId::new(0x305, 0);
pub const IPAD: TypeId = TypeId::new(0x309, 0);
pub const SIO: TypeId = TypeId::new(0x30a, 0);
pub const DDF: TypeId = TypeId::new(0x30b, 0);
pub const MBX: TypeId = TypeId::new(0x30c, 0);
pub const NULL: TypeId = TypeId::new(0x30d, 0);
pub const D3M_AREA: TypeId = TypeId::new(0x30e, 0);
pub const D3M_SCH: TypeId = TypeId::new(0x30f, 0);
pub const PIPE: TypeId = TypeId::new(0x310, 0);
pub const UASC: TypeId = TypeId::new(0x311, 0);
pub const DIR: TypeId = TypeId::new(0x312, 0);
pub const UNIX_DIR: TypeId = TypeId::new(0x313, 0);
pub const MT: TypeId = TypeId::new(0x314, 0);
pub const SYSBOOT: TypeId = TypeId::new(0x315, 0);
pub const CASE_HM: TypeId = TypeId::new(0x316, 0);
pub const BITMAP: TypeId = TypeId::new(0x317, 0);
pub const OBJLIB: TypeId = TypeId::new(0x318, 0);
pub const LHEAP: TypeId = TypeId::new(0x319, 0);
pub const DM_EDIT: TypeId = TypeId::new(0x31a, 0);
pub const TCP: TypeId = TypeId::new(0x31b, 0);
pub const PTY: TypeId = TypeId::new(0x31c, 0);
pub const PTY_SLAVE: TypeId = TypeId::new(0x31d, 0);
pub const SLINK: TypeId = TypeId::new(0x31e, 0);
pub const IPC_SOCK: TypeId = TypeId::new(0x31f, 0);
pub const VTE: TypeId = TypeId::new(0x320, 0);
pub const UNSTRUCT: TypeId = TypeId::new(0x321, 0);
pub const COFF: TypeId = TypeId::new(0x322, 0);
pub const OS_PG_FILE: TypeId = TypeId::new(0x323, 0);
pub const DEV_TTY: TypeId = TypeId::new(0x324, 0);
pub const CMPEXE: TypeId = TypeId::new(0x325, 0);
pub const OSIO: TypeId = TypeId::new(0x326, 0);
pub const NIL: TypeId = TypeId::new(0, 0);
pub const COMPRESS: TypeId = TypeId::new(0x40c9_eb63, 0x4001_8ec0);

/// Display labels for the identifiers worth naming, most common first.
pub const LABELS: &[(TypeId, &'static str)] = &[
    (UNSTRUCT, "unstruct"),
    (UASC, "uasc"),
    (REC, "rec"),
    (HDRU, "hdru"),
    (COFF, "coff"),
    (OBJ, "obj"),
    (NIL, "nil"),
    (COMPRESS, "compress"),
    (BITMAP, "bitmap"),
    (CASE_HM, "case_hm"),
    (CMPEXE, "cmpexe"),
    (D3M_AREA, "d3m_area"),
    (D3M_SCH, "d3m_sch"),
    (DIR, "dir"),
    (DM_EDIT, "dm_edit"),
    (IPAD, "ipad"),
    (MBX, "mbx"),
    (MT, "mt"),
    (NULL, "null"),
    (PAD, "pad"),
    (PIPE, "pipe"),
    (PTY_SLAVE, "pty_slave"),
    (PTY, "pty"),
    (SIO, "sio"),
    (TCP, "tcp"),
    (OSIO, "osio"),
    (DEV_TTY, "dev_tty"),
];
