//! Packing between `(kind, index, serial)` and the opaque handle word.
//!
//! Layout of the 64-bit word, low bits first:
//!
//! | bits     | field  | width                 |
//! |----------|--------|-----------------------|
//! | `0..2`   | kind   | [`KIND_BITS`]         |
//! | `2..5`   | serial | [`SERIAL_BITS`]       |
//! | `5..37`  | index  | [`INDEX_BITS`]        |
//! | `37..64` | unused | always zero           |
//!
//! The kind occupies the lowest bits so tags of different reference tables
//! never collide, and a local reference (kind `1`) is never the zero word.

use std::fmt;

use serde::Serialize;

pub const KIND_BITS: u32 = 2;
pub const SERIAL_BITS: u32 = 3;
pub const INDEX_BITS: u32 = 32;

/// Serials cycle through `0..MAX_SERIAL`.
pub const MAX_SERIAL: u32 = 1 << SERIAL_BITS;

const KIND_MASK: u64 = (1 << KIND_BITS) - 1;
const SERIAL_SHIFT: u32 = KIND_BITS;
const SERIAL_MASK: u64 = (1 << SERIAL_BITS) - 1;
const INDEX_SHIFT: u32 = KIND_BITS + SERIAL_BITS;
const INDEX_MASK: u64 = (1 << INDEX_BITS) - 1;

/// Which reference table a handle belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RefKind {
    /// Stack-based reference passed across a native transition (also the
    /// kind of the null handle).
    JniTransition = 0,
    Local = 1,
    Global = 2,
    WeakGlobal = 3,
}

impl RefKind {
    const fn from_bits(bits: u64) -> Self {
        match bits & KIND_MASK {
            0 => RefKind::JniTransition,
            1 => RefKind::Local,
            2 => RefKind::Global,
            _ => RefKind::WeakGlobal,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RefKind::JniTransition => "JNI transition",
            RefKind::Local => "local reference",
            RefKind::Global => "global reference",
            RefKind::WeakGlobal => "weak global reference",
        }
    }
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Opaque handle given to native code in place of a managed object.
///
/// Not an owning reference: it is only a capability to look up a slot, and
/// it may be stale by the time it is presented back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct IndirectRef(u64);

impl IndirectRef {
    pub const NULL: IndirectRef = IndirectRef(0);

    /// Reinterprets a raw word received from native code.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn as_raw(self) -> u64 {
        self.0
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    pub const fn kind(self) -> RefKind {
        RefKind::from_bits(self.0)
    }

    pub const fn index(self) -> u32 {
        ((self.0 >> INDEX_SHIFT) & INDEX_MASK) as u32
    }

    pub const fn serial(self) -> u32 {
        ((self.0 >> SERIAL_SHIFT) & SERIAL_MASK) as u32
    }
}

impl fmt::Display for IndirectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Packs a handle. `serial` must be below [`MAX_SERIAL`].
pub const fn encode(kind: RefKind, index: u32, serial: u32) -> IndirectRef {
    debug_assert!(serial < MAX_SERIAL);
    IndirectRef(
        ((index as u64) << INDEX_SHIFT)
            | (((serial as u64) & SERIAL_MASK) << SERIAL_SHIFT)
            | kind as u64,
    )
}

pub const fn decode(iref: IndirectRef) -> (RefKind, u32, u32) {
    (iref.kind(), iref.index(), iref.serial())
}
