use std::fmt;
use std::num::NonZeroUsize;

use serde::Serialize;

/// Address of an object in the managed heap.
///
/// An `ObjRef` is a lightweight, copyable, non-null word. The reference table
/// never dereferences it; the collector owns the memory behind it and may
/// move the object at any time, so an `ObjRef` read from a table is only good
/// until the next point where the collector could run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ObjRef(NonZeroUsize);

impl ObjRef {
    /// Wraps a raw heap address. Returns `None` for the null address.
    pub fn new(addr: usize) -> Option<Self> {
        NonZeroUsize::new(addr).map(Self)
    }

    /// Returns the raw heap address.
    pub fn addr(self) -> usize {
        self.0.get()
    }
}

impl fmt::Display for ObjRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.addr())
    }
}
