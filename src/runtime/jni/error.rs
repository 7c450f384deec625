use thiserror::Error;

use crate::runtime::jni::{
    indirect_ref::{IndirectRef, RefKind},
    lrt::SegmentCookie,
};

/// Failures reported by a local reference table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefError {
    /// The slot was reused since this handle was issued.
    #[error("stale local reference {iref} with serial number {handle_serial} v. current {entry_serial}")]
    StaleHandle {
        iref: IndirectRef,
        handle_serial: u32,
        entry_serial: u32,
    },

    /// The slot is empty: the handle was already deleted.
    #[error("deleted reference at index {index}")]
    DanglingHandle { index: u32 },

    /// Never allocated, or allocated in a segment that has been popped.
    #[error("deleted reference at index {index} in a table of size {top_index}")]
    OutOfSegment { index: u32, top_index: u32 },

    #[error("local reference table overflow (max={max_capacity}, requested={requested})")]
    CapacityExceeded { max_capacity: u32, requested: u64 },

    #[error("segment pop out of order: got {got}, top of segment stack is {expected:?}")]
    ProtocolViolation {
        expected: Option<SegmentCookie>,
        got: SegmentCookie,
    },

    #[error("{iref} is not a local reference (kind: {kind})")]
    WrongKind { iref: IndirectRef, kind: RefKind },

    /// Valid handle owned by an enclosing segment; only the current segment
    /// may delete its references.
    #[error("attempt to remove index outside index area ({index} vs {bottom_index}-{top_index})")]
    WrongSegment {
        index: u32,
        bottom_index: u32,
        top_index: u32,
    },

    #[error("JNI ERROR (app bug): attempt to {what} stale local reference {iref} (should be {expected})")]
    EntryMismatch {
        what: &'static str,
        iref: IndirectRef,
        expected: IndirectRef,
    },

    #[error("local reference table not empty: {live} live entries")]
    NotEmpty { live: usize },
}

impl RefError {
    /// Errors produced by presenting a bad handle, as opposed to resource or
    /// bookkeeping conditions.
    pub fn is_invalid_handle(&self) -> bool {
        matches!(
            self,
            RefError::StaleHandle { .. }
                | RefError::DanglingHandle { .. }
                | RefError::OutOfSegment { .. }
                | RefError::WrongKind { .. }
                | RefError::EntryMismatch { .. }
        )
    }
}
