//! Local reference table.
//!
//! Hands out [`IndirectRef`] handles for managed objects held by native code
//! across a call boundary. Handles are validated against the slot they name:
//! the index must be below `top_index`, the slot must be occupied, and the
//! slot's serial must match the serial packed into the handle.
//!
//! # Segments
//! Each native frame pushes a segment mark on entry and pops it on exit.
//! Popping clears every slot allocated since the matching push and restores
//! `top_index`, so all references created inside the frame die together.
//!
//! # Holes
//! Removing the top entry contracts `top_index` across any trailing empty
//! slots, stopping at the current segment's bottom. Removing an interior
//! entry leaves a hole that a later `add` in the same segment reuses. The
//! hole search scans backward from the top, so its cost is bounded by how
//! far below the top the most recent hole sits; alternating add/remove at
//! the top never scans at all.
//!
//! # Ownership
//! A table belongs to exactly one thread and is not `Sync`; no operation
//! locks. The collector only touches it through
//! [`LocalReferenceTable::visit_roots`] while that thread is suspended.

use std::fmt;

use log::debug;
use serde::Serialize;

use crate::runtime::{
    gc::obj_ref::ObjRef,
    jni::{
        config::LrtConfig,
        diagnostics::{self, TARGET},
        error::RefError,
        indirect_ref::{IndirectRef, RefKind, encode},
        lrt_entry::LrtEntry,
    },
};

mod dump;
mod roots;
mod validate;

pub use dump::{DumpEntry, LrtDump, LrtStats};
pub use roots::LocalRoot;

/// Opaque token returned by [`LocalReferenceTable::push_segment`].
///
/// Carries the `top_index` saved at the push, the segment depth, and the
/// table's push count at the time. Two pushes at the same `top_index` yield
/// distinct cookies, and so does a push that reopens a popped position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SegmentCookie {
    top_index: u32,
    depth: u32,
    epoch: u64,
}

impl SegmentCookie {
    pub fn top_index(self) -> u32 {
        self.top_index
    }

    pub fn depth(self) -> u32 {
        self.depth
    }

    /// Ordinal of the push that produced this cookie, starting at 1.
    pub fn epoch(self) -> u64 {
        self.epoch
    }
}

impl fmt::Display for SegmentCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "segment #{} at {}", self.depth, self.top_index)
    }
}

struct SegmentMark {
    cookie: SegmentCookie,
    /// Hole count of the enclosing segment, restored on pop.
    saved_holes: u32,
}

pub struct LocalReferenceTable {
    table: Vec<LrtEntry>,
    top_index: u32,
    /// Empty slots in `[bottom_index, top_index)`.
    current_num_holes: u32,
    segments: Vec<SegmentMark>,
    config: LrtConfig,
    stats: LrtStats,
}

impl Default for LocalReferenceTable {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalReferenceTable {
    /// Creates an empty table with the default configuration.
    ///
    /// No storage is allocated until the first `add`.
    pub fn new() -> Self {
        Self::with_config(LrtConfig::default())
    }

    pub fn with_config(config: LrtConfig) -> Self {
        Self {
            table: Vec::new(),
            top_index: 0,
            current_num_holes: 0,
            segments: Vec::new(),
            config: config.normalized(),
            stats: LrtStats::default(),
        }
    }

    pub fn config(&self) -> &LrtConfig {
        &self.config
    }

    /// Exclusive upper bound of allocated slots in the current frame lineage.
    pub fn top_index(&self) -> u32 {
        self.top_index
    }

    /// Number of slots currently backed by storage.
    pub fn capacity(&self) -> usize {
        self.table.len()
    }

    /// How many more entries can be added before hitting `max_capacity`.
    pub fn free_capacity(&self) -> u32 {
        self.config.max_capacity.saturating_sub(self.top_index)
    }

    /// `true` when no slot is live.
    ///
    /// Contraction keeps the slot just below `top_index` occupied, so an
    /// empty table is exactly one whose `top_index` is zero.
    pub fn is_empty(&self) -> bool {
        self.top_index == 0
    }

    pub fn segment_depth(&self) -> usize {
        self.segments.len()
    }

    pub fn stats(&self) -> &LrtStats {
        &self.stats
    }

    /// Lowest index the current segment may allocate or remove.
    fn bottom_index(&self) -> u32 {
        self.segments
            .last()
            .map_or(0, |mark| mark.cookie.top_index)
    }

    /// Adds a reference to `obj` and returns its handle.
    ///
    /// Reuses a hole in the current segment when there is one, otherwise
    /// extends at `top_index`, growing storage geometrically. Fails with
    /// [`RefError::CapacityExceeded`] without changing any state when the
    /// configured maximum is reached.
    pub fn add(&mut self, obj: ObjRef) -> Result<IndirectRef, RefError> {
        let index = match self.take_hole() {
            Some(index) => {
                self.stats.holes_reused += 1;
                index
            }
            None => {
                let index = self.top_index;
                self.ensure_storage(u64::from(index) + 1)?;
                self.top_index += 1;
                self.stats.peak_top_index = self.stats.peak_top_index.max(self.top_index);
                index
            }
        };

        let entry = &mut self.table[index as usize];
        entry.add(obj);
        self.stats.adds += 1;
        Ok(encode(RefKind::Local, index, entry.serial()))
    }

    /// Removes the entry named by `iref`.
    ///
    /// An invalid handle is handled by the check policy: strict mode aborts,
    /// permissive mode returns the error with the table untouched. A valid
    /// handle that belongs to an enclosing segment is refused with
    /// [`RefError::WrongSegment`] in either mode.
    pub fn remove(&mut self, iref: IndirectRef) -> Result<(), RefError> {
        if let Err(err) = self.is_valid_reference(iref) {
            return Err(self.enforce(err));
        }

        let index = iref.index();
        let bottom_index = self.bottom_index();
        if index < bottom_index {
            let err = RefError::WrongSegment {
                index,
                bottom_index,
                top_index: self.top_index,
            };
            return Err(diagnostics::report(err));
        }

        self.table[index as usize].clear();
        self.stats.removes += 1;

        if index == self.top_index - 1 {
            self.top_index = index;
            self.contract(bottom_index);
        } else {
            self.current_num_holes += 1;
        }
        Ok(())
    }

    /// Drops trailing holes so that `top_index` sits just above the highest
    /// live slot of the current segment.
    fn contract(&mut self, bottom_index: u32) {
        while self.top_index > bottom_index
            && self.table[self.top_index as usize - 1].is_null()
        {
            debug_assert!(self.current_num_holes > 0);
            self.top_index -= 1;
            self.current_num_holes -= 1;
        }
    }

    /// Finds the highest hole in the current segment, if any are recorded.
    fn take_hole(&mut self) -> Option<u32> {
        if self.current_num_holes == 0 {
            return None;
        }

        let bottom_index = self.bottom_index();
        let index = (bottom_index..self.top_index)
            .rev()
            .find(|&i| self.table[i as usize].is_null())?;
        self.current_num_holes -= 1;
        Some(index)
    }

    /// Makes sure at least `required` slots are backed by storage.
    fn ensure_storage(&mut self, required: u64) -> Result<(), RefError> {
        let max_capacity = self.config.max_capacity;
        if required > u64::from(max_capacity) {
            return Err(RefError::CapacityExceeded {
                max_capacity,
                requested: required,
            });
        }

        let len = self.table.len();
        if required <= len as u64 {
            return Ok(());
        }

        let grown = (len as u64)
            .saturating_mul(u64::from(self.config.growth_factor))
            .max(u64::from(self.config.initial_capacity))
            .max(required)
            .min(u64::from(max_capacity)) as usize;

        self.table
            .try_reserve_exact(grown - len)
            .map_err(|_| RefError::CapacityExceeded {
                max_capacity,
                requested: required,
            })?;
        self.table.resize_with(grown, LrtEntry::default);
        self.stats.resizes += 1;
        debug!(target: TARGET, "grew local reference table {len} -> {grown} slots");
        Ok(())
    }

    /// Guarantees that `count` more entries can be added without failing.
    pub fn ensure_free_capacity(&mut self, count: u32) -> Result<(), RefError> {
        self.ensure_storage(u64::from(self.top_index) + u64::from(count))
    }

    /// Records the current `top_index` as the bottom of a new segment.
    pub fn push_segment(&mut self) -> SegmentCookie {
        self.stats.segments_pushed += 1;
        let cookie = SegmentCookie {
            top_index: self.top_index,
            depth: self.segments.len() as u32 + 1,
            epoch: self.stats.segments_pushed,
        };
        self.segments.push(SegmentMark {
            cookie,
            saved_holes: self.current_num_holes,
        });
        self.current_num_holes = 0;
        debug!(target: TARGET, "push {cookie}");
        cookie
    }

    /// Reserves room for `capacity` entries, then pushes a segment.
    pub fn push_frame(&mut self, capacity: u32) -> Result<SegmentCookie, RefError> {
        self.ensure_free_capacity(capacity)?;
        Ok(self.push_segment())
    }

    /// Pops the segment opened by `cookie`, clearing every slot it allocated.
    ///
    /// `cookie` must be the most recently pushed, still-open segment. Any
    /// other cookie is a protocol violation handled by the check policy,
    /// with no state changed.
    pub fn pop_segment(&mut self, cookie: SegmentCookie) -> Result<(), RefError> {
        let mark = match self.segments.last() {
            Some(mark) if mark.cookie == cookie => mark,
            top => {
                let err = RefError::ProtocolViolation {
                    expected: top.map(|mark| mark.cookie),
                    got: cookie,
                };
                return Err(self.enforce(err));
            }
        };

        let saved_holes = mark.saved_holes;
        let bottom = cookie.top_index as usize;
        for entry in &mut self.table[bottom..self.top_index as usize] {
            entry.clear();
        }

        self.top_index = cookie.top_index;
        self.current_num_holes = saved_holes;
        self.segments.pop();
        self.stats.segments_popped += 1;
        debug!(target: TARGET, "pop {cookie}");
        Ok(())
    }

    /// Releases storage above `top_index`, keeping at least the configured
    /// initial capacity.
    pub fn trim(&mut self) {
        let keep = (self.top_index as usize)
            .max(self.config.initial_capacity as usize)
            .min(self.table.len());
        if keep < self.table.len() {
            debug!(target: TARGET, "trim {} -> {keep} slots", self.table.len());
            self.table.truncate(keep);
            self.table.shrink_to_fit();
        }
    }

    /// Canonical handle for the current state of slot `index`.
    pub fn to_indirect_ref(&self, index: u32) -> IndirectRef {
        let serial = self
            .table
            .get(index as usize)
            .map_or(0, LrtEntry::serial);
        encode(RefKind::Local, index, serial)
    }
}
