use crate::runtime::{
    gc::{
        gc_root::{ReadBarrier, WithoutReadBarrier},
        obj_ref::ObjRef,
    },
    jni::{
        config::CheckMode,
        diagnostics,
        error::RefError,
        indirect_ref::{IndirectRef, RefKind},
    },
};

use super::LocalReferenceTable;

impl LocalReferenceTable {
    /// Checks `iref` against the slot it names. Never aborts.
    ///
    /// The reasons are checked in order: wrong kind, index outside the live
    /// range, empty slot, then serial mismatch.
    pub fn is_valid_reference(&self, iref: IndirectRef) -> Result<(), RefError> {
        let index = self.locate(iref)?;
        let entry_serial = self.table[index as usize].serial();
        let handle_serial = iref.serial();
        if handle_serial != entry_serial {
            return Err(RefError::StaleHandle {
                iref,
                handle_serial,
                entry_serial,
            });
        }
        Ok(())
    }

    /// Kind, range and occupancy checks; returns the slot index.
    fn locate(&self, iref: IndirectRef) -> Result<u32, RefError> {
        let kind = iref.kind();
        if iref.is_null() || kind != RefKind::Local {
            return Err(RefError::WrongKind { iref, kind });
        }

        let index = iref.index();
        if index >= self.top_index {
            return Err(RefError::OutOfSegment {
                index,
                top_index: self.top_index,
            });
        }
        if self.table[index as usize].is_null() {
            return Err(RefError::DanglingHandle { index });
        }
        Ok(index)
    }

    /// Makes sure the slot at `index` is correctly paired with `iref`.
    ///
    /// Recomputes the canonical handle for the slot's current state and
    /// compares. An index at or above `top_index` names no slot at all. Either
    /// failure goes through the check policy.
    pub fn check_entry(
        &self,
        what: &'static str,
        iref: IndirectRef,
        index: u32,
    ) -> Result<(), RefError> {
        if index >= self.top_index {
            return Err(self.enforce(RefError::OutOfSegment {
                index,
                top_index: self.top_index,
            }));
        }
        let expected = self.to_indirect_ref(index);
        if expected != iref {
            return Err(self.enforce(RefError::EntryMismatch {
                what,
                iref,
                expected,
            }));
        }
        Ok(())
    }

    /// Resolves `iref` without a read barrier.
    ///
    /// Only correct where no relocation can be in flight; otherwise use
    /// [`Self::lookup_with`] and a [`WithReadBarrier`](crate::runtime::gc::WithReadBarrier).
    pub fn lookup(&self, iref: IndirectRef) -> Result<ObjRef, RefError> {
        self.lookup_with(iref, &WithoutReadBarrier)
    }

    /// Resolves `iref` through the given barrier policy.
    ///
    /// The result is re-read from the slot on every call; callers must not
    /// keep it across a point where the collector may run.
    pub fn lookup_with<B: ReadBarrier + ?Sized>(
        &self,
        iref: IndirectRef,
        barrier: &B,
    ) -> Result<ObjRef, RefError> {
        self.is_valid_reference(iref)?;
        let index = iref.index();
        self.table[index as usize]
            .read(barrier)
            .ok_or(RefError::DanglingHandle { index })
    }

    /// Rebinds a live handle to `obj`, keeping the handle valid.
    pub fn update(&mut self, iref: IndirectRef, obj: ObjRef) -> Result<(), RefError> {
        let index = self.locate(iref).map_err(|err| self.enforce(err))?;
        self.check_entry("update", iref, index)?;
        self.table[index as usize].set_reference(obj);
        Ok(())
    }

    /// Applies the configured check policy to a misuse.
    pub(super) fn enforce(&self, err: RefError) -> RefError {
        match self.config.check_mode {
            CheckMode::Strict => diagnostics::fatal(&err, self.dump()),
            CheckMode::Permissive => diagnostics::report(err),
        }
    }
}
