use crate::runtime::{
    gc::{
        gc_root::{GcRoot, ReadBarrier},
        obj_ref::ObjRef,
    },
    jni::indirect_ref::MAX_SERIAL,
};

/// One cell of a local reference table: a root plus a cycling serial.
///
/// The serial is bumped only when the cell is (re)allocated, so a handle
/// issued for a previous occupant no longer matches.
#[derive(Debug, Default)]
pub struct LrtEntry {
    reference: GcRoot,
    serial: u32,
}

impl LrtEntry {
    /// Stores `obj` as a new occupant, advancing the serial.
    pub fn add(&mut self, obj: ObjRef) {
        self.serial += 1;
        if self.serial == MAX_SERIAL {
            self.serial = 0;
        }
        self.reference.store(Some(obj));
    }

    /// Rebinds the current occupant without touching the serial.
    pub fn set_reference(&mut self, obj: ObjRef) {
        debug_assert!(self.serial < MAX_SERIAL);
        self.reference.store(Some(obj));
    }

    /// Empties the cell. The serial stays until the next `add`.
    pub fn clear(&mut self) {
        self.reference.store(None);
    }

    pub fn read<B: ReadBarrier + ?Sized>(&self, barrier: &B) -> Option<ObjRef> {
        self.reference.read(barrier)
    }

    pub fn is_null(&self) -> bool {
        self.reference.is_null()
    }

    pub fn serial(&self) -> u32 {
        self.serial
    }
}
