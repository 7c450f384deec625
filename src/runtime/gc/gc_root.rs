use std::cell::Cell;

use crate::runtime::gc::obj_ref::ObjRef;

/// Collector-side view of objects that have been (or are being) relocated.
///
/// A moving collector implements this to answer "where does `obj` live now?".
/// `None` means the object has not moved.
pub trait Forwarding {
    fn forwarding_address(&self, obj: ObjRef) -> Option<ObjRef>;
}

impl<F> Forwarding for F
where
    F: Fn(ObjRef) -> Option<ObjRef>,
{
    fn forwarding_address(&self, obj: ObjRef) -> Option<ObjRef> {
        self(obj)
    }
}

/// Indirection cell holding at most one object reference.
///
/// The cell is interior-mutable so a barrier-checked read can heal a root
/// that points at a forwarded object without requiring `&mut` access to the
/// owning table.
#[derive(Debug, Default)]
pub struct GcRoot {
    reference: Cell<Option<ObjRef>>,
}

impl GcRoot {
    pub fn new(obj: ObjRef) -> Self {
        Self {
            reference: Cell::new(Some(obj)),
        }
    }

    pub fn is_null(&self) -> bool {
        self.reference.get().is_none()
    }

    /// Reads the stored reference through the given barrier policy.
    pub fn read<B: ReadBarrier + ?Sized>(&self, barrier: &B) -> Option<ObjRef> {
        barrier.read(self)
    }

    pub(crate) fn load(&self) -> Option<ObjRef> {
        self.reference.get()
    }

    pub(crate) fn store(&self, obj: Option<ObjRef>) {
        self.reference.set(obj);
    }
}

mod sealed {
    pub trait Sealed {}
}

/// How a stored root is read.
///
/// There are exactly two policies: [`WithoutReadBarrier`] for call sites where
/// no relocation can be in flight, and [`WithReadBarrier`] for call sites that
/// may race with a moving collector.
pub trait ReadBarrier: sealed::Sealed {
    fn read(&self, root: &GcRoot) -> Option<ObjRef>;
}

/// Unchecked fast path: returns the stored reference as is.
#[derive(Debug, Clone, Copy, Default)]
pub struct WithoutReadBarrier;

impl sealed::Sealed for WithoutReadBarrier {}

impl ReadBarrier for WithoutReadBarrier {
    #[inline]
    fn read(&self, root: &GcRoot) -> Option<ObjRef> {
        root.load()
    }
}

/// Barrier-checked path: consults the collector's forwarding information and
/// heals the root in place when the referent has moved.
#[derive(Debug, Clone, Copy)]
pub struct WithReadBarrier<F> {
    forwarding: F,
}

impl<F: Forwarding> WithReadBarrier<F> {
    pub fn new(forwarding: F) -> Self {
        Self { forwarding }
    }
}

impl<F: Forwarding> sealed::Sealed for WithReadBarrier<F> {}

impl<F: Forwarding> ReadBarrier for WithReadBarrier<F> {
    fn read(&self, root: &GcRoot) -> Option<ObjRef> {
        let obj = root.load()?;
        match self.forwarding.forwarding_address(obj) {
            Some(to) => {
                root.store(Some(to));
                Some(to)
            }
            None => Some(obj),
        }
    }
}
