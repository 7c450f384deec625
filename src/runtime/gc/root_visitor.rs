use crate::runtime::gc::obj_ref::ObjRef;

/// Where a visited root lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootType {
    /// A slot of a thread's local reference table.
    JniLocal { index: u32 },
}

/// A live root handed to the collector during root enumeration.
///
/// The collector may read the referent and, when it moves the object,
/// rewrite the root in place. Rewriting never changes which handle resolves
/// to this root.
pub trait Root {
    fn get(&self) -> ObjRef;

    fn update_in_place(&mut self, obj: ObjRef);

    fn root_type(&self) -> RootType;
}

/// Implemented by the collector's root-marking logic.
pub trait RootVisitor {
    fn visit_root(&mut self, root: &mut dyn Root);
}

impl<F> RootVisitor for F
where
    F: FnMut(&mut dyn Root),
{
    fn visit_root(&mut self, root: &mut dyn Root) {
        self(root)
    }
}
