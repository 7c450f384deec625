use crate::runtime::{
    gc::{
        gc_root::WithoutReadBarrier,
        obj_ref::ObjRef,
        root_visitor::{Root, RootType, RootVisitor},
    },
    jni::lrt_entry::LrtEntry,
};

use super::LocalReferenceTable;

/// A live slot exposed to the collector during root enumeration.
pub struct LocalRoot<'a> {
    entry: &'a mut LrtEntry,
    obj: ObjRef,
    index: u32,
}

impl LocalRoot<'_> {
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl Root for LocalRoot<'_> {
    fn get(&self) -> ObjRef {
        self.obj
    }

    fn update_in_place(&mut self, obj: ObjRef) {
        self.entry.set_reference(obj);
        self.obj = obj;
    }

    fn root_type(&self) -> RootType {
        RootType::JniLocal { index: self.index }
    }
}

impl LocalReferenceTable {
    /// Hands every occupied slot in `[0, top_index)` to `visitor`.
    ///
    /// Must only be called while the owning thread is suspended or otherwise
    /// not mutating the table. Rewrites done through the visitor keep every
    /// outstanding handle valid.
    pub fn visit_roots<V: RootVisitor + ?Sized>(&mut self, visitor: &mut V) -> usize {
        let mut visited = 0;
        let top = self.top_index as usize;

        for (index, entry) in self.table[..top].iter_mut().enumerate() {
            let Some(obj) = entry.read(&WithoutReadBarrier) else {
                continue;
            };
            let mut root = LocalRoot {
                entry,
                obj,
                index: index as u32,
            };
            visitor.visit_root(&mut root);
            visited += 1;
        }

        visited
    }
}
