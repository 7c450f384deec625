pub mod gc_root;
pub mod obj_ref;
pub mod root_visitor;

pub use gc_root::{Forwarding, GcRoot, ReadBarrier, WithReadBarrier, WithoutReadBarrier};
pub use obj_ref::ObjRef;
pub use root_visitor::{Root, RootType, RootVisitor};
