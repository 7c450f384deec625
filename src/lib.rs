pub mod runtime;

pub use runtime::gc::ObjRef;
pub use runtime::jni::{
    CheckMode, IndirectRef, LocalReferenceTable, LrtConfig, RefError, RefKind, SegmentCookie,
};
