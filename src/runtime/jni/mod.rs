pub mod config;
pub mod diagnostics;
pub mod error;
pub mod indirect_ref;
pub mod lrt;
pub mod lrt_entry;

pub use config::{CheckMode, LrtConfig};
pub use error::RefError;
pub use indirect_ref::{IndirectRef, RefKind};
pub use lrt::{LocalReferenceTable, SegmentCookie};
