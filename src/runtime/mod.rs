//! Native-interop reference management.
//!
//! # Ownership Invariant
//! A [`LocalReferenceTable`](jni::LocalReferenceTable) is a plain value owned
//! by the execution context (thread) it serves. There is no process-wide
//! table and no internal locking: only the owning context adds, removes, or
//! pushes and pops segments. The managed heap is shared, so the collector may
//! relocate referents, but it reaches the table only through
//! `visit_roots` while the owner is suspended, or through a
//! [`WithReadBarrier`](gc::WithReadBarrier) read at call sites that can race
//! with relocation.
//!
//! The table holds `Cell`-based roots and is therefore `!Sync`, which makes
//! the single-owner contract a compile-time property.

pub mod gc;
pub mod jni;
