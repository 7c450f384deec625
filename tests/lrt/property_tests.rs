//! Property-based tests for the local reference table.
//!
//! Uses proptest to drive random operation sequences against a simple model.

use localref::runtime::jni::indirect_ref::{MAX_SERIAL, decode, encode};
use localref::{CheckMode, LocalReferenceTable, LrtConfig, ObjRef, RefKind, SegmentCookie};
use proptest::prelude::*;

fn ref_kind() -> impl Strategy<Value = RefKind> {
    prop_oneof![
        Just(RefKind::JniTransition),
        Just(RefKind::Local),
        Just(RefKind::Global),
        Just(RefKind::WeakGlobal),
    ]
}

#[derive(Debug, Clone)]
enum Op {
    Add,
    /// Remove the n-th (mod len) live handle of the current segment.
    Remove(usize),
    Push,
    Pop,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        5 => Just(Op::Add),
        4 => any::<usize>().prop_map(Op::Remove),
        1 => Just(Op::Push),
        1 => Just(Op::Pop),
    ]
}

struct Issued {
    handle: localref::IndirectRef,
    obj: ObjRef,
    live: bool,
}

struct Segment {
    cookie: Option<SegmentCookie>,
    issued: Vec<usize>,
}

proptest! {
    /// Packing then unpacking is the identity on every representable triple.
    #[test]
    fn codec_roundtrip(kind in ref_kind(), index in any::<u32>(), serial in 0..MAX_SERIAL) {
        let iref = encode(kind, index, serial);
        prop_assert_eq!(decode(iref), (kind, index, serial));
    }

    /// Distinct triples never share a handle word.
    #[test]
    fn codec_is_injective(
        a in (ref_kind(), any::<u32>(), 0..MAX_SERIAL),
        b in (ref_kind(), any::<u32>(), 0..MAX_SERIAL),
    ) {
        prop_assume!(a != b);
        prop_assert_ne!(encode(a.0, a.1, a.2), encode(b.0, b.1, b.2));
    }

    /// Random add/remove/push/pop sequences agree with a reference model.
    #[test]
    fn table_matches_model(ops in prop::collection::vec(op(), 1..300)) {
        let mut table = LocalReferenceTable::with_config(
            LrtConfig::default()
                .with_initial_capacity(4)
                .with_max_capacity(1024)
                .with_check_mode(CheckMode::Permissive),
        );
        let mut issued: Vec<Issued> = Vec::new();
        let mut segments = vec![Segment { cookie: None, issued: Vec::new() }];
        let mut next_addr = 0x1000usize;

        for op in ops {
            match op {
                Op::Add => {
                    let obj = ObjRef::new(next_addr).unwrap();
                    next_addr += 0x10;
                    let handle = table.add(obj).unwrap();
                    prop_assert_eq!(table.lookup(handle), Ok(obj));
                    segments.last_mut().unwrap().issued.push(issued.len());
                    issued.push(Issued { handle, obj, live: true });
                }
                Op::Remove(n) => {
                    let live: Vec<usize> = segments
                        .last()
                        .unwrap()
                        .issued
                        .iter()
                        .copied()
                        .filter(|&i| issued[i].live)
                        .collect();
                    if live.is_empty() {
                        continue;
                    }
                    let victim = live[n % live.len()];
                    prop_assert!(table.remove(issued[victim].handle).is_ok());
                    issued[victim].live = false;
                }
                Op::Push => {
                    let cookie = table.push_segment();
                    prop_assert_eq!(cookie.top_index(), table.top_index());
                    segments.push(Segment { cookie: Some(cookie), issued: Vec::new() });
                }
                Op::Pop => {
                    if segments.len() == 1 {
                        continue;
                    }
                    let segment = segments.pop().unwrap();
                    let cookie = segment.cookie.unwrap();
                    prop_assert!(table.pop_segment(cookie).is_ok());
                    prop_assert_eq!(table.top_index(), cookie.top_index());
                    for i in segment.issued {
                        issued[i].live = false;
                    }
                }
            }

            let live_count = issued.iter().filter(|i| i.live).count();
            prop_assert_eq!(table.live_count(), live_count);
            prop_assert_eq!(table.is_empty(), live_count == 0);
            for entry in &issued {
                if entry.live {
                    prop_assert_eq!(table.lookup(entry.handle), Ok(entry.obj));
                    prop_assert!(entry.handle.index() < table.top_index());
                } else {
                    // A dead handle may alias a newer occupant after the serial
                    // wraps, but it never resolves to its own object again.
                    prop_assert_ne!(table.lookup(entry.handle), Ok(entry.obj));
                }
            }
        }
    }
}
