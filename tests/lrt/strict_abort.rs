//! Strict mode aborts the process, so each case re-runs this test binary as
//! a child with `LOCALREF_ABORT_CASE` set and inspects how the child died.

#![cfg(unix)]

use std::env;
use std::os::unix::process::ExitStatusExt;
use std::process::Command;

use localref::{LocalReferenceTable, ObjRef};

const CASE_VAR: &str = "LOCALREF_ABORT_CASE";
const SIGABRT: i32 = 6;

fn obj(addr: usize) -> ObjRef {
    ObjRef::new(addr).unwrap()
}

/// Runs `name` in a child process and returns its stderr after checking
/// that it was killed by SIGABRT.
fn run_aborting_child(name: &str) -> String {
    let exe = env::current_exe().unwrap();
    let output = Command::new(exe)
        .args([name, "--exact", "--nocapture", "--test-threads=1"])
        .env(CASE_VAR, name)
        .output()
        .unwrap();

    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        output.status.signal(),
        Some(SIGABRT),
        "child {name} exited with {:?}\nstderr:\n{stderr}",
        output.status
    );
    assert!(!stdout.contains("survived"), "stdout:\n{stdout}");
    stderr
}

fn in_child(name: &str) -> bool {
    env::var(CASE_VAR).is_ok_and(|case| case == name)
}

#[test]
fn double_remove_aborts() {
    if in_child("double_remove_aborts") {
        let mut table = LocalReferenceTable::new();
        let h = table.add(obj(0x10)).unwrap();
        table.add(obj(0x20)).unwrap();
        table.remove(h).unwrap();
        let _ = table.remove(h);
        println!("survived");
        return;
    }

    let stderr = run_aborting_child("double_remove_aborts");
    assert!(stderr.contains("localref: fatal: deleted reference at index 0"), "{stderr}");
    assert!(stderr.contains("local reference table: top_index=2"), "{stderr}");
    assert!(stderr.contains("[0] <hole> (serial 1)"), "{stderr}");
}

#[test]
fn out_of_order_pop_aborts() {
    if in_child("out_of_order_pop_aborts") {
        let mut table = LocalReferenceTable::new();
        table.add(obj(0x10)).unwrap();
        let outer = table.push_segment();
        let _inner = table.push_segment();
        let _ = table.pop_segment(outer);
        println!("survived");
        return;
    }

    let stderr = run_aborting_child("out_of_order_pop_aborts");
    assert!(stderr.contains("localref: fatal: segment pop out of order"), "{stderr}");
    assert!(stderr.contains("segments: [1, 1]"), "{stderr}");
}

#[test]
fn update_of_stale_handle_aborts() {
    if in_child("update_of_stale_handle_aborts") {
        let mut table = LocalReferenceTable::new();
        let old = table.add(obj(0x10)).unwrap();
        table.remove(old).unwrap();
        table.add(obj(0x20)).unwrap();
        let _ = table.update(old, obj(0x30));
        println!("survived");
        return;
    }

    let stderr = run_aborting_child("update_of_stale_handle_aborts");
    assert!(stderr.contains("localref: fatal: JNI ERROR (app bug): attempt to update"), "{stderr}");
    assert!(stderr.contains("[0] 0x20 (serial 2)"), "{stderr}");
}

#[test]
fn check_entry_of_unallocated_slot_aborts() {
    if in_child("check_entry_of_unallocated_slot_aborts") {
        let table = LocalReferenceTable::new();
        let forged = localref::runtime::jni::indirect_ref::encode(localref::RefKind::Local, 99, 0);
        let _ = table.check_entry("use", forged, 99);
        println!("survived");
        return;
    }

    let stderr = run_aborting_child("check_entry_of_unallocated_slot_aborts");
    assert!(
        stderr.contains("localref: fatal: deleted reference at index 99 in a table of size 0"),
        "{stderr}"
    );
    assert!(stderr.contains("local reference table: top_index=0"), "{stderr}");
}
