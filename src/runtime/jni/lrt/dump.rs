use std::fmt;

use serde::Serialize;

use crate::runtime::{
    gc::{gc_root::WithoutReadBarrier, obj_ref::ObjRef},
    jni::error::RefError,
};

use super::LocalReferenceTable;

/// Cumulative counters, kept since the table was created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LrtStats {
    pub adds: u64,
    pub removes: u64,
    pub holes_reused: u64,
    pub segments_pushed: u64,
    pub segments_popped: u64,
    pub resizes: u64,
    pub peak_top_index: u32,
}

/// One slot below `top_index`. `referent` is `None` for a hole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DumpEntry {
    pub index: u32,
    pub serial: u32,
    pub referent: Option<ObjRef>,
}

/// Point-in-time summary of a table.
#[derive(Debug, Clone, Serialize)]
pub struct LrtDump {
    pub top_index: u32,
    pub capacity: usize,
    pub max_capacity: u32,
    pub live: usize,
    /// `top_index` saved by each open segment, outermost first.
    pub segment_marks: Vec<u32>,
    pub entries: Vec<DumpEntry>,
    pub stats: LrtStats,
}

impl LrtDump {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for LrtDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "local reference table: top_index={} capacity={} max={} live={}",
            self.top_index, self.capacity, self.max_capacity, self.live
        )?;
        writeln!(f, "  segments: {:?}", self.segment_marks)?;
        for entry in &self.entries {
            match entry.referent {
                Some(obj) => writeln!(f, "  [{}] {} (serial {})", entry.index, obj, entry.serial)?,
                None => writeln!(f, "  [{}] <hole> (serial {})", entry.index, entry.serial)?,
            }
        }
        Ok(())
    }
}

impl LocalReferenceTable {
    pub fn dump(&self) -> LrtDump {
        let entries: Vec<DumpEntry> = self.table[..self.top_index as usize]
            .iter()
            .enumerate()
            .map(|(index, entry)| DumpEntry {
                index: index as u32,
                serial: entry.serial(),
                referent: entry.read(&WithoutReadBarrier),
            })
            .collect();

        LrtDump {
            top_index: self.top_index,
            capacity: self.table.len(),
            max_capacity: self.config.max_capacity,
            live: entries.iter().filter(|e| e.referent.is_some()).count(),
            segment_marks: self
                .segments
                .iter()
                .map(|mark| mark.cookie.top_index)
                .collect(),
            entries,
            stats: self.stats.clone(),
        }
    }

    /// Number of occupied slots.
    pub fn live_count(&self) -> usize {
        self.table[..self.top_index as usize]
            .iter()
            .filter(|entry| !entry.is_null())
            .count()
    }

    pub fn assert_empty(&self) -> Result<(), RefError> {
        match self.live_count() {
            0 => Ok(()),
            live => Err(RefError::NotEmpty { live }),
        }
    }
}
