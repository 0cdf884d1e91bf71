//! Reverse index of candidate pointers leading to an anchor offset

use crate::core::types::{Offset, ScalarValue};
use crate::memory::{MemorySource, ScanEngine};
use std::collections::{HashMap, VecDeque};
use tracing::debug;

/// Maps a target site to every offset whose raw contents interpret as a
/// pointer to it. Closed under its values: every offset appearing in a value
/// list is itself a key.
pub type PointerMap = HashMap<Offset, Vec<Offset>>;

/// The transitive pointer DAG anchored at one offset.
///
/// Built with an explicit work list and a visited check rather than direct
/// recursion, so cyclic and self-referential pointer graphs terminate
/// without bounding the depth.
#[derive(Debug)]
pub struct PointerReverseIndex {
    anchor: Offset,
    map: PointerMap,
}

impl PointerReverseIndex {
    /// Finds every candidate pointer to `anchor`, then to each of those
    /// pointers, until the frontier is exhausted.
    ///
    /// On 64-bit targets a candidate is an offset holding the anchor's full
    /// absolute address; on 32-bit targets, its low 32 bits.
    pub fn build<S: MemorySource>(engine: &ScanEngine<S>, anchor: Offset) -> Self {
        let mut map = PointerMap::new();
        let mut queue = VecDeque::from([anchor]);

        while let Some(site) = queue.pop_front() {
            if map.contains_key(&site) {
                continue;
            }

            let absolute = engine.as_absolute(site);
            let needle = if engine.source().is_64_bit() {
                ScalarValue::U64(absolute)
            } else {
                ScalarValue::U32(absolute as u32)
            };

            let pointers = engine.find_value(needle);
            for &pointer in &pointers {
                if !map.contains_key(&pointer) {
                    queue.push_back(pointer);
                }
            }

            map.insert(site, pointers);
        }

        debug!(anchor, sites = map.len(), "pointer index complete");
        PointerReverseIndex { anchor, map }
    }

    pub fn anchor(&self) -> Offset {
        self.anchor
    }

    /// Candidate pointers to `site`, if `site` was reached by the build.
    pub fn pointers_to(&self, site: Offset) -> Option<&[Offset]> {
        self.map.get(&site).map(Vec::as_slice)
    }

    pub fn map(&self) -> &PointerMap {
        &self.map
    }

    /// Number of sites indexed, the anchor included.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
