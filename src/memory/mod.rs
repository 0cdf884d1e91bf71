//! Memory inspection for a foreign process
//!
//! This module holds the scanner core: region enumeration, bounds-checked
//! bulk reads, type-aware matching, the stateful where-chain engine and the
//! pointer reverse index. Everything here works against the [`MemorySource`]
//! trait so the engine runs identically over a live Win32 process and over
//! the in-memory targets the tests use.

pub mod matcher;
pub mod pointers;
pub mod reader;
pub mod regions;
pub mod scanner;

pub use matcher::{values_equal, FLOAT_TOLERANCE};
pub use pointers::{PointerMap, PointerReverseIndex};
pub use reader::RawReader;
pub use regions::Protection;
pub use scanner::ScanEngine;

use crate::core::types::AddressRange;

/// Read access to a target process's committed memory.
///
/// The live implementation is [`crate::process::Session`]; tests implement
/// this over a byte map. All addresses are absolute in the target.
pub trait MemorySource {
    /// Whether the target uses 64-bit pointers.
    fn is_64_bit(&self) -> bool;

    /// Load address of the target's main executable module.
    fn module_base(&self) -> u64;

    /// Fills `buf` from `address`. A short read is a failure: `buf` contents
    /// are unspecified and `false` is returned.
    fn read_into(&self, address: u64, buf: &mut [u8]) -> bool;

    /// The read-only regions captured once at attach time.
    fn cached_readonly_regions(&self) -> Vec<AddressRange>;

    /// A fresh walk of the target's committed regions with exactly the given
    /// protection.
    fn query_regions(&self, protection: Protection) -> Vec<AddressRange>;

    /// Byte width of a pointer in the target.
    fn pointer_width(&self) -> usize {
        if self.is_64_bit() {
            8
        } else {
            4
        }
    }

    /// Every region a scan should visit: the read-only set captured at
    /// attach, then a fresh read/write enumeration. The re-query keeps
    /// candidate sets current when the target's allocator has moved.
    fn all_readable_regions(&self) -> Vec<AddressRange> {
        let mut all = self.cached_readonly_regions();
        all.extend(self.query_regions(Protection::ReadWrite));
        all
    }
}
