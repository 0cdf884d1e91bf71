//! Full-memory typed scans and the stateful where-chain

use crate::core::types::{MemoryError, MemoryResult, Offset, ScalarKind, ScalarValue};
use crate::memory::matcher::values_equal;
use crate::memory::reader::RawReader;
use crate::memory::MemorySource;
use tracing::debug;

/// The candidate set carried between narrowing commands, together with the
/// value it was last matched against.
#[derive(Debug, Default)]
struct WhereChain {
    offsets: Vec<Offset>,
    last: Option<ScalarValue>,
}

/// Typed search engine over one attached target.
///
/// All offsets accepted and returned here are relative to the target's main
/// module; translation to absolute addresses happens internally. The engine
/// owns the where-chain: `where_val` arms it, `where_became` and
/// `where_changed` narrow it, and a string search leaves it untouched.
pub struct ScanEngine<S> {
    source: S,
    chain: WhereChain,
}

impl<S: MemorySource> ScanEngine<S> {
    pub fn new(source: S) -> Self {
        ScanEngine {
            source,
            chain: WhereChain::default(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Absolute target address for a module-relative offset.
    pub fn as_absolute(&self, offset: Offset) -> u64 {
        self.source.module_base().wrapping_add(offset)
    }

    /// Module-relative offset for an absolute target address.
    pub fn to_offset(&self, address: u64) -> Offset {
        address.wrapping_sub(self.source.module_base())
    }

    /// Whether a value of `kind` is the width of a target pointer, making it
    /// a dereference candidate.
    pub fn is_pointer_width(&self, kind: ScalarKind) -> bool {
        kind.is_integer() && kind.width() == self.source.pointer_width()
    }

    /// Offsets currently held by the where-chain.
    pub fn chain_offsets(&self) -> &[Offset] {
        &self.chain.offsets
    }

    /// The value the chain was last matched against, if armed.
    pub fn chain_value(&self) -> Option<ScalarValue> {
        self.chain.last
    }

    /// Full scan: every offset in the target's readable regions whose
    /// contents equal `value` under the matching policy. Resets the
    /// where-chain to the result.
    pub fn where_val(&mut self, value: ScalarValue) -> &[Offset] {
        let offsets = self.find_value(value);
        debug!(kind = %value.kind(), matches = offsets.len(), "full scan complete");

        self.chain.offsets = offsets;
        self.chain.last = Some(value);
        &self.chain.offsets
    }

    /// Full-memory match without touching the where-chain. This is the
    /// primitive the pointer reverse index is built on.
    pub fn find_value(&self, value: ScalarValue) -> Vec<Offset> {
        let kind = value.kind();
        let width = kind.width();
        let reader = RawReader::new(&self.source);
        let mut offsets = Vec::new();

        for region in self.source.all_readable_regions() {
            let elements = region.size() / width;
            if elements == 0 {
                continue;
            }

            // One bulk read per region; a partial read skips the region.
            let Some(bytes) = reader.read_bytes(region.start(), elements * width) else {
                continue;
            };

            for (index, chunk) in bytes.chunks_exact(width).enumerate() {
                let Some(read) = ScalarValue::from_le_bytes(chunk, kind) else {
                    continue;
                };
                if values_equal(read, value) {
                    offsets.push(self.to_offset(region.address_at(index * width)));
                }
            }
        }

        offsets
    }

    /// Byte-level substring scan. Matches at every byte position, not just
    /// element-aligned ones, and does not interact with the where-chain.
    pub fn where_val_str(&self, needle: &str) -> Vec<Offset> {
        let needle = needle.as_bytes();
        let reader = RawReader::new(&self.source);
        let mut offsets = Vec::new();

        if needle.is_empty() {
            return offsets;
        }

        for region in self.source.all_readable_regions() {
            if region.size() < needle.len() {
                continue;
            }

            let Some(bytes) = reader.read_bytes(region.start(), region.size()) else {
                continue;
            };

            for (index, window) in bytes.windows(needle.len()).enumerate() {
                if window == needle {
                    offsets.push(self.to_offset(region.address_at(index)));
                }
            }
        }

        offsets
    }

    /// Narrows the chain to offsets whose current contents equal `value`.
    /// Offsets that fail to re-read are dropped. The chain's value becomes
    /// `value`.
    pub fn where_became(&mut self, value: ScalarValue) -> MemoryResult<&[Offset]> {
        let chain_kind = self.chain_kind()?;
        if chain_kind != value.kind() {
            return Err(MemoryError::ChainTypeMismatch {
                chain: chain_kind,
                requested: value.kind(),
            });
        }

        let reader = RawReader::new(&self.source);
        let kept = self
            .chain
            .offsets
            .iter()
            .copied()
            .filter(|&offset| {
                let address = self.source.module_base().wrapping_add(offset);
                reader
                    .read_value(address, value.kind())
                    .is_some_and(|read| values_equal(read, value))
            })
            .collect();

        self.chain.offsets = kept;
        self.chain.last = Some(value);
        Ok(&self.chain.offsets)
    }

    /// Narrows the chain to offsets whose current contents differ from the
    /// chain's remembered value. The remembered value stays as it was; the
    /// help text calls this the end of a chain but the offsets remain
    /// available for further narrowing.
    pub fn where_changed(&mut self, kind: ScalarKind) -> MemoryResult<&[Offset]> {
        let last = self.chain.last.ok_or(MemoryError::EmptyChain)?;
        if last.kind() != kind {
            return Err(MemoryError::ChainTypeMismatch {
                chain: last.kind(),
                requested: kind,
            });
        }

        let reader = RawReader::new(&self.source);
        let kept = self
            .chain
            .offsets
            .iter()
            .copied()
            .filter(|&offset| {
                let address = self.source.module_base().wrapping_add(offset);
                reader
                    .read_value(address, kind)
                    .is_some_and(|read| !values_equal(last, read))
            })
            .collect();

        self.chain.offsets = kept;
        Ok(&self.chain.offsets)
    }

    /// Reads one value of `kind` at a module-relative offset.
    pub fn read_value_at(&self, offset: Offset, kind: ScalarKind) -> Option<ScalarValue> {
        RawReader::new(&self.source).read_value(self.as_absolute(offset), kind)
    }

    /// Reads `count` consecutive values of `kind` at a module-relative
    /// offset.
    pub fn read_values_at(
        &self,
        offset: Offset,
        kind: ScalarKind,
        count: usize,
    ) -> Option<Vec<ScalarValue>> {
        RawReader::new(&self.source).read_values(self.as_absolute(offset), kind, count)
    }

    /// Best-effort printable string at a module-relative offset.
    pub fn read_string_at(&self, offset: Offset, max_bytes: usize) -> String {
        RawReader::new(&self.source).read_printable_string(self.as_absolute(offset), max_bytes)
    }

    /// Dereference preview: reads 8 bytes at an absolute address and, when
    /// they form a printable prefix, returns it. `None` when the address is
    /// unreadable, `Some("")` when readable but not a string.
    pub fn deref_preview(&self, address: u64) -> Option<String> {
        const PREVIEW_LEN: usize = 8;

        let reader = RawReader::new(&self.source);
        let bytes = reader.read_bytes(address, PREVIEW_LEN)?;

        let prefix_len = bytes
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(PREVIEW_LEN);
        let prefix = &bytes[..prefix_len];

        if prefix.iter().all(|&b| b.is_ascii_graphic() || b == b' ') {
            Some(prefix.iter().map(|&b| b as char).collect())
        } else {
            Some(String::new())
        }
    }

    fn chain_kind(&self) -> MemoryResult<ScalarKind> {
        self.chain
            .last
            .map(|value| value.kind())
            .ok_or(MemoryError::EmptyChain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::AddressRange;
    use crate::memory::Protection;
    use std::sync::Mutex;

    const BASE: u64 = 0x0040_0000;

    /// A mutable synthetic target: one region mapped at the module base.
    struct TestTarget {
        bytes: Mutex<Vec<u8>>,
    }

    impl TestTarget {
        fn new(size: usize) -> Self {
            TestTarget {
                bytes: Mutex::new(vec![0u8; size]),
            }
        }

        fn write(&self, offset: usize, data: &[u8]) {
            let mut bytes = self.bytes.lock().unwrap();
            bytes[offset..offset + data.len()].copy_from_slice(data);
        }
    }

    impl MemorySource for TestTarget {
        fn is_64_bit(&self) -> bool {
            true
        }

        fn module_base(&self) -> u64 {
            BASE
        }

        fn read_into(&self, address: u64, buf: &mut [u8]) -> bool {
            let bytes = self.bytes.lock().unwrap();
            let Some(start) = address.checked_sub(BASE) else {
                return false;
            };
            let start = start as usize;
            let end = start + buf.len();
            if end > bytes.len() {
                return false;
            }
            buf.copy_from_slice(&bytes[start..end]);
            true
        }

        fn cached_readonly_regions(&self) -> Vec<AddressRange> {
            Vec::new()
        }

        fn query_regions(&self, protection: Protection) -> Vec<AddressRange> {
            match protection {
                Protection::ReadWrite => {
                    vec![AddressRange::new(BASE, self.bytes.lock().unwrap().len())]
                }
                Protection::ReadOnly => Vec::new(),
            }
        }
    }

    #[test]
    fn test_where_val_finds_aligned_values() {
        let target = TestTarget::new(0x1000);
        target.write(0x400, &100i32.to_le_bytes());
        target.write(0x800, &100i32.to_le_bytes());

        let mut engine = ScanEngine::new(target);
        let offsets = engine.where_val(ScalarValue::I32(100)).to_vec();
        assert_eq!(offsets, vec![0x400, 0x800]);
    }

    #[test]
    fn test_where_val_strides_by_width() {
        let target = TestTarget::new(0x100);
        // Value sits at offset 2: invisible to a 4-byte stride.
        target.write(2, &7i32.to_le_bytes());

        let mut engine = ScanEngine::new(target);
        assert!(engine.where_val(ScalarValue::I32(7)).is_empty());
    }

    #[test]
    fn test_where_val_resets_chain() {
        let target = TestTarget::new(0x100);
        target.write(0x10, &5i32.to_le_bytes());
        target.write(0x20, &9i16.to_le_bytes());

        let mut engine = ScanEngine::new(target);
        engine.where_val(ScalarValue::I32(5));
        assert_eq!(engine.chain_value(), Some(ScalarValue::I32(5)));

        engine.where_val(ScalarValue::I16(9));
        assert_eq!(engine.chain_value(), Some(ScalarValue::I16(9)));
        assert_eq!(engine.chain_offsets(), &[0x20]);
    }

    #[test]
    fn test_where_became_narrows() {
        let target = TestTarget::new(0x1000);
        target.write(0x400, &100i32.to_le_bytes());
        target.write(0x800, &100i32.to_le_bytes());

        let mut engine = ScanEngine::new(target);
        engine.where_val(ScalarValue::I32(100));

        engine.source().write(0x400, &101i32.to_le_bytes());
        let kept = engine.where_became(ScalarValue::I32(100)).unwrap().to_vec();
        assert_eq!(kept, vec![0x800]);
        assert_eq!(engine.chain_value(), Some(ScalarValue::I32(100)));
    }

    #[test]
    fn test_where_became_empty_result() {
        let target = TestTarget::new(0x1000);
        target.write(0x400, &100i32.to_le_bytes());

        let mut engine = ScanEngine::new(target);
        engine.where_val(ScalarValue::I32(100));

        engine.source().write(0x400, &101i32.to_le_bytes());
        let kept = engine.where_became(ScalarValue::I32(100)).unwrap();
        assert!(kept.is_empty());
    }

    #[test]
    fn test_where_changed_keeps_last_value() {
        let target = TestTarget::new(0x1000);
        target.write(0x400, &100i32.to_le_bytes());
        target.write(0x800, &100i32.to_le_bytes());

        let mut engine = ScanEngine::new(target);
        engine.where_val(ScalarValue::I32(100));

        engine.source().write(0x400, &123i32.to_le_bytes());
        let changed = engine.where_changed(ScalarKind::I32).unwrap().to_vec();
        assert_eq!(changed, vec![0x400]);

        // The remembered value is still the one the chain was armed with.
        assert_eq!(engine.chain_value(), Some(ScalarValue::I32(100)));
    }

    #[test]
    fn test_chain_preconditions() {
        let target = TestTarget::new(0x100);
        let mut engine = ScanEngine::new(target);

        assert!(matches!(
            engine.where_became(ScalarValue::I32(1)),
            Err(MemoryError::EmptyChain)
        ));
        assert!(matches!(
            engine.where_changed(ScalarKind::I32),
            Err(MemoryError::EmptyChain)
        ));

        engine.where_val(ScalarValue::I32(1));
        assert!(matches!(
            engine.where_became(ScalarValue::F32(1.0)),
            Err(MemoryError::ChainTypeMismatch { .. })
        ));
        assert!(matches!(
            engine.where_changed(ScalarKind::I64),
            Err(MemoryError::ChainTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_string_scan_is_position_invariant() {
        let target = TestTarget::new(0x2000);
        target.write(0x1000, b"Hello");
        target.write(0x1543, b"Hello");

        let engine = ScanEngine::new(target);
        let offsets = engine.where_val_str("Hello");
        assert_eq!(offsets, vec![0x1000, 0x1543]);
    }

    #[test]
    fn test_string_scan_leaves_chain_alone() {
        let target = TestTarget::new(0x1000);
        target.write(0x10, &42i32.to_le_bytes());
        target.write(0x100, b"abc");

        let mut engine = ScanEngine::new(target);
        engine.where_val(ScalarValue::I32(42));
        let before = engine.chain_offsets().to_vec();

        engine.where_val_str("abc");
        assert_eq!(engine.chain_offsets(), &before[..]);
        assert_eq!(engine.chain_value(), Some(ScalarValue::I32(42)));
    }

    #[test]
    fn test_float_scan_with_tolerance() {
        let target = TestTarget::new(0x3000);
        target.write(0x2000, &3.14159f32.to_le_bytes());

        let mut engine = ScanEngine::new(target);
        let offsets = engine.where_val(ScalarValue::F32(3.1416)).to_vec();
        assert_eq!(offsets, vec![0x2000]);
    }

    #[test]
    fn test_results_match_on_reread() {
        let target = TestTarget::new(0x1000);
        target.write(0x20, &(-7i64).to_le_bytes());

        let mut engine = ScanEngine::new(target);
        let offsets = engine.where_val(ScalarValue::I64(-7)).to_vec();

        for offset in offsets {
            let read = engine.read_value_at(offset, ScalarKind::I64).unwrap();
            assert!(values_equal(read, ScalarValue::I64(-7)));
        }
    }

    #[test]
    fn test_deref_preview() {
        let target = TestTarget::new(0x100);
        target.write(0x40, b"Hi\0junk\0");

        let engine = ScanEngine::new(target);
        assert_eq!(engine.deref_preview(BASE + 0x40), Some("Hi".to_string()));
        // Unreadable address
        assert_eq!(engine.deref_preview(0x10), None);
    }

    #[test]
    fn test_deref_preview_non_string() {
        let target = TestTarget::new(0x100);
        target.write(0x40, &[0x01, 0x02, 0x03, 0x04, 0, 0, 0, 0]);

        let engine = ScanEngine::new(target);
        assert_eq!(engine.deref_preview(BASE + 0x40), Some(String::new()));
    }
}
