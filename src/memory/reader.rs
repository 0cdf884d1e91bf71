//! Bounds-checked bulk reads over a memory source

use crate::core::types::{ScalarKind, ScalarValue};
use crate::memory::MemorySource;

/// Chunk size for the best-effort string read.
const STRING_CHUNK: usize = 64;

/// Typed reads over absolute target addresses.
///
/// Every read is all-or-nothing: a short read yields `None`, never a
/// truncated buffer. The offset-to-absolute translation happens in
/// [`crate::memory::ScanEngine`]; this layer only sees absolute addresses.
pub struct RawReader<'a, S> {
    source: &'a S,
}

impl<'a, S: MemorySource> RawReader<'a, S> {
    pub fn new(source: &'a S) -> Self {
        RawReader { source }
    }

    /// Reads exactly `len` bytes at `address`.
    pub fn read_bytes(&self, address: u64, len: usize) -> Option<Vec<u8>> {
        let mut buf = vec![0u8; len];
        if self.source.read_into(address, &mut buf) {
            Some(buf)
        } else {
            None
        }
    }

    /// Reads one value of `kind` at `address`.
    pub fn read_value(&self, address: u64, kind: ScalarKind) -> Option<ScalarValue> {
        let buf = self.read_bytes(address, kind.width())?;
        ScalarValue::from_le_bytes(&buf, kind)
    }

    /// Reads `count` consecutive values of `kind` starting at `address`.
    pub fn read_values(
        &self,
        address: u64,
        kind: ScalarKind,
        count: usize,
    ) -> Option<Vec<ScalarValue>> {
        let width = kind.width();
        let buf = self.read_bytes(address, count * width)?;

        let values = buf
            .chunks_exact(width)
            .filter_map(|chunk| ScalarValue::from_le_bytes(chunk, kind))
            .collect::<Vec<_>>();
        debug_assert_eq!(values.len(), count);

        Some(values)
    }

    /// Best-effort printable-ASCII string read.
    ///
    /// Accumulates bytes in fixed 64-byte chunks until a NUL or
    /// non-printable byte, a failed chunk read, or `max_bytes` consumed.
    /// Never errors; returns whatever was accumulated.
    pub fn read_printable_string(&self, address: u64, max_bytes: usize) -> String {
        let mut out = String::new();
        let mut chunk = [0u8; STRING_CHUNK];
        let mut total_read = 0;

        while total_read < max_bytes {
            if !self.source.read_into(address + total_read as u64, &mut chunk) {
                return out;
            }

            for &byte in &chunk {
                let printable = byte.is_ascii_graphic() || byte == b' ';
                if byte == 0 || !printable {
                    return out;
                }
                out.push(byte as char);
            }

            total_read += STRING_CHUNK;
        }

        out
    }
}
