//! Tokenizing and number parsing for the command line

use crate::core::types::{MemoryError, MemoryResult};

/// Splits a command line into whitespace-delimited tokens. Runs of
/// whitespace collapse, so rejoining tokens with single spaces loses the
/// original spacing.
pub fn tokenize(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

/// Parses an address or offset: decimal or `0x`-prefixed hex.
pub fn parse_offset(text: &str) -> MemoryResult<u64> {
    let parsed = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16)
    } else {
        text.parse::<u64>()
    };

    parsed.map_err(|_| MemoryError::ParseFailed(format!("'{}' is not a valid address", text)))
}

/// Parses a signed element count.
pub fn parse_count(text: &str) -> MemoryResult<i64> {
    text.parse::<i64>()
        .map_err(|_| MemoryError::ParseFailed(format!("'{}' is not a valid count", text)))
}
