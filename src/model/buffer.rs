// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

/// A shareable, write-once, multi-reader byte region.
///
/// Conceptually a reference-counted handle to a contiguous page of bytes:
/// cloning a `Buffer` never copies the underlying bytes, only the handle.
/// A `Buffer` is published to [`crate::scheduler::WorkflowState::results`]
/// exactly once by its producing task and is never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Buffer {
    bytes: Arc<[u8]>,
    tag: BufferTypeTag,
}

impl Buffer {
    pub fn new(tag: BufferTypeTag, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self { bytes: bytes.into(), tag }
    }

    pub fn tag(&self) -> BufferTypeTag {
        self.tag
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// The element type of a [`Buffer`]. The conversion between a tag and a
/// concrete typed-array kind is a pure, mechanical mapping left to a
/// host-facing layer; kept here only as the enumerated set the data model
/// depends on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BufferTypeTag {
    Float32,
    Float64,
    Int8,
    Int16,
    Int32,
    Uint8,
    Uint8Clamped,
    Uint16,
    Uint32,
    BigInt64,
    BigUint64,
}

impl BufferTypeTag {
    /// Width in bytes of a single element of this tag.
    pub fn element_width(self) -> usize {
        match self {
            BufferTypeTag::Int8 | BufferTypeTag::Uint8 | BufferTypeTag::Uint8Clamped => 1,
            BufferTypeTag::Int16 | BufferTypeTag::Uint16 => 2,
            BufferTypeTag::Int32 | BufferTypeTag::Uint32 | BufferTypeTag::Float32 => 4,
            BufferTypeTag::Float64 | BufferTypeTag::BigInt64 | BufferTypeTag::BigUint64 => 8,
        }
    }

    /// Whether a byte length is a valid length for this tag (a multiple of
    /// its element width).
    pub fn is_valid_length(self, len: usize) -> bool {
        len % self.element_width() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_width_matches_every_tag() {
        assert_eq!(BufferTypeTag::Uint8.element_width(), 1);
        assert_eq!(BufferTypeTag::Uint8Clamped.element_width(), 1);
        assert_eq!(BufferTypeTag::Int8.element_width(), 1);
        assert_eq!(BufferTypeTag::Int16.element_width(), 2);
        assert_eq!(BufferTypeTag::Uint16.element_width(), 2);
        assert_eq!(BufferTypeTag::Int32.element_width(), 4);
        assert_eq!(BufferTypeTag::Uint32.element_width(), 4);
        assert_eq!(BufferTypeTag::Float32.element_width(), 4);
        assert_eq!(BufferTypeTag::Float64.element_width(), 8);
        assert_eq!(BufferTypeTag::BigInt64.element_width(), 8);
        assert_eq!(BufferTypeTag::BigUint64.element_width(), 8);
    }

    #[test]
    fn rejects_misaligned_lengths() {
        assert!(!BufferTypeTag::Float64.is_valid_length(12));
        assert!(BufferTypeTag::Float64.is_valid_length(16));
    }

    #[test]
    fn clone_shares_the_same_allocation() {
        let buf = Buffer::new(BufferTypeTag::Uint8, vec![1, 2, 3]);
        let clone = buf.clone();
        assert!(Arc::ptr_eq(&buf.bytes, &clone.bytes));
    }

    #[test]
    fn tag_round_trips_through_serde() {
        for tag in [
            BufferTypeTag::Float32,
            BufferTypeTag::Float64,
            BufferTypeTag::Int8,
            BufferTypeTag::Int16,
            BufferTypeTag::Int32,
            BufferTypeTag::Uint8,
            BufferTypeTag::Uint8Clamped,
            BufferTypeTag::Uint16,
            BufferTypeTag::Uint32,
            BufferTypeTag::BigInt64,
            BufferTypeTag::BigUint64,
        ] {
            let json = serde_json::to_string(&tag).unwrap();
            let back: BufferTypeTag = serde_json::from_str(&json).unwrap();
            assert_eq!(tag, back);
        }
    }
}
