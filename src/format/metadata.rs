// Metadata TLV block.
//
// A sequence of `[tag: u8][len: u8][value: len bytes]` records carrying
// deployment preconditions for the target artifact. Readers skip tags they
// do not recognize, so new records can be added without a version bump.
//
// The four standard records are emitted in a fixed order (arena, ABI,
// opset, I/O) and only when their resolved value is non-zero.

use thiserror::Error;

use super::{
    MAX_METADATA_LEN, MAX_TLV_VALUE, TAG_ABI_VERSION, TAG_IO_FINGERPRINT, TAG_OPSET_FINGERPRINT,
    TAG_REQ_ARENA_BYTES,
};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetadataError {
    #[error("metadata value for tag {tag:#04x} is {len} bytes (max {max})", max = MAX_TLV_VALUE)]
    ValueTooLarge { tag: u8, len: usize },

    #[error("metadata block is {0} bytes (max {max})", max = MAX_METADATA_LEN)]
    BlockTooLarge(usize),

    #[error("metadata tag {tag:#04x} declares {declared} bytes but only {available} remain")]
    Truncated {
        tag: u8,
        declared: usize,
        available: usize,
    },

    #[error("metadata tag {tag:#04x} has no length byte")]
    MissingLength { tag: u8 },
}

// ---------------------------------------------------------------------------
// Records and builder
// ---------------------------------------------------------------------------

/// A single tag/length/value record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRecord {
    pub tag: u8,
    pub value: Vec<u8>,
}

/// Generic TLV writer.
///
/// Every record is validated when it is pushed, so an oversized value is
/// reported before any patch bytes exist.
#[derive(Debug, Default)]
pub struct MetadataBuilder {
    buf: Vec<u8>,
}

impl MetadataBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record.
    pub fn push(&mut self, tag: u8, value: &[u8]) -> Result<&mut Self, MetadataError> {
        if value.len() > MAX_TLV_VALUE {
            return Err(MetadataError::ValueTooLarge {
                tag,
                len: value.len(),
            });
        }
        self.buf.push(tag);
        self.buf.push(value.len() as u8);
        self.buf.extend_from_slice(value);
        Ok(self)
    }

    pub fn push_u16(&mut self, tag: u8, value: u16) -> Result<&mut Self, MetadataError> {
        self.push(tag, &value.to_le_bytes())
    }

    pub fn push_u32(&mut self, tag: u8, value: u32) -> Result<&mut Self, MetadataError> {
        self.push(tag, &value.to_le_bytes())
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Finish the block, checking it fits the header's u16 length field.
    pub fn finish(self) -> Result<Vec<u8>, MetadataError> {
        if self.buf.len() > MAX_METADATA_LEN {
            return Err(MetadataError::BlockTooLarge(self.buf.len()));
        }
        Ok(self.buf)
    }
}

// ---------------------------------------------------------------------------
// Standard values
// ---------------------------------------------------------------------------

/// The four standard metadata fields. `None` means "not supplied".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetadataValues {
    pub req_arena_bytes: Option<u32>,
    pub abi_version: Option<u16>,
    pub opset_fingerprint: Option<u32>,
    pub io_fingerprint: Option<u32>,
}

/// Pick the value to serialize for one field.
///
/// A present, non-zero manual value wins; otherwise a present, non-zero
/// automatic value; otherwise the field is omitted.
pub fn resolve<T: Copy + Default + PartialEq>(manual: Option<T>, auto: Option<T>) -> Option<T> {
    let zero = T::default();
    manual.filter(|v| *v != zero).or(auto.filter(|v| *v != zero))
}

impl MetadataValues {
    /// Field-wise [`resolve`] of manual overrides against automatic values.
    pub fn resolve(manual: &Self, auto: &Self) -> Self {
        Self {
            req_arena_bytes: resolve(manual.req_arena_bytes, auto.req_arena_bytes),
            abi_version: resolve(manual.abi_version, auto.abi_version),
            opset_fingerprint: resolve(manual.opset_fingerprint, auto.opset_fingerprint),
            io_fingerprint: resolve(manual.io_fingerprint, auto.io_fingerprint),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Serialize the non-zero fields in tag order.
    pub fn to_block(&self) -> Result<Vec<u8>, MetadataError> {
        let mut builder = MetadataBuilder::new();
        if let Some(v) = self.req_arena_bytes.filter(|v| *v != 0) {
            builder.push_u32(TAG_REQ_ARENA_BYTES, v)?;
        }
        if let Some(v) = self.abi_version.filter(|v| *v != 0) {
            builder.push_u16(TAG_ABI_VERSION, v)?;
        }
        if let Some(v) = self.opset_fingerprint.filter(|v| *v != 0) {
            builder.push_u32(TAG_OPSET_FINGERPRINT, v)?;
        }
        if let Some(v) = self.io_fingerprint.filter(|v| *v != 0) {
            builder.push_u32(TAG_IO_FINGERPRINT, v)?;
        }
        builder.finish()
    }

    /// Collect the standard fields from parsed records.
    ///
    /// Unknown tags, and standard tags whose length does not match the
    /// field width, are ignored. A later record overrides an earlier one.
    pub fn from_records(records: &[MetadataRecord]) -> Self {
        let mut values = Self::default();
        for rec in records {
            match (rec.tag, rec.value.as_slice()) {
                (TAG_REQ_ARENA_BYTES, &[a, b, c, d]) => {
                    values.req_arena_bytes = Some(u32::from_le_bytes([a, b, c, d]));
                }
                (TAG_ABI_VERSION, &[a, b]) => {
                    values.abi_version = Some(u16::from_le_bytes([a, b]));
                }
                (TAG_OPSET_FINGERPRINT, &[a, b, c, d]) => {
                    values.opset_fingerprint = Some(u32::from_le_bytes([a, b, c, d]));
                }
                (TAG_IO_FINGERPRINT, &[a, b, c, d]) => {
                    values.io_fingerprint = Some(u32::from_le_bytes([a, b, c, d]));
                }
                _ => {}
            }
        }
        values
    }
}

/// Resolve manual against automatic values and serialize the result.
pub fn build_metadata(
    manual: &MetadataValues,
    auto: &MetadataValues,
) -> Result<Vec<u8>, MetadataError> {
    MetadataValues::resolve(manual, auto).to_block()
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Split a metadata block into records.
pub fn parse_metadata(block: &[u8]) -> Result<Vec<MetadataRecord>, MetadataError> {
    let mut records = Vec::new();
    let mut pos = 0usize;
    while pos < block.len() {
        let tag = block[pos];
        let Some(&len) = block.get(pos + 1) else {
            return Err(MetadataError::MissingLength { tag });
        };
        let start = pos + 2;
        let available = block.len() - start;
        if len as usize > available {
            return Err(MetadataError::Truncated {
                tag,
                declared: len as usize,
                available,
            });
        }
        let end = start + len as usize;
        records.push(MetadataRecord {
            tag,
            value: block[start..end].to_vec(),
        });
        pos = end;
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
