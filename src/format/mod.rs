// Patch wire format.
//
// One definition of the on-wire layout, imported by the encoder, the
// decoder and the conformance tests. All multi-byte integers are
// little-endian; there is no trailer or end marker.
//
//   [PatchHeader: 80 bytes]
//   [metadata TLV block: metadata_length bytes]
//   chunk_count x ([ChunkHeader: 8 bytes] [crc32: 4 bytes if has_crc] [payload])
//
// # Modules
//
// - `header`   fixed-size patch header
// - `chunk`    chunk record header and encoded chunk
// - `metadata` TLV metadata block (builder, resolver, reader)

pub mod chunk;
pub mod header;
pub mod metadata;

pub use chunk::{Chunk, ChunkHeader};
pub use header::PatchHeader;
pub use metadata::{MetadataBuilder, MetadataError, MetadataRecord, MetadataValues};

// ---------------------------------------------------------------------------
// Layout constants
// ---------------------------------------------------------------------------

/// Format version written into every header.
pub const FORMAT_VERSION: u8 = 1;

/// Size of the encoded `PatchHeader`.
pub const HEADER_LEN: usize = 80;

/// Size of the encoded `ChunkHeader`.
pub const CHUNK_HEADER_LEN: usize = 8;

/// Size of the optional per-chunk CRC32 that follows a chunk header.
pub const CHUNK_CRC_LEN: usize = 4;

/// Width of the base/target digest fields.
pub const DIGEST_LEN: usize = 32;

/// Largest encoded payload a single chunk can carry (u16 length field).
pub const MAX_CHUNK_PAYLOAD: usize = u16::MAX as usize;

/// Largest number of chunks a patch can declare (u16 count field).
pub const MAX_CHUNKS: usize = u16::MAX as usize;

/// Largest metadata block a patch can declare (u16 length field).
pub const MAX_METADATA_LEN: usize = u16::MAX as usize;

/// Largest value a single TLV record can carry (u8 length field).
pub const MAX_TLV_VALUE: usize = u8::MAX as usize;

// ---------------------------------------------------------------------------
// Metadata tags
// ---------------------------------------------------------------------------

/// u32: tensor arena bytes the target needs at runtime.
pub const TAG_REQ_ARENA_BYTES: u8 = 0x01;
/// u16: runtime ABI/schema version the target needs.
pub const TAG_ABI_VERSION: u8 = 0x02;
/// u32: order-independent fingerprint of the operator set.
pub const TAG_OPSET_FINGERPRINT: u8 = 0x03;
/// u32: fingerprint of input/output tensor types and shapes.
pub const TAG_IO_FINGERPRINT: u8 = 0x04;
/// First tag reserved for vendor-defined records.
pub const TAG_VENDOR_BEGIN: u8 = 0x80;

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Digest algorithm used for the header's base/target digests.
///
/// With `Crc32` every chunk also carries a CRC32 of its encoded payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum DigestAlgo {
    None = 0,
    #[default]
    Crc32 = 1,
}

impl DigestAlgo {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Crc32),
            _ => None,
        }
    }

    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Crc32 => "crc32",
        }
    }
}

/// Payload encoding of a single chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Encoding {
    /// Payload bytes are written verbatim.
    Raw = 0,
    /// Payload is `(count, value)` pairs, see [`crate::rle`].
    Rle = 1,
}

impl Encoding {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Raw),
            1 => Some(Self::Rle),
            _ => None,
        }
    }

    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Rle => "rle",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
