// Host-side patch reader.
//
// `PatchFile::parse` checks every declared length against the input, every
// chunk CRC against its encoded payload, and rejects bytes after the last
// chunk. `PatchFile::apply` simulates an in-place applier on a copy of the
// base artifact, verifying the header digests on either side.

use std::borrow::Cow;

use log::debug;
use thiserror::Error;

use crate::format::metadata::parse_metadata;
use crate::format::{
    CHUNK_CRC_LEN, CHUNK_HEADER_LEN, Chunk, ChunkHeader, Encoding, HEADER_LEN, MetadataError,
    MetadataRecord, MetadataValues, PatchHeader,
};
use crate::hash;
use crate::rle::{self, RleError};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("truncated {what}: need {needed} bytes, have {available}")]
    Truncated {
        what: &'static str,
        needed: usize,
        available: usize,
    },

    #[error("unsupported patch version {0}")]
    UnsupportedVersion(u8),

    #[error("unknown digest algorithm {0}")]
    UnknownDigest(u8),

    #[error("unknown chunk encoding {0}")]
    UnknownEncoding(u8),

    #[error("metadata block: {0}")]
    Metadata(#[from] MetadataError),

    #[error("RLE payload: {0}")]
    Rle(#[from] RleError),

    #[error("chunk {index}: CRC mismatch (stored {stored:#010x}, computed {computed:#010x})")]
    ChunkCrcMismatch {
        index: usize,
        stored: u32,
        computed: u32,
    },

    #[error("chunk {index}: bytes {start}..{end} exceed target length {target_length}")]
    ChunkOutOfBounds {
        index: usize,
        start: u64,
        end: u64,
        target_length: u32,
    },

    #[error("base is {actual} bytes, header expects {expected}")]
    BaseLengthMismatch { expected: u32, actual: usize },

    #[error("{which} digest mismatch: expected {expected:#010x}, got {actual:#010x}")]
    DigestMismatch {
        which: &'static str,
        expected: u32,
        actual: u32,
    },

    #[error("{0} trailing bytes after the last chunk")]
    TrailingData(usize),
}

fn take<'a>(data: &'a [u8], pos: usize, len: usize, what: &'static str) -> Result<&'a [u8], DecodeError> {
    let available = data.len().saturating_sub(pos);
    if len > available {
        return Err(DecodeError::Truncated {
            what,
            needed: len,
            available,
        });
    }
    Ok(&data[pos..pos + len])
}

// ---------------------------------------------------------------------------
// PatchFile
// ---------------------------------------------------------------------------

/// A fully parsed patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchFile {
    pub header: PatchHeader,
    /// Metadata block exactly as stored.
    pub metadata: Vec<u8>,
    pub records: Vec<MetadataRecord>,
    pub chunks: Vec<Chunk>,
}

impl PatchFile {
    /// Parse a complete patch. Any truncation or trailing garbage is an error.
    pub fn parse(data: &[u8]) -> Result<Self, DecodeError> {
        let header = PatchHeader::decode(data)?;
        let mut pos = HEADER_LEN;

        let metadata = take(data, pos, header.metadata_length as usize, "metadata block")?.to_vec();
        pos += metadata.len();
        let records = parse_metadata(&metadata)?;

        let mut chunks = Vec::with_capacity(header.chunk_count as usize);
        for index in 0..header.chunk_count as usize {
            let ch = ChunkHeader::decode(take(data, pos, CHUNK_HEADER_LEN, "chunk header")?)?;
            pos += CHUNK_HEADER_LEN;

            let crc32 = if ch.has_crc {
                let b = take(data, pos, CHUNK_CRC_LEN, "chunk CRC")?;
                pos += CHUNK_CRC_LEN;
                Some(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            } else {
                None
            };

            let payload = take(data, pos, ch.length as usize, "chunk payload")?.to_vec();
            pos += payload.len();

            if let Some(stored) = crc32 {
                let computed = hash::crc32(&payload);
                if stored != computed {
                    return Err(DecodeError::ChunkCrcMismatch {
                        index,
                        stored,
                        computed,
                    });
                }
            }

            chunks.push(Chunk {
                offset: ch.offset,
                encoding: ch.encoding,
                crc32,
                payload,
            });
        }

        if pos != data.len() {
            return Err(DecodeError::TrailingData(data.len() - pos));
        }

        debug!(
            "parsed patch: {} chunks, {} metadata records, {} bytes",
            chunks.len(),
            records.len(),
            data.len()
        );

        Ok(Self {
            header,
            metadata,
            records,
            chunks,
        })
    }

    /// Standard metadata fields carried by this patch.
    pub fn metadata_values(&self) -> MetadataValues {
        MetadataValues::from_records(&self.records)
    }

    /// Apply the patch to a copy of `base`, as an in-place applier would.
    ///
    /// The returned image is `max(base, target)` bytes long. Base bytes past
    /// `target_length` are left untouched, so for a shrinking target only
    /// the first `target_length` bytes are the target artifact. The target
    /// digest is checked over that prefix.
    pub fn apply(&self, base: &[u8]) -> Result<Vec<u8>, DecodeError> {
        let hdr = &self.header;
        if base.len() != hdr.base_length as usize {
            return Err(DecodeError::BaseLengthMismatch {
                expected: hdr.base_length,
                actual: base.len(),
            });
        }
        if let Some(expected) = hdr.base_crc32() {
            let actual = hash::crc32(base);
            if actual != expected {
                return Err(DecodeError::DigestMismatch {
                    which: "base",
                    expected,
                    actual,
                });
            }
        }

        let target_len = hdr.target_length as usize;
        let mut image = base.to_vec();
        if image.len() < target_len {
            image.resize(target_len, 0);
        }

        for (index, chunk) in self.chunks.iter().enumerate() {
            let start = chunk.offset as usize;
            let room = target_len.saturating_sub(start);
            let bytes = match chunk.encoding {
                Encoding::Raw => Cow::Borrowed(chunk.payload.as_slice()),
                Encoding::Rle => Cow::Owned(rle::unpack_bounded(&chunk.payload, room)?),
            };
            let end = start + bytes.len();
            if end > target_len {
                return Err(DecodeError::ChunkOutOfBounds {
                    index,
                    start: start as u64,
                    end: end as u64,
                    target_length: hdr.target_length,
                });
            }
            image[start..end].copy_from_slice(&bytes);
        }

        if let Some(expected) = hdr.target_crc32() {
            let actual = hash::crc32(&image[..target_len]);
            if actual != expected {
                return Err(DecodeError::DigestMismatch {
                    which: "target",
                    expected,
                    actual,
                });
            }
        }
        Ok(image)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
