// Chunk records.
//
// Layout (little-endian):
//   [offset: u32][length: u16][encoding: u8][has_crc: i8]
//   [crc32: u32]            -- only when has_crc != 0
//   [payload: length bytes] -- RAW or RLE encoded
//
// The CRC covers the encoded payload, not the decoded bytes.

use std::borrow::Cow;
use std::io::{self, Write};

use super::{CHUNK_CRC_LEN, CHUNK_HEADER_LEN, Encoding, MAX_CHUNK_PAYLOAD};
use crate::decoder::DecodeError;
use crate::diff::DiffRun;
use crate::encoder::BuildError;
use crate::hash;
use crate::rle::{self, RleError};

// ---------------------------------------------------------------------------
// Chunk header
// ---------------------------------------------------------------------------

/// Fixed 8-byte header preceding every chunk payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    /// Absolute offset in the artifact where the decoded bytes are written.
    pub offset: u32,
    /// Encoded payload length.
    pub length: u16,
    pub encoding: Encoding,
    /// A 4-byte CRC32 of the encoded payload follows the header.
    pub has_crc: bool,
}

impl ChunkHeader {
    pub fn to_bytes(&self) -> [u8; CHUNK_HEADER_LEN] {
        let mut out = [0u8; CHUNK_HEADER_LEN];
        out[0..4].copy_from_slice(&self.offset.to_le_bytes());
        out[4..6].copy_from_slice(&self.length.to_le_bytes());
        out[6] = self.encoding.as_u8();
        out[7] = u8::from(self.has_crc);
        out
    }

    pub fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.to_bytes())
    }

    /// Parse a chunk header from the start of `data`.
    ///
    /// Any non-zero `has_crc` byte counts as set, as on the device.
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() < CHUNK_HEADER_LEN {
            return Err(DecodeError::Truncated {
                what: "chunk header",
                needed: CHUNK_HEADER_LEN,
                available: data.len(),
            });
        }
        let encoding = Encoding::from_u8(data[6]).ok_or(DecodeError::UnknownEncoding(data[6]))?;
        Ok(Self {
            offset: u32::from_le_bytes([data[0], data[1], data[2], data[3]]),
            length: u16::from_le_bytes([data[4], data[5]]),
            encoding,
            has_crc: data[7] != 0,
        })
    }
}

// ---------------------------------------------------------------------------
// Encoded chunk
// ---------------------------------------------------------------------------

/// One offset-addressed overwrite instruction with its encoded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub offset: u32,
    pub encoding: Encoding,
    /// CRC32 of `payload`, present when the patch carries per-chunk checksums.
    pub crc32: Option<u32>,
    /// Encoded payload (at most [`MAX_CHUNK_PAYLOAD`] bytes).
    pub payload: Vec<u8>,
}

impl Chunk {
    /// Encode a diff run, picking RLE only when it is strictly shorter.
    ///
    /// The run must be at most [`MAX_CHUNK_PAYLOAD`] bytes long; the encoder
    /// splits longer runs before calling this.
    pub fn from_run(run: &DiffRun, with_crc: bool) -> Self {
        debug_assert!(run.bytes.len() <= MAX_CHUNK_PAYLOAD);
        let (encoding, payload) = rle::choose_encoding(&run.bytes);
        let payload = match payload {
            Cow::Borrowed(raw) => raw.to_vec(),
            Cow::Owned(packed) => packed,
        };
        let crc32 = with_crc.then(|| hash::crc32(&payload));
        Self {
            offset: run.offset,
            encoding,
            crc32,
            payload,
        }
    }

    /// Wire header for this chunk.
    ///
    /// Fails when the payload does not fit the 16-bit length field.
    pub fn header(&self) -> Result<ChunkHeader, BuildError> {
        let length = u16::try_from(self.payload.len()).map_err(|_| BuildError::ChunkTooLarge {
            offset: self.offset,
            len: self.payload.len(),
        })?;
        Ok(ChunkHeader {
            offset: self.offset,
            length,
            encoding: self.encoding,
            has_crc: self.crc32.is_some(),
        })
    }

    /// Bytes this chunk occupies in the patch file.
    pub fn encoded_len(&self) -> usize {
        let crc_len = if self.crc32.is_some() { CHUNK_CRC_LEN } else { 0 };
        CHUNK_HEADER_LEN + crc_len + self.payload.len()
    }

    /// Write header, optional CRC and payload.
    ///
    /// Nothing is written when the header cannot be built.
    pub fn encode<W: Write>(&self, w: &mut W) -> Result<(), BuildError> {
        let header = self.header()?;
        header.encode(w)?;
        if let Some(crc) = self.crc32 {
            w.write_all(&crc.to_le_bytes())?;
        }
        w.write_all(&self.payload)?;
        Ok(())
    }

    /// The bytes this chunk writes into the artifact.
    pub fn decoded(&self) -> Result<Cow<'_, [u8]>, RleError> {
        match self.encoding {
            Encoding::Raw => Ok(Cow::Borrowed(&self.payload)),
            Encoding::Rle => rle::unpack(&self.payload).map(Cow::Owned),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
