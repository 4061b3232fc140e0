// Fixed-size patch header.
//
// Layout (80 bytes, little-endian):
//   0   version          u8
//   1   digest_algo      u8
//   2   chunk_count      u16
//   4   base_length      u32
//   8   target_length    u32
//   12  base_digest      [u8; 32]
//   44  target_digest    [u8; 32]
//   76  metadata_length  u16
//   78  flags            u16

use std::io::{self, Write};

use super::{DIGEST_LEN, DigestAlgo, FORMAT_VERSION, HEADER_LEN};
use crate::decoder::DecodeError;
use crate::encoder::BuildError;
use crate::hash;

/// Parsed or to-be-written patch header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchHeader {
    /// Format version (always [`FORMAT_VERSION`] when written by this crate).
    pub version: u8,
    /// Algorithm used for `base_digest` / `target_digest`.
    pub digest_algo: DigestAlgo,
    /// Number of chunk records following the metadata block.
    pub chunk_count: u16,
    /// Length of the base artifact the patch was built against.
    pub base_length: u32,
    /// Length of the artifact the patch produces.
    pub target_length: u32,
    /// CRC32 (LE) + zero padding, or all-zero when `digest_algo` is `None`.
    pub base_digest: [u8; DIGEST_LEN],
    /// Same encoding as `base_digest`, over the target artifact.
    pub target_digest: [u8; DIGEST_LEN],
    /// Exact byte length of the metadata block.
    pub metadata_length: u16,
    /// Reserved; written as 0.
    pub flags: u16,
}

impl Default for PatchHeader {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            digest_algo: DigestAlgo::default(),
            chunk_count: 0,
            base_length: 0,
            target_length: 0,
            base_digest: [0; DIGEST_LEN],
            target_digest: [0; DIGEST_LEN],
            metadata_length: 0,
            flags: 0,
        }
    }
}

fn artifact_len(which: &'static str, len: usize) -> Result<u32, BuildError> {
    u32::try_from(len).map_err(|_| BuildError::ArtifactTooLarge { which, len })
}

impl PatchHeader {
    /// Fill in lengths and digests for a (base, target) pair.
    ///
    /// Fails with [`BuildError::ArtifactTooLarge`] when either length does
    /// not fit in a `u32`.
    pub fn for_artifacts(algo: DigestAlgo, base: &[u8], target: &[u8]) -> Result<Self, BuildError> {
        Ok(Self {
            digest_algo: algo,
            base_length: artifact_len("base", base.len())?,
            target_length: artifact_len("target", target.len())?,
            base_digest: hash::digest(algo, base),
            target_digest: hash::digest(algo, target),
            ..Self::default()
        })
    }

    /// Serialize into the fixed 80-byte layout.
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0] = self.version;
        out[1] = self.digest_algo.as_u8();
        out[2..4].copy_from_slice(&self.chunk_count.to_le_bytes());
        out[4..8].copy_from_slice(&self.base_length.to_le_bytes());
        out[8..12].copy_from_slice(&self.target_length.to_le_bytes());
        out[12..44].copy_from_slice(&self.base_digest);
        out[44..76].copy_from_slice(&self.target_digest);
        out[76..78].copy_from_slice(&self.metadata_length.to_le_bytes());
        out[78..80].copy_from_slice(&self.flags.to_le_bytes());
        out
    }

    /// Write the header to a sink.
    pub fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.to_bytes())
    }

    /// Parse the header from the start of `data`.
    ///
    /// Rejects short input, versions other than [`FORMAT_VERSION`] and
    /// unknown digest algorithms.
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() < HEADER_LEN {
            return Err(DecodeError::Truncated {
                what: "patch header",
                needed: HEADER_LEN,
                available: data.len(),
            });
        }

        let version = data[0];
        if version != FORMAT_VERSION {
            return Err(DecodeError::UnsupportedVersion(version));
        }
        let digest_algo = DigestAlgo::from_u8(data[1]).ok_or(DecodeError::UnknownDigest(data[1]))?;

        let mut base_digest = [0u8; DIGEST_LEN];
        base_digest.copy_from_slice(&data[12..44]);
        let mut target_digest = [0u8; DIGEST_LEN];
        target_digest.copy_from_slice(&data[44..76]);

        Ok(Self {
            version,
            digest_algo,
            chunk_count: u16::from_le_bytes([data[2], data[3]]),
            base_length: u32::from_le_bytes([data[4], data[5], data[6], data[7]]),
            target_length: u32::from_le_bytes([data[8], data[9], data[10], data[11]]),
            base_digest,
            target_digest,
            metadata_length: u16::from_le_bytes([data[76], data[77]]),
            flags: u16::from_le_bytes([data[78], data[79]]),
        })
    }

    /// CRC32 stored in the base digest, if the header uses CRC32.
    pub fn base_crc32(&self) -> Option<u32> {
        stored_crc32(self.digest_algo, &self.base_digest)
    }

    /// CRC32 stored in the target digest, if the header uses CRC32.
    pub fn target_crc32(&self) -> Option<u32> {
        stored_crc32(self.digest_algo, &self.target_digest)
    }
}

fn stored_crc32(algo: DigestAlgo, digest: &[u8; DIGEST_LEN]) -> Option<u32> {
    match algo {
        DigestAlgo::None => None,
        DigestAlgo::Crc32 => Some(u32::from_le_bytes([
            digest[0], digest[1], digest[2], digest[3],
        ])),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
