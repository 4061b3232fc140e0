// Run-length packing for chunk payloads.
//
// Output is a sequence of `(count, value)` byte pairs. `count` is 1..=255
// stored as-is; a run of 256 is stored as the sentinel 0. A run ends at a
// value change or after 256 repeats.
//
// RLE is an optimization only: callers keep the raw bytes unless the
// packed form is strictly shorter.

use std::borrow::Cow;

use thiserror::Error;

use crate::format::Encoding;

/// Longest run a single pair can describe.
pub const MAX_RUN: usize = 256;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RleError {
    #[error("RLE stream has odd length {0}")]
    OddLength(usize),

    #[error("RLE output exceeds {cap} bytes")]
    Overflow { cap: usize },
}

/// Pack `data` into `(count, value)` pairs.
pub fn pack(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len().min(64) * 2);
    let mut i = 0;
    while i < data.len() {
        let value = data[i];
        let run = data[i..]
            .iter()
            .take(MAX_RUN)
            .take_while(|&&b| b == value)
            .count();
        // 256 wraps to the 0 sentinel.
        out.push(run as u8);
        out.push(value);
        i += run;
    }
    out
}

/// Unpack a stream produced by [`pack`].
pub fn unpack(packed: &[u8]) -> Result<Vec<u8>, RleError> {
    unpack_bounded(packed, usize::MAX)
}

/// Unpack, failing if the output would exceed `cap` bytes.
pub fn unpack_bounded(packed: &[u8], cap: usize) -> Result<Vec<u8>, RleError> {
    if packed.len() % 2 != 0 {
        return Err(RleError::OddLength(packed.len()));
    }
    let mut out = Vec::new();
    for pair in packed.chunks_exact(2) {
        let run = match pair[0] {
            0 => MAX_RUN,
            n => n as usize,
        };
        if run > cap - out.len() {
            return Err(RleError::Overflow { cap });
        }
        out.resize(out.len() + run, pair[1]);
    }
    Ok(out)
}

/// Choose between raw and packed payloads; raw wins ties.
pub fn choose_encoding(data: &[u8]) -> (Encoding, Cow<'_, [u8]>) {
    let packed = pack(data);
    if packed.len() < data.len() {
        (Encoding::Rle, Cow::Owned(packed))
    } else {
        (Encoding::Raw, Cow::Borrowed(data))
    }
}
