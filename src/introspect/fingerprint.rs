// Fingerprints and arena arithmetic.
//
// Kept independent of any model schema so alternative introspectors
// produce values the device compares against the same way.

use crate::hash::{self, IO_GROUP_SENTINEL};

/// Type code and declared dimensions of one tensor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensorSignature {
    pub dtype: i32,
    pub shape: Vec<i32>,
}

/// Order-independent fingerprint of the operator codes a model declares.
pub fn opset_fingerprint(codes: &[u32]) -> u32 {
    hash::hash_list_u32(codes)
}

/// CRC32 over input signatures, a sentinel, then output signatures.
///
/// Each signature contributes its type code followed by its dimensions, all
/// as little-endian 32-bit words. The sentinel keeps "two inputs, no
/// outputs" distinct from "no inputs, two outputs".
pub fn io_fingerprint(inputs: &[TensorSignature], outputs: &[TensorSignature]) -> u32 {
    fn push_group(group: &[TensorSignature], words: &mut Vec<u32>) {
        for sig in group {
            words.push(sig.dtype as u32);
            words.extend(sig.shape.iter().map(|&d| d as u32));
        }
    }

    let mut words: Vec<u32> = Vec::new();
    push_group(inputs, &mut words);
    words.push(IO_GROUP_SENTINEL);
    push_group(outputs, &mut words);

    let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
    hash::crc32(&bytes)
}

/// Bytes per element for a TFLite tensor type code; unknown types count 1.
pub fn element_size(dtype: i32) -> u64 {
    match dtype {
        0 => 4,   // float32
        1 => 2,   // float16
        2 => 4,   // int32
        3 => 1,   // uint8
        4 => 8,   // int64
        6 => 1,   // bool
        7 => 2,   // int16
        8 => 8,   // complex64
        9 => 1,   // int8
        10 => 8,  // float64
        11 => 16, // complex128
        12 => 8,  // uint64
        15 => 4,  // uint32
        16 => 2,  // uint16
        _ => 1,
    }
}

/// Storage size of a tensor; non-positive dimensions count as 1.
pub fn tensor_bytes(sig: &TensorSignature) -> u64 {
    let elements = sig
        .shape
        .iter()
        .map(|&d| if d <= 0 { 1 } else { d as u64 })
        .fold(1u64, u64::saturating_mul);
    elements.saturating_mul(element_size(sig.dtype))
}

/// Scale the activation byte total by `factor`, saturating at `u32::MAX`.
///
/// `None` or a non-positive factor disables the estimate (returns 0).
pub fn estimate_arena(activation_bytes: u64, factor: Option<f64>) -> u32 {
    match factor {
        Some(f) if f > 0.0 => {
            let scaled = (activation_bytes as f64 * f).floor();
            if scaled >= u32::MAX as f64 {
                u32::MAX
            } else {
                scaled as u32
            }
        }
        _ => 0,
    }
}
