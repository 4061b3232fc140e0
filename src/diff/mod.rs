// Byte-level diffing between a base and a target artifact.
//
// - `bytes`    whole-buffer differ with immediate gap merging
// - `coalesce` second pass folding tiny runs into nearby predecessors
// - `ranges`   differ restricted to a set of byte ranges
//
// Both modes produce runs in strictly increasing offset order, mutually
// non-overlapping, each equal to the target bytes it covers.

pub mod bytes;
pub mod coalesce;
pub mod ranges;

pub use bytes::diff;
pub use coalesce::coalesce;
pub use ranges::{diff_in_ranges, normalize_ranges};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// "Overwrite `[offset, offset + bytes.len())` with `bytes`."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffRun {
    pub offset: u32,
    pub bytes: Vec<u8>,
}

impl DiffRun {
    pub fn new(offset: u32, bytes: Vec<u8>) -> Self {
        debug_assert!(!bytes.is_empty(), "diff runs are never empty");
        Self { offset, bytes }
    }

    #[inline]
    pub fn start(&self) -> usize {
        self.offset as usize
    }

    /// One past the last byte this run covers.
    #[inline]
    pub fn end(&self) -> usize {
        self.offset as usize + self.bytes.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Grow this run so it ends at `end`, copying the new bytes from `target`.
    pub(crate) fn extend_to(&mut self, target: &[u8], end: usize) {
        let from = self.end();
        if end > from {
            self.bytes.extend_from_slice(&target[from..end]);
        }
    }
}

/// Half-open byte interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ByteRange {
    pub start: u32,
    pub end: u32,
}

impl ByteRange {
    /// `None` unless `start < end`.
    pub fn new(start: u32, end: u32) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start) as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Which part of the artifact is diffed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DiffMode {
    /// Compare every byte, including an appended tail.
    #[default]
    WholeArtifact,
    /// Compare only the constant weight ranges reported by the introspector.
    WeightRanges,
    /// Compare only the supplied ranges.
    Ranges(Vec<ByteRange>),
}

/// Diff `base` against `target`, restricted to `ranges` when given.
///
/// Whole-artifact mode runs the byte differ followed by the coalescer;
/// range mode does both inside [`diff_in_ranges`].
pub fn compute_runs(
    base: &[u8],
    target: &[u8],
    ranges: Option<&[ByteRange]>,
    merge_gap: u32,
    min_chunk: u32,
) -> Vec<DiffRun> {
    match ranges {
        None => coalesce(diff(base, target, merge_gap), target, merge_gap, min_chunk),
        Some(ranges) => diff_in_ranges(base, target, ranges, merge_gap, min_chunk),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
