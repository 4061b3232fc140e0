// Range-restricted differ.
//
// Confines diffing to byte ranges known to hold mutable data (typically
// constant weight buffers), so structural churn elsewhere in the artifact
// does not turn into chunks. Each range is diffed with the whole-buffer
// differ on sub-slices; offsets are translated back to absolute positions
// and the combined list goes through the same coalescing pass.

use super::{ByteRange, DiffRun, bytes, coalesce};

/// Sort ranges and merge overlapping or adjacent ones.
///
/// Empty ranges are dropped. The result is disjoint, non-adjacent and
/// sorted by start.
pub fn normalize_ranges(ranges: &[ByteRange]) -> Vec<ByteRange> {
    let mut sorted: Vec<ByteRange> = ranges.iter().copied().filter(|r| !r.is_empty()).collect();
    sorted.sort_unstable();

    let mut merged: Vec<ByteRange> = Vec::with_capacity(sorted.len());
    for r in sorted {
        match merged.last_mut() {
            Some(last) if r.start <= last.end => last.end = last.end.max(r.end),
            _ => merged.push(r),
        }
    }
    merged
}

/// Diff only inside `ranges`.
///
/// Ranges are clipped to the common length of base and target, so bytes
/// appended past the end of base are never emitted in this mode.
pub fn diff_in_ranges(
    base: &[u8],
    target: &[u8],
    ranges: &[ByteRange],
    merge_gap: u32,
    min_chunk: u32,
) -> Vec<DiffRun> {
    let common = base.len().min(target.len());
    let mut runs = Vec::new();

    for range in normalize_ranges(ranges) {
        let start = range.start as usize;
        let end = (range.end as usize).min(common);
        if start >= end {
            continue;
        }
        let sub = bytes::diff(&base[start..end], &target[start..end], merge_gap);
        runs.extend(sub.into_iter().map(|mut run| {
            run.offset += range.start;
            run
        }));
    }

    runs.sort_by_key(|run| run.offset);
    coalesce::coalesce(runs, target, merge_gap, min_chunk)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(start: u32, end: u32) -> ByteRange {
        ByteRange { start, end }
    }

    #[test]
    fn normalize_sorts_and_merges() {
        let out = normalize_ranges(&[r(20, 30), r(0, 5), r(5, 8), r(25, 40), r(50, 50)]);
        assert_eq!(out, vec![r(0, 8), r(20, 40)]);
    }

    #[test]
    fn normalize_keeps_separated_ranges() {
        let out = normalize_ranges(&[r(10, 12), r(13, 15)]);
        assert_eq!(out, vec![r(10, 12), r(13, 15)]);
    }

    #[test]
    fn changes_outside_ranges_are_ignored() {
        let base = vec![0u8; 100];
        let mut target = base.clone();
        target[5] = 1; // header churn
        target[40] = 2; // weight change
        target[90] = 3; // trailing churn
        let runs = diff_in_ranges(&base, &target, &[r(32, 64)], 0, 1);
        assert_eq!(runs, vec![DiffRun::new(40, vec![2])]);
    }

    #[test]
    fn offsets_are_absolute_across_ranges() {
        let base = vec![0u8; 200];
        let mut target = base.clone();
        target[110] = 7;
        target[12] = 6;
        let runs = diff_in_ranges(&base, &target, &[r(100, 150), r(10, 20)], 0, 1);
        assert_eq!(
            runs,
            vec![DiffRun::new(12, vec![6]), DiffRun::new(110, vec![7])]
        );
    }

    #[test]
    fn ranges_are_clipped_to_common_length() {
        let base = vec![0u8; 10];
        let target = vec![1u8; 16];
        let runs = diff_in_ranges(&base, &target, &[r(8, 64), r(40, 50)], 0, 1);
        assert_eq!(runs, vec![DiffRun::new(8, vec![1, 1])]);
    }

    #[test]
    fn coalescing_spans_range_boundaries_with_target_bytes() {
        let base = vec![0u8; 64];
        let mut target: Vec<u8> = (0..64).map(|i| i as u8 | 0x80).collect();
        // Only two bytes actually differ inside the ranges; keep the rest equal.
        for (i, b) in target.iter_mut().enumerate() {
            if i != 10 && i != 24 {
                *b = base[i];
            }
        }
        target[0] = 0xEE; // outside any range
        let runs = diff_in_ranges(&base, &target, &[r(8, 16), r(20, 28)], 16, 8);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].offset, 10);
        assert_eq!(runs[0].bytes, &target[10..25]);
    }
}
