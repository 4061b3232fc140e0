// Whole-buffer byte differ.
//
// Scans the common prefix length of base and target, emitting one run per
// maximal mismatching stretch, then one run for any target bytes past the
// end of base. Runs separated by at most `merge_gap` matching bytes are
// merged on the fly, the gap filled from target.
//
// Base bytes past the end of a shorter target are not represented.

use super::DiffRun;

/// Diff `base` against `target`.
///
/// Both buffers must be shorter than 4 GiB; offsets are stored as `u32`.
pub fn diff(base: &[u8], target: &[u8], merge_gap: u32) -> Vec<DiffRun> {
    debug_assert!(target.len() <= u32::MAX as usize);

    let common = base.len().min(target.len());
    let base_common = &base[..common];
    let target_common = &target[..common];
    let mut runs: Vec<DiffRun> = Vec::new();

    let mut i = 0;
    while i < common {
        let Some(skip) = first_mismatch(&base_common[i..], &target_common[i..]) else {
            break;
        };
        let start = i + skip;
        let len = first_match(&base_common[start..], &target_common[start..])
            .unwrap_or(common - start);
        i = start + len;
        push_merged(&mut runs, target, start, i, merge_gap);
    }

    if target.len() > common {
        push_merged(&mut runs, target, common, target.len(), merge_gap);
    }

    runs
}

/// Append `target[start..end]` as a run, or fold it into the previous run
/// when the gap between them is at most `merge_gap`.
fn push_merged(runs: &mut Vec<DiffRun>, target: &[u8], start: usize, end: usize, merge_gap: u32) {
    if let Some(prev) = runs.last_mut() {
        if start - prev.end() <= merge_gap as usize {
            prev.extend_to(target, end);
            return;
        }
    }
    runs.push(DiffRun::new(start as u32, target[start..end].to_vec()));
}

#[inline]
fn first_mismatch(a: &[u8], b: &[u8]) -> Option<usize> {
    a.iter().zip(b).position(|(x, y)| x != y)
}

#[inline]
fn first_match(a: &[u8], b: &[u8]) -> Option<usize> {
    a.iter().zip(b).position(|(x, y)| x == y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_inputs_have_no_runs() {
        assert!(diff(b"same bytes", b"same bytes", 16).is_empty());
        assert!(diff(b"", b"", 16).is_empty());
    }

    #[test]
    fn single_byte_change() {
        let runs = diff(b"AAAA", b"ABAA", 16);
        assert_eq!(runs, vec![DiffRun::new(1, b"B".to_vec())]);
    }

    #[test]
    fn longer_target_appends_tail() {
        let runs = diff(b"AAAAAAAAAA", b"ABAAAAAAAAXYZW", 2);
        assert_eq!(
            runs,
            vec![
                DiffRun::new(1, b"B".to_vec()),
                DiffRun::new(10, b"XYZW".to_vec()),
            ]
        );
    }

    #[test]
    fn tail_adjacent_to_change_merges_even_at_zero_gap() {
        let base = b"AAAAAAAAAA";
        let target = b"AAAABBBBBBAAAA";
        for gap in [0, 16] {
            let runs = diff(base, target, gap);
            assert_eq!(runs, vec![DiffRun::new(4, b"BBBBBBAAAA".to_vec())]);
        }
    }

    #[test]
    fn shorter_target_ignores_base_tail() {
        let runs = diff(b"ABCDEFGH", b"ABXD", 16);
        assert_eq!(runs, vec![DiffRun::new(2, b"X".to_vec())]);
    }

    #[test]
    fn empty_base_emits_whole_target() {
        let runs = diff(b"", b"hello", 16);
        assert_eq!(runs, vec![DiffRun::new(0, b"hello".to_vec())]);
    }

    #[test]
    fn close_runs_merge_with_gap_bytes() {
        let base = b"0000000000";
        let target = b"0X00Y00000";
        let runs = diff(base, target, 2);
        assert_eq!(runs, vec![DiffRun::new(1, b"X00Y".to_vec())]);

        let runs = diff(base, target, 1);
        assert_eq!(
            runs,
            vec![DiffRun::new(1, b"X".to_vec()), DiffRun::new(4, b"Y".to_vec())]
        );
    }

    #[test]
    fn mismatch_running_to_end_of_common_prefix() {
        let runs = diff(b"aaaa", b"aabbcc", 0);
        assert_eq!(
            runs,
            vec![DiffRun::new(2, b"bbcc".to_vec())],
            "tail directly after a mismatch has a zero gap and merges"
        );
    }
}
