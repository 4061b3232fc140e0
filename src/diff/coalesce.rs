// Second, coarser merging pass over diff runs.
//
// A run is folded into the previously accepted run when it is shorter than
// `min_chunk` and starts within `merge_gap` bytes of that run's end. The
// gap is filled from target, so merged runs still equal the target bytes
// they cover.

use super::DiffRun;

/// Merge small runs into their predecessor.
///
/// `runs` must be sorted and non-overlapping, and `target` must be the
/// buffer the runs were taken from; gap bytes are copied from it.
pub fn coalesce(runs: Vec<DiffRun>, target: &[u8], merge_gap: u32, min_chunk: u32) -> Vec<DiffRun> {
    let mut out: Vec<DiffRun> = Vec::with_capacity(runs.len());
    for run in runs {
        if let Some(prev) = out.last_mut() {
            let small = (run.len() as u64) < min_chunk as u64;
            let near = run.offset as u64 <= prev.end() as u64 + merge_gap as u64;
            if small && near {
                prev.extend_to(target, run.start());
                prev.bytes.extend_from_slice(&run.bytes);
                continue;
            }
        }
        out.push(run);
    }
    out
}
