// File-level patch building.
//
// `build_patch_file()` reads both artifacts fully into memory, runs the
// pipeline, and writes the patch through a `BufWriter`. Failures on a
// specific file carry its path.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::debug;

use crate::encoder::{BuildError, BuildStats, PatchOptions, build_patch};
use crate::introspect::ModelIntrospector;

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

fn file_error(role: &'static str, path: &Path) -> impl FnOnce(io::Error) -> BuildError {
    let path = path.to_path_buf();
    move |source| BuildError::File { role, path, source }
}

/// Build a patch from `base_path` to `target_path`, writing it to `out_path`.
///
/// An existing output file is overwritten; refusing to clobber is left to
/// the caller.
pub fn build_patch_file(
    base_path: &Path,
    target_path: &Path,
    out_path: &Path,
    opts: &PatchOptions,
    introspector: &dyn ModelIntrospector,
) -> Result<BuildStats, BuildError> {
    let base = fs::read(base_path).map_err(file_error("base", base_path))?;
    let target = fs::read(target_path).map_err(file_error("target", target_path))?;
    debug!(
        "read base {} ({} bytes), target {} ({} bytes)",
        base_path.display(),
        base.len(),
        target_path.display(),
        target.len()
    );

    let built = build_patch(&base, &target, opts, introspector)?;

    let out = File::create(out_path).map_err(file_error("output", out_path))?;
    let mut writer = BufWriter::with_capacity(BUF_SIZE, out);
    writer
        .write_all(&built.bytes)
        .and_then(|()| writer.flush())
        .map_err(file_error("output", out_path))?;

    Ok(built.stats)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
