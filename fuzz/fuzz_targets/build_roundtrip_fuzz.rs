#![no_main]
use flashpatch::decoder::PatchFile;
use flashpatch::encoder::{PatchOptions, build_patch};
use flashpatch::format::DigestAlgo;
use flashpatch::introspect::NoIntrospector;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 3 {
        return;
    }

    // First bytes are control: digest flag, merge gap, min chunk.
    let opts = PatchOptions {
        digest: if data[0] & 1 != 0 {
            DigestAlgo::Crc32
        } else {
            DigestAlgo::None
        },
        merge_gap: u32::from(data[1] % 64),
        min_chunk: u32::from(data[2] % 32),
        ..PatchOptions::default()
    };
    let payload = &data[3..];
    let split = payload.len() / 2;
    let (base, target) = payload.split_at(split);

    let built = build_patch(base, target, &opts, &NoIntrospector).unwrap();
    let patch = PatchFile::parse(&built.bytes).unwrap();
    let image = patch.apply(base).unwrap();
    assert_eq!(&image[..target.len()], target);
});
