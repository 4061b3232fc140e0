#![no_main]
use flashpatch::decoder::PatchFile;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // The reader must never panic, only return errors.
    let Ok(patch) = PatchFile::parse(data) else {
        return;
    };
    let _ = patch.metadata_values();

    // Simulate against a zero base of the declared length, capped so a
    // hostile header cannot request a huge allocation.
    let base_len = patch.header.base_length as usize;
    let target_len = patch.header.target_length as usize;
    if base_len.max(target_len) <= 1 << 20 {
        let base = vec![0u8; base_len];
        let _ = patch.apply(&base);
    }
});
