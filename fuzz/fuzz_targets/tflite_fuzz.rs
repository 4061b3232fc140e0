#![no_main]
use flashpatch::introspect::{ModelIntrospector, TfliteIntrospector};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Hostile flatbuffers must be rejected, never panic.
    let _ = TfliteIntrospector.introspect(data, Some(1.4));
    if let Ok(ranges) = TfliteIntrospector.weight_ranges(data) {
        for r in ranges {
            assert!(r.end as usize <= data.len());
        }
    }
});
