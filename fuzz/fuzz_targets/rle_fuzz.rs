#![no_main]
use flashpatch::format::Encoding;
use flashpatch::rle;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let packed = rle::pack(data);
    assert_eq!(rle::unpack(&packed).unwrap(), data);

    let (encoding, payload) = rle::choose_encoding(data);
    match encoding {
        Encoding::Rle => assert!(payload.len() < data.len()),
        Encoding::Raw => assert_eq!(&payload[..], data),
    }

    // Arbitrary input as a packed stream, bounded like a device scratch buffer.
    let _ = rle::unpack_bounded(data, 4096);
});
