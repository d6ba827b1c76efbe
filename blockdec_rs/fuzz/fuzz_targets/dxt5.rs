#![no_main]

extern crate libfuzzer_sys;

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: [u8; 16]| {
    let actual = blockdec_rs::dxt5(&data);

    // The color half decodes exactly like a DXT1 block.
    let color: [u8; 8] = data[8..].try_into().unwrap();
    let expected = blockdec_rs::dxt1(&color);
    for (a, e) in actual.iter().flatten().zip(expected.iter().flatten()) {
        assert_eq!(e[..3], a[..3]);
    }
});
