#![no_main]

extern crate libfuzzer_sys;

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: [u8; 8]| {
    let actual = blockdec_rs::dxt1(&data);

    // DXT1 has no transparent pixels.
    assert!(actual.iter().flatten().all(|p| p[3] == 255));
});
