#![no_main]

extern crate libfuzzer_sys;

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: [u8; 9]| {
    let actual = blockdec_rs::etc2_alpha1(&data);
    assert!(actual.iter().flatten().all(|p| p[3] == data[0]));
});
