#![no_main]

extern crate libfuzzer_sys;

use blockdec_rs::TexelInfo;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: [[u8; 8]; 9]| {
    let info_4bpp = data.each_ref().map(TexelInfo::pvrtc_4bpp);
    blockdec_rs::pvrtc_4bpp_tile(info_4bpp.each_ref());

    let info_2bpp = data.each_ref().map(TexelInfo::pvrtc_2bpp);
    blockdec_rs::pvrtc_2bpp_tile(info_2bpp.each_ref());
});
