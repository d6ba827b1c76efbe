#![no_main]

use libfuzzer_sys::fuzz_target;

use arbitrary::{Arbitrary, Result, Unstructured};
use texture_decode::{ByteOrder, ImageFormat, Limits, Surface};

#[derive(Debug)]
pub struct SurfaceInfo {
    width: u32,
    height: u32,
    format: ImageFormat,
    byte_order: ByteOrder,
    data: Vec<u8>,
}

impl<'a> Arbitrary<'a> for SurfaceInfo {
    fn arbitrary(u: &mut Unstructured<'a>) -> Result<Self> {
        let width: u32 = u.int_in_range(1..=512)?;
        let height: u32 = u.int_in_range(1..=512)?;
        let format = ImageFormat::arbitrary(u)?;
        let byte_order = ByteOrder::arbitrary(u)?;

        // Enforce a valid input length ahead of time.
        // This avoids constantly failing the length check.
        let (block_width, block_height) = format.block_dimensions();
        let blocks = width.div_ceil(block_width) as usize * height.div_ceil(block_height) as usize;
        let mut data = vec![0u8; blocks * format.block_size_in_bytes()];
        u.fill_buffer(&mut data)?;

        Ok(Self {
            width,
            height,
            format,
            byte_order,
            data,
        })
    }
}

fuzz_target!(|input: SurfaceInfo| {
    let surface = Surface {
        width: input.width,
        height: input.height,
        image_format: input.format,
        byte_order: input.byte_order,
        data: input.data,
    };

    let mut rgba = vec![0u8; input.width as usize * input.height as usize * 4];
    match surface.decode_rgba8_into(&mut rgba, &Limits::default()) {
        Ok(()) => (),
        // Only PVRTC grids without power of two dimensions should fail.
        Err(texture_decode::SurfaceError::MortonOrderOutOfBounds { .. }) => {
            assert!(matches!(
                input.format,
                ImageFormat::Pvrtc2bpp | ImageFormat::Pvrtc4bpp
            ))
        }
        Err(e) => panic!("{e}"),
    }
});
