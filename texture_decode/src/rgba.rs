use half::f16;

use crate::{validate_surface, ByteOrder, ImageFormat, SurfaceError};

const CHANNELS: usize = 4;

pub struct R8(u8);
pub struct Rg8([u8; 2]);
pub struct Rgb8([u8; 3]);
pub struct Rgba8([u8; 4]);
pub struct Argb8([u8; 4]);
pub struct Bgra8([u8; 4]);
pub struct R16(u16);
pub struct Rgb565(u16);
pub struct Rgba4(u16);
pub struct Argb4(u16);
pub struct Rf16(f16);
pub struct Rgf16([f16; 2]);
pub struct Rgbaf16([f16; 4]);
pub struct Rf32(f32);
pub struct Rgf32([f32; 2]);
pub struct Rgbaf32([f32; 4]);
pub struct Rgb9e5(u32);

pub trait Pixel {
    const SIZE_IN_BYTES: usize;

    // The length of bytes is always SIZE_IN_BYTES.
    fn get_pixel(bytes: &[u8], byte_order: ByteOrder) -> Self;
}

pub trait ToRgba8 {
    fn to_rgba8(self) -> [u8; 4];
}

macro_rules! pixel_bytes_impl {
    ($($ty:ty: $size:expr),*) => {
        $(
            impl Pixel for $ty {
                const SIZE_IN_BYTES: usize = $size;

                fn get_pixel(bytes: &[u8], _: ByteOrder) -> Self {
                    Self(std::array::from_fn(|i| bytes[i]))
                }
            }
        )*
    };
}
pixel_bytes_impl!(Rg8: 2, Rgb8: 3, Rgba8: 4, Argb8: 4, Bgra8: 4);

macro_rules! pixel_u16_impl {
    ($($ty:ty),*) => {
        $(
            impl Pixel for $ty {
                const SIZE_IN_BYTES: usize = 2;

                fn get_pixel(bytes: &[u8], byte_order: ByteOrder) -> Self {
                    Self(byte_order.read_u16([bytes[0], bytes[1]]))
                }
            }
        )*
    };
}
pixel_u16_impl!(R16, Rgb565, Rgba4, Argb4);

fn read_f16<const N: usize>(bytes: &[u8], byte_order: ByteOrder) -> [f16; N] {
    std::array::from_fn(|i| f16::from_bits(byte_order.read_u16([bytes[2 * i], bytes[2 * i + 1]])))
}

fn read_f32<const N: usize>(bytes: &[u8], byte_order: ByteOrder) -> [f32; N] {
    std::array::from_fn(|i| {
        let bytes = [bytes[4 * i], bytes[4 * i + 1], bytes[4 * i + 2], bytes[4 * i + 3]];
        f32::from_bits(byte_order.read_u32(bytes))
    })
}

impl Pixel for R8 {
    const SIZE_IN_BYTES: usize = 1;

    fn get_pixel(bytes: &[u8], _: ByteOrder) -> Self {
        Self(bytes[0])
    }
}

impl Pixel for Rf16 {
    const SIZE_IN_BYTES: usize = 2;

    fn get_pixel(bytes: &[u8], byte_order: ByteOrder) -> Self {
        let [r] = read_f16(bytes, byte_order);
        Self(r)
    }
}

impl Pixel for Rgf16 {
    const SIZE_IN_BYTES: usize = 4;

    fn get_pixel(bytes: &[u8], byte_order: ByteOrder) -> Self {
        Self(read_f16(bytes, byte_order))
    }
}

impl Pixel for Rgbaf16 {
    const SIZE_IN_BYTES: usize = 8;

    fn get_pixel(bytes: &[u8], byte_order: ByteOrder) -> Self {
        Self(read_f16(bytes, byte_order))
    }
}

impl Pixel for Rf32 {
    const SIZE_IN_BYTES: usize = 4;

    fn get_pixel(bytes: &[u8], byte_order: ByteOrder) -> Self {
        let [r] = read_f32(bytes, byte_order);
        Self(r)
    }
}

impl Pixel for Rgf32 {
    const SIZE_IN_BYTES: usize = 8;

    fn get_pixel(bytes: &[u8], byte_order: ByteOrder) -> Self {
        Self(read_f32(bytes, byte_order))
    }
}

impl Pixel for Rgbaf32 {
    const SIZE_IN_BYTES: usize = 16;

    fn get_pixel(bytes: &[u8], byte_order: ByteOrder) -> Self {
        Self(read_f32(bytes, byte_order))
    }
}

impl Pixel for Rgb9e5 {
    const SIZE_IN_BYTES: usize = 4;

    fn get_pixel(bytes: &[u8], byte_order: ByteOrder) -> Self {
        Self(byte_order.read_u32([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

impl ToRgba8 for R8 {
    fn to_rgba8(self) -> [u8; 4] {
        [self.0, self.0, self.0, 255u8]
    }
}

impl ToRgba8 for Rg8 {
    fn to_rgba8(self) -> [u8; 4] {
        let [r, g] = self.0;
        [r, g, 0u8, 255u8]
    }
}

impl ToRgba8 for Rgb8 {
    fn to_rgba8(self) -> [u8; 4] {
        let [r, g, b] = self.0;
        [r, g, b, 255u8]
    }
}

impl ToRgba8 for Rgba8 {
    fn to_rgba8(self) -> [u8; 4] {
        self.0
    }
}

impl ToRgba8 for Argb8 {
    fn to_rgba8(self) -> [u8; 4] {
        let [a, r, g, b] = self.0;
        [r, g, b, a]
    }
}

impl ToRgba8 for Bgra8 {
    fn to_rgba8(self) -> [u8; 4] {
        let [b, g, r, a] = self.0;
        [r, g, b, a]
    }
}

impl ToRgba8 for R16 {
    fn to_rgba8(self) -> [u8; 4] {
        let r = unorm16_to_unorm8(self.0);
        [r, r, r, 255u8]
    }
}

impl ToRgba8 for Rgb565 {
    fn to_rgba8(self) -> [u8; 4] {
        let [r, g, b] = blockdec_rs::rgb565_to_rgb8(self.0);
        [r, g, b, 255u8]
    }
}

impl ToRgba8 for Rgba4 {
    fn to_rgba8(self) -> [u8; 4] {
        // Channels are stored from the most significant nibble.
        [12, 8, 4, 0].map(|shift| unorm4_to_unorm8(self.0 >> shift))
    }
}

impl ToRgba8 for Argb4 {
    fn to_rgba8(self) -> [u8; 4] {
        [8, 4, 0, 12].map(|shift| unorm4_to_unorm8(self.0 >> shift))
    }
}

impl ToRgba8 for Rf16 {
    fn to_rgba8(self) -> [u8; 4] {
        let r = float_to_unorm8(self.0.to_f32());
        [r, r, r, 255u8]
    }
}

impl ToRgba8 for Rgf16 {
    fn to_rgba8(self) -> [u8; 4] {
        let [r, g] = self.0.map(|f| float_to_unorm8(f.to_f32()));
        [r, g, 0u8, 255u8]
    }
}

impl ToRgba8 for Rgbaf16 {
    fn to_rgba8(self) -> [u8; 4] {
        self.0.map(|f| float_to_unorm8(f.to_f32()))
    }
}

impl ToRgba8 for Rf32 {
    fn to_rgba8(self) -> [u8; 4] {
        let r = float_to_unorm8(self.0);
        [r, r, r, 255u8]
    }
}

impl ToRgba8 for Rgf32 {
    fn to_rgba8(self) -> [u8; 4] {
        let [r, g] = self.0.map(float_to_unorm8);
        [r, g, 0u8, 255u8]
    }
}

impl ToRgba8 for Rgbaf32 {
    fn to_rgba8(self) -> [u8; 4] {
        self.0.map(float_to_unorm8)
    }
}

impl ToRgba8 for Rgb9e5 {
    fn to_rgba8(self) -> [u8; 4] {
        // Red is in the low bits and the exponent is in the high 5 bits.
        // The mantissas have no implicit leading one.
        let scale = 2f32.powi((self.0 >> 27) as i32 - 15 - 9);
        let [r, g, b] = [0, 9, 18].map(|shift| {
            let mantissa = (self.0 >> shift) & 0x1FF;
            float_to_unorm8(mantissa as f32 * scale)
        });
        [r, g, b, 255u8]
    }
}

fn unorm16_to_unorm8(x: u16) -> u8 {
    ((x as u32 * 255 + 32767) / 65535) as u8
}

fn unorm4_to_unorm8(x: u16) -> u8 {
    (x & 0xF) as u8 * 17
}

fn float_to_unorm8(x: f32) -> u8 {
    // NaN converts to 0.
    (x * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Decode the uncompressed pixels in `data` to RGBA8.
///
/// Rows in `data` start from the bottom of the image.
pub fn rgba8_from_pixels<P>(
    data: &[u8],
    width: u32,
    height: u32,
    format: ImageFormat,
    byte_order: ByteOrder,
    rgba: &mut [u8],
) -> Result<(), SurfaceError>
where
    P: Pixel + ToRgba8,
{
    let expected_size = validate_surface(width, height, format, data, rgba)?;

    let input_row_size = width as usize * P::SIZE_IN_BYTES;
    let output_rows = rgba.chunks_exact_mut(width as usize * CHANNELS);
    let input_rows = data[..expected_size].chunks_exact(input_row_size).rev();

    for (output_row, input_row) in output_rows.zip(input_rows) {
        for (pixel, bytes) in output_row
            .chunks_exact_mut(CHANNELS)
            .zip(input_row.chunks_exact(P::SIZE_IN_BYTES))
        {
            pixel.copy_from_slice(&P::get_pixel(bytes, byte_order).to_rgba8());
        }
    }

    Ok(())
}
