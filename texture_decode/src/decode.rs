use log::debug;

use crate::{
    block::{decode_blocks, Dxt1, Dxt5, Etc1, Etc2, Etc2Alpha1, Etc2Alpha8},
    pvrtc::decode_pvrtc,
    rgba::{
        rgba8_from_pixels, Argb4, Argb8, Bgra8, R16, R8, Rf16, Rg8, Rgb565, Rgb8, Rgba4, Rgba8,
        Rgb9e5, Rgbaf16, Rgbaf32, Rf32, Rgf16, Rgf32,
    },
    rgba8_size, ByteOrder, ImageFormat, Limits, Surface, SurfaceError, SurfaceRgba8,
};

impl<T: AsRef<[u8]>> Surface<T> {
    /// Decode the surface to RGBA8.
    pub fn decode_rgba8(&self) -> Result<SurfaceRgba8<Vec<u8>>, SurfaceError> {
        self.validate()?;

        let mut data = vec![0u8; rgba8_size(self.width, self.height)?];
        self.decode_rgba8_into(&mut data, &Limits::default())?;

        Ok(SurfaceRgba8 {
            width: self.width,
            height: self.height,
            data,
        })
    }

    /// Decode the surface to RGBA8 into an existing buffer of exactly
    /// `width * height * 4` bytes.
    ///
    /// The contents of `rgba` are unchanged if decoding fails.
    pub fn decode_rgba8_into(&self, rgba: &mut [u8], limits: &Limits) -> Result<(), SurfaceError> {
        self.validate()?;

        let data = self.data.as_ref();
        debug!(
            "Decoding {}x{} {:?} surface from {} bytes",
            self.width,
            self.height,
            self.image_format,
            data.len()
        );

        decode_surface(
            data,
            self.width,
            self.height,
            self.image_format,
            self.byte_order,
            rgba,
            limits,
        )
    }
}

fn decode_surface(
    data: &[u8],
    width: u32,
    height: u32,
    format: ImageFormat,
    byte_order: ByteOrder,
    rgba: &mut [u8],
    limits: &Limits,
) -> Result<(), SurfaceError> {
    use ImageFormat as F;
    match format {
        F::Dxt1 => decode_blocks::<Dxt1>(data, width, height, rgba),
        F::Dxt5 => decode_blocks::<Dxt5>(data, width, height, rgba),
        F::Etc1 => decode_blocks::<Etc1>(data, width, height, rgba),
        F::Etc2Rgb => decode_blocks::<Etc2>(data, width, height, rgba),
        F::Etc2Rgba1 => decode_blocks::<Etc2Alpha1>(data, width, height, rgba),
        F::Etc2Rgba8 => decode_blocks::<Etc2Alpha8>(data, width, height, rgba),
        F::Pvrtc2bpp => decode_pvrtc(data, width, height, true, rgba, limits),
        F::Pvrtc4bpp => decode_pvrtc(data, width, height, false, rgba, limits),
        // Alpha only data is displayed as grayscale.
        F::Alpha8 | F::R8 => rgba8_from_pixels::<R8>(data, width, height, format, byte_order, rgba),
        F::R16 => rgba8_from_pixels::<R16>(data, width, height, format, byte_order, rgba),
        F::Rg16 => rgba8_from_pixels::<Rg8>(data, width, height, format, byte_order, rgba),
        F::Rgb24 => rgba8_from_pixels::<Rgb8>(data, width, height, format, byte_order, rgba),
        F::Rgba32 => rgba8_from_pixels::<Rgba8>(data, width, height, format, byte_order, rgba),
        F::Argb32 => rgba8_from_pixels::<Argb8>(data, width, height, format, byte_order, rgba),
        F::Bgra32 => rgba8_from_pixels::<Bgra8>(data, width, height, format, byte_order, rgba),
        F::Rgb565 => rgba8_from_pixels::<Rgb565>(data, width, height, format, byte_order, rgba),
        F::Rgba4444 => rgba8_from_pixels::<Rgba4>(data, width, height, format, byte_order, rgba),
        F::Argb4444 => rgba8_from_pixels::<Argb4>(data, width, height, format, byte_order, rgba),
        F::RHalf => rgba8_from_pixels::<Rf16>(data, width, height, format, byte_order, rgba),
        F::RgHalf => rgba8_from_pixels::<Rgf16>(data, width, height, format, byte_order, rgba),
        F::RgbaHalf => rgba8_from_pixels::<Rgbaf16>(data, width, height, format, byte_order, rgba),
        F::RFloat => rgba8_from_pixels::<Rf32>(data, width, height, format, byte_order, rgba),
        F::RgFloat => rgba8_from_pixels::<Rgf32>(data, width, height, format, byte_order, rgba),
        F::RgbaFloat => rgba8_from_pixels::<Rgbaf32>(data, width, height, format, byte_order, rgba),
        F::Rgb9e5Float => rgba8_from_pixels::<Rgb9e5>(data, width, height, format, byte_order, rgba),
    }
}
