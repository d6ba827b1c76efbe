use crate::{rgba8_size, surface_size, ByteOrder, ImageFormat, SurfaceError};

/// A surface with an image format known at runtime.
#[derive(Debug, PartialEq)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Surface<T> {
    /// The width of the surface in pixels.
    pub width: u32,
    /// The height of the surface in pixels.
    pub height: u32,
    /// The format of the bytes in [data](#structfield.data).
    pub image_format: ImageFormat,
    /// The byte order of 16-bit and half float samples for uncompressed formats.
    pub byte_order: ByteOrder,
    /// The image data for a single mip level with the bottom row stored first.
    /// Any bytes past the expected size are ignored.
    pub data: T,
}

impl<T: AsRef<[u8]>> Surface<T> {
    /// The number of bytes in [data](#structfield.data) used for decoding.
    pub fn size_in_bytes(&self) -> Option<usize> {
        let (block_width, block_height) = self.image_format.block_dimensions();
        surface_size(
            self.width as usize,
            self.height as usize,
            block_width as usize,
            block_height as usize,
            self.image_format.block_size_in_bytes(),
        )
    }

    pub(crate) fn validate(&self) -> Result<(), SurfaceError> {
        if self.width == 0 || self.height == 0 {
            return Err(SurfaceError::ZeroSizedSurface {
                width: self.width,
                height: self.height,
            });
        }

        let expected = self
            .size_in_bytes()
            .ok_or(SurfaceError::PixelCountWouldOverflow {
                width: self.width,
                height: self.height,
            })?;

        // The output must also be addressable.
        rgba8_size(self.width, self.height)?;

        let actual = self.data.as_ref().len();
        if expected > actual {
            return Err(SurfaceError::InputTooShort { expected, actual });
        }

        Ok(())
    }
}

/// An uncompressed RGBA8 surface with 4 bytes per pixel and row 0 at the top.
#[derive(Debug, PartialEq)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SurfaceRgba8<T> {
    /// The width of the surface in pixels.
    pub width: u32,
    /// The height of the surface in pixels.
    pub height: u32,
    /// The RGBA8 pixels in row-major order.
    pub data: T,
}

#[cfg(feature = "image")]
impl<T: AsRef<[u8]>> SurfaceRgba8<T> {
    /// Create an image from the decoded pixels.
    pub fn to_image(&self) -> Result<image::RgbaImage, crate::CreateImageError> {
        let data = self.data.as_ref().to_vec();
        let data_length = data.len();

        image::RgbaImage::from_raw(self.width, self.height, data).ok_or(
            crate::CreateImageError::InvalidSurfaceDimensions {
                width: self.width,
                height: self.height,
                data_length,
            },
        )
    }
}
