//! Decode the compressed and uncompressed texture formats found in game asset archives to RGBA8.
//!
//! Block compressed formats are DXT1, DXT5, the ETC1 and ETC2 family, and PVRTC.
//! The per block decoding is implemented in `blockdec_rs`.
//! This crate places the decoded blocks into a surface and handles validation.
//!
//! Texture data is assumed to store the bottom row of the image first.
//! All decoded surfaces have row 0 at the top of the image.
//!
//! # Getting Started
//! ```rust no_run
//! # let data = vec![0u8; 64 * 64];
//! use texture_decode::{ByteOrder, ImageFormat, Surface};
//!
//! let surface = Surface {
//!     width: 64,
//!     height: 64,
//!     image_format: ImageFormat::from_unity_id(47)?,
//!     byte_order: ByteOrder::LittleEndian,
//!     data,
//! };
//! let rgba8 = surface.decode_rgba8()?;
//! # Ok::<(), texture_decode::SurfaceError>(())
//! ```
mod block;
mod container;
mod decode;
mod error;
mod grid;
mod pvrtc;
mod rgba;
mod surface;

pub use block::{
    decode_dxt1, decode_dxt5, decode_etc1, decode_etc2, decode_etc2_alpha1, decode_etc2_alpha8,
};
pub use container::{
    decode_level, CrunchFormat, FileInfo, LevelInfo, TextureContainer, TextureInfo,
};
pub use error::{ContainerError, CreateImageError, SurfaceError};
pub use grid::{for_each_block, BlockGrid, BlockPosition};
pub use pvrtc::decode_pvrtc;
pub use surface::{Surface, SurfaceRgba8};

#[cfg(feature = "image")]
pub use image;

/// The format of the bytes in a [Surface].
///
/// Uncompressed formats are named in the order the channels appear in memory.
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[cfg_attr(feature = "strum", derive(strum::EnumIter, strum::Display))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ImageFormat {
    Dxt1,
    Dxt5,
    Etc1,
    Etc2Rgb,
    /// An alpha byte followed by an ETC2 RGB block.
    Etc2Rgba1,
    Etc2Rgba8,
    Pvrtc2bpp,
    Pvrtc4bpp,
    Alpha8,
    R8,
    R16,
    /// 8 bits for each of the red and green channels.
    Rg16,
    Rgb24,
    Rgba32,
    Argb32,
    Bgra32,
    Rgb565,
    Rgba4444,
    Argb4444,
    RHalf,
    RgHalf,
    RgbaHalf,
    RFloat,
    RgFloat,
    RgbaFloat,
    /// Three 9 bit mantissas with a shared 5 bit exponent.
    Rgb9e5Float,
}

impl ImageFormat {
    /// The width and height in pixels of a single compressed block.
    ///
    /// Uncompressed formats have a block size of 1x1 pixels.
    pub fn block_dimensions(&self) -> (u32, u32) {
        match self {
            ImageFormat::Dxt1
            | ImageFormat::Dxt5
            | ImageFormat::Etc1
            | ImageFormat::Etc2Rgb
            | ImageFormat::Etc2Rgba1
            | ImageFormat::Etc2Rgba8
            | ImageFormat::Pvrtc4bpp => (4, 4),
            ImageFormat::Pvrtc2bpp => (8, 4),
            _ => (1, 1),
        }
    }

    /// The size in bytes of a single block or pixel for uncompressed formats.
    pub fn block_size_in_bytes(&self) -> usize {
        match self {
            ImageFormat::Dxt1 => 8,
            ImageFormat::Dxt5 => 16,
            ImageFormat::Etc1 => 8,
            ImageFormat::Etc2Rgb => 8,
            ImageFormat::Etc2Rgba1 => 9,
            ImageFormat::Etc2Rgba8 => 16,
            ImageFormat::Pvrtc2bpp => 8,
            ImageFormat::Pvrtc4bpp => 8,
            ImageFormat::Alpha8 => 1,
            ImageFormat::R8 => 1,
            ImageFormat::R16 => 2,
            ImageFormat::Rg16 => 2,
            ImageFormat::Rgb24 => 3,
            ImageFormat::Rgba32 => 4,
            ImageFormat::Argb32 => 4,
            ImageFormat::Bgra32 => 4,
            ImageFormat::Rgb565 => 2,
            ImageFormat::Rgba4444 => 2,
            ImageFormat::Argb4444 => 2,
            ImageFormat::RHalf => 2,
            ImageFormat::RgHalf => 4,
            ImageFormat::RgbaHalf => 8,
            ImageFormat::RFloat => 4,
            ImageFormat::RgFloat => 8,
            ImageFormat::RgbaFloat => 16,
            ImageFormat::Rgb9e5Float => 4,
        }
    }

    /// Converts the value of a Unity `TextureFormat` to a supported format.
    pub fn from_unity_id(id: u32) -> Result<Self, SurfaceError> {
        match id {
            1 => Ok(ImageFormat::Alpha8),
            2 => Ok(ImageFormat::Argb4444),
            3 => Ok(ImageFormat::Rgb24),
            4 => Ok(ImageFormat::Rgba32),
            5 => Ok(ImageFormat::Argb32),
            7 => Ok(ImageFormat::Rgb565),
            9 => Ok(ImageFormat::R16),
            10 => Ok(ImageFormat::Dxt1),
            12 => Ok(ImageFormat::Dxt5),
            13 => Ok(ImageFormat::Rgba4444),
            14 => Ok(ImageFormat::Bgra32),
            15 => Ok(ImageFormat::RHalf),
            16 => Ok(ImageFormat::RgHalf),
            17 => Ok(ImageFormat::RgbaHalf),
            18 => Ok(ImageFormat::RFloat),
            19 => Ok(ImageFormat::RgFloat),
            20 => Ok(ImageFormat::RgbaFloat),
            22 => Ok(ImageFormat::Rgb9e5Float),
            // RGB and RGBA variants share the same block layout.
            30 | 31 => Ok(ImageFormat::Pvrtc2bpp),
            32 | 33 => Ok(ImageFormat::Pvrtc4bpp),
            34 => Ok(ImageFormat::Etc1),
            45 => Ok(ImageFormat::Etc2Rgb),
            46 => Ok(ImageFormat::Etc2Rgba1),
            47 => Ok(ImageFormat::Etc2Rgba8),
            62 => Ok(ImageFormat::Rg16),
            63 => Ok(ImageFormat::R8),
            _ => Err(SurfaceError::UnknownFormat { id }),
        }
    }
}

/// The byte order of multi-byte samples in uncompressed formats.
///
/// Block compressed formats always use the byte order defined by the format.
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ByteOrder {
    #[default]
    LittleEndian,
    BigEndian,
}

impl ByteOrder {
    fn read_u16(self, bytes: [u8; 2]) -> u16 {
        match self {
            ByteOrder::LittleEndian => u16::from_le_bytes(bytes),
            ByteOrder::BigEndian => u16::from_be_bytes(bytes),
        }
    }

    fn read_u32(self, bytes: [u8; 4]) -> u32 {
        match self {
            ByteOrder::LittleEndian => u32::from_le_bytes(bytes),
            ByteOrder::BigEndian => u32::from_be_bytes(bytes),
        }
    }
}

/// Run-time limits for decoding.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct Limits {
    /// The maximum size in bytes of the temporary buffers used for decoding PVRTC.
    /// Exceeding the limit fails with [SurfaceError::AllocationFailure].
    /// There is no limit other than available memory if this is `None`.
    pub max_scratch_bytes: Option<usize>,
}

/// Decodes a surface of dimensions `width` x `height` with the given `format` to RGBA8.
pub fn decode_surface_rgba8(
    width: u32,
    height: u32,
    data: &[u8],
    format: ImageFormat,
) -> Result<Vec<u8>, SurfaceError> {
    Surface {
        width,
        height,
        image_format: format,
        byte_order: ByteOrder::LittleEndian,
        data,
    }
    .decode_rgba8()
    .map(|surface| surface.data)
}

// The number of bytes needed for a surface with the given block layout.
fn surface_size(
    width: usize,
    height: usize,
    block_width: usize,
    block_height: usize,
    block_size_in_bytes: usize,
) -> Option<usize> {
    width
        .div_ceil(block_width)
        .checked_mul(height.div_ceil(block_height))?
        .checked_mul(block_size_in_bytes)
}

// Checks the input and output lengths before any decoding happens.
// Returns the number of bytes of input used for decoding.
fn validate_surface(
    width: u32,
    height: u32,
    format: ImageFormat,
    data: &[u8],
    rgba: &[u8],
) -> Result<usize, SurfaceError> {
    if width == 0 || height == 0 {
        return Err(SurfaceError::ZeroSizedSurface { width, height });
    }

    let (block_width, block_height) = format.block_dimensions();
    let expected = surface_size(
        width as usize,
        height as usize,
        block_width as usize,
        block_height as usize,
        format.block_size_in_bytes(),
    )
    .ok_or(SurfaceError::PixelCountWouldOverflow { width, height })?;

    if data.len() < expected {
        return Err(SurfaceError::InputTooShort {
            expected,
            actual: data.len(),
        });
    }

    let rgba_size = rgba8_size(width, height)?;
    if rgba.len() != rgba_size {
        return Err(SurfaceError::OutputLengthMismatch {
            expected: rgba_size,
            actual: rgba.len(),
        });
    }

    Ok(expected)
}

fn rgba8_size(width: u32, height: u32) -> Result<usize, SurfaceError> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(4))
        .ok_or(SurfaceError::PixelCountWouldOverflow { width, height })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_size_partial_blocks() {
        // 5x5 pixels still requires 2x2 blocks.
        assert_eq!(Some(2 * 2 * 8), surface_size(5, 5, 4, 4, 8));
    }

    #[test]
    fn surface_size_pvrtc_2bpp() {
        assert_eq!(Some(2 * 8), surface_size(9, 4, 8, 4, 8));
    }

    #[test]
    fn surface_size_overflow() {
        assert_eq!(None, surface_size(usize::MAX, usize::MAX, 1, 1, 4));
    }

    #[test]
    fn block_dimensions_match_size() {
        assert_eq!((4, 4), ImageFormat::Dxt1.block_dimensions());
        assert_eq!((8, 4), ImageFormat::Pvrtc2bpp.block_dimensions());
        assert_eq!((1, 1), ImageFormat::RgbaHalf.block_dimensions());
        assert_eq!(9, ImageFormat::Etc2Rgba1.block_size_in_bytes());
        assert_eq!(16, ImageFormat::RgbaFloat.block_size_in_bytes());
        assert_eq!(4, ImageFormat::Rgb9e5Float.block_size_in_bytes());
    }

    #[test]
    fn from_unity_id_known() {
        assert_eq!(ImageFormat::Dxt1, ImageFormat::from_unity_id(10).unwrap());
        assert_eq!(ImageFormat::Pvrtc2bpp, ImageFormat::from_unity_id(31).unwrap());
        assert_eq!(ImageFormat::Pvrtc4bpp, ImageFormat::from_unity_id(32).unwrap());
        assert_eq!(ImageFormat::Etc1, ImageFormat::from_unity_id(34).unwrap());
        assert_eq!(ImageFormat::R8, ImageFormat::from_unity_id(63).unwrap());
    }

    #[test]
    fn from_unity_id_float() {
        assert_eq!(ImageFormat::RFloat, ImageFormat::from_unity_id(18).unwrap());
        assert_eq!(ImageFormat::RgFloat, ImageFormat::from_unity_id(19).unwrap());
        assert_eq!(ImageFormat::RgbaFloat, ImageFormat::from_unity_id(20).unwrap());
        assert_eq!(ImageFormat::Rgb9e5Float, ImageFormat::from_unity_id(22).unwrap());
        // YUY2 has no decoder.
        assert!(matches!(
            ImageFormat::from_unity_id(21),
            Err(SurfaceError::UnknownFormat { id: 21 })
        ));
    }

    #[test]
    fn from_unity_id_unknown() {
        // ASTC 4x4 has no decoder.
        assert!(matches!(
            ImageFormat::from_unity_id(48),
            Err(SurfaceError::UnknownFormat { id: 48 })
        ));
    }

    #[test]
    fn validate_surface_zero_size() {
        assert!(matches!(
            validate_surface(0, 4, ImageFormat::Dxt1, &[0u8; 8], &[]),
            Err(SurfaceError::ZeroSizedSurface {
                width: 0,
                height: 4
            })
        ));
    }

    #[test]
    fn validate_surface_not_enough_data() {
        assert!(matches!(
            validate_surface(5, 5, ImageFormat::Dxt5, &[0u8; 63], &[0u8; 100]),
            Err(SurfaceError::InputTooShort {
                expected: 64,
                actual: 63
            })
        ));
    }

    #[test]
    fn validate_surface_output_length() {
        assert!(matches!(
            validate_surface(4, 4, ImageFormat::Dxt1, &[0u8; 8], &[0u8; 60]),
            Err(SurfaceError::OutputLengthMismatch {
                expected: 64,
                actual: 60
            })
        ));
    }

    #[test]
    fn validate_surface_extra_data() {
        // Trailing data such as mipmaps is ignored.
        assert_eq!(
            8,
            validate_surface(4, 4, ImageFormat::Etc1, &[0u8; 12], &[0u8; 64]).unwrap()
        );
    }
}
