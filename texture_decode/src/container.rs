use log::debug;

use crate::{ByteOrder, ContainerError, ImageFormat, Surface, SurfaceError, SurfaceRgba8};

/// The texture formats used by crunch (`.crn`) containers.
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[cfg_attr(feature = "strum", derive(strum::EnumIter, strum::Display))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum CrunchFormat {
    Dxt1,
    Dxt3,
    Dxt5,
    Dxt5CCxY,
    Dxt5xGxR,
    Dxt5xGBR,
    Dxt5AGBR,
    DxnXY,
    DxnYX,
    Dxt5A,
    Etc1,
    Etc2,
    Etc2A,
    Etc1S,
    Etc2AS,
}

impl CrunchFormat {
    /// Converts the format id stored in the container header.
    pub fn from_id(id: u32) -> Result<Self, SurfaceError> {
        match id {
            0 => Ok(Self::Dxt1),
            1 => Ok(Self::Dxt3),
            2 => Ok(Self::Dxt5),
            3 => Ok(Self::Dxt5CCxY),
            4 => Ok(Self::Dxt5xGxR),
            5 => Ok(Self::Dxt5xGBR),
            6 => Ok(Self::Dxt5AGBR),
            7 => Ok(Self::DxnXY),
            8 => Ok(Self::DxnYX),
            9 => Ok(Self::Dxt5A),
            10 => Ok(Self::Etc1),
            11 => Ok(Self::Etc2),
            12 => Ok(Self::Etc2A),
            13 => Ok(Self::Etc1S),
            14 => Ok(Self::Etc2AS),
            _ => Err(SurfaceError::UnknownFormat { id }),
        }
    }

    /// The format of the unpacked level data.
    ///
    /// Swizzled DXT5 variants are decoded without undoing the swizzle.
    pub fn image_format(&self) -> Result<ImageFormat, SurfaceError> {
        match self {
            Self::Dxt1 => Ok(ImageFormat::Dxt1),
            Self::Dxt5 | Self::Dxt5CCxY | Self::Dxt5xGxR | Self::Dxt5xGBR | Self::Dxt5AGBR => {
                Ok(ImageFormat::Dxt5)
            }
            Self::Etc1 | Self::Etc1S => Ok(ImageFormat::Etc1),
            Self::Etc2 => Ok(ImageFormat::Etc2Rgb),
            Self::Etc2A | Self::Etc2AS => Ok(ImageFormat::Etc2Rgba8),
            Self::Dxt3 | Self::DxnXY | Self::DxnYX | Self::Dxt5A => {
                Err(SurfaceError::UnsupportedFormat { format: *self })
            }
        }
    }
}

/// Sizes of the sections of a container file.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct FileInfo {
    pub struct_size: u32,
    pub actual_data_size: u32,
    pub header_size: u32,
    pub total_palette_size: u32,
    pub tables_size: u32,
    pub levels: u32,
    /// The compressed size in bytes of each level.
    pub level_compressed_size: Vec<u32>,
    pub color_endpoint_palette_entries: u32,
    pub color_selector_palette_entries: u32,
    pub alpha_endpoint_palette_entries: u32,
    pub alpha_selector_palette_entries: u32,
}

/// Properties of the texture stored in a container file.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct TextureInfo {
    pub struct_size: u32,
    pub width: u32,
    pub height: u32,
    pub levels: u32,
    pub faces: u32,
    pub bytes_per_block: u32,
    pub userdata0: u32,
    pub userdata1: u32,
    /// The container's format id. See [CrunchFormat::from_id].
    pub format: u32,
}

/// Properties of a single mip level stored in a container file.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct LevelInfo {
    pub struct_size: u32,
    pub width: u32,
    pub height: u32,
    pub faces: u32,
    pub blocks_x: u32,
    pub blocks_y: u32,
    pub bytes_per_block: u32,
    /// The container's format id. See [CrunchFormat::from_id].
    pub format: u32,
}

impl LevelInfo {
    /// The width in pixels of a single block.
    pub fn block_width(&self) -> u32 {
        self.width.div_ceil(self.blocks_x.max(1))
    }

    /// The height in pixels of a single block.
    pub fn block_height(&self) -> u32 {
        self.height.div_ceil(self.blocks_y.max(1))
    }

    /// The size in bytes of the level after unpacking.
    pub fn unpacked_size(&self) -> Option<usize> {
        (self.blocks_x as usize)
            .checked_mul(self.bytes_per_block as usize)?
            .checked_mul(self.blocks_y as usize)
    }
}

/// A texture container that stores compressed mip levels with its own encoding.
///
/// Implementations wrap the library that parses the container.
/// Each method fails with [ContainerError::InvalidContainer]
/// if `bytes` is not a valid container.
pub trait TextureContainer {
    fn file_info(&self, bytes: &[u8]) -> Result<FileInfo, ContainerError>;

    fn texture_info(&self, bytes: &[u8]) -> Result<TextureInfo, ContainerError>;

    fn level_info(&self, bytes: &[u8], level: u32) -> Result<LevelInfo, ContainerError>;

    /// Unpack the blocks for `level` to the data for the level's block compressed format.
    fn unpack_level(&self, bytes: &[u8], level: u32) -> Result<Vec<u8>, ContainerError>;
}

/// Unpack and decode the mip level `level` from `bytes` to RGBA8.
pub fn decode_level<C: TextureContainer>(
    container: &C,
    bytes: &[u8],
    level: u32,
) -> Result<SurfaceRgba8<Vec<u8>>, SurfaceError> {
    let info = container.level_info(bytes, level)?;
    let format = CrunchFormat::from_id(info.format)?;
    let image_format = format.image_format()?;

    let data = container.unpack_level(bytes, level)?;
    let expected = info
        .unpacked_size()
        .ok_or(SurfaceError::PixelCountWouldOverflow {
            width: info.width,
            height: info.height,
        })?;
    if data.len() != expected {
        return Err(ContainerError::InvalidContainer {
            reason: format!(
                "unpacked {} bytes for level {level} but expected {expected}",
                data.len()
            ),
        }
        .into());
    }

    debug!(
        "Unpacked level {level} with {}x{} blocks in format {format:?}",
        info.blocks_x, info.blocks_y
    );

    Surface {
        width: info.width,
        height: info.height,
        image_format,
        byte_order: ByteOrder::LittleEndian,
        data,
    }
    .decode_rgba8()
}
