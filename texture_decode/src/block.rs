use blockdec_rs::{Tile4x4, BLOCK_HEIGHT, BLOCK_WIDTH};

use crate::{
    grid::{put_rgba_tile, BlockGrid},
    validate_surface, ImageFormat, SurfaceError,
};

pub trait BlockDecode {
    type CompressedBlock: ReadBlock;

    const FORMAT: ImageFormat;

    // The decoded 4x4 pixel blocks are in row-major ordering.
    fn decompress_block(block: &Self::CompressedBlock) -> Tile4x4;
}

// Allows block types to copy buffer data into a fixed size array.
pub trait ReadBlock {
    const SIZE_IN_BYTES: usize;

    fn read_block(bytes: &[u8]) -> Self;
}

impl<const N: usize> ReadBlock for [u8; N] {
    const SIZE_IN_BYTES: usize = N;

    fn read_block(bytes: &[u8]) -> Self {
        std::array::from_fn(|i| bytes[i])
    }
}

pub struct Dxt1;
pub struct Dxt5;
pub struct Etc1;
pub struct Etc2;
pub struct Etc2Alpha1;
pub struct Etc2Alpha8;

impl BlockDecode for Dxt1 {
    type CompressedBlock = [u8; 8];
    const FORMAT: ImageFormat = ImageFormat::Dxt1;

    fn decompress_block(block: &[u8; 8]) -> Tile4x4 {
        blockdec_rs::dxt1(block)
    }
}

impl BlockDecode for Dxt5 {
    type CompressedBlock = [u8; 16];
    const FORMAT: ImageFormat = ImageFormat::Dxt5;

    fn decompress_block(block: &[u8; 16]) -> Tile4x4 {
        blockdec_rs::dxt5(block)
    }
}

impl BlockDecode for Etc1 {
    type CompressedBlock = [u8; 8];
    const FORMAT: ImageFormat = ImageFormat::Etc1;

    fn decompress_block(block: &[u8; 8]) -> Tile4x4 {
        blockdec_rs::etc1(block)
    }
}

impl BlockDecode for Etc2 {
    type CompressedBlock = [u8; 8];
    const FORMAT: ImageFormat = ImageFormat::Etc2Rgb;

    fn decompress_block(block: &[u8; 8]) -> Tile4x4 {
        blockdec_rs::etc2(block)
    }
}

impl BlockDecode for Etc2Alpha1 {
    type CompressedBlock = [u8; 9];
    const FORMAT: ImageFormat = ImageFormat::Etc2Rgba1;

    fn decompress_block(block: &[u8; 9]) -> Tile4x4 {
        blockdec_rs::etc2_alpha1(block)
    }
}

impl BlockDecode for Etc2Alpha8 {
    type CompressedBlock = [u8; 16];
    const FORMAT: ImageFormat = ImageFormat::Etc2Rgba8;

    fn decompress_block(block: &[u8; 16]) -> Tile4x4 {
        blockdec_rs::etc2_alpha8(block)
    }
}

/// Decompress the blocks in `data` into the RGBA8 buffer `rgba`.
///
/// Blocks are stored in row-major order starting from the bottom left of the image.
pub fn decode_blocks<F: BlockDecode>(
    data: &[u8],
    width: u32,
    height: u32,
    rgba: &mut [u8],
) -> Result<(), SurfaceError> {
    // Check everything up front so that failed calls never write to the output.
    let expected_size = validate_surface(width, height, F::FORMAT, data, rgba)?;

    let grid = BlockGrid::new(width, height, BLOCK_WIDTH, BLOCK_HEIGHT);

    let block_size = F::CompressedBlock::SIZE_IN_BYTES;
    for (bytes, position) in data[..expected_size]
        .chunks_exact(block_size)
        .zip(grid.blocks())
    {
        // Boundary blocks are decoded in full and clipped when copying.
        let block = F::CompressedBlock::read_block(bytes);
        let decompressed = F::decompress_block(&block);
        put_rgba_tile(rgba, &decompressed, grid.width, &position);
    }

    Ok(())
}

/// Decode DXT1 (BC1) `data` with dimensions `width` x `height` into `rgba`.
///
/// The length of `rgba` must be exactly `width * height * 4` bytes.
pub fn decode_dxt1(data: &[u8], width: u32, height: u32, rgba: &mut [u8]) -> Result<(), SurfaceError> {
    decode_blocks::<Dxt1>(data, width, height, rgba)
}

/// Decode DXT5 (BC3) `data` with dimensions `width` x `height` into `rgba`.
pub fn decode_dxt5(data: &[u8], width: u32, height: u32, rgba: &mut [u8]) -> Result<(), SurfaceError> {
    decode_blocks::<Dxt5>(data, width, height, rgba)
}

/// Decode ETC1 `data` with dimensions `width` x `height` into `rgba`.
pub fn decode_etc1(data: &[u8], width: u32, height: u32, rgba: &mut [u8]) -> Result<(), SurfaceError> {
    decode_blocks::<Etc1>(data, width, height, rgba)
}

/// Decode ETC2 RGB `data` with dimensions `width` x `height` into `rgba`.
pub fn decode_etc2(data: &[u8], width: u32, height: u32, rgba: &mut [u8]) -> Result<(), SurfaceError> {
    decode_blocks::<Etc2>(data, width, height, rgba)
}

/// Decode ETC2 RGB with a single alpha value for each block.
///
/// Each 9 byte block stores the alpha byte followed by the ETC2 color block.
pub fn decode_etc2_alpha1(
    data: &[u8],
    width: u32,
    height: u32,
    rgba: &mut [u8],
) -> Result<(), SurfaceError> {
    decode_blocks::<Etc2Alpha1>(data, width, height, rgba)
}

/// Decode ETC2 RGBA8 (EAC alpha followed by ETC2 color) `data` into `rgba`.
pub fn decode_etc2_alpha8(
    data: &[u8],
    width: u32,
    height: u32,
    rgba: &mut [u8],
) -> Result<(), SurfaceError> {
    decode_blocks::<Etc2Alpha8>(data, width, height, rgba)
}
