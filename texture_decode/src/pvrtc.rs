use blockdec_rs::{morton_index, pvrtc_2bpp_tile, pvrtc_4bpp_tile, TexelInfo};
use log::{trace, warn};

use crate::{
    grid::{put_rgba_tile, BlockGrid},
    validate_surface, ImageFormat, Limits, SurfaceError,
};

const PVRTC_BLOCK_SIZE_IN_BYTES: usize = 8;

// Temporary tables that only live for a single decode call.
struct PvrtcScratch {
    /// The storage offset for each block in row-major block order.
    offsets: Vec<usize>,
    /// The expanded blocks in storage order.
    texels: Vec<TexelInfo>,
}

impl PvrtcScratch {
    fn new(num_blocks: usize, limits: &Limits) -> Result<Self, SurfaceError> {
        let mut used = 0;
        let offsets = reserve(num_blocks, &mut used, limits)?;
        // Returning early drops the offsets allocated above.
        let texels = reserve(num_blocks, &mut used, limits)?;
        trace!("Acquired {used} bytes of PVRTC scratch memory for {num_blocks} blocks");
        Ok(Self { offsets, texels })
    }

    fn texel(&self, grid: &BlockGrid, x: usize, y: usize) -> &TexelInfo {
        &self.texels[self.offsets[y * grid.blocks_x + x]]
    }
}

fn reserve<T>(len: usize, used: &mut usize, limits: &Limits) -> Result<Vec<T>, SurfaceError> {
    let requested = len.saturating_mul(std::mem::size_of::<T>());
    let total = used.saturating_add(requested);

    if limits.max_scratch_bytes.is_some_and(|max| total > max) {
        warn!(
            "PVRTC scratch memory of {total} bytes exceeds the limit of {:?} bytes",
            limits.max_scratch_bytes
        );
        return Err(SurfaceError::AllocationFailure { requested });
    }

    let mut buffer = Vec::new();
    buffer.try_reserve_exact(len).map_err(|e| {
        warn!("Failed to allocate {requested} bytes of PVRTC scratch memory: {e}");
        SurfaceError::AllocationFailure { requested }
    })?;

    *used = total;
    Ok(buffer)
}

/// Decode PVRTC `data` with dimensions `width` x `height` into `rgba`.
///
/// Blocks are 8x4 pixels if `is_2bpp` is `true` and 4x4 pixels otherwise.
/// Scratch memory for the call is bounded by `limits`.
pub fn decode_pvrtc(
    data: &[u8],
    width: u32,
    height: u32,
    is_2bpp: bool,
    rgba: &mut [u8],
    limits: &Limits,
) -> Result<(), SurfaceError> {
    let format = if is_2bpp {
        ImageFormat::Pvrtc2bpp
    } else {
        ImageFormat::Pvrtc4bpp
    };
    validate_surface(width, height, format, data, rgba)?;

    let (block_width, block_height) = format.block_dimensions();
    let grid = BlockGrid::new(width, height, block_width as usize, block_height as usize);
    let num_blocks = grid
        .num_blocks()
        .ok_or(SurfaceError::PixelCountWouldOverflow { width, height })?;

    let mut scratch = PvrtcScratch::new(num_blocks, limits)?;

    // Expand the blocks in the order they are stored.
    scratch.texels.extend(
        data.chunks_exact(PVRTC_BLOCK_SIZE_IN_BYTES)
            .take(num_blocks)
            .map(|bytes| {
                let block = std::array::from_fn(|i| bytes[i]);
                if is_2bpp {
                    TexelInfo::pvrtc_2bpp(&block)
                } else {
                    TexelInfo::pvrtc_4bpp(&block)
                }
            }),
    );

    for block_y in 0..grid.blocks_y {
        for block_x in 0..grid.blocks_x {
            let offset = morton_index(block_x, block_y, grid.blocks_x, grid.blocks_y);
            if offset >= num_blocks {
                return Err(SurfaceError::MortonOrderOutOfBounds {
                    blocks_x: grid.blocks_x,
                    blocks_y: grid.blocks_y,
                });
            }
            scratch.offsets.push(offset);
        }
    }

    for position in grid.blocks() {
        // Neighbors wrap around the edges of the image.
        let neighbors: [&TexelInfo; 9] = std::array::from_fn(|i| {
            let x = (position.block_x + grid.blocks_x + i % 3 - 1) % grid.blocks_x;
            let y = (position.block_y + grid.blocks_y + i / 3 - 1) % grid.blocks_y;
            scratch.texel(&grid, x, y)
        });

        if is_2bpp {
            put_rgba_tile(rgba, &pvrtc_2bpp_tile(neighbors), grid.width, &position);
        } else {
            put_rgba_tile(rgba, &pvrtc_4bpp_tile(neighbors), grid.width, &position);
        }
    }

    Ok(())
}
