const CHANNELS: usize = 4;

/// The layout of fixed size blocks covering a surface.
///
/// Dimensions that are not a multiple of the block size are rounded up.
/// Blocks on the right and top edges may extend past the surface.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct BlockGrid {
    pub width: usize,
    pub height: usize,
    pub block_width: usize,
    pub block_height: usize,
    pub blocks_x: usize,
    pub blocks_y: usize,
}

/// The location of a single block and the part of it that lies inside the surface.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct BlockPosition {
    /// The index of the block in row-major block order.
    pub index: usize,
    pub block_x: usize,
    pub block_y: usize,
    /// The output column of the leftmost pixel.
    pub x: usize,
    /// The number of pixels in each row to copy to the output.
    pub copy_width: usize,
    /// The output row for the first decoded row of the block.
    /// Later rows of the block are placed above this row.
    pub first_row: usize,
    /// The number of rows to copy to the output.
    pub row_count: usize,
}

impl BlockGrid {
    pub fn new(width: u32, height: u32, block_width: usize, block_height: usize) -> Self {
        let width = width as usize;
        let height = height as usize;
        Self {
            width,
            height,
            block_width,
            block_height,
            blocks_x: width.div_ceil(block_width),
            blocks_y: height.div_ceil(block_height),
        }
    }

    /// The total number of blocks or `None` if the count would overflow.
    pub fn num_blocks(&self) -> Option<usize> {
        self.blocks_x.checked_mul(self.blocks_y)
    }

    /// The number of pixel columns in the last column of blocks.
    pub fn copy_length_last(&self) -> usize {
        (self.width + self.block_width - 1) % self.block_width + 1
    }

    /// Find the position of the block at (`block_x`, `block_y`).
    ///
    /// Block row 0 is at the bottom of the image.
    pub fn position(&self, block_x: usize, block_y: usize) -> BlockPosition {
        let copy_width = if block_x + 1 == self.blocks_x {
            self.copy_length_last()
        } else {
            self.block_width
        };

        let y = block_y * self.block_height;

        BlockPosition {
            index: block_y * self.blocks_x + block_x,
            block_x,
            block_y,
            x: block_x * self.block_width,
            copy_width,
            first_row: self.height - y - 1,
            row_count: self.block_height.min(self.height - y),
        }
    }

    /// Iterate over every block in row-major block order starting from the bottom left.
    pub fn blocks(self) -> impl Iterator<Item = BlockPosition> {
        (0..self.blocks_y)
            .flat_map(move |block_y| (0..self.blocks_x).map(move |block_x| (block_x, block_y)))
            .map(move |(block_x, block_y)| self.position(block_x, block_y))
    }
}

/// Call `visit` once for every block of a `width` x `height` surface
/// in the order the blocks are stored.
pub fn for_each_block<F>(width: u32, height: u32, block_width: usize, block_height: usize, visit: F)
where
    F: FnMut(BlockPosition),
{
    BlockGrid::new(width, height, block_width, block_height)
        .blocks()
        .for_each(visit);
}

/// Copy the in bounds pixels of a decoded tile to an RGBA8 surface with row 0 at the top.
pub fn put_rgba_tile<const W: usize, const H: usize>(
    surface: &mut [u8],
    tile: &[[[u8; 4]; W]; H],
    width: usize,
    position: &BlockPosition,
) {
    let elements_per_row = position.copy_width * CHANNELS;

    for (row, row_pixels) in tile.iter().enumerate().take(position.row_count) {
        let surface_index = ((position.first_row - row) * width + position.x) * CHANNELS;
        surface[surface_index..surface_index + elements_per_row]
            .copy_from_slice(&bytemuck::cast_slice(row_pixels.as_slice())[..elements_per_row]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_partial_blocks() {
        let grid = BlockGrid::new(5, 5, 4, 4);
        assert_eq!((2, 2), (grid.blocks_x, grid.blocks_y));
        assert_eq!(Some(4), grid.num_blocks());
        assert_eq!(1, grid.copy_length_last());
    }

    #[test]
    fn grid_exact_blocks() {
        let grid = BlockGrid::new(8, 4, 4, 4);
        assert_eq!((2, 1), (grid.blocks_x, grid.blocks_y));
        assert_eq!(4, grid.copy_length_last());
    }

    #[test]
    fn grid_pvrtc_2bpp() {
        let grid = BlockGrid::new(12, 3, 8, 4);
        assert_eq!((2, 1), (grid.blocks_x, grid.blocks_y));
        assert_eq!(4, grid.copy_length_last());
    }

    #[test]
    fn grid_single_pixel() {
        let grid = BlockGrid::new(1, 1, 4, 4);
        assert_eq!(
            vec![BlockPosition {
                index: 0,
                block_x: 0,
                block_y: 0,
                x: 0,
                copy_width: 1,
                first_row: 0,
                row_count: 1,
            }],
            grid.blocks().collect::<Vec<_>>()
        );
    }

    #[test]
    fn for_each_block_order() {
        let mut positions = Vec::new();
        for_each_block(5, 6, 4, 4, |p| positions.push(p));

        assert_eq!(
            vec![(0, 0, 0), (1, 1, 0), (2, 0, 1), (3, 1, 1)],
            positions
                .iter()
                .map(|p| (p.index, p.block_x, p.block_y))
                .collect::<Vec<_>>()
        );

        // The first block row covers the bottom of the image.
        assert_eq!((5, 4), (positions[0].first_row, positions[0].row_count));
        assert_eq!((1, 2), (positions[2].first_row, positions[2].row_count));
        assert_eq!((0, 4), (positions[0].x, positions[0].copy_width));
        assert_eq!((4, 1), (positions[1].x, positions[1].copy_width));
    }

    #[test]
    fn for_each_block_restartable() {
        let grid = BlockGrid::new(9, 9, 4, 4);
        assert_eq!(9, grid.blocks().count());
        assert_eq!(
            grid.blocks().collect::<Vec<_>>(),
            grid.blocks().collect::<Vec<_>>()
        );
    }

    #[test]
    fn put_rgba_tile_4x4_flipped() {
        let mut surface = vec![0u8; 4 * 4 * 4];
        let tile = [[[1u8; 4]; 4], [[2u8; 4]; 4], [[3u8; 4]; 4], [[4u8; 4]; 4]];
        let grid = BlockGrid::new(4, 4, 4, 4);
        put_rgba_tile(&mut surface, &tile, 4, &grid.position(0, 0));

        // The first decoded row is the bottom row.
        assert_eq!(
            [[4u8; 16], [3u8; 16], [2u8; 16], [1u8; 16]].concat(),
            surface
        );
    }

    #[test]
    fn put_rgba_tile_5x5() {
        // Test that edge blocks are clipped.
        let mut surface = vec![0u8; 5 * 5 * 4];
        let grid = BlockGrid::new(5, 5, 4, 4);

        for (i, position) in grid.blocks().enumerate() {
            let tile = [[[i as u8 + 1; 4]; 4]; 4];
            put_rgba_tile(&mut surface, &tile, 5, &position);
        }

        let row = |a: u8, b: u8| [vec![a; 16], vec![b; 4]].concat();
        assert_eq!(
            [row(3, 4), row(1, 2), row(1, 2), row(1, 2), row(1, 2)].concat(),
            surface
        );
    }

    #[test]
    fn put_rgba_tile_8x4() {
        let mut surface = vec![0u8; 10 * 2 * 4];
        let grid = BlockGrid::new(10, 2, 8, 4);

        for (i, position) in grid.blocks().enumerate() {
            let tile = [[[i as u8 + 1; 4]; 8]; 4];
            put_rgba_tile(&mut surface, &tile, 10, &position);
        }

        let row = [vec![1u8; 8 * 4], vec![2u8; 2 * 4]].concat();
        assert_eq!([row.clone(), row].concat(), surface);
    }
}
