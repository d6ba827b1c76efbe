use crate::{Tile4x4, Tile8x4, BLOCK_HEIGHT, BLOCK_WIDTH, PVRTC_2BPP_BLOCK_WIDTH};

// Bilinear weights for the left, center, and right texel by pixel position.
const INTERP_WEIGHT_4: [[u32; 3]; 4] = [[2, 2, 0], [1, 3, 0], [0, 4, 0], [0, 3, 1]];
const INTERP_WEIGHT_8: [[u32; 3]; 8] = [
    [4, 4, 0],
    [3, 5, 0],
    [2, 6, 0],
    [1, 7, 0],
    [0, 8, 0],
    [0, 7, 1],
    [0, 6, 2],
    [0, 5, 3],
];

const STANDARD_WEIGHTS: [u8; 4] = [0, 3, 5, 8];

/// One of the two low precision colors of a PVRTC block.
///
/// Color channels have 5 bits and alpha has 4 bits.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TexelColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl TexelColor {
    fn channels(&self) -> [u32; 4] {
        [self.r, self.g, self.b, self.a].map(u32::from)
    }
}

/// How a single pixel blends between the interpolated A and B colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modulation {
    /// Weight of B in eighths.
    Weight(u8),
    /// Half of each color with fully transparent alpha.
    PunchThrough,
    /// 2bpp only. The average of the pixels above and below.
    AverageVertical,
    /// 2bpp only. The average of the pixels to the left and right.
    AverageHorizontal,
    /// 2bpp only. The average of all four direct neighbors.
    AverageAll,
}

impl Modulation {
    fn weight(self) -> u32 {
        match self {
            Modulation::Weight(w) => w as u32,
            Modulation::PunchThrough => 4,
            // Only stored weights are referenced when resolving averages.
            Modulation::AverageVertical
            | Modulation::AverageHorizontal
            | Modulation::AverageAll => 0,
        }
    }
}

/// The decoded colors and modulation of a single 8 byte PVRTC block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TexelInfo {
    pub a: TexelColor,
    pub b: TexelColor,
    /// Modulation for each pixel in row-major order.
    /// 4bpp blocks only use the first 16 values.
    pub modulation: [Modulation; 32],
}

impl TexelInfo {
    /// Expands a PVRTC 4bpp block.
    pub fn pvrtc_4bpp(block: &[u8; 8]) -> Self {
        let (a, b) = texel_colors(block);
        let bits = modulation_bits(block);
        let punch_through = block[4] & 1 != 0;

        let modulation = core::array::from_fn(|i| {
            let value = if i < 16 { (bits >> (2 * i)) & 3 } else { 0 };
            match (punch_through, value) {
                (true, 0) => Modulation::Weight(0),
                (true, 1) => Modulation::Weight(4),
                (true, 2) => Modulation::PunchThrough,
                (true, _) => Modulation::Weight(8),
                (false, v) => Modulation::Weight(STANDARD_WEIGHTS[v as usize]),
            }
        });

        Self { a, b, modulation }
    }

    /// Expands a PVRTC 2bpp block.
    pub fn pvrtc_2bpp(block: &[u8; 8]) -> Self {
        let (a, b) = texel_colors(block);
        let mut bits = modulation_bits(block);

        if block[4] & 1 == 0 {
            // One bit per pixel.
            let modulation = core::array::from_fn(|i| {
                Modulation::Weight(if (bits >> i) & 1 != 0 { 8 } else { 0 })
            });
            return Self { a, b, modulation };
        }

        // Two bit weights are stored in a checkerboard pattern.
        // The remaining pixels are averaged from their neighbors.
        let fill = if block[0] & 1 == 0 {
            Modulation::AverageAll
        } else if block[2] & 0x10 != 0 {
            Modulation::AverageVertical
        } else {
            Modulation::AverageHorizontal
        };
        let mut modulation = [fill; 32];
        for y in 0..BLOCK_HEIGHT {
            for x in (y % 2..PVRTC_2BPP_BLOCK_WIDTH).step_by(2) {
                modulation[y * PVRTC_2BPP_BLOCK_WIDTH + x] =
                    Modulation::Weight(STANDARD_WEIGHTS[(bits & 3) as usize]);
                bits >>= 2;
            }
        }

        // These positions only use the high bit.
        let one_bit = |m: &mut Modulation| {
            if let Modulation::Weight(w) = m {
                *w = (*w + 3) & 8;
            }
        };
        one_bit(&mut modulation[0]);
        if block[0] & 1 != 0 {
            one_bit(&mut modulation[20]);
        }

        Self { a, b, modulation }
    }
}

/// Calculates the storage offset of the block at (`x`, `y`) in a grid of
/// `blocks_x` by `blocks_y` blocks stored in Morton (Z-order) order.
///
/// Only grids with power of two dimensions are guaranteed to produce offsets
/// less than `blocks_x * blocks_y`. Callers should check the returned offset.
pub fn morton_index(x: usize, y: usize, blocks_x: usize, blocks_y: usize) -> usize {
    let min_dim = blocks_x.min(blocks_y);

    let mut offset = 0;
    let mut shift: u32 = 0;
    let mut mask = 1;
    while mask < min_dim {
        offset |= ((y & mask) | ((x & mask) << 1)) << shift;
        mask <<= 1;
        shift += 1;
    }

    // The remaining bits of the larger dimension are not interleaved.
    let remaining = (x | y) >> shift;
    match remaining.checked_shl(shift * 2) {
        Some(high) if high >> (shift * 2) == remaining => offset | high,
        _ => usize::MAX,
    }
}

/// Decodes the 4x4 pixels of the center block of a 3x3 neighborhood of PVRTC 4bpp blocks.
///
/// The `neighbors` are in row-major order with the block to decode at index 4.
pub fn pvrtc_4bpp_tile(neighbors: [&TexelInfo; 9]) -> Tile4x4 {
    let center = neighbors[4];

    let scale = |c: [u32; 4]| {
        [
            (c[0] >> 1) + (c[0] >> 6),
            (c[1] >> 1) + (c[1] >> 6),
            (c[2] >> 1) + (c[2] >> 6),
            c[3] + (c[3] >> 4),
        ]
    };

    let mut decompressed = [[[0u8; 4]; BLOCK_WIDTH]; BLOCK_HEIGHT];
    for (y, row) in decompressed.iter_mut().enumerate() {
        for (x, pixel) in row.iter_mut().enumerate() {
            let (a, b) = interpolate(&neighbors, &INTERP_WEIGHT_4[x], &INTERP_WEIGHT_4[y]);

            let modulation = center.modulation[y * BLOCK_WIDTH + x];
            *pixel = modulate(
                scale(a),
                scale(b),
                modulation.weight(),
                modulation == Modulation::PunchThrough,
            );
        }
    }
    decompressed
}

/// Decodes the 8x4 pixels of the center block of a 3x3 neighborhood of PVRTC 2bpp blocks.
///
/// The `neighbors` are in row-major order with the block to decode at index 4.
pub fn pvrtc_2bpp_tile(neighbors: [&TexelInfo; 9]) -> Tile8x4 {
    let scale = |c: [u32; 4]| {
        [
            (c[0] >> 2) + (c[0] >> 7),
            (c[1] >> 2) + (c[1] >> 7),
            (c[2] >> 2) + (c[2] >> 7),
            (c[3] >> 1) + (c[3] >> 5),
        ]
    };

    let mut decompressed = [[[0u8; 4]; PVRTC_2BPP_BLOCK_WIDTH]; BLOCK_HEIGHT];
    for (y, row) in decompressed.iter_mut().enumerate() {
        for (x, pixel) in row.iter_mut().enumerate() {
            let (a, b) = interpolate(&neighbors, &INTERP_WEIGHT_8[x], &INTERP_WEIGHT_4[y]);

            // 2bpp has no punch through mode.
            *pixel = modulate(scale(a), scale(b), weight_2bpp(&neighbors, x, y), false);
        }
    }
    decompressed
}

fn texel_colors(block: &[u8; 8]) -> (TexelColor, TexelColor) {
    let ca = u16::from_le_bytes([block[4], block[5]]);
    let cb = u16::from_le_bytes([block[6], block[7]]);

    // The low bit of each color is used for other purposes.
    // Color A has one less bit of blue and color B has one less bit of alpha.
    let a = if ca & 0x8000 != 0 {
        TexelColor {
            r: (ca >> 10 & 0x1F) as u8,
            g: (ca >> 5 & 0x1F) as u8,
            b: ((ca & 0x1E) | (ca >> 4 & 1)) as u8,
            a: 0xF,
        }
    } else {
        TexelColor {
            r: ((ca >> 7 & 0x1E) | (ca >> 11 & 1)) as u8,
            g: ((ca >> 3 & 0x1E) | (ca >> 7 & 1)) as u8,
            b: ((ca << 1 & 0x1C) | (ca >> 2 & 3)) as u8,
            a: (ca >> 11 & 0xE) as u8,
        }
    };

    let b = if cb & 0x8000 != 0 {
        TexelColor {
            r: (cb >> 10 & 0x1F) as u8,
            g: (cb >> 5 & 0x1F) as u8,
            b: (cb & 0x1F) as u8,
            a: 0xF,
        }
    } else {
        TexelColor {
            r: ((cb >> 7 & 0x1E) | (cb >> 11 & 1)) as u8,
            g: ((cb >> 3 & 0x1E) | (cb >> 7 & 1)) as u8,
            b: ((cb << 1 & 0x1E) | (cb >> 3 & 1)) as u8,
            a: (cb >> 11 & 0xE) as u8,
        }
    };

    (a, b)
}

fn modulation_bits(block: &[u8; 8]) -> u32 {
    u32::from_le_bytes([block[0], block[1], block[2], block[3]])
}

// Weighted sums of the A and B colors of the neighborhood.
fn interpolate(
    neighbors: &[&TexelInfo; 9],
    weights_x: &[u32; 3],
    weights_y: &[u32; 3],
) -> ([u32; 4], [u32; 4]) {
    let mut a = [0u32; 4];
    let mut b = [0u32; 4];
    for (i, info) in neighbors.iter().enumerate() {
        let weight = weights_x[i % 3] * weights_y[i / 3];
        for (sum, c) in a.iter_mut().zip(info.a.channels()) {
            *sum += c * weight;
        }
        for (sum, c) in b.iter_mut().zip(info.b.channels()) {
            *sum += c * weight;
        }
    }
    (a, b)
}

fn modulate(a: [u32; 4], b: [u32; 4], weight: u32, punch_through: bool) -> [u8; 4] {
    let blend = |c: usize| ((a[c] * (8 - weight) + b[c] * weight) / 8) as u8;
    [
        blend(0),
        blend(1),
        blend(2),
        if punch_through { 0 } else { blend(3) },
    ]
}

// Resolves averaged weights using the stored weights of the neighboring pixels.
// The checkerboard pattern guarantees that the direct neighbors are stored.
fn weight_2bpp(neighbors: &[&TexelInfo; 9], x: usize, y: usize) -> u32 {
    const W: usize = PVRTC_2BPP_BLOCK_WIDTH;
    let at = |block: usize, x: usize, y: usize| neighbors[block].modulation[y * W + x].weight();

    let vertical = || {
        let above = if y == 0 { at(1, x, 3) } else { at(4, x, y - 1) };
        let below = if y == 3 { at(7, x, 0) } else { at(4, x, y + 1) };
        above + below
    };
    let horizontal = || {
        let left = if x == 0 { at(3, W - 1, y) } else { at(4, x - 1, y) };
        let right = if x == W - 1 { at(5, 0, y) } else { at(4, x + 1, y) };
        left + right
    };

    match neighbors[4].modulation[y * W + x] {
        Modulation::AverageVertical => (vertical() + 1) / 2,
        Modulation::AverageHorizontal => (horizontal() + 1) / 2,
        Modulation::AverageAll => (vertical() + horizontal() + 2) / 4,
        m => m.weight(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_4bpp(block: &[u8; 8]) -> Tile4x4 {
        let info = TexelInfo::pvrtc_4bpp(block);
        pvrtc_4bpp_tile([&info; 9])
    }

    fn uniform_2bpp(block: &[u8; 8]) -> Tile8x4 {
        let info = TexelInfo::pvrtc_2bpp(block);
        pvrtc_2bpp_tile([&info; 9])
    }

    #[test]
    fn texel_colors_opaque() {
        // Red 31 for A and blue 31 for B.
        let (a, b) = texel_colors(&[0, 0, 0, 0, 0x00, 0xFC, 0x1F, 0x80]);
        assert_eq!(TexelColor { r: 31, g: 0, b: 0, a: 15 }, a);
        assert_eq!(TexelColor { r: 0, g: 0, b: 31, a: 15 }, b);
    }

    #[test]
    fn texel_colors_translucent() {
        // 3 bits of alpha and 4 bits per color channel.
        let (a, b) = texel_colors(&[0, 0, 0, 0, 0xFE, 0x7F, 0xFF, 0x7F]);
        assert_eq!(TexelColor { r: 31, g: 31, b: 31, a: 14 }, a);
        assert_eq!(TexelColor { r: 31, g: 31, b: 31, a: 14 }, b);
    }

    #[test]
    fn modulation_4bpp_standard() {
        let info = TexelInfo::pvrtc_4bpp(&[0xE4, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(
            [
                Modulation::Weight(0),
                Modulation::Weight(3),
                Modulation::Weight(5),
                Modulation::Weight(8)
            ],
            info.modulation[..4]
        );
    }

    #[test]
    fn modulation_4bpp_punch_through() {
        let info = TexelInfo::pvrtc_4bpp(&[0xE4, 0, 0, 0, 1, 0, 0, 0]);
        assert_eq!(
            [
                Modulation::Weight(0),
                Modulation::Weight(4),
                Modulation::PunchThrough,
                Modulation::Weight(8)
            ],
            info.modulation[..4]
        );
    }

    #[test]
    fn modulation_2bpp_checkerboard() {
        let info = TexelInfo::pvrtc_2bpp(&[0x55, 0x55, 0x55, 0x55, 0x01, 0x00, 0xFF, 0xFF]);

        // Stored positions alternate starting at even x on even rows.
        assert_eq!(Modulation::Weight(0), info.modulation[0]);
        assert_eq!(Modulation::AverageVertical, info.modulation[1]);
        assert_eq!(Modulation::Weight(3), info.modulation[2]);
        assert_eq!(Modulation::AverageVertical, info.modulation[8]);
        assert_eq!(Modulation::Weight(3), info.modulation[9]);
        assert_eq!(Modulation::Weight(0), info.modulation[20]);
    }

    #[test]
    fn modulation_2bpp_fill_modes() {
        let info = TexelInfo::pvrtc_2bpp(&[0x00, 0, 0, 0, 0x01, 0, 0, 0]);
        assert_eq!(Modulation::AverageAll, info.modulation[1]);

        let info = TexelInfo::pvrtc_2bpp(&[0x01, 0, 0, 0, 0x01, 0, 0, 0]);
        assert_eq!(Modulation::AverageHorizontal, info.modulation[1]);
    }

    #[test]
    fn morton_index_square() {
        assert_eq!(0, morton_index(0, 0, 2, 2));
        assert_eq!(1, morton_index(0, 1, 2, 2));
        assert_eq!(2, morton_index(1, 0, 2, 2));
        assert_eq!(3, morton_index(1, 1, 2, 2));
        assert_eq!(12, morton_index(2, 2, 4, 4));
    }

    #[test]
    fn morton_index_power_of_two_is_bijective() {
        for (w, h) in [(1, 1), (2, 2), (4, 2), (2, 8), (8, 8), (16, 4)] {
            let mut seen = [false; 128];
            for y in 0..h {
                for x in 0..w {
                    let i = morton_index(x, y, w, h);
                    assert!(i < w * h);
                    assert!(!seen[i]);
                    seen[i] = true;
                }
            }
        }
    }

    #[test]
    fn morton_index_rectangle() {
        assert_eq!(4, morton_index(2, 0, 4, 2));
        assert_eq!(7, morton_index(3, 1, 4, 2));
    }

    #[test]
    fn morton_index_non_power_of_two_out_of_range() {
        assert!(morton_index(2, 2, 3, 3) >= 9);
    }

    #[test]
    fn pvrtc_4bpp_uniform_color_a() {
        // Weight 0 everywhere selects the fully expanded A color.
        let block = [0, 0, 0, 0, 0x00, 0xFC, 0x1F, 0x80];
        assert_eq!([[[255, 0, 0, 255]; 4]; 4], uniform_4bpp(&block));
    }

    #[test]
    fn pvrtc_4bpp_uniform_color_b() {
        let block = [0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0xFC, 0x1F, 0x80];
        assert_eq!([[[0, 0, 255, 255]; 4]; 4], uniform_4bpp(&block));
    }

    #[test]
    fn pvrtc_4bpp_punch_through() {
        let block = [0xAA, 0xAA, 0xAA, 0xAA, 0x01, 0xFC, 0x1F, 0x80];
        assert_eq!([[[127, 0, 127, 0]; 4]; 4], uniform_4bpp(&block));
    }

    #[test]
    fn pvrtc_4bpp_interpolates_neighbors() {
        let black = TexelInfo::pvrtc_4bpp(&[0, 0, 0, 0, 0x00, 0x80, 0x00, 0x80]);
        let white = TexelInfo::pvrtc_4bpp(&[0, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF]);

        // A white block to the right only affects the right half of the tile.
        let mut neighbors = [&black; 9];
        neighbors[5] = &white;
        let decompressed = pvrtc_4bpp_tile(neighbors);
        assert_eq!([0, 0, 0, 255], decompressed[0][0]);
        assert_eq!([0, 0, 0, 255], decompressed[0][2]);
        assert_eq!([31, 31, 31, 255], decompressed[0][3]);
    }

    #[test]
    fn pvrtc_2bpp_uniform_one_bit() {
        let block = [0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0xFF, 0xFF];
        assert_eq!([[[255u8; 4]; 8]; 4], uniform_2bpp(&block));
    }

    #[test]
    fn pvrtc_2bpp_averaged_weights() {
        let block = [0x55, 0x55, 0x55, 0x55, 0x01, 0x00, 0xFF, 0xFF];
        let decompressed = uniform_2bpp(&block);

        // Weights 0, 2, and 3 blend transparent black and opaque white.
        let weights = [
            [0, 3, 3, 3, 3, 3, 3, 3],
            [2, 3, 3, 3, 2, 3, 3, 3],
            [3, 3, 3, 3, 0, 3, 3, 3],
            [2, 3, 3, 3, 2, 3, 3, 3],
        ];
        for y in 0..4 {
            for x in 0..8 {
                let value = (255 * weights[y][x] / 8) as u8;
                assert_eq!([value; 4], decompressed[y][x], "({x}, {y})");
            }
        }
    }
}
