use crate::{clamp_u8, Tile4x4, BLOCK_HEIGHT, BLOCK_WIDTH};

type Rgb = [u8; 3];

// Pixel indices are stored column by column.
// Maps the bit position of a pixel to its row-major index.
const WRITE_ORDER: [usize; 16] = [0, 4, 8, 12, 1, 5, 9, 13, 2, 6, 10, 14, 3, 7, 11, 15];

// The 48 alpha index bits are read starting from the last pixel.
const WRITE_ORDER_ALPHA: [usize; 16] = [15, 11, 7, 3, 14, 10, 6, 2, 13, 9, 5, 1, 12, 8, 4, 0];

// Subblock for each pixel bit position for the flip bit unset and set.
const SUBBLOCK_TABLE: [[usize; 16]; 2] = [
    [0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1],
    [0, 0, 1, 1, 0, 0, 1, 1, 0, 0, 1, 1, 0, 0, 1, 1],
];

// Small and large intensity modifiers for each 3-bit table codeword.
const MODIFIER_TABLE: [[i32; 2]; 8] = [
    [2, 8],
    [5, 17],
    [9, 29],
    [13, 42],
    [18, 60],
    [24, 80],
    [33, 106],
    [47, 183],
];

const DISTANCE_TABLE: [i32; 8] = [3, 6, 11, 16, 23, 32, 41, 64];

const ALPHA_MODIFIER_TABLE: [[i32; 8]; 16] = [
    [-3, -6, -9, -15, 2, 5, 8, 14],
    [-3, -7, -10, -13, 2, 6, 9, 12],
    [-2, -5, -8, -13, 1, 4, 7, 12],
    [-2, -4, -6, -13, 1, 3, 5, 12],
    [-3, -6, -8, -12, 2, 5, 7, 11],
    [-3, -7, -9, -11, 2, 6, 8, 10],
    [-4, -7, -8, -11, 3, 6, 7, 10],
    [-3, -5, -8, -11, 2, 4, 7, 10],
    [-2, -6, -8, -10, 1, 5, 7, 9],
    [-2, -5, -8, -10, 1, 4, 7, 9],
    [-2, -4, -8, -10, 1, 3, 7, 9],
    [-2, -5, -7, -10, 1, 4, 6, 9],
    [-3, -4, -7, -10, 2, 3, 6, 9],
    [-1, -2, -3, -10, 0, 1, 2, 9],
    [-4, -6, -8, -9, 3, 5, 7, 8],
    [-3, -5, -7, -9, 2, 4, 6, 8],
];

/// Decodes an 8 byte ETC1 block.
pub fn etc1(compressed_block: &[u8; 8]) -> Tile4x4 {
    ColorMode::etc1(compressed_block).decode(compressed_block)
}

/// Decodes an 8 byte ETC2 RGB block.
pub fn etc2(compressed_block: &[u8; 8]) -> Tile4x4 {
    ColorMode::etc2(compressed_block).decode(compressed_block)
}

/// Decodes a 9 byte block of a single alpha byte followed by an ETC2 RGB block.
///
/// The alpha byte is applied to all 16 pixels.
pub fn etc2_alpha1(compressed_block: &[u8; 9]) -> Tile4x4 {
    let color: [u8; 8] = core::array::from_fn(|i| compressed_block[1 + i]);

    let mut decompressed = etc2(&color);
    for row in decompressed.iter_mut() {
        for pixel in row.iter_mut() {
            pixel[3] = compressed_block[0];
        }
    }
    decompressed
}

/// Decodes a 16 byte block of an 8-bit alpha block followed by an ETC2 RGB block.
pub fn etc2_alpha8(compressed_block: &[u8; 16]) -> Tile4x4 {
    let alpha: [u8; 8] = core::array::from_fn(|i| compressed_block[i]);
    let color: [u8; 8] = core::array::from_fn(|i| compressed_block[8 + i]);

    let mut decompressed = etc2(&color);
    alpha_block(&alpha, &mut decompressed);
    decompressed
}

/// The color encoding of a block.
/// ETC1 only uses the first two modes.
#[derive(Debug, PartialEq)]
enum ColorMode {
    Individual([Rgb; 2]),
    Differential([Rgb; 2]),
    T { colors: [Rgb; 2], distance: i32 },
    H { colors: [Rgb; 2], distance: i32 },
    Planar { origin: Rgb, horizontal: Rgb, vertical: Rgb },
}

impl ColorMode {
    fn etc1(block: &[u8; 8]) -> Self {
        if block[3] & 2 == 0 {
            Self::Individual(individual_colors(block))
        } else {
            // Overflow wraps since ETC1 has no additional modes.
            let base = [block[0] & 0xF8, block[1] & 0xF8, block[2] & 0xF8];
            let delta = [delta(block[0]), delta(block[1]), delta(block[2])];
            Self::Differential(differential_colors(base, delta))
        }
    }

    fn etc2(block: &[u8; 8]) -> Self {
        if block[3] & 2 == 0 {
            return Self::Individual(individual_colors(block));
        }

        let base = [block[0] & 0xF8, block[1] & 0xF8, block[2] & 0xF8];
        let delta = [delta(block[0]), delta(block[1]), delta(block[2])];
        let overflows = |c: usize| !(0..=255).contains(&(base[c] as i32 + delta[c]));

        let d = block.map(u32::from);
        if overflows(0) {
            let colors = [
                rgb(
                    ((d[0] << 3) & 0xC0) | ((d[0] << 4) & 0x30) | ((d[0] >> 1) & 0x0C) | (d[0] & 0x03),
                    (d[1] & 0xF0) | (d[1] >> 4),
                    (d[1] & 0x0F) | (d[1] << 4),
                ),
                rgb(
                    (d[2] & 0xF0) | (d[2] >> 4),
                    (d[2] & 0x0F) | (d[2] << 4),
                    (d[3] & 0xF0) | (d[3] >> 4),
                ),
            ];
            let distance = DISTANCE_TABLE[(((d[3] >> 1) & 6) | (d[3] & 1)) as usize];
            Self::T { colors, distance }
        } else if overflows(1) {
            let g0 = ((d[0] << 5) & 0xE0) | (d[1] & 0x10);
            let b0 = (d[1] & 0x08) | ((d[1] << 1) & 0x06) | (d[2] >> 7);
            let g1 = ((d[2] << 5) & 0xE0) | ((d[3] >> 3) & 0x10);
            let colors = [
                rgb(
                    ((d[0] << 1) & 0xF0) | ((d[0] >> 3) & 0x0F),
                    g0 | (g0 >> 4),
                    b0 | (b0 << 4),
                ),
                rgb(
                    ((d[2] << 1) & 0xF0) | ((d[2] >> 3) & 0x0F),
                    g1 | (g1 >> 4),
                    ((d[3] << 1) & 0xF0) | ((d[3] >> 3) & 0x0F),
                ),
            ];
            // The lowest distance bit is implied by the order of the two colors.
            let mut index = (d[3] & 4) | ((d[3] << 1) & 2);
            if colors[0] >= colors[1] {
                index += 1;
            }
            Self::H {
                colors,
                distance: DISTANCE_TABLE[index as usize],
            }
        } else if overflows(2) {
            let bo = ((d[1] << 7) & 0x80) | ((d[2] << 2) & 0x60) | ((d[2] << 3) & 0x18) | ((d[3] >> 5) & 0x04);
            let bh = ((d[4] << 7) & 0x80) | ((d[5] >> 1) & 0x7C);
            Self::Planar {
                origin: rgb(
                    ((d[0] << 1) & 0xFC) | ((d[0] >> 5) & 0x03),
                    ((d[0] << 7) & 0x80) | (d[1] & 0x7E) | (d[0] & 0x01),
                    bo | (bo >> 6),
                ),
                horizontal: rgb(
                    ((d[3] << 1) & 0xF8) | ((d[3] << 2) & 0x04) | ((d[3] >> 5) & 0x03),
                    (d[4] & 0xFE) | (d[4] >> 7),
                    bh | (bh >> 6),
                ),
                vertical: rgb(
                    ((d[5] << 5) & 0xE0) | ((d[6] >> 3) & 0x1C) | ((d[5] >> 1) & 0x03),
                    ((d[6] << 3) & 0xF8) | ((d[7] >> 5) & 0x06) | ((d[6] >> 4) & 0x01),
                    (d[7] << 2) | ((d[7] >> 4) & 0x03),
                ),
            }
        } else {
            Self::Differential(differential_colors(base, delta))
        }
    }

    fn decode(&self, block: &[u8; 8]) -> Tile4x4 {
        match self {
            Self::Individual(colors) | Self::Differential(colors) => subblocks(block, colors),
            Self::T { colors, distance } => paint(
                block,
                [
                    modulate(colors[0], 0),
                    modulate(colors[1], *distance),
                    modulate(colors[1], 0),
                    modulate(colors[1], -distance),
                ],
            ),
            Self::H { colors, distance } => paint(
                block,
                [
                    modulate(colors[0], *distance),
                    modulate(colors[0], -distance),
                    modulate(colors[1], *distance),
                    modulate(colors[1], -distance),
                ],
            ),
            Self::Planar {
                origin,
                horizontal,
                vertical,
            } => planar(origin, horizontal, vertical),
        }
    }
}

fn rgb(r: u32, g: u32, b: u32) -> Rgb {
    // Truncation drops the bits shifted past the top of the byte.
    [r as u8, g as u8, b as u8]
}

// The signed 3-bit delta in the low bits scaled to the 5-bit base.
fn delta(value: u8) -> i32 {
    let shifted = i32::from(value) << 3;
    (shifted & 0x18) - (shifted & 0x20)
}

fn individual_colors(block: &[u8; 8]) -> [Rgb; 2] {
    let high = |b: u8| (b & 0xF0) | (b >> 4);
    let low = |b: u8| (b & 0x0F) | (b << 4);
    [
        [high(block[0]), high(block[1]), high(block[2])],
        [low(block[0]), low(block[1]), low(block[2])],
    ]
}

fn differential_colors(base: Rgb, delta: [i32; 3]) -> [Rgb; 2] {
    let expand = |c: u8| c | (c >> 5);
    let offset: Rgb = core::array::from_fn(|i| (base[i] as i32 + delta[i]) as u8);
    [base.map(expand), offset.map(expand)]
}

fn modulate(color: Rgb, modifier: i32) -> [u8; 4] {
    [
        clamp_u8(color[0] as i32 + modifier),
        clamp_u8(color[1] as i32 + modifier),
        clamp_u8(color[2] as i32 + modifier),
        255u8,
    ]
}

// The least and most significant bits of the 2-bit pixel indices.
fn pixel_index_bits(block: &[u8; 8]) -> (u16, u16) {
    (
        u16::from_be_bytes([block[6], block[7]]),
        u16::from_be_bytes([block[4], block[5]]),
    )
}

fn subblocks(block: &[u8; 8], colors: &[Rgb; 2]) -> Tile4x4 {
    let codes = [(block[3] >> 5) as usize, ((block[3] >> 2) & 7) as usize];
    let table = &SUBBLOCK_TABLE[(block[3] & 1) as usize];
    let (mut lsb, mut msb) = pixel_index_bits(block);

    let mut decompressed = [[[0u8; 4]; BLOCK_WIDTH]; BLOCK_HEIGHT];
    for (i, subblock) in table.iter().copied().enumerate() {
        let modifier = MODIFIER_TABLE[codes[subblock]][(lsb & 1) as usize];
        let modifier = if msb & 1 != 0 { -modifier } else { modifier };

        let index = WRITE_ORDER[i];
        decompressed[index / BLOCK_WIDTH][index % BLOCK_WIDTH] = modulate(colors[subblock], modifier);

        lsb >>= 1;
        msb >>= 1;
    }
    decompressed
}

fn paint(block: &[u8; 8], palette: [[u8; 4]; 4]) -> Tile4x4 {
    let (mut lsb, mut msb) = pixel_index_bits(block);

    let mut decompressed = [[[0u8; 4]; BLOCK_WIDTH]; BLOCK_HEIGHT];
    for index in WRITE_ORDER {
        let selector = ((msb << 1) & 2) | (lsb & 1);
        decompressed[index / BLOCK_WIDTH][index % BLOCK_WIDTH] = palette[selector as usize];

        lsb >>= 1;
        msb >>= 1;
    }
    decompressed
}

fn planar(origin: &Rgb, horizontal: &Rgb, vertical: &Rgb) -> Tile4x4 {
    let mut decompressed = [[[0u8; 4]; BLOCK_WIDTH]; BLOCK_HEIGHT];
    for (y, row) in decompressed.iter_mut().enumerate() {
        for (x, pixel) in row.iter_mut().enumerate() {
            let channel = |c: usize| {
                let o = origin[c] as i32;
                let h = horizontal[c] as i32;
                let v = vertical[c] as i32;
                clamp_u8((x as i32 * (h - o) + y as i32 * (v - o) + 4 * o + 2) >> 2)
            };
            *pixel = [channel(0), channel(1), channel(2), 255u8];
        }
    }
    decompressed
}

fn alpha_block(compressed_block: &[u8; 8], decompressed_block: &mut Tile4x4) {
    let base = compressed_block[0];
    let multiplier = (compressed_block[1] >> 4) as i32;

    if multiplier == 0 {
        for row in decompressed_block.iter_mut() {
            for pixel in row.iter_mut() {
                pixel[3] = base;
            }
        }
        return;
    }

    let table = &ALPHA_MODIFIER_TABLE[(compressed_block[1] & 0x0F) as usize];
    let mut indices = u64::from_be_bytes([
        0,
        0,
        compressed_block[2],
        compressed_block[3],
        compressed_block[4],
        compressed_block[5],
        compressed_block[6],
        compressed_block[7],
    ]);
    for index in WRITE_ORDER_ALPHA {
        let alpha = base as i32 + multiplier * table[(indices & 7) as usize];
        decompressed_block[index / BLOCK_WIDTH][index % BLOCK_WIDTH][3] = clamp_u8(alpha);
        indices >>= 3;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn etc1_individual_zero_indices() {
        // Index zero selects the smallest positive modifier of table 0.
        let block = [0xF0, 0x80, 0x0F, 0x00, 0x00, 0x00, 0x00, 0x00];
        let decompressed = etc1(&block);

        let left = [255, 138, 2, 255];
        let right = [2, 2, 255, 255];
        for y in 0..4 {
            assert_eq!([left, left, right, right], decompressed[y]);
        }
    }

    #[test]
    fn etc1_individual_saturated_base() {
        // Saturated channels are unchanged by the clamped modifier.
        let block = [0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0x00];
        assert_eq!([[[255u8; 4]; 4]; 4], etc1(&block));
    }

    #[test]
    fn etc1_individual_flipped() {
        // The flip bit splits the block into top and bottom halves.
        let block = [0xF0, 0xF0, 0xF0, 0x01, 0x00, 0x00, 0x00, 0x00];
        let decompressed = etc1(&block);

        assert_eq!([[255u8; 4]; 4], decompressed[0]);
        assert_eq!([[255u8; 4]; 4], decompressed[1]);
        assert_eq!([[2, 2, 2, 255]; 4], decompressed[2]);
        assert_eq!([[2, 2, 2, 255]; 4], decompressed[3]);
    }

    #[test]
    fn etc1_differential() {
        // A delta of +1 on red only.
        let block = [0x81, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00];
        let decompressed = etc1(&block);

        assert_eq!([0x86, 2, 2, 255], decompressed[0][0]);
        assert_eq!([0x8E, 2, 2, 255], decompressed[0][3]);
    }

    #[test]
    fn etc1_differential_overflow_wraps() {
        // ETC2 would decode this block in T mode.
        let block = [0xFB, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00];
        let decompressed = etc1(&block);

        assert_eq!([255, 2, 2, 255], decompressed[1][1]);
        assert_eq!([18, 2, 2, 255], decompressed[1][2]);
    }

    #[test]
    fn etc1_negative_modifiers() {
        // Both index bits set selects the negated large modifier.
        let block = [0x88, 0x88, 0x88, 0x00, 0xFF, 0xFF, 0xFF, 0xFF];
        assert_eq!([[[128, 128, 128, 255]; 4]; 4], etc1(&block));
    }

    #[test]
    fn etc2_mode_selection() {
        assert!(matches!(
            ColorMode::etc2(&[0x00, 0x00, 0x00, 0x00, 0, 0, 0, 0]),
            ColorMode::Individual(_)
        ));
        assert!(matches!(
            ColorMode::etc2(&[0x81, 0x00, 0x00, 0x02, 0, 0, 0, 0]),
            ColorMode::Differential(_)
        ));
        assert!(matches!(
            ColorMode::etc2(&[0xFB, 0x00, 0x00, 0x02, 0, 0, 0, 0]),
            ColorMode::T { .. }
        ));
        assert!(matches!(
            ColorMode::etc2(&[0x00, 0x04, 0x00, 0x02, 0, 0, 0, 0]),
            ColorMode::H { .. }
        ));
        assert!(matches!(
            ColorMode::etc2(&[0x00, 0x00, 0x04, 0x02, 0, 0, 0, 0]),
            ColorMode::Planar { .. }
        ));
    }

    #[test]
    fn etc2_t_mode() {
        let block = [0xFB, 0x00, 0x12, 0x37, 0x00, 0x00, 0xFF, 0xFF];
        assert_eq!(
            ColorMode::T {
                colors: [[255, 0, 0], [0x11, 0x22, 0x33]],
                distance: 16
            },
            ColorMode::etc2(&block)
        );

        // Index 1 selects the second color plus the distance.
        assert_eq!([[[0x21, 0x32, 0x43, 255]; 4]; 4], etc2(&block));

        // Index 2 selects the unmodified second color.
        let block = [0xFB, 0x00, 0x12, 0x37, 0xFF, 0xFF, 0x00, 0x00];
        assert_eq!([[[0x11, 0x22, 0x33, 255]; 4]; 4], etc2(&block));
    }

    #[test]
    fn etc2_h_mode_distance_tie_break() {
        // Equal colors increment the distance index.
        let block = [0x00, 0x04, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00];
        assert_eq!([[[6, 6, 6, 255]; 4]; 4], etc2(&block));
    }

    #[test]
    fn etc2_h_mode_ordered_colors() {
        let block = [0x00, 0x04, 0x08, 0x02, 0x00, 0x00, 0x00, 0x00];
        assert_eq!(
            ColorMode::H {
                colors: [[0, 0, 0], [0x11, 0, 0]],
                distance: 3
            },
            ColorMode::etc2(&block)
        );
        assert_eq!([[[3, 3, 3, 255]; 4]; 4], etc2(&block));

        let block = [0x00, 0x04, 0x08, 0x02, 0xFF, 0xFF, 0x00, 0x00];
        assert_eq!([[[20, 3, 3, 255]; 4]; 4], etc2(&block));
    }

    #[test]
    fn etc2_planar_vertical_gradient() {
        let block = [0x00, 0x00, 0x04, 0x02, 0x00, 0x00, 0x00, 0x3F];
        let decompressed = etc2(&block);

        for (y, blue) in [0, 64, 128, 191].into_iter().enumerate() {
            assert_eq!([[0, 0, blue, 255]; 4], decompressed[y]);
        }
    }

    #[test]
    fn etc2_alpha8_modifiers() {
        let mut block = [0u8; 16];
        block[0] = 100;
        block[1] = 0x10;
        let decompressed = etc2_alpha8(&block);
        assert!(decompressed.iter().flatten().all(|p| p[3] == 97));

        // Index 7 in every position with the largest multiplier clamps.
        block[0] = 250;
        block[1] = 0xF0;
        block[2..8].copy_from_slice(&[0xFF; 6]);
        let decompressed = etc2_alpha8(&block);
        assert!(decompressed.iter().flatten().all(|p| p[3] == 255));
    }

    #[test]
    fn etc2_alpha8_zero_multiplier() {
        let mut block = [0u8; 16];
        block[0] = 42;
        block[1] = 0x0F;
        block[2..8].copy_from_slice(&[0xAB; 6]);
        let decompressed = etc2_alpha8(&block);
        assert!(decompressed.iter().flatten().all(|p| p[3] == 42));
    }

    #[test]
    fn etc2_alpha8_pixel_order() {
        // Only the lowest index bits map to the last pixel.
        let mut block = [0u8; 16];
        block[0] = 100;
        block[1] = 0x10;
        block[7] = 0x07;
        let decompressed = etc2_alpha8(&block);
        assert_eq!(114, decompressed[3][3][3]);
        assert_eq!(97, decompressed[0][0][3]);
        assert_eq!(97, decompressed[3][2][3]);
    }

    #[test]
    fn etc2_alpha1_uniform() {
        let block = [0x80, 0xF0, 0x80, 0x0F, 0x00, 0x00, 0x00, 0x00, 0x00];
        let decompressed = etc2_alpha1(&block);

        assert!(decompressed.iter().flatten().all(|p| p[3] == 0x80));
        assert_eq!([255, 138, 2], decompressed[0][0][..3]);
    }
}
