use crate::{Tile4x4, BLOCK_HEIGHT, BLOCK_WIDTH};

/// Decodes an 8 byte DXT1 (BC1) block.
///
/// Every pixel is opaque.
/// Index 3 of the three color mode is opaque black rather than transparent.
pub fn dxt1(compressed_block: &[u8; 8]) -> Tile4x4 {
    let mut decompressed = [[[0u8; 4]; BLOCK_WIDTH]; BLOCK_HEIGHT];
    color_block(compressed_block, &mut decompressed);
    decompressed
}

/// Decodes a 16 byte DXT5 (BC3) block.
///
/// The first 8 bytes are the alpha block and the last 8 bytes are a DXT1 color block.
pub fn dxt5(compressed_block: &[u8; 16]) -> Tile4x4 {
    let alpha: [u8; 8] = core::array::from_fn(|i| compressed_block[i]);
    let color: [u8; 8] = core::array::from_fn(|i| compressed_block[8 + i]);

    let mut decompressed = [[[0u8; 4]; BLOCK_WIDTH]; BLOCK_HEIGHT];
    color_block(&color, &mut decompressed);
    smooth_alpha_block(&alpha, &mut decompressed);
    decompressed
}

/// Expands a 5:6:5 packed color to RGB8 using bit replication.
pub fn rgb565_to_rgb8(color: u16) -> [u8; 3] {
    let r = ((color >> 11) & 0x1F) as u8;
    let g = ((color >> 5) & 0x3F) as u8;
    let b = (color & 0x1F) as u8;
    [(r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2)]
}

fn color_block(compressed_block: &[u8; 8], decompressed_block: &mut Tile4x4) {
    let c0 = u16::from_le_bytes([compressed_block[0], compressed_block[1]]);
    let c1 = u16::from_le_bytes([compressed_block[2], compressed_block[3]]);

    let [r0, g0, b0] = rgb565_to_rgb8(c0).map(u32::from);
    let [r1, g1, b1] = rgb565_to_rgb8(c1).map(u32::from);

    let mut ref_colors = [[0u8; 4]; 4];
    ref_colors[0] = [r0 as u8, g0 as u8, b0 as u8, 255u8];
    ref_colors[1] = [r1 as u8, g1 as u8, b1 as u8, 255u8];

    if c0 > c1 {
        // Four color mode.
        // color_2 = 2/3*color_0 + 1/3*color_1
        // color_3 = 1/3*color_0 + 2/3*color_1
        let r = (2 * r0 + r1) / 3;
        let g = (2 * g0 + g1) / 3;
        let b = (2 * b0 + b1) / 3;
        ref_colors[2] = [r as u8, g as u8, b as u8, 255u8];

        let r = (r0 + 2 * r1) / 3;
        let g = (g0 + 2 * g1) / 3;
        let b = (b0 + 2 * b1) / 3;
        ref_colors[3] = [r as u8, g as u8, b as u8, 255u8];
    } else {
        // Three color mode.
        // color_2 = 1/2*color_0 + 1/2*color_1
        // color_3 = black
        let r = (r0 + r1) / 2;
        let g = (g0 + g1) / 2;
        let b = (b0 + b1) / 2;
        ref_colors[2] = [r as u8, g as u8, b as u8, 255u8];

        ref_colors[3] = [0u8, 0u8, 0u8, 255u8];
    }

    let mut color_indices = u32::from_le_bytes([
        compressed_block[4],
        compressed_block[5],
        compressed_block[6],
        compressed_block[7],
    ]);

    for row in decompressed_block.iter_mut() {
        for pixel in row.iter_mut() {
            *pixel = ref_colors[(color_indices & 0x03) as usize];
            color_indices >>= 2;
        }
    }
}

fn smooth_alpha_block(compressed_block: &[u8; 8], decompressed_block: &mut Tile4x4) {
    let mut alpha = [0u32; 8];

    alpha[0] = compressed_block[0] as u32;
    alpha[1] = compressed_block[1] as u32;

    if alpha[0] > alpha[1] {
        // 6 interpolated alpha values.
        alpha[2] = (6 * alpha[0] + alpha[1]) / 7;
        alpha[3] = (5 * alpha[0] + 2 * alpha[1]) / 7;
        alpha[4] = (4 * alpha[0] + 3 * alpha[1]) / 7;
        alpha[5] = (3 * alpha[0] + 4 * alpha[1]) / 7;
        alpha[6] = (2 * alpha[0] + 5 * alpha[1]) / 7;
        alpha[7] = (alpha[0] + 6 * alpha[1]) / 7;
    } else {
        // 4 interpolated alpha values.
        alpha[2] = (4 * alpha[0] + alpha[1]) / 5;
        alpha[3] = (3 * alpha[0] + 2 * alpha[1]) / 5;
        alpha[4] = (2 * alpha[0] + 3 * alpha[1]) / 5;
        alpha[5] = (alpha[0] + 4 * alpha[1]) / 5;
        alpha[6] = 0x00;
        alpha[7] = 0xFF;
    }

    // The 48 index bits follow the two endpoints.
    let mut indices = u64::from_le_bytes(*compressed_block) >> 16;
    for row in decompressed_block.iter_mut() {
        for pixel in row.iter_mut() {
            pixel[3] = alpha[(indices & 0x07) as usize] as u8;
            indices >>= 3;
        }
    }
}
