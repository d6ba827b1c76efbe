use std::path::Path;

use anyhow::Context;
use log::info;
use texture_decode::{ByteOrder, ImageFormat, Surface};

// Each pattern is a square grid of blocks where block (j, i) uses the value i
// for its first endpoint and j for its second endpoint in a single channel.
// Selectors vary by column so every palette entry shows up as a vertical stripe.
fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<_> = std::env::args().collect();
    let output_folder = args.get(1).map(String::as_str).unwrap_or(".");
    std::fs::create_dir_all(output_folder)?;

    let patterns = [
        ("dxt1_r", dxt1_channel(0)),
        ("dxt1_g", dxt1_channel(1)),
        ("dxt1_b", dxt1_channel(2)),
        ("dxt5_r", dxt5_channel(0)),
        ("dxt5_g", dxt5_channel(1)),
        ("dxt5_b", dxt5_channel(2)),
        ("etc1_r", etc1_r()),
        ("etc1_g", etc1_g()),
        ("etc1_b", etc1_b()),
        ("etc2_r", etc2_r()),
        ("etc2_g", etc2_g()),
        ("etc2_b", etc2_b()),
        ("etc2_alpha1", etc2_alpha1()),
        ("etc2_alpha8", etc2_alpha8()),
        ("pvrtc_4bpp", pvrtc_4bpp()),
        ("pvrtc_2bpp", pvrtc_2bpp()),
    ];

    for (name, surface) in patterns {
        let path = Path::new(output_folder).join(name).with_extension("png");
        save_png(&surface, &path).with_context(|| format!("failed to save {name}"))?;
        info!(
            "Saved {}x{} {:?} pattern to {path:?}",
            surface.width, surface.height, surface.image_format
        );
    }

    Ok(())
}

fn save_png(surface: &Surface<Vec<u8>>, path: &Path) -> anyhow::Result<()> {
    let image = surface.decode_rgba8()?.to_image()?;
    image.save(path)?;
    Ok(())
}

// An RGB endpoint with only one channel set.
fn endpoint(channel: usize, value: u64) -> [u64; 3] {
    let mut rgb = [0; 3];
    rgb[channel] = value;
    rgb
}

fn rgb565_bits(channel: usize) -> u64 {
    if channel == 1 {
        6
    } else {
        5
    }
}

fn dxt1_channel(channel: usize) -> Surface<Vec<u8>> {
    // Every pair of endpoints for a single 565 channel.
    blocks(rgb565_bits(channel), ImageFormat::Dxt1, |i, j| {
        dxt1_block([endpoint(channel, i), endpoint(channel, j)]).to_le_bytes()
    })
}

fn dxt1_block(endpoints: [[u64; 3]; 2]) -> u64 {
    let [q0, q1] = endpoints.map(|[r, g, b]| (r << 11) | (g << 5) | b);
    (column_selectors(2) << 32) | (q1 << 16) | q0
}

fn dxt5_channel(channel: usize) -> Surface<Vec<u8>> {
    // Alpha endpoints use all 8 bits, so the color endpoints repeat.
    let max = 1 << rgb565_bits(channel);
    blocks(8, ImageFormat::Dxt5, |i, j| {
        let color = [endpoint(channel, i % max), endpoint(channel, j % max)];
        dxt5_block(color, [i, j]).to_le_bytes()
    })
}

fn dxt5_block(endpoints: [[u64; 3]; 2], alpha: [u64; 2]) -> u128 {
    let alpha_block = (alpha_selectors() << 16) | (alpha[1] << 8) | alpha[0];
    ((dxt1_block(endpoints) as u128) << 64) | alpha_block as u128
}

fn etc1_r() -> Surface<Vec<u8>> {
    // 4-bit independent R channel for individual mode colors.
    blocks(4, ImageFormat::Etc1, |i, j| {
        etc_individual_block([i, 0, 0], [j, 0, 0], (i % 8, j % 8), i % 2).to_be_bytes()
    })
}

fn etc1_g() -> Surface<Vec<u8>> {
    blocks(4, ImageFormat::Etc1, |i, j| {
        etc_individual_block([0, i, 0], [0, j, 0], (i % 8, j % 8), j % 2).to_be_bytes()
    })
}

fn etc1_b() -> Surface<Vec<u8>> {
    blocks(4, ImageFormat::Etc1, |i, j| {
        etc_individual_block([0, 0, i], [0, 0, j], (i % 8, j % 8), 0).to_be_bytes()
    })
}

fn etc2_r() -> Surface<Vec<u8>> {
    // A 5-bit base and 3-bit delta for R covers the differential and T modes.
    blocks(5, ImageFormat::Etc2Rgb, |i, j| {
        etc_differential_block([i, 16, 16], [j % 8, 0, 0], (j / 8, j / 8)).to_be_bytes()
    })
}

fn etc2_g() -> Surface<Vec<u8>> {
    // A 5-bit base and 3-bit delta for G covers the differential and H modes.
    blocks(5, ImageFormat::Etc2Rgb, |i, j| {
        etc_differential_block([16, i, 16], [0, j % 8, 0], (j / 8, j / 8)).to_be_bytes()
    })
}

fn etc2_b() -> Surface<Vec<u8>> {
    // A 5-bit base and 3-bit delta for B covers the differential and planar modes.
    blocks(5, ImageFormat::Etc2Rgb, |i, j| {
        etc_differential_block([16, 16, i], [0, 0, j % 8], (j / 8, j / 8)).to_be_bytes()
    })
}

fn etc2_alpha1() -> Surface<Vec<u8>> {
    // Each block has a single alpha value.
    blocks(4, ImageFormat::Etc2Rgba1, |i, j| {
        let color = etc_differential_block([i * 2, j * 2, 16], [0, 0, 0], (0, 0));
        let mut bytes = [0u8; 9];
        bytes[0] = (i * 16 + j) as u8;
        bytes[1..].copy_from_slice(&color.to_be_bytes());
        bytes
    })
}

fn etc2_alpha8() -> Surface<Vec<u8>> {
    // 8-bit base alpha and every multiplier and modifier table combination.
    blocks(8, ImageFormat::Etc2Rgba8, |i, j| {
        let color = etc_differential_block([16, 16, 16], [0, 0, 0], (0, 0));
        ((eac_alpha_block(i, j % 16, j / 16) as u128) << 64 | color as u128).to_be_bytes()
    })
}

fn etc_individual_block(rgb0: [u64; 3], rgb1: [u64; 3], tables: (u64, u64), flip: u64) -> u64 {
    let [r0, g0, b0] = rgb0;
    let [r1, g1, b1] = rgb1;
    let colors = (r0 << 60) | (r1 << 56) | (g0 << 52) | (g1 << 48) | (b0 << 44) | (b1 << 40);
    colors | (tables.0 << 37) | (tables.1 << 34) | (flip << 32) | etc_indices()
}

fn etc_differential_block(base: [u64; 3], delta: [u64; 3], tables: (u64, u64)) -> u64 {
    let [r, g, b] = base;
    let [dr, dg, db] = delta;
    let colors = (r << 59) | (dr << 56) | (g << 51) | (dg << 48) | (b << 43) | (db << 40);
    colors | (tables.0 << 37) | (tables.1 << 34) | (1 << 33) | etc_indices()
}

fn etc_indices() -> u64 {
    // The high bits and low bits of each 2-bit pixel index are stored separately.
    // Select every modifier for each column.
    (0xFF00 << 16) | 0xF0F0
}

fn eac_alpha_block(base: u64, multiplier: u64, table: u64) -> u64 {
    (base << 56) | (multiplier << 52) | (table << 48) | alpha_selectors()
}

fn pvrtc_4bpp() -> Surface<Vec<u8>> {
    // 5-bit independent R for color A and B for color B.
    morton_blocks(5, ImageFormat::Pvrtc4bpp, |i, j| {
        pvrtc_block(i, j, column_selectors(2)).to_le_bytes()
    })
}

fn pvrtc_2bpp() -> Surface<Vec<u8>> {
    // Alternate between the 1-bit and 2-bit modulation modes.
    morton_blocks(5, ImageFormat::Pvrtc2bpp, |i, j| {
        let mode = (i + j) % 2;
        (pvrtc_block(i, j, 0x5A5A_5A5A) | mode << 32).to_le_bytes()
    })
}

fn pvrtc_block(r: u64, b: u64, modulation: u64) -> u64 {
    // Set the high bit of both colors to make them opaque.
    let color_a = 0x8000 | (r << 10);
    let color_b = 0x8000 | b;
    (color_b << 48) | (color_a << 32) | (modulation & 0xFFFF_FFFF)
}

// Packs a selector for each pixel of a 4x4 block with pixel 0 in the low bits.
fn selectors(bits: u64, select: impl Fn(u64, u64) -> u64) -> u64 {
    (0..16).fold(0, |packed, i| packed | select(i % 4, i / 4) << (i * bits))
}

// Column x uses selector x.
fn column_selectors(bits: u64) -> u64 {
    selectors(bits, |x, _| x)
}

// Alternating rows use the low and high half of the 3-bit alpha selectors.
fn alpha_selectors() -> u64 {
    selectors(3, |x, y| x + 4 * (y % 2))
}

fn blocks<const N: usize, F>(bits: u64, image_format: ImageFormat, block: F) -> Surface<Vec<u8>>
where
    F: Fn(u64, u64) -> [u8; N],
{
    let n: u64 = 1 << bits;
    let data = (0..n)
        .flat_map(|i| (0..n).map(move |j| (i, j)))
        .flat_map(|(i, j)| block(i, j))
        .collect();

    surface(n, image_format, data)
}

fn morton_blocks<F>(bits: u64, image_format: ImageFormat, block: F) -> Surface<Vec<u8>>
where
    F: Fn(u64, u64) -> [u8; 8],
{
    let n = 1usize << bits;

    // PVRTC blocks are stored in Morton order instead of row-major order.
    let mut data = vec![0u8; n * n * 8];
    for i in 0..n {
        for j in 0..n {
            let offset = blockdec_rs::morton_index(j, i, n, n) * 8;
            data[offset..offset + 8].copy_from_slice(&block(i as u64, j as u64));
        }
    }

    surface(n as u64, image_format, data)
}

fn surface(blocks: u64, image_format: ImageFormat, data: Vec<u8>) -> Surface<Vec<u8>> {
    let (block_width, block_height) = image_format.block_dimensions();
    Surface {
        width: blocks as u32 * block_width,
        height: blocks as u32 * block_height,
        image_format,
        byte_order: ByteOrder::LittleEndian,
        data,
    }
}
