#![no_std]
//! Safe, no_std, pure Rust decoders for the block compressed texture formats
//! commonly found in mobile game assets.
//!
//! Each block decoder takes a fixed size compressed block and returns the
//! decoded RGBA8 pixels in row-major order.
//! Rows are returned in the order they are stored in the block.
//! Placing the rows in an image with the correct orientation is left to the caller.
//!
//! PVRTC is not a pure per-block format since every pixel depends on the
//! neighboring blocks. This crate only provides the per-block pieces.
//! The surface level walk with its Morton ordering lives in `texture_decode`.
mod dxt;
mod etc;
mod pvrtc;

pub use dxt::{dxt1, dxt5, rgb565_to_rgb8};
pub use etc::{etc1, etc2, etc2_alpha1, etc2_alpha8};
pub use pvrtc::{
    morton_index, pvrtc_2bpp_tile, pvrtc_4bpp_tile, Modulation, TexelColor, TexelInfo,
};

/// The width in pixels of a 4x4 block or a PVRTC 4bpp block.
pub const BLOCK_WIDTH: usize = 4;
/// The height in pixels of every block format in this crate.
pub const BLOCK_HEIGHT: usize = 4;
/// The width in pixels of a PVRTC 2bpp block.
pub const PVRTC_2BPP_BLOCK_WIDTH: usize = 8;

/// A decoded 4x4 block of RGBA8 pixels in row-major order.
pub type Tile4x4 = [[[u8; 4]; BLOCK_WIDTH]; BLOCK_HEIGHT];

/// A decoded 8x4 PVRTC 2bpp block of RGBA8 pixels in row-major order.
pub type Tile8x4 = [[[u8; 4]; PVRTC_2BPP_BLOCK_WIDTH]; BLOCK_HEIGHT];

#[inline]
fn clamp_u8(n: i32) -> u8 {
    n.clamp(0, 255) as u8
}
