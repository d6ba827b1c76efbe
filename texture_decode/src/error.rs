use thiserror::Error;

use crate::CrunchFormat;

#[derive(Debug, Error)]
pub enum CreateImageError {
    #[error("data length {data_length} is not valid for a {width}x{height} image")]
    InvalidSurfaceDimensions {
        width: u32,
        height: u32,
        data_length: usize,
    },

    #[error("error decoding surface: {0}")]
    DecodeSurface(#[from] SurfaceError),
}

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("surface dimensions {width} x {height} contain no pixels")]
    ZeroSizedSurface { width: u32, height: u32 },

    #[error("surface pixel count {width} x {height} would overflow")]
    PixelCountWouldOverflow { width: u32, height: u32 },

    #[error("expected surface to have at least {expected} bytes but found {actual}")]
    InputTooShort { expected: usize, actual: usize },

    #[error("expected output buffer to have exactly {expected} bytes but found {actual}")]
    OutputLengthMismatch { expected: usize, actual: usize },

    #[error("failed to allocate {requested} bytes of scratch memory")]
    AllocationFailure { requested: usize },

    #[error("Morton order offsets for a {blocks_x} x {blocks_y} block grid are out of bounds")]
    MortonOrderOutOfBounds { blocks_x: usize, blocks_y: usize },

    #[error("texture format id {id} is not recognized")]
    UnknownFormat { id: u32 },

    #[error("decoding data in crunch format {format:?} is not supported")]
    UnsupportedFormat { format: CrunchFormat },

    #[error("error reading texture container: {0}")]
    Container(#[from] ContainerError),
}

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("invalid texture container: {reason}")]
    InvalidContainer { reason: String },

    #[error("level {level} is out of range for a texture with {levels} levels")]
    InvalidLevel { level: u32, levels: u32 },
}
