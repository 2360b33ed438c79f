use thiserror::Error;

/// Failure to create a texture. Recoverable; the render pipeline is unaffected.
#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to decode image")]
    Decode(#[from] image::ImageError),

    /// Only tightly packed 8-bit RGBA sources are accepted; other layouts are
    /// rejected rather than converted.
    #[error("texture source must be RGBA8, found {found:?}")]
    UnsupportedLayout { found: image::ColorType },

    #[error("texture has zero area ({width}x{height})")]
    Empty { width: u32, height: u32 },

    #[error("texture {width}x{height} exceeds the backend limit of {max} pixels per side")]
    TooLarge { width: u32, height: u32, max: u32 },
}
