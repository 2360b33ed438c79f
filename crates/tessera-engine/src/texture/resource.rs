use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use image::DynamicImage;

use crate::coords::Vector2;

use super::TextureError;

/// Backend-assigned texture name. Opaque to the render pipeline.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TextureHandle(pub u64);

/// Filtering and addressing applied when the texture is sampled.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Sampling {
    /// Linear filtering when set, nearest otherwise.
    pub smooth: bool,
    /// Repeat addressing when set, clamp-to-edge otherwise.
    pub repeated: bool,
}

/// Pixel upload capability, usually provided by the graphics backend.
pub trait TextureUploader {
    /// Uploads tightly packed RGBA8 rows (`width * height * 4` bytes).
    fn upload_rgba8(
        &mut self,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<TextureHandle, TextureError>;

    /// Updates the sampling parameters stored with `handle`.
    fn set_sampling(&mut self, handle: TextureHandle, sampling: Sampling);
}

/// Unit of texture coordinates in vertices.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CoordinateType {
    /// `[0, 1]` across the texture.
    Normalized,
    /// `[0, size]` in texels.
    Pixels,
}

// 0 is reserved for "no texture" in the render target's cache.
static NEXT_CACHE_ID: AtomicU64 = AtomicU64::new(1);

fn next_cache_id() -> u64 {
    NEXT_CACHE_ID.fetch_add(1, Ordering::Relaxed)
}

/// GPU texture as consumed by the render pipeline.
///
/// Each texture receives a cache identity at creation. Identities are never
/// reused, so comparing them is enough to tell whether the texture bound by
/// the previous draw is the one requested now.
#[derive(Debug)]
pub struct Texture {
    handle: TextureHandle,
    size: Vector2,
    sampling: Sampling,
    pixels_flipped: bool,
    cache_id: u64,
}

impl Texture {
    /// Uploads an RGBA8 image through `uploader`.
    ///
    /// Any other pixel layout fails with [`TextureError::UnsupportedLayout`].
    pub fn create<U>(uploader: &mut U, image: &DynamicImage) -> Result<Self, TextureError>
    where
        U: TextureUploader + ?Sized,
    {
        let DynamicImage::ImageRgba8(rgba) = image else {
            return Err(TextureError::UnsupportedLayout { found: image.color() });
        };

        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(TextureError::Empty { width, height });
        }

        let handle = uploader.upload_rgba8(width, height, rgba.as_raw())?;
        let texture =
            Self::from_handle(handle, Vector2::new(width as f32, height as f32), false);
        log::debug!(
            "created texture {:?} ({}x{}, cache id {})",
            handle,
            width,
            height,
            texture.cache_id
        );
        Ok(texture)
    }

    /// Decodes the image at `path` and uploads it.
    ///
    /// The decoded image must already be RGBA8 (e.g. a PNG with an alpha
    /// channel); it is not converted.
    pub fn from_file<U>(uploader: &mut U, path: impl AsRef<Path>) -> Result<Self, TextureError>
    where
        U: TextureUploader + ?Sized,
    {
        let image = image::open(path.as_ref())?;
        Self::create(uploader, &image)
    }

    /// Wraps a texture the backend created itself (e.g. a render texture).
    ///
    /// `pixels_flipped` marks textures whose rows are stored bottom-up.
    pub fn from_handle(handle: TextureHandle, size: Vector2, pixels_flipped: bool) -> Self {
        Self {
            handle,
            size,
            sampling: Sampling::default(),
            pixels_flipped,
            cache_id: next_cache_id(),
        }
    }

    #[inline]
    pub fn handle(&self) -> TextureHandle {
        self.handle
    }

    #[inline]
    pub fn size(&self) -> Vector2 {
        self.size
    }

    #[inline]
    pub fn cache_id(&self) -> u64 {
        self.cache_id
    }

    #[inline]
    pub fn sampling(&self) -> Sampling {
        self.sampling
    }

    #[inline]
    pub fn is_smooth(&self) -> bool {
        self.sampling.smooth
    }

    #[inline]
    pub fn is_repeated(&self) -> bool {
        self.sampling.repeated
    }

    #[inline]
    pub fn pixels_flipped(&self) -> bool {
        self.pixels_flipped
    }

    pub fn set_pixels_flipped(&mut self, flipped: bool) {
        self.pixels_flipped = flipped;
    }

    pub fn set_smooth<U>(&mut self, uploader: &mut U, smooth: bool)
    where
        U: TextureUploader + ?Sized,
    {
        if self.sampling.smooth != smooth {
            self.sampling.smooth = smooth;
            uploader.set_sampling(self.handle, self.sampling);
        }
    }

    pub fn set_repeated<U>(&mut self, uploader: &mut U, repeated: bool)
    where
        U: TextureUploader + ?Sized,
    {
        if self.sampling.repeated != repeated {
            self.sampling.repeated = repeated;
            uploader.set_sampling(self.handle, self.sampling);
        }
    }

    /// Texture-coordinate matrix to load alongside this texture.
    ///
    /// Pixel coordinates are scaled by `1 / size`; flipped textures invert the
    /// Y scale and translate by one along Y.
    pub fn coordinate_matrix(&self, coordinates: CoordinateType) -> [f32; 16] {
        let mut matrix = [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0, //
        ];

        if coordinates == CoordinateType::Pixels {
            matrix[0] = 1.0 / self.size.x;
            matrix[5] = 1.0 / self.size.y;
        }

        if self.pixels_flipped {
            matrix[5] = -matrix[5];
            matrix[13] = 1.0;
        }

        matrix
    }
}
