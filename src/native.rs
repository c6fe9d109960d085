//! Pluggable native codec for non-DDS containers.
//!
//! When a buffer's magic is not `"DDS "` the pipeline hands it to a
//! [`NativeCodec`], which turns JPEG/PNG/GIF/BMP/TIFF payloads into raw
//! BGRA and back. The DDS path never depends on this.

use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::error::TextureError;

/// A decoded (or to-be-encoded) raw image in BGRA byte order.
#[derive(Debug, Clone)]
pub struct NativeImage {
    pub width: u32,
    pub height: u32,
    pub bgra: Vec<u8>,
}

/// Decode/encode capability for non-DDS container formats.
pub trait NativeCodec: Send + Sync {
    /// Decode a container (JPEG/PNG/GIF/BMP/TIFF) into raw BGRA.
    fn decode(&self, bytes: &[u8]) -> Result<NativeImage, TextureError>;

    /// Encode raw BGRA into a container; the implementation picks the
    /// output format.
    fn encode(&self, image: &NativeImage) -> Result<Vec<u8>, TextureError>;
}

/// [`NativeCodec`] backed by the `image` crate. Encodes to PNG.
#[derive(Debug, Default)]
pub struct ImageCodec;

impl NativeCodec for ImageCodec {
    fn decode(&self, bytes: &[u8]) -> Result<NativeImage, TextureError> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| TextureError::Native(e.to_string()))?
            .to_rgba8();
        let (width, height) = decoded.dimensions();
        let mut bgra = decoded.into_raw();
        for px in bgra.chunks_exact_mut(4) {
            px.swap(0, 2);
        }
        Ok(NativeImage { width, height, bgra })
    }

    fn encode(&self, image: &NativeImage) -> Result<Vec<u8>, TextureError> {
        let mut rgba = image.bgra.clone();
        for px in rgba.chunks_exact_mut(4) {
            px.swap(0, 2);
        }
        let buffer = RgbaImage::from_raw(image.width, image.height, rgba)
            .ok_or_else(|| TextureError::Native("buffer does not match dimensions".into()))?;

        let mut out = std::io::Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(buffer)
            .write_to(&mut out, ImageFormat::Png)
            .map_err(|e| TextureError::Native(e.to_string()))?;
        Ok(out.into_inner())
    }
}
