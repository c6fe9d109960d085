//! Decoded texture model: mip levels and the texture that owns them.

use crate::format::{PixelFormatDescriptor, SurfaceFormat};
use crate::header::DdsHeader;

/// One mip level: an owned BGRA pixel buffer plus the descriptor it was
/// decoded with.
///
/// The buffer is row-major, four channels of `component_size` bytes per
/// pixel, so `data.len() == width × height × 4 × component_size` always
/// holds.
#[derive(Debug)]
pub struct MipMap {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub descriptor: &'static PixelFormatDescriptor,
}

impl MipMap {
    /// Allocate a zero-filled level for the given dimensions.
    pub fn new_zeroed(width: u32, height: u32, descriptor: &'static PixelFormatDescriptor) -> Self {
        let len = Self::expected_len(width, height, descriptor);
        MipMap {
            width,
            height,
            data: vec![0; len],
            descriptor,
        }
    }

    /// Buffer length the invariant demands.
    pub fn expected_len(width: u32, height: u32, descriptor: &PixelFormatDescriptor) -> usize {
        width as usize * height as usize * 4 * descriptor.component_size as usize
    }

    /// Bytes per pixel of the decoded buffer.
    pub fn pixel_stride(&self) -> usize {
        4 * self.descriptor.component_size as usize
    }

    /// Zero the alpha channel in place (the "remove alpha" save option).
    pub fn clear_alpha(&mut self) {
        let cs = self.descriptor.component_size as usize;
        let stride = 4 * cs;
        for px in self.data.chunks_exact_mut(stride) {
            px[3 * cs..].fill(0);
        }
    }
}

/// A decoded texture: ordered mip levels (index 0 largest), the parsed
/// or constructed header, and the source byte length when loaded from a
/// file.
#[derive(Debug)]
pub struct Texture {
    pub mips: Vec<MipMap>,
    pub header: DdsHeader,
    pub source_len: Option<usize>,
}

impl Texture {
    /// Width of the largest level.
    pub fn width(&self) -> u32 {
        self.mips.first().map_or(0, |m| m.width)
    }

    /// Height of the largest level.
    pub fn height(&self) -> u32 {
        self.mips.first().map_or(0, |m| m.height)
    }

    /// Format the mips were decoded with.
    pub fn format(&self) -> Option<SurfaceFormat> {
        self.mips.first().map(|m| m.descriptor.format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_invariant() {
        let mip = MipMap::new_zeroed(16, 8, SurfaceFormat::Bc1.descriptor());
        assert_eq!(mip.data.len(), 16 * 8 * 4);

        let wide = MipMap::new_zeroed(16, 8, SurfaceFormat::Bc6h.descriptor());
        assert_eq!(wide.data.len(), 16 * 8 * 4 * 2);
    }

    #[test]
    fn test_clear_alpha_single_byte() {
        let mut mip = MipMap::new_zeroed(2, 1, SurfaceFormat::Bgra8.descriptor());
        mip.data.copy_from_slice(&[1, 2, 3, 200, 5, 6, 7, 210]);
        mip.clear_alpha();
        assert_eq!(mip.data, [1, 2, 3, 0, 5, 6, 7, 0]);
    }

    #[test]
    fn test_clear_alpha_wide_component() {
        let mut mip = MipMap::new_zeroed(1, 1, SurfaceFormat::Rgba16f.descriptor());
        mip.data.copy_from_slice(&[1, 1, 2, 2, 3, 3, 9, 9]);
        mip.clear_alpha();
        assert_eq!(mip.data, [1, 1, 2, 2, 3, 3, 0, 0]);
    }

    #[test]
    fn test_texture_accessors() {
        let header = DdsHeader::for_format(SurfaceFormat::Bc1, 8, 4, 1);
        let texture = Texture {
            mips: vec![MipMap::new_zeroed(8, 4, SurfaceFormat::Bc1.descriptor())],
            header,
            source_len: Some(160),
        };
        assert_eq!(texture.width(), 8);
        assert_eq!(texture.height(), 4);
        assert_eq!(texture.format(), Some(SurfaceFormat::Bc1));
    }
}
