//! Surface format registry.
//!
//! One immutable [`PixelFormatDescriptor`] per [`SurfaceFormat`] carries
//! the block geometry, component width and codec dispatch record for
//! that format, plus the closed-form mip-chain size arithmetic every
//! offset computation is built on.

use std::fmt;

use crate::codec::uncompressed::ChannelMasks;
use crate::codec::{
    BlockCodec, BC1_CODEC, BC2_CODEC, BC3_CODEC, BC4_CODEC, BC5_CODEC, BC6_CODEC, BC7_CODEC,
};

/// Every surface layout the pipeline can decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceFormat {
    /// BC1/DXT1: 8-byte color blocks, optional 1-bit alpha.
    Bc1,
    /// BC2/DXT3: explicit 4-bit alpha + BC1-style color.
    Bc2,
    /// BC3/DXT5: interpolated alpha + BC1-style color.
    Bc3,
    /// BC4/ATI1: single interpolated 8-bit channel.
    Bc4,
    /// BC5/ATI2: two interpolated 8-bit channels.
    Bc5,
    /// BC6H: HDR RGB, unsigned half floats.
    Bc6h,
    /// BC7: LDR RGBA, 8 modes.
    Bc7,
    /// 32-bit A8R8G8B8 (bytes are B, G, R, A).
    Bgra8,
    /// 32-bit A8B8G8R8 (bytes are R, G, B, A).
    Rgba8,
    /// 24-bit R8G8B8.
    Bgr8,
    /// 8-bit luminance.
    L8,
    /// 16-bit luminance + alpha.
    La8,
    /// 16-bit signed two-channel (V8U8 bump data).
    Rg8Snorm,
    /// 64-bit RGBA half floats.
    Rgba16f,
    /// 128-bit RGBA single floats.
    Rgba32f,
}

impl fmt::Display for SurfaceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SurfaceFormat::Bc1 => "BC1",
            SurfaceFormat::Bc2 => "BC2",
            SurfaceFormat::Bc3 => "BC3",
            SurfaceFormat::Bc4 => "BC4",
            SurfaceFormat::Bc5 => "BC5",
            SurfaceFormat::Bc6h => "BC6H",
            SurfaceFormat::Bc7 => "BC7",
            SurfaceFormat::Bgra8 => "A8R8G8B8",
            SurfaceFormat::Rgba8 => "A8B8G8R8",
            SurfaceFormat::Bgr8 => "R8G8B8",
            SurfaceFormat::L8 => "L8",
            SurfaceFormat::La8 => "A8L8",
            SurfaceFormat::Rg8Snorm => "V8U8",
            SurfaceFormat::Rgba16f => "A16B16G16R16F",
            SurfaceFormat::Rgba32f => "A32B32G32R32F",
        };
        write!(f, "{name}")
    }
}

/// Registry-owned metadata for one surface format.
///
/// `block_size` is bytes per compressed 4×4 block for block formats and
/// bytes per pixel otherwise; `component_size` is bytes per channel of
/// the decoded buffer. Never mutated after registration.
#[derive(Debug)]
pub struct PixelFormatDescriptor {
    pub format: SurfaceFormat,
    pub block_size: u32,
    pub component_size: u32,
    pub block_compressed: bool,
    pub header_size: u32,
    pub channels: u32,
    pub premultiplied: bool,
    pub codec: Option<&'static BlockCodec>,
}

macro_rules! descriptor {
    ($name:ident, $format:ident, $block:expr, $comp:expr, $bc:expr, $hdr:expr, $ch:expr, $codec:expr) => {
        static $name: PixelFormatDescriptor = PixelFormatDescriptor {
            format: SurfaceFormat::$format,
            block_size: $block,
            component_size: $comp,
            block_compressed: $bc,
            header_size: $hdr,
            channels: $ch,
            premultiplied: false,
            codec: $codec,
        };
    };
}

descriptor!(DESC_BC1, Bc1, 8, 1, true, 128, 4, Some(&BC1_CODEC));
descriptor!(DESC_BC2, Bc2, 16, 1, true, 128, 4, Some(&BC2_CODEC));
descriptor!(DESC_BC3, Bc3, 16, 1, true, 128, 4, Some(&BC3_CODEC));
descriptor!(DESC_BC4, Bc4, 8, 1, true, 128, 1, Some(&BC4_CODEC));
descriptor!(DESC_BC5, Bc5, 16, 1, true, 128, 2, Some(&BC5_CODEC));
descriptor!(DESC_BC6, Bc6h, 16, 2, true, 148, 3, Some(&BC6_CODEC));
descriptor!(DESC_BC7, Bc7, 16, 1, true, 148, 4, Some(&BC7_CODEC));
descriptor!(DESC_BGRA8, Bgra8, 4, 1, false, 128, 4, None);
descriptor!(DESC_RGBA8, Rgba8, 4, 1, false, 128, 4, None);
descriptor!(DESC_BGR8, Bgr8, 3, 1, false, 128, 3, None);
descriptor!(DESC_L8, L8, 1, 1, false, 128, 1, None);
descriptor!(DESC_LA8, La8, 2, 1, false, 128, 2, None);
descriptor!(DESC_RG8S, Rg8Snorm, 2, 1, false, 128, 2, None);
descriptor!(DESC_RGBA16F, Rgba16f, 8, 2, false, 128, 4, None);
descriptor!(DESC_RGBA32F, Rgba32f, 16, 4, false, 128, 4, None);

impl SurfaceFormat {
    /// Look up the registry descriptor for this format.
    pub fn descriptor(&self) -> &'static PixelFormatDescriptor {
        match self {
            SurfaceFormat::Bc1 => &DESC_BC1,
            SurfaceFormat::Bc2 => &DESC_BC2,
            SurfaceFormat::Bc3 => &DESC_BC3,
            SurfaceFormat::Bc4 => &DESC_BC4,
            SurfaceFormat::Bc5 => &DESC_BC5,
            SurfaceFormat::Bc6h => &DESC_BC6,
            SurfaceFormat::Bc7 => &DESC_BC7,
            SurfaceFormat::Bgra8 => &DESC_BGRA8,
            SurfaceFormat::Rgba8 => &DESC_RGBA8,
            SurfaceFormat::Bgr8 => &DESC_BGR8,
            SurfaceFormat::L8 => &DESC_L8,
            SurfaceFormat::La8 => &DESC_LA8,
            SurfaceFormat::Rg8Snorm => &DESC_RG8S,
            SurfaceFormat::Rgba16f => &DESC_RGBA16F,
            SurfaceFormat::Rgba32f => &DESC_RGBA32F,
        }
    }

    /// Channel mask layout for uncompressed formats (the same table the
    /// header writer uses); `None` for block-compressed formats.
    pub fn channel_masks(&self) -> Option<ChannelMasks> {
        let m = |bit_count, r, g, b, a, luminance, signed| {
            Some(ChannelMasks { bit_count, r, g, b, a, luminance, signed })
        };
        match self {
            SurfaceFormat::Bgra8 => m(32, 0x00FF_0000, 0x0000_FF00, 0x0000_00FF, 0xFF00_0000, false, false),
            SurfaceFormat::Rgba8 => m(32, 0x0000_00FF, 0x0000_FF00, 0x00FF_0000, 0xFF00_0000, false, false),
            SurfaceFormat::Bgr8 => m(24, 0x00FF_0000, 0x0000_FF00, 0x0000_00FF, 0, false, false),
            SurfaceFormat::L8 => m(8, 0xFF, 0, 0, 0, true, false),
            SurfaceFormat::La8 => m(16, 0x00FF, 0, 0, 0xFF00, true, false),
            SurfaceFormat::Rg8Snorm => m(16, 0x00FF, 0xFF00, 0, 0, false, true),
            SurfaceFormat::Rgba16f => m(64, 0, 0, 0, 0, false, false),
            SurfaceFormat::Rgba32f => m(128, 0, 0, 0, 0, false, false),
            _ => None,
        }
    }

    /// Whether the pipeline can encode (save) this format.
    pub fn encodable(&self) -> bool {
        match self {
            SurfaceFormat::Bc1
            | SurfaceFormat::Bc2
            | SurfaceFormat::Bc3
            | SurfaceFormat::Bc4
            | SurfaceFormat::Bc5
            | SurfaceFormat::Bc6h
            | SurfaceFormat::Bc7 => true,
            _ => self.channel_masks().is_some(),
        }
    }
}

/// Geometric partial sum of mip areas relative to the base level.
///
/// `n = -1` (nothing) is 0 and `n = 0` (top level only) is 1; beyond
/// that each level adds a quarter of the previous one, giving
/// `(4 - 4^(-n)) / 3`.
fn partial_sum(n: i32) -> f64 {
    match n {
        i32::MIN..=-1 => 0.0,
        0 => 1.0,
        _ => (4.0 - 4.0f64.powi(-n)) / 3.0,
    }
}

/// Size in bytes of a surface from the start of the file through mip
/// `mip_index` (0-based, inclusive; -1 gives the bare header size).
///
/// This closed form is the basis for every mip offset downstream: the
/// base area is divided by 16 for block-compressed formats (one block
/// per 4×4 texels), scaled by the block size and the partial sum, and a
/// two-block correction covers the sub-block tail once the selected
/// mip's smaller dimension drops below 4.
pub fn compressed_size(
    width: u32,
    height: u32,
    mip_index: i32,
    desc: &PixelFormatDescriptor,
) -> u64 {
    let divisor: u64 = if desc.block_compressed { 16 } else { 1 };
    let base = (width as u64 * height as u64 / divisor) * desc.block_size as u64;
    let mut size = desc.header_size as u64 + (base as f64 * partial_sum(mip_index)) as u64;

    if desc.block_compressed && mip_index >= 0 {
        let mw = (width >> mip_index.min(31)).max(1);
        let mh = (height >> mip_index.min(31)).max(1);
        if mw.min(mh) < 4 {
            size += 2 * desc.block_size as u64;
        }
    }
    size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_sum_anchors() {
        assert_eq!(partial_sum(-1), 0.0);
        assert_eq!(partial_sum(0), 1.0);
        assert_eq!(partial_sum(1), 1.25);
        assert_eq!(partial_sum(2), 1.3125);
    }

    #[test]
    fn test_size_with_no_mips_is_header() {
        for format in [SurfaceFormat::Bc1, SurfaceFormat::Bc7, SurfaceFormat::Bgra8] {
            let desc = format.descriptor();
            assert_eq!(
                compressed_size(256, 256, -1, desc),
                desc.header_size as u64,
                "{format}"
            );
        }
    }

    #[test]
    fn test_bc1_256_top_mip() {
        let desc = SurfaceFormat::Bc1.descriptor();
        // 64×64 blocks × 8 bytes + 128-byte header.
        assert_eq!(compressed_size(256, 256, 0, desc), 128 + 32768);
    }

    #[test]
    fn test_bc1_256_two_mips() {
        let desc = SurfaceFormat::Bc1.descriptor();
        assert_eq!(compressed_size(256, 256, 1, desc), 128 + 32768 + 8192);
    }

    #[test]
    fn test_bc3_doubles_bc1() {
        let bc1 = SurfaceFormat::Bc1.descriptor();
        let bc3 = SurfaceFormat::Bc3.descriptor();
        let s1 = compressed_size(512, 512, 3, bc1) - 128;
        let s3 = compressed_size(512, 512, 3, bc3) - 128;
        assert_eq!(s3, s1 * 2);
    }

    #[test]
    fn test_sub_block_mip_correction() {
        let desc = SurfaceFormat::Bc1.descriptor();
        // Mip 7 of a 256×256 chain is 2×2: the tail correction applies.
        let with = compressed_size(256, 256, 7, desc);
        let closed = 128 + (32768.0 * partial_sum(7)) as u64;
        assert_eq!(with, closed + 16);
    }

    #[test]
    fn test_uncompressed_size_uses_pixel_bytes() {
        let desc = SurfaceFormat::Bgra8.descriptor();
        assert_eq!(compressed_size(16, 16, 0, desc), 128 + 16 * 16 * 4);
    }

    #[test]
    fn test_extended_formats_have_larger_header() {
        assert_eq!(SurfaceFormat::Bc7.descriptor().header_size, 148);
        assert_eq!(SurfaceFormat::Bc6h.descriptor().header_size, 148);
        assert_eq!(SurfaceFormat::Bc1.descriptor().header_size, 128);
    }

    #[test]
    fn test_descriptor_identity() {
        // Exactly one descriptor per format.
        let a = SurfaceFormat::Bc3.descriptor() as *const _;
        let b = SurfaceFormat::Bc3.descriptor() as *const _;
        assert!(std::ptr::eq(a, b));
        assert_eq!(SurfaceFormat::Bc3.descriptor().format, SurfaceFormat::Bc3);
    }

    #[test]
    fn test_block_geometry() {
        assert_eq!(SurfaceFormat::Bc1.descriptor().block_size, 8);
        assert_eq!(SurfaceFormat::Bc4.descriptor().block_size, 8);
        assert_eq!(SurfaceFormat::Bc7.descriptor().block_size, 16);
        assert_eq!(SurfaceFormat::Bc6h.descriptor().component_size, 2);
        assert_eq!(SurfaceFormat::Rgba32f.descriptor().component_size, 4);
    }

    #[test]
    fn test_encodable_matrix() {
        assert!(SurfaceFormat::Bc1.encodable());
        assert!(SurfaceFormat::Bc7.encodable());
        assert!(SurfaceFormat::Bgra8.encodable());
        assert!(SurfaceFormat::L8.encodable());
    }
}
