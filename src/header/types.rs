//! DDS header structures and flag constants.
//!
//! Field layout follows the Microsoft DDS specification:
//! https://learn.microsoft.com/en-us/windows/win32/direct3ddds/dds-header

use bitflags::bitflags;

/// Magic number at the start of every DDS file.
pub const DDS_MAGIC: [u8; 4] = *b"DDS ";

/// Size of the header structure excluding the magic.
pub const HEADER_SIZE: u32 = 124;

/// Size of the embedded pixel-format sub-block.
pub const PIXEL_FORMAT_SIZE: u32 = 32;

/// Total header bytes without / with the extended block.
pub const BASE_HEADER_LEN: usize = 128;
pub const EXTENDED_HEADER_LEN: usize = 148;

bitflags! {
    /// DDSD_* header validity flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct HeaderFlags: u32 {
        const CAPS = 0x1;
        const HEIGHT = 0x2;
        const WIDTH = 0x4;
        const PITCH = 0x8;
        const PIXEL_FORMAT = 0x1000;
        const MIPMAP_COUNT = 0x20000;
        const LINEAR_SIZE = 0x80000;
        const DEPTH = 0x800000;
    }

    /// DDSCAPS_* surface complexity flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CapsFlags: u32 {
        const COMPLEX = 0x8;
        const TEXTURE = 0x1000;
        const MIPMAP = 0x400000;
    }

    /// DDPF_* pixel-format flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PixelFormatFlags: u32 {
        const ALPHA_PIXELS = 0x1;
        const ALPHA = 0x2;
        const FOURCC = 0x4;
        const RGB = 0x40;
        const YUV = 0x200;
        const LUMINANCE = 0x20000;
        /// Signed bump-map data (V8U8 and friends).
        const BUMP_DUDV = 0x80000;
    }
}

/// The 32-byte pixel-format sub-block: channel bit masks, FourCC and the
/// RGB bit count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelFormatInfo {
    pub size: u32,
    pub flags: PixelFormatFlags,
    pub fourcc: [u8; 4],
    pub rgb_bit_count: u32,
    pub r_bit_mask: u32,
    pub g_bit_mask: u32,
    pub b_bit_mask: u32,
    pub a_bit_mask: u32,
}

/// The 20-byte DX10 extension present when the FourCC is the extended
/// sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedFormatInfo {
    pub dxgi_format: u32,
    pub resource_dimension: u32,
    pub misc_flag: u32,
    pub array_size: u32,
    /// Low bits carry the alpha mode (0 = unknown/straight).
    pub misc_flags2: u32,
}

/// FourCC sentinel that signals the extended header.
pub const FOURCC_DX10: [u8; 4] = *b"DX10";

pub const FOURCC_DXT1: [u8; 4] = *b"DXT1";
pub const FOURCC_DXT2: [u8; 4] = *b"DXT2";
pub const FOURCC_DXT3: [u8; 4] = *b"DXT3";
pub const FOURCC_DXT4: [u8; 4] = *b"DXT4";
pub const FOURCC_DXT5: [u8; 4] = *b"DXT5";
pub const FOURCC_ATI1: [u8; 4] = *b"ATI1";
pub const FOURCC_BC4U: [u8; 4] = *b"BC4U";
pub const FOURCC_ATI2: [u8; 4] = *b"ATI2";
pub const FOURCC_BC5U: [u8; 4] = *b"BC5U";

/// Legacy numeric D3DFMT codes stored in the FourCC field.
pub const D3DFMT_A16B16G16R16F: u32 = 113;
pub const D3DFMT_A32B32G32R32F: u32 = 116;

/// DXGI format ids used in the extended block.
pub const DXGI_R32G32B32A32_FLOAT: u32 = 2;
pub const DXGI_R16G16B16A16_FLOAT: u32 = 10;
pub const DXGI_R8G8B8A8_UNORM: u32 = 28;
pub const DXGI_R8G8B8A8_UNORM_SRGB: u32 = 29;
pub const DXGI_R8G8_SNORM: u32 = 51;
pub const DXGI_R8_UNORM: u32 = 61;
pub const DXGI_BC1_UNORM: u32 = 71;
pub const DXGI_BC1_UNORM_SRGB: u32 = 72;
pub const DXGI_BC2_UNORM: u32 = 74;
pub const DXGI_BC2_UNORM_SRGB: u32 = 75;
pub const DXGI_BC3_UNORM: u32 = 77;
pub const DXGI_BC3_UNORM_SRGB: u32 = 78;
pub const DXGI_BC4_UNORM: u32 = 80;
pub const DXGI_BC5_UNORM: u32 = 83;
pub const DXGI_B8G8R8A8_UNORM: u32 = 87;
pub const DXGI_B8G8R8A8_UNORM_SRGB: u32 = 91;
pub const DXGI_BC6H_UF16: u32 = 95;
pub const DXGI_BC6H_SF16: u32 = 96;
pub const DXGI_BC7_UNORM: u32 = 98;
pub const DXGI_BC7_UNORM_SRGB: u32 = 99;

/// D3D resource dimension for 2D textures.
pub const RESOURCE_DIMENSION_TEXTURE2D: u32 = 3;

/// Parsed (or constructed) DDS header.
///
/// Immutable once built; `mip_count == 0` means "unknown, estimate from
/// the dimensions".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdsHeader {
    pub flags: HeaderFlags,
    pub height: u32,
    pub width: u32,
    pub pitch_or_linear_size: u32,
    pub depth: u32,
    pub mip_count: u32,
    pub reserved1: [u32; 11],
    pub pixel_format: PixelFormatInfo,
    pub caps: CapsFlags,
    pub caps2: u32,
    pub caps3: u32,
    pub caps4: u32,
    pub reserved2: u32,
    /// Present only when the FourCC is the extended sentinel.
    pub extended: Option<ExtendedFormatInfo>,
}

impl DdsHeader {
    /// Serialized size: 128 bytes, plus 20 when the extended block is
    /// present.
    pub fn byte_len(&self) -> usize {
        if self.extended.is_some() {
            EXTENDED_HEADER_LEN
        } else {
            BASE_HEADER_LEN
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic_bytes() {
        assert_eq!(&DDS_MAGIC, b"DDS ");
    }

    #[test]
    fn test_flag_values_match_dds_layout() {
        assert_eq!(HeaderFlags::MIPMAP_COUNT.bits(), 0x20000);
        assert_eq!(HeaderFlags::LINEAR_SIZE.bits(), 0x80000);
        assert_eq!(CapsFlags::MIPMAP.bits(), 0x400000);
        assert_eq!(PixelFormatFlags::LUMINANCE.bits(), 0x20000);
        assert_eq!(PixelFormatFlags::BUMP_DUDV.bits(), 0x80000);
    }

    #[test]
    fn test_fourcc_sentinel() {
        assert_eq!(u32::from_le_bytes(FOURCC_DX10), 0x30315844);
    }
}
