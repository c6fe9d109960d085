//! DDS header construction and serialization.

use crate::format::SurfaceFormat;
use crate::header::types::*;

impl DdsHeader {
    /// Build a header for saving `mip_count` levels of the given format.
    ///
    /// Legacy formats get their masks from the format→mask lookup table;
    /// extended formats get the `DX10` sentinel plus the 20-byte block.
    pub fn for_format(format: SurfaceFormat, width: u32, height: u32, mip_count: u32) -> Self {
        let desc = format.descriptor();

        let mut flags = HeaderFlags::CAPS
            | HeaderFlags::HEIGHT
            | HeaderFlags::WIDTH
            | HeaderFlags::PIXEL_FORMAT;
        let pitch_or_linear_size = if desc.block_compressed {
            flags |= HeaderFlags::LINEAR_SIZE;
            width.div_ceil(4) * height.div_ceil(4) * desc.block_size
        } else {
            flags |= HeaderFlags::PITCH;
            width * desc.block_size
        };
        if mip_count > 1 {
            flags |= HeaderFlags::MIPMAP_COUNT;
        }

        let mut caps = CapsFlags::TEXTURE;
        if mip_count > 1 {
            caps |= CapsFlags::COMPLEX | CapsFlags::MIPMAP;
        }

        let (pixel_format, extended) = pixel_format_for(format);

        DdsHeader {
            flags,
            height,
            width,
            pitch_or_linear_size,
            depth: 0,
            mip_count,
            reserved1: [0; 11],
            pixel_format,
            caps,
            caps2: 0,
            caps3: 0,
            caps4: 0,
            reserved2: 0,
            extended,
        }
    }

    /// Serialize to the fixed binary layout (128 or 148 bytes).
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.byte_len());

        bytes.extend_from_slice(&DDS_MAGIC);
        bytes.extend_from_slice(&HEADER_SIZE.to_le_bytes());
        bytes.extend_from_slice(&self.flags.bits().to_le_bytes());
        bytes.extend_from_slice(&self.height.to_le_bytes());
        bytes.extend_from_slice(&self.width.to_le_bytes());
        bytes.extend_from_slice(&self.pitch_or_linear_size.to_le_bytes());
        bytes.extend_from_slice(&self.depth.to_le_bytes());
        bytes.extend_from_slice(&self.mip_count.to_le_bytes());
        for &val in &self.reserved1 {
            bytes.extend_from_slice(&val.to_le_bytes());
        }

        bytes.extend_from_slice(&self.pixel_format.size.to_le_bytes());
        bytes.extend_from_slice(&self.pixel_format.flags.bits().to_le_bytes());
        bytes.extend_from_slice(&self.pixel_format.fourcc);
        bytes.extend_from_slice(&self.pixel_format.rgb_bit_count.to_le_bytes());
        bytes.extend_from_slice(&self.pixel_format.r_bit_mask.to_le_bytes());
        bytes.extend_from_slice(&self.pixel_format.g_bit_mask.to_le_bytes());
        bytes.extend_from_slice(&self.pixel_format.b_bit_mask.to_le_bytes());
        bytes.extend_from_slice(&self.pixel_format.a_bit_mask.to_le_bytes());

        bytes.extend_from_slice(&self.caps.bits().to_le_bytes());
        bytes.extend_from_slice(&self.caps2.to_le_bytes());
        bytes.extend_from_slice(&self.caps3.to_le_bytes());
        bytes.extend_from_slice(&self.caps4.to_le_bytes());
        bytes.extend_from_slice(&self.reserved2.to_le_bytes());

        if let Some(ext) = &self.extended {
            bytes.extend_from_slice(&ext.dxgi_format.to_le_bytes());
            bytes.extend_from_slice(&ext.resource_dimension.to_le_bytes());
            bytes.extend_from_slice(&ext.misc_flag.to_le_bytes());
            bytes.extend_from_slice(&ext.array_size.to_le_bytes());
            bytes.extend_from_slice(&ext.misc_flags2.to_le_bytes());
        }

        bytes
    }
}

fn fourcc_pixel_format(fourcc: [u8; 4]) -> PixelFormatInfo {
    PixelFormatInfo {
        size: PIXEL_FORMAT_SIZE,
        flags: PixelFormatFlags::FOURCC,
        fourcc,
        rgb_bit_count: 0,
        r_bit_mask: 0,
        g_bit_mask: 0,
        b_bit_mask: 0,
        a_bit_mask: 0,
    }
}

fn extended_info(dxgi_format: u32) -> ExtendedFormatInfo {
    ExtendedFormatInfo {
        dxgi_format,
        resource_dimension: RESOURCE_DIMENSION_TEXTURE2D,
        misc_flag: 0,
        array_size: 1,
        misc_flags2: 0,
    }
}

fn pixel_format_for(format: SurfaceFormat) -> (PixelFormatInfo, Option<ExtendedFormatInfo>) {
    match format {
        SurfaceFormat::Bc1 => (fourcc_pixel_format(FOURCC_DXT1), None),
        SurfaceFormat::Bc2 => (fourcc_pixel_format(FOURCC_DXT3), None),
        SurfaceFormat::Bc3 => (fourcc_pixel_format(FOURCC_DXT5), None),
        SurfaceFormat::Bc4 => (fourcc_pixel_format(FOURCC_ATI1), None),
        SurfaceFormat::Bc5 => (fourcc_pixel_format(FOURCC_ATI2), None),
        SurfaceFormat::Bc6h => (
            fourcc_pixel_format(FOURCC_DX10),
            Some(extended_info(DXGI_BC6H_UF16)),
        ),
        SurfaceFormat::Bc7 => (
            fourcc_pixel_format(FOURCC_DX10),
            Some(extended_info(DXGI_BC7_UNORM)),
        ),
        SurfaceFormat::Rgba16f => (
            fourcc_pixel_format(D3DFMT_A16B16G16R16F.to_le_bytes()),
            None,
        ),
        SurfaceFormat::Rgba32f => (
            fourcc_pixel_format(D3DFMT_A32B32G32R32F.to_le_bytes()),
            None,
        ),
        _ => {
            // Uncompressed legacy layout: masks from the format table.
            let masks = format
                .channel_masks()
                .expect("uncompressed formats carry a mask table");
            let mut flags = if masks.luminance {
                PixelFormatFlags::LUMINANCE
            } else if masks.signed {
                PixelFormatFlags::BUMP_DUDV
            } else {
                PixelFormatFlags::RGB
            };
            if masks.a != 0 {
                flags |= PixelFormatFlags::ALPHA_PIXELS;
            }
            (
                PixelFormatInfo {
                    size: PIXEL_FORMAT_SIZE,
                    flags,
                    fourcc: [0; 4],
                    rgb_bit_count: masks.bit_count,
                    r_bit_mask: masks.r,
                    g_bit_mask: masks.g,
                    b_bit_mask: masks.b,
                    a_bit_mask: masks.a,
                },
                None,
            )
        }
    }
}

/// Raw-header builder shared by the parser tests.
#[cfg(test)]
pub(crate) mod tests_support {
    use super::*;

    pub fn raw_header(
        fourcc: [u8; 4],
        pf_flags: u32,
        masks: [u32; 4],
        bit_count: u32,
        width: u32,
        height: u32,
        mip_count: u32,
    ) -> Vec<u8> {
        let mut bytes = vec![0u8; BASE_HEADER_LEN];
        bytes[0..4].copy_from_slice(&DDS_MAGIC);
        bytes[4..8].copy_from_slice(&HEADER_SIZE.to_le_bytes());
        bytes[8..12].copy_from_slice(&0x1007u32.to_le_bytes());
        bytes[12..16].copy_from_slice(&height.to_le_bytes());
        bytes[16..20].copy_from_slice(&width.to_le_bytes());
        bytes[28..32].copy_from_slice(&mip_count.to_le_bytes());
        bytes[76..80].copy_from_slice(&PIXEL_FORMAT_SIZE.to_le_bytes());
        bytes[80..84].copy_from_slice(&pf_flags.to_le_bytes());
        bytes[84..88].copy_from_slice(&fourcc);
        bytes[88..92].copy_from_slice(&bit_count.to_le_bytes());
        bytes[92..96].copy_from_slice(&masks[0].to_le_bytes());
        bytes[96..100].copy_from_slice(&masks[1].to_le_bytes());
        bytes[100..104].copy_from_slice(&masks[2].to_le_bytes());
        bytes[104..108].copy_from_slice(&masks[3].to_le_bytes());
        bytes[108..112].copy_from_slice(&0x1000u32.to_le_bytes());
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bc1_header_fields() {
        let header = DdsHeader::for_format(SurfaceFormat::Bc1, 256, 256, 1);
        assert_eq!(header.pixel_format.fourcc, *b"DXT1");
        assert_eq!(header.pitch_or_linear_size, 32768);
        assert!(header.flags.contains(HeaderFlags::LINEAR_SIZE));
        assert!(!header.flags.contains(HeaderFlags::MIPMAP_COUNT));
        assert_eq!(header.caps, CapsFlags::TEXTURE);
    }

    #[test]
    fn test_mipmapped_header_caps() {
        let header = DdsHeader::for_format(SurfaceFormat::Bc3, 256, 256, 9);
        assert!(header.flags.contains(HeaderFlags::MIPMAP_COUNT));
        assert!(header.caps.contains(CapsFlags::COMPLEX));
        assert!(header.caps.contains(CapsFlags::MIPMAP));
        assert_eq!(header.mip_count, 9);
    }

    #[test]
    fn test_bgra_mask_lookup() {
        let header = DdsHeader::for_format(SurfaceFormat::Bgra8, 64, 64, 1);
        let pf = &header.pixel_format;
        assert_eq!(pf.a_bit_mask, 0xFF00_0000);
        assert_eq!(pf.r_bit_mask, 0x00FF_0000);
        assert_eq!(pf.g_bit_mask, 0x0000_FF00);
        assert_eq!(pf.b_bit_mask, 0x0000_00FF);
        assert_eq!(pf.rgb_bit_count, 32);
        assert!(pf.flags.contains(PixelFormatFlags::RGB));
        assert!(pf.flags.contains(PixelFormatFlags::ALPHA_PIXELS));
        // Uncompressed surfaces carry a pitch, not a linear size.
        assert!(header.flags.contains(HeaderFlags::PITCH));
        assert_eq!(header.pitch_or_linear_size, 64 * 4);
    }

    #[test]
    fn test_bc7_gets_extended_block() {
        let header = DdsHeader::for_format(SurfaceFormat::Bc7, 64, 64, 1);
        assert_eq!(header.pixel_format.fourcc, *b"DX10");
        let ext = header.extended.as_ref().unwrap();
        assert_eq!(ext.dxgi_format, DXGI_BC7_UNORM);
        assert_eq!(ext.resource_dimension, RESOURCE_DIMENSION_TEXTURE2D);
        assert_eq!(ext.array_size, 1);
        assert_eq!(header.byte_len(), EXTENDED_HEADER_LEN);
    }

    #[test]
    fn test_to_bytes_lengths() {
        assert_eq!(
            DdsHeader::for_format(SurfaceFormat::Bc1, 64, 64, 1).to_bytes().len(),
            BASE_HEADER_LEN
        );
        assert_eq!(
            DdsHeader::for_format(SurfaceFormat::Bc6h, 64, 64, 1).to_bytes().len(),
            EXTENDED_HEADER_LEN
        );
    }

    #[test]
    fn test_roundtrip_every_format() {
        for format in [
            SurfaceFormat::Bc1,
            SurfaceFormat::Bc2,
            SurfaceFormat::Bc3,
            SurfaceFormat::Bc4,
            SurfaceFormat::Bc5,
            SurfaceFormat::Bc6h,
            SurfaceFormat::Bc7,
            SurfaceFormat::Bgra8,
            SurfaceFormat::Bgr8,
            SurfaceFormat::L8,
            SurfaceFormat::La8,
            SurfaceFormat::Rg8Snorm,
            SurfaceFormat::Rgba16f,
            SurfaceFormat::Rgba32f,
        ] {
            let written = DdsHeader::for_format(format, 512, 256, 4);
            let parsed = DdsHeader::parse(&written.to_bytes()).unwrap();
            assert_eq!(parsed.width, 512, "{format}");
            assert_eq!(parsed.height, 256, "{format}");
            assert_eq!(parsed.mip_count, 4, "{format}");
            assert_eq!(parsed.resolve_format().unwrap(), format, "{format}");
        }
    }

    #[test]
    fn test_v8u8_header_resolves_back() {
        // The signed two-channel mask row written by the lookup table
        // must hit branch (a) of the parse decision table.
        let header = DdsHeader::for_format(SurfaceFormat::Rg8Snorm, 32, 32, 1);
        assert_eq!(header.pixel_format.rgb_bit_count, 16);
        assert_eq!(header.pixel_format.r_bit_mask, 0x00FF);
        assert_eq!(header.pixel_format.g_bit_mask, 0xFF00);
        let parsed = DdsHeader::parse(&header.to_bytes()).unwrap();
        assert_eq!(parsed.resolve_format().unwrap(), SurfaceFormat::Rg8Snorm);
    }
}
