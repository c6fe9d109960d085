//! DDS header parsing and surface-format resolution.

use crate::codec::uncompressed::ChannelMasks;
use crate::error::TextureError;
use crate::format::SurfaceFormat;
use crate::header::types::*;

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

impl DdsHeader {
    /// Parse a header from the start of `bytes`.
    ///
    /// Validates the magic and the fixed structure sizes; reads the
    /// 20-byte extended block when the FourCC is the `DX10` sentinel.
    pub fn parse(bytes: &[u8]) -> Result<Self, TextureError> {
        if bytes.len() < BASE_HEADER_LEN {
            return Err(TextureError::Format(format!(
                "buffer too small for a DDS header: {} bytes",
                bytes.len()
            )));
        }
        if bytes[0..4] != DDS_MAGIC {
            return Err(TextureError::Format("bad magic, not a DDS file".into()));
        }
        if read_u32(bytes, 4) != HEADER_SIZE {
            return Err(TextureError::Format("header size field is not 124".into()));
        }
        if read_u32(bytes, 76) != PIXEL_FORMAT_SIZE {
            return Err(TextureError::Format("pixel format size field is not 32".into()));
        }

        let mut reserved1 = [0u32; 11];
        for (i, r) in reserved1.iter_mut().enumerate() {
            *r = read_u32(bytes, 32 + i * 4);
        }

        let pixel_format = PixelFormatInfo {
            size: read_u32(bytes, 76),
            flags: PixelFormatFlags::from_bits_retain(read_u32(bytes, 80)),
            fourcc: [bytes[84], bytes[85], bytes[86], bytes[87]],
            rgb_bit_count: read_u32(bytes, 88),
            r_bit_mask: read_u32(bytes, 92),
            g_bit_mask: read_u32(bytes, 96),
            b_bit_mask: read_u32(bytes, 100),
            a_bit_mask: read_u32(bytes, 104),
        };

        let extended = if pixel_format.fourcc == FOURCC_DX10 {
            if bytes.len() < EXTENDED_HEADER_LEN {
                return Err(TextureError::Format(
                    "truncated extended (DX10) header".into(),
                ));
            }
            Some(ExtendedFormatInfo {
                dxgi_format: read_u32(bytes, 128),
                resource_dimension: read_u32(bytes, 132),
                misc_flag: read_u32(bytes, 136),
                array_size: read_u32(bytes, 140),
                misc_flags2: read_u32(bytes, 144),
            })
        } else {
            None
        };

        Ok(DdsHeader {
            flags: HeaderFlags::from_bits_retain(read_u32(bytes, 8)),
            height: read_u32(bytes, 12),
            width: read_u32(bytes, 16),
            pitch_or_linear_size: read_u32(bytes, 20),
            depth: read_u32(bytes, 24),
            mip_count: read_u32(bytes, 28),
            reserved1,
            pixel_format,
            caps: CapsFlags::from_bits_retain(read_u32(bytes, 108)),
            caps2: read_u32(bytes, 112),
            caps3: read_u32(bytes, 116),
            caps4: read_u32(bytes, 120),
            reserved2: read_u32(bytes, 124),
            extended,
        })
    }

    /// Resolve the surface format with the deterministic decision table:
    /// extended header first, then known FourCC codes, then the channel
    /// mask table, defaulting to four-channel RGBA.
    pub fn resolve_format(&self) -> Result<SurfaceFormat, TextureError> {
        if let Some(ext) = &self.extended {
            return resolve_dxgi(ext.dxgi_format);
        }

        let pf = &self.pixel_format;
        match pf.fourcc {
            FOURCC_DXT1 => return Ok(SurfaceFormat::Bc1),
            FOURCC_DXT2 | FOURCC_DXT3 => return Ok(SurfaceFormat::Bc2),
            FOURCC_DXT4 | FOURCC_DXT5 => return Ok(SurfaceFormat::Bc3),
            FOURCC_ATI1 | FOURCC_BC4U => return Ok(SurfaceFormat::Bc4),
            FOURCC_ATI2 | FOURCC_BC5U => return Ok(SurfaceFormat::Bc5),
            _ => {}
        }
        match u32::from_le_bytes(pf.fourcc) {
            D3DFMT_A16B16G16R16F => return Ok(SurfaceFormat::Rgba16f),
            D3DFMT_A32B32G32R32F => return Ok(SurfaceFormat::Rgba32f),
            _ => {}
        }

        // Mask decision table; the branch order matters.
        Ok(if pf.rgb_bit_count == 16
            && pf.r_bit_mask != 0
            && pf.g_bit_mask != 0
            && pf.b_bit_mask == 0
            && pf.a_bit_mask == 0
        {
            SurfaceFormat::Rg8Snorm
        } else if pf.rgb_bit_count == 8
            && pf.r_bit_mask == 0xFF
            && pf.g_bit_mask == 0
            && pf.b_bit_mask == 0
            && pf.a_bit_mask == 0
            && pf.flags.contains(PixelFormatFlags::LUMINANCE)
        {
            SurfaceFormat::L8
        } else if pf.rgb_bit_count == 16 {
            SurfaceFormat::La8
        } else if pf.rgb_bit_count == 24 {
            SurfaceFormat::Bgr8
        } else {
            // Unrecognized FourCC with no usable masks lands here too.
            SurfaceFormat::Bgra8
        })
    }

    /// Whether the surface stores premultiplied alpha. Only the legacy
    /// DXT2/DXT4 tags declare this; the collapsed BC2/BC3 formats are
    /// otherwise straight-alpha.
    pub fn premultiplied_alpha(&self) -> bool {
        self.pixel_format.fourcc == FOURCC_DXT2 || self.pixel_format.fourcc == FOURCC_DXT4
    }

    /// Channel masks for the uncompressed codec: the file's own masks
    /// when it carries any, otherwise the format's synthesized table.
    pub fn channel_masks(&self, format: SurfaceFormat) -> Option<ChannelMasks> {
        let pf = &self.pixel_format;
        let has_masks =
            pf.r_bit_mask | pf.g_bit_mask | pf.b_bit_mask | pf.a_bit_mask != 0;
        if has_masks && pf.rgb_bit_count != 0 {
            return Some(ChannelMasks {
                bit_count: pf.rgb_bit_count,
                r: pf.r_bit_mask,
                g: pf.g_bit_mask,
                b: pf.b_bit_mask,
                a: pf.a_bit_mask,
                luminance: pf.flags.contains(PixelFormatFlags::LUMINANCE),
                signed: pf.flags.contains(PixelFormatFlags::BUMP_DUDV)
                    || format == SurfaceFormat::Rg8Snorm,
            });
        }
        format.channel_masks()
    }
}

fn resolve_dxgi(dxgi: u32) -> Result<SurfaceFormat, TextureError> {
    match dxgi {
        DXGI_BC1_UNORM | DXGI_BC1_UNORM_SRGB => Ok(SurfaceFormat::Bc1),
        DXGI_BC2_UNORM | DXGI_BC2_UNORM_SRGB => Ok(SurfaceFormat::Bc2),
        DXGI_BC3_UNORM | DXGI_BC3_UNORM_SRGB => Ok(SurfaceFormat::Bc3),
        DXGI_BC4_UNORM => Ok(SurfaceFormat::Bc4),
        DXGI_BC5_UNORM => Ok(SurfaceFormat::Bc5),
        DXGI_BC6H_UF16 => Ok(SurfaceFormat::Bc6h),
        DXGI_BC7_UNORM | DXGI_BC7_UNORM_SRGB => Ok(SurfaceFormat::Bc7),
        DXGI_B8G8R8A8_UNORM | DXGI_B8G8R8A8_UNORM_SRGB => Ok(SurfaceFormat::Bgra8),
        DXGI_R8G8B8A8_UNORM | DXGI_R8G8B8A8_UNORM_SRGB => Ok(SurfaceFormat::Rgba8),
        DXGI_R8_UNORM => Ok(SurfaceFormat::L8),
        DXGI_R8G8_SNORM => Ok(SurfaceFormat::Rg8Snorm),
        DXGI_R16G16B16A16_FLOAT => Ok(SurfaceFormat::Rgba16f),
        DXGI_R32G32B32A32_FLOAT => Ok(SurfaceFormat::Rgba32f),
        other => Err(TextureError::UnsupportedFormat(format!(
            "DXGI format {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::write::tests_support::raw_header;

    #[test]
    fn test_rejects_bad_magic() {
        let mut bytes = raw_header(*b"DXT5", 0x4, [0; 4], 0, 64, 64, 1);
        bytes[0] = b'X';
        assert!(matches!(
            DdsHeader::parse(&bytes),
            Err(TextureError::Format(_))
        ));
    }

    #[test]
    fn test_rejects_truncated_buffer() {
        let bytes = raw_header(*b"DXT1", 0x4, [0; 4], 0, 64, 64, 1);
        assert!(DdsHeader::parse(&bytes[..100]).is_err());
    }

    #[test]
    fn test_rejects_bad_size_field() {
        let mut bytes = raw_header(*b"DXT1", 0x4, [0; 4], 0, 64, 64, 1);
        bytes[4] = 100;
        assert!(DdsHeader::parse(&bytes).is_err());
    }

    #[test]
    fn test_parses_legacy_fourcc_formats() {
        for (fourcc, expect) in [
            (*b"DXT1", SurfaceFormat::Bc1),
            (*b"DXT2", SurfaceFormat::Bc2),
            (*b"DXT3", SurfaceFormat::Bc2),
            (*b"DXT4", SurfaceFormat::Bc3),
            (*b"DXT5", SurfaceFormat::Bc3),
            (*b"ATI1", SurfaceFormat::Bc4),
            (*b"ATI2", SurfaceFormat::Bc5),
        ] {
            let bytes = raw_header(fourcc, 0x4, [0; 4], 0, 128, 64, 3);
            let header = DdsHeader::parse(&bytes).unwrap();
            assert_eq!(header.resolve_format().unwrap(), expect);
            assert_eq!(header.width, 128);
            assert_eq!(header.height, 64);
            assert_eq!(header.mip_count, 3);
        }
    }

    #[test]
    fn test_premultiplied_tags() {
        for (fourcc, expect) in [
            (*b"DXT1", false),
            (*b"DXT2", true),
            (*b"DXT3", false),
            (*b"DXT4", true),
            (*b"DXT5", false),
        ] {
            let bytes = raw_header(fourcc, 0x4, [0; 4], 0, 64, 64, 1);
            let header = DdsHeader::parse(&bytes).unwrap();
            assert_eq!(header.premultiplied_alpha(), expect);
        }
    }

    #[test]
    fn test_mask_table_two_channel_signed() {
        // 16-bit, R/G masks set, B/A clear: the signed V8U8 branch.
        let bytes = raw_header([0; 4], 0, [0x00FF, 0xFF00, 0, 0], 16, 32, 32, 1);
        let header = DdsHeader::parse(&bytes).unwrap();
        assert_eq!(header.resolve_format().unwrap(), SurfaceFormat::Rg8Snorm);
    }

    #[test]
    fn test_mask_table_luminance() {
        let bytes = raw_header(
            [0; 4],
            PixelFormatFlags::LUMINANCE.bits(),
            [0xFF, 0, 0, 0],
            8,
            32,
            32,
            1,
        );
        let header = DdsHeader::parse(&bytes).unwrap();
        assert_eq!(header.resolve_format().unwrap(), SurfaceFormat::L8);
    }

    #[test]
    fn test_mask_table_luminance_alpha() {
        // 16-bit with a blue mask set falls through (a) to the L+A branch.
        let bytes = raw_header([0; 4], 0, [0xF800, 0x07E0, 0x001F, 0], 16, 32, 32, 1);
        let header = DdsHeader::parse(&bytes).unwrap();
        assert_eq!(header.resolve_format().unwrap(), SurfaceFormat::La8);
    }

    #[test]
    fn test_mask_table_rgb24() {
        let bytes = raw_header([0; 4], 0, [0xFF0000, 0xFF00, 0xFF, 0], 24, 32, 32, 1);
        let header = DdsHeader::parse(&bytes).unwrap();
        assert_eq!(header.resolve_format().unwrap(), SurfaceFormat::Bgr8);
    }

    #[test]
    fn test_unknown_fourcc_defaults_to_rgba() {
        let bytes = raw_header(*b"ZZZZ", 0x4, [0; 4], 0, 32, 32, 1);
        let header = DdsHeader::parse(&bytes).unwrap();
        assert_eq!(header.resolve_format().unwrap(), SurfaceFormat::Bgra8);
    }

    #[test]
    fn test_numeric_float_fourcc() {
        let bytes = raw_header(113u32.to_le_bytes(), 0x4, [0; 4], 0, 32, 32, 1);
        let header = DdsHeader::parse(&bytes).unwrap();
        assert_eq!(header.resolve_format().unwrap(), SurfaceFormat::Rgba16f);
    }

    #[test]
    fn test_dx10_header_required_length() {
        let bytes = raw_header(FOURCC_DX10, 0x4, [0; 4], 0, 32, 32, 1);
        // 128 bytes only: the extended block is missing.
        assert!(DdsHeader::parse(&bytes[..128]).is_err());
    }

    #[test]
    fn test_dx10_bc7() {
        let mut bytes = raw_header(FOURCC_DX10, 0x4, [0; 4], 0, 32, 32, 1);
        bytes.extend_from_slice(&DXGI_BC7_UNORM.to_le_bytes());
        bytes.extend_from_slice(&RESOURCE_DIMENSION_TEXTURE2D.to_le_bytes());
        bytes.extend_from_slice(&[0; 4]);
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&[0; 4]);

        let header = DdsHeader::parse(&bytes).unwrap();
        assert_eq!(header.resolve_format().unwrap(), SurfaceFormat::Bc7);
        assert_eq!(header.byte_len(), EXTENDED_HEADER_LEN);
    }

    #[test]
    fn test_dx10_signed_bc6_unsupported() {
        let mut bytes = raw_header(FOURCC_DX10, 0x4, [0; 4], 0, 32, 32, 1);
        bytes.extend_from_slice(&DXGI_BC6H_SF16.to_le_bytes());
        bytes.extend_from_slice(&RESOURCE_DIMENSION_TEXTURE2D.to_le_bytes());
        bytes.extend_from_slice(&[0; 12]);

        let header = DdsHeader::parse(&bytes).unwrap();
        assert!(matches!(
            header.resolve_format(),
            Err(TextureError::UnsupportedFormat(_))
        ));
    }
}
