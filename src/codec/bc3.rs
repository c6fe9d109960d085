//! BC3/DXT5 block compression.
//!
//! BC3 compresses 4×4 RGBA blocks to 16 bytes: an interpolated 8-bit
//! alpha block (the BC4 channel layout applied to alpha) followed by a
//! BC1-style color block that always decodes in 4-color mode.

use crate::codec::EncodeParams;
use crate::codec::{bc1, bc2, bc4};

/// Decompress a 16-byte BC3 block into 16 BGRA pixels.
pub fn decode_block(block: &[u8], out: &mut [u8]) {
    bc2::decode_color_opaque(&block[8..16], out);

    let alpha = bc4::decode_channel(&block[0..8]);
    for (i, &a) in alpha.iter().enumerate() {
        out[i * 4 + 3] = a;
    }
}

/// Compress 16 BGRA pixels into a 16-byte BC3 block.
pub fn encode_block(pixels: &[u8], out: &mut [u8], _params: &EncodeParams) {
    let mut alpha = [0u8; 16];
    for (i, a) in alpha.iter_mut().enumerate() {
        *a = pixels[i * 4 + 3];
    }
    bc4::encode_channel(&alpha, &mut out[0..8]);
    bc1::encode_color_opaque(pixels, &mut out[8..16]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> EncodeParams {
        EncodeParams { alpha_threshold: 128 }
    }

    #[test]
    fn test_alpha_gradient_roundtrip() {
        let mut px = [0u8; 64];
        for i in 0..16 {
            px[i * 4..i * 4 + 4].copy_from_slice(&[80, 80, 80, (i * 17) as u8]);
        }
        let mut block = [0u8; 16];
        encode_block(&px, &mut block, &params());
        let mut out = [0u8; 64];
        decode_block(&block, &mut out);

        for i in 0..16 {
            let orig = px[i * 4 + 3] as i16;
            let dec = out[i * 4 + 3] as i16;
            assert!((orig - dec).abs() <= 20, "alpha {orig} decoded as {dec}");
        }
    }

    #[test]
    fn test_alpha_extremes_exact() {
        let mut px = [0u8; 64];
        for i in 0..16 {
            let a = if i < 8 { 0 } else { 255 };
            px[i * 4..i * 4 + 4].copy_from_slice(&[10, 20, 30, a]);
        }
        let mut block = [0u8; 16];
        encode_block(&px, &mut block, &params());
        let mut out = [0u8; 64];
        decode_block(&block, &mut out);

        for i in 0..16 {
            assert_eq!(out[i * 4 + 3], px[i * 4 + 3]);
        }
    }

    #[test]
    fn test_color_survives_transparency() {
        let mut px = [0u8; 64];
        for i in 0..16 {
            px[i * 4..i * 4 + 4].copy_from_slice(&[20, 180, 240, 0]);
        }
        let mut block = [0u8; 16];
        encode_block(&px, &mut block, &params());
        let mut out = [0u8; 64];
        decode_block(&block, &mut out);

        for i in 0..16 {
            assert_eq!(out[i * 4 + 3], 0);
            assert!((out[i * 4 + 2] as i16 - 240).abs() <= 8, "red must survive");
        }
    }

    #[test]
    fn test_block_layout() {
        let mut px = [0u8; 64];
        for i in 0..16 {
            px[i * 4..i * 4 + 4].copy_from_slice(&[0, 0, 0, 200]);
        }
        let mut block = [0u8; 16];
        encode_block(&px, &mut block, &params());

        // Flat alpha: both endpoints store the value.
        assert_eq!(block[0], 200);
        assert_eq!(block[1], 200);
    }
}
