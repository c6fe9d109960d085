//! BC5 two-channel block compression.
//!
//! A BC5 block is two independent BC4 channel blocks, nominally the X and
//! Y components of a tangent-space normal. Decode reconstructs the Z
//! component from the unit-length constraint and stores it in the blue
//! channel.

use crate::codec::bc4;
use crate::codec::EncodeParams;

/// Decompress a 16-byte BC5 block into 16 BGRA pixels.
///
/// Red and green come from the two stored channels; blue is
/// `Z = sqrt(1 - X² - Y²)` on the [-1, 1]-remapped channels, with the
/// neutral value (byte 128) substituted when the operand goes negative.
pub fn decode_block(block: &[u8], out: &mut [u8]) {
    let xs = bc4::decode_channel(&block[0..8]);
    let ys = bc4::decode_channel(&block[8..16]);

    for i in 0..16 {
        out[i * 4 + 2] = xs[i];
        out[i * 4 + 1] = ys[i];
        out[i * 4] = reconstruct_z(xs[i], ys[i]);
        out[i * 4 + 3] = 255;
    }
}

/// Compress the red and green channels of 16 BGRA pixels into a BC5 block.
pub fn encode_block(pixels: &[u8], out: &mut [u8], _params: &EncodeParams) {
    let mut xs = [0u8; 16];
    let mut ys = [0u8; 16];
    for i in 0..16 {
        xs[i] = pixels[i * 4 + 2];
        ys[i] = pixels[i * 4 + 1];
    }
    bc4::encode_channel(&xs, &mut out[0..8]);
    bc4::encode_channel(&ys, &mut out[8..16]);
}

fn reconstruct_z(x: u8, y: u8) -> u8 {
    let fx = x as f32 / 255.0 * 2.0 - 1.0;
    let fy = y as f32 / 255.0 * 2.0 - 1.0;
    let d = 1.0 - fx * fx - fy * fy;
    if d < 0.0 {
        128
    } else {
        ((d.sqrt() + 1.0) / 2.0 * 255.0).round() as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> EncodeParams {
        EncodeParams { alpha_threshold: 128 }
    }

    #[test]
    fn test_channels_roundtrip() {
        let mut px = [0u8; 64];
        for i in 0..16 {
            px[i * 4 + 2] = (i * 17) as u8; // X in red
            px[i * 4 + 1] = 255 - (i * 17) as u8; // Y in green
        }
        let mut block = [0u8; 16];
        encode_block(&px, &mut block, &params());
        let mut out = [0u8; 64];
        decode_block(&block, &mut out);

        for i in 0..16 {
            assert!((out[i * 4 + 2] as i16 - px[i * 4 + 2] as i16).abs() <= 20);
            assert!((out[i * 4 + 1] as i16 - px[i * 4 + 1] as i16).abs() <= 20);
            assert_eq!(out[i * 4 + 3], 255);
        }
    }

    #[test]
    fn test_flat_normal_z_is_one() {
        // X = Y = 128 is the flat normal; Z should decode near 255.
        let mut px = [0u8; 64];
        for i in 0..16 {
            px[i * 4 + 2] = 128;
            px[i * 4 + 1] = 128;
        }
        let mut block = [0u8; 16];
        encode_block(&px, &mut block, &params());
        let mut out = [0u8; 64];
        decode_block(&block, &mut out);

        for i in 0..16 {
            assert!(out[i * 4] >= 253, "flat normal Z = {}", out[i * 4]);
        }
    }

    #[test]
    fn test_out_of_range_normal_clamps_to_neutral() {
        // X = Y = 255 maps to (1, 1): 1 - x² - y² < 0, so Z = 128.
        assert_eq!(reconstruct_z(255, 255), 128);
        assert_eq!(reconstruct_z(0, 0), 128);
    }

    #[test]
    fn test_unit_x_normal() {
        // X = 255 (x = 1), Y = 128 (y ≈ 0): Z ≈ 0 remapped to ~128.
        let z = reconstruct_z(255, 128);
        assert!((z as i16 - 128).abs() <= 3, "z = {z}");
    }

    #[test]
    fn test_halves_are_independent() {
        let mut px = [0u8; 64];
        for i in 0..16 {
            px[i * 4 + 2] = 200;
            px[i * 4 + 1] = 40;
        }
        let mut block = [0u8; 16];
        encode_block(&px, &mut block, &params());

        // Flat channels store the value in both endpoint bytes.
        assert_eq!(block[0], 200);
        assert_eq!(block[1], 200);
        assert_eq!(block[8], 40);
        assert_eq!(block[9], 40);
    }
}
