//! BC1/DXT1 block compression.
//!
//! BC1 compresses 4×4 blocks of RGB(A) pixels to 8 bytes:
//! - 2 bytes: color0 (RGB565)
//! - 2 bytes: color1 (RGB565)
//! - 4 bytes: 16 2-bit indices (one per pixel)
//!
//! When `color0 > color1` the palette has four opaque entries; otherwise
//! the block is in 3-color mode and index 3 decodes as transparent black
//! (the DXT1 punch-through convention).

use crate::codec::conversion::{rgb565_to_rgb888, rgb888_to_rgb565};
use crate::codec::optimize::fit_endpoints;
use crate::codec::EncodeParams;

/// Perceptual channel weights shared with the palette search (R, G, B).
const WEIGHTS: [f32; 3] = [3.0, 6.0, 1.0];

/// Error-diffusion weights: right, below-left, below, below-right.
const DIFFUSE: [f32; 4] = [7.0 / 16.0, 3.0 / 16.0, 5.0 / 16.0, 1.0 / 16.0];

/// Decompress an 8-byte BC1 block into 16 BGRA pixels.
pub fn decode_block(block: &[u8], out: &mut [u8]) {
    let c0 = u16::from_le_bytes([block[0], block[1]]);
    let c1 = u16::from_le_bytes([block[2], block[3]]);
    let indices = u32::from_le_bytes([block[4], block[5], block[6], block[7]]);

    let palette = build_palette(c0, c1);

    for i in 0..16 {
        let idx = ((indices >> (i * 2)) & 0x3) as usize;
        out[i * 4..i * 4 + 4].copy_from_slice(&palette[idx]);
    }
}

/// Compress 16 BGRA pixels into an 8-byte BC1 block.
///
/// A block whose pixels are all below the alpha threshold becomes the
/// all-transparent placeholder. Any pixel below the threshold selects
/// 3-color mode; otherwise the full 4-color palette is used.
pub fn encode_block(pixels: &[u8], out: &mut [u8], params: &EncodeParams) {
    let mut below = 0usize;
    let mut opaque_mask = 0u16;
    for i in 0..16 {
        if pixels[i * 4 + 3] < params.alpha_threshold {
            below += 1;
        } else {
            opaque_mask |= 1 << i;
        }
    }

    if below == 16 {
        // color0 = color1 = 0 selects 3-color mode; every index is the
        // transparent entry.
        out[..4].copy_from_slice(&[0, 0, 0, 0]);
        out[4..8].copy_from_slice(&[0xFF, 0xFF, 0xFF, 0xFF]);
        return;
    }

    let three_mode = below > 0;
    encode_color(pixels, out, three_mode, opaque_mask, params.alpha_threshold);
}

/// Encode the color half of a BC2/BC3 block.
///
/// Always 4-color mode; alpha plays no part in endpoint selection.
pub fn encode_color_opaque(pixels: &[u8], out: &mut [u8]) {
    encode_color(pixels, out, false, 0xFFFF, 0);
}

fn encode_color(pixels: &[u8], out: &mut [u8], three_mode: bool, opaque_mask: u16, threshold: u8) {
    let steps = if three_mode { 3 } else { 4 };

    let mut samples = [[0.0f32; 3]; 16];
    for i in 0..16 {
        samples[i] = [
            pixels[i * 4 + 2] as f32,
            pixels[i * 4 + 1] as f32,
            pixels[i * 4] as f32,
        ];
    }
    let fit_mask = if three_mode { opaque_mask } else { 0xFFFF };
    let (e0, e1) = fit_endpoints(&samples, fit_mask, steps);

    let mut q0 = quantize565(&e0);
    let mut q1 = quantize565(&e1);
    if three_mode {
        if q0 > q1 {
            std::mem::swap(&mut q0, &mut q1);
        }
    } else if q0 < q1 {
        std::mem::swap(&mut q0, &mut q1);
    }

    // Re-derive the palette from the stored endpoints so index selection
    // sees exactly what the decoder will reconstruct.
    let palette = build_palette(q0, q1);
    let colors = if q0 > q1 { 4 } else { 3 };

    let mut carried = [[0.0f32; 3]; 16];
    let mut indices = 0u32;
    for y in 0..4usize {
        for x in 0..4usize {
            let i = y * 4 + x;
            if three_mode && pixels[i * 4 + 3] < threshold {
                indices |= 3 << (i * 2);
                continue;
            }

            let corrected = [
                (samples[i][0] + carried[i][0]).clamp(0.0, 255.0),
                (samples[i][1] + carried[i][1]).clamp(0.0, 255.0),
                (samples[i][2] + carried[i][2]).clamp(0.0, 255.0),
            ];

            let mut best = 0usize;
            let mut best_err = f32::MAX;
            for (idx, entry) in palette.iter().enumerate().take(colors) {
                let rgb = [entry[2] as f32, entry[1] as f32, entry[0] as f32];
                let mut err = 0.0;
                for c in 0..3 {
                    let d = (corrected[c] - rgb[c]) * WEIGHTS[c];
                    err += d * d;
                }
                if err < best_err {
                    best_err = err;
                    best = idx;
                }
            }
            indices |= (best as u32) << (i * 2);

            let chosen = &palette[best];
            let diff = [
                corrected[0] - chosen[2] as f32,
                corrected[1] - chosen[1] as f32,
                corrected[2] - chosen[0] as f32,
            ];
            for c in 0..3 {
                if x + 1 < 4 {
                    carried[i + 1][c] += diff[c] * DIFFUSE[0];
                }
                if y + 1 < 4 {
                    if x > 0 {
                        carried[i + 3][c] += diff[c] * DIFFUSE[1];
                    }
                    carried[i + 4][c] += diff[c] * DIFFUSE[2];
                    if x + 1 < 4 {
                        carried[i + 5][c] += diff[c] * DIFFUSE[3];
                    }
                }
            }
        }
    }

    out[0..2].copy_from_slice(&q0.to_le_bytes());
    out[2..4].copy_from_slice(&q1.to_le_bytes());
    out[4..8].copy_from_slice(&indices.to_le_bytes());
}

/// Reconstruct the 4-entry BGRA palette for a stored endpoint pair.
fn build_palette(c0: u16, c1: u16) -> [[u8; 4]; 4] {
    let rgb0 = rgb565_to_rgb888(c0);
    let rgb1 = rgb565_to_rgb888(c1);
    let p0 = [rgb0[2], rgb0[1], rgb0[0], 255];
    let p1 = [rgb1[2], rgb1[1], rgb1[0], 255];

    if c0 > c1 {
        let p2 = [
            ((2 * rgb0[2] as u16 + rgb1[2] as u16) / 3) as u8,
            ((2 * rgb0[1] as u16 + rgb1[1] as u16) / 3) as u8,
            ((2 * rgb0[0] as u16 + rgb1[0] as u16) / 3) as u8,
            255,
        ];
        let p3 = [
            ((rgb0[2] as u16 + 2 * rgb1[2] as u16) / 3) as u8,
            ((rgb0[1] as u16 + 2 * rgb1[1] as u16) / 3) as u8,
            ((rgb0[0] as u16 + 2 * rgb1[0] as u16) / 3) as u8,
            255,
        ];
        [p0, p1, p2, p3]
    } else {
        let p2 = [
            ((rgb0[2] as u16 + rgb1[2] as u16) / 2) as u8,
            ((rgb0[1] as u16 + rgb1[1] as u16) / 2) as u8,
            ((rgb0[0] as u16 + rgb1[0] as u16) / 2) as u8,
            255,
        ];
        [p0, p1, p2, [0, 0, 0, 0]]
    }
}

fn quantize565(e: &[f32; 3]) -> u16 {
    let r = e[0].clamp(0.0, 255.0).round() as u8;
    let g = e[1].clamp(0.0, 255.0).round() as u8;
    let b = e[2].clamp(0.0, 255.0).round() as u8;
    rgb888_to_rgb565(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> EncodeParams {
        EncodeParams { alpha_threshold: 128 }
    }

    fn roundtrip(pixels: &[u8; 64]) -> [u8; 64] {
        let mut block = [0u8; 8];
        encode_block(pixels, &mut block, &params());
        let mut out = [0u8; 64];
        decode_block(&block, &mut out);
        out
    }

    fn solid(bgra: [u8; 4]) -> [u8; 64] {
        let mut px = [0u8; 64];
        for i in 0..16 {
            px[i * 4..i * 4 + 4].copy_from_slice(&bgra);
        }
        px
    }

    #[test]
    fn test_solid_black_roundtrip() {
        let out = roundtrip(&solid([0, 0, 0, 255]));
        for i in 0..16 {
            assert_eq!(&out[i * 4..i * 4 + 4], &[0, 0, 0, 255]);
        }
    }

    #[test]
    fn test_solid_white_roundtrip() {
        let out = roundtrip(&solid([255, 255, 255, 255]));
        for i in 0..16 {
            assert_eq!(&out[i * 4..i * 4 + 4], &[255, 255, 255, 255]);
        }
    }

    #[test]
    fn test_solid_red_within_565_tolerance() {
        // BGRA red.
        let out = roundtrip(&solid([0, 0, 200, 255]));
        for i in 0..16 {
            assert!((out[i * 4 + 2] as i16 - 200).abs() <= 8);
            assert!(out[i * 4] <= 8);
            assert!(out[i * 4 + 1] <= 8);
        }
    }

    #[test]
    fn test_fully_transparent_block_is_placeholder() {
        let mut block = [0u8; 8];
        encode_block(&solid([90, 90, 90, 0]), &mut block, &params());
        assert_eq!(block, [0, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF]);

        let mut out = [0u8; 64];
        decode_block(&block, &mut out);
        for i in 0..16 {
            assert_eq!(out[i * 4 + 3], 0, "pixel {i} should be transparent");
        }
    }

    #[test]
    fn test_partial_transparency_selects_three_color_mode() {
        let mut px = solid([10, 200, 30, 255]);
        // One pixel under the threshold: 3-color mode, not a placeholder.
        px[3] = 0;
        let mut block = [0u8; 8];
        encode_block(&px, &mut block, &params());

        let c0 = u16::from_le_bytes([block[0], block[1]]);
        let c1 = u16::from_le_bytes([block[2], block[3]]);
        assert!(c0 <= c1, "expected 3-color mode, got c0={c0:04X} c1={c1:04X}");

        let mut out = [0u8; 64];
        decode_block(&block, &mut out);
        assert_eq!(out[3], 0, "transparent pixel must stay transparent");
        assert_eq!(out[7], 255, "opaque pixels must stay opaque");
    }

    #[test]
    fn test_two_color_block_recovers_endpoints() {
        let mut px = solid([0, 0, 0, 255]);
        for i in 8..16 {
            px[i * 4..i * 4 + 4].copy_from_slice(&[255, 255, 255, 255]);
        }
        let mut block = [0u8; 8];
        encode_block(&px, &mut block, &params());
        let c0 = u16::from_le_bytes([block[0], block[1]]);
        let c1 = u16::from_le_bytes([block[2], block[3]]);
        assert!(
            (c0 == 0xFFFF && c1 == 0) || (c0 == 0 && c1 == 0xFFFF),
            "expected black/white endpoints, got {c0:04X}/{c1:04X}"
        );
    }

    #[test]
    fn test_gradient_average_error_small() {
        let mut px = [0u8; 64];
        for i in 0..16 {
            let v = (i * 17) as u8;
            px[i * 4..i * 4 + 4].copy_from_slice(&[v, v, v, 255]);
        }
        let out = roundtrip(&px);

        let mut total = 0i32;
        for i in 0..16 {
            for c in 0..3 {
                total += (out[i * 4 + c] as i32 - px[i * 4 + c] as i32).abs();
            }
        }
        let avg = total as f32 / 48.0;
        assert!(avg < 16.0, "average channel error too high: {avg}");
    }

    #[test]
    fn test_decode_three_color_mode_midpoint() {
        // c0 == c1 == mid gray forces 3-color mode.
        let c = rgb888_to_rgb565(128, 128, 128);
        let mut block = [0u8; 8];
        block[0..2].copy_from_slice(&c.to_le_bytes());
        block[2..4].copy_from_slice(&c.to_le_bytes());
        // Index 2 selects the (c0 + c1) / 2 entry.
        block[4..8].copy_from_slice(&0xAAAA_AAAAu32.to_le_bytes());

        let mut out = [0u8; 64];
        decode_block(&block, &mut out);
        let expect = rgb565_to_rgb888(c);
        for i in 0..16 {
            assert_eq!(out[i * 4 + 2], expect[0]);
            assert_eq!(out[i * 4 + 3], 255);
        }
    }
}
