//! BC6H block compression (unsigned half-float HDR).
//!
//! BC6H packs 4×4 RGB blocks of half-float data into 16 bytes across 14
//! modes: ten two-subset modes with delta-compressed endpoints and four
//! one-subset modes. Each mode scatters its endpoint bits in a published
//! irregular order; the layouts below are transcribed as op tables and
//! executed by a small interpreter. The encoder emits mode 11 (one
//! subset, 10-bit endpoints, no transform, 4-bit indices).
//!
//! Decoded pixels are BGRA with 16-bit components holding half-float bit
//! patterns; alpha is 1.0 (0x3C00).

use crate::codec::bc7::{ANCHOR_SECOND_2, PARTITION_2, WEIGHTS_3, WEIGHTS_4};
use crate::codec::bits::{BitReader, BitWriter};
use crate::codec::optimize::fit_endpoints;
use crate::codec::EncodeParams;

/// Opaque alpha as half-float bits.
const HALF_ONE: u16 = 0x3C00;

/// One field-extraction step: `count` block bits land in endpoint field
/// `field` starting at bit `shift` (ascending). Reversed runs (mode 14)
/// are spelled out as single-bit ops.
struct Op(u8, u8, u8);

// Field ids: endpoint (w, x, y, z) × channel (r, g, b), then the
// partition selector. `ep = id / 3`, `channel = id % 3`.
const RW: u8 = 0;
const GW: u8 = 1;
const BW: u8 = 2;
const RX: u8 = 3;
const GX: u8 = 4;
const BX: u8 = 5;
const RY: u8 = 6;
const GY: u8 = 7;
const BY: u8 = 8;
const RZ: u8 = 9;
const GZ: u8 = 10;
const BZ: u8 = 11;
const D: u8 = 12;

struct Bc6Mode {
    /// Endpoint precision in bits.
    epb: u8,
    /// Delta widths (r, g, b) for transformed modes.
    delta: Option<[u8; 3]>,
    /// 1 or 2 subsets.
    subsets: u8,
    ops: &'static [Op],
}

#[rustfmt::skip]
const MODE_1: &[Op] = &[
    Op(GY,4,1), Op(BY,4,1), Op(BZ,4,1), Op(RW,0,10), Op(GW,0,10), Op(BW,0,10),
    Op(RX,0,5), Op(GZ,4,1), Op(GY,0,4), Op(GX,0,5), Op(BZ,0,1), Op(GZ,0,4),
    Op(BX,0,5), Op(BZ,1,1), Op(BY,0,4), Op(RY,0,5), Op(BZ,2,1), Op(RZ,0,5),
    Op(BZ,3,1), Op(D,0,5),
];

#[rustfmt::skip]
const MODE_2: &[Op] = &[
    Op(GY,5,1), Op(GZ,4,1), Op(GZ,5,1), Op(RW,0,7), Op(BZ,0,1), Op(BZ,1,1),
    Op(BY,4,1), Op(GW,0,7), Op(BY,5,1), Op(BZ,2,1), Op(GY,4,1), Op(BW,0,7),
    Op(BZ,3,1), Op(BZ,5,1), Op(BZ,4,1), Op(RX,0,6), Op(GY,0,4), Op(GX,0,6),
    Op(GZ,0,4), Op(BX,0,6), Op(BY,0,4), Op(RY,0,6), Op(RZ,0,6), Op(D,0,5),
];

#[rustfmt::skip]
const MODE_3: &[Op] = &[
    Op(RW,0,10), Op(GW,0,10), Op(BW,0,10), Op(RX,0,5), Op(RW,10,1), Op(GY,0,4),
    Op(GX,0,4), Op(GW,10,1), Op(BZ,0,1), Op(GZ,0,4), Op(BX,0,4), Op(BW,10,1),
    Op(BZ,1,1), Op(BY,0,4), Op(RY,0,5), Op(BZ,2,1), Op(RZ,0,5), Op(BZ,3,1),
    Op(D,0,5),
];

#[rustfmt::skip]
const MODE_4: &[Op] = &[
    Op(RW,0,10), Op(GW,0,10), Op(BW,0,10), Op(RX,0,4), Op(RW,10,1), Op(GZ,4,1),
    Op(GY,0,4), Op(GX,0,5), Op(GW,10,1), Op(GZ,0,4), Op(BX,0,4), Op(BW,10,1),
    Op(BZ,1,1), Op(BY,0,4), Op(RY,0,4), Op(BZ,0,1), Op(BZ,2,1), Op(RZ,0,4),
    Op(GY,4,1), Op(BZ,3,1), Op(D,0,5),
];

#[rustfmt::skip]
const MODE_5: &[Op] = &[
    Op(RW,0,10), Op(GW,0,10), Op(BW,0,10), Op(RX,0,4), Op(RW,10,1), Op(BY,4,1),
    Op(GY,0,4), Op(GX,0,4), Op(GW,10,1), Op(BZ,0,1), Op(GZ,0,4), Op(BX,0,5),
    Op(BW,10,1), Op(BY,0,4), Op(RY,0,4), Op(BZ,1,1), Op(BZ,2,1), Op(RZ,0,4),
    Op(BZ,4,1), Op(BZ,3,1), Op(D,0,5),
];

#[rustfmt::skip]
const MODE_6: &[Op] = &[
    Op(RW,0,9), Op(BY,4,1), Op(GW,0,9), Op(GY,4,1), Op(BW,0,9), Op(BZ,4,1),
    Op(RX,0,5), Op(GZ,4,1), Op(GY,0,4), Op(GX,0,5), Op(BZ,0,1), Op(GZ,0,4),
    Op(BX,0,5), Op(BZ,1,1), Op(BY,0,4), Op(RY,0,5), Op(BZ,2,1), Op(RZ,0,5),
    Op(BZ,3,1), Op(D,0,5),
];

#[rustfmt::skip]
const MODE_7: &[Op] = &[
    Op(RW,0,8), Op(GZ,4,1), Op(BY,4,1), Op(GW,0,8), Op(BZ,2,1), Op(GY,4,1),
    Op(BW,0,8), Op(BZ,3,1), Op(BZ,4,1), Op(RX,0,6), Op(GY,0,4), Op(GX,0,5),
    Op(BZ,0,1), Op(GZ,0,4), Op(BX,0,5), Op(BZ,1,1), Op(BY,0,4), Op(RY,0,6),
    Op(RZ,0,6), Op(D,0,5),
];

#[rustfmt::skip]
const MODE_8: &[Op] = &[
    Op(RW,0,8), Op(BZ,0,1), Op(BY,4,1), Op(GW,0,8), Op(GY,5,1), Op(GY,4,1),
    Op(BW,0,8), Op(GZ,5,1), Op(BZ,4,1), Op(RX,0,5), Op(GZ,4,1), Op(GY,0,4),
    Op(GX,0,6), Op(GZ,0,4), Op(BX,0,5), Op(BZ,1,1), Op(BY,0,4), Op(RY,0,5),
    Op(BZ,2,1), Op(RZ,0,5), Op(BZ,3,1), Op(D,0,5),
];

#[rustfmt::skip]
const MODE_9: &[Op] = &[
    Op(RW,0,8), Op(BZ,1,1), Op(BY,4,1), Op(GW,0,8), Op(BY,5,1), Op(GY,4,1),
    Op(BW,0,8), Op(BZ,5,1), Op(BZ,4,1), Op(RX,0,5), Op(GZ,4,1), Op(GY,0,4),
    Op(GX,0,5), Op(BZ,0,1), Op(GZ,0,4), Op(BX,0,6), Op(BY,0,4), Op(RY,0,5),
    Op(BZ,2,1), Op(RZ,0,5), Op(BZ,3,1), Op(D,0,5),
];

#[rustfmt::skip]
const MODE_10: &[Op] = &[
    Op(RW,0,6), Op(GZ,4,1), Op(BZ,0,1), Op(BZ,1,1), Op(BY,4,1), Op(GW,0,6),
    Op(GY,5,1), Op(BY,5,1), Op(BZ,2,1), Op(GY,4,1), Op(BW,0,6), Op(GZ,5,1),
    Op(BZ,3,1), Op(BZ,5,1), Op(BZ,4,1), Op(RX,0,6), Op(GY,0,4), Op(GX,0,6),
    Op(GZ,0,4), Op(BX,0,6), Op(BY,0,4), Op(RY,0,6), Op(RZ,0,6), Op(D,0,5),
];

#[rustfmt::skip]
const MODE_11: &[Op] = &[
    Op(RW,0,10), Op(GW,0,10), Op(BW,0,10), Op(RX,0,10), Op(GX,0,10), Op(BX,0,10),
];

#[rustfmt::skip]
const MODE_12: &[Op] = &[
    Op(RW,0,10), Op(GW,0,10), Op(BW,0,10), Op(RX,0,9), Op(RW,10,1), Op(GX,0,9),
    Op(GW,10,1), Op(BX,0,9), Op(BW,10,1),
];

#[rustfmt::skip]
const MODE_13: &[Op] = &[
    Op(RW,0,10), Op(GW,0,10), Op(BW,0,10), Op(RX,0,8), Op(RW,10,1), Op(RW,11,1),
    Op(GX,0,8), Op(GW,10,1), Op(GW,11,1), Op(BX,0,8), Op(BW,10,1), Op(BW,11,1),
];

// Mode 14's high endpoint bits are stored most-significant first.
#[rustfmt::skip]
const MODE_14: &[Op] = &[
    Op(RW,0,10), Op(GW,0,10), Op(BW,0,10),
    Op(RX,0,4), Op(RW,15,1), Op(RW,14,1), Op(RW,13,1), Op(RW,12,1), Op(RW,11,1), Op(RW,10,1),
    Op(GX,0,4), Op(GW,15,1), Op(GW,14,1), Op(GW,13,1), Op(GW,12,1), Op(GW,11,1), Op(GW,10,1),
    Op(BX,0,4), Op(BW,15,1), Op(BW,14,1), Op(BW,13,1), Op(BW,12,1), Op(BW,11,1), Op(BW,10,1),
];

/// Map a 5-bit mode code to its layout; `None` marks reserved codes.
fn mode_for_code(code: u32) -> Option<Bc6Mode> {
    let m = |epb, delta, subsets, ops| Some(Bc6Mode { epb, delta, subsets, ops });
    match code {
        0 => m(10, Some([5, 5, 5]), 2, MODE_1),
        1 => m(7, Some([6, 6, 6]), 2, MODE_2),
        2 => m(11, Some([5, 4, 4]), 2, MODE_3),
        6 => m(11, Some([4, 5, 4]), 2, MODE_4),
        10 => m(11, Some([4, 4, 5]), 2, MODE_5),
        14 => m(9, Some([5, 5, 5]), 2, MODE_6),
        18 => m(8, Some([6, 5, 5]), 2, MODE_7),
        22 => m(8, Some([5, 6, 5]), 2, MODE_8),
        26 => m(8, Some([5, 5, 6]), 2, MODE_9),
        30 => m(6, None, 2, MODE_10),
        3 => m(10, None, 1, MODE_11),
        7 => m(11, Some([9, 9, 9]), 1, MODE_12),
        11 => m(12, Some([8, 8, 8]), 1, MODE_13),
        15 => m(16, Some([4, 4, 4]), 1, MODE_14),
        _ => None,
    }
}

/// Decompress a 16-byte BC6H (unsigned) block into 16 BGRA pixels of
/// half-float bits.
pub fn decode_block(block: &[u8], out: &mut [u8]) {
    let mut reader = BitReader::new(block);

    let first = reader.read(2);
    let code = if first < 2 { first } else { first | (reader.read(3) << 2) };

    let mode = match mode_for_code(code) {
        Some(m) => m,
        None => {
            // Reserved mode: decode as black.
            for i in 0..16 {
                write_pixel(out, i, [0, 0, 0]);
            }
            return;
        }
    };

    // Execute the field program.
    let mut endpoints = [[0u32; 3]; 4]; // [w, x, y, z][r, g, b]
    let mut partition = 0usize;
    for op in mode.ops {
        let value = reader.read(op.2 as usize);
        if op.0 == D {
            partition = value as usize;
        } else {
            let ep = (op.0 / 3) as usize;
            let ch = (op.0 % 3) as usize;
            endpoints[ep][ch] |= value << op.1;
        }
    }

    // Transformed modes store x/y/z as signed deltas from w.
    if let Some(delta) = mode.delta {
        let epb = mode.epb as u32;
        let mask = (1u32 << epb) - 1;
        let base = endpoints[0];
        let used = if mode.subsets == 2 { 4 } else { 2 };
        for ep in 1..used {
            for ch in 0..3 {
                let d = sign_extend(endpoints[ep][ch], delta[ch] as u32);
                endpoints[ep][ch] = (base[ch].wrapping_add(d as u32)) & mask;
            }
        }
    }

    let used = if mode.subsets == 2 { 4 } else { 2 };
    let mut unq = [[0u32; 3]; 4];
    for ep in 0..used {
        for ch in 0..3 {
            unq[ep][ch] = unquantize(endpoints[ep][ch], mode.epb as u32);
        }
    }

    // Index data: 3-bit for two subsets, 4-bit for one.
    let index_bits = if mode.subsets == 2 { 3 } else { 4 };
    let mut indices = [0usize; 16];
    for i in 0..16 {
        let subset = if mode.subsets == 2 {
            PARTITION_2[partition][i] as usize
        } else {
            0
        };
        let anchor = if subset == 0 {
            0
        } else {
            ANCHOR_SECOND_2[partition] as usize
        };
        let bits = if i == anchor { index_bits - 1 } else { index_bits };
        indices[i] = reader.read(bits) as usize;
    }

    for i in 0..16 {
        let subset = if mode.subsets == 2 {
            PARTITION_2[partition][i] as usize
        } else {
            0
        };
        let w = if index_bits == 3 {
            WEIGHTS_3[indices[i]]
        } else {
            WEIGHTS_4[indices[i]]
        };
        let e0 = &unq[subset * 2];
        let e1 = &unq[subset * 2 + 1];

        let mut rgb = [0u16; 3];
        for ch in 0..3 {
            let v = ((64 - w) * e0[ch] + w * e1[ch] + 32) >> 6;
            rgb[ch] = finish_unquantize(v);
        }
        write_pixel(out, i, rgb);
    }
}

/// Compress 16 BGRA half-float pixels into a BC6H block (mode 11).
pub fn encode_block(pixels: &[u8], out: &mut [u8], _params: &EncodeParams) {
    // Work on half bit patterns: monotonic for non-negative values, and
    // the closest linear proxy for what the format interpolates.
    let mut samples = [[0.0f32; 3]; 16];
    for i in 0..16 {
        let b = u16::from_le_bytes([pixels[i * 8], pixels[i * 8 + 1]]);
        let g = u16::from_le_bytes([pixels[i * 8 + 2], pixels[i * 8 + 3]]);
        let r = u16::from_le_bytes([pixels[i * 8 + 4], pixels[i * 8 + 5]]);
        samples[i] = [half_bits_clamped(r), half_bits_clamped(g), half_bits_clamped(b)];
    }

    let (e0, e1) = fit_endpoints(&samples, 0xFFFF, 16);
    let mut q0 = quantize10(&e0);
    let mut q1 = quantize10(&e1);

    let d0 = dequantize10(&q0);
    let d1 = dequantize10(&q1);
    let mut indices = [0usize; 16];
    for (i, s) in samples.iter().enumerate() {
        indices[i] = nearest_palette_entry(s, &d0, &d1);
    }

    // Anchor pixel drops its top index bit; swap endpoints when needed.
    if indices[0] >= 8 {
        std::mem::swap(&mut q0, &mut q1);
        for idx in indices.iter_mut() {
            *idx = 15 - *idx;
        }
    }

    out[..16].fill(0);
    let mut writer = BitWriter::new(out);
    writer.write(3, 5); // mode 11
    for ch in 0..3 {
        writer.write(q0[ch], 10);
    }
    for ch in 0..3 {
        writer.write(q1[ch], 10);
    }
    writer.write(indices[0] as u32, 3);
    for &idx in &indices[1..] {
        writer.write(idx as u32, 4);
    }
}

fn write_pixel(out: &mut [u8], i: usize, rgb: [u16; 3]) {
    out[i * 8..i * 8 + 2].copy_from_slice(&rgb[2].to_le_bytes());
    out[i * 8 + 2..i * 8 + 4].copy_from_slice(&rgb[1].to_le_bytes());
    out[i * 8 + 4..i * 8 + 6].copy_from_slice(&rgb[0].to_le_bytes());
    out[i * 8 + 6..i * 8 + 8].copy_from_slice(&HALF_ONE.to_le_bytes());
}

fn sign_extend(value: u32, bits: u32) -> i32 {
    let shift = 32 - bits;
    ((value << shift) as i32) >> shift
}

/// Expand an endpoint to the 17-bit interpolation range.
fn unquantize(value: u32, epb: u32) -> u32 {
    if epb >= 15 {
        value
    } else if value == 0 {
        0
    } else if value == (1 << epb) - 1 {
        0xFFFF
    } else {
        ((value << 16) + 0x8000) >> epb
    }
}

/// Scale an interpolated value back to half-float bits.
fn finish_unquantize(value: u32) -> u16 {
    ((value * 31) >> 6) as u16
}

/// Treat non-finite/negative halves as zero; BC6H UF16 has no sign bit.
fn half_bits_clamped(bits: u16) -> f32 {
    if bits & 0x8000 != 0 || bits > 0x7BFF {
        0.0
    } else {
        bits as f32
    }
}

fn quantize10(e: &[f32; 3]) -> [u32; 3] {
    let mut q = [0u32; 3];
    for ch in 0..3 {
        let target = e[ch].clamp(0.0, 0x7BFF as f32);
        // Inverse of unquantize followed by finish_unquantize.
        q[ch] = ((target / 31.0).round() as u32).min(1023);
    }
    q
}

fn dequantize10(q: &[u32; 3]) -> [u32; 3] {
    let mut out = [0u32; 3];
    for ch in 0..3 {
        out[ch] = unquantize(q[ch], 10);
    }
    out
}

fn nearest_palette_entry(s: &[f32; 3], e0: &[u32; 3], e1: &[u32; 3]) -> usize {
    let mut best = 0usize;
    let mut best_err = f32::MAX;
    for (k, &w) in WEIGHTS_4.iter().enumerate() {
        let mut err = 0.0f32;
        for ch in 0..3 {
            let v = finish_unquantize(((64 - w) * e0[ch] + w * e1[ch] + 32) >> 6) as f32;
            let d = s[ch] - v;
            err += d * d;
        }
        if err < best_err {
            best_err = err;
            best = k;
        }
    }
    best
}
