//! BC7 block compression.
//!
//! BC7 packs 4×4 LDR RGBA blocks into 16 bytes using one of eight modes
//! that trade off subset count, endpoint precision and index width. The
//! decoder implements all eight published mode layouts; the encoder emits
//! mode 6 (single subset, 7.7.7.7 endpoints with per-endpoint P-bits,
//! 4-bit indices), which preserves flat-color blocks exactly.

use crate::codec::bits::{BitReader, BitWriter};
use crate::codec::optimize::fit_endpoints;
use crate::codec::EncodeParams;

/// Per-mode layout parameters, indexed by mode number.
struct ModeInfo {
    /// Number of endpoint pair subsets (1, 2 or 3).
    subsets: usize,
    /// Partition selector width in bits.
    partition_bits: usize,
    /// Rotation field width (modes 4/5).
    rotation_bits: usize,
    /// Index-selection bit (mode 4 only).
    index_selection_bits: usize,
    /// Color endpoint width per channel.
    color_bits: usize,
    /// Alpha endpoint width (0 = opaque mode).
    alpha_bits: usize,
    /// One P-bit per endpoint.
    endpoint_pbits: bool,
    /// One P-bit shared by both endpoints of a subset.
    shared_pbits: bool,
    /// Primary index width.
    index_bits: usize,
    /// Secondary index width (modes 4/5).
    index_bits2: usize,
}

const MODES: [ModeInfo; 8] = [
    ModeInfo { subsets: 3, partition_bits: 4, rotation_bits: 0, index_selection_bits: 0, color_bits: 4, alpha_bits: 0, endpoint_pbits: true, shared_pbits: false, index_bits: 3, index_bits2: 0 },
    ModeInfo { subsets: 2, partition_bits: 6, rotation_bits: 0, index_selection_bits: 0, color_bits: 6, alpha_bits: 0, endpoint_pbits: false, shared_pbits: true, index_bits: 3, index_bits2: 0 },
    ModeInfo { subsets: 3, partition_bits: 6, rotation_bits: 0, index_selection_bits: 0, color_bits: 5, alpha_bits: 0, endpoint_pbits: false, shared_pbits: false, index_bits: 2, index_bits2: 0 },
    ModeInfo { subsets: 2, partition_bits: 6, rotation_bits: 0, index_selection_bits: 0, color_bits: 7, alpha_bits: 0, endpoint_pbits: true, shared_pbits: false, index_bits: 2, index_bits2: 0 },
    ModeInfo { subsets: 1, partition_bits: 0, rotation_bits: 2, index_selection_bits: 1, color_bits: 5, alpha_bits: 6, endpoint_pbits: false, shared_pbits: false, index_bits: 2, index_bits2: 3 },
    ModeInfo { subsets: 1, partition_bits: 0, rotation_bits: 2, index_selection_bits: 0, color_bits: 7, alpha_bits: 8, endpoint_pbits: false, shared_pbits: false, index_bits: 2, index_bits2: 2 },
    ModeInfo { subsets: 1, partition_bits: 0, rotation_bits: 0, index_selection_bits: 0, color_bits: 7, alpha_bits: 7, endpoint_pbits: true, shared_pbits: false, index_bits: 4, index_bits2: 0 },
    ModeInfo { subsets: 2, partition_bits: 6, rotation_bits: 0, index_selection_bits: 0, color_bits: 5, alpha_bits: 5, endpoint_pbits: true, shared_pbits: false, index_bits: 2, index_bits2: 0 },
];

/// Interpolation weights for 2-, 3- and 4-bit indices.
pub(crate) const WEIGHTS_2: [u32; 4] = [0, 21, 43, 64];
pub(crate) const WEIGHTS_3: [u32; 8] = [0, 9, 18, 27, 37, 46, 55, 64];
pub(crate) const WEIGHTS_4: [u32; 16] = [0, 4, 9, 13, 17, 21, 26, 30, 34, 38, 43, 47, 51, 55, 60, 64];

fn weight(index: usize, bits: usize) -> u32 {
    match bits {
        2 => WEIGHTS_2[index],
        3 => WEIGHTS_3[index],
        _ => WEIGHTS_4[index],
    }
}

/// Two-subset partition assignments, one row per 6-bit partition id.
#[rustfmt::skip]
pub(crate) const PARTITION_2: [[u8; 16]; 64] = [
    [0,0,1,1,0,0,1,1,0,0,1,1,0,0,1,1], [0,0,0,1,0,0,0,1,0,0,0,1,0,0,0,1],
    [0,1,1,1,0,1,1,1,0,1,1,1,0,1,1,1], [0,0,0,1,0,0,1,1,0,0,1,1,0,1,1,1],
    [0,0,0,0,0,0,0,1,0,0,0,1,0,0,1,1], [0,0,1,1,0,1,1,1,0,1,1,1,1,1,1,1],
    [0,0,0,1,0,0,1,1,0,1,1,1,1,1,1,1], [0,0,0,0,0,0,0,1,0,0,1,1,0,1,1,1],
    [0,0,0,0,0,0,0,0,0,0,0,1,0,0,1,1], [0,0,1,1,0,1,1,1,1,1,1,1,1,1,1,1],
    [0,0,0,0,0,0,0,1,0,1,1,1,1,1,1,1], [0,0,0,0,0,0,0,0,0,0,0,1,0,1,1,1],
    [0,0,0,1,0,1,1,1,1,1,1,1,1,1,1,1], [0,0,0,0,0,0,0,0,1,1,1,1,1,1,1,1],
    [0,0,0,0,1,1,1,1,1,1,1,1,1,1,1,1], [0,0,0,0,0,0,0,0,0,0,0,0,1,1,1,1],
    [0,0,0,0,1,0,0,0,1,1,1,0,1,1,1,1], [0,1,1,1,0,0,0,1,0,0,0,0,0,0,0,0],
    [0,0,0,0,0,0,0,0,1,0,0,0,1,1,1,0], [0,1,1,1,0,0,1,1,0,0,0,1,0,0,0,0],
    [0,0,1,1,0,0,0,1,0,0,0,0,0,0,0,0], [0,0,0,0,1,0,0,0,1,1,0,0,1,1,1,0],
    [0,0,0,0,0,0,0,0,1,0,0,0,1,1,0,0], [0,1,1,1,0,0,1,1,0,0,1,1,0,0,0,1],
    [0,0,1,1,0,0,0,1,0,0,0,1,0,0,0,0], [0,0,0,0,1,0,0,0,1,0,0,0,1,1,0,0],
    [0,1,1,0,0,1,1,0,0,1,1,0,0,1,1,0], [0,0,1,1,0,1,1,0,0,1,1,0,1,1,0,0],
    [0,0,0,1,0,1,1,1,1,1,1,0,1,0,0,0], [0,0,0,0,1,1,1,1,1,1,1,1,0,0,0,0],
    [0,1,1,1,0,0,0,1,1,0,0,0,1,1,1,0], [0,0,1,1,1,0,0,1,1,0,0,1,1,1,0,0],
    [0,1,0,1,0,1,0,1,0,1,0,1,0,1,0,1], [0,0,0,0,1,1,1,1,0,0,0,0,1,1,1,1],
    [0,1,0,1,1,0,1,0,0,1,0,1,1,0,1,0], [0,0,1,1,0,0,1,1,1,1,0,0,1,1,0,0],
    [0,0,1,1,1,1,0,0,0,0,1,1,1,1,0,0], [0,1,0,1,0,1,0,1,1,0,1,0,1,0,1,0],
    [0,1,1,0,1,0,0,1,0,1,1,0,1,0,0,1], [0,1,0,1,1,0,1,0,1,0,1,0,0,1,0,1],
    [0,1,1,1,0,0,1,1,1,1,0,0,1,1,1,0], [0,0,0,1,0,0,1,1,1,1,0,0,1,0,0,0],
    [0,0,1,1,0,0,1,0,0,1,0,0,1,1,0,0], [0,0,1,1,1,0,1,1,1,1,0,1,1,1,0,0],
    [0,1,1,0,1,0,0,1,1,0,0,1,0,1,1,0], [0,0,1,1,1,1,0,0,1,1,0,0,0,0,1,1],
    [0,1,1,0,0,1,1,0,1,0,0,1,1,0,0,1], [0,0,0,0,0,1,1,0,0,1,1,0,0,0,0,0],
    [0,1,0,0,1,1,1,0,0,1,0,0,0,0,0,0], [0,0,1,0,0,1,1,1,0,0,1,0,0,0,0,0],
    [0,0,0,0,0,0,1,0,0,1,1,1,0,0,1,0], [0,0,0,0,0,1,0,0,1,1,1,0,0,1,0,0],
    [0,1,1,0,1,1,0,0,1,0,0,1,0,0,1,1], [0,0,1,1,0,1,1,0,1,1,0,0,1,0,0,1],
    [0,1,1,0,0,0,1,1,1,0,0,1,1,1,0,0], [0,0,1,1,1,0,0,1,1,1,0,0,0,1,1,0],
    [0,1,1,0,1,1,0,0,1,1,0,0,1,0,0,1], [0,1,1,0,0,0,1,1,0,0,1,1,1,0,0,1],
    [0,1,1,1,1,1,1,0,1,0,0,0,0,0,0,1], [0,0,0,1,1,0,0,0,1,1,1,0,0,1,1,1],
    [0,0,0,0,1,1,1,1,0,0,1,1,0,0,1,1], [0,0,1,1,0,0,1,1,1,1,1,1,0,0,0,0],
    [0,0,1,0,0,0,1,0,1,1,1,0,1,1,1,0], [0,1,0,0,0,1,0,0,1,1,0,1,1,1,0,1],
];

/// Three-subset partition assignments.
#[rustfmt::skip]
pub(crate) const PARTITION_3: [[u8; 16]; 64] = [
    [0,0,1,1,0,0,1,1,0,2,2,1,2,2,2,2], [0,0,0,1,0,0,1,1,2,2,1,1,2,2,2,1],
    [0,0,0,0,2,0,0,1,2,2,1,1,2,2,1,1], [0,2,2,2,0,0,2,2,0,0,1,1,0,1,1,1],
    [0,0,0,0,0,0,0,0,1,1,2,2,1,1,2,2], [0,0,1,1,0,0,1,1,0,0,2,2,0,0,2,2],
    [0,0,2,2,0,0,2,2,1,1,1,1,1,1,1,1], [0,0,1,1,0,0,1,1,2,2,1,1,2,2,1,1],
    [0,0,0,0,0,0,0,0,1,1,1,1,2,2,2,2], [0,0,0,0,1,1,1,1,1,1,1,1,2,2,2,2],
    [0,0,0,0,1,1,1,1,2,2,2,2,2,2,2,2], [0,0,1,2,0,0,1,2,0,0,1,2,0,0,1,2],
    [0,1,1,2,0,1,1,2,0,1,1,2,0,1,1,2], [0,1,2,2,0,1,2,2,0,1,2,2,0,1,2,2],
    [0,0,1,1,0,1,1,2,1,1,2,2,1,2,2,2], [0,0,1,1,2,0,0,1,2,2,0,0,2,2,2,0],
    [0,0,0,1,0,0,1,1,0,1,1,2,1,1,2,2], [0,1,1,1,0,0,1,1,2,0,0,1,2,2,0,0],
    [0,0,0,0,1,1,2,2,1,1,2,2,1,1,2,2], [0,0,2,2,0,0,2,2,0,0,2,2,1,1,1,1],
    [0,1,1,1,0,1,1,1,0,2,2,2,0,2,2,2], [0,0,0,1,0,0,0,1,2,2,2,1,2,2,2,1],
    [0,0,0,0,0,0,1,1,0,1,2,2,0,1,2,2], [0,0,0,0,1,1,0,0,2,2,1,0,2,2,1,0],
    [0,1,2,2,0,1,2,2,0,0,1,1,0,0,0,0], [0,0,1,2,0,0,1,2,1,1,2,2,2,2,2,2],
    [0,1,1,0,1,2,2,1,1,2,2,1,0,1,1,0], [0,0,0,0,0,1,1,0,1,2,2,1,1,2,2,1],
    [0,0,2,2,1,1,0,2,1,1,0,2,0,0,2,2], [0,1,1,0,0,1,1,0,2,0,0,2,2,2,2,2],
    [0,0,1,1,0,1,2,2,0,1,2,2,0,0,1,1], [0,0,0,0,2,0,0,0,2,2,1,1,2,2,2,1],
    [0,0,0,0,0,0,0,2,1,1,2,2,1,2,2,2], [0,2,2,2,0,0,2,2,0,0,1,2,0,0,1,1],
    [0,0,1,1,0,0,1,2,0,0,2,2,0,2,2,2], [0,1,2,0,0,1,2,0,0,1,2,0,0,1,2,0],
    [0,0,0,0,1,1,1,1,2,2,2,2,0,0,0,0], [0,1,2,0,1,2,0,1,2,0,1,2,0,1,2,0],
    [0,1,2,0,2,0,1,2,1,2,0,1,0,1,2,0], [0,0,1,1,2,2,0,0,1,1,2,2,0,0,1,1],
    [0,0,1,1,1,1,2,2,2,2,0,0,0,0,1,1], [0,1,0,1,0,1,0,1,2,2,2,2,2,2,2,2],
    [0,0,0,0,0,0,0,0,2,1,2,1,2,1,2,1], [0,0,2,2,1,1,2,2,0,0,2,2,1,1,2,2],
    [0,0,2,2,0,0,1,1,0,0,2,2,0,0,1,1], [0,2,2,0,1,2,2,1,0,2,2,0,1,2,2,1],
    [0,1,0,1,2,2,2,2,2,2,2,2,2,2,2,2], [0,0,0,0,2,1,2,1,2,1,2,1,2,1,2,1],
    [0,1,0,1,0,1,0,1,0,1,0,1,2,2,2,2], [0,2,2,2,0,1,1,1,0,2,2,2,0,1,1,1],
    [0,0,0,2,1,1,1,2,0,0,0,2,1,1,1,2], [0,0,0,0,2,1,1,2,2,1,1,2,2,1,1,2],
    [0,2,2,2,0,1,1,1,0,1,1,1,0,2,2,2], [0,0,0,2,1,1,1,2,1,1,1,2,0,0,0,2],
    [0,1,1,0,0,1,1,0,0,1,1,0,2,2,2,2], [0,0,0,0,0,0,0,0,2,1,1,2,2,1,1,2],
    [0,1,1,0,0,1,1,0,2,2,2,2,2,2,2,2], [0,0,2,2,0,0,1,1,0,0,1,1,0,0,2,2],
    [0,0,2,2,1,1,2,2,1,1,2,2,0,0,2,2], [0,0,0,0,0,0,0,0,0,0,0,0,2,1,1,2],
    [0,0,0,2,0,0,0,1,0,0,0,2,0,0,0,1], [0,2,2,2,1,2,2,2,0,2,2,2,1,2,2,2],
    [0,1,0,1,2,2,2,2,2,2,2,2,2,2,2,2], [0,1,1,1,2,0,1,1,2,2,0,1,2,2,2,0],
];

/// Anchor index of the second subset in two-subset partitions.
#[rustfmt::skip]
pub(crate) const ANCHOR_SECOND_2: [u8; 64] = [
    15,15,15,15,15,15,15,15,15,15,15,15,15,15,15,15,
    15, 2, 8, 2, 2, 8, 8,15, 2, 8, 2, 2, 8, 8, 2, 2,
    15,15, 6, 8, 2, 8,15,15, 2, 8, 2, 2, 2,15,15, 6,
     6, 2, 6, 8,15,15, 2, 2,15,15,15,15,15, 2, 2,15,
];

/// Anchor index of the second subset in three-subset partitions.
#[rustfmt::skip]
const ANCHOR_SECOND_3: [u8; 64] = [
     3, 3,15,15, 8, 3,15,15, 8, 8, 6, 6, 6, 5, 3, 3,
     3, 3, 8,15, 3, 3, 6,10, 5, 8, 8, 6, 8, 5,15,15,
     8,15, 3, 5, 6,10, 8,15,15, 3,15, 5,15,15,15,15,
     3,15, 5, 5, 5, 8, 5,10, 5,10, 8,13,15,12, 3, 3,
];

/// Anchor index of the third subset in three-subset partitions.
#[rustfmt::skip]
const ANCHOR_THIRD_3: [u8; 64] = [
    15, 8, 8, 3,15,15, 3, 8,15,15,15,15,15,15,15, 8,
    15, 8,15, 3,15, 8,15, 8, 3,15, 6,10,15,15,10, 8,
    15, 3,15,10,10, 8, 9,10, 6,15, 8,15, 3, 6, 6, 8,
    15, 3,15,15,15,15,15,15,15,15,15,15, 3,15,15, 8,
];

fn anchor_index(subsets: usize, partition: usize, pixel_subset: usize) -> usize {
    match (subsets, pixel_subset) {
        (_, 0) => 0,
        (2, 1) => ANCHOR_SECOND_2[partition] as usize,
        (3, 1) => ANCHOR_SECOND_3[partition] as usize,
        (3, 2) => ANCHOR_THIRD_3[partition] as usize,
        _ => 0,
    }
}

/// Decompress a 16-byte BC7 block into 16 BGRA pixels.
pub fn decode_block(block: &[u8], out: &mut [u8]) {
    let mut reader = BitReader::new(block);

    let mut mode = 0usize;
    while mode < 8 && reader.read_bit() == 0 {
        mode += 1;
    }
    if mode >= 8 {
        // Reserved encoding: the specification decodes it as transparent
        // black.
        out[..64].fill(0);
        return;
    }

    let info = &MODES[mode];
    let partition = reader.read(info.partition_bits) as usize;
    let rotation = reader.read(info.rotation_bits) as usize;
    let index_selection = reader.read(info.index_selection_bits);

    // Endpoints are channel-major: every R, then every G, B, A.
    let pairs = info.subsets;
    let mut endpoints = [[0u32; 4]; 6]; // [endpoint][channel], rgba
    for channel in 0..3 {
        for ep in 0..pairs * 2 {
            endpoints[ep][channel] = reader.read(info.color_bits);
        }
    }
    if info.alpha_bits > 0 {
        for ep in 0..pairs * 2 {
            endpoints[ep][3] = reader.read(info.alpha_bits);
        }
    }

    // P-bits extend every channel by one low bit.
    let mut pbits = [0u32; 6];
    let mut has_pbits = false;
    if info.endpoint_pbits {
        has_pbits = true;
        for p in pbits.iter_mut().take(pairs * 2) {
            *p = reader.read_bit();
        }
    } else if info.shared_pbits {
        has_pbits = true;
        for subset in 0..pairs {
            let bit = reader.read_bit();
            pbits[subset * 2] = bit;
            pbits[subset * 2 + 1] = bit;
        }
    }

    // Expand endpoints to 8 bits per channel.
    let mut expanded = [[0u8; 4]; 6];
    for ep in 0..pairs * 2 {
        for channel in 0..4 {
            let bits = if channel == 3 { info.alpha_bits } else { info.color_bits };
            if bits == 0 {
                expanded[ep][channel] = 255;
                continue;
            }
            let mut v = endpoints[ep][channel];
            let mut total = bits;
            if has_pbits {
                v = (v << 1) | pbits[ep];
                total += 1;
            }
            v <<= 8 - total;
            v |= v >> total;
            expanded[ep][channel] = v as u8;
        }
    }

    // Primary index bits, anchors one bit short.
    let mut index1 = [0usize; 16];
    for (i, idx) in index1.iter_mut().enumerate() {
        let subset = subset_of(info.subsets, partition, i);
        let bits = if i == anchor_index(info.subsets, partition, subset) {
            info.index_bits - 1
        } else {
            info.index_bits
        };
        *idx = reader.read(bits) as usize;
    }

    let mut index2 = [0usize; 16];
    if info.index_bits2 > 0 {
        for (i, idx) in index2.iter_mut().enumerate() {
            let bits = if i == 0 { info.index_bits2 - 1 } else { info.index_bits2 };
            *idx = reader.read(bits) as usize;
        }
    }

    for i in 0..16 {
        let subset = subset_of(info.subsets, partition, i);
        let e0 = &expanded[subset * 2];
        let e1 = &expanded[subset * 2 + 1];

        let (color_idx, color_bits, alpha_idx, alpha_bits) = if info.index_bits2 == 0 {
            (index1[i], info.index_bits, index1[i], info.index_bits)
        } else if index_selection == 1 {
            (index2[i], info.index_bits2, index1[i], info.index_bits)
        } else {
            (index1[i], info.index_bits, index2[i], info.index_bits2)
        };

        let wc = weight(color_idx, color_bits);
        let wa = weight(alpha_idx, alpha_bits);

        let mut rgba = [0u8; 4];
        for channel in 0..3 {
            rgba[channel] =
                (((64 - wc) * e0[channel] as u32 + wc * e1[channel] as u32 + 32) >> 6) as u8;
        }
        rgba[3] = if info.alpha_bits == 0 {
            255
        } else {
            (((64 - wa) * e0[3] as u32 + wa * e1[3] as u32 + 32) >> 6) as u8
        };

        // Rotation swaps alpha with one color channel after interpolation.
        if rotation > 0 {
            rgba.swap(3, rotation - 1);
        }

        out[i * 4] = rgba[2];
        out[i * 4 + 1] = rgba[1];
        out[i * 4 + 2] = rgba[0];
        out[i * 4 + 3] = rgba[3];
    }
}

fn subset_of(subsets: usize, partition: usize, pixel: usize) -> usize {
    match subsets {
        1 => 0,
        2 => PARTITION_2[partition][pixel] as usize,
        _ => PARTITION_3[partition][pixel] as usize,
    }
}

/// Compress 16 BGRA pixels into a 16-byte BC7 block (mode 6).
pub fn encode_block(pixels: &[u8], out: &mut [u8], _params: &EncodeParams) {
    let mut samples = [[0.0f32; 4]; 16];
    for i in 0..16 {
        samples[i] = [
            pixels[i * 4 + 2] as f32,
            pixels[i * 4 + 1] as f32,
            pixels[i * 4] as f32,
            pixels[i * 4 + 3] as f32,
        ];
    }

    let (e0, e1) = fit_endpoints(&samples, 0xFFFF, 16);
    let (mut q0, mut p0) = quantize_771(&e0);
    let (mut q1, mut p1) = quantize_771(&e1);

    // Index assignment against the exact decoded palette.
    let d0 = dequant_771(&q0, p0);
    let d1 = dequant_771(&q1, p1);
    let mut indices = assign_indices(&samples, &d0, &d1);

    // The anchor pixel's top index bit must be zero; swap endpoints and
    // invert indices when it is not.
    if indices[0] >= 8 {
        std::mem::swap(&mut q0, &mut q1);
        std::mem::swap(&mut p0, &mut p1);
        for idx in indices.iter_mut() {
            *idx = 15 - *idx;
        }
    }

    out[..16].fill(0);
    let mut writer = BitWriter::new(out);
    writer.write(1 << 6, 7); // mode 6 marker

    for channel in 0..4 {
        writer.write(q0[channel], 7);
        writer.write(q1[channel], 7);
    }
    writer.write(p0, 1);
    writer.write(p1, 1);

    writer.write(indices[0] as u32, 3);
    for &idx in &indices[1..] {
        writer.write(idx as u32, 4);
    }
}

/// Quantize an RGBA endpoint to 7 bits per channel plus the shared P-bit.
fn quantize_771(e: &[f32; 4]) -> ([u32; 4], u32) {
    let mut best = ([0u32; 4], 0u32);
    let mut best_err = f32::MAX;
    for p in 0..2u32 {
        let mut q = [0u32; 4];
        let mut err = 0.0f32;
        for c in 0..4 {
            let v = e[c].clamp(0.0, 255.0).round();
            let stored = (((v as u32).saturating_sub(p)) >> 1).min(127);
            // Check the neighbour too: rounding down is not always closest.
            let cand = [stored, (stored + 1).min(127)];
            let mut ch_best = stored;
            let mut ch_err = f32::MAX;
            for &s in &cand {
                let recon = ((s << 1) | p) as f32;
                let d = (v - recon).abs();
                if d < ch_err {
                    ch_err = d;
                    ch_best = s;
                }
            }
            q[c] = ch_best;
            err += ch_err * ch_err;
        }
        if err < best_err {
            best_err = err;
            best = (q, p);
        }
    }
    best
}

fn dequant_771(q: &[u32; 4], p: u32) -> [u8; 4] {
    let mut out = [0u8; 4];
    for c in 0..4 {
        out[c] = ((q[c] << 1) | p) as u8;
    }
    out
}

fn assign_indices(samples: &[[f32; 4]; 16], e0: &[u8; 4], e1: &[u8; 4]) -> [usize; 16] {
    let mut indices = [0usize; 16];
    for (i, s) in samples.iter().enumerate() {
        let mut best = 0usize;
        let mut best_err = f32::MAX;
        for (k, &w) in WEIGHTS_4.iter().enumerate() {
            let mut err = 0.0f32;
            for c in 0..4 {
                let p = (((64 - w) * e0[c] as u32 + w * e1[c] as u32 + 32) >> 6) as f32;
                let d = s[c] - p;
                err += d * d;
            }
            if err < best_err {
                best_err = err;
                best = k;
            }
        }
        indices[i] = best;
    }
    indices
}
