//! BC4 single-channel block compression.
//!
//! A BC4 block stores two 8-bit endpoints plus sixteen 3-bit palette
//! indices in 8 bytes. With `e0 > e1` the palette is eight interpolated
//! values; otherwise six interpolated values with slots 6 and 7 pinned to
//! the channel extremes (0 and 255). The same 8-byte layout doubles as
//! the BC3 alpha block and as each half of a BC5 block.

/// Expand the 8-entry palette for a stored endpoint pair.
pub fn build_palette(e0: u8, e1: u8) -> [u8; 8] {
    let a0 = e0 as u16;
    let a1 = e1 as u16;
    if e0 > e1 {
        [
            e0,
            e1,
            ((6 * a0 + a1) / 7) as u8,
            ((5 * a0 + 2 * a1) / 7) as u8,
            ((4 * a0 + 3 * a1) / 7) as u8,
            ((3 * a0 + 4 * a1) / 7) as u8,
            ((2 * a0 + 5 * a1) / 7) as u8,
            ((a0 + 6 * a1) / 7) as u8,
        ]
    } else {
        [
            e0,
            e1,
            ((4 * a0 + a1) / 5) as u8,
            ((3 * a0 + 2 * a1) / 5) as u8,
            ((2 * a0 + 3 * a1) / 5) as u8,
            ((a0 + 4 * a1) / 5) as u8,
            0,
            255,
        ]
    }
}

/// Decode one 8-byte channel block into 16 channel values.
pub fn decode_channel(block: &[u8]) -> [u8; 16] {
    let palette = build_palette(block[0], block[1]);
    let mut bits = 0u64;
    for (i, &b) in block[2..8].iter().enumerate() {
        bits |= (b as u64) << (i * 8);
    }

    let mut out = [0u8; 16];
    for (i, v) in out.iter_mut().enumerate() {
        let idx = ((bits >> (i * 3)) & 0x7) as usize;
        *v = palette[idx];
    }
    out
}

/// Encode 16 channel values into an 8-byte block.
///
/// Always emits the full-range mode (`e0 = max`, `e1 = min`); each pixel
/// takes the palette entry with the smallest absolute difference.
pub fn encode_channel(values: &[u8; 16], out: &mut [u8]) {
    let mut min = 255u8;
    let mut max = 0u8;
    for &v in values {
        min = min.min(v);
        max = max.max(v);
    }

    let (e0, e1) = (max, min);
    let palette = build_palette(e0, e1);

    let mut bits = 0u64;
    for (i, &v) in values.iter().enumerate() {
        let mut best = 0u64;
        let mut best_dist = u32::MAX;
        for (idx, &p) in palette.iter().enumerate() {
            let dist = (v as i32 - p as i32).unsigned_abs();
            if dist < best_dist {
                best_dist = dist;
                best = idx as u64;
            }
        }
        bits |= best << (i * 3);
    }

    out[0] = e0;
    out[1] = e1;
    out[2..8].copy_from_slice(&bits.to_le_bytes()[0..6]);
}

/// Decompress a BC4 block into 16 BGRA pixels (grayscale replication).
pub fn decode_block(block: &[u8], out: &mut [u8]) {
    let values = decode_channel(block);
    for (i, &v) in values.iter().enumerate() {
        out[i * 4] = v;
        out[i * 4 + 1] = v;
        out[i * 4 + 2] = v;
        out[i * 4 + 3] = 255;
    }
}

/// Compress the red channel of 16 BGRA pixels into a BC4 block.
pub fn encode_block(pixels: &[u8], out: &mut [u8], _params: &crate::codec::EncodeParams) {
    let mut values = [0u8; 16];
    for (i, v) in values.iter_mut().enumerate() {
        *v = pixels[i * 4 + 2];
    }
    encode_channel(&values, out);
}
