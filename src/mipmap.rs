//! Mipmap chain arithmetic and generation.
//!
//! Offsets come from the registry's closed-form size formula, so every
//! consumer agrees on where each level lives. Chain generation halves
//! dimensions with a box filter, resizing the alpha plane independently
//! of color so interpolation never bleeds between them.

use half::f16;

use crate::format::{compressed_size, PixelFormatDescriptor};
use crate::texture::MipMap;

/// Number of mip levels below the top one: `floor(log2(min(w, h)))`.
pub fn estimate_mip_count(width: u32, height: u32) -> u32 {
    width.min(height).max(1).ilog2()
}

/// Byte offset of a mip level: the size of everything strictly before
/// it, header included.
pub fn mip_offset(mip_index: u32, desc: &PixelFormatDescriptor, width: u32, height: u32) -> u64 {
    compressed_size(width, height, mip_index as i32 - 1, desc)
}

/// A located starting mip within a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MipLocation {
    pub index: u32,
    pub offset: u64,
}

/// Locate the first mip whose larger dimension fits `desired_max`
/// (0 = no limit). Returns `None` when the computed offset exceeds the
/// available stream length (truncated file).
pub fn ensure_mip_in_image(
    stream_len: u64,
    width: u32,
    height: u32,
    desired_max: u32,
    desc: &PixelFormatDescriptor,
) -> Option<MipLocation> {
    let levels = estimate_mip_count(width, height);
    let mut index = 0;
    for i in 0..=levels {
        let mw = (width >> i).max(1);
        let mh = (height >> i).max(1);
        index = i;
        if desired_max == 0 || mw.max(mh) <= desired_max {
            break;
        }
    }

    let offset = mip_offset(index, desc, width, height);
    if offset > stream_len {
        return None;
    }
    Some(MipLocation { index, offset })
}

/// Build the full chain from a top level by repeated 2× box-filter
/// downsampling, stopping once a dimension reaches 1. The returned
/// vector starts with a copy of the top level.
pub fn build_mip_chain(top: &MipMap) -> Vec<MipMap> {
    let mut chain = vec![MipMap {
        width: top.width,
        height: top.height,
        data: top.data.clone(),
        descriptor: top.descriptor,
    }];

    while chain.last().unwrap().width > 1 && chain.last().unwrap().height > 1 {
        let next = downsample_box_2x(chain.last().unwrap());
        chain.push(next);
    }
    chain
}

/// Halve a level with a box filter.
///
/// The alpha plane is extracted first, color and alpha are resized
/// separately, and the result recombined.
fn downsample_box_2x(mip: &MipMap) -> MipMap {
    let nw = (mip.width / 2).max(1);
    let nh = (mip.height / 2).max(1);
    let cs = mip.descriptor.component_size as usize;

    let alpha = extract_alpha_plane(mip);
    let color = resize_color(mip, nw, nh);
    let alpha_small = resize_plane(&alpha, mip.width, cs, nw, nh);

    let mut out = MipMap::new_zeroed(nw, nh, mip.descriptor);
    let stride = 4 * cs;
    for i in 0..(nw * nh) as usize {
        out.data[i * stride..i * stride + 3 * cs].copy_from_slice(&color[i * 3 * cs..(i + 1) * 3 * cs]);
        out.data[i * stride + 3 * cs..(i + 1) * stride]
            .copy_from_slice(&alpha_small[i * cs..(i + 1) * cs]);
    }
    out
}

fn extract_alpha_plane(mip: &MipMap) -> Vec<u8> {
    let cs = mip.descriptor.component_size as usize;
    let stride = 4 * cs;
    let mut plane = vec![0u8; (mip.width * mip.height) as usize * cs];
    for (i, px) in mip.data.chunks_exact(stride).enumerate() {
        plane[i * cs..(i + 1) * cs].copy_from_slice(&px[3 * cs..]);
    }
    plane
}

fn resize_color(mip: &MipMap, nw: u32, nh: u32) -> Vec<u8> {
    let cs = mip.descriptor.component_size as usize;
    let stride = 4 * cs;
    let mut out = vec![0u8; (nw * nh) as usize * 3 * cs];

    for y in 0..nh as usize {
        for x in 0..nw as usize {
            for c in 0..3 {
                let mut acc = 0.0f64;
                for (dy, dx) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
                    let sx = (x * 2 + dx).min(mip.width as usize - 1);
                    let sy = (y * 2 + dy).min(mip.height as usize - 1);
                    let off = (sy * mip.width as usize + sx) * stride + c * cs;
                    acc += component_to_f64(&mip.data[off..off + cs]);
                }
                let off = (y * nw as usize + x) * 3 * cs + c * cs;
                f64_to_component(acc / 4.0, &mut out[off..off + cs]);
            }
        }
    }
    out
}

/// Box-filter a single-channel plane of `cs`-byte components.
fn resize_plane(plane: &[u8], width: u32, cs: usize, nw: u32, nh: u32) -> Vec<u8> {
    let height = plane.len() / cs / width as usize;
    let mut out = vec![0u8; (nw * nh) as usize * cs];

    for y in 0..nh as usize {
        for x in 0..nw as usize {
            let mut acc = 0.0f64;
            for (dy, dx) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
                let sx = (x * 2 + dx).min(width as usize - 1);
                let sy = (y * 2 + dy).min(height - 1);
                let off = (sy * width as usize + sx) * cs;
                acc += component_to_f64(&plane[off..off + cs]);
            }
            let off = (y * nw as usize + x) * cs;
            f64_to_component(acc / 4.0, &mut out[off..off + cs]);
        }
    }
    out
}

fn component_to_f64(bytes: &[u8]) -> f64 {
    match bytes.len() {
        2 => f16::from_bits(u16::from_le_bytes([bytes[0], bytes[1]])).to_f64(),
        4 => f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64,
        _ => bytes[0] as f64,
    }
}

fn f64_to_component(value: f64, out: &mut [u8]) {
    match out.len() {
        2 => out.copy_from_slice(&f16::from_f64(value).to_bits().to_le_bytes()),
        4 => out.copy_from_slice(&(value as f32).to_le_bytes()),
        _ => out[0] = value.round().clamp(0.0, 255.0) as u8,
    }
}
