//! DDS save path: the load structure in reverse.
//!
//! The full output size is computed from the registry formula before a
//! single destination buffer is allocated; every mip then encodes into
//! its disjoint slice. Any failure or observed cancellation aborts with
//! no bytes returned.

use rayon::prelude::*;
use tracing::debug;

use crate::codec::uncompressed::write_pixels;
use crate::error::TextureError;
use crate::format::{compressed_size, PixelFormatDescriptor, SurfaceFormat};
use crate::header::DdsHeader;
use crate::mipmap::{build_mip_chain, mip_offset};
use crate::pipeline::ExecContext;
use crate::texture::{MipMap, Texture};

/// What to do about mip levels on save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MipPolicy {
    /// Write the texture's existing chain as-is.
    Keep,
    /// Regenerate a full chain from the top level.
    Generate,
    /// Write only the top level.
    TopOnly,
}

/// What to do about the alpha channel on save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlphaPolicy {
    Keep,
    /// Zero the alpha channel in place before encoding.
    Remove,
}

/// Encode a texture into a complete DDS byte buffer.
pub fn save(
    texture: &mut Texture,
    format: SurfaceFormat,
    mips: MipPolicy,
    alpha: AlphaPolicy,
    ctx: &ExecContext,
) -> Result<Vec<u8>, TextureError> {
    let desc = format.descriptor();
    if texture.mips.is_empty() {
        return Err(TextureError::Format("texture has no mip levels".into()));
    }

    let width = texture.width();
    let height = texture.height();
    if desc.block_compressed && (width % 4 != 0 || height % 4 != 0) {
        return Err(TextureError::InvalidDimensions { width, height });
    }
    if texture.mips[0].descriptor.component_size != desc.component_size {
        return Err(TextureError::UnsupportedFormat(format!(
            "cannot encode {}-byte components as {format}",
            texture.mips[0].descriptor.component_size
        )));
    }

    if alpha == AlphaPolicy::Remove {
        for mip in &mut texture.mips {
            mip.clear_alpha();
        }
    }

    let generated;
    let mip_list: Vec<&MipMap> = match mips {
        MipPolicy::Keep => texture.mips.iter().collect(),
        MipPolicy::TopOnly => vec![&texture.mips[0]],
        MipPolicy::Generate => {
            generated = build_mip_chain(&texture.mips[0]);
            generated.iter().collect()
        }
    };
    let count = mip_list.len() as u32;

    let header = DdsHeader::for_format(format, width, height, count);
    let total = compressed_size(width, height, count as i32 - 1, desc) as usize;

    debug!(%format, width, height, mips = count, size_bytes = total, "Saving DDS surface");

    let mut out = vec![0u8; total];
    let header_bytes = header.to_bytes();
    out[..header_bytes.len()].copy_from_slice(&header_bytes);

    // Carve the output into one disjoint window per mip.
    let offsets: Vec<usize> = (0..count)
        .map(|k| mip_offset(k, desc, width, height) as usize)
        .collect();
    let mut windows: Vec<&mut [u8]> = Vec::with_capacity(mip_list.len());
    let mut rest = &mut out[..];
    let mut consumed = 0usize;
    for (k, &offset) in offsets.iter().enumerate() {
        let end = offsets.get(k + 1).copied().unwrap_or(total).min(total);
        let (_, tail) = rest.split_at_mut(offset - consumed);
        let (window, tail) = tail.split_at_mut(end - offset);
        windows.push(window);
        rest = tail;
        consumed = end;
    }

    if desc.block_compressed {
        // Blocks parallelize within each level.
        for (mip, window) in mip_list.iter().zip(windows.into_iter()) {
            if ctx.is_cancelled() {
                return Err(TextureError::Cancelled);
            }
            if mip.width.min(mip.height) < 4 {
                // Sub-block levels stay zero-filled.
                continue;
            }
            encode_block_mip(mip, window, desc, ctx);
        }
    } else if ctx.is_parallel() {
        ctx.run(|| {
            mip_list
                .par_iter()
                .zip(windows.into_par_iter())
                .for_each(|(mip, window)| encode_linear_mip(mip, window, desc, ctx));
        });
    } else {
        for (mip, window) in mip_list.iter().zip(windows.into_iter()) {
            encode_linear_mip(mip, window, desc, ctx);
        }
    }

    if ctx.is_cancelled() {
        return Err(TextureError::Cancelled);
    }

    debug!(size_bytes = out.len(), "DDS save complete");
    Ok(out)
}

/// Compress one level, one band of blocks per parallel unit.
fn encode_block_mip(
    mip: &MipMap,
    dst: &mut [u8],
    desc: &PixelFormatDescriptor,
    ctx: &ExecContext,
) {
    let codec = match desc.codec {
        Some(c) => c,
        None => return,
    };
    let bs = desc.block_size as usize;
    let cs = desc.component_size as usize;
    let px_stride = 4 * cs;
    let blocks_wide = (mip.width / 4) as usize;
    let blocks_high = ((mip.height / 4) as usize).min(dst.len() / (blocks_wide * bs).max(1));
    let row_bytes = mip.width as usize * px_stride;
    let params = ctx.encode_params();

    let encode_band = |band_index: usize, chunk: &mut [u8]| {
        if band_index >= blocks_high {
            return;
        }
        let mut pixels = vec![0u8; 16 * px_stride];
        for bx in 0..blocks_wide {
            if ctx.is_cancelled() {
                return;
            }
            for y in 0..4 {
                let src = (band_index * 4 + y) * row_bytes + bx * 4 * px_stride;
                pixels[y * 4 * px_stride..(y + 1) * 4 * px_stride]
                    .copy_from_slice(&mip.data[src..src + 4 * px_stride]);
            }
            (codec.encode)(&pixels, &mut chunk[bx * bs..(bx + 1) * bs], &params);
        }
    };

    let band_bytes = blocks_wide * bs;
    let used = band_bytes * blocks_high;
    if ctx.is_parallel() {
        ctx.run(|| {
            dst[..used]
                .par_chunks_mut(band_bytes)
                .enumerate()
                .for_each(|(i, chunk)| encode_band(i, chunk));
        });
    } else {
        for (i, chunk) in dst[..used].chunks_mut(band_bytes).enumerate() {
            encode_band(i, chunk);
        }
    }
}

/// Pack one uncompressed level through the mask codec.
fn encode_linear_mip(mip: &MipMap, dst: &mut [u8], desc: &PixelFormatDescriptor, ctx: &ExecContext) {
    if ctx.is_cancelled() {
        return;
    }
    let masks = match desc.format.channel_masks() {
        Some(m) => m,
        None => return,
    };
    let size = mip.width as usize * mip.height as usize * desc.block_size as usize;
    write_pixels(
        &mip.data,
        &masks,
        desc.component_size as usize,
        &mut dst[..size],
    );
}
