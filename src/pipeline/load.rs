//! DDS load path: header → descriptor → per-mip decode.
//!
//! Block-compressed mips parallelize across texel blocks (disjoint
//! four-row bands of one pre-sized buffer); uncompressed mips
//! parallelize across whole levels since per-pixel decode is cheap.
//! Cancellation is polled at the top of every unit; a cancelled load
//! never exposes a partial texture.

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::codec::uncompressed::read_pixels;
use crate::error::TextureError;
use crate::format::{PixelFormatDescriptor, SurfaceFormat};
use crate::header::{DdsHeader, DDS_MAGIC};
use crate::mipmap::{ensure_mip_in_image, estimate_mip_count, mip_offset};
use crate::native::NativeCodec;
use crate::pipeline::ExecContext;
use crate::texture::{MipMap, Texture};

/// Decode a DDS byte buffer into a texture.
///
/// `max_dimension` skips levels larger than the caller wants (0 = load
/// from the top). Per-mip failures are logged and the level dropped;
/// the load fails only when no level decodes at all.
pub fn load(bytes: &[u8], max_dimension: u32, ctx: &ExecContext) -> Result<Texture, TextureError> {
    let header = DdsHeader::parse(bytes)?;
    let format = header.resolve_format()?;
    let desc = format.descriptor();
    let width = header.width.max(1);
    let height = header.height.max(1);

    let location = ensure_mip_in_image(bytes.len() as u64, width, height, max_dimension, desc)
        .ok_or(TextureError::TruncatedData {
            needed: mip_offset(0, desc, width, height),
            available: bytes.len() as u64,
        })?;

    let levels = if header.mip_count > 0 {
        header.mip_count
    } else {
        estimate_mip_count(width, height) + 1
    };

    debug!(
        %format,
        width,
        height,
        levels,
        start_mip = location.index,
        "Loading DDS surface"
    );

    let indices: Vec<u32> = (location.index..levels).collect();
    let decoded: Vec<(u32, Result<MipMap, TextureError>)> = if desc.block_compressed {
        // Blocks parallelize within each level; levels stay in order.
        indices
            .iter()
            .map(|&i| (i, decode_block_mip(bytes, i, width, height, desc, ctx)))
            .collect()
    } else if ctx.is_parallel() {
        ctx.run(|| {
            indices
                .par_iter()
                .map(|&i| (i, decode_linear_mip(bytes, &header, i, width, height, desc, ctx)))
                .collect()
        })
    } else {
        indices
            .iter()
            .map(|&i| (i, decode_linear_mip(bytes, &header, i, width, height, desc, ctx)))
            .collect()
    };

    if ctx.is_cancelled() {
        return Err(TextureError::Cancelled);
    }

    let mut mips = Vec::with_capacity(decoded.len());
    for (index, result) in decoded {
        match result {
            Ok(mip) => mips.push(mip),
            Err(TextureError::Cancelled) => return Err(TextureError::Cancelled),
            Err(e) => {
                warn!(mip = index, error = %e, "Skipping undecodable mip");
            }
        }
    }

    if mips.is_empty() {
        return Err(TextureError::TruncatedData {
            needed: location.offset,
            available: bytes.len() as u64,
        });
    }

    debug!(mips = mips.len(), "DDS load complete");

    Ok(Texture {
        mips,
        header,
        source_len: Some(bytes.len()),
    })
}

/// Decode any supported container: DDS through the block/mask codecs,
/// everything else through the pluggable native codec.
pub fn load_any(
    bytes: &[u8],
    max_dimension: u32,
    ctx: &ExecContext,
    native: Option<&dyn NativeCodec>,
) -> Result<Texture, TextureError> {
    if bytes.len() >= 4 && bytes[0..4] == DDS_MAGIC {
        return load(bytes, max_dimension, ctx);
    }

    let codec = native.ok_or_else(|| {
        TextureError::Format("not a DDS container and no native codec registered".into())
    })?;
    let image = codec.decode(bytes)?;
    debug!(width = image.width, height = image.height, "Decoded via native codec");

    let desc = SurfaceFormat::Bgra8.descriptor();
    let header = DdsHeader::for_format(SurfaceFormat::Bgra8, image.width, image.height, 1);
    Ok(Texture {
        mips: vec![MipMap {
            width: image.width,
            height: image.height,
            data: image.bgra,
            descriptor: desc,
        }],
        header,
        source_len: Some(bytes.len()),
    })
}

/// Decode one block-compressed level.
///
/// Levels smaller than a block are left as all-zero buffers rather than
/// decoded.
fn decode_block_mip(
    bytes: &[u8],
    mip_index: u32,
    width: u32,
    height: u32,
    desc: &'static PixelFormatDescriptor,
    ctx: &ExecContext,
) -> Result<MipMap, TextureError> {
    let mw = (width >> mip_index).max(1);
    let mh = (height >> mip_index).max(1);
    let mut mip = MipMap::new_zeroed(mw, mh, desc);

    if mw.min(mh) < 4 {
        return Ok(mip);
    }

    let codec = desc
        .codec
        .ok_or_else(|| TextureError::UnsupportedFormat(desc.format.to_string()))?;
    let bs = desc.block_size as usize;
    let cs = desc.component_size as usize;
    let blocks_wide = (mw / 4) as usize;
    let blocks_high = (mh / 4) as usize;

    let offset = mip_offset(mip_index, desc, width, height) as usize;
    let needed = offset + blocks_wide * blocks_high * bs;
    if needed > bytes.len() {
        return Err(TextureError::TruncatedData {
            needed: needed as u64,
            available: bytes.len() as u64,
        });
    }
    let src = &bytes[offset..needed];

    let px_stride = 4 * cs;
    let row_bytes = mw as usize * px_stride;
    let band_bytes = row_bytes * 4;

    let decode_band = |band_index: usize, band: &mut [u8]| {
        if band_index >= blocks_high {
            return;
        }
        let mut scratch = vec![0u8; 16 * px_stride];
        for bx in 0..blocks_wide {
            if ctx.is_cancelled() {
                return;
            }
            let block = &src[(band_index * blocks_wide + bx) * bs..][..bs];
            (codec.decode)(block, &mut scratch);
            for y in 0..4 {
                let dst = y * row_bytes + bx * 4 * px_stride;
                band[dst..dst + 4 * px_stride]
                    .copy_from_slice(&scratch[y * 4 * px_stride..(y + 1) * 4 * px_stride]);
            }
        }
    };

    if ctx.is_parallel() {
        ctx.run(|| {
            mip.data
                .par_chunks_mut(band_bytes)
                .enumerate()
                .for_each(|(i, band)| decode_band(i, band));
        });
    } else {
        for (i, band) in mip.data.chunks_mut(band_bytes).enumerate() {
            decode_band(i, band);
        }
    }

    if ctx.is_cancelled() {
        return Err(TextureError::Cancelled);
    }
    Ok(mip)
}

/// Decode one uncompressed level through the mask codec.
fn decode_linear_mip(
    bytes: &[u8],
    header: &DdsHeader,
    mip_index: u32,
    width: u32,
    height: u32,
    desc: &'static PixelFormatDescriptor,
    ctx: &ExecContext,
) -> Result<MipMap, TextureError> {
    if ctx.is_cancelled() {
        return Err(TextureError::Cancelled);
    }

    let mw = (width >> mip_index).max(1);
    let mh = (height >> mip_index).max(1);
    let masks = header
        .channel_masks(desc.format)
        .ok_or_else(|| TextureError::UnsupportedFormat(desc.format.to_string()))?;

    let offset = mip_offset(mip_index, desc, width, height) as usize;
    let size = mw as usize * mh as usize * desc.block_size as usize;
    if offset + size > bytes.len() {
        return Err(TextureError::TruncatedData {
            needed: (offset + size) as u64,
            available: bytes.len() as u64,
        });
    }

    let mut mip = MipMap::new_zeroed(mw, mh, desc);
    read_pixels(
        &bytes[offset..offset + size],
        &masks,
        desc.component_size as usize,
        &mut mip.data,
    );

    if ctx.is_cancelled() {
        return Err(TextureError::Cancelled);
    }
    Ok(mip)
}
