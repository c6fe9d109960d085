//! Block compression engine.
//!
//! Every compressed surface format works on independent 4×4-texel
//! blocks; encode and decode are pure functions over one block's bytes
//! and its 16 pixels, which is what makes block-level parallelism safe.
//! Pixel-side buffers are BGRA, `component_size` bytes per channel
//! (half-float bits for BC6H, single bytes everywhere else).
//!
//! [`BlockCodec`] is the capability record the format registry hands
//! out: a pair of function pointers, one per direction.

pub mod bc1;
pub mod bc2;
pub mod bc3;
pub mod bc4;
pub mod bc5;
pub mod bc6;
pub mod bc7;
mod bits;
pub mod conversion;
pub mod optimize;
pub mod uncompressed;

/// Per-call tuning for block encoders.
///
/// Only BC1 consults the alpha threshold today; it is threaded through
/// every encoder so the dispatch signature stays uniform.
#[derive(Debug, Clone, Copy)]
pub struct EncodeParams {
    /// Alpha below this value counts as transparent for DXT1 encoding.
    pub alpha_threshold: u8,
}

impl Default for EncodeParams {
    fn default() -> Self {
        Self { alpha_threshold: 128 }
    }
}

/// Encode/decode entry points for one block-compressed format.
///
/// `decode` reads `block_size` bytes and fills 16 pixels; `encode` is
/// the inverse. Both operate on contiguous 16-pixel scratch buffers so
/// callers own all block extraction and placement.
#[derive(Debug)]
pub struct BlockCodec {
    pub decode: fn(&[u8], &mut [u8]),
    pub encode: fn(&[u8], &mut [u8], &EncodeParams),
}

pub static BC1_CODEC: BlockCodec = BlockCodec { decode: bc1::decode_block, encode: bc1::encode_block };
pub static BC2_CODEC: BlockCodec = BlockCodec { decode: bc2::decode_block, encode: bc2::encode_block };
pub static BC3_CODEC: BlockCodec = BlockCodec { decode: bc3::decode_block, encode: bc3::encode_block };
pub static BC4_CODEC: BlockCodec = BlockCodec { decode: bc4::decode_block, encode: bc4::encode_block };
pub static BC5_CODEC: BlockCodec = BlockCodec { decode: bc5::decode_block, encode: bc5::encode_block };
pub static BC6_CODEC: BlockCodec = BlockCodec { decode: bc6::decode_block, encode: bc6::encode_block };
pub static BC7_CODEC: BlockCodec = BlockCodec { decode: bc7::decode_block, encode: bc7::encode_block };

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_alpha_threshold() {
        assert_eq!(EncodeParams::default().alpha_threshold, 128);
    }

    #[test]
    fn test_dispatch_through_function_pointers() {
        // A flat block survives a dispatch-table roundtrip.
        let mut px = [0u8; 64];
        for i in 0..16 {
            px[i * 4..i * 4 + 4].copy_from_slice(&[40, 80, 120, 255]);
        }
        let mut block = [0u8; 8];
        (BC1_CODEC.encode)(&px, &mut block, &EncodeParams::default());
        let mut out = [0u8; 64];
        (BC1_CODEC.decode)(&block, &mut out);
        for i in 0..16 {
            assert!((out[i * 4] as i16 - 40).abs() <= 8);
            assert_eq!(out[i * 4 + 3], 255);
        }
    }
}
