//! DDS header model: binary (de)serialization and surface-format
//! resolution.
//!
//! A header is parsed from a byte buffer or constructed from a target
//! format before saving, and is immutable once built. The base layout is
//! 128 bytes (4-byte magic + 124-byte structure); a 20-byte extension
//! follows when the pixel-format FourCC is the `DX10` sentinel.

mod parse;
mod types;
mod write;

pub use types::{
    CapsFlags, DdsHeader, ExtendedFormatInfo, HeaderFlags, PixelFormatFlags, PixelFormatInfo,
    BASE_HEADER_LEN, DDS_MAGIC, EXTENDED_HEADER_LEN,
};
