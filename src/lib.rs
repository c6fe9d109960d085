//! DdsLayer - DDS texture container codec
//!
//! This library decodes and encodes DDS (DirectDraw Surface) texture
//! files: BC1-BC7 block-compressed surfaces, mask-described uncompressed
//! layouts, and full mipmap chains, producing and consuming BGRA pixel
//! buffers.
//!
//! # High-Level API
//!
//! ```no_run
//! use ddslayer::{load, save, AlphaPolicy, ExecContext, MipPolicy, SurfaceFormat};
//!
//! let bytes = std::fs::read("texture.dds").unwrap();
//!
//! // Decode every mip level.
//! let ctx = ExecContext::new();
//! let mut texture = load(&bytes, 0, &ctx).unwrap();
//!
//! // Re-encode as BC1 with a regenerated mip chain.
//! let dds = save(
//!     &mut texture,
//!     SurfaceFormat::Bc1,
//!     MipPolicy::Generate,
//!     AlphaPolicy::Keep,
//!     &ctx,
//! )
//! .unwrap();
//! std::fs::write("out.dds", dds).unwrap();
//! ```
//!
//! # Format Support
//!
//! - **BC1/DXT1** - 8-byte color blocks, optional 1-bit alpha
//! - **BC2/DXT3, BC3/DXT5** - 16-byte blocks with explicit/interpolated alpha
//! - **BC4/ATI1, BC5/ATI2** - one- and two-channel interpolated blocks
//! - **BC6H** - HDR half-float blocks (unsigned)
//! - **BC7** - all eight LDR modes on decode, mode 6 on encode
//! - **Uncompressed** - A8R8G8B8, R8G8B8, L8, A8L8, V8U8, 16/32-bit float
//!   RGBA, plus arbitrary mask-described legacy layouts
//!
//! # Concurrency
//!
//! Load and save run as a parallel-for over disjoint work units (one
//! compressed block, or one mip for uncompressed data) with a
//! cooperatively polled cancellation token. Parallelism is explicit
//! per-call configuration on [`ExecContext`]; small pyramids are often
//! faster sequential.

pub mod codec;
pub mod error;
pub mod format;
pub mod header;
pub mod mipmap;
pub mod native;
pub mod pipeline;
pub mod texture;

pub use error::TextureError;
pub use format::{compressed_size, PixelFormatDescriptor, SurfaceFormat};
pub use header::DdsHeader;
pub use mipmap::{build_mip_chain, ensure_mip_in_image, estimate_mip_count, MipLocation};
pub use native::{ImageCodec, NativeCodec, NativeImage};
pub use pipeline::{load, load_any, save, AlphaPolicy, ExecContext, MipPolicy, Parallelism};
pub use texture::{MipMap, Texture};

/// Version of the ddslayer library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
