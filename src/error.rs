//! Error types for the texture pipeline.

use thiserror::Error;

/// Errors that can occur while loading or saving textures.
#[derive(Debug, Error)]
pub enum TextureError {
    /// The container is malformed (bad magic, bad header sizes).
    #[error("Invalid texture container: {0}")]
    Format(String),

    /// The container is recognized but no codec is registered for its format.
    #[error("Unsupported surface format: {0}")]
    UnsupportedFormat(String),

    /// Block-compressed saves require dimensions that are multiples of 4.
    #[error("Invalid dimensions {width}×{height}: block-compressed surfaces require multiples of 4")]
    InvalidDimensions { width: u32, height: u32 },

    /// A mip offset landed beyond the available bytes.
    #[error("Truncated data: needed {needed} bytes but only {available} available")]
    TruncatedData { needed: u64, available: u64 },

    /// Cooperative cancellation was observed mid-operation.
    #[error("Operation cancelled")]
    Cancelled,

    /// The pluggable native codec (non-DDS containers) failed.
    #[error("Native codec error: {0}")]
    Native(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TextureError::InvalidDimensions {
            width: 100,
            height: 200,
        };
        assert_eq!(
            err.to_string(),
            "Invalid dimensions 100×200: block-compressed surfaces require multiples of 4"
        );

        let err = TextureError::Cancelled;
        assert_eq!(err.to_string(), "Operation cancelled");
    }

    #[test]
    fn test_truncated_display() {
        let err = TextureError::TruncatedData {
            needed: 4096,
            available: 128,
        };
        assert_eq!(
            err.to_string(),
            "Truncated data: needed 4096 bytes but only 128 available"
        );
    }
}
