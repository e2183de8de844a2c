//! Error types for imgdesc.

use thiserror::Error;

/// Result alias for imgdesc operations.
pub type ImgDescResult<T> = std::result::Result<T, ImgDescError>;

/// Errors that can occur when extracting or comparing image descriptors.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ImgDescError {
    /// A parameter is outside its accepted range.
    #[error("invalid parameter: {reason}")]
    InvalidParameter { reason: &'static str },
    /// Two buffers that must share dimensions do not.
    #[error("dimension mismatch: {left_width}x{left_height} vs {right_width}x{right_height}")]
    DimensionMismatch {
        left_width: usize,
        left_height: usize,
        right_width: usize,
        right_height: usize,
    },
    /// Two histograms that must share a shape do not.
    #[error(
        "histogram shape mismatch: {left_channels}x{left_bins} vs {right_channels}x{right_bins}"
    )]
    ShapeMismatch {
        left_channels: usize,
        left_bins: usize,
        right_channels: usize,
        right_bins: usize,
    },
    /// An accumulator was handed a buffer without pixels.
    #[error("empty input: {reason}")]
    EmptyInput { reason: &'static str },
    /// The pixel slice length does not equal `width * height`.
    #[error("buffer size mismatch: needed {needed}, got {got}")]
    BufferSizeMismatch { needed: usize, got: usize },
    /// The histogram was already normalized and can no longer be modified.
    #[error("histogram already normalized")]
    AlreadyNormalized,
    /// Image decoding or file access failed.
    #[error("image io error: {reason}")]
    ImageIo { reason: String },
    /// More than one parallel worker failed.
    #[error("{} parallel workers failed; first: {}", .0.len(), .0[0])]
    Parallel(Vec<ImgDescError>),
}

impl ImgDescError {
    pub(crate) fn invalid(reason: &'static str) -> Self {
        Self::InvalidParameter { reason }
    }
}

#[cfg(test)]
mod tests {
    use super::ImgDescError;

    #[test]
    fn parallel_error_reports_first_failure() {
        let err = ImgDescError::Parallel(vec![
            ImgDescError::AlreadyNormalized,
            ImgDescError::EmptyInput { reason: "rows" },
        ]);
        let text = err.to_string();
        assert!(text.starts_with("2 parallel workers failed"));
        assert!(text.ends_with("histogram already normalized"));
    }
}
