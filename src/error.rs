//! Error types for plan construction and transform execution.
//!
//! All fallible operations return structured [`NufftError`] values; the
//! crate never logs and never panics on user-reachable paths. A failed
//! `exec_*` call leaves the plan usable for subsequent correct calls.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NufftError {
    /// The requested number of axes is outside the supported 1–3 range.
    #[error("unsupported dimension count {0} (expected 1 to 3)")]
    UnsupportedDimension(usize),

    /// The kernel half-support must satisfy 2M < oversampled axis length.
    #[error("half-support {m} too large for oversampled axis {axis} of length {size}")]
    HalfSupportTooLarge { axis: usize, m: usize, size: usize },

    /// Half-support must be at least one cell.
    #[error("half-support must be at least 1")]
    InvalidHalfSupport,

    /// Oversampling factors below one would truncate the spectrum.
    #[error("oversampling factor {0} is below 1")]
    InvalidOversampling(f64),

    /// Piecewise-polynomial size outside the range the dense fit supports.
    #[error("piecewise polynomial size {0} out of range (2..=16)")]
    InvalidPolySize(usize),

    /// A plan needs at least one channel.
    #[error("channel count must be at least 1")]
    InvalidChannelCount,

    /// A caller-provided buffer does not match the plan's shape.
    #[error("length mismatch for {what}: expected {expected}, got {got}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    /// Caller passed a different number of channel buffers than the plan owns.
    #[error("channel count mismatch: plan has {expected}, got {got}")]
    ChannelMismatch { expected: usize, got: usize },

    /// Point set axis count does not match the plan dimension.
    #[error("point set has {got} coordinate axes, plan has {expected}")]
    PointDimensionMismatch { expected: usize, got: usize },

    /// Kernel shape parameter grew past the range where exp/sinh are finite.
    #[error("kernel shape parameter overflow: beta = {beta:.1} exceeds {max:.1}")]
    KernelOverflow { beta: f64, max: f64 },

    /// The real-FFT collaborator rejected a buffer.
    #[error("real FFT error: {0}")]
    Fft(#[from] realfft::FftError),
}

pub type NufftResult<T> = Result<T, NufftError>;
