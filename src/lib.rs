//! NUFFT-Core: non-uniform fast Fourier transforms on periodic domains
//!
//! This crate computes the discrete Fourier relation between samples at
//! arbitrary spatial locations and a uniform grid of Fourier coefficients
//! in 1, 2 or 3 dimensions, for real or complex data, over a 2pi-periodic
//! domain per axis. Non-uniform points are spread onto (or interpolated
//! from) an oversampled grid with a compactly supported kernel, the grid is
//! transformed with an FFT, and the kernel's footprint is divided out of
//! the spectrum.
//!
//! # Modules
//! - `plan`: plan construction, type-1 and type-2 execution
//! - `kernels`: B-spline, Gaussian and Kaiser-Bessel spreading kernels
//! - `piecewise`: piecewise-polynomial kernel approximation
//! - `spread`: scatter of non-uniform samples onto oversampled grids
//! - `interp`: gather of oversampled grids at non-uniform points
//! - `grid`: periodic cell indexing, wavenumber layouts, smooth sizing
//! - `fft`: N-D FFT workspaces over flat buffers (rustfft/realfft)
//! - `error`: structured error values

pub mod error;
pub mod fft;
pub mod grid;
pub mod interp;
pub mod kernels;
pub mod piecewise;
pub mod plan;
pub mod spread;

pub use error::{NufftError, NufftResult};
pub use kernels::KernelKind;
pub use plan::{Plan, PlanConfig, RealPlan};

/// Narrow an f64 constant into the element type. Infallible for the float
/// types this crate is instantiated with.
pub(crate) fn cast<T: num_traits::Float>(v: f64) -> T {
    T::from(v).unwrap()
}

/// Widen an element value to f64 for shape and transform arithmetic.
pub(crate) fn to_f64<T: num_traits::Float>(v: T) -> f64 {
    v.to_f64().unwrap()
}
