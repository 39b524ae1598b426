//! Spreading-kernel library.
//!
//! A [`SpreadKernel`] is the per-axis kernel descriptor used by spreading
//! and interpolation: it owns the grid step, the family's shape parameter,
//! the piecewise-polynomial evaluation table, and (once bound) the kernel's
//! Fourier transform sampled on the axis wavenumbers for deconvolution.
//!
//! Evaluation returns the 2M kernel values around a point in one pass. The
//! 2M sample offsets `(u + M - j)/M`, `j = 1..2M`, land in the 2M pieces of
//! the polynomial table at a shared local coordinate `2u - 1`, so the whole
//! stencil costs one Horner sweep. `values[j]` weights grid cell
//! `c - M + 1 + j` (0-based central cell `c`), ascending with the cell
//! index for every family; the backwards Kaiser-Bessel kernel differs only
//! in which side of its Fourier pair lives in real space.
//!
//! B-splines bypass the table: the Cox-de Boor recurrence is exact and
//! preserves the partition of unity.

pub mod bessel;
pub mod bspline;
pub mod gaussian;
pub mod kaiser_bessel;

use num_traits::Float;

use crate::error::{NufftError, NufftResult};
use crate::grid;
use crate::piecewise::PiecewisePoly;
use crate::{cast, to_f64};

/// Shape parameters above this overflow `sinh`/`exp` in f64.
const MAX_BETA: f64 = 700.0;

/// Kernel family selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelKind {
    /// Cardinal B-spline of order 2M. Exact partition of unity; accuracy
    /// improves with M, not with oversampling.
    BSpline,
    /// Truncated Gaussian with aliasing-optimal width.
    Gaussian,
    /// I0-window Kaiser-Bessel.
    KaiserBessel,
    /// sinh-window ("backwards") Kaiser-Bessel; the default elsewhere in
    /// this crate.
    KaiserBesselBackwards,
}

/// Per-axis kernel descriptor. Immutable after construction apart from the
/// one-time wavenumber binding performed by the plan.
#[derive(Debug, Clone)]
pub struct SpreadKernel<T> {
    kind: KernelKind,
    m: usize,
    dx: T,
    dx_f64: f64,
    /// beta for the Kaiser-Bessel pair, squared-width b for the Gaussian,
    /// effective standard deviation for the B-spline.
    shape: f64,
    poly: Option<PiecewisePoly<T>>,
    ghat: Vec<T>,
}

impl<T: Float> SpreadKernel<T> {
    /// Build a kernel with the family's optimal shape for half-support `m`,
    /// oversampled grid step `dx` and oversampling factor `sigma`.
    ///
    /// `poly_len` is the number of coefficients per polynomial piece
    /// (ignored by the B-spline family).
    pub fn optimal(
        kind: KernelKind,
        m: usize,
        dx: f64,
        sigma: f64,
        poly_len: usize,
    ) -> NufftResult<Self> {
        if m < 1 {
            return Err(NufftError::InvalidHalfSupport);
        }
        if !(sigma >= 1.0) {
            return Err(NufftError::InvalidOversampling(sigma));
        }
        if !(2..=16).contains(&poly_len) {
            return Err(NufftError::InvalidPolySize(poly_len));
        }
        let pieces = 2 * m;

        let (shape, poly) = match kind {
            KernelKind::BSpline => ((m as f64 / 6.0).sqrt() * dx, None),
            KernelKind::Gaussian => {
                let b = gaussian::optimal_width(m, sigma);
                let table = PiecewisePoly::fit(|t| gaussian::real_space(t, m, b), pieces, poly_len);
                (b, Some(table))
            }
            KernelKind::KaiserBessel => {
                let beta = kaiser_bessel::optimal_beta(m, sigma, false);
                if beta > MAX_BETA {
                    return Err(NufftError::KernelOverflow { beta, max: MAX_BETA });
                }
                let table =
                    PiecewisePoly::fit(|t| kaiser_bessel::real_space(t, beta), pieces, poly_len);
                (beta, Some(table))
            }
            KernelKind::KaiserBesselBackwards => {
                let beta = kaiser_bessel::optimal_beta(m, sigma, true);
                if beta > MAX_BETA {
                    return Err(NufftError::KernelOverflow { beta, max: MAX_BETA });
                }
                let table = PiecewisePoly::fit(
                    |t| kaiser_bessel::real_space_backwards(t, beta),
                    pieces,
                    poly_len,
                );
                (beta, Some(table))
            }
        };

        Ok(SpreadKernel {
            kind,
            m,
            dx: cast(dx),
            dx_f64: dx,
            shape,
            poly,
            ghat: Vec::new(),
        })
    }

    pub fn kind(&self) -> KernelKind {
        self.kind
    }

    /// Half-support in oversampled grid cells.
    pub fn half_support(&self) -> usize {
        self.m
    }

    /// Oversampled grid step.
    pub fn dx(&self) -> T {
        self.dx
    }

    /// Family shape parameter (see the field documentation).
    pub fn shape(&self) -> f64 {
        self.shape
    }

    /// Evaluate the 2M kernel values around `x` (canonicalised to [0, 2pi)).
    ///
    /// Returns the 0-based central cell; `out[j]` weights cell
    /// `cell - M + 1 + j` before periodic wrapping.
    #[inline]
    pub fn evaluate(&self, x: T, out: &mut [T]) -> usize {
        debug_assert_eq!(out.len(), 2 * self.m);
        let (cell, u) = grid::cell_and_offset(x, self.dx);
        match &self.poly {
            None => bspline::weights(2 * self.m, u, out),
            Some(table) => {
                let local = u + u - T::one();
                table.eval_all(local, out);
            }
        }
        cell
    }

    /// Analytical Fourier transform at wavenumber `k`.
    pub fn fourier(&self, k: f64) -> f64 {
        let r = self.m as f64 * self.dx_f64;
        match self.kind {
            KernelKind::BSpline => bspline::fourier(k, self.dx_f64, 2 * self.m),
            KernelKind::Gaussian => gaussian::fourier(k, self.dx_f64, self.shape),
            KernelKind::KaiserBessel => kaiser_bessel::fourier(k, r, self.shape),
            KernelKind::KaiserBesselBackwards => {
                kaiser_bessel::fourier_backwards(k, r, self.shape)
            }
        }
    }

    /// Sample the Fourier transform on the axis wavenumbers and cache it.
    /// Rebinding replaces any previous cache.
    pub fn bind_wavenumbers(&mut self, ks: &[T]) {
        self.ghat = ks.iter().map(|&k| cast(self.fourier(to_f64(k)))).collect();
    }

    /// Cached Fourier samples; empty until bound.
    pub fn ghat(&self) -> &[T] {
        &self.ghat
    }
}
