//! FFT workspaces over flat buffers using rustfft/realfft.
//!
//! N-dimensional transforms are applied as strided 1-D passes over a flat
//! buffer in Fortran (axis-0 fastest) order, with per-axis plans and
//! scratch buffers cached at construction. Neither direction normalises:
//! a forward/inverse round trip scales the data by the total grid size,
//! and the planner folds the normalisation it needs into deconvolution.
//!
//! [`RealFftNd`] performs the axis-0 pass with a real-to-complex transform
//! into the distinct half-spectrum buffer of shape `(n1/2 + 1, n2, ...)`,
//! then runs ordinary complex passes over the remaining axes.

use num_complex::Complex;
use realfft::{ComplexToReal, RealFftPlanner, RealToComplex};
use rustfft::{Fft, FftNum, FftPlanner};
use std::sync::Arc;

use crate::error::NufftResult;

/// Complex N-D FFT plan with cached per-axis plans and scratch space.
pub struct ComplexFftNd<T: FftNum> {
    dims: Vec<usize>,
    forward: Vec<Arc<dyn Fft<T>>>,
    inverse: Vec<Arc<dyn Fft<T>>>,
    scratch: Vec<Complex<T>>,
    line: Vec<Complex<T>>,
}

impl<T: FftNum> ComplexFftNd<T> {
    /// Plan transforms for a grid of the given dimensions (axis 0 fastest).
    pub fn new(dims: &[usize]) -> Self {
        let mut planner = FftPlanner::new();
        let forward: Vec<_> = dims.iter().map(|&n| planner.plan_fft_forward(n)).collect();
        let inverse: Vec<_> = dims.iter().map(|&n| planner.plan_fft_inverse(n)).collect();
        let scratch_len = forward
            .iter()
            .chain(inverse.iter())
            .map(|p| p.get_inplace_scratch_len())
            .max()
            .unwrap_or(0);
        let line_len = dims.iter().copied().max().unwrap_or(0);
        ComplexFftNd {
            dims: dims.to_vec(),
            forward,
            inverse,
            scratch: vec![Complex::new(T::zero(), T::zero()); scratch_len],
            line: vec![Complex::new(T::zero(), T::zero()); line_len],
        }
    }

    /// In-place forward transform (unnormalised).
    pub fn forward(&mut self, data: &mut [Complex<T>]) {
        for axis in 0..self.dims.len() {
            let plan = Arc::clone(&self.forward[axis]);
            apply_axis(
                data,
                &self.dims,
                axis,
                plan.as_ref(),
                &mut self.scratch,
                &mut self.line,
            );
        }
    }

    /// In-place inverse transform (unnormalised).
    pub fn inverse(&mut self, data: &mut [Complex<T>]) {
        for axis in 0..self.dims.len() {
            let plan = Arc::clone(&self.inverse[axis]);
            apply_axis(
                data,
                &self.dims,
                axis,
                plan.as_ref(),
                &mut self.scratch,
                &mut self.line,
            );
        }
    }
}

/// Real N-D FFT plan: realfft along axis 0, complex plans on the rest.
pub struct RealFftNd<T: FftNum> {
    dims: Vec<usize>,
    spec_dims: Vec<usize>,
    r2c: Arc<dyn RealToComplex<T>>,
    c2r: Arc<dyn ComplexToReal<T>>,
    forward: Vec<Arc<dyn Fft<T>>>,
    inverse: Vec<Arc<dyn Fft<T>>>,
    real_scratch: Vec<Complex<T>>,
    scratch: Vec<Complex<T>>,
    line: Vec<Complex<T>>,
}

impl<T: FftNum> RealFftNd<T> {
    pub fn new(dims: &[usize]) -> Self {
        let mut spec_dims = dims.to_vec();
        spec_dims[0] = dims[0] / 2 + 1;

        let mut real_planner = RealFftPlanner::new();
        let r2c = real_planner.plan_fft_forward(dims[0]);
        let c2r = real_planner.plan_fft_inverse(dims[0]);
        let real_scratch_len = r2c.get_scratch_len().max(c2r.get_scratch_len());

        let mut planner = FftPlanner::new();
        let forward: Vec<_> = dims[1..]
            .iter()
            .map(|&n| planner.plan_fft_forward(n))
            .collect();
        let inverse: Vec<_> = dims[1..]
            .iter()
            .map(|&n| planner.plan_fft_inverse(n))
            .collect();
        let scratch_len = forward
            .iter()
            .chain(inverse.iter())
            .map(|p| p.get_inplace_scratch_len())
            .max()
            .unwrap_or(0);
        let line_len = spec_dims.iter().copied().max().unwrap_or(0);

        RealFftNd {
            dims: dims.to_vec(),
            spec_dims,
            r2c,
            c2r,
            forward,
            inverse,
            real_scratch: vec![Complex::new(T::zero(), T::zero()); real_scratch_len],
            scratch: vec![Complex::new(T::zero(), T::zero()); scratch_len],
            line: vec![Complex::new(T::zero(), T::zero()); line_len],
        }
    }

    /// Half-spectrum dimensions `(n1/2 + 1, n2, ...)`.
    pub fn spec_dims(&self) -> &[usize] {
        &self.spec_dims
    }

    /// Forward transform of `real` into the half-spectrum buffer `spec`.
    /// The real buffer is consumed as scratch by the axis-0 pass.
    pub fn forward(&mut self, real: &mut [T], spec: &mut [Complex<T>]) -> NufftResult<()> {
        let n0 = self.dims[0];
        let s0 = self.spec_dims[0];
        for (rline, sline) in real.chunks_exact_mut(n0).zip(spec.chunks_exact_mut(s0)) {
            self.r2c
                .process_with_scratch(rline, sline, &mut self.real_scratch)?;
        }
        for axis in 1..self.dims.len() {
            let plan = Arc::clone(&self.forward[axis - 1]);
            apply_axis(
                spec,
                &self.spec_dims,
                axis,
                plan.as_ref(),
                &mut self.scratch,
                &mut self.line,
            );
        }
        Ok(())
    }

    /// Inverse transform of the half-spectrum buffer `spec` into `real`.
    /// The spectrum buffer is consumed as scratch.
    pub fn inverse(&mut self, spec: &mut [Complex<T>], real: &mut [T]) -> NufftResult<()> {
        for axis in 1..self.dims.len() {
            let plan = Arc::clone(&self.inverse[axis - 1]);
            apply_axis(
                spec,
                &self.spec_dims,
                axis,
                plan.as_ref(),
                &mut self.scratch,
                &mut self.line,
            );
        }
        let n0 = self.dims[0];
        let s0 = self.spec_dims[0];
        for (sline, rline) in spec.chunks_exact_mut(s0).zip(real.chunks_exact_mut(n0)) {
            self.c2r
                .process_with_scratch(sline, rline, &mut self.real_scratch)?;
        }
        Ok(())
    }
}

/// Run a 1-D plan along `axis` of a flat Fortran-order buffer.
///
/// Axis-0 lines are contiguous and processed in place; other axes are
/// gathered into a line buffer, transformed, and scattered back.
fn apply_axis<T: FftNum>(
    data: &mut [Complex<T>],
    dims: &[usize],
    axis: usize,
    plan: &dyn Fft<T>,
    scratch: &mut [Complex<T>],
    line: &mut [Complex<T>],
) {
    let n = dims[axis];
    debug_assert_eq!(data.len(), dims.iter().product::<usize>());

    if axis == 0 {
        for chunk in data.chunks_exact_mut(n) {
            plan.process_with_scratch(chunk, scratch);
        }
        return;
    }

    let stride: usize = dims[..axis].iter().product();
    let block = stride * n;
    let blocks = data.len() / block;
    let line = &mut line[..n];
    for b in 0..blocks {
        let base_block = b * block;
        for inner in 0..stride {
            let base = base_block + inner;
            for (t, slot) in line.iter_mut().enumerate() {
                *slot = data[base + t * stride];
            }
            plan.process_with_scratch(line, scratch);
            for (t, &v) in line.iter().enumerate() {
                data[base + t * stride] = v;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;
    use std::f64::consts::PI;

    fn direct_dft_2d(x: &[Complex64], n1: usize, n2: usize) -> Vec<Complex64> {
        let mut out = vec![Complex64::default(); n1 * n2];
        for k2 in 0..n2 {
            for k1 in 0..n1 {
                let mut acc = Complex64::default();
                for j2 in 0..n2 {
                    for j1 in 0..n1 {
                        let phase = -2.0 * PI
                            * (j1 as f64 * k1 as f64 / n1 as f64
                                + j2 as f64 * k2 as f64 / n2 as f64);
                        acc += x[j1 + j2 * n1] * Complex64::new(phase.cos(), phase.sin());
                    }
                }
                out[k1 + k2 * n1] = acc;
            }
        }
        out
    }

    #[test]
    fn test_complex_matches_direct_dft() {
        let (n1, n2) = (4, 3);
        let mut data: Vec<Complex64> = (0..n1 * n2)
            .map(|i| Complex64::new(i as f64 * 0.7 - 2.0, (i as f64).sin()))
            .collect();
        let want = direct_dft_2d(&data, n1, n2);
        let mut fft = ComplexFftNd::new(&[n1, n2]);
        fft.forward(&mut data);
        for (got, want) in data.iter().zip(want.iter()) {
            assert!(
                (got - want).norm() < 1e-10,
                "forward DFT mismatch: {} vs {}",
                got,
                want
            );
        }
    }

    #[test]
    fn test_complex_roundtrip_3d() {
        let dims = [4usize, 6, 5];
        let total: usize = dims.iter().product();
        let original: Vec<Complex64> = (0..total)
            .map(|i| Complex64::new((i as f64 * 0.31).cos(), (i as f64 * 0.17).sin()))
            .collect();
        let mut data = original.clone();
        let mut fft = ComplexFftNd::new(&dims);
        fft.forward(&mut data);
        fft.inverse(&mut data);
        let scale = 1.0 / total as f64;
        for (i, (got, want)) in data.iter().zip(original.iter()).enumerate() {
            assert!(
                (got * scale - want).norm() < 1e-10,
                "roundtrip mismatch at index {}",
                i
            );
        }
    }

    #[test]
    fn test_real_matches_complex_on_real_data() {
        let dims = [8usize, 5];
        let total: usize = dims.iter().product();
        let real_data: Vec<f64> = (0..total).map(|i| (i as f64 * 0.37).sin() + 0.2).collect();

        let mut complex_data: Vec<Complex64> =
            real_data.iter().map(|&v| Complex64::new(v, 0.0)).collect();
        let mut cfft = ComplexFftNd::new(&dims);
        cfft.forward(&mut complex_data);

        let mut rfft = RealFftNd::new(&dims);
        let s0 = rfft.spec_dims()[0];
        let mut real_buf = real_data.clone();
        let mut spec = vec![Complex64::default(); s0 * dims[1]];
        rfft.forward(&mut real_buf, &mut spec).unwrap();

        for k2 in 0..dims[1] {
            for k1 in 0..s0 {
                let got = spec[k1 + k2 * s0];
                let want = complex_data[k1 + k2 * dims[0]];
                assert!(
                    (got - want).norm() < 1e-10,
                    "half-spectrum mismatch at ({}, {})",
                    k1,
                    k2
                );
            }
        }
    }

    #[test]
    fn test_real_roundtrip() {
        let dims = [16usize, 3, 4];
        let total: usize = dims.iter().product();
        let original: Vec<f64> = (0..total).map(|i| (i as f64 * 0.29).cos()).collect();

        let mut rfft = RealFftNd::new(&dims);
        let spec_total: usize = rfft.spec_dims().iter().product();
        let mut real_buf = original.clone();
        let mut spec = vec![Complex64::default(); spec_total];
        rfft.forward(&mut real_buf, &mut spec).unwrap();
        let mut out = vec![0.0f64; total];
        rfft.inverse(&mut spec, &mut out).unwrap();

        let scale = 1.0 / total as f64;
        for (i, (&got, &want)) in out.iter().zip(original.iter()).enumerate() {
            assert!(
                (got * scale - want).abs() < 1e-10,
                "real roundtrip mismatch at {}: {} vs {}",
                i,
                got * scale,
                want
            );
        }
    }
}
