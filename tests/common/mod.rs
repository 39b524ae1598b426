//! Common test utilities for nufft-core integration tests:
//! direct O(N P) discrete transforms used as references, and error norms.

use num_complex::Complex64;

/// Signed wavenumbers of each axis of the coefficient grid.
pub fn wavenumber_axes(dims: &[usize]) -> Vec<Vec<f64>> {
    dims.iter()
        .map(|&n| nufft_core::grid::wavenumbers(n))
        .collect()
}

/// Decompose a flat Fortran-order index into per-axis indices.
fn unravel(mut flat: usize, dims: &[usize]) -> [usize; 3] {
    let mut idx = [0usize; 3];
    for (d, &n) in dims.iter().enumerate() {
        idx[d] = flat % n;
        flat /= n;
    }
    idx
}

/// Direct type-1: `c_k = (1/prod N_d) sum_p v_p e^{-i k . x_p}` over the
/// signed FFT layout, Fortran order.
pub fn direct_type1(dims: &[usize], xs: &[Vec<f64>], values: &[Complex64]) -> Vec<Complex64> {
    let ks = wavenumber_axes(dims);
    let total: usize = dims.iter().product();
    let scale = 1.0 / total as f64;
    let points = xs[0].len();
    let mut out = vec![Complex64::default(); total];
    for (flat, slot) in out.iter_mut().enumerate() {
        let idx = unravel(flat, dims);
        let mut acc = Complex64::default();
        for p in 0..points {
            let mut phase = 0.0;
            for d in 0..dims.len() {
                phase -= ks[d][idx[d]] * xs[d][p];
            }
            acc += values[p] * Complex64::new(phase.cos(), phase.sin());
        }
        *slot = acc * scale;
    }
    out
}

/// Direct type-2: `v_p = sum_k c_k e^{i k . x_p}`.
pub fn direct_type2(dims: &[usize], xs: &[Vec<f64>], coeffs: &[Complex64]) -> Vec<Complex64> {
    let ks = wavenumber_axes(dims);
    let points = xs[0].len();
    let mut out = vec![Complex64::default(); points];
    for (p, slot) in out.iter_mut().enumerate() {
        let mut acc = Complex64::default();
        for (flat, &c) in coeffs.iter().enumerate() {
            let idx = unravel(flat, dims);
            let mut phase = 0.0;
            for d in 0..dims.len() {
                phase += ks[d][idx[d]] * xs[d][p];
            }
            acc += c * Complex64::new(phase.cos(), phase.sin());
        }
        *slot = acc;
    }
    out
}

/// Largest elementwise distance between two complex vectors.
pub fn max_abs_err(a: &[Complex64], b: &[Complex64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).norm())
        .fold(0.0, f64::max)
}

/// Largest magnitude in a complex vector.
pub fn max_abs(a: &[Complex64]) -> f64 {
    a.iter().map(|x| x.norm()).fold(0.0, f64::max)
}
