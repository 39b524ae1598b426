//! Type-2 interpolation: gather oversampled grids at non-uniform points.
//!
//! The mirror image of spreading: the same per-axis kernel stencils (with
//! the grid step folded in) reduce the 2M^D neighbouring cells of each
//! point by the tensor product. Reads only, so point chunks run in
//! parallel without coordination.

use num_traits::{Float, FloatConst, Zero};
use rayon::prelude::*;
use std::ops::{AddAssign, Mul};

use crate::kernels::SpreadKernel;
use crate::spread::PointStencil;

/// Below this many points the serial path wins.
const PAR_MIN_POINTS: usize = 2048;

/// Reduce one channel grid by the tensor-product stencil.
#[inline]
fn gather<T, V>(stencil: &PointStencil<T>, dims: &[usize], grid: &[V]) -> V
where
    T: Float + FloatConst,
    V: Copy + Zero + AddAssign + Mul<T, Output = V>,
{
    match dims.len() {
        1 => gather_axis0(stencil, 0, grid),
        2 => {
            let n0 = dims[0];
            let mut acc = V::zero();
            for (j1, &w1) in stencil.vals(1).iter().enumerate() {
                let base = stencil.row(1, j1) * n0;
                acc += gather_axis0(stencil, base, grid) * w1;
            }
            acc
        }
        _ => {
            let n0 = dims[0];
            let n01 = dims[0] * dims[1];
            let mut acc = V::zero();
            for (j2, &w2) in stencil.vals(2).iter().enumerate() {
                let plane = stencil.row(2, j2) * n01;
                let mut acc1 = V::zero();
                for (j1, &w1) in stencil.vals(1).iter().enumerate() {
                    let base = plane + stencil.row(1, j1) * n0;
                    acc1 += gather_axis0(stencil, base, grid) * w1;
                }
                acc += acc1 * w2;
            }
            acc
        }
    }
}

#[inline]
fn gather_axis0<T, V>(stencil: &PointStencil<T>, base: usize, grid: &[V]) -> V
where
    T: Float + FloatConst,
    V: Copy + Zero + AddAssign + Mul<T, Output = V>,
{
    let mut acc = V::zero();
    match stencil.start_of(0) {
        Some(s) => {
            let run = &grid[base + s..base + s + stencil.vals(0).len()];
            for (&g, &w) in run.iter().zip(stencil.vals(0).iter()) {
                acc += g * w;
            }
        }
        None => {
            for (&i0, &w) in stencil.indices(0).iter().zip(stencil.vals(0).iter()) {
                acc += grid[base + i0] * w;
            }
        }
    }
    acc
}

/// Evaluate the interpolant of C channel grids at a contiguous range of
/// points, writing into per-channel output chunks starting at point
/// `start`.
fn interp_range<T, V>(
    kernels: &[SpreadKernel<T>],
    dims: &[usize],
    xs: &[Vec<T>],
    grids: &[V],
    vol: usize,
    start: usize,
    outs: &mut [&mut [V]],
) where
    T: Float + FloatConst,
    V: Copy + Zero + AddAssign + Mul<T, Output = V>,
{
    let m = kernels[0].half_support();
    let mut stencil = PointStencil::new(m, kernels.len());
    let len = outs.first().map_or(0, |o| o.len());
    for off in 0..len {
        stencil.compute(kernels, dims, xs, start + off);
        for (channel, out) in outs.iter_mut().enumerate() {
            out[off] = gather(&stencil, dims, &grids[channel * vol..(channel + 1) * vol]);
        }
    }
}

/// Interpolate C channel grids at all points.
///
/// `grids` holds C grids of `dims` concatenated; `out` one value vector
/// per channel. No accumulation across points.
pub fn interpolate<T, V>(
    kernels: &[SpreadKernel<T>],
    dims: &[usize],
    xs: &[Vec<T>],
    grids: &[V],
    out: &mut [&mut [V]],
) where
    T: Float + FloatConst + Send + Sync,
    V: Copy + Zero + AddAssign + Mul<T, Output = V> + Send + Sync,
{
    let vol: usize = dims.iter().product();
    let total = xs.first().map_or(0, |axis| axis.len());
    if total == 0 {
        return;
    }

    let threads = rayon::current_num_threads();
    if total < PAR_MIN_POINTS || threads <= 1 {
        let mut outs: Vec<&mut [V]> = out.iter_mut().map(|o| &mut o[..]).collect();
        interp_range(kernels, dims, xs, grids, vol, 0, &mut outs);
        return;
    }

    // Carve each channel slice into aligned point chunks.
    let chunk = (total + threads - 1) / threads;
    let mut groups: Vec<(usize, Vec<&mut [V]>)> = Vec::new();
    let mut rest: Vec<&mut [V]> = out.iter_mut().map(|o| &mut o[..]).collect();
    let mut start = 0;
    while start < total {
        let len = chunk.min(total - start);
        let mut heads = Vec::with_capacity(rest.len());
        let mut tails = Vec::with_capacity(rest.len());
        for slice in rest {
            let (head, tail) = slice.split_at_mut(len);
            heads.push(head);
            tails.push(tail);
        }
        groups.push((start, heads));
        rest = tails;
        start += len;
    }

    groups.into_par_iter().for_each(|(start, mut outs)| {
        interp_range(kernels, dims, xs, grids, vol, start, &mut outs);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::{KernelKind, SpreadKernel};
    use crate::spread::spread;
    use num_complex::Complex64;
    use std::f64::consts::PI;

    fn kernel(kind: KernelKind, m: usize, n: usize) -> SpreadKernel<f64> {
        SpreadKernel::optimal(kind, m, 2.0 * PI / n as f64, 2.0, m + 4).unwrap()
    }

    #[test]
    fn test_single_frequency_grid() {
        // Interpolating samples of cos(3x) approximates ghat(3) cos(3x).
        let n = 64;
        let m = 5;
        let k = kernel(KernelKind::KaiserBesselBackwards, m, n);
        let dx = 2.0 * PI / n as f64;
        let grid: Vec<f64> = (0..n).map(|j| (3.0 * j as f64 * dx).cos()).collect();
        let ghat3 = k.fourier(3.0);
        let kernels = vec![k];

        let xs: Vec<f64> = vec![0.31, 1.7, 3.9, 5.2, 6.1];
        let mut vals = vec![0.0f64; xs.len()];
        {
            let mut out: Vec<&mut [f64]> = vec![&mut vals[..]];
            interpolate(&kernels, &[n], &[xs.clone()], &grid, &mut out);
        }
        for (x, v) in xs.iter().zip(vals.iter()) {
            let want = ghat3 * (3.0 * x).cos();
            assert!(
                (v - want).abs() < 1e-5 * ghat3.abs(),
                "interpolant {} vs {} at x = {}",
                v,
                want,
                x
            );
        }
    }

    #[test]
    fn test_adjoint_of_spread() {
        // <spread(v), g> = <v, interp(g)> as a bilinear identity.
        let n0 = 18;
        let n1 = 14;
        let m = 3;
        let k0 = kernel(KernelKind::KaiserBessel, m, n0);
        let k1 = kernel(KernelKind::KaiserBessel, m, n1);
        let kernels = vec![k0, k1];
        let dims = [n0, n1];
        let vol = n0 * n1;

        let points = 40;
        let xs: Vec<Vec<f64>> = vec![
            (0..points)
                .map(|i| 2.0 * PI * ((i as f64 * 0.7548776662) % 1.0))
                .collect(),
            (0..points)
                .map(|i| 2.0 * PI * ((i as f64 * 0.5698402910) % 1.0))
                .collect(),
        ];
        let v: Vec<Complex64> = (0..points)
            .map(|i| Complex64::new((i as f64 * 0.9).cos(), (i as f64 * 0.4).sin()))
            .collect();
        let g: Vec<Complex64> = (0..vol)
            .map(|i| Complex64::new((i as f64 * 0.13).sin(), (i as f64 * 0.07).cos()))
            .collect();

        let mut spread_v = vec![Complex64::default(); vol];
        spread(&kernels, &dims, &xs, &[&v], &mut spread_v);
        let lhs: Complex64 = spread_v.iter().zip(g.iter()).map(|(a, b)| a * b).sum();

        let mut interp_g = vec![Complex64::default(); points];
        {
            let mut out: Vec<&mut [Complex64]> = vec![&mut interp_g[..]];
            interpolate(&kernels, &dims, &xs, &g, &mut out);
        }
        let rhs: Complex64 = v.iter().zip(interp_g.iter()).map(|(a, b)| a * b).sum();

        assert!(
            (lhs - rhs).norm() < 1e-12 * lhs.norm().max(1.0),
            "adjoint identity broken: {} vs {}",
            lhs,
            rhs
        );
    }

    #[test]
    fn test_parallel_matches_serial() {
        let n = 50;
        let m = 4;
        let k = kernel(KernelKind::Gaussian, m, n);
        let kernels = vec![k];
        let grid: Vec<f64> = (0..n).map(|i| (i as f64 * 0.3).sin()).collect();
        let total = 4000;
        let xs: Vec<f64> = (0..total)
            .map(|i| 2.0 * PI * ((i as f64 * 0.318309886) % 1.0))
            .collect();

        let mut par = vec![0.0f64; total];
        {
            let mut out: Vec<&mut [f64]> = vec![&mut par[..]];
            interpolate(&kernels, &[n], &[xs.clone()], &grid, &mut out);
        }

        let mut ser = vec![0.0f64; total];
        {
            let mut outs: Vec<&mut [f64]> = vec![&mut ser[..]];
            interp_range(&kernels, &[n], &[xs], &grid, n, 0, &mut outs);
        }

        for (a, b) in par.iter().zip(ser.iter()) {
            assert_eq!(a, b, "gathers must be bitwise identical");
        }
    }

    #[test]
    fn test_zero_points() {
        let n = 16;
        let k = kernel(KernelKind::BSpline, 2, n);
        let kernels = vec![k];
        let grid = vec![1.0f64; n];
        let mut empty: Vec<f64> = Vec::new();
        let mut out: Vec<&mut [f64]> = vec![&mut empty[..]];
        interpolate(&kernels, &[n], &[Vec::new()], &grid, &mut out);
        assert!(empty.is_empty());
    }
}
