//! Type-1 spreading: scatter non-uniform samples onto oversampled grids.
//!
//! Each point is canonicalised to [0, 2pi)^D, the per-axis kernels are
//! evaluated once (shared across channels), the grid step is folded into
//! the 1-D kernel vectors so the accumulated sums approximate integrals,
//! and the tensor product of the vectors is scattered onto the 2M^D
//! neighbouring cells with periodic wrap. The innermost axis of the tensor
//! product walks contiguous memory whenever the stencil does not cross the
//! periodic seam.
//!
//! Large point sets are spread in parallel: each worker scatters a chunk
//! of points into its own shadow grid and the shadows are summed, so the
//! result equals the serial reduction up to floating-point reassociation.

use num_traits::{Float, FloatConst, Zero};
use rayon::prelude::*;
use std::ops::{AddAssign, Mul, Range};

use crate::grid;
use crate::kernels::SpreadKernel;

/// Below this many points the serial path wins.
const PAR_MIN_POINTS: usize = 2048;
/// Shadow grids above this many elements cost more than they save.
const PAR_MAX_SHADOW: usize = 1 << 24;

/// Per-point stencil scratch: scaled kernel values, wrapped neighbour
/// indices and the contiguous fast-path start, one set per axis.
pub(crate) struct PointStencil<T> {
    vals: Vec<Vec<T>>,
    idx: Vec<Vec<usize>>,
    start: Vec<Option<usize>>,
}

impl<T: Float + FloatConst> PointStencil<T> {
    pub(crate) fn new(m: usize, ndim: usize) -> Self {
        PointStencil {
            vals: (0..ndim).map(|_| vec![T::zero(); 2 * m]).collect(),
            idx: (0..ndim).map(|_| vec![0usize; 2 * m]).collect(),
            start: vec![None; ndim],
        }
    }

    /// Evaluate kernels and neighbour indices for point `p`.
    #[inline]
    pub(crate) fn compute(
        &mut self,
        kernels: &[SpreadKernel<T>],
        dims: &[usize],
        xs: &[Vec<T>],
        p: usize,
    ) {
        for (d, kernel) in kernels.iter().enumerate() {
            let x = grid::to_unit_cell(xs[d][p]);
            let cell = kernel.evaluate(x, &mut self.vals[d]);
            let dx = kernel.dx();
            for v in self.vals[d].iter_mut() {
                *v = *v * dx;
            }
            let m = kernel.half_support();
            self.start[d] = grid::contiguous_start(cell, m, dims[d]);
            if self.start[d].is_none() {
                grid::wrapped_cells(cell, m, dims[d], &mut self.idx[d]);
            }
        }
    }

    #[inline]
    pub(crate) fn row(&self, axis: usize, j: usize) -> usize {
        match self.start[axis] {
            Some(s) => s + j,
            None => self.idx[axis][j],
        }
    }

    pub(crate) fn vals(&self, axis: usize) -> &[T] {
        &self.vals[axis]
    }

    pub(crate) fn start_of(&self, axis: usize) -> Option<usize> {
        self.start[axis]
    }

    pub(crate) fn indices(&self, axis: usize) -> &[usize] {
        &self.idx[axis]
    }
}

/// Scatter `value` times the tensor-product stencil into one channel grid.
#[inline]
fn scatter<T, V>(stencil: &PointStencil<T>, dims: &[usize], value: V, grid: &mut [V])
where
    T: Float + FloatConst,
    V: Copy + AddAssign + Mul<T, Output = V>,
{
    match dims.len() {
        1 => scatter_axis0(stencil, 0, value, grid),
        2 => {
            let n0 = dims[0];
            for (j1, &w1) in stencil.vals(1).iter().enumerate() {
                let base = stencil.row(1, j1) * n0;
                scatter_axis0(stencil, base, value * w1, grid);
            }
        }
        _ => {
            let n0 = dims[0];
            let n01 = dims[0] * dims[1];
            for (j2, &w2) in stencil.vals(2).iter().enumerate() {
                let plane = stencil.row(2, j2) * n01;
                let v2 = value * w2;
                for (j1, &w1) in stencil.vals(1).iter().enumerate() {
                    let base = plane + stencil.row(1, j1) * n0;
                    scatter_axis0(stencil, base, v2 * w1, grid);
                }
            }
        }
    }
}

#[inline]
fn scatter_axis0<T, V>(stencil: &PointStencil<T>, base: usize, value: V, grid: &mut [V])
where
    T: Float + FloatConst,
    V: Copy + AddAssign + Mul<T, Output = V>,
{
    match stencil.start[0] {
        Some(s) => {
            let run = &mut grid[base + s..base + s + stencil.vals[0].len()];
            for (slot, &w) in run.iter_mut().zip(stencil.vals[0].iter()) {
                *slot += value * w;
            }
        }
        None => {
            for (&i0, &w) in stencil.idx[0].iter().zip(stencil.vals[0].iter()) {
                grid[base + i0] += value * w;
            }
        }
    }
}

/// Spread a range of points into `out` (C channel grids, concatenated).
fn spread_range<T, V>(
    kernels: &[SpreadKernel<T>],
    dims: &[usize],
    xs: &[Vec<T>],
    values: &[&[V]],
    out: &mut [V],
    vol: usize,
    range: Range<usize>,
) where
    T: Float + FloatConst,
    V: Copy + AddAssign + Mul<T, Output = V>,
{
    let m = kernels[0].half_support();
    let mut stencil = PointStencil::new(m, kernels.len());
    for p in range {
        stencil.compute(kernels, dims, xs, p);
        for (channel, channel_values) in values.iter().enumerate() {
            let grid = &mut out[channel * vol..(channel + 1) * vol];
            scatter(&stencil, dims, channel_values[p], grid);
        }
    }
}

/// Spread all points into the zero-initialised channel grids `out`.
///
/// `xs` holds one coordinate vector per axis, `values` one sample vector
/// per channel, `out` C grids of `dims` concatenated. Deterministic for a
/// fixed point ordering and worker count.
pub fn spread<T, V>(
    kernels: &[SpreadKernel<T>],
    dims: &[usize],
    xs: &[Vec<T>],
    values: &[&[V]],
    out: &mut [V],
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
    if total < PAR_MIN_POINTS || threads <= 1 || out.len() > PAR_MAX_SHADOW {
        spread_range(kernels, dims, xs, values, out, vol, 0..total);
        return;
    }

    let chunk = (total + threads - 1) / threads;
    let ranges: Vec<Range<usize>> = (0..threads)
        .map(|t| t * chunk..((t + 1) * chunk).min(total))
        .filter(|r| !r.is_empty())
        .collect();

    let merged = ranges
        .into_par_iter()
        .map(|range| {
            let mut shadow = vec![V::zero(); out.len()];
            spread_range(kernels, dims, xs, values, &mut shadow, vol, range);
            shadow
        })
        .reduce_with(|mut a, b| {
            for (x, y) in a.iter_mut().zip(b) {
                *x += y;
            }
            a
        });
    if let Some(merged) = merged {
        for (slot, v) in out.iter_mut().zip(merged) {
            *slot += v;
        }
    }
}
