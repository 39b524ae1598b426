//! Plan construction and the type-1 / type-2 transform drivers.
//!
//! A plan fixes, at construction: element type, dimensions, oversampled
//! grid sizes ({2,3,5}-smooth, at least the requested oversampling factor
//! times the coefficient grid), one kernel descriptor per axis with its
//! Fourier samples bound to the axis wavenumbers, the FFT plans, and the
//! oversampled buffers. Point sets may be rebound between transforms;
//! buffers are reused and nothing allocates on the transform path.
//!
//! Conventions: period 2pi per axis; type-1 computes
//! `c_k = (1/prod N_d) sum_p v_p e^{-i k x_p}` and type-2 evaluates
//! `v_p = sum_k c_k e^{i k x_p}`, with coefficients in the FFT-natural
//! layout (signed wavenumbers; real plans use the half-spectrum
//! `0..=N_1/2` on axis 1).

use log::{debug, trace};
use num_complex::Complex;
use num_traits::{Float, FloatConst, NumAssign};
use rustfft::FftNum;

use crate::error::{NufftError, NufftResult};
use crate::fft::{ComplexFftNd, RealFftNd};
use crate::grid;
use crate::interp::interpolate;
use crate::kernels::{KernelKind, SpreadKernel};
use crate::spread::spread;
use crate::{cast, to_f64};

/// Plan parameters with library defaults.
#[derive(Debug, Clone, Copy)]
pub struct PlanConfig {
    pub kernel: KernelKind,
    /// Kernel half-support M in oversampled cells.
    pub half_support: usize,
    /// Requested oversampling factor (>= 1).
    pub oversampling: f64,
    /// Co-located sample channels per point.
    pub channels: usize,
    /// Coefficients per polynomial piece; 0 selects M + 4.
    pub poly_size: usize,
}

impl Default for PlanConfig {
    fn default() -> Self {
        PlanConfig {
            kernel: KernelKind::KaiserBesselBackwards,
            half_support: 4,
            oversampling: 2.0,
            channels: 1,
            poly_size: 0,
        }
    }
}

/// State shared by the real and complex plans.
struct PlanCore<T> {
    dims: Vec<usize>,
    over_dims: Vec<usize>,
    sigma: f64,
    channels: usize,
    kernels: Vec<SpreadKernel<T>>,
    /// Per-axis wavenumbers of the coefficient grid.
    ks: Vec<Vec<T>>,
    /// Oversampled-spectrum bin of each wavenumber.
    bins: Vec<Vec<usize>>,
    /// Reciprocal kernel transform per wavenumber (deconvolution weights).
    winv: Vec<Vec<T>>,
    /// Struct-of-arrays point coordinates; canonicalised on use.
    points: Vec<Vec<T>>,
}

impl<T: FftNum + Float + FloatConst + NumAssign> PlanCore<T> {
    fn new(dims: &[usize], config: &PlanConfig, real: bool) -> NufftResult<Self> {
        let ndim = dims.len();
        if !(1..=3).contains(&ndim) {
            return Err(NufftError::UnsupportedDimension(ndim));
        }
        if config.channels < 1 {
            return Err(NufftError::InvalidChannelCount);
        }
        if !(config.oversampling >= 1.0) {
            return Err(NufftError::InvalidOversampling(config.oversampling));
        }
        if config.half_support < 1 {
            return Err(NufftError::InvalidHalfSupport);
        }
        let m = config.half_support;
        let poly_size = if config.poly_size == 0 {
            (m + 4).min(16)
        } else {
            config.poly_size
        };

        let over_dims: Vec<usize> = dims
            .iter()
            .map(|&n| grid::next_smooth((config.oversampling * n as f64).floor() as usize))
            .collect();
        for (axis, &over) in over_dims.iter().enumerate() {
            if 2 * m >= over {
                return Err(NufftError::HalfSupportTooLarge {
                    axis,
                    m,
                    size: over,
                });
            }
        }
        let sigma = over_dims
            .iter()
            .zip(dims.iter())
            .map(|(&o, &n)| o as f64 / n as f64)
            .fold(1.0f64, f64::max);

        let mut kernels = Vec::with_capacity(ndim);
        let mut ks = Vec::with_capacity(ndim);
        let mut bins = Vec::with_capacity(ndim);
        let mut winv = Vec::with_capacity(ndim);
        for axis in 0..ndim {
            let n = dims[axis];
            let over = over_dims[axis];
            let dx = 2.0 * std::f64::consts::PI / over as f64;
            // Each axis gets the shape matched to its own grid ratio.
            let axis_sigma = over as f64 / n as f64;
            let mut kernel =
                SpreadKernel::optimal(config.kernel, m, dx, axis_sigma, poly_size)?;

            let axis_ks: Vec<T> = if real && axis == 0 {
                grid::rfft_wavenumbers(n)
            } else {
                grid::wavenumbers(n)
            };
            kernel.bind_wavenumbers(&axis_ks);
            let axis_bins: Vec<usize> = axis_ks
                .iter()
                .map(|&k| grid::spectrum_bin(to_f64(k), over))
                .collect();
            let axis_winv: Vec<T> = kernel
                .ghat()
                .iter()
                .map(|&g| T::one() / g)
                .collect();

            kernels.push(kernel);
            ks.push(axis_ks);
            bins.push(axis_bins);
            winv.push(axis_winv);
        }

        debug!(
            "nufft plan: dims {:?}, oversampled {:?}, sigma {:.3}, kernel {:?}, m {}, shape {:.4}",
            dims,
            over_dims,
            sigma,
            config.kernel,
            m,
            kernels[0].shape()
        );

        Ok(PlanCore {
            dims: dims.to_vec(),
            over_dims,
            sigma,
            channels: config.channels,
            kernels,
            ks,
            bins,
            winv,
            points: vec![Vec::new(); ndim],
        })
    }

    fn set_points(&mut self, xs: &[&[T]]) -> NufftResult<()> {
        if xs.len() != self.dims.len() {
            return Err(NufftError::PointDimensionMismatch {
                expected: self.dims.len(),
                got: xs.len(),
            });
        }
        let count = xs[0].len();
        for axis in xs.iter() {
            if axis.len() != count {
                return Err(NufftError::LengthMismatch {
                    what: "point coordinates",
                    expected: count,
                    got: axis.len(),
                });
            }
        }
        for (store, axis) in self.points.iter_mut().zip(xs.iter()) {
            store.clear();
            store.extend_from_slice(axis);
        }
        trace!("nufft plan: bound {} points", count);
        Ok(())
    }

    fn num_points(&self) -> usize {
        self.points[0].len()
    }

    fn check_channels(&self, values: usize, outs: usize) -> NufftResult<()> {
        if values != self.channels {
            return Err(NufftError::ChannelMismatch {
                expected: self.channels,
                got: values,
            });
        }
        if outs != self.channels {
            return Err(NufftError::ChannelMismatch {
                expected: self.channels,
                got: outs,
            });
        }
        Ok(())
    }
}

/// Gather the coefficient subset out of an oversampled spectrum, applying
/// the per-axis deconvolution weights and a global scale.
fn truncate_spectrum<T: FftNum + Float>(
    src: &[Complex<T>],
    out: &mut [Complex<T>],
    coeff_dims: &[usize],
    bins: &[Vec<usize>],
    strides: &[usize],
    winv: &[Vec<T>],
    scale: T,
) {
    match coeff_dims.len() {
        1 => {
            for i0 in 0..coeff_dims[0] {
                out[i0] = src[bins[0][i0]] * (winv[0][i0] * scale);
            }
        }
        2 => {
            let n0 = coeff_dims[0];
            for i1 in 0..coeff_dims[1] {
                let base = bins[1][i1] * strides[1];
                let w1 = winv[1][i1] * scale;
                let row = i1 * n0;
                for i0 in 0..n0 {
                    out[row + i0] = src[bins[0][i0] + base] * (winv[0][i0] * w1);
                }
            }
        }
        _ => {
            let n0 = coeff_dims[0];
            let n1 = coeff_dims[1];
            for i2 in 0..coeff_dims[2] {
                let base2 = bins[2][i2] * strides[2];
                let w2 = winv[2][i2] * scale;
                for i1 in 0..n1 {
                    let base = base2 + bins[1][i1] * strides[1];
                    let w1 = winv[1][i1] * w2;
                    let row = (i2 * n1 + i1) * n0;
                    for i0 in 0..n0 {
                        out[row + i0] = src[bins[0][i0] + base] * (winv[0][i0] * w1);
                    }
                }
            }
        }
    }
}

/// Scatter coefficients into a zeroed oversampled spectrum, applying the
/// per-axis deconvolution weights.
fn pad_spectrum<T: FftNum + Float>(
    coeffs: &[Complex<T>],
    dst: &mut [Complex<T>],
    coeff_dims: &[usize],
    bins: &[Vec<usize>],
    strides: &[usize],
    winv: &[Vec<T>],
) {
    match coeff_dims.len() {
        1 => {
            for i0 in 0..coeff_dims[0] {
                dst[bins[0][i0]] = coeffs[i0] * winv[0][i0];
            }
        }
        2 => {
            let n0 = coeff_dims[0];
            for i1 in 0..coeff_dims[1] {
                let base = bins[1][i1] * strides[1];
                let w1 = winv[1][i1];
                let row = i1 * n0;
                for i0 in 0..n0 {
                    dst[bins[0][i0] + base] = coeffs[row + i0] * (winv[0][i0] * w1);
                }
            }
        }
        _ => {
            let n0 = coeff_dims[0];
            let n1 = coeff_dims[1];
            for i2 in 0..coeff_dims[2] {
                let base2 = bins[2][i2] * strides[2];
                let w2 = winv[2][i2];
                for i1 in 0..n1 {
                    let base = base2 + bins[1][i1] * strides[1];
                    let w1 = winv[1][i1] * w2;
                    let row = (i2 * n1 + i1) * n0;
                    for i0 in 0..n0 {
                        dst[bins[0][i0] + base] = coeffs[row + i0] * (winv[0][i0] * w1);
                    }
                }
            }
        }
    }
}

/// Fortran-order strides of a grid.
fn strides_of(dims: &[usize]) -> Vec<usize> {
    let mut strides = vec![1usize; dims.len()];
    for d in 1..dims.len() {
        strides[d] = strides[d - 1] * dims[d - 1];
    }
    strides
}

/// NUFFT plan for complex-valued samples and a full signed spectrum.
pub struct Plan<T: FftNum + Float + FloatConst + NumAssign> {
    core: PlanCore<T>,
    us: Vec<Complex<T>>,
    fft: ComplexFftNd<T>,
    strides: Vec<usize>,
}

impl<T: FftNum + Float + FloatConst + NumAssign> Plan<T> {
    pub fn new(dims: &[usize], config: PlanConfig) -> NufftResult<Self> {
        let core = PlanCore::new(dims, &config, false)?;
        let vol: usize = core.over_dims.iter().product();
        let fft = ComplexFftNd::new(&core.over_dims);
        let strides = strides_of(&core.over_dims);
        Ok(Plan {
            us: vec![Complex::new(T::zero(), T::zero()); core.channels * vol],
            fft,
            strides,
            core,
        })
    }

    /// Coefficient grid dimensions.
    pub fn dims(&self) -> &[usize] {
        &self.core.dims
    }

    /// Oversampled grid dimensions.
    pub fn over_dims(&self) -> &[usize] {
        &self.core.over_dims
    }

    /// Effective oversampling factor.
    pub fn sigma(&self) -> f64 {
        self.core.sigma
    }

    pub fn channels(&self) -> usize {
        self.core.channels
    }

    pub fn num_points(&self) -> usize {
        self.core.num_points()
    }

    /// Signed wavenumbers of one coefficient-grid axis.
    pub fn wavenumbers(&self, axis: usize) -> &[T] {
        &self.core.ks[axis]
    }

    /// Rebind the non-uniform point set (one coordinate slice per axis).
    pub fn set_points(&mut self, xs: &[&[T]]) -> NufftResult<()> {
        self.core.set_points(xs)
    }

    fn coeff_len(&self) -> usize {
        self.core.dims.iter().product()
    }

    /// Type-1: non-uniform samples to Fourier coefficients.
    pub fn exec_type1(
        &mut self,
        values: &[&[Complex<T>]],
        out: &mut [&mut [Complex<T>]],
    ) -> NufftResult<()> {
        self.core.check_channels(values.len(), out.len())?;
        let points = self.core.num_points();
        for channel_values in values {
            if channel_values.len() != points {
                return Err(NufftError::LengthMismatch {
                    what: "sample values",
                    expected: points,
                    got: channel_values.len(),
                });
            }
        }
        let coeff_len = self.coeff_len();
        for channel_out in out.iter() {
            if channel_out.len() != coeff_len {
                return Err(NufftError::LengthMismatch {
                    what: "output coefficients",
                    expected: coeff_len,
                    got: channel_out.len(),
                });
            }
        }

        self.us.fill(Complex::new(T::zero(), T::zero()));
        spread(
            &self.core.kernels,
            &self.core.over_dims,
            &self.core.points,
            values,
            &mut self.us,
        );

        let vol: usize = self.core.over_dims.iter().product();
        let strides = &self.strides;
        let scale: T = cast(1.0 / coeff_len as f64);
        for (channel, channel_out) in out.iter_mut().enumerate() {
            let grid = &mut self.us[channel * vol..(channel + 1) * vol];
            self.fft.forward(grid);
            truncate_spectrum(
                grid,
                channel_out,
                &self.core.dims,
                &self.core.bins,
                strides,
                &self.core.winv,
                scale,
            );
        }
        Ok(())
    }

    /// Type-2: Fourier coefficients to non-uniform samples.
    pub fn exec_type2(
        &mut self,
        coeffs: &[&[Complex<T>]],
        out: &mut [&mut [Complex<T>]],
    ) -> NufftResult<()> {
        self.core.check_channels(coeffs.len(), out.len())?;
        let coeff_len = self.coeff_len();
        for channel_coeffs in coeffs {
            if channel_coeffs.len() != coeff_len {
                return Err(NufftError::LengthMismatch {
                    what: "input coefficients",
                    expected: coeff_len,
                    got: channel_coeffs.len(),
                });
            }
        }
        let points = self.core.num_points();
        for channel_out in out.iter() {
            if channel_out.len() != points {
                return Err(NufftError::LengthMismatch {
                    what: "sample values",
                    expected: points,
                    got: channel_out.len(),
                });
            }
        }

        let vol: usize = self.core.over_dims.iter().product();
        let strides = &self.strides;
        self.us.fill(Complex::new(T::zero(), T::zero()));
        for (channel, channel_coeffs) in coeffs.iter().enumerate() {
            let grid = &mut self.us[channel * vol..(channel + 1) * vol];
            pad_spectrum(
                channel_coeffs,
                grid,
                &self.core.dims,
                &self.core.bins,
                strides,
                &self.core.winv,
            );
            self.fft.inverse(grid);
        }

        interpolate(
            &self.core.kernels,
            &self.core.over_dims,
            &self.core.points,
            &self.us,
            out,
        );
        Ok(())
    }
}

/// NUFFT plan for real-valued samples with half-spectrum coefficients on
/// axis 1 (layout `(N_1/2 + 1, N_2, ..., N_D)`).
pub struct RealPlan<T: FftNum + Float + FloatConst + NumAssign> {
    core: PlanCore<T>,
    us: Vec<T>,
    uhat: Vec<Complex<T>>,
    fft: RealFftNd<T>,
    coeff_dims: Vec<usize>,
    strides: Vec<usize>,
    /// Deconvolution weights for the type-2 fill; differ from the
    /// truncation weights only in the axis-1 Nyquist cosine split.
    fill_winv: Vec<Vec<T>>,
}

impl<T: FftNum + Float + FloatConst + NumAssign> RealPlan<T> {
    pub fn new(dims: &[usize], config: PlanConfig) -> NufftResult<Self> {
        let core = PlanCore::new(dims, &config, true)?;
        let vol: usize = core.over_dims.iter().product();
        let fft = RealFftNd::new(&core.over_dims);
        let spec_vol: usize = fft.spec_dims().iter().product();
        let strides = strides_of(fft.spec_dims());

        let mut coeff_dims = core.dims.clone();
        coeff_dims[0] = core.dims[0] / 2 + 1;

        // The coefficient at k = N_1/2 is a cosine mode. On a strictly
        // larger grid it splits across +-N_1/2, so the fill halves it;
        // when the grids coincide the bin stays self-conjugate.
        let mut fill_winv = core.winv.clone();
        let n0 = core.dims[0];
        if n0 % 2 == 0 && n0 < core.over_dims[0] {
            let last = fill_winv[0].len() - 1;
            fill_winv[0][last] = fill_winv[0][last] * cast(0.5);
        }

        Ok(RealPlan {
            us: vec![T::zero(); core.channels * vol],
            uhat: vec![Complex::new(T::zero(), T::zero()); core.channels * spec_vol],
            fft,
            coeff_dims,
            strides,
            fill_winv,
            core,
        })
    }

    pub fn dims(&self) -> &[usize] {
        &self.core.dims
    }

    pub fn over_dims(&self) -> &[usize] {
        &self.core.over_dims
    }

    /// Half-spectrum coefficient dimensions `(N_1/2 + 1, N_2, ...)`.
    pub fn coeff_dims(&self) -> &[usize] {
        &self.coeff_dims
    }

    pub fn sigma(&self) -> f64 {
        self.core.sigma
    }

    pub fn channels(&self) -> usize {
        self.core.channels
    }

    pub fn num_points(&self) -> usize {
        self.core.num_points()
    }

    /// Wavenumbers of one coefficient-grid axis (half-spectrum on axis 0).
    pub fn wavenumbers(&self, axis: usize) -> &[T] {
        &self.core.ks[axis]
    }

    pub fn set_points(&mut self, xs: &[&[T]]) -> NufftResult<()> {
        self.core.set_points(xs)
    }

    fn coeff_len(&self) -> usize {
        self.coeff_dims.iter().product()
    }

    /// Type-1: real samples to half-spectrum coefficients.
    pub fn exec_type1(
        &mut self,
        values: &[&[T]],
        out: &mut [&mut [Complex<T>]],
    ) -> NufftResult<()> {
        self.core.check_channels(values.len(), out.len())?;
        let points = self.core.num_points();
        for channel_values in values {
            if channel_values.len() != points {
                return Err(NufftError::LengthMismatch {
                    what: "sample values",
                    expected: points,
                    got: channel_values.len(),
                });
            }
        }
        let coeff_len = self.coeff_len();
        for channel_out in out.iter() {
            if channel_out.len() != coeff_len {
                return Err(NufftError::LengthMismatch {
                    what: "output coefficients",
                    expected: coeff_len,
                    got: channel_out.len(),
                });
            }
        }

        self.us.fill(T::zero());
        spread(
            &self.core.kernels,
            &self.core.over_dims,
            &self.core.points,
            values,
            &mut self.us,
        );

        let vol: usize = self.core.over_dims.iter().product();
        let spec_vol: usize = self.fft.spec_dims().iter().product();
        let strides = &self.strides;
        let full_len: usize = self.core.dims.iter().product();
        let scale: T = cast(1.0 / full_len as f64);
        for (channel, channel_out) in out.iter_mut().enumerate() {
            let grid = &mut self.us[channel * vol..(channel + 1) * vol];
            let spec = &mut self.uhat[channel * spec_vol..(channel + 1) * spec_vol];
            self.fft.forward(grid, spec)?;
            truncate_spectrum(
                spec,
                channel_out,
                &self.coeff_dims,
                &self.core.bins,
                strides,
                &self.core.winv,
                scale,
            );
        }
        Ok(())
    }

    /// Type-2: half-spectrum coefficients to real samples.
    pub fn exec_type2(
        &mut self,
        coeffs: &[&[Complex<T>]],
        out: &mut [&mut [T]],
    ) -> NufftResult<()> {
        self.core.check_channels(coeffs.len(), out.len())?;
        let coeff_len = self.coeff_len();
        for channel_coeffs in coeffs {
            if channel_coeffs.len() != coeff_len {
                return Err(NufftError::LengthMismatch {
                    what: "input coefficients",
                    expected: coeff_len,
                    got: channel_coeffs.len(),
                });
            }
        }
        let points = self.core.num_points();
        for channel_out in out.iter() {
            if channel_out.len() != points {
                return Err(NufftError::LengthMismatch {
                    what: "sample values",
                    expected: points,
                    got: channel_out.len(),
                });
            }
        }

        let vol: usize = self.core.over_dims.iter().product();
        let spec_vol: usize = self.fft.spec_dims().iter().product();
        let strides = &self.strides;

        self.uhat.fill(Complex::new(T::zero(), T::zero()));
        for (channel, channel_coeffs) in coeffs.iter().enumerate() {
            let grid = &mut self.us[channel * vol..(channel + 1) * vol];
            let spec = &mut self.uhat[channel * spec_vol..(channel + 1) * spec_vol];
            pad_spectrum(
                channel_coeffs,
                spec,
                &self.coeff_dims,
                &self.core.bins,
                strides,
                &self.fill_winv,
            );
            self.fft.inverse(spec, grid)?;
        }

        interpolate(
            &self.core.kernels,
            &self.core.over_dims,
            &self.core.points,
            &self.us,
            out,
        );
        Ok(())
    }
}
