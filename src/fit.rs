//! Constrained weighted least-squares fitting
//!
//! [`fit_expansion`] fits any [`BasisExpansion`] to a series of weighted
//! samples, holding a caller-chosen subset of coefficients fixed. The
//! design matrix is built column-wise from the expansion's
//! `evaluate_terms`, restricted to the free columns; the fixed columns'
//! contribution is subtracted from the right-hand side before solving.
//!
//! The system is solved through an SVD with a relative rank cutoff, which
//! tolerates rank deficiency: singular values below the cutoff are dropped
//! and the minimum-norm solution over the surviving directions is
//! returned. Only when *no* singular value survives does the fit fail;
//! short of that the caller gets a best-effort solution whose covariance
//! reports the inflated uncertainty. A degraded answer with honest error
//! bars beats a refusal to fit.

use nalgebra::{DMatrix, DVector, SVD};

use crate::chebyshev::ChebyshevSeries;
use crate::domain::Domain;
use crate::error::{Error, Result};
use crate::expansion::BasisExpansion;
use crate::legendre::LegendreSeries;
use crate::polynomial::Polynomial;

/// One point of a time/value series with its standard uncertainty.
///
/// The fit weights each residual by `1 / sigma`, so a small `sigma` pulls
/// the curve towards that sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Sampling position.
    pub t: f64,
    /// Observed value.
    pub y: f64,
    /// Standard uncertainty of `y`; must be finite and positive.
    pub sigma: f64,
}

impl Sample {
    /// An equally weighted sample (`sigma = 1`).
    #[must_use]
    pub fn new(t: f64, y: f64) -> Self {
        Self { t, y, sigma: 1.0 }
    }

    /// A sample with an explicit standard uncertainty.
    #[must_use]
    pub fn with_sigma(t: f64, y: f64, sigma: f64) -> Self {
        Self { t, y, sigma }
    }
}

/// Per-coefficient fit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoefficientMask {
    /// The fit solves for this coefficient.
    Free,
    /// The coefficient keeps the value already stored in the expansion;
    /// its contribution is subtracted from the data before solving.
    Fixed,
}

impl CoefficientMask {
    /// An all-[`CoefficientMask::Free`] mask of length `n`.
    #[must_use]
    pub fn all_free(n: usize) -> Vec<Self> {
        vec![Self::Free; n]
    }
}

/// Tuning knobs for the least-squares solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOptions {
    /// Relative singular-value cutoff. The effective threshold is
    /// `tol * max(rows, columns) * sigma_max`; singular values below it are
    /// treated as zero. Defaults to machine epsilon.
    pub tol: f64,
    /// Scale the covariance by the residual variance, turning it from a
    /// purely geometric quantity into an estimate of coefficient
    /// uncertainty under the observed noise. On by default.
    pub scale_covariance: bool,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            tol: f64::EPSILON,
            scale_covariance: true,
        }
    }
}

/// The outcome of a constrained fit.
///
/// The fitter produces this value and does not retain it; the fitted
/// coefficients are also written back into the expansion that was fitted.
#[derive(Debug, Clone, PartialEq)]
pub struct FitResult {
    /// The full coefficient vector: solved values in the free slots, the
    /// supplied values in the fixed slots.
    pub coefficients: Vec<f64>,
    /// Covariance over the free coefficients only, in mask order.
    pub covariance: DMatrix<f64>,
    /// Weighted residual sum of squares.
    pub residual_sum_of_squares: f64,
    /// Number of singular values that survived the rank cutoff.
    pub rank: usize,
}

/// Fits the free coefficients of `expansion` to `samples`.
///
/// Minimizes the weighted sum of squared residuals over the
/// [`CoefficientMask::Free`] entries, holding
/// [`CoefficientMask::Fixed`] entries at the values already stored in the
/// expansion. On success the solved values are written back into the
/// expansion's free slots.
///
/// # Errors
/// - [`Error::InvalidSize`] when the mask length does not match the
///   coefficient count, or no coefficient is free.
/// - [`Error::InvalidInput`] when a sample's `sigma` is not finite and
///   positive.
/// - [`Error::RankDeficient`] when the cutoff leaves zero usable degrees of
///   freedom (this includes an empty sample series).
/// - [`Error::Algebra`] when the SVD itself fails.
pub fn fit_expansion<E: BasisExpansion>(
    expansion: &mut E,
    samples: &[Sample],
    mask: &[CoefficientMask],
    options: &FitOptions,
) -> Result<FitResult> {
    let m = expansion.number_of_coefficients();
    if mask.len() != m {
        return Err(Error::InvalidSize("mask length must match the coefficient count"));
    }
    let free: Vec<usize> = mask
        .iter()
        .enumerate()
        .filter(|(_, &status)| status == CoefficientMask::Free)
        .map(|(j, _)| j)
        .collect();
    if free.is_empty() {
        return Err(Error::InvalidSize("at least one coefficient must be free"));
    }
    if samples.is_empty() {
        return Err(Error::RankDeficient);
    }
    if samples.iter().any(|s| !(s.sigma.is_finite() && s.sigma > 0.0)) {
        return Err(Error::InvalidInput("sample sigma must be finite and positive"));
    }

    let n = samples.len();
    let n_free = free.len();
    let supplied = expansion.coefficients().to_vec();

    let mut design = DMatrix::<f64>::zeros(n, n_free);
    let mut rhs = DVector::<f64>::zeros(n);
    for (i, sample) in samples.iter().enumerate() {
        let terms = expansion.evaluate_terms(sample.t);
        let weight = 1.0 / sample.sigma;

        let mut y = sample.y;
        for (j, &term) in terms.iter().enumerate() {
            if mask[j] == CoefficientMask::Fixed {
                y -= supplied[j] * term;
            }
        }
        rhs[i] = y * weight;
        for (column, &j) in free.iter().enumerate() {
            design[(i, column)] = terms[j] * weight;
        }
    }

    let svd = SVD::new_unordered(design.clone(), true, true);
    let sigma_max = svd.singular_values.max();
    let cutoff = options.tol * n.max(n_free) as f64 * sigma_max;
    let rank = svd.singular_values.iter().filter(|&&s| s > cutoff).count();
    if rank == 0 {
        return Err(Error::RankDeficient);
    }

    let solution = svd.solve(&rhs, cutoff).map_err(Error::Algebra)?;
    if solution.iter().any(|c| c.is_nan()) {
        return Err(Error::Algebra("NaN in coefficients"));
    }

    // Covariance of the free coefficients: V Σ⁻² Vᵀ over the surviving
    // singular directions. Dropped directions contribute nothing here; the
    // residual scaling below is what reports their uncertainty as large.
    let v_t = svd.v_t.as_ref().ok_or(Error::Algebra("SVD produced no V factor"))?;
    let mut covariance = DMatrix::<f64>::zeros(n_free, n_free);
    for (k, &s) in svd.singular_values.iter().enumerate() {
        if s > cutoff {
            let inv_s2 = 1.0 / (s * s);
            for a in 0..n_free {
                for b in 0..n_free {
                    covariance[(a, b)] += v_t[(k, a)] * v_t[(k, b)] * inv_s2;
                }
            }
        }
    }

    let residual = &rhs - &design * &solution;
    let residual_sum_of_squares = residual.norm_squared();

    if options.scale_covariance {
        let dof = n.saturating_sub(rank);
        let variance = if dof > 0 {
            residual_sum_of_squares / dof as f64
        } else {
            0.0
        };
        covariance *= variance;
    }

    let coefficients_mut = expansion.coefficients_mut();
    for (column, &j) in free.iter().enumerate() {
        coefficients_mut[j] = solution[column];
    }

    Ok(FitResult {
        coefficients: expansion.coefficients().to_vec(),
        covariance,
        residual_sum_of_squares,
        rank,
    })
}

/// Fits a monomial [`Polynomial`] of the given degree with every
/// coefficient free.
///
/// # Errors
/// Propagates the error kinds of [`fit_expansion`].
pub fn fit_polynomial(
    samples: &[Sample],
    domain: Domain,
    degree: usize,
    options: &FitOptions,
) -> Result<(Polynomial, FitResult)> {
    let mut polynomial = Polynomial::with_degree(domain, degree);
    let mask = CoefficientMask::all_free(degree + 1);
    let result = fit_expansion(&mut polynomial, samples, &mask, options)?;
    Ok((polynomial, result))
}

/// Fits a [`LegendreSeries`] with every coefficient free.
///
/// # Errors
/// Propagates [`Error::InvalidSize`] for a zero coefficient count and the
/// error kinds of [`fit_expansion`].
pub fn fit_legendre(
    samples: &[Sample],
    domain: Domain,
    n_coefficients: usize,
    options: &FitOptions,
) -> Result<(LegendreSeries, FitResult)> {
    let mut series = LegendreSeries::new(domain, n_coefficients)?;
    let mask = CoefficientMask::all_free(n_coefficients);
    let result = fit_expansion(&mut series, samples, &mask, options)?;
    Ok((series, result))
}

/// Fits a [`ChebyshevSeries`] with every coefficient free.
///
/// # Errors
/// Propagates [`Error::InvalidSize`] for a zero coefficient count and the
/// error kinds of [`fit_expansion`].
pub fn fit_chebyshev(
    samples: &[Sample],
    domain: Domain,
    n_coefficients: usize,
    options: &FitOptions,
) -> Result<(ChebyshevSeries, FitResult)> {
    let mut series = ChebyshevSeries::new(domain, n_coefficients)?;
    let mask = CoefficientMask::all_free(n_coefficients);
    let result = fit_expansion(&mut series, samples, &mask, options)?;
    Ok((series, result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spline::MSpline;
    use crate::{assert_all_close, assert_close};

    fn quadratic_samples(n: usize) -> Vec<Sample> {
        // y = 1 + 2t + 3t^2
        (0..n)
            .map(|i| {
                let t = i as f64 / (n - 1) as f64 * 2.0;
                Sample::new(t, 1.0 + 2.0 * t + 3.0 * t * t)
            })
            .collect()
    }

    fn domain() -> Domain {
        Domain::new(0.0, 2.0).unwrap()
    }

    #[test]
    fn test_exact_fit() {
        // Three exact samples pin down a degree-2 polynomial
        let samples = quadratic_samples(3);
        let (polynomial, result) =
            fit_polynomial(&samples, domain(), 2, &FitOptions::default()).unwrap();

        assert_all_close!(polynomial.coefficients(), &[1.0, 2.0, 3.0], 1e-9);
        assert_close!(result.residual_sum_of_squares, 0.0, 1e-12);
        assert_eq!(result.rank, 3);
        assert_eq!(result.covariance.shape(), (3, 3));
    }

    #[test]
    fn test_fixed_coefficient_held() {
        let samples = quadratic_samples(8);
        let mut polynomial = Polynomial::with_degree(domain(), 2);
        polynomial.set_coefficient(0, 1.0).unwrap();

        let mask = [
            CoefficientMask::Fixed,
            CoefficientMask::Free,
            CoefficientMask::Free,
        ];
        let result =
            fit_expansion(&mut polynomial, &samples, &mask, &FitOptions::default()).unwrap();

        // The constant stayed put and the free slots recovered the truth
        assert_all_close!(result.coefficients, &[1.0, 2.0, 3.0], 1e-9);
        assert_close!(result.residual_sum_of_squares, 0.0, 1e-10);
        assert_eq!(result.covariance.shape(), (2, 2));
    }

    #[test]
    fn test_wrongly_fixed_coefficient_costs_residual() {
        let samples = quadratic_samples(10);

        let (_, free_fit) = fit_polynomial(&samples, domain(), 2, &FitOptions::default()).unwrap();

        let mut pinned = Polynomial::with_degree(domain(), 2);
        pinned.set_coefficient(0, 4.0).unwrap(); // truth is 1.0
        let mask = [
            CoefficientMask::Fixed,
            CoefficientMask::Free,
            CoefficientMask::Free,
        ];
        let pinned_fit =
            fit_expansion(&mut pinned, &samples, &mask, &FitOptions::default()).unwrap();

        assert!(
            pinned_fit.residual_sum_of_squares > free_fit.residual_sum_of_squares + 1e-6,
            "fixing a wrong value must cost residual: {} vs {}",
            pinned_fit.residual_sum_of_squares,
            free_fit.residual_sum_of_squares
        );
    }

    #[test]
    fn test_weights_pull_the_fit() {
        // Two incompatible constant observations; the certain one wins
        let samples = [
            Sample::with_sigma(0.5, 0.0, 1.0),
            Sample::with_sigma(1.5, 10.0, 1e-3),
        ];
        let (polynomial, _) =
            fit_polynomial(&samples, domain(), 0, &FitOptions::default()).unwrap();
        assert_close!(polynomial.coefficients()[0], 10.0, 1e-4);
    }

    #[test]
    fn test_legendre_and_chebyshev_recovery() {
        let truth = LegendreSeries::from_coefficients(domain(), vec![1.0, -2.0, 0.5]).unwrap();
        let samples: Vec<Sample> = (0..12)
            .map(|i| {
                let t = i as f64 / 11.0 * 2.0;
                Sample::new(t, truth.evaluate(t))
            })
            .collect();

        let (series, result) =
            fit_legendre(&samples, domain(), 3, &FitOptions::default()).unwrap();
        assert_all_close!(series.coefficients(), truth.coefficients(), 1e-9);
        assert_close!(result.residual_sum_of_squares, 0.0, 1e-10);

        let (chebyshev, result) =
            fit_chebyshev(&samples, domain(), 3, &FitOptions::default()).unwrap();
        assert_close!(result.residual_sum_of_squares, 0.0, 1e-10);
        for t in [0.0, 0.5, 1.3, 2.0] {
            assert_close!(chebyshev.evaluate(t), truth.evaluate(t), 1e-9);
        }
    }

    #[test]
    fn test_near_rank_deficiency_degrades_softly() {
        // Ten samples at only two distinct positions cannot determine three
        // coefficients; the fit still answers with reduced rank
        let samples: Vec<Sample> = (0..10)
            .map(|i| {
                let t = if i % 2 == 0 { 0.5 } else { 1.5 };
                Sample::new(t, 2.0 * t)
            })
            .collect();
        let (polynomial, result) =
            fit_polynomial(&samples, domain(), 2, &FitOptions::default()).unwrap();

        assert_eq!(result.rank, 2);
        assert!(polynomial.coefficients().iter().all(|c| c.is_finite()));
        assert_close!(result.residual_sum_of_squares, 0.0, 1e-10);
    }

    #[test]
    fn test_rank_deficient_errors() {
        // No samples at all
        assert!(matches!(
            fit_polynomial(&[], domain(), 2, &FitOptions::default()),
            Err(Error::RankDeficient)
        ));

        // Samples outside every basis support produce an all-zero design
        let mut spline = MSpline::new(Domain::new(0.0, 1.0).unwrap(), 2, 1).unwrap();
        let mask = CoefficientMask::all_free(spline.number_of_coefficients());
        let samples = [Sample::new(5.0, 1.0), Sample::new(6.0, 2.0)];
        assert!(matches!(
            fit_expansion(&mut spline, &samples, &mask, &FitOptions::default()),
            Err(Error::RankDeficient)
        ));
    }

    #[test]
    fn test_argument_validation() {
        let samples = quadratic_samples(5);
        let mut polynomial = Polynomial::with_degree(domain(), 2);

        let short_mask = [CoefficientMask::Free];
        assert!(matches!(
            fit_expansion(&mut polynomial, &samples, &short_mask, &FitOptions::default()),
            Err(Error::InvalidSize(_))
        ));

        let all_fixed = [CoefficientMask::Fixed; 3];
        assert!(matches!(
            fit_expansion(&mut polynomial, &samples, &all_fixed, &FitOptions::default()),
            Err(Error::InvalidSize(_))
        ));

        let bad_sigma = [Sample::with_sigma(0.0, 1.0, 0.0)];
        let mask = CoefficientMask::all_free(3);
        assert!(matches!(
            fit_expansion(&mut polynomial, &bad_sigma, &mask, &FitOptions::default()),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_covariance_scaling() {
        // Noiseless overdetermined fit: scaled covariance collapses to ~0,
        // unscaled covariance stays geometric
        let samples = quadratic_samples(9);

        let unscaled = FitOptions {
            scale_covariance: false,
            ..FitOptions::default()
        };
        let (_, geometric) = fit_polynomial(&samples, domain(), 2, &unscaled).unwrap();
        assert!(geometric.covariance[(0, 0)] > 0.0);

        let (_, scaled) = fit_polynomial(&samples, domain(), 2, &FitOptions::default()).unwrap();
        assert_close!(scaled.covariance[(0, 0)], 0.0, 1e-10);
    }

    #[test]
    fn test_fit_spline() {
        // A monotone ramp is representable by an I-spline with positive
        // coefficients
        let domain = Domain::new(0.0, 1.0).unwrap();
        let mut spline = crate::ISpline::new(domain, 2, 1).unwrap();
        let samples: Vec<Sample> = (0..20)
            .map(|i| {
                let t = i as f64 / 19.0;
                Sample::new(t, t)
            })
            .collect();
        let mask = CoefficientMask::all_free(spline.number_of_coefficients());
        let result = fit_expansion(&mut spline, &samples, &mask, &FitOptions::default()).unwrap();

        assert!(result.residual_sum_of_squares < 1e-10);
        for t in [0.1, 0.5, 0.9] {
            assert_close!(spline.evaluate(t), t, 1e-6);
        }
    }
}
