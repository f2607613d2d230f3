//! M-spline and I-spline expansions
//!
//! Both bases live on a padded knot vector: `degree + 1` copies of each
//! domain boundary around a strictly increasing sequence of interior knots.
//! M-spline basis functions are B-splines normalized to integrate to 1 over
//! the domain; I-spline basis functions are their antiderivatives, monotone
//! non-decreasing from 0 to 1. Coefficient counts obey
//! `n_coefficients = n_interior_knots + degree + 1`.
//!
//! Evaluation runs the Cox–de Boor recurrence iteratively over the knot
//! vector; the I-spline additionally uses the telescoping identity that
//! writes the integral of an M-spline as a running sum of one-order-higher
//! B-splines.

use crate::domain::Domain;
use crate::error::{Error, Result};
use crate::expansion::{extrema_over_candidates, refine_extremum, BasisExpansion, Extrema};

/// Highest supported spline degree.
pub const MAX_SPLINE_DEGREE: usize = 20;

/// Samples per knot segment when bracketing interior extrema.
const SEGMENT_SAMPLES: usize = 64;

/// Knot bookkeeping shared by the two spline kinds.
#[derive(Debug, Clone, PartialEq)]
struct SplineBasis {
    domain: Domain,
    degree: usize,
    interior_knots: Vec<f64>,
    /// Padded vector: `degree + 1` boundary copies on each side.
    knots: Vec<f64>,
}

impl SplineBasis {
    fn new(domain: Domain, degree: usize, interior_knots: Vec<f64>) -> Result<Self> {
        if degree == 0 || degree > MAX_SPLINE_DEGREE {
            return Err(Error::InvalidSize("spline degree must be between 1 and 20"));
        }
        let mut previous = domain.xmin();
        for &knot in &interior_knots {
            if !(knot > previous) {
                return Err(Error::InvalidKnots(
                    "interior knots must be strictly increasing",
                ));
            }
            if knot >= domain.xmax() {
                return Err(Error::InvalidKnots(
                    "interior knots must lie strictly inside the domain",
                ));
            }
            previous = knot;
        }

        let mut basis = Self {
            domain,
            degree,
            interior_knots,
            knots: Vec::new(),
        };
        basis.rebuild_knots();
        Ok(basis)
    }

    /// Evenly spaced interior knots, the default layout.
    fn with_interior_count(domain: Domain, degree: usize, n_interior: usize) -> Result<Self> {
        let step = domain.width() / (n_interior + 1) as f64;
        let interior = (1..=n_interior)
            .map(|i| domain.xmin() + step * i as f64)
            .collect();
        Self::new(domain, degree, interior)
    }

    fn rebuild_knots(&mut self) {
        let pad = self.degree + 1;
        self.knots = Vec::with_capacity(self.interior_knots.len() + 2 * pad);
        self.knots
            .extend(std::iter::repeat(self.domain.xmin()).take(pad));
        self.knots.extend_from_slice(&self.interior_knots);
        self.knots
            .extend(std::iter::repeat(self.domain.xmax()).take(pad));
    }

    fn n_coefficients(&self) -> usize {
        self.interior_knots.len() + self.degree + 1
    }

    /// The B-spline order of the basis functions.
    fn order(&self) -> usize {
        self.degree + 1
    }

    fn set_interior_knot(&mut self, index: usize, value: f64) -> Result<()> {
        if index >= self.interior_knots.len() {
            return Err(Error::InvalidSize("knot index out of bounds"));
        }
        let previous = std::mem::replace(&mut self.interior_knots[index], value);
        let lower = if index == 0 {
            self.domain.xmin()
        } else {
            self.interior_knots[index - 1]
        };
        let upper = if index + 1 == self.interior_knots.len() {
            self.domain.xmax()
        } else {
            self.interior_knots[index + 1]
        };
        if !(value > lower && value < upper) {
            self.interior_knots[index] = previous;
            return Err(Error::InvalidKnots(
                "knot must stay strictly between its neighbours",
            ));
        }
        self.rebuild_knots();
        Ok(())
    }

    /// M-spline basis function `i` at `x`: the B-spline scaled to unit
    /// integral over its support.
    fn m_term(&self, i: usize, x: f64) -> f64 {
        let k = self.order();
        let width = self.knots[i + k] - self.knots[i];
        k as f64 / width * bspline_value(&self.knots, k, i, x, self.domain.xmax())
    }

    fn rescaled(&self, target: Domain) -> Self {
        let map = self.domain.map_to(target);
        let interior = self.interior_knots.iter().map(|&k| map.forward(k)).collect();
        let mut basis = Self {
            domain: target,
            degree: self.degree,
            interior_knots: interior,
            knots: Vec::new(),
        };
        basis.rebuild_knots();
        basis
    }

    /// Segment boundaries of `[x1, x2]`: the endpoints plus every distinct
    /// interior knot between them.
    fn segment_points(&self, x1: f64, x2: f64) -> Vec<f64> {
        let mut points = vec![x1];
        points.extend(
            self.interior_knots
                .iter()
                .copied()
                .filter(|&k| k > x1 && k < x2),
        );
        points.push(x2);
        points
    }

    /// Per-segment extremum search shared by both spline kinds.
    ///
    /// Each knot segment is a single polynomial piece; dense sampling
    /// brackets its interior extrema and golden-section refinement pins
    /// them down. Segment boundaries always participate as candidates.
    fn find_extrema(&self, f: impl Fn(f64) -> f64, x1: f64, x2: f64) -> Result<Extrema> {
        self.domain.subrange(x1, x2)?;

        let boundaries = self.segment_points(x1, x2);
        let mut candidates = boundaries.clone();
        for window in boundaries.windows(2) {
            let (a, b) = (window[0], window[1]);
            let step = (b - a) / SEGMENT_SAMPLES as f64;
            let sample = |i: usize| a + step * i as f64;

            let mut values = Vec::with_capacity(SEGMENT_SAMPLES + 1);
            for i in 0..=SEGMENT_SAMPLES {
                values.push(f(sample(i)));
            }
            for i in 1..SEGMENT_SAMPLES {
                if values[i] > values[i - 1] && values[i] > values[i + 1] {
                    candidates.push(refine_extremum(&f, sample(i - 1), sample(i + 1), true));
                } else if values[i] < values[i - 1] && values[i] < values[i + 1] {
                    candidates.push(refine_extremum(&f, sample(i - 1), sample(i + 1), false));
                }
            }
        }

        Ok(extrema_over_candidates(f, candidates))
    }
}

/// An M-spline expansion over a [`Domain`].
///
/// Every basis function is non-negative and integrates to 1, so
/// non-negative coefficients yield a density-like curve.
#[derive(Debug, Clone, PartialEq)]
pub struct MSpline {
    basis: SplineBasis,
    coefficients: Vec<f64>,
}

impl MSpline {
    /// Creates an M-spline of the given degree with `n_interior` evenly
    /// spaced interior knots and zero coefficients.
    ///
    /// # Errors
    /// Returns [`Error::InvalidSize`] when the degree is 0 or exceeds
    /// [`MAX_SPLINE_DEGREE`].
    pub fn new(domain: Domain, degree: usize, n_interior: usize) -> Result<Self> {
        let basis = SplineBasis::with_interior_count(domain, degree, n_interior)?;
        let coefficients = vec![0.0; basis.n_coefficients()];
        Ok(Self {
            basis,
            coefficients,
        })
    }

    /// Creates an M-spline over an explicit interior knot sequence.
    ///
    /// # Errors
    /// - [`Error::InvalidSize`] for a degree of 0 or above
    ///   [`MAX_SPLINE_DEGREE`].
    /// - [`Error::InvalidKnots`] unless the knots are strictly increasing
    ///   and strictly inside the domain.
    pub fn with_knots(domain: Domain, degree: usize, interior_knots: Vec<f64>) -> Result<Self> {
        let basis = SplineBasis::new(domain, degree, interior_knots)?;
        let coefficients = vec![0.0; basis.n_coefficients()];
        Ok(Self {
            basis,
            coefficients,
        })
    }

    /// The spline degree.
    #[must_use]
    pub fn spline_degree(&self) -> usize {
        self.basis.degree
    }

    /// The reported order of the basis, equal to the nominal degree.
    #[must_use]
    pub fn order(&self) -> usize {
        self.basis.degree
    }

    /// The interior knot sequence, ascending.
    #[must_use]
    pub fn interior_knots(&self) -> &[f64] {
        &self.basis.interior_knots
    }

    /// The full padded knot vector.
    #[must_use]
    pub fn knots(&self) -> &[f64] {
        &self.basis.knots
    }

    /// Moves one interior knot, keeping the sequence valid.
    ///
    /// # Errors
    /// - [`Error::InvalidSize`] when `index` is out of bounds.
    /// - [`Error::InvalidKnots`] when the new value would violate the
    ///   strict ordering against its neighbours or the domain.
    pub fn set_interior_knot(&mut self, index: usize, value: f64) -> Result<()> {
        self.basis.set_interior_knot(index, value)
    }

    /// Rescales domain and knots onto `target`, keeping the coefficients.
    ///
    /// Because the basis functions keep unit integral, their values scale
    /// inversely with the domain width.
    #[must_use]
    pub fn rescale_domain(&self, target: Domain) -> Self {
        Self {
            basis: self.basis.rescaled(target),
            coefficients: self.coefficients.clone(),
        }
    }
}

impl BasisExpansion for MSpline {
    fn domain(&self) -> Domain {
        self.basis.domain
    }

    fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    fn coefficients_mut(&mut self) -> &mut [f64] {
        &mut self.coefficients
    }

    fn evaluate(&self, x: f64) -> f64 {
        if !self.basis.domain.contains(x) {
            return 0.0;
        }
        self.coefficients
            .iter()
            .enumerate()
            .map(|(i, c)| c * self.basis.m_term(i, x))
            .sum()
    }

    fn evaluate_terms(&self, x: f64) -> Vec<f64> {
        (0..self.coefficients.len())
            .map(|i| self.basis.m_term(i, x))
            .collect()
    }

    fn find_extrema(&self, x1: f64, x2: f64) -> Result<Extrema> {
        self.basis.find_extrema(|x| self.evaluate(x), x1, x2)
    }
}

/// An I-spline expansion over a [`Domain`].
///
/// Basis functions are the antiderivatives of the M-spline family: monotone
/// non-decreasing, 0 left of their support and 1 right of it. Non-negative
/// coefficients therefore yield a monotone curve.
#[derive(Debug, Clone, PartialEq)]
pub struct ISpline {
    basis: SplineBasis,
    /// Padded knots with one extra boundary copy per side; the integral
    /// identity evaluates order-(k+1) B-splines, which read one knot past
    /// the M-spline padding.
    extended_knots: Vec<f64>,
    coefficients: Vec<f64>,
}

impl ISpline {
    /// Creates an I-spline of the given nominal degree with `n_interior`
    /// evenly spaced interior knots and zero coefficients.
    ///
    /// # Errors
    /// Returns [`Error::InvalidSize`] when the degree is 0 or exceeds
    /// [`MAX_SPLINE_DEGREE`].
    pub fn new(domain: Domain, degree: usize, n_interior: usize) -> Result<Self> {
        let basis = SplineBasis::with_interior_count(domain, degree, n_interior)?;
        Ok(Self::from_basis(basis))
    }

    /// Creates an I-spline over an explicit interior knot sequence.
    ///
    /// # Errors
    /// - [`Error::InvalidSize`] for a degree of 0 or above
    ///   [`MAX_SPLINE_DEGREE`].
    /// - [`Error::InvalidKnots`] unless the knots are strictly increasing
    ///   and strictly inside the domain.
    pub fn with_knots(domain: Domain, degree: usize, interior_knots: Vec<f64>) -> Result<Self> {
        let basis = SplineBasis::new(domain, degree, interior_knots)?;
        Ok(Self::from_basis(basis))
    }

    fn from_basis(basis: SplineBasis) -> Self {
        let coefficients = vec![0.0; basis.n_coefficients()];
        let mut spline = Self {
            basis,
            extended_knots: Vec::new(),
            coefficients,
        };
        spline.rebuild_extended_knots();
        spline
    }

    fn rebuild_extended_knots(&mut self) {
        self.extended_knots = Vec::with_capacity(self.basis.knots.len() + 2);
        self.extended_knots.push(self.basis.domain.xmin());
        self.extended_knots.extend_from_slice(&self.basis.knots);
        self.extended_knots.push(self.basis.domain.xmax());
    }

    /// The nominal spline degree.
    #[must_use]
    pub fn spline_degree(&self) -> usize {
        self.basis.degree
    }

    /// The reported order: one higher than the nominal degree, reflecting
    /// the integration of the underlying M-spline basis.
    #[must_use]
    pub fn order(&self) -> usize {
        self.basis.degree + 1
    }

    /// The interior knot sequence, ascending.
    #[must_use]
    pub fn interior_knots(&self) -> &[f64] {
        &self.basis.interior_knots
    }

    /// The full padded knot vector.
    #[must_use]
    pub fn knots(&self) -> &[f64] {
        &self.basis.knots
    }

    /// Moves one interior knot, keeping the sequence valid.
    ///
    /// # Errors
    /// - [`Error::InvalidSize`] when `index` is out of bounds.
    /// - [`Error::InvalidKnots`] when the new value would violate the
    ///   strict ordering against its neighbours or the domain.
    pub fn set_interior_knot(&mut self, index: usize, value: f64) -> Result<()> {
        self.basis.set_interior_knot(index, value)?;
        self.rebuild_extended_knots();
        Ok(())
    }

    /// Rescales domain and knots onto `target`, keeping the coefficients.
    ///
    /// I-spline values are invariant under the rescale: each basis function
    /// still runs from 0 to 1 over its mapped support.
    #[must_use]
    pub fn rescale_domain(&self, target: Domain) -> Self {
        let mut spline = Self {
            basis: self.basis.rescaled(target),
            extended_knots: Vec::new(),
            coefficients: self.coefficients.clone(),
        };
        spline.rebuild_extended_knots();
        spline
    }

    /// I-spline basis function `i` at `x`, via the telescoping sum of
    /// order-(k+1) B-splines over the extended knot vector.
    fn i_term(&self, i: usize, x: f64) -> f64 {
        let order = self.basis.order() + 1;
        let right = self.basis.domain.xmax();
        let mut sum = 0.0;
        for m in (i + 1)..=self.basis.n_coefficients() {
            sum += bspline_value(&self.extended_knots, order, m, x, right);
        }
        sum
    }
}

impl BasisExpansion for ISpline {
    fn domain(&self) -> Domain {
        self.basis.domain
    }

    fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    fn coefficients_mut(&mut self) -> &mut [f64] {
        &mut self.coefficients
    }

    fn evaluate(&self, x: f64) -> f64 {
        if x < self.basis.domain.xmin() {
            return 0.0;
        }
        if x > self.basis.domain.xmax() {
            // Every basis function has saturated at 1
            return self.coefficients.iter().sum();
        }
        self.coefficients
            .iter()
            .enumerate()
            .map(|(i, c)| c * self.i_term(i, x))
            .sum()
    }

    fn evaluate_terms(&self, x: f64) -> Vec<f64> {
        (0..self.coefficients.len())
            .map(|i| self.i_term(i, x))
            .collect()
    }

    fn find_extrema(&self, x1: f64, x2: f64) -> Result<Extrema> {
        self.basis.find_extrema(|x| self.evaluate(x), x1, x2)
    }
}

/// Normalized B-spline basis function `B_{i,order}` at `x` over `knots`.
///
/// Iterative Cox–de Boor: the base row holds the order-1 indicators, each
/// pass folds one order higher. Zero-width spans contribute nothing, which
/// is what the repeated boundary knots require. The interval touching
/// `right_edge` is treated as closed so the basis partitions unity on the
/// whole closed domain.
fn bspline_value(knots: &[f64], order: usize, i: usize, x: f64, right_edge: f64) -> f64 {
    if x < knots[i] || x > knots[i + order] {
        return 0.0;
    }

    let mut values = vec![0.0; order];
    for (j, value) in values.iter_mut().enumerate() {
        let t0 = knots[i + j];
        let t1 = knots[i + j + 1];
        let inside = x >= t0 && (x < t1 || (x == right_edge && t1 == right_edge && t0 < t1));
        *value = if inside { 1.0 } else { 0.0 };
    }

    for q in 2..=order {
        for j in 0..=(order - q) {
            let left_width = knots[i + j + q - 1] - knots[i + j];
            let right_width = knots[i + j + q] - knots[i + j + 1];
            let left = if left_width > 0.0 {
                (x - knots[i + j]) / left_width * values[j]
            } else {
                0.0
            };
            let right = if right_width > 0.0 {
                (knots[i + j + q] - x) / right_width * values[j + 1]
            } else {
                0.0
            };
            values[j] = left + right;
        }
    }
    values[0]
}
