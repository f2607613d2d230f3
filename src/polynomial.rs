//! Monomial-basis polynomials and their algebra
//!
//! [`Polynomial`] is the monomial specialization of [`BasisExpansion`]:
//! coefficients over `1, x, x², …` on an explicit domain. It carries the
//! arithmetic the other components build on (convolution multiply, synthetic
//! division, derivative and primitive, definite integrals, domain rescaling,
//! monic normalization) plus evaluation over the complex plane, which the
//! root finder polishes against.
//!
//! All operations are pure: they take their operands by reference and return
//! fresh values.

use nalgebra::Complex;

use crate::domain::Domain;
use crate::error::{Error, Result};
use crate::expansion::{extrema_over_candidates, BasisExpansion, Extrema};
use crate::roots::RootSet;

/// A polynomial in the monomial basis over a [`Domain`].
///
/// Coefficients are stored lowest-order first; trailing zeros are permitted
/// and ignored by degree-sensitive operations. Unlike the orthogonal and
/// spline bases, a polynomial evaluates meaningfully outside its domain.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    domain: Domain,
    coefficients: Vec<f64>,
}

impl Polynomial {
    /// Creates a polynomial from a coefficient vector.
    ///
    /// # Errors
    /// Returns [`Error::InvalidSize`] when `coefficients` is empty.
    pub fn new(domain: Domain, coefficients: Vec<f64>) -> Result<Self> {
        if coefficients.is_empty() {
            return Err(Error::InvalidSize("a polynomial needs at least one coefficient"));
        }
        Ok(Self {
            domain,
            coefficients,
        })
    }

    /// Creates the zero polynomial with `degree + 1` coefficient slots.
    #[must_use]
    pub fn with_degree(domain: Domain, degree: usize) -> Self {
        Self {
            domain,
            coefficients: vec![0.0; degree + 1],
        }
    }

    /// Index of the highest coefficient that is not numerically zero.
    ///
    /// Returns `None` for the numerically-zero polynomial.
    pub(crate) fn leading_index(&self) -> Option<usize> {
        self.coefficients
            .iter()
            .rposition(|&c| c.abs() > f64::EPSILON)
    }

    /// The leading (highest-order, numerically nonzero) coefficient, or zero
    /// for the zero polynomial.
    #[must_use]
    pub fn leading_coefficient(&self) -> f64 {
        self.leading_index().map_or(0.0, |i| self.coefficients[i])
    }

    /// Evaluates the polynomial at a complex point using Horner's method.
    #[must_use]
    pub fn evaluate_complex(&self, z: Complex<f64>) -> Complex<f64> {
        let mut p = Complex::new(0.0, 0.0);
        for &c in self.coefficients.iter().rev() {
            p = p * z + Complex::new(c, 0.0);
        }
        p
    }

    /// Evaluates the polynomial and its derivative at a complex point in a
    /// single Horner pass.
    #[must_use]
    pub fn evaluate_with_derivative_complex(&self, z: Complex<f64>) -> (Complex<f64>, Complex<f64>) {
        let mut p = Complex::new(0.0, 0.0);
        let mut dp = Complex::new(0.0, 0.0);
        for &c in self.coefficients.iter().rev() {
            dp = dp * z + p;
            p = p * z + Complex::new(c, 0.0);
        }
        (p, dp)
    }

    /// Evaluates the polynomial and its derivative at a real point in a
    /// single Horner pass.
    #[must_use]
    pub fn evaluate_with_derivative(&self, x: f64) -> (f64, f64) {
        let mut p = 0.0;
        let mut dp = 0.0;
        for &c in self.coefficients.iter().rev() {
            dp = dp * x + p;
            p = p * x + c;
        }
        (p, dp)
    }

    /// Multiplies two polynomials by coefficient convolution.
    ///
    /// The result's degree is the sum of the operand degrees.
    ///
    /// # Errors
    /// Returns [`Error::InvalidDomain`] when the operands live on different
    /// domains.
    pub fn multiply(&self, other: &Self) -> Result<Self> {
        if self.domain != other.domain {
            return Err(Error::InvalidDomain(
                other.domain.xmin(),
                other.domain.xmax(),
            ));
        }

        let n = self.coefficients.len() + other.coefficients.len() - 1;
        let mut product = vec![0.0; n];
        for (i, &a) in self.coefficients.iter().enumerate() {
            for (j, &b) in other.coefficients.iter().enumerate() {
                product[i + j] += a * b;
            }
        }
        Self::new(self.domain, product)
    }

    /// Divides by `divisor` using synthetic division, returning
    /// `(quotient, remainder)` with `degree(remainder) < degree(divisor)`.
    ///
    /// Exact for polynomials representable in floating point; otherwise the
    /// usual rounding error accumulates.
    ///
    /// # Errors
    /// - [`Error::InvalidDomain`] when the operands live on different
    ///   domains.
    /// - [`Error::DivisionByZero`] when the divisor's leading coefficient is
    ///   numerically zero.
    pub fn divide(&self, divisor: &Self) -> Result<(Self, Self)> {
        if self.domain != divisor.domain {
            return Err(Error::InvalidDomain(
                divisor.domain.xmin(),
                divisor.domain.xmax(),
            ));
        }
        let Some(divisor_leading) = divisor.leading_index() else {
            return Err(Error::DivisionByZero);
        };

        let nq = divisor_leading + 1;
        let np = self.coefficients.len();
        let mut work = self.coefficients.clone();

        if np < nq {
            let quotient = Self::new(self.domain, vec![0.0])?;
            let remainder = Self::new(self.domain, work)?;
            return Ok((quotient, remainder));
        }

        let mut quotient = vec![0.0; np - nq + 1];
        for k in (nq - 1..np).rev() {
            let factor = work[k] / divisor.coefficients[nq - 1];
            quotient[k - (nq - 1)] = factor;
            for j in 0..nq {
                work[k - (nq - 1) + j] -= factor * divisor.coefficients[j];
            }
        }

        work.truncate((nq - 1).max(1));
        if nq == 1 {
            work[0] = 0.0;
        }
        Ok((
            Self::new(self.domain, quotient)?,
            Self::new(self.domain, work)?,
        ))
    }

    /// The derivative polynomial on the same domain.
    #[must_use]
    pub fn derivative(&self) -> Self {
        if self.coefficients.len() <= 1 {
            return Self {
                domain: self.domain,
                coefficients: vec![0.0],
            };
        }
        let coefficients = self
            .coefficients
            .iter()
            .enumerate()
            .skip(1)
            .map(|(k, &c)| c * k as f64)
            .collect();
        Self {
            domain: self.domain,
            coefficients,
        }
    }

    /// The primitive (antiderivative) with constant term zero.
    ///
    /// `derivative(primitive(p))` reproduces `p` exactly.
    #[must_use]
    pub fn primitive(&self) -> Self {
        let mut coefficients = Vec::with_capacity(self.coefficients.len() + 1);
        coefficients.push(0.0);
        coefficients.extend(
            self.coefficients
                .iter()
                .enumerate()
                .map(|(k, &c)| c / (k + 1) as f64),
        );
        Self {
            domain: self.domain,
            coefficients,
        }
    }

    /// The definite integral over `[x1, x2]`, evaluated via the primitive.
    #[must_use]
    pub fn area(&self, x1: f64, x2: f64) -> f64 {
        let primitive = self.primitive();
        primitive.evaluate(x2) - primitive.evaluate(x1)
    }

    /// Rewrites the polynomial onto a new domain.
    ///
    /// The substitution maps corresponding points of the two domains onto
    /// each other, so the rescaled polynomial reproduces the original's
    /// values at matching relative positions to near machine precision.
    #[must_use]
    pub fn rescale_domain(&self, target: Domain) -> Self {
        let map = target.map_to(self.domain);
        let coefficients = substitute_affine(&self.coefficients, map.location(), map.scale());
        Self {
            domain: target,
            coefficients,
        }
    }

    /// Divides every coefficient by the leading one, making the polynomial
    /// monic. Idempotent.
    ///
    /// # Errors
    /// Returns [`Error::DegenerateInput`] when all coefficients are zero.
    pub fn normalize_monic(&mut self) -> Result<()> {
        let Some(leading) = self.leading_index() else {
            return Err(Error::DegenerateInput("cannot scale the zero polynomial"));
        };
        let scale = self.coefficients[leading];
        for c in &mut self.coefficients {
            *c /= scale;
        }
        // Anchor the pivot exactly so a second pass divides by 1.0
        self.coefficients[leading] = 1.0;
        Ok(())
    }

    /// Extracts all complex roots, polished to near machine precision.
    ///
    /// Shorthand for [`RootSet::from_polynomial`].
    ///
    /// # Errors
    /// Returns [`Error::DegenerateInput`] when the leading coefficient is
    /// numerically zero (with degree at least 1).
    pub fn roots(&self) -> Result<RootSet> {
        RootSet::from_polynomial(self)
    }

    /// The real zeros of the derivative inside the open interval
    /// `(x1, x2)`, ascending.
    fn interior_stationary_points(&self, x1: f64, x2: f64) -> Result<Vec<f64>> {
        let derivative = self.derivative();
        if derivative.degree() == 0 {
            return Ok(Vec::new());
        }

        let roots = derivative.roots()?;
        let mut stationary: Vec<f64> = roots
            .iter()
            .filter(|z| z.im.abs() <= f64::EPSILON.sqrt() * (1.0 + z.norm()))
            .map(|z| z.re)
            .filter(|&x| x > x1 && x < x2)
            .collect();
        stationary.sort_by(f64::total_cmp);
        Ok(stationary)
    }
}

impl BasisExpansion for Polynomial {
    fn domain(&self) -> Domain {
        self.domain
    }

    fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    fn coefficients_mut(&mut self) -> &mut [f64] {
        &mut self.coefficients
    }

    fn evaluate(&self, x: f64) -> f64 {
        let mut p = 0.0;
        for &c in self.coefficients.iter().rev() {
            p = p * x + c;
        }
        p
    }

    fn evaluate_terms(&self, x: f64) -> Vec<f64> {
        let mut terms = Vec::with_capacity(self.coefficients.len());
        let mut power = 1.0;
        for _ in 0..self.coefficients.len() {
            terms.push(power);
            power *= x;
        }
        terms
    }

    fn find_extrema(&self, x1: f64, x2: f64) -> Result<Extrema> {
        self.domain.subrange(x1, x2)?;

        let mut candidates = vec![x1];
        candidates.extend(self.interior_stationary_points(x1, x2)?);
        candidates.push(x2);
        Ok(extrema_over_candidates(|x| self.evaluate(x), candidates))
    }

    fn extrapolates(&self) -> bool {
        true
    }
}

/// Re-expands `p(location + scale * x)` in the monomial basis.
///
/// Horner's scheme with a linear argument: the accumulator is multiplied by
/// the affine term once per coefficient, so the cost is quadratic in the
/// degree.
pub(crate) fn substitute_affine(coefficients: &[f64], location: f64, scale: f64) -> Vec<f64> {
    let n = coefficients.len();
    let mut out = vec![0.0; n];
    if n == 0 {
        return out;
    }

    out[0] = coefficients[n - 1];
    let mut degree = 0;
    for &c in coefficients[..n - 1].iter().rev() {
        degree += 1;
        for j in (1..=degree).rev() {
            out[j] = out[j] * location + out[j - 1] * scale;
        }
        out[0] = out[0] * location + c;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert_all_close, assert_close};

    fn domain() -> Domain {
        Domain::new(-2.0, 3.0).unwrap()
    }

    fn poly(coefficients: &[f64]) -> Polynomial {
        Polynomial::new(domain(), coefficients.to_vec()).unwrap()
    }

    #[test]
    fn test_evaluate() {
        // 1 + 2x + 3x^2
        let p = poly(&[1.0, 2.0, 3.0]);
        assert_close!(p.evaluate(0.0), 1.0);
        assert_close!(p.evaluate(1.0), 6.0);
        assert_close!(p.evaluate(2.0), 17.0);
        assert_all_close!(p.evaluate_terms(2.0), &[1.0, 2.0, 4.0]);
        assert_eq!(p.degree(), 2);
        assert!(p.extrapolates());
    }

    #[test]
    fn test_degree_ignores_trailing_zeros() {
        let p = poly(&[1.0, 2.0, 0.0, 0.0]);
        assert_eq!(p.degree(), 1);
        assert_eq!(p.number_of_coefficients(), 4);
        assert_close!(p.leading_coefficient(), 2.0);
    }

    #[test]
    fn test_evaluate_complex() {
        // z^2 + 1 at z = i is 0
        let p = poly(&[1.0, 0.0, 1.0]);
        let y = p.evaluate_complex(Complex::new(0.0, 1.0));
        assert_close!(y.norm(), 0.0);

        let (y, dy) = p.evaluate_with_derivative_complex(Complex::new(2.0, 0.0));
        assert_close!(y.re, 5.0);
        assert_close!(dy.re, 4.0);
    }

    #[test]
    fn test_multiply() {
        let p = poly(&[1.0, 1.0]); // 1 + x
        let q = poly(&[-1.0, 1.0]); // -1 + x
        let r = p.multiply(&q).unwrap();
        assert_all_close!(r.coefficients(), &[-1.0, 0.0, 1.0]);
        assert_eq!(r.degree(), p.degree() + q.degree());

        let other = Polynomial::new(Domain::new(0.0, 1.0).unwrap(), vec![1.0]).unwrap();
        assert!(matches!(
            p.multiply(&other),
            Err(crate::Error::InvalidDomain(_, _))
        ));
    }

    #[test]
    fn test_divide() {
        // (x^3 - 2x^2 - 4) / (x - 3) = x^2 + x + 3, remainder 5
        let p = poly(&[-4.0, 0.0, -2.0, 1.0]);
        let q = poly(&[-3.0, 1.0]);
        let (quotient, remainder) = p.divide(&q).unwrap();
        assert_all_close!(quotient.coefficients(), &[3.0, 1.0, 1.0]);
        assert_all_close!(remainder.coefficients(), &[5.0]);

        // Short dividend: quotient 0, remainder the dividend
        let (quotient, remainder) = q.divide(&p).unwrap();
        assert_all_close!(quotient.coefficients(), &[0.0]);
        assert_all_close!(remainder.coefficients(), &[-3.0, 1.0]);

        let zero = poly(&[0.0, 0.0]);
        assert!(matches!(p.divide(&zero), Err(crate::Error::DivisionByZero)));
    }

    #[test]
    fn test_divide_reconstructs_dividend() {
        let p = poly(&[2.0, -3.0, 0.5, 4.0, 1.0]);
        let q = poly(&[1.0, 2.0, 1.0]);
        let (quotient, remainder) = p.divide(&q).unwrap();

        for x in [-1.5, 0.0, 0.7, 2.0] {
            let recomposed = quotient.evaluate(x) * q.evaluate(x) + remainder.evaluate(x);
            assert_close!(recomposed, p.evaluate(x));
        }
    }

    #[test]
    fn test_derivative_primitive_inverse() {
        let p = poly(&[1.0, 2.0, 3.0, 4.0]);
        assert_all_close!(p.derivative().coefficients(), &[2.0, 6.0, 12.0]);

        let round_trip = p.primitive().derivative();
        assert_all_close!(round_trip.coefficients(), p.coefficients());
        assert_close!(p.primitive().evaluate(0.0), 0.0);

        // Degree 0 edge
        let constant = poly(&[42.0]);
        assert_all_close!(constant.derivative().coefficients(), &[0.0]);
    }

    #[test]
    fn test_area() {
        // 4x^3 + 2 over [0, 3]: x^4 + 2x -> 81 + 6
        let p = poly(&[2.0, 0.0, 0.0, 4.0]);
        assert_close!(p.area(0.0, 3.0), 87.0);
        assert_close!(p.area(3.0, 0.0), -87.0);
    }

    #[test]
    fn test_rescale_round_trip() {
        let p = poly(&[1.0, -2.0, 0.5, 3.0]);
        let rescaled = p.rescale_domain(Domain::new(0.0, 1.0).unwrap());

        // Values at matching relative positions agree
        for t in [0.0, 0.25, 0.5, 0.75, 1.0] {
            let x_old = -2.0 + 5.0 * t;
            let x_new = t;
            assert_close!(rescaled.evaluate(x_new), p.evaluate(x_old), 1e-12);
        }

        let back = rescaled.rescale_domain(domain());
        assert_all_close!(back.coefficients(), p.coefficients(), 1e-12);
    }

    #[test]
    fn test_normalize_monic() {
        let mut p = poly(&[2.0, 4.0, 8.0]);
        p.normalize_monic().unwrap();
        assert_all_close!(p.coefficients(), &[0.25, 0.5, 1.0]);

        // Idempotent
        let once = p.clone();
        p.normalize_monic().unwrap();
        assert_eq!(p, once);

        let mut zero = poly(&[0.0, 0.0]);
        assert!(matches!(
            zero.normalize_monic(),
            Err(crate::Error::DegenerateInput(_))
        ));
    }

    #[test]
    fn test_find_extrema() {
        // x^3 - 3x on [-1.5, 3]: stationary points at -1 (max 2) and 1 (min -2)
        let p = poly(&[0.0, -3.0, 0.0, 1.0]);
        let extrema = p.find_extrema(-1.5, 3.0).unwrap();
        assert_close!(extrema.xmin, 1.0, 1e-8);
        assert_close!(extrema.ymin, -2.0, 1e-8);
        assert_close!(extrema.xmax, 3.0);
        assert_close!(extrema.ymax, 18.0);

        assert!(matches!(
            p.find_extrema(-3.0, 1.0),
            Err(crate::Error::InvalidRange(_, _))
        ));
        assert!(p.find_extrema(1.0, 1.0).is_err());
    }

    #[test]
    fn test_set_coefficient() {
        let mut p = Polynomial::with_degree(domain(), 2);
        p.set_coefficient(2, 5.0).unwrap();
        assert_close!(p.evaluate(2.0), 20.0);
        assert!(p.set_coefficient(3, 1.0).is_err());
    }

    #[test]
    fn test_substitute_affine() {
        // p(x) = 1 + x + x^2 at 2x + 1: p(2x+1) = 3 + 6x + 4x^2
        let out = substitute_affine(&[1.0, 1.0, 1.0], 1.0, 2.0);
        assert_all_close!(out, &[3.0, 6.0, 4.0]);
    }
}
