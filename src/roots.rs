//! Complex root extraction and polishing
//!
//! Roots are found in two phases. The initial estimate computes the
//! eigenvalues of the companion matrix of the monic-normalized polynomial,
//! which is backward-stable and sidesteps the ill-conditioning of iterative
//! root peeling. A polishing phase then refines each estimate independently
//! with Newton steps against the *original* polynomial and its derivative,
//! undoing the conditioning loss of the monic scaling. Polishing is bounded:
//! a step that grows the residual is rejected and the previous estimate
//! kept, which keeps clustered and repeated roots (derivative near zero)
//! from diverging.

use nalgebra::{Complex, DMatrix};

use crate::domain::Domain;
use crate::error::{Error, Result};
use crate::expansion::BasisExpansion;
use crate::polynomial::Polynomial;

/// Upper bound on Newton refinement steps per root.
const MAX_POLISH_ITERATIONS: usize = 30;

/// The complex roots of a polynomial, with multiplicity.
///
/// The order is arbitrary until [`RootSet::sort`] imposes the canonical
/// reporting order; storage itself carries no ordering invariant. A
/// spectral collaborator consumes the set through [`RootSet::evaluate_at`]
/// and the indexed accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct RootSet {
    roots: Vec<Complex<f64>>,
}

impl RootSet {
    /// Creates a root set of `n` zeros, to be filled through
    /// [`RootSet::set_root`].
    #[must_use]
    pub fn with_len(n: usize) -> Self {
        Self {
            roots: vec![Complex::new(0.0, 0.0); n],
        }
    }

    /// Wraps an existing list of roots.
    #[must_use]
    pub fn from_roots(roots: Vec<Complex<f64>>) -> Self {
        Self { roots }
    }

    /// Extracts all roots of `polynomial` and polishes them to near machine
    /// precision.
    ///
    /// The returned set has exactly `degree` entries. A degree-0 polynomial
    /// has no roots and yields an empty set, which is not an error.
    ///
    /// # Errors
    /// Returns [`Error::DegenerateInput`] when the polynomial has degree at
    /// least 1 but its leading coefficient is numerically zero.
    pub fn from_polynomial(polynomial: &Polynomial) -> Result<Self> {
        let mut set = Self::from_polynomial_unpolished(polynomial)?;
        set.polish(polynomial);
        Ok(set)
    }

    /// Phase one alone: companion-matrix eigenvalue estimates without the
    /// Newton refinement.
    ///
    /// # Errors
    /// Returns [`Error::DegenerateInput`] when the polynomial has degree at
    /// least 1 but its leading coefficient is numerically zero.
    pub fn from_polynomial_unpolished(polynomial: &Polynomial) -> Result<Self> {
        let coefficients = polynomial.coefficients();
        let degree = coefficients.iter().rposition(|&c| c != 0.0).unwrap_or(0);
        if degree == 0 {
            return Ok(Self { roots: Vec::new() });
        }

        let leading = coefficients[degree];
        if leading.abs() <= f64::EPSILON {
            return Err(Error::DegenerateInput(
                "leading coefficient is numerically zero",
            ));
        }

        // Monic normalization feeds the companion matrix; polishing later
        // runs against the unscaled polynomial.
        let mut companion = DMatrix::<f64>::zeros(degree, degree);
        for i in 1..degree {
            companion[(i, i - 1)] = 1.0;
        }
        for i in 0..degree {
            companion[(i, degree - 1)] = -coefficients[i] / leading;
        }

        let roots = companion.complex_eigenvalues().iter().copied().collect();
        Ok(Self { roots })
    }

    /// Number of roots in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Returns true when the set holds no roots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// The roots as a slice, in current order.
    #[must_use]
    pub fn roots(&self) -> &[Complex<f64>] {
        &self.roots
    }

    /// Iterates over the roots in current order.
    pub fn iter(&self) -> std::slice::Iter<'_, Complex<f64>> {
        self.roots.iter()
    }

    /// The root at `index`, or `None` out of bounds.
    #[must_use]
    pub fn get_root(&self, index: usize) -> Option<Complex<f64>> {
        self.roots.get(index).copied()
    }

    /// Overwrites the root at `index`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidSize`] when `index` is out of bounds.
    pub fn set_root(&mut self, index: usize, re: f64, im: f64) -> Result<()> {
        let Some(slot) = self.roots.get_mut(index) else {
            return Err(Error::InvalidSize("root index out of bounds"));
        };
        *slot = Complex::new(re, im);
        Ok(())
    }

    /// Evaluates the monic product `Π (z - rᵢ)` at a complex point.
    ///
    /// An empty set evaluates to 1.
    #[must_use]
    pub fn evaluate_at(&self, z: Complex<f64>) -> Complex<f64> {
        self.roots
            .iter()
            .fold(Complex::new(1.0, 0.0), |acc, r| acc * (z - r))
    }

    /// Refines every root in place against `polynomial`.
    ///
    /// Each root is polished independently through [`polish_root`]; the
    /// polynomial itself is never modified.
    pub fn polish(&mut self, polynomial: &Polynomial) {
        for root in &mut self.roots {
            *root = polish_root(polynomial, *root);
        }
    }

    /// Clamps roots outside the unit circle back onto it.
    ///
    /// A root of magnitude above 1 keeps its argument and has its magnitude
    /// set to exactly 1; roots on or inside the circle are untouched. Used
    /// when the roots are known a priori to describe a stable system and
    /// numerical error pushed one marginally outside.
    pub fn fix_into_unit_circle(&mut self) {
        for root in &mut self.roots {
            let magnitude = root.norm();
            if magnitude > 1.0 {
                *root /= magnitude;
            }
        }
    }

    /// Sorts into the canonical reporting order.
    ///
    /// Real parts ascend; within a tied real part, imaginary magnitudes
    /// ascend with the positive member first, so a conjugate pair reads
    /// `(a+bi, a-bi)` with `b > 0` and real roots precede every pair that
    /// shares their real part. The order is total and deterministic: two
    /// calls on the same unordered set always produce the same sequence.
    pub fn sort(&mut self) {
        self.roots.sort_by(|a, b| {
            a.re.total_cmp(&b.re)
                .then_with(|| a.im.abs().total_cmp(&b.im.abs()))
                .then_with(|| b.im.total_cmp(&a.im))
        });
    }

    /// Reconstructs the monic polynomial with these roots.
    ///
    /// Accumulates by synthetic multiplication with `(x - rᵢ)` in
    /// ascending-degree order. Each complex root is consumed together with
    /// its conjugate partner through their real quadratic factor, so the
    /// computation never leaves the real domain and the pair's imaginary
    /// contributions cancel exactly. Partners are matched by search over
    /// the remaining roots, which keeps repeated pairs intact.
    ///
    /// # Errors
    /// Returns [`Error::InvalidInput`] when a non-real root has no
    /// conjugate partner; a lone complex root cannot yield real
    /// coefficients.
    pub fn to_polynomial(&self, domain: Domain) -> Result<Polynomial> {
        let mut sorted = self.clone();
        sorted.sort();
        let mut pending = sorted.roots;

        let mut coefficients = vec![1.0];
        while !pending.is_empty() {
            let z = pending.remove(0);
            let tolerance = f64::EPSILON.sqrt() * (1.0 + z.norm());
            if z.im.abs() <= tolerance {
                multiply_linear(&mut coefficients, z.re);
            } else {
                let partner = pending.iter().position(|w| {
                    (z.re - w.re).abs() <= tolerance && (z.im + w.im).abs() <= tolerance
                });
                let Some(index) = partner else {
                    return Err(Error::InvalidInput(
                        "complex root without a conjugate partner",
                    ));
                };
                pending.remove(index);
                multiply_quadratic(&mut coefficients, -2.0 * z.re, z.norm_sqr());
            }
        }

        Polynomial::new(domain, coefficients)
    }
}

impl<'a> IntoIterator for &'a RootSet {
    type Item = &'a Complex<f64>;
    type IntoIter = std::slice::Iter<'a, Complex<f64>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Newton refinement of a single root estimate.
///
/// Pure: takes the polynomial and the estimate, returns the refined root.
/// Runs at most [`MAX_POLISH_ITERATIONS`] steps, stopping early when the
/// step magnitude falls below a relative tolerance tied to machine epsilon
/// and the root's magnitude. A step that would increase `|p(z)|` is
/// rejected and the previous estimate kept, so the refinement cannot
/// diverge even when the derivative vanishes near a repeated root.
///
/// Estimates on the real axis are refined in real arithmetic and stay
/// exactly real.
#[must_use]
pub fn polish_root(polynomial: &Polynomial, estimate: Complex<f64>) -> Complex<f64> {
    if estimate.im == 0.0 {
        let x = polish_real(polynomial, estimate.re);
        return Complex::new(x, 0.0);
    }

    let mut z = estimate;
    let mut best_residual = polynomial.evaluate_complex(z).norm();
    for _ in 0..MAX_POLISH_ITERATIONS {
        let (p, dp) = polynomial.evaluate_with_derivative_complex(z);
        if dp.norm() == 0.0 {
            break;
        }
        let step = p / dp;
        let candidate = z - step;
        let residual = polynomial.evaluate_complex(candidate).norm();
        if residual > best_residual {
            break;
        }
        z = candidate;
        best_residual = residual;
        if step.norm() <= f64::EPSILON * (1.0 + z.norm()) {
            break;
        }
    }
    z
}

fn polish_real(polynomial: &Polynomial, estimate: f64) -> f64 {
    let mut x = estimate;
    let mut best_residual = polynomial.evaluate(x).abs();
    for _ in 0..MAX_POLISH_ITERATIONS {
        let (p, dp) = polynomial.evaluate_with_derivative(x);
        if dp == 0.0 {
            break;
        }
        let step = p / dp;
        let candidate = x - step;
        let residual = polynomial.evaluate(candidate).abs();
        if residual > best_residual {
            break;
        }
        x = candidate;
        best_residual = residual;
        if step.abs() <= f64::EPSILON * (1.0 + x.abs()) {
            break;
        }
    }
    x
}

/// Multiplies the ascending coefficient vector by `(x - r)` in place.
fn multiply_linear(coefficients: &mut Vec<f64>, r: f64) {
    let len = coefficients.len();
    coefficients.push(0.0);
    for k in (1..=len).rev() {
        coefficients[k] = coefficients[k - 1] - r * coefficients[k];
    }
    coefficients[0] *= -r;
}

/// Multiplies the ascending coefficient vector by `(x² + px + q)` in place.
fn multiply_quadratic(coefficients: &mut Vec<f64>, p: f64, q: f64) {
    let len = coefficients.len();
    coefficients.extend([0.0, 0.0]);
    for k in (2..len + 2).rev() {
        coefficients[k] = coefficients[k - 2] + p * coefficients[k - 1] + q * coefficients[k];
    }
    coefficients[1] = p * coefficients[0] + q * coefficients[1];
    coefficients[0] *= q;
}
