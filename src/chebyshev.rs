//! Chebyshev series expansions
//!
//! A Chebyshev series is a linear combination `Σ cₖ·Tₖ(x')` of Chebyshev
//! polynomials of the first kind over the argument mapped from the domain
//! onto `[-1, 1]`. Chebyshev expansions stay well conditioned at high
//! degree, which makes them the stable choice when a monomial fit starts to
//! ring.

use crate::domain::Domain;
use crate::error::{Error, Result};
use crate::expansion::{BasisExpansion, Extrema};
use crate::polynomial::{substitute_affine, Polynomial};

/// A Chebyshev series over a [`Domain`].
///
/// Like the Legendre series, the recurrence assumes arguments inside the
/// normalized interval; evaluation outside the domain yields NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct ChebyshevSeries {
    domain: Domain,
    coefficients: Vec<f64>,
}

impl ChebyshevSeries {
    /// Creates a series of `n_coefficients` zero coefficients.
    ///
    /// # Errors
    /// Returns [`Error::InvalidSize`] when `n_coefficients` is zero.
    pub fn new(domain: Domain, n_coefficients: usize) -> Result<Self> {
        if n_coefficients == 0 {
            return Err(Error::InvalidSize("a series needs at least one coefficient"));
        }
        Ok(Self {
            domain,
            coefficients: vec![0.0; n_coefficients],
        })
    }

    /// Creates a series from a coefficient vector.
    ///
    /// # Errors
    /// Returns [`Error::InvalidSize`] when `coefficients` is empty.
    pub fn from_coefficients(domain: Domain, coefficients: Vec<f64>) -> Result<Self> {
        if coefficients.is_empty() {
            return Err(Error::InvalidSize("a series needs at least one coefficient"));
        }
        Ok(Self {
            domain,
            coefficients,
        })
    }

    /// Expands the series into an equivalent monomial [`Polynomial`] on the
    /// same domain.
    ///
    /// Each `Tₖ` is accumulated in monomial form through
    /// `Tₖ = 2x·Tₖ₋₁ - Tₖ₋₂`, then the normalized argument is substituted
    /// away.
    #[must_use]
    pub fn to_polynomial(&self) -> Polynomial {
        let n = self.coefficients.len();
        let mut accumulated = vec![0.0; n];
        let mut previous = vec![1.0]; // T0 = 1
        let mut current = vec![0.0, 1.0]; // T1 = x

        accumulated[0] = self.coefficients[0];
        if n >= 2 {
            accumulated[1] = self.coefficients[1];
        }

        for (k, &c) in self.coefficients.iter().enumerate().skip(2) {
            let mut next = vec![0.0; k + 1];
            for (i, &t) in current.iter().enumerate() {
                next[i + 1] += 2.0 * t;
            }
            for (i, &t) in previous.iter().enumerate() {
                next[i] -= t;
            }

            for (i, &t) in next.iter().enumerate() {
                accumulated[i] += c * t;
            }
            previous = current;
            current = next;
        }

        let map = self.domain.normalizing_map();
        let coefficients = substitute_affine(&accumulated, map.location(), map.scale());
        Polynomial::new(self.domain, coefficients)
            .expect("series holds at least one coefficient")
    }
}

impl BasisExpansion for ChebyshevSeries {
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
        if !self.domain.contains(x) {
            return f64::NAN;
        }
        let x = self.domain.normalizing_map().forward(x);

        let mut sum = self.coefficients[0];
        let mut previous = 1.0;
        let mut current = x;
        for (k, &c) in self.coefficients.iter().enumerate().skip(1) {
            if k >= 2 {
                let next = 2.0 * x * current - previous;
                previous = current;
                current = next;
            }
            sum += c * current;
        }
        sum
    }

    fn evaluate_terms(&self, x: f64) -> Vec<f64> {
        let x = self.domain.normalizing_map().forward(x);
        let n = self.coefficients.len();
        let mut terms = Vec::with_capacity(n);
        for k in 0..n {
            let value = match k {
                0 => 1.0,
                1 => x,
                _ => 2.0 * x * terms[k - 1] - terms[k - 2],
            };
            terms.push(value);
        }
        terms
    }

    fn find_extrema(&self, x1: f64, x2: f64) -> Result<Extrema> {
        self.domain.subrange(x1, x2)?;
        self.to_polynomial().find_extrema(x1, x2)
    }
}
