//! Legendre series expansions
//!
//! A Legendre series is a linear combination `Σ cₖ·Pₖ(x')` of Legendre
//! polynomials evaluated over the argument mapped from the domain onto
//! `[-1, 1]`. The orthogonality of the family makes it the preferred target
//! for least-squares fits of smooth data on an interval.

use crate::domain::Domain;
use crate::error::{Error, Result};
use crate::expansion::{BasisExpansion, Extrema};
use crate::polynomial::{substitute_affine, Polynomial};

/// A Legendre series over a [`Domain`].
///
/// The recurrence assumes arguments inside the normalized interval, so the
/// series does not extrapolate; evaluation outside the domain yields NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendreSeries {
    domain: Domain,
    coefficients: Vec<f64>,
}

impl LegendreSeries {
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

    /// The derivative, expressed as a Legendre series on the same domain.
    ///
    /// Uses the downward recurrence `P'ₖ₊₁ - P'ₖ₋₁ = (2k+1)·Pₖ` on the
    /// normalized argument, then applies the chain-rule factor of the
    /// domain map.
    #[must_use]
    pub fn derivative(&self) -> Self {
        let n = self.coefficients.len();
        let mut carry = self.coefficients.clone();
        let mut derived = vec![0.0; n.saturating_sub(1).max(1)];
        for k in (1..n).rev() {
            derived[k - 1] += (2 * k - 1) as f64 * carry[k];
            if k >= 2 {
                carry[k - 2] += carry[k];
            }
        }

        let scale = self.domain.normalizing_map().scale();
        for d in &mut derived {
            *d *= scale;
        }
        Self {
            domain: self.domain,
            coefficients: derived,
        }
    }

    /// Expands the series into an equivalent monomial [`Polynomial`] on the
    /// same domain.
    ///
    /// Each `Pₖ` is built up in monomial form through the three-term
    /// recurrence, accumulated with its coefficient, and the normalized
    /// argument is substituted away so the polynomial reproduces the series
    /// on the original domain.
    #[must_use]
    pub fn to_polynomial(&self) -> Polynomial {
        let n = self.coefficients.len();
        let mut accumulated = vec![0.0; n];
        let mut previous = vec![1.0]; // P0 = 1
        let mut current = vec![0.0, 1.0]; // P1 = x

        accumulated[0] = self.coefficients[0];
        if n >= 2 {
            accumulated[1] = self.coefficients[1];
        }

        for (k, &c) in self.coefficients.iter().enumerate().skip(2) {
            // P_k = ((2k-1) x P_{k-1} - (k-1) P_{k-2}) / k
            let mut next = vec![0.0; k + 1];
            let a = (2 * k - 1) as f64 / k as f64;
            let b = (k - 1) as f64 / k as f64;
            for (i, &p) in current.iter().enumerate() {
                next[i + 1] += a * p;
            }
            for (i, &p) in previous.iter().enumerate() {
                next[i] -= b * p;
            }

            for (i, &p) in next.iter().enumerate() {
                accumulated[i] += c * p;
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

impl BasisExpansion for LegendreSeries {
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
                let next =
                    ((2 * k - 1) as f64 * x * current - (k - 1) as f64 * previous) / k as f64;
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
                _ => {
                    ((2 * k - 1) as f64 * x * terms[k - 1] - (k - 1) as f64 * terms[k - 2])
                        / k as f64
                }
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
