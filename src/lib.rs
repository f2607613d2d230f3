//! # Termfit
//! ## Basis-function expansions that keep their numerics honest
//!
//! This crate represents real functions on an interval as finite linear
//! combinations of basis functions, and builds the two genuinely delicate
//! operations on top of that representation:
//!
//! - **Root extraction**: all complex roots of a polynomial, estimated
//!   through the eigenvalues of its companion matrix and polished to near
//!   machine precision with bounded Newton refinement.
//! - **Constrained fitting**: weighted least squares of any expansion
//!   against sampled data, with a per-coefficient Free/Fixed mask, a
//!   rank-tolerant SVD solve, and an honest covariance report.
//!
//! # Core Concepts
//! - A [`Domain`] is the interval `[xmin, xmax]` an expansion lives on.
//! - A [`BasisExpansion`] is the common contract: evaluate the function,
//!   evaluate the individual basis terms, and search extrema over a
//!   sub-interval.
//! - The concrete bases are [`Polynomial`] (monomial), [`LegendreSeries`]
//!   and [`ChebyshevSeries`] (orthogonal three-term recurrences over the
//!   normalized argument), and [`MSpline`]/[`ISpline`] (piecewise
//!   polynomials over a padded knot vector).
//! - A [`RootSet`] owns the complex roots of a polynomial, with a
//!   canonical sort order, a unit-circle clamp for spectral work, and monic
//!   reconstruction back into a [`Polynomial`].
//!
//! # Example
//! ```rust
//! use termfit::{fit_polynomial, BasisExpansion, Domain, FitOptions, Sample};
//!
//! // Three exact samples of y = 1 + 2t + 3t² pin the fit down completely
//! let samples: Vec<Sample> = [0.0_f64, 1.0, 2.0]
//!     .iter()
//!     .map(|&t| Sample::new(t, 1.0 + 2.0 * t + 3.0 * t * t))
//!     .collect();
//!
//! let domain = Domain::new(0.0, 2.0).unwrap();
//! let (polynomial, fit) = fit_polynomial(&samples, domain, 2, &FitOptions::default()).unwrap();
//!
//! assert!(fit.residual_sum_of_squares < 1e-18);
//! assert!((polynomial.evaluate(1.5) - (1.0 + 3.0 + 6.75)).abs() < 1e-9);
//!
//! // And the fitted quadratic factors cleanly over the complex plane
//! let roots = polynomial.roots().unwrap();
//! assert_eq!(roots.len(), 2);
//! ```
//!
//! # Determinism
//! Every operation is a pure computation over value-like inputs: no I/O,
//! no shared mutable state, no randomness. Identical inputs produce
//! bit-identical outputs, and concurrent use on independent values is safe
//! by construction. Treat each aggregate as owned by one logical operation
//! at a time, or clone before calling.
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::needless_range_loop)] // The worst clippy lint
#![allow(clippy::cast_precision_loss)] // Indices cast to f64 stay far below 2^52
#![allow(clippy::similar_names)] //       Clippy does not get to decide what names are similar
#![allow(clippy::must_use_candidate)]

pub mod testing;

mod chebyshev;
mod display;
mod domain;
mod error;
mod expansion;
mod fit;
mod legendre;
mod polynomial;
mod roots;
mod spline;

pub use chebyshev::ChebyshevSeries;
pub use domain::{Domain, DomainMap};
pub use error::{Error, Result};
pub use expansion::{BasisExpansion, Extrema};
pub use fit::{
    fit_chebyshev, fit_expansion, fit_legendre, fit_polynomial, CoefficientMask, FitOptions,
    FitResult, Sample,
};
pub use legendre::LegendreSeries;
pub use polynomial::Polynomial;
pub use roots::{polish_root, RootSet};
pub use spline::{ISpline, MSpline, MAX_SPLINE_DEGREE};

pub use nalgebra;
