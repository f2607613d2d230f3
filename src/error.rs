//! Error types for basis expansions, root finding and fitting
//!
//! This module defines the failure modes of the crate's numerical
//! operations, along with a convenient `Result` alias. All operations fail
//! fast; none of these errors are retried internally.

/// Errors reported by expansion construction, polynomial algebra, root
/// extraction and constrained fitting.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A domain was requested with `xmin >= xmax` (or a non-finite bound),
    /// or two operands live on different domains.
    #[error("Invalid domain [{0}, {1}]")]
    InvalidDomain(f64, f64),

    /// A coefficient, degree or knot count was zero or out of bounds where a
    /// positive count is required.
    #[error("Invalid size: {0}")]
    InvalidSize(&'static str),

    /// An interior knot sequence is not strictly increasing, or a knot lies
    /// on or outside the domain boundary.
    #[error("Invalid knot sequence: {0}")]
    InvalidKnots(&'static str),

    /// An extremum search interval is not a subrange of the owning domain.
    #[error("Range [{0}, {1}] is not inside the domain")]
    InvalidRange(f64, f64),

    /// The leading coefficient is numerically zero, or the polynomial is
    /// identically zero where a nonzero one is required.
    #[error("Degenerate input: {0}")]
    DegenerateInput(&'static str),

    /// Synthetic division by a polynomial whose leading coefficient is
    /// numerically zero.
    #[error("Division by a zero polynomial")]
    DivisionByZero,

    /// The rank cutoff left a fit with zero usable degrees of freedom.
    ///
    /// Near-rank-deficiency is *not* reported as an error; the fitter then
    /// returns a best-effort solution with an inflated covariance.
    #[error("Fit system is rank deficient: no usable degrees of freedom")]
    RankDeficient,

    /// A value that cannot be processed reached an operation, e.g. an
    /// unconjugated complex root reaching real polynomial reconstruction.
    #[error("Invalid input: {0}")]
    InvalidInput(&'static str),

    /// Failed to solve the underlying algebraic system.
    ///
    /// Contains a static string describing the solver error.
    #[error("Failed to solve: {0}")]
    Algebra(&'static str),
}

/// Result type for all fallible operations in this crate.
pub type Result<T> = std::result::Result<T, Error>;
