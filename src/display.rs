//! Equation rendering for expansions
//!
//! Human-readable `Display` implementations for the dense bases:
//! polynomials print as `y = 3x^2 + 2x - 5`, Legendre and Chebyshev series
//! print their terms as `P_k(u)` and `T_k(u)` where `u` is the argument
//! mapped onto `[-1, 1]`. Rendering goes one way only; parsing equations
//! back is a collaborator's job, not this crate's.

use std::fmt;

use crate::chebyshev::ChebyshevSeries;
use crate::expansion::BasisExpansion;
use crate::legendre::LegendreSeries;
use crate::polynomial::Polynomial;

/// Formats a coefficient magnitude, trimming the noise digits. Falls back
/// to scientific notation outside the comfortable fixed-point range.
fn format_magnitude(value: f64) -> String {
    if value != 0.0 && !(1e-3..1e6).contains(&value) {
        return format!("{value:e}");
    }
    let mut s = format!("{value:.4}");
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    s
}

/// Writes `y = ...` from `(coefficient, basis function)` pairs, highest
/// order first. Zero coefficients are skipped; an all-zero expansion prints
/// as `y = 0`.
fn write_equation(
    f: &mut fmt::Formatter<'_>,
    terms: impl Iterator<Item = (f64, String)>,
) -> fmt::Result {
    write!(f, "y =")?;
    let mut any = false;
    for (coefficient, body) in terms {
        if coefficient == 0.0 {
            continue;
        }
        let sign = if any {
            if coefficient < 0.0 {
                " - "
            } else {
                " + "
            }
        } else if coefficient < 0.0 {
            " -"
        } else {
            " "
        };
        write!(f, "{sign}")?;

        let magnitude = coefficient.abs();
        if (magnitude - 1.0).abs() < 1e-12 && !body.is_empty() {
            write!(f, "{body}")?;
        } else if body.is_empty() {
            write!(f, "{}", format_magnitude(magnitude))?;
        } else {
            write!(f, "{}{body}", format_magnitude(magnitude))?;
        }
        any = true;
    }
    if !any {
        write!(f, " 0")?;
    }
    Ok(())
}

fn monomial_body(k: usize) -> String {
    match k {
        0 => String::new(),
        1 => "x".to_string(),
        _ => format!("x^{k}"),
    }
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terms = self
            .coefficients()
            .iter()
            .enumerate()
            .rev()
            .map(|(k, &c)| (c, monomial_body(k)));
        write_equation(f, terms)
    }
}

fn series_body(function: &str, k: usize) -> String {
    if k == 0 {
        String::new()
    } else {
        format!("{function}{k}(u)")
    }
}

impl fmt::Display for LegendreSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terms = self
            .coefficients()
            .iter()
            .enumerate()
            .rev()
            .map(|(k, &c)| (c, series_body("P", k)));
        write_equation(f, terms)
    }
}

impl fmt::Display for ChebyshevSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terms = self
            .coefficients()
            .iter()
            .enumerate()
            .rev()
            .map(|(k, &c)| (c, series_body("T", k)));
        write_equation(f, terms)
    }
}
