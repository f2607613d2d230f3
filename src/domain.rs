//! Domains and affine maps between them
//!
//! Every basis expansion in this crate lives on a [`Domain`], an ordered
//! interval `[xmin, xmax]`. The orthogonal bases evaluate their recurrences
//! over the argument mapped onto `[-1, 1]`, and domain rescaling rewrites
//! coefficients through the same affine machinery, so both are expressed
//! through [`DomainMap`].

use crate::error::{Error, Result};

/// An ordered interval `[xmin, xmax]` with `xmin < xmax`.
///
/// Domains are small copyable values; rescaling an expansion produces a new
/// `Domain` rather than mutating one in place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    xmin: f64,
    xmax: f64,
}

impl Domain {
    /// Creates a new domain.
    ///
    /// # Errors
    /// Returns [`Error::InvalidDomain`] when `xmin >= xmax` or either bound
    /// is not finite. NaN bounds fail the ordering comparison and are
    /// rejected the same way.
    pub fn new(xmin: f64, xmax: f64) -> Result<Self> {
        if !(xmin < xmax) || !xmin.is_finite() || !xmax.is_finite() {
            return Err(Error::InvalidDomain(xmin, xmax));
        }
        Ok(Self { xmin, xmax })
    }

    /// The lower bound.
    #[must_use]
    pub fn xmin(&self) -> f64 {
        self.xmin
    }

    /// The upper bound.
    #[must_use]
    pub fn xmax(&self) -> f64 {
        self.xmax
    }

    /// The width `xmax - xmin`, always positive.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    /// The midpoint of the interval.
    #[must_use]
    pub fn midpoint(&self) -> f64 {
        0.5 * (self.xmin + self.xmax)
    }

    /// Returns true if `x` lies in the closed interval.
    #[must_use]
    pub fn contains(&self, x: f64) -> bool {
        x >= self.xmin && x <= self.xmax
    }

    /// Validates that `[x1, x2]` is a subrange of this domain.
    ///
    /// # Errors
    /// Returns [`Error::InvalidRange`] unless `xmin <= x1 < x2 <= xmax`.
    pub fn subrange(&self, x1: f64, x2: f64) -> Result<()> {
        if x1 >= self.xmin && x1 < x2 && x2 <= self.xmax {
            Ok(())
        } else {
            Err(Error::InvalidRange(x1, x2))
        }
    }

    /// The affine map from this domain onto `target`.
    ///
    /// Endpoints map to endpoints; interior points keep their relative
    /// position.
    #[must_use]
    pub fn map_to(&self, target: Self) -> DomainMap {
        let scale = target.width() / self.width();
        let location = target.xmin - scale * self.xmin;
        DomainMap { location, scale }
    }

    /// The affine map from this domain onto the normalized interval
    /// `[-1, 1]` used by the orthogonal recurrences.
    #[must_use]
    pub fn normalizing_map(&self) -> DomainMap {
        let scale = 2.0 / self.width();
        let location = -(self.xmin + self.xmax) / self.width();
        DomainMap { location, scale }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.xmin, self.xmax)
    }
}

/// An affine map `x -> location + scale * x` between two domains.
///
/// Unlike a clamping normalizer, the map is exact everywhere on the real
/// line; bases that refuse extrapolation enforce their own bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomainMap {
    location: f64,
    scale: f64,
}

impl DomainMap {
    /// Applies the map.
    #[must_use]
    pub fn forward(&self, x: f64) -> f64 {
        self.location + self.scale * x
    }

    /// Applies the inverse map.
    #[must_use]
    pub fn inverse(&self, x: f64) -> f64 {
        (x - self.location) / self.scale
    }

    /// The additive part of the map.
    #[must_use]
    pub fn location(&self) -> f64 {
        self.location
    }

    /// The multiplicative part of the map, nonzero by construction.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }
}
