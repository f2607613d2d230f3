//! Assertion helpers for numerical tests
//!
//! Floating-point results of the algebra, root and fitting kernels are
//! rarely bit-equal to their textbook values, so the test suites compare
//! through a relative tolerance instead of `assert_eq!`.
//!
//! - [`crate::assert_close!`] compares two scalars within a relative
//!   tolerance (a small multiple of machine epsilon by default, or an
//!   explicit third argument).
//! - [`crate::assert_all_close!`] is the element-wise form for slices,
//!   checking lengths first.

/// Asserts that two floating-point values agree within a relative tolerance.
///
/// The tolerance is scaled by the larger magnitude of the two operands (with
/// a floor of 1.0 so comparisons near zero stay absolute). Defaults to
/// `1e-12`; pass a third argument for looser or tighter checks.
///
/// # Example
/// ```
/// termfit::assert_close!(0.1 + 0.2, 0.3);
/// termfit::assert_close!(1000.0, 1000.1, 1e-3);
/// ```
#[macro_export]
macro_rules! assert_close {
    ($left:expr, $right:expr) => {
        $crate::assert_close!($left, $right, 1e-12)
    };
    ($left:expr, $right:expr, $tol:expr) => {{
        let (l, r): (f64, f64) = ($left, $right);
        let diff = (l - r).abs();
        let scale = 1.0_f64.max(l.abs()).max(r.abs());
        assert!(
            diff <= $tol * scale,
            "values not close: {l} vs {r} (|diff| = {diff:e}, allowed = {:e})",
            $tol * scale
        );
    }};
}

/// Element-wise [`crate::assert_close!`] over two slices.
///
/// Fails when the lengths differ or any pair of elements disagrees,
/// reporting the offending index.
///
/// # Example
/// ```
/// termfit::assert_all_close!(&[1.0, 2.0], &[1.0, 2.0 + 1e-15]);
/// ```
#[macro_export]
macro_rules! assert_all_close {
    ($left:expr, $right:expr) => {
        $crate::assert_all_close!($left, $right, 1e-12)
    };
    ($left:expr, $right:expr, $tol:expr) => {{
        $crate::testing::assert_all_close_impl($left, $right, $tol);
    }};
}

/// Implementation backing [`crate::assert_all_close!`].
///
/// Taking the slices as function arguments keeps any temporaries produced
/// by the caller's expressions alive for the whole comparison, which a
/// `let`-binding inside the macro would not.
#[doc(hidden)]
pub fn assert_all_close_impl(left: impl AsRef<[f64]>, right: impl AsRef<[f64]>, tol: f64) {
    let (l, r) = (left.as_ref(), right.as_ref());
    assert_eq!(l.len(), r.len(), "slice lengths differ");
    for (i, (a, b)) in l.iter().zip(r.iter()).enumerate() {
        let diff = (a - b).abs();
        let scale = 1.0_f64.max(a.abs()).max(b.abs());
        assert!(
            diff <= tol * scale,
            "values not close at index {i}: {a} vs {b} (|diff| = {diff:e})"
        );
    }
}
