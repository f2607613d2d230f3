//! Cross-module round-trip properties over seeded random inputs.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use termfit::{
    assert_all_close, assert_close, fit_legendre, fit_polynomial, BasisExpansion, Domain,
    FitOptions, Polynomial, RootSet, Sample,
};

fn domain() -> Domain {
    Domain::new(-5.0, 5.0).unwrap()
}

/// Monic polynomials with simple, well-separated real roots survive the
/// full circle: roots -> coefficients -> companion matrix -> polishing ->
/// sorted roots -> coefficients.
#[test]
fn root_extraction_round_trip() {
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..20 {
        let degree = rng.random_range(2..=6);
        let mut roots: Vec<f64> = Vec::with_capacity(degree);
        while roots.len() < degree {
            let candidate = rng.random_range(-3.0..3.0);
            if roots.iter().all(|r| (r - candidate).abs() > 0.3) {
                roots.push(candidate);
            }
        }
        roots.sort_by(f64::total_cmp);

        let mut set = RootSet::with_len(degree);
        for (i, &r) in roots.iter().enumerate() {
            set.set_root(i, r, 0.0).unwrap();
        }
        let polynomial = set.to_polynomial(domain()).unwrap();

        let mut recovered = polynomial.roots().unwrap();
        recovered.sort();
        let rebuilt = recovered.to_polynomial(domain()).unwrap();

        assert_all_close!(rebuilt.coefficients(), polynomial.coefficients(), 1e-7);
        for (found, &expected) in recovered.iter().zip(&roots) {
            assert_close!(found.re, expected, 1e-7);
        }
    }
}

/// The canonical sort is a total order: any input permutation of the same
/// multiset of roots sorts to the same sequence.
#[test]
fn sort_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(11);
    let roots = vec![
        (2.0, 3.0),
        (2.0, -3.0),
        (5.0, 0.0),
        (-1.0, 0.5),
        (-1.0, -0.5),
        (2.0, 0.0),
    ];

    let mut reference: Option<RootSet> = None;
    for _ in 0..10 {
        let mut shuffled = roots.clone();
        for i in (1..shuffled.len()).rev() {
            let j = rng.random_range(0..=i);
            shuffled.swap(i, j);
        }

        let mut set = RootSet::with_len(shuffled.len());
        for (i, &(re, im)) in shuffled.iter().enumerate() {
            set.set_root(i, re, im).unwrap();
        }
        set.sort();

        match &reference {
            None => reference = Some(set),
            Some(expected) => assert_eq!(&set, expected),
        }
    }
}

#[test]
fn rescale_round_trip_preserves_values() {
    let mut rng = StdRng::seed_from_u64(23);

    for _ in 0..20 {
        let coefficients: Vec<f64> = (0..6).map(|_| rng.random_range(-2.0..2.0)).collect();
        let polynomial = Polynomial::new(domain(), coefficients).unwrap();

        let target = Domain::new(0.0, 1.0).unwrap();
        let there = polynomial.rescale_domain(target);
        let back = there.rescale_domain(domain());

        for i in 0..=10 {
            let x = -5.0 + i as f64;
            assert_close!(back.evaluate(x), polynomial.evaluate(x), 1e-11);
        }
    }
}

#[test]
fn derivative_primitive_identity() {
    let mut rng = StdRng::seed_from_u64(31);

    for _ in 0..20 {
        let coefficients: Vec<f64> = (0..7).map(|_| rng.random_range(-4.0..4.0)).collect();
        let polynomial = Polynomial::new(domain(), coefficients).unwrap();
        let round_trip = polynomial.primitive().derivative();
        assert_all_close!(round_trip.coefficients(), polynomial.coefficients());
    }
}

/// A noisy weighted Legendre fit recovers the generating coefficients to
/// within a few standard errors, and its reported covariance is sane.
#[test]
fn noisy_fit_recovers_coefficients() {
    let mut rng = StdRng::seed_from_u64(43);
    let noise = Normal::new(0.0, 0.05).unwrap();

    let truth = [2.0, -1.0, 0.5];
    let generator =
        termfit::LegendreSeries::from_coefficients(domain(), truth.to_vec()).unwrap();

    let samples: Vec<Sample> = (0..200)
        .map(|i| {
            let t = -5.0 + 10.0 * i as f64 / 199.0;
            let y = generator.evaluate(t) + noise.sample(&mut rng);
            Sample::with_sigma(t, y, 0.05)
        })
        .collect();

    let (series, fit) = fit_legendre(&samples, domain(), 3, &FitOptions::default()).unwrap();

    for (j, (&fitted, &expected)) in series.coefficients().iter().zip(&truth).enumerate() {
        let standard_error = fit.covariance[(j, j)].sqrt();
        assert!(
            (fitted - expected).abs() < 5.0 * standard_error.max(0.01),
            "coefficient {j}: {fitted} vs {expected} (se = {standard_error})"
        );
    }

    // Weighted residuals of a correct model hover around one per sample
    let n = samples.len() as f64;
    assert!(fit.residual_sum_of_squares > 0.3 * n);
    assert!(fit.residual_sum_of_squares < 3.0 * n);
}

/// Fitting and root finding compose: sample a factored cubic, fit it, and
/// read its roots back off the fitted polynomial.
#[test]
fn fit_then_extract_roots() {
    let expected_roots = [-2.0, 0.5, 3.0];
    let samples: Vec<Sample> = (0..30)
        .map(|i| {
            let t = -5.0 + 10.0 * i as f64 / 29.0;
            let y = (t - expected_roots[0]) * (t - expected_roots[1]) * (t - expected_roots[2]);
            Sample::new(t, y)
        })
        .collect();

    let (polynomial, fit) =
        fit_polynomial(&samples, domain(), 3, &FitOptions::default()).unwrap();
    assert_close!(fit.residual_sum_of_squares, 0.0, 1e-9);

    let mut roots = polynomial.roots().unwrap();
    roots.sort();
    for (root, expected) in roots.iter().zip(expected_roots) {
        assert_close!(root.re, expected, 1e-7);
        assert_close!(root.im, 0.0, 1e-7);
    }
}
