// ─────────────────────────────────────────────────────────────────────
// Figure of Equilibrium — Bessel
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Bessel functions of the first kind, orders 0 and 1, and the positive
//! zeros of J0.
//!
//! Rational approximations for |x| < 8 and the Hankel asymptotic form with
//! polynomial corrections beyond (Hart et al., as tabulated in Numerical
//! Recipes §6.5). Absolute accuracy is about 1e-8.

use std::f64::consts::PI;

/// Phase offsets of the asymptotic forms: π/4 and 3π/4.
const J0_PHASE: f64 = 0.785_398_164;
const J1_PHASE: f64 = 2.356_194_491;

/// sqrt(2/π) as used by the asymptotic amplitude.
const TWO_OVER_PI: f64 = 0.636_619_772;

/// Newton iterations per zero; the McMahon guess is already within 1e-3.
const ZERO_NEWTON_ITERS: usize = 8;
const ZERO_TOL: f64 = 1e-13;

/// Bessel function J0(x).
///
/// Matches `scipy.special.j0(x)` to ~1e-8.
pub fn j0(x: f64) -> f64 {
    let ax = x.abs();
    if ax < 8.0 {
        let y = x * x;
        let num = 57_568_490_574.0
            + y * (-13_362_590_354.0
                + y * (651_619_640.7
                    + y * (-11_214_424.18 + y * (77_392.330_17 + y * (-184.905_245_6)))));
        let den = 57_568_490_411.0
            + y * (1_029_532_985.0
                + y * (9_494_680.718 + y * (59_272.648_53 + y * (267.853_271_2 + y))));
        num / den
    } else {
        let z = 8.0 / ax;
        let y = z * z;
        let xx = ax - J0_PHASE;
        let p = 1.0
            + y * (-0.109_862_862_7e-2
                + y * (0.273_451_040_7e-4 + y * (-0.207_337_063_9e-5 + y * 0.209_388_721_1e-6)));
        let q = -0.156_249_999_5e-1
            + y * (0.143_048_876_5e-3
                + y * (-0.691_114_765_1e-5 + y * (0.762_109_516_1e-6 - y * 0.934_935_152e-7)));
        (TWO_OVER_PI / ax).sqrt() * (xx.cos() * p - z * xx.sin() * q)
    }
}

/// Bessel function J1(x).
///
/// Matches `scipy.special.j1(x)` to ~1e-8. Odd in x.
pub fn j1(x: f64) -> f64 {
    let ax = x.abs();
    if ax < 8.0 {
        let y = x * x;
        let num = x
            * (72_362_614_232.0
                + y * (-7_895_059_235.0
                    + y * (242_396_853.1
                        + y * (-2_972_611.439 + y * (15_704.482_60 + y * (-30.160_366_06))))));
        let den = 144_725_228_442.0
            + y * (2_300_535_178.0
                + y * (18_583_304.74 + y * (99_447.433_94 + y * (376.999_139_7 + y))));
        num / den
    } else {
        let z = 8.0 / ax;
        let y = z * z;
        let xx = ax - J1_PHASE;
        let p = 1.0
            + y * (0.183_105e-2
                + y * (-0.351_639_649_6e-4 + y * (0.245_752_017_4e-5 + y * (-0.240_337_019e-6))));
        let q = 0.046_874_999_95
            + y * (-0.200_269_087_3e-3
                + y * (0.844_919_909_6e-5 + y * (-0.882_289_87e-6 + y * 0.105_787_412e-6)));
        let ans = (TWO_OVER_PI / ax).sqrt() * (xx.cos() * p - z * xx.sin() * q);
        if x < 0.0 {
            -ans
        } else {
            ans
        }
    }
}

/// First `count` positive zeros of J0, ascending.
///
/// McMahon's expansion β + 1/(8β) with β = (s − ¼)π seeds a Newton
/// iteration on J0 with J0' = −J1.
pub fn j0_zeros(count: usize) -> Vec<f64> {
    (1..=count)
        .map(|s| {
            let beta = (s as f64 - 0.25) * PI;
            let mut x = beta + 1.0 / (8.0 * beta);
            for _ in 0..ZERO_NEWTON_ITERS {
                let dx = j0(x) / j1(x);
                x += dx;
                if dx.abs() < ZERO_TOL {
                    break;
                }
            }
            x
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Reference values from scipy.special.
    #[test]
    fn test_j0_reference_values() {
        let cases: &[(f64, f64)] = &[
            (0.0, 1.0),
            (0.5, 0.938_469_807_240_813),
            (1.0, 0.765_197_686_557_966_6),
            (2.0, 0.223_890_779_141_235_67),
            (5.0, -0.177_596_771_314_338_3),
            (10.0, -0.245_935_764_451_348_3),
            (20.0, 0.167_024_664_340_583),
        ];
        for &(x, expected) in cases {
            let got = j0(x);
            assert!(
                (got - expected).abs() < 1e-7,
                "J0({x}) = {got}, expected {expected}"
            );
        }
    }

    #[test]
    fn test_j1_reference_values() {
        let cases: &[(f64, f64)] = &[
            (0.0, 0.0),
            (1.0, 0.440_050_585_744_933_5),
            (2.0, 0.576_724_807_756_873_4),
            (5.0, -0.327_579_137_591_465_2),
            (10.0, 0.043_472_746_168_861_44),
            (20.0, 0.066_833_124_175_850_05),
        ];
        for &(x, expected) in cases {
            let got = j1(x);
            assert!(
                (got - expected).abs() < 1e-7,
                "J1({x}) = {got}, expected {expected}"
            );
        }
    }

    #[test]
    fn test_parity() {
        for &x in &[0.3, 2.7, 9.1, 15.0] {
            assert!((j0(-x) - j0(x)).abs() < 1e-15, "J0 must be even");
            assert!((j1(-x) + j1(x)).abs() < 1e-15, "J1 must be odd");
        }
    }

    #[test]
    fn test_j0_zeros_reference() {
        let expected = [
            2.404_825_557_695_773,
            5.520_078_110_286_311,
            8.653_727_912_911_013,
            11.791_534_439_014_28,
            14.930_917_708_487_79,
            18.071_063_967_910_92,
            21.211_636_629_879_26,
            24.352_471_530_749_30,
            27.493_479_132_040_25,
            30.634_606_468_431_98,
        ];
        let zeros = j0_zeros(expected.len());
        for (i, (&got, &want)) in zeros.iter().zip(expected.iter()).enumerate() {
            assert!(
                (got - want).abs() < 1e-6,
                "zero #{}: got {got}, expected {want}",
                i + 1
            );
        }
    }

    #[test]
    fn test_high_order_zeros_are_roots() {
        let zeros = j0_zeros(60);
        assert_eq!(zeros.len(), 60);
        for pair in zeros.windows(2) {
            let gap = pair[1] - pair[0];
            assert!(
                (gap - PI).abs() < 0.05,
                "zeros should be spaced by ~pi, got {gap}"
            );
        }
        for &x in &zeros {
            assert!(j0(x).abs() < 1e-7, "J0({x}) = {}", j0(x));
        }
    }

    #[test]
    fn test_j1_at_first_zero() {
        let x = j0_zeros(1)[0];
        assert!((j1(x) - 0.519_147_497_289_466_9).abs() < 1e-7);
    }
}
