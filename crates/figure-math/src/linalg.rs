// ─────────────────────────────────────────────────────────────────────
// Figure of Equilibrium — Linear Algebra
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Dense least squares for the small design matrices of the curve fits.

use figure_types::error::{FigureError, FigureResult};
use ndarray::{Array1, Array2};

/// A column whose remaining norm drops below this fraction of its original
/// norm is treated as linearly dependent.
const RANK_TOL: f64 = 1e-10;

/// Solve min ‖A x − b‖₂ by Householder QR.
///
/// Requires `A` to be `m × n` with `m >= n` and full column rank.
pub fn lstsq_qr(a: &Array2<f64>, b: &Array1<f64>) -> FigureResult<Array1<f64>> {
    let (m, n) = a.dim();
    if b.len() != m {
        return Err(FigureError::LinAlg(format!(
            "rhs has {} rows, matrix has {m}",
            b.len()
        )));
    }
    if m < n {
        return Err(FigureError::LinAlg(format!(
            "underdetermined system: {m} equations, {n} unknowns"
        )));
    }

    let mut r = a.clone();
    let mut qtb = b.clone();

    for k in 0..n {
        let col_scale = (0..m).map(|i| a[[i, k]].powi(2)).sum::<f64>().sqrt();
        let norm = (k..m).map(|i| r[[i, k]].powi(2)).sum::<f64>().sqrt();
        if col_scale == 0.0 || norm <= RANK_TOL * col_scale {
            return Err(FigureError::LinAlg(format!(
                "rank deficient: column {k} is dependent on earlier columns"
            )));
        }

        // Reflect r[k.., k] onto alpha·e₁; sign chosen against cancellation.
        let alpha = if r[[k, k]] > 0.0 { -norm } else { norm };
        let mut v: Vec<f64> = (k..m).map(|i| r[[i, k]]).collect();
        v[0] -= alpha;
        let v_sq: f64 = v.iter().map(|x| x * x).sum();
        if v_sq == 0.0 {
            continue;
        }

        for j in k..n {
            let dot: f64 = (k..m).map(|i| v[i - k] * r[[i, j]]).sum();
            let f = 2.0 * dot / v_sq;
            for i in k..m {
                r[[i, j]] -= f * v[i - k];
            }
        }
        let dot: f64 = (k..m).map(|i| v[i - k] * qtb[i]).sum();
        let f = 2.0 * dot / v_sq;
        for i in k..m {
            qtb[i] -= f * v[i - k];
        }
    }

    // Back substitution on the upper triangle.
    let mut x = Array1::zeros(n);
    for k in (0..n).rev() {
        let mut s = qtb[k];
        for j in (k + 1)..n {
            s -= r[[k, j]] * x[j];
        }
        x[k] = s / r[[k, k]];
    }

    Ok(x)
}
