// ─────────────────────────────────────────────────────────────────────
// Figure of Equilibrium — Finite Differences
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Gradients of cell-centred fields on a `Grid`.

use figure_types::state::Grid;
use ndarray::Array2;

/// Gradient of a `[nz, nrho]` field.
///
/// Returns `(df_dz, df_drho)`: central differences in the interior,
/// one-sided differences on the first and last row/column.
pub fn gradient_2d(field: &Array2<f64>, grid: &Grid) -> (Array2<f64>, Array2<f64>) {
    let (nz, nrho) = field.dim();
    let mut df_dz = Array2::zeros((nz, nrho));
    let mut df_drho = Array2::zeros((nz, nrho));

    for iz in 0..nz {
        for ir in 0..nrho {
            df_dz[[iz, ir]] = if nz < 2 {
                0.0
            } else if iz == 0 {
                (field[[1, ir]] - field[[0, ir]]) / grid.d_z
            } else if iz == nz - 1 {
                (field[[nz - 1, ir]] - field[[nz - 2, ir]]) / grid.d_z
            } else {
                (field[[iz + 1, ir]] - field[[iz - 1, ir]]) / (2.0 * grid.d_z)
            };

            df_drho[[iz, ir]] = if nrho < 2 {
                0.0
            } else if ir == 0 {
                (field[[iz, 1]] - field[[iz, 0]]) / grid.d_rho
            } else if ir == nrho - 1 {
                (field[[iz, nrho - 1]] - field[[iz, nrho - 2]]) / grid.d_rho
            } else {
                (field[[iz, ir + 1]] - field[[iz, ir - 1]]) / (2.0 * grid.d_rho)
            };
        }
    }

    (df_dz, df_drho)
}

/// |∇f| at every cell.
pub fn gradient_magnitude(field: &Array2<f64>, grid: &Grid) -> Array2<f64> {
    let (df_dz, df_drho) = gradient_2d(field, grid);
    let mut mag = df_dz;
    mag.zip_mut_with(&df_drho, |a, &b| *a = a.hypot(b));
    mag
}
