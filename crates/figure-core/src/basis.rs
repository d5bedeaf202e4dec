// ─────────────────────────────────────────────────────────────────────
// Figure of Equilibrium — Spectral Basis
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Eigenfunctions of the cylindrical Laplacian on the expansion domain.
//!
//! ψ_nm(ρ, z) = J0(k_n ρ) cos(k_m z) / N_nm with
//!   k_n = j_{0,n} / ρ_inf      (ψ = 0 on the cylinder wall)
//!   k_m = (m + ½) π / z_inf    (∂ψ/∂z = 0 at z = 0, ψ = 0 at z_inf)
//!   N_nm² = ρ_inf²/2 · J1(k_n ρ_inf)² · z_inf/2
//! so that ∫∫ ψ_a ψ_b ρ dρ dz = δ_ab and −∇²ψ = (k_n² + k_m²) ψ.
//!
//! Grid values are averaged over an interior sub-grid of each cell rather
//! than sampled at the centre. The sub-grid is a tensor product, so the
//! average factors into a radial and an axial mean.

use figure_math::bessel::{j0, j0_zeros, j1};
use figure_types::state::Grid;
use ndarray::{Array1, Array2};
use std::f64::consts::PI;
use tracing::info;

/// One basis function: its wavenumbers, eigenvalue and normalisation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Eigenfunction {
    pub n: usize,
    pub m: usize,
    pub k_rho: f64,
    pub k_z: f64,
    /// Λ = k_rho² + k_z², strictly positive.
    pub eigenvalue: f64,
    pub norm: f64,
}

impl Eigenfunction {
    /// Point value ψ(ρ, z).
    pub fn value(&self, rho: f64, z: f64) -> f64 {
        j0(self.k_rho * rho) * (self.k_z * z).cos() / self.norm
    }
}

/// Precomputed basis over a grid. Read-only after construction.
#[derive(Debug, Clone)]
pub struct Basis {
    modes: Vec<Eigenfunction>,
    eigenvalues: Array1<f64>,
    /// Cell-averaged ψ, one row per mode, columns are cells in
    /// `iz * nrho + ir` order.
    values: Array2<f64>,
    /// Cell-averaged ρ·ψ in the same layout.
    weighted: Array2<f64>,
    nrho: usize,
    nz: usize,
}

/// Centre offsets of an even `res`-way subdivision of a cell of width `d`.
fn subcell_offsets(d: f64, res: usize) -> Vec<f64> {
    let res = res.max(1);
    (0..res)
        .map(|s| -d / 2.0 + (s as f64 + 0.5) * d / res as f64)
        .collect()
}

impl Basis {
    /// Build `max_n × max_m` eigenfunctions averaged over
    /// `integration_res²` sub-samples per cell.
    pub fn build(grid: &Grid, max_n: usize, max_m: usize, integration_res: usize) -> Self {
        info!(
            max_n,
            max_m,
            integration_res,
            "forming basis: {} eigenfunctions over {}x{} cells",
            max_n * max_m,
            grid.nrho,
            grid.nz
        );

        let rho_offsets = subcell_offsets(grid.d_rho, integration_res);
        let z_offsets = subcell_offsets(grid.d_z, integration_res);
        let n_sub_rho = rho_offsets.len() as f64;
        let n_sub_z = z_offsets.len() as f64;

        let zeros = j0_zeros(max_n);
        let k_rho: Vec<f64> = zeros.iter().map(|j| j / grid.rho_inf).collect();
        let k_z: Vec<f64> = (0..max_m)
            .map(|m| (m as f64 + 0.5) * PI / grid.z_inf)
            .collect();

        // Radial means of J0(kρ) and ρ·J0(kρ) per (n, ir).
        let mut radial = Array2::zeros((max_n, grid.nrho));
        let mut radial_weighted = Array2::zeros((max_n, grid.nrho));
        for (n, &k) in k_rho.iter().enumerate() {
            for ir in 0..grid.nrho {
                let (mut acc, mut acc_w) = (0.0, 0.0);
                for &off in &rho_offsets {
                    let rho = grid.rho[ir] + off;
                    let v = j0(k * rho);
                    acc += v;
                    acc_w += rho * v;
                }
                radial[[n, ir]] = acc / n_sub_rho;
                radial_weighted[[n, ir]] = acc_w / n_sub_rho;
            }
        }

        // Axial means of cos(kz) per (m, iz).
        let mut axial = Array2::zeros((max_m, grid.nz));
        for (m, &k) in k_z.iter().enumerate() {
            for iz in 0..grid.nz {
                let acc: f64 = z_offsets.iter().map(|off| (k * (grid.z[iz] + off)).cos()).sum();
                axial[[m, iz]] = acc / n_sub_z;
            }
        }

        let n_modes = max_n * max_m;
        let n_cells = grid.nrho * grid.nz;
        let mut modes = Vec::with_capacity(n_modes);
        let mut values = Array2::zeros((n_modes, n_cells));
        let mut weighted = Array2::zeros((n_modes, n_cells));

        for n in 0..max_n {
            let j1_wall = j1(k_rho[n] * grid.rho_inf);
            let norm =
                (grid.rho_inf.powi(2) / 2.0 * j1_wall * j1_wall * grid.z_inf / 2.0).sqrt();
            for m in 0..max_m {
                let k = n * max_m + m;
                modes.push(Eigenfunction {
                    n,
                    m,
                    k_rho: k_rho[n],
                    k_z: k_z[m],
                    eigenvalue: k_rho[n].powi(2) + k_z[m].powi(2),
                    norm,
                });
                for iz in 0..grid.nz {
                    let a = axial[[m, iz]] / norm;
                    for ir in 0..grid.nrho {
                        let cell = iz * grid.nrho + ir;
                        values[[k, cell]] = radial[[n, ir]] * a;
                        weighted[[k, cell]] = radial_weighted[[n, ir]] * a;
                    }
                }
            }
        }

        let eigenvalues = Array1::from_iter(modes.iter().map(|f| f.eigenvalue));

        Basis {
            modes,
            eigenvalues,
            values,
            weighted,
            nrho: grid.nrho,
            nz: grid.nz,
        }
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    /// `(nz, nrho)` of the grid this basis was built for.
    pub fn grid_dim(&self) -> (usize, usize) {
        (self.nz, self.nrho)
    }

    pub fn modes(&self) -> &[Eigenfunction] {
        &self.modes
    }

    /// Λ per mode.
    pub fn eigenvalues(&self) -> &Array1<f64> {
        &self.eigenvalues
    }

    /// B: `[modes, cells]`.
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// PB: `[modes, cells]`, the ρ-weighted forward-transform kernel.
    pub fn weighted(&self) -> &Array2<f64> {
        &self.weighted
    }

    /// Cell-averaged ψ_k at (iz, ir).
    pub fn value_at(&self, k: usize, iz: usize, ir: usize) -> f64 {
        self.values[[k, iz * self.nrho + ir]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_grid() -> Grid {
        Grid::new(18, 12, 1.65, 1.1, 4.95, 3.3).unwrap()
    }

    /// Midpoint quadrature of ∫∫ ψ_a ψ_b ρ dρ dz over the expansion domain.
    fn inner_product(a: &Eigenfunction, b: &Eigenfunction, grid: &Grid, n: usize) -> f64 {
        let h_rho = grid.rho_inf / n as f64;
        let h_z = grid.z_inf / n as f64;
        let mut acc = 0.0;
        for i in 0..n {
            let rho = (i as f64 + 0.5) * h_rho;
            for j in 0..n {
                let z = (j as f64 + 0.5) * h_z;
                acc += a.value(rho, z) * b.value(rho, z) * rho;
            }
        }
        acc * h_rho * h_z
    }

    #[test]
    fn test_mode_layout_and_eigenvalues() {
        let grid = small_grid();
        let basis = Basis::build(&grid, 6, 4, 2);
        assert_eq!(basis.len(), 24);
        assert_eq!(basis.values().shape(), &[24, 18 * 12]);
        assert_eq!(basis.weighted().shape(), &[24, 18 * 12]);

        let f = basis.modes()[2 * 4 + 3];
        assert_eq!((f.n, f.m), (2, 3));
        assert!((f.k_rho - 8.653_727_912_911_013 / 4.95).abs() < 1e-6);
        assert!((f.k_z - 3.5 * PI / 3.3).abs() < 1e-12);
        assert!(basis.eigenvalues().iter().all(|&l| l > 0.0));
    }

    #[test]
    fn test_orthonormality_under_rho_weight() {
        let grid = small_grid();
        let basis = Basis::build(&grid, 3, 3, 1);
        let modes = basis.modes();
        for a in modes {
            for b in modes {
                let ip = inner_product(a, b, &grid, 240);
                let expected = if (a.n, a.m) == (b.n, b.m) { 1.0 } else { 0.0 };
                assert!(
                    (ip - expected).abs() < 1e-2,
                    "<psi{:?}, psi{:?}> = {ip}",
                    (a.n, a.m),
                    (b.n, b.m)
                );
            }
        }
    }

    #[test]
    fn test_subcell_average_differs_from_centre_sample() {
        let grid = small_grid();
        let basis = Basis::build(&grid, 30, 20, 8);
        // A high mode varies strongly across a cell, so the average must be
        // strictly smaller in magnitude than the peak value somewhere.
        let k = basis.len() - 1;
        let f = basis.modes()[k];
        let mut max_gap: f64 = 0.0;
        for iz in 0..grid.nz {
            for ir in 0..grid.nrho {
                let centre = f.value(grid.rho[ir], grid.z[iz]);
                max_gap = max_gap.max((centre - basis.value_at(k, iz, ir)).abs());
            }
        }
        assert!(max_gap > 1e-4, "averaging should smooth high modes, gap = {max_gap}");
    }

    #[test]
    fn test_single_subsample_is_centre_sample() {
        let grid = small_grid();
        let basis = Basis::build(&grid, 4, 4, 1);
        for (k, f) in basis.modes().iter().enumerate() {
            let v = f.value(grid.rho[5], grid.z[7]);
            assert!((basis.value_at(k, 7, 5) - v).abs() < 1e-12);
            let w = basis.weighted()[[k, 7 * grid.nrho + 5]];
            assert!((w - grid.rho[5] * v).abs() < 1e-12);
        }
    }

    #[test]
    fn test_subcell_offsets_span_cell_interior() {
        let offs = subcell_offsets(0.8, 4);
        assert_eq!(offs.len(), 4);
        assert!((offs[0] + 0.3).abs() < 1e-12);
        assert!((offs[3] - 0.3).abs() < 1e-12);
        assert!((offs.iter().sum::<f64>()).abs() < 1e-12);
    }
}
