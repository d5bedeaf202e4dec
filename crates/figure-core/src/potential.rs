// ─────────────────────────────────────────────────────────────────────
// Figure of Equilibrium — Potential Solver
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Spectral Poisson solve for the self-potential plus the centrifugal term.
//!
//! Forward transform  A_k = Σ_cells PB_k · occupancy · dρ dz
//! Reconstruction     Φ   = Σ_k (A_k / Λ_k) B_k        (−∇²Φ = occupancy)
//!
//! Φ is the positive self-potential. It is rescaled so that the largest
//! |∇Φ| on the grid (surface gravity) is 1, which fixes the units of every
//! call. The effective potential energy per unit mass is then
//!   V = −Φ − ω² ρ² / 2
//! and lower V is more bound.

use crate::basis::Basis;
use crate::field::MassField;
use figure_math::interp::gradient_magnitude;
use figure_types::state::Grid;
use ndarray::{Array1, Array2};

/// Normalised self-potential and effective potential for one field.
#[derive(Debug, Clone)]
pub struct PotentialField {
    gravity: Array2<f64>,
    total: Array2<f64>,
    omega_squared: f64,
    gravity_scale: f64,
}

impl PotentialField {
    /// Self-potential Φ/g_max, largest where the body is deepest.
    pub fn gravity(&self) -> &Array2<f64> {
        &self.gravity
    }

    /// V = −Φ/g_max − ω²ρ²/2.
    pub fn total(&self) -> &Array2<f64> {
        &self.total
    }

    pub fn omega_squared(&self) -> f64 {
        self.omega_squared
    }

    /// g_max the raw reconstruction was divided by.
    pub fn gravity_scale(&self) -> f64 {
        self.gravity_scale
    }

    /// Same self-potential at a different spin rate.
    pub fn spin(mut self, grid: &Grid, omega_squared: f64) -> Self {
        self.total = Array2::from_shape_fn(self.gravity.dim(), |(iz, ir)| {
            -self.gravity[[iz, ir]] - omega_squared * grid.rr[[iz, ir]].powi(2) / 2.0
        });
        self.omega_squared = omega_squared;
        self
    }
}

/// Raw spectral self-potential, before normalisation. Linear in `field`.
///
/// `basis` must have been built for `grid`; [`FigureSolver::new`] checks
/// this once. Panics on a shape mismatch.
///
/// [`FigureSolver::new`]: crate::equilibrium::FigureSolver::new
pub fn gravitational_potential(basis: &Basis, grid: &Grid, field: &MassField) -> Array2<f64> {
    let density: Array1<f64> = field.density().iter().copied().collect();
    let coefficients = basis.weighted().dot(&density) * grid.cell_area();
    let amplitudes = coefficients / basis.eigenvalues();
    let flat = basis.values().t().dot(&amplitudes);

    let nrho = grid.nrho;
    Array2::from_shape_fn((grid.nz, nrho), |(iz, ir)| flat[iz * nrho + ir])
}

/// Largest |∇Φ| excluding the outermost ρ column and z row, where the
/// one-sided stencil sees the truncation edge.
fn surface_gravity(phi: &Array2<f64>, grid: &Grid) -> f64 {
    let g = gradient_magnitude(phi, grid);
    let mut g_max: f64 = 0.0;
    for iz in 0..grid.nz - 1 {
        for ir in 0..grid.nrho - 1 {
            g_max = g_max.max(g[[iz, ir]]);
        }
    }
    g_max
}

/// Normalised potential of `field` spinning at `omega_squared`.
///
/// Deterministic; `field` is not modified.
pub fn solve_potential(
    basis: &Basis,
    grid: &Grid,
    field: &MassField,
    omega_squared: f64,
) -> PotentialField {
    let mut phi = gravitational_potential(basis, grid, field);
    let g_max = surface_gravity(&phi, grid);
    let gravity_scale = if g_max > 0.0 { g_max } else { 1.0 };
    phi.mapv_inplace(|v| v / gravity_scale);

    PotentialField {
        total: Array2::zeros(phi.dim()),
        gravity: phi,
        omega_squared: 0.0,
        gravity_scale,
    }
    .spin(grid, omega_squared)
}

/// ω² that makes the inner and outer equatorial edges of the figure
/// equipotential:
///   ω² = max(0, 2 (Φ_inner − Φ_outer) / (ρ_outer² − ρ_inner²))
///
/// The edges are the innermost and outermost occupied cells of the z = 0
/// row. Returns 0 when that row is empty, reaches the axis (no central
/// hole) or is a single cell wide.
pub fn force_balance_omega_squared(grid: &Grid, field: &MassField, gravity: &Array2<f64>) -> f64 {
    let occupied: Vec<usize> = (0..grid.nrho).filter(|&ir| field.is_occupied(0, ir)).collect();
    let (Some(&inner), Some(&outer)) = (occupied.first(), occupied.last()) else {
        return 0.0;
    };
    if inner == 0 {
        return 0.0;
    }
    let rho_in = grid.rho[inner];
    let rho_out = grid.rho[outer];
    let spread = rho_out * rho_out - rho_in * rho_in;
    if spread <= 0.0 {
        return 0.0;
    }
    let omega_squared = 2.0 * (gravity[[0, inner]] - gravity[[0, outer]]) / spread;
    omega_squared.max(0.0)
}
