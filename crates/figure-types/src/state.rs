// ─────────────────────────────────────────────────────────────────────
// Figure of Equilibrium — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::error::{FigureError, FigureResult};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Cell-centred (ρ, z) quadrant grid plus the larger expansion domain
/// the spectral basis is defined on.
///
/// Arrays follow the row = z, column = ρ convention: `rr` and `zz` are
/// `[nz, nrho]`.
#[derive(Debug, Clone)]
pub struct Grid {
    pub nrho: usize,
    pub nz: usize,
    pub rho: Array1<f64>, // cell centres [nrho], (i + 1/2) dρ
    pub z: Array1<f64>,   // cell centres [nz],   (j + 1/2) dz
    pub d_rho: f64,
    pub d_z: f64,
    pub rr: Array2<f64>, // meshgrid ρ [nz, nrho]
    pub zz: Array2<f64>, // meshgrid z [nz, nrho]
    /// Truncation radius ρB: outer edge of the last radial column.
    pub rho_bound: f64,
    /// Truncation height zB: upper edge of the last axial row.
    pub z_bound: f64,
    /// Radial extent of the expansion cylinder (Dirichlet wall).
    pub rho_inf: f64,
    /// Axial extent of the expansion cylinder (Dirichlet lid).
    pub z_inf: f64,
}

impl Grid {
    /// Build a grid of `nrho × nz` cells over `[0, rho_bound] × [0, z_bound]`.
    ///
    /// Fails when the expansion domain does not strictly contain the
    /// truncation domain, or when either axis has fewer than two cells.
    pub fn new(
        nrho: usize,
        nz: usize,
        rho_bound: f64,
        z_bound: f64,
        rho_inf: f64,
        z_inf: f64,
    ) -> FigureResult<Self> {
        if nrho < 2 || nz < 2 {
            return Err(FigureError::ConfigError(format!(
                "grid needs at least 2 cells per axis, got nrho={nrho}, nz={nz}"
            )));
        }
        if !(rho_bound > 0.0 && z_bound > 0.0) {
            return Err(FigureError::ConfigError(format!(
                "truncation radii must be positive, got rho_B={rho_bound}, z_B={z_bound}"
            )));
        }
        if !(rho_inf > rho_bound) || !(z_inf > z_bound) {
            return Err(FigureError::ConfigError(format!(
                "expansion domain must exceed truncation domain: \
                 rho_inf={rho_inf} vs rho_B={rho_bound}, z_inf={z_inf} vs z_B={z_bound}"
            )));
        }

        let d_rho = rho_bound / nrho as f64;
        let d_z = z_bound / nz as f64;
        let rho = Array1::from_shape_fn(nrho, |i| (i as f64 + 0.5) * d_rho);
        let z = Array1::from_shape_fn(nz, |j| (j as f64 + 0.5) * d_z);
        let rr = Array2::from_shape_fn((nz, nrho), |(_, ir)| rho[ir]);
        let zz = Array2::from_shape_fn((nz, nrho), |(iz, _)| z[iz]);

        Ok(Grid {
            nrho,
            nz,
            rho,
            z,
            d_rho,
            d_z,
            rr,
            zz,
            rho_bound,
            z_bound,
            rho_inf,
            z_inf,
        })
    }

    /// Area of one (ρ, z) cell.
    pub fn cell_area(&self) -> f64 {
        self.d_rho * self.d_z
    }

    /// Number of cells in the quadrant.
    pub fn len(&self) -> usize {
        self.nrho * self.nz
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Terminal state of one equilibrium solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    /// The edge reassignment reached a fixed point.
    Converged,
    /// Occupancy reached the outermost grid column or row.
    BoundaryHit,
    /// A toroidal figure filled back in at the axis.
    Collapsed,
    /// Iteration cap reached or a boundary configuration repeated.
    DidNotConverge,
}

impl Outcome {
    /// No higher control value can be expected to equilibrate either.
    pub fn halts_sweep(self) -> bool {
        matches!(self, Outcome::BoundaryHit)
    }
}

/// Extremal extents and derived shape ratios of a figure.
/// Undefined values are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapeMetrics {
    pub rho_max: Option<f64>,
    pub rho_min: Option<f64>,
    pub z_max: Option<f64>,
    pub aspect_ratio: Option<f64>,
    pub elongation: Option<f64>,
}

impl ShapeMetrics {
    pub fn undefined() -> Self {
        Self::default()
    }
}

/// Outcome of one sweep step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquilibriumRecord {
    pub control_value: f64,
    /// Angular velocity squared realised in the final iteration.
    pub omega_squared: f64,
    /// ω²·ρ_max/g with g ≡ 1.
    pub rotation_parameter: Option<f64>,
    #[serde(flatten)]
    pub metrics: ShapeMetrics,
    pub iterations: usize,
    pub outcome: Outcome,
    /// Final occupancy `[nz, nrho]`, retained only on request.
    #[serde(skip)]
    pub field: Option<Array2<u8>>,
}
