// ─────────────────────────────────────────────────────────────────────
// Figure of Equilibrium — Shape Modes
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Seed families and the per-family meaning of the control value.
//!
//! Every mode seeds a figure with the volume of the unit sphere so that
//! results across a sweep are directly comparable.

use crate::field::MassField;
use figure_types::config::{FigureConfig, ModeKind};
use figure_types::state::{Grid, Outcome, ShapeMetrics};
use std::f64::consts::PI;

/// How ω² is obtained during a solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rotation {
    /// Constant ω² for the whole solve.
    Fixed(f64),
    /// Re-derived every iteration from equatorial force balance.
    Derived,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeMode {
    /// Unit sphere, control value ω².
    Sphere,
    /// Maclaurin-guess spheroid, control value ω².
    Ellipsoid { max_aspect_ratio: f64 },
    /// Ring of circular cross-section, control value α₀ = R0 / b.
    Torus,
}

impl ShapeMode {
    pub fn from_kind(kind: ModeKind, max_aspect_ratio: f64) -> Self {
        match kind {
            ModeKind::Sphere => ShapeMode::Sphere,
            ModeKind::Ellipsoid => ShapeMode::Ellipsoid { max_aspect_ratio },
            ModeKind::Torus => ShapeMode::Torus,
        }
    }

    pub fn from_config(cfg: &FigureConfig) -> Self {
        Self::from_kind(cfg.sweep.mode, cfg.domain.max_aspect_ratio)
    }

    pub fn kind(&self) -> ModeKind {
        match self {
            ShapeMode::Sphere => ModeKind::Sphere,
            ShapeMode::Ellipsoid { .. } => ModeKind::Ellipsoid,
            ShapeMode::Torus => ModeKind::Torus,
        }
    }

    pub fn is_toroidal(&self) -> bool {
        matches!(self, ShapeMode::Torus)
    }

    pub fn rotation(&self, control: f64) -> Rotation {
        match self {
            ShapeMode::Sphere | ShapeMode::Ellipsoid { .. } => Rotation::Fixed(control),
            ShapeMode::Torus => Rotation::Derived,
        }
    }

    /// Initial occupancy for one sweep step. For the torus `control` must
    /// be positive.
    pub fn seed(&self, grid: &Grid, control: f64) -> MassField {
        match *self {
            ShapeMode::Sphere => MassField::from_fn(grid, |rho, z| rho.hypot(z) < 1.0),
            ShapeMode::Ellipsoid { max_aspect_ratio } => {
                let (a, c) = maclaurin_semi_axes(control, max_aspect_ratio);
                MassField::from_fn(grid, |rho, z| (rho / a).powi(2) + (z / c).powi(2) < 1.0)
            }
            ShapeMode::Torus => {
                let (major, minor) = ring_radii(control);
                MassField::from_fn(grid, |rho, z| (rho - major).powi(2) + z * z < minor * minor)
            }
        }
    }

    /// Cells eligible for reassignment this iteration.
    pub fn edge_cells(&self, field: &MassField) -> Vec<(usize, usize)> {
        field.edge_cells()
    }

    /// Extents and ratios of the final figure. Extents are undefined after a
    /// boundary hit; the inner radius is undefined once a ring collapses.
    pub fn metrics(&self, grid: &Grid, field: &MassField, outcome: Outcome) -> ShapeMetrics {
        if outcome == Outcome::BoundaryHit {
            return ShapeMetrics::undefined();
        }

        let (nz, nrho) = field.dim();
        let mut outer: Option<usize> = None;
        let mut top: Option<usize> = None;
        for iz in 0..nz {
            for ir in 0..nrho {
                if field.is_occupied(iz, ir) {
                    outer = Some(outer.map_or(ir, |o| o.max(ir)));
                    top = Some(top.map_or(iz, |t| t.max(iz)));
                }
            }
        }
        let (Some(outer), Some(top)) = (outer, top) else {
            return ShapeMetrics::undefined();
        };

        let rho_max = (outer + 1) as f64 * grid.d_rho;
        let z_max = (top + 1) as f64 * grid.d_z;

        let rho_min = if self.is_toroidal() && outcome != Outcome::Collapsed {
            (0..nrho)
                .find(|&ir| field.is_occupied(0, ir))
                .map(|ir| ir as f64 * grid.d_rho)
        } else {
            None
        };

        let elongation = rho_min.and_then(|inner| {
            let half_width = (rho_max - inner) / 2.0;
            (half_width > 0.0).then(|| z_max / half_width)
        });

        ShapeMetrics {
            rho_max: Some(rho_max),
            rho_min,
            z_max: Some(z_max),
            aspect_ratio: Some(rho_max / z_max),
            elongation,
        }
    }
}

/// Semi-axes (equatorial a, polar c) of the unit-volume spheroid guessed
/// for spin ω²: a/c = 1 + 5ω²/4, clamped to [1, 0.95 · max_aspect_ratio].
pub fn maclaurin_semi_axes(omega_squared: f64, max_aspect_ratio: f64) -> (f64, f64) {
    let ceiling = (0.95 * max_aspect_ratio).max(1.0);
    let aspect = (1.0 + 1.25 * omega_squared).clamp(1.0, ceiling);
    (aspect.cbrt(), aspect.powf(-2.0 / 3.0))
}

/// Major and minor radii of a unit-volume ring with R0 = α b:
/// 2π² R0 b² = 4π/3  ⇒  b = (2 / (3π α))^{1/3}.
pub fn ring_radii(alpha: f64) -> (f64, f64) {
    let minor = (2.0 / (3.0 * PI * alpha)).cbrt();
    (alpha * minor, minor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Grid {
        Grid::new(18, 12, 1.65, 1.1, 4.95, 3.3).unwrap()
    }

    #[test]
    fn test_seeds_have_unit_sphere_volume() {
        for omega_squared in [0.0, 0.1, 0.3] {
            let (a, c) = maclaurin_semi_axes(omega_squared, 1.5);
            assert!((a * a * c - 1.0).abs() < 1e-12);
            assert!(a >= c);
        }
        for alpha in [1.0, 2.0, 3.5] {
            let (major, minor) = ring_radii(alpha);
            let volume = 2.0 * PI * PI * major * minor * minor;
            assert!((volume - 4.0 * PI / 3.0).abs() < 1e-12);
            assert!((major / minor - alpha).abs() < 1e-12);
        }
    }

    #[test]
    fn test_ellipsoid_guess_is_clamped() {
        let (a, c) = maclaurin_semi_axes(10.0, 1.5);
        assert!((a / c - 0.95 * 1.5).abs() < 1e-12);
        let (a, c) = maclaurin_semi_axes(0.0, 1.5);
        assert!((a - 1.0).abs() < 1e-12 && (c - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_spin_ellipsoid_matches_sphere() {
        let grid = grid();
        let sphere = ShapeMode::Sphere.seed(&grid, 0.0);
        let ellipsoid = ShapeMode::Ellipsoid { max_aspect_ratio: 1.5 }.seed(&grid, 0.0);
        assert_eq!(sphere, ellipsoid);
    }

    #[test]
    fn test_rotation_by_mode() {
        assert_eq!(ShapeMode::Sphere.rotation(0.2), Rotation::Fixed(0.2));
        assert_eq!(
            ShapeMode::Ellipsoid { max_aspect_ratio: 1.5 }.rotation(0.4),
            Rotation::Fixed(0.4)
        );
        assert_eq!(ShapeMode::Torus.rotation(2.0), Rotation::Derived);
        assert_eq!(ShapeMode::from_kind(ModeKind::Torus, 2.5).kind(), ModeKind::Torus);
    }

    #[test]
    fn test_torus_seed_has_hole_for_large_alpha() {
        let grid = Grid::new(30, 12, 2.75, 1.1, 8.25, 3.3).unwrap();
        let ring = ShapeMode::Torus.seed(&grid, 3.0);
        assert!(ring.occupied_count() > 0);
        assert!(!ring.touches_axis());
        // At α = 1 the tube reaches the axis.
        let fat = ShapeMode::Torus.seed(&grid, 1.0);
        assert!(fat.is_occupied(0, 0));
    }

    #[test]
    fn test_sphere_metrics_use_outer_cell_edges() {
        let grid = grid();
        let field = ShapeMode::Sphere.seed(&grid, 0.0);
        let m = ShapeMode::Sphere.metrics(&grid, &field, Outcome::Converged);
        assert!((m.rho_max.unwrap() - 11.0 * grid.d_rho).abs() < 1e-12);
        assert!((m.z_max.unwrap() - 11.0 * grid.d_z).abs() < 1e-12);
        assert!((m.aspect_ratio.unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(m.rho_min, None);
        assert_eq!(m.elongation, None);
    }

    #[test]
    fn test_torus_metrics() {
        let grid = grid();
        let mut field = MassField::empty(&grid);
        // Rectangle ir ∈ [4, 9], iz ∈ [0, 2].
        for iz in 0..3 {
            for ir in 4..10 {
                field.set(iz, ir, true);
            }
        }
        let m = ShapeMode::Torus.metrics(&grid, &field, Outcome::Converged);
        let rho_min = 4.0 * grid.d_rho;
        let rho_max = 10.0 * grid.d_rho;
        let z_max = 3.0 * grid.d_z;
        assert!((m.rho_min.unwrap() - rho_min).abs() < 1e-12);
        assert!((m.rho_max.unwrap() - rho_max).abs() < 1e-12);
        assert!((m.elongation.unwrap() - z_max / ((rho_max - rho_min) / 2.0)).abs() < 1e-12);

        let collapsed = ShapeMode::Torus.metrics(&grid, &field, Outcome::Collapsed);
        assert_eq!(collapsed.rho_min, None);
        assert_eq!(collapsed.elongation, None);
        assert!(collapsed.rho_max.is_some());
    }

    #[test]
    fn test_boundary_hit_and_empty_metrics_undefined() {
        let grid = grid();
        let field = ShapeMode::Sphere.seed(&grid, 0.0);
        let m = ShapeMode::Sphere.metrics(&grid, &field, Outcome::BoundaryHit);
        assert_eq!(m, ShapeMetrics::undefined());

        let empty = MassField::empty(&grid);
        let m = ShapeMode::Sphere.metrics(&grid, &empty, Outcome::Converged);
        assert_eq!(m.aspect_ratio, None);
    }
}
