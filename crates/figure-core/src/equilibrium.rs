// ─────────────────────────────────────────────────────────────────────
// Figure of Equilibrium — Equilibrium Iterator
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Relaxes a seeded figure toward an equipotential surface.
//!
//! Each step re-ranks the cells on the figure's boundary by effective
//! potential energy and hands the occupied count to the most bound of
//! them. Mass is conserved exactly. The loop ends at a fixed point, when
//! the figure reaches the truncation box, when a ring fills in at the
//! axis, or when a guard gives up.

use crate::basis::Basis;
use crate::field::MassField;
use crate::mode::{Rotation, ShapeMode};
use crate::observer::{IterationObserver, Snapshot, SolverState};
use crate::potential::{force_balance_omega_squared, solve_potential, PotentialField};
use figure_types::config::SolverConfig;
use figure_types::error::{FigureError, FigureResult};
use figure_types::state::{EquilibriumRecord, Grid, Outcome};
use ndarray::Array2;
use std::collections::VecDeque;
use tracing::debug;

/// One sweep step: seed, relax, report.
pub trait EquilibriumSolver {
    fn solve(
        &self,
        mode: &ShapeMode,
        control: f64,
        observer: &mut dyn IterationObserver,
    ) -> EquilibriumRecord;
}

/// Reassign the edge set of `field` against `total`.
///
/// Returns whether any cell changed. Ties in `total` keep raster order.
pub fn relax_step(field: &mut MassField, total: &Array2<f64>, mode: &ShapeMode) -> bool {
    let mut edge = mode.edge_cells(field);
    let occupied = edge
        .iter()
        .filter(|&&(iz, ir)| field.is_occupied(iz, ir))
        .count();

    edge.sort_by(|a, b| total[*a].total_cmp(&total[*b]));

    let mut changed = false;
    for (rank, &(iz, ir)) in edge.iter().enumerate() {
        let fill = rank < occupied;
        if field.is_occupied(iz, ir) != fill {
            field.set(iz, ir, fill);
            changed = true;
        }
    }
    changed
}

/// Fingerprints of the last `window` pre-step fields. Includes the current
/// step's own pre-step field, so a window below 2 only matches fixed
/// points. A window of 0 records nothing.
#[derive(Debug, Clone)]
struct CycleGuard {
    window: usize,
    history: VecDeque<u64>,
}

impl CycleGuard {
    fn new(window: usize) -> Self {
        CycleGuard {
            window,
            history: VecDeque::with_capacity(window + 1),
        }
    }

    fn record(&mut self, fingerprint: u64) {
        if self.window == 0 {
            return;
        }
        self.history.push_back(fingerprint);
        if self.history.len() > self.window {
            self.history.pop_front();
        }
    }

    fn seen(&self, fingerprint: u64) -> bool {
        self.history.contains(&fingerprint)
    }
}

/// Spectral equilibrium solver over a fixed grid and basis.
pub struct FigureSolver<'a> {
    grid: &'a Grid,
    basis: &'a Basis,
    config: SolverConfig,
}

impl<'a> FigureSolver<'a> {
    /// Fails when `basis` was built for a grid of a different shape.
    pub fn new(grid: &'a Grid, basis: &'a Basis, config: SolverConfig) -> FigureResult<Self> {
        if basis.grid_dim() != (grid.nz, grid.nrho) {
            return Err(FigureError::ConfigError(format!(
                "basis was built for a {:?} grid, solver grid is {:?}",
                basis.grid_dim(),
                (grid.nz, grid.nrho)
            )));
        }
        Ok(FigureSolver {
            grid,
            basis,
            config,
        })
    }

    /// Potential for `field` under `rotation`. Derived spin is balanced
    /// against the field's own self-potential.
    pub fn potential_for(&self, field: &MassField, rotation: Rotation) -> PotentialField {
        match rotation {
            Rotation::Fixed(omega_squared) => {
                solve_potential(self.basis, self.grid, field, omega_squared)
            }
            Rotation::Derived => {
                let still = solve_potential(self.basis, self.grid, field, 0.0);
                let omega_squared = force_balance_omega_squared(self.grid, field, still.gravity());
                still.spin(self.grid, omega_squared)
            }
        }
    }

    /// Terminal state after a step, if any. Boundary and collapse checks
    /// take precedence over a fixed point.
    fn classify(
        &self,
        mode: &ShapeMode,
        field: &MassField,
        changed: bool,
        iterations: usize,
        cycles: &CycleGuard,
    ) -> Option<Outcome> {
        if field.touches_outer_boundary() {
            Some(Outcome::BoundaryHit)
        } else if mode.is_toroidal() && field.touches_axis() {
            Some(Outcome::Collapsed)
        } else if !changed {
            Some(Outcome::Converged)
        } else if iterations >= self.config.max_iterations {
            Some(Outcome::DidNotConverge)
        } else if cycles.seen(field.fingerprint()) {
            debug!(iterations, "boundary configuration repeated");
            Some(Outcome::DidNotConverge)
        } else {
            None
        }
    }

    /// Seed, relax and measure one figure.
    pub fn solve_with(
        &self,
        mode: &ShapeMode,
        control: f64,
        observer: &mut dyn IterationObserver,
    ) -> EquilibriumRecord {
        let rotation = mode.rotation(control);
        let mut field = mode.seed(self.grid, control);
        let mut cycles = CycleGuard::new(self.config.cycle_window);
        let mut iterations = 0usize;

        let mut potential = self.potential_for(&field, rotation);
        observer.on_checkpoint(&Snapshot {
            control_value: control,
            iteration: 0,
            state: SolverState::Seeded,
            omega_squared: potential.omega_squared(),
            field: &field,
            potential: potential.total(),
        });

        let outcome = loop {
            cycles.record(field.fingerprint());

            let changed = relax_step(&mut field, potential.total(), mode);
            iterations += 1;
            debug!(
                control,
                iterations,
                omega_squared = potential.omega_squared(),
                changed,
                "relaxation step"
            );

            if let Some(outcome) = self.classify(mode, &field, changed, iterations, &cycles) {
                break outcome;
            }

            potential = self.potential_for(&field, rotation);
            let interval = self.config.checkpoint_interval;
            if interval > 0 && iterations % interval == 0 {
                observer.on_checkpoint(&Snapshot {
                    control_value: control,
                    iteration: iterations,
                    state: SolverState::Iterating {
                        iteration: iterations,
                    },
                    omega_squared: potential.omega_squared(),
                    field: &field,
                    potential: potential.total(),
                });
            }
        };

        let omega_squared = potential.omega_squared();
        observer.on_checkpoint(&Snapshot {
            control_value: control,
            iteration: iterations,
            state: SolverState::Terminal(outcome),
            omega_squared,
            field: &field,
            potential: potential.total(),
        });

        let metrics = mode.metrics(self.grid, &field, outcome);
        debug!(control, iterations, ?outcome, "solve finished");

        EquilibriumRecord {
            control_value: control,
            omega_squared,
            rotation_parameter: metrics.rho_max.map(|rho_max| omega_squared * rho_max),
            metrics,
            iterations,
            outcome,
            field: Some(field.into_cells()),
        }
    }
}

impl EquilibriumSolver for FigureSolver<'_> {
    fn solve(
        &self,
        mode: &ShapeMode,
        control: f64,
        observer: &mut dyn IterationObserver,
    ) -> EquilibriumRecord {
        self.solve_with(mode, control, observer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::{NullObserver, SnapshotRecorder};

    fn scenario_grid() -> Grid {
        // resolution 12, max aspect ratio 1.5, boundary excess 3
        Grid::new(18, 12, 1.65, 1.1, 4.95, 3.3).unwrap()
    }

    fn solver_config(max_iterations: usize, checkpoint_interval: usize) -> SolverConfig {
        SolverConfig {
            max_iterations,
            cycle_window: 8,
            checkpoint_interval,
        }
    }

    #[test]
    fn test_relax_step_conserves_mass() {
        let grid = scenario_grid();
        let basis = Basis::build(&grid, 36, 24, 4);
        let mode = ShapeMode::Ellipsoid {
            max_aspect_ratio: 1.5,
        };
        let mut field = mode.seed(&grid, 0.3);
        let mass = field.occupied_count();
        for _ in 0..5 {
            let pot = solve_potential(&basis, &grid, &field, 0.3);
            relax_step(&mut field, pot.total(), &mode);
            assert_eq!(field.occupied_count(), mass);
        }
    }

    #[test]
    fn test_relax_step_moves_mass_downhill() {
        let grid = scenario_grid();
        let mut field = MassField::empty(&grid);
        field.set(0, 0, true);
        field.set(0, 1, true);
        // V falls with z, so mass should climb the axis.
        let total = Array2::from_shape_fn((grid.nz, grid.nrho), |(iz, ir)| {
            -(iz as f64) + 0.01 * ir as f64
        });
        assert!(relax_step(&mut field, &total, &ShapeMode::Sphere));
        assert_eq!(field.occupied_count(), 2);
        assert!(field.is_occupied(1, 0));
        assert!(!field.is_occupied(0, 1));
    }

    #[test]
    fn test_static_sphere_converges_spherical() {
        let grid = scenario_grid();
        let basis = Basis::build(&grid, 54, 36, 8);
        let solver = FigureSolver::new(&grid, &basis, SolverConfig::default()).unwrap();
        let record = solver.solve_with(&ShapeMode::Sphere, 0.0, &mut NullObserver);
        assert_eq!(record.outcome, Outcome::Converged);
        let aspect = record.metrics.aspect_ratio.unwrap();
        assert!((0.95..=1.05).contains(&aspect), "aspect = {aspect}");
        assert_eq!(record.omega_squared, 0.0);
        assert_eq!(record.rotation_parameter, Some(0.0));
        assert!(record.field.is_some());
    }

    #[test]
    fn test_spinning_sphere_flattens() {
        let grid = scenario_grid();
        let basis = Basis::build(&grid, 54, 36, 8);
        let solver = FigureSolver::new(&grid, &basis, SolverConfig::default()).unwrap();
        let mode = ShapeMode::Sphere;
        let seed_mass = mode.seed(&grid, 0.3).occupied_count();
        let record = solver.solve_with(&mode, 0.3, &mut NullObserver);
        assert_eq!(record.outcome, Outcome::Converged);
        assert!(record.metrics.aspect_ratio.unwrap() > 1.2);
        assert!(record.iterations > 1);
        let cells = record.field.unwrap();
        assert_eq!(cells.iter().filter(|&&v| v != 0).count(), seed_mass);
    }

    #[test]
    fn test_fat_torus_collapses() {
        let grid = Grid::new(30, 12, 2.75, 1.1, 8.25, 3.3).unwrap();
        let basis = Basis::build(&grid, 60, 24, 4);
        let solver = FigureSolver::new(&grid, &basis, SolverConfig::default()).unwrap();
        let record = solver.solve_with(&ShapeMode::Torus, 1.0, &mut NullObserver);
        assert_eq!(record.outcome, Outcome::Collapsed);
        assert_eq!(record.metrics.rho_min, None);
        assert!(record.metrics.rho_max.is_some());
    }

    #[test]
    fn test_iteration_cap() {
        let grid = scenario_grid();
        let basis = Basis::build(&grid, 54, 36, 8);
        let solver = FigureSolver::new(&grid, &basis, solver_config(2, 0)).unwrap();
        let record = solver.solve_with(&ShapeMode::Sphere, 0.3, &mut NullObserver);
        assert_eq!(record.outcome, Outcome::DidNotConverge);
        assert_eq!(record.iterations, 2);
    }

    #[test]
    fn test_boundary_hit_leaves_extents_undefined() {
        let grid = scenario_grid();
        let basis = Basis::build(&grid, 54, 36, 8);
        let solver = FigureSolver::new(&grid, &basis, SolverConfig::default()).unwrap();
        let mode = ShapeMode::Ellipsoid {
            max_aspect_ratio: 1.5,
        };
        let record = solver.solve_with(&mode, 0.5, &mut NullObserver);
        assert_eq!(record.outcome, Outcome::BoundaryHit);
        assert_eq!(record.metrics.rho_max, None);
        assert_eq!(record.metrics.aspect_ratio, None);
        assert_eq!(record.rotation_parameter, None);
    }

    #[test]
    fn test_checkpoints() {
        let grid = scenario_grid();
        let basis = Basis::build(&grid, 54, 36, 8);
        let solver = FigureSolver::new(&grid, &basis, solver_config(500, 2)).unwrap();
        let mut recorder = SnapshotRecorder::new();
        let record = solver.solve_with(&ShapeMode::Sphere, 0.3, &mut recorder);

        let frames = recorder.frames();
        assert_eq!(frames.first().unwrap().state, SolverState::Seeded);
        assert_eq!(
            frames.last().unwrap().state,
            SolverState::Terminal(record.outcome)
        );
        assert_eq!(frames.len(), 2 + (record.iterations - 1) / 2);
        for frame in &frames[1..frames.len() - 1] {
            assert!(matches!(
                frame.state,
                SolverState::Iterating { iteration } if iteration % 2 == 0
            ));
            assert_eq!(frame.field.shape(), &[grid.nz, grid.nrho]);
        }
    }

    #[test]
    fn test_observer_does_not_change_result() {
        let grid = scenario_grid();
        let basis = Basis::build(&grid, 36, 24, 4);
        let solver = FigureSolver::new(&grid, &basis, solver_config(500, 1)).unwrap();
        let mode = ShapeMode::Sphere;
        let quiet = solver.solve_with(&mode, 0.2, &mut NullObserver);
        let watched = solver.solve_with(&mode, 0.2, &mut SnapshotRecorder::new());
        assert_eq!(quiet.outcome, watched.outcome);
        assert_eq!(quiet.iterations, watched.iterations);
        assert_eq!(quiet.field, watched.field);
    }

    fn pattern(grid: &Grid, cells: &[(usize, usize)]) -> MassField {
        let mut field = MassField::empty(grid);
        for &(iz, ir) in cells {
            field.set(iz, ir, true);
        }
        field
    }

    #[test]
    fn test_cycle_guard_catches_period_two() {
        let grid = Grid::new(6, 4, 1.0, 1.0, 3.0, 3.0).unwrap();
        let a = pattern(&grid, &[(0, 0), (0, 1)]).fingerprint();
        let b = pattern(&grid, &[(0, 0), (1, 0)]).fingerprint();
        assert_ne!(a, b);

        // A -> B, then B -> A: the second post-step field repeats A.
        let mut guard = CycleGuard::new(2);
        guard.record(a);
        assert!(!guard.seen(b));
        guard.record(b);
        assert!(guard.seen(a));

        let mut narrow = CycleGuard::new(1);
        narrow.record(a);
        narrow.record(b);
        assert!(!narrow.seen(a), "a single-entry window forgets A");

        let mut off = CycleGuard::new(0);
        off.record(a);
        off.record(b);
        assert!(!off.seen(a));
        assert!(!off.seen(b));
    }

    #[test]
    fn test_repeated_field_stops_before_cap() {
        let grid = Grid::new(6, 4, 1.0, 1.0, 3.0, 3.0).unwrap();
        let basis = Basis::build(&grid, 2, 2, 1);
        let solver = FigureSolver::new(&grid, &basis, solver_config(500, 0)).unwrap();
        let a = pattern(&grid, &[(0, 0), (0, 1)]);
        let b = pattern(&grid, &[(0, 0), (1, 0)]);

        let mut cycles = CycleGuard::new(solver.config.cycle_window);
        cycles.record(a.fingerprint());
        cycles.record(b.fingerprint());
        let outcome = solver.classify(&ShapeMode::Sphere, &a, true, 2, &cycles);
        assert_eq!(outcome, Some(Outcome::DidNotConverge));
        assert!(2 < solver.config.max_iterations);

        // Unseen configurations keep iterating.
        let c = pattern(&grid, &[(0, 0), (1, 1)]);
        assert_eq!(solver.classify(&ShapeMode::Sphere, &c, true, 2, &cycles), None);

        // Boundary and fixed-point checks still win over a repeat.
        let edge = pattern(&grid, &[(0, 0), (0, 5)]);
        let mut seen_edge = CycleGuard::new(8);
        seen_edge.record(edge.fingerprint());
        assert_eq!(
            solver.classify(&ShapeMode::Sphere, &edge, true, 2, &seen_edge),
            Some(Outcome::BoundaryHit)
        );
        assert_eq!(
            solver.classify(&ShapeMode::Sphere, &a, false, 2, &cycles),
            Some(Outcome::Converged)
        );
    }

    #[test]
    fn test_zero_window_disables_cycle_check() {
        let grid = Grid::new(6, 4, 1.0, 1.0, 3.0, 3.0).unwrap();
        let basis = Basis::build(&grid, 2, 2, 1);
        let config = SolverConfig {
            max_iterations: 500,
            cycle_window: 0,
            checkpoint_interval: 0,
        };
        let solver = FigureSolver::new(&grid, &basis, config).unwrap();
        let a = pattern(&grid, &[(0, 0), (0, 1)]);
        let b = pattern(&grid, &[(0, 0), (1, 0)]);

        let mut cycles = CycleGuard::new(solver.config.cycle_window);
        cycles.record(a.fingerprint());
        cycles.record(b.fingerprint());
        assert_eq!(solver.classify(&ShapeMode::Sphere, &a, true, 2, &cycles), None);
    }

    #[test]
    fn test_rejects_basis_for_other_grid() {
        let grid = scenario_grid();
        let other = Grid::new(6, 4, 1.0, 1.0, 3.0, 3.0).unwrap();
        let basis = Basis::build(&other, 2, 2, 1);
        let result = FigureSolver::new(&grid, &basis, SolverConfig::default());
        assert!(matches!(result, Err(FigureError::ConfigError(_))));
    }
}
