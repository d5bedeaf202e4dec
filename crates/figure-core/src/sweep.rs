// ─────────────────────────────────────────────────────────────────────
// Figure of Equilibrium — Sweep Driver
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Runs one solve per control value and fits the resulting shape curve.

use crate::equilibrium::EquilibriumSolver;
use crate::mode::ShapeMode;
use crate::observer::IterationObserver;
use figure_math::fit::{least_squares, FitResult};
use figure_types::config::{FigureConfig, FitModel, ModeKind};
use figure_types::error::FigureResult;
use figure_types::state::{EquilibriumRecord, Outcome};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

/// Ordered control values for one shape family.
#[derive(Debug, Clone)]
pub struct Sweep {
    name: String,
    mode: ShapeMode,
    values: Vec<f64>,
    fit: FitModel,
    keep_fields: bool,
}

/// Everything a sweep produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    pub name: String,
    pub mode: ModeKind,
    pub records: Vec<EquilibriumRecord>,
    /// Control values never attempted, after an early stop.
    pub skipped: Vec<f64>,
    /// Aspect ratio vs. rotation parameter over converged records.
    pub aspect_fit: Option<FitResult>,
    /// Elongation vs. rotation parameter, toroidal sweeps only.
    pub elongation_fit: Option<FitResult>,
}

impl SweepReport {
    pub fn converged(&self) -> impl Iterator<Item = &EquilibriumRecord> {
        self.records
            .iter()
            .filter(|r| r.outcome == Outcome::Converged)
    }

    fn ring_outcomes(&self) -> impl Iterator<Item = &EquilibriumRecord> {
        self.records
            .iter()
            .filter(|r| matches!(r.outcome, Outcome::Converged | Outcome::Collapsed))
    }

    /// Number of switches between Collapsed and Converged along the sweep.
    /// Other outcomes are passed over.
    pub fn crossovers(&self) -> usize {
        let outcomes: Vec<Outcome> = self.ring_outcomes().map(|r| r.outcome).collect();
        outcomes.windows(2).filter(|w| w[0] != w[1]).count()
    }

    /// Control value of the first Converged record that follows a
    /// Collapsed one.
    pub fn collapse_threshold(&self) -> Option<f64> {
        let records: Vec<&EquilibriumRecord> = self.ring_outcomes().collect();
        records
            .windows(2)
            .find(|w| w[0].outcome == Outcome::Collapsed && w[1].outcome == Outcome::Converged)
            .map(|w| w[1].control_value)
    }
}

impl Sweep {
    pub fn new(name: impl Into<String>, mode: ShapeMode, values: Vec<f64>, fit: FitModel) -> Self {
        Sweep {
            name: name.into(),
            mode,
            values,
            fit,
            keep_fields: false,
        }
    }

    pub fn keep_fields(mut self, keep: bool) -> Self {
        self.keep_fields = keep;
        self
    }

    pub fn from_config(cfg: &FigureConfig) -> FigureResult<Self> {
        Ok(Sweep::new(
            cfg.name.clone(),
            ShapeMode::from_config(cfg),
            cfg.sweep.control_values()?,
            cfg.sweep.fit,
        )
        .keep_fields(cfg.sweep.keep_fields))
    }

    /// Solve every control value in order, reseeding each time.
    ///
    /// Stops after the first BoundaryHit, or before the next value once
    /// `stop` is raised.
    pub fn run<S>(
        &self,
        solver: &S,
        observer: &mut dyn IterationObserver,
        stop: Option<&AtomicBool>,
    ) -> SweepReport
    where
        S: EquilibriumSolver + ?Sized,
    {
        let mut records = Vec::with_capacity(self.values.len());
        let mut skipped = Vec::new();

        for (i, &control) in self.values.iter().enumerate() {
            if stop.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                warn!(control, "sweep cancelled");
                skipped.extend_from_slice(&self.values[i..]);
                break;
            }

            let mut record = solver.solve(&self.mode, control, observer);
            if !self.keep_fields {
                record.field = None;
            }
            info!(
                step = i + 1,
                of = self.values.len(),
                control,
                outcome = ?record.outcome,
                iterations = record.iterations,
                aspect_ratio = ?record.metrics.aspect_ratio,
                "sweep step"
            );

            let halt = record.outcome.halts_sweep();
            records.push(record);
            if halt {
                skipped.extend_from_slice(&self.values[i + 1..]);
                if !skipped.is_empty() {
                    warn!(
                        control,
                        remaining = skipped.len(),
                        "figure reached the grid boundary, skipping higher values"
                    );
                }
                break;
            }
        }

        let aspect_fit = self.fit_converged(&records, "aspect ratio", |r| r.metrics.aspect_ratio);
        let elongation_fit = if self.mode.is_toroidal() {
            self.fit_converged(&records, "elongation", |r| r.metrics.elongation)
        } else {
            None
        };

        SweepReport {
            name: self.name.clone(),
            mode: self.mode.kind(),
            records,
            skipped,
            aspect_fit,
            elongation_fit,
        }
    }

    /// Fit `quantity` against the rotation parameter over converged records.
    /// Too few samples or a degenerate system yields `None`.
    fn fit_converged<F>(
        &self,
        records: &[EquilibriumRecord],
        label: &str,
        quantity: F,
    ) -> Option<FitResult>
    where
        F: Fn(&EquilibriumRecord) -> Option<f64>,
    {
        let (x, y): (Vec<f64>, Vec<f64>) = records
            .iter()
            .filter(|r| r.outcome == Outcome::Converged)
            .filter_map(|r| Some((r.rotation_parameter?, quantity(r)?)))
            .unzip();

        let needed = self.fit.n_params();
        if x.len() < needed {
            warn!(
                samples = x.len(),
                needed, "not enough converged figures to fit {label}"
            );
            return None;
        }
        match least_squares(&x, &y, self.fit) {
            Ok(fit) => {
                info!(
                    coefficients = ?fit.coefficients,
                    rms = fit.rms_residual,
                    "fitted {label}"
                );
                Some(fit)
            }
            Err(e) => {
                warn!("{label} fit failed: {e}");
                None
            }
        }
    }
}
