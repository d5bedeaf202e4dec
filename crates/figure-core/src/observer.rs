// ─────────────────────────────────────────────────────────────────────
// Figure of Equilibrium — Iteration Observers
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Checkpoint hooks into a running solve.

use crate::field::MassField;
use figure_types::state::Outcome;
use ndarray::Array2;

/// Where a solve currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverState {
    Seeded,
    Iterating { iteration: usize },
    Terminal(Outcome),
}

/// Borrowed view of the solver at a checkpoint.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub control_value: f64,
    /// Iterations completed so far.
    pub iteration: usize,
    pub state: SolverState,
    pub omega_squared: f64,
    pub field: &'a MassField,
    /// Effective potential V the field was last ranked against.
    pub potential: &'a Array2<f64>,
}

/// Receives snapshots. Observers never influence the solve.
pub trait IterationObserver {
    fn on_checkpoint(&mut self, snapshot: &Snapshot<'_>);
}

/// Discards every snapshot.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl IterationObserver for NullObserver {
    fn on_checkpoint(&mut self, _snapshot: &Snapshot<'_>) {}
}

/// Owned copy of a [`Snapshot`].
#[derive(Debug, Clone)]
pub struct Frame {
    pub control_value: f64,
    pub iteration: usize,
    pub state: SolverState,
    pub omega_squared: f64,
    pub field: Array2<u8>,
    pub potential: Array2<f64>,
}

/// Keeps every snapshot in memory.
#[derive(Debug, Default, Clone)]
pub struct SnapshotRecorder {
    frames: Vec<Frame>,
}

impl SnapshotRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl IterationObserver for SnapshotRecorder {
    fn on_checkpoint(&mut self, snapshot: &Snapshot<'_>) {
        self.frames.push(Frame {
            control_value: snapshot.control_value,
            iteration: snapshot.iteration,
            state: snapshot.state,
            omega_squared: snapshot.omega_squared,
            field: snapshot.field.cells().clone(),
            potential: snapshot.potential.clone(),
        });
    }
}

impl<T: IterationObserver + ?Sized> IterationObserver for &mut T {
    fn on_checkpoint(&mut self, snapshot: &Snapshot<'_>) {
        (**self).on_checkpoint(snapshot);
    }
}
