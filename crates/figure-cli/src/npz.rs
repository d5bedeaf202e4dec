// ─────────────────────────────────────────────────────────────────────
// Figure of Equilibrium — NPZ Snapshot Sink
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Streams solver checkpoints into a NumPy `.npz` archive.
//!
//! Array names: `{seq:05}_c{control:.4}_i{iteration:04}_{state}_{field|potential}`,
//! plus `final_{step:03}_c{control:.4}` for figures retained by the sweep.

use anyhow::{anyhow, Context};
use figure_core::observer::{IterationObserver, Snapshot, SolverState};
use figure_types::state::{EquilibriumRecord, Outcome};
use ndarray_npy::NpzWriter;
use std::fs::File;
use tracing::warn;

pub struct NpzSink {
    writer: NpzWriter<File>,
    frames: usize,
    written: usize,
    error: Option<String>,
}

fn state_tag(state: SolverState) -> &'static str {
    match state {
        SolverState::Seeded => "seed",
        SolverState::Iterating { .. } => "iter",
        SolverState::Terminal(Outcome::Converged) => "converged",
        SolverState::Terminal(Outcome::BoundaryHit) => "boundary",
        SolverState::Terminal(Outcome::Collapsed) => "collapsed",
        SolverState::Terminal(Outcome::DidNotConverge) => "unconverged",
    }
}

impl NpzSink {
    pub fn create(path: &str) -> anyhow::Result<Self> {
        let file = File::create(path).with_context(|| format!("creating snapshot archive '{path}'"))?;
        Ok(NpzSink {
            writer: NpzWriter::new(file),
            frames: 0,
            written: 0,
            error: None,
        })
    }

    /// Append a retained final field from the sweep report.
    pub fn add_record(&mut self, step: usize, record: &EquilibriumRecord) -> anyhow::Result<()> {
        if let Some(field) = &record.field {
            let name = format!("final_{step:03}_c{:.4}", record.control_value);
            self.writer
                .add_array(name.as_str(), field)
                .map_err(|e| anyhow!("writing '{name}': {e}"))?;
            self.written += 1;
        }
        Ok(())
    }

    /// Close the archive. Returns the number of arrays written, or the
    /// first error hit while streaming checkpoints.
    pub fn finish(self) -> anyhow::Result<usize> {
        if let Some(e) = self.error {
            return Err(anyhow!("snapshot archive incomplete: {e}"));
        }
        self.writer
            .finish()
            .map_err(|e| anyhow!("finalising snapshot archive: {e}"))?;
        Ok(self.written)
    }
}

impl IterationObserver for NpzSink {
    fn on_checkpoint(&mut self, snapshot: &Snapshot<'_>) {
        if self.error.is_some() {
            return;
        }
        let stem = format!(
            "{:05}_c{:.4}_i{:04}_{}",
            self.frames,
            snapshot.control_value,
            snapshot.iteration,
            state_tag(snapshot.state)
        );
        let result = self
            .writer
            .add_array(format!("{stem}_field"), snapshot.field.cells())
            .and_then(|_| {
                self.writer
                    .add_array(format!("{stem}_potential"), snapshot.potential)
            });
        match result {
            Ok(()) => {
                self.frames += 1;
                self.written += 2;
            }
            Err(e) => {
                warn!("dropping snapshots after write failure: {e}");
                self.error = Some(e.to_string());
            }
        }
    }
}
