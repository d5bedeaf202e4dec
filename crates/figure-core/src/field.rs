// ─────────────────────────────────────────────────────────────────────
// Figure of Equilibrium — Mass Field
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Binary occupancy of the (ρ ≥ 0, z ≥ 0) quadrant.
//!
//! The body is mirror-symmetric across ρ = 0 (axisymmetry) and z = 0
//! (equatorial plane), so the neighbour of a first-column or first-row
//! cell across that plane is the cell itself.

use figure_types::state::Grid;
use ndarray::Array2;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MassField {
    cells: Array2<u8>, // [nz, nrho], 0 or 1
}

impl MassField {
    pub fn empty(grid: &Grid) -> Self {
        MassField {
            cells: Array2::zeros((grid.nz, grid.nrho)),
        }
    }

    /// Occupy every cell whose centre satisfies `inside(ρ, z)`.
    pub fn from_fn<F>(grid: &Grid, inside: F) -> Self
    where
        F: Fn(f64, f64) -> bool,
    {
        MassField {
            cells: Array2::from_shape_fn((grid.nz, grid.nrho), |(iz, ir)| {
                u8::from(inside(grid.rho[ir], grid.z[iz]))
            }),
        }
    }

    /// Wrap an existing occupancy array; any non-zero entry counts as 1.
    pub fn from_cells(cells: Array2<u8>) -> Self {
        MassField {
            cells: cells.mapv(|v| u8::from(v != 0)),
        }
    }

    pub fn cells(&self) -> &Array2<u8> {
        &self.cells
    }

    pub fn into_cells(self) -> Array2<u8> {
        self.cells
    }

    /// `(nz, nrho)`.
    pub fn dim(&self) -> (usize, usize) {
        self.cells.dim()
    }

    pub fn is_occupied(&self, iz: usize, ir: usize) -> bool {
        self.cells[[iz, ir]] != 0
    }

    pub fn set(&mut self, iz: usize, ir: usize, occupied: bool) {
        self.cells[[iz, ir]] = u8::from(occupied);
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&v| v != 0).count()
    }

    /// Occupancy as a density field (1.0 inside, 0.0 outside).
    pub fn density(&self) -> Array2<f64> {
        self.cells.mapv(f64::from)
    }

    /// Union of two fields on the same grid.
    pub fn union(&self, other: &MassField) -> MassField {
        let mut cells = self.cells.clone();
        cells.zip_mut_with(&other.cells, |a, &b| *a |= b);
        MassField { cells }
    }

    /// True when no cell is occupied in both fields.
    pub fn is_disjoint(&self, other: &MassField) -> bool {
        self.cells
            .iter()
            .zip(other.cells.iter())
            .all(|(&a, &b)| a & b == 0)
    }

    /// Hash of the occupancy pattern for cycle detection.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.cells.hash(&mut hasher);
        hasher.finish()
    }

    /// Any occupied cell in the outermost radial column or axial row.
    pub fn touches_outer_boundary(&self) -> bool {
        let (nz, nrho) = self.dim();
        (0..nz).any(|iz| self.is_occupied(iz, nrho - 1))
            || (0..nrho).any(|ir| self.is_occupied(nz - 1, ir))
    }

    /// Any occupied cell in the ρ = 0 column.
    pub fn touches_axis(&self) -> bool {
        (0..self.dim().0).any(|iz| self.is_occupied(iz, 0))
    }

    /// Occupied cells with at least one unoccupied 4-neighbour, plus those
    /// unoccupied neighbours, in raster (iz, ir) order.
    ///
    /// Cells beyond the outer grid edges count as unoccupied but are not
    /// part of the set.
    pub fn edge_cells(&self) -> Vec<(usize, usize)> {
        let (nz, nrho) = self.dim();
        let mut in_edge = Array2::from_elem((nz, nrho), false);

        for iz in 0..nz {
            for ir in 0..nrho {
                if !self.is_occupied(iz, ir) {
                    continue;
                }
                // Neighbours across ρ = 0 and z = 0 are the cell itself.
                let neighbours = [
                    (iz, ir + 1),
                    (iz, ir.saturating_sub(1)),
                    (iz + 1, ir),
                    (iz.saturating_sub(1), ir),
                ];
                for (jz, jr) in neighbours {
                    if jz >= nz || jr >= nrho {
                        in_edge[[iz, ir]] = true;
                    } else if !self.is_occupied(jz, jr) {
                        in_edge[[iz, ir]] = true;
                        in_edge[[jz, jr]] = true;
                    }
                }
            }
        }

        let mut edge = Vec::new();
        for iz in 0..nz {
            for ir in 0..nrho {
                if in_edge[[iz, ir]] {
                    edge.push((iz, ir));
                }
            }
        }
        edge
    }
}
