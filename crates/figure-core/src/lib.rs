// ─────────────────────────────────────────────────────────────────────
// Figure of Equilibrium — Core
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Spectral potential solver and free-boundary figure relaxation.
//!
//! Stage 1: basis, mass field, potential
//! Stage 2: shape modes, equilibrium iterator, observers, sweep driver

pub mod basis;
pub mod equilibrium;
pub mod field;
pub mod mode;
pub mod observer;
pub mod potential;
pub mod sweep;
