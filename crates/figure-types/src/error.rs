// ─────────────────────────────────────────────────────────────────────
// Figure of Equilibrium — Errors
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use thiserror::Error;

/// Fatal errors. Terminal solver states (boundary hit, collapse,
/// non-convergence) are `Outcome` values, never errors.
#[derive(Error, Debug)]
pub enum FigureError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Curve fit error: {0}")]
    FitError(String),

    #[error("Linear algebra error: {0}")]
    LinAlg(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type FigureResult<T> = Result<T, FigureError>;
