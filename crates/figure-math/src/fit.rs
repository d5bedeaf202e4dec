// ─────────────────────────────────────────────────────────────────────
// Figure of Equilibrium — Curve Fitting
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Linear-in-parameters least-squares fits of shape ratio vs. rotation.

use crate::linalg::lstsq_qr;
use figure_types::config::FitModel;
use figure_types::error::{FigureError, FigureResult};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Fitted coefficients plus goodness of fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub model: FitModel,
    pub coefficients: Vec<f64>,
    pub rms_residual: f64,
    pub samples: usize,
}

impl FitResult {
    pub fn evaluate(&self, x: f64) -> f64 {
        design_row(&self.model, x)
            .iter()
            .zip(&self.coefficients)
            .map(|(b, c)| b * c)
            .sum()
    }
}

/// Basis-function values of `model` at `x`, in coefficient order.
pub fn design_row(model: &FitModel, x: f64) -> Vec<f64> {
    match *model {
        FitModel::Polynomial { degree } => {
            let mut row = Vec::with_capacity(degree + 1);
            let mut p = 1.0;
            for _ in 0..=degree {
                row.push(p);
                p *= x;
            }
            row
        }
        FitModel::Cosine => vec![(2.0 * x).cos(), 1.0],
    }
}

/// Least-squares fit of `model` to the samples `(x[i], y[i])`.
pub fn least_squares(x: &[f64], y: &[f64], model: FitModel) -> FigureResult<FitResult> {
    if x.len() != y.len() {
        return Err(FigureError::FitError(format!(
            "sample length mismatch: {} x vs {} y",
            x.len(),
            y.len()
        )));
    }
    let n_params = model.n_params();
    if x.len() < n_params {
        return Err(FigureError::FitError(format!(
            "{n_params} parameters need at least {n_params} samples, got {}",
            x.len()
        )));
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return Err(FigureError::FitError("non-finite sample".to_string()));
    }

    let mut a = Array2::zeros((x.len(), n_params));
    for (i, &xi) in x.iter().enumerate() {
        for (j, b) in design_row(&model, xi).into_iter().enumerate() {
            a[[i, j]] = b;
        }
    }
    let b = Array1::from_vec(y.to_vec());

    let coefficients = lstsq_qr(&a, &b)
        .map_err(|e| FigureError::FitError(format!("{model:?}: {e}")))?
        .to_vec();

    let residual = &a.dot(&Array1::from_vec(coefficients.clone())) - &b;
    let rms_residual = (residual.mapv(|r| r * r).sum() / x.len() as f64).sqrt();

    Ok(FitResult {
        model,
        coefficients,
        rms_residual,
        samples: x.len(),
    })
}
