// ─────────────────────────────────────────────────────────────────────
// Figure of Equilibrium — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::error::{FigureError, FigureResult};
use crate::state::Grid;
use serde::{Deserialize, Serialize};

/// Top-level sweep configuration, loaded from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FigureConfig {
    pub name: String,
    pub domain: DomainConfig,
    #[serde(default)]
    pub spectral: SpectralConfig,
    #[serde(default)]
    pub solver: SolverConfig,
    pub sweep: SweepConfig,
}

/// Finite-volume grid and truncation geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainConfig {
    /// Cells per unit length along ρ.
    pub resolution_rho: f64,
    /// Cells per unit length along z.
    pub resolution_z: f64,
    /// Largest equatorial/polar ratio the grid must hold; sets ρB.
    pub max_aspect_ratio: f64,
    /// ρ_inf / ρB and z_inf / zB.
    #[serde(default = "default_boundary_excess")]
    pub boundary_excess: f64,
    /// Headroom of the truncation box over the unit body.
    #[serde(default = "default_domain_margin")]
    pub domain_margin: f64,
}

fn default_boundary_excess() -> f64 {
    3.0
}
fn default_domain_margin() -> f64 {
    1.1
}

/// Spectral resolution. `max_n`/`max_m` override the values derived from
/// `eigen_resolution`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpectralConfig {
    #[serde(default = "default_eigen_resolution")]
    pub eigen_resolution: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_n: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_m: Option<usize>,
    /// Sub-samples per cell side used when averaging basis values.
    #[serde(default = "default_integration_resolution")]
    pub integration_resolution: usize,
}

fn default_eigen_resolution() -> usize {
    36
}
fn default_integration_resolution() -> usize {
    8
}

impl Default for SpectralConfig {
    fn default() -> Self {
        SpectralConfig {
            eigen_resolution: default_eigen_resolution(),
            max_n: None,
            max_m: None,
            integration_resolution: default_integration_resolution(),
        }
    }
}

impl SpectralConfig {
    /// Radial and axial mode counts `(max_n, max_m)`.
    pub fn mode_counts(&self, max_aspect_ratio: f64) -> (usize, usize) {
        let max_n = self
            .max_n
            .unwrap_or((self.eigen_resolution as f64 * max_aspect_ratio) as usize);
        let max_m = self.max_m.unwrap_or(self.eigen_resolution);
        (max_n, max_m)
    }
}

/// Relaxation loop guards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Number of recent boundary configurations kept for cycle detection.
    /// 0 disables the check; otherwise at least 2.
    #[serde(default = "default_cycle_window")]
    pub cycle_window: usize,
    /// Observer checkpoint spacing in iterations; 0 reports only the seed
    /// and the terminal state.
    #[serde(default)]
    pub checkpoint_interval: usize,
}

fn default_max_iterations() -> usize {
    500
}
fn default_cycle_window() -> usize {
    8
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            max_iterations: default_max_iterations(),
            cycle_window: default_cycle_window(),
            checkpoint_interval: 0,
        }
    }
}

/// Seed family and control-parameter semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeKind {
    /// Unit-sphere seed, control value is ω².
    Sphere,
    /// Maclaurin-guess spheroid seed, control value is ω².
    Ellipsoid,
    /// Ring seed, control value is the seed amplitude α₀; ω is derived.
    Torus,
}

/// Closed-form model fitted to shape ratio vs. rotation parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FitModel {
    /// c₀ + c₁x + … + c_d x^d, coefficients ascending.
    Polynomial { degree: usize },
    /// a·cos(2x) + c, coefficients `[a, c]`.
    Cosine,
}

impl Default for FitModel {
    fn default() -> Self {
        FitModel::Polynomial { degree: 2 }
    }
}

impl FitModel {
    pub fn n_params(&self) -> usize {
        match self {
            FitModel::Polynomial { degree } => degree + 1,
            FitModel::Cosine => 2,
        }
    }
}

/// Inclusive linspace of control values.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RangeConfig {
    pub start: f64,
    pub stop: f64,
    pub steps: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    pub mode: ModeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<RangeConfig>,
    #[serde(default)]
    pub fit: FitModel,
    /// Keep the converged occupancy of every step in the report.
    #[serde(default)]
    pub keep_fields: bool,
}

impl SweepConfig {
    /// Ordered control-parameter sequence. Explicit `values` win over `range`.
    pub fn control_values(&self) -> FigureResult<Vec<f64>> {
        if let Some(values) = &self.values {
            return Ok(values.clone());
        }
        match self.range {
            Some(RangeConfig { start, stop, steps }) => match steps {
                0 => Ok(Vec::new()),
                1 => Ok(vec![start]),
                _ => {
                    let step = (stop - start) / (steps - 1) as f64;
                    Ok((0..steps).map(|i| start + step * i as f64).collect())
                }
            },
            None => Err(FigureError::ConfigError(
                "sweep needs either `values` or `range`".to_string(),
            )),
        }
    }
}

impl FigureConfig {
    /// Load from a JSON file and validate.
    pub fn from_file(path: &str) -> FigureResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Pre-solve validation. Every failure here is fatal.
    pub fn validate(&self) -> FigureResult<()> {
        let d = &self.domain;
        if !(d.resolution_rho > 0.0 && d.resolution_z > 0.0) {
            return Err(FigureError::ConfigError(format!(
                "resolution must be positive, got rho={}, z={}",
                d.resolution_rho, d.resolution_z
            )));
        }
        if !(d.max_aspect_ratio >= 1.0) {
            return Err(FigureError::ConfigError(format!(
                "max_aspect_ratio must be >= 1, got {}",
                d.max_aspect_ratio
            )));
        }
        if !(d.boundary_excess > 1.0) {
            return Err(FigureError::ConfigError(format!(
                "boundary_excess must be > 1 so that rho_inf > rho_B, got {}",
                d.boundary_excess
            )));
        }
        if !(d.domain_margin > 1.0) {
            return Err(FigureError::ConfigError(format!(
                "domain_margin must be > 1, got {}",
                d.domain_margin
            )));
        }

        let (max_n, max_m) = self.spectral.mode_counts(d.max_aspect_ratio);
        if max_n == 0 || max_m == 0 {
            return Err(FigureError::ConfigError(format!(
                "spectral basis is empty: max_n={max_n}, max_m={max_m}"
            )));
        }
        if self.spectral.integration_resolution == 0 {
            return Err(FigureError::ConfigError(
                "integration_resolution must be >= 1".to_string(),
            ));
        }
        if self.solver.max_iterations == 0 {
            return Err(FigureError::ConfigError(
                "max_iterations must be >= 1".to_string(),
            ));
        }
        if self.solver.cycle_window == 1 {
            return Err(FigureError::ConfigError(
                "cycle_window must be 0 (off) or >= 2; a single entry never sees a cycle"
                    .to_string(),
            ));
        }

        let values = self.sweep.control_values()?;
        if values.is_empty() {
            return Err(FigureError::ConfigError("sweep is empty".to_string()));
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(FigureError::ConfigError(format!(
                "control value {bad} is not finite"
            )));
        }
        match self.sweep.mode {
            ModeKind::Sphere | ModeKind::Ellipsoid => {
                if let Some(bad) = values.iter().find(|&&v| v < 0.0) {
                    return Err(FigureError::ConfigError(format!(
                        "omega^2 must be >= 0, got {bad}"
                    )));
                }
            }
            ModeKind::Torus => {
                if let Some(bad) = values.iter().find(|&&v| v <= 0.0) {
                    return Err(FigureError::ConfigError(format!(
                        "torus seed amplitude must be > 0, got {bad}"
                    )));
                }
            }
        }

        // Surface the grid invariants here too.
        self.create_grid().map(|_| ())
    }

    /// Truncation box: ρB = margin·max_aspect, zB = margin.
    pub fn create_grid(&self) -> FigureResult<Grid> {
        let d = &self.domain;
        let rho_bound = d.domain_margin * d.max_aspect_ratio;
        let z_bound = d.domain_margin;
        let nrho = (d.max_aspect_ratio * d.resolution_rho) as usize;
        let nz = d.resolution_z as usize;
        Grid::new(
            nrho,
            nz,
            rho_bound,
            z_bound,
            rho_bound * d.boundary_excess,
            z_bound * d.boundary_excess,
        )
    }
}
