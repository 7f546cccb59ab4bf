// ─────────────────────────────────────────────────────────────────────
// Phase-Drift Kernel — Phase-Space Field Export
// ─────────────────────────────────────────────────────────────────────
//! Rasterises the basin set into a scalar field over the unit cube and
//! packages a full session snapshot for external consumers.
//!
//! Field value at grid point (i, j, k), sampled at (i/res, j/res, k/res):
//!
//!   F = Σ_b strength_b · (1 - d_b / radius_b)   over basins with d_b < radius_b

use serde::{Deserialize, Serialize};

use drift_types::vecmath::distance;
use drift_types::{
    AttractorBasin, CollapseEpisode, DriftError, DriftResult, StateVector3D,
};

/// Cubic scalar field, flattened x-major: index = (x·res + y)·res + z.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseField {
    pub resolution: usize,
    pub values: Vec<f64>,
}

impl PhaseField {
    /// Sample the basin field on a `resolution`³ grid.
    pub fn generate(basins: &[AttractorBasin], resolution: usize) -> DriftResult<Self> {
        if resolution == 0 {
            return Err(DriftError::Config(
                "field resolution must be >= 1".to_string(),
            ));
        }
        let step = 1.0 / resolution as f64;
        let mut values = Vec::with_capacity(resolution.pow(3));
        for i in 0..resolution {
            for j in 0..resolution {
                for k in 0..resolution {
                    let point =
                        StateVector3D::at(i as f64 * step, j as f64 * step, k as f64 * step);
                    let strength: f64 = basins
                        .iter()
                        .map(|b| b.influence_at(distance(&point, &b.center)))
                        .sum();
                    values.push(strength);
                }
            }
        }
        Ok(Self { resolution, values })
    }

    pub fn at(&self, x: usize, y: usize, z: usize) -> Option<f64> {
        let r = self.resolution;
        if x >= r || y >= r || z >= r {
            return None;
        }
        self.values.get((x * r + y) * r + z).copied()
    }

    pub fn max_value(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }

    /// `[x][y][z]` nested view.
    pub fn to_nested(&self) -> Vec<Vec<Vec<f64>>> {
        let r = self.resolution;
        if r == 0 {
            return Vec::new();
        }
        self.values
            .chunks(r * r)
            .map(|plane| plane.chunks(r).map(<[f64]>::to_vec).collect())
            .collect()
    }
}

/// Everything an external visualiser needs to redraw a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionExport {
    pub trajectory: Vec<StateVector3D>,
    pub attractors: Vec<AttractorBasin>,
    pub collapses: Vec<CollapseEpisode>,
    pub field: PhaseField,
}

impl SessionExport {
    pub fn new(
        trajectory: Vec<StateVector3D>,
        attractors: Vec<AttractorBasin>,
        collapses: Vec<CollapseEpisode>,
        resolution: usize,
    ) -> DriftResult<Self> {
        let field = PhaseField::generate(&attractors, resolution)?;
        Ok(Self {
            trajectory,
            attractors,
            collapses,
            field,
        })
    }

    pub fn to_json(&self) -> DriftResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> DriftResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
