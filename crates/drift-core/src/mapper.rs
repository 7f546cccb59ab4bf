// ─────────────────────────────────────────────────────────────────────
// Phase-Drift Kernel — Vector Mapper
// ─────────────────────────────────────────────────────────────────────
//! Maps one producer observation onto a `StateVector3D`.
//!
//!   (x, y, z)        = (cognitive load, emotional valence, attention)
//!   coherence_radius = 1 / (1 + gain · popvar(E))
//!   phase_velocity   = (p - p_prev) / Δt,  Δt in seconds, 0 if Δt ≤ 0

use drift_types::vecmath::population_variance;
use drift_types::{
    clamp_unit, BandEnergies, DriftConfig, DriftError, DriftResult, FeatureSample,
    StateVector3D,
};

/// Stateless observation → state-vector mapper.
#[derive(Debug, Clone, Copy)]
pub struct VectorMapper {
    variance_gain: f64,
}

impl Default for VectorMapper {
    fn default() -> Self {
        Self::new(5.0)
    }
}

impl VectorMapper {
    pub fn new(variance_gain: f64) -> Self {
        Self { variance_gain }
    }

    pub fn from_config(config: &DriftConfig) -> Self {
        Self::new(config.variance_gain)
    }

    /// Monotonically decreasing in band-energy dispersion; 1.0 when all
    /// bands carry equal energy.
    pub fn coherence_radius(&self, energies: &BandEnergies) -> f64 {
        let variance = population_variance(&energies.values());
        clamp_unit(1.0 / (1.0 + self.variance_gain * variance))
    }

    /// Map an observation, using `previous` for the finite-difference
    /// velocity.
    ///
    /// Rejects out-of-range features or energies and a timestamp earlier
    /// than `previous`.
    pub fn map(
        &self,
        features: &FeatureSample,
        energies: &BandEnergies,
        timestamp: u64,
        previous: Option<&StateVector3D>,
    ) -> DriftResult<StateVector3D> {
        features.validate()?;
        energies.validate()?;

        let x = clamp_unit(features.cognitive_load);
        let y = clamp_unit(features.emotional_valence);
        let z = clamp_unit(features.attention_level);

        let mut phase_velocity = [0.0; 3];
        if let Some(prev) = previous {
            if timestamp < prev.timestamp {
                return Err(DriftError::NonMonotonicTimestamp {
                    previous: prev.timestamp,
                    current: timestamp,
                });
            }
            let dt = (timestamp - prev.timestamp) as f64 / 1000.0;
            if dt > 0.0 {
                phase_velocity = [(x - prev.x) / dt, (y - prev.y) / dt, (z - prev.z) / dt];
            }
        }

        Ok(StateVector3D {
            x,
            y,
            z,
            timestamp,
            coherence_radius: self.coherence_radius(energies),
            phase_velocity,
        })
    }
}
