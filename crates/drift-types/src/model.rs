// ─────────────────────────────────────────────────────────────────────
// Phase-Drift Kernel — Summary Types
// ─────────────────────────────────────────────────────────────────────
//! Basins, collapse episodes, and regime records emitted by the kernel.

use serde::{Deserialize, Serialize};

use crate::state::{Band, BandEnergies, FeatureSample, StateVector3D};

/// Qualitative behaviour of an attractor basin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BasinKind {
    Stable,
    Unstable,
    Spiral,
    Chaotic,
}

/// A persistent region of state space that the trajectory revisits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttractorBasin {
    pub center: StateVector3D,
    /// Extent of the basin, > 0.
    pub radius: f64,
    /// Attraction weight in [0, 1].
    pub strength: f64,
    pub kind: BasinKind,
    /// Characteristic frequency in Hz.
    pub resonant_frequency: f64,
}

impl AttractorBasin {
    /// Field contribution at distance `d` from the center: linear falloff
    /// from `strength` at the center to zero at `radius`.
    pub fn influence_at(&self, d: f64) -> f64 {
        if d < self.radius {
            self.strength * (1.0 - d / self.radius)
        } else {
            0.0
        }
    }
}

/// Shape of the coherence curve while an episode recovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryPattern {
    Exponential,
    Oscillatory,
    Discontinuous,
}

/// Interval during which coherence stayed below threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollapseEpisode {
    /// Timestamp (ms) of the first sub-threshold vector.
    pub onset: u64,
    /// Milliseconds from onset to recovery; 0 while open.
    pub duration: u64,
    /// Threshold minus the coherence radius at onset.
    pub magnitude: f64,
    /// Provisionally `Exponential` until the episode closes.
    pub recovery_pattern: RecoveryPattern,
    pub trigger_state: StateVector3D,
}

impl CollapseEpisode {
    pub fn is_open(&self) -> bool {
        self.duration == 0
    }
}

/// Collapse detector state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollapseState {
    Nominal,
    Collapsed,
}

/// One tick of the regime log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeObservation {
    pub timestamp: u64,
    pub features: FeatureSample,
    pub band_energies: BandEnergies,
    /// Inverse-variance score in [0, 1].
    pub coherence_score: f64,
    pub is_transition: bool,
    pub dominant_band: Band,
}

/// Threshold-gated change of dominant band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeTransition {
    pub from: Band,
    pub to: Band,
    pub timestamp: u64,
    /// Energy jump, capped at 1.
    pub confidence: f64,
    /// Milliseconds since the preceding observation.
    pub duration_since_previous: u64,
}
