// ─────────────────────────────────────────────────────────────────────
// Phase-Drift Kernel — Observation and State Types
// ─────────────────────────────────────────────────────────────────────
//! Producer-facing observation types (`FeatureSample`, `BandEnergies`)
//! and the derived `StateVector3D`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DriftError, DriftResult};

/// Neutral value for producer channels that have no sensor attached.
pub const NEUTRAL_FEATURE: f64 = 0.5;

fn neutral() -> f64 {
    NEUTRAL_FEATURE
}

/// Clamp a value to [0, 1], mapping NaN to 0 and Inf to the nearest bound.
#[inline]
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        log::warn!("clamp_unit: NaN detected, clamping to 0.0");
        return 0.0;
    }
    if value.is_infinite() {
        let boundary = if value > 0.0 { 1.0 } else { 0.0 };
        log::warn!("clamp_unit: Inf detected, clamping to {boundary:.1}");
        return boundary;
    }
    value.clamp(0.0, 1.0)
}

fn check_unit(name: &str, value: f64) -> DriftResult<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(DriftError::InvalidInput(format!(
            "{name} must be in [0, 1], got {value}"
        )))
    }
}

/// Pre-normalised scalar features supplied by the signal-analysis producer.
///
/// The first three drive the state-space axes. The remaining channels are
/// carried through to the regime log and default to [`NEUTRAL_FEATURE`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureSample {
    pub cognitive_load: f64,
    pub emotional_valence: f64,
    pub attention_level: f64,
    #[serde(default = "neutral")]
    pub heart_rate_variability: f64,
    #[serde(default = "neutral")]
    pub breathing_pattern: f64,
    #[serde(default = "neutral")]
    pub voice_stress: f64,
}

impl FeatureSample {
    pub fn new(cognitive_load: f64, emotional_valence: f64, attention_level: f64) -> Self {
        Self {
            cognitive_load,
            emotional_valence,
            attention_level,
            heart_rate_variability: NEUTRAL_FEATURE,
            breathing_pattern: NEUTRAL_FEATURE,
            voice_stress: NEUTRAL_FEATURE,
        }
    }

    /// Reject any channel outside [0, 1] or non-finite.
    pub fn validate(&self) -> DriftResult<()> {
        check_unit("cognitive_load", self.cognitive_load)?;
        check_unit("emotional_valence", self.emotional_valence)?;
        check_unit("attention_level", self.attention_level)?;
        check_unit("heart_rate_variability", self.heart_rate_variability)?;
        check_unit("breathing_pattern", self.breathing_pattern)?;
        check_unit("voice_stress", self.voice_stress)
    }
}

impl Default for FeatureSample {
    fn default() -> Self {
        Self::new(NEUTRAL_FEATURE, NEUTRAL_FEATURE, NEUTRAL_FEATURE)
    }
}

/// The five named frequency bands, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Delta,
    Theta,
    Alpha,
    Beta,
    Gamma,
}

impl Band {
    /// Canonical enumeration order; also the argmax tie-break order.
    pub const ALL: [Band; 5] = [Band::Delta, Band::Theta, Band::Alpha, Band::Beta, Band::Gamma];

    pub fn name(self) -> &'static str {
        match self {
            Band::Delta => "delta",
            Band::Theta => "theta",
            Band::Alpha => "alpha",
            Band::Beta => "beta",
            Band::Gamma => "gamma",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-band energy in [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BandEnergies {
    pub delta: f64,
    pub theta: f64,
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl BandEnergies {
    pub fn new(delta: f64, theta: f64, alpha: f64, beta: f64, gamma: f64) -> Self {
        Self { delta, theta, alpha, beta, gamma }
    }

    /// All energy in a single band, zero elsewhere.
    pub fn single(band: Band, energy: f64) -> Self {
        let mut e = Self::default();
        e.set(band, energy);
        e
    }

    pub fn get(&self, band: Band) -> f64 {
        match band {
            Band::Delta => self.delta,
            Band::Theta => self.theta,
            Band::Alpha => self.alpha,
            Band::Beta => self.beta,
            Band::Gamma => self.gamma,
        }
    }

    pub fn set(&mut self, band: Band, energy: f64) {
        match band {
            Band::Delta => self.delta = energy,
            Band::Theta => self.theta = energy,
            Band::Alpha => self.alpha = energy,
            Band::Beta => self.beta = energy,
            Band::Gamma => self.gamma = energy,
        }
    }

    /// Energies in canonical band order.
    pub fn values(&self) -> [f64; 5] {
        [self.delta, self.theta, self.alpha, self.beta, self.gamma]
    }

    /// Band holding the largest energy; ties go to the earliest band in
    /// [`Band::ALL`].
    pub fn dominant(&self) -> Band {
        let mut best = Band::ALL[0];
        for band in Band::ALL.iter().copied().skip(1) {
            if self.get(band) > self.get(best) {
                best = band;
            }
        }
        best
    }

    pub fn validate(&self) -> DriftResult<()> {
        for band in Band::ALL {
            check_unit(band.name(), self.get(band))?;
        }
        Ok(())
    }
}

/// A point in the normalised (cognitive, emotional, attentional) space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateVector3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Caller-supplied time in milliseconds.
    pub timestamp: u64,
    /// Inverse band-energy dispersion, in [0, 1].
    pub coherence_radius: f64,
    /// Per-axis rate of change in units per second.
    pub phase_velocity: [f64; 3],
}

impl StateVector3D {
    /// A stationary point with no timing or coherence metadata.
    pub fn at(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            timestamp: 0,
            coherence_radius: 0.0,
            phase_velocity: [0.0; 3],
        }
    }

    pub fn with_coherence(mut self, coherence_radius: f64) -> Self {
        self.coherence_radius = coherence_radius;
        self
    }

    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn coords(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn is_finite(&self) -> bool {
        self.coords().iter().all(|v| v.is_finite())
            && self.coherence_radius.is_finite()
            && self.phase_velocity.iter().all(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_unit_nan() {
        assert_eq!(clamp_unit(f64::NAN), 0.0);
    }

    #[test]
    fn test_clamp_unit_inf() {
        assert_eq!(clamp_unit(f64::INFINITY), 1.0);
        assert_eq!(clamp_unit(f64::NEG_INFINITY), 0.0);
    }

    #[test]
    fn test_clamp_unit_range() {
        assert_eq!(clamp_unit(1.3), 1.0);
        assert_eq!(clamp_unit(-0.2), 0.0);
        assert_eq!(clamp_unit(0.42), 0.42);
    }

    #[test]
    fn test_feature_sample_rejects_out_of_range() {
        let f = FeatureSample::new(1.2, 0.5, 0.5);
        assert!(matches!(f.validate(), Err(DriftError::InvalidInput(_))));
    }

    #[test]
    fn test_feature_sample_rejects_nan() {
        let mut f = FeatureSample::default();
        f.voice_stress = f64::NAN;
        assert!(f.validate().is_err());
    }

    #[test]
    fn test_feature_sample_neutral_defaults_from_json() {
        let f: FeatureSample = serde_json::from_str(
            r#"{"cognitive_load":0.1,"emotional_valence":0.2,"attention_level":0.3}"#,
        )
        .unwrap();
        assert_eq!(f.heart_rate_variability, NEUTRAL_FEATURE);
        assert_eq!(f.breathing_pattern, NEUTRAL_FEATURE);
        assert_eq!(f.voice_stress, NEUTRAL_FEATURE);
        assert!(f.validate().is_ok());
    }

    #[test]
    fn test_dominant_band_argmax() {
        let e = BandEnergies::new(0.1, 0.2, 0.3, 0.9, 0.4);
        assert_eq!(e.dominant(), Band::Beta);
    }

    #[test]
    fn test_dominant_band_tie_breaks_canonically() {
        let e = BandEnergies::new(0.2, 0.7, 0.7, 0.1, 0.7);
        assert_eq!(e.dominant(), Band::Theta);
        assert_eq!(BandEnergies::default().dominant(), Band::Delta);
    }

    #[test]
    fn test_band_energies_validate() {
        assert!(BandEnergies::single(Band::Alpha, 1.0).validate().is_ok());
        let bad = BandEnergies::new(0.0, 0.0, 1.01, 0.0, 0.0);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_band_serializes_lowercase() {
        let json = serde_json::to_string(&Band::Gamma).unwrap();
        assert_eq!(json, "\"gamma\"");
        assert_eq!(Band::Alpha.to_string(), "alpha");
    }
}
