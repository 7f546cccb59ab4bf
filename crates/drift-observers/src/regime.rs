// ─────────────────────────────────────────────────────────────────────
// Phase-Drift Kernel — Regime Transition Detector
// ─────────────────────────────────────────────────────────────────────
//! Rolling log of (features, band energies) observations with
//! threshold-gated detection of dominant-band changes.
//!
//! Per tick:
//!   coherence = clamp(1 / (1 + popvar(E)), 0, 1)
//!   dominant  = argmax(E), ties in canonical band order
//!
//! A change of dominant band is a transition only when the handover energy
//! jump exceeds `transition_threshold`; smaller changes are noise. The
//! jump is the larger of
//!
//!   |E_cur[dom_cur] - E_prev[dom_prev]|   (dominant level change)
//!   |E_cur[dom_cur] - E_prev[dom_cur]|    (rise of the incoming band)
//!
//! so a clean swap between two saturated bands still registers.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use drift_types::vecmath::{mean, population_variance};
use drift_types::{
    BandEnergies, DriftConfig, DriftError, DriftResult, FeatureSample, RegimeObservation,
    RegimeTransition,
};

/// Regime detector configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegimeConfig {
    pub capacity: usize,
    pub transition_threshold: f64,
    pub trend_window: usize,
}

impl Default for RegimeConfig {
    fn default() -> Self {
        Self::from(&DriftConfig::default())
    }
}

impl From<&DriftConfig> for RegimeConfig {
    fn from(cfg: &DriftConfig) -> Self {
        Self {
            capacity: cfg.regime_log_capacity,
            transition_threshold: cfg.transition_threshold,
            trend_window: cfg.trend_window,
        }
    }
}

/// Serialised regime log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegimeSessionExport {
    pub observations: Vec<RegimeObservation>,
    pub transitions: Vec<RegimeTransition>,
    /// Span between the oldest and newest retained observation (ms).
    pub session_duration_ms: u64,
}

impl RegimeSessionExport {
    pub fn from_json(json: &str) -> DriftResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Inverse-variance coherence score in [0, 1].
pub fn coherence_score(energies: &BandEnergies) -> f64 {
    let score = 1.0 / (1.0 + population_variance(&energies.values()));
    drift_types::clamp_unit(score)
}

/// Energy jump between two observations whose dominant bands differ.
pub fn handover_delta(previous: &BandEnergies, current: &BandEnergies) -> f64 {
    let incoming = current.dominant();
    let level = current.get(incoming) - previous.get(previous.dominant());
    let rise = current.get(incoming) - previous.get(incoming);
    level.abs().max(rise.abs())
}

/// Regime transition detector.
pub struct RegimeDetector {
    cfg: RegimeConfig,
    observations: VecDeque<RegimeObservation>,
    transitions: Vec<RegimeTransition>,
}

impl RegimeDetector {
    pub fn new(config: RegimeConfig) -> Self {
        Self {
            observations: VecDeque::with_capacity(config.capacity),
            cfg: config,
            transitions: Vec::new(),
        }
    }

    pub fn from_config(config: &DriftConfig) -> Self {
        Self::new(RegimeConfig::from(config))
    }

    pub fn default_params() -> Self {
        Self::new(RegimeConfig::default())
    }

    /// Record one observation and detect a regime transition.
    ///
    /// Rejects out-of-range inputs and timestamps earlier than the latest
    /// logged observation; nothing is logged on error.
    pub fn log_observation(
        &mut self,
        features: FeatureSample,
        band_energies: BandEnergies,
        timestamp: u64,
    ) -> DriftResult<RegimeObservation> {
        features.validate()?;
        band_energies.validate()?;

        let dominant_band = band_energies.dominant();
        let mut observation = RegimeObservation {
            timestamp,
            features,
            band_energies,
            coherence_score: coherence_score(&band_energies),
            is_transition: false,
            dominant_band,
        };

        if let Some(previous) = self.observations.back() {
            if timestamp < previous.timestamp {
                return Err(DriftError::NonMonotonicTimestamp {
                    previous: previous.timestamp,
                    current: timestamp,
                });
            }
            if previous.dominant_band != dominant_band {
                let energy_delta = handover_delta(&previous.band_energies, &band_energies);
                if energy_delta > self.cfg.transition_threshold {
                    let transition = RegimeTransition {
                        from: previous.dominant_band,
                        to: dominant_band,
                        timestamp,
                        confidence: energy_delta.min(1.0),
                        duration_since_previous: timestamp - previous.timestamp,
                    };
                    log::info!(
                        "regime transition {} -> {} at {}ms (confidence {:.3})",
                        transition.from,
                        transition.to,
                        timestamp,
                        transition.confidence
                    );
                    observation.is_transition = true;
                    self.transitions.push(transition);
                }
            }
        }

        self.observations.push_back(observation.clone());
        if self.observations.len() > self.cfg.capacity {
            self.observations.pop_front();
        }

        Ok(observation)
    }

    /// Second-half mean minus first-half mean of the last `window_size`
    /// coherence scores. Positive means coherence is improving.
    ///
    /// Returns 0.0 until `window_size` observations exist.
    pub fn coherence_trend(&self, window_size: usize) -> f64 {
        if window_size < 2 || self.observations.len() < window_size {
            return 0.0;
        }
        let scores: Vec<f64> = self
            .observations
            .iter()
            .skip(self.observations.len() - window_size)
            .map(|o| o.coherence_score)
            .collect();
        let (first, second) = scores.split_at(window_size / 2);
        mean(second) - mean(first)
    }

    /// `coherence_trend` over the configured default window.
    pub fn default_trend(&self) -> f64 {
        self.coherence_trend(self.cfg.trend_window)
    }

    /// Up to `count` most recent observations, oldest first.
    pub fn recent_observations(&self, count: usize) -> Vec<RegimeObservation> {
        let skip = self.observations.len().saturating_sub(count);
        self.observations.iter().skip(skip).cloned().collect()
    }

    pub fn current(&self) -> Option<RegimeObservation> {
        self.observations.back().cloned()
    }

    pub fn observation_count(&self) -> usize {
        self.observations.len()
    }

    pub fn transitions(&self) -> Vec<RegimeTransition> {
        self.transitions.clone()
    }

    /// Keep only the newest `keep` transitions.
    pub fn truncate_transitions(&mut self, keep: usize) {
        if self.transitions.len() > keep {
            let start = self.transitions.len() - keep;
            self.transitions.drain(..start);
        }
    }

    pub fn clear(&mut self) {
        self.observations.clear();
        self.transitions.clear();
    }

    pub fn session_export(&self) -> RegimeSessionExport {
        let session_duration_ms = match (self.observations.front(), self.observations.back()) {
            (Some(first), Some(last)) => last.timestamp - first.timestamp,
            _ => 0,
        };
        RegimeSessionExport {
            observations: self.observations.iter().cloned().collect(),
            transitions: self.transitions.clone(),
            session_duration_ms,
        }
    }

    /// Serialise observations, transitions, and session span to JSON.
    pub fn export_session(&self) -> DriftResult<String> {
        Ok(serde_json::to_string(&self.session_export())?)
    }
}
