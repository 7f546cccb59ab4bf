// ─────────────────────────────────────────────────────────────────────
// Phase-Drift Kernel — Coherence Collapse Detector
// ─────────────────────────────────────────────────────────────────────
//! Nominal/Collapsed state machine over the coherence radius.
//!
//! An episode opens on the first vector whose coherence radius drops
//! below threshold and closes on the first vector back at or above it.
//! When it closes, the trailing coherence radii are classified:
//!
//!   - any local peak or valley      → oscillatory
//!   - monotonically non-decreasing  → exponential
//!   - otherwise                     → discontinuous
//!
//! At most one episode is open at any instant. Episodes whose onset
//! falls outside the retention window are dropped on every call.

use serde::{Deserialize, Serialize};

use drift_types::{
    CollapseEpisode, CollapseState, DriftConfig, RecoveryPattern, StateVector3D,
};

/// Collapse detector configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollapseConfig {
    pub threshold: f64,
    pub suppression_ms: u64,
    pub retention_ms: u64,
    pub prune_open: bool,
    pub recovery_window: usize,
}

impl Default for CollapseConfig {
    fn default() -> Self {
        Self::from(&DriftConfig::default())
    }
}

impl From<&DriftConfig> for CollapseConfig {
    fn from(cfg: &DriftConfig) -> Self {
        Self {
            threshold: cfg.coherence_threshold,
            suppression_ms: cfg.collapse_suppression_ms,
            retention_ms: cfg.collapse_retention_ms,
            prune_open: cfg.prune_open_episodes,
            recovery_window: cfg.recovery_window,
        }
    }
}

/// What a single `detect` call changed.
#[derive(Debug, Clone, PartialEq)]
pub enum CollapseSignal {
    /// No state change.
    Steady,
    /// A new episode opened.
    Opened(CollapseEpisode),
    /// The open episode closed.
    Recovered(CollapseEpisode),
}

/// Classify the shape of a recovery from a coherence sequence.
pub fn classify_recovery(values: &[f64]) -> RecoveryPattern {
    let oscillating = values.windows(3).any(|w| {
        (w[1] > w[0] && w[1] > w[2]) || (w[1] < w[0] && w[1] < w[2])
    });
    if oscillating {
        return RecoveryPattern::Oscillatory;
    }
    if values.windows(2).all(|w| w[1] >= w[0]) {
        RecoveryPattern::Exponential
    } else {
        RecoveryPattern::Discontinuous
    }
}

/// Coherence collapse detector.
pub struct CollapseDetector {
    cfg: CollapseConfig,
    episodes: Vec<CollapseEpisode>,
}

impl CollapseDetector {
    pub fn new(config: CollapseConfig) -> Self {
        Self {
            cfg: config,
            episodes: Vec::new(),
        }
    }

    pub fn from_config(config: &DriftConfig) -> Self {
        Self::new(CollapseConfig::from(config))
    }

    pub fn default_params() -> Self {
        Self::new(CollapseConfig::default())
    }

    /// Advance the state machine with the newest vector.
    ///
    /// `trajectory` is the history including `current`; only its last
    /// `recovery_window` points are read, and only on recovery.
    pub fn detect(
        &mut self,
        current: &StateVector3D,
        trajectory: &[StateVector3D],
    ) -> CollapseSignal {
        let now = current.timestamp;
        let open = self.open_index();

        let signal = if current.coherence_radius < self.cfg.threshold {
            match open {
                Some(i) if now.saturating_sub(self.episodes[i].onset) < self.cfg.suppression_ms => {
                    CollapseSignal::Steady
                }
                Some(i) => {
                    // Still collapsed past the suppression window: retire the
                    // stale episode so a fresh one can take its place.
                    let stale = &mut self.episodes[i];
                    stale.duration = now.saturating_sub(stale.onset).max(1);
                    stale.recovery_pattern = RecoveryPattern::Discontinuous;
                    log::debug!(
                        "collapse episode at {}ms superseded after {}ms",
                        stale.onset,
                        stale.duration
                    );
                    CollapseSignal::Opened(self.open_episode_at(current))
                }
                None => CollapseSignal::Opened(self.open_episode_at(current)),
            }
        } else if let Some(i) = open {
            let start = trajectory.len().saturating_sub(self.cfg.recovery_window);
            let radii: Vec<f64> = trajectory[start..]
                .iter()
                .map(|v| v.coherence_radius)
                .collect();
            let episode = &mut self.episodes[i];
            // A zero duration would read as still open.
            episode.duration = now.saturating_sub(episode.onset).max(1);
            episode.recovery_pattern = classify_recovery(&radii);
            log::info!(
                "coherence recovered after {}ms ({:?})",
                episode.duration,
                episode.recovery_pattern
            );
            CollapseSignal::Recovered(episode.clone())
        } else {
            CollapseSignal::Steady
        };

        self.prune(now);
        signal
    }

    fn open_episode_at(&mut self, current: &StateVector3D) -> CollapseEpisode {
        let episode = CollapseEpisode {
            onset: current.timestamp,
            duration: 0,
            magnitude: (self.cfg.threshold - current.coherence_radius).max(0.0),
            recovery_pattern: RecoveryPattern::Exponential,
            trigger_state: *current,
        };
        log::warn!(
            "coherence collapse at {}ms: radius {:.4} < {}",
            current.timestamp,
            current.coherence_radius,
            self.cfg.threshold
        );
        self.episodes.push(episode.clone());
        episode
    }

    fn prune(&mut self, now: u64) {
        let retention = self.cfg.retention_ms;
        let prune_open = self.cfg.prune_open;
        self.episodes.retain(|e| {
            now.saturating_sub(e.onset) < retention || (!prune_open && e.is_open())
        });
    }

    fn open_index(&self) -> Option<usize> {
        self.episodes.iter().position(CollapseEpisode::is_open)
    }

    pub fn state(&self) -> CollapseState {
        if self.open_index().is_some() {
            CollapseState::Collapsed
        } else {
            CollapseState::Nominal
        }
    }

    pub fn open_episode(&self) -> Option<CollapseEpisode> {
        self.open_index().map(|i| self.episodes[i].clone())
    }

    /// Snapshot of every retained episode, oldest first.
    pub fn episodes(&self) -> Vec<CollapseEpisode> {
        self.episodes.clone()
    }

    /// Episodes with onset inside `[now - window_ms, now]`.
    pub fn recent_collapses(&self, now: u64, window_ms: u64) -> Vec<CollapseEpisode> {
        let cutoff = now.saturating_sub(window_ms);
        self.episodes
            .iter()
            .filter(|e| e.onset >= cutoff)
            .cloned()
            .collect()
    }

    pub fn clear(&mut self) {
        self.episodes.clear();
    }
}
