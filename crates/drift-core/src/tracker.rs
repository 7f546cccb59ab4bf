// ─────────────────────────────────────────────────────────────────────
// Phase-Drift Kernel — Session Tracker
// ─────────────────────────────────────────────────────────────────────
//! One-call ingestion pipeline over all components:
//!
//!   observation → mapper → trajectory → {collapse detector, basins}
//!   observation → regime detector
//!
//! Thread-safe: each component owns its buffer behind its own
//! `parking_lot::Mutex`. `ingest` and `reset` hold the trajectory lock for
//! their whole run, so concurrent writers are serialised and the
//! components never disagree about which observations were accepted.
//! Nested locks are always taken in the order
//! trajectory → regime → collapse → basins. All reads return snapshots.

use parking_lot::Mutex;

use drift_observers::{CollapseDetector, CollapseSignal, RegimeDetector};
use drift_types::{
    AttractorBasin, BandEnergies, CollapseEpisode, CollapseState, DriftConfig, DriftResult,
    FeatureSample, RegimeObservation, RegimeTransition, StateVector3D,
};

use crate::basin::{AttractorBasinManager, BasinUpdate};
use crate::field::{PhaseField, SessionExport};
use crate::mapper::VectorMapper;
use crate::trajectory::TrajectoryStore;

/// Outcome of one `ingest` call.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub vector: StateVector3D,
    pub collapse: CollapseSignal,
    pub basins: BasinUpdate,
    pub regime: RegimeObservation,
}

/// Live phase-space model for one session.
pub struct SessionTracker {
    config: DriftConfig,
    mapper: VectorMapper,
    trajectory: Mutex<TrajectoryStore>,
    basins: Mutex<AttractorBasinManager>,
    collapse: Mutex<CollapseDetector>,
    regime: Mutex<RegimeDetector>,
}

impl SessionTracker {
    /// Build a tracker after validating `config`.
    pub fn new(config: DriftConfig) -> DriftResult<Self> {
        config.validate()?;
        Ok(Self {
            mapper: VectorMapper::from_config(&config),
            trajectory: Mutex::new(TrajectoryStore::from_config(&config)),
            basins: Mutex::new(AttractorBasinManager::from_config(&config)),
            collapse: Mutex::new(CollapseDetector::from_config(&config)),
            regime: Mutex::new(RegimeDetector::from_config(&config)),
            config,
        })
    }

    pub fn config(&self) -> &DriftConfig {
        &self.config
    }

    /// Feed one observation through every component.
    ///
    /// Invalid input is rejected before any state changes.
    pub fn ingest(
        &self,
        features: FeatureSample,
        band_energies: BandEnergies,
        timestamp: u64,
    ) -> DriftResult<IngestReport> {
        let mut store = self.trajectory.lock();
        let previous = store.last();
        let vector = self
            .mapper
            .map(&features, &band_energies, timestamp, previous.as_ref())?;

        // Logged before the push so a rejection leaves every buffer as it was.
        let regime = self
            .regime
            .lock()
            .log_observation(features, band_energies, timestamp)?;

        store.push(vector);
        let depth = self.config.cluster_window.max(self.config.recovery_window);
        let window = store.recent(depth);

        let collapse = self.collapse.lock().detect(&vector, &window);
        let basins = self.basins.lock().update(&window);
        drop(store);

        Ok(IngestReport {
            vector,
            collapse,
            basins,
            regime,
        })
    }

    pub fn trajectory(&self) -> Vec<StateVector3D> {
        self.trajectory.lock().all()
    }

    pub fn recent_trajectory(&self, n: usize) -> Vec<StateVector3D> {
        self.trajectory.lock().recent(n)
    }

    pub fn basins(&self) -> Vec<AttractorBasin> {
        self.basins.lock().basins()
    }

    pub fn nearest_basin(&self, v: &StateVector3D) -> Option<AttractorBasin> {
        self.basins.lock().nearest(v)
    }

    pub fn collapse_state(&self) -> CollapseState {
        self.collapse.lock().state()
    }

    pub fn collapse_episodes(&self) -> Vec<CollapseEpisode> {
        self.collapse.lock().episodes()
    }

    /// Episodes with onset inside the configured look-back before `now`.
    pub fn recent_collapses(&self, now: u64) -> Vec<CollapseEpisode> {
        self.collapse
            .lock()
            .recent_collapses(now, self.config.recent_collapse_window_ms)
    }

    pub fn open_collapse(&self) -> Option<CollapseEpisode> {
        self.collapse.lock().open_episode()
    }

    pub fn transitions(&self) -> Vec<RegimeTransition> {
        self.regime.lock().transitions()
    }

    /// Keep only the newest `keep` regime transitions.
    pub fn truncate_transitions(&self, keep: usize) {
        self.regime.lock().truncate_transitions(keep);
    }

    /// Latest regime observation, if any.
    pub fn current_regime(&self) -> Option<RegimeObservation> {
        self.regime.lock().current()
    }

    pub fn recent_observations(&self, count: usize) -> Vec<RegimeObservation> {
        self.regime.lock().recent_observations(count)
    }

    pub fn coherence_trend(&self, window_size: usize) -> f64 {
        self.regime.lock().coherence_trend(window_size)
    }

    /// Rasterise the current basins at the configured resolution.
    pub fn field(&self) -> DriftResult<PhaseField> {
        PhaseField::generate(&self.basins(), self.config.field_resolution)
    }

    pub fn snapshot(&self, resolution: usize) -> DriftResult<SessionExport> {
        SessionExport::new(
            self.trajectory(),
            self.basins(),
            self.collapse_episodes(),
            resolution,
        )
    }

    /// JSON export of trajectory, basins, collapses, and field.
    pub fn export_session(&self) -> DriftResult<String> {
        self.snapshot(self.config.field_resolution)?.to_json()
    }

    /// JSON export of the regime observation and transition logs.
    pub fn export_regime_session(&self) -> DriftResult<String> {
        self.regime.lock().export_session()
    }

    /// Forget all history and restore the seed basins.
    pub fn reset(&self) {
        let mut store = self.trajectory.lock();
        self.regime.lock().clear();
        self.collapse.lock().clear();
        self.basins.lock().initialize();
        store.clear();
        log::info!("session tracker reset");
    }
}
