// ─────────────────────────────────────────────────────────────────────
// Phase-Drift Kernel — Configuration
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use crate::error::{DriftError, DriftResult};

/// Runtime configuration for the Phase-Drift Kernel.
///
/// Every window and threshold used by the components lives here so that
/// drivers can tune them without touching the algorithms. Missing fields
/// in JSON fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    /// Scale applied to band-energy variance in the coherence radius.
    /// Default: 5.0.
    pub variance_gain: f64,

    /// Trajectory ring-buffer capacity.
    /// Default: 2000.
    pub max_history_length: usize,

    /// Number of most recent points clustered on each basin update.
    /// Default: 50.
    pub cluster_window: usize,

    /// Edge length of a spatial-hash cell.
    /// Default: 0.2.
    pub grid_cell_size: f64,

    /// Minimum members for a cell to count as a cluster.
    /// Default: 3.
    pub min_cell_points: usize,

    /// A cluster within this distance of a basin refines it instead of
    /// spawning a new one.
    /// Default: 0.3.
    pub basin_merge_distance: f64,

    /// Fraction of the way a basin center moves toward a matched cluster.
    /// Default: 0.1.
    pub basin_drift_factor: f64,

    /// Strength added to a basin each time a cluster refines it.
    /// Default: 0.01.
    pub basin_strength_step: f64,

    /// A new basin needs strictly more members than this; must stay below
    /// `cluster_window`.
    /// Default: 5.
    pub min_new_basin_density: usize,

    /// Maximum number of retained basins.
    /// Default: 8.
    pub max_basins: usize,

    /// Lower bound of the random resonant frequency of a new basin (Hz).
    /// Default: 8.0.
    pub min_resonant_hz: f64,

    /// Upper bound of the random resonant frequency of a new basin (Hz).
    /// Default: 40.0.
    pub max_resonant_hz: f64,

    /// Seed for the basin RNG; `None` seeds from entropy.
    /// Default: None.
    pub basin_seed: Option<u64>,

    /// Coherence radius below which the trajectory is collapsed.
    /// Default: 0.3.
    pub coherence_threshold: f64,

    /// An open episode younger than this blocks a new one (ms).
    /// Default: 5000.
    pub collapse_suppression_ms: u64,

    /// Episodes whose onset is older than this are dropped (ms).
    /// Default: 60000.
    pub collapse_retention_ms: u64,

    /// Drop open episodes past the retention window too.
    /// Default: true.
    pub prune_open_episodes: bool,

    /// Trailing coherence radii inspected to classify a recovery.
    /// Default: 10.
    pub recovery_window: usize,

    /// Default look-back for recent-collapse queries (ms).
    /// Default: 30000.
    pub recent_collapse_window_ms: u64,

    /// Regime observation log capacity.
    /// Default: 1000.
    pub regime_log_capacity: usize,

    /// Minimum dominant-energy jump for a regime transition.
    /// Default: 0.3.
    pub transition_threshold: f64,

    /// Default window for the coherence trend.
    /// Default: 20.
    pub trend_window: usize,

    /// Samples per axis of the exported phase-space field.
    /// Default: 20.
    pub field_resolution: usize,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            variance_gain: 5.0,
            max_history_length: 2000,
            cluster_window: 50,
            grid_cell_size: 0.2,
            min_cell_points: 3,
            basin_merge_distance: 0.3,
            basin_drift_factor: 0.1,
            basin_strength_step: 0.01,
            min_new_basin_density: 5,
            max_basins: 8,
            min_resonant_hz: 8.0,
            max_resonant_hz: 40.0,
            basin_seed: None,
            coherence_threshold: 0.3,
            collapse_suppression_ms: 5000,
            collapse_retention_ms: 60000,
            prune_open_episodes: true,
            recovery_window: 10,
            recent_collapse_window_ms: 30000,
            regime_log_capacity: 1000,
            transition_threshold: 0.3,
            trend_window: 20,
            field_resolution: 20,
        }
    }
}

impl DriftConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> DriftResult<()> {
        if !(self.variance_gain.is_finite() && self.variance_gain >= 0.0) {
            return Err(DriftError::Config(format!(
                "variance_gain must be finite and >= 0, got {}",
                self.variance_gain
            )));
        }
        if self.max_history_length < 1 {
            return Err(DriftError::Config(format!(
                "max_history_length must be >= 1, got {}",
                self.max_history_length
            )));
        }
        if self.cluster_window < 1 {
            return Err(DriftError::Config(format!(
                "cluster_window must be >= 1, got {}",
                self.cluster_window
            )));
        }
        if !(self.grid_cell_size.is_finite() && self.grid_cell_size > 0.0) {
            return Err(DriftError::Config(format!(
                "grid_cell_size must be > 0, got {}",
                self.grid_cell_size
            )));
        }
        if self.min_cell_points < 1 {
            return Err(DriftError::Config(format!(
                "min_cell_points must be >= 1, got {}",
                self.min_cell_points
            )));
        }
        if !(self.basin_merge_distance.is_finite() && self.basin_merge_distance >= 0.0) {
            return Err(DriftError::Config(format!(
                "basin_merge_distance must be finite and >= 0, got {}",
                self.basin_merge_distance
            )));
        }
        if self.min_new_basin_density >= self.cluster_window {
            return Err(DriftError::Config(format!(
                "min_new_basin_density ({}) must be < cluster_window ({})",
                self.min_new_basin_density, self.cluster_window
            )));
        }
        if !(0.0..=1.0).contains(&self.basin_drift_factor) {
            return Err(DriftError::Config(format!(
                "basin_drift_factor must be in [0, 1], got {}",
                self.basin_drift_factor
            )));
        }
        if self.basin_strength_step < 0.0 {
            return Err(DriftError::Config(format!(
                "basin_strength_step must be >= 0, got {}",
                self.basin_strength_step
            )));
        }
        if self.max_basins < 1 {
            return Err(DriftError::Config(format!(
                "max_basins must be >= 1, got {}",
                self.max_basins
            )));
        }
        if !(self.min_resonant_hz.is_finite()
            && self.max_resonant_hz.is_finite()
            && self.min_resonant_hz < self.max_resonant_hz)
        {
            return Err(DriftError::Config(format!(
                "resonant range must satisfy min < max, got [{}, {}]",
                self.min_resonant_hz, self.max_resonant_hz
            )));
        }
        if !(0.0..=1.0).contains(&self.coherence_threshold) {
            return Err(DriftError::Config(format!(
                "coherence_threshold must be in [0, 1], got {}",
                self.coherence_threshold
            )));
        }
        if self.collapse_suppression_ms == 0
            || self.collapse_suppression_ms > self.collapse_retention_ms
        {
            return Err(DriftError::Config(format!(
                "collapse_suppression_ms must be in [1, collapse_retention_ms], got {}",
                self.collapse_suppression_ms
            )));
        }
        if self.recovery_window < 3 {
            return Err(DriftError::Config(format!(
                "recovery_window must be >= 3, got {}",
                self.recovery_window
            )));
        }
        if self.collapse_retention_ms == 0 {
            return Err(DriftError::Config(
                "collapse_retention_ms must be > 0".to_string(),
            ));
        }
        if self.regime_log_capacity < 1 {
            return Err(DriftError::Config(format!(
                "regime_log_capacity must be >= 1, got {}",
                self.regime_log_capacity
            )));
        }
        if !(0.0..=1.0).contains(&self.transition_threshold) {
            return Err(DriftError::Config(format!(
                "transition_threshold must be in [0, 1], got {}",
                self.transition_threshold
            )));
        }
        if self.trend_window < 2 {
            return Err(DriftError::Config(format!(
                "trend_window must be >= 2, got {}",
                self.trend_window
            )));
        }
        if self.field_resolution < 1 {
            return Err(DriftError::Config(format!(
                "field_resolution must be >= 1, got {}",
                self.field_resolution
            )));
        }
        Ok(())
    }

    /// Load from JSON string.
    pub fn from_json(json: &str) -> DriftResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| DriftError::Config(format!("JSON parse error: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(DriftConfig::default().validate().is_ok());
    }

    #[test]
    fn test_defaults_match_documented_values() {
        let cfg = DriftConfig::default();
        assert_eq!(cfg.max_history_length, 2000);
        assert_eq!(cfg.max_basins, 8);
        assert_eq!(cfg.cluster_window, 50);
        assert_eq!(cfg.collapse_suppression_ms, 5000);
        assert_eq!(cfg.collapse_retention_ms, 60000);
        assert_eq!(cfg.regime_log_capacity, 1000);
        assert_eq!(cfg.field_resolution, 20);
    }

    #[test]
    fn test_rejects_bad_threshold() {
        let cfg = DriftConfig {
            coherence_threshold: 1.5,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(DriftError::Config(_))));
    }

    #[test]
    fn test_rejects_zero_cell_size() {
        let cfg = DriftConfig {
            grid_cell_size: 0.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_inverted_resonant_range() {
        let cfg = DriftConfig {
            min_resonant_hz: 40.0,
            max_resonant_hz: 8.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_short_trend_window() {
        let cfg = DriftConfig {
            trend_window: 1,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_merge_distance() {
        for bad in [f64::NAN, -0.1, f64::INFINITY] {
            let cfg = DriftConfig {
                basin_merge_distance: bad,
                ..Default::default()
            };
            assert!(matches!(cfg.validate(), Err(DriftError::Config(_))), "{bad}");
        }
    }

    #[test]
    fn test_rejects_zero_min_cell_points() {
        let cfg = DriftConfig {
            min_cell_points: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_unreachable_new_basin_density() {
        let cfg = DriftConfig {
            min_new_basin_density: 50,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
        let ok = DriftConfig {
            min_new_basin_density: 49,
            ..Default::default()
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_suppression_window() {
        let zero = DriftConfig {
            collapse_suppression_ms: 0,
            ..Default::default()
        };
        assert!(zero.validate().is_err());
        let longer_than_retention = DriftConfig {
            collapse_suppression_ms: 70_000,
            ..Default::default()
        };
        assert!(longer_than_retention.validate().is_err());
    }

    #[test]
    fn test_rejects_short_recovery_window() {
        let cfg = DriftConfig {
            recovery_window: 2,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_from_json_partial() {
        let cfg = DriftConfig::from_json(r#"{"max_basins": 4, "basin_seed": 7}"#).unwrap();
        assert_eq!(cfg.max_basins, 4);
        assert_eq!(cfg.basin_seed, Some(7));
        assert_eq!(cfg.max_history_length, 2000);
    }

    #[test]
    fn test_from_json_garbage() {
        assert!(matches!(
            DriftConfig::from_json("not json"),
            Err(DriftError::Config(_))
        ));
    }
}
