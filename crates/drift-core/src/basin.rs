// ─────────────────────────────────────────────────────────────────────
// Phase-Drift Kernel — Attractor Basin Manager
// ─────────────────────────────────────────────────────────────────────
//! Maintains the set of attractor basins the trajectory keeps returning
//! to.
//!
//! Update cycle (once the trajectory holds `cluster_window` points):
//!   1. Take the last `cluster_window` points.
//!   2. Spatially hash them into cubic cells of edge `grid_cell_size`.
//!   3. Cells with ≥ `min_cell_points` members become clusters
//!      (centroid, max member distance, member count).
//!   4. A cluster within `basin_merge_distance` of its nearest basin
//!      pulls that basin's center toward it and strengthens it; a
//!      sufficiently dense unmatched cluster spawns a spiral basin.
//!   5. Keep the `max_basins` strongest basins.
//!
//! The grid is walked in cell-key order so identical input always yields
//! identical basins (given a fixed RNG seed).

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use drift_types::vecmath::{centroid, distance, interpolate};
use drift_types::{AttractorBasin, BasinKind, DriftConfig, StateVector3D};

/// Smallest radius given to a spawned basin; a cluster whose members all
/// coincide would otherwise have zero extent.
pub const MIN_BASIN_RADIUS: f64 = 1e-3;

/// Basin manager configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasinConfig {
    pub cluster_window: usize,
    pub grid_cell_size: f64,
    pub min_cell_points: usize,
    pub merge_distance: f64,
    pub drift_factor: f64,
    pub strength_step: f64,
    pub min_new_density: usize,
    pub max_basins: usize,
    pub min_resonant_hz: f64,
    pub max_resonant_hz: f64,
    pub seed: Option<u64>,
}

impl Default for BasinConfig {
    fn default() -> Self {
        Self::from(&DriftConfig::default())
    }
}

impl From<&DriftConfig> for BasinConfig {
    fn from(cfg: &DriftConfig) -> Self {
        Self {
            cluster_window: cfg.cluster_window,
            grid_cell_size: cfg.grid_cell_size,
            min_cell_points: cfg.min_cell_points,
            merge_distance: cfg.basin_merge_distance,
            drift_factor: cfg.basin_drift_factor,
            strength_step: cfg.basin_strength_step,
            min_new_density: cfg.min_new_basin_density,
            max_basins: cfg.max_basins,
            min_resonant_hz: cfg.min_resonant_hz,
            max_resonant_hz: cfg.max_resonant_hz,
            seed: cfg.basin_seed,
        }
    }
}

/// A dense grid cell of recent trajectory points.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityCluster {
    pub center: StateVector3D,
    /// Max distance from the centroid to any member.
    pub radius: f64,
    /// Member count.
    pub density: usize,
}

/// Counts from a single `update` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BasinUpdate {
    pub clusters: usize,
    pub refined: usize,
    pub created: usize,
    pub pruned: usize,
}

fn cell_key(v: &StateVector3D, cell: f64) -> (i64, i64, i64) {
    (
        (v.x / cell).floor() as i64,
        (v.y / cell).floor() as i64,
        (v.z / cell).floor() as i64,
    )
}

/// Grid-hash `vectors` and return every cell with at least `min_points`
/// members, in cell-key order.
pub fn find_density_clusters(
    vectors: &[StateVector3D],
    cell_size: f64,
    min_points: usize,
) -> Vec<DensityCluster> {
    let mut grid: BTreeMap<(i64, i64, i64), Vec<StateVector3D>> = BTreeMap::new();
    for v in vectors {
        grid.entry(cell_key(v, cell_size)).or_default().push(*v);
    }

    grid.into_values()
        .filter(|members| members.len() >= min_points.max(1))
        .filter_map(|members| {
            let center = centroid(&members)?;
            let radius = members
                .iter()
                .map(|v| distance(&center, v))
                .fold(0.0, f64::max);
            Some(DensityCluster {
                center,
                radius,
                density: members.len(),
            })
        })
        .collect()
}

/// The four archetypal basins every session starts from.
pub fn seed_basins() -> Vec<AttractorBasin> {
    let seed = |x, y, z, coherence, radius, strength, kind, hz| AttractorBasin {
        center: StateVector3D::at(x, y, z).with_coherence(coherence),
        radius,
        strength,
        kind,
        resonant_frequency: hz,
    };
    vec![
        seed(0.8, 0.7, 0.9, 0.2, 0.25, 0.8, BasinKind::Stable, 10.5),
        seed(0.3, 0.2, 0.1, 0.4, 0.35, 0.6, BasinKind::Stable, 2.5),
        seed(0.9, 0.8, 0.95, 0.1, 0.15, 0.9, BasinKind::Unstable, 40.0),
        seed(0.5, 0.5, 0.5, 0.3, 0.4, 0.4, BasinKind::Chaotic, 6.5),
    ]
}

/// Owner of the basin set.
#[derive(Debug)]
pub struct AttractorBasinManager {
    cfg: BasinConfig,
    basins: Vec<AttractorBasin>,
    rng: StdRng,
}

impl AttractorBasinManager {
    /// Create a manager already seeded with the archetypal basins.
    pub fn new(config: BasinConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut manager = Self {
            cfg: config,
            basins: Vec::new(),
            rng,
        };
        manager.initialize();
        manager
    }

    pub fn from_config(config: &DriftConfig) -> Self {
        Self::new(BasinConfig::from(config))
    }

    pub fn default_params() -> Self {
        Self::new(BasinConfig::default())
    }

    /// Discard learned basins and restore the archetypal seed set.
    pub fn initialize(&mut self) {
        self.basins = seed_basins();
        self.basins.truncate(self.cfg.max_basins);
    }

    /// Re-cluster the tail of `trajectory` and fold it into the basin set.
    ///
    /// No-op until the trajectory holds `cluster_window` points.
    pub fn update(&mut self, trajectory: &[StateVector3D]) -> BasinUpdate {
        let mut summary = BasinUpdate::default();
        if trajectory.len() < self.cfg.cluster_window {
            return summary;
        }

        let window = &trajectory[trajectory.len() - self.cfg.cluster_window..];
        let clusters =
            find_density_clusters(window, self.cfg.grid_cell_size, self.cfg.min_cell_points);
        summary.clusters = clusters.len();

        for cluster in &clusters {
            match self.nearest_index(&cluster.center) {
                Some((i, d)) if d < self.cfg.merge_distance => {
                    let basin = &mut self.basins[i];
                    basin.center = interpolate(&basin.center, &cluster.center, self.cfg.drift_factor);
                    basin.strength = (basin.strength + self.cfg.strength_step).min(1.0);
                    summary.refined += 1;
                }
                _ if cluster.density > self.cfg.min_new_density => {
                    let basin = AttractorBasin {
                        center: cluster.center,
                        radius: cluster.radius.max(MIN_BASIN_RADIUS),
                        strength: (cluster.density as f64 / 20.0).min(0.8),
                        kind: BasinKind::Spiral,
                        resonant_frequency: self.draw_resonant_hz(),
                    };
                    log::debug!(
                        "new spiral basin at ({:.3}, {:.3}, {:.3}) strength {:.2}",
                        basin.center.x,
                        basin.center.y,
                        basin.center.z,
                        basin.strength
                    );
                    self.basins.push(basin);
                    summary.created += 1;
                }
                _ => {}
            }
        }

        if self.basins.len() > self.cfg.max_basins {
            self.basins.sort_by(|a, b| b.strength.total_cmp(&a.strength));
            summary.pruned = self.basins.len() - self.cfg.max_basins;
            self.basins.truncate(self.cfg.max_basins);
            log::debug!("pruned {} weakest basins", summary.pruned);
        }

        summary
    }

    fn draw_resonant_hz(&mut self) -> f64 {
        let (lo, hi) = (self.cfg.min_resonant_hz, self.cfg.max_resonant_hz);
        if lo < hi {
            self.rng.gen_range(lo..hi)
        } else {
            lo
        }
    }

    fn nearest_index(&self, v: &StateVector3D) -> Option<(usize, f64)> {
        self.basins
            .iter()
            .enumerate()
            .map(|(i, b)| (i, distance(&b.center, v)))
            .fold(None, |best, (i, d)| match best {
                Some((_, bd)) if bd <= d => best,
                _ => Some((i, d)),
            })
    }

    /// Closest basin to `v` by Euclidean distance.
    pub fn nearest(&self, v: &StateVector3D) -> Option<AttractorBasin> {
        self.nearest_index(v).map(|(i, _)| self.basins[i].clone())
    }

    pub fn basins(&self) -> Vec<AttractorBasin> {
        self.basins.clone()
    }

    pub fn len(&self) -> usize {
        self.basins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.basins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> AttractorBasinManager {
        AttractorBasinManager::new(BasinConfig {
            seed: Some(42),
            ..BasinConfig::default()
        })
    }

    /// 50 points within 0.05 of `(cx, cy, cz)`, symmetric about it.
    fn cloud(cx: f64, cy: f64, cz: f64, start_ts: u64) -> Vec<StateVector3D> {
        let offsets = [-0.04, -0.02, 0.0, 0.02, 0.04];
        (0..50)
            .map(|i| {
                let dx = offsets[i % 5];
                let dy = offsets[(i / 5) % 5];
                let dz = if i % 2 == 0 { 0.01 } else { -0.01 };
                StateVector3D::at(cx + dx * 0.5, cy + dy * 0.5, cz + dz)
                    .with_timestamp(start_ts + i as u64 * 100)
                    .with_coherence(0.5)
            })
            .collect()
    }

    #[test]
    fn test_seed_basins() {
        let m = seeded();
        let basins = m.basins();
        assert_eq!(basins.len(), 4);
        assert_eq!(basins[2].kind, BasinKind::Unstable);
        assert_eq!(basins[3].kind, BasinKind::Chaotic);
        assert!((basins[0].resonant_frequency - 10.5).abs() < 1e-12);
        assert!(basins.iter().all(|b| b.radius > 0.0));
    }

    #[test]
    fn test_update_noop_below_window() {
        let mut m = seeded();
        let pts = cloud(0.1, 0.9, 0.1, 0);
        let summary = m.update(&pts[..49]);
        assert_eq!(summary, BasinUpdate::default());
        assert_eq!(m.basins(), seed_basins());
    }

    #[test]
    fn test_find_density_clusters_threshold() {
        let mut pts = vec![StateVector3D::at(0.05, 0.05, 0.05); 3];
        pts.extend(vec![StateVector3D::at(0.65, 0.65, 0.65); 2]);
        let clusters = find_density_clusters(&pts, 0.2, 3);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].density, 3);
        assert!(clusters[0].radius.abs() < 1e-12);
    }

    #[test]
    fn test_find_density_clusters_radius() {
        let pts = [
            StateVector3D::at(0.0, 0.1, 0.1),
            StateVector3D::at(0.1, 0.1, 0.1),
            StateVector3D::at(0.05, 0.1, 0.1),
        ];
        let clusters = find_density_clusters(&pts, 0.2, 3);
        assert_eq!(clusters.len(), 1);
        assert!((clusters[0].center.x - 0.05).abs() < 1e-12);
        assert!((clusters[0].radius - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_find_density_clusters_ordered_by_cell() {
        let mut pts = vec![StateVector3D::at(0.9, 0.9, 0.9); 3];
        pts.extend(vec![StateVector3D::at(0.1, 0.1, 0.1); 4]);
        let clusters = find_density_clusters(&pts, 0.2, 3);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].density, 4);
        assert_eq!(clusters[1].density, 3);
    }

    #[test]
    fn test_distant_cluster_creates_spiral_basin() {
        let mut m = seeded();
        let summary = m.update(&cloud(0.1, 0.9, 0.1, 0));
        assert_eq!(summary.clusters, 1);
        assert_eq!(summary.created, 1);
        let basins = m.basins();
        assert_eq!(basins.len(), 5);
        let new = &basins[4];
        assert_eq!(new.kind, BasinKind::Spiral);
        assert!((new.strength - 0.8).abs() < 1e-12);
        assert!((8.0..40.0).contains(&new.resonant_frequency));
        assert!((new.center.x - 0.1).abs() < 1e-9);
        assert!((new.center.y - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_nearby_cluster_refines_basin() {
        let mut m = seeded();
        let summary = m.update(&cloud(0.1, 0.1, 0.1, 0));
        assert_eq!(summary.refined, 1);
        assert_eq!(summary.created, 0);
        let delta = &m.basins()[1];
        // Seed (0.3, 0.2, 0.1) moved 10% toward (0.1, 0.1, 0.1).
        assert!((delta.center.x - 0.28).abs() < 1e-9);
        assert!((delta.center.y - 0.19).abs() < 1e-9);
        assert!((delta.strength - 0.61).abs() < 1e-9);
    }

    #[test]
    fn test_repeated_updates_converge() {
        let mut m = seeded();
        let pts = cloud(0.1, 0.1, 0.1, 0);
        for _ in 0..40 {
            m.update(&pts);
        }
        let target = StateVector3D::at(0.1, 0.1, 0.1);
        let nearest = m.nearest(&target).unwrap();
        assert!(
            distance(&nearest.center, &target) < 0.05,
            "basin center {:?} did not converge",
            nearest.center
        );
        assert!(nearest.strength <= 1.0);
    }

    #[test]
    fn test_strength_capped_at_one() {
        let mut m = seeded();
        let pts = cloud(0.8, 0.7, 0.9, 0);
        for _ in 0..100 {
            m.update(&pts);
        }
        assert!(m.basins().iter().all(|b| b.strength <= 1.0));
    }

    #[test]
    fn test_basin_cap_enforced() {
        let mut m = seeded();
        let spots = [
            (0.1, 0.9, 0.1),
            (0.9, 0.1, 0.1),
            (0.1, 0.1, 0.9),
            (0.9, 0.1, 0.9),
            (0.1, 0.9, 0.9),
            (0.5, 0.9, 0.1),
            (0.9, 0.5, 0.1),
            (0.1, 0.5, 0.9),
            (0.5, 0.1, 0.9),
            (0.9, 0.9, 0.1),
        ];
        let mut ts = 0;
        for (x, y, z) in spots {
            m.update(&cloud(x, y, z, ts));
            ts += 5000;
            assert!(m.len() <= 8, "basin count {} exceeds cap", m.len());
        }
        assert_eq!(m.len(), 8);
        // Pruning keeps the strongest; the weak chaotic seed goes first.
        assert!(m.basins().iter().all(|b| b.kind != BasinKind::Chaotic));
    }

    #[test]
    fn test_initialize_resets() {
        let mut m = seeded();
        m.update(&cloud(0.1, 0.9, 0.1, 0));
        assert_eq!(m.len(), 5);
        m.initialize();
        assert_eq!(m.basins(), seed_basins());
    }

    #[test]
    fn test_nearest() {
        let m = seeded();
        let b = m.nearest(&StateVector3D::at(0.5, 0.45, 0.5)).unwrap();
        assert_eq!(b.kind, BasinKind::Chaotic);
    }

    #[test]
    fn test_seeded_rng_reproducible() {
        let mut a = seeded();
        let mut b = seeded();
        let pts = cloud(0.1, 0.9, 0.1, 0);
        a.update(&pts);
        b.update(&pts);
        assert_eq!(a.basins(), b.basins());
    }
}
