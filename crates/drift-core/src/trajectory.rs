// ─────────────────────────────────────────────────────────────────────
// Phase-Drift Kernel — Trajectory Store
// ─────────────────────────────────────────────────────────────────────
//! Bounded FIFO history of state vectors, most recent last.
//!
//! `push` is the only mutator besides `clear`. Every read returns an
//! owned snapshot, so later pushes never disturb a caller's copy.

use std::collections::VecDeque;

use drift_types::{DriftConfig, StateVector3D};

/// Ring buffer of `StateVector3D` with oldest-first eviction.
#[derive(Debug, Clone)]
pub struct TrajectoryStore {
    capacity: usize,
    buffer: VecDeque<StateVector3D>,
}

impl TrajectoryStore {
    /// Create a store holding at most `capacity` vectors (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            buffer: VecDeque::with_capacity(capacity),
        }
    }

    pub fn from_config(config: &DriftConfig) -> Self {
        Self::new(config.max_history_length)
    }

    pub fn push(&mut self, vector: StateVector3D) {
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(vector);
    }

    /// Up to `n` most recent vectors, oldest first.
    pub fn recent(&self, n: usize) -> Vec<StateVector3D> {
        let skip = self.buffer.len().saturating_sub(n);
        self.buffer.iter().skip(skip).copied().collect()
    }

    pub fn all(&self) -> Vec<StateVector3D> {
        self.buffer.iter().copied().collect()
    }

    pub fn last(&self) -> Option<StateVector3D> {
        self.buffer.back().copied()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for TrajectoryStore {
    fn default() -> Self {
        Self::from_config(&DriftConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(ts: u64) -> StateVector3D {
        StateVector3D::at(0.1, 0.2, 0.3).with_timestamp(ts)
    }

    #[test]
    fn test_default_capacity() {
        assert_eq!(TrajectoryStore::default().capacity(), 2000);
    }

    #[test]
    fn test_push_and_recent_order() {
        let mut store = TrajectoryStore::new(10);
        for ts in 0..5 {
            store.push(point(ts));
        }
        let recent = store.recent(3);
        let stamps: Vec<u64> = recent.iter().map(|v| v.timestamp).collect();
        assert_eq!(stamps, vec![2, 3, 4]);
    }

    #[test]
    fn test_recent_more_than_len() {
        let mut store = TrajectoryStore::new(10);
        store.push(point(1));
        assert_eq!(store.recent(50).len(), 1);
        assert!(TrajectoryStore::new(10).recent(5).is_empty());
    }

    #[test]
    fn test_capacity_never_exceeded() {
        let mut store = TrajectoryStore::new(100);
        for ts in 0..1000 {
            store.push(point(ts));
            assert!(store.len() <= 100);
            assert_eq!(store.recent(1)[0].timestamp, ts);
        }
        assert_eq!(store.all()[0].timestamp, 900);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut store = TrajectoryStore::new(3);
        store.push(point(1));
        let snap = store.all();
        store.push(point(2));
        store.push(point(3));
        store.push(point(4));
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].timestamp, 1);
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let mut store = TrajectoryStore::new(0);
        store.push(point(1));
        store.push(point(2));
        assert_eq!(store.len(), 1);
        assert_eq!(store.last().unwrap().timestamp, 2);
    }

    #[test]
    fn test_clear() {
        let mut store = TrajectoryStore::new(4);
        store.push(point(1));
        store.clear();
        assert!(store.is_empty());
        assert!(store.last().is_none());
    }
}
