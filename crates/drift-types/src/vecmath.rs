// ─────────────────────────────────────────────────────────────────────
// Phase-Drift Kernel — Vector Math
// ─────────────────────────────────────────────────────────────────────
//! Pure geometry helpers shared by every component.

use crate::state::StateVector3D;

/// Arithmetic mean; 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance (divides by N); 0.0 for an empty slice.
pub fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|&v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

/// Euclidean distance over (x, y, z).
#[inline]
pub fn distance(a: &StateVector3D, b: &StateVector3D) -> f64 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2) + (a.z - b.z).powi(2)).sqrt()
}

/// Componentwise mean of coordinates and coherence.
///
/// Takes the latest timestamp and zero velocity. Returns `None` for an
/// empty slice.
pub fn centroid(vectors: &[StateVector3D]) -> Option<StateVector3D> {
    if vectors.is_empty() {
        return None;
    }
    let n = vectors.len() as f64;
    let (mut sx, mut sy, mut sz, mut sc) = (0.0, 0.0, 0.0, 0.0);
    let mut ts = 0u64;
    for v in vectors {
        sx += v.x;
        sy += v.y;
        sz += v.z;
        sc += v.coherence_radius;
        ts = ts.max(v.timestamp);
    }
    Some(StateVector3D {
        x: sx / n,
        y: sy / n,
        z: sz / n,
        timestamp: ts,
        coherence_radius: sc / n,
        phase_velocity: [0.0; 3],
    })
}

/// Move `from` a fraction `factor` of the way toward `to`.
///
/// Coordinates and coherence are interpolated linearly; the result takes
/// the later timestamp and zero velocity.
pub fn interpolate(from: &StateVector3D, to: &StateVector3D, factor: f64) -> StateVector3D {
    StateVector3D {
        x: from.x + (to.x - from.x) * factor,
        y: from.y + (to.y - from.y) * factor,
        z: from.z + (to.z - from.z) * factor,
        timestamp: from.timestamp.max(to.timestamp),
        coherence_radius: from.coherence_radius
            + (to.coherence_radius - from.coherence_radius) * factor,
        phase_velocity: [0.0; 3],
    }
}
