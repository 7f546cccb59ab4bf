// ─────────────────────────────────────────────────────────────────────
// Phase-Drift Kernel — Core Engine
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Phase-space model of a live session: observations become 3-D state
//! vectors, the trajectory is clustered into attractor basins, and the
//! basin set is rasterised into an exportable scalar field.
//!
//! # Invariants
//!
//! 1. **Bounded memory**: the trajectory, regime log, collapse list, and
//!    basin set each have a configured upper bound that no sequence of
//!    calls can exceed.
//!
//! 2. **At most one open collapse**: an episode still open past the
//!    suppression window is closed as `Discontinuous` before a new one
//!    opens.
//!
//! 3. **Rejected input changes nothing**: out-of-range features, energies,
//!    or a backwards timestamp return an error before any buffer is
//!    touched.

pub mod basin;
pub mod field;
pub mod mapper;
pub mod tracker;
pub mod trajectory;

pub use basin::{
    find_density_clusters, seed_basins, AttractorBasinManager, BasinConfig, BasinUpdate,
    DensityCluster,
};
pub use field::{PhaseField, SessionExport};
pub use mapper::VectorMapper;
pub use tracker::{IngestReport, SessionTracker};
pub use trajectory::TrajectoryStore;
