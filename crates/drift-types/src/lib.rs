// ─────────────────────────────────────────────────────────────────────
// Phase-Drift Kernel — Types
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Type definitions, configuration, error hierarchy, and shared vector
//! math for the Phase-Drift Kernel.

pub mod config;
pub mod error;
pub mod model;
pub mod state;
pub mod vecmath;

pub use config::DriftConfig;
pub use error::{DriftError, DriftResult};
pub use model::{
    AttractorBasin, BasinKind, CollapseEpisode, CollapseState, RecoveryPattern,
    RegimeObservation, RegimeTransition,
};
pub use state::{clamp_unit, Band, BandEnergies, FeatureSample, StateVector3D};
