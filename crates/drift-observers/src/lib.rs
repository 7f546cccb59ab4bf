// ─────────────────────────────────────────────────────────────────────
// Phase-Drift Kernel — Observers
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Event observers over the observation stream.
//!
//! - Collapse: Nominal/Collapsed state machine on the coherence radius
//! - Regime: dominant-band log with threshold-gated transitions

pub mod collapse;
pub mod regime;

pub use collapse::{classify_recovery, CollapseConfig, CollapseDetector, CollapseSignal};
pub use regime::{
    coherence_score, handover_delta, RegimeConfig, RegimeDetector, RegimeSessionExport,
};
