//! # Tranche Risk
//!
//! Yield and loss allocation across the 100-segment risk scale.
//!
//! This crate provides:
//! - The coverage-level yield waterfall (bottom-up payment of expected yield)
//! - Two loss subordination policies: per-segment proportional and tier waterfall
//! - Stress scenarios for a single position and parallel batches of positions
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              tranche_risk               │
//! ├─────────────────────────────────────────┤
//! │  waterfall/  - YieldWaterfall,          │
//! │                CoverageLevel            │
//! │  loss/       - ProportionalLoss,        │
//! │                TierLossWaterfall        │
//! │  scenarios/  - StressRunner, presets,   │
//! │                BatchStressRunner        │
//! └─────────────────────────────────────────┘
//!          ↓
//! ┌─────────────────────────────────────────┐
//! │              tranche_core               │
//! │  Segments, config, rate curve, ranges   │
//! └─────────────────────────────────────────┘
//! ```
//!
//! Every component is immutable after construction and can be shared across
//! threads by reference.
//!
//! ## Example
//!
//! ```
//! use tranche_core::EngineConfig;
//! use tranche_risk::scenarios::StressRunner;
//!
//! let runner = StressRunner::new(&EngineConfig::default()).unwrap();
//! let report = runner.stress_scenarios(10_000.0, (30, 59), 1_000_000.0).unwrap();
//!
//! // Junior positions are untouched until equity is exhausted
//! assert_eq!(report.get("5%").unwrap().dollar_loss, 0.0);
//! assert!((report.get("20%").unwrap().dollar_loss - 4_000.0).abs() < 1e-6);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod loss;
pub mod scenarios;
pub mod waterfall;

pub use loss::{
    ProportionalLossDistributor, SegmentLossDistribution, TierAbsorption, TierBook,
    TierLossDistribution, TierLossWaterfall,
};
pub use scenarios::{BatchStressRunner, StressOutcome, StressReport, StressRunner, StressSeverity};
pub use waterfall::{CoverageLevel, SegmentDistribution, YieldDistribution, YieldWaterfall};
