//! # tranche_core: Foundation of the Tiered Risk Distribution Engine
//!
//! ## Layer 1 (Foundation) Role
//!
//! tranche_core is the bottom layer of the engine, providing:
//! - Segment, tier, range and liquidity types (`types`)
//! - The error taxonomy shared by every engine crate (`types::error`)
//! - The versioned engine configuration (`config`)
//! - The four-tier APY curve and range aggregation (`curve`)
//!
//! ## Usage Examples
//!
//! ```rust
//! use tranche_core::config::EngineConfig;
//! use tranche_core::curve::{RangeAggregator, RateCurve};
//!
//! let config = EngineConfig::default();
//! let curve = RateCurve::new(&config).unwrap();
//!
//! // Tier boundaries are continuous
//! let end_of_senior = curve.apy_for_segment(9).unwrap();
//! let start_of_mezzanine = curve.apy_for_segment(10).unwrap();
//! assert!((end_of_senior - start_of_mezzanine).abs() < 1e-9);
//!
//! // Blended yield for a position spanning the junior tier
//! let aggregator = RangeAggregator::new(&config).unwrap();
//! let prediction = aggregator.predicted_yield(25_000.0, (30, 59)).unwrap();
//! assert!(prediction.apy > end_of_senior);
//! ```
//!
//! ## Purity
//!
//! Every operation is a deterministic function of its inputs. Engine types
//! are immutable after construction and are `Send + Sync`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod config;
pub mod curve;
pub mod types;

pub use config::EngineConfig;
pub use curve::{PredictedYield, RangeAggregator, RateCurve};
pub use types::{
    LiquidityProfile, LiquidityTick, Position, RiskRange, Segment, Tier, TierTable, TrancheError,
    TrancheResult,
};
