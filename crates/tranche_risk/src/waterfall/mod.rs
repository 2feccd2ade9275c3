//! Coverage-level yield waterfall.
//!
//! Yield is paid bottom-up: every segment up to the coverage level receives
//! its full expected yield (`liquidity * apy`), the next segment receives the
//! residual, and everything above receives nothing.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │               YieldWaterfall                 │
//! ├──────────────────────────────────────────────┤
//! │  find_coverage_level  - highest paid segment │
//! │  distribute_yield     - per-segment split    │
//! │  SegmentDistribution  - 100 amounts          │
//! └──────────────────────────────────────────────┘
//! ```

mod distribution;
mod engine;

pub use distribution::{CoverageLevel, SegmentDistribution, YieldDistribution};
pub use engine::YieldWaterfall;
