//! The tiered APY curve and range aggregation.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │               RangeAggregator                │
//! │  range_apy / predicted_yield                 │
//! ├──────────────────────────────────────────────┤
//! │                  RateCurve                   │
//! │  flat │ linear │ polynomial │ exponential    │
//! │ Senior  Mezzanine  Junior       Equity       │
//! └──────────────────────────────────────────────┘
//! ```

mod range;
mod rate_curve;

pub use range::{PredictedYield, RangeAggregator};
pub use rate_curve::{CurvePoint, RateCurve, TierShape};
