//! Segment, tier, position and liquidity types.
//!
//! This module provides:
//! - `segment`: [`Segment`], [`Tier`] and [`RiskRange`] on the 0-99 risk scale
//! - `liquidity`: [`Position`], [`LiquidityTick`] and [`LiquidityProfile`]
//! - `table`: [`TierTable`], one value per tier
//! - `error`: the [`TrancheError`] taxonomy shared by every engine crate

pub mod error;
pub mod liquidity;
pub mod segment;
pub mod table;

pub use error::{TrancheError, TrancheResult};
pub use liquidity::{LiquidityProfile, LiquidityTick, Position};
pub use segment::{RiskRange, Segment, Tier, MAX_SEGMENT, SEGMENT_COUNT};
pub use table::TierTable;
