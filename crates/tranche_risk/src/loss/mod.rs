//! Loss subordination.
//!
//! Two allocation policies are provided:
//!
//! - [`ProportionalLossDistributor`] spreads loss over the individual
//!   segments above the protected tier, weighted by each segment's APY and
//!   capped by its liquidity.
//! - [`TierLossWaterfall`] runs loss top-down through the tiers, each tier
//!   absorbing up to a severity-dependent share of its TVL.
//!
//! In both, loss that cannot be placed is reported as `unabsorbed` on the
//! result rather than dropped.

mod proportional;
mod tiered;

pub use proportional::{ProportionalLossDistributor, SegmentLossDistribution};
pub use tiered::{TierAbsorption, TierBook, TierLossDistribution, TierLossWaterfall};
