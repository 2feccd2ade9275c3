//! Top-down tier loss waterfall with severity-dependent absorption.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use tranche_core::config::{AbsorptionParams, TierLayout};
use tranche_core::types::error::{ensure_amount, ensure_severity};
use tranche_core::types::{LiquidityProfile, Tier, TierTable, TrancheError, TrancheResult};
use tranche_core::EngineConfig;

/// Total value locked in each tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierBook {
    tvl: TierTable<f64>,
}

impl TierBook {
    /// Book from explicit TVLs, lowest risk first.
    pub fn new(tvl: [f64; 4]) -> TrancheResult<Self> {
        for value in tvl {
            ensure_amount("tier_tvl", value)?;
        }
        let [senior, mezzanine, junior, equity] = tvl;
        Ok(Self {
            tvl: TierTable::new(senior, mezzanine, junior, equity),
        })
    }

    /// Split `total_tvl` by `shares`.
    ///
    /// # Examples
    /// ```
    /// use tranche_core::config::default_tvl_shares;
    /// use tranche_core::Tier;
    /// use tranche_risk::loss::TierBook;
    ///
    /// let book = TierBook::from_total(1_000_000.0, &default_tvl_shares()).unwrap();
    /// assert!((book.tvl(Tier::Senior) - 400_000.0).abs() < 1e-6);
    /// assert!((book.tvl(Tier::Equity) - 100_000.0).abs() < 1e-6);
    /// ```
    pub fn from_total(total_tvl: f64, shares: &TierTable<f64>) -> TrancheResult<Self> {
        ensure_amount("total_tvl", total_tvl)?;
        Self::new(shares.map(|_, &share| total_tvl * share).values())
    }

    /// Sum a liquidity profile per tier.
    pub fn from_profile(profile: &LiquidityProfile, layout: &TierLayout) -> Self {
        Self {
            tvl: TierTable::from_fn(|tier| profile.tier_liquidity(layout, tier)),
        }
    }

    /// TVL of `tier`.
    #[inline]
    pub fn tvl(&self, tier: Tier) -> f64 {
        *self.tvl.get(tier)
    }

    /// All tier TVLs.
    #[inline]
    pub fn tvls(&self) -> &TierTable<f64> {
        &self.tvl
    }

    /// Sum over all tiers.
    pub fn total(&self) -> f64 {
        self.tvl.values().iter().sum()
    }
}

/// What one tier absorbed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierAbsorption {
    /// Tier
    pub tier: Tier,
    /// TVL of the tier
    pub tvl: f64,
    /// Most the tier could absorb at this severity
    pub capacity: f64,
    /// Loss absorbed
    pub absorbed: f64,
    /// Loss still unplaced after this tier
    pub remaining_after: f64,
}

impl TierAbsorption {
    /// Absorbed loss as a fraction of tier TVL, 0 for an empty tier.
    pub fn loss_ratio(&self) -> f64 {
        if self.tvl > 0.0 {
            self.absorbed / self.tvl
        } else {
            0.0
        }
    }
}

/// Outcome of a tier waterfall run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierLossDistribution {
    /// Loss presented to the waterfall
    pub total_loss: f64,
    /// Severity the capacities were computed at
    pub severity: f64,
    /// Per-tier results in absorption order (equity first)
    pub tiers: Vec<TierAbsorption>,
    /// Loss absorbed across all tiers
    pub total_absorbed: f64,
    /// Loss left after every tier reached capacity
    pub unabsorbed: f64,
    /// Whether any loss was left unabsorbed
    pub overflow: bool,
}

impl TierLossDistribution {
    /// Result for `tier`.
    pub fn absorption(&self, tier: Tier) -> Option<&TierAbsorption> {
        self.tiers.iter().find(|a| a.tier == tier)
    }

    /// Loss absorbed by `tier`.
    pub fn tier_loss(&self, tier: Tier) -> f64 {
        self.absorption(tier).map_or(0.0, |a| a.absorbed)
    }

    /// Dollar loss of a position of `position_amount` held in `tier`.
    ///
    /// The position shares its tier's loss pro rata and never loses more
    /// than its own amount. An empty tier passes on no loss.
    pub fn user_loss(&self, position_amount: f64, tier: Tier) -> f64 {
        if position_amount <= 0.0 {
            return 0.0;
        }
        match self.absorption(tier) {
            Some(a) if a.tvl > 0.0 => (position_amount * a.absorbed / a.tvl).min(position_amount),
            _ => 0.0,
        }
    }

    /// Escalate overflow to an error.
    pub fn ensure_absorbed(&self) -> TrancheResult<()> {
        if self.overflow {
            return Err(TrancheError::OverflowLoss {
                unabsorbed: self.unabsorbed,
            });
        }
        Ok(())
    }
}

/// Runs a loss through the tiers from most to least subordinated.
///
/// At severity `s` a tier can absorb `tvl * min(1, base + scaling * s)`.
/// The senior tier has a constant rate and only takes loss once every
/// subordinate tier is at capacity.
///
/// # Examples
///
/// ```
/// use tranche_core::config::default_tvl_shares;
/// use tranche_core::{EngineConfig, Tier};
/// use tranche_risk::loss::{TierBook, TierLossWaterfall};
///
/// let waterfall = TierLossWaterfall::new(&EngineConfig::default()).unwrap();
/// let book = TierBook::from_total(1_000_000.0, &default_tvl_shares()).unwrap();
///
/// let dist = waterfall.distribute(200_000.0, &book, 0.20).unwrap();
/// assert!((dist.tier_loss(Tier::Equity) - 100_000.0).abs() < 1e-6);
/// assert!((dist.tier_loss(Tier::Junior) - 80_000.0).abs() < 1e-6);
/// assert!((dist.tier_loss(Tier::Mezzanine) - 20_000.0).abs() < 1e-6);
/// assert_eq!(dist.tier_loss(Tier::Senior), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TierLossWaterfall {
    absorption: AbsorptionParams,
}

impl TierLossWaterfall {
    /// Build a waterfall from a validated configuration.
    pub fn new(config: &EngineConfig) -> TrancheResult<Self> {
        config.validate()?;
        Ok(Self {
            absorption: config.absorption,
        })
    }

    /// Absorption parameters in use.
    #[inline]
    pub fn absorption(&self) -> &AbsorptionParams {
        &self.absorption
    }

    /// Capacity of `tier` at `severity`.
    pub fn capacity(&self, book: &TierBook, tier: Tier, severity: f64) -> f64 {
        book.tvl(tier) * self.absorption.get(tier).at(severity)
    }

    /// Combined capacity of every tier except the protected one.
    pub fn subordinate_capacity(&self, book: &TierBook, severity: f64) -> f64 {
        Tier::ALL
            .into_iter()
            .filter(|tier| !tier.is_protected())
            .map(|tier| self.capacity(book, tier, severity))
            .sum()
    }

    /// Place `total_loss` on `book` at `severity`.
    ///
    /// # Errors
    ///
    /// `NegativeAmount` / `NonFiniteAmount` for a bad loss, `InvalidSeverity`
    /// for a severity outside [0, 1].
    pub fn distribute(
        &self,
        total_loss: f64,
        book: &TierBook,
        severity: f64,
    ) -> TrancheResult<TierLossDistribution> {
        ensure_amount("total_loss", total_loss)?;
        ensure_severity(severity)?;

        // Summation order differs from the subtraction order below, so an
        // ulp-sized remainder is dropped before it reaches the protected tier.
        let within_subordinate = total_loss <= self.subordinate_capacity(book, severity);
        let mut remaining = total_loss;
        let mut tiers = Vec::with_capacity(Tier::ALL.len());

        for tier in Tier::by_subordination() {
            if tier.is_protected() && within_subordinate {
                remaining = 0.0;
            }
            let capacity = self.capacity(book, tier, severity);
            let absorbed = remaining.min(capacity);
            remaining -= absorbed;
            tiers.push(TierAbsorption {
                tier,
                tvl: book.tvl(tier),
                capacity,
                absorbed,
                remaining_after: remaining,
            });
        }

        let total_absorbed = total_loss - remaining;
        let overflow = remaining > 0.0;

        if overflow {
            warn!(total_loss, severity, unabsorbed = remaining, "loss exceeds tier capacity");
        } else {
            debug!(total_loss, severity, "loss absorbed by tier waterfall");
        }

        Ok(TierLossDistribution {
            total_loss,
            severity,
            tiers,
            total_absorbed,
            unabsorbed: remaining,
            overflow,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tranche_core::config::default_tvl_shares;

    fn waterfall() -> TierLossWaterfall {
        TierLossWaterfall::new(&EngineConfig::default()).unwrap()
    }

    fn book() -> TierBook {
        TierBook::from_total(1_000_000.0, &default_tvl_shares()).unwrap()
    }

    #[test]
    fn test_mild_loss_stays_in_equity() {
        let dist = waterfall().distribute(50_000.0, &book(), 0.05).unwrap();
        assert_relative_eq!(dist.tier_loss(Tier::Equity), 50_000.0, epsilon = 1e-6);
        assert_eq!(dist.tier_loss(Tier::Junior), 0.0);
        assert_relative_eq!(
            dist.absorption(Tier::Equity).unwrap().capacity,
            75_000.0,
            epsilon = 1e-6
        );
        assert!(!dist.overflow);
    }

    #[test]
    fn test_severe_loss_spills_to_mezzanine() {
        let dist = waterfall().distribute(200_000.0, &book(), 0.20).unwrap();
        assert_relative_eq!(dist.tier_loss(Tier::Equity), 100_000.0, epsilon = 1e-6);
        assert_relative_eq!(dist.tier_loss(Tier::Junior), 80_000.0, epsilon = 1e-6);
        assert_relative_eq!(dist.tier_loss(Tier::Mezzanine), 20_000.0, epsilon = 1e-6);
        assert_eq!(dist.tier_loss(Tier::Senior), 0.0);
        assert_relative_eq!(dist.total_absorbed, 200_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_total_loss_overflows() {
        let dist = waterfall().distribute(1_000_000.0, &book(), 1.0).unwrap();
        assert_relative_eq!(dist.tier_loss(Tier::Equity), 100_000.0, epsilon = 1e-6);
        assert_relative_eq!(dist.tier_loss(Tier::Junior), 200_000.0, epsilon = 1e-6);
        assert_relative_eq!(dist.tier_loss(Tier::Mezzanine), 180_000.0, epsilon = 1e-6);
        assert_relative_eq!(dist.tier_loss(Tier::Senior), 20_000.0, epsilon = 1e-6);
        assert_relative_eq!(dist.unabsorbed, 500_000.0, epsilon = 1e-6);
        assert!(dist.overflow);
        assert!(dist.ensure_absorbed().unwrap_err().is_recoverable());
    }

    #[test]
    fn test_absorption_order_and_remaining() {
        let dist = waterfall().distribute(200_000.0, &book(), 0.20).unwrap();
        let order: Vec<Tier> = dist.tiers.iter().map(|a| a.tier).collect();
        assert_eq!(
            order,
            vec![Tier::Equity, Tier::Junior, Tier::Mezzanine, Tier::Senior]
        );
        assert_relative_eq!(dist.tiers[0].remaining_after, 100_000.0, epsilon = 1e-6);
        assert_relative_eq!(dist.tiers[1].remaining_after, 20_000.0, epsilon = 1e-6);
        assert_eq!(dist.tiers[3].remaining_after, 0.0);
    }

    #[test]
    fn test_senior_protected_within_subordinate_capacity() {
        let wf = waterfall();
        let b = book();
        for severity in [0.0, 0.05, 0.1, 0.2, 0.5] {
            let capacity = wf.subordinate_capacity(&b, severity);
            let dist = wf.distribute(capacity, &b, severity).unwrap();
            assert_eq!(dist.tier_loss(Tier::Senior), 0.0);
            assert!(!dist.overflow);
        }
    }

    #[test]
    fn test_senior_protected_at_exact_subordinate_capacity() {
        let wf = waterfall();
        for i in 1..=200 {
            let tvl = 1_000.0 + 137.913_7 * i as f64;
            let b = TierBook::from_total(tvl, &default_tvl_shares()).unwrap();
            for j in 0..=100 {
                let severity = 0.001_003 * j as f64;
                let capacity = wf.subordinate_capacity(&b, severity);
                let dist = wf.distribute(capacity, &b, severity).unwrap();
                assert_eq!(
                    dist.tier_loss(Tier::Senior),
                    0.0,
                    "tvl {} severity {}",
                    tvl,
                    severity
                );
                assert_eq!(dist.unabsorbed, 0.0);
                assert_eq!(dist.total_absorbed, capacity);
            }
        }
    }

    #[test]
    fn test_loss_just_above_subordinate_capacity_reaches_senior() {
        let wf = waterfall();
        let b = book();
        let capacity = wf.subordinate_capacity(&b, 0.20);
        let dist = wf.distribute(capacity + 1_000.0, &b, 0.20).unwrap();
        assert_relative_eq!(dist.tier_loss(Tier::Senior), 1_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_user_loss() {
        let dist = waterfall().distribute(200_000.0, &book(), 0.20).unwrap();
        assert_relative_eq!(dist.user_loss(10_000.0, Tier::Junior), 4_000.0, epsilon = 1e-6);
        assert_relative_eq!(dist.user_loss(10_000.0, Tier::Equity), 10_000.0, epsilon = 1e-6);
        assert_eq!(dist.user_loss(10_000.0, Tier::Senior), 0.0);
        assert_eq!(dist.user_loss(0.0, Tier::Equity), 0.0);
    }

    #[test]
    fn test_user_loss_never_exceeds_position() {
        // A position larger than its tier still loses at most its own amount
        let dist = waterfall().distribute(200_000.0, &book(), 0.20).unwrap();
        assert!(dist.user_loss(5_000_000.0, Tier::Equity) <= 5_000_000.0);
    }

    #[test]
    fn test_empty_tier_passes_on_no_user_loss() {
        let book = TierBook::new([1_000.0, 1_000.0, 1_000.0, 0.0]).unwrap();
        let dist = waterfall().distribute(100.0, &book, 0.1).unwrap();
        assert_eq!(dist.user_loss(50.0, Tier::Equity), 0.0);
        assert_relative_eq!(dist.tier_loss(Tier::Junior), 100.0, epsilon = 1e-9);
        assert_relative_eq!(dist.absorption(Tier::Junior).unwrap().loss_ratio(), 0.1);
    }

    #[test]
    fn test_book_from_profile() {
        let profile = LiquidityProfile::uniform(100.0).unwrap();
        let book = TierBook::from_profile(&profile, &TierLayout::default());
        assert_relative_eq!(book.tvl(Tier::Senior), 1_000.0);
        assert_relative_eq!(book.tvl(Tier::Mezzanine), 2_000.0);
        assert_relative_eq!(book.tvl(Tier::Junior), 3_000.0);
        assert_relative_eq!(book.tvl(Tier::Equity), 4_000.0);
        assert_relative_eq!(book.total(), 10_000.0);
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let wf = waterfall();
        assert!(matches!(
            wf.distribute(-1.0, &book(), 0.1),
            Err(TrancheError::NegativeAmount { .. })
        ));
        assert_eq!(
            wf.distribute(1.0, &book(), 1.5),
            Err(TrancheError::InvalidSeverity(1.5))
        );
        assert!(TierBook::new([1.0, -1.0, 0.0, 0.0]).is_err());
        assert!(TierBook::from_total(-10.0, &default_tvl_shares()).is_err());
    }

    #[test]
    fn test_zero_loss() {
        let dist = waterfall().distribute(0.0, &book(), 0.1).unwrap();
        assert_eq!(dist.total_absorbed, 0.0);
        assert!(!dist.overflow);
        assert!(dist.ensure_absorbed().is_ok());
    }
}
