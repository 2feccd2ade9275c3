//! Rate, range-policy and absorption parameters.

use crate::types::{Tier, TierTable};
use serde::{Deserialize, Serialize};

/// Parameters of the four-shape APY curve.
///
/// All rates are decimal fractions (`0.03` is 3% APY).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateParams {
    /// Protocol base rate
    pub base_rate: f64,
    /// Multiplier applied to `base_rate` for the flat senior rate
    pub senior_multiplier: f64,
    /// APY at the last mezzanine segment
    pub mezzanine_end_apy: f64,
    /// APY at the last junior segment
    pub junior_end_apy: f64,
    /// Exponent of the junior interpolation
    pub junior_exponent: f64,
    /// Per-segment growth factor inside the equity tier
    pub equity_growth_base: f64,
    /// Optional ceiling applied to the equity tier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apy_cap: Option<f64>,
}

impl Default for RateParams {
    fn default() -> Self {
        Self {
            base_rate: 0.05,
            senior_multiplier: 0.6,
            mezzanine_end_apy: 0.06,
            junior_end_apy: 0.15,
            junior_exponent: 2.0,
            equity_growth_base: 1.03,
            apy_cap: None,
        }
    }
}

impl RateParams {
    /// Flat senior rate: `base_rate * senior_multiplier`.
    #[inline]
    pub fn senior_apy(&self) -> f64 {
        self.base_rate * self.senior_multiplier
    }
}

/// How a risk range is reduced to one representative APY.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum RangePolicy {
    /// Evaluate the curve at the arithmetic mean position of the range.
    #[default]
    MeanSegment,
    /// Power-law blend between a floor and a ceiling on `r = mean / 99`.
    RadialBlend {
        /// APY at r = 0
        safe_apy: f64,
        /// APY at r = 1
        ceiling_apy: f64,
        /// Exponent applied to r
        exponent: f64,
    },
}

impl RangePolicy {
    /// Radial blend with the stock constants (0.03 floor, 0.40 ceiling, r^1.5).
    pub fn radial_default() -> Self {
        RangePolicy::RadialBlend {
            safe_apy: 0.03,
            ceiling_apy: 0.40,
            exponent: 1.5,
        }
    }
}

/// Share of a tier's TVL that can absorb losses at a given severity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AbsorptionRate {
    /// Rate at zero severity
    pub base: f64,
    /// Increase in rate per unit of severity
    pub severity_scaling: f64,
}

impl AbsorptionRate {
    /// Absorption rate constant in severity.
    pub const fn constant(base: f64) -> Self {
        Self {
            base,
            severity_scaling: 0.0,
        }
    }

    /// Rate at `severity`: `min(1, base + severity_scaling * severity)`.
    #[inline]
    pub fn at(&self, severity: f64) -> f64 {
        (self.base + self.severity_scaling * severity).min(1.0)
    }
}

/// Per-tier absorption rates.
pub type AbsorptionParams = TierTable<AbsorptionRate>;

/// Stock absorption rates.
///
/// Senior is constant at 5%; the subordinate tiers scale with severity.
pub fn default_absorption() -> AbsorptionParams {
    TierTable::new(
        AbsorptionRate::constant(0.05),
        AbsorptionRate {
            base: 0.10,
            severity_scaling: 0.5,
        },
        AbsorptionRate {
            base: 0.20,
            severity_scaling: 1.0,
        },
        AbsorptionRate {
            base: 0.50,
            severity_scaling: 5.0,
        },
    )
}

/// Stock split of a pool's TVL across tiers.
pub fn default_tvl_shares() -> TierTable<f64> {
    TierTable::new(0.40, 0.30, 0.20, 0.10)
}

/// Severities run by the stress runner when none are given.
pub fn default_stress_severities() -> Vec<f64> {
    vec![0.05, 0.10, 0.20]
}

/// Sum of `share * severity_scaling` over the subordinate tiers.
///
/// Stress loss percentages stay monotone in severity while this is at most 1.
pub fn capacity_growth(absorption: &AbsorptionParams, shares: &TierTable<f64>) -> f64 {
    Tier::ALL
        .into_iter()
        .filter(|tier| !tier.is_protected())
        .map(|tier| shares.get(tier) * absorption.get(tier).severity_scaling)
        .sum()
}
