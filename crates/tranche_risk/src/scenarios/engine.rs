//! Stress execution for a single position.

use super::presets::{severity_label, StressSeverity};
use crate::loss::{TierBook, TierLossWaterfall};
use serde::{Deserialize, Serialize};
use tracing::debug;
use tranche_core::config::TierLayout;
use tranche_core::types::error::{ensure_amount, ensure_severity};
use tranche_core::types::{RiskRange, Tier, TierTable, TrancheError, TrancheResult};
use tranche_core::EngineConfig;

/// Position loss under one severity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StressOutcome {
    /// Severity label, e.g. `"5%"`
    pub label: String,
    /// Preset name of the severity, `"Custom"` for any other value
    pub scenario: String,
    /// Fraction of pool TVL lost
    pub severity: f64,
    /// Position loss as a percentage of the position
    pub loss_percent: f64,
    /// Position loss in currency units
    pub dollar_loss: f64,
    /// Pool loss no tier could absorb
    pub pool_unabsorbed: f64,
}

impl StressOutcome {
    fn zero(severity: f64, pool_unabsorbed: f64) -> Self {
        Self {
            label: severity_label(severity),
            scenario: StressSeverity::from_value(severity).name().to_string(),
            severity,
            loss_percent: 0.0,
            dollar_loss: 0.0,
            pool_unabsorbed,
        }
    }
}

/// Outcomes of every severity for one position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StressReport {
    /// Position amount
    pub amount: f64,
    /// Position range
    pub range: RiskRange,
    /// Pool TVL the severities apply to
    pub total_tvl: f64,
    /// Tier of the range's midpoint segment
    pub position_tier: Tier,
    /// One outcome per severity, mildest first
    pub outcomes: Vec<StressOutcome>,
}

impl StressReport {
    /// Outcome with the given label.
    pub fn get(&self, label: &str) -> Option<&StressOutcome> {
        self.outcomes.iter().find(|o| o.label == label)
    }

    /// Outcome with the largest loss; the most severe one on ties.
    pub fn worst_case(&self) -> Option<&StressOutcome> {
        self.outcomes.iter().max_by(|a, b| {
            a.dollar_loss
                .partial_cmp(&b.dollar_loss)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    }

    /// Whether loss percentages never decrease with severity.
    pub fn is_monotone(&self) -> bool {
        self.outcomes
            .windows(2)
            .all(|w| w[0].loss_percent <= w[1].loss_percent)
    }
}

/// Runs a position through a set of pool-wide loss severities.
///
/// For each severity `s` the pool loses `total_tvl * s`, which is placed by
/// the tier loss waterfall on a book split by the configured TVL shares. The
/// position shares the loss of the tier owning its range's midpoint.
///
/// # Examples
///
/// ```
/// use tranche_core::EngineConfig;
/// use tranche_risk::scenarios::StressRunner;
///
/// let runner = StressRunner::new(&EngineConfig::default()).unwrap();
/// let report = runner.run(1_000.0, (60, 99), 1_000_000.0, &[0.10, 0.05]).unwrap();
///
/// assert_eq!(report.outcomes[0].label, "5%");
/// assert!((report.outcomes[0].loss_percent - 50.0).abs() < 1e-9);
/// assert!((report.outcomes[1].loss_percent - 100.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StressRunner {
    waterfall: TierLossWaterfall,
    layout: TierLayout,
    shares: TierTable<f64>,
    severities: Vec<f64>,
}

impl StressRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: &EngineConfig) -> TrancheResult<Self> {
        Ok(Self {
            waterfall: TierLossWaterfall::new(config)?,
            layout: config.tiers,
            shares: config.tvl_shares,
            severities: config.stress_severities.clone(),
        })
    }

    /// Severities used by [`stress_scenarios`](Self::stress_scenarios).
    #[inline]
    pub fn severities(&self) -> &[f64] {
        &self.severities
    }

    /// Stress a position with the configured severities.
    pub fn stress_scenarios(
        &self,
        amount: f64,
        range: (i64, i64),
        total_tvl: f64,
    ) -> TrancheResult<StressReport> {
        self.run(amount, range, total_tvl, &self.severities)
    }

    /// Stress a position with explicit severities.
    ///
    /// Severities are evaluated in ascending order with duplicates removed.
    /// A non-positive `amount` gives all-zero outcomes.
    ///
    /// # Errors
    ///
    /// Range errors for bad bounds, `NegativeAmount` / `NonFiniteAmount`
    /// for a bad TVL, `InvalidSeverity` for a severity outside [0, 1].
    pub fn run(
        &self,
        amount: f64,
        range: (i64, i64),
        total_tvl: f64,
        severities: &[f64],
    ) -> TrancheResult<StressReport> {
        let range = RiskRange::new(range.0, range.1)?;
        self.run_range(amount, range, total_tvl, severities)
    }

    /// Stress a position with preset or custom severities.
    pub fn run_presets(
        &self,
        amount: f64,
        range: (i64, i64),
        total_tvl: f64,
        severities: &[StressSeverity],
    ) -> TrancheResult<StressReport> {
        let values: Vec<f64> = severities.iter().map(|s| s.value()).collect();
        self.run(amount, range, total_tvl, &values)
    }

    /// Stress a position over a validated range.
    pub fn run_range(
        &self,
        amount: f64,
        range: RiskRange,
        total_tvl: f64,
        severities: &[f64],
    ) -> TrancheResult<StressReport> {
        if !amount.is_finite() {
            return Err(TrancheError::NonFiniteAmount { name: "amount" });
        }
        let book = TierBook::from_total(total_tvl, &self.shares)?;
        let severities = Self::sorted_severities(severities)?;
        let position_tier = self.layout.tier_of(range.midpoint());

        let mut outcomes = Vec::with_capacity(severities.len());
        for severity in severities {
            let total_loss = total_tvl * severity;
            let dist = self.waterfall.distribute(total_loss, &book, severity)?;
            if amount <= 0.0 {
                outcomes.push(StressOutcome::zero(severity, dist.unabsorbed));
                continue;
            }
            let dollar_loss = dist.user_loss(amount, position_tier);
            outcomes.push(StressOutcome {
                label: severity_label(severity),
                scenario: StressSeverity::from_value(severity).name().to_string(),
                severity,
                loss_percent: dollar_loss / amount * 100.0,
                dollar_loss,
                pool_unabsorbed: dist.unabsorbed,
            });
        }

        debug!(
            amount,
            range = %range,
            tier = %position_tier,
            scenarios = outcomes.len(),
            "stress scenarios evaluated"
        );

        Ok(StressReport {
            amount,
            range,
            total_tvl,
            position_tier,
            outcomes,
        })
    }

    fn sorted_severities(severities: &[f64]) -> TrancheResult<Vec<f64>> {
        let mut sorted = severities
            .iter()
            .map(|&s| ensure_severity(s))
            .collect::<TrancheResult<Vec<f64>>>()?;
        sorted.sort_by(|a, b| a.total_cmp(b));
        sorted.dedup();
        Ok(sorted)
    }
}

/// Validate a TVL before handing it to a runner.
pub(crate) fn ensure_tvl(total_tvl: f64) -> TrancheResult<f64> {
    ensure_amount("total_tvl", total_tvl)
}
