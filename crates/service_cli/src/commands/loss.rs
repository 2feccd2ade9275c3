//! Loss command implementation
//!
//! Allocates a loss over a uniform liquidity profile with either policy.

use serde::Serialize;
use std::str::FromStr;
use tracing::{info, warn};
use tranche_core::types::{LiquidityProfile, Tier};
use tranche_risk::loss::{
    ProportionalLossDistributor, SegmentLossDistribution, TierBook, TierLossDistribution,
    TierLossWaterfall,
};

use super::{money, pct, render, render_table};
use crate::config::CliConfig;
use crate::{CliError, Result};

/// Loss allocation policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossPolicy {
    /// Per-segment split weighted by APY
    Proportional,
    /// Top-down tier waterfall
    Tiered,
}

impl FromStr for LossPolicy {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "proportional" => Ok(LossPolicy::Proportional),
            "tiered" | "tier" => Ok(LossPolicy::Tiered),
            other => Err(CliError::InvalidArgument(format!(
                "Unknown loss policy: {}. Supported: proportional, tiered",
                other
            ))),
        }
    }
}

/// Result of either policy
#[derive(Debug, Serialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum LossReport {
    /// Per-segment result
    Proportional(SegmentLossDistribution),
    /// Per-tier result
    Tiered(TierLossDistribution),
}

impl LossReport {
    fn unabsorbed(&self) -> f64 {
        match self {
            LossReport::Proportional(d) => d.unabsorbed,
            LossReport::Tiered(d) => d.unabsorbed,
        }
    }
}

/// Run the loss command
pub fn run(
    config: &CliConfig,
    total_loss: f64,
    liquidity: f64,
    policy: &str,
    severity: f64,
) -> Result<()> {
    print!("{}", render_loss(config, total_loss, liquidity, policy, severity)?);
    Ok(())
}

/// Build the loss command output
pub fn render_loss(
    config: &CliConfig,
    total_loss: f64,
    liquidity: f64,
    policy: &str,
    severity: f64,
) -> Result<String> {
    let profile = LiquidityProfile::uniform(liquidity)?;
    let report = match policy.parse::<LossPolicy>()? {
        LossPolicy::Proportional => {
            let distributor = ProportionalLossDistributor::new(&config.engine)?;
            LossReport::Proportional(distributor.distribute_loss(total_loss, &profile)?)
        }
        LossPolicy::Tiered => {
            let waterfall = TierLossWaterfall::new(&config.engine)?;
            let book = TierBook::from_profile(&profile, &config.engine.tiers);
            LossReport::Tiered(waterfall.distribute(total_loss, &book, severity)?)
        }
    };

    if report.unabsorbed() > 0.0 {
        warn!("{} of loss left unabsorbed", money(report.unabsorbed()));
    } else {
        info!("Loss of {} fully absorbed", money(total_loss));
    }

    render(config.format, &report, |report| table(config, report))
}

fn table(config: &CliConfig, report: &LossReport) -> String {
    match report {
        LossReport::Proportional(dist) => {
            let by_tier = dist.tier_losses(&config.engine.tiers);
            let rows: Vec<Vec<String>> = Tier::ALL
                .iter()
                .map(|&tier| vec![tier.to_string(), money(*by_tier.get(tier))])
                .chain(std::iter::once(vec![
                    "Unabsorbed".to_string(),
                    money(dist.unabsorbed),
                ]))
                .collect();
            render_table(&["Tier", "Loss"], &rows)
        }
        LossReport::Tiered(dist) => {
            let rows: Vec<Vec<String>> = dist
                .tiers
                .iter()
                .map(|a| {
                    vec![
                        a.tier.to_string(),
                        money(a.tvl),
                        money(a.capacity),
                        money(a.absorbed),
                        pct(a.loss_ratio()),
                    ]
                })
                .chain(std::iter::once(vec![
                    "Unabsorbed".to_string(),
                    String::new(),
                    String::new(),
                    money(dist.unabsorbed),
                    String::new(),
                ]))
                .collect();
            render_table(&["Tier", "TVL", "Capacity", "Absorbed", "Loss"], &rows)
        }
    }
}
