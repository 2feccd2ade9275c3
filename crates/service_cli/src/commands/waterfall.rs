//! Waterfall command implementation
//!
//! Distributes a yield pool over a uniform liquidity profile.

use tracing::info;
use tranche_core::types::{LiquidityProfile, Tier};
use tranche_risk::waterfall::{YieldDistribution, YieldWaterfall};

use super::{money, render, render_table};
use crate::config::CliConfig;
use crate::Result;

/// Run the waterfall command
pub fn run(config: &CliConfig, total_yield: f64, liquidity: f64) -> Result<()> {
    print!("{}", render_waterfall(config, total_yield, liquidity)?);
    Ok(())
}

/// Build the waterfall command output
pub fn render_waterfall(config: &CliConfig, total_yield: f64, liquidity: f64) -> Result<String> {
    let waterfall = YieldWaterfall::new(&config.engine)?;
    let profile = LiquidityProfile::uniform(liquidity)?;
    let dist = waterfall.distribute_yield(total_yield, &profile)?;
    info!(
        "Coverage level {} for yield {}",
        dist.coverage_level,
        money(total_yield)
    );

    render(config.format, &dist, |dist| table(config, dist))
}

fn table(config: &CliConfig, dist: &YieldDistribution) -> String {
    let mut out = render_table(
        &["Coverage", "Total need", "Distributed", "Surplus"],
        &[vec![
            dist.coverage_level.to_string(),
            money(dist.total_need),
            money(dist.distributed),
            money(dist.surplus),
        ]],
    );

    let by_tier = dist.allocations.tier_totals(&config.engine.tiers);
    let rows: Vec<Vec<String>> = Tier::ALL
        .iter()
        .map(|&tier| {
            let span = config.engine.tiers.bounds(tier);
            vec![
                tier.to_string(),
                format!("[{}-{}]", span.start, span.end),
                money(*by_tier.get(tier)),
            ]
        })
        .collect();
    out.push_str(&render_table(&["Tier", "Segments", "Yield"], &rows));
    out
}
