//! Check command implementation
//!
//! Validates the effective configuration and prints a summary.

use serde::Serialize;
use tracing::info;
use tranche_core::config::{capacity_growth, RangePolicy, CONFIG_VERSION};
use tranche_core::curve::RateCurve;
use tranche_core::types::Tier;
use tranche_core::EngineConfig;
use tranche_risk::scenarios::severity_label;

use super::{pct, render, render_table};
use crate::config::CliConfig;
use crate::Result;

/// Summary printed by the check command
#[derive(Debug, Serialize)]
pub struct CheckSummary {
    /// Configuration file, if one was loaded
    pub source: Option<String>,
    /// Schema version
    pub version: u32,
    /// Log level in effect
    pub log_level: String,
    /// Capacity growth of the subordinate tiers per unit of severity
    pub capacity_growth: f64,
    /// Full engine configuration
    pub engine: EngineConfig,
}

/// Run the check command
pub fn run(config: &CliConfig) -> Result<()> {
    print!("{}", render_check(config)?);
    Ok(())
}

/// Build the check command output
pub fn render_check(config: &CliConfig) -> Result<String> {
    config.engine.validate()?;
    info!("Configuration valid (version {})", CONFIG_VERSION);

    let summary = CheckSummary {
        source: config.source.as_ref().map(|p| p.display().to_string()),
        version: config.engine.version,
        log_level: config.log_level.to_string(),
        capacity_growth: capacity_growth(&config.engine.absorption, &config.engine.tvl_shares),
        engine: config.engine.clone(),
    };
    let curve = RateCurve::new(&config.engine)?;
    render(config.format, &summary, |summary| table(summary, &curve))
}

fn table(summary: &CheckSummary, curve: &RateCurve) -> String {
    let engine = &summary.engine;
    let mut out = format!(
        "Configuration: {}\nVersion: {}\nLog level: {}\n",
        summary.source.as_deref().unwrap_or("(defaults)"),
        summary.version,
        summary.log_level
    );

    let rows: Vec<Vec<String>> = Tier::ALL
        .iter()
        .map(|&tier| {
            let span = engine.tiers.bounds(tier);
            let (lo, hi) = curve.tier_apy_bounds(tier);
            let absorption = engine.absorption.get(tier);
            vec![
                tier.to_string(),
                format!("[{}-{}]", span.start, span.end),
                format!("{} - {}", pct(lo), pct(hi)),
                format!("{:.2} + {:.2}s", absorption.base, absorption.severity_scaling),
                pct(*engine.tvl_shares.get(tier)),
            ]
        })
        .collect();
    out.push_str(&render_table(
        &["Tier", "Segments", "APY", "Absorption", "TVL share"],
        &rows,
    ));

    let policy = match engine.range_policy {
        RangePolicy::MeanSegment => "mean segment".to_string(),
        RangePolicy::RadialBlend {
            safe_apy,
            ceiling_apy,
            exponent,
        } => format!(
            "radial blend ({} to {}, r^{})",
            pct(safe_apy),
            pct(ceiling_apy),
            exponent
        ),
    };
    let severities: Vec<String> = engine
        .stress_severities
        .iter()
        .map(|&s| severity_label(s))
        .collect();
    out.push_str(&format!("Range policy: {}\n", policy));
    out.push_str(&format!("Stress severities: {}\n", severities.join(", ")));
    out.push_str(&format!("Capacity growth: {:.4}\n", summary.capacity_growth));
    out.push_str("Status: OK\n");
    out
}
