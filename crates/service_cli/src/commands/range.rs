//! Range command implementation
//!
//! Blended APY and predicted yield for a position over a risk range.

use serde::Serialize;
use tracing::info;
use tranche_core::config::RangePolicy;
use tranche_core::curve::RangeAggregator;

use super::{money, pct, render, render_table};
use crate::config::CliConfig;
use crate::Result;

/// Output of the range command
#[derive(Debug, Serialize)]
pub struct RangeSummary {
    /// Lowest segment of the range
    pub min: i64,
    /// Highest segment of the range
    pub max: i64,
    /// Policy used to blend the range
    pub policy: RangePolicy,
    /// Position amount
    pub amount: f64,
    /// Blended APY
    pub apy: f64,
    /// `amount * apy`
    pub dollar_yield: f64,
}

/// Run the range command
pub fn run(config: &CliConfig, min: i64, max: i64, amount: f64) -> Result<()> {
    print!("{}", render_range(config, min, max, amount)?);
    Ok(())
}

/// Build the range command output
pub fn render_range(config: &CliConfig, min: i64, max: i64, amount: f64) -> Result<String> {
    let aggregator = RangeAggregator::new(&config.engine)?;
    let prediction = aggregator.predicted_yield(amount, (min, max))?;
    info!("Range [{}-{}] blends to {}", min, max, pct(prediction.apy));

    let summary = RangeSummary {
        min,
        max,
        policy: aggregator.policy(),
        amount,
        apy: prediction.apy,
        dollar_yield: prediction.dollar_yield,
    };
    render(config.format, &summary, table)
}

fn table(s: &RangeSummary) -> String {
    let policy = match s.policy {
        RangePolicy::MeanSegment => "mean segment",
        RangePolicy::RadialBlend { .. } => "radial blend",
    };
    render_table(
        &["Range", "Policy", "Amount", "APY", "Yield"],
        &[vec![
            format!("[{}-{}]", s.min, s.max),
            policy.to_string(),
            money(s.amount),
            pct(s.apy),
            money(s.dollar_yield),
        ]],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use crate::CliError;

    #[test]
    fn test_range_table() {
        let out = render_range(&CliConfig::default(), 0, 9, 10_000.0).unwrap();
        assert!(out.contains("[0-9]"));
        assert!(out.contains("3.0000%"));
        assert!(out.contains("300.00"));
    }

    #[test]
    fn test_range_json() {
        let config = CliConfig {
            format: OutputFormat::Json,
            ..Default::default()
        };
        let out = render_range(&config, 60, 60, 1_000.0).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert!((value["apy"].as_f64().unwrap() - 0.15).abs() < 1e-12);
        assert_eq!(value["policy"]["policy"], "mean_segment");
    }

    #[test]
    fn test_range_rejects_inverted() {
        assert!(matches!(
            render_range(&CliConfig::default(), 40, 20, 1.0),
            Err(CliError::Engine(_))
        ));
    }
}
