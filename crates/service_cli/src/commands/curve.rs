//! Curve command implementation
//!
//! Prints the APY of every segment together with its tier.

use tracing::info;
use tranche_core::curve::{CurvePoint, RateCurve};

use super::{pct, render, render_table};
use crate::config::CliConfig;
use crate::Result;

/// Run the curve command
pub fn run(config: &CliConfig) -> Result<()> {
    print!("{}", render_curve(config)?);
    Ok(())
}

/// Build the curve command output
pub fn render_curve(config: &CliConfig) -> Result<String> {
    let curve = RateCurve::new(&config.engine)?;
    let points = curve.points();
    info!("Rendering {} curve points", points.len());
    render(config.format, &points, |points| table(points))
}

fn table(points: &[CurvePoint]) -> String {
    let rows: Vec<Vec<String>> = points
        .iter()
        .map(|p| vec![p.segment.to_string(), p.tier.to_string(), pct(p.apy)])
        .collect();
    render_table(&["Segment", "Tier", "APY"], &rows)
}
